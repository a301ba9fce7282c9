use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style, Stylize, palette::tailwind},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table},
};

use super::{DataTable, sort::view_order};
use crate::widgets::{pagination_bar::PaginationBar, spinner};

const DRAG_HANDLE: &str = "⠿";
const HEADER_HEIGHT: u16 = 1;
const COLUMN_SPACING: u16 = 1;

pub(super) fn draw<T>(table: &mut DataTable<T>, frame: &mut Frame, area: Rect, items: &[T]) {
    let [body_area, pager_area] = match table.pagination {
        Some(_) => Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area),
        None => [area, Rect::default()],
    };

    let widths = table.widths();
    record_hit_areas(table, body_area, &widths);

    let header = draw_header(table);
    if table.loading || items.is_empty() {
        frame.render_widget(Table::new(Vec::<Row>::new(), widths).header(header), body_area);
        let placeholder = if table.loading {
            Line::from(format!("{} 加载中…", spinner::frame(table.spinner_tick)))
        } else {
            Line::from(table.empty_message).fg(tailwind::SLATE.c500)
        };
        let placeholder_area = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .areas::<1>(table.hit.body)[0];
        frame.render_widget(
            Paragraph::new(placeholder).alignment(Alignment::Center),
            placeholder_area,
        );
    } else {
        let rows = draw_rows(table, items);
        let widget = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(Style::from(Modifier::REVERSED))
            .cell_highlight_style(Style::from(Modifier::BOLD));
        frame.render_stateful_widget(widget, body_area, &mut table.state);
    }

    if let Some(pagination) = table.pagination {
        table.hit.pager =
            PaginationBar::new(pagination).render_with_targets(pager_area, frame.buffer_mut());
    } else {
        table.hit.pager.clear();
    }
}

fn record_hit_areas<T>(table: &mut DataTable<T>, body_area: Rect, widths: &[Constraint]) {
    let [header, body] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Fill(1),
    ])
    .areas(body_area);
    table.hit.header = header;
    table.hit.body = body;

    let handle_columns = usize::from(table.draggable);
    let column_rects = Layout::horizontal(widths)
        .spacing(COLUMN_SPACING)
        .split(header);
    table.hit.columns = column_rects
        .iter()
        .skip(handle_columns)
        .zip(&table.columns)
        .map(|(rect, column)| (*rect, column.key))
        .collect();
}

fn draw_header<T>(table: &DataTable<T>) -> Row<'static> {
    let selected_column = table.state.selected_column();
    let handle = table.draggable.then(|| Cell::from(""));
    let cells = table.columns.iter().enumerate().map(|(idx, column)| {
        let text = match table.sort {
            Some(sort) if sort.key == column.key => {
                format!("{} {}", column.header, sort.direction.indicator())
            }
            _ => column.header.to_owned(),
        };
        let cell = Cell::from(text);
        if selected_column == Some(idx) {
            cell.add_modifier(Modifier::UNDERLINED)
        } else {
            cell
        }
    });
    handle
        .into_iter()
        .chain(cells)
        .collect::<Row>()
        .height(HEADER_HEIGHT)
        .bg(tailwind::INDIGO.c900)
}

fn draw_rows<T>(table: &DataTable<T>, items: &[T]) -> Vec<Row<'static>> {
    let dragged = table.drag.dragged_row();
    let hovered = table.drag.hovered_row();
    let order = view_order(items, &table.columns, table.effective_sort());

    order
        .iter()
        .enumerate()
        .map(|(row_idx, item_idx)| {
            let item = &items[*item_idx];
            let handle = table.draggable.then(|| {
                let handle = Cell::from(DRAG_HANDLE);
                if table.can_drag() {
                    handle.fg(tailwind::SLATE.c400)
                } else {
                    handle.fg(tailwind::SLATE.c700)
                }
            });
            let cells = table.columns.iter().map(|column| Cell::from(column.cell(item)));
            let row: Row = handle.into_iter().chain(cells).collect();

            if dragged == Some(row_idx) {
                row.style(Style::new().bg(tailwind::SLATE.c700).add_modifier(Modifier::DIM | Modifier::ITALIC))
            } else if hovered == Some(row_idx) {
                row.style(Style::new().bg(tailwind::INDIGO.c700))
            } else {
                zebra_stripe(row_idx, row)
            }
        })
        .collect()
}

fn zebra_stripe(i: usize, row: Row) -> Row {
    let alternating_color = match i % 2 {
        0 => tailwind::SLATE.c800,
        _ => tailwind::SLATE.c900,
    };
    row.style(Style::new().bg(alternating_color))
}
