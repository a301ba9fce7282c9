use crate::shared::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Pointer,
    Keyboard,
}

/// Drag-and-drop state of a table body. Rows are indices in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Mouse button is down on a row, but it has not travelled far enough yet.
    Pressed { row: usize, x: u16, y: u16 },
    Dragging {
        from: usize,
        over: usize,
        source: DragSource,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragUpdate {
    None,
    Started,
    Hover(usize),
    Dropped { from: usize, to: usize },
    Cancelled,
    /// Press and release without travelling: a plain click on `row`.
    Clicked(usize),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn dragged_row(&self) -> Option<usize> {
        match self {
            DragState::Dragging { from, .. } => Some(*from),
            _ => None,
        }
    }

    pub fn hovered_row(&self) -> Option<usize> {
        match self {
            DragState::Dragging { over, .. } => Some(*over),
            _ => None,
        }
    }

    pub fn press(&mut self, row: usize, x: u16, y: u16) {
        *self = DragState::Pressed { row, x, y };
    }

    /// Pointer moved while the button is held. Dragging only starts once the pointer
    /// is `threshold` cells away from where it was pressed, so clicks never reorder.
    pub fn pointer_moved(
        &mut self,
        x: u16,
        y: u16,
        row_at_pointer: Option<usize>,
        threshold: u16,
    ) -> DragUpdate {
        match *self {
            DragState::Pressed {
                row,
                x: start_x,
                y: start_y,
            } => {
                let distance = x.abs_diff(start_x).max(y.abs_diff(start_y));
                if distance < threshold.max(1) {
                    return DragUpdate::None;
                }
                *self = DragState::Dragging {
                    from: row,
                    over: row_at_pointer.unwrap_or(row),
                    source: DragSource::Pointer,
                };
                DragUpdate::Started
            }
            DragState::Dragging {
                from,
                over,
                source: DragSource::Pointer,
            } => match row_at_pointer {
                Some(row) if row != over => {
                    *self = DragState::Dragging {
                        from,
                        over: row,
                        source: DragSource::Pointer,
                    };
                    DragUpdate::Hover(row)
                }
                _ => DragUpdate::None,
            },
            _ => DragUpdate::None,
        }
    }

    /// Mouse button released.
    pub fn release(&mut self, row_at_pointer: Option<usize>) -> DragUpdate {
        let update = match *self {
            DragState::Pressed { row, .. } => DragUpdate::Clicked(row),
            DragState::Dragging {
                from,
                over,
                source: DragSource::Pointer,
            } => DragUpdate::Dropped {
                from,
                to: row_at_pointer.unwrap_or(over),
            },
            DragState::Dragging {
                source: DragSource::Keyboard,
                ..
            } => return DragUpdate::None,
            DragState::Idle => DragUpdate::None,
        };
        *self = DragState::Idle;
        update
    }

    pub fn pick_up(&mut self, row: usize) -> DragUpdate {
        *self = DragState::Dragging {
            from: row,
            over: row,
            source: DragSource::Keyboard,
        };
        DragUpdate::Started
    }

    /// Keyboard equivalent of moving the pointer one row.
    pub fn nudge(&mut self, direction: Direction, len: usize) -> DragUpdate {
        let DragState::Dragging { from, over, source } = *self else {
            return DragUpdate::None;
        };
        let next = match direction {
            Direction::Up => over.saturating_sub(1),
            Direction::Down => (over + 1).min(len.saturating_sub(1)),
        };
        if next == over {
            return DragUpdate::None;
        }
        *self = DragState::Dragging {
            from,
            over: next,
            source,
        };
        DragUpdate::Hover(next)
    }

    pub fn drop_here(&mut self) -> DragUpdate {
        let DragState::Dragging { from, over, .. } = *self else {
            return DragUpdate::None;
        };
        *self = DragState::Idle;
        DragUpdate::Dropped { from, to: over }
    }

    pub fn cancel(&mut self) -> DragUpdate {
        if *self == DragState::Idle {
            return DragUpdate::None;
        }
        *self = DragState::Idle;
        DragUpdate::Cancelled
    }
}
