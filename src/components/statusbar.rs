use color_eyre::Result;
use educe::Educe;
use itertools::Itertools;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Stylize, palette::tailwind},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding},
};

use super::Component;

use crate::{
    action::{Action, Notice, NoticeLevel, RelevantKey},
    layout::LayoutSlot,
};

#[derive(Debug, Clone, PartialEq, Educe)]
#[educe(Default)]
pub struct StatusBar {
    #[educe(Default(expression = Notice::info("按 1-3 切换页面，q 退出")))]
    notice: Notice,
    keys: Vec<RelevantKey>,
}

impl Component for StatusBar {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Notify(notice) => self.notice = notice,
            Action::Error(msg) => self.notice = Notice::error(msg),
            Action::SetRelevantKeys(keys) => self.keys = keys,
            _ => {}
        };
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let area = crate::layout::main_vert(LayoutSlot::StatusBar, area);

        let color = match self.notice.level {
            NoticeLevel::Info => tailwind::SLATE.c200,
            NoticeLevel::Success => tailwind::GREEN.c400,
            NoticeLevel::Error => tailwind::RED.c400,
        };
        let block = Block::new()
            .borders(!Borders::BOTTOM)
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(2))
            .title(Line::from(format!(" {} ", self.notice.message)).fg(color))
            .title_alignment(Alignment::Center);
        frame.render_widget(&block, area);

        let spans = self
            .keys
            .iter()
            .map(|key| {
                vec![
                    format!("<{}> ", key.key).blue().bold(),
                    Span::from(key.text.clone()),
                ]
            })
            .intersperse_with(|| vec![Span::from("  ")])
            .flatten()
            .collect_vec();
        frame.render_widget(Line::from(spans), block.inner(area));

        Ok(())
    }
}
