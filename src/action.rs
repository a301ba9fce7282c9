use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),
    Notify(Notice),
    SetRelevantKeys(Vec<RelevantKey>),
    SetActivePage(Page),
    SetUnsavedMarker { page: Page, unsaved: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevantKey {
    pub key: String,
    pub text: String,
}

impl RelevantKey {
    pub fn new(key: &'static str, text: &'static str) -> Self {
        Self {
            key: key.to_owned(),
            text: text.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A short user-facing message, shown in the status bar like a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum Page {
    #[default]
    #[strum(to_string = "轮播图")]
    Banners,
    #[strum(to_string = "分类")]
    Categories,
    #[strum(to_string = "生涯教育产品")]
    CareerItems,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Banners, Page::Categories, Page::CareerItems];

    pub fn from_digit(digit: char) -> Option<Self> {
        let idx = digit.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(idx as usize).copied()
    }
}
