use std::fmt;

use ratatui::layout::Constraint;

/// Value a column sorts by. Numbers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Number(i64),
    Text(String),
}

impl From<i64> for SortKey {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> String>;
type SortAccessor<T> = Box<dyn Fn(&T) -> SortKey>;

/// Column of a [super::DataTable], reading its cell straight from the row type.
pub struct Column<T> {
    pub key: &'static str,
    pub header: &'static str,
    pub width: Constraint,
    accessor: Accessor<T>,
    sort_key: Option<SortAccessor<T>>,
}

impl<T> Column<T> {
    pub fn new<F>(key: &'static str, header: &'static str, width: Constraint, accessor: F) -> Self
    where
        F: Fn(&T) -> String + 'static,
    {
        Self {
            key,
            header,
            width,
            accessor: Box::new(accessor),
            sort_key: None,
        }
    }

    pub fn sortable<F>(mut self, sort_key: F) -> Self
    where
        F: Fn(&T) -> SortKey + 'static,
    {
        self.sort_key = Some(Box::new(sort_key));
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.sort_key.is_some()
    }

    pub fn cell(&self, row: &T) -> String {
        (self.accessor)(row)
    }

    pub fn sort_key(&self, row: &T) -> Option<SortKey> {
        self.sort_key.as_ref().map(|key| key(row))
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("sortable", &self.is_sortable())
            .finish()
    }
}
