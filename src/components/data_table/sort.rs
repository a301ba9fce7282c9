use super::column::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_query(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// The table sorts the rows it is handed.
    Internal,
    /// The caller sorts (usually the server); the table only reports header clicks.
    External,
}

/// Internal mode: ascending, descending, then back to the caller's order.
/// Clicking another column starts over on that column.
pub fn cycle_internal(current: Option<SortConfig>, key: &'static str) -> Option<SortConfig> {
    match current {
        Some(SortConfig {
            key: current_key,
            direction,
        }) if current_key == key => match direction {
            SortDirection::Ascending => Some(SortConfig {
                key,
                direction: SortDirection::Descending,
            }),
            SortDirection::Descending => None,
        },
        _ => Some(SortConfig {
            key,
            direction: SortDirection::Ascending,
        }),
    }
}

/// External mode: flips the direction of the active column, starts ascending on
/// any other column.
pub fn toggle_external(current: Option<SortConfig>, key: &'static str) -> SortConfig {
    let direction = match current {
        Some(SortConfig {
            key: current_key,
            direction: SortDirection::Ascending,
        }) if current_key == key => SortDirection::Descending,
        _ => SortDirection::Ascending,
    };
    SortConfig { key, direction }
}

/// Row indices of `items` in display order.
pub fn view_order<T>(items: &[T], columns: &[Column<T>], sort: Option<SortConfig>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    let Some(sort) = sort else {
        return order;
    };
    let Some(column) = columns.iter().find(|it| it.key == sort.key) else {
        return order;
    };
    let keys: Vec<_> = items.iter().map(|row| column.sort_key(row)).collect();
    order.sort_by(|a, b| {
        let ordering = keys[*a].cmp(&keys[*b]);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    order
}
