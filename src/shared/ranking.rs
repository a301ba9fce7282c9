use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an entity within its collection. The backend hands out either
/// numeric or string ids depending on the collection, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{id}"),
            EntityId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A record that has a persisted rank among its siblings.
pub trait OrderedEntity: Clone {
    fn id(&self) -> &EntityId;
    fn rank(&self) -> i64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// One `{id, rank}` pair of a reorder request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankAssignment {
    pub id: EntityId,
    pub rank: u32,
}

/// Copy of `items` ordered by rank. Equal ranks keep their incoming order.
pub fn rank_sorted<E: OrderedEntity>(items: &[E]) -> Vec<E> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(OrderedEntity::rank);
    sorted
}

/// Ranks are derived from the position in `items`, never from the previous rank
/// values, so the result is always `1..=N`.
pub fn assign_ranks<E: OrderedEntity>(items: &[E]) -> Vec<RankAssignment> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| RankAssignment {
            id: item.id().clone(),
            rank: idx as u32 + 1,
        })
        .collect()
}

/// Removes the element at `from` and inserts it at `to`.
/// Returns whether anything moved.
pub fn move_to_index<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Index of the neighbour in `direction`, or `None` at the boundary.
pub fn neighbour_index(len: usize, idx: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Up => idx.checked_sub(1),
        Direction::Down => Some(idx + 1).filter(|next| *next < len),
    }
}

pub fn position_of<E: OrderedEntity>(items: &[E], id: &EntityId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Item {
        pub id: EntityId,
        pub rank: i64,
        pub name: &'static str,
    }

    impl OrderedEntity for Item {
        fn id(&self) -> &EntityId {
            &self.id
        }

        fn rank(&self) -> i64 {
            self.rank
        }
    }

    pub(crate) fn item(id: i64, rank: i64, name: &'static str) -> Item {
        Item {
            id: EntityId::Int(id),
            rank,
            name,
        }
    }

    pub(crate) fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|it| it.name).collect()
    }

    #[test]
    fn test_rank_sorted_is_stable_for_equal_ranks() {
        let items = vec![item(1, 30, "C"), item(2, 10, "A"), item(3, 10, "B")];

        assert_eq!(names(&rank_sorted(&items)), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_assign_ranks_ignores_gaps() {
        let items = vec![item(7, 10, "A"), item(8, 25, "B"), item(9, 99, "C")];

        let ranks = assign_ranks(&items);

        assert_eq!(
            ranks,
            vec![
                RankAssignment { id: EntityId::Int(7), rank: 1 },
                RankAssignment { id: EntityId::Int(8), rank: 2 },
                RankAssignment { id: EntityId::Int(9), rank: 3 },
            ]
        );
    }

    #[test]
    fn test_move_to_index_splices_instead_of_swapping() {
        let mut items = vec!["A", "B", "C", "D", "E"];

        assert!(move_to_index(&mut items, 2, 0));
        assert_eq!(items, vec!["C", "A", "B", "D", "E"]);

        assert!(move_to_index(&mut items, 0, 3));
        assert_eq!(items, vec!["A", "B", "D", "C", "E"]);
    }

    #[test]
    fn test_move_to_index_rejects_out_of_range() {
        let mut items = vec!["A", "B"];

        assert!(!move_to_index(&mut items, 1, 1));
        assert!(!move_to_index(&mut items, 0, 2));
        assert_eq!(items, vec!["A", "B"]);
    }

    #[test]
    fn test_neighbour_index_at_boundaries() {
        assert_eq!(neighbour_index(3, 0, Direction::Up), None);
        assert_eq!(neighbour_index(3, 2, Direction::Down), None);
        assert_eq!(neighbour_index(3, 1, Direction::Up), Some(0));
        assert_eq!(neighbour_index(3, 1, Direction::Down), Some(2));
    }

    #[test]
    fn test_entity_id_accepts_numbers_and_strings() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[12, "banner-7"]"#).unwrap();

        assert_eq!(ids, vec![EntityId::Int(12), EntityId::Text("banner-7".into())]);
        assert_eq!(ids[1].to_string(), "banner-7");
    }
}
