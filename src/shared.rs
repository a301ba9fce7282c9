pub mod ranking;
pub mod revision;

pub use ranking::{Direction, EntityId, OrderedEntity, RankAssignment};
pub use revision::OrderRevision;
