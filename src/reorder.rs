//! Optimistic reorder controller shared by every ordered collection page.
//!
//! The controller owns the local mirror of one collection page. It applies moves
//! to the mirror right away, hands the full rank list to a [ReorderTransport] and
//! later receives the outcome through [ReorderController::handle_outcome].

use color_eyre::Result;
use tracing::{debug, warn};

use crate::{
    action::Notice,
    shared::{
        Direction, EntityId, OrderRevision, OrderedEntity, RankAssignment,
        ranking::{assign_ranks, neighbour_index, position_of, rank_sorted},
        revision::RevisionNumber,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Every move is persisted on its own and rolled back if that fails.
    Immediate,
    /// Moves only mark the mirror as unsaved until [ReorderController::save_order].
    Batched,
}

/// Identifies one submitted reorder request.
///
/// `generation` is bumped whenever the mirror is replaced by a server list, so
/// outcomes of requests made against an older mirror can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderRequest {
    pub ticket: Ticket,
    pub ranks: Vec<RankAssignment>,
}

/// Fire-and-forget submission of a rank list. The outcome is reported back
/// asynchronously by whoever owns the controller.
pub trait ReorderTransport {
    fn submit(&mut self, request: ReorderRequest) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderEffect {
    Unchanged,
    Submitted(Ticket),
    MarkedUnsaved,
}

#[derive(Debug)]
enum InFlight<E> {
    Move { ticket: Ticket, snapshot: Vec<E> },
    Save { ticket: Ticket, revision: RevisionNumber },
}

impl<E> InFlight<E> {
    fn ticket(&self) -> Ticket {
        match self {
            InFlight::Move { ticket, .. } | InFlight::Save { ticket, .. } => *ticket,
        }
    }
}

pub struct ReorderController<E, T> {
    mode: PersistenceMode,
    transport: T,

    server_items: Vec<E>,
    /// The server list was sorted by something other than rank.
    keep_server_order: bool,
    local_items: Vec<E>,
    revision: OrderRevision,

    generation: u64,
    next_seq: u64,
    in_flight: Vec<InFlight<E>>,
}

impl<E: OrderedEntity, T: ReorderTransport> ReorderController<E, T> {
    pub fn new(mode: PersistenceMode, transport: T) -> Self {
        Self {
            mode,
            transport,
            server_items: vec![],
            keep_server_order: false,
            local_items: vec![],
            revision: OrderRevision::loaded(),
            generation: 0,
            next_seq: 0,
            in_flight: vec![],
        }
    }

    pub fn mode(&self) -> PersistenceMode {
        self.mode
    }

    pub fn local_items(&self) -> &[E] {
        &self.local_items
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.revision.has_unsaved_changes()
    }

    /// Whether a reorder request of this mirror is still outstanding.
    pub fn is_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Replaces the mirror with a fresh server list. This always wins over any
    /// local reordering, saved or not.
    pub fn sync_from_server(&mut self, items: Vec<E>) {
        self.replace_mirror(items, false);
    }

    /// Like [Self::sync_from_server], but keeps the order the server answered
    /// with. For lists the server sorted by another column.
    pub fn sync_from_server_as_is(&mut self, items: Vec<E>) {
        self.replace_mirror(items, true);
    }

    fn replace_mirror(&mut self, items: Vec<E>, keep_server_order: bool) {
        if self.has_unsaved_changes() {
            debug!("Discarding unsaved order changes in favour of the server list");
        }
        self.generation += 1;
        self.in_flight.clear();
        self.keep_server_order = keep_server_order;
        self.server_items = items;
        self.local_items = self.server_order();
        self.revision = OrderRevision::loaded();
    }

    fn server_order(&self) -> Vec<E> {
        if self.keep_server_order {
            self.server_items.clone()
        } else {
            rank_sorted(&self.server_items)
        }
    }

    /// Swaps the entity with its neighbour. A move past either end is a no-op.
    pub fn move_entity(&mut self, id: &EntityId, direction: Direction) -> Result<ReorderEffect> {
        let Some(idx) = position_of(&self.local_items, id) else {
            warn!("Asked to move {id}, which is not part of the mirror");
            return Ok(ReorderEffect::Unchanged);
        };
        let Some(target) = neighbour_index(self.local_items.len(), idx, direction) else {
            return Ok(ReorderEffect::Unchanged);
        };

        let snapshot = self.local_items.clone();
        self.local_items.swap(idx, target);
        self.persist_change(snapshot)
    }

    /// Adopts an order proposed by the table, e.g. after a drag-drop. This only
    /// marks the mirror as unsaved, in either mode; [Self::save_order] submits it.
    pub fn reorder(&mut self, new_order: Vec<E>) -> ReorderEffect {
        let unchanged = new_order.len() == self.local_items.len()
            && new_order
                .iter()
                .zip(self.local_items.iter())
                .all(|(new, old)| new.id() == old.id());
        if unchanged {
            return ReorderEffect::Unchanged;
        }

        self.local_items = new_order;
        self.revision.touch();
        ReorderEffect::MarkedUnsaved
    }

    /// Submits the current mirror order. Only does something while there are
    /// unsaved changes.
    pub fn save_order(&mut self) -> Result<ReorderEffect> {
        if !self.has_unsaved_changes() {
            return Ok(ReorderEffect::Unchanged);
        }

        let ticket = self.next_ticket();
        let revision = self.revision.local;
        self.revision.mark_sent();
        let request = ReorderRequest {
            ticket,
            ranks: assign_ranks(&self.local_items),
        };
        if let Err(err) = self.transport.submit(request) {
            self.revision.notify_failed(revision);
            return Err(err.wrap_err("submitting order"));
        }
        self.in_flight.push(InFlight::Save { ticket, revision });
        Ok(ReorderEffect::Submitted(ticket))
    }

    /// Throws away local reordering and goes back to the last server list.
    pub fn reset_order(&mut self) {
        // Outcomes of saves that are still in flight no longer describe this mirror.
        self.in_flight.clear();
        self.local_items = self.server_order();
        self.revision = OrderRevision::loaded();
    }

    /// Applies the outcome of a submitted request and returns the notice to show.
    pub fn handle_outcome(
        &mut self,
        ticket: Ticket,
        outcome: Result<(), String>,
    ) -> Option<Notice> {
        if ticket.generation != self.generation {
            debug!(
                "Ignoring outcome of {ticket:?}, mirror has been replaced since (generation {})",
                self.generation
            );
            return None;
        }
        let Some(idx) = self.in_flight.iter().position(|it| it.ticket() == ticket) else {
            debug!("Ignoring outcome of {ticket:?}, nothing is waiting for it");
            return None;
        };
        let finished = self.in_flight.remove(idx);
        if ticket.seq != self.next_seq {
            // A later request carries the full rank list and decides the outcome.
            debug!("Ignoring outcome of {ticket:?}, superseded by seq {}", self.next_seq);
            return None;
        }

        match (finished, outcome) {
            (InFlight::Move { .. }, Ok(())) => Some(Notice::success("排序已更新")),
            (InFlight::Move { snapshot, .. }, Err(message)) => {
                self.local_items = snapshot;
                Some(Notice::error(format!("排序更新失败：{message}")))
            }
            (InFlight::Save { revision, .. }, Ok(())) => {
                self.revision.notify_saved(revision);
                Some(Notice::success("排序已保存"))
            }
            (InFlight::Save { revision, .. }, Err(message)) => {
                self.revision.notify_failed(revision);
                Some(Notice::error(format!("保存排序失败：{message}")))
            }
        }
    }

    fn persist_change(&mut self, snapshot: Vec<E>) -> Result<ReorderEffect> {
        match self.mode {
            PersistenceMode::Immediate => self.submit_immediately(snapshot),
            PersistenceMode::Batched => {
                self.revision.touch();
                Ok(ReorderEffect::MarkedUnsaved)
            }
        }
    }

    fn submit_immediately(&mut self, snapshot: Vec<E>) -> Result<ReorderEffect> {
        let ticket = self.next_ticket();
        let request = ReorderRequest {
            ticket,
            ranks: assign_ranks(&self.local_items),
        };
        if let Err(err) = self.transport.submit(request) {
            self.local_items = snapshot;
            return Err(err.wrap_err("submitting reorder"));
        }
        self.in_flight.push(InFlight::Move { ticket, snapshot });
        Ok(ReorderEffect::Submitted(ticket))
    }

    fn next_ticket(&mut self) -> Ticket {
        self.next_seq += 1;
        Ticket {
            generation: self.generation,
            seq: self.next_seq,
        }
    }
}
