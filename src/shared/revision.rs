use tracing::warn;

/// Local revision tracker for the order of one collection mirror.
///
/// This does not assume that the backend stores revision numbers and is reset
/// every time the mirror is replaced by a server list.
///
/// **Important:** This is NOT a server-side optimistic locking mechanism. It only
/// tells the page *which* of its local order changes have been saved. The save
/// request might still be in flight while the user already drags the next row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRevision {
    /// revision of the local mirror
    pub local: RevisionNumber,
    /// revision that the backend confirmed last
    pub saved: RevisionNumber,

    /// local revision that has been submitted and awaits confirmation
    pub sent: Option<RevisionNumber>,
}

pub type RevisionNumber = u32;

impl OrderRevision {
    pub fn loaded() -> Self {
        Self {
            local: 1,
            saved: 1,
            sent: None,
        }
    }

    pub fn touch(&mut self) {
        let unsent_changes_pending = self.local > self.saved && self.sent != Some(self.local);
        if !unsent_changes_pending {
            self.local += 1;
        }
        // otherwise fold this change into the pending revision
    }

    pub fn mark_sent(&mut self) {
        self.sent = Some(self.local);
    }

    pub fn notify_saved(&mut self, saved_revision: RevisionNumber) {
        if saved_revision <= self.saved {
            warn!("OrderRevision received out-of-order save confirmation {saved_revision}");
            return;
        }
        self.saved = saved_revision;
        if self.sent == Some(saved_revision) {
            self.sent = None;
        }
    }

    pub fn notify_failed(&mut self, failed_revision: RevisionNumber) {
        if self.sent == Some(failed_revision) {
            self.sent = None;
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.saved != self.local
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_touch_folds_unsent_changes() {
        let mut revision = OrderRevision::loaded();

        revision.touch();
        revision.touch();

        assert_eq!(revision.local, 2);
        assert!(revision.has_unsaved_changes());
    }

    #[test]
    fn test_change_after_send_stays_unsaved_after_confirmation() {
        let mut revision = OrderRevision::loaded();
        revision.touch();
        revision.mark_sent();

        revision.touch();
        revision.notify_saved(2);

        assert_eq!(revision.local, 3);
        assert_eq!(revision.saved, 2);
        assert!(revision.has_unsaved_changes());
    }

    #[test]
    fn test_confirmation_clears_unsaved() {
        let mut revision = OrderRevision::loaded();
        revision.touch();
        revision.mark_sent();

        revision.notify_saved(2);

        assert_eq!(revision.sent, None);
        assert!(!revision.has_unsaved_changes());
    }

    #[test]
    fn test_failure_keeps_unsaved() {
        let mut revision = OrderRevision::loaded();
        revision.touch();
        revision.mark_sent();

        revision.notify_failed(2);

        assert_eq!(revision.sent, None);
        assert!(revision.has_unsaved_changes());
    }
}
