use billsplit_domain::{
    build_report, Group, IdSequence, ItemDraft, ItemId, Money, Participant, ParticipantId,
    Receipt, Report, SplitLedger,
};
use dashmap::DashMap;

use crate::{error::SessionError, model::SessionId};

enum SessionState {
    /// Participants may already be gathering, but nothing can be split yet.
    AwaitingReceipt { group: Group },
    /// A receipt of record exists and the ledger over it is live.
    Splitting { ledger: SplitLedger },
}

/// One bill, edited by one user, one operation at a time.
///
/// Owns the item id sequence so that replacing the receipt mints strictly
/// fresh item ids: a claim left over from the old receipt can never silently
/// match a new item.
pub struct BillSession {
    state: SessionState,
    item_ids: IdSequence,
}

impl Default for BillSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BillSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::AwaitingReceipt {
                group: Group::new(),
            },
            item_ids: IdSequence::new(),
        }
    }

    fn group(&self) -> &Group {
        match &self.state {
            SessionState::AwaitingReceipt { group } => group,
            SessionState::Splitting { ledger } => ledger.group(),
        }
    }

    fn group_mut(&mut self) -> &mut Group {
        match &mut self.state {
            SessionState::AwaitingReceipt { group } => group,
            SessionState::Splitting { ledger } => ledger.group_mut(),
        }
    }

    fn ledger(&self) -> Result<&SplitLedger, SessionError> {
        match &self.state {
            SessionState::Splitting { ledger } => Ok(ledger),
            SessionState::AwaitingReceipt { .. } => Err(SessionError::NoReceipt),
        }
    }

    fn ledger_mut(&mut self) -> Result<&mut SplitLedger, SessionError> {
        match &mut self.state {
            SessionState::Splitting { ledger } => Ok(ledger),
            SessionState::AwaitingReceipt { .. } => Err(SessionError::NoReceipt),
        }
    }

    /// Installs the corrected rows and grand total as the receipt of record.
    ///
    /// This is a wholesale replacement: every previous item identity and
    /// every claim is discarded, while the participants are kept, so people
    /// re-splitting a corrected receipt do not re-enter names.
    pub fn accept_receipt(
        &mut self,
        drafts: Vec<ItemDraft>,
        total: Money,
    ) -> Result<(), SessionError> {
        let receipt = Receipt::from_drafts(drafts, total, &mut self.item_ids)?;

        let previous = std::mem::replace(
            &mut self.state,
            SessionState::AwaitingReceipt {
                group: Group::new(),
            },
        );
        let group = match previous {
            SessionState::AwaitingReceipt { group } => group,
            SessionState::Splitting { ledger } => ledger.into_parts().0,
        };

        tracing::info!(
            items = receipt.len(),
            total = %receipt.total(),
            participants = group.len(),
            "receipt accepted, ledger reset"
        );
        self.state = SessionState::Splitting {
            ledger: SplitLedger::new(group, receipt),
        };
        Ok(())
    }

    pub fn receipt(&self) -> Option<&Receipt> {
        self.ledger().ok().map(SplitLedger::receipt)
    }

    pub fn add_participant(&mut self, name: impl Into<String>) -> ParticipantId {
        self.group_mut().add(name)
    }

    pub fn remove_participant(&mut self, id: ParticipantId) {
        match &mut self.state {
            SessionState::AwaitingReceipt { group } => group.remove(id),
            SessionState::Splitting { ledger } => ledger.remove_participant(id),
        }
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.group().iter()
    }

    pub fn add_claim(
        &mut self,
        participant_id: ParticipantId,
        item_id: ItemId,
    ) -> Result<(), SessionError> {
        self.ledger_mut()?.add_claim(participant_id, item_id)?;
        Ok(())
    }

    pub fn set_claim_count(
        &mut self,
        participant_id: ParticipantId,
        position: usize,
        count: u32,
    ) -> Result<(), SessionError> {
        self.ledger_mut()?
            .set_claim_count(participant_id, position, count)?;
        Ok(())
    }

    pub fn remove_claims(
        &mut self,
        participant_id: ParticipantId,
        positions: &[usize],
    ) -> Result<(), SessionError> {
        self.ledger_mut()?.remove_claims(participant_id, positions)?;
        Ok(())
    }

    pub fn assignment_total(&self, item_id: ItemId) -> Result<u64, SessionError> {
        Ok(self.ledger()?.assignment_total(item_id))
    }

    pub fn build_report(&self) -> Result<Report, SessionError> {
        Ok(build_report(self.ledger()?)?)
    }
}

/// Concurrent registry of independent sessions.
///
/// Each session carries its own allocators and state; nothing is shared
/// across keys, so one session's bad input can never disturb another.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, BillSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the session if it does not exist yet.
    pub fn open(&self, id: SessionId) {
        self.sessions.entry(id).or_default();
    }

    /// Drops the session and everything it owned. Returns whether a session
    /// existed under this key.
    pub fn close(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Runs one operation against the session under `id`.
    pub fn with<R>(
        &self,
        id: SessionId,
        op: impl FnOnce(&mut BillSession) -> R,
    ) -> Result<R, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::SessionNotFound(id))?;
        Ok(op(&mut session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsplit_domain::Item;
    use rstest::{fixture, rstest};

    fn draft(name: &str, count: u32, price_cents: i64) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            count,
            total_price: Money::new(price_cents, 2),
        }
    }

    #[fixture]
    fn session() -> BillSession {
        let mut session = BillSession::new();
        session.add_participant("Alice");
        session.add_participant("Bob");
        session
            .accept_receipt(
                vec![draft("A", 2, 1000), draft("B", 1, 300)],
                Money::new(1430, 2),
            )
            .expect("valid receipt");
        session
    }

    #[rstest]
    fn operations_before_receipt_fail_with_no_receipt() {
        let mut session = BillSession::new();
        let alice = session.add_participant("Alice");

        assert!(matches!(
            session.add_claim(alice, ItemId(1)),
            Err(SessionError::NoReceipt)
        ));
        assert!(matches!(
            session.build_report(),
            Err(SessionError::NoReceipt)
        ));
        assert!(session.receipt().is_none());
    }

    #[rstest]
    fn participants_can_gather_before_the_receipt(session: BillSession) {
        let names: Vec<&str> = session.participants().map(Participant::name).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[rstest]
    fn replacement_keeps_participants_and_resets_claims(mut session: BillSession) {
        let alice = session.participants().next().expect("participant").id();
        let old_items: Vec<ItemId> = session
            .receipt()
            .expect("receipt")
            .iter()
            .map(Item::id)
            .collect();
        session.add_claim(alice, old_items[0]).expect("item");

        session
            .accept_receipt(vec![draft("C", 1, 700)], Money::new(700, 2))
            .expect("valid replacement");

        // Participants survive the reset.
        assert_eq!(session.participants().count(), 2);
        // Claims are gone; every new item id is strictly fresh.
        assert_eq!(session.assignment_total(old_items[0]).expect("ledger"), 0);
        let new_items: Vec<ItemId> = session
            .receipt()
            .expect("receipt")
            .iter()
            .map(Item::id)
            .collect();
        assert!(new_items.iter().all(|id| id > old_items.last().expect("old items")));

        // The dangling old id no longer resolves.
        assert!(matches!(
            session.add_claim(alice, old_items[0]),
            Err(SessionError::Ledger(_))
        ));
    }

    #[rstest]
    fn report_flows_through_the_session(mut session: BillSession) {
        let participants: Vec<ParticipantId> =
            session.participants().map(Participant::id).collect();
        let items: Vec<ItemId> = session
            .receipt()
            .expect("receipt")
            .iter()
            .map(Item::id)
            .collect();

        session.add_claim(participants[0], items[0]).expect("item");
        session
            .set_claim_count(participants[0], 0, 2)
            .expect("position");
        session.add_claim(participants[1], items[1]).expect("item");

        let report = session.build_report().expect("report");
        let sum: Money = report.rows.iter().map(|row| row.purchased_total).sum();
        assert_eq!(sum, Money::new(1430, 2));
    }

    #[test]
    fn store_isolates_sessions_and_rejects_unknown_keys() {
        let store = SessionStore::new();
        let first = SessionId(1);
        let second = SessionId(2);
        store.open(first);
        store.open(second);

        store
            .with(first, |session| {
                session.add_participant("Alice");
            })
            .expect("session exists");

        let first_count = store
            .with(first, |session| session.participants().count())
            .expect("session exists");
        let second_count = store
            .with(second, |session| session.participants().count())
            .expect("session exists");
        assert_eq!(first_count, 1);
        assert_eq!(second_count, 0);

        assert!(store.close(first));
        assert!(!store.close(first));
        assert!(matches!(
            store.with(first, |_| ()),
            Err(SessionError::SessionNotFound(SessionId(1)))
        ));
    }
}
