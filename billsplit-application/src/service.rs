use billsplit_domain::{ItemDraft, ItemId, Money, Participant, ParticipantId, Report};

use crate::{
    error::{ReceiptReadError, SessionError},
    model::{ParsedReceipt, ReceiptImage, SessionId},
    ports::ReceiptReader,
    session::SessionStore,
};

/// Use-case entry point tying the session registry to the receipt reader.
///
/// Methods take `&self`; per-session exclusivity is handled by the store.
pub struct SplitService<'a> {
    reader: &'a dyn ReceiptReader,
    sessions: SessionStore,
}

impl<'a> SplitService<'a> {
    pub fn new(reader: &'a dyn ReceiptReader) -> Self {
        Self {
            reader,
            sessions: SessionStore::new(),
        }
    }

    /// Runs the reader over an uploaded image. The result is a proposal for
    /// the user to correct, not yet attached to any session. Failures pass
    /// through unmodified; re-reading is always the user's call.
    pub fn read_receipt(
        &self,
        image: &ReceiptImage<'_>,
    ) -> Result<ParsedReceipt, ReceiptReadError> {
        tracing::info!(
            bytes = image.bytes.len(),
            filename = image.filename.unwrap_or("<unnamed>"),
            "reading receipt image"
        );
        match self.reader.read(image) {
            Ok(parsed) => {
                tracing::info!(items = parsed.items.len(), total = %parsed.total, "receipt read");
                Ok(parsed)
            }
            Err(err) => {
                tracing::warn!(error = %err, "receipt read failed");
                Err(err)
            }
        }
    }

    pub fn open_session(&self, id: SessionId) {
        self.sessions.open(id);
    }

    pub fn close_session(&self, id: SessionId) -> bool {
        self.sessions.close(id)
    }

    pub fn accept_receipt(
        &self,
        id: SessionId,
        drafts: Vec<ItemDraft>,
        total: Money,
    ) -> Result<(), SessionError> {
        self.sessions
            .with(id, |session| session.accept_receipt(drafts, total))?
    }

    pub fn add_participant(
        &self,
        id: SessionId,
        name: impl Into<String>,
    ) -> Result<ParticipantId, SessionError> {
        self.sessions.with(id, |session| session.add_participant(name))
    }

    pub fn remove_participant(
        &self,
        id: SessionId,
        participant_id: ParticipantId,
    ) -> Result<(), SessionError> {
        self.sessions
            .with(id, |session| session.remove_participant(participant_id))
    }

    pub fn participants(&self, id: SessionId) -> Result<Vec<Participant>, SessionError> {
        self.sessions
            .with(id, |session| session.participants().cloned().collect())
    }

    pub fn add_claim(
        &self,
        id: SessionId,
        participant_id: ParticipantId,
        item_id: ItemId,
    ) -> Result<(), SessionError> {
        self.sessions
            .with(id, |session| session.add_claim(participant_id, item_id))?
    }

    pub fn set_claim_count(
        &self,
        id: SessionId,
        participant_id: ParticipantId,
        position: usize,
        count: u32,
    ) -> Result<(), SessionError> {
        self.sessions.with(id, |session| {
            session.set_claim_count(participant_id, position, count)
        })?
    }

    pub fn remove_claims(
        &self,
        id: SessionId,
        participant_id: ParticipantId,
        positions: &[usize],
    ) -> Result<(), SessionError> {
        self.sessions
            .with(id, |session| session.remove_claims(participant_id, positions))?
    }

    pub fn assignment_total(
        &self,
        id: SessionId,
        item_id: ItemId,
    ) -> Result<u64, SessionError> {
        self.sessions
            .with(id, |session| session.assignment_total(item_id))?
    }

    pub fn build_report(&self, id: SessionId) -> Result<Report, SessionError> {
        self.sessions.with(id, |session| session.build_report())?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct StubReader {
        result: fn() -> Result<ParsedReceipt, ReceiptReadError>,
    }

    impl ReceiptReader for StubReader {
        fn read(&self, _image: &ReceiptImage<'_>) -> Result<ParsedReceipt, ReceiptReadError> {
            (self.result)()
        }
    }

    fn parsed() -> Result<ParsedReceipt, ReceiptReadError> {
        Ok(ParsedReceipt {
            items: vec![ItemDraft {
                name: "Coffee".to_string(),
                count: 2,
                total_price: Money::new(1000, 2),
            }],
            total: Money::new(1100, 2),
        })
    }

    fn unreadable() -> Result<ParsedReceipt, ReceiptReadError> {
        Err(ReceiptReadError::NoItemsFound)
    }

    fn image() -> ReceiptImage<'static> {
        ReceiptImage {
            bytes: &[0u8; 4],
            filename: Some("receipt.jpg"),
            content_type: Some("image/jpeg"),
        }
    }

    #[rstest]
    fn reader_result_passes_through_untouched() {
        let reader = StubReader { result: parsed };
        let service = SplitService::new(&reader);

        let receipt = service.read_receipt(&image()).expect("stub succeeds");
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.total, Money::new(1100, 2));
    }

    #[rstest]
    fn reader_failure_is_not_retried() {
        let reader = StubReader { result: unreadable };
        let service = SplitService::new(&reader);

        assert!(matches!(
            service.read_receipt(&image()),
            Err(ReceiptReadError::NoItemsFound)
        ));
    }

    #[rstest]
    fn full_flow_from_parse_to_report() {
        let reader = StubReader { result: parsed };
        let service = SplitService::new(&reader);
        let session = SessionId(42);
        service.open_session(session);

        let alice = service.add_participant(session, "Alice").expect("session");
        let proposal = service.read_receipt(&image()).expect("stub succeeds");
        service
            .accept_receipt(session, proposal.items, proposal.total)
            .expect("valid receipt");

        let item = {
            let report = service.build_report(session).expect("report");
            assert_eq!(report.order_total, Money::new(1100, 2));
            ItemId(1)
        };
        service.add_claim(session, alice, item).expect("item known");
        service
            .set_claim_count(session, alice, 0, 2)
            .expect("position known");

        let report = service.build_report(session).expect("report");
        assert_eq!(report.rows[0].purchased_total, Money::new(1100, 2));
        assert!(report.unclaimed_subtotal.is_zero());
    }

    #[rstest]
    fn unknown_session_is_rejected() {
        let reader = StubReader { result: parsed };
        let service = SplitService::new(&reader);

        assert!(matches!(
            service.add_participant(SessionId(7), "Alice"),
            Err(SessionError::SessionNotFound(SessionId(7)))
        ));
    }
}
