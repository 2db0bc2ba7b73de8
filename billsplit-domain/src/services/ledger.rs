use fxhash::FxHashSet;
use indexmap::IndexMap;

use crate::{
    allocator::IdSequence,
    error::LedgerError,
    model::{Claim, ClaimId, Group, Item, ItemId, Participant, ParticipantId, Receipt},
};

/// The live mapping from participants to the item portions they claim.
///
/// Owns the group and the receipt it splits; the claim sequences per
/// participant are the authoritative mutable state of an in-progress split.
/// Nothing here prevents over-assigning an item beyond its count:
/// [`SplitLedger::assignment_total`] is advisory, and callers that want to
/// block over-claiming must check it before [`SplitLedger::add_claim`].
#[derive(Debug)]
pub struct SplitLedger {
    group: Group,
    receipt: Receipt,
    assignments: IndexMap<ParticipantId, Vec<Claim>>,
    claim_ids: IdSequence,
}

impl SplitLedger {
    pub fn new(group: Group, receipt: Receipt) -> Self {
        Self {
            group,
            receipt,
            assignments: IndexMap::new(),
            claim_ids: IdSequence::new(),
        }
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut Group {
        &mut self.group
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// Tears the ledger apart, discarding every claim. The session layer uses
    /// this to carry the group across a receipt replacement.
    pub fn into_parts(self) -> (Group, Receipt) {
        (self.group, self.receipt)
    }

    /// Participants in group (insertion) order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.group.iter()
    }

    /// Items in receipt (insertion) order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.receipt.iter()
    }

    pub fn item(&self, id: ItemId) -> Result<&Item, LedgerError> {
        self.receipt.get(id).ok_or(LedgerError::ItemNotFound(id))
    }

    /// Total count of `item_id` claimed across every participant.
    ///
    /// Purely informational: used to show the remaining claimable quantity,
    /// never to block an assignment.
    pub fn assignment_total(&self, item_id: ItemId) -> u64 {
        self.assignments
            .values()
            .flatten()
            .filter(|claim| claim.item().id() == item_id)
            .map(|claim| u64::from(claim.assigned_count()))
            .sum()
    }

    /// The participant's claim sequence, created empty on first access.
    ///
    /// This is the stored sequence itself, not a copy: mutations through the
    /// returned handle are visible to every later caller.
    pub fn claims_entry(&mut self, participant_id: ParticipantId) -> &mut Vec<Claim> {
        self.assignments.entry(participant_id).or_default()
    }

    /// Read-only view of a participant's claims; empty for a participant
    /// whose sequence has never been created.
    pub fn claims(&self, participant_id: ParticipantId) -> &[Claim] {
        self.assignments
            .get(&participant_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Appends a claim on one unit of `item_id` to the participant's
    /// sequence. Fails if the item is unknown; over-assignment past the
    /// item's count is permitted.
    pub fn add_claim(
        &mut self,
        participant_id: ParticipantId,
        item_id: ItemId,
    ) -> Result<ClaimId, LedgerError> {
        let item = self
            .receipt
            .get(item_id)
            .ok_or(LedgerError::ItemNotFound(item_id))?
            .clone();
        let claim_id = ClaimId(self.claim_ids.next());
        tracing::debug!(%participant_id, %item_id, %claim_id, "claim added");
        self.claims_entry(participant_id)
            .push(Claim::new(claim_id, item, 1));
        Ok(claim_id)
    }

    /// Overwrites the assigned count of the claim at `position` in the
    /// participant's sequence.
    pub fn set_claim_count(
        &mut self,
        participant_id: ParticipantId,
        position: usize,
        count: u32,
    ) -> Result<(), LedgerError> {
        let claims = self.claims_entry(participant_id);
        let len = claims.len();
        let claim = claims
            .get_mut(position)
            .ok_or(LedgerError::PositionOutOfRange {
                participant: participant_id,
                position,
                len,
            })?;
        claim.set_assigned_count(count);
        Ok(())
    }

    /// Removes the claims at the given positions in the participant's
    /// sequence, as it currently stands. Duplicate positions are collapsed.
    ///
    /// The call is atomic: every position is validated against the current
    /// length before anything is removed, and removal proceeds in descending
    /// order so earlier removals cannot shift later positions.
    pub fn remove_claims(
        &mut self,
        participant_id: ParticipantId,
        positions: &[usize],
    ) -> Result<(), LedgerError> {
        let claims = self.claims_entry(participant_id);
        let len = claims.len();

        let unique: FxHashSet<usize> = positions.iter().copied().collect();
        if let Some(&position) = unique.iter().find(|&&position| position >= len) {
            return Err(LedgerError::PositionOutOfRange {
                participant: participant_id,
                position,
                len,
            });
        }

        let mut ordered: Vec<usize> = unique.into_iter().collect();
        ordered.sort_unstable_by(|a, b| b.cmp(a));
        for position in ordered {
            claims.remove(position);
        }
        tracing::debug!(%participant_id, removed = positions.len(), "claims removed");
        Ok(())
    }

    /// Removes the participant from the group and discards their entire
    /// claim sequence. No partial recovery.
    pub fn remove_participant(&mut self, participant_id: ParticipantId) {
        self.group.remove(participant_id);
        if self.assignments.shift_remove(&participant_id).is_some() {
            tracing::debug!(%participant_id, "participant removed with claim history");
        }
    }
}
