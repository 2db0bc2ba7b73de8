use rust_decimal::Decimal;

use crate::{
    error::ReportError,
    model::{Claim, ItemId, Money, ParticipantId},
    services::SplitLedger,
};

/// One item row inside a participant's report.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchasedItem {
    pub item_id: ItemId,
    pub name: String,
    pub purchased_count: u32,
    pub unit_price: Money,
    pub total: Money,
}

/// Final per-participant breakdown.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantReport {
    pub participant_id: ParticipantId,
    pub name: String,
    pub purchased_items: Vec<PurchasedItem>,
    /// Sum of this participant's item rows.
    pub purchased_subtotal: Money,
    /// This participant's proportional share of the grand total.
    pub purchased_total: Money,
}

impl ParticipantReport {
    /// Share of tax and fees minus discounts. Negative when discounts
    /// dominate.
    pub fn purchased_others(&self) -> Money {
        self.purchased_total - self.purchased_subtotal
    }
}

/// Immutable snapshot derived from a ledger. No live link back: later ledger
/// mutations do not affect an already-built report.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub rows: Vec<ParticipantReport>,
    pub order_subtotal: Money,
    pub order_total: Money,
    /// Item value no participant's subtotal accounts for. Positive when part
    /// of the receipt is unclaimed, negative when items are over-assigned.
    /// Informational only; a report is built regardless.
    pub unclaimed_subtotal: Money,
}

/// Derives the per-participant financial report from the current ledger
/// state, spreading the gap between subtotal and grand total across
/// participants in proportion to their subtotal share.
///
/// A zero order subtotal yields zero shares for everyone. If the grand total
/// is nonzero while the subtotal is zero and someone holds a nonzero claim,
/// there is no share to distribute by and the receipt is rejected as
/// degenerate.
pub fn build_report(ledger: &SplitLedger) -> Result<Report, ReportError> {
    let order_subtotal = ledger.receipt().subtotal();
    let order_total = ledger.receipt().total();

    let mut rows = Vec::with_capacity(ledger.group().len());
    for participant in ledger.participants() {
        let claims = ledger.claims(participant.id());
        let purchased_items: Vec<PurchasedItem> = claims.iter().map(purchased_item_row).collect();
        let purchased_subtotal: Money = purchased_items.iter().map(|row| row.total).sum();

        let purchased_total = if order_subtotal.is_zero() {
            if !order_total.is_zero() && !purchased_subtotal.is_zero() {
                return Err(ReportError::DegenerateReceipt { total: order_total });
            }
            Money::ZERO
        } else {
            // Multiply before dividing so terminating ratios stay exact.
            Money::from_decimal(
                purchased_subtotal.as_decimal() * order_total.as_decimal()
                    / order_subtotal.as_decimal(),
            )
        };

        rows.push(ParticipantReport {
            participant_id: participant.id(),
            name: participant.name().to_string(),
            purchased_items,
            purchased_subtotal,
            purchased_total,
        });
    }

    let allocated: Money = rows.iter().map(|row| row.purchased_subtotal).sum();
    let unclaimed_subtotal = order_subtotal - allocated;
    if !unclaimed_subtotal.is_zero() {
        tracing::debug!(
            %order_subtotal,
            %unclaimed_subtotal,
            "report built with unallocated item value"
        );
    }

    Ok(Report {
        rows,
        order_subtotal,
        order_total,
        unclaimed_subtotal,
    })
}

fn purchased_item_row(claim: &Claim) -> PurchasedItem {
    let item = claim.item();
    let unit_price = item.unit_price();
    PurchasedItem {
        item_id: item.id(),
        name: item.name().to_string(),
        purchased_count: claim.assigned_count(),
        unit_price,
        total: Money::from_decimal(
            unit_price.as_decimal() * Decimal::from(claim.assigned_count()),
        ),
    }
}
