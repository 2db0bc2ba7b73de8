use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{allocator::IdSequence, error::ReceiptError};

/// Monetary amount backed by a fixed-point decimal.
///
/// All core arithmetic happens on this type; display rounding is the
/// presentation layer's concern and never feeds back into it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Builds a money value from mantissa and scale, e.g. `Money::new(1430, 2)` is 14.30.
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, value| acc + value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClaimId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw item row as produced by a receipt reader or a manual-correction table.
/// Not yet validated and carries no identity.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub count: u32,
    pub total_price: Money,
}

/// A purchasable line entry on the bill. Immutable once created; edits replace
/// the whole item set with fresh identities.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    id: ItemId,
    name: String,
    count: u32,
    total_price: Money,
}

impl Item {
    pub(crate) fn from_draft(draft: ItemDraft, id: ItemId) -> Result<Self, ReceiptError> {
        if draft.count == 0 {
            return Err(ReceiptError::ZeroCount { name: draft.name });
        }
        if draft.total_price.is_negative() {
            return Err(ReceiptError::NegativePrice { name: draft.name });
        }
        Ok(Self {
            id,
            name: draft.name,
            count: draft.count,
            total_price: draft.total_price,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Price of a single unit. Well defined because `count > 0` is enforced
    /// at construction.
    pub fn unit_price(&self) -> Money {
        Money::from_decimal(self.total_price.as_decimal() / Decimal::from(self.count))
    }
}

/// One participant's hold on a portion of one item.
///
/// Carries a snapshot of the (immutable) item, so a claim stays renderable
/// even after the receipt it came from has been replaced. Callers are
/// expected to reset the ledger on receipt replacement regardless.
#[derive(Clone, Debug, PartialEq)]
pub struct Claim {
    id: ClaimId,
    item: Item,
    assigned_count: u32,
}

impl Claim {
    pub(crate) fn new(id: ClaimId, item: Item, assigned_count: u32) -> Self {
        Self {
            id,
            item,
            assigned_count,
        }
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn assigned_count(&self) -> u32 {
        self.assigned_count
    }

    pub(crate) fn set_assigned_count(&mut self, count: u32) {
        self.assigned_count = count;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    id: ParticipantId,
    name: String,
}

impl Participant {
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of the people splitting the bill, in insertion order.
///
/// Owns its own id sequence: participant ids are unique for the lifetime of
/// the group and never reused, even after removal.
#[derive(Debug, Default)]
pub struct Group {
    participants: IndexMap<ParticipantId, Participant>,
    ids: IdSequence,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new participant. Always succeeds; duplicate names are
    /// allowed and receive distinct ids.
    pub fn add(&mut self, name: impl Into<String>) -> ParticipantId {
        let id = ParticipantId(self.ids.next());
        self.participants.insert(
            id,
            Participant {
                id,
                name: name.into(),
            },
        );
        id
    }

    /// Removes a participant. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ParticipantId) {
        self.participants.shift_remove(&id);
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }
}

/// The purchased items plus the grand total actually payable.
///
/// The grand total may exceed or undercut the subtotal (tax, service fees,
/// discounts). Item identities are fixed at construction; a corrected receipt
/// is a wholesale replacement with fresh ids, never a merge.
#[derive(Debug)]
pub struct Receipt {
    items: IndexMap<ItemId, Item>,
    total: Money,
}

impl Receipt {
    /// Builds a receipt from raw rows, minting a fresh id per item from the
    /// caller-owned sequence. The sequence must outlive receipt replacement
    /// so ids are never reused across receipts.
    pub fn from_drafts(
        drafts: impl IntoIterator<Item = ItemDraft>,
        total: Money,
        ids: &mut IdSequence,
    ) -> Result<Self, ReceiptError> {
        let mut items = IndexMap::new();
        for draft in drafts {
            let item = Item::from_draft(draft, ItemId(ids.next()))?;
            items.insert(item.id(), item);
        }
        Ok(Self { items, total })
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Sum of all item total prices, before tax, fees, and discounts.
    pub fn subtotal(&self) -> Money {
        self.items.values().map(Item::total_price).sum()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }
}
