use billsplit_domain::{ItemDraft, Money};

/// Raw bytes of an uploaded receipt photo, plus whatever metadata the
/// transport happened to carry.
pub struct ReceiptImage<'a> {
    pub bytes: &'a [u8],
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

/// A reader's proposal for the receipt contents. Not yet the receipt of
/// record: the user may correct rows and the grand total before accepting.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedReceipt {
    pub items: Vec<ItemDraft>,
    pub total: Money,
}

/// Key under which one bill-splitting session is stored. Sessions never
/// share state; ids minted in one session are meaningless in another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
