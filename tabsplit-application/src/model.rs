use tabsplit_domain::{BillId, Currency, FeeSuggestion, ItemId, Money};
use time::OffsetDateTime;

/// One line of a chat's bill history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillHistoryEntry {
    pub bill_id: BillId,
    pub finalized_at: Option<OffsetDateTime>,
    pub currency: Currency,
    pub grand_total: Money,
    pub item_count: usize,
    pub participant_count: usize,
}

/// Outcome of adding a receipt's items to a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptImport {
    pub added: Vec<ItemId>,
    /// Lines dropped because they had no name or no positive price.
    pub rejected: usize,
    /// Fees detected on the receipt, waiting for confirmation.
    pub pending_fees: Option<FeeSuggestion>,
}
