#![warn(clippy::uninlined_format_args)]

pub mod bill;
pub mod error;
pub mod model;
pub mod services;
pub mod summary;

pub use bill::{Bill, BillParts, BillState};
pub use error::{BillError, DiscountError, FeePolicyError};
pub use model::{
    BillId, ChatId, Claimant, Currency, Discount, FeeComponent, FeeMode, FeePolicy,
    FeeSuggestion, Item, ItemId, MemberId, Money, Participant,
};
pub use services::{
    BillEngine, ClaimAggregator, DiscountNormalizer, FeePolicyResolver, MoneyContext,
    PersonTotaler, RoundingMode, SummaryBuilder,
};
pub use summary::{
    BillSummary, BillTotals, BillWarning, FeeLine, PersonSummary, Reconciliation, ShareLine,
    UnassignedItem,
};
