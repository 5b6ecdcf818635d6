use rust_decimal::Decimal;

use crate::{
    bill::BillState,
    model::{FeeComponent, ItemId, Money},
};

/// Fatal fee configuration problems. Rejected before a policy is committed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeePolicyError {
    #[error("Unrecognized fee mode '{token}'")]
    InvalidMode { token: String },
    #[error("Fee mode is required when a service charge or VAT rate is set")]
    MissingMode,
    #[error("{component} rate {rate}% is outside 0-100%")]
    RateOutOfRange { component: FeeComponent, rate: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscountError {
    #[error("Discount percentage must not be negative (found {0})")]
    NegativePercent(Decimal),
    #[error("Discount amount must not be negative (found {0})")]
    NegativeAmount(Money),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillError {
    #[error("Bill is {state}, not open")]
    NotOpen { state: BillState },
    #[error("Bill is {state}, not finalized")]
    NotFinalized { state: BillState },
    #[error("Item {0} not found")]
    UnknownItem(ItemId),
    #[error("Item {0} appears more than once")]
    DuplicateItem(ItemId),
    #[error("No item ids left on this bill")]
    ItemIdsExhausted,
    #[error("{0} is not part of this bill")]
    UnknownParticipant(String),
    #[error("{0} already joined this bill")]
    AlreadyJoined(String),
    #[error("{claimant} already has item {item}")]
    AlreadyClaimed { item: ItemId, claimant: String },
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Price must be positive (found {0})")]
    NonPositivePrice(Money),
    #[error("Fee policy already set; reset it before setting a new one")]
    FeePolicyAlreadySet,
    #[error("No receipt fee suggestion is waiting for confirmation")]
    NoPendingFees,
    #[error("Receipt fee suggestion has not been confirmed yet")]
    UnconfirmedFees,
    #[error("Bill has no items")]
    NoItems,
    #[error("Exchange rate must be positive (found {0})")]
    InvalidExchangeRate(Decimal),
    #[error(transparent)]
    FeePolicy(#[from] FeePolicyError),
}
