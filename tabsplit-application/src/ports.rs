use rust_decimal::Decimal;
use tabsplit_domain::{Bill, BillId, ChatId, Currency};
use time::OffsetDateTime;

use crate::{
    error::{ExchangeRateError, ReceiptError, RepositoryError},
    receipt::{ReceiptImage, ReceiptSuggestion},
};

/// Storage for bills, keyed by chat. A chat has at most one open bill.
pub trait BillRepository: Send + Sync {
    fn find_active(&self, chat: ChatId) -> Result<Option<Bill>, RepositoryError>;

    /// Stores the bill. Bills that are no longer open move to the chat's
    /// history.
    fn save(&self, bill: &Bill) -> Result<(), RepositoryError>;

    fn delete(&self, chat: ChatId, bill: BillId) -> Result<(), RepositoryError>;

    /// Closed bills of the chat, most recently finalized first.
    fn recent_finalized(&self, chat: ChatId, limit: usize) -> Result<Vec<Bill>, RepositoryError>;

    fn next_id(&self) -> Result<BillId, RepositoryError>;
}

pub trait ReceiptExtractor: Send + Sync {
    fn extract(&self, image: &ReceiptImage<'_>) -> Result<ReceiptSuggestion, ReceiptError>;
}

pub trait ExchangeRateProvider: Send + Sync {
    /// Units of `to` per one unit of `from`.
    fn rate(&self, from: Currency, to: Currency) -> Result<Decimal, ExchangeRateError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
