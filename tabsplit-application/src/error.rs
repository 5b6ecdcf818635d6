use tabsplit_domain::{BillError, Currency, MemberId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("Bill storage unavailable: {0}")]
    Unavailable(String),
    #[error("Stored bill is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiptError {
    #[error("Receipt image type is not supported (expected PNG or JPEG)")]
    UnsupportedImage,
    #[error("Receipt extraction failed: {0}")]
    Extraction(String),
    #[error("Receipt payload is malformed: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeRateError {
    #[error("No exchange rate available for {from} to {to}")]
    Unavailable { from: Currency, to: Currency },
    #[error("Exchange rate lookup failed: {0}")]
    Lookup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillCommandError {
    #[error("No open bill in this chat")]
    NoActiveBill,
    #[error("A bill is already open in this chat")]
    BillAlreadyOpen,
    #[error("Only the bill creator can do this")]
    NotCreator,
    #[error("Member {0} has not joined this bill")]
    NotJoined(MemberId),
    #[error("Exchange rates only apply to JPY bills (this bill is {0})")]
    ExchangeRateNotApplicable(Currency),
    #[error("Receipt import is not configured")]
    ReceiptsUnavailable,
    #[error("Exchange rate lookup is not configured")]
    ExchangeRatesUnavailable,
    #[error("Receipt contained no usable items")]
    EmptyReceipt,
    #[error(transparent)]
    Bill(#[from] BillError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
    #[error(transparent)]
    ExchangeRate(#[from] ExchangeRateError),
}
