#![warn(clippy::uninlined_format_args)]

pub mod exchange_rate;
pub mod receipt_payload;
pub mod repository;
pub mod snapshot;

pub use exchange_rate::FixedExchangeRate;
pub use receipt_payload::{
    ReceiptPayloadError, ReceiptTextSource, TextReceiptExtractor, parse_receipt_payload,
};
pub use repository::InMemoryBillRepository;
pub use snapshot::{BillSnapshot, SnapshotError};
