#![warn(clippy::uninlined_format_args)]

pub mod bill_service;
pub mod error;
pub mod model;
pub mod ports;
pub mod receipt;

pub use bill_service::BillService;
pub use error::{BillCommandError, ExchangeRateError, ReceiptError, RepositoryError};
pub use model::{BillHistoryEntry, ReceiptImport};
pub use ports::{BillRepository, Clock, ExchangeRateProvider, ReceiptExtractor, SystemClock};
pub use receipt::{ReceiptImage, ReceiptSuggestion, SuggestedItem, VettedReceipt};
