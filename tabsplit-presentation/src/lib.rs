#![warn(clippy::uninlined_format_args)]

pub mod history_presenter;
pub mod items_presenter;
pub mod money_format;
pub mod summary_presenter;

pub use history_presenter::HistoryPresenter;
pub use items_presenter::ItemsPresenter;
pub use money_format::{format_amount, format_money, format_rate};
pub use summary_presenter::SummaryPresenter;
