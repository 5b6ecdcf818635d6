use std::fmt::Write as _;

use tabsplit_application::BillHistoryEntry;
use time::macros::format_description;

use crate::money_format::format_money;

pub struct HistoryPresenter;

impl HistoryPresenter {
    pub fn render(entries: &[BillHistoryEntry]) -> String {
        if entries.is_empty() {
            return "No past bills in this chat.".to_string();
        }

        let date_format = format_description!("[year]-[month]-[day] [hour]:[minute]");
        let mut reply = String::with_capacity(64 * entries.len() + 16);
        let _ = write!(&mut reply, "Past bills");
        for entry in entries {
            let date = entry
                .finalized_at
                .and_then(|at| at.format(date_format).ok())
                .unwrap_or_else(|| "-".to_string());
            let _ = write!(
                &mut reply,
                "\n{date}  {}  {} items, {} people",
                format_money(entry.grand_total, entry.currency),
                entry.item_count,
                entry.participant_count
            );
        }
        reply
    }
}
