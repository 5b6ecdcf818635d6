use std::fmt::Write as _;

use tabsplit_domain::{Bill, Claimant, Money};

use crate::money_format::format_money;

pub struct ItemsPresenter;

impl ItemsPresenter {
    /// Lists every item with who claimed it, then the bill total before fees.
    pub fn render(bill: &Bill) -> String {
        if bill.items().is_empty() {
            return "No items yet.".to_string();
        }

        let currency = bill.currency();
        let mut reply = String::with_capacity(512);
        let _ = writeln!(&mut reply, "Bill items ({currency})");

        for item in bill.items() {
            let claimed = if item.is_unassigned() {
                "unclaimed".to_string()
            } else {
                item.claimants()
                    .iter()
                    .map(|claimant| claimant_name(bill, claimant))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            let discount = item
                .discount()
                .map(|discount| format!(" ({discount})"))
                .unwrap_or_default();
            let _ = writeln!(
                &mut reply,
                "{} {} {}{discount} -> {claimed}",
                item.id(),
                item.name(),
                format_money(item.gross(), currency)
            );
        }

        let total: Money = bill.items().iter().map(|item| item.gross()).sum();
        let _ = write!(&mut reply, "Total: {}", format_money(total, currency));
        reply
    }
}

fn claimant_name(bill: &Bill, claimant: &Claimant) -> String {
    bill.participant(claimant)
        .map(|participant| participant.display_name().to_string())
        .unwrap_or_else(|| claimant.to_string())
}
