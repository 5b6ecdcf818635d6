use std::fmt::Write as _;

use rust_decimal::Decimal;
use tabsplit_domain::{
    BillSummary, BillWarning, Currency, FeeLine, FeeMode, PersonSummary,
    services::FeeTreatment,
};

use crate::money_format::{format_money, format_rate};

const RULE: &str = "--------------------";

pub struct SummaryPresenter;

impl SummaryPresenter {
    pub fn render(summary: &BillSummary) -> String {
        let mut reply = String::with_capacity(1024);
        let currency = summary.currency;

        let _ = writeln!(&mut reply, "BILL SPLIT SUMMARY #{}", summary.bill_id.0);
        let _ = writeln!(&mut reply, "{RULE}");
        let _ = writeln!(&mut reply, "Currency: {currency}");
        Self::render_totals(&mut reply, summary);
        let _ = writeln!(&mut reply, "Members: {}", summary.people.len());
        let _ = writeln!(&mut reply, "{RULE}");

        for person in &summary.people {
            Self::render_person(&mut reply, person, summary.fee_policy.mode(), currency);
        }

        if !summary.unassigned.is_empty() {
            let _ = writeln!(&mut reply, "Unclaimed items:");
            for item in &summary.unassigned {
                let _ = writeln!(
                    &mut reply,
                    "  • {} {}: {}",
                    item.item_id,
                    item.name,
                    format_money(item.net, currency)
                );
            }
            reply.push('\n');
        }

        let notes: Vec<&BillWarning> = summary
            .warnings
            .iter()
            .filter(|warning| !matches!(warning, BillWarning::OrphanedItem { .. }))
            .collect();
        if !notes.is_empty() {
            let _ = writeln!(&mut reply, "Warnings:");
            for warning in notes {
                let _ = writeln!(&mut reply, "  ! {warning}");
            }
            reply.push('\n');
        }

        let _ = write!(&mut reply, "{RULE}\nPlease transfer your share");
        reply
    }

    fn render_totals(reply: &mut String, summary: &BillSummary) {
        let currency = summary.currency;
        let totals = &summary.totals;
        let mode = summary.fee_policy.mode();

        if totals.fee_lines.is_empty() {
            let _ = writeln!(reply, "Total: {}", format_money(totals.grand_total, currency));
        } else if mode == FeeMode::BothInclusive {
            let _ = writeln!(
                reply,
                "Total: {} ({})",
                format_money(totals.grand_total, currency),
                mode.label()
            );
            for line in &totals.fee_lines {
                let _ = writeln!(reply, "  {}", fee_line(line, currency));
            }
        } else {
            let _ = writeln!(reply, "Subtotal: {}", format_money(totals.item_subtotal, currency));
            for line in &totals.fee_lines {
                let _ = writeln!(reply, "{}", fee_line(line, currency));
            }
            let _ = writeln!(
                reply,
                "Grand total: {} ({})",
                format_money(totals.grand_total, currency),
                mode.label()
            );
        }

        if let (Some(rate), Some(converted)) = (summary.exchange_rate, totals.converted_grand_total)
        {
            let _ = writeln!(
                reply,
                "Rate: {}1 = {}",
                currency.symbol(),
                format_exchange_rate(rate)
            );
            let _ = writeln!(
                reply,
                "Total ({}): {}",
                Currency::Thb,
                format_money(converted, Currency::Thb)
            );
        }
    }

    fn render_person(reply: &mut String, person: &PersonSummary, mode: FeeMode, currency: Currency) {
        let tag = if person.participant.is_guest() { " (guest)" } else { "" };
        let _ = writeln!(reply, "{}{tag}", person.participant.display_name());
        if !person.has_items() {
            let _ = writeln!(reply, "  No items picked\n");
            return;
        }

        for share in &person.shares {
            let split = if share.split_count > 1 {
                format!(" ÷{}", share.split_count)
            } else {
                String::new()
            };
            let _ = writeln!(
                reply,
                "  • {}: {}{split}",
                share.item_name,
                format_money(share.share, currency)
            );
        }

        if !person.fee_lines.is_empty() || mode != FeeMode::NoFees {
            let _ = writeln!(reply, "  Items: {}", format_money(person.item_subtotal, currency));
        }
        for line in &person.fee_lines {
            let _ = writeln!(reply, "  {}", fee_line(line, currency));
        }
        let _ = writeln!(reply, "  Pay: {}", format_money(person.payable, currency));
        if let Some(converted) = person.converted_payable {
            let _ = writeln!(reply, "  (≈ {})", format_money(converted, Currency::Thb));
        }
        reply.push('\n');
    }
}

fn fee_line(line: &FeeLine, currency: Currency) -> String {
    let amount = format_money(line.amount, currency);
    match line.treatment {
        FeeTreatment::Added => {
            format!("+ {} {}%: {amount}", line.component, format_rate(line.rate))
        }
        FeeTreatment::Embedded => {
            format!("(includes {} {}%: {amount})", line.component, format_rate(line.rate))
        }
    }
}

fn format_exchange_rate(rate: Decimal) -> String {
    format!("{}{:.4}", Currency::Thb.symbol(), rate.round_dp(4))
}
