use rust_decimal::Decimal;

use crate::{
    model::{FeePolicy, Money, Participant},
    services::{FeePolicyResolver, MoneyContext, claim_aggregator::ItemShare},
    summary::{FeeLine, PersonSummary, ShareLine},
};

/// Turns a participant's unrounded item shares into what they pay.
pub struct PersonTotaler<'a> {
    policy: &'a FeePolicy,
    context: MoneyContext,
    exchange_rate: Option<Decimal>,
}

impl<'a> PersonTotaler<'a> {
    pub fn new(policy: &'a FeePolicy, context: MoneyContext) -> Self {
        Self {
            policy,
            context,
            exchange_rate: None,
        }
    }

    pub fn with_exchange_rate(self, exchange_rate: Option<Decimal>) -> Self {
        Self {
            exchange_rate,
            ..self
        }
    }

    /// Fees are applied to this participant's own subtotal. Shares are summed
    /// unrounded; only the payable amount and the displayed lines are rounded.
    pub fn total(&self, participant: &Participant, shares: &[ItemShare<'_>]) -> PersonSummary {
        let subtotal: Money = shares.iter().map(|share| share.amount).sum();
        let breakdown = FeePolicyResolver::apply(self.policy, subtotal);

        let share_lines = shares
            .iter()
            .map(|share| ShareLine {
                item_id: share.item.id(),
                item_name: share.item.name().to_string(),
                share: self.context.round(share.amount),
                split_count: share.split_count,
            })
            .collect();

        let fee_lines = breakdown
            .fees
            .iter()
            .map(|fee| FeeLine {
                component: fee.component,
                rate: fee.rate,
                amount: self.context.round(fee.amount),
                treatment: fee.treatment,
            })
            .collect();

        PersonSummary {
            participant: participant.clone(),
            shares: share_lines,
            item_subtotal: self.context.round(subtotal),
            fee_lines,
            payable: self.context.round(breakdown.payable),
            converted_payable: self
                .exchange_rate
                .map(|rate| self.context.round(breakdown.payable * rate)),
        }
    }
}
