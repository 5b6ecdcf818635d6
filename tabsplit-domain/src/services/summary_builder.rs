use rust_decimal::Decimal;

use crate::{
    model::{BillId, Currency, FeePolicy, Money},
    services::{FeePolicyResolver, MoneyContext, claim_aggregator::ClaimAllocation},
    summary::{
        BillSummary, BillTotals, BillWarning, FeeLine, PersonSummary, Reconciliation,
        UnassignedItem,
    },
};

/// Assembles per-person results into a summary and reconciles them against
/// the bill-level total.
pub struct SummaryBuilder<'a> {
    bill_id: BillId,
    currency: Currency,
    policy: &'a FeePolicy,
    context: MoneyContext,
    exchange_rate: Option<Decimal>,
}

impl<'a> SummaryBuilder<'a> {
    pub fn new(bill_id: BillId, currency: Currency, policy: &'a FeePolicy, context: MoneyContext) -> Self {
        Self {
            bill_id,
            currency,
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

    pub fn build(
        &self,
        people: Vec<PersonSummary>,
        allocation: &ClaimAllocation<'_>,
        mut warnings: Vec<BillWarning>,
    ) -> BillSummary {
        let unassigned: Vec<UnassignedItem> = allocation
            .unassigned
            .iter()
            .map(|priced| UnassignedItem {
                item_id: priced.item.id(),
                name: priced.item.name().to_string(),
                net: priced.net,
            })
            .collect();
        warnings.extend(unassigned.iter().map(|item| BillWarning::OrphanedItem {
            item_id: item.item_id,
            name: item.name.clone(),
            net: item.net,
        }));

        let totals = self.totals(allocation);
        let reconciliation = self.reconcile(&people, allocation);
        if !reconciliation.is_within_tolerance() {
            tracing::warn!(
                bill_id = self.bill_id.0,
                expected = %reconciliation.expected,
                actual = %reconciliation.actual,
                tolerance = %reconciliation.tolerance,
                "Per-person totals drift from bill total"
            );
            warnings.push(BillWarning::Reconciliation(reconciliation));
        }

        BillSummary {
            bill_id: self.bill_id,
            currency: self.currency,
            fee_policy: *self.policy,
            exchange_rate: self.exchange_rate,
            people,
            totals,
            unassigned,
            reconciliation,
            warnings,
        }
    }

    fn totals(&self, allocation: &ClaimAllocation<'_>) -> BillTotals {
        let breakdown = FeePolicyResolver::apply(self.policy, allocation.item_subtotal);

        BillTotals {
            item_subtotal: self.context.round(allocation.item_subtotal),
            unassigned_subtotal: self.context.round(allocation.unassigned_subtotal()),
            fee_lines: breakdown
                .fees
                .iter()
                .map(|fee| FeeLine {
                    component: fee.component,
                    rate: fee.rate,
                    amount: self.context.round(fee.amount),
                    treatment: fee.treatment,
                })
                .collect(),
            grand_total: self.context.round(breakdown.payable),
            converted_grand_total: self
                .exchange_rate
                .map(|rate| self.context.round(breakdown.payable * rate)),
        }
    }

    /// Expected total is the fee formula applied once to everything that was
    /// claimed. Each payable may drift by half a minor unit, so the tolerance
    /// grows by one minor unit per participant.
    fn reconcile(&self, people: &[PersonSummary], allocation: &ClaimAllocation<'_>) -> Reconciliation {
        let expected = FeePolicyResolver::apply(self.policy, allocation.claimed_subtotal()).payable;
        let actual: Money = people.iter().map(|person| person.payable).sum();
        let participant_count = people.len().max(1) as u64;

        Reconciliation {
            expected: self.context.round(expected),
            actual,
            tolerance: self.context.atomic_unit() * Decimal::from(participant_count),
        }
    }
}
