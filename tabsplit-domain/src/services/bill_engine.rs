use crate::{
    bill::Bill,
    services::{
        ClaimAggregator, DiscountNormalizer, MoneyContext, PersonTotaler, PricedItem,
        RoundingMode, SummaryBuilder,
    },
    summary::{BillSummary, BillWarning},
};

/// Pure computation of a bill summary from a bill snapshot.
///
/// Runs discount normalization, claim aggregation, per-person totals and
/// summary assembly in that order. Has no state besides its rounding mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct BillEngine {
    rounding_mode: RoundingMode,
}

impl BillEngine {
    pub fn new(rounding_mode: RoundingMode) -> Self {
        Self { rounding_mode }
    }

    pub fn compute(&self, bill: &Bill) -> BillSummary {
        let context =
            MoneyContext::for_currency(bill.currency()).with_rounding_mode(self.rounding_mode);
        let normalizer = DiscountNormalizer::new(context);
        let policy = bill.effective_fee_policy();

        let mut warnings = Vec::new();
        let priced: Vec<PricedItem<'_>> = bill
            .items()
            .iter()
            .map(|item| {
                let normalized = normalizer.normalize(item.gross(), item.discount());
                if let Some(discount) = item.discount().filter(|_| normalized.malformed) {
                    warnings.push(BillWarning::MalformedDiscount {
                        item_id: item.id(),
                        name: item.name().to_string(),
                        gross: item.gross(),
                        discount: *discount,
                        net: normalized.net,
                    });
                }
                PricedItem {
                    item,
                    net: normalized.net,
                }
            })
            .collect();

        let allocation = ClaimAggregator.aggregate(&priced);

        let totaler = PersonTotaler::new(&policy, context).with_exchange_rate(bill.exchange_rate());
        let people = bill
            .participants()
            .iter()
            .map(|participant| {
                totaler.total(participant, allocation.shares_for(participant.claimant()))
            })
            .collect();

        let summary = SummaryBuilder::new(bill.id(), bill.currency(), &policy, context)
            .with_exchange_rate(bill.exchange_rate())
            .build(people, &allocation, warnings);

        tracing::debug!(
            bill_id = bill.id().0,
            participant_count = summary.people.len(),
            item_count = bill.items().len(),
            grand_total = %summary.totals.grand_total,
            warning_count = summary.warnings.len(),
            "Bill summary computed"
        );

        summary
    }
}
