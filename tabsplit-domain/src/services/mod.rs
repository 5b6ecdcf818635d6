pub mod bill_engine;
pub mod claim_aggregator;
pub mod discount_normalizer;
pub mod fee_policy_resolver;
pub mod money_context;
pub mod person_totaler;
pub mod summary_builder;

pub use bill_engine::BillEngine;
pub use claim_aggregator::{ClaimAggregator, ClaimAllocation, ItemShare, PricedItem, split_evenly};
pub use discount_normalizer::{DiscountNormalizer, NormalizedPrice};
pub use fee_policy_resolver::{
    FeeAmount, FeeBreakdown, FeePolicyResolver, FeeTreatment, ResolvedFees,
};
pub use money_context::{MoneyContext, RoundingMode};
pub use person_totaler::PersonTotaler;
pub use summary_builder::SummaryBuilder;
