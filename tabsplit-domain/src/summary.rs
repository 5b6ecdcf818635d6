use std::fmt;

use rust_decimal::Decimal;

use crate::{
    model::{BillId, Claimant, Currency, Discount, FeeComponent, FeePolicy, ItemId, Money, Participant},
    services::FeeTreatment,
};

/// A fee amount as shown to people, rounded to the minor unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeLine {
    pub component: FeeComponent,
    pub rate: Decimal,
    pub amount: Money,
    pub treatment: FeeTreatment,
}

/// One item on a participant's tab.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareLine {
    pub item_id: ItemId,
    pub item_name: String,
    pub share: Money,
    /// Number of claimants the item was split between.
    pub split_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonSummary {
    pub participant: Participant,
    pub shares: Vec<ShareLine>,
    pub item_subtotal: Money,
    pub fee_lines: Vec<FeeLine>,
    pub payable: Money,
    /// Payable in the conversion currency, when the bill carries a rate.
    pub converted_payable: Option<Money>,
}

impl PersonSummary {
    pub fn has_items(&self) -> bool {
        !self.shares.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnassignedItem {
    pub item_id: ItemId,
    pub name: String,
    pub net: Money,
}

/// Bill-level totals computed straight from the items, without per-person decomposition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillTotals {
    /// Net total of every item, including unassigned ones.
    pub item_subtotal: Money,
    pub unassigned_subtotal: Money,
    pub fee_lines: Vec<FeeLine>,
    pub grand_total: Money,
    pub converted_grand_total: Option<Money>,
}

/// Cross-check of the per-person payables against the bill-level total of the
/// claimed items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub expected: Money,
    pub actual: Money,
    pub tolerance: Money,
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "per-person totals {} vs bill total {} (difference {}, tolerance {})",
            self.actual,
            self.expected,
            self.difference(),
            self.tolerance
        )
    }
}

impl Reconciliation {
    pub fn difference(&self) -> Money {
        self.actual - self.expected
    }

    pub fn is_within_tolerance(&self) -> bool {
        self.difference().abs() <= self.tolerance
    }
}

/// Non-fatal conditions found while computing a bill.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BillWarning {
    #[error("Item {item_id} '{name}' ({net}) has no claimants and is not in anyone's total")]
    OrphanedItem {
        item_id: ItemId,
        name: String,
        net: Money,
    },
    #[error("Discount {discount} on item {item_id} '{name}' does not fit its price {gross}; net price set to {net}")]
    MalformedDiscount {
        item_id: ItemId,
        name: String,
        gross: Money,
        discount: Discount,
        net: Money,
    },
    #[error("Rounding drift beyond tolerance: {0}")]
    Reconciliation(Reconciliation),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillSummary {
    pub bill_id: BillId,
    pub currency: Currency,
    pub fee_policy: FeePolicy,
    /// Rate to convert the bill currency into THB, for JPY bills.
    pub exchange_rate: Option<Decimal>,
    pub people: Vec<PersonSummary>,
    pub totals: BillTotals,
    pub unassigned: Vec<UnassignedItem>,
    pub reconciliation: Reconciliation,
    pub warnings: Vec<BillWarning>,
}

impl BillSummary {
    pub fn person(&self, claimant: &Claimant) -> Option<&PersonSummary> {
        self.people
            .iter()
            .find(|person| person.participant.claimant() == claimant)
    }

    pub fn total_payable(&self) -> Money {
        self.people.iter().map(|person| person.payable).sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
