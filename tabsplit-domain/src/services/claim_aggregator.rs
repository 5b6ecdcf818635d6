use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::model::{Claimant, Item, Money};

/// An item paired with its normalized net price.
#[derive(Clone, Copy, Debug)]
pub struct PricedItem<'a> {
    pub item: &'a Item,
    pub net: Money,
}

/// One claimant's portion of one item, unrounded.
#[derive(Clone, Copy, Debug)]
pub struct ItemShare<'a> {
    pub item: &'a Item,
    pub amount: Money,
    pub split_count: usize,
}

#[derive(Debug, Default)]
pub struct ClaimAllocation<'a> {
    /// Shares per claimant, in order of first claim.
    pub shares: IndexMap<&'a Claimant, Vec<ItemShare<'a>>>,
    /// Items nobody claimed.
    pub unassigned: Vec<PricedItem<'a>>,
    /// Net total of every item, claimed or not.
    pub item_subtotal: Money,
}

impl<'a> ClaimAllocation<'a> {
    pub fn shares_for(&self, claimant: &Claimant) -> &[ItemShare<'a>] {
        self.shares.get(claimant).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unassigned_subtotal(&self) -> Money {
        self.unassigned.iter().map(|priced| priced.net).sum()
    }

    pub fn claimed_subtotal(&self) -> Money {
        self.item_subtotal - self.unassigned_subtotal()
    }
}

/// Splits every item equally among its claimants.
pub struct ClaimAggregator;

impl ClaimAggregator {
    pub fn aggregate<'a>(&self, items: &[PricedItem<'a>]) -> ClaimAllocation<'a> {
        let mut allocation = ClaimAllocation::default();

        for priced in items {
            allocation.item_subtotal += priced.net;

            let claimants = priced.item.claimants();
            let Some(amounts) = split_evenly(priced.net, claimants.len()) else {
                tracing::debug!(
                    item_id = priced.item.id().0,
                    net = %priced.net,
                    "Item has no claimants"
                );
                allocation.unassigned.push(*priced);
                continue;
            };

            for (claimant, amount) in claimants.iter().zip(amounts) {
                allocation.shares.entry(claimant).or_default().push(ItemShare {
                    item: priced.item,
                    amount,
                    split_count: claimants.len(),
                });
            }
        }

        allocation
    }
}

/// Splits `net` into `count` shares that sum exactly to `net`.
///
/// Shares use full decimal precision; the last share absorbs the residue left
/// by non-terminating division. Returns `None` when `count` is zero.
pub fn split_evenly(net: Money, count: usize) -> Option<Vec<Money>> {
    if count == 0 {
        return None;
    }

    let divisor = Decimal::from(count as u64);
    let share = net / divisor;
    let mut shares = vec![share; count];
    if let Some(last) = shares.last_mut() {
        *last = net - share * Decimal::from(count as u64 - 1);
    }
    Some(shares)
}
