use rust_decimal::Decimal;

use crate::{
    model::{Discount, Money},
    services::MoneyContext,
};

/// Net price of one item after its discount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizedPrice {
    pub net: Money,
    /// The discount was negative and ignored, or exceeded the gross price and
    /// the net price was clamped to zero.
    pub malformed: bool,
}

/// Turns gross prices and discounts into net prices at minor-unit precision.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscountNormalizer {
    context: MoneyContext,
}

impl DiscountNormalizer {
    pub fn new(context: MoneyContext) -> Self {
        Self { context }
    }

    /// Percentage discounts apply to the gross price, absolute discounts are
    /// subtracted directly. The result never goes below zero and never rises
    /// above the gross price.
    ///
    /// Normalizing an already-net price with no discount returns it unchanged.
    pub fn normalize(&self, gross: Money, discount: Option<&Discount>) -> NormalizedPrice {
        let discounted = match discount {
            None => gross,
            Some(discount) if is_negative(discount) => {
                tracing::debug!(gross = %gross, %discount, "Ignoring negative discount");
                return NormalizedPrice {
                    net: self.context.round(gross.non_negative()),
                    malformed: true,
                };
            }
            Some(Discount::Percent(percent)) => {
                gross * ((Decimal::ONE_HUNDRED - *percent) / Decimal::ONE_HUNDRED)
            }
            Some(Discount::Amount(amount)) => gross - *amount,
        };

        let malformed = discounted.is_negative();
        if malformed {
            tracing::debug!(
                gross = %gross,
                discounted = %discounted,
                "Discount exceeds gross price, clamping net price to zero"
            );
        }

        NormalizedPrice {
            net: self.context.round(discounted.non_negative()),
            malformed,
        }
    }
}

fn is_negative(discount: &Discount) -> bool {
    match discount {
        Discount::Percent(percent) => percent.is_sign_negative() && !percent.is_zero(),
        Discount::Amount(amount) => amount.is_negative(),
    }
}
