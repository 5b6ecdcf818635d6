//! Rounding rules for amounts leaving the engine.
//!
//! Shares, subtotals and fee amounts are carried at full `Decimal` precision
//! through every stage. Only values that are shown or paid are quantized, and
//! always through a [`MoneyContext`] so that one discipline is applied to the
//! whole bill.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{Currency, Money};

/// Rounding mode for quantizing amounts to the minor unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (e.g., 0.125 -> 0.13).
    HalfUp,
    /// Round half to nearest even (banker's rounding, 0.125 -> 0.12).
    #[default]
    HalfEven,
}

impl RoundingMode {
    pub fn token(self) -> &'static str {
        match self {
            Self::HalfUp => "half_up",
            Self::HalfEven => "half_even",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "half_up" | "halfup" => Some(Self::HalfUp),
            "half_even" | "halfeven" | "bankers" => Some(Self::HalfEven),
            _ => None,
        }
    }

    fn strategy(self) -> RoundingStrategy {
        match self {
            Self::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            Self::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Scale and rounding mode used to quantize money.
///
/// # Example
/// ```
/// use tabsplit_domain::{Currency, Money, services::{MoneyContext, RoundingMode}};
///
/// let ctx = MoneyContext::for_currency(Currency::Thb);
/// assert_eq!(ctx.rounding_mode, RoundingMode::HalfEven);
/// assert_eq!(ctx.round(Money::new(12345, 3)), Money::new(1234, 2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoneyContext {
    /// Number of decimal places of the minor unit (2 for THB and JPY).
    pub scale: u32,
    pub rounding_mode: RoundingMode,
}

impl MoneyContext {
    pub fn for_currency(currency: Currency) -> Self {
        Self {
            scale: currency.minor_unit_scale(),
            rounding_mode: RoundingMode::default(),
        }
    }

    pub fn with_rounding_mode(self, rounding_mode: RoundingMode) -> Self {
        Self {
            rounding_mode,
            ..self
        }
    }

    /// Smallest representable amount under this context.
    pub fn atomic_unit(self) -> Money {
        Money::from_decimal(Decimal::new(1, self.scale))
    }

    pub fn round(self, amount: Money) -> Money {
        Money::from_decimal(self.round_decimal(amount.as_decimal()))
    }

    pub fn round_decimal(self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.scale, self.rounding_mode.strategy())
    }
}

impl Default for MoneyContext {
    fn default() -> Self {
        Self {
            scale: 2,
            rounding_mode: RoundingMode::default(),
        }
    }
}
