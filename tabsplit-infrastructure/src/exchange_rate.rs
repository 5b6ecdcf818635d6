use rust_decimal::Decimal;
use tabsplit_application::{ExchangeRateError, ExchangeRateProvider};
use tabsplit_domain::Currency;

/// Exchange rate provider backed by one configured JPY to THB rate.
#[derive(Debug, Clone, Copy)]
pub struct FixedExchangeRate {
    jpy_to_thb: Decimal,
}

impl FixedExchangeRate {
    pub fn new(jpy_to_thb: Decimal) -> Self {
        Self { jpy_to_thb }
    }
}

impl ExchangeRateProvider for FixedExchangeRate {
    fn rate(&self, from: Currency, to: Currency) -> Result<Decimal, ExchangeRateError> {
        match (from, to) {
            (a, b) if a == b => Ok(Decimal::ONE),
            (Currency::Jpy, Currency::Thb) => Ok(self.jpy_to_thb),
            (Currency::Thb, Currency::Jpy) if !self.jpy_to_thb.is_zero() => {
                Ok(Decimal::ONE / self.jpy_to_thb)
            }
            _ => Err(ExchangeRateError::Unavailable { from, to }),
        }
    }
}
