use std::{borrow::Cow, env, str::FromStr};

use rust_decimal::Decimal;
use tabsplit_domain::RoundingMode;

pub const ROUNDING_VAR: &str = "TABSPLIT_ROUNDING";
pub const EXCHANGE_RATE_VAR: &str = "TABSPLIT_EXCHANGE_RATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub rounding_mode: RoundingMode,
    /// JPY to THB rate applied to snapshots that carry none.
    pub exchange_rate: Option<Decimal>,
}

impl AppConfig {
    /// Reads the environment after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, Cow<'static, str>> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Cow<'static, str>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rounding_mode = match lookup(ROUNDING_VAR).filter(|value| !value.trim().is_empty()) {
            Some(value) => RoundingMode::from_token(&value).ok_or_else(|| {
                format!("{ROUNDING_VAR} must be half_even or half_up (found '{value}')")
            })?,
            None => RoundingMode::default(),
        };

        let exchange_rate = match lookup(EXCHANGE_RATE_VAR).filter(|value| !value.trim().is_empty()) {
            Some(value) => {
                let rate = Decimal::from_str(value.trim())
                    .map_err(|_| format!("{EXCHANGE_RATE_VAR} is not a number: '{value}'"))?;
                if rate <= Decimal::ZERO {
                    return Err(format!("{EXCHANGE_RATE_VAR} must be positive (found {rate})").into());
                }
                Some(rate)
            }
            None => None,
        };

        Ok(Self {
            rounding_mode,
            exchange_rate,
        })
    }
}
