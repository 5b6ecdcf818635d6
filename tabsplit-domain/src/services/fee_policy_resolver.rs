use rust_decimal::Decimal;

use crate::{
    error::FeePolicyError,
    model::{FeeComponent, FeeMode, FeePolicy, FeeSuggestion, Money},
};

/// Whether a fee is added to what a participant pays or already inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeTreatment {
    Added,
    Embedded,
}

/// How each fee component behaves under a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedFees {
    pub service_charge: Option<FeeTreatment>,
    pub vat: Option<FeeTreatment>,
    /// Whether the payable amount is larger than the item subtotal.
    pub increases_payable: bool,
}

/// Exact (unrounded) fee amounts for one subtotal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeAmount {
    pub component: FeeComponent,
    pub rate: Decimal,
    pub amount: Money,
    pub treatment: FeeTreatment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub subtotal: Money,
    pub fees: Vec<FeeAmount>,
    pub payable: Money,
}

/// Maps fee mode tokens to formulas.
pub struct FeePolicyResolver;

impl FeePolicyResolver {
    /// Resolves a canonical mode token or one of its short aliases.
    ///
    /// Unknown tokens are rejected, never guessed.
    pub fn resolve_mode(token: &str) -> Result<FeeMode, FeePolicyError> {
        let normalized = token.trim().to_ascii_lowercase();
        let mode = match normalized.as_str() {
            "both_inclusive" | "both_inc" | "inclusive" | "inc" => FeeMode::BothInclusive,
            "sc_exclusive_vat_inclusive" | "sc_exc" | "sc_exclusive" => {
                FeeMode::ScExclusiveVatInclusive
            }
            "both_exclusive" | "both_exc" | "exclusive" | "exc" => FeeMode::BothExclusive,
            "none" | "no_fees" => FeeMode::NoFees,
            _ => {
                tracing::warn!(token = %token, "Unrecognized fee mode token");
                return Err(FeePolicyError::InvalidMode {
                    token: token.to_string(),
                });
            }
        };
        Ok(mode)
    }

    /// Builds a policy from user-supplied rates and an optional mode token.
    ///
    /// Zero rates commit `none` whatever the token says; otherwise the token is
    /// required.
    pub fn policy(
        service_charge_rate: Decimal,
        vat_rate: Decimal,
        mode_token: Option<&str>,
    ) -> Result<FeePolicy, FeePolicyError> {
        if service_charge_rate.is_zero() && vat_rate.is_zero() {
            if let Some(token) = mode_token {
                Self::resolve_mode(token)?;
            }
            return Ok(FeePolicy::none());
        }

        let Some(token) = mode_token else {
            return Err(FeePolicyError::MissingMode);
        };
        FeePolicy::try_new(Self::resolve_mode(token)?, service_charge_rate, vat_rate)
    }

    /// Commits a receipt suggestion. Missing rates count as zero.
    pub fn confirm(suggestion: &FeeSuggestion) -> Result<FeePolicy, FeePolicyError> {
        Self::policy(
            suggestion.service_charge_rate.unwrap_or(Decimal::ZERO),
            suggestion.vat_rate.unwrap_or(Decimal::ZERO),
            suggestion.mode_hint.as_deref(),
        )
    }

    pub fn treatment(mode: FeeMode) -> ResolvedFees {
        match mode {
            FeeMode::BothInclusive => ResolvedFees {
                service_charge: Some(FeeTreatment::Embedded),
                vat: Some(FeeTreatment::Embedded),
                increases_payable: false,
            },
            FeeMode::ScExclusiveVatInclusive => ResolvedFees {
                service_charge: Some(FeeTreatment::Added),
                vat: Some(FeeTreatment::Embedded),
                increases_payable: true,
            },
            FeeMode::BothExclusive => ResolvedFees {
                service_charge: Some(FeeTreatment::Added),
                vat: Some(FeeTreatment::Added),
                increases_payable: true,
            },
            FeeMode::NoFees => ResolvedFees {
                service_charge: None,
                vat: None,
                increases_payable: false,
            },
        }
    }

    /// Applies the policy to a subtotal at full precision.
    ///
    /// Fee lines with a zero rate are omitted.
    pub fn apply(policy: &FeePolicy, subtotal: Money) -> FeeBreakdown {
        let sc = policy.service_charge_rate() / Decimal::ONE_HUNDRED;
        let vat = policy.vat_rate() / Decimal::ONE_HUNDRED;

        let (sc_amount, vat_amount, payable) = match policy.mode() {
            FeeMode::BothInclusive => {
                let base = subtotal / ((Decimal::ONE + sc) * (Decimal::ONE + vat));
                let sc_amount = base * sc;
                let vat_amount = (base + sc_amount) * vat;
                (sc_amount, vat_amount, subtotal)
            }
            FeeMode::ScExclusiveVatInclusive => {
                let sc_amount = subtotal * sc;
                let total = subtotal + sc_amount;
                let vat_amount = total - total / (Decimal::ONE + vat);
                (sc_amount, vat_amount, total)
            }
            FeeMode::BothExclusive => {
                let sc_amount = subtotal * sc;
                let vat_amount = (subtotal + sc_amount) * vat;
                (sc_amount, vat_amount, subtotal + sc_amount + vat_amount)
            }
            FeeMode::NoFees => {
                return FeeBreakdown {
                    subtotal,
                    fees: Vec::new(),
                    payable: subtotal,
                };
            }
        };

        let resolved = Self::treatment(policy.mode());
        let fees = [
            (FeeComponent::ServiceCharge, resolved.service_charge, sc_amount),
            (FeeComponent::Vat, resolved.vat, vat_amount),
        ]
        .into_iter()
        .filter_map(|(component, treatment, amount)| {
            let rate = policy.rate(component);
            if rate.is_zero() {
                return None;
            }
            Some(FeeAmount {
                component,
                rate,
                amount,
                treatment: treatment?,
            })
        })
        .collect();

        FeeBreakdown {
            subtotal,
            fees,
            payable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MoneyContext;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal")
    }

    fn money(value: &str) -> Money {
        Money::from_decimal(dec(value))
    }

    fn policy(mode: FeeMode, sc: &str, vat: &str) -> FeePolicy {
        FeePolicy::try_new(mode, dec(sc), dec(vat)).expect("valid policy")
    }

    fn rounded(amount: Money) -> Money {
        MoneyContext::default().round(amount)
    }

    #[rstest]
    #[case("both_inclusive", FeeMode::BothInclusive)]
    #[case("both_inc", FeeMode::BothInclusive)]
    #[case("inc", FeeMode::BothInclusive)]
    #[case("sc_exclusive_vat_inclusive", FeeMode::ScExclusiveVatInclusive)]
    #[case("SC_EXC", FeeMode::ScExclusiveVatInclusive)]
    #[case("sc_exclusive", FeeMode::ScExclusiveVatInclusive)]
    #[case("both_exclusive", FeeMode::BothExclusive)]
    #[case(" exc ", FeeMode::BothExclusive)]
    #[case("none", FeeMode::NoFees)]
    fn resolves_mode_tokens(#[case] token: &str, #[case] expected: FeeMode) {
        assert_eq!(FeePolicyResolver::resolve_mode(token), Ok(expected));
    }

    #[rstest]
    #[case::typo("both_inclusiv")]
    #[case::empty("")]
    #[case::partial_guess("vat_exclusive")]
    fn rejects_unknown_mode_tokens(#[case] token: &str) {
        assert_eq!(
            FeePolicyResolver::resolve_mode(token),
            Err(FeePolicyError::InvalidMode {
                token: token.to_string()
            })
        );
    }

    #[test]
    fn every_canonical_token_round_trips() {
        for mode in FeeMode::ALL {
            assert_eq!(FeePolicyResolver::resolve_mode(mode.token()), Ok(mode));
        }
    }

    #[test]
    fn zero_rates_commit_no_fees() {
        let policy = FeePolicyResolver::policy(Decimal::ZERO, Decimal::ZERO, Some("both_exc"))
            .expect("zero rates are valid");
        assert_eq!(policy, FeePolicy::none());
    }

    #[test]
    fn non_zero_rates_need_a_mode() {
        assert_eq!(
            FeePolicyResolver::policy(dec("10"), dec("7"), None),
            Err(FeePolicyError::MissingMode)
        );
    }

    #[test]
    fn suggestion_with_bad_hint_is_rejected() {
        let suggestion = FeeSuggestion {
            service_charge_rate: Some(dec("10")),
            vat_rate: Some(dec("7")),
            mode_hint: Some("maybe_inclusive".to_string()),
        };
        assert!(matches!(
            FeePolicyResolver::confirm(&suggestion),
            Err(FeePolicyError::InvalidMode { .. })
        ));
    }

    #[test]
    fn both_exclusive_worked_example() {
        let breakdown =
            FeePolicyResolver::apply(&policy(FeeMode::BothExclusive, "10", "7"), money("500"));

        assert_eq!(breakdown.fees.len(), 2);
        assert_eq!(breakdown.fees[0].component, FeeComponent::ServiceCharge);
        assert_eq!(breakdown.fees[0].amount, money("50"));
        assert_eq!(breakdown.fees[0].treatment, FeeTreatment::Added);
        assert_eq!(breakdown.fees[1].component, FeeComponent::Vat);
        assert_eq!(breakdown.fees[1].amount, money("38.50"));
        assert_eq!(breakdown.payable, money("588.50"));
    }

    #[test]
    fn both_inclusive_pays_subtotal_and_extracts_embedded_fees() {
        let breakdown =
            FeePolicyResolver::apply(&policy(FeeMode::BothInclusive, "10", "7"), money("588.50"));

        assert_eq!(breakdown.payable, money("588.50"));
        assert_eq!(rounded(breakdown.fees[0].amount), money("50"));
        assert_eq!(rounded(breakdown.fees[1].amount), money("38.50"));
        assert!(
            breakdown
                .fees
                .iter()
                .all(|fee| fee.treatment == FeeTreatment::Embedded)
        );
    }

    #[test]
    fn sc_exclusive_adds_service_charge_and_embeds_vat() {
        let breakdown = FeePolicyResolver::apply(
            &policy(FeeMode::ScExclusiveVatInclusive, "10", "7"),
            money("535"),
        );

        assert_eq!(breakdown.payable, money("588.5"));
        assert_eq!(breakdown.fees[0].amount, money("53.5"));
        assert_eq!(breakdown.fees[0].treatment, FeeTreatment::Added);
        assert_eq!(rounded(breakdown.fees[1].amount), money("38.50"));
        assert_eq!(breakdown.fees[1].treatment, FeeTreatment::Embedded);
    }

    #[test]
    fn no_fees_mode_has_no_lines() {
        let breakdown = FeePolicyResolver::apply(&FeePolicy::none(), money("123.45"));
        assert!(breakdown.fees.is_empty());
        assert_eq!(breakdown.payable, money("123.45"));
    }

    #[test]
    fn zero_rate_component_is_omitted() {
        let breakdown =
            FeePolicyResolver::apply(&policy(FeeMode::BothExclusive, "0", "7"), money("100"));
        assert_eq!(breakdown.fees.len(), 1);
        assert_eq!(breakdown.fees[0].component, FeeComponent::Vat);
        assert_eq!(breakdown.payable, money("107"));
    }

    #[rstest]
    #[case(FeeMode::BothInclusive, false)]
    #[case(FeeMode::ScExclusiveVatInclusive, true)]
    #[case(FeeMode::BothExclusive, true)]
    #[case(FeeMode::NoFees, false)]
    fn treatment_reports_payable_increase(#[case] mode: FeeMode, #[case] increases: bool) {
        assert_eq!(FeePolicyResolver::treatment(mode).increases_payable, increases);
    }
}
