use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use indexmap::IndexSet;
use rust_decimal::Decimal;

use crate::error::{DiscountError, FeePolicyError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Clamps negative amounts to zero.
    pub fn non_negative(self) -> Self {
        if self.is_negative() { Self::ZERO } else { self }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat the bill lives in. One open bill per chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChatId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillId(pub u64);

/// Sequence number of an item, stable for the lifetime of its bill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to whoever can claim an item.
///
/// Guest names are case-sensitive and only unique within one bill.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Claimant {
    Member(MemberId),
    Guest(String),
}

impl Claimant {
    pub fn guest(name: impl Into<String>) -> Self {
        Self::Guest(name.into())
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

impl fmt::Display for Claimant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(id) => write!(f, "member {id}"),
            Self::Guest(name) => write!(f, "guest '{name}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    claimant: Claimant,
    display_name: String,
}

impl Participant {
    pub fn member(id: MemberId, display_name: impl Into<String>) -> Self {
        Self {
            claimant: Claimant::Member(id),
            display_name: display_name.into(),
        }
    }

    pub fn guest(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            claimant: Claimant::Guest(name.clone()),
            display_name: name,
        }
    }

    pub fn claimant(&self) -> &Claimant {
        &self.claimant
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_guest(&self) -> bool {
        self.claimant.is_guest()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    Thb,
    Jpy,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Thb => "THB",
            Self::Jpy => "JPY",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Thb => "฿",
            Self::Jpy => "¥",
        }
    }

    /// Decimal places of the smallest unit amounts are rounded to.
    pub fn minor_unit_scale(self) -> u32 {
        2
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "THB" => Ok(Self::Thb),
            "JPY" => Ok(Self::Jpy),
            other => Err(format!("unsupported currency '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discount {
    /// Percentage off the gross price (10 means 10%).
    Percent(Decimal),
    /// Fixed amount off the gross price.
    Amount(Money),
}

impl Discount {
    pub fn percent(value: Decimal) -> Result<Self, DiscountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DiscountError::NegativePercent(value));
        }
        Ok(Self::Percent(value))
    }

    pub fn amount(value: Money) -> Result<Self, DiscountError> {
        if value.is_negative() {
            return Err(DiscountError::NegativeAmount(value));
        }
        Ok(Self::Amount(value))
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "-{value}%"),
            Self::Amount(value) => write!(f, "-{value}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    gross: Money,
    discount: Option<Discount>,
    claimants: IndexSet<Claimant>,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, gross: Money, discount: Option<Discount>) -> Self {
        Self {
            id,
            name: name.into(),
            gross,
            discount,
            claimants: IndexSet::new(),
        }
    }

    /// Item whose price was already discount-normalized upstream.
    pub fn with_net_price(id: ItemId, name: impl Into<String>, net: Money) -> Self {
        Self::new(id, name, net, None)
    }

    pub fn with_claimants<I>(mut self, claimants: I) -> Self
    where
        I: IntoIterator<Item = Claimant>,
    {
        self.claimants = claimants.into_iter().collect();
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gross(&self) -> Money {
        self.gross
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn claimants(&self) -> &IndexSet<Claimant> {
        &self.claimants
    }

    pub fn is_claimed_by(&self, claimant: &Claimant) -> bool {
        self.claimants.contains(claimant)
    }

    pub fn is_unassigned(&self) -> bool {
        self.claimants.is_empty()
    }

    pub(crate) fn claimants_mut(&mut self) -> &mut IndexSet<Claimant> {
        &mut self.claimants
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeMode {
    /// Item prices already contain service charge and VAT.
    BothInclusive,
    /// Service charge is added on top; VAT is already inside the result.
    ScExclusiveVatInclusive,
    /// Service charge is added, then VAT on the service-charged amount.
    BothExclusive,
    NoFees,
}

impl FeeMode {
    pub const ALL: [FeeMode; 4] = [
        FeeMode::BothInclusive,
        FeeMode::ScExclusiveVatInclusive,
        FeeMode::BothExclusive,
        FeeMode::NoFees,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::BothInclusive => "both_inclusive",
            Self::ScExclusiveVatInclusive => "sc_exclusive_vat_inclusive",
            Self::BothExclusive => "both_exclusive",
            Self::NoFees => "none",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::BothInclusive => "All inclusive",
            Self::ScExclusiveVatInclusive => "SC on top, VAT included",
            Self::BothExclusive => "SC + VAT on top",
            Self::NoFees => "No fees",
        }
    }
}

impl fmt::Display for FeeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeComponent {
    ServiceCharge,
    Vat,
}

impl FeeComponent {
    pub fn label(self) -> &'static str {
        match self {
            Self::ServiceCharge => "SC",
            Self::Vat => "VAT",
        }
    }
}

impl fmt::Display for FeeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Committed fee configuration of a bill. Rates are percentages in `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeePolicy {
    mode: FeeMode,
    service_charge_rate: Decimal,
    vat_rate: Decimal,
}

impl FeePolicy {
    pub fn try_new(
        mode: FeeMode,
        service_charge_rate: Decimal,
        vat_rate: Decimal,
    ) -> Result<Self, FeePolicyError> {
        validate_rate(FeeComponent::ServiceCharge, service_charge_rate)?;
        validate_rate(FeeComponent::Vat, vat_rate)?;
        Ok(Self {
            mode,
            service_charge_rate,
            vat_rate,
        })
    }

    pub fn none() -> Self {
        Self {
            mode: FeeMode::NoFees,
            service_charge_rate: Decimal::ZERO,
            vat_rate: Decimal::ZERO,
        }
    }

    pub fn mode(&self) -> FeeMode {
        self.mode
    }

    pub fn service_charge_rate(&self) -> Decimal {
        self.service_charge_rate
    }

    pub fn vat_rate(&self) -> Decimal {
        self.vat_rate
    }

    pub fn rate(&self, component: FeeComponent) -> Decimal {
        match component {
            FeeComponent::ServiceCharge => self.service_charge_rate,
            FeeComponent::Vat => self.vat_rate,
        }
    }

    /// True when the policy changes or annotates what anyone pays.
    pub fn has_fees(&self) -> bool {
        self.mode != FeeMode::NoFees
            && (!self.service_charge_rate.is_zero() || !self.vat_rate.is_zero())
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self::none()
    }
}

fn validate_rate(component: FeeComponent, rate: Decimal) -> Result<(), FeePolicyError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        tracing::warn!(component = %component, rate = %rate, "Fee rate rejected");
        return Err(FeePolicyError::RateOutOfRange { component, rate });
    }
    Ok(())
}

/// Fee values detected on a receipt. Untrusted until confirmed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeeSuggestion {
    pub service_charge_rate: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
    pub mode_hint: Option<String>,
}

impl FeeSuggestion {
    pub fn is_empty(&self) -> bool {
        self.service_charge_rate.is_none() && self.vat_rate.is_none() && self.mode_hint.is_none()
    }
}
