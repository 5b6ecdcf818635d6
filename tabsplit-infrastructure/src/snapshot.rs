use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use tabsplit_domain::{
    Bill, BillError, BillId, BillParts, BillState, ChatId, Claimant, Currency, Discount,
    DiscountError, FeePolicy, FeePolicyError, FeePolicyResolver, FeeSuggestion, Item, ItemId,
    MemberId, Money, Participant,
};
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported currency: {0}")]
    Currency(String),
    #[error(transparent)]
    FeePolicy(#[from] FeePolicyError),
    #[error(transparent)]
    Discount(#[from] DiscountError),
    #[error(transparent)]
    Bill(#[from] BillError),
}

/// Decimal stored as a JSON string, read from either a string or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalValue(pub Decimal);

impl Serialize for DecimalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DecimalValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(number) => number.to_string(),
            Raw::Text(text) => text,
        };
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Self)
            .map_err(|_| de::Error::custom(format!("invalid decimal '{text}'")))
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateDto {
    Open,
    Finalized,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParticipantDto {
    Member { id: u64, name: String },
    Guest { name: String },
}

/// A member id or a guest name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimantDto {
    Member(u64),
    Guest(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DiscountDto {
    Percent(DecimalValue),
    Amount(DecimalValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: u32,
    pub name: String,
    pub price: DecimalValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountDto>,
    #[serde(default)]
    pub claimed_by: Vec<ClaimantDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesDto {
    pub mode: String,
    #[serde(default = "zero")]
    pub service_charge_pct: DecimalValue,
    #[serde(default = "zero")]
    pub vat_pct: DecimalValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFeesDto {
    #[serde(default)]
    pub service_charge_pct: Option<DecimalValue>,
    #[serde(default)]
    pub vat_pct: Option<DecimalValue>,
    #[serde(default)]
    pub mode: Option<String>,
}

fn zero() -> DecimalValue {
    DecimalValue(Decimal::ZERO)
}

fn open_state() -> StateDto {
    StateDto::Open
}

/// On-disk form of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSnapshot {
    pub id: u64,
    pub chat: i64,
    pub creator: u64,
    pub currency: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub finalized_at: Option<OffsetDateTime>,
    #[serde(default = "open_state")]
    pub state: StateDto,
    pub participants: Vec<ParticipantDto>,
    pub items: Vec<ItemDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<FeesDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_fees: Option<PendingFeesDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<DecimalValue>,
}

impl BillSnapshot {
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_bill(bill: &Bill) -> Self {
        Self {
            id: bill.id().0,
            chat: bill.chat().0,
            creator: bill.creator().0,
            currency: bill.currency().code().to_string(),
            created_at: bill.created_at(),
            finalized_at: bill.finalized_at(),
            state: match bill.state() {
                BillState::Open => StateDto::Open,
                BillState::Finalized => StateDto::Finalized,
                BillState::Archived => StateDto::Archived,
            },
            participants: bill
                .participants()
                .iter()
                .map(|participant| match participant.claimant() {
                    Claimant::Member(id) => ParticipantDto::Member {
                        id: id.0,
                        name: participant.display_name().to_string(),
                    },
                    Claimant::Guest(name) => ParticipantDto::Guest { name: name.clone() },
                })
                .collect(),
            items: bill.items().iter().map(item_dto).collect(),
            fees: bill.fee_policy().map(|policy| FeesDto {
                mode: policy.mode().token().to_string(),
                service_charge_pct: DecimalValue(policy.service_charge_rate()),
                vat_pct: DecimalValue(policy.vat_rate()),
            }),
            pending_fees: bill.pending_fees().map(|fees| PendingFeesDto {
                service_charge_pct: fees.service_charge_rate.map(DecimalValue),
                vat_pct: fees.vat_rate.map(DecimalValue),
                mode: fees.mode_hint.clone(),
            }),
            exchange_rate: bill.exchange_rate().map(DecimalValue),
        }
    }

    /// Rebuilds the bill, validating the fee policy, discounts, participants
    /// and claims on the way.
    pub fn into_bill(self) -> Result<Bill, SnapshotError> {
        let currency = Currency::from_str(&self.currency).map_err(SnapshotError::Currency)?;
        let fee_policy = self
            .fees
            .map(|fees| -> Result<FeePolicy, FeePolicyError> {
                FeePolicyResolver::policy(fees.service_charge_pct.0, fees.vat_pct.0, Some(&fees.mode))
            })
            .transpose()?;
        let items = self
            .items
            .into_iter()
            .map(into_item)
            .collect::<Result<Vec<_>, _>>()?;

        let parts = BillParts {
            id: BillId(self.id),
            chat: ChatId(self.chat),
            creator: MemberId(self.creator),
            currency,
            created_at: self.created_at,
            finalized_at: self.finalized_at,
            participants: self
                .participants
                .into_iter()
                .map(|participant| match participant {
                    ParticipantDto::Member { id, name } => Participant::member(MemberId(id), name),
                    ParticipantDto::Guest { name } => Participant::guest(name),
                })
                .collect(),
            items,
            fee_policy,
            pending_fees: self.pending_fees.map(|fees| FeeSuggestion {
                service_charge_rate: fees.service_charge_pct.map(|value| value.0),
                vat_rate: fees.vat_pct.map(|value| value.0),
                mode_hint: fees.mode,
            }),
            exchange_rate: self.exchange_rate.map(|value| value.0),
            state: match self.state {
                StateDto::Open => BillState::Open,
                StateDto::Finalized => BillState::Finalized,
                StateDto::Archived => BillState::Archived,
            },
        };
        Ok(Bill::restore(parts)?)
    }
}

fn item_dto(item: &Item) -> ItemDto {
    ItemDto {
        id: item.id().0,
        name: item.name().to_string(),
        price: DecimalValue(item.gross().as_decimal()),
        discount: item.discount().map(|discount| match discount {
            Discount::Percent(pct) => DiscountDto::Percent(DecimalValue(*pct)),
            Discount::Amount(amount) => DiscountDto::Amount(DecimalValue(amount.as_decimal())),
        }),
        claimed_by: item
            .claimants()
            .iter()
            .map(|claimant| match claimant {
                Claimant::Member(id) => ClaimantDto::Member(id.0),
                Claimant::Guest(name) => ClaimantDto::Guest(name.clone()),
            })
            .collect(),
    }
}

fn into_item(dto: ItemDto) -> Result<Item, SnapshotError> {
    let discount = dto
        .discount
        .map(|discount| match discount {
            DiscountDto::Percent(pct) => Discount::percent(pct.0),
            DiscountDto::Amount(amount) => Discount::amount(Money::from_decimal(amount.0)),
        })
        .transpose()?;
    let claimants = dto.claimed_by.into_iter().map(|claimant| match claimant {
        ClaimantDto::Member(id) => Claimant::Member(MemberId(id)),
        ClaimantDto::Guest(name) => Claimant::Guest(name),
    });

    Ok(Item::new(
        ItemId(dto.id),
        dto.name,
        Money::from_decimal(dto.price.0),
        discount,
    )
    .with_claimants(claimants))
}
