use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use tabsplit_application::{
    ReceiptError, ReceiptExtractor, ReceiptImage, ReceiptSuggestion, SuggestedItem,
};
use tabsplit_domain::{Discount, FeeSuggestion, Money};

#[derive(Debug, thiserror::Error)]
pub enum ReceiptPayloadError {
    #[error("Receipt payload is empty")]
    Empty,
    #[error("Receipt payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything that turns a receipt image into the JSON text the parser reads,
/// typically a vision model.
pub trait ReceiptTextSource: Send + Sync {
    fn read_text(&self, image: &ReceiptImage<'_>) -> Result<String, ReceiptError>;
}

pub struct TextReceiptExtractor<T> {
    source: T,
}

impl<T: ReceiptTextSource> TextReceiptExtractor<T> {
    pub fn new(source: T) -> Self {
        Self { source }
    }
}

impl<T: ReceiptTextSource> ReceiptExtractor for TextReceiptExtractor<T> {
    fn extract(&self, image: &ReceiptImage<'_>) -> Result<ReceiptSuggestion, ReceiptError> {
        let mime_type = image.mime_type().ok_or(ReceiptError::UnsupportedImage)?;
        let text = self.source.read_text(image)?;
        let suggestion = parse_receipt_payload(&text)
            .map_err(|err| ReceiptError::MalformedPayload(err.to_string()))?;
        tracing::info!(
            mime_type,
            items = suggestion.items.len(),
            service_charge_rate = ?suggestion.fees.service_charge_rate,
            vat_rate = ?suggestion.fees.vat_rate,
            mode_hint = ?suggestion.fees.mode_hint,
            "Receipt extracted"
        );
        Ok(suggestion)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Receipt(ReceiptDto),
    Items(Vec<ItemDto>),
}

#[derive(Deserialize)]
struct ReceiptDto {
    #[serde(default)]
    items: Vec<ItemDto>,
    #[serde(default)]
    service_charge_pct: Option<NumberOrText>,
    #[serde(default)]
    vat_pct: Option<NumberOrText>,
    #[serde(default)]
    fees_mode: Option<String>,
}

#[derive(Deserialize)]
struct ItemDto {
    #[serde(default)]
    name: Option<NumberOrText>,
    #[serde(default)]
    price: Option<NumberOrText>,
    #[serde(default)]
    discount_pct: Option<NumberOrText>,
    #[serde(default)]
    discount_amount: Option<NumberOrText>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Reads `1,250.00`, `฿ 90` or `12.5` style values.
    fn to_decimal(&self) -> Option<Decimal> {
        let text = self.as_text();
        let cleaned: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E' | '+'))
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        Decimal::from_str(&cleaned)
            .or_else(|_| Decimal::from_scientific(&cleaned))
            .ok()
    }
}

/// Parses the JSON a receipt reader produced.
///
/// Accepts `{"items": [...], "service_charge_pct", "vat_pct", "fees_mode"}`
/// or a bare item array, optionally wrapped in a markdown code fence. Lines
/// with unreadable prices are kept with a zero price so vetting drops them.
pub fn parse_receipt_payload(text: &str) -> Result<ReceiptSuggestion, ReceiptPayloadError> {
    let json = strip_code_fence(text);
    if json.is_empty() {
        return Err(ReceiptPayloadError::Empty);
    }

    let receipt = match serde_json::from_str::<Payload>(json)? {
        Payload::Receipt(receipt) => receipt,
        Payload::Items(items) => ReceiptDto {
            items,
            service_charge_pct: None,
            vat_pct: None,
            fees_mode: None,
        },
    };

    let items = receipt.items.iter().map(suggested_item).collect();
    let fees = FeeSuggestion {
        service_charge_rate: receipt.service_charge_pct.as_ref().and_then(rate),
        vat_rate: receipt.vat_pct.as_ref().and_then(rate),
        mode_hint: receipt
            .fees_mode
            .map(|mode| mode.trim().to_string())
            .filter(|mode| !mode.is_empty()),
    };

    Ok(ReceiptSuggestion { items, fees })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some((_, after_open)) = trimmed.split_once("```") else {
        return trimmed;
    };
    let body = after_open.strip_prefix("json").unwrap_or(after_open);
    body.split_once("```")
        .map_or(body, |(inner, _)| inner)
        .trim()
}

fn suggested_item(dto: &ItemDto) -> SuggestedItem {
    let name = dto
        .name
        .as_ref()
        .map(NumberOrText::as_text)
        .unwrap_or_default();
    let gross = dto
        .price
        .as_ref()
        .and_then(NumberOrText::to_decimal)
        .map_or(Money::ZERO, Money::from_decimal);
    if dto.price.is_some() && gross.is_zero() {
        tracing::debug!(name = %name, "Unreadable receipt price");
    }

    let discount = dto
        .discount_pct
        .as_ref()
        .and_then(NumberOrText::to_decimal)
        .and_then(|pct| Discount::percent(pct).ok())
        .or_else(|| {
            dto.discount_amount
                .as_ref()
                .and_then(NumberOrText::to_decimal)
                .and_then(|amount| Discount::amount(Money::from_decimal(amount)).ok())
        })
        .filter(|discount| match discount {
            Discount::Percent(pct) => !pct.is_zero(),
            Discount::Amount(amount) => !amount.is_zero(),
        });

    SuggestedItem {
        name,
        gross,
        discount,
    }
}

fn rate(value: &NumberOrText) -> Option<Decimal> {
    let parsed = value.to_decimal();
    if parsed.is_none() {
        tracing::warn!(value = %value.as_text(), "Ignoring unreadable fee rate on receipt");
    }
    parsed
}
