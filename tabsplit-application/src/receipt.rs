use tabsplit_domain::{Discount, FeeSuggestion, Money};

pub struct ReceiptImage<'a> {
    pub bytes: &'a [u8],
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8];

impl<'a> ReceiptImage<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            filename: None,
            content_type: None,
        }
    }

    /// Detects the image type from its leading bytes, falling back to the
    /// declared content type and then the file extension.
    pub fn mime_type(&self) -> Option<&'static str> {
        if self.bytes.starts_with(PNG_SIGNATURE) {
            return Some("image/png");
        }
        if self.bytes.starts_with(JPEG_SIGNATURE) {
            return Some("image/jpeg");
        }

        let declared = self.content_type.map(|value| value.trim().to_ascii_lowercase());
        match declared.as_deref() {
            Some("image/png") => return Some("image/png"),
            Some("image/jpeg" | "image/jpg") => return Some("image/jpeg"),
            _ => {}
        }

        let extension = self
            .filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("png") => Some("image/png"),
            Some("jpg" | "jpeg") => Some("image/jpeg"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedItem {
    pub name: String,
    pub gross: Money,
    pub discount: Option<Discount>,
}

/// What an extractor read off a receipt. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptSuggestion {
    pub items: Vec<SuggestedItem>,
    pub fees: FeeSuggestion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VettedReceipt {
    pub items: Vec<SuggestedItem>,
    pub rejected: usize,
    pub fees: FeeSuggestion,
}

impl ReceiptSuggestion {
    /// Keeps only lines that can become bill items: a non-empty name and a
    /// positive price.
    pub fn vet(self) -> VettedReceipt {
        let total = self.items.len();
        let items: Vec<SuggestedItem> = self
            .items
            .into_iter()
            .filter_map(|item| {
                let name = item.name.trim();
                if name.is_empty() || !item.gross.is_positive() {
                    tracing::debug!(name = %item.name, gross = %item.gross, "Dropping receipt line");
                    return None;
                }
                Some(SuggestedItem {
                    name: name.to_string(),
                    ..item
                })
            })
            .collect();

        VettedReceipt {
            rejected: total - items.len(),
            items,
            fees: self.fees,
        }
    }
}
