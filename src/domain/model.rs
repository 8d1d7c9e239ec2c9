use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuoteRequest {
    pub product: String,
    pub quantity: String,
    pub location: String,
    pub language: String,
}

/// 定價服務回傳的結果；其他欄位在解碼時忽略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuoteResult {
    pub price_range: String,
    pub negotiation_tip: String,
}

impl PriceQuoteResult {
    /// 取得報價後朗讀的內容
    pub fn announcement(&self) -> String {
        format!("{}. {}", self.price_range, self.negotiation_tip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationTurn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Append-only transcript of the negotiation rounds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NegotiationHistory {
    turns: Vec<NegotiationTurn>,
}

impl NegotiationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// One round: the user's transcript first, then the reply.
    pub fn record_round(&mut self, user_text: &str, reply: &str) {
        let at = Utc::now();
        self.turns.push(NegotiationTurn {
            speaker: Speaker::User,
            text: user_text.to_string(),
            at,
        });
        self.turns.push(NegotiationTurn {
            speaker: Speaker::Assistant,
            text: reply.to_string(),
            at,
        });
    }

    pub fn turns(&self) -> &[NegotiationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenState {
    LanguageSelect,
    DataEntry,
    Result,
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenState::LanguageSelect => "language selection",
            ScreenState::DataEntry => "data entry",
            ScreenState::Result => "result",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Product,
    Quantity,
    Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteForm {
    pub product: String,
    pub quantity: String,
    pub location: String,
}

impl QuoteForm {
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Product => &mut self.product,
            FormField::Quantity => &mut self.quantity,
            FormField::Location => &mut self.location,
        }
    }

    pub fn to_request(&self, language_code: &str) -> PriceQuoteRequest {
        PriceQuoteRequest {
            product: self.product.trim().to_string(),
            quantity: self.quantity.trim().to_string(),
            location: self.location.trim().to_string(),
            language: language_code.to_string(),
        }
    }
}
