use crate::domain::language::Language;
use crate::domain::model::PriceQuoteRequest;
use crate::utils::validation::parse_quantity;
use serde::{Deserialize, Serialize};

const DEFAULT_QUANTITY_KG: f64 = 10.0;
const METRO_CITIES: [&str; 5] = ["delhi", "mumbai", "bangalore", "chennai", "kolkata"];

/// 產品別名 (含印地語)
const PRODUCT_ALIASES: [(&str, &[&str]); 4] = [
    ("potato", &["potato", "potatoes", "आलू"]),
    ("tomato", &["tomato", "टमाटर"]),
    ("onion", &["onion", "प्याज"]),
    ("apple", &["apple", "सेब"]),
];

/// Full `/get-price` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub product: String,
    pub quantity_kg: f64,
    pub location: String,
    pub price_range: String,
    pub negotiation_tip: String,
}

pub fn normalize_product(product: &str) -> &'static str {
    let product = product.to_lowercase();
    PRODUCT_ALIASES
        .iter()
        .find(|(_, names)| names.iter().any(|name| product.contains(name)))
        .map(|(key, _)| *key)
        .unwrap_or("default")
}

/// Base price in ₹ per kg.
pub fn base_price(product_key: &str) -> i64 {
    match product_key {
        "tomato" => 22,
        "potato" => 18,
        "onion" => 25,
        "apple" => 95,
        _ => 20,
    }
}

/// First decimal number in strings like "1 kg", "2 किलो" or "1.5".
///
/// The sign is ignored; text without a number falls back to 10 kg.
pub fn extract_quantity(quantity: &str) -> f64 {
    parse_quantity(quantity)
        .map(f64::abs)
        .unwrap_or(DEFAULT_QUANTITY_KG)
}

pub fn is_metro(location: &str) -> bool {
    let location = location.to_lowercase();
    METRO_CITIES.iter().any(|city| location.contains(city))
}

/// Adjusted price before the random band is applied.
pub fn adjusted_base_price(product_key: &str, quantity_kg: f64, location: &str) -> i64 {
    let mut price = base_price(product_key);

    // 大量購買打折，少量加價
    if quantity_kg > 50.0 {
        price -= 2;
    } else if quantity_kg < 5.0 {
        price += 2;
    }

    if is_metro(location) {
        price += 1;
    }
    price
}

fn localized_texts(language: Language, low: i64, high: i64) -> (String, String) {
    let tip_price = low + 1;
    match language {
        Language::English => (
            format!("₹{}–₹{} per kg", low, high),
            format!("Start negotiation near ₹{} for a fair deal.", tip_price),
        ),
        Language::Hindi => (
            format!("₹{}–₹{} प्रति किलो", low, high),
            format!("₹{} से बातचीत शुरू करें।", tip_price),
        ),
        Language::Punjabi => (
            format!("₹{}–₹{} ਪ੍ਰਤੀ ਕਿੱਲੋ", low, high),
            format!("₹{} ਤੋਂ ਗੱਲਬਾਤ ਸ਼ੁਰੂ ਕਰੋ।", tip_price),
        ),
        Language::Tamil => (
            format!("₹{}–₹{} ஒரு கிலோ", low, high),
            format!("₹{} முதல் பேச தொடங்குங்கள்.", tip_price),
        ),
        Language::Bengali => (
            format!("₹{}–₹{} প্রতি কেজি", low, high),
            format!("₹{} থেকে দর কষাকষি শুরু করুন।", tip_price),
        ),
    }
}

/// Builds an estimate with explicit jitter.
///
/// `low_offset` is expected in `-1..=0` and `spread` in `2..=4`; the
/// server draws both at random.
pub fn estimate(request: &PriceQuoteRequest, low_offset: i64, spread: i64) -> PriceEstimate {
    let product_key = normalize_product(&request.product);
    let quantity_kg = extract_quantity(&request.quantity);
    let base = adjusted_base_price(product_key, quantity_kg, &request.location);

    let low = (base + low_offset).max(1);
    let high = low + spread;

    // 不支援的語言回英文
    let language = Language::from_backend_code(&request.language).unwrap_or_default();
    let (price_range, negotiation_tip) = localized_texts(language, low, high);

    PriceEstimate {
        product: product_key.to_string(),
        quantity_kg,
        location: request.location.clone(),
        price_range,
        negotiation_tip,
    }
}

#[cfg(feature = "server")]
pub fn estimate_with_rng<R: rand::Rng>(
    request: &PriceQuoteRequest,
    rng: &mut R,
) -> PriceEstimate {
    let low_offset = rng.gen_range(-1..=0);
    let spread = rng.gen_range(2..=4);
    estimate(request, low_offset, spread)
}
