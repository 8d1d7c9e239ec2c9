use crate::utils::error::{MandiError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 報價前的欄位檢查：三個欄位一起檢查，任一失敗即回傳 false
///
/// 數量可以帶單位，例如 "10 kg" 或 "2 किलो"，取第一個數字判斷是否大於 0。
pub fn validate_quote_input(product: &str, quantity: &str, location: &str) -> bool {
    !product.trim().is_empty()
        && !location.trim().is_empty()
        && parse_quantity(quantity).is_some_and(|kg| kg > 0.0)
}

/// First number in a quantity such as "10 kg", "2 किलो" or "-3".
///
/// A `-` directly before the digits makes the value negative. Returns `None`
/// when the text holds no ASCII digits.
pub fn parse_quantity(text: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"-?[0-9]+(\.[0-9]+)?").expect("valid quantity pattern"));

    re.find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|kg| kg.is_finite())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MandiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MandiError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MandiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MandiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MandiError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
