use crate::utils::error::{MandiError, Result};
use std::fmt;

/// Lower and upper bound taken from a price-range string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBand {
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationReply {
    AskForNumber { price_range: String },
    TooLow { offered: u64, minimum: u64 },
    Accepted { offered: u64 },
    AboveMarket { offered: u64 },
}

impl fmt::Display for NegotiationReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationReply::AskForNumber { price_range } => {
                write!(f, "Market price is {}. Please say a number.", price_range)
            }
            NegotiationReply::TooLow { offered, minimum } => {
                write!(f, "₹{} is too low. Minimum is ₹{}.", offered, minimum)
            }
            NegotiationReply::Accepted { offered } => {
                write!(f, "₹{} is acceptable. Deal finalized.", offered)
            }
            NegotiationReply::AboveMarket { offered } => {
                write!(f, "₹{} is above market price.", offered)
            }
        }
    }
}

/// Collects up to `limit` runs of ASCII digits, left to right.
///
/// Returns `None` for a run that does not fit in a `u64`; the caller
/// decides what an unusable number means.
pub fn extract_numbers(text: &str, limit: usize) -> Vec<Option<u64>> {
    let mut numbers = Vec::new();
    let mut rest = text;

    while numbers.len() < limit {
        let Some(start) = rest.find(|c: char| c.is_ascii_digit()) else {
            break;
        };
        let run = &rest[start..];
        let end = run
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(run.len());

        numbers.push(run[..end].parse::<u64>().ok());
        rest = &run[end..];
    }

    numbers
}

/// 取出前兩個數字作為 min / max，順序照字串原樣
pub fn parse_price_band(price_range: &str) -> Result<PriceBand> {
    match extract_numbers(price_range, 2).as_slice() {
        [Some(min), Some(max)] => Ok(PriceBand {
            min: *min,
            max: *max,
        }),
        _ => Err(MandiError::MalformedRange {
            range: price_range.to_string(),
        }),
    }
}

/// First number in the utterance; an oversized number counts as no number.
///
/// Replies echo the parsed value, so leading zeros are dropped ("007" → ₹7).
pub fn extract_offer(spoken_text: &str) -> Option<u64> {
    extract_numbers(spoken_text, 1).into_iter().next().flatten()
}

pub fn decide(price_range: &str, band: PriceBand, spoken_text: &str) -> NegotiationReply {
    match extract_offer(spoken_text) {
        None => NegotiationReply::AskForNumber {
            price_range: price_range.to_string(),
        },
        Some(offered) if offered < band.min => NegotiationReply::TooLow {
            offered,
            minimum: band.min.saturating_add(1),
        },
        Some(offered) if offered <= band.max => NegotiationReply::Accepted { offered },
        Some(offered) => NegotiationReply::AboveMarket { offered },
    }
}

/// Evaluates one spoken offer against the quoted range.
pub fn evaluate(price_range: &str, spoken_text: &str) -> Result<NegotiationReply> {
    let band = parse_price_band(price_range)?;
    Ok(decide(price_range, band, spoken_text))
}
