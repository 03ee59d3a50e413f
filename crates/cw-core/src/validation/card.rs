use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::country::strip_non_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Diners,
    Jcb,
}

/// Ordered brand table; first match wins, so the order is part of the
/// contract.
static CARD_PATTERNS: Lazy<[(CardBrand, Regex); 6]> = Lazy::new(|| {
    [
        (CardBrand::Visa, Regex::new(r"^4").unwrap()),
        (CardBrand::Mastercard, Regex::new(r"^5[1-5]").unwrap()),
        (CardBrand::Amex, Regex::new(r"^3[47]").unwrap()),
        (CardBrand::Discover, Regex::new(r"^6").unwrap()),
        (CardBrand::Diners, Regex::new(r"^3(?:0[0-5]|[68])").unwrap()),
        (
            CardBrand::Jcb,
            Regex::new(r"^(?:2131|1800|35\d{3})").unwrap(),
        ),
    ]
});

/// Detect the card brand by prefix-matching the digit string.
pub fn detect_card_brand(number: &str) -> Option<CardBrand> {
    let digits = strip_non_digits(number);
    if digits.is_empty() {
        return None;
    }
    CARD_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&digits))
        .map(|(brand, _)| *brand)
}

/// Digit count in [13, 19] after stripping formatting.
pub fn validate_card_number(number: &str) -> bool {
    let len = strip_non_digits(number).len();
    (13..=19).contains(&len)
}

/// `MM/YY`, month in [1, 12], and not strictly before the current month.
///
/// No upper bound on the year: "12/99" passes the only rule we enforce
/// (year-not-in-the-past).
pub fn validate_expiry(expiry: &str, now: DateTime<Utc>) -> bool {
    if expiry.len() != 5 {
        return false;
    }
    let Some((month_str, year_str)) = expiry.split_once('/') else {
        return false;
    };
    let (Ok(month), Ok(year)) = (month_str.parse::<u32>(), year_str.parse::<i32>()) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }
    let year = 2000 + year;
    if year < now.year() {
        return false;
    }
    if year == now.year() && month < now.month() {
        return false;
    }
    true
}

/// 3 or 4 digits.
pub fn validate_cvv(cvv: &str) -> bool {
    let digits = strip_non_digits(cvv);
    digits.len() == cvv.len() && (3..=4).contains(&digits.len())
}
