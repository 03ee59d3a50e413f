use serde::{Deserialize, Serialize};

/// Countries the checkout supports for phone input.
///
/// Immutable reference data: dialing prefix, input mask, an example string
/// for placeholders, and the per-country digit-count rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryCode {
    Us,
    Ca,
    Au,
    Br,
}

impl Default for CountryCode {
    fn default() -> Self {
        Self::Us
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: CountryCode,
    pub name: &'static str,
    /// International dialing prefix, e.g. "+61".
    pub prefix: &'static str,
    /// Display mask for the phone input, `0` marks a digit slot.
    pub mask: &'static str,
    /// Example phone string shown as a placeholder.
    pub example: &'static str,
}

pub const COUNTRIES: [Country; 4] = [
    Country {
        code: CountryCode::Us,
        name: "United States",
        prefix: "+1",
        mask: "+1 (000) 000-0000",
        example: "(555) 555-5555",
    },
    Country {
        code: CountryCode::Ca,
        name: "Canada",
        prefix: "+1",
        mask: "+1 (000) 000-0000",
        example: "(555) 555-5555",
    },
    Country {
        code: CountryCode::Au,
        name: "Australia",
        prefix: "+61",
        mask: "+61 000 000 000",
        example: "400 000 000",
    },
    Country {
        code: CountryCode::Br,
        name: "Brazil",
        prefix: "+55",
        mask: "+55 (00) 00000-0000",
        example: "(11) 99999-9999",
    },
];

impl CountryCode {
    pub fn info(self) -> &'static Country {
        match self {
            Self::Us => &COUNTRIES[0],
            Self::Ca => &COUNTRIES[1],
            Self::Au => &COUNTRIES[2],
            Self::Br => &COUNTRIES[3],
        }
    }

    pub fn prefix(self) -> &'static str {
        self.info().prefix
    }

    /// Validate a phone string for this country.
    ///
    /// Only the digit count matters; formatting characters are stripped
    /// first. US/CA expect 10 digits, AU 9, BR accepts 10 or 11.
    pub fn validate_phone(self, phone: &str) -> bool {
        let digits = strip_non_digits(phone);
        match self {
            Self::Us | Self::Ca => digits.len() == 10,
            Self::Au => digits.len() == 9,
            Self::Br => digits.len() == 10 || digits.len() == 11,
        }
    }

    /// Dialing prefix concatenated with the digits-only phone, the shape
    /// the verification service expects.
    pub fn full_phone(self, phone: &str) -> String {
        format!("{}{}", self.prefix(), strip_non_digits(phone))
    }
}

/// Remove everything but ASCII digits.
pub fn strip_non_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_phone_requires_ten_digits() {
        assert!(CountryCode::Us.validate_phone("(555) 555-5555"));
        assert!(!CountryCode::Us.validate_phone("555-5555"));
        assert!(!CountryCode::Us.validate_phone("(555) 555-55555"));
    }

    #[test]
    fn au_phone_requires_nine_digits() {
        assert!(CountryCode::Au.validate_phone("400 000 000"));
        assert!(!CountryCode::Au.validate_phone("4000 000 000"));
    }

    #[test]
    fn br_phone_accepts_ten_or_eleven_digits() {
        assert!(CountryCode::Br.validate_phone("(11) 9999-9999"));
        assert!(CountryCode::Br.validate_phone("(11) 99999-9999"));
        assert!(!CountryCode::Br.validate_phone("(11) 999-9999"));
    }

    #[test]
    fn full_phone_prepends_prefix_and_strips_formatting() {
        assert_eq!(
            CountryCode::Us.full_phone("(555) 123-4567"),
            "+15551234567"
        );
        assert_eq!(CountryCode::Br.full_phone("(11) 99999-9999"), "+5511999999999");
    }
}
