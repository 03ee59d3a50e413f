//! Field-level validation rules.
//!
//! Pure, stateless predicates. Phone validation lives on
//! [`crate::country::CountryCode`] because the rule is country data.

mod card;
mod email;
mod password;

pub use card::{detect_card_brand, validate_card_number, validate_cvv, validate_expiry, CardBrand};
pub use email::validate_email_shape;
pub use password::PasswordChecks;
