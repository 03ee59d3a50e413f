//! The form record aggregate.
//!
//! One mutable record accumulates the fields of every wizard step. Fields
//! are merged in via [`FormPatch`]; the only cross-field invariant — the
//! username always mirrors the email — is enforced at the point of
//! mutation rather than by a background watcher.

use serde::{Deserialize, Serialize};

use crate::country::CountryCode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub first_name: String,
    pub last_name: String,
    email: String,
    username: String,
    pub phone: String,
    pub country: CountryCode,
    pub zip_code: String,
    pub state: String,
    pub city: String,
    pub street: String,
    /// Apartment/suite; the one optional address field.
    pub additional: String,
    password: String,
    confirm_password: String,
}

/// A shallow per-field patch applied by a step. `None` leaves the field
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct FormPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<CountryCode>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub additional: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl FormRecord {
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Always equal to the email.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }

    /// Set the email, deriving the username from it in the same mutation.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.username = self.email.clone();
    }

    /// Switch the selected country.
    ///
    /// The phone field is cleared because the mask and digit rule no longer
    /// apply. Returns true when the country actually changed, so callers
    /// know to invalidate any verification in progress.
    pub fn set_country(&mut self, country: CountryCode) -> bool {
        if self.country == country {
            return false;
        }
        self.country = country;
        self.phone.clear();
        true
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirm_password(&mut self, confirm: impl Into<String>) {
        self.confirm_password = confirm.into();
    }

    /// Scrub both credential fields. Invoked when stepping back from
    /// Review to Account.
    pub fn clear_credentials(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
    }

    /// Merge a patch. Email and country go through their setters so the
    /// username-mirror and phone-reset invariants hold.
    pub fn apply(&mut self, patch: FormPatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if let Some(v) = patch.email {
            self.set_email(v);
        }
        if let Some(v) = patch.country {
            self.set_country(v);
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.zip_code {
            self.zip_code = v;
        }
        if let Some(v) = patch.state {
            self.state = v;
        }
        if let Some(v) = patch.city {
            self.city = v;
        }
        if let Some(v) = patch.street {
            self.street = v;
        }
        if let Some(v) = patch.additional {
            self.additional = v;
        }
        if let Some(v) = patch.password {
            self.set_password(v);
        }
        if let Some(v) = patch.confirm_password {
            self.set_confirm_password(v);
        }
    }

    /// All required personal-step fields are non-empty. The additional
    /// address line is optional.
    pub fn personal_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.zip_code.trim().is_empty()
            && !self.state.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.street.trim().is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Dialing prefix + digits-only phone.
    pub fn full_phone(&self) -> String {
        self.country.full_phone(&self.phone)
    }
}
