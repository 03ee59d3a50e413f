use serde::{Deserialize, Serialize};

const SPECIAL_CHARS: &str = "!@#$%^&*()_+{}[]:;<>,.?~\\/-";
const MIN_LEN: usize = 8;

/// Result of evaluating the passphrase policy.
///
/// The four policy sub-checks are kept as individual booleans (not
/// collapsed into one) so a UI can report exactly which rule failed.
/// Confirm-match is a fifth, independent condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChecks {
    pub has_min_length: bool,
    pub has_uppercase: bool,
    pub has_digit: bool,
    pub has_special: bool,
    pub passwords_match: bool,
}

impl PasswordChecks {
    pub fn evaluate(password: &str, confirm: &str) -> Self {
        Self {
            has_min_length: password.len() >= MIN_LEN,
            has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_special: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
            passwords_match: !password.is_empty() && password == confirm,
        }
    }

    /// The policy itself, without the confirm-match condition.
    pub fn policy_ok(&self) -> bool {
        self.has_min_length && self.has_uppercase && self.has_digit && self.has_special
    }

    /// Policy plus confirm-match; the account step's forward gate.
    pub fn all_ok(&self) -> bool {
        self.policy_ok() && self.passwords_match
    }
}
