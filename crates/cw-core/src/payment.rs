use serde::{Deserialize, Serialize};

use crate::country::strip_non_digits;
use crate::session::CheckoutSessionId;
use crate::validation::{detect_card_brand, CardBrand};

/// Card details as entered on the payment step.
///
/// The card number keeps its display formatting here; the digits-only
/// form is derived at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub card_holder_name: String,
    pub card_number: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
}

impl PaymentRecord {
    pub fn card_brand(&self) -> Option<CardBrand> {
        detect_card_brand(&self.card_number)
    }

    pub fn card_number_digits(&self) -> String {
        strip_non_digits(&self.card_number)
    }

    /// Wire form sent to the payment processor.
    pub fn submission(&self, session_id: &CheckoutSessionId) -> PaymentSubmission {
        PaymentSubmission {
            card_holder_name: self.card_holder_name.clone(),
            card_number_digits: self.card_number_digits(),
            cvv: self.cvv.clone(),
            expiry: self.expiry.clone(),
            session_id: session_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    pub card_holder_name: String,
    pub card_number_digits: String,
    pub cvv: String,
    pub expiry: String,
    pub session_id: CheckoutSessionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_strips_card_formatting() {
        let record = PaymentRecord {
            card_holder_name: "Ada Lovelace".into(),
            card_number: "4111 1111 1111 1111".into(),
            expiry: "12/30".into(),
            cvv: "123".into(),
        };
        let sub = record.submission(&CheckoutSessionId::new("ck_1"));
        assert_eq!(sub.card_number_digits, "4111111111111111");
        assert_eq!(sub.session_id.as_str(), "ck_1");
        assert_eq!(record.card_brand(), Some(CardBrand::Visa));
    }
}
