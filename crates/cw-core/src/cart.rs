use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One plan line in the remote cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    pub is_annual: bool,
}

/// Cart contents as returned by the cart service.
///
/// Subtotal, discount and total are server-provided and authoritative;
/// the engine never recomputes them from the items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_annual_item(&self) -> bool {
        self.items.iter().any(|item| item.is_annual)
    }

    /// Projected renewal date: one year out if any item bills annually,
    /// otherwise thirty days from now.
    pub fn renewal_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if self.has_annual_item() {
            now + Duration::days(365)
        } else {
            now + Duration::days(30)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(is_annual: bool) -> CartItem {
        CartItem {
            name: "Pro Shield".into(),
            description: String::new(),
            price: 9.99,
            quantity: 1,
            is_annual,
        }
    }

    #[test]
    fn renewal_is_a_year_out_when_any_item_is_annual() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let cart = Cart {
            items: vec![item(false), item(true)],
            subtotal: 19.98,
            discount: 0.0,
            total: 19.98,
        };
        assert_eq!(cart.renewal_date(now), now + Duration::days(365));
    }

    #[test]
    fn renewal_is_thirty_days_for_monthly_only_carts() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let cart = Cart {
            items: vec![item(false)],
            subtotal: 9.99,
            discount: 0.0,
            total: 9.99,
        };
        assert_eq!(cart.renewal_date(now), now + Duration::days(30));
    }
}
