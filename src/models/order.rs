use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// DB models

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub billing_street: String,
    pub billing_city: String,
    pub billing_province: String,
    pub billing_postal_code: String,
    pub shipping_street: String,
    pub shipping_city: String,
    pub shipping_province: String,
    pub shipping_postal_code: String,
    pub payment_method: String,
    pub card_name: Option<String>,
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot line: quantity, unit price and name are captured at
/// checkout, so later product edits do not rewrite history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub product_name: String,
    pub created_at: DateTime<Utc>,
}

// Request types

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub province: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
}

/// Opaque payment descriptor: either a card (stored as-is, never
/// validated or charged) or local pickup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentInfo {
    #[serde(rename_all = "camelCase")]
    Card {
        card_name: String,
        card_number: String,
        expiry_date: String,
    },
    Pickup,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<OrderLineRequest>,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub payment_info: PaymentInfo,
}

// Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: i32,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub payment_info: PaymentInfo,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl OrderResponse {
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        let payment_info = match order.payment_method.as_str() {
            "pickup" => PaymentInfo::Pickup,
            _ => PaymentInfo::Card {
                card_name: order.card_name.unwrap_or_default(),
                card_number: order.card_number.unwrap_or_default(),
                expiry_date: order.card_expiry.unwrap_or_default(),
            },
        };

        Self {
            id: order.id,
            user_id: order.user_id,
            billing_address: Address {
                street: order.billing_street,
                city: order.billing_city,
                province: order.billing_province,
                postal_code: order.billing_postal_code,
            },
            shipping_address: Address {
                street: order.shipping_street,
                city: order.shipping_city,
                province: order.shipping_province,
                postal_code: order.shipping_postal_code,
            },
            payment_info,
            created_at: order.created_at,
            items,
        }
    }
}

impl PaymentInfo {
    /// Column values for persistence: (method, card_name, card_number,
    /// card_expiry).
    pub fn as_columns(&self) -> (&str, Option<&str>, Option<&str>, Option<&str>) {
        match self {
            PaymentInfo::Card {
                card_name,
                card_number,
                expiry_date,
            } => (
                "card",
                Some(card_name.as_str()),
                Some(card_number.as_str()),
                Some(expiry_date.as_str()),
            ),
            PaymentInfo::Pickup => ("pickup", None, None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_payment_serde_roundtrip() {
        let json = r#"{"method":"card","cardName":"A Buyer","cardNumber":"4111111111111111","expiryDate":"12/27"}"#;
        let payment: PaymentInfo = serde_json::from_str(json).unwrap();
        assert_eq!(
            payment,
            PaymentInfo::Card {
                card_name: "A Buyer".into(),
                card_number: "4111111111111111".into(),
                expiry_date: "12/27".into(),
            }
        );
        let back: PaymentInfo = serde_json::from_str(&serde_json::to_string(&payment).unwrap()).unwrap();
        assert_eq!(back, payment);
    }

    #[test]
    fn pickup_payment_serde_roundtrip() {
        let payment: PaymentInfo = serde_json::from_str(r#"{"method":"pickup"}"#).unwrap();
        assert_eq!(payment, PaymentInfo::Pickup);
        assert_eq!(
            serde_json::to_string(&payment).unwrap(),
            r#"{"method":"pickup"}"#
        );
    }

    #[test]
    fn unknown_payment_method_is_rejected() {
        assert!(serde_json::from_str::<PaymentInfo>(r#"{"method":"wire"}"#).is_err());
    }

    #[test]
    fn payment_columns_match_variant() {
        let card = PaymentInfo::Card {
            card_name: "n".into(),
            card_number: "1234".into(),
            expiry_date: "01/30".into(),
        };
        assert_eq!(
            card.as_columns(),
            ("card", Some("n"), Some("1234"), Some("01/30"))
        );
        assert_eq!(PaymentInfo::Pickup.as_columns(), ("pickup", None, None, None));
    }

    #[test]
    fn checkout_request_deserializes_camel_case() {
        let json = r#"{
            "items": [{"productId": 3, "quantity": 2}],
            "billingAddress": {"street":"1 Main","city":"Halifax","province":"NS","postalCode":"B3H 0A1"},
            "shippingAddress": {"street":"1 Main","city":"Halifax","province":"NS","postalCode":"B3H 0A1"},
            "paymentInfo": {"method":"pickup"}
        }"#;
        let req: CheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items.len(), 1);
        assert_eq!(req.items[0].product_id, 3);
        assert_eq!(req.billing_address, req.shipping_address);
        assert_eq!(req.payment_info, PaymentInfo::Pickup);
    }
}
