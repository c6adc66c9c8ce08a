use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// What other users and the client get to see of a `User`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub iat: usize,
    pub exp: usize, // Expiration time as UTC timestamp
}

/// Register/login response: the public profile plus the issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product creation body. Every field is optional at the wire level so that a
/// missing field is reported as a validation failure naming the field.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: String,
    pub name: String,
    pub qty: i64,
    pub price: f64,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.price * self.qty as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "user")]
    pub buyer: String,
    pub order_items: Vec<OrderItem>,
    pub total_price: f64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub total_price: f64,
}

/// Payload of the `new-order` real-time event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderEvent {
    pub message: String,
    pub order_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_never_carries_password() {
        let user = User {
            id: "u1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "$argon2i$hash".into(),
            is_admin: false,
            created_at: Utc::now(),
        };
        let response = AuthResponse {
            profile: UserProfile::from(&user),
            token: "t".into(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["_id"], "u1");
        assert_eq!(value["isAdmin"], false);
        assert_eq!(value["token"], "t");
        assert!(value.get("password").is_none());
    }

    #[test]
    fn new_order_accepts_client_shape() {
        let body = json!({
            "orderItems": [{"product": "p1", "name": "Maize", "qty": 2, "price": 100.0}],
            "totalPrice": 200.0
        });
        let order: NewOrder = serde_json::from_value(body).unwrap();
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].subtotal(), 200.0);
        assert_eq!(order.total_price, 200.0);
    }

    #[test]
    fn missing_order_items_default_to_empty() {
        let order: NewOrder = serde_json::from_value(json!({"totalPrice": 10})).unwrap();
        assert!(order.order_items.is_empty());
    }

    #[test]
    fn event_payload_uses_order_id_key() {
        let event = NewOrderEvent {
            message: "New Order Received! Value: KSh 200".into(),
            order_id: "o1".into(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"message": "New Order Received! Value: KSh 200", "orderId": "o1"})
        );
    }
}
