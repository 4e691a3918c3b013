//! Order aggregate types consumed by the renderer.
//!
//! The shapes mirror the JSON an order service hands over once the user,
//! address and line items have been joined:
//!
//! ```json
//! {
//!   "id": "abc123",
//!   "user":    { "firstName": "Asha", "lastName": "Rao", "email": "asha@example.com" },
//!   "address": { "street": "1 Main Rd", "city": "Palladam", "state": "TN", "pincode": "641664", "phone": "+91 90000 00000" },
//!   "lineItems": [ { "product": { "name": "Kurti" }, "price": 100, "quantity": 2 } ]
//! }
//! ```
//!
//! ## Lenient line items
//!
//! Upstream records are not always clean. Instead of rejecting a render,
//! [`LineItem`] normalises what it is given:
//!
//! | Field       | Missing / null      | Negative, NaN, non-numeric |
//! |-------------|---------------------|----------------------------|
//! | product name| `"Unknown Product"` | –                          |
//! | price       | `0`                 | `0`                        |
//! | quantity    | `1`                 | `0`                        |
//!
//! Numeric strings (`"12.50"`) are accepted and fractional quantities are
//! truncated toward zero.
//!
//! Contact fields and the order id take numbers and booleans as their text
//! form (`"pincode": 641664` prints as `641664`). Arrays and objects there
//! are treated as absent.

use crate::error::InvoiceError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Name printed for a line item whose product has no usable name.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Placeholder printed for absent contact fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// A fully joined order, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregate {
    #[serde(alias = "_id", deserialize_with = "scalar_string")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub user: Customer,

    #[serde(default, deserialize_with = "null_as_default")]
    pub address: Address,

    #[serde(default, alias = "orderItems", deserialize_with = "null_as_default")]
    pub line_items: Vec<LineItem>,
}

impl OrderAggregate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: Customer) -> Self {
        self.user = user;
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    /// Parse an order from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        serde_json::from_str(json).map_err(|e| InvoiceError::InvalidOrder(e.to_string()))
    }

    /// Invoice number printed on the document, e.g. `INV-abc123`.
    pub fn invoice_number(&self) -> String {
        format!("INV-{}", self.id)
    }
}

/// The customer the invoice is billed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
}

impl Customer {
    /// "First Last", tolerating either half being absent.
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        format!("{first} {last}").trim().to_string()
    }

    pub fn email_or_na(&self) -> &str {
        non_blank(self.email.as_deref()).unwrap_or(NOT_AVAILABLE)
    }
}

/// Shipping / billing address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    #[serde(deserialize_with = "lenient_string")]
    pub street: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
}

impl Address {
    /// Single-line form: `street, city, state - pincode`.
    pub fn one_line(&self) -> String {
        let part = |v: &Option<String>| v.as_deref().unwrap_or("").to_string();
        format!(
            "{}, {}, {} - {}",
            part(&self.street),
            part(&self.city),
            part(&self.state),
            part(&self.pincode)
        )
    }

    pub fn phone_or_na(&self) -> &str {
        non_blank(self.phone.as_deref()).unwrap_or(NOT_AVAILABLE)
    }
}

/// One purchased product line, already normalised.
///
/// Construct with [`LineItem::new`] or deserialize from the wire shape
/// `{ "product": { "name": .. }, "price": .., "quantity": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLineItem", into = "RawLineItem")]
pub struct LineItem {
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// Build a line item, applying the same defaults as deserialization.
    ///
    /// A negative quantity or an invalid price contributes nothing.
    pub fn new(product_name: impl Into<String>, unit_price: f64, quantity: i64) -> Self {
        let name: String = product_name.into();
        Self {
            product_name: sanitize_name(non_blank(Some(name.as_str()))),
            unit_price: sanitize_price(Some(unit_price)),
            quantity: sanitize_quantity(Some(quantity as f64)),
        }
    }

    /// `unit_price × quantity`, unrounded.
    pub fn row_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

// ── Wire form ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quantity: Option<Value>,
}

impl From<RawLineItem> for LineItem {
    fn from(raw: RawLineItem) -> Self {
        let name = raw
            .product
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str);
        let price = raw.price.as_ref().map(lenient_number);
        let quantity = raw.quantity.as_ref().map(lenient_number);

        Self {
            product_name: sanitize_name(non_blank(name)),
            unit_price: match price {
                None => 0.0,
                Some(p) => sanitize_price(Some(p.unwrap_or(f64::NAN))),
            },
            quantity: match quantity {
                None => 1,
                Some(q) => sanitize_quantity(Some(q.unwrap_or(f64::NAN))),
            },
        }
    }
}

impl From<LineItem> for RawLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            product: Some(serde_json::json!({ "name": item.product_name })),
            price: Some(Value::from(item.unit_price)),
            quantity: Some(Value::from(item.quantity)),
        }
    }
}

/// Interpret a JSON value as a number; strings are parsed, anything else is `None`.
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn sanitize_name(name: Option<&str>) -> String {
    match name {
        Some(n) => n.to_string(),
        None => {
            debug!("Line item without product name; using '{}'", UNKNOWN_PRODUCT);
            UNKNOWN_PRODUCT.to_string()
        }
    }
}

fn sanitize_price(price: Option<f64>) -> f64 {
    match price {
        None => 0.0,
        Some(p) if p.is_finite() && p >= 0.0 => p,
        Some(p) => {
            debug!("Invalid unit price {p}; defaulting to 0");
            0.0
        }
    }
}

fn sanitize_quantity(quantity: Option<f64>) -> u32 {
    match quantity {
        None => 1,
        Some(q) if q.is_finite() && q >= 0.0 => q.trunc().min(f64::from(u32::MAX)) as u32,
        Some(q) => {
            debug!("Invalid quantity {q}; defaulting to 0");
            0
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Text form of a scalar JSON value; `None` for null, arrays and objects.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            debug!(value = %other, "ignoring non-scalar contact field");
            None
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: &str) -> LineItem {
        serde_json::from_str(json).expect("line item should deserialize")
    }

    #[test]
    fn full_line_item() {
        let li = item(r#"{"product":{"name":"Kurti"},"price":100,"quantity":2}"#);
        assert_eq!(li.product_name, "Kurti");
        assert_eq!(li.unit_price, 100.0);
        assert_eq!(li.quantity, 2);
        assert_eq!(li.row_total(), 200.0);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let li = item("{}");
        assert_eq!(li.product_name, UNKNOWN_PRODUCT);
        assert_eq!(li.unit_price, 0.0);
        assert_eq!(li.quantity, 1);
    }

    #[test]
    fn null_product_and_blank_name_are_unknown() {
        assert_eq!(item(r#"{"product":null}"#).product_name, UNKNOWN_PRODUCT);
        assert_eq!(
            item(r#"{"product":{"name":"   "}}"#).product_name,
            UNKNOWN_PRODUCT
        );
        // An unpopulated reference (bare id string) has no name either.
        assert_eq!(
            item(r#"{"product":"64f0c0ffee"}"#).product_name,
            UNKNOWN_PRODUCT
        );
    }

    #[test]
    fn negative_and_garbage_numbers_become_zero() {
        let li = item(r#"{"price":-5,"quantity":-1}"#);
        assert_eq!(li.unit_price, 0.0);
        assert_eq!(li.quantity, 0);
        assert_eq!(li.row_total(), 0.0);

        let li = item(r#"{"price":"abc","quantity":{"n":1}}"#);
        assert_eq!(li.unit_price, 0.0);
        assert_eq!(li.quantity, 0);
    }

    #[test]
    fn numeric_strings_and_fractions() {
        let li = item(r#"{"price":"12.50","quantity":"3"}"#);
        assert_eq!(li.unit_price, 12.5);
        assert_eq!(li.quantity, 3);

        let li = item(r#"{"price":10,"quantity":2.9}"#);
        assert_eq!(li.quantity, 2);
    }

    #[test]
    fn explicit_null_quantity_is_missing() {
        assert_eq!(item(r#"{"quantity":null}"#).quantity, 1);
    }

    #[test]
    fn constructor_normalises() {
        let li = LineItem::new("", f64::NAN, -3);
        assert_eq!(li.product_name, UNKNOWN_PRODUCT);
        assert_eq!(li.unit_price, 0.0);
        assert_eq!(li.quantity, 0);
    }

    #[test]
    fn order_accepts_aliases_and_nulls() {
        let json = r#"{
            "_id": "abc123",
            "user": null,
            "address": {"city": "Palladam"},
            "orderItems": [{"product":{"name":"Saree"},"price":50,"quantity":1}]
        }"#;
        let order = OrderAggregate::from_json(json).unwrap();
        assert_eq!(order.id, "abc123");
        assert_eq!(order.user, Customer::default());
        assert_eq!(order.address.city.as_deref(), Some("Palladam"));
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.invoice_number(), "INV-abc123");
    }

    #[test]
    fn order_without_id_is_rejected() {
        let err = OrderAggregate::from_json(r#"{"lineItems": []}"#).unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidOrder(_)));
    }

    #[test]
    fn numeric_contact_fields_keep_their_digits() {
        let json = r#"{
            "_id": 1042,
            "user": {"firstName": "Asha", "email": ["a@example.com"]},
            "address": {"street": "12 Temple St", "pincode": 641664, "phone": 9800000010, "state": true}
        }"#;
        let order = OrderAggregate::from_json(json).unwrap();
        assert_eq!(order.id, "1042");
        assert_eq!(order.invoice_number(), "INV-1042");
        assert_eq!(order.address.pincode.as_deref(), Some("641664"));
        assert_eq!(order.address.phone_or_na(), "9800000010");
        assert_eq!(order.address.state.as_deref(), Some("true"));
        assert_eq!(order.user.email, None);
        assert_eq!(order.user.email_or_na(), NOT_AVAILABLE);
    }

    #[test]
    fn explicit_zero_quantity_stays_zero() {
        let li = item(r#"{"price":40,"quantity":0}"#);
        assert_eq!(li.quantity, 0);
        assert_eq!(li.row_total(), 0.0);
    }

    #[test]
    fn customer_and_address_formatting() {
        let c = Customer {
            first_name: Some("Asha".into()),
            last_name: None,
            email: Some("".into()),
        };
        assert_eq!(c.display_name(), "Asha");
        assert_eq!(c.email_or_na(), NOT_AVAILABLE);

        let a = Address {
            street: Some("1 Main Rd".into()),
            city: Some("Palladam".into()),
            state: Some("TN".into()),
            pincode: Some("641664".into()),
            phone: None,
        };
        assert_eq!(a.one_line(), "1 Main Rd, Palladam, TN - 641664");
        assert_eq!(a.phone_or_na(), NOT_AVAILABLE);
    }

    #[test]
    fn line_item_serializes_to_wire_shape() {
        let li = LineItem::new("Dupatta", 75.0, 2);
        let v = serde_json::to_value(&li).unwrap();
        assert_eq!(v["product"]["name"], "Dupatta");
        assert_eq!(v["quantity"], 2);
    }
}
