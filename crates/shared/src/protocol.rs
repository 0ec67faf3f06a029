//! Wire records for the two order backends and their adapters onto [`Order`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Address, ContactInfo, Order, OrderId, OrderStatus},
    error::SchemaError,
};

/// Which backend record shape the orders endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSchema {
    #[default]
    Storefront,
    Rider,
}

impl OrderSchema {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderSchema::Storefront => "storefront",
            OrderSchema::Rider => "rider",
        }
    }

    /// Decodes a JSON array response body into canonical orders, preserving
    /// server order.
    pub fn decode_orders(self, body: &[u8]) -> Result<Vec<Order>, SchemaError> {
        match self {
            OrderSchema::Storefront => serde_json::from_slice::<Vec<StorefrontOrderRecord>>(body)?
                .into_iter()
                .map(Order::try_from)
                .collect(),
            OrderSchema::Rider => serde_json::from_slice::<Vec<RiderOrderRecord>>(body)?
                .into_iter()
                .map(Order::try_from)
                .collect(),
        }
    }
}

impl fmt::Display for OrderSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSchema {
    type Err = SchemaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "storefront" => Ok(OrderSchema::Storefront),
            "rider" => Ok(OrderSchema::Rider),
            _ => Err(SchemaError::UnknownSchema(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrdersQuery<'a> {
    pub status: OrderStatus,
    pub user_id: &'a str,
}

/// Form body of the status-update write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateForm {
    pub order_id: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Text(String),
}

impl WireId {
    fn into_order_id(self) -> Result<OrderId, SchemaError> {
        match self {
            WireId::Int(value) => Ok(OrderId(value)),
            WireId::Text(raw) => raw.parse(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireText {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireText> for String {
    fn from(value: WireText) -> Self {
        match value {
            WireText::Text(text) => text,
            WireText::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl WireFlag {
    fn is_truthy(&self) -> bool {
        match self {
            WireFlag::Bool(value) => *value,
            WireFlag::Int(value) => *value != 0,
            WireFlag::Text(value) => matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireCoordinate {
    Number(f64),
    Text(String),
}

impl WireCoordinate {
    fn to_f64(&self) -> Option<f64> {
        match self {
            WireCoordinate::Number(value) => Some(*value),
            WireCoordinate::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

fn text(value: Option<WireText>) -> Option<String> {
    value.map(String::from)
}

fn coordinate(value: Option<WireCoordinate>) -> Option<f64> {
    value.as_ref().and_then(WireCoordinate::to_f64)
}

fn flag(value: Option<WireFlag>) -> bool {
    value.as_ref().is_some_and(WireFlag::is_truthy)
}

/// Record shape of the storefront backend: flat address, `id`, `number`,
/// `total_amount`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontOrderRecord {
    id: WireId,
    #[serde(default)]
    date: Option<WireText>,
    #[serde(default)]
    time_slot_value: Option<WireText>,
    #[serde(default)]
    total_amount: Option<WireText>,
    #[serde(default)]
    name: Option<WireText>,
    #[serde(default)]
    number: Option<WireText>,
    #[serde(default)]
    whatsapp: Option<WireText>,
    #[serde(default)]
    comments_text: Option<Vec<String>>,
    #[serde(default, rename = "buildingName")]
    building_name: Option<WireText>,
    #[serde(default)]
    street: Option<WireText>,
    #[serde(default)]
    area: Option<WireText>,
    #[serde(default)]
    city: Option<WireText>,
    #[serde(default)]
    latitude: Option<WireCoordinate>,
    #[serde(default)]
    longitude: Option<WireCoordinate>,
    #[serde(default)]
    cash_status: Option<WireFlag>,
}

impl TryFrom<StorefrontOrderRecord> for Order {
    type Error = SchemaError;

    fn try_from(record: StorefrontOrderRecord) -> Result<Self, Self::Error> {
        Ok(Order {
            id: record.id.into_order_id()?,
            date: text(record.date),
            time_slot: text(record.time_slot_value),
            total_amount: text(record.total_amount),
            customer_name: text(record.name),
            contact: ContactInfo {
                phone: text(record.number),
                whatsapp: text(record.whatsapp),
            },
            comments: record.comments_text.unwrap_or_default(),
            address: Address {
                building: text(record.building_name),
                street: text(record.street),
                area: text(record.area),
                city: text(record.city),
                latitude: coordinate(record.latitude),
                longitude: coordinate(record.longitude),
            },
            cash_collected: flag(record.cash_status),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiderShippingAddress {
    #[serde(default)]
    mobile_no: Option<WireText>,
    #[serde(default)]
    name: Option<WireText>,
    #[serde(default)]
    building: Option<WireText>,
    #[serde(default)]
    street: Option<WireText>,
    #[serde(default)]
    area: Option<WireText>,
    #[serde(default)]
    city: Option<WireText>,
    #[serde(default)]
    latitude: Option<WireCoordinate>,
    #[serde(default)]
    longitude: Option<WireCoordinate>,
}

/// Record shape of the rider backend: `order_id`, `total_price`, contact and
/// address nested under `shipping_address`.
#[derive(Debug, Clone, Deserialize)]
pub struct RiderOrderRecord {
    order_id: WireId,
    #[serde(default)]
    date: Option<WireText>,
    #[serde(default)]
    time_slot_value: Option<WireText>,
    #[serde(default)]
    total_price: Option<WireText>,
    #[serde(default)]
    whatsapp: Option<WireText>,
    #[serde(default)]
    comments_text: Option<Vec<String>>,
    #[serde(default)]
    shipping_address: Option<RiderShippingAddress>,
    #[serde(default)]
    cash_status: Option<WireFlag>,
}

impl TryFrom<RiderOrderRecord> for Order {
    type Error = SchemaError;

    fn try_from(record: RiderOrderRecord) -> Result<Self, Self::Error> {
        let shipping = record.shipping_address.unwrap_or_default();
        Ok(Order {
            id: record.order_id.into_order_id()?,
            date: text(record.date),
            time_slot: text(record.time_slot_value),
            total_amount: text(record.total_price),
            customer_name: text(shipping.name),
            contact: ContactInfo {
                phone: text(shipping.mobile_no),
                whatsapp: text(record.whatsapp),
            },
            comments: record.comments_text.unwrap_or_default(),
            address: Address {
                building: text(shipping.building),
                street: text(shipping.street),
                area: text(shipping.area),
                city: text(shipping.city),
                latitude: coordinate(shipping.latitude),
                longitude: coordinate(shipping.longitude),
            },
            cash_collected: flag(record.cash_status),
        })
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
