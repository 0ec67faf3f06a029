use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = SchemaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<i64>()
            .map(OrderId)
            .map_err(|_| SchemaError::InvalidOrderId(raw.to_string()))
    }
}

/// Operator identity as persisted by the login flow. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle stage of an order. Wire spelling matches the variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Accepted,
    Inprogress,
    Complete,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Inprogress,
        OrderStatus::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Inprogress => "Inprogress",
            OrderStatus::Complete => "Complete",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = SchemaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| SchemaError::UnknownStatus(raw.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub building: Option<String>,
    pub street: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Address {
    /// `"<building> <street>,<area> <city>"`, missing parts rendered empty.
    pub fn single_line(&self) -> String {
        let part = |value: &Option<String>| value.as_deref().unwrap_or_default().to_string();
        format!(
            "{} {},{} {}",
            part(&self.building),
            part(&self.street),
            part(&self.area),
            part(&self.city)
        )
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
}

/// Canonical order shape. Backend-specific wire records are mapped onto this
/// by the adapters in [`crate::protocol`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub date: Option<String>,
    pub time_slot: Option<String>,
    pub total_amount: Option<String>,
    pub customer_name: Option<String>,
    pub contact: ContactInfo,
    pub comments: Vec<String>,
    pub address: Address,
    pub cash_collected: bool,
}

impl Order {
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            date: None,
            time_slot: None,
            total_amount: None,
            customer_name: None,
            contact: ContactInfo::default(),
            comments: Vec::new(),
            address: Address::default(),
            cash_collected: false,
        }
    }
}
