//! Committed bills and bill metadata.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;

/// Bill metadata: the patient the bill is for.
///
/// Lives on the draft while editing and is snapshotted into the bill at
/// commit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillMeta {
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub mrn: Option<String>,
    pub doctor: Option<String>,
    pub phone: Option<String>,
}

/// Metadata attribute addressed by `set_meta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaField {
    PatientId,
    PatientName,
    Mrn,
    Doctor,
    Phone,
}

/// Line item frozen into a committed bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&LineItem> for BillItem {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
        }
    }
}

/// Subtotal, tax and total for a set of line items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Committed bill. Immutable once created; retained newest-first for the
/// lifetime of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: String,
    pub meta: BillMeta,
    pub items: Vec<BillItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}
