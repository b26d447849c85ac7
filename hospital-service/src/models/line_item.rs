//! Draft line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Line item on the draft bill.
///
/// A row only counts toward the bill once it is *billable*: the name is
/// non-empty and the quantity positive. Unbillable rows stay visible in the
/// draft but are dropped at commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn is_billable(&self) -> bool {
        !self.name.trim().is_empty() && self.quantity > 0
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

impl Default for LineItem {
    /// The empty row the billing form starts with.
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: 1,
            unit_price: Decimal::ZERO,
        }
    }
}

/// Partial update merged into one draft line item.
#[derive(Debug, Clone, Default)]
pub struct LineItemPatch {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<Decimal>,
}
