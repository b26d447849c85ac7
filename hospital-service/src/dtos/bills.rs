//! Billing DTOs, including the adapter for remote bill records.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use service_core::error::AppError;

use crate::models::{Bill, BillDraft, BillItem, BillMeta, LineItem, LineItemPatch, MetaField, Totals};

fn default_qty() -> i64 {
    1
}

fn lenient_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(super::coerce_quantity(&value))
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(super::coerce_price(&value))
}

fn lenient_opt_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(super::coerce_quantity(&value)))
}

fn lenient_opt_price<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(super::coerce_price(&value)))
}

/// Wire line item. The billing form posts `qty` and `price` straight from
/// its inputs, so both tolerate number-or-string payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDto {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_qty", deserialize_with = "lenient_qty")]
    pub qty: i64,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Decimal,
}

impl From<&LineItemDto> for LineItem {
    fn from(dto: &LineItemDto) -> Self {
        Self {
            name: dto.name.clone(),
            quantity: dto.qty,
            unit_price: dto.price,
        }
    }
}

/// `POST /bills` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBillRequest {
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_phone: Option<String>,
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub mrn: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemDto>,
}

impl CreateBillRequest {
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items.iter().map(LineItem::from).collect()
    }
}

/// Committed line item on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct BillItemDto {
    pub name: String,
    pub qty: i64,
    pub price: Decimal,
    pub line_total: Decimal,
}

impl From<&BillItem> for BillItemDto {
    fn from(item: &BillItem) -> Self {
        Self {
            name: item.name.clone(),
            qty: item.quantity,
            price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

/// Committed bill on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct BillResponse {
    pub bill_id: String,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub mrn: Option<String>,
    pub doctor: Option<String>,
    pub phone: Option<String>,
    pub items: Vec<BillItemDto>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&Bill> for BillResponse {
    fn from(bill: &Bill) -> Self {
        Self {
            bill_id: bill.bill_id.clone(),
            patient_id: bill.meta.patient_id.clone(),
            patient_name: bill.meta.patient_name.clone(),
            mrn: bill.meta.mrn.clone(),
            doctor: bill.meta.doctor.clone(),
            phone: bill.meta.phone.clone(),
            items: bill.items.iter().map(BillItemDto::from).collect(),
            subtotal: bill.subtotal,
            tax: bill.tax,
            total: bill.total,
            created_at: bill.created_at,
        }
    }
}

/// `PUT /draft/meta` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct SetMetaRequest {
    pub field: MetaField,
    #[serde(default)]
    pub value: String,
}

/// `PATCH /draft/items/{index}` request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItemPatchRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_qty")]
    pub qty: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_price")]
    pub price: Option<Decimal>,
}

impl From<LineItemPatchRequest> for LineItemPatch {
    fn from(req: LineItemPatchRequest) -> Self {
        Self {
            name: req.name,
            quantity: req.qty,
            unit_price: req.price,
        }
    }
}

/// Draft plus live totals, as rendered by the billing form.
#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub meta: BillMeta,
    pub items: Vec<DraftItemView>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftItemView {
    pub name: String,
    pub qty: i64,
    pub price: Decimal,
    pub line_total: Decimal,
}

impl DraftView {
    pub fn new(draft: &BillDraft, totals: Totals) -> Self {
        Self {
            meta: draft.meta.clone(),
            items: draft
                .items
                .iter()
                .map(|item| DraftItemView {
                    name: item.name.clone(),
                    qty: item.quantity,
                    price: item.unit_price,
                    line_total: item.line_total(),
                })
                .collect(),
            totals,
        }
    }
}

/// Bill-shaped payload returned by a remote billing collaborator.
///
/// Collaborators disagree on the id field (`bill_id` vs Mongo-style `_id`)
/// and may omit the breakdown fields; normalization happens here, once, and
/// fails fast instead of letting handlers poke at possibly-absent fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalBillRecord {
    #[serde(default)]
    pub bill_id: Option<String>,
    #[serde(default, rename = "_id")]
    pub mongo_id: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub mrn: Option<String>,
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<LineItemDto>>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ExternalBillRecord {
    /// Normalize into a committed bill. The collaborator is the source of
    /// truth for totals on this path; nothing is recomputed.
    pub fn into_bill(self) -> Result<Bill, AppError> {
        let bill_id = self
            .bill_id
            .or(self.mongo_id)
            .ok_or_else(|| AppError::Schema(anyhow!("Remote bill record is missing an id")))?;
        let total = self
            .total
            .ok_or_else(|| AppError::Schema(anyhow!("Remote bill record is missing a total")))?;
        let items = self
            .items
            .ok_or_else(|| AppError::Schema(anyhow!("Remote bill record is missing items")))?;

        let items: Vec<BillItem> = items
            .iter()
            .map(|dto| BillItem {
                name: dto.name.clone(),
                quantity: dto.qty,
                unit_price: dto.price,
                line_total: Decimal::from(dto.qty) * dto.price,
            })
            .collect();

        Ok(Bill {
            bill_id,
            meta: BillMeta {
                patient_id: self.patient_id.unwrap_or_default(),
                patient_name: self.patient_name,
                mrn: self.mrn,
                doctor: self.doctor,
                phone: self.phone,
            },
            items,
            subtotal: self.subtotal.unwrap_or(total),
            tax: self.tax.unwrap_or(Decimal::ZERO),
            total,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        })
    }
}
