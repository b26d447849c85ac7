//! The currently edited, uncommitted bill.

use serde::Serialize;

use super::bill::{BillMeta, MetaField};
use super::line_item::LineItem;

/// Draft bill: metadata plus an ordered list of line items.
///
/// The ledger replaces the draft value on every mutation instead of
/// patching it in place, so a reader holding the previous draft never
/// observes a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillDraft {
    pub meta: BillMeta,
    pub items: Vec<LineItem>,
}

impl BillDraft {
    /// A fresh draft: cleared metadata and a single empty line item.
    pub fn new() -> Self {
        Self {
            meta: BillMeta::default(),
            items: vec![LineItem::default()],
        }
    }

    /// Items that will make it into a committed bill.
    pub fn billable_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.is_billable())
    }

    /// Copy of this draft with one metadata attribute replaced. An empty
    /// value clears the optional attributes.
    pub fn with_meta(&self, field: MetaField, value: &str) -> Self {
        let value = value.trim();
        let optional = || Some(value.to_string()).filter(|v| !v.is_empty());

        let mut meta = self.meta.clone();
        match field {
            MetaField::PatientId => meta.patient_id = value.to_string(),
            MetaField::PatientName => meta.patient_name = optional(),
            MetaField::Mrn => meta.mrn = optional(),
            MetaField::Doctor => meta.doctor = optional(),
            MetaField::Phone => meta.phone = optional(),
        }

        Self {
            meta,
            items: self.items.clone(),
        }
    }
}

impl Default for BillDraft {
    fn default() -> Self {
        Self::new()
    }
}
