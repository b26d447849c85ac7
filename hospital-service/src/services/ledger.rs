//! The billing ledger: the session's draft and committed bills.
//!
//! The ledger is the single writer for billing state. Draft editing is
//! ungated; the role policy is enforced where money becomes real, at
//! commit. Committed bills are immutable and kept newest-first for the
//! lifetime of the session.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Bill, BillDraft, BillItem, LineItem, LineItemPatch, MetaField, Role, Totals};
use service_core::error::AppError;

/// Billing policy: which roles may commit bills, and at what tax rate.
///
/// The authorized set is configuration, not literals at call sites. The
/// default is the clinical billing policy: Manager and Doctor.
#[derive(Debug, Clone)]
pub struct BillingPolicy {
    tax_rate: Decimal,
    authorized_roles: Vec<Role>,
}

impl BillingPolicy {
    pub fn new(tax_rate: Decimal, authorized_roles: Vec<Role>) -> Self {
        Self {
            tax_rate,
            authorized_roles,
        }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn authorizes(&self, role: Role) -> bool {
        self.authorized_roles.contains(&role)
    }

    /// Totals over the draft's billable items. Pure: safe to call on every
    /// keystroke for live display.
    pub fn compute_totals(&self, draft: &BillDraft) -> Totals {
        let subtotal: Decimal = draft.billable_items().map(LineItem::line_total).sum();
        let tax = round_money(subtotal * self.tax_rate);
        let total = round_money(subtotal + tax);
        Totals {
            subtotal,
            tax,
            total,
        }
    }
}

/// Two-decimal invoice rounding, half away from zero.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Role {0} is not authorized to create bills")]
    PermissionDenied(Role),

    #[error("{0}")]
    Validation(&'static str),

    #[error("Line item index {index} is out of range (draft has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = anyhow::anyhow!("{}", err);
        match err {
            LedgerError::PermissionDenied(_) => AppError::PermissionDenied(message),
            LedgerError::Validation(_) => AppError::Validation(message),
            LedgerError::IndexOutOfRange { .. } => AppError::BadRequest(message),
        }
    }
}

/// In-memory billing ledger.
pub struct BillingLedger {
    policy: BillingPolicy,
    draft: BillDraft,
    bills: Vec<Bill>,
}

impl BillingLedger {
    pub fn new(policy: BillingPolicy) -> Self {
        Self {
            policy,
            draft: BillDraft::new(),
            bills: Vec::new(),
        }
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    pub fn draft(&self) -> &BillDraft {
        &self.draft
    }

    /// Committed bills, newest first.
    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    /// Live totals for the owned draft.
    pub fn totals(&self) -> Totals {
        self.policy.compute_totals(&self.draft)
    }

    /// Replace one metadata attribute. The draft value is replaced
    /// wholesale, never patched in place.
    pub fn set_meta(&mut self, field: MetaField, value: &str) {
        self.draft = self.draft.with_meta(field, value);
    }

    /// Append the default empty line item. Ungated: row editing is not a
    /// money-mutating operation.
    pub fn add_line_item(&mut self) {
        let mut items = self.draft.items.clone();
        items.push(LineItem::default());
        self.replace_items(items);
    }

    /// Merge a partial patch into the line item at `index`.
    pub fn update_line_item(
        &mut self,
        index: usize,
        patch: LineItemPatch,
    ) -> Result<(), LedgerError> {
        let len = self.draft.items.len();
        if index >= len {
            return Err(LedgerError::IndexOutOfRange { index, len });
        }

        let mut items = self.draft.items.clone();
        let item = &mut items[index];
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity.max(0);
        }
        if let Some(unit_price) = patch.unit_price {
            item.unit_price = unit_price.max(Decimal::ZERO);
        }
        self.replace_items(items);
        Ok(())
    }

    /// Remove the line item at `index`. Removing the last row is allowed;
    /// the resulting zero-item draft simply cannot be committed.
    pub fn remove_line_item(&mut self, index: usize) -> Result<(), LedgerError> {
        let len = self.draft.items.len();
        if index >= len {
            return Err(LedgerError::IndexOutOfRange { index, len });
        }

        let mut items = self.draft.items.clone();
        items.remove(index);
        self.replace_items(items);
        Ok(())
    }

    /// Commit the owned draft. On success the draft resets to a single
    /// empty line item with cleared metadata; on failure both the draft and
    /// the committed list are left untouched.
    pub fn commit_draft(&mut self, role: Role) -> Result<Bill, LedgerError> {
        let draft = self.draft.clone();
        let bill = self.commit_with(&draft, role)?;
        self.reset_draft();
        Ok(bill)
    }

    /// Validate and commit an arbitrary draft into the session list.
    ///
    /// Used by the stateless creation paths (`POST /bills`, file uploads):
    /// those commit a caller-supplied draft and must not clobber the
    /// session draft being edited.
    pub fn commit_with(&mut self, draft: &BillDraft, role: Role) -> Result<Bill, LedgerError> {
        if !self.policy.authorizes(role) {
            return Err(LedgerError::PermissionDenied(role));
        }
        if draft.meta.patient_id.trim().is_empty() {
            return Err(LedgerError::Validation("A patient identifier is required"));
        }

        let items: Vec<BillItem> = draft.billable_items().map(BillItem::from).collect();
        if items.is_empty() {
            return Err(LedgerError::Validation(
                "At least one billable line item is required",
            ));
        }

        let totals = self.policy.compute_totals(draft);
        let bill = Bill {
            bill_id: Uuid::new_v4().to_string(),
            meta: draft.meta.clone(),
            items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            created_at: Utc::now(),
        };

        self.bills.insert(0, bill.clone());
        Ok(bill)
    }

    /// Discard the draft and start over with a fresh one.
    pub fn reset_draft(&mut self) {
        self.draft = BillDraft::new();
    }

    /// Prepend a bill produced by a remote collaborator, verbatim. The
    /// collaborator owns the totals on this path; nothing is recomputed.
    pub fn import_external(&mut self, bill: Bill) {
        self.bills.insert(0, bill);
    }

    fn replace_items(&mut self, items: Vec<LineItem>) {
        self.draft = BillDraft {
            meta: self.draft.meta.clone(),
            items,
        };
    }
}
