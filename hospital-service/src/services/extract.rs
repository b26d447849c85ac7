//! Turn uploaded bill files into draft line items.

use anyhow::anyhow;
use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::LineItem;

/// Extracts line items from a photographed or scanned bill.
///
/// OCR is deployment-specific and no reader ships with the demo; the
/// upload-image endpoint answers 503 while none is configured.
#[async_trait]
pub trait ImageBillReader: Send + Sync {
    async fn extract(&self, data: &[u8], content_type: &str) -> Result<Vec<LineItem>, AppError>;
}

/// Parse an uploaded items CSV into draft line items.
///
/// The file must carry a header naming `name`, `qty` (or `quantity`) and
/// `price` (or `unit_price`) columns, in any order. Numeric cells are
/// coerced the same way the billing form coerces its inputs.
pub fn parse_items_csv(data: &[u8]) -> Result<Vec<LineItem>, AppError> {
    let text = std::str::from_utf8(data)
        .map_err(|_| AppError::BadRequest(anyhow!("Bill CSV is not valid UTF-8")))?;

    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| AppError::BadRequest(anyhow!("Bill CSV is empty")))?;
    let columns: Vec<String> = split_csv_line(header)
        .iter()
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();

    let name_col = position(&columns, &["name", "item", "item_name"]);
    let qty_col = position(&columns, &["qty", "quantity"]);
    let price_col = position(&columns, &["price", "unit_price", "rate"]);

    let (name_col, qty_col, price_col) = match (name_col, qty_col, price_col) {
        (Some(n), Some(q), Some(p)) => (n, q, p),
        _ => {
            return Err(AppError::BadRequest(anyhow!(
                "Bill CSV header must include name, qty and price columns"
            )))
        }
    };

    let mut items = Vec::new();
    for line in lines {
        let cells = split_csv_line(line);
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");

        items.push(LineItem {
            name: cell(name_col).trim().to_string(),
            quantity: crate::dtos::quantity_from_str(cell(qty_col)),
            unit_price: crate::dtos::price_from_str(cell(price_col)),
        });
    }

    Ok(items)
}

fn position(columns: &[String], names: &[&str]) -> Option<usize> {
    columns.iter().position(|c| names.contains(&c.as_str()))
}

/// Split one CSV line, honoring double-quoted fields with doubled quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
