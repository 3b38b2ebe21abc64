//! Line-item arithmetic shared by service orders and invoices.
//!
//! Totals are always derived from the items through [`compute_total`]; nothing
//! else in the crate sums prices.

use rust_decimal::Decimal;

use crate::error::{require_text, DeskError, Result};
use crate::models::{LineItem, NewLineItem, RecordId};

/// Maximum quantity accepted on a single line
pub const MAX_QUANTITY: i64 = 9999;

/// Sum of `quantity * unit_price` over all items. Zero-price items add nothing.
pub fn compute_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum()
}

/// Validate one requested line and turn it into a stored line with the given id.
pub fn line_item(id: RecordId, item: &NewLineItem) -> Result<LineItem> {
    require_text(&item.service_name, "service name")?;
    if item.quantity <= 0 {
        return Err(DeskError::validation(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(DeskError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
            item.quantity
        )));
    }
    if item.unit_price < Decimal::ZERO {
        return Err(DeskError::validation(format!(
            "unit price must be non-negative, got {}",
            item.unit_price
        )));
    }

    // Checked against MAX_QUANTITY above
    let quantity = item.quantity as u32;
    Ok(LineItem {
        id,
        service_name: item.service_name.trim().to_string(),
        quantity,
        unit_price: item.unit_price,
        line_total: item.unit_price * Decimal::from(quantity),
    })
}

/// Validate a batch of requested lines, numbering them from 1.
pub fn normalize_items(items: &[NewLineItem]) -> Result<Vec<LineItem>> {
    items
        .iter()
        .zip(1..)
        .map(|(item, id)| line_item(id, item))
        .collect()
}

/// Next free line id within one parent record.
pub fn next_item_id(items: &[LineItem]) -> RecordId {
    items.iter().map(|item| item.id).max().unwrap_or(0) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(name: &str, quantity: i64, price: i64) -> NewLineItem {
        NewLineItem::new(name, quantity, Decimal::from(price))
    }

    #[test]
    fn test_compute_total_empty_is_zero() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_with_free_item() {
        let items = normalize_items(&[new_item("Laundry", 2, 15000), new_item("Welcome drink", 1, 0)])
            .unwrap();
        assert_eq!(compute_total(&items), Decimal::from(30000));
        assert_eq!(items[1].line_total, Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_keeps_cents() {
        let items = normalize_items(&[
            NewLineItem::new("Coffee", 3, Decimal::new(250, 2)),
            NewLineItem::new("Water", 1, Decimal::new(99, 2)),
        ])
        .unwrap();
        assert_eq!(compute_total(&items), Decimal::new(849, 2));
    }

    #[test]
    fn test_normalize_assigns_sequential_ids_and_line_totals() {
        let items = normalize_items(&[new_item("Breakfast", 2, 50000), new_item("Taxi", 1, 120000)])
            .unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(items[0].line_total, Decimal::from(100000));
        assert_eq!(next_item_id(&items), 3);
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert!(matches!(
            line_item(1, &new_item("Spa", 0, 10)),
            Err(DeskError::Validation(_))
        ));
        assert!(matches!(
            line_item(1, &new_item("Spa", -2, 10)),
            Err(DeskError::Validation(_))
        ));
        assert!(matches!(
            line_item(1, &new_item("Spa", 1, -10)),
            Err(DeskError::Validation(_))
        ));
        assert!(matches!(
            line_item(1, &new_item("  ", 1, 10)),
            Err(DeskError::Validation(_))
        ));
        assert!(line_item(1, &new_item("Spa", MAX_QUANTITY + 1, 10)).is_err());
    }

    #[test]
    fn test_next_item_id_after_removal() {
        let mut items =
            normalize_items(&[new_item("A", 1, 1), new_item("B", 1, 1), new_item("C", 1, 1)]).unwrap();
        items.remove(2);
        assert_eq!(next_item_id(&items), 3);
        assert_eq!(next_item_id(&[]), 1);
    }
}
