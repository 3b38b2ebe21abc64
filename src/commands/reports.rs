use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Stores;
use crate::error::{DeskError, Result};
use crate::models::{
    Invoice, InvoiceStatus, OccupancySummary, PaymentMethod, RevenueSummary, Room, RoomStatus,
};
use crate::store::Store;

pub struct Reports {
    rooms: Arc<dyn Store<Room>>,
    invoices: Arc<dyn Store<Invoice>>,
}

impl Reports {
    pub fn new(stores: &Stores) -> Self {
        Reports {
            rooms: Arc::clone(&stores.rooms),
            invoices: Arc::clone(&stores.invoices),
        }
    }

    /// Revenue from invoices paid between `from` and `to`, both days included.
    pub fn revenue(&self, from: NaiveDate, to: NaiveDate) -> Result<RevenueSummary> {
        if to < from {
            return Err(DeskError::DateRangeInvalid { start: from, end: to });
        }
        let in_window = |day: NaiveDate| from <= day && day <= to;

        let mut summary = RevenueSummary {
            from,
            to,
            paid_invoices: 0,
            total_revenue: Decimal::ZERO,
            cash_revenue: Decimal::ZERO,
            transfer_revenue: Decimal::ZERO,
            unpaid_invoices: 0,
        };

        for invoice in self.invoices.list()? {
            match invoice.status {
                InvoiceStatus::Paid => {
                    let Some(paid_at) = invoice.paid_at else { continue };
                    if !in_window(paid_at.date_naive()) {
                        continue;
                    }
                    summary.paid_invoices += 1;
                    summary.total_revenue += invoice.total;
                    match invoice.payment_method {
                        Some(PaymentMethod::Cash) => summary.cash_revenue += invoice.total,
                        Some(PaymentMethod::Transfer) => summary.transfer_revenue += invoice.total,
                        None => {}
                    }
                }
                InvoiceStatus::Unpaid if in_window(invoice.created_at.date_naive()) => {
                    summary.unpaid_invoices += 1;
                }
                InvoiceStatus::Unpaid | InvoiceStatus::Void => {}
            }
        }

        tracing::debug!(%from, %to, paid = summary.paid_invoices, total = %summary.total_revenue, "revenue report");
        Ok(summary)
    }

    pub fn occupancy(&self) -> Result<OccupancySummary> {
        let rooms = self.rooms.list()?;
        let count = |status: RoomStatus| rooms.iter().filter(|r| r.status == status).count();

        let occupied = count(RoomStatus::Occupied);
        let occupancy_rate = if rooms.is_empty() {
            0.0
        } else {
            occupied as f64 / rooms.len() as f64
        };

        Ok(OccupancySummary {
            total_rooms: rooms.len(),
            available: count(RoomStatus::Available),
            occupied,
            cleaning: count(RoomStatus::Cleaning),
            maintenance: count(RoomStatus::Maintenance),
            occupancy_rate,
        })
    }
}
