use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use super::billing::{compute_total, normalize_items};
use super::{fetch, Stores};
use crate::clock::Clock;
use crate::error::{require_text, DeskError, Result};
use crate::locks::RecordLocks;
use crate::models::{
    Invoice, InvoiceStatus, LineItem, NewLineItem, PaymentMethod, RecordId, ServiceOrder,
    ServiceOrderStatus,
};
use crate::store::Store;

/// Invoices and payments. Payment and voiding are serialized per invoice;
/// billing an order holds that order's lock, shared with `ServiceOrders`.
pub struct Invoices {
    invoices: Arc<dyn Store<Invoice>>,
    orders: Arc<dyn Store<ServiceOrder>>,
    invoice_locks: RecordLocks,
    order_locks: Arc<RecordLocks>,
    clock: Arc<dyn Clock>,
}

impl Invoices {
    pub fn new(stores: &Stores, order_locks: Arc<RecordLocks>, clock: Arc<dyn Clock>) -> Self {
        Invoices {
            invoices: Arc::clone(&stores.invoices),
            orders: Arc::clone(&stores.service_orders),
            invoice_locks: RecordLocks::new(),
            order_locks,
            clock,
        }
    }

    pub fn get(&self, id: RecordId) -> Result<Invoice> {
        fetch(self.invoices.as_ref(), id)
    }

    pub fn list(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>> {
        Ok(self
            .invoices
            .list()?
            .into_iter()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .collect())
    }

    /// Build an unpaid invoice. Line totals and the subtotal are recomputed
    /// from quantity and unit price; tax is zero.
    pub fn create_from_items(&self, customer_name: &str, items: &[NewLineItem]) -> Result<Invoice> {
        require_text(customer_name, "customer name")?;
        if items.is_empty() {
            return Err(DeskError::validation("an invoice needs at least one item"));
        }

        let items = normalize_items(items)?;
        self.insert(customer_name.trim().to_string(), items, None)
    }

    /// Bill a completed service order.
    pub fn create_from_service_order(&self, order_id: RecordId) -> Result<Invoice> {
        self.order_locks
            .with_record(order_id, || self.bill_order(order_id))
    }

    fn bill_order(&self, order_id: RecordId) -> Result<Invoice> {
        let order = fetch(self.orders.as_ref(), order_id)?;
        if order.status != ServiceOrderStatus::Completed {
            return Err(DeskError::invalid_state("service order", order_id, order.status, "invoice"));
        }
        if order.items.is_empty() {
            return Err(DeskError::validation(format!("service order {order_id} has no items")));
        }

        let already_billed = self
            .invoices
            .list()?
            .into_iter()
            .find(|i| i.service_order_id == Some(order_id) && i.status != InvoiceStatus::Void);
        if let Some(existing) = already_billed {
            return Err(DeskError::validation(format!(
                "service order {order_id} is already billed by invoice {}",
                existing.id
            )));
        }

        let items = order
            .items
            .iter()
            .map(|item| LineItem {
                line_total: item.unit_price * Decimal::from(item.quantity),
                ..item.clone()
            })
            .collect();
        self.insert(order.customer_name, items, Some(order_id))
    }

    /// Record payment. Cash and transfer may both carry an optional reference code.
    pub fn mark_paid(
        &self,
        invoice_id: RecordId,
        method: &str,
        reference_code: Option<&str>,
    ) -> Result<Invoice> {
        self.invoice_locks.with_record(invoice_id, || {
            self.mark_paid_locked(invoice_id, method, reference_code)
        })
    }

    fn mark_paid_locked(
        &self,
        invoice_id: RecordId,
        method: &str,
        reference_code: Option<&str>,
    ) -> Result<Invoice> {
        let mut invoice = self.get(invoice_id)?;

        match invoice.status {
            InvoiceStatus::Paid => {
                warn!(invoice_id, "invoice already paid");
                return Err(DeskError::AlreadyPaid { invoice_id });
            }
            InvoiceStatus::Void => {
                return Err(DeskError::invalid_state("invoice", invoice_id, invoice.status, "pay"));
            }
            InvoiceStatus::Unpaid => {}
        }
        let method: PaymentMethod = method.parse()?;

        invoice.status = InvoiceStatus::Paid;
        invoice.payment_method = Some(method);
        invoice.reference_code = reference_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string);
        invoice.paid_at = Some(self.clock.now());
        self.invoices.update(&invoice)?;
        info!(invoice_id, method = %method, total = %invoice.total, "invoice paid");

        Ok(invoice)
    }

    /// Void an unpaid invoice. Voiding twice is not an error.
    pub fn void(&self, invoice_id: RecordId) -> Result<Invoice> {
        self.invoice_locks.with_record(invoice_id, || {
            let mut invoice = self.get(invoice_id)?;

            match invoice.status {
                InvoiceStatus::Void => return Ok(invoice),
                InvoiceStatus::Paid => return Err(DeskError::AlreadyPaid { invoice_id }),
                InvoiceStatus::Unpaid => {}
            }

            invoice.status = InvoiceStatus::Void;
            self.invoices.update(&invoice)?;
            info!(invoice_id, "invoice voided");

            Ok(invoice)
        })
    }

    fn insert(
        &self,
        customer_name: String,
        items: Vec<LineItem>,
        service_order_id: Option<RecordId>,
    ) -> Result<Invoice> {
        let subtotal = compute_total(&items);
        let tax = Decimal::ZERO;

        let invoice = self.invoices.insert(Invoice {
            id: 0,
            customer_name,
            created_at: self.clock.now(),
            status: InvoiceStatus::Unpaid,
            items,
            subtotal,
            tax,
            total: subtotal + tax,
            payment_method: None,
            paid_at: None,
            reference_code: None,
            service_order_id,
        })?;
        info!(invoice_id = invoice.id, total = %invoice.total, "invoice created");

        Ok(invoice)
    }
}
