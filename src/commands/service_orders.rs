use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use super::billing::{compute_total, line_item, next_item_id, normalize_items};
use super::{fetch, Stores};
use crate::clock::Clock;
use crate::error::{require_text, DeskError, Result};
use crate::locks::RecordLocks;
use crate::models::{
    Booking, CreateServiceOrder, NewLineItem, RecordId, ServiceOrder, ServiceOrderStatus,
};
use crate::store::Store;

/// Service orders. Item edits and status changes on one order are serialized
/// through `locks`, which invoicing shares.
pub struct ServiceOrders {
    orders: Arc<dyn Store<ServiceOrder>>,
    bookings: Arc<dyn Store<Booking>>,
    locks: Arc<RecordLocks>,
    clock: Arc<dyn Clock>,
}

impl ServiceOrders {
    pub fn new(stores: &Stores, locks: Arc<RecordLocks>, clock: Arc<dyn Clock>) -> Self {
        ServiceOrders {
            orders: Arc::clone(&stores.service_orders),
            bookings: Arc::clone(&stores.bookings),
            locks,
            clock,
        }
    }

    pub fn get(&self, id: RecordId) -> Result<ServiceOrder> {
        fetch(self.orders.as_ref(), id)
    }

    pub fn list(&self, status: Option<ServiceOrderStatus>) -> Result<Vec<ServiceOrder>> {
        Ok(self
            .orders
            .list()?
            .into_iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect())
    }

    pub fn create(&self, order: CreateServiceOrder) -> Result<ServiceOrder> {
        require_text(&order.customer_name, "customer name")?;
        if let Some(booking_id) = order.booking_id {
            fetch(self.bookings.as_ref(), booking_id)?;
        }

        let items = normalize_items(&order.items)?;
        let total_amount = compute_total(&items);
        let order = self.orders.insert(ServiceOrder {
            id: 0,
            customer_name: order.customer_name.trim().to_string(),
            room_code: order.room_code.filter(|c| !c.trim().is_empty()),
            booking_id: order.booking_id,
            created_at: self.clock.now(),
            status: ServiceOrderStatus::Pending,
            items,
            total_amount,
        })?;
        info!(order_id = order.id, total = %order.total_amount, "service order created");

        Ok(order)
    }

    pub fn add_line_item(
        &self,
        order_id: RecordId,
        service_name: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> Result<ServiceOrder> {
        let item = NewLineItem::new(service_name, quantity, unit_price);

        self.locks.with_record(order_id, || {
            let mut order = self.editable(order_id, "add items to")?;
            order.items.push(line_item(next_item_id(&order.items), &item)?);
            self.save_with_total(order)
        })
    }

    pub fn remove_line_item(&self, order_id: RecordId, item_id: RecordId) -> Result<ServiceOrder> {
        self.locks.with_record(order_id, || {
            let mut order = self.editable(order_id, "remove items from")?;

            let position = order
                .items
                .iter()
                .position(|item| item.id == item_id)
                .ok_or_else(|| DeskError::not_found("line item", item_id))?;
            order.items.remove(position);

            self.save_with_total(order)
        })
    }

    pub fn transition(&self, order_id: RecordId, status: ServiceOrderStatus) -> Result<ServiceOrder> {
        self.locks.with_record(order_id, || {
            let mut order = self.get(order_id)?;

            if !order.status.can_transition_to(status) {
                return Err(DeskError::invalid_transition("service order", order.status, status));
            }

            let from = order.status;
            order.status = status;
            self.orders.update(&order)?;
            info!(order_id, from = %from, to = %status, "service order status changed");

            Ok(order)
        })
    }

    fn editable(&self, order_id: RecordId, action: &'static str) -> Result<ServiceOrder> {
        let order = self.get(order_id)?;
        if !order.status.accepts_item_changes() {
            return Err(DeskError::invalid_state("service order", order_id, order.status, action));
        }
        Ok(order)
    }

    fn save_with_total(&self, mut order: ServiceOrder) -> Result<ServiceOrder> {
        order.total_amount = compute_total(&order.items);
        self.orders.update(&order)?;
        info!(order_id = order.id, items = order.items.len(), total = %order.total_amount, "service order items changed");
        Ok(order)
    }
}
