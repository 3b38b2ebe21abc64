use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DeskError;
use crate::store::Record;

pub type RecordId = i64;

macro_rules! status_strings {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = DeskError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(DeskError::validation(format!(
                        "unknown {}: {}",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

// ===== Rooms =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    Maintenance,
}

status_strings!(RoomStatus {
    Available => "available",
    Occupied => "occupied",
    Cleaning => "cleaning",
    Maintenance => "maintenance",
});

impl RoomStatus {
    pub const ALL: [RoomStatus; 4] = [
        RoomStatus::Available,
        RoomStatus::Occupied,
        RoomStatus::Cleaning,
        RoomStatus::Maintenance,
    ];
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RecordId,
    pub name: String,
    pub capacity: u32,
    pub status: RoomStatus,
    pub building: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_guest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_booking_id: Option<RecordId>,
}

impl Room {
    pub(crate) fn clear_occupant(&mut self) {
        self.current_guest = None;
        self.current_booking_id = None;
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub name: String,
    pub capacity: u32,
    pub building: String,
}

#[derive(Debug, Default, Clone)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub building: Option<String>,
}

// ===== Bookings =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
    Rejected,
}

status_strings!(BookingStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    CheckedIn => "checked_in",
    CheckedOut => "checked_out",
    Cancelled => "cancelled",
    Rejected => "rejected",
});

impl BookingStatus {
    /// Statuses that hold the room for their date range.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::CheckedIn)
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            BookingStatus::CheckedOut | BookingStatus::Cancelled | BookingStatus::Rejected => true,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: RecordId,
    pub room_id: RecordId,
    pub customer_name: String,
    pub guests: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Half-open range test: a departure on the arrival day of another stay is not a clash.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start < end && start < self.end
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub room_id: RecordId,
    pub customer_name: String,
    pub guests: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub room_id: Option<RecordId>,
    pub status: Option<BookingStatus>,
}

// ===== Line items =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: RecordId,
    pub service_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub service_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl NewLineItem {
    pub fn new(service_name: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        NewLineItem {
            service_name: service_name.into(),
            quantity,
            unit_price,
        }
    }
}

// ===== Service orders =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

status_strings!(ServiceOrderStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl ServiceOrderStatus {
    pub fn can_transition_to(&self, next: ServiceOrderStatus) -> bool {
        use ServiceOrderStatus::*;
        match (self, next) {
            (Pending, InProgress) | (Pending, Cancelled) => true,
            (InProgress, Completed) | (InProgress, Cancelled) => true,
            (Pending, _) | (InProgress, _) | (Completed, _) | (Cancelled, _) => false,
        }
    }

    pub fn accepts_item_changes(&self) -> bool {
        matches!(self, ServiceOrderStatus::Pending | ServiceOrderStatus::InProgress)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    pub id: RecordId,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<RecordId>,
    pub created_at: DateTime<Utc>,
    pub status: ServiceOrderStatus,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceOrder {
    pub customer_name: String,
    pub room_code: Option<String>,
    pub booking_id: Option<RecordId>,
    #[serde(default)]
    pub items: Vec<NewLineItem>,
}

// ===== Invoices =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Void,
}

status_strings!(InvoiceStatus {
    Unpaid => "unpaid",
    Paid => "paid",
    Void => "void",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "transfer" => Ok(PaymentMethod::Transfer),
            _ => Err(DeskError::InvalidMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: RecordId,
    pub customer_name: String,
    pub created_at: DateTime<Utc>,
    pub status: InvoiceStatus,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_order_id: Option<RecordId>,
}

// ===== Staff tasks =====

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

status_strings!(TaskPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    Cancelled,
}

status_strings!(TaskStatus {
    Todo => "todo",
    InProgress => "in_progress",
    Done => "done",
    Cancelled => "cancelled",
});

impl TaskStatus {
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Todo, InProgress) | (Todo, Cancelled) => true,
            (InProgress, Done) | (InProgress, Cancelled) => true,
            (Todo, _) | (InProgress, _) | (Done, _) | (Cancelled, _) => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Cancelled)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaffTask {
    pub id: RecordId,
    pub title: String,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffTask {
    pub title: String,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub description: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub assignee: Option<String>,
    pub status: Option<TaskStatus>,
}

// ===== Reports =====

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub paid_invoices: usize,
    pub total_revenue: Decimal,
    pub cash_revenue: Decimal,
    pub transfer_revenue: Decimal,
    pub unpaid_invoices: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySummary {
    pub total_rooms: usize,
    pub available: usize,
    pub occupied: usize,
    pub cleaning: usize,
    pub maintenance: usize,
    pub occupancy_rate: f64,
}

// ===== Store records =====

macro_rules! record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> RecordId {
                self.id
            }

            fn set_id(&mut self, id: RecordId) {
                self.id = id;
            }
        }
    };
}

record!(Room, "room");
record!(Booking, "booking");
record!(ServiceOrder, "service_order");
record!(Invoice, "invoice");
record!(StaffTask, "staff_task");
