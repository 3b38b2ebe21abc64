use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::{fetch, Stores};
use crate::clock::Clock;
use crate::error::{require_text, DeskError, Result};
use crate::locks::RecordLocks;
use crate::models::{
    Booking, BookingFilter, BookingStatus, CreateBooking, RecordId, Room, RoomStatus,
};
use crate::store::Store;

/// Reservations and the stay lifecycle.
///
/// All mutations for a room run under that room's lock, so the overlap check
/// and the write that depends on it are never split by another approval.
pub struct BookingLedger {
    rooms: Arc<dyn Store<Room>>,
    bookings: Arc<dyn Store<Booking>>,
    locks: Arc<RecordLocks>,
    clock: Arc<dyn Clock>,
}

impl BookingLedger {
    pub fn new(stores: &Stores, locks: Arc<RecordLocks>, clock: Arc<dyn Clock>) -> Self {
        BookingLedger {
            rooms: Arc::clone(&stores.rooms),
            bookings: Arc::clone(&stores.bookings),
            locks,
            clock,
        }
    }

    pub fn get(&self, id: RecordId) -> Result<Booking> {
        fetch(self.bookings.as_ref(), id)
    }

    pub fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .list()?
            .into_iter()
            .filter(|b| filter.room_id.map_or(true, |r| b.room_id == r))
            .filter(|b| filter.status.map_or(true, |s| b.status == s))
            .collect())
    }

    pub fn create(&self, request: CreateBooking) -> Result<Booking> {
        if request.end <= request.start {
            return Err(DeskError::DateRangeInvalid {
                start: request.start,
                end: request.end,
            });
        }
        require_text(&request.customer_name, "customer name")?;

        self.locks.with_record(request.room_id, || {
            let room = fetch(self.rooms.as_ref(), request.room_id)?;
            if request.guests < 1 || request.guests > room.capacity {
                return Err(DeskError::validation(format!(
                    "room {} holds 1 to {} guests, requested {}",
                    room.name, room.capacity, request.guests
                )));
            }

            if let Some(clash) = self.find_conflict(room.id, request.start, request.end, None)? {
                warn!(room_id = room.id, conflicting = clash.id, "booking request overlaps");
                return Err(DeskError::room_unavailable(
                    room.id,
                    format!("booked {} to {} by booking {}", clash.start, clash.end, clash.id),
                ));
            }

            let booking = self.bookings.insert(Booking {
                id: 0,
                room_id: room.id,
                customer_name: request.customer_name.trim().to_string(),
                guests: request.guests,
                start: request.start,
                end: request.end,
                status: BookingStatus::Pending,
                reject_reason: None,
                created_at: self.clock.now(),
            })?;
            info!(booking_id = booking.id, room_id = room.id, start = %booking.start, end = %booking.end, "booking requested");

            Ok(booking)
        })
    }

    /// Confirm a pending booking. Overlap is checked again here since another
    /// request for the same dates may have been approved since creation.
    pub fn approve(&self, id: RecordId) -> Result<Booking> {
        self.with_booking(id, |mut booking| {
            expect_status(&booking, BookingStatus::Pending, "approve")?;

            let room = fetch(self.rooms.as_ref(), booking.room_id)?;
            if room.status == RoomStatus::Maintenance {
                return Err(DeskError::room_unavailable(room.id, "room is under maintenance"));
            }
            if let Some(clash) =
                self.find_conflict(room.id, booking.start, booking.end, Some(booking.id))?
            {
                warn!(booking_id = id, conflicting = clash.id, "approval lost to an earlier confirmation");
                return Err(DeskError::room_unavailable(
                    room.id,
                    format!("booked {} to {} by booking {}", clash.start, clash.end, clash.id),
                ));
            }

            booking.status = BookingStatus::Confirmed;
            self.bookings.update(&booking)?;
            info!(booking_id = id, room_id = room.id, "booking confirmed");
            Ok(booking)
        })
    }

    pub fn reject(&self, id: RecordId, reason: &str) -> Result<Booking> {
        require_text(reason, "reject reason")?;

        self.with_booking(id, |mut booking| {
            expect_status(&booking, BookingStatus::Pending, "reject")?;

            booking.status = BookingStatus::Rejected;
            booking.reject_reason = Some(reason.trim().to_string());
            self.bookings.update(&booking)?;
            info!(booking_id = id, reason, "booking rejected");
            Ok(booking)
        })
    }

    /// Arrival: the booking moves to checked-in and the room becomes occupied by it.
    pub fn check_in(&self, id: RecordId) -> Result<Booking> {
        self.with_booking(id, |mut booking| {
            expect_status(&booking, BookingStatus::Confirmed, "check in")?;

            let mut room = fetch(self.rooms.as_ref(), booking.room_id)?;
            match room.status {
                RoomStatus::Maintenance => {
                    return Err(DeskError::room_unavailable(room.id, "room is under maintenance"));
                }
                // Occupied by hand for this same booking counts as free
                RoomStatus::Occupied if room.current_booking_id != Some(booking.id) => {
                    let guest = room.current_guest.as_deref().unwrap_or("another guest");
                    return Err(DeskError::room_unavailable(
                        room.id,
                        format!("room is occupied by {guest}"),
                    ));
                }
                RoomStatus::Available | RoomStatus::Cleaning | RoomStatus::Occupied => {}
            }

            booking.status = BookingStatus::CheckedIn;
            room.status = RoomStatus::Occupied;
            room.current_guest = Some(booking.customer_name.clone());
            room.current_booking_id = Some(booking.id);

            self.bookings.update(&booking)?;
            self.rooms.update(&room)?;
            info!(booking_id = id, room_id = room.id, "guest checked in");
            Ok(booking)
        })
    }

    /// Departure: the booking closes and the room goes to cleaning.
    pub fn check_out(&self, id: RecordId) -> Result<Booking> {
        self.with_booking(id, |mut booking| {
            expect_status(&booking, BookingStatus::CheckedIn, "check out")?;

            booking.status = BookingStatus::CheckedOut;
            self.bookings.update(&booking)?;
            self.release_room(&booking, true)?;
            info!(booking_id = id, room_id = booking.room_id, "guest checked out");
            Ok(booking)
        })
    }

    /// Cancel from any non-terminal status. Cancelling twice is not an error.
    ///
    /// A room still occupied by the booking, whether through check-in or a
    /// manual status change, goes to cleaning.
    pub fn cancel(&self, id: RecordId) -> Result<Booking> {
        self.with_booking(id, |mut booking| {
            let was = booking.status;
            match was {
                BookingStatus::Cancelled => return Ok(booking),
                BookingStatus::CheckedOut | BookingStatus::Rejected => {
                    return Err(DeskError::invalid_state("booking", id, was, "cancel"));
                }
                BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn => {}
            }

            booking.status = BookingStatus::Cancelled;
            self.bookings.update(&booking)?;
            self.release_room(&booking, was == BookingStatus::CheckedIn)?;
            info!(booking_id = id, from = %was, "booking cancelled");
            Ok(booking)
        })
    }

    /// Load the booking, then reload it under its room's lock and apply `f`.
    fn with_booking<F>(&self, id: RecordId, f: F) -> Result<Booking>
    where
        F: FnOnce(Booking) -> Result<Booking>,
    {
        let room_id = self.get(id)?.room_id;
        self.locks.with_record(room_id, || f(self.get(id)?))
    }

    /// Send the room to cleaning if `booking` still occupies it. A checked-in
    /// stay also releases a room that lost its occupant reference.
    fn release_room(&self, booking: &Booking, was_checked_in: bool) -> Result<()> {
        let Some(mut room) = self.rooms.get(booking.room_id)? else {
            warn!(booking_id = booking.id, room_id = booking.room_id, "room of booking no longer exists");
            return Ok(());
        };

        let holds_room = room.status == RoomStatus::Occupied
            && match room.current_booking_id {
                Some(current) => current == booking.id,
                None => was_checked_in,
            };
        if holds_room {
            room.status = RoomStatus::Cleaning;
            room.clear_occupant();
            self.rooms.update(&room)?;
            info!(booking_id = booking.id, room_id = room.id, "room released to cleaning");
        }
        Ok(())
    }

    fn find_conflict(
        &self,
        room_id: RecordId,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<RecordId>,
    ) -> Result<Option<Booking>> {
        Ok(self.bookings.list()?.into_iter().find(|b| {
            b.room_id == room_id
                && Some(b.id) != exclude
                && b.status.is_active()
                && b.overlaps(start, end)
        }))
    }
}

fn expect_status(booking: &Booking, expected: BookingStatus, action: &'static str) -> Result<()> {
    if booking.status != expected {
        return Err(DeskError::invalid_state(
            "booking",
            booking.id,
            booking.status,
            action,
        ));
    }
    Ok(())
}
