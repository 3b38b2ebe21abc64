use std::sync::Arc;

use tracing::{info, warn};

use super::{fetch, Stores};
use crate::clock::Clock;
use crate::error::{require_text, DeskError, Result};
use crate::locks::RecordLocks;
use crate::models::{Booking, BookingStatus, CreateRoom, RecordId, Room, RoomFilter, RoomStatus};
use crate::store::Store;

pub struct RoomInventory {
    rooms: Arc<dyn Store<Room>>,
    bookings: Arc<dyn Store<Booking>>,
    locks: Arc<RecordLocks>,
    clock: Arc<dyn Clock>,
}

impl RoomInventory {
    pub fn new(stores: &Stores, locks: Arc<RecordLocks>, clock: Arc<dyn Clock>) -> Self {
        RoomInventory {
            rooms: Arc::clone(&stores.rooms),
            bookings: Arc::clone(&stores.bookings),
            locks,
            clock,
        }
    }

    pub fn list(&self, filter: &RoomFilter) -> Result<Vec<Room>> {
        let rooms = self.rooms.list()?;

        Ok(rooms
            .into_iter()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.building.as_deref().map_or(true, |b| r.building == b))
            .collect())
    }

    pub fn get(&self, id: RecordId) -> Result<Room> {
        fetch(self.rooms.as_ref(), id)
    }

    pub fn create(&self, room: CreateRoom) -> Result<Room> {
        require_text(&room.name, "room name")?;
        require_text(&room.building, "building")?;
        if room.capacity < 1 {
            return Err(DeskError::validation("capacity must be at least 1"));
        }

        let room = self.rooms.insert(Room {
            id: 0,
            name: room.name.trim().to_string(),
            capacity: room.capacity,
            status: RoomStatus::Available,
            building: room.building.trim().to_string(),
            current_guest: None,
            current_booking_id: None,
        })?;
        info!(room_id = room.id, name = %room.name, "room created");

        Ok(room)
    }

    /// Change a room's status by hand.
    ///
    /// `booking_ref` is required for `Occupied` and must name a confirmed or
    /// checked-in booking of this room. Occupying by hand does not check the
    /// booking in: a confirmed booking stays confirmed, can still be checked in
    /// later, and releases the room to cleaning if it is cancelled.
    ///
    /// Leaving `Occupied` is refused while the occupying booking is still
    /// checked in; check-out is the way out.
    pub fn update_status(
        &self,
        room_id: RecordId,
        status: RoomStatus,
        booking_ref: Option<RecordId>,
    ) -> Result<Room> {
        self.locks
            .with_record(room_id, || self.update_status_locked(room_id, status, booking_ref))
    }

    fn update_status_locked(
        &self,
        room_id: RecordId,
        status: RoomStatus,
        booking_ref: Option<RecordId>,
    ) -> Result<Room> {
        let mut room = self.get(room_id)?;
        let from = room.status;

        if from == status && status != RoomStatus::Occupied {
            return Ok(room);
        }

        if from == RoomStatus::Occupied && status != RoomStatus::Occupied {
            if let Some(occupant) = room.current_booking_id {
                let still_in = self
                    .bookings
                    .get(occupant)?
                    .is_some_and(|b| b.status == BookingStatus::CheckedIn);
                if still_in {
                    warn!(room_id, booking_id = occupant, to = %status, "room still has a checked-in guest");
                    return Err(DeskError::invalid_transition("room", from, status));
                }
            }
        }

        match status {
            RoomStatus::Occupied => {
                if from == RoomStatus::Occupied {
                    return Err(DeskError::invalid_transition("room", from, status));
                }
                let booking_id = booking_ref.ok_or_else(|| {
                    DeskError::validation("occupied status requires a booking reference")
                })?;
                let booking = fetch(self.bookings.as_ref(), booking_id)?;
                if booking.room_id != room_id || !booking.status.is_active() {
                    return Err(DeskError::validation(format!(
                        "booking {booking_id} is not an active booking for room {room_id}"
                    )));
                }
                room.current_guest = Some(booking.customer_name);
                room.current_booking_id = Some(booking_id);
            }
            RoomStatus::Available => {
                let today = self.clock.today();
                let holding = self
                    .bookings
                    .list()?
                    .into_iter()
                    .find(|b| b.room_id == room_id && b.status.is_active() && b.covers(today));
                if let Some(booking) = holding {
                    warn!(room_id, booking_id = booking.id, %today, "active booking covers today");
                    return Err(DeskError::invalid_transition("room", from, status));
                }
                room.clear_occupant();
            }
            RoomStatus::Cleaning | RoomStatus::Maintenance => room.clear_occupant(),
        }

        room.status = status;
        self.rooms.update(&room)?;
        info!(room_id, from = %from, to = %status, "room status changed");

        Ok(room)
    }

    pub fn delete(&self, room_id: RecordId) -> Result<()> {
        self.locks.with_record(room_id, || {
            let room = self.get(room_id)?;

            let in_use = self
                .bookings
                .list()?
                .iter()
                .any(|b| b.room_id == room_id && b.status.is_active());
            if in_use {
                return Err(DeskError::RoomInUse { room_id });
            }

            self.rooms.delete(room_id)?;
            info!(room_id, name = %room.name, "room deleted");
            Ok(())
        })
    }
}
