// Room catalog: the in-memory set of rooms plus the running revenue total
// Lookups go through an id index; listing preserves insertion order

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::NaiveDate;
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HotelError, HotelResult};
use crate::room::{Room, RoomSnapshot, RoomType};

// Rooms every freshly opened catalog starts with
pub const SEED_ROOMS: [(&str, RoomType); 3] = [
    ("101", RoomType::Single),
    ("102", RoomType::Double),
    ("103", RoomType::Suite),
];

// Source of "today" for checkouts and cancellations
pub trait Clock: Send + Sync + 'static {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

// Clock pinned to a date that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock() = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyReport {
    pub total: usize,
    pub occupied: usize,
    pub vacant: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub rooms: Vec<RoomSnapshot>,
    pub total_revenue: u64,
}

pub struct RoomCatalog {
    rooms: RwLock<Vec<Arc<Room>>>,
    index: DashMap<String, Arc<Room>>,
    total_revenue: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl Default for RoomCatalog {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RoomCatalog {
    /// Empty catalog using `clock` for checkout dates.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: RwLock::new(Vec::new()),
            index: DashMap::new(),
            total_revenue: AtomicU64::new(0),
            clock,
        }
    }

    /// Catalog holding the three standard rooms (101 single, 102 double, 103 suite).
    pub fn seeded() -> Self {
        Self::seeded_with_clock(Arc::new(SystemClock))
    }

    pub fn seeded_with_clock(clock: Arc<dyn Clock>) -> Self {
        let catalog = Self::new(clock);
        {
            let mut rooms = catalog.rooms.write();
            for (id, room_type) in SEED_ROOMS {
                let room = Arc::new(Room::new(id, room_type));
                catalog.index.insert(id.to_string(), room.clone());
                rooms.push(room);
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.rooms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.read().is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn get_room(&self, room_id: &str) -> HotelResult<Arc<Room>> {
        debug!(room_id, "room lookup");
        self.index
            .get(room_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| HotelError::NotFound(room_id.to_string()))
    }

    /// All rooms, in the order they were added.
    pub fn rooms(&self) -> Vec<Arc<Room>> {
        self.rooms.read().clone()
    }

    pub fn available_rooms(&self) -> Vec<Arc<Room>> {
        self.filter_rooms(|room| !room.is_occupied())
    }

    pub fn rooms_by_type(&self, room_type: RoomType) -> Vec<Arc<Room>> {
        self.filter_rooms(|room| room.room_type() == room_type)
    }

    fn filter_rooms(&self, keep: impl Fn(&Room) -> bool) -> Vec<Arc<Room>> {
        self.rooms
            .read()
            .iter()
            .filter(|room| keep(room))
            .cloned()
            .collect()
    }

    /// Appends a room to the catalog. Ids must be unique.
    pub fn add_room(&self, room: Room) -> HotelResult<Arc<Room>> {
        // Hold the list lock across the index insert so order and index agree
        let mut rooms = self.rooms.write();

        match self.index.entry(room.id().to_string()) {
            Entry::Occupied(_) => Err(HotelError::DuplicateRoom(room.id().to_string())),
            Entry::Vacant(slot) => {
                let room = Arc::new(room);
                slot.insert(room.clone());
                rooms.push(room.clone());

                info!(room_id = room.id(), room_type = %room.room_type(), "room added");
                Ok(room)
            }
        }
    }

    pub fn check_in(&self, room_id: &str, guest_name: &str, date: NaiveDate) -> HotelResult<()> {
        self.get_room(room_id)?.check_in(guest_name, date)
    }

    /// Checks the guest out today and books the room's price as revenue.
    ///
    /// The occupancy check, the revenue increment and the state flip all happen
    /// under the room's lock, so a room is never charged twice for one stay.
    /// Returns the amount charged.
    pub fn checkout_room(&self, room_id: &str) -> HotelResult<u32> {
        let room = self.get_room(room_id)?;
        let today = self.clock.today();
        let price = room.price();

        room.with_state(|state| -> HotelResult<u32> {
            state.check_out(room.id(), today)?;
            let total = self.total_revenue.fetch_add(u64::from(price), Ordering::SeqCst)
                + u64::from(price);

            info!(room_id, price, total_revenue = total, "revenue booked");
            Ok(price)
        })
    }

    /// Ends the current stay today without charging for it.
    pub fn cancel_reservation(&self, room_id: &str) -> HotelResult<()> {
        let room = self.get_room(room_id)?;
        room.check_out(self.clock.today())?;

        info!(room_id, "reservation cancelled");
        Ok(())
    }

    pub fn booking_history(&self, room_id: &str) -> HotelResult<Vec<String>> {
        Ok(self.get_room(room_id)?.history())
    }

    pub fn total_revenue(&self) -> u64 {
        self.total_revenue.load(Ordering::SeqCst)
    }

    pub fn occupancy(&self) -> OccupancyReport {
        let rooms = self.rooms.read();
        let occupied = rooms.iter().filter(|room| room.is_occupied()).count();

        OccupancyReport {
            total: rooms.len(),
            occupied,
            vacant: rooms.len() - occupied,
        }
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            rooms: self.rooms.read().iter().map(|room| room.snapshot()).collect(),
            total_revenue: self.total_revenue(),
        }
    }

    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}
