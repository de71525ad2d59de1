// Rooms and their occupancy state
// A room is either vacant or occupied; all transitions go through the room's own lock

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HotelError, HotelResult};

// Room categories with their fixed nightly price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Single,
    Double,
    Suite,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [RoomType::Single, RoomType::Double, RoomType::Suite];

    pub fn price(&self) -> u32 {
        match self {
            RoomType::Single => 100,
            RoomType::Double => 150,
            RoomType::Suite => 250,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::Single => "SINGLE",
            RoomType::Double => "DOUBLE",
            RoomType::Suite => "SUITE",
        };
        f.write_str(name)
    }
}

impl FromStr for RoomType {
    type Err = HotelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HotelError::Validation(format!("Unknown room type: {}", s.trim())))
    }
}

// Mutable part of a room, only ever touched while the room lock is held
#[derive(Debug, Default)]
pub(crate) struct RoomState {
    occupied: bool,
    guest: Option<String>,
    check_in_date: Option<NaiveDate>,
    check_out_date: Option<NaiveDate>,
    history: Vec<String>,
}

impl RoomState {
    pub(crate) fn check_in(
        &mut self,
        room_id: &str,
        guest_name: &str,
        date: NaiveDate,
    ) -> HotelResult<()> {
        if self.occupied {
            warn!(room_id, guest_name, "check-in rejected, room is occupied");
            return Err(HotelError::RoomOccupied {
                room_id: room_id.to_string(),
            });
        }

        self.occupied = true;
        self.guest = Some(guest_name.to_string());
        self.check_in_date = Some(date);
        self.history
            .push(format!("Checked in: {} on {}", guest_name, date));

        info!(room_id, guest_name, %date, "checked in");
        Ok(())
    }

    pub(crate) fn check_out(&mut self, room_id: &str, date: NaiveDate) -> HotelResult<()> {
        if !self.occupied {
            warn!(room_id, "check-out rejected, room is vacant");
            return Err(HotelError::RoomNotOccupied {
                room_id: room_id.to_string(),
            });
        }

        self.occupied = false;
        self.guest = None;
        self.check_out_date = Some(date);
        self.history.push(format!("Checked out on {}", date));

        info!(room_id, %date, "checked out");
        Ok(())
    }
}

// Point-in-time view of a room, safe to hand to another thread or serialize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: String,
    pub room_type: RoomType,
    pub price: u32,
    pub occupied: bool,
    pub guest: Option<String>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub history: Vec<String>,
}

#[derive(Debug)]
pub struct Room {
    id: String,
    room_type: RoomType,
    state: Mutex<RoomState>,
}

impl Room {
    pub fn new(id: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            id: id.into(),
            room_type,
            state: Mutex::new(RoomState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn price(&self) -> u32 {
        self.room_type.price()
    }

    /// Marks the room occupied by `guest_name` from `date`.
    ///
    /// Fails with [`HotelError::RoomOccupied`] if someone is already staying here.
    /// Concurrent callers are serialized on the room lock, so exactly one of them wins.
    pub fn check_in(&self, guest_name: &str, date: NaiveDate) -> HotelResult<()> {
        self.state.lock().check_in(&self.id, guest_name, date)
    }

    /// Marks the room vacant as of `date`.
    ///
    /// Fails with [`HotelError::RoomNotOccupied`] if the room is already vacant.
    pub fn check_out(&self, date: NaiveDate) -> HotelResult<()> {
        self.state.lock().check_out(&self.id, date)
    }

    pub fn is_occupied(&self) -> bool {
        self.state.lock().occupied
    }

    pub fn guest(&self) -> Option<String> {
        self.state.lock().guest.clone()
    }

    pub fn check_in_date(&self) -> Option<NaiveDate> {
        self.state.lock().check_in_date
    }

    pub fn check_out_date(&self) -> Option<NaiveDate> {
        self.state.lock().check_out_date
    }

    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.clone()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let state = self.state.lock();
        RoomSnapshot {
            id: self.id.clone(),
            room_type: self.room_type,
            price: self.price(),
            occupied: state.occupied,
            guest: state.guest.clone(),
            check_in_date: state.check_in_date,
            check_out_date: state.check_out_date,
            history: state.history.clone(),
        }
    }

    // Runs `f` inside the room's critical section
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut RoomState) -> R) -> R {
        let mut state = self.state.lock();
        f(&mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_prices_per_type() {
        assert_eq!(RoomType::Single.price(), 100);
        assert_eq!(RoomType::Double.price(), 150);
        assert_eq!(RoomType::Suite.price(), 250);
        assert_eq!(Room::new("103", RoomType::Suite).price(), 250);
    }

    #[test]
    fn test_room_type_parsing() {
        assert_eq!("suite".parse::<RoomType>().unwrap(), RoomType::Suite);
        assert_eq!(" DOUBLE ".parse::<RoomType>().unwrap(), RoomType::Double);
        assert!(matches!(
            "penthouse".parse::<RoomType>(),
            Err(HotelError::Validation(_))
        ));
        assert_eq!(RoomType::Single.to_string(), "SINGLE");
    }

    #[test]
    fn test_check_in_then_out_then_in_again() {
        let room = Room::new("101", RoomType::Single);
        assert!(!room.is_occupied());

        room.check_in("Alice", date("2025-06-01")).unwrap();
        assert!(room.is_occupied());
        assert_eq!(room.guest().as_deref(), Some("Alice"));
        assert_eq!(room.check_in_date(), Some(date("2025-06-01")));

        room.check_out(date("2025-06-05")).unwrap();
        assert!(!room.is_occupied());
        assert_eq!(room.guest(), None);
        assert_eq!(room.check_out_date(), Some(date("2025-06-05")));

        room.check_in("Bob", date("2025-06-07")).unwrap();
        assert!(room.is_occupied());

        assert_eq!(
            room.history(),
            vec![
                "Checked in: Alice on 2025-06-01".to_string(),
                "Checked out on 2025-06-05".to_string(),
                "Checked in: Bob on 2025-06-07".to_string(),
            ]
        );
    }

    #[test]
    fn test_rejected_transitions_leave_state_unchanged() {
        let room = Room::new("102", RoomType::Double);

        let err = room.check_out(date("2025-06-01")).unwrap_err();
        assert_eq!(
            err,
            HotelError::RoomNotOccupied {
                room_id: "102".to_string()
            }
        );
        assert!(room.history().is_empty());
        assert_eq!(room.check_out_date(), None);

        room.check_in("Alice", date("2025-06-01")).unwrap();
        let err = room.check_in("Bob", date("2025-06-02")).unwrap_err();
        assert!(matches!(err, HotelError::RoomOccupied { .. }));
        assert_eq!(room.guest().as_deref(), Some("Alice"));
        assert_eq!(room.check_in_date(), Some(date("2025-06-01")));
        assert_eq!(room.history().len(), 1);
    }

    #[test]
    fn test_concurrent_check_in_has_single_winner() {
        let room = Arc::new(Room::new("103", RoomType::Suite));
        let threads_count = 16;
        let barrier = Arc::new(Barrier::new(threads_count));

        let handles: Vec<_> = (0..threads_count)
            .map(|i| {
                let room = room.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    room.check_in(&format!("guest{}", i), date("2025-06-01"))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, HotelError::RoomOccupied { .. })));
        assert!(room.is_occupied());
        assert_eq!(room.history().len(), 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let room = Room::new("101", RoomType::Single);
        room.check_in("Alice", date("2025-06-01")).unwrap();

        let snapshot = room.snapshot();
        assert!(snapshot.occupied);
        assert_eq!(snapshot.price, 100);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["room_type"], "SINGLE");
        assert_eq!(json["check_in_date"], "2025-06-01");
        assert_eq!(json["history"][0], "Checked in: Alice on 2025-06-01");
    }
}
