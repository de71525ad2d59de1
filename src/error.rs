use thiserror::Error;

// Every failure the front desk can report back to the guest-facing surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotelError {
    #[error("Room is already occupied.")]
    RoomOccupied { room_id: String },

    #[error("Room is not occupied.")]
    RoomNotOccupied { room_id: String },

    #[error("Room not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Room {0} already exists.")]
    DuplicateRoom(String),
}

impl HotelError {
    /// True when the failure came from the room's occupancy state rather than bad input.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            HotelError::RoomOccupied { .. } | HotelError::RoomNotOccupied { .. }
        )
    }
}

pub type HotelResult<T> = Result<T, HotelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_front_desk_wording() {
        let occupied = HotelError::RoomOccupied {
            room_id: "101".to_string(),
        };
        assert_eq!(occupied.to_string(), "Room is already occupied.");
        assert!(occupied.is_conflict());

        let missing = HotelError::NotFound("999".to_string());
        assert_eq!(missing.to_string(), "Room not found: 999");
        assert!(!missing.is_conflict());

        let invalid = HotelError::Validation("Please provide all details.".to_string());
        assert_eq!(invalid.to_string(), "Please provide all details.");
    }
}
