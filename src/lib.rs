// Hotel front desk: in-memory room catalog with check-in/check-out, revenue and booking history

pub mod catalog;
pub mod console;
pub mod desk;
pub mod error;
pub mod room;

// Re-export key types for convenience
pub use catalog::{CatalogSnapshot, Clock, FixedClock, OccupancyReport, RoomCatalog, SystemClock};
pub use desk::{AddRoomForm, CheckInForm, Command, Desk, DeskConfig, DeskStats, FrontDesk, Notice};
pub use error::{HotelError, HotelResult};
pub use room::{Room, RoomSnapshot, RoomType};
