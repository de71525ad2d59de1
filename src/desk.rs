// Front desk: the boundary between the guest-facing surface and the catalog
// Commands run on the blocking worker pool; results come back as notices on a channel
// that a single presentation thread drains.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error, warn};

use crate::catalog::RoomCatalog;
use crate::error::{HotelError, HotelResult};
use crate::room::{Room, RoomType};

// Raw check-in input, exactly as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckInForm {
    pub room_id: String,
    pub guest_name: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

impl CheckInForm {
    fn validate(&self) -> HotelResult<(&str, &str, NaiveDate)> {
        let room_id = self.room_id.trim();
        let guest_name = self.guest_name.trim();

        match self.check_in {
            Some(check_in) if !room_id.is_empty() && !guest_name.is_empty() => {
                if matches!(self.check_out, Some(check_out) if check_out < check_in) {
                    return Err(HotelError::Validation(
                        "Check-out date cannot be before check-in date.".to_string(),
                    ));
                }
                Ok((room_id, guest_name, check_in))
            }
            _ => Err(HotelError::Validation(
                "Please provide all details.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRoomForm {
    pub room_id: String,
    pub room_type: Option<RoomType>,
}

impl AddRoomForm {
    fn validate(&self) -> HotelResult<(&str, RoomType)> {
        let room_id = self.room_id.trim();

        match self.room_type {
            Some(room_type) if !room_id.is_empty() => Ok((room_id, room_type)),
            _ => Err(HotelError::Validation(
                "Please provide room ID and type.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CheckIn(CheckInForm),
    CheckOut { room_id: String },
    CancelReservation { room_id: String },
    AddRoom(AddRoomForm),
    ListAvailable,
    ListByType(Option<RoomType>),
    History { room_id: String },
    Revenue,
    Occupancy,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CheckIn(_) => "check_in",
            Command::CheckOut { .. } => "check_out",
            Command::CancelReservation { .. } => "cancel_reservation",
            Command::AddRoom(_) => "add_room",
            Command::ListAvailable => "list_available",
            Command::ListByType(_) => "list_by_type",
            Command::History { .. } => "history",
            Command::Revenue => "revenue",
            Command::Occupancy => "occupancy",
        }
    }
}

// What the presentation thread shows for a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info { title: String, body: String },
    Error { message: String },
}

impl Notice {
    fn info(title: &str, body: impl Into<String>) -> Self {
        Notice::Info {
            title: title.to_string(),
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error { .. })
    }
}

impl From<HotelError> for Notice {
    fn from(err: HotelError) -> Self {
        Notice::Error {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeskConfig {
    pub worker_threads: usize,
    pub notice_buffer: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            notice_buffer: 64,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeskStats {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct DeskCounters {
    dispatched: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

#[async_trait]
pub trait Desk: Send + Sync + 'static {
    // Run a command to completion and return what should be shown for it
    async fn execute(&self, command: Command) -> Notice;

    // Hand a command to the worker pool; its notice arrives on the desk channel
    fn submit(&self, command: Command) -> JoinHandle<()>;

    fn stats(&self) -> DeskStats;
}

#[derive(Clone)]
pub struct FrontDesk {
    catalog: Arc<RoomCatalog>,
    notices: mpsc::Sender<Notice>,
    counters: Arc<DeskCounters>,
}

impl FrontDesk {
    /// Opens the desk over `catalog`. The returned receiver belongs to the
    /// presentation thread; notices are delivered in completion order.
    pub fn start(catalog: Arc<RoomCatalog>, config: &DeskConfig) -> (Self, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel(config.notice_buffer.max(1));

        let desk = Self {
            catalog,
            notices: tx,
            counters: Arc::new(DeskCounters::default()),
        };

        (desk, rx)
    }

    pub fn catalog(&self) -> &Arc<RoomCatalog> {
        &self.catalog
    }
}

#[async_trait]
impl Desk for FrontDesk {
    async fn execute(&self, command: Command) -> Notice {
        self.counters.dispatched.fetch_add(1, Ordering::SeqCst);
        let name = command.name();
        let catalog = self.catalog.clone();

        // Room locks are synchronous, keep them off the async workers
        let result = tokio::task::spawn_blocking(move || run_command(&catalog, command)).await;

        match result {
            Ok(Ok(notice)) => {
                self.counters.succeeded.fetch_add(1, Ordering::SeqCst);
                debug!(command = name, "command succeeded");
                notice
            }
            Ok(Err(err)) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                warn!(command = name, error = %err, "command failed");
                err.into()
            }
            Err(join_err) => {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
                error!(command = name, error = %join_err, "command worker died");
                Notice::Error {
                    message: format!("Internal error: {}", join_err),
                }
            }
        }
    }

    fn submit(&self, command: Command) -> JoinHandle<()> {
        let desk = self.clone();

        tokio::spawn(async move {
            let notice = desk.execute(command).await;
            if desk.notices.send(notice).await.is_err() {
                warn!("presentation thread is gone, dropping notice");
            }
        })
    }

    fn stats(&self) -> DeskStats {
        DeskStats {
            dispatched: self.counters.dispatched.load(Ordering::SeqCst),
            succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

fn require_room_id(room_id: &str) -> HotelResult<&str> {
    let room_id = room_id.trim();
    if room_id.is_empty() {
        return Err(HotelError::Validation(
            "Please provide a room ID.".to_string(),
        ));
    }
    Ok(room_id)
}

fn run_command(catalog: &RoomCatalog, command: Command) -> HotelResult<Notice> {
    match command {
        Command::CheckIn(form) => {
            let (room_id, guest_name, check_in) = form.validate()?;
            catalog.check_in(room_id, guest_name, check_in)?;

            let mut body = format!(
                "Room {} has been checked in for {} on {}",
                room_id, guest_name, check_in
            );
            if let Some(check_out) = form.check_out {
                body.push_str(&format!(" until {}", check_out));
            }
            Ok(Notice::info("Check-in Successful", body))
        }
        Command::CheckOut { room_id } => {
            let room_id = require_room_id(&room_id)?;
            catalog.checkout_room(room_id)?;
            Ok(Notice::info(
                "Checkout Successful",
                format!("Room {} has been checked out.", room_id),
            ))
        }
        Command::CancelReservation { room_id } => {
            let room_id = require_room_id(&room_id)?;
            catalog.cancel_reservation(room_id)?;
            Ok(Notice::info(
                "Reservation Cancelled",
                format!("Room {} reservation has been cancelled.", room_id),
            ))
        }
        Command::AddRoom(form) => {
            let (room_id, room_type) = form.validate()?;
            catalog.add_room(Room::new(room_id, room_type))?;
            Ok(Notice::info(
                "Room Added",
                format!("Room {} has been added.", room_id),
            ))
        }
        Command::ListAvailable => {
            let lines: Vec<String> = catalog
                .available_rooms()
                .iter()
                .map(|room| format!("{} ({} - ${})", room.id(), room.room_type(), room.price()))
                .collect();
            Ok(Notice::info(
                "Available Rooms",
                listing("Available Rooms:", lines),
            ))
        }
        Command::ListByType(room_type) => {
            let room_type = room_type.ok_or_else(|| {
                HotelError::Validation("Please select a room type.".to_string())
            })?;
            let lines: Vec<String> = catalog
                .rooms_by_type(room_type)
                .iter()
                .map(|room| format!("{} - ${}", room.id(), room.price()))
                .collect();
            Ok(Notice::info(
                "Rooms by Type",
                listing(&format!("Rooms by Type {}:", room_type), lines),
            ))
        }
        Command::History { room_id } => {
            let room_id = require_room_id(&room_id)?;
            let history = catalog.booking_history(room_id)?;
            Ok(Notice::info(
                "Booking History",
                listing(&format!("Booking History for Room {}:", room_id), history),
            ))
        }
        Command::Revenue => Ok(Notice::info(
            "Total Revenue",
            format!("Total revenue: ${}", catalog.total_revenue()),
        )),
        Command::Occupancy => {
            let report = catalog.occupancy();
            Ok(Notice::info(
                "Occupancy",
                format!(
                    "{} rooms: {} occupied, {} vacant",
                    report.total, report.occupied, report.vacant
                ),
            ))
        }
    }
}

fn listing(header: &str, lines: Vec<String>) -> String {
    std::iter::once(header.to_string())
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}
