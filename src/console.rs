// Line-oriented front end for the desk: one command per line in, one rendered notice out

use std::io::{self, Write};

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::desk::{AddRoomForm, CheckInForm, Command, Desk, Notice};
use crate::room::RoomType;

pub const HELP: &str = "\
Commands:
  checkin <room> <guest> <yyyy-mm-dd> [yyyy-mm-dd]
  checkout <room>
  cancel <room>
  add <room> <single|double|suite>
  available
  type <single|double|suite>
  history <room>
  revenue
  occupancy
  help
  quit";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid date: {0} (expected yyyy-mm-dd)")]
    InvalidDate(String),

    #[error("Invalid room type: {0}")]
    InvalidRoomType(String),
}

// Anything the console loop itself handles, outside the desk
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Desk(Command),
    Help,
    Quit,
    Empty,
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ConsoleError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ConsoleError::InvalidDate(s.to_string()))
    })
    .transpose()
}

fn parse_room_type(raw: Option<&str>) -> Result<Option<RoomType>, ConsoleError> {
    raw.map(|s| {
        s.parse::<RoomType>()
            .map_err(|_| ConsoleError::InvalidRoomType(s.to_string()))
    })
    .transpose()
}

/// Parses one console line.
///
/// Missing arguments are passed through as blank form fields so the desk
/// reports them the same way an empty form would.
pub fn parse_command(line: &str) -> Result<Input, ConsoleError> {
    let mut words = line.split_whitespace();
    let verb = match words.next() {
        Some(verb) => verb.to_ascii_lowercase(),
        None => return Ok(Input::Empty),
    };
    let mut arg = || words.next();

    let command = match verb.as_str() {
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "checkin" => {
            let room_id = arg().unwrap_or_default().to_string();
            let guest_name = arg().unwrap_or_default().to_string();
            let check_in = parse_date(arg())?;
            let check_out = parse_date(arg())?;
            Command::CheckIn(CheckInForm {
                room_id,
                guest_name,
                check_in,
                check_out,
            })
        }
        "checkout" => Command::CheckOut {
            room_id: arg().unwrap_or_default().to_string(),
        },
        "cancel" => Command::CancelReservation {
            room_id: arg().unwrap_or_default().to_string(),
        },
        "add" => {
            let room_id = arg().unwrap_or_default().to_string();
            let room_type = parse_room_type(arg())?;
            Command::AddRoom(AddRoomForm { room_id, room_type })
        }
        "available" => Command::ListAvailable,
        "type" => Command::ListByType(parse_room_type(arg())?),
        "history" => Command::History {
            room_id: arg().unwrap_or_default().to_string(),
        },
        "revenue" => Command::Revenue,
        "occupancy" => Command::Occupancy,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };

    Ok(Input::Desk(command))
}

pub fn render(notice: &Notice) -> String {
    match notice {
        Notice::Info { title, body } => format!("[{}]\n{}", title, body),
        Notice::Error { message } => format!("[Error] {}", message),
    }
}

pub fn render_error(err: &ConsoleError) -> String {
    render(&Notice::Error {
        message: err.to_string(),
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub submitted: usize,
    pub shown: usize,
}

/// Feeds `lines` to the desk and writes every notice to `out`.
///
/// Returns after input ends (or `quit` is read) and every submitted command
/// has had its notice written. This is the only place notices are printed.
pub async fn run_session<D, W>(
    desk: &D,
    notices: &mut mpsc::Receiver<Notice>,
    lines: &mut mpsc::Receiver<String>,
    out: &mut W,
) -> io::Result<SessionReport>
where
    D: Desk + ?Sized,
    W: Write,
{
    let mut report = SessionReport::default();

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                match parse_command(&line) {
                    Ok(Input::Desk(command)) => {
                        // Detached; its notice is counted below
                        drop(desk.submit(command));
                        report.submitted += 1;
                    }
                    Ok(Input::Help) => writeln!(out, "{}", HELP)?,
                    Ok(Input::Quit) => break,
                    Ok(Input::Empty) => {}
                    Err(err) => writeln!(out, "{}", render_error(&err))?,
                }
            }
            Some(notice) = notices.recv() => {
                writeln!(out, "{}", render(&notice))?;
                report.shown += 1;
            }
        }
    }

    // Input is closed, wait for the commands still on the workers
    while report.shown < report.submitted {
        let Some(notice) = notices.recv().await else { break };
        writeln!(out, "{}", render(&notice))?;
        report.shown += 1;
    }

    out.flush()?;
    Ok(report)
}
