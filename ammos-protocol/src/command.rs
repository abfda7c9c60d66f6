//! Line tokenizer for host commands and coordinate batches.
//!
//! A line is either one of the four control commands or a coordinate batch
//! of `theta,rho;` groups. A batch line is accepted only if it ends with the
//! `;` pair terminator - without it a truncated transmission would be
//! indistinguishable from a complete one, so the line is rejected instead
//! of being misread as motion.

use heapless::Vec;

/// Maximum waypoints in one batch line (the buffer's fixed capacity)
pub const MAX_BATCH_WAYPOINTS: usize = 10;

/// Maximum accepted line length in bytes (used for IGNORED echoes)
pub const MAX_LINE_LEN: usize = 256;

/// One parsed `theta,rho` pair from a batch line.
///
/// Theta is in radians and unbounded (it accumulates across revolutions);
/// rho is normalized 0 (center) to 1 (edge). Rho is clamped by the motion
/// engine, not the parser, so the wire value is preserved here.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Waypoint {
    /// Angular target in radians
    pub theta: f32,
    /// Radial target, normalized [0, 1]
    pub rho: f32,
}

impl Waypoint {
    /// Create a new waypoint
    pub const fn new(theta: f32, rho: f32) -> Self {
        Self { theta, rho }
    }
}

/// A recognized host command
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Run the crash-homing procedure
    Home,
    /// Zero logical theta and re-anchor revolution accounting
    ResetTheta,
    /// Report the firmware version string
    GetVersion,
    /// Scale the maximum step rate to the given percentage (1-100)
    SetSpeed(u8),
    /// Execute a batch of waypoints in order
    Batch(Vec<Waypoint, MAX_BATCH_WAYPOINTS>),
}

/// Reasons a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// `SET_SPEED` argument was non-numeric or outside [1, 100]
    InvalidSpeed,
    /// Control command was malformed (e.g. `SET_SPEED` with no argument)
    InvalidCommand,
    /// Line was neither a command nor a well-formed, terminated batch
    Ignored,
}

/// Parse one newline-stripped transport line.
///
/// Batch parsing is strict: the line must end with `;`, every group must be
/// exactly `theta,rho` with finite numeric fields, and the group count must
/// fit the batch capacity. Any violation rejects the entire line - a
/// malformed field never substitutes a default value and never yields a
/// partial batch.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();

    match line {
        "HOME" => return Ok(Command::Home),
        "RESET_THETA" => return Ok(Command::ResetTheta),
        "GET_VERSION" => return Ok(Command::GetVersion),
        "SET_SPEED" => return Err(ParseError::InvalidCommand),
        _ => {}
    }

    if let Some(arg) = line.strip_prefix("SET_SPEED ") {
        return match arg.trim().parse::<u8>() {
            Ok(percent) if (1..=100).contains(&percent) => Ok(Command::SetSpeed(percent)),
            _ => Err(ParseError::InvalidSpeed),
        };
    }

    parse_batch(line)
}

/// Parse a coordinate batch line: one or more `theta,rho;` groups.
fn parse_batch(line: &str) -> Result<Command, ParseError> {
    // The pair terminator doubles as an end-of-transmission marker.
    let body = line.strip_suffix(';').ok_or(ParseError::Ignored)?;

    let mut waypoints: Vec<Waypoint, MAX_BATCH_WAYPOINTS> = Vec::new();
    for group in body.split(';') {
        let mut fields = group.split(',');
        let theta = parse_coord(fields.next())?;
        let rho = parse_coord(fields.next())?;
        if fields.next().is_some() {
            return Err(ParseError::Ignored);
        }
        waypoints
            .push(Waypoint::new(theta, rho))
            .map_err(|_| ParseError::Ignored)?;
    }

    if waypoints.is_empty() {
        return Err(ParseError::Ignored);
    }
    Ok(Command::Batch(waypoints))
}

fn parse_coord(field: Option<&str>) -> Result<f32, ParseError> {
    let value: f32 = field
        .ok_or(ParseError::Ignored)?
        .trim()
        .parse()
        .map_err(|_| ParseError::Ignored)?;
    if !value.is_finite() {
        return Err(ParseError::Ignored);
    }
    Ok(value)
}
