//! Acknowledgement tokens.
//!
//! Every line produces exactly one token; the host uses them as the
//! backpressure signal (§ protocol overview in the crate docs). `Ready`
//! renders as the short form `R` sent after each completed batch; the
//! firmware announces the long form `READY` once at boot.

use heapless::String;

use crate::command::MAX_LINE_LEN;
use crate::FIRMWARE_VERSION;

/// Maximum rendered response length: longest prefix plus the echoed line
pub const MAX_RESPONSE_LEN: usize = MAX_LINE_LEN + 16;

/// Acknowledgement / status token sent back over the transport
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    /// Batch executed, buffer cleared, ready for the next one
    Ready,
    /// Homing sweep started
    Homing,
    /// Homing complete, position redefined as (0, 0)
    Homed,
    /// Homing sweep exhausted its tick budget without reaching the stop
    HomingFailed,
    /// Logical theta zeroed
    ThetaReset,
    /// Speed percentage applied
    SpeedSet,
    /// `SET_SPEED` argument rejected, previous rate kept
    InvalidSpeed,
    /// Malformed control command
    InvalidCommand,
    /// Line rejected without any state change; carries the original line
    Ignored(String<MAX_LINE_LEN>),
    /// Firmware version string
    Version,
}

impl Ack {
    /// Build an `Ignored` token echoing the offending line (truncated to
    /// the maximum line length if necessary).
    pub fn ignored(line: &str) -> Self {
        let mut echo = String::new();
        for c in line.chars() {
            if echo.push(c).is_err() {
                break;
            }
        }
        Ack::Ignored(echo)
    }

    /// Render the token as it appears on the wire (without the trailing
    /// newline, which the transport adds).
    pub fn render(&self) -> String<MAX_RESPONSE_LEN> {
        let mut out = String::new();
        let text = match self {
            Ack::Ready => "R",
            Ack::Homing => "HOMING",
            Ack::Homed => "HOMED",
            Ack::HomingFailed => "HOMING_FAILED",
            Ack::ThetaReset => "THETA_RESET",
            Ack::SpeedSet => "SPEED_SET",
            Ack::InvalidSpeed => "INVALID_SPEED",
            Ack::InvalidCommand => "INVALID_COMMAND",
            Ack::Version => FIRMWARE_VERSION,
            Ack::Ignored(line) => {
                let _ = out.push_str("IGNORED: ");
                let _ = out.push_str(line);
                return out;
            }
        };
        let _ = out.push_str(text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tokens() {
        assert_eq!(Ack::Ready.render().as_str(), "R");
        assert_eq!(Ack::Homing.render().as_str(), "HOMING");
        assert_eq!(Ack::Homed.render().as_str(), "HOMED");
        assert_eq!(Ack::HomingFailed.render().as_str(), "HOMING_FAILED");
        assert_eq!(Ack::ThetaReset.render().as_str(), "THETA_RESET");
        assert_eq!(Ack::SpeedSet.render().as_str(), "SPEED_SET");
        assert_eq!(Ack::InvalidSpeed.render().as_str(), "INVALID_SPEED");
        assert_eq!(Ack::InvalidCommand.render().as_str(), "INVALID_COMMAND");
    }

    #[test]
    fn test_ignored_echoes_original_line() {
        let ack = Ack::ignored("0,0.5;1.5708,0.7");
        assert_eq!(ack.render().as_str(), "IGNORED: 0,0.5;1.5708,0.7");
    }

    #[test]
    fn test_ignored_truncates_oversized_line() {
        let long: String<512> = {
            let mut s = String::new();
            for _ in 0..400 {
                s.push('x').unwrap();
            }
            s
        };
        let ack = Ack::ignored(&long);
        match &ack {
            Ack::Ignored(echo) => assert_eq!(echo.len(), MAX_LINE_LEN),
            other => panic!("expected Ignored, got {other:?}"),
        }
    }

    #[test]
    fn test_version_token_carries_version() {
        assert!(Ack::Version.render().as_str().starts_with("ammos "));
    }
}
