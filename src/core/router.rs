// Author: Dustin Pilgrim
// License: MIT

//! Free-text dialog input. Which transition a piece of text drives depends
//! only on the phase of the session's timer.

use std::time::Duration;

use crate::core::error::TransitionError;
use crate::core::timer::{Phase, Timer};

/// One year. Anything longer is treated as a typo.
pub const MAX_MINUTES: u64 = 365 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// NAMING -> SIZING; the session should be asked for minutes.
    Named { name: String },

    /// SIZING -> ARMED; the session should be asked to confirm.
    Armed { name: String, duration: Duration },
}

/// Applies `text` to `timer` in place.
///
/// Must be called with exclusive access to the timer (inside the store's
/// update). On error the timer is unchanged.
pub fn route(timer: &mut Timer, text: &str) -> Result<InputOutcome, TransitionError> {
    match timer.phase() {
        Phase::Naming => {
            timer.set_name(text)?;
            Ok(InputOutcome::Named {
                name: text.to_string(),
            })
        }
        Phase::Sizing { name } => {
            let name = name.clone();
            let duration = parse_minutes(text)?;
            timer.set_duration(duration)?;
            Ok(InputOutcome::Armed { name, duration })
        }
        Phase::Armed { .. } | Phase::Running { .. } => Err(TransitionError::OutOfProtocol),
    }
}

/// Parses a positive whole number of minutes.
pub fn parse_minutes(text: &str) -> Result<Duration, TransitionError> {
    let minutes: u64 = text
        .trim()
        .parse()
        .map_err(|_| TransitionError::InvalidDuration)?;

    if minutes == 0 || minutes > MAX_MINUTES {
        return Err(TransitionError::InvalidDuration);
    }

    Ok(Duration::from_secs(minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timer::TimerId;

    #[test]
    fn ten_is_exactly_ten_minutes() {
        assert_eq!(parse_minutes("10"), Ok(Duration::from_secs(600)));
        assert_eq!(parse_minutes(" 3\n"), Ok(Duration::from_secs(180)));
    }

    #[test]
    fn rejects_non_positive_or_fractional() {
        for bad in ["abc", "", "0", "-5", "1.5", "10m", "99999999999999999999"] {
            assert_eq!(parse_minutes(bad), Err(TransitionError::InvalidDuration), "{bad}");
        }
        assert!(parse_minutes(&(MAX_MINUTES + 1).to_string()).is_err());
        assert!(parse_minutes(&MAX_MINUTES.to_string()).is_ok());
    }

    #[test]
    fn first_text_names_the_timer() {
        let mut t = Timer::new(TimerId(1));
        let out = route(&mut t, "Brew coffee").unwrap();
        assert_eq!(
            out,
            InputOutcome::Named {
                name: "Brew coffee".to_string()
            }
        );
        assert_eq!(t.name(), Some("Brew coffee"));
    }

    #[test]
    fn second_text_arms_the_timer() {
        let mut t = Timer::new(TimerId(1));
        route(&mut t, "Brew").unwrap();

        let out = route(&mut t, "10").unwrap();
        assert_eq!(
            out,
            InputOutcome::Armed {
                name: "Brew".to_string(),
                duration: Duration::from_secs(600)
            }
        );
        assert_eq!(t.duration(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn bad_minutes_keep_the_timer_sizing() {
        let mut t = Timer::new(TimerId(1));
        route(&mut t, "Brew").unwrap();

        assert_eq!(route(&mut t, "abc"), Err(TransitionError::InvalidDuration));
        assert_eq!(t.phase_name(), "sizing");
        assert_eq!(t.name(), Some("Brew"));

        // and it still accepts a valid retry
        assert!(route(&mut t, "2").is_ok());
    }

    #[test]
    fn text_after_arming_is_out_of_protocol() {
        let mut t = Timer::new(TimerId(1));
        route(&mut t, "Brew").unwrap();
        route(&mut t, "2").unwrap();

        assert_eq!(route(&mut t, "5"), Err(TransitionError::OutOfProtocol));
        assert_eq!(t.duration(), Some(Duration::from_secs(120)));
    }
}
