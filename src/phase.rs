//! Time-derived election phases.
//!
//! The phase is a pure function of the schedule and the caller-supplied
//! clock; it is recomputed inside every guarded operation and never stored
//! as the source of truth, so there are no missed-transition bugs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the registration window opens.
    Created,
    Registration,
    /// Registration has closed but voting has not yet opened. Neither
    /// registering nor voting is legal here.
    Interim,
    Voting,
    /// Permanent once the voting window closes.
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Registration => "registration",
            Phase::Interim => "interim",
            Phase::Voting => "voting",
            Phase::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// The four window boundaries, unix seconds.
///
/// Invariant (checked by [`ElectionSchedule::validate`]):
/// `registration_start < registration_end <= voting_start < voting_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSchedule {
    pub registration_start: u64,
    pub registration_end: u64,
    pub voting_start: u64,
    pub voting_end: u64,
}

impl ElectionSchedule {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registration_start >= self.registration_end {
            return Err(ConfigError::RegistrationWindow);
        }
        if self.voting_start < self.registration_end {
            return Err(ConfigError::WindowOverlap);
        }
        if self.voting_start >= self.voting_end {
            return Err(ConfigError::VotingWindow);
        }
        Ok(())
    }

    /// Window starts are inclusive, window ends exclusive.
    pub fn phase_at(&self, now: u64) -> Phase {
        if now < self.registration_start {
            Phase::Created
        } else if now < self.registration_end {
            Phase::Registration
        } else if now < self.voting_start {
            Phase::Interim
        } else if now < self.voting_end {
            Phase::Voting
        } else {
            Phase::Ended
        }
    }
}

impl fmt::Display for ElectionSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "registration {} .. {}, voting {} .. {}",
            render_ts(self.registration_start),
            render_ts(self.registration_end),
            render_ts(self.voting_start),
            render_ts(self.voting_end),
        )
    }
}

fn render_ts(ts: u64) -> String {
    match chrono::DateTime::from_timestamp(ts as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ts.to_string(),
    }
}
