//! Strategy — the four mutually exclusive ways the pump can be governed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the four control strategies.
///
/// Several strategies may be *enabled* at once in the settings document,
/// but only one governs actuation per decision pass, in the precedence
/// order of [`Strategy::PRECEDENCE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Direct user override — the toggle is the pump state.
    Manual,
    /// Weekly time-of-day windows.
    Scheduled,
    /// Threshold automation on the latest sensor values.
    Environment,
    /// Volume dosing from the prediction oracle.
    Predictive,
}

impl Strategy {
    /// All strategies, highest precedence first.
    pub const PRECEDENCE: [Self; 4] = [
        Self::Manual,
        Self::Scheduled,
        Self::Environment,
        Self::Predictive,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Environment => "environment",
            Self::Predictive => "predictive",
        };
        f.write_str(name)
    }
}

impl FromStr for Strategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "scheduled" => Ok(Self::Scheduled),
            "environment" => Ok(Self::Environment),
            "predictive" => Ok(Self::Predictive),
            other => Err(ValidationError::UnknownStrategy(other.to_string())),
        }
    }
}
