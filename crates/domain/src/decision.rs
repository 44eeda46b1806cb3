//! Decision — the output vocabulary of the mode resolver.

use std::time::Duration;

use crate::strategy::Strategy;

/// What the engine should do with the pump right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// The pump should be (or stay) off.
    Idle,
    /// Fire with no planned end; a later decision pass turns it off.
    FireIndefinite { strategy: Strategy },
    /// Fire for a computed duration, then shut off automatically.
    FireForDuration {
        strategy: Strategy,
        duration: Duration,
        /// Predicted volume in millilitres, when the dose is volume-based.
        volume_ml: Option<f64>,
    },
}

impl Decision {
    /// The governing strategy, if the decision fires the pump.
    #[must_use]
    pub fn strategy(&self) -> Option<Strategy> {
        match self {
            Self::Idle => None,
            Self::FireIndefinite { strategy } | Self::FireForDuration { strategy, .. } => {
                Some(*strategy)
            }
        }
    }

    /// Whether this decision leaves the pump off.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
