//! Debounce/hold controller for the environment strategy.
//!
//! A threshold condition must stay true for a minimum hold window before
//! a dose is approved, and two approvals must be spaced by a cooldown.
//! State machine: `NotHolding → Holding` when the condition becomes true,
//! `Holding → Approved` once the hold window and cooldown are satisfied,
//! and back to `NotHolding` the moment the condition goes false. After an
//! approval the condition must go false and re-qualify from scratch
//! before another dose is approved.

use chrono::TimeDelta;

use pumphouse_domain::time::Timestamp;

/// Minimum continuous seconds a condition must hold before approval.
pub const ENVIRONMENT_HOLD_SECS: i64 = 30;

/// Minimum seconds between two approved doses.
pub const ENVIRONMENT_COOLDOWN_SECS: i64 = 480;

/// Debounces a boolean condition and spaces out approvals.
#[derive(Debug, Clone)]
pub struct HoldController {
    hold: TimeDelta,
    cooldown: TimeDelta,
    /// When the condition was first observed true, while it stays true.
    condition_since: Option<Timestamp>,
    /// When the last dose was approved. Survives resets.
    last_fired_at: Option<Timestamp>,
    /// Set on approval; cleared when the condition goes false.
    latched: bool,
}

impl Default for HoldController {
    fn default() -> Self {
        Self::new(
            TimeDelta::seconds(ENVIRONMENT_HOLD_SECS),
            TimeDelta::seconds(ENVIRONMENT_COOLDOWN_SECS),
        )
    }
}

impl HoldController {
    /// Build a controller with explicit hold and cooldown windows.
    #[must_use]
    pub fn new(hold: TimeDelta, cooldown: TimeDelta) -> Self {
        Self {
            hold,
            cooldown,
            condition_since: None,
            last_fired_at: None,
            latched: false,
        }
    }

    /// Feed one observation of the condition. Returns `true` exactly when
    /// a dose is approved on this observation.
    pub fn observe(&mut self, condition: bool, now: Timestamp) -> bool {
        if !condition {
            self.condition_since = None;
            self.latched = false;
            return false;
        }

        let since = *self.condition_since.get_or_insert(now);
        if self.latched {
            return false;
        }
        if now - since < self.hold {
            return false;
        }
        if !self.cooldown_elapsed(now) {
            return false;
        }

        self.last_fired_at = Some(now);
        self.latched = true;
        true
    }

    /// Drop the hold state without touching the cooldown.
    ///
    /// Called when the condition stops being observed (mode disabled, a
    /// higher-precedence strategy governing, settings missing) so it must
    /// re-qualify from scratch.
    pub fn reset(&mut self) {
        self.condition_since = None;
        self.latched = false;
    }

    /// When the last dose was approved, if any.
    #[must_use]
    pub fn last_fired_at(&self) -> Option<Timestamp> {
        self.last_fired_at
    }

    fn cooldown_elapsed(&self, now: Timestamp) -> bool {
        self.last_fired_at
            .is_none_or(|fired| now - fired >= self.cooldown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pumphouse_domain::time::Timestamp;

    fn t0() -> Timestamp {
        "2025-06-02T12:00:00Z".parse().unwrap()
    }

    fn at(seconds: i64) -> Timestamp {
        t0() + TimeDelta::seconds(seconds)
    }

    #[test]
    fn should_approve_after_condition_holds_for_window() {
        let mut gate = HoldController::default();
        assert!(!gate.observe(true, at(0)));
        assert!(!gate.observe(true, at(15)));
        assert!(gate.observe(true, at(30)));
        assert_eq!(gate.last_fired_at(), Some(at(30)));
    }

    #[test]
    fn should_not_approve_when_condition_flaps_under_hold_window() {
        let mut gate = HoldController::default();
        assert!(!gate.observe(true, at(0)));
        assert!(!gate.observe(true, at(20)));
        assert!(!gate.observe(false, at(25)));
        assert!(!gate.observe(true, at(28)));
        // The hold restarted at 28s; 50s is only 22s in.
        assert!(!gate.observe(true, at(50)));
        assert!(gate.observe(true, at(58)));
    }

    #[test]
    fn should_approve_only_once_while_condition_stays_true() {
        let mut gate = HoldController::default();
        gate.observe(true, at(0));
        assert!(gate.observe(true, at(30)));
        assert!(!gate.observe(true, at(35)));
        // Even far past the cooldown, the latch holds until the
        // condition goes false.
        assert!(!gate.observe(true, at(1000)));
    }

    #[test]
    fn should_suppress_second_dose_within_cooldown() {
        let mut gate = HoldController::default();
        gate.observe(true, at(0));
        assert!(gate.observe(true, at(30)));

        // Condition drops and re-qualifies, but only 200s after the fire.
        gate.observe(false, at(100));
        gate.observe(true, at(160));
        assert!(!gate.observe(true, at(200)));
        assert!(!gate.observe(true, at(400)));
        // Cooldown (480s after the fire at 30s) elapses at 510s; the
        // hold has long been satisfied by then.
        assert!(gate.observe(true, at(510)));
    }

    #[test]
    fn should_approve_again_after_cooldown_and_requalification() {
        let mut gate = HoldController::default();
        gate.observe(true, at(0));
        assert!(gate.observe(true, at(30)));

        gate.observe(false, at(600));
        gate.observe(true, at(610));
        assert!(gate.observe(true, at(640)));
    }

    #[test]
    fn should_keep_cooldown_across_reset() {
        let mut gate = HoldController::default();
        gate.observe(true, at(0));
        assert!(gate.observe(true, at(30)));

        gate.reset();
        gate.observe(true, at(40));
        // Hold satisfied at 70s, but the cooldown from the 30s fire
        // still applies.
        assert!(!gate.observe(true, at(70)));
        assert!(gate.observe(true, at(510)));
    }

    #[test]
    fn should_require_requalification_after_reset() {
        let mut gate = HoldController::default();
        gate.observe(true, at(0));
        gate.reset();
        // Previous 0s observation no longer counts.
        assert!(!gate.observe(true, at(30)));
        assert!(gate.observe(true, at(60)));
    }

    #[test]
    fn should_treat_first_fire_as_outside_cooldown() {
        let mut gate = HoldController::default();
        assert!(gate.last_fired_at().is_none());
        gate.observe(true, at(0));
        assert!(gate.observe(true, at(30)));
    }
}
