//! Completion percentage shown on the customer portal

use serde::Serialize;
use std::fmt;

use crate::workflow::{Gate, GateState};

/// Weight of each gate, in percent
pub const GATE_WEIGHT: u8 = 25;

/// A completion percentage between 0 and 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const DONE: Progress = Progress(100);

    /// Build a percentage, clamped to 100
    pub fn new(percent: u32) -> Self {
        Progress(percent.min(100) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Progress of a visit: a fixed share per passed gate.
///
/// Without a check-in no other gate counts. The services gate is all or
/// nothing: some approved services earn no partial share until every one
/// is approved.
pub fn progress(gates: &GateState) -> Progress {
    if !gates.checkin_received {
        return Progress::ZERO;
    }
    let passed = Gate::ALL
        .iter()
        .filter(|gate| gates.is_passed(**gate))
        .count() as u32;
    Progress::new(passed * GATE_WEIGHT as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<GateState> {
        let mut states = Vec::new();
        for bits in 0..16u8 {
            states.push(GateState {
                checkin_received: bits & 1 != 0,
                checkin_approved: bits & 2 != 0,
                services_total: 2,
                services_approved: if bits & 4 != 0 { 2 } else { 1 },
                checkout_approved: bits & 8 != 0,
            });
        }
        states
    }

    #[test]
    fn no_checkin_is_zero() {
        let gates = GateState {
            checkin_approved: true,
            checkout_approved: true,
            ..Default::default()
        };
        assert_eq!(progress(&gates), Progress::ZERO);
    }

    #[test]
    fn each_gate_adds_a_quarter() {
        let mut gates = GateState {
            checkin_received: true,
            services_total: 1,
            ..Default::default()
        };
        assert_eq!(progress(&gates).percent(), 25);
        gates.checkin_approved = true;
        assert_eq!(progress(&gates).percent(), 50);
        gates.services_approved = 1;
        assert_eq!(progress(&gates).percent(), 75);
        gates.checkout_approved = true;
        assert_eq!(progress(&gates), Progress::DONE);
    }

    #[test]
    fn empty_service_list_counts_as_approved() {
        let gates = GateState {
            checkin_received: true,
            ..Default::default()
        };
        assert_eq!(progress(&gates).percent(), 50);
    }

    #[test]
    fn partly_approved_services_earn_nothing() {
        let gates = GateState {
            checkin_received: true,
            checkin_approved: true,
            services_total: 3,
            services_approved: 2,
            ..Default::default()
        };
        assert_eq!(progress(&gates).percent(), 50);
    }

    #[test]
    fn flipping_a_gate_never_lowers_progress() {
        for state in all_states() {
            let before = progress(&state);
            assert!(before.percent() <= 100);

            let mut flipped = state.clone();
            flipped.checkin_received = true;
            assert!(progress(&flipped) >= before);

            let mut flipped = state.clone();
            flipped.checkin_approved = true;
            assert!(progress(&flipped) >= before);

            let mut flipped = state.clone();
            flipped.services_approved = flipped.services_total;
            assert!(progress(&flipped) >= before);

            let mut flipped = state;
            flipped.checkout_approved = true;
            assert!(progress(&flipped) >= before);
        }
    }

    #[test]
    fn clamped_to_hundred() {
        assert_eq!(Progress::new(250), Progress::DONE);
        assert_eq!(Progress::new(40).to_string(), "40%");
    }
}
