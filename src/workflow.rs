//! Approval gates of a service visit and the order they may be passed in

use std::fmt;
use thiserror::Error;

/// One of the four approval gates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// A check-in record exists
    CheckinReceived,
    /// The customer approved the check-in report
    CheckinApproved,
    /// Every proposed service is approved, or none was proposed
    ServicesApproved,
    /// The customer approved the checkout
    CheckoutApproved,
}

impl Gate {
    pub const ALL: [Gate; 4] = [
        Gate::CheckinReceived,
        Gate::CheckinApproved,
        Gate::ServicesApproved,
        Gate::CheckoutApproved,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Gate::CheckinReceived => "Vehicle checked in",
            Gate::CheckinApproved => "Check-in approved",
            Gate::ServicesApproved => "Services approved",
            Gate::CheckoutApproved => "Checkout approved",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a visit currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    AwaitingCheckin,
    AwaitingCheckinApproval,
    AwaitingServiceApproval,
    AwaitingCheckoutApproval,
    Completed,
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WorkflowStage::AwaitingCheckin => "awaiting check-in",
            WorkflowStage::AwaitingCheckinApproval => "awaiting check-in approval",
            WorkflowStage::AwaitingServiceApproval => "awaiting service approval",
            WorkflowStage::AwaitingCheckoutApproval => "awaiting checkout approval",
            WorkflowStage::Completed => "completed",
        };
        f.write_str(text)
    }
}

/// A gate flip that the current state does not allow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("no check-in exists for this client yet")]
    NoCheckin,

    #[error("{0} is already done")]
    AlreadyApproved(Gate),

    #[error("{gate} requires {missing} first")]
    OutOfOrder { gate: Gate, missing: Gate },

    #[error("unknown service approval {0}")]
    UnknownService(String),
}

/// Snapshot of the four gates, as read from the platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateState {
    pub checkin_received: bool,
    pub checkin_approved: bool,
    /// Number of proposed services
    pub services_total: usize,
    /// Number of proposed services the customer approved
    pub services_approved: usize,
    pub checkout_approved: bool,
}

impl GateState {
    /// True when all services are approved or none exist
    pub fn services_approved(&self) -> bool {
        self.services_approved >= self.services_total
    }

    /// Whether a gate is passed
    pub fn is_passed(&self, gate: Gate) -> bool {
        match gate {
            Gate::CheckinReceived => self.checkin_received,
            Gate::CheckinApproved => self.checkin_received && self.checkin_approved,
            Gate::ServicesApproved => self.checkin_received && self.services_approved(),
            Gate::CheckoutApproved => self.checkin_received && self.checkout_approved,
        }
    }

    /// Derive the current stage from the flags
    pub fn stage(&self) -> WorkflowStage {
        if !self.checkin_received {
            WorkflowStage::AwaitingCheckin
        } else if !self.checkin_approved {
            WorkflowStage::AwaitingCheckinApproval
        } else if !self.services_approved() {
            WorkflowStage::AwaitingServiceApproval
        } else if !self.checkout_approved {
            WorkflowStage::AwaitingCheckoutApproval
        } else {
            WorkflowStage::Completed
        }
    }

    /// Checkout may be offered to the customer
    pub fn checkout_available(&self) -> bool {
        self.is_passed(Gate::CheckinApproved) && self.services_approved()
    }

    /// Validate approving the check-in
    pub fn check_approve_checkin(&self) -> Result<(), TransitionError> {
        if !self.checkin_received {
            return Err(TransitionError::NoCheckin);
        }
        if self.checkin_approved {
            return Err(TransitionError::AlreadyApproved(Gate::CheckinApproved));
        }
        Ok(())
    }

    /// Validate approving one service. `already_approved` is that service's
    /// current flag.
    pub fn check_approve_service(&self, already_approved: bool) -> Result<(), TransitionError> {
        if !self.checkin_received {
            return Err(TransitionError::NoCheckin);
        }
        if !self.checkin_approved {
            return Err(TransitionError::OutOfOrder {
                gate: Gate::ServicesApproved,
                missing: Gate::CheckinApproved,
            });
        }
        if already_approved {
            return Err(TransitionError::AlreadyApproved(Gate::ServicesApproved));
        }
        Ok(())
    }

    /// Validate approving the checkout
    pub fn check_approve_checkout(&self) -> Result<(), TransitionError> {
        if !self.checkin_received {
            return Err(TransitionError::NoCheckin);
        }
        if !self.checkin_approved {
            return Err(TransitionError::OutOfOrder {
                gate: Gate::CheckoutApproved,
                missing: Gate::CheckinApproved,
            });
        }
        if !self.services_approved() {
            return Err(TransitionError::OutOfOrder {
                gate: Gate::CheckoutApproved,
                missing: Gate::ServicesApproved,
            });
        }
        if self.checkout_approved {
            return Err(TransitionError::AlreadyApproved(Gate::CheckoutApproved));
        }
        Ok(())
    }

    /// Apply the check-in approval after validating it
    pub fn approve_checkin(&mut self) -> Result<(), TransitionError> {
        self.check_approve_checkin()?;
        self.checkin_approved = true;
        Ok(())
    }

    /// Apply one service approval after validating it
    pub fn approve_service(&mut self, already_approved: bool) -> Result<(), TransitionError> {
        self.check_approve_service(already_approved)?;
        self.services_approved = (self.services_approved + 1).min(self.services_total);
        Ok(())
    }

    /// Apply the checkout approval after validating it
    pub fn approve_checkout(&mut self) -> Result<(), TransitionError> {
        self.check_approve_checkout()?;
        self.checkout_approved = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(services: usize) -> GateState {
        GateState {
            checkin_received: true,
            services_total: services,
            ..Default::default()
        }
    }

    #[test]
    fn walks_through_every_stage() {
        let mut state = received(2);
        assert_eq!(state.stage(), WorkflowStage::AwaitingCheckinApproval);

        state.approve_checkin().unwrap();
        assert_eq!(state.stage(), WorkflowStage::AwaitingServiceApproval);

        state.approve_service(false).unwrap();
        state.approve_service(false).unwrap();
        assert_eq!(state.stage(), WorkflowStage::AwaitingCheckoutApproval);

        state.approve_checkout().unwrap();
        assert_eq!(state.stage(), WorkflowStage::Completed);
    }

    #[test]
    fn nothing_can_be_approved_without_a_checkin() {
        let mut state = GateState::default();
        assert_eq!(state.stage(), WorkflowStage::AwaitingCheckin);
        assert_eq!(state.approve_checkin(), Err(TransitionError::NoCheckin));
        assert_eq!(state.approve_service(false), Err(TransitionError::NoCheckin));
        assert_eq!(state.approve_checkout(), Err(TransitionError::NoCheckin));
    }

    #[test]
    fn checkout_cannot_skip_ahead() {
        let mut state = received(1);
        assert_eq!(
            state.approve_checkout(),
            Err(TransitionError::OutOfOrder {
                gate: Gate::CheckoutApproved,
                missing: Gate::CheckinApproved,
            })
        );

        state.approve_checkin().unwrap();
        assert!(!state.checkout_available());
        assert_eq!(
            state.approve_checkout(),
            Err(TransitionError::OutOfOrder {
                gate: Gate::CheckoutApproved,
                missing: Gate::ServicesApproved,
            })
        );
    }

    #[test]
    fn services_wait_for_checkin_approval() {
        let mut state = received(1);
        assert!(matches!(
            state.approve_service(false),
            Err(TransitionError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn reapproval_is_rejected() {
        let mut state = received(0);
        state.approve_checkin().unwrap();
        assert_eq!(
            state.approve_checkin(),
            Err(TransitionError::AlreadyApproved(Gate::CheckinApproved))
        );
        assert_eq!(
            state.approve_service(true),
            Err(TransitionError::AlreadyApproved(Gate::ServicesApproved))
        );
        state.approve_checkout().unwrap();
        assert_eq!(
            state.approve_checkout(),
            Err(TransitionError::AlreadyApproved(Gate::CheckoutApproved))
        );
    }

    #[test]
    fn no_services_counts_as_all_approved() {
        let mut state = received(0);
        state.approve_checkin().unwrap();
        assert!(state.checkout_available());
        assert_eq!(state.stage(), WorkflowStage::AwaitingCheckoutApproval);
    }
}
