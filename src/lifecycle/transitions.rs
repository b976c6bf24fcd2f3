//! Appointment status state machine.
//!
//! Rejected and Completed are terminal. Nothing ever moves back to Pending.

use crate::models::enums::AppointmentStatus::{self, *};

/// Who drives a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Patient cancelling their own appointment.
    Patient,
    /// Doctor the appointment is assigned to.
    Doctor,
}

const TRANSITIONS: &[(AppointmentStatus, AppointmentStatus, Actor)] = &[
    (Pending, Confirmed, Actor::Doctor),
    (Pending, Rejected, Actor::Doctor),
    (Pending, Rejected, Actor::Patient),
    (Pending, Completed, Actor::Doctor),
    (Confirmed, Rejected, Actor::Doctor),
    (Confirmed, Rejected, Actor::Patient),
    (Confirmed, Completed, Actor::Doctor),
];

pub fn is_allowed(from: AppointmentStatus, to: AppointmentStatus, actor: Actor) -> bool {
    TRANSITIONS
        .iter()
        .any(|&(f, t, a)| f == from && t == to && a == actor)
}

/// Statuses `actor` may move an appointment to from `from`.
pub fn allowed_targets(from: AppointmentStatus, actor: Actor) -> Vec<AppointmentStatus> {
    TRANSITIONS
        .iter()
        .filter(|&&(f, _, a)| f == from && a == actor)
        .map(|&(_, t, _)| t)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AppointmentStatus; 4] = [Pending, Confirmed, Rejected, Completed];

    #[test]
    fn doctor_transitions() {
        assert!(is_allowed(Pending, Confirmed, Actor::Doctor));
        assert!(is_allowed(Pending, Rejected, Actor::Doctor));
        assert!(is_allowed(Pending, Completed, Actor::Doctor));
        assert!(is_allowed(Confirmed, Rejected, Actor::Doctor));
        assert!(is_allowed(Confirmed, Completed, Actor::Doctor));
        assert!(!is_allowed(Confirmed, Confirmed, Actor::Doctor));
    }

    #[test]
    fn patient_may_only_cancel_open_appointments() {
        assert_eq!(allowed_targets(Pending, Actor::Patient), vec![Rejected]);
        assert_eq!(allowed_targets(Confirmed, Actor::Patient), vec![Rejected]);
        assert!(!is_allowed(Pending, Confirmed, Actor::Patient));
        assert!(!is_allowed(Confirmed, Completed, Actor::Patient));
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for from in [Rejected, Completed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!is_allowed(from, to, Actor::Doctor), "{from} -> {to}");
                assert!(!is_allowed(from, to, Actor::Patient), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn terminal_flag_matches_table() {
        for from in ALL {
            let stuck = allowed_targets(from, Actor::Doctor).is_empty()
                && allowed_targets(from, Actor::Patient).is_empty();
            assert_eq!(from.is_terminal(), stuck, "{from}");
        }
    }

    #[test]
    fn nothing_returns_to_pending() {
        for from in ALL {
            assert!(!is_allowed(from, Pending, Actor::Doctor));
            assert!(!is_allowed(from, Pending, Actor::Patient));
        }
    }
}
