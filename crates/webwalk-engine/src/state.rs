//! Walk lifecycle state machine
//!
//! The walk controller drives a small, pure phase machine: every phase
//! change goes through [`advance`], which makes the lifecycle testable
//! without a browser and keeps the stop conditions in one place.

use std::fmt;

/// Why a walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Step budget exhausted
    MaxSteps,
    /// Distinct-location budget exhausted
    MaxVisitedLocations,
    /// No catalog rule matched the current location
    NoApplicableActions,
    /// Rules matched but nothing on the page was executable
    NoExecutableActions,
    /// The selection policy produced no action
    PolicyExhausted,
    /// Unrecoverable error (navigation failure after retry)
    Fatal,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MaxSteps => "max steps reached",
            Self::MaxVisitedLocations => "max visited locations reached",
            Self::NoApplicableActions => "no applicable actions",
            Self::NoExecutableActions => "no executable actions",
            Self::PolicyExhausted => "selection policy exhausted",
            Self::Fatal => "fatal error",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle phase of a walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, not yet started
    Idle,
    /// Initial navigation in flight
    Navigating,
    /// Step loop running
    Stepping,
    /// Terminal; absorbs all further events
    Halted(StopReason),
}

/// Events the walk controller feeds into the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    NavigationStarted,
    PageReady,
    StepFinished,
    Halt(StopReason),
}

/// Pure transition function. Invalid (phase, event) pairs leave the
/// phase unchanged; `Halted` is absorbing.
pub fn advance(phase: Phase, event: WalkEvent) -> Phase {
    match (phase, event) {
        (Phase::Halted(r), _) => Phase::Halted(r),
        (_, WalkEvent::Halt(reason)) => Phase::Halted(reason),
        (Phase::Idle, WalkEvent::NavigationStarted) => Phase::Navigating,
        (Phase::Navigating, WalkEvent::PageReady) => Phase::Stepping,
        (Phase::Stepping, WalkEvent::StepFinished) => Phase::Stepping,
        (phase, _) => phase,
    }
}
