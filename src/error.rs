use crate::locomotion::egg::{EggCarryState, EggEvent};

/// Errors from locomotion operations.
///
/// None of these are fatal. Systems log them and carry on with the next
/// input or tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocomotionError {
    #[error("player physics body is not ready yet")]
    PhysicsBodyNotReady,
    #[error("horizontal velocity has no sign")]
    IndeterminateVelocitySign,
    #[error("egg cannot handle {event:?} while {state:?}")]
    InvalidEggTransition {
        state: EggCarryState,
        event: EggEvent,
    },
}
