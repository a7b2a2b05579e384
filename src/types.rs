use bevy::prelude::*;

#[derive(Component)]
pub struct Player;

/// The visual part of the player, rotated to face the direction of travel.
#[derive(Component)]
pub struct PlayerModel;

#[derive(Component)]
pub struct Egg;

/// Floor of the level. Its friction follows the player's friction mode.
#[derive(Component)]
pub struct Ground;

#[derive(Component)]
pub struct Platform;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EngineSystemSet {
    ReadInput,
    HandleControls,
    Items,
    Constrain,
}

/// Horizontal movement intent along the x axis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MoveDirection {
    Left,
    #[default]
    Neutral,
    Right,
}

impl MoveDirection {
    pub fn sign(&self) -> f32 {
        match self {
            MoveDirection::Left => -1.0,
            MoveDirection::Neutral => 0.0,
            MoveDirection::Right => 1.0,
        }
    }

    pub fn is_active(&self) -> bool {
        *self != MoveDirection::Neutral
    }

    /// Yaw that turns a model authored facing -z toward the direction.
    pub fn facing_rotation(&self) -> Quat {
        match self {
            MoveDirection::Left => Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            MoveDirection::Neutral => Quat::IDENTITY,
            MoveDirection::Right => Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AirborneState {
    #[default]
    Grounded,
    Airborne,
}

impl AirborneState {
    pub fn grounded(&self) -> bool {
        *self == AirborneState::Grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_points_forward_along_travel() {
        let right = MoveDirection::Right.facing_rotation() * Vec3::NEG_Z;
        let left = MoveDirection::Left.facing_rotation() * Vec3::NEG_Z;
        assert!(right.abs_diff_eq(Vec3::X, 1e-5));
        assert!(left.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }
}
