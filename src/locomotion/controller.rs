//! Player locomotion state machine.
//!
//! Everything here works on a [`PhysicsBody`] so it can run against rapier in
//! the game and against a mock in tests. A body of `None` means the player's
//! physics body has not been attached yet.

use super::body::PhysicsBody;
use crate::{
    config::LocomotionConfig,
    error::LocomotionError,
    input::PlayerAction,
    types::{AirborneState, MoveDirection},
};
use bevy::prelude::*;
use std::time::Duration;

/// Periodic trigger for walking impulses, advanced on the fixed clock.
#[derive(Debug, Clone, Reflect)]
pub struct RepeatMove {
    period: Duration,
    elapsed: Duration,
}

impl RepeatMove {
    pub fn new(period: Duration) -> Self {
        RepeatMove {
            period,
            elapsed: Duration::ZERO,
        }
    }

    /// Advances the accumulator and returns how many periods completed.
    pub fn tick(&mut self, delta: Duration) -> u32 {
        if self.period.is_zero() {
            return 0;
        }
        self.elapsed += delta;
        let mut fired = 0;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// What the caller still has to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyResponse {
    None,
    /// Apply this friction to every ground body too.
    Friction(f32),
    LaunchEgg(MoveDirection),
}

#[derive(Component, Debug, Reflect)]
#[reflect(Component)]
pub struct LocomotionController {
    direction: MoveDirection,
    facing: MoveDirection,
    airborne: AirborneState,
    repeat: Option<RepeatMove>,
}

impl Default for LocomotionController {
    fn default() -> Self {
        LocomotionController {
            direction: MoveDirection::Neutral,
            facing: MoveDirection::Right,
            airborne: AirborneState::Grounded,
            repeat: None,
        }
    }
}

impl LocomotionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    /// Last direction the player moved in.
    pub fn facing(&self) -> MoveDirection {
        self.facing
    }

    pub fn airborne(&self) -> AirborneState {
        self.airborne
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat.is_some()
    }

    pub fn repeat(&self) -> Option<&RepeatMove> {
        self.repeat.as_ref()
    }

    /// Handles a key going down.
    pub fn key_down<B: PhysicsBody>(
        &mut self,
        key: PlayerAction,
        body: Option<&mut B>,
        config: &LocomotionConfig,
    ) -> Result<KeyResponse, LocomotionError> {
        match key {
            PlayerAction::Flap => {
                self.flap(body, config)?;
                Ok(KeyResponse::None)
            }
            PlayerAction::MoveLeft => Ok(self.start_moving(MoveDirection::Left, body, config)),
            PlayerAction::MoveRight => Ok(self.start_moving(MoveDirection::Right, body, config)),
            PlayerAction::LaunchEgg => Ok(KeyResponse::LaunchEgg(self.launch_direction())),
        }
    }

    /// Handles a key coming up. Returns the friction to restore on the ground
    /// bodies when movement stopped.
    pub fn key_up<B: PhysicsBody>(
        &mut self,
        key: PlayerAction,
        body: Option<&mut B>,
        config: &LocomotionConfig,
    ) -> Option<f32> {
        match key {
            PlayerAction::MoveLeft | PlayerAction::MoveRight => {
                self.direction = MoveDirection::Neutral;
                if self.repeat.take().is_some() {
                    debug!("repeat move stopped");
                }
                if let Some(body) = body {
                    body.set_friction(config.resting_friction);
                }
                Some(config.resting_friction)
            }
            PlayerAction::Flap | PlayerAction::LaunchEgg => None,
        }
    }

    fn start_moving<B: PhysicsBody>(
        &mut self,
        direction: MoveDirection,
        body: Option<&mut B>,
        config: &LocomotionConfig,
    ) -> KeyResponse {
        self.direction = direction;
        self.facing = direction;
        if let Some(body) = body {
            body.set_friction(config.sliding_friction);
        }
        if self.repeat.is_none() {
            debug!("repeat move started");
            self.repeat = Some(RepeatMove::new(config.repeat_period()));
        }
        KeyResponse::Friction(config.sliding_friction)
    }

    fn launch_direction(&self) -> MoveDirection {
        if self.direction.is_active() {
            self.direction
        } else {
            self.facing
        }
    }

    /// Upward impulse with a horizontal push in the current direction.
    pub fn flap<B: PhysicsBody>(
        &mut self,
        body: Option<&mut B>,
        config: &LocomotionConfig,
    ) -> Result<(), LocomotionError> {
        let body = body.ok_or(LocomotionError::PhysicsBodyNotReady)?;
        let boost = boost(body.linear_velocity().x, self.direction, config);
        let impulse = Vec3::new(
            self.direction.sign() * config.flap_horizontal_impulse * boost,
            config.flap_vertical_impulse,
            0.0,
        );
        body.apply_impulse(impulse);
        reset_velocity(Some(body))?;
        self.airborne = AirborneState::Airborne;
        debug!("flap {impulse}");
        Ok(())
    }

    /// Advances the repeat accumulator and accelerates once per completed
    /// period. Returns how many step impulses were applied.
    pub fn tick<B: PhysicsBody>(
        &mut self,
        delta: Duration,
        mut body: Option<&mut B>,
        config: &LocomotionConfig,
    ) -> u32 {
        let fired = match self.repeat.as_mut() {
            Some(repeat) => repeat.tick(delta),
            None => return 0,
        };
        let mut applied = 0;
        for _ in 0..fired {
            if let Ok(true) = self.accelerate(body.as_deref_mut(), config) {
                applied += 1;
            }
        }
        applied
    }

    /// Walking step. Returns whether an impulse was applied.
    pub fn accelerate<B: PhysicsBody>(
        &mut self,
        body: Option<&mut B>,
        config: &LocomotionConfig,
    ) -> Result<bool, LocomotionError> {
        let body = body.ok_or(LocomotionError::PhysicsBodyNotReady)?;
        reset_velocity(Some(&mut *body))?;
        let velocity_x = body.linear_velocity().x;
        let below_cap = velocity_x * self.direction.sign() < config.speed_cap;
        if !(self.direction.is_active() && below_cap && self.airborne.grounded()) {
            return Ok(false);
        }
        let boost = boost(velocity_x, self.direction, config);
        body.apply_impulse(Vec3::X * self.direction.sign() * config.step_impulse * boost);
        Ok(true)
    }

    /// Contact with a landing surface. Slow contacts ground the player, fast
    /// ones are bounces.
    pub fn on_ground_collision(&mut self, velocity: Vec3, config: &LocomotionConfig) -> bool {
        if velocity.y.abs() < config.grounding_speed {
            if !self.airborne.grounded() {
                debug!("landed");
            }
            self.airborne = AirborneState::Grounded;
            true
        } else {
            false
        }
    }
}

/// Keeps the player in the movement plane and cancels tumbling.
pub fn reset_velocity<B: PhysicsBody>(body: Option<&mut B>) -> Result<(), LocomotionError> {
    let body = body.ok_or(LocomotionError::PhysicsBodyNotReady)?;
    let mut velocity = body.linear_velocity();
    velocity.z = 0.0;
    body.set_linear_velocity(velocity);
    let mut translation = body.translation();
    translation.z = 0.0;
    body.set_translation(translation);
    body.set_angular_velocity(Vec3::ZERO);
    body.set_rotation(Quat::IDENTITY);
    Ok(())
}

pub fn velocity_sign(velocity: f32) -> Result<f32, LocomotionError> {
    if velocity == 0.0 || !velocity.is_finite() {
        Err(LocomotionError::IndeterminateVelocitySign)
    } else {
        Ok(velocity.signum())
    }
}

/// 1 when already moving in `direction`, the reversing boost otherwise. A
/// body at rest counts as already moving the right way.
pub fn boost(velocity_x: f32, direction: MoveDirection, config: &LocomotionConfig) -> f32 {
    match velocity_sign(velocity_x) {
        Ok(sign) if sign == direction.sign() => 1.0,
        Ok(_) => config.reversing_boost,
        Err(_) => 1.0,
    }
}
