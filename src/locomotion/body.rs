use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// The slice of a rigid body the controller drives.
pub trait PhysicsBody {
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, value: Vec3);
    fn set_angular_velocity(&mut self, value: Vec3);
    fn set_friction(&mut self, coefficient: f32);
    /// Impulse through the centre of mass, so it adds no torque.
    fn apply_impulse(&mut self, impulse: Vec3);
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, value: Vec3);
    fn set_rotation(&mut self, value: Quat);
}

/// A rapier body assembled from the entity's components.
pub struct RapierBody<'a> {
    transform: &'a mut Transform,
    velocity: &'a mut Velocity,
    impulse: &'a mut ExternalImpulse,
    friction: &'a mut Friction,
}

impl<'a> RapierBody<'a> {
    /// Returns `None` while any of the body components is still missing.
    pub fn assemble(
        transform: &'a mut Transform,
        velocity: Option<&'a mut Velocity>,
        impulse: Option<&'a mut ExternalImpulse>,
        friction: Option<&'a mut Friction>,
    ) -> Option<Self> {
        Some(RapierBody {
            transform,
            velocity: velocity?,
            impulse: impulse?,
            friction: friction?,
        })
    }

    /// Same as [`RapierBody::assemble`], straight from query items.
    pub fn from_components(
        transform: Mut<'a, Transform>,
        velocity: Option<Mut<'a, Velocity>>,
        impulse: Option<Mut<'a, ExternalImpulse>>,
        friction: Option<Mut<'a, Friction>>,
    ) -> Option<Self> {
        Self::assemble(
            transform.into_inner(),
            velocity.map(Mut::into_inner),
            impulse.map(Mut::into_inner),
            friction.map(Mut::into_inner),
        )
    }
}

impl PhysicsBody for RapierBody<'_> {
    fn linear_velocity(&self) -> Vec3 {
        self.velocity.linvel
    }

    fn set_linear_velocity(&mut self, value: Vec3) {
        self.velocity.linvel = value;
    }

    fn set_angular_velocity(&mut self, value: Vec3) {
        self.velocity.angvel = value;
    }

    fn set_friction(&mut self, coefficient: f32) {
        self.friction.coefficient = coefficient;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        // rapier clears this after every step, so several impulses in one
        // frame stack up.
        self.impulse.impulse += impulse;
    }

    fn translation(&self) -> Vec3 {
        self.transform.translation
    }

    fn set_translation(&mut self, value: Vec3) {
        self.transform.translation = value;
    }

    fn set_rotation(&mut self, value: Quat) {
        self.transform.rotation = value;
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    #[derive(Debug, Default)]
    pub struct MockBody {
        pub translation: Vec3,
        pub rotation: Quat,
        pub linvel: Vec3,
        pub angvel: Vec3,
        pub friction: f32,
        pub impulses: Vec<Vec3>,
    }

    impl MockBody {
        pub fn moving(linvel: Vec3) -> Self {
            MockBody {
                linvel,
                friction: 1.0,
                ..default()
            }
        }
    }

    impl PhysicsBody for MockBody {
        fn linear_velocity(&self) -> Vec3 {
            self.linvel
        }

        fn set_linear_velocity(&mut self, value: Vec3) {
            self.linvel = value;
        }

        fn set_angular_velocity(&mut self, value: Vec3) {
            self.angvel = value;
        }

        fn set_friction(&mut self, coefficient: f32) {
            self.friction = coefficient;
        }

        fn apply_impulse(&mut self, impulse: Vec3) {
            self.impulses.push(impulse);
        }

        fn translation(&self) -> Vec3 {
            self.translation
        }

        fn set_translation(&mut self, value: Vec3) {
            self.translation = value;
        }

        fn set_rotation(&mut self, value: Quat) {
            self.rotation = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapier_body_needs_every_component() {
        let mut transform = Transform::default();
        let mut velocity = Velocity::zero();
        let mut friction = Friction::coefficient(1.0);
        assert!(RapierBody::assemble(
            &mut transform,
            Some(&mut velocity),
            None,
            Some(&mut friction)
        )
        .is_none());
    }

    #[test]
    fn impulses_accumulate_until_the_step() {
        let mut transform = Transform::default();
        let mut velocity = Velocity::zero();
        let mut impulse = ExternalImpulse::default();
        let mut friction = Friction::coefficient(1.0);
        let mut body = RapierBody::assemble(
            &mut transform,
            Some(&mut velocity),
            Some(&mut impulse),
            Some(&mut friction),
        )
        .unwrap();
        body.apply_impulse(Vec3::X);
        body.apply_impulse(Vec3::Y);
        body.set_friction(0.1);
        assert_eq!(impulse.impulse, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(friction.coefficient, 0.1);
    }
}
