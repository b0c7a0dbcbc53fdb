use common::*;
use ecs::{System, World};

use crate::components::{MovementTarget, Position, Rotation, Velocity};

/// Distance within which an entity is considered to have arrived, in metres.
const ARRIVAL_EPSILON: f32 = 0.1;

/// Walks entities toward their [`MovementTarget`], clearing `active` on
/// arrival, then faces [`Rotation`]-bearing entities along their velocity.
pub struct MovementSystem;

impl System for MovementSystem {
    fn priority(&self) -> u32 {
        100
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        world.view3::<Position, Velocity, MovementTarget>(|_entity, pos, velocity, movement| {
                if !movement.active {
                    return;
                }

                let (dx, dy) = movement.target - pos.0;
                let to_target = Vector2::new(dx, dy);

                if to_target.magnitude() < ARRIVAL_EPSILON {
                    velocity.0 = Vector2::zero();
                    movement.active = false;
                } else {
                    velocity.0 = to_target.normalize() * movement.speed;
                }
        });

        world.view2::<Velocity, Rotation>(|_entity, velocity, rotation| {
                if velocity.0.magnitude2() > 0.0 {
                    *rotation = Rotation::facing(velocity.0);
                }
        });
    }
}

/// Integrates position from velocity - plain Euler.
pub struct PhysicsSystem;

impl System for PhysicsSystem {
    fn priority(&self) -> u32 {
        200
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        world.view2::<Position, Velocity>(|_entity, pos, velocity| {
                pos.0 = pos.0 + (velocity.0.x * dt, velocity.0.y * dt);
        });
    }
}

#[cfg(test)]
mod tests {
    use unit::WorldPosition;

    use super::*;

    fn spawn(world: &mut World, pos: WorldPosition, target: WorldPosition) -> ecs::EntityId {
        let e = world.create_entity();
        world.add_component(e, Position(pos));
        world.add_component(e, Velocity::default());
        world.add_component(e, MovementTarget::new(target, 2.0));
        e
    }

    #[test]
    fn walks_toward_target() {
        let mut world = World::new();
        let e = spawn(&mut world, WorldPosition::ORIGIN, WorldPosition::new(10.0, 0.0));

        let mut system = MovementSystem;
        system.update(&mut world, 1.0 / 60.0);

        let velocity = world.get_component::<Velocity>(e).unwrap();
        assert!(velocity.0.x > 0.0);
        assert_eq!(velocity.0.y, 0.0);
        assert!(world.get_component::<MovementTarget>(e).unwrap().active);
    }

    #[test]
    fn arrival_clears_active_and_zeroes_velocity() {
        let mut world = World::new();
        let e = spawn(&mut world, WorldPosition::new(5.0, 5.0), WorldPosition::new(5.05, 5.0));

        let mut system = MovementSystem;
        system.update(&mut world, 1.0 / 60.0);

        let velocity = world.get_component::<Velocity>(e).unwrap();
        assert_eq!(velocity.0, Vector2::zero());
        assert!(!world.get_component::<MovementTarget>(e).unwrap().active);
    }

    #[test]
    fn inactive_target_is_ignored() {
        let mut world = World::new();
        let e = spawn(&mut world, WorldPosition::ORIGIN, WorldPosition::new(10.0, 0.0));
        world.get_component_mut::<MovementTarget>(e).unwrap().active = false;

        let mut system = MovementSystem;
        system.update(&mut world, 1.0 / 60.0);

        assert_eq!(world.get_component::<Velocity>(e).unwrap().0, Vector2::zero());
    }

    #[test]
    fn rotation_faces_velocity() {
        let mut world = World::new();
        let e = spawn(&mut world, WorldPosition::ORIGIN, WorldPosition::new(0.0, 10.0));
        world.add_component(e, Rotation { radians: 0.0 });

        let mut system = MovementSystem;
        system.update(&mut world, 1.0 / 60.0);

        let rotation = world.get_component::<Rotation>(e).unwrap();
        assert!((rotation.radians - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn physics_integrates_position() {
        let mut world = World::new();
        let e = world.create_entity();
        world.add_component(e, Position(WorldPosition::ORIGIN));
        world.add_component(e, Velocity(Vector2::new(2.0, 0.0)));

        let mut system = PhysicsSystem;
        system.update(&mut world, 0.5);

        let pos = world.get_component::<Position>(e).unwrap();
        assert!((pos.0.x() - 1.0).abs() < 1e-5);
    }
}
