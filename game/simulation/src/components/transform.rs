use common::*;
use unit::WorldPosition;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position(pub WorldPosition);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rotation {
    pub radians: f32,
}

impl Rotation {
    pub fn facing(dir: Vector2) -> Self {
        Self {
            radians: dir.y.atan2(dir.x),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Velocity(pub Vector2);

/// A colonist's current walk target, set by the decision evaluator and
/// cleared (`active = false`) by [`crate::movement_system::MovementSystem`]
/// on arrival.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MovementTarget {
    pub target: WorldPosition,
    pub speed: f32,
    pub active: bool,
}

impl MovementTarget {
    pub fn new(target: WorldPosition, speed: f32) -> Self {
        Self {
            target,
            speed,
            active: true,
        }
    }
}
