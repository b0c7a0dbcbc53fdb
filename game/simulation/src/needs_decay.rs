use std::cell::RefCell;
use std::rc::Rc;

use ecs::{System, World};

use crate::components::NeedsComponent;
use crate::time::GameTime;

/// Decays every colonist's needs by the game-minutes elapsed this tick.
/// Reads [`GameTime::last_tick_game_minutes`], which
/// [`crate::time::TimeSystem`] (a lower priority, so it runs first within
/// the same [`World::update`] call) refreshes every tick.
pub struct NeedsDecaySystem {
    time: Rc<RefCell<GameTime>>,
}

impl NeedsDecaySystem {
    pub fn new(time: Rc<RefCell<GameTime>>) -> Self {
        Self { time }
    }
}

impl System for NeedsDecaySystem {
    fn priority(&self) -> u32 {
        50
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        let minutes = self.time.borrow().last_tick_game_minutes;
        if minutes <= 0.0 {
            return;
        }

        for (_entity, needs) in world.pool_mut::<NeedsComponent>().iter_mut() {
            for state in needs.0.iter_mut() {
                state.tick(minutes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::Need;

    #[test]
    fn decay_reduces_need_value() {
        let mut world = World::new();
        let time = Rc::new(RefCell::new(GameTime::new(7)));
        time.borrow_mut().last_tick_game_minutes = 10.0;

        let e = world.create_entity();
        world.add_component(e, NeedsComponent::default());

        let mut system = NeedsDecaySystem::new(time);
        system.update(&mut world, 1.0 / 60.0);

        let needs = world.get_component::<NeedsComponent>(e).unwrap();
        assert!(needs.get(Need::Hunger).value < 100.0);
    }
}
