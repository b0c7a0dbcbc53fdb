use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use ecs::{System, World};

use crate::goal::GoalRegistry;
use crate::task_registry::GlobalTaskRegistry;

/// Periodically releases stale reservations on both registries so an
/// abandoned claim (colonist died mid-haul, task superseded) doesn't lock
/// out every other colonist forever.
pub struct ReservationSweepSystem {
    goals: Rc<RefCell<GoalRegistry>>,
    tasks: Rc<RefCell<GlobalTaskRegistry>>,
    timeout: f32,
    period: f32,
    accumulated: f32,
}

impl ReservationSweepSystem {
    pub fn new(goals: Rc<RefCell<GoalRegistry>>, tasks: Rc<RefCell<GlobalTaskRegistry>>, timeout: f32, period: f32) -> Self {
        Self {
            goals,
            tasks,
            timeout,
            period,
            accumulated: period,
        }
    }
}

impl System for ReservationSweepSystem {
    /// Lower priority than every goal producer and the decision evaluator:
    /// sweeping stale reservations only needs to run often enough to free
    /// them up before the next planning pass, not every tick.
    fn priority(&self) -> u32 {
        900
    }

    fn update(&mut self, _world: &mut World, dt: f32) {
        self.accumulated += dt;
        if self.accumulated < self.period {
            return;
        }
        self.accumulated = 0.0;

        let now = Instant::now();
        self.goals.borrow_mut().release_stale(now, self.timeout);
        self.tasks.borrow_mut().release_stale(now, self.timeout);
    }
}
