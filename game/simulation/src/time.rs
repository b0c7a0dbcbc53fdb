use ecs::{System, World};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Speed {
    Paused,
    Normal,
    Fast,
    VeryFast,
}

impl Speed {
    fn multiplier(self) -> f32 {
        match self {
            Speed::Paused => 0.0,
            Speed::Normal => 1.0,
            Speed::Fast => 4.0,
            Speed::VeryFast => 16.0,
        }
    }
}

const GAME_MINUTES_PER_SECOND: f32 = 1.0;
const MINUTES_PER_DAY: f32 = 24.0 * 60.0;

/// The colony clock: total elapsed game time, calendar position, and the
/// player's chosen speed.
#[derive(Debug)]
pub struct GameTime {
    pub total_game_seconds: f64,
    pub day: u32,
    pub season_index: u32,
    pub days_per_season: u32,
    pub speed: Speed,
    previous_speed: Speed,
    /// Game-minutes elapsed in the tick just processed; consumed by
    /// [`crate::needs_decay::NeedsDecaySystem`], which runs immediately
    /// after this system within the same [`World::update`] call.
    pub last_tick_game_minutes: f32,
}

impl GameTime {
    pub fn new(days_per_season: u32) -> Self {
        Self {
            total_game_seconds: 0.0,
            day: 0,
            season_index: 0,
            days_per_season: days_per_season.max(1),
            speed: Speed::Normal,
            previous_speed: Speed::Normal,
            last_tick_game_minutes: 0.0,
        }
    }

    pub fn pause(&mut self) {
        if self.speed != Speed::Paused {
            self.previous_speed = self.speed;
            self.speed = Speed::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.speed == Speed::Paused {
            self.speed = self.previous_speed;
        }
    }

    pub fn set_speed(&mut self, speed: Speed) {
        if speed != Speed::Paused {
            self.previous_speed = speed;
        }
        self.speed = speed;
    }

    fn advance(&mut self, real_dt: f32, base_time_scale: f32) {
        let game_seconds = real_dt * base_time_scale * self.speed.multiplier();
        self.total_game_seconds += game_seconds as f64;
        self.last_tick_game_minutes = (game_seconds / 60.0) * GAME_MINUTES_PER_SECOND;

        let total_minutes = (self.total_game_seconds / 60.0) as f32;
        let total_days = (total_minutes / MINUTES_PER_DAY) as u32;
        self.day = total_days;
        self.season_index = total_days / self.days_per_season;
    }
}

/// Advances [`GameTime`] every tick, ahead of every other system so
/// `last_tick_game_minutes` is fresh by the time
/// [`crate::needs_decay::NeedsDecaySystem`] reads it.
pub struct TimeSystem {
    time: std::rc::Rc<std::cell::RefCell<GameTime>>,
    base_time_scale: f32,
}

impl TimeSystem {
    pub fn new(time: std::rc::Rc<std::cell::RefCell<GameTime>>, base_time_scale: f32) -> Self {
        Self { time, base_time_scale }
    }
}

impl System for TimeSystem {
    fn priority(&self) -> u32 {
        10
    }

    fn update(&mut self, _world: &mut World, dt: f32) {
        self.time.borrow_mut().advance(dt, self.base_time_scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_remembers_previous_speed() {
        let mut time = GameTime::new(7);
        time.set_speed(Speed::Fast);
        time.pause();
        assert_eq!(time.speed, Speed::Paused);
        time.resume();
        assert_eq!(time.speed, Speed::Fast);
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let mut time = GameTime::new(7);
        time.pause();
        time.advance(10.0, 1.0);
        assert_eq!(time.total_game_seconds, 0.0);
    }

    #[test]
    fn season_rolls_over_after_configured_days() {
        let mut time = GameTime::new(2);
        // 2 days/season * 1440 min/day * 60s/min, at 1x scale and speed
        time.advance(2.0 * 1440.0 * 60.0, 1.0);
        assert_eq!(time.season_index, 1);
    }
}
