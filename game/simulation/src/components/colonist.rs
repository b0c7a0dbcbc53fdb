use crate::kinds::{Need, NEED_COUNT};

#[derive(Clone, Debug, PartialEq)]
pub struct Colonist {
    pub name: String,
}

/// One tracked need's current value and the thresholds that drive the
/// decision evaluator and needs decay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NeedState {
    /// 0 (empty) to 100 (fully satisfied)
    pub value: f32,
    /// Units lost per in-game minute
    pub decay: f32,
    /// Value below which the decision evaluator starts considering this need
    pub seek_threshold: f32,
    /// Value below which this need overrides everything else
    pub critical_threshold: f32,
}

impl NeedState {
    pub fn new(decay: f32, seek_threshold: f32, critical_threshold: f32) -> Self {
        Self {
            value: 100.0,
            decay,
            seek_threshold,
            critical_threshold,
        }
    }

    pub fn tick(&mut self, game_minutes: f32) {
        self.value = (self.value - self.decay * game_minutes).clamp(0.0, 100.0);
    }

    pub fn is_seeking(&self) -> bool {
        self.value <= self.seek_threshold
    }

    pub fn is_critical(&self) -> bool {
        self.value <= self.critical_threshold
    }
}

/// All eight of a colonist's needs, indexed by [`Need`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NeedsComponent(pub [NeedState; NEED_COUNT]);

impl NeedsComponent {
    pub fn get(&self, need: Need) -> NeedState {
        self.0[need as usize]
    }

    pub fn get_mut(&mut self, need: Need) -> &mut NeedState {
        &mut self.0[need as usize]
    }

    pub fn apply(&mut self, need: Need, amount: f32) {
        let state = self.get_mut(need);
        state.value = (state.value + amount).clamp(0.0, 100.0);
    }

    /// The most urgent actionable need, if any has dropped to its seek
    /// threshold. Ties broken by [`Need::ACTIONABLE`] order.
    pub fn most_urgent(&self) -> Option<Need> {
        Need::ACTIONABLE
            .iter()
            .copied()
            .filter(|&n| self.get(n).is_seeking())
            .min_by(|&a, &b| self.get(a).value.partial_cmp(&self.get(b).value).unwrap())
    }
}

impl Default for NeedsComponent {
    /// Default decay/threshold tuning; real colonists get these from the
    /// asset catalog's colonist definition once one exists, but these
    /// defaults keep the component constructible standalone for tests.
    fn default() -> Self {
        use Need::*;
        let mut states = [NeedState::new(0.0, 40.0, 10.0); NEED_COUNT];
        states[Hunger as usize] = NeedState::new(0.35, 40.0, 15.0);
        states[Thirst as usize] = NeedState::new(0.5, 45.0, 15.0);
        states[Energy as usize] = NeedState::new(0.2, 30.0, 10.0);
        states[Bladder as usize] = NeedState::new(0.4, 35.0, 10.0);
        states[Digestion as usize] = NeedState::new(0.1, 50.0, 20.0);
        states[Hygiene as usize] = NeedState::new(0.1, 30.0, 5.0);
        states[Recreation as usize] = NeedState::new(0.08, 25.0, 5.0);
        states[Temperature as usize] = NeedState::new(0.0, 30.0, 5.0);
        Self(states)
    }
}
