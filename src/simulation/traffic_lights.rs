//! Game time and round-robin traffic light control

use anyhow::{ensure, Result};
use log::trace;

use super::city_map::TrafficLight;

/// Default time a single light stays green
pub const DEFAULT_VEHICLE_PHASE: f64 = 5.0;

/// Default time all lights stay red after a green phase
pub const DEFAULT_PEDESTRIAN_PHASE: f64 = 2.0;

/// A game object that is aware of game time
pub trait TimeAware {
    /// Add a given delta time to this instance
    fn add_time(&mut self, delta_time: f64);
}

/// Game time instance able to measure the overall completed time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameTime {
    pub overall: f64,
}

impl GameTime {
    pub fn new(overall: f64) -> Self {
        Self { overall }
    }
}

impl TimeAware for GameTime {
    fn add_time(&mut self, delta_time: f64) {
        self.overall += delta_time;
    }
}

/// Phases of a traffic lights control
///
/// `vehicle_phase` is how long a single light lets vehicles move,
/// `pedestrian_phase` how long every light stays red afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPattern {
    vehicle_phase: f64,
    pedestrian_phase: f64,
}

impl LightPattern {
    pub fn new(vehicle_phase: f64, pedestrian_phase: f64) -> Result<Self> {
        ensure!(
            vehicle_phase > 0.0 && pedestrian_phase > 0.0,
            "Light phases must be positive, got vehicle={} pedestrian={}",
            vehicle_phase,
            pedestrian_phase
        );
        Ok(Self {
            vehicle_phase,
            pedestrian_phase,
        })
    }

    pub fn vehicle_phase(&self) -> f64 {
        self.vehicle_phase
    }

    pub fn pedestrian_phase(&self) -> f64 {
        self.pedestrian_phase
    }

    /// [`LightPattern::vehicle_phase`] + [`LightPattern::pedestrian_phase`]
    pub fn whole_phase(&self) -> f64 {
        self.vehicle_phase + self.pedestrian_phase
    }
}

impl Default for LightPattern {
    fn default() -> Self {
        Self {
            vehicle_phase: DEFAULT_VEHICLE_PHASE,
            pedestrian_phase: DEFAULT_PEDESTRIAN_PHASE,
        }
    }
}

/// The light currently holding the round-robin slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePhase {
    pub index: usize,
    pub is_green: bool,
}

/// Which light of `count` lights is active after `elapsed` time
///
/// Returns `None` when there are no lights to control.
pub fn active_phase(elapsed: f64, pattern: &LightPattern, count: usize) -> Option<ActivePhase> {
    if count == 0 {
        return None;
    }
    let completed_cycles = elapsed / pattern.whole_phase();
    let cycle = completed_cycles.floor();
    let fraction = completed_cycles - cycle;
    Some(ActivePhase {
        index: (cycle as usize) % count,
        is_green: fraction < pattern.vehicle_phase() / pattern.whole_phase(),
    })
}

/// Sets a list of traffic lights to green on a round-robin basis
///
/// Holds no position in the cycle besides its clock, so applying the lights
/// any number of times at the same time yields the same colors.
#[derive(Debug, Clone, Default)]
pub struct TrafficLightsControl {
    pub pattern: LightPattern,
    time: GameTime,
}

impl TrafficLightsControl {
    pub fn new(pattern: LightPattern) -> Self {
        Self {
            pattern,
            time: GameTime::default(),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.time.overall
    }

    /// Set the given lights red or green for the current phase
    pub fn set_lights<'a, I>(&self, lights: I)
    where
        I: IntoIterator<Item = &'a mut TrafficLight>,
        I::IntoIter: ExactSizeIterator,
    {
        let lights = lights.into_iter();
        let Some(phase) = active_phase(self.time.overall, &self.pattern, lights.len()) else {
            return;
        };
        trace!(
            "Light {} of {} is {} at {:.2}",
            phase.index,
            lights.len(),
            if phase.is_green { "green" } else { "red" },
            self.time.overall
        );
        for (idx, light) in lights.enumerate() {
            if idx == phase.index && phase.is_green {
                light.set_green();
            } else {
                light.set_red();
            }
        }
    }
}

impl TimeAware for TrafficLightsControl {
    fn add_time(&mut self, delta_time: f64) {
        self.time.add_time(delta_time);
    }
}
