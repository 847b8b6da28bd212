//! Main simulation world that ties everything together
//!
//! The world owns the map, the light control and every live car, and steps
//! them in a fixed order: lights first, then cars in creation order.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

use super::car::{Car, CarUpdateResult};
use super::city_map::{CityMap, NodeId};
use super::traffic_lights::{LightPattern, TimeAware, TrafficLightsControl};
use super::types::{CarId, Coordinate, SimId};
use crate::stats::SimulationStats;

/// The main simulation world
pub struct SimWorld {
    /// The city map with its streets, lanes and traffic lights
    map: CityMap,

    /// All live cars, ordered by creation
    pub cars: BTreeMap<CarId, Car>,

    /// Round-robin control of every traffic light on the map
    pub lights_control: TrafficLightsControl,

    /// Spawn time of every live car
    spawn_times: BTreeMap<CarId, f64>,

    /// Next ID to assign
    next_id: usize,

    /// Simulation time
    pub time: f64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    pub stats: SimulationStats,
}

impl SimWorld {
    fn new_internal(map: CityMap, pattern: LightPattern, rng: Option<StdRng>) -> Self {
        Self {
            map,
            cars: BTreeMap::new(),
            lights_control: TrafficLightsControl::new(pattern),
            spawn_times: BTreeMap::new(),
            next_id: 0,
            time: 0.0,
            rng,
            stats: SimulationStats::new(),
        }
    }

    pub fn new(map: CityMap, pattern: LightPattern) -> Self {
        Self::new_internal(map, pattern, None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(map: CityMap, pattern: LightPattern, seed: u64) -> Self {
        Self::new_internal(map, pattern, Some(StdRng::seed_from_u64(seed)))
    }

    pub fn map(&self) -> &CityMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut CityMap {
        &mut self.map
    }

    pub fn car(&self, car_id: CarId) -> Option<&Car> {
        self.cars.get(&car_id)
    }

    /// Choose a random element from a slice, using seeded RNG if available
    fn choose_random<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        match &mut self.rng {
            Some(rng) => slice.choose(rng),
            None => slice.choose(&mut rand::rng()),
        }
    }

    /// Spawn a car in the parking lot next to `start`, heading for `target`
    ///
    /// A failed spawn does not use up an ID.
    pub fn spawn_car(&mut self, start: Coordinate, target: Coordinate) -> Result<CarId> {
        let id = CarId(SimId(self.next_id));
        let car = match Car::new(id, &mut self.map, start, target) {
            Ok(car) => car,
            Err(e) => {
                self.stats.record_failed_spawn();
                return Err(e).with_context(|| {
                    format!("Failed to spawn car from {} to {}", start, target)
                });
            }
        };

        self.next_id += 1;
        self.cars.insert(id, car);
        self.spawn_times.insert(id, self.time);
        self.stats.record_spawn();
        self.stats.active_cars = self.cars.len() as u32;
        Ok(id)
    }

    /// Spawn a car between two distinct random border streets whose start
    /// parking lot is free
    ///
    /// Returns `None` when no such pair exists right now.
    pub fn spawn_random_car(&mut self) -> Result<Option<CarId>> {
        let border_streets = self.map.border_streets();
        let free_starts: Vec<Coordinate> = border_streets
            .iter()
            .copied()
            .filter(|street| {
                self.map
                    .border_of(*street)
                    .map(|border| NodeId::ParkingStart {
                        street: *street,
                        border,
                    })
                    .is_some_and(|node| !self.map.is_blocked(node))
            })
            .collect();

        let Some(&start) = self.choose_random(&free_starts) else {
            return Ok(None);
        };
        let targets: Vec<Coordinate> = border_streets
            .into_iter()
            .filter(|street| *street != start)
            .collect();
        let Some(&target) = self.choose_random(&targets) else {
            return Ok(None);
        };

        self.spawn_car(start, target).map(Some)
    }

    /// Advance a single car by `delta` time units
    ///
    /// The car is taken out of the collection while it moves so it can look
    /// at the blocking directions of every other car.
    pub fn advance_car(&mut self, car_id: CarId, delta: f64) -> Result<CarUpdateResult> {
        let mut car = self
            .cars
            .remove(&car_id)
            .with_context(|| format!("Car {:?} not found", car_id))?;
        let result = car.add_time(delta, &mut self.map, &self.cars);
        self.cars.insert(car_id, car);
        result
    }

    /// Advance the light control and set every traffic light on the map for
    /// the current phase
    pub fn update_traffic_lights(&mut self, delta_secs: f64) {
        self.lights_control.add_time(delta_secs);
        let lights = self.map.traffic_lights_mut();
        self.lights_control.set_lights(lights);
    }

    /// Update all cars in creation order
    fn update_cars(&mut self, delta_secs: f64) -> Vec<(CarId, CarUpdateResult)> {
        let car_ids: Vec<CarId> = self.cars.keys().copied().collect();
        let mut results = Vec::with_capacity(car_ids.len());

        for car_id in car_ids {
            match self.advance_car(car_id, delta_secs) {
                Ok(result) => results.push((car_id, result)),
                Err(e) => warn!("Failed to advance car {:?}: {:#}", car_id.0, e),
            }
        }

        results
    }

    /// Remove a car that reached its target
    fn despawn_car(&mut self, car_id: CarId) {
        if let Some(car) = self.cars.remove(&car_id) {
            let spawned_at = self.spawn_times.remove(&car_id).unwrap_or(0.0);
            let trip_duration = self.time - spawned_at;
            self.stats.record_arrival(trip_duration);
            info!(
                "Car {:?} arrived at {} after {:.2}",
                car_id.0, car.target, trip_duration
            );
        }
    }

    /// Main simulation tick
    pub fn tick(&mut self, delta_secs: f64) {
        self.time += delta_secs;
        self.stats.elapsed_time = self.time;

        self.update_traffic_lights(delta_secs);

        for (car_id, result) in self.update_cars(delta_secs) {
            if result == CarUpdateResult::ArrivedAtTarget {
                self.despawn_car(car_id);
            }
        }

        self.stats.active_cars = self.cars.len() as u32;
        debug!("Tick at {:.2}: {} active cars", self.time, self.cars.len());
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Rush City Summary ===");
        println!("Time: {:.2}", self.time);
        println!(
            "Streets: {}, Connections: {}, Traffic lights: {}",
            self.map.street_count(),
            self.map.network().connection_count(),
            self.map.traffic_light_lanes().len()
        );
        println!("Cars: {}", self.cars.len());

        if !self.cars.is_empty() {
            println!("--- Active Cars ---");
            for car in self.cars.values() {
                let position = car.position();
                println!(
                    "  Car {:?}: dist={:.2}/{}, position=({:.1}, {:.1}), target={}",
                    (car.id.0).0,
                    car.covered_distance(),
                    car.path().length(),
                    position.x,
                    position.y,
                    car.target
                );
            }
        }
    }

    /// Render the map with every car on the map drawn as `C`
    pub fn render_map(&self) -> String {
        let mut grid: Vec<Vec<char>> = self
            .map
            .render()
            .lines()
            .skip(1)
            .map(|line| line.chars().collect())
            .collect();

        for car in self.cars.values() {
            let position = car.position();
            let row = (position.y / 2.0).floor();
            let column = (position.x / 2.0).floor();
            if row < 0.0 || column < 0.0 {
                continue;
            }
            if let Some(cell) = grid
                .get_mut(row as usize)
                .and_then(|line| line.get_mut(column as usize))
            {
                *cell = 'C';
            }
        }

        let mut out = format!("Map {}x{}\n", self.map.num_cols(), self.map.num_rows());
        for line in grid {
            out.extend(line);
            out.push('\n');
        }
        out
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== World Map ===");
        println!("Legend: X=Street, C=Car");
        print!("{}", self.render_map());
        println!();
    }
}
