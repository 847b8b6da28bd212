use log::info;
use ordered_float::OrderedFloat;
use sorted_vec::SortedVec;

/// Statistics of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationStats {
    pub total_cars_spawned: u32,
    pub total_cars_completed: u32,
    pub failed_spawns: u32,
    pub active_cars: u32,
    pub elapsed_time: f64,
    /// Time from spawn to arrival of every completed car
    trip_durations: SortedVec<OrderedFloat<f64>>,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self {
            total_cars_spawned: 0,
            total_cars_completed: 0,
            failed_spawns: 0,
            active_cars: 0,
            elapsed_time: 0.0,
            trip_durations: SortedVec::new(),
        }
    }

    pub fn record_spawn(&mut self) {
        self.total_cars_spawned += 1;
    }

    pub fn record_failed_spawn(&mut self) {
        self.failed_spawns += 1;
    }

    pub fn record_arrival(&mut self, trip_duration: f64) {
        self.total_cars_completed += 1;
        self.trip_durations.insert(OrderedFloat(trip_duration));
    }

    pub fn median_trip_duration(&self) -> Option<f64> {
        let count = self.trip_durations.len();
        if count == 0 {
            return None;
        }
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (self.trip_durations[mid - 1].into_inner() + self.trip_durations[mid].into_inner()) / 2.0
        } else {
            self.trip_durations[mid].into_inner()
        };
        Some(median)
    }

    pub fn longest_trip_duration(&self) -> Option<f64> {
        self.trip_durations.last().map(|d| d.into_inner())
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_cars_spawned > 0 {
            (self.total_cars_completed as f64 / self.total_cars_spawned as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Log the summary block of a headless run
    pub fn log_summary(&self, total_streets: usize, total_traffic_lights: usize) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}", self.elapsed_time);
        info!("Total cars spawned: {}", self.total_cars_spawned);
        info!("Total cars completed: {}", self.total_cars_completed);
        info!("Failed spawns: {}", self.failed_spawns);
        info!("Active cars: {}", self.active_cars);
        info!("Total streets: {}", total_streets);
        info!("Total traffic lights: {}", total_traffic_lights);
        if let Some(median) = self.median_trip_duration() {
            info!("Median trip duration: {:.2}", median);
        }
        if let Some(longest) = self.longest_trip_duration() {
            info!("Longest trip duration: {:.2}", longest);
        }
        info!("Success rate: {:.1}%", self.success_rate());
    }
}

impl Default for SimulationStats {
    fn default() -> Self {
        Self::new()
    }
}
