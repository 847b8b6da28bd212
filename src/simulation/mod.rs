//! Traffic simulation on a rectangular city grid
//!
//! Streets hold four lanes each, cars follow the shortest lane path between
//! two border streets and traffic lights are switched round-robin.

mod car;
mod city_map;
mod direction;
mod map_creator;
mod pathfinder;
mod street_network;
mod traffic_lights;
mod types;
mod world;

pub use car::{BlockingLookup, Car, CarPath, CarUpdateResult};
pub use city_map::{Border, CityMap, Lane, LaneId, LightColor, NodeId, ParkingLot, Street, TrafficLight};
pub use direction::{Direction, DirectionSet};
pub use map_creator::{CityMapCreator, DefaultCityMapCreator};
pub use pathfinder::{shortest_lane_path, shortest_path, LanePath, StreetPath};
pub use street_network::StreetNetwork;
pub use traffic_lights::{
    active_phase, ActivePhase, GameTime, LightPattern, TimeAware, TrafficLightsControl,
    DEFAULT_PEDESTRIAN_PHASE, DEFAULT_VEHICLE_PHASE,
};
pub use types::{CarId, Coordinate, Position, SimId, TILE_SIZE};
pub use world::SimWorld;
