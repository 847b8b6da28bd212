//! Shortest street paths and their expansion into lane paths

use anyhow::{Context, Result};
use log::trace;
use std::fmt;

use super::city_map::{CityMap, LaneId};
use super::types::Coordinate;

/// A list of streets which compose a path on a city map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetPath {
    pub streets: Vec<Coordinate>,
}

impl StreetPath {
    pub fn len(&self) -> usize {
        self.streets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streets.is_empty()
    }
}

impl fmt::Display for StreetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreetPath (len={}):", self.len())?;
        for street in &self.streets {
            write!(f, " {}", street)?;
        }
        Ok(())
    }
}

/// A list of lanes which compose a path on the streets of a city map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanePath {
    pub lanes: Vec<LaneId>,
}

impl LanePath {
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn first(&self) -> Option<LaneId> {
        self.lanes.first().copied()
    }

    pub fn last(&self) -> Option<LaneId> {
        self.lanes.last().copied()
    }
}

/// Find the path of streets between two given streets
///
/// An unreachable target means the map is misconfigured for this request.
pub fn shortest_path(map: &CityMap, start: Coordinate, target: Coordinate) -> Result<StreetPath> {
    map.street_at(start)
        .with_context(|| format!("No street at start {}", start))?;
    map.street_at(target)
        .with_context(|| format!("No street at target {}", target))?;

    let streets = map
        .network()
        .find_path(start, target)
        .with_context(|| format!("There is no path from {} to {}", start, target))?;
    Ok(StreetPath { streets })
}

/// Find the path of lanes between two given streets
///
/// Straight hops and right turns cross one lane per street. Left turns swing
/// through the left lane and the opposing lane before entering the next
/// street.
pub fn shortest_lane_path(map: &CityMap, start: Coordinate, target: Coordinate) -> Result<LanePath> {
    let street_path = shortest_path(map, start, target)?;

    let start_border = map
        .border_of(start)
        .with_context(|| format!("Start street {} does not adjoin a border", start))?;

    let mut last_street = start;
    let mut last_dir = start_border.opposite();
    let mut lanes = vec![LaneId::new(last_street, last_dir)];

    for &street in street_path.streets.iter().skip(1) {
        let next_dir = last_street.position().direction_to(&street.position());
        if next_dir == last_dir || next_dir == last_dir.turn_left() {
            lanes.push(LaneId::new(last_street, last_dir.turn_left()));
        }
        if next_dir == last_dir.turn_left() {
            lanes.push(LaneId::new(last_street, last_dir.opposite()));
        }
        lanes.push(LaneId::new(street, next_dir));
        last_street = street;
        last_dir = next_dir;
    }
    lanes.push(LaneId::new(target, last_dir.turn_left()));

    trace!("Lane path {} -> {}: {} lanes", start, target, lanes.len());
    Ok(LanePath { lanes })
}
