//! Car movement logic for the traffic simulation
//!
//! A car slides from the parking lot next to its start street onto the map,
//! follows its lane path one node per time unit and slides off into the
//! parking lot next to its target street. Its rear owns exactly one node at a
//! time; its front may only enter nodes that do not block its heading.

use anyhow::{ensure, Context, Result};
use log::{debug, trace};
use std::collections::BTreeMap;
use std::fmt;

use super::city_map::{CityMap, NodeId};
use super::direction::{Direction, DirectionSet};
use super::pathfinder::{shortest_lane_path, LanePath};
use super::types::{CarId, Coordinate, Position};

/// Result of a car update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarUpdateResult {
    Continue,        // Car is still on its way
    ArrivedAtTarget, // Car reached its target parking lot and may be despawned
}

/// Resolves which directions another car blocks
pub trait BlockingLookup {
    fn blocking_directions_of(&self, car: CarId) -> Option<DirectionSet>;
}

impl BlockingLookup for BTreeMap<CarId, Car> {
    fn blocking_directions_of(&self, car: CarId) -> Option<DirectionSet> {
        self.get(&car).map(Car::blocking_directions)
    }
}

/// The path of a car: start parking lot, lanes, target parking lot
#[derive(Debug, Clone)]
pub struct CarPath {
    lane_path: LanePath,
    nodes: Vec<NodeId>,
}

impl CarPath {
    /// Wrap a lane path with the parking lots of its first and last street
    pub fn new(map: &mut CityMap, lane_path: LanePath) -> Result<Self> {
        let first = lane_path.first().context("Lane path is empty")?;
        let last = lane_path.last().context("Lane path is empty")?;

        let start = map.car_start(first.street)?;
        let target = map.car_target(last.street)?;

        let mut nodes = Vec::with_capacity(lane_path.len() + 2);
        nodes.push(start);
        nodes.extend(lane_path.lanes.iter().copied().map(NodeId::Lane));
        nodes.push(target);

        Ok(Self { lane_path, nodes })
    }

    /// Number of node-to-node edges of this path
    pub fn length(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl fmt::Display for CarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CarPath (len={})", self.length())
    }
}

/// The front of a car, tracking which lane it is entering
#[derive(Debug, Clone, Copy)]
struct FrontPart {
    index: usize,
}

impl FrontPart {
    fn advance_to(&mut self, car: CarId, map: &mut CityMap, path: &CarPath, index: usize) -> Result<()> {
        if let Some(lane) = path.nodes[self.index].as_lane() {
            map.remove_entering_car(lane, car)?;
        }
        if let Some(lane) = path.nodes[index].as_lane() {
            map.add_entering_car(lane, car)?;
        }
        self.index = index;
        Ok(())
    }
}

/// The rear of a car, owning the node it occupies
#[derive(Debug, Clone, Copy)]
struct RearPart {
    index: usize,
}

impl RearPart {
    fn advance_to(&mut self, car: CarId, map: &mut CityMap, path: &CarPath, index: usize) -> Result<()> {
        map.release(path.nodes[self.index], car)?;
        map.claim(path.nodes[index], car)?;
        self.index = index;
        Ok(())
    }
}

/// A car driving from a start street to a target street
#[derive(Debug, Clone)]
pub struct Car {
    pub id: CarId,
    pub start: Coordinate,
    pub target: Coordinate,
    path: CarPath,
    front: FrontPart,
    rear: RearPart,
    covered_distance: f64,
}

impl Car {
    /// Create a car waiting in the parking lot next to `start`
    ///
    /// Fails if `target` cannot be reached or either street does not adjoin
    /// a border.
    pub fn new(id: CarId, map: &mut CityMap, start: Coordinate, target: Coordinate) -> Result<Self> {
        let lane_path = shortest_lane_path(map, start, target)?;
        let path = CarPath::new(map, lane_path)?;

        map.claim(path.nodes[0], id)?;
        if let Some(first_lane) = path.lane_path.first() {
            map.add_entering_car(first_lane, id)?;
        }

        debug!(
            "Car {:?} created from {} to {} ({})",
            id.0, start, target, path
        );

        Ok(Self {
            id,
            start,
            target,
            path,
            front: FrontPart { index: 0 },
            rear: RearPart { index: 0 },
            covered_distance: 0.0,
        })
    }

    pub fn path(&self) -> &CarPath {
        &self.path
    }

    /// Continuous position along the path, in node-to-node edges
    pub fn covered_distance(&self) -> f64 {
        self.covered_distance
    }

    pub fn front_node(&self) -> NodeId {
        self.path.nodes[self.front.index]
    }

    pub fn rear_node(&self) -> NodeId {
        self.path.nodes[self.rear.index]
    }

    /// Check whether this car has reached its target parking lot
    pub fn is_at_target(&self) -> bool {
        self.covered_distance >= self.path.length() as f64
    }

    /// Current direction this car is heading, none while front and rear
    /// share a node
    pub fn direction(&self) -> Option<Direction> {
        if self.front.index == self.rear.index {
            None
        } else {
            Some(self.rear_node().direction_to(&self.front_node()))
        }
    }

    /// All directions that are blocked by this car for other cars
    pub fn blocking_directions(&self) -> DirectionSet {
        let mut result = DirectionSet::all();
        if let Some(heading) = self.direction() {
            result.remove(heading);
        }
        result
    }

    pub fn position(&self) -> Position {
        let rear = self.rear_node().position();
        match self.direction() {
            Some(heading) => rear.offset(heading, self.covered_distance % 1.0),
            None => rear,
        }
    }

    pub fn x(&self) -> f64 {
        self.position().x
    }

    pub fn y(&self) -> f64 {
        self.position().y
    }

    /// Advance this car by up to `delta` time units
    ///
    /// One time unit moves the car by one node. The car stops in front of the
    /// first node that blocks its heading and keeps its exact progress for
    /// the next call. Calling this at the target does nothing.
    pub fn add_time(
        &mut self,
        delta: f64,
        map: &mut CityMap,
        others: &impl BlockingLookup,
    ) -> Result<CarUpdateResult> {
        ensure!(
            delta >= 0.0 && delta.is_finite(),
            "Car {:?} cannot advance by {}",
            self.id.0,
            delta
        );
        if self.is_at_target() {
            return Ok(CarUpdateResult::ArrivedAtTarget);
        }

        let path_size = self.path.nodes.len();
        let start_distance = self.covered_distance;
        let old_rear_idx = start_distance.floor() as usize;

        let new_dist = start_distance + delta;
        let max_rear_idx = (new_dist.floor() as usize).min(path_size - 1);

        for rear_idx in old_rear_idx..=max_rear_idx {
            let front_idx = rear_idx + 1;
            self.rear.advance_to(self.id, map, &self.path, rear_idx)?;
            // Pin at the node boundary without losing progress made before
            // this call
            self.covered_distance = start_distance.max(rear_idx as f64);

            if front_idx >= path_size {
                break;
            }

            let new_rear_node = self.path.nodes[rear_idx];
            let new_front_node = self.path.nodes[front_idx];
            let travel_dir = new_rear_node.direction_to(&new_front_node);
            let own_id = self.id;
            let blocked = map.blocked_directions(new_front_node, |owner| {
                if owner == own_id {
                    DirectionSet::empty()
                } else {
                    others
                        .blocking_directions_of(owner)
                        .unwrap_or_else(DirectionSet::all)
                }
            });
            if blocked.contains(travel_dir) {
                trace!(
                    "Car {:?} waits at {:?} heading {:?}",
                    self.id.0,
                    new_rear_node,
                    travel_dir
                );
                break;
            }

            self.front.advance_to(self.id, map, &self.path, front_idx)?;
            self.covered_distance = new_dist;
        }

        if self.is_at_target() {
            debug!("Car {:?} arrived at {}", self.id.0, self.target);
            Ok(CarUpdateResult::ArrivedAtTarget)
        } else {
            Ok(CarUpdateResult::Continue)
        }
    }
}

impl fmt::Display for Car {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let position = self.position();
        write!(
            f,
            "Car#{} [dist={}/{}][x/y={}/{}][start: {}][target: {}]",
            (self.id.0).0,
            self.covered_distance,
            self.path.length(),
            position.x,
            position.y,
            self.start,
            self.target
        )
    }
}
