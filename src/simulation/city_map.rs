//! City map model: streets, lanes, borders with parking lots, traffic lights
//!
//! The topology is fixed once the map is built. Afterwards only traffic light
//! colors, lane/parking ownership and the entering-car bookkeeping change.

use anyhow::{ensure, Context, Result};
use std::collections::{BTreeMap, BTreeSet};

use super::direction::{Direction, DirectionSet};
use super::street_network::StreetNetwork;
use super::types::{CarId, Coordinate, Position};

/// Color of a traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightColor {
    Red,
    Green,
}

/// A traffic light may block cars entering a specific lane of a street
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLight {
    pub color: LightColor,
}

impl TrafficLight {
    pub fn new(color: LightColor) -> Self {
        Self { color }
    }

    pub fn is_red(&self) -> bool {
        self.color == LightColor::Red
    }

    pub fn is_green(&self) -> bool {
        self.color == LightColor::Green
    }

    pub fn set_red(&mut self) {
        self.color = LightColor::Red;
    }

    pub fn set_green(&mut self) {
        self.color = LightColor::Green;
    }
}

/// Identifies a lane by its street and the direction cars enter it from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneId {
    pub street: Coordinate,
    pub entering: Direction,
}

impl LaneId {
    pub fn new(street: Coordinate, entering: Direction) -> Self {
        Self { street, entering }
    }

    pub fn position(&self) -> Position {
        let street = self.street.position();
        let (dx, dy) = match self.entering {
            Direction::Northbound => (1.0, 1.0),
            Direction::Eastbound => (0.0, 1.0),
            Direction::Southbound => (0.0, 0.0),
            Direction::Westbound => (1.0, 0.0),
        };
        Position::new(street.x + dx, street.y + dy)
    }
}

/// Any element of a car path
///
/// Parking nodes sit just outside the map, next to the border-adjacent street
/// they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Lane(LaneId),
    ParkingStart { street: Coordinate, border: Direction },
    ParkingTarget { street: Coordinate, border: Direction },
}

impl NodeId {
    pub fn position(&self) -> Position {
        match *self {
            NodeId::Lane(lane) => lane.position(),
            NodeId::ParkingStart { street, border } => {
                let street = street.position();
                let (dx, dy) = match border {
                    Direction::Northbound => (0.0, -1.0),
                    Direction::Eastbound => (2.0, 0.0),
                    Direction::Southbound => (1.0, 2.0),
                    Direction::Westbound => (-1.0, 1.0),
                };
                Position::new(street.x + dx, street.y + dy)
            }
            NodeId::ParkingTarget { street, border } => {
                let street = street.position();
                let (dx, dy) = match border {
                    Direction::Northbound => (1.0, -1.0),
                    Direction::Eastbound => (2.0, 1.0),
                    Direction::Southbound => (0.0, 2.0),
                    Direction::Westbound => (-1.0, 0.0),
                };
                Position::new(street.x + dx, street.y + dy)
            }
        }
    }

    pub fn street(&self) -> Coordinate {
        match *self {
            NodeId::Lane(lane) => lane.street,
            NodeId::ParkingStart { street, .. } | NodeId::ParkingTarget { street, .. } => street,
        }
    }

    pub fn as_lane(&self) -> Option<LaneId> {
        match *self {
            NodeId::Lane(lane) => Some(lane),
            _ => None,
        }
    }

    pub fn direction_to(&self, other: &NodeId) -> Direction {
        self.position().direction_to(&other.position())
    }
}

/// The approach segment for entering a street from one direction
#[derive(Debug, Clone)]
pub struct Lane {
    pub id: LaneId,
    pub traffic_light: Option<TrafficLight>,
    /// The only car blocking this lane for other cars
    blocking_car: Option<CarId>,
    /// Cars whose front is currently entering this lane
    entering_cars: BTreeSet<CarId>,
}

impl Lane {
    fn new(id: LaneId) -> Self {
        Self {
            id,
            traffic_light: None,
            blocking_car: None,
            entering_cars: BTreeSet::new(),
        }
    }

    pub fn blocking_car(&self) -> Option<CarId> {
        self.blocking_car
    }

    pub fn entering_cars(&self) -> impl Iterator<Item = CarId> + '_ {
        self.entering_cars.iter().copied()
    }

    pub fn has_red_light(&self) -> bool {
        self.traffic_light.is_some_and(|light| light.is_red())
    }

    pub fn is_blocked(&self) -> bool {
        self.blocking_car.is_some() || self.has_red_light()
    }

    pub fn position(&self) -> Position {
        self.id.position()
    }
}

/// A street tile of the map, consisting of four lanes
#[derive(Debug, Clone)]
pub struct Street {
    pub coordinate: Coordinate,
    /// Lanes indexed by `Direction::index` of their entering direction
    lanes: [Lane; 4],
}

impl Street {
    fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            lanes: Direction::ALL.map(|direction| Lane::new(LaneId::new(coordinate, direction))),
        }
    }

    pub fn lane(&self, entering: Direction) -> &Lane {
        &self.lanes[entering.index()]
    }

    pub fn lane_mut(&mut self, entering: Direction) -> &mut Lane {
        &mut self.lanes[entering.index()]
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    pub fn position(&self) -> Position {
        self.coordinate.position()
    }

    pub fn direction_to(&self, other: &Street) -> Direction {
        self.position().direction_to(&other.position())
    }
}

/// A parking lot which may accommodate a single car entering the map
#[derive(Debug, Clone)]
pub struct ParkingLot {
    pub street: Coordinate,
    start_blocking_car: Option<CarId>,
}

/// A map edge owning the parking lots of its adjoining streets
#[derive(Debug, Clone)]
pub struct Border {
    pub direction: Direction,
    num_rows: i32,
    num_cols: i32,
    parking_lots: BTreeMap<Coordinate, ParkingLot>,
}

impl Border {
    fn new(direction: Direction, num_rows: i32, num_cols: i32) -> Self {
        Self {
            direction,
            num_rows,
            num_cols,
            parking_lots: BTreeMap::new(),
        }
    }

    /// Check whether a street at a given coordinate adjoins this border
    pub fn is_adjoining(&self, street: Coordinate) -> bool {
        match self.direction {
            Direction::Northbound => street.row == 0,
            Direction::Eastbound => street.column == self.num_cols - 1,
            Direction::Southbound => street.row == self.num_rows - 1,
            Direction::Westbound => street.column == 0,
        }
    }

    /// The node where cars wait before sliding onto the street
    pub fn car_start(&mut self, street: Coordinate) -> Result<NodeId> {
        self.parking_lot(street)?;
        Ok(NodeId::ParkingStart {
            street,
            border: self.direction,
        })
    }

    /// The node where cars leave the map after the street
    pub fn car_target(&mut self, street: Coordinate) -> Result<NodeId> {
        self.parking_lot(street)?;
        Ok(NodeId::ParkingTarget {
            street,
            border: self.direction,
        })
    }

    fn parking_lot(&mut self, street: Coordinate) -> Result<&mut ParkingLot> {
        ensure!(
            self.is_adjoining(street),
            "Street {} does not adjoin the {:?} border",
            street,
            self.direction
        );
        Ok(self
            .parking_lots
            .entry(street)
            .or_insert_with(|| ParkingLot {
                street,
                start_blocking_car: None,
            }))
    }

    pub fn parking_lot_count(&self) -> usize {
        self.parking_lots.len()
    }
}

/// A city map consists of rows and columns where grid cells may hold streets
#[derive(Debug, Clone)]
pub struct CityMap {
    num_rows: i32,
    num_cols: i32,
    /// Borders indexed by `Direction::index`
    frame: [Border; 4],
    streets: BTreeMap<Coordinate, Street>,
    network: StreetNetwork,
}

impl CityMap {
    pub fn new(num_rows: i32, num_cols: i32) -> Result<Self> {
        ensure!(
            num_rows > 0 && num_cols > 0,
            "Map dimensions must be positive, got {}x{}",
            num_cols,
            num_rows
        );
        Ok(Self {
            num_rows,
            num_cols,
            frame: Direction::ALL.map(|direction| Border::new(direction, num_rows, num_cols)),
            streets: BTreeMap::new(),
            network: StreetNetwork::new(),
        })
    }

    pub fn num_rows(&self) -> i32 {
        self.num_rows
    }

    pub fn num_cols(&self) -> i32 {
        self.num_cols
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (0..self.num_rows).contains(&coordinate.row)
            && (0..self.num_cols).contains(&coordinate.column)
    }

    /// Places a street at a coordinate, doing nothing if one is already there
    pub fn place_street(&mut self, coordinate: Coordinate) -> Result<()> {
        ensure!(
            self.contains(coordinate),
            "Coordinate {} lies outside the {}x{} map",
            coordinate,
            self.num_cols,
            self.num_rows
        );
        if self.streets.contains_key(&coordinate) {
            return Ok(());
        }

        self.streets.insert(coordinate, Street::new(coordinate));
        let neighbors = self.neighbors(coordinate);
        self.network.add_street(coordinate, &neighbors);
        Ok(())
    }

    /// Places a whole row of streets
    pub fn place_street_row(&mut self, row: i32) -> Result<()> {
        for column in 0..self.num_cols {
            self.place_street(Coordinate::new(row, column))?;
        }
        Ok(())
    }

    /// Places a whole column of streets
    pub fn place_street_column(&mut self, column: i32) -> Result<()> {
        for row in 0..self.num_rows {
            self.place_street(Coordinate::new(row, column))?;
        }
        Ok(())
    }

    pub fn is_street(&self, coordinate: Coordinate) -> bool {
        self.streets.contains_key(&coordinate)
    }

    pub fn street_at(&self, coordinate: Coordinate) -> Option<&Street> {
        self.streets.get(&coordinate)
    }

    pub fn street_at_mut(&mut self, coordinate: Coordinate) -> Option<&mut Street> {
        self.streets.get_mut(&coordinate)
    }

    /// All streets in row-major order
    pub fn streets(&self) -> impl Iterator<Item = &Street> {
        self.streets.values()
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    pub fn network(&self) -> &StreetNetwork {
        &self.network
    }

    /// The streets adjacent to a coordinate, enumerated north, west, east, south
    pub fn neighbors(&self, coordinate: Coordinate) -> Vec<Coordinate> {
        [
            Direction::Northbound,
            Direction::Westbound,
            Direction::Eastbound,
            Direction::Southbound,
        ]
        .into_iter()
        .map(|direction| coordinate.step(direction))
        .filter(|neighbor| self.is_street(*neighbor))
        .collect()
    }

    /// The direction of the border a street adjoins, if any
    ///
    /// A corner street reports the first match of north, west, south, east.
    pub fn border_of(&self, coordinate: Coordinate) -> Option<Direction> {
        if coordinate.row == 0 {
            Some(Direction::Northbound)
        } else if coordinate.column == 0 {
            Some(Direction::Westbound)
        } else if coordinate.row == self.num_rows - 1 {
            Some(Direction::Southbound)
        } else if coordinate.column == self.num_cols - 1 {
            Some(Direction::Eastbound)
        } else {
            None
        }
    }

    pub fn border(&self, direction: Direction) -> &Border {
        &self.frame[direction.index()]
    }

    pub fn border_mut(&mut self, direction: Direction) -> &mut Border {
        &mut self.frame[direction.index()]
    }

    /// The parking start node of a border-adjacent street
    pub fn car_start(&mut self, street: Coordinate) -> Result<NodeId> {
        let border = self
            .border_of(street)
            .with_context(|| format!("Street {} does not adjoin any border", street))?;
        self.border_mut(border).car_start(street)
    }

    /// The parking target node of a border-adjacent street
    pub fn car_target(&mut self, street: Coordinate) -> Result<NodeId> {
        let border = self
            .border_of(street)
            .with_context(|| format!("Street {} does not adjoin any border", street))?;
        self.border_mut(border).car_target(street)
    }

    /// All streets adjoining any border, in row-major order
    pub fn border_streets(&self) -> Vec<Coordinate> {
        self.streets
            .keys()
            .copied()
            .filter(|coordinate| self.border_of(*coordinate).is_some())
            .collect()
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.street_at(id.street).map(|street| street.lane(id.entering))
    }

    pub fn lane_mut(&mut self, id: LaneId) -> Option<&mut Lane> {
        self.street_at_mut(id.street)
            .map(|street| street.lane_mut(id.entering))
    }

    /// Add traffic lights to every incoming lane of every cross road
    pub fn create_default_traffic_lights(&mut self, color: LightColor) {
        let coordinates: Vec<Coordinate> = self.streets.keys().copied().collect();
        for coordinate in coordinates {
            let neighbors = self.neighbors(coordinate);
            if neighbors.len() <= 2 {
                continue;
            }
            let street_pos = coordinate.position();
            for neighbor in neighbors {
                let entering = neighbor.position().direction_to(&street_pos);
                if let Some(street) = self.streets.get_mut(&coordinate) {
                    street.lane_mut(entering).traffic_light = Some(TrafficLight::new(color));
                }
            }
        }
    }

    /// Every installed traffic light, street by street in row-major order and
    /// lane by lane in direction order
    pub fn traffic_lights_mut(&mut self) -> Vec<&mut TrafficLight> {
        self.streets
            .values_mut()
            .flat_map(|street| street.lanes.iter_mut())
            .filter_map(|lane| lane.traffic_light.as_mut())
            .collect()
    }

    /// The lanes carrying a traffic light, in the same order as
    /// [`CityMap::traffic_lights_mut`]
    pub fn traffic_light_lanes(&self) -> Vec<LaneId> {
        self.streets
            .values()
            .flat_map(|street| street.lanes())
            .filter(|lane| lane.traffic_light.is_some())
            .map(|lane| lane.id)
            .collect()
    }

    /// The car currently owning a node
    pub fn blocking_car(&self, node: NodeId) -> Option<CarId> {
        match node {
            NodeId::Lane(id) => self.lane(id).and_then(Lane::blocking_car),
            NodeId::ParkingStart { street, border } => self
                .border(border)
                .parking_lots
                .get(&street)
                .and_then(|lot| lot.start_blocking_car),
            NodeId::ParkingTarget { .. } => None,
        }
    }

    /// Whether a node is blocked by an owning car or a red light
    pub fn is_blocked(&self, node: NodeId) -> bool {
        match node {
            NodeId::Lane(id) => self.lane(id).is_some_and(Lane::is_blocked),
            NodeId::ParkingStart { .. } => self.blocking_car(node).is_some(),
            NodeId::ParkingTarget { .. } => false,
        }
    }

    /// All directions of travel a node currently refuses
    ///
    /// `owner_directions` resolves the blocking directions of the owning car.
    pub fn blocked_directions(
        &self,
        node: NodeId,
        owner_directions: impl Fn(CarId) -> DirectionSet,
    ) -> DirectionSet {
        let mut blocked = self
            .blocking_car(node)
            .map(owner_directions)
            .unwrap_or_default();
        if let NodeId::Lane(id) = node {
            if self.lane(id).is_some_and(Lane::has_red_light) {
                blocked = blocked.union(DirectionSet::single(id.entering));
            }
        }
        blocked
    }

    /// Make `car` the single owner of a node; target nodes are never owned
    pub fn claim(&mut self, node: NodeId, car: CarId) -> Result<()> {
        if let Some(slot) = self.owner_slot(node)? {
            *slot = Some(car);
        }
        Ok(())
    }

    /// Release a node if `car` still owns it
    pub fn release(&mut self, node: NodeId, car: CarId) -> Result<()> {
        if let Some(slot) = self.owner_slot(node)? {
            if *slot == Some(car) {
                *slot = None;
            }
        }
        Ok(())
    }

    pub fn add_entering_car(&mut self, lane: LaneId, car: CarId) -> Result<()> {
        self.lane_mut(lane)
            .with_context(|| format!("Lane {:?} not found", lane))?
            .entering_cars
            .insert(car);
        Ok(())
    }

    pub fn remove_entering_car(&mut self, lane: LaneId, car: CarId) -> Result<()> {
        self.lane_mut(lane)
            .with_context(|| format!("Lane {:?} not found", lane))?
            .entering_cars
            .remove(&car);
        Ok(())
    }

    fn owner_slot(&mut self, node: NodeId) -> Result<Option<&mut Option<CarId>>> {
        match node {
            NodeId::Lane(id) => Ok(Some(
                &mut self
                    .lane_mut(id)
                    .with_context(|| format!("Lane {:?} not found", id))?
                    .blocking_car,
            )),
            NodeId::ParkingStart { street, border } => Ok(Some(
                &mut self.border_mut(border).parking_lot(street)?.start_blocking_car,
            )),
            // Targets accept any number of arrived cars
            NodeId::ParkingTarget { .. } => Ok(None),
        }
    }

    /// Render the map as text, `X` marking streets
    pub fn render(&self) -> String {
        let mut out = format!("Map {}x{}\n", self.num_cols, self.num_rows);
        for row in 0..self.num_rows {
            for column in 0..self.num_cols {
                out.push(if self.is_street(Coordinate::new(row, column)) {
                    'X'
                } else {
                    ' '
                });
            }
            out.push('\n');
        }
        out
    }
}
