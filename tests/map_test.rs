//! City map model and default map creation

use rush_city::simulation::{
    CityMap, CityMapCreator, Coordinate, DefaultCityMapCreator, Direction, LaneId, LightColor,
    NodeId, Position,
};

#[test]
fn test_create_20x15() {
    let map = DefaultCityMapCreator::new().create(15, 20).unwrap();
    assert_eq!(map.num_rows(), 15);
    assert_eq!(map.num_cols(), 20);
    for dir in Direction::ALL {
        assert_eq!(map.border(dir).direction, dir);
    }

    let expected = "Map 20x15\n".to_string()
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "XXXXXXXXXXXXXXXXXXXX\n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "XXXXXXXXXXXXXXXXXXXX\n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n"
        + "XXXXXXXXXXXXXXXXXXXX\n"
        + "  X    X    X    X  \n"
        + "  X    X    X    X  \n";
    assert_eq!(map.render(), expected);

    assert!(!map.is_street(Coordinate::new(0, 0)));
    assert!(map.street_at(Coordinate::new(0, 0)).is_none());

    let street = Coordinate::new(2, 7);
    assert!(map.is_street(street));
    assert_eq!(map.street_at(street).unwrap().coordinate, street);
    assert_eq!(map.neighbors(street).len(), 4);
}

#[test]
fn test_neighbors_are_axis_adjacent_streets() {
    let map = DefaultCityMapCreator::new().create(8, 12).unwrap();

    // End of a row: only the street to the east
    assert_eq!(map.neighbors(Coordinate::new(1, 0)), vec![Coordinate::new(1, 1)]);

    // Cross road, enumerated north, west, east, south
    assert_eq!(
        map.neighbors(Coordinate::new(1, 1)),
        vec![
            Coordinate::new(0, 1),
            Coordinate::new(1, 0),
            Coordinate::new(1, 2),
            Coordinate::new(2, 1),
        ]
    );

    // Straight segment of a column
    assert_eq!(map.neighbors(Coordinate::new(3, 4)).len(), 2);
}

#[test]
fn test_border_of_street() {
    let map = DefaultCityMapCreator::new().create(8, 12).unwrap();
    assert_eq!(map.border_of(Coordinate::new(0, 4)), Some(Direction::Northbound));
    assert_eq!(map.border_of(Coordinate::new(1, 0)), Some(Direction::Westbound));
    assert_eq!(map.border_of(Coordinate::new(7, 4)), Some(Direction::Southbound));
    assert_eq!(map.border_of(Coordinate::new(1, 11)), Some(Direction::Eastbound));
    assert_eq!(map.border_of(Coordinate::new(1, 4)), None);
}

#[test]
fn test_place_street_outside_map_fails() {
    let mut map = CityMap::new(3, 3).unwrap();
    assert!(map.place_street(Coordinate::new(3, 0)).is_err());
    assert!(map.place_street(Coordinate::new(0, -1)).is_err());
    assert!(map.place_street(Coordinate::new(2, 2)).is_ok());
    assert!(CityMap::new(0, 3).is_err());
}

#[test]
fn test_default_traffic_lights_only_at_cross_roads() {
    let mut map = DefaultCityMapCreator::new().create(8, 12).unwrap();
    assert!(map.traffic_light_lanes().is_empty());

    map.create_default_traffic_lights(LightColor::Red);

    // (1,1) has four neighbors, so every incoming lane gets a light
    let cross = map.street_at(Coordinate::new(1, 1)).unwrap();
    for dir in Direction::ALL {
        assert!(cross.lane(dir).traffic_light.is_some());
    }

    // (1,2) is a straight segment
    let straight = map.street_at(Coordinate::new(1, 2)).unwrap();
    assert!(straight.lanes().all(|lane| lane.traffic_light.is_none()));

    // Street rows 1 and 6 cross columns 1, 4, 7 and 10
    assert_eq!(map.traffic_light_lanes().len(), 2 * 4 * 4);

    // Every light is red and is reported in map order
    let lanes = map.traffic_light_lanes();
    assert!(lanes.windows(2).all(|pair| pair[0] < pair[1]));
    let lights = map.traffic_lights_mut();
    assert_eq!(lights.len(), lanes.len());
    assert!(lights.iter().all(|light| light.is_red()));
}

#[test]
fn test_t_junction_lights() {
    let mut map = CityMap::new(3, 3).unwrap();
    map.place_street_row(1).unwrap();
    map.place_street(Coordinate::new(0, 1)).unwrap();
    map.create_default_traffic_lights(LightColor::Green);

    let junction = map.street_at(Coordinate::new(1, 1)).unwrap();
    // Approaches from west (eastbound), east (westbound) and north (southbound)
    assert!(junction.lane(Direction::Eastbound).traffic_light.is_some());
    assert!(junction.lane(Direction::Westbound).traffic_light.is_some());
    assert!(junction.lane(Direction::Southbound).traffic_light.is_some());
    assert!(junction.lane(Direction::Northbound).traffic_light.is_none());
    assert_eq!(map.traffic_light_lanes().len(), 3);
}

#[test]
fn test_lane_and_parking_positions() {
    let street = Coordinate::new(1, 0);
    assert_eq!(LaneId::new(street, Direction::Northbound).position(), Position::new(1.0, 3.0));
    assert_eq!(LaneId::new(street, Direction::Eastbound).position(), Position::new(0.0, 3.0));
    assert_eq!(LaneId::new(street, Direction::Southbound).position(), Position::new(0.0, 2.0));
    assert_eq!(LaneId::new(street, Direction::Westbound).position(), Position::new(1.0, 2.0));

    let start = NodeId::ParkingStart { street, border: Direction::Westbound };
    let target = NodeId::ParkingTarget { street, border: Direction::Westbound };
    assert_eq!(start.position(), Position::new(-1.0, 3.0));
    assert_eq!(target.position(), Position::new(-1.0, 2.0));

    let north = Coordinate::new(0, 4);
    let target = NodeId::ParkingTarget { street: north, border: Direction::Northbound };
    assert_eq!(target.position(), Position::new(9.0, -1.0));
}

#[test]
fn test_parking_lots_only_at_borders() {
    let mut map = DefaultCityMapCreator::new().create(8, 12).unwrap();

    let start = map.car_start(Coordinate::new(1, 0)).unwrap();
    assert_eq!(
        start,
        NodeId::ParkingStart { street: Coordinate::new(1, 0), border: Direction::Westbound }
    );
    assert_eq!(map.border(Direction::Westbound).parking_lot_count(), 1);

    // Asking again reuses the same lot
    map.car_target(Coordinate::new(1, 0)).unwrap();
    assert_eq!(map.border(Direction::Westbound).parking_lot_count(), 1);

    assert!(map.car_start(Coordinate::new(1, 4)).is_err());
    assert!(map
        .border_mut(Direction::Eastbound)
        .car_start(Coordinate::new(1, 0))
        .is_err());
}

#[test]
fn test_blocking_predicates() {
    use rush_city::simulation::{CarId, DirectionSet, SimId};

    let mut map = DefaultCityMapCreator::new().create(8, 12).unwrap();
    map.create_default_traffic_lights(LightColor::Green);
    let car = CarId(SimId(7));
    let other = CarId(SimId(8));

    let lane = LaneId::new(Coordinate::new(1, 1), Direction::Eastbound);
    let node = NodeId::Lane(lane);
    assert!(!map.is_blocked(node));
    assert!(map.blocked_directions(node, |_| DirectionSet::all()).is_empty());

    map.lane_mut(lane).unwrap().traffic_light.as_mut().unwrap().set_red();
    assert!(map.is_blocked(node));
    assert_eq!(
        map.blocked_directions(node, |_| DirectionSet::all()),
        DirectionSet::single(Direction::Eastbound)
    );
    map.lane_mut(lane).unwrap().traffic_light.as_mut().unwrap().set_green();

    map.claim(node, car).unwrap();
    assert_eq!(map.blocking_car(node), Some(car));
    assert_eq!(map.blocked_directions(node, |_| DirectionSet::all()), DirectionSet::all());

    // A stale release does not clear a newer owner
    map.release(node, other).unwrap();
    assert_eq!(map.blocking_car(node), Some(car));
    map.release(node, car).unwrap();
    assert!(!map.is_blocked(node));

    let street = Coordinate::new(0, 4);
    let start = map.car_start(street).unwrap();
    let target = map.car_target(street).unwrap();
    map.claim(start, car).unwrap();
    assert!(map.is_blocked(start));
    map.claim(target, car).unwrap();
    assert!(!map.is_blocked(target));
    assert_eq!(map.blocking_car(target), None);
}
