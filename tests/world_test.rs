//! Simulation world: spawning, ticking and despawning cars

use rush_city::simulation::{
    CarId, CityMapCreator, Coordinate, DefaultCityMapCreator, LightColor, LightPattern, SimId,
    SimWorld,
};

fn world_8x12() -> SimWorld {
    let map = DefaultCityMapCreator::new().create(8, 12).unwrap();
    SimWorld::new(map, LightPattern::default())
}

#[test]
fn test_car_drives_to_target_and_despawns() {
    let mut world = world_8x12();
    let id = world
        .spawn_car(Coordinate::new(1, 0), Coordinate::new(0, 4))
        .unwrap();
    assert_eq!(id, CarId(SimId(0)));
    assert_eq!(world.stats.total_cars_spawned, 1);
    assert_eq!(world.stats.active_cars, 1);

    for _ in 0..13 {
        world.tick(1.0);
    }
    assert_eq!(world.car(id).unwrap().covered_distance(), 13.0);

    world.tick(1.0);
    assert!(world.car(id).is_none());
    assert!(world.cars.is_empty());
    assert_eq!(world.stats.total_cars_completed, 1);
    assert_eq!(world.stats.active_cars, 0);
    assert_eq!(world.stats.median_trip_duration(), Some(14.0));
    assert_eq!(world.stats.success_rate(), 100.0);
    assert_eq!(world.time, 14.0);
}

#[test]
fn test_failed_spawn_is_recorded() {
    let mut world = world_8x12();
    assert!(world
        .spawn_car(Coordinate::new(1, 0), Coordinate::new(1, 4))
        .is_err());
    assert!(world
        .spawn_car(Coordinate::new(3, 3), Coordinate::new(0, 4))
        .is_err());

    assert!(world.cars.is_empty());
    assert_eq!(world.stats.failed_spawns, 2);
    assert_eq!(world.stats.total_cars_spawned, 0);
    assert_eq!(world.stats.success_rate(), 0.0);
}

#[test]
fn test_advance_unknown_car_fails() {
    let mut world = world_8x12();
    assert!(world.advance_car(CarId(SimId(7)), 1.0).is_err());
}

#[test]
fn test_spawn_random_car_between_border_streets() {
    let map = DefaultCityMapCreator::new().create(15, 20).unwrap();
    let mut world = SimWorld::new_with_seed(map, LightPattern::default(), 7);
    let border_streets = world.map().border_streets();

    for _ in 0..5 {
        let id = world.spawn_random_car().unwrap().unwrap();
        let car = world.car(id).unwrap();
        assert_ne!(car.start, car.target);
        assert!(border_streets.contains(&car.start));
        assert!(border_streets.contains(&car.target));
        world.tick(1.5);
    }
}

#[test]
fn test_spawn_random_car_skips_occupied_parking_lots() {
    let map = DefaultCityMapCreator::new().create(8, 12).unwrap();
    let mut world = SimWorld::new_with_seed(map, LightPattern::default(), 3);
    let border_count = world.map().border_streets().len();

    // Cars never leave without a tick, so every start parking lot fills up
    for _ in 0..border_count {
        assert!(world.spawn_random_car().unwrap().is_some());
    }
    assert_eq!(world.spawn_random_car().unwrap(), None);

    let mut starts: Vec<Coordinate> = world.cars.values().map(|car| car.start).collect();
    starts.sort();
    starts.dedup();
    assert_eq!(starts.len(), border_count);
}

#[test]
fn test_seeded_worlds_are_reproducible() {
    let run = |seed: u64| {
        let map = DefaultCityMapCreator::with_traffic_lights(LightColor::Red)
            .create(15, 15)
            .unwrap();
        let mut world = SimWorld::new_with_seed(map, LightPattern::new(3.0, 1.0).unwrap(), seed);
        for tick in 0..60 {
            if tick % 3 == 0 {
                world.spawn_random_car().unwrap();
            }
            world.tick(0.5);
        }
        (
            world.render_map(),
            world.stats.total_cars_spawned,
            world.stats.total_cars_completed,
        )
    };

    assert_eq!(run(11), run(11));
}

#[test]
fn test_lights_switch_during_ticks() {
    let map = DefaultCityMapCreator::with_traffic_lights(LightColor::Red)
        .create(8, 12)
        .unwrap();
    let mut world = SimWorld::new(map, LightPattern::new(5.0, 2.0).unwrap());

    world.tick(1.0);
    let green_lanes: Vec<_> = world
        .map()
        .traffic_light_lanes()
        .into_iter()
        .filter(|lane| {
            world
                .map()
                .lane(*lane)
                .and_then(|lane| lane.traffic_light)
                .is_some_and(|light| light.is_green())
        })
        .collect();
    assert_eq!(green_lanes.len(), 1);
    assert_eq!(world.lights_control.elapsed(), 1.0);
}

#[test]
fn test_render_map_with_car() {
    let mut world = world_8x12();
    world
        .spawn_car(Coordinate::new(1, 0), Coordinate::new(0, 4))
        .unwrap();

    // Still in the parking lot outside the map
    assert_eq!(world.render_map(), world.map().render());

    world.tick(1.0);
    let rendered = world.render_map();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "Map 12x8");
    assert_eq!(lines[2], "CXXXXXXXXXXX");
}

#[test]
fn test_failed_spawn_keeps_ids_consecutive() {
    let mut world = world_8x12();
    let first = world
        .spawn_car(Coordinate::new(1, 0), Coordinate::new(0, 4))
        .unwrap();
    assert!(world
        .spawn_car(Coordinate::new(1, 0), Coordinate::new(1, 4))
        .is_err());
    let second = world
        .spawn_car(Coordinate::new(6, 0), Coordinate::new(0, 4))
        .unwrap();

    assert_eq!(first, CarId(SimId(0)));
    assert_eq!(second, CarId(SimId(1)));
}
