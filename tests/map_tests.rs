//! Simulation map tests

use std::collections::HashSet;

use wireless_sim::simulation::{
    chebyshev_distance, IdAllocator, Key, Point, SimError, SimulationConfig, SimulationMap,
};

fn seeded_config() -> SimulationConfig {
    SimulationConfig::with_seed(7)
}

#[test]
fn test_map_population() {
    let ids = IdAllocator::new();
    let map = SimulationMap::new(5, 10, &ids, &seeded_config()).unwrap();

    assert_eq!(map.get_basestations().count(), 5);
    assert_eq!(map.get_users().count(), 10);
    assert_eq!(map.graph().vertex_count(), 15);

    let keys: HashSet<Key> = map
        .get_basestations()
        .map(|s| s.key)
        .chain(map.get_users().map(|u| u.key))
        .collect();
    assert_eq!(keys.len(), 15);
}

#[test]
fn test_creation_order_follows_key_allocation() {
    let ids = IdAllocator::new();
    let map = SimulationMap::new(3, 4, &ids, &seeded_config()).unwrap();

    let station_ids: Vec<u64> = map.get_basestations().map(|s| s.key.id()).collect();
    let user_ids: Vec<u64> = map.get_users().map(|u| u.key.id()).collect();
    assert_eq!(station_ids, vec![0, 1, 2]);
    assert_eq!(user_ids, vec![3, 4, 5, 6]);
}

#[test]
fn test_empty_map() {
    let ids = IdAllocator::new();
    let map = SimulationMap::new(0, 0, &ids, &seeded_config()).unwrap();
    assert_eq!(map.base_station_count(), 0);
    assert_eq!(map.user_count(), 0);
    assert_eq!(map.coverage().coverage_ratio(), 1.0);
}

#[test]
fn test_positions_inside_bounds() {
    let ids = IdAllocator::new();
    let config = seeded_config();
    let map = SimulationMap::new(16, 32, &ids, &config).unwrap();

    for key in map.base_station_keys().iter().chain(map.user_keys()) {
        let position = map.get_vertex_coordinates(key).unwrap();
        assert!((0..=config.width).contains(&position.x));
        assert!((0..=config.height).contains(&position.y));
    }
}

#[test]
fn test_seeded_maps_are_reproducible() {
    let first = SimulationMap::new(4, 8, &IdAllocator::new(), &seeded_config()).unwrap();
    let second = SimulationMap::new(4, 8, &IdAllocator::new(), &seeded_config()).unwrap();

    for (a, b) in first.user_keys().iter().zip(second.user_keys()) {
        assert_eq!(
            first.get_vertex_coordinates(a).unwrap(),
            second.get_vertex_coordinates(b).unwrap()
        );
    }
}

#[test]
fn test_coordinates_of_unknown_key() {
    let ids = IdAllocator::new();
    let map = SimulationMap::new(2, 2, &ids, &seeded_config()).unwrap();

    for key in map.base_station_keys().iter().chain(map.user_keys()) {
        assert!(map.get_vertex_coordinates(key).is_ok());
    }

    let stranger = Key::new(ids.next_id() + 1000);
    assert!(matches!(
        map.get_vertex_coordinates(&stranger),
        Err(SimError::KeyNotFound(_))
    ));
}

#[test]
fn test_users_assigned_to_nearest_station() {
    let ids = IdAllocator::new();
    let config = SimulationConfig {
        coverage_radius: 50,
        ..seeded_config()
    };
    let stations = [Point::new(0, 0), Point::new(100, 0)];
    let users = [
        (Point::new(10, 10), 3),
        (Point::new(90, 5), 4),
        (Point::new(60, 0), 2),
        (Point::new(300, 300), 9),
    ];
    let map = SimulationMap::with_positions(&stations, &users, &ids, &config).unwrap();

    let station_keys = map.base_station_keys().to_vec();
    let assigned: Vec<Option<Key>> = map.get_users().map(|u| u.assigned_station).collect();
    assert_eq!(
        assigned,
        vec![
            Some(station_keys[0]),
            Some(station_keys[1]),
            Some(station_keys[1]),
            None
        ]
    );

    let served = map.users_served_by(&station_keys[1]).unwrap();
    assert_eq!(served.len(), 2);

    let coverage = map.coverage();
    assert_eq!(coverage.covered_users, 3);
    assert_eq!(coverage.uncovered_users, 1);
    assert_eq!(
        coverage.station_load,
        vec![(station_keys[0], 3), (station_keys[1], 6)]
    );
}

#[test]
fn test_coverage_uses_chessboard_distance() {
    let ids = IdAllocator::new();
    let config = SimulationConfig {
        coverage_radius: 40,
        ..seeded_config()
    };
    // (40,40) is 56.6 away in a straight line but 40 on the chessboard
    let map = SimulationMap::with_positions(
        &[Point::new(0, 0)],
        &[(Point::new(40, 40), 1), (Point::new(41, 0), 1)],
        &ids,
        &config,
    )
    .unwrap();

    let assigned: Vec<bool> = map
        .get_users()
        .map(|u| u.assigned_station.is_some())
        .collect();
    assert_eq!(assigned, vec![true, false]);
}

#[test]
fn test_users_served_by_rejects_users() {
    let ids = IdAllocator::new();
    let map = SimulationMap::new(1, 1, &ids, &seeded_config()).unwrap();
    let user = map.user_keys()[0];
    assert!(matches!(
        map.users_served_by(&user),
        Err(SimError::NotABaseStation(_))
    ));
}

#[test]
fn test_step_keeps_graph_consistent() {
    let ids = IdAllocator::new();
    let config = SimulationConfig {
        max_move: 20,
        coverage_radius: 150,
        ..seeded_config()
    };
    let mut map = SimulationMap::new(6, 24, &ids, &config).unwrap();

    for _ in 0..50 {
        map.step().unwrap();
    }
    assert_eq!(map.steps(), 50);

    for user in map.get_users() {
        let position = map.get_vertex_coordinates(&user.key).unwrap();
        assert!((0..=config.width).contains(&position.x));
        assert!((0..=config.height).contains(&position.y));

        let neighbors = map.graph().neighbors(&user.key).unwrap();
        match user.assigned_station {
            Some(station) => assert_eq!(neighbors, vec![station]),
            None => assert!(neighbors.is_empty()),
        }
    }

    let served: usize = map
        .base_station_keys()
        .iter()
        .map(|station| map.users_served_by(station).unwrap().len())
        .sum();
    assert_eq!(served, map.coverage().covered_users);
}

#[test]
fn test_step_without_movement_keeps_positions() {
    let ids = IdAllocator::new();
    let config = SimulationConfig {
        max_move: 0,
        ..seeded_config()
    };
    let mut map = SimulationMap::new(2, 5, &ids, &config).unwrap();
    let before: Vec<Point> = map
        .user_keys()
        .iter()
        .map(|k| map.get_vertex_coordinates(k).unwrap())
        .collect();

    map.step().unwrap();

    let after: Vec<Point> = map
        .user_keys()
        .iter()
        .map(|k| map.get_vertex_coordinates(k).unwrap())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_render_map_marks_entities() {
    let ids = IdAllocator::new();
    let config = SimulationConfig {
        width: 100,
        height: 100,
        coverage_radius: 10,
        ..seeded_config()
    };
    let map = SimulationMap::with_positions(
        &[Point::new(0, 0)],
        &[(Point::new(100, 100), 1)],
        &ids,
        &config,
    )
    .unwrap();

    let rendered = map.render_map(10, 5);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|line| line.chars().count() == 10));
    assert!(lines[0].starts_with('B'));
    assert!(lines[4].ends_with('x'));
}

#[test]
fn test_negative_bounds_are_rejected() {
    let ids = IdAllocator::new();
    for config in [
        SimulationConfig {
            width: -10,
            ..seeded_config()
        },
        SimulationConfig {
            height: -1,
            ..seeded_config()
        },
        SimulationConfig {
            max_move: -3,
            ..seeded_config()
        },
    ] {
        assert!(matches!(
            SimulationMap::new(2, 2, &ids, &config),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            SimulationMap::with_positions(&[Point::new(0, 0)], &[], &ids, &config),
            Err(SimError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_clamping_with_negative_bounds_does_not_panic() {
    let moved = Point::new(5, 5).offset_clamped(3, -20, -10, -1);
    assert_eq!(moved, Point::new(0, 0));
}

#[test]
fn test_extreme_coordinates_do_not_overflow() {
    let far_right = Point::new(i32::MAX, 0);
    let far_left = Point::new(i32::MIN, 0);
    assert_eq!(chebyshev_distance(&far_right, &far_left), i32::MAX);
    assert_eq!(chebyshev_distance(&far_left, &Point::new(0, 0)), i32::MAX);

    let ids = IdAllocator::new();
    let mut map =
        SimulationMap::with_positions(&[far_right], &[(far_left, 1)], &ids, &seeded_config())
            .unwrap();
    assert_eq!(map.get_users().next().unwrap().assigned_station, None);

    // Stepping pulls the user back inside the map
    map.step().unwrap();
    let user = map.user_keys()[0];
    let position = map.get_vertex_coordinates(&user).unwrap();
    assert_eq!(position.x, 0);
}
