//! Graph structure tests

use wireless_sim::simulation::{Graph, Key, Point, SimError};

fn sample_graph() -> Graph<&'static str> {
    let mut graph = Graph::new();
    graph.add_vertex(Key::new(1), "a", Point::new(0, 0)).unwrap();
    graph.add_vertex(Key::new(2), "b", Point::new(10, 0)).unwrap();
    graph.add_vertex(Key::new(3), "c", Point::new(0, 10)).unwrap();
    graph
}

#[test]
fn test_vertex_lookup() {
    let graph = sample_graph();
    assert_eq!(graph.vertex_count(), 3);
    assert!(graph.contains_key(&Key::new(2)));
    assert_eq!(*graph.get_payload(&Key::new(2)).unwrap(), "b");
    assert_eq!(
        graph.get_vertex_coordinates(&Key::new(3)).unwrap(),
        Point::new(0, 10)
    );
}

#[test]
fn test_missing_key_is_reported() {
    let graph = sample_graph();
    let missing = Key::new(99);
    assert!(matches!(
        graph.get_vertex_coordinates(&missing),
        Err(SimError::KeyNotFound(k)) if k == missing
    ));
    assert!(matches!(
        graph.neighbors(&missing),
        Err(SimError::KeyNotFound(_))
    ));
}

#[test]
fn test_duplicate_key_is_rejected() {
    let mut graph = sample_graph();
    let result = graph.add_vertex(Key::new(1), "again", Point::new(5, 5));
    assert!(matches!(result, Err(SimError::DuplicateKey(_))));
    // Original vertex untouched
    assert_eq!(*graph.get_payload(&Key::new(1)).unwrap(), "a");
    assert_eq!(graph.vertex_count(), 3);
}

#[test]
fn test_edges_only_between_existing_vertices() {
    let mut graph = sample_graph();
    let result = graph.add_edge(&Key::new(1), &Key::new(42));
    assert!(matches!(result, Err(SimError::KeyNotFound(_))));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_adjacency() {
    let mut graph = sample_graph();
    let (a, b, c) = (Key::new(1), Key::new(2), Key::new(3));

    graph.add_edge(&a, &b).unwrap();
    graph.add_edge(&a, &c).unwrap();
    // Adding the same edge twice keeps a single edge
    graph.add_edge(&b, &a).unwrap();
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.has_edge(&b, &a));

    let mut neighbors = graph.neighbors(&a).unwrap();
    neighbors.sort_by_key(Key::id);
    assert_eq!(neighbors, vec![b, c]);

    assert!(graph.remove_edge(&a, &b).unwrap());
    assert!(!graph.remove_edge(&a, &b).unwrap());
    assert_eq!(graph.neighbors(&b).unwrap(), Vec::<Key>::new());

    graph.add_edge(&b, &c).unwrap();
    graph.clear_edges(&c).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.neighbors(&c).unwrap().is_empty());
}
