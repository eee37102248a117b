//! The simulation map: base stations and users on a key-addressed graph
//!
//! A user is connected in the graph to the station serving it, so the
//! adjacency of a station is exactly the set of users it currently serves.

use log::{debug, info};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::ops::RangeInclusive;
use std::sync::Arc;

use super::config::SimulationConfig;
use super::entity::{BaseStation, Entity, User};
use super::graph::Graph;
use super::key::{IdAllocator, Key};
use super::thread::Steppable;
use super::types::{chebyshev_distance, euclidean_distance, Point, SimError, SimResult};

/// A simulation map shared between the controlling side and the stepping thread
pub type SharedMap = Arc<RwLock<SimulationMap>>;

/// Columns used by [`SimulationMap::draw_map`]
const MAP_COLUMNS: usize = 64;
/// Rows used by [`SimulationMap::draw_map`]
const MAP_ROWS: usize = 24;

/// Snapshot of how well the stations cover the users
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageStats {
    pub covered_users: usize,
    pub uncovered_users: usize,
    /// Summed signal demand of the users each station serves, in station order
    pub station_load: Vec<(Key, u32)>,
}

impl CoverageStats {
    /// Share of users served by some station, 1.0 for an empty map
    pub fn coverage_ratio(&self) -> f64 {
        let total = self.covered_users + self.uncovered_users;
        if total == 0 {
            1.0
        } else {
            self.covered_users as f64 / total as f64
        }
    }
}

/// Base stations and users placed on a graph
pub struct SimulationMap {
    graph: Graph<Entity>,

    /// Station keys in creation order
    base_stations: Vec<Key>,

    /// User keys in creation order
    users: Vec<Key>,

    config: SimulationConfig,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    /// Number of steps applied so far
    steps: u64,
}

impl SimulationMap {
    fn new_internal(config: &SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            graph: Graph::new(),
            base_stations: Vec::new(),
            users: Vec::new(),
            config: config.clone(),
            rng: config.seed.map(StdRng::seed_from_u64),
            steps: 0,
        })
    }

    /// Create a map with randomly placed stations and users.
    /// Stations receive their keys first, then users.
    pub fn new(
        number_of_base_stations: usize,
        number_of_users: usize,
        ids: &IdAllocator,
        config: &SimulationConfig,
    ) -> SimResult<Self> {
        let mut map = Self::new_internal(config)?;

        for _ in 0..number_of_base_stations {
            let position = map.random_position();
            map.add_base_station(ids.next_key(), position)?;
        }

        let max_demand = config.max_signal_demand.max(1);
        for _ in 0..number_of_users {
            let position = map.random_position();
            let demand = map.random_demand(1..=max_demand);
            map.add_user(ids.next_key(), position, demand)?;
        }

        map.assign_users()?;
        info!(
            "Created simulation map with {} base stations and {} users",
            map.base_stations.len(),
            map.users.len()
        );
        Ok(map)
    }

    /// Create a map with stations and users at the given positions.
    /// Users are given as `(position, signal demand)`.
    pub fn with_positions(
        stations: &[Point],
        users: &[(Point, u32)],
        ids: &IdAllocator,
        config: &SimulationConfig,
    ) -> SimResult<Self> {
        let mut map = Self::new_internal(config)?;

        for position in stations {
            map.add_base_station(ids.next_key(), *position)?;
        }
        for (position, demand) in users {
            map.add_user(ids.next_key(), *position, *demand)?;
        }

        map.assign_users()?;
        info!(
            "Created simulation map with {} placed base stations and {} placed users",
            map.base_stations.len(),
            map.users.len()
        );
        Ok(map)
    }

    /// Wrap the map for sharing with a simulation thread
    pub fn into_shared(self) -> SharedMap {
        Arc::new(RwLock::new(self))
    }

    fn add_base_station(&mut self, key: Key, position: Point) -> SimResult<()> {
        self.graph
            .add_vertex(key, Entity::BaseStation(BaseStation::new(key)), position)?;
        self.base_stations.push(key);
        Ok(())
    }

    fn add_user(&mut self, key: Key, position: Point, signal_demand: u32) -> SimResult<()> {
        self.graph
            .add_vertex(key, Entity::User(User::new(key, signal_demand)), position)?;
        self.users.push(key);
        Ok(())
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&mut self, range: RangeInclusive<i32>) -> i32 {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    fn random_demand(&mut self, range: RangeInclusive<u32>) -> u32 {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    fn random_position(&mut self) -> Point {
        let x = self.random_range(0..=self.config.width.max(0));
        let y = self.random_range(0..=self.config.height.max(0));
        Point::new(x, y)
    }

    /// Base stations in creation order
    pub fn get_basestations(&self) -> impl Iterator<Item = &BaseStation> + '_ {
        self.base_stations.iter().filter_map(move |key| {
            self.graph
                .get_payload(key)
                .ok()
                .and_then(Entity::as_base_station)
        })
    }

    /// Users in creation order
    pub fn get_users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users
            .iter()
            .filter_map(move |key| self.graph.get_payload(key).ok().and_then(Entity::as_user))
    }

    pub fn base_station_keys(&self) -> &[Key] {
        &self.base_stations
    }

    pub fn user_keys(&self) -> &[Key] {
        &self.users
    }

    pub fn base_station_count(&self) -> usize {
        self.base_stations.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn graph(&self) -> &Graph<Entity> {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of steps applied so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Gets the position of a station or user
    pub fn get_vertex_coordinates(&self, key: &Key) -> SimResult<Point> {
        self.graph.get_vertex_coordinates(key)
    }

    pub fn get_user(&self, key: &Key) -> SimResult<&User> {
        self.graph
            .get_payload(key)?
            .as_user()
            .ok_or(SimError::NotAUser(*key))
    }

    fn get_user_mut(&mut self, key: &Key) -> SimResult<&mut User> {
        self.graph
            .get_payload_mut(key)?
            .as_user_mut()
            .ok_or(SimError::NotAUser(*key))
    }

    /// Users currently served by a station
    pub fn users_served_by(&self, station: &Key) -> SimResult<Vec<Key>> {
        self.graph
            .get_payload(station)?
            .as_base_station()
            .ok_or(SimError::NotABaseStation(*station))?;
        self.graph.neighbors(station)
    }

    /// Advance the simulation by one step: move every user, then reassign
    /// each one to its nearest covering station
    pub fn step(&mut self) -> SimResult<()> {
        let max_move = self.config.max_move.max(0);
        let (width, height) = (self.config.width.max(0), self.config.height.max(0));

        for user_key in self.users.clone() {
            let dx = self.random_range(-max_move..=max_move);
            let dy = self.random_range(-max_move..=max_move);
            let position = self.graph.get_vertex_coordinates(&user_key)?;
            self.graph
                .move_vertex(&user_key, position.offset_clamped(dx, dy, width, height))?;
        }

        self.assign_users()?;
        self.steps += 1;
        debug!("Simulation step {} complete", self.steps);
        Ok(())
    }

    /// Find the closest station (Euclidean) whose Chebyshev distance to
    /// `position` is within the coverage radius
    pub fn nearest_covering_station(&self, position: &Point) -> SimResult<Option<Key>> {
        let radius = self.config.coverage_radius;
        let mut nearest: Option<(Key, OrderedFloat<f64>)> = None;

        for station in &self.base_stations {
            let station_pos = self.graph.get_vertex_coordinates(station)?;
            if chebyshev_distance(position, &station_pos) > radius {
                continue;
            }
            let distance = OrderedFloat(euclidean_distance(position, &station_pos));
            // Ties go to the station created first
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((*station, distance));
            }
        }

        Ok(nearest.map(|(station, _)| station))
    }

    /// Rebuild user to station edges from current positions
    fn assign_users(&mut self) -> SimResult<()> {
        for user_key in self.users.clone() {
            let position = self.graph.get_vertex_coordinates(&user_key)?;
            let nearest = self.nearest_covering_station(&position)?;

            self.graph.clear_edges(&user_key)?;
            if let Some(station) = nearest {
                self.graph.add_edge(&user_key, &station)?;
            }

            let user = self.get_user_mut(&user_key)?;
            if user.assigned_station != nearest {
                debug!(
                    "User {} handed over from {:?} to {:?}",
                    user_key, user.assigned_station, nearest
                );
                user.assigned_station = nearest;
            }
        }
        Ok(())
    }

    /// Calculate coverage metrics
    pub fn coverage(&self) -> CoverageStats {
        let covered_users = self
            .get_users()
            .filter(|user| user.assigned_station.is_some())
            .count();

        let station_load = self
            .base_stations
            .iter()
            .map(|station| {
                let load = self
                    .get_users()
                    .filter(|user| user.assigned_station == Some(*station))
                    .map(|user| user.signal_demand)
                    .sum();
                (*station, load)
            })
            .collect();

        CoverageStats {
            covered_users,
            uncovered_users: self.users.len() - covered_users,
            station_load,
        }
    }

    /// Print a summary of the map state
    pub fn print_summary(&self) {
        let coverage = self.coverage();

        println!("=== Wireless Simulation Summary ===");
        println!("Steps: {}", self.steps);
        println!(
            "Base stations: {}, Users: {}",
            self.base_stations.len(),
            self.users.len()
        );
        println!(
            "Covered users: {}/{} ({:.1}%)",
            coverage.covered_users,
            self.users.len(),
            coverage.coverage_ratio() * 100.0
        );
        println!();

        println!("--- Base Stations ---");
        for (index, (station, load)) in coverage.station_load.iter().enumerate() {
            let position = self.graph.get_vertex_coordinates(station).unwrap_or_default();
            println!("  b_{} {} at {}: load={}", index + 1, station, position, load);
        }
    }

    /// Render the map as text, one character per cell
    pub fn render_map(&self, columns: usize, rows: usize) -> String {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let mut grid = vec![vec!['.'; columns]; rows];

        let width = self.config.width.max(1) as f64;
        let height = self.config.height.max(1) as f64;
        let to_grid = |position: &Point| -> (usize, usize) {
            let col = (position.x.max(0) as f64 / width * (columns - 1) as f64) as usize;
            let row = (position.y.max(0) as f64 / height * (rows - 1) as f64) as usize;
            (row.min(rows - 1), col.min(columns - 1))
        };

        // Users first so stations stay visible on shared cells
        for user in self.get_users() {
            if let Ok(position) = self.graph.get_vertex_coordinates(&user.key) {
                let (row, col) = to_grid(&position);
                grid[row][col] = if user.assigned_station.is_some() {
                    'u'
                } else {
                    'x'
                };
            }
        }

        for station in self.get_basestations() {
            if let Ok(position) = self.graph.get_vertex_coordinates(&station.key) {
                let (row, col) = to_grid(&position);
                grid[row][col] = 'B';
            }
        }

        let mut out = String::with_capacity((columns + 1) * rows);
        for row in &grid {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }

    /// Draw a visual map of the world in the terminal
    pub fn draw_map(&self) {
        println!("\n=== Wireless Map ===");
        println!("Legend: B=Base station, u=Served user, x=Uncovered user");
        println!();
        print!("{}", self.render_map(MAP_COLUMNS, MAP_ROWS));
        println!();
    }
}

impl Steppable for SimulationMap {
    fn step(&mut self) -> SimResult<()> {
        SimulationMap::step(self)
    }
}
