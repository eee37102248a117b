//! Wireless network simulation core
//!
//! Base stations and users on a key-addressed graph, stepped by a
//! cooperative background thread. Nothing in here depends on a UI.

mod config;
mod entity;
mod graph;
mod key;
mod map;
mod model;
mod notify;
mod persistence;
mod thread;
mod types;

pub use config::{
    SimulationConfig, DEFAULT_COVERAGE_RADIUS, DEFAULT_HEIGHT, DEFAULT_MAX_MOVE,
    DEFAULT_MAX_SIGNAL_DEMAND, DEFAULT_STEP_INTERVAL, DEFAULT_WIDTH,
};
pub use entity::{BaseStation, Entity, User};
pub use graph::{Graph, Vertex};
pub use key::{IdAllocator, Key};
pub use map::{CoverageStats, SharedMap, SimulationMap};
pub use model::{Model, SAVE_ERROR_MESSAGE};
pub use notify::{LogNotifier, Notifier};
pub use persistence::{parse_model, write_atomically, write_model, ModelFile};
pub use thread::{SimulationThread, Steppable, ThreadState};
pub use types::{
    chebyshev_distance, euclidean_distance, Point, SimError, SimResult, DEFAULT_BASE_STATIONS,
    DEFAULT_USERS,
};
