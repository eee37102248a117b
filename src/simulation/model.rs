//! The model coordinating ids, the current map and the simulation thread
//!
//! One `Model` is built at startup and shared through an `Arc` with whoever
//! needs it. All methods take `&self`.

use anyhow::Result;
use log::{error, info, warn};
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::config::SimulationConfig;
use super::key::IdAllocator;
use super::map::{SharedMap, SimulationMap};
use super::notify::{LogNotifier, Notifier};
use super::persistence;
use super::thread::{SimulationThread, ThreadState};
use super::types::{
    chebyshev_distance, euclidean_distance, Point, SimResult, DEFAULT_BASE_STATIONS,
    DEFAULT_USERS,
};

/// Message shown when the model file could not be written
pub const SAVE_ERROR_MESSAGE: &str = "An error occurred while saving";

/// Coordination point for id allocation, map lifecycle and simulation control
pub struct Model {
    ids: IdAllocator,
    config: SimulationConfig,
    simulation_map: Mutex<Option<SharedMap>>,
    simulation_thread: Mutex<Option<SimulationThread>>,
    notifier: Arc<dyn Notifier>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Model {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    pub fn with_notifier(config: SimulationConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ids: IdAllocator::new(),
            config,
            simulation_map: Mutex::new(None),
            simulation_thread: Mutex::new(None),
            notifier,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Returns a fresh id. Ids count up from 0 and are never reused.
    pub fn get_new_id(&self) -> u64 {
        self.ids.next_id()
    }

    /// Build and install a new map, replacing any previous one.
    ///
    /// A running simulation is told to stop first. It keeps its own handle to
    /// the old map, so the old run is never mixed with the new map.
    pub fn create_simulation_map(
        &self,
        number_of_base_stations: usize,
        number_of_users: usize,
    ) -> SimResult<SharedMap> {
        let map = SimulationMap::new(
            number_of_base_stations,
            number_of_users,
            &self.ids,
            &self.config,
        )?;
        Ok(self.install_map(map))
    }

    /// Swaps in `map`. The thread lock is held across the swap, in the same
    /// order `start_simulation` takes it, so no start can pick up the old map.
    fn install_map(&self, map: SimulationMap) -> SharedMap {
        let thread = self.simulation_thread.lock();
        if let Some(thread) = thread.as_ref() {
            info!("Stopping simulation before replacing the map");
            thread.should_stop();
        }

        let shared = map.into_shared();
        *self.simulation_map.lock() = Some(Arc::clone(&shared));
        shared
    }

    /// The current map, created with 16 base stations and 32 users on first
    /// access
    pub fn get_simulation_map(&self) -> SimResult<SharedMap> {
        let mut slot = self.simulation_map.lock();
        if let Some(map) = slot.as_ref() {
            return Ok(Arc::clone(map));
        }

        let map = SimulationMap::new(DEFAULT_BASE_STATIONS, DEFAULT_USERS, &self.ids, &self.config)?
            .into_shared();
        *slot = Some(Arc::clone(&map));
        Ok(map)
    }

    pub fn compute_euclidian_distance(&self, p1: &Point, p2: &Point) -> f64 {
        euclidean_distance(p1, p2)
    }

    /// Despite the name this is the Chebyshev distance,
    /// `max(|x1 - x2|, |y1 - y2|)`. Coverage checks rely on that.
    pub fn compute_manhattan_distance(&self, p1: &Point, p2: &Point) -> i32 {
        chebyshev_distance(p1, p2)
    }

    /// Start stepping the current map in the background.
    ///
    /// Returns `false` without doing anything if a simulation is already
    /// running. A thread that was stopped or has terminated is joined and
    /// replaced by a new one.
    pub fn start_simulation(&self) -> SimResult<bool> {
        let mut slot = self.simulation_thread.lock();

        if let Some(thread) = slot.as_ref() {
            if matches!(thread.state(), ThreadState::Idle | ThreadState::Running) {
                return Ok(false);
            }
        }

        if let Some(previous) = slot.take() {
            if let Err(e) = previous.join() {
                warn!("Previous simulation ended with an error: {:#}", e);
            }
        }

        let map = self.get_simulation_map()?;
        let mut thread = SimulationThread::new(map, self.config.step_interval);
        thread.start()?;
        *slot = Some(thread);
        Ok(true)
    }

    /// Ask the running simulation to stop. Does not wait for it.
    pub fn stop_simulation(&self) {
        if let Some(thread) = self.simulation_thread.lock().as_ref() {
            info!("Stopping simulation");
            thread.should_stop();
        }
    }

    /// State of the current simulation thread, if one was ever started
    pub fn simulation_state(&self) -> Option<ThreadState> {
        self.simulation_thread
            .lock()
            .as_ref()
            .map(SimulationThread::state)
    }

    pub fn is_simulation_running(&self) -> bool {
        self.simulation_state() == Some(ThreadState::Running)
    }

    /// The map the current simulation thread steps, if one was started
    pub fn simulation_thread_map(&self) -> Option<SharedMap> {
        self.simulation_thread
            .lock()
            .as_ref()
            .map(|thread| Arc::clone(thread.map()))
    }

    /// Steps applied by the current simulation thread
    pub fn simulation_steps(&self) -> u64 {
        self.simulation_thread
            .lock()
            .as_ref()
            .map_or(0, SimulationThread::steps_completed)
    }

    /// Wait for the current simulation thread to finish and discard it.
    /// Call [`Model::stop_simulation`] first, a running thread never ends on
    /// its own unless a step fails.
    pub fn join_simulation(&self) -> Result<()> {
        let thread = self.simulation_thread.lock().take();
        match thread {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }

    /// Write the current map to `path`.
    ///
    /// Failures are reported through the notifier and never returned.
    pub fn save_model_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();

        let result = self.get_simulation_map().and_then(|map| {
            let contents = persistence::write_model(&map.read())?;
            persistence::write_atomically(path, &contents)
        });

        match result {
            Ok(()) => info!("Saved model to {}", path.display()),
            Err(e) => {
                error!("Failed to save model to {}: {}", path.display(), e);
                self.notifier.show_message(SAVE_ERROR_MESSAGE);
            }
        }
    }

    /// Read a model file and install the map it describes.
    ///
    /// Entities get fresh keys and users are reassigned from their positions.
    pub fn load_model_file(&self, path: impl AsRef<Path>) -> SimResult<SharedMap> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let model = persistence::parse_model(&contents)?;

        let map =
            SimulationMap::with_positions(&model.stations, &model.users, &self.ids, &self.config)?;
        info!("Loaded model from {}", path.display());
        Ok(self.install_map(map))
    }
}
