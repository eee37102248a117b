//! Background stepping of a simulation map
//!
//! The thread steps its map until [`SimulationThread::should_stop`] is
//! called. Stopping is cooperative: the flag is checked between steps and
//! the pause between steps is cut short when a stop is requested.

use anyhow::{anyhow, Result};
use log::{error, info};
use parking_lot::{Condvar, Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::map::SimulationMap;
use super::types::{SimError, SimResult};

/// Something a simulation thread can advance one step at a time
pub trait Steppable: Send + Sync + 'static {
    fn step(&mut self) -> SimResult<()>;
}

/// Lifecycle of a simulation thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Constructed, not yet executing
    Idle,
    /// Stepping the map
    Running,
    /// Stop flag set, the loop exits after the current step
    StopRequested,
    /// Finished, no further steps run
    Terminated,
}

impl ThreadState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ThreadState::Idle,
            1 => ThreadState::Running,
            2 => ThreadState::StopRequested,
            _ => ThreadState::Terminated,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ThreadState::Idle => 0,
            ThreadState::Running => 1,
            ThreadState::StopRequested => 2,
            ThreadState::Terminated => 3,
        }
    }
}

/// State shared between the handle and the worker
struct Control {
    state: AtomicU8,
    stop: AtomicBool,
    steps: AtomicU64,
    failure: Mutex<Option<String>>,
    /// Paired with `wake` so `should_stop` can interrupt the pause
    pause: Mutex<()>,
    wake: Condvar,
}

impl Control {
    fn state(&self) -> ThreadState {
        ThreadState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves `from -> to`, returns false if the thread was in another state
    fn transition(&self, from: ThreadState, to: ThreadState) -> bool {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn terminate(&self) {
        self.state
            .store(ThreadState::Terminated.as_u8(), Ordering::Release);
    }
}

/// A cancellable background unit stepping one simulation map
pub struct SimulationThread<M: Steppable = SimulationMap> {
    map: Arc<RwLock<M>>,
    interval: Duration,
    control: Arc<Control>,
    handle: Option<JoinHandle<()>>,
}

impl<M: Steppable> SimulationThread<M> {
    /// Create an idle thread bound to `map`, pausing `interval` between steps
    pub fn new(map: Arc<RwLock<M>>, interval: Duration) -> Self {
        Self {
            map,
            interval,
            control: Arc::new(Control {
                state: AtomicU8::new(ThreadState::Idle.as_u8()),
                stop: AtomicBool::new(false),
                steps: AtomicU64::new(0),
                failure: Mutex::new(None),
                pause: Mutex::new(()),
                wake: Condvar::new(),
            }),
            handle: None,
        }
    }

    /// Spawn the worker. A thread can only be started once.
    pub fn start(&mut self) -> SimResult<()> {
        if !self
            .control
            .transition(ThreadState::Idle, ThreadState::Running)
        {
            return Err(SimError::AlreadyStarted);
        }

        let map = Arc::clone(&self.map);
        let control = Arc::clone(&self.control);
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name("simulation".to_string())
            .spawn(move || run_loop(map, control, interval));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!("Simulation thread started");
                Ok(())
            }
            Err(e) => {
                self.control.terminate();
                Err(SimError::Io(e))
            }
        }
    }

    /// Request a cooperative stop. Never blocks.
    pub fn should_stop(&self) {
        self.control.stop.store(true, Ordering::Release);

        if self
            .control
            .transition(ThreadState::Idle, ThreadState::Terminated)
        {
            return;
        }
        self.control
            .transition(ThreadState::Running, ThreadState::StopRequested);

        // Take the pause lock so the notification cannot slip in between the
        // worker's flag check and its wait
        let _guard = self.control.pause.lock();
        self.control.wake.notify_all();
    }

    pub fn state(&self) -> ThreadState {
        self.control.state()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == ThreadState::Terminated
    }

    /// Number of steps applied by this thread
    pub fn steps_completed(&self) -> u64 {
        self.control.steps.load(Ordering::Acquire)
    }

    /// The map this thread steps
    pub fn map(&self) -> &Arc<RwLock<M>> {
        &self.map
    }

    /// Wait for the worker to finish. A failed step or a panic in the worker
    /// is returned as an error.
    pub fn join(mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("Simulation thread panicked"))?;
        }

        match self.control.failure.lock().take() {
            Some(message) => Err(anyhow!("Simulation step failed: {}", message)),
            None => Ok(()),
        }
    }
}

/// Marks the thread terminated when the worker exits, panics included
struct TerminateOnExit(Arc<Control>);

impl Drop for TerminateOnExit {
    fn drop(&mut self) {
        self.0.terminate();
    }
}

fn run_loop<M: Steppable>(map: Arc<RwLock<M>>, control: Arc<Control>, interval: Duration) {
    let _exit = TerminateOnExit(Arc::clone(&control));

    while !control.stop.load(Ordering::Acquire) {
        let result = map.write().step();

        if let Err(e) = result {
            error!("Simulation step failed, stopping: {}", e);
            *control.failure.lock() = Some(e.to_string());
            break;
        }
        control.steps.fetch_add(1, Ordering::AcqRel);

        let mut guard = control.pause.lock();
        if control.stop.load(Ordering::Acquire) {
            break;
        }
        control.wake.wait_for(&mut guard, interval);
    }

    info!(
        "Simulation thread terminated after {} steps",
        control.steps.load(Ordering::Acquire)
    );
}
