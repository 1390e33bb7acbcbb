// controller.rs - Run/stop state, generation counter and the self-rescheduling tick loop

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::runtime::Handle;

use crate::config::SimConfig;
use crate::error::{GridError, SimulationError};
use crate::grid::Grid;
use crate::patterns::Pattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// A consistent view of everything a renderer needs, taken under one lock.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub grid: Arc<Grid>,
    pub generation: u64,
    pub run_state: RunState,
    pub speed_ms: u64,
}

struct State {
    grid: Arc<Grid>,
    generation: u64,
    run_state: RunState,
    speed_ms: u64,
    /// Bumped on every start. A tick loop whose epoch is stale exits.
    epoch: u64,
}

/// Drives a [`Grid`] through generations on a tokio runtime.
///
/// All commands are synchronous and take effect under the same lock a tick
/// holds while it steps the grid, so edits never interleave with a generation
/// being computed. Ticks run on a spawned task that sleeps `speed_ms` between
/// generations and checks the run flag before each one.
pub struct Simulation {
    state: Arc<Mutex<State>>,
    runtime: Handle,
    rows: usize,
    cols: usize,
}

impl Simulation {
    /// Builds a stopped simulation on the tokio runtime of the calling context.
    pub fn new(config: SimConfig) -> Result<Self, SimulationError> {
        let runtime = Handle::try_current().map_err(|_| SimulationError::NoRuntime)?;
        Self::with_handle(config, runtime)
    }

    pub fn with_handle(config: SimConfig, runtime: Handle) -> Result<Self, SimulationError> {
        config.validate()?;
        debug!(
            "new {}x{} simulation, {} ms per generation",
            config.rows, config.cols, config.speed_ms
        );

        let state = State {
            grid: Arc::new(Grid::new(config.rows, config.cols)),
            generation: 0,
            run_state: RunState::Stopped,
            speed_ms: config.speed_ms,
            epoch: 0,
        };
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            runtime,
            rows: config.rows,
            cols: config.cols,
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.lock();
        Snapshot {
            grid: Arc::clone(&state.grid),
            generation: state.generation,
            run_state: state.run_state,
            speed_ms: state.speed_ms,
        }
    }

    pub fn grid(&self) -> Arc<Grid> {
        Arc::clone(&self.lock().grid)
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn run_state(&self) -> RunState {
        self.lock().run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    pub fn speed_ms(&self) -> u64 {
        self.lock().speed_ms
    }

    /// Starts ticking. The first generation is computed on the runtime, not
    /// inside this call. Does nothing if already running.
    pub fn start(&self) {
        let epoch = {
            let mut state = self.lock();
            if state.run_state == RunState::Running {
                debug!("start ignored, simulation already running");
                return;
            }
            state.run_state = RunState::Running;
            state.epoch += 1;
            state.epoch
        };

        info!("simulation started");
        self.runtime.spawn(run(Arc::clone(&self.state), epoch));
    }

    /// Stops ticking. A tick already scheduled fires once and does nothing.
    pub fn stop(&self) {
        let mut state = self.lock();
        if state.run_state == RunState::Running {
            state.run_state = RunState::Stopped;
            info!("simulation stopped at generation {}", state.generation);
        }
    }

    /// Sets the delay used the next time a tick is scheduled.
    pub fn set_speed(&self, speed_ms: u64) -> Result<(), SimulationError> {
        if speed_ms == 0 {
            warn!("rejected zero speed");
            return Err(SimulationError::InvalidSpeed);
        }
        self.lock().speed_ms = speed_ms;
        debug!("speed set to {speed_ms} ms");
        Ok(())
    }

    pub fn toggle_cell(&self, row: usize, col: usize) -> Result<(), GridError> {
        let mut state = self.lock();
        let grid = state
            .grid
            .toggled(row, col)
            .inspect_err(|err| warn!("rejected toggle: {err}"))?;
        state.grid = Arc::new(grid);
        debug!("toggled cell ({row}, {col})");
        Ok(())
    }

    pub fn randomize(&self) {
        self.replace(Grid::random(self.rows, self.cols), "randomized");
    }

    pub fn clear(&self) {
        self.replace(Grid::new(self.rows, self.cols), "cleared");
    }

    pub fn load_pattern(&self, pattern: &Pattern) {
        let grid = Grid::with_pattern(self.rows, self.cols, pattern);
        self.replace(grid, &format!("loaded with {}", pattern.name));
    }

    /// Advances one generation by hand. Only allowed while stopped; returns
    /// whether a generation was computed.
    pub fn step_once(&self) -> bool {
        let mut state = self.lock();
        if state.run_state == RunState::Running {
            return false;
        }
        advance(&mut state);
        true
    }

    // Wholesale replacement: the run state is left alone.
    fn replace(&self, grid: Grid, what: &str) {
        let mut state = self.lock();
        state.grid = Arc::new(grid);
        state.generation = 0;
        info!("grid {what}, population {}", state.grid.population());
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.lock().run_state = RunState::Stopped;
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn advance(state: &mut State) {
    state.generation += 1;
    state.grid = Arc::new(state.grid.step());
    trace!(
        "generation {}, population {}",
        state.generation,
        state.grid.population()
    );
}

async fn run(state: Arc<Mutex<State>>, epoch: u64) {
    while let Some(delay) = tick(&state, epoch) {
        tokio::time::sleep(delay).await;
    }
    trace!("tick loop of run {epoch} finished");
}

/// One generation, or `None` when this run has been stopped or superseded.
/// Returns the delay before the next tick.
fn tick(state: &Mutex<State>, epoch: u64) -> Option<Duration> {
    let mut state = lock(state);
    if state.run_state != RunState::Running || state.epoch != epoch {
        return None;
    }
    advance(&mut state);
    Some(Duration::from_millis(state.speed_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn blinker(speed_ms: u64) -> Simulation {
        let sim = Simulation::new(SimConfig::default().with_size(3, 3).with_speed(speed_ms)).unwrap();
        for col in 0..3 {
            sim.toggle_cell(1, col).unwrap();
        }
        sim
    }

    #[test]
    fn new_needs_a_runtime() {
        assert!(matches!(
            Simulation::new(SimConfig::default()),
            Err(SimulationError::NoRuntime)
        ));
    }

    #[test]
    fn with_handle_validates_config() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let result = Simulation::with_handle(SimConfig::default().with_speed(0), runtime.handle().clone());
        assert!(matches!(result, Err(SimulationError::InvalidSpeed)));
    }

    #[tokio::test]
    async fn starts_stopped_and_empty() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.run_state, RunState::Stopped);
        assert_eq!(snapshot.generation, 0);
        assert_eq!(snapshot.speed_ms, 500);
        assert_eq!((snapshot.grid.rows(), snapshot.grid.cols()), (25, 25));
        assert!(snapshot.grid.is_dead());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_tick_changes_nothing() {
        let sim = blinker(500);
        let before = sim.grid();

        sim.start();
        sim.stop();
        sleep(ms(5_000)).await;

        assert_eq!(*sim.grid(), *before);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.run_state(), RunState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_speed_ms() {
        let sim = blinker(500);
        let horizontal = sim.grid();

        sim.start();
        assert!(sim.is_running());
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 1);
        assert_ne!(*sim.grid(), *horizontal);

        sleep(ms(500)).await;
        assert_eq!(sim.generation(), 2);
        assert_eq!(*sim.grid(), *horizontal);

        sleep(ms(1_000)).await;
        assert_eq!(sim.generation(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_tick() {
        let sim = blinker(500);
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 1);

        sim.stop();
        let grid = sim.grid();
        sleep(ms(5_000)).await;
        assert_eq!(sim.generation(), 1);
        assert_eq!(*sim.grid(), *grid);
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_applies_to_next_schedule() {
        let sim = blinker(1_000);
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 1);

        // The sleep already in progress keeps its 1000 ms.
        sim.set_speed(100).unwrap();
        sleep(ms(997)).await;
        assert_eq!(sim.generation(), 1);
        sleep(ms(3)).await;
        assert_eq!(sim.generation(), 2);
        sleep(ms(100)).await;
        assert_eq!(sim.generation(), 3);
        assert_eq!(sim.speed_ms(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_keeps_a_single_tick_loop() {
        let sim = blinker(500);
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 1);

        sim.stop();
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 2);

        // The first loop wakes at 500 ms and must exit without ticking.
        sleep(ms(501)).await;
        assert_eq!(sim.generation(), 3);
        sleep(ms(500)).await;
        assert_eq!(sim.generation(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_a_noop() {
        let sim = blinker(500);
        sim.start();
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 1);
        sleep(ms(500)).await;
        assert_eq!(sim.generation(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_while_running_keeps_running() {
        let sim = blinker(500);
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(sim.generation(), 1);

        sim.clear();
        assert_eq!(sim.generation(), 0);
        assert!(sim.is_running());

        sleep(ms(500)).await;
        assert_eq!(sim.generation(), 1);
        assert!(sim.grid().is_dead());
    }

    #[tokio::test]
    async fn randomize_then_clear_is_all_dead() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        sim.step_once();
        sim.randomize();
        assert_eq!(sim.generation(), 0);
        sim.clear();
        assert!(sim.grid().is_dead());
        assert_eq!(sim.generation(), 0);
    }

    #[tokio::test]
    async fn invalid_commands_leave_state_alone() {
        let sim = blinker(500);
        let before = sim.grid();

        assert_eq!(
            sim.toggle_cell(3, 1),
            Err(GridError::OutOfBounds {
                row: 3,
                col: 1,
                rows: 3,
                cols: 3
            })
        );
        assert_eq!(*sim.grid(), *before);

        assert_eq!(sim.set_speed(0), Err(SimulationError::InvalidSpeed));
        assert_eq!(sim.speed_ms(), 500);
    }

    #[tokio::test(start_paused = true)]
    async fn step_once_only_while_stopped() {
        let sim = blinker(500);
        let horizontal = sim.grid();

        assert!(sim.step_once());
        assert_eq!(sim.generation(), 1);
        assert!(sim.step_once());
        assert_eq!(*sim.grid(), *horizontal);

        sim.start();
        assert!(!sim.step_once());
        assert_eq!(sim.generation(), 2);
    }

    #[tokio::test]
    async fn load_pattern_resets_generation() {
        let sim = Simulation::new(SimConfig::default()).unwrap();
        sim.step_once();
        sim.load_pattern(crate::patterns::find("Glider").unwrap());
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.grid().population(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_controller_stops_ticking() {
        let sim = blinker(500);
        let state = Arc::clone(&sim.state);
        sim.start();
        sleep(ms(1)).await;
        assert_eq!(lock(&state).generation, 1);

        drop(sim);
        sleep(ms(5_000)).await;
        let state = lock(&state);
        assert_eq!(state.generation, 1);
        assert_eq!(state.run_state, RunState::Stopped);
    }

    #[tokio::test]
    async fn snapshots_are_unaffected_by_later_edits() {
        let sim = blinker(500);
        let snapshot = sim.snapshot();
        sim.clear();
        assert_eq!(snapshot.grid.population(), 3);
        assert!(sim.grid().is_dead());
    }
}
