//! The flow-and-erosion engine.

use glam::{IVec2, Vec2, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::erosion::flow::{update_outflow, update_water_and_velocity, Outflow};
use crate::erosion::sources::{add_water_drop, make_rain};
use crate::erosion::surface::{compute_surface_normals, evaporate, smooth_terrain};
use crate::erosion::transport::{advect_sediment, erode_and_deposit};
use crate::erosion::ErosionConfig;
use crate::grid::Grid;
use crate::parallel::{Executor, Threaded};
use crate::terrain::{SimulationState, StateError};

/// Errors raised while constructing a [`FluidSimulation`].
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("Invalid erosion config: {0}")]
    InvalidConfig(String),
}

/// Advances a [`SimulationState`] one explicit time step at a time.
///
/// Each [`tick`](FluidSimulation::tick) runs seven dense passes in a fixed
/// order: water sources, pipe flow, erosion/deposition, sediment advection,
/// evaporation, terrain smoothing and surface normals. Every pass reads only
/// what the previous passes committed. The engine owns the state and its own
/// scratch fields (velocity, outflow flux, one double-buffer); the state can
/// be read between ticks through the accessors.
pub struct FluidSimulation<E: Executor = Threaded> {
    state: SimulationState,
    config: ErosionConfig,
    executor: E,
    rng: ChaCha8Rng,

    velocity: Grid<Vec2>,
    outflow: Grid<Outflow>,
    scratch: Grid<f32>,

    flood_center: IVec2,
    ticks: u64,
}

impl FluidSimulation<Threaded> {
    /// Creates an engine that runs its passes on the rayon thread pool.
    pub fn new(state: SimulationState, config: ErosionConfig) -> Result<Self, SimulationError> {
        Self::with_executor(state, config, Threaded)
    }
}

impl<E: Executor> FluidSimulation<E> {
    /// Creates an engine with an explicit pass executor.
    ///
    /// Fails if the state's grids disagree on their dimensions or if any
    /// constant in `config` is out of range.
    pub fn with_executor(
        state: SimulationState,
        config: ErosionConfig,
        executor: E,
    ) -> Result<Self, SimulationError> {
        state.check_dimensions()?;
        config.validate().map_err(SimulationError::InvalidConfig)?;

        let (width, height) = (state.width(), state.height());
        log::debug!("erosion engine bound to {width}x{height} grid");

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.rain_seed),
            velocity: Grid::new(width, height),
            outflow: Grid::new(width, height),
            scratch: Grid::new(width, height),
            flood_center: grid_center(width, height),
            ticks: 0,
            state,
            config,
            executor,
        })
    }

    /// Advances the simulation by `dt`.
    ///
    /// `rain` scatters `raindrops_per_tick` drops over the grid, `flood`
    /// pours a circular drop at the flood centre. Numerical degeneracies are
    /// absorbed by the passes, so a tick never fails; calling it with a
    /// negative or non-finite `dt`, or after resizing one of the state's
    /// grids directly, is a programming error and panics.
    pub fn tick(&mut self, dt: f32, rain: bool, flood: bool) {
        assert!(dt.is_finite() && dt >= 0.0, "tick needs a finite, non-negative dt, got {dt}");
        assert!(
            self.state.check_dimensions().is_ok() && self.scratch.same_shape(&self.state.terrain),
            "simulation grids were resized outside FluidSimulation::resize"
        );

        let exec = &self.executor;
        let config = &self.config;
        let state = &mut self.state;

        // 1. sources
        if rain && !make_rain(&mut state.water, &mut self.rng, config.raindrops_per_tick) {
            log::debug!("rain skipped: {}x{} grid has no interior", state.width(), state.height());
        }
        if flood {
            add_water_drop(
                &mut state.water,
                self.flood_center,
                config.flood_radius,
                config.flood_rate * dt,
            );
        }

        // 2. flow
        update_outflow(exec, &state.terrain, &state.water, &mut self.outflow, dt, config);
        update_water_and_velocity(exec, &self.outflow, &mut state.water, &mut self.velocity, dt, config);

        // 3. erosion / deposition
        erode_and_deposit(
            exec,
            &mut state.terrain,
            &mut state.water,
            &mut state.sediment,
            &self.velocity,
            &mut self.scratch,
            config,
        );

        // 4. sediment transport
        advect_sediment(exec, &mut state.sediment, &self.velocity, &mut self.scratch, dt);

        // 5. evaporation
        evaporate(exec, &mut state.water, dt, config);

        // 6. relaxation
        smooth_terrain(exec, &mut state.terrain, &mut self.scratch, config);

        // 7. normals
        compute_surface_normals(exec, &state.terrain, &state.water, &mut state.normals);

        self.ticks += 1;
        log::trace!("tick {} done (dt = {dt}, rain = {rain}, flood = {flood})", self.ticks);
    }

    /// Adds a circular drop of water; see [`add_water_drop`].
    pub fn add_water_drop(&mut self, center: IVec2, radius: i32, amount: f32) {
        add_water_drop(&mut self.state.water, center, radius, amount);
    }

    /// Moves the flood source (x = column, y = row).
    pub fn set_flood_center(&mut self, center: IVec2) {
        self.flood_center = center;
    }

    pub fn flood_center(&self) -> IVec2 {
        self.flood_center
    }

    /// Restarts the rain position sequence from `seed`.
    pub fn reseed_rain(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Resizes the state to flat, dry `width x height` terrain and recreates
    /// the scratch fields. The flood source moves to the new centre.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.state.resize(width, height);
        self.velocity = Grid::new(width, height);
        self.outflow = Grid::new(width, height);
        self.scratch = Grid::new(width, height);
        self.flood_center = grid_center(width, height);
        log::debug!("erosion engine resized to {width}x{height}");
    }

    pub fn terrain(&self) -> &Grid<f32> {
        self.state.terrain()
    }

    pub fn water(&self) -> &Grid<f32> {
        self.state.water()
    }

    pub fn sediment(&self) -> &Grid<f32> {
        self.state.sediment()
    }

    pub fn normals(&self) -> &Grid<Vec3> {
        self.state.normals()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mutable state access between ticks, e.g. to regenerate terrain.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn into_state(self) -> SimulationState {
        self.state
    }

    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[cfg(test)]
    pub(crate) fn outflow(&self) -> &Grid<Outflow> {
        &self.outflow
    }

    #[cfg(test)]
    pub(crate) fn velocity(&self) -> &Grid<Vec2> {
        &self.velocity
    }
}

fn grid_center(width: usize, height: usize) -> IVec2 {
    IVec2::new((width / 2) as i32, (height / 2) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::Serial;

    const DT: f32 = 1000.0 / 60.0;

    fn procedural(width: usize, height: usize, seed: i32) -> SimulationState {
        let mut state = SimulationState::new(width, height);
        state.create_procedural_terrain(seed);
        state
    }

    fn assert_physical(sim: &FluidSimulation<impl Executor>) {
        assert!(sim.terrain().iter().all(|h| h.is_finite()));
        assert!(sim.water().iter().all(|&w| w.is_finite() && w >= 0.0));
        assert!(sim.sediment().iter().all(|&s| s.is_finite() && s >= 0.0));
        assert!(sim.normals().iter().all(|n| n.is_finite() && (n.length() - 1.0).abs() < 1e-4));
    }

    #[test]
    fn new_rejects_mismatched_state() {
        let mut state = SimulationState::new(8, 8);
        state.water_mut().resize(8, 7);
        let err = FluidSimulation::new(state, ErosionConfig::default()).err().unwrap();
        assert!(matches!(err, SimulationError::State(StateError::DimensionMismatch { .. })));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = ErosionConfig {
            pipe_length: 0.0,
            ..Default::default()
        };
        let err = FluidSimulation::new(SimulationState::new(4, 4), config).err().unwrap();
        assert!(matches!(err, SimulationError::InvalidConfig(_)));
        assert!(err.to_string().contains("pipe_length"));
    }

    #[test]
    #[should_panic(expected = "resized outside")]
    fn tick_panics_if_grids_were_resized_behind_its_back() {
        let mut sim = FluidSimulation::with_executor(SimulationState::new(6, 6), ErosionConfig::default(), Serial).unwrap();
        sim.state_mut().terrain_mut().resize(5, 5);
        sim.tick(DT, false, false);
    }

    #[test]
    fn flood_source_fills_the_disc_only() {
        let mut sim = FluidSimulation::new(SimulationState::new(50, 50), ErosionConfig::default()).unwrap();
        let center = IVec2::new(25, 25);
        let (radius, amount) = (10, 0.01 * DT);

        sim.add_water_drop(center, radius, amount);

        let mut analytic = 0.0f64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy;
                if d2 <= radius * radius {
                    analytic += (amount * (radius * radius - d2) as f32) as f64;
                }
            }
        }

        for row in 0..50 {
            for col in 0..50 {
                let dx = col as i32 - center.x;
                let dy = row as i32 - center.y;
                if dx * dx + dy * dy > radius * radius {
                    assert_eq!(sim.water().get(row, col), 0.0, "water outside the disc at ({row}, {col})");
                }
            }
        }
        assert!((sim.water().sum() - analytic).abs() < 1e-3 * analytic);
    }

    #[test]
    fn flood_tick_on_flat_ground() {
        let config = ErosionConfig::default().without_erosion();
        let mut sim = FluidSimulation::with_executor(SimulationState::new(50, 50), config.clone(), Serial).unwrap();
        assert_eq!(sim.flood_center(), IVec2::new(25, 25));

        sim.tick(DT, false, true);

        let radius = config.flood_radius;
        let amount = config.flood_rate * DT;
        let mut analytic = 0.0f64;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d2 = dx * dx + dy * dy;
                if d2 <= radius * radius {
                    analytic += (amount * (radius * radius - d2) as f32) as f64;
                }
            }
        }

        // water moves at most one cell per tick
        for row in 0..50i32 {
            for col in 0..50i32 {
                let d2 = (col - 25).pow(2) + (row - 25).pow(2);
                if d2 > (radius + 1).pow(2) {
                    assert_eq!(sim.water().get(row as usize, col as usize), 0.0);
                }
            }
        }

        let evaporated = (1.0 - config.evaporation_rate * DT) as f64;
        let total = sim.water().sum();
        assert!(total <= analytic * evaporated + 1e-3);
        assert!(total >= analytic * evaporated * 0.99);
        assert_physical(&sim);
    }

    #[test]
    fn step_terrain_flows_towards_the_lower_column() {
        let (width, height) = (2, 8);
        let mut terrain = Grid::new(width, height);
        let mut water = Grid::new(width, height);
        for row in 0..height {
            terrain.set(row, 0, 1.0);
            water.set(row, 0, 0.2);
        }
        let state = SimulationState::from_grids(terrain, water, Grid::new(width, height)).unwrap();
        let mut sim = FluidSimulation::with_executor(state, ErosionConfig::default(), Serial).unwrap();

        sim.tick(DT, false, false);

        for row in 0..height {
            assert!(sim.outflow().get(row, 0).right > 0.0, "row {row} should drain right");
            assert_eq!(sim.outflow().get(row, 1).left, 0.0, "row {row} must not flow uphill");
            assert!(sim.water().get(row, 1) > 0.0);
        }
    }

    #[test]
    fn boundary_outflow_stays_zero_over_many_ticks() {
        let mut sim = FluidSimulation::new(procedural(24, 18, 5), ErosionConfig::default()).unwrap();
        for _ in 0..30 {
            sim.tick(DT, true, true);
        }

        let flux = sim.outflow();
        let (w, h) = (flux.width(), flux.height());
        for row in 0..h {
            assert_eq!(flux.get(row, 0).left, 0.0);
            assert_eq!(flux.get(row, w - 1).right, 0.0);
        }
        for col in 0..w {
            assert_eq!(flux.get(0, col).bottom, 0.0);
            assert_eq!(flux.get(h - 1, col).top, 0.0);
        }
        assert!(flux.iter().all(|f| f.left >= 0.0 && f.right >= 0.0 && f.top >= 0.0 && f.bottom >= 0.0));
        assert_physical(&sim);
    }

    #[test]
    fn cells_without_inflow_never_gain_water() {
        let config = ErosionConfig::default().without_erosion();
        let mut state = procedural(20, 20, 11);
        state.water_mut().fill(0.05);
        let mut sim = FluidSimulation::with_executor(state, config, Serial).unwrap();
        sim.tick(DT, false, false);

        let before = sim.water().clone();
        sim.tick(DT, false, false);

        let flux = sim.outflow();
        let (w, h) = (flux.width() as isize, flux.height() as isize);
        let at = |r: isize, c: isize| {
            if r < 0 || c < 0 || r >= h || c >= w {
                Outflow::default()
            } else {
                flux.get(r as usize, c as usize)
            }
        };
        let mut checked = 0;
        for r in 0..h {
            for c in 0..w {
                let inflow = at(r, c - 1).right + at(r, c + 1).left + at(r - 1, c).top + at(r + 1, c).bottom;
                if inflow == 0.0 {
                    let (row, col) = (r as usize, c as usize);
                    assert!(sim.water().get(row, col) <= before.get(row, col));
                    checked += 1;
                }
            }
        }
        assert!(checked > 0);
        assert!(sim.water().iter().all(|&x| x == 0.0 || x >= sim.config().dry_threshold));
    }

    #[test]
    fn rain_without_erosion_keeps_terrain_and_levels_off() {
        // a gentle ramp: never steep enough to be smoothed
        let (width, height) = (32, 32);
        let ramp = (0..width * height).map(|i| (i % width) as f32 * 0.05).collect();
        let terrain = Grid::from_vec(width, height, ramp).unwrap();
        let state = SimulationState::from_grids(terrain.clone(), Grid::new(width, height), Grid::new(width, height)).unwrap();

        let config = ErosionConfig {
            evaporation_rate: 0.003,
            rain_seed: 17,
            ..ErosionConfig::default().without_erosion()
        };
        let per_tick = config.raindrops_per_tick as f64 * 9.0 / 16.0;
        let keep = (1.0 - config.evaporation_rate * DT) as f64;
        let ceiling = per_tick * keep / (1.0 - keep);

        let mut sim = FluidSimulation::with_executor(state, config, Serial).unwrap();
        let mut at_800 = 0.0;
        for tick in 1..=1000 {
            sim.tick(DT, true, false);
            let total = sim.water().sum();
            assert!(total <= ceiling + 1.0, "tick {tick}: {total} above steady-state ceiling {ceiling}");
            if tick == 800 {
                at_800 = total;
            }
        }

        assert_eq!(sim.terrain(), &terrain);
        let at_1000 = sim.water().sum();
        assert!(at_1000 > 0.0);
        assert!((at_1000 - at_800).abs() < 0.1 * at_1000, "still drifting: {at_800} -> {at_1000}");
        assert_physical(&sim);
    }

    #[test]
    fn identical_seeds_give_identical_runs() {
        let run = || {
            let config = ErosionConfig {
                rain_seed: 99,
                ..Default::default()
            };
            let mut sim = FluidSimulation::new(procedural(40, 30, 1234), config).unwrap();
            sim.set_flood_center(IVec2::new(12, 20));
            for i in 0..60 {
                sim.tick(DT, true, i % 3 == 0);
            }
            sim.into_state()
        };

        let a = run();
        let b = run();
        assert_eq!(a.terrain(), b.terrain());
        assert_eq!(a.water(), b.water());
        assert_eq!(a.sediment(), b.sediment());
        assert_eq!(a.normals(), b.normals());
    }

    #[test]
    fn serial_and_threaded_engines_agree() {
        let config = ErosionConfig {
            rain_seed: 3,
            ..Default::default()
        };
        let mut threaded = FluidSimulation::new(procedural(33, 27, 8), config.clone()).unwrap();
        let mut serial = FluidSimulation::with_executor(procedural(33, 27, 8), config, Serial).unwrap();

        for _ in 0..40 {
            threaded.tick(DT, true, true);
            serial.tick(DT, true, true);
        }

        assert_eq!(threaded.terrain(), serial.terrain());
        assert_eq!(threaded.water(), serial.water());
        assert_eq!(threaded.sediment(), serial.sediment());
    }

    #[test]
    fn erosion_moves_material_on_procedural_terrain() {
        let mut sim = FluidSimulation::new(procedural(48, 48, 21), ErosionConfig::default()).unwrap();
        let initial = sim.terrain().clone();
        for _ in 0..100 {
            sim.tick(DT, true, false);
        }
        assert_ne!(sim.terrain(), &initial);
        assert!(sim.state().stats().total_sediment > 0.0);
        assert_eq!(sim.ticks(), 100);
        assert_physical(&sim);
    }

    #[test]
    fn zero_dt_tick_moves_no_water() {
        let mut sim = FluidSimulation::with_executor(procedural(16, 16, 2), ErosionConfig::default(), Serial).unwrap();
        let before = sim.state().clone();
        sim.tick(0.0, false, true);
        assert_eq!(sim.water(), before.water());
        assert_eq!(sim.sediment(), before.sediment());
    }

    #[test]
    fn resize_recreates_scratch_fields() {
        let mut sim = FluidSimulation::with_executor(procedural(10, 10, 1), ErosionConfig::default(), Serial).unwrap();
        sim.tick(DT, true, false);

        sim.resize(14, 6);

        assert_eq!(sim.terrain().width(), 14);
        assert_eq!(sim.outflow().height(), 6);
        assert_eq!(sim.velocity().len(), 84);
        assert_eq!(sim.flood_center(), IVec2::new(7, 3));
        sim.tick(DT, true, true);
        assert_physical(&sim);
    }

    #[test]
    fn tiny_grids_do_not_break_the_tick() {
        let mut sim = FluidSimulation::with_executor(SimulationState::new(1, 1), ErosionConfig::default(), Serial).unwrap();
        sim.tick(DT, true, true);
        assert_physical(&sim);
        assert!(sim.water().get(0, 0) > 0.0);
    }
}
