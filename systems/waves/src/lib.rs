#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-wave state machine: preparing, spawning, in progress, cleared.

use dam_defense_config::Catalog;
use dam_defense_core::{
    Event, GameStatus, Position, Rejection, SimulationError, Verdict, WaveState,
};
use dam_defense_system_spawning::SpawnSystem;
use dam_defense_world::GameState;

/// Drives the wave being played and the spawner feeding it.
#[derive(Debug)]
pub struct WaveSystem {
    state: WaveState,
    spawner: SpawnSystem,
}

impl Default for WaveSystem {
    fn default() -> Self {
        Self {
            state: WaveState::Preparing,
            spawner: SpawnSystem::new(),
        }
    }
}

impl WaveSystem {
    /// Creates a wave system waiting for the first wave.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current wave state.
    #[must_use]
    pub fn state(&self) -> WaveState {
        self.state
    }

    /// Planned spawns that have not appeared yet.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawner.remaining()
    }

    /// Returns to `Preparing` with an empty spawn queue.
    pub fn reset(&mut self) {
        self.spawner.clear();
        self.state = WaveState::Preparing;
    }

    /// Starts the wave at `game.wave` of `game.stage`.
    ///
    /// Legal only while preparing or after a clear, and only while the
    /// session waits between waves. Flips the session to `Playing`.
    pub fn start_next_wave(
        &mut self,
        catalog: &Catalog,
        game: &mut GameState,
        out_events: &mut Vec<Event>,
    ) -> Result<Verdict, SimulationError> {
        if !matches!(self.state, WaveState::Preparing | WaveState::Cleared) {
            return Ok(Verdict::Rejected(Rejection::WaveNotReady));
        }
        if game.status != GameStatus::Preparing {
            return Ok(Verdict::Rejected(Rejection::InvalidStatus));
        }
        let stage = catalog.stage(game.stage)?;
        let wave = stage
            .wave(game.wave)
            .ok_or(SimulationError::UnknownStage(game.stage))?;

        self.spawner.start(catalog, wave)?;
        self.state = WaveState::Spawning;
        game.status = GameStatus::Playing;
        out_events.push(Event::WaveStart {
            stage: game.stage,
            wave: game.wave,
        });
        tracing::info!(
            stage = game.stage.get(),
            wave = game.wave,
            enemies = wave.total_enemies(),
            "wave started"
        );
        Ok(Verdict::Applied)
    }

    /// Spawn phase: appends every enemy due this tick to the live list.
    pub fn spawn(
        &mut self,
        dt: f32,
        catalog: &Catalog,
        spawn_point: Position,
        game: &mut GameState,
    ) -> Result<(), SimulationError> {
        if self.state != WaveState::Spawning {
            return Ok(());
        }
        self.spawner.update(
            dt,
            catalog,
            &mut game.enemy_factory,
            spawn_point,
            &mut game.enemies,
        )?;
        if self.spawner.is_complete() {
            self.state = WaveState::InProgress;
            tracing::debug!(spawned = self.spawner.spawned(), "wave fully spawned");
        }
        Ok(())
    }

    /// Wave check phase: clears the wave once spawning is done and no enemy
    /// is left, handing the session back to `Preparing`.
    pub fn check(&mut self, game: &mut GameState, out_events: &mut Vec<Event>) {
        if self.state != WaveState::InProgress || !game.enemies.is_empty() {
            return;
        }
        self.state = WaveState::Cleared;
        if game.status == GameStatus::Playing {
            game.status = GameStatus::Preparing;
        }
        out_events.push(Event::WaveEnd {
            stage: game.stage,
            wave: game.wave,
        });
        tracing::info!(stage = game.stage.get(), wave = game.wave, "wave cleared");
    }

    /// Marks the current wave cleared without playing it.
    pub fn mark_cleared(&mut self) {
        self.spawner.clear();
        self.state = WaveState::Cleared;
    }

    /// Abandons the running wave: queued spawns are dropped and live
    /// enemies return to the factory without paying out. The wave clears on
    /// the next check.
    pub fn skip(&mut self, game: &mut GameState) -> Verdict {
        if !matches!(self.state, WaveState::Spawning | WaveState::InProgress) {
            return Verdict::Rejected(Rejection::WaveNotReady);
        }
        self.spawner.clear();
        self.state = WaveState::InProgress;
        let GameState {
            enemies,
            enemy_factory,
            squads,
            ..
        } = game;
        for soldier in squads.values_mut().flat_map(|squad| squad.soldiers_mut()) {
            let _ = soldier.disengage();
        }
        for enemy in enemies.drain(..) {
            enemy_factory.release(enemy);
        }
        tracing::debug!("wave skipped");
        Verdict::Applied
    }
}
