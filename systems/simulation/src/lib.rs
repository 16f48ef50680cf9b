#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order tick driver and command surface for a Dam Defense session.
//!
//! Adapters own one [`Simulation`], feed it frame deltas through
//! [`Simulation::update`] and player intent through [`Simulation::apply`],
//! and react to [`Event`]s delivered on its [`EventBus`].

use dam_defense_config::{Catalog, GameSettings};
use dam_defense_core::{
    Command, DebugCommand, Event, EventBus, GameStatus, Rejection, SimulationError, Verdict,
    WaveState,
};
use dam_defense_system_combat::CombatSystem;
use dam_defense_system_effects::EffectSystem;
use dam_defense_system_path::PathSystem;
use dam_defense_system_placement::{TowerPlacement, Upgrades};
use dam_defense_system_soldiers::SoldierSystem;
use dam_defense_system_stages::StageSystem;
use dam_defense_system_waves::WaveSystem;
use dam_defense_world::GameState;

/// One step of the per-tick pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickPhase {
    /// Due enemies join the live list.
    Spawn,
    /// Enemies advance, fight blockers and damage the dam.
    Movement,
    /// Squads reconcile, walk, block and fight.
    Soldiers,
    /// Towers attack, projectiles resolve, dead enemies pay out.
    Combat,
    /// Status effects tick.
    Effects,
    /// The running wave may clear.
    WaveCheck,
    /// Cleared waves advance the stage.
    StageCheck,
    /// Simulated time accrues.
    Clock,
}

/// Order in which every tick runs its phases.
pub const TICK_ORDER: [TickPhase; 8] = [
    TickPhase::Spawn,
    TickPhase::Movement,
    TickPhase::Soldiers,
    TickPhase::Combat,
    TickPhase::Effects,
    TickPhase::WaveCheck,
    TickPhase::StageCheck,
    TickPhase::Clock,
];

/// A complete play session: configuration, state, systems and event bus.
#[derive(Debug)]
pub struct Simulation {
    catalog: Catalog,
    settings: GameSettings,
    path: PathSystem,
    state: GameState,
    waves: WaveSystem,
    stages: StageSystem,
    combat: CombatSystem,
    effects: EffectSystem,
    soldiers: SoldierSystem,
    placement: TowerPlacement,
    upgrades: Upgrades,
    bus: EventBus,
    pending: Vec<Event>,
    last_tick: Vec<TickPhase>,
}

impl Simulation {
    /// Builds a simulation in the menu from validated configuration.
    #[must_use]
    pub fn new(catalog: Catalog, settings: GameSettings) -> Self {
        let path = PathSystem::new(catalog.map());
        let state = GameState::new(&settings);
        Self {
            catalog,
            settings,
            path,
            state,
            waves: WaveSystem::new(),
            stages: StageSystem::new(),
            combat: CombatSystem::new(),
            effects: EffectSystem::new(),
            soldiers: SoldierSystem::new(),
            placement: TowerPlacement::new(),
            upgrades: Upgrades::new(),
            bus: EventBus::new(),
            pending: Vec::new(),
            last_tick: Vec::with_capacity(TICK_ORDER.len()),
        }
    }

    /// Static configuration.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Session settings.
    #[must_use]
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Path geometry.
    #[must_use]
    pub fn path(&self) -> &PathSystem {
        &self.path
    }

    /// Read-only game state; see [`dam_defense_world::query`] for snapshots.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// State of the running wave.
    #[must_use]
    pub fn wave_state(&self) -> WaveState {
        self.waves.state()
    }

    /// Phases the most recent tick ran, in order.
    #[must_use]
    pub fn last_tick(&self) -> &[TickPhase] {
        &self.last_tick
    }

    /// Event bus for presentation listeners.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Starts a fresh run at the first wave of the first stage.
    pub fn start_session(&mut self) {
        self.state = GameState::new(&self.settings);
        self.state.status = GameStatus::Preparing;
        self.waves.reset();
        self.combat = CombatSystem::new();
        self.soldiers = SoldierSystem::new();
        self.stages.reset(&mut self.state, &mut self.pending);
        tracing::info!(
            gold = self.state.gold.balance(),
            dam_hp = self.state.dam_hp,
            "session started"
        );
        self.flush();
    }

    /// Advances the simulation by one frame.
    ///
    /// `frame_dt` is scaled by the speed multiplier. Nothing happens unless
    /// the session is preparing or playing, and the remaining phases are
    /// skipped once the dam falls.
    pub fn update(&mut self, frame_dt: f32) -> Result<(), SimulationError> {
        self.last_tick.clear();
        if !self.state.is_running() || frame_dt <= 0.0 {
            return Ok(());
        }
        let dt = frame_dt * self.state.speed.multiplier();
        let mut outcome = Ok(());
        for phase in TICK_ORDER {
            if self.state.status == GameStatus::GameOver {
                break;
            }
            self.last_tick.push(phase);
            if let Err(error) = self.run_phase(phase, dt) {
                outcome = Err(error);
                break;
            }
        }
        self.flush();
        outcome
    }

    fn run_phase(&mut self, phase: TickPhase, dt: f32) -> Result<(), SimulationError> {
        match phase {
            TickPhase::Spawn => {
                let spawn_point = self.path.position_at_progress(0.0);
                self.waves
                    .spawn(dt, &self.catalog, spawn_point, &mut self.state)?;
            }
            TickPhase::Movement => {
                let dam_damage: f32 = self
                    .state
                    .enemies
                    .iter_mut()
                    .map(|enemy| enemy.update(dt, &self.path))
                    .sum();
                let _ = self.state.damage_dam(dam_damage, &mut self.pending);
            }
            TickPhase::Soldiers => self.soldiers.update(dt, &self.path, &mut self.state),
            TickPhase::Combat => {
                self.combat
                    .update(dt, &self.path, &mut self.state, &mut self.pending);
            }
            TickPhase::Effects => self.effects.update(dt, &mut self.state.enemies),
            TickPhase::WaveCheck => self.waves.check(&mut self.state, &mut self.pending),
            TickPhase::StageCheck => self.stages.check(
                &self.catalog,
                &self.settings,
                &mut self.waves,
                &mut self.state,
                &mut self.pending,
            ),
            TickPhase::Clock => self.state.elapsed += dt,
        }
        Ok(())
    }

    /// Executes a command and delivers the events it produced.
    ///
    /// Player mistakes return [`Verdict::Rejected`]; references to slots the
    /// map does not define return an error.
    pub fn apply(&mut self, command: Command) -> Result<Verdict, SimulationError> {
        let verdict = self.execute(command);
        if let Ok(verdict) = &verdict {
            tracing::debug!(?verdict, "command applied");
        }
        self.flush();
        verdict
    }

    fn execute(&mut self, command: Command) -> Result<Verdict, SimulationError> {
        match command {
            Command::PlaceTower { slot, family } => {
                if !self.accepts_orders() {
                    return Ok(Verdict::Rejected(Rejection::InvalidStatus));
                }
                self.placement
                    .place(&self.catalog, &mut self.state, slot, family, &mut self.pending)
            }
            Command::SellTower { slot } => {
                if !self.accepts_orders() {
                    return Ok(Verdict::Rejected(Rejection::InvalidStatus));
                }
                self.placement
                    .sell(&self.catalog, &mut self.state, slot, &mut self.pending)
            }
            Command::UpgradeTower { slot, upgrade } => {
                if !self.accepts_orders() {
                    return Ok(Verdict::Rejected(Rejection::InvalidStatus));
                }
                self.upgrades.upgrade(
                    &self.catalog,
                    &mut self.state,
                    slot,
                    upgrade,
                    &mut self.pending,
                )
            }
            Command::StartNextWave => {
                self.waves
                    .start_next_wave(&self.catalog, &mut self.state, &mut self.pending)
            }
            Command::ToggleSpeed => {
                self.state.speed = self.state.speed.toggled();
                Ok(Verdict::Applied)
            }
            Command::TogglePause => Ok(self.toggle_pause()),
            Command::SetRallyPoint { slot, point } => {
                let _ = self.catalog.slot(slot)?;
                if !self.accepts_orders() {
                    return Ok(Verdict::Rejected(Rejection::InvalidStatus));
                }
                Ok(self.soldiers.set_rally_point(&mut self.state, slot, point))
            }
            Command::Debug(debug) => Ok(self.debug(debug)),
        }
    }

    fn accepts_orders(&self) -> bool {
        matches!(
            self.state.status,
            GameStatus::Preparing | GameStatus::Playing | GameStatus::Paused
        )
    }

    fn toggle_pause(&mut self) -> Verdict {
        match self.state.status {
            GameStatus::Paused => {
                self.state.status = self
                    .state
                    .resume_status
                    .take()
                    .unwrap_or(GameStatus::Preparing);
            }
            GameStatus::Preparing | GameStatus::Playing => {
                self.state.resume_status = Some(self.state.status);
                self.state.status = GameStatus::Paused;
            }
            GameStatus::Menu | GameStatus::GameOver | GameStatus::Victory => {
                return Verdict::Rejected(Rejection::InvalidStatus);
            }
        }
        tracing::debug!(status = ?self.state.status, "pause toggled");
        Verdict::Applied
    }

    fn debug(&mut self, command: DebugCommand) -> Verdict {
        tracing::warn!(?command, "debug command");
        match command {
            DebugCommand::GrantGold { amount } => {
                self.state.gold.earn(amount, &mut self.pending);
                Verdict::Applied
            }
            DebugCommand::ResetDamHp => {
                self.state.dam_hp = self.state.dam_max_hp;
                Verdict::Applied
            }
            DebugCommand::KillAllEnemies => {
                for enemy in &mut self.state.enemies {
                    enemy.kill();
                }
                Verdict::Applied
            }
            DebugCommand::ForceSpeed { speed } => {
                self.state.speed = speed;
                Verdict::Applied
            }
            DebugCommand::SkipWave => self.waves.skip(&mut self.state),
            DebugCommand::SkipStage => {
                if self.stages.is_finished() {
                    return Verdict::Rejected(Rejection::InvalidStatus);
                }
                self.stages.skip_stage(&mut self.waves, &mut self.state);
                Verdict::Applied
            }
        }
    }

    fn flush(&mut self) {
        for event in self.pending.drain(..) {
            self.bus.emit(&event);
        }
    }
}
