#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stage sequencing and end-of-run scoring.

use dam_defense_config::{Catalog, GameSettings};
use dam_defense_core::{Event, GameStatus, StageId, WaveState, WAVES_PER_STAGE};
use dam_defense_system_waves::WaveSystem;
use dam_defense_world::GameState;

mod score;

pub use score::{calculate_score, calculate_stars, ScoreInputs};

/// Advances waves and stages once a wave clears, and declares victory after
/// the final stage.
#[derive(Debug, Default)]
pub struct StageSystem {
    finished: bool,
}

impl StageSystem {
    /// Creates a stage system for a fresh run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether victory was declared.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Rewinds to the first wave of the first stage.
    pub fn reset(&mut self, game: &mut GameState, out_events: &mut Vec<Event>) {
        self.finished = false;
        game.stage = StageId::new(1);
        game.wave = 0;
        out_events.push(Event::StageStart { stage: game.stage });
    }

    /// Stage check phase. Does nothing until the current wave is cleared.
    pub fn check(
        &mut self,
        catalog: &Catalog,
        settings: &GameSettings,
        waves: &mut WaveSystem,
        game: &mut GameState,
        out_events: &mut Vec<Event>,
    ) {
        if self.finished || waves.state() != WaveState::Cleared {
            return;
        }
        if game.wave + 1 < WAVES_PER_STAGE {
            game.wave += 1;
            waves.reset();
            return;
        }

        let finished_stage = game.stage;
        out_events.push(Event::StageEnd {
            stage: finished_stage,
        });
        tracing::info!(stage = finished_stage.get(), "stage cleared");

        if finished_stage >= catalog.final_stage() {
            self.declare_victory(settings, game, out_events);
            return;
        }

        if let Some(bonus) = catalog
            .stage(finished_stage)
            .ok()
            .and_then(|stage| stage.bonus_gold)
        {
            game.gold.earn(bonus, out_events);
        }
        game.stage = finished_stage.next();
        game.wave = 0;
        waves.reset();
        out_events.push(Event::StageStart { stage: game.stage });
    }

    /// Jumps to the last wave of the current stage with nothing left alive,
    /// so the next check closes the stage.
    pub fn skip_stage(&mut self, waves: &mut WaveSystem, game: &mut GameState) {
        if self.finished {
            return;
        }
        let _ = waves.skip(game);
        game.wave = WAVES_PER_STAGE - 1;
        if waves.state() == WaveState::Preparing {
            waves.mark_cleared();
        }
        tracing::debug!(stage = game.stage.get(), "stage skipped");
    }

    fn declare_victory(
        &mut self,
        settings: &GameSettings,
        game: &mut GameState,
        out_events: &mut Vec<Event>,
    ) {
        let score = calculate_score(ScoreInputs {
            dam_hp: game.dam_hp,
            dam_max_hp: game.dam_max_hp,
            gold_remaining: game.gold.balance(),
            max_gold: game.gold.initial().saturating_add(game.gold.total_earned()),
            par_time: settings.par_time,
            elapsed: game.elapsed,
        });
        let stars = calculate_stars(score);
        self.finished = true;
        game.status = GameStatus::Victory;
        out_events.push(Event::Victory { score, stars });
        tracing::info!(score, stars, elapsed = game.elapsed, "victory");
    }
}
