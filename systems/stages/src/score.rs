//! End-of-run score and star rating.

/// Values the score is computed from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreInputs {
    /// Dam health left.
    pub dam_hp: f32,
    /// Maximum dam health.
    pub dam_max_hp: f32,
    /// Gold held at the end.
    pub gold_remaining: u32,
    /// Initial gold plus everything earned.
    pub max_gold: u32,
    /// Reference run length in seconds.
    pub par_time: f32,
    /// Simulated seconds played.
    pub elapsed: f32,
}

/// Weighted score in `0..=100`: half for dam health, a quarter for gold
/// kept and a quarter for pace.
#[must_use]
pub fn calculate_score(inputs: ScoreInputs) -> u32 {
    let hp_term = inputs.dam_hp / inputs.dam_max_hp.max(1.0) * 50.0;
    let gold_term = if inputs.max_gold == 0 {
        0.0
    } else {
        inputs.gold_remaining as f32 / inputs.max_gold as f32 * 25.0
    };
    let time_term = inputs.par_time / inputs.elapsed.max(1.0) * 25.0;
    let total = (hp_term + gold_term + time_term).clamp(0.0, 100.0);
    total.round() as u32
}

/// Three stars from 80, two from 50, otherwise one.
#[must_use]
pub fn calculate_stars(score: u32) -> u8 {
    if score >= 80 {
        3
    } else if score >= 50 {
        2
    } else {
        1
    }
}
