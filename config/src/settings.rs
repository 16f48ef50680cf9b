//! Tunable session parameters loaded from TOML.

use serde::Deserialize;

use crate::{require_positive, ConfigError, Table};

/// Session parameters shared by every stage.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSettings {
    /// Gold held when a session starts.
    pub initial_gold: u32,
    /// Maximum dam health.
    pub dam_max_hp: f32,
    /// Reference run length in seconds for the time term of the score.
    pub par_time: f32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            initial_gold: 220,
            dam_max_hp: 100.0,
            par_time: 1500.0,
        }
    }
}

impl GameSettings {
    /// Parses settings from TOML, filling omitted keys with defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every value is usable by the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(Table::Settings, "settings", "dam_max_hp", self.dam_max_hp)?;
        require_positive(Table::Settings, "settings", "par_time", self.par_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_keys_use_defaults() {
        let settings = GameSettings::from_toml_str("initial_gold = 500\n").expect("valid toml");
        assert_eq!(settings.initial_gold, 500);
        assert_eq!(settings.dam_max_hp, 100.0);
        assert_eq!(settings.par_time, 1500.0);
    }

    #[test]
    fn non_positive_dam_hp_is_rejected() {
        let error = GameSettings::from_toml_str("dam_max_hp = 0.0\n").unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidField {
                field: "dam_max_hp",
                ..
            }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = GameSettings::from_toml_str("gold = 1\n").unwrap_err();
        assert!(matches!(error, ConfigError::Settings(_)));
    }
}
