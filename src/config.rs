//! Typed construction parameters for the player and the environment.
//!
//! ```
//! use ntuple_2048::config::{BonusScope, EnvironmentConfig, PlayerConfig};
//!
//! let player = PlayerConfig { learning_rate: 0.0025, ..Default::default() };
//! assert!(player.validate().is_ok());
//!
//! let env = EnvironmentConfig { seed: Some(7), ..Default::default() };
//! assert_eq!(env.bonus_scope, BonusScope::Lifetime);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Base TD step of 0.1 split across the 32 entries updated per state.
pub const DEFAULT_LEARNING_RATE: f32 = 0.1 / 32.0;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("learning rate must be finite and positive, got {0}")]
    InvalidLearningRate(f32),
    #[error("unknown bonus scope {0:?} (expected \"lifetime\" or \"episode\")")]
    UnknownBonusScope(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Step size applied to every weight touched by a TD update.
    pub learning_rate: f32,
    /// Weights to start from; fresh zero tables when absent.
    pub load: Option<PathBuf>,
    /// Where to write the weights on shutdown.
    pub save: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { learning_rate: DEFAULT_LEARNING_RATE, load: None, save: None }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        Ok(())
    }
}

/// How long the bonus-tile budget counters live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusScope {
    /// Counters and tile bag persist across episodes.
    #[default]
    Lifetime,
    /// Counters and tile bag restart with every episode.
    Episode,
}

impl FromStr for BonusScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lifetime" => Ok(BonusScope::Lifetime),
            "episode" => Ok(BonusScope::Episode),
            _ => Err(ConfigError::UnknownBonusScope(s.to_string())),
        }
    }
}

impl fmt::Display for BonusScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusScope::Lifetime => f.write_str("lifetime"),
            BonusScope::Episode => f.write_str("episode"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// PRNG seed; drawn from OS entropy when absent.
    pub seed: Option<u64>,
    pub bonus_scope: BonusScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_learning_rate_is_split_across_entries() {
        assert_eq!(PlayerConfig::default().learning_rate, 0.1 / 32.0);
        assert!(PlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_learning_rates() {
        for bad in [0.0, -0.1, f32::NAN, f32::INFINITY] {
            let cfg = PlayerConfig { learning_rate: bad, ..Default::default() };
            assert!(matches!(cfg.validate(), Err(ConfigError::InvalidLearningRate(_))));
        }
    }

    #[test]
    fn bonus_scope_parses_case_insensitively() {
        assert_eq!("Lifetime".parse::<BonusScope>(), Ok(BonusScope::Lifetime));
        assert_eq!("episode".parse::<BonusScope>(), Ok(BonusScope::Episode));
        assert!("forever".parse::<BonusScope>().is_err());
        assert_eq!(BonusScope::Episode.to_string(), "episode");
    }

    #[test]
    fn configs_serialize_to_json() {
        let cfg = EnvironmentConfig { seed: Some(3), bonus_scope: BonusScope::Episode };
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(json, r#"{"seed":3,"bonus_scope":"episode"}"#);
        let back: EnvironmentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
