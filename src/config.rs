use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_LEVELS_DIR, DEFAULT_TICK_SECS, ENV_LEVELS_DIR, ENV_SEED, ENV_SPEED, MAX_TICK_SECS,
    MIN_TICK_SECS,
};
use crate::error::ConfigError;

/// Seconds per simulation tick, within `[0.1, 1.0]`. Lower is faster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickSpeed(f64);

impl TickSpeed {
    pub fn new(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || !(MIN_TICK_SECS..=MAX_TICK_SECS).contains(&secs) {
            return Err(ConfigError::SpeedOutOfRange(secs));
        }
        Ok(Self(secs))
    }

    pub fn clamped(secs: f64) -> Self {
        if secs.is_nan() {
            return Self::default();
        }
        Self(secs.clamp(MIN_TICK_SECS, MAX_TICK_SECS))
    }

    pub fn secs(self) -> f64 {
        self.0
    }

    /// Whole-millisecond tick period.
    pub fn interval(self) -> Duration {
        Duration::from_millis((self.0 * 1000.0).round() as u64)
    }
}

impl Default for TickSpeed {
    fn default() -> Self {
        Self(DEFAULT_TICK_SECS)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub speed: TickSpeed,
    pub levels_dir: PathBuf,
    pub seed: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            speed: TickSpeed::default(),
            levels_dir: PathBuf::from(DEFAULT_LEVELS_DIR),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each known key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SPEED) {
            let secs = raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_SPEED,
                value: raw.clone(),
            })?;
            config.speed = TickSpeed::new(secs)?;
        }
        if let Some(raw) = lookup(ENV_LEVELS_DIR) {
            if !raw.trim().is_empty() {
                config.levels_dir = PathBuf::from(raw);
            }
        }
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_SEED,
                value: raw.clone(),
            })?;
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn speed_accepts_bounds_and_rejects_outside() {
        assert!(TickSpeed::new(0.1).is_ok());
        assert!(TickSpeed::new(1.0).is_ok());
        assert_eq!(TickSpeed::new(0.05), Err(ConfigError::SpeedOutOfRange(0.05)));
        assert!(TickSpeed::new(1.5).is_err());
        assert!(TickSpeed::new(f64::NAN).is_err());
    }

    #[test]
    fn clamped_speed_saturates() {
        assert_eq!(TickSpeed::clamped(0.0).secs(), 0.1);
        assert_eq!(TickSpeed::clamped(3.0).secs(), 1.0);
        assert_eq!(TickSpeed::clamped(f64::NAN), TickSpeed::default());
    }

    #[test]
    fn default_speed_is_point_three_seconds() {
        assert_eq!(TickSpeed::default().interval(), Duration::from_millis(300));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = GameConfig::from_lookup(lookup_from(&[
            (ENV_SPEED, "0.5"),
            (ENV_LEVELS_DIR, "/tmp/levels"),
            (ENV_SEED, "42"),
        ]))
        .expect("config should load");
        assert_eq!(config.speed.secs(), 0.5);
        assert_eq!(config.levels_dir, PathBuf::from("/tmp/levels"));
        assert_eq!(config.seed, Some(42));

        let config = GameConfig::from_lookup(lookup_from(&[])).expect("config should load");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn invalid_environment_values_are_reported() {
        let err = GameConfig::from_lookup(lookup_from(&[(ENV_SEED, "abc")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_SEED,
                value: "abc".to_string()
            }
        );
        let err = GameConfig::from_lookup(lookup_from(&[(ENV_SPEED, "9")])).unwrap_err();
        assert_eq!(err, ConfigError::SpeedOutOfRange(9.0));
    }
}
