use std::time::Duration;

use anyhow::Context;
use common::{Config, ConfigLoader};
use serde::{Deserialize, Serialize};

use crate::{MctsError, Result};

/// Budget and tuning for a search.
///
/// At least one of `iterations` or `time` must be set. When both are set the search stops at
/// whichever is reached first.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub exploration_constant: f32,
    pub iterations: Option<usize>,
    pub time: Option<Duration>,
    pub seed: Option<u64>,
    pub parallelism: usize,
}

impl SearchConfig {
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            iterations: Some(iterations),
            ..Default::default()
        }
    }

    pub fn with_time(time: Duration) -> Self {
        Self {
            time: Some(time),
            ..Default::default()
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn exploration_constant(mut self, exploration_constant: f32) -> Self {
        self.exploration_constant = exploration_constant;
        self
    }

    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations.is_none() && self.time.is_none() {
            return Err(MctsError::Configuration(
                "either an iteration or a time budget must be set".to_string(),
            ));
        }

        if self.iterations == Some(0) {
            return Err(MctsError::Configuration(
                "the iteration budget must be positive".to_string(),
            ));
        }

        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(MctsError::Configuration(format!(
                "the exploration constant must be a non-negative number, got {}",
                self.exploration_constant
            )));
        }

        if self.parallelism == 0 {
            return Err(MctsError::Configuration(
                "parallelism must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: std::f32::consts::SQRT_2,
            iterations: None,
            time: None,
            seed: None,
            parallelism: 1,
        }
    }
}

impl Config for SearchConfig {
    fn load(config: &ConfigLoader) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let search_config = Self {
            exploration_constant: config
                .get("exploration_constant")
                .and_then(|v| v.as_f32())
                .unwrap_or(defaults.exploration_constant),
            iterations: config.get("iterations").and_then(|v| v.as_usize()),
            time: config
                .get("time_ms")
                .and_then(|v| v.as_u64())
                .map(Duration::from_millis),
            seed: config.get("seed").and_then(|v| v.as_u64()),
            parallelism: config
                .get("parallelism")
                .and_then(|v| v.as_usize())
                .unwrap_or(defaults.parallelism),
        };

        search_config
            .validate()
            .context("Loaded search config is invalid")?;

        Ok(search_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exploration_constant_is_sqrt_2() {
        assert_eq!(
            SearchConfig::default().exploration_constant,
            std::f32::consts::SQRT_2
        );
    }

    #[test]
    fn test_no_budget_is_a_configuration_error() {
        let res = SearchConfig::default().validate();

        assert!(matches!(res, Err(MctsError::Configuration(_))));
    }

    #[test]
    fn test_negative_exploration_constant_is_a_configuration_error() {
        let res = SearchConfig::with_iterations(10)
            .exploration_constant(-0.1)
            .validate();

        assert!(matches!(res, Err(MctsError::Configuration(_))));
    }

    #[test]
    fn test_zero_iterations_is_a_configuration_error() {
        let res = SearchConfig::with_iterations(0).validate();

        assert!(matches!(res, Err(MctsError::Configuration(_))));
    }

    #[test]
    fn test_zero_exploration_constant_is_valid() {
        let res = SearchConfig::with_time(Duration::from_millis(5))
            .exploration_constant(0.0)
            .validate();

        assert_eq!(res, Ok(()));
    }

    #[test]
    fn test_load_from_hocon() {
        let loader = ConfigLoader::from_str(
            r#"
            search {
                iterations = 5000
                time_ms = 250
                seed = 42
                exploration_constant = 0.7
            }
            "#,
            "search".to_string(),
        )
        .unwrap();

        let config: SearchConfig = loader.load().unwrap();

        assert_eq!(config.iterations, Some(5000));
        assert_eq!(config.time, Some(Duration::from_millis(250)));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.exploration_constant, 0.7);
        assert_eq!(config.parallelism, 1);
    }

    #[test]
    fn test_load_without_budget_fails() {
        let loader = ConfigLoader::from_str("search { seed = 1 }", "search".to_string()).unwrap();

        assert!(loader.load::<SearchConfig>().is_err());
    }
}
