#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
//! The named-options configuration envelope every component (kernel,
//! tuner, evaluator) reads its recognized keys from, deserialized from
//! TOML and validated before any component sees it.
//!
//! Rather than many nested, component-specific tables, this envelope is
//! one flat table: a classifier reads `threads`/`storing`, a
//! kernel reads `r`/`w`/`epsilon`/`g`/`nu`/`lambda`, an evaluator reads
//! `stratified`/`seeds`/`percentage`/`folds`, and each simply ignores the
//! keys it has no use for.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Raw deserialization target: every field optional so a table that only
/// sets the keys one component cares about still parses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OptionsToml {
    threads: Option<usize>,
    storing: Option<bool>,
    r: Option<f64>,
    w: Option<u32>,
    epsilon: Option<f64>,
    g: Option<f64>,
    nu: Option<f64>,
    lambda: Option<f64>,
    full_parallel: Option<bool>,
    stratified: Option<bool>,
    seeds: Option<Vec<i64>>,
    percentage: Option<f64>,
    folds: Option<usize>,
}

impl Default for OptionsToml {
    fn default() -> Self {
        Self {
            threads: None,
            storing: None,
            r: None,
            w: None,
            epsilon: None,
            g: None,
            nu: None,
            lambda: None,
            full_parallel: None,
            stratified: None,
            seeds: None,
            percentage: None,
            folds: None,
        }
    }
}

/// The validated options envelope. Absent keys keep their documented
/// default (`threads = 1`, `storing = false`, `full_parallel = false`,
/// `stratified = false`); every other key stays `None` until a component
/// that understands it asks for a value and applies its own default.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub threads: usize,
    pub storing: bool,
    pub r: Option<f64>,
    pub w: Option<u32>,
    pub epsilon: Option<f64>,
    pub g: Option<f64>,
    pub nu: Option<f64>,
    pub lambda: Option<f64>,
    pub full_parallel: bool,
    pub stratified: bool,
    pub seeds: Option<Vec<i64>>,
    pub percentage: Option<f64>,
    pub folds: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            threads: 1,
            storing: false,
            r: None,
            w: None,
            epsilon: None,
            g: None,
            nu: None,
            lambda: None,
            full_parallel: false,
            stratified: false,
            seeds: None,
            percentage: None,
            folds: None,
        }
    }
}

impl TryFrom<OptionsToml> for Options {
    type Error = ConfigError;

    fn try_from(raw: OptionsToml) -> Result<Self> {
        let defaults = Options::default();
        let options = Options {
            threads: raw.threads.unwrap_or(defaults.threads),
            storing: raw.storing.unwrap_or(defaults.storing),
            r: raw.r,
            w: raw.w,
            epsilon: raw.epsilon,
            g: raw.g,
            nu: raw.nu,
            lambda: raw.lambda,
            full_parallel: raw.full_parallel.unwrap_or(defaults.full_parallel),
            stratified: raw.stratified.unwrap_or(defaults.stratified),
            seeds: raw.seeds,
            percentage: raw.percentage,
            folds: raw.folds,
        };
        options.validate()?;
        Ok(options)
    }
}

impl Options {
    /// Parse and validate a TOML options table, e.g.:
    ///
    /// ```toml
    /// threads = 4
    /// storing = true
    /// r = 0.1
    /// stratified = true
    /// seeds = [42]
    /// percentage = 70.0
    /// ```
    pub fn from_toml(s: &str) -> Result<Self> {
        let raw: OptionsToml = toml::from_str(s)?;
        Options::try_from(raw)
    }

    fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ConfigError::InvalidParameter("threads must be >= 1".into()));
        }
        if let Some(r) = self.r {
            if !(0.0..=1.0).contains(&r) {
                return Err(ConfigError::InvalidParameter(format!(
                    "r must be in [0, 1], got {r}"
                )));
            }
        }
        if let Some(epsilon) = self.epsilon {
            if epsilon < 0.0 {
                return Err(ConfigError::InvalidParameter(format!(
                    "epsilon must be >= 0, got {epsilon}"
                )));
            }
        }
        if let Some(nu) = self.nu {
            if nu < 0.0 {
                return Err(ConfigError::InvalidParameter(format!("nu must be >= 0, got {nu}")));
            }
        }
        if let Some(lambda) = self.lambda {
            if lambda < 0.0 {
                return Err(ConfigError::InvalidParameter(format!(
                    "lambda must be >= 0, got {lambda}"
                )));
            }
        }
        if let Some(percentage) = self.percentage {
            if !(0.0..=100.0).contains(&percentage) {
                return Err(ConfigError::InvalidParameter(format!(
                    "percentage must be in [0, 100], got {percentage}"
                )));
            }
        }
        if let Some(folds) = self.folds {
            if folds < 2 {
                return Err(ConfigError::InvalidParameter(format!(
                    "folds must be >= 2, got {folds}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_apply_when_table_is_empty() {
        let options = Options::from_toml("").unwrap();
        assert_eq!(options.threads, 1);
        assert!(!options.storing);
        assert!(options.seeds.is_none());
    }

    #[test]
    fn recognized_keys_round_trip() {
        let options = Options::from_toml(
            r#"
            threads = 4
            storing = true
            r = 0.1
            w = 3
            epsilon = 0.5
            g = 1.5
            nu = 0.25
            lambda = 0.1
            fullParallel = true
            stratified = true
            seeds = [1, 2, 3]
            percentage = 70.0
            folds = 5
            "#,
        )
        .unwrap();
        assert_eq!(options.threads, 4);
        assert!(options.storing);
        assert_eq!(options.r, Some(0.1));
        assert_eq!(options.w, Some(3));
        assert_eq!(options.seeds, Some(vec![1, 2, 3]));
        assert!(options.full_parallel);
        assert_eq!(options.folds, Some(5));
    }

    #[rstest]
    #[case("threads = 0")]
    #[case("r = 1.5")]
    #[case("r = -0.1")]
    #[case("epsilon = -1.0")]
    #[case("nu = -1.0")]
    #[case("lambda = -1.0")]
    #[case("percentage = 150")]
    #[case("percentage = -1")]
    #[case("folds = 1")]
    fn out_of_range_values_are_rejected(#[case] toml: &str) {
        let err = Options::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter(_)));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = Options::from_toml("threads = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
