use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::{
    matching::{MATCH_THRESHOLD, Weights},
    store::StatusPolicy,
};

pub const DEFAULT_CANDIDATE_PAGE_SIZE: usize = 500;
pub const DEFAULT_APP_URL: &str = "http://localhost:8000";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    NotPositive { key: &'static str },
    #[error("{key} must not be negative")]
    Negative { key: &'static str },
}

/// Settings for one matching engine instance, resolved once and passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub weights: Weights,
    pub threshold: i32,
    pub candidate_page_size: usize,
    pub status_policy: StatusPolicy,
    pub app_url: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            threshold: MATCH_THRESHOLD,
            candidate_page_size: DEFAULT_CANDIDATE_PAGE_SIZE,
            status_policy: StatusPolicy::default(),
            app_url: DEFAULT_APP_URL.into(),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// A single weight: finite and not negative.
fn parse_weight(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    let weight: f64 = parse_var(lookup, key, default)?;
    if !weight.is_finite() {
        return Err(ConfigError::InvalidValue {
            key,
            value: weight.to_string(),
        });
    }
    if weight < 0.0 {
        return Err(ConfigError::Negative { key });
    }
    Ok(weight)
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        },
    }
}

impl MatchingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let weights = Weights {
            skills: parse_weight(&lookup, "HS_MATCH_WEIGHT_SKILLS", defaults.weights.skills)?,
            salary: parse_weight(&lookup, "HS_MATCH_WEIGHT_SALARY", defaults.weights.salary)?,
            location: parse_weight(&lookup, "HS_MATCH_WEIGHT_LOCATION", defaults.weights.location)?,
        };
        if !weights.is_normalized() {
            warn!(
                skills = weights.skills,
                salary = weights.salary,
                location = weights.location,
                sum = weights.sum(),
                "matching weights do not sum to 1.0"
            );
        }

        let candidate_page_size = parse_var(
            &lookup,
            "HS_MATCH_CANDIDATE_PAGE_SIZE",
            defaults.candidate_page_size,
        )?;
        if candidate_page_size == 0 {
            return Err(ConfigError::NotPositive {
                key: "HS_MATCH_CANDIDATE_PAGE_SIZE",
            });
        }

        let status_policy = if parse_bool(&lookup, "HS_MATCH_RESET_STATUS_ON_RESCORE", false)? {
            StatusPolicy::ResetToPending
        } else {
            StatusPolicy::PreserveOnUpdate
        };

        Ok(Self {
            weights,
            threshold: parse_var(&lookup, "HS_MATCH_THRESHOLD", defaults.threshold)?,
            candidate_page_size,
            status_policy,
            app_url: lookup("HS_APP_URL").unwrap_or(defaults.app_url),
        })
    }
}
