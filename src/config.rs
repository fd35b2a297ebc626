use std::{env, str::FromStr};

use crate::{nearby::{DEFAULT_PAGE_SIZE, DEFAULT_RADIUS_METERS}, BlogsphereError, Result};

pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub bind_addr: String,

    pub default_radius_meters: f64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_database: "blogsphere".to_string(),
            bind_addr: "127.0.0.1:5000".to_string(),
            default_radius_meters: DEFAULT_RADIUS_METERS,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            mongodb_uri: lookup("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            mongodb_database: lookup("MONGODB_DATABASE").unwrap_or(defaults.mongodb_database),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            default_radius_meters: parsed(&lookup, "DEFAULT_RADIUS_METERS", defaults.default_radius_meters)?,
            default_page_size: parsed(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parsed(&lookup, "MAX_PAGE_SIZE", defaults.max_page_size)?,
        };

        if !config.default_radius_meters.is_finite() || config.default_radius_meters < 0.0 {
            return Err(BlogsphereError::Config(format!(
                "DEFAULT_RADIUS_METERS must be a non-negative number, got {}", config.default_radius_meters
            )));
        }
        if config.max_page_size == 0 || config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            return Err(BlogsphereError::Config(format!(
                "need 1 <= DEFAULT_PAGE_SIZE ({}) <= MAX_PAGE_SIZE ({})", config.default_page_size, config.max_page_size
            )));
        }

        Ok(config)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            BlogsphereError::Config(format!("{key} has malformed value '{raw}'"))
        }),
    }
}
