use std::{env, path::PathBuf};

use crate::candidates::LengthRange;
use crate::error::{Error, Result};
use crate::search::SolveOptions;

const ENV_WORDS: &str = "GRIDFILL_WORDS";
const ENV_LETTERS: &str = "GRIDFILL_LETTERS";
const ENV_LIMIT: &str = "GRIDFILL_LIMIT";
const ENV_MAX_DEPTH: &str = "GRIDFILL_MAX_DEPTH";
const ENV_MIN_LEN: &str = "GRIDFILL_MIN_LEN";
const ENV_MAX_LEN: &str = "GRIDFILL_MAX_LEN";
const ENV_CASE_SENSITIVE: &str = "GRIDFILL_CASE_SENSITIVE";

const DEFAULT_WORDS: &str = "words.txt";
const DEFAULT_LIMIT: usize = 10;

/// Settings for the command-line filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub word_list: PathBuf,
    pub letters: Option<String>,
    pub lengths: LengthRange,
    pub options: SolveOptions,
    pub case_sensitive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            word_list: PathBuf::from(DEFAULT_WORDS),
            letters: None,
            lengths: LengthRange::default(),
            options: SolveOptions::with_limit(DEFAULT_LIMIT),
            case_sensitive: false,
        }
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| {
        Error::InvalidConfiguration(format!(
            "{} must be a non-negative integer, got {:?}",
            key, value
        ))
    })
}

/// `all`/`none` (or nothing) means no bound.
fn parse_bound(key: &str, value: &str) -> Result<Option<usize>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "all" | "none" => Ok(None),
        _ => parse_count(key, value).map(Some),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::InvalidConfiguration(format!(
            "{} must be a boolean, got {:?}",
            key, value
        ))),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key/value source, falling back to defaults for missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_WORDS).filter(|path| !path.trim().is_empty()) {
            config.word_list = PathBuf::from(path);
        }
        if let Some(letters) = lookup(ENV_LETTERS) {
            let letters = letters.trim();
            config.letters = (!letters.is_empty()).then(|| letters.to_string());
        }
        if let Some(limit) = lookup(ENV_LIMIT) {
            config.options.limit = parse_bound(ENV_LIMIT, &limit)?;
        }
        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            config.options.max_depth = parse_bound(ENV_MAX_DEPTH, &depth)?;
        }

        let min = match lookup(ENV_MIN_LEN) {
            Some(min) => parse_count(ENV_MIN_LEN, &min)?,
            None => config.lengths.min(),
        };
        let max = match lookup(ENV_MAX_LEN) {
            Some(max) => parse_bound(ENV_MAX_LEN, &max)?,
            None => config.lengths.max(),
        };
        config.lengths = LengthRange::new(min, max)?;

        if let Some(flag) = lookup(ENV_CASE_SENSITIVE) {
            config.case_sensitive = parse_flag(ENV_CASE_SENSITIVE, &flag)?;
        }

        Ok(config)
    }
}
