use std::{
    env,
    fmt::{self, Display},
    str::FromStr,
    sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;

const DEFAULT_CAPACITY: usize = 20;
const DEFAULT_ITEM_COUNT: u32 = 9;
const DEFAULT_INDEXES: &str = "0,7,0,1,2,0,1,2,0,1,2";
const DEFAULT_FILL_VALUE: u32 = 1;

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) capacity: usize,
    pub(crate) item_count: u32,
    pub(crate) indexes: Vec<usize>,
    pub(crate) fill_value: u32,
}

impl Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity={} item_count={} indexes={:?} fill_value={}",
            self.capacity, self.item_count, self.indexes, self.fill_value
        )
    }
}

/// Reads the demo configuration from the environment once.
pub(crate) fn get() -> Result<&'static Config> {
    static CELL: OnceLock<Config> = OnceLock::new();

    if let Some(config) = CELL.get() {
        return Ok(config);
    }

    let config = Config::from_lookup(|name| env::var(name).ok())?;
    info!(%config, "initialized config");
    Ok(CELL.get_or_init(|| config))
}

impl Config {
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let indexes = lookup("RING_INDEXES").unwrap_or_else(|| DEFAULT_INDEXES.to_owned());

        Ok(Self {
            capacity: parse_or(&lookup, "RING_CAPACITY", DEFAULT_CAPACITY)?,
            item_count: parse_or(&lookup, "RING_ITEM_COUNT", DEFAULT_ITEM_COUNT)?,
            indexes: parse_indexes(&indexes).context("invalid RING_INDEXES")?,
            fill_value: parse_or(&lookup, "RING_FILL_VALUE", DEFAULT_FILL_VALUE)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid {name}: {value:?}")),
        None => Ok(default),
    }
}

fn parse_indexes(value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().with_context(|| format!("not an index: {s:?}")))
        .collect()
}
