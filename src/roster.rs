//! Rider roster: loaded once from JSON, filtered to riders with at least one
//! scheduled race, cached process-wide, never mutated after first load.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_ROSTER_PATH: &str = "config/roster.json";
pub const ENV_ROSTER_PATH: &str = "ROSTER_PATH";

/// A rider as used by the matcher. Name fields are derived once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub id: String,
    pub name: String,
    /// Final whitespace-delimited token of `name`.
    pub last_name: String,
    pub team: String,
    #[serde(skip)]
    pub full_name_lower: String,
    #[serde(skip)]
    pub last_name_lower: String,
}

impl Rider {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: impl Into<String>) -> Self {
        let id = id.into();
        let name = name.into();
        let team = team.into();
        let last_name = name
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_string();
        let full_name_lower = name.to_lowercase();
        let last_name_lower = last_name.to_lowercase();
        Self {
            id,
            name,
            last_name,
            team,
            full_name_lower,
            last_name_lower,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRider {
    id: String,
    name: String,
    team: String,
    #[serde(default)]
    num_races: u32,
}

fn build(raw: Vec<RawRider>) -> Vec<Rider> {
    raw.into_iter()
        .filter(|r| r.num_races > 0)
        .map(|r| Rider::new(r.id, r.name, r.team))
        .collect()
}

/// Load the roster from a JSON file. Falls back to the built-in seed on any
/// read or parse error; an unreadable roster should degrade, not abort.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Vec<Rider> {
    match fs::read_to_string(path.as_ref()) {
        Ok(s) => match serde_json::from_str::<Vec<RawRider>>(&s) {
            Ok(raw) => build(raw),
            Err(e) => {
                tracing::warn!(error = ?e, path = %path.as_ref().display(), "roster parse failed, using seed");
                default_seed()
            }
        },
        Err(e) => {
            tracing::warn!(error = ?e, path = %path.as_ref().display(), "roster read failed, using seed");
            default_seed()
        }
    }
}

/// Built-in roster seed: the embedded `config/roster.json`.
pub fn default_seed() -> Vec<Rider> {
    let raw = include_str!("../config/roster.json");
    let parsed: Vec<RawRider> = serde_json::from_str(raw).expect("valid embedded roster");
    build(parsed)
}

/// Process-wide cached roster handle. Path resolution: `$ROSTER_PATH`, then
/// `config/roster.json`, then the embedded seed.
pub fn load_cached() -> Arc<Vec<Rider>> {
    static CACHE: OnceCell<Arc<Vec<Rider>>> = OnceCell::new();
    CACHE
        .get_or_init(|| {
            let path =
                std::env::var(ENV_ROSTER_PATH).unwrap_or_else(|_| DEFAULT_ROSTER_PATH.to_string());
            let riders = load_from_file(&path);
            info!(count = riders.len(), "roster loaded");
            Arc::new(riders)
        })
        .clone()
}
