//! Construction configuration.
//!
//! Everything is optional and coerced, never rejected: a host may pass a
//! partial or out-of-range object and still get a playable board.

use serde::{Deserialize, Serialize};

/// Default palette keys, in type-index order.
pub const DEFAULT_GEM_KEYS: [&str; 4] = ["red", "green", "blue", "yellow"];

pub const DEFAULT_ROWS: usize = 8;
pub const DEFAULT_COLS: usize = 8;
pub const MIN_DIMENSION: usize = 3;
/// Keeps `rows * cols` small enough to allocate on every target.
pub const MAX_DIMENSION: usize = 255;
pub const MIN_COLORS: usize = 3;

/// Upper bound imposed by `GemType = u8`.
const MAX_COLORS: usize = u8::MAX as usize;

const DEFAULT_MARGIN_X: f64 = 24.0;
const DEFAULT_OFFSET_Y_RATIO: f64 = 0.22;

/// Palette selection: a count of default keys or an explicit key list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorsConfig {
    Count(f64),
    Keys(Vec<String>),
}

/// Raw board configuration as handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    pub rows: Option<f64>,
    pub cols: Option<f64>,
    pub colors: Option<ColorsConfig>,
    pub margin_x: Option<f64>,
    pub offset_y_ratio: Option<f64>,
    /// Fixed seed for deterministic replay. System entropy when absent.
    pub seed: Option<u64>,
}

/// Values only the rendering collaborator consumes. Passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub margin_x: f64,
    pub offset_y_ratio: f64,
}

/// Coerced, always-valid settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub gem_keys: Vec<String>,
    pub presentation: Presentation,
    pub seed: Option<u64>,
}

impl Settings {
    #[inline(always)]
    pub fn palette_len(&self) -> usize {
        self.gem_keys.len()
    }
}

impl Default for Settings {
    fn default() -> Self {
        BoardConfig::default().resolve()
    }
}

impl BoardConfig {
    /// Coerce to the nearest valid settings.
    pub fn resolve(&self) -> Settings {
        Settings {
            rows: coerce_dimension(self.rows, DEFAULT_ROWS),
            cols: coerce_dimension(self.cols, DEFAULT_COLS),
            gem_keys: resolve_gem_keys(self.colors.as_ref()),
            presentation: Presentation {
                margin_x: finite_or(self.margin_x, DEFAULT_MARGIN_X),
                offset_y_ratio: finite_or(self.offset_y_ratio, DEFAULT_OFFSET_Y_RATIO),
            },
            seed: self.seed,
        }
    }
}

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

fn coerce_dimension(value: Option<f64>, default: usize) -> usize {
    let floored = finite_or(value, default as f64).floor();
    floored.clamp(MIN_DIMENSION as f64, MAX_DIMENSION as f64) as usize
}

fn resolve_gem_keys(colors: Option<&ColorsConfig>) -> Vec<String> {
    let defaults = || DEFAULT_GEM_KEYS.iter().map(|k| k.to_string());
    match colors {
        Some(ColorsConfig::Keys(keys)) => {
            let mut keys: Vec<String> = keys.iter().take(MAX_COLORS).cloned().collect();
            // A palette below three types can cascade forever on refill.
            for key in defaults() {
                if keys.len() >= MIN_COLORS {
                    break;
                }
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        }
        Some(ColorsConfig::Count(count)) => {
            let count = if count.is_finite() { count.floor() } else { DEFAULT_GEM_KEYS.len() as f64 };
            let count = count.clamp(MIN_COLORS as f64, DEFAULT_GEM_KEYS.len() as f64) as usize;
            defaults().take(count).collect()
        }
        None => defaults().collect(),
    }
}
