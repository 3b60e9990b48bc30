//! TOML scenario files.
//!
//! ```toml
//! [arena]
//! columns = 16
//! rows = 12
//! cell_size = 10
//! obstacle_percent = 18
//! seed_phrase = "rally"
//! level = 1
//!
//! [body]
//! diameter = 4
//!
//! [query]
//! start = [1, 1]
//! end = [14, 10]
//! sweep = true
//! ```
//!
//! Lengths are whole game units. Every field may be omitted.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use rally_core::CellCoord;
use serde::Deserialize;

/// Complete scenario description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScenarioConfig {
    /// Arena generation settings.
    pub(crate) arena: ArenaConfig,
    /// Moving body settings.
    pub(crate) body: BodyConfig,
    /// Route query settings.
    pub(crate) query: QueryConfig,
}

/// Arena generation settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ArenaConfig {
    /// Columns including the border.
    pub(crate) columns: u32,
    /// Rows including the border.
    pub(crate) rows: u32,
    /// Side of one arena cell in game units.
    pub(crate) cell_size: i64,
    /// Interior obstacle chance in percent.
    pub(crate) obstacle_percent: u8,
    /// Campaign phrase the level seed is derived from.
    pub(crate) seed_phrase: String,
    /// Level index within the campaign.
    pub(crate) level: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 12,
            cell_size: 10,
            obstacle_percent: 18,
            seed_phrase: "rally".to_owned(),
            level: 1,
        }
    }
}

/// Moving body settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BodyConfig {
    /// Body diameter in game units.
    pub(crate) diameter: i64,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self { diameter: 4 }
    }
}

/// Route query settings. Unset endpoints fall back to the arena's spawn
/// corners.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct QueryConfig {
    /// Arena cell the route starts from as `[column, row]`.
    pub(crate) start: Option<[u32; 2]>,
    /// Arena cell the route ends at as `[column, row]`.
    pub(crate) end: Option<[u32; 2]>,
    /// Whether to sweep the body along the planned route.
    pub(crate) sweep: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            sweep: true,
        }
    }
}

impl QueryConfig {
    pub(crate) fn start_cell(&self) -> Option<CellCoord> {
        self.start.map(|[column, row]| CellCoord::new(column, row))
    }

    pub(crate) fn end_cell(&self) -> Option<CellCoord> {
        self.end.map(|[column, row]| CellCoord::new(column, row))
    }
}

impl ScenarioConfig {
    /// Reads and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario file {}", path.display()))
    }

    /// Parses and validates scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.arena.cell_size <= 0 {
            bail!("cell_size must be positive, got {}", self.arena.cell_size);
        }
        if self.body.diameter < 0 {
            bail!("body diameter must not be negative, got {}", self.body.diameter);
        }
        if self.body.diameter > self.arena.cell_size {
            bail!(
                "body diameter {} does not fit through a cell of size {}",
                self.body.diameter,
                self.arena.cell_size
            );
        }
        Ok(())
    }
}
