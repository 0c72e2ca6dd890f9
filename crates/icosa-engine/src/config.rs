//! Mesh configuration, validation, and error types.
//!
//! [`MeshConfig`] is the startup description of one mesh topology: which
//! dimensions exist, how many entities each horizontal dimension has, the
//! named offsets between them, the horizontal markers that delimit boundary
//! bands, and the number of vertical levels. It is an immutable value passed
//! explicitly to whoever builds fields and programs for that mesh.

use std::error::Error;
use std::fmt;

use icosa_core::{Dimension, DimensionRegistry, EvalError};
use icosa_mesh::{Domain, DomainError, HorizontalMarkers, Offset, OffsetProvider};
use indexmap::{IndexMap, IndexSet};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`MeshConfig::validate()`] and
/// [`MeshConfig::check_provider()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No horizontal dimension is registered.
    NoHorizontal,
    /// The level count is zero.
    ZeroLevels,
    /// A dimension is used but not registered (or registered with a
    /// different kind).
    UnknownDimension {
        /// Where the dimension was referenced.
        context: String,
        /// The dimension name.
        dim: String,
    },
    /// A registered horizontal dimension has no entity count.
    MissingEntityCount {
        /// The dimension name.
        dim: String,
    },
    /// Two offsets share a name.
    DuplicateOffset {
        /// The repeated name.
        name: String,
    },
    /// A horizontal marker lies past every horizontal extent.
    MarkerOutOfRange {
        /// The marker name.
        name: String,
        /// Its position.
        position: usize,
        /// The largest horizontal extent.
        extent: usize,
    },
    /// Marker lookup failed.
    Domain(DomainError),
    /// A declared offset does not resolve in the provider.
    Provider {
        /// The offset name.
        offset: String,
        /// Why resolution failed.
        reason: EvalError,
    },
    /// A table's row count differs from its origin's entity count.
    TableExtent {
        /// The offset name.
        offset: String,
        /// Rows in the table.
        rows: usize,
        /// Entity count of the origin dimension.
        expected: usize,
    },
    /// A table entry points past its neighbour's entity count.
    NeighborOutOfRange {
        /// The offset name.
        offset: String,
        /// Row of the bad entry.
        row: usize,
        /// Slot of the bad entry.
        slot: usize,
        /// The entry.
        value: i32,
        /// Entity count of the neighbour dimension.
        count: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHorizontal => write!(f, "no horizontal dimension registered"),
            Self::ZeroLevels => write!(f, "level count must be at least 1"),
            Self::UnknownDimension { context, dim } => {
                write!(f, "{context}: dimension '{dim}' is not registered")
            }
            Self::MissingEntityCount { dim } => {
                write!(f, "horizontal dimension '{dim}' has no entity count")
            }
            Self::DuplicateOffset { name } => write!(f, "offset '{name}' declared twice"),
            Self::MarkerOutOfRange {
                name,
                position,
                extent,
            } => write!(
                f,
                "marker '{name}' at {position} exceeds the largest horizontal extent {extent}"
            ),
            Self::Domain(e) => write!(f, "domain: {e}"),
            Self::Provider { offset, reason } => write!(f, "offset '{offset}': {reason}"),
            Self::TableExtent {
                offset,
                rows,
                expected,
            } => write!(
                f,
                "offset '{offset}' table has {rows} rows, expected {expected}"
            ),
            Self::NeighborOutOfRange {
                offset,
                row,
                slot,
                value,
                count,
            } => write!(
                f,
                "offset '{offset}' row {row} slot {slot} holds {value}, outside [-1, {count})"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Provider { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<DomainError> for ConfigError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

// ── MeshConfig ─────────────────────────────────────────────────────

/// Complete description of one mesh topology.
#[derive(Clone, Debug)]
pub struct MeshConfig {
    /// Every dimension fields and offsets may use.
    pub dimensions: DimensionRegistry,
    /// Entity count per horizontal dimension, keyed by dimension name.
    pub entity_counts: IndexMap<String, usize>,
    /// Offsets the mesh provides tables for.
    pub offsets: Vec<Offset>,
    /// Named horizontal positions delimiting boundary bands.
    pub markers: HorizontalMarkers,
    /// Number of vertical levels.
    pub levels: usize,
}

impl MeshConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. At least one horizontal dimension, each with a count.
        if self.dimensions.horizontal().next().is_none() {
            return Err(ConfigError::NoHorizontal);
        }
        for dim in self.dimensions.horizontal() {
            if !self.entity_counts.contains_key(dim.name()) {
                return Err(ConfigError::MissingEntityCount {
                    dim: dim.name().to_string(),
                });
            }
        }
        // 2. Counts only for registered horizontal dimensions.
        for name in self.entity_counts.keys() {
            let known = self
                .dimensions
                .get(name)
                .is_some_and(Dimension::is_horizontal);
            if !known {
                return Err(ConfigError::UnknownDimension {
                    context: "entity counts".to_string(),
                    dim: name.clone(),
                });
            }
        }
        // 3. Levels.
        if self.levels == 0 {
            return Err(ConfigError::ZeroLevels);
        }
        // 4. Offsets reference registered dimensions and have unique names.
        let mut seen = IndexSet::new();
        for offset in &self.offsets {
            if !seen.insert(offset.name()) {
                return Err(ConfigError::DuplicateOffset {
                    name: offset.name().to_string(),
                });
            }
            for dim in [offset.source(), offset.target(), offset.local()] {
                if !self.dimensions.contains(dim) {
                    return Err(ConfigError::UnknownDimension {
                        context: format!("offset '{}'", offset.name()),
                        dim: dim.name().to_string(),
                    });
                }
            }
        }
        // 5. Markers fit the mesh.
        let extent = self.entity_counts.values().copied().max().unwrap_or(0);
        for (name, position) in self.markers.iter() {
            if position > extent {
                return Err(ConfigError::MarkerOutOfRange {
                    name: name.to_string(),
                    position,
                    extent,
                });
            }
        }
        Ok(())
    }

    /// Entity count of a horizontal dimension.
    pub fn entity_count(&self, dim: &Dimension) -> Option<usize> {
        self.entity_counts.get(dim.name()).copied()
    }

    /// The declared offset called `name`.
    pub fn offset(&self, name: &str) -> Option<&Offset> {
        self.offsets.iter().find(|o| o.name() == name)
    }

    /// The upward domain covering `[start, end)` between two markers.
    pub fn band(&self, start: &str, end: &str) -> Result<Domain, ConfigError> {
        Ok(Domain::upward().across(self.markers.band(start, end)?))
    }

    /// Check that `provider` has a well-formed table for every declared
    /// offset.
    ///
    /// Tables must have one row per origin entity and every entry must be
    /// the skip value or a valid neighbour index.
    pub fn check_provider(&self, provider: &OffsetProvider) -> Result<(), ConfigError> {
        for offset in &self.offsets {
            let table = provider
                .resolve(offset)
                .map_err(|reason| ConfigError::Provider {
                    offset: offset.name().to_string(),
                    reason,
                })?;
            let rows = self.entity_count(offset.target()).unwrap_or(0);
            if table.rows() != rows {
                return Err(ConfigError::TableExtent {
                    offset: offset.name().to_string(),
                    rows: table.rows(),
                    expected: rows,
                });
            }
            let count = self.entity_count(offset.source()).unwrap_or(0);
            if let Some(bad) = table.first_out_of_range(0..rows, count) {
                return Err(ConfigError::NeighborOutOfRange {
                    offset: offset.name().to_string(),
                    row: bad.row,
                    slot: bad.slot,
                    value: bad.value,
                    count,
                });
            }
        }
        Ok(())
    }
}
