//! Error types for mesh topology and domain construction.

use std::fmt;

/// Errors arising from connectivity table or offset construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A dimension that must be horizontal is not.
    NotHorizontal {
        /// The offending dimension's name.
        dim: String,
    },
    /// A dimension that must be local is not.
    NotLocal {
        /// The offending dimension's name.
        dim: String,
    },
    /// A table was declared with zero neighbour slots.
    ZeroArity,
    /// The flat buffer length is not a multiple of the arity.
    RaggedTable {
        /// Buffer length.
        len: usize,
        /// Declared arity.
        arity: usize,
    },
    /// An entry is below the sentinel, or above the target count when one
    /// is known.
    InvalidEntry {
        /// Row of the entry.
        row: usize,
        /// Slot of the entry.
        slot: usize,
        /// The stored value.
        value: i32,
    },
    /// A row index does not fit the `i32` entry type.
    TooManyRows {
        /// The first unrepresentable row.
        rows: usize,
    },
    /// Transposition produced a row with more neighbours than the arity.
    ArityExceeded {
        /// The overflowing row.
        row: usize,
        /// The requested arity.
        arity: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotHorizontal { dim } => write!(f, "dimension '{dim}' is not horizontal"),
            Self::NotLocal { dim } => write!(f, "dimension '{dim}' is not local"),
            Self::ZeroArity => write!(f, "connectivity arity must be at least 1"),
            Self::RaggedTable { len, arity } => {
                write!(f, "table length {len} is not a multiple of arity {arity}")
            }
            Self::InvalidEntry { row, slot, value } => {
                write!(f, "invalid neighbour index {value} at row {row}, slot {slot}")
            }
            Self::TooManyRows { rows } => {
                write!(f, "row index {rows} does not fit a connectivity entry")
            }
            Self::ArityExceeded { row, arity } => {
                write!(f, "row {row} has more than {arity} neighbours")
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// Errors arising from horizontal marker sets and domain resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Marker positions are not strictly increasing.
    NotIncreasing {
        /// The earlier marker.
        previous: String,
        /// The marker that does not exceed it.
        name: String,
    },
    /// A marker name was declared twice.
    DuplicateMarker {
        /// The repeated name.
        name: String,
    },
    /// A marker name is not part of the set.
    UnknownMarker {
        /// The requested name.
        name: String,
    },
    /// A range whose start exceeds its end.
    Inverted {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
    },
    /// A range extends beyond the horizontal extent of the output.
    OutOfBounds {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
        /// Horizontal extent.
        extent: usize,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIncreasing { previous, name } => write!(
                f,
                "marker '{name}' must lie strictly after marker '{previous}'"
            ),
            Self::DuplicateMarker { name } => write!(f, "marker '{name}' declared twice"),
            Self::UnknownMarker { name } => write!(f, "unknown marker '{name}'"),
            Self::Inverted { start, end } => write!(f, "range [{start}, {end}) is inverted"),
            Self::OutOfBounds { start, end, extent } => write!(
                f,
                "range [{start}, {end}) exceeds horizontal extent {extent}"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
