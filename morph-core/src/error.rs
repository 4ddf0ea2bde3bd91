//! Validation errors raised before a morph run starts.
//!
//! All variants describe rejected input; nothing in here is produced once
//! the relaxation loop is running. Running out of iterations is a normal
//! outcome, not an error (see [`crate::morph::MorphOutcome`]).

use std::error::Error;
use std::fmt;

use crate::types::NodeId;

/// Errors from input validation in [`crate::morph::morph`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MorphError {
    /// The node position array is empty.
    EmptyGrid,
    /// The POI set is empty; nearest-POI search needs at least one target.
    EmptyPois,
    /// An edge references a node index outside `[0, node_count)`.
    EdgeOutOfRange {
        a: NodeId,
        b: NodeId,
        node_count: usize,
    },
    /// A force coefficient (`alpha` or `beta`) is negative.
    NegativeCoefficient { name: &'static str, value: f32 },
    /// The convergence threshold is zero or negative.
    NonPositiveThreshold { value: f32 },
    /// A step clamp was given but is zero or negative.
    NonPositiveMaxStep { value: f32 },
    /// The iteration budget is zero; the engine must run at least once.
    ZeroMaxIter,
}

impl fmt::Display for MorphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid is empty"),
            Self::EmptyPois => write!(f, "POI set is empty"),
            Self::EdgeOutOfRange { a, b, node_count } => {
                write!(f, "edge ({a}, {b}) references a node outside [0, {node_count})")
            }
            Self::NegativeCoefficient { name, value } => {
                write!(f, "{name} must be >= 0, got {value}")
            }
            Self::NonPositiveThreshold { value } => {
                write!(f, "threshold must be > 0, got {value}")
            }
            Self::NonPositiveMaxStep { value } => {
                write!(f, "max_step must be > 0 when set, got {value}")
            }
            Self::ZeroMaxIter => write!(f, "max_iter must be >= 1"),
        }
    }
}

impl Error for MorphError {}
