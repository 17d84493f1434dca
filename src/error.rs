use thiserror::Error;

use crate::polity::PolityId;
use crate::product::Product;
use crate::tile::TileId;

/// Fatal simulation failures. Any of these aborts the current turn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("unknown tile {0:?}")]
    UnknownTile(TileId),

    #[error("unknown polity {0:?}")]
    UnknownPolity(PolityId),

    #[error("no technology registered for {product:?} at level {level}")]
    UnknownTechnology { product: Product, level: usize },

    #[error("polity {0:?} controls no tiles")]
    NoHomeTile(PolityId),

    #[error("tile {tile:?} has no allocation for process {process}")]
    AllocationNotFound { tile: TileId, process: String },

    #[error("suzerain chain of {0:?} contains a cycle")]
    SuzeraintyCycle(PolityId),
}

impl SimError {
    pub fn invariant(message: impl Into<String>) -> Self {
        SimError::InvariantViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
