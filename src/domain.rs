//! Domain models for mokuro volumes.
//!
//! This module contains the document tree (volume, pages, blocks, line
//! translations and words), the runtime [`Volume`] aggregate and the loader
//! configuration.

/// Text blocks and their per-line word annotations.
pub mod block;
pub use block::{Block, BoundingBox, InvalidBlock, LineTranslation, Word};

mod config;
pub use config::Config;

/// Pages and the per-volume metadata bundle.
pub mod page;
pub use page::{MokuroData, Page};

/// The runtime volume aggregate and its consistency checks.
pub mod volume;
pub use volume::{Issue, ValidationError, Volume, VolumeFile};
