//! Mokuro OCR-translation volumes
//!
//! A volume is a `.mokuro` metadata document describing scanned pages, the
//! text blocks detected on them and per-word translation annotations, stored
//! next to a directory of page images.

pub mod domain;
pub use domain::{
    Block, BoundingBox, Config, InvalidBlock, Issue, LineTranslation, MokuroData, Page,
    ValidationError, Volume, VolumeFile, Word,
};

/// Decoding, encoding and filesystem loading of volumes.
pub mod storage;
pub use storage::{DecodeError, Library, LibraryLoadError, VolumeLoadError};
