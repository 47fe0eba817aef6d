pub mod library;
pub mod mokuro_file;
mod volume;

pub use library::{Library, LibraryLoadError};
pub use mokuro_file::DecodeError;
pub use volume::VolumeLoadError;
