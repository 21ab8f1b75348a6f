//! Frame source implementations

pub mod decoder;
pub mod directory;
pub mod memory;

pub use decoder::DecoderSource;
pub use directory::{DEFAULT_EXTENSIONS, ImageFrame, ImageSequenceSource};
pub use memory::MemorySource;
