//! Legacy PAK archive decoder.

pub mod compression;
pub mod entry;
pub mod footer;
pub mod index;
pub mod reader;
pub mod version;

pub use compression::CompressionMethodName;
pub use entry::{PakBlock, PakEntry};
pub use footer::{PakFooter, PAK_MAGIC};
pub use index::PakIndex;
pub use reader::PakReader;
pub use version::PakVersion;
