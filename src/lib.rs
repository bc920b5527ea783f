//! Read-only decoders for Unreal Engine's two container formats: the legacy
//! `.pak` archive and the modern IoStore `.utoc` table of contents.
//!
//! Both decoders follow the same pipeline: a version probe (or declared
//! version, for UTOC) selects how to read a fixed region, then a
//! variable-length region is decoded into an immutable in-memory model.
//! Neither decoder extracts, decompresses, or decrypts chunk content — they
//! surface the descriptors a caller needs to do that itself.
//!
//! ```no_run
//! # fn main() -> pakio::Result<()> {
//! let pak = pakio::PakReader::open("Game.pak")?;
//! for path in pak.files() {
//!     println!("{path}");
//! }
//!
//! let toc = pakio::TocReader::open("Game.utoc")?;
//! for path in toc.all_file_paths()? {
//!     println!("{path}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod error;
pub mod pak;
pub mod utoc;

pub use cursor::PrimitiveRead;
pub use error::{Error, Result};
pub use pak::{PakEntry, PakFooter, PakReader, PakVersion};
pub use utoc::{ContainerFlags, TocHeader, TocReader, TocVersion};
