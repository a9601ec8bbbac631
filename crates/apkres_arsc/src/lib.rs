//! This library handles decoding compiled Android resource tables (`resources.arsc`).
//!
//! # Resource Table Format Documentation
//!
//! A resource table is built from *chunks*. Every chunk starts with the same header and
//! may contain further chunks. The outermost chunk is the table itself; it is followed
//! directly by the global string pool, and then by one chunk per package.
//!
//! ## Chunk Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Type                   | 2 bytes: Kind of chunk, see [`ChunkType`]                  |
//! | 0x0002         | Header Size            | 2 bytes: Size of the chunk header                          |
//! | 0x0004         | Total Size             | 4 bytes: Size of the chunk, header included                |
//!
//! ## Table Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Chunk Header           | 8 bytes: Type `0x0002`, total size equal to the file size  |
//! | 0x0008         | Package Count          | 4 bytes: Number of package chunks in the table             |
//!
//! ## String Pool
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Chunk Header           | 8 bytes: Type `0x0001`, header size 28                     |
//! | 0x0008         | String Count           | 4 bytes: Number of strings                                 |
//! | 0x000C         | Style Count            | 4 bytes: Number of style spans                             |
//! | 0x0010         | Flags                  | 4 bytes: `0x0001` sorted, `0x0100` UTF-8                   |
//! | 0x0014         | Strings Start          | 4 bytes: Offset of the string data from the pool start     |
//! | 0x0018         | Styles Start           | 4 bytes: Offset of the style data from the pool start      |
//! | 0x001C         | Offsets                | String Count * 4 bytes: string offsets from Strings Start  |
//!
//! ### String Data
//!
//! - **UTF-8**: two length fields, the length in UTF-16 code units and the length in bytes.
//!   Each is one byte, or two bytes when the high bit of the first is set, in which case
//!   the length is `((first & 0x7F) << 8) | second`. The bytes follow, ended by a `0x00`.
//! - **UTF-16**: one length field in code units. It is one unit, or two units when the
//!   high bit of the first is set, in which case the length is
//!   `((first & 0x7FFF) << 16) | second`. The little-endian units follow, ended by `0x0000`.
//!
//! Strings are decoded until their declared length, their terminator or the end of the
//! string data, whichever comes first.
//!
//! ## Additional Information
//!
//! - **File Name**: `resources.arsc`
//! - **Endianness**: Little-endian for all multi-byte integers
//!
//! ```no_run
//! fn print_strings(path: &str) -> Result<(), Box<dyn std::error::Error>> {
//!     let buffer = std::fs::read(path)?;
//!     let table = apkres_arsc::decode(&buffer)?;
//!
//!     for string in table.string_pool().iter() {
//!         println!("{string}");
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod pool;
pub mod read;
pub mod types;
pub mod utf16;

pub use pool::StringPool;
pub use read::{
    decode, DecodeOptions, ResourceTable, ResourceTableDecoder, StringEnd, TraceEvent,
};
pub use types::{ChunkHeader, ChunkType, Package, StringPoolFlags};
pub use utf16::SurrogatePolicy;
