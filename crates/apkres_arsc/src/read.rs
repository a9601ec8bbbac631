//! Types for reading resource tables
//!

use bon::Builder;
use std::fmt::{self, Debug};
use tracing::{debug, instrument, trace};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{FormatError, Result},
    pool::{self, StringPool},
    types::{read_u32, ChunkHeader, ChunkType, Package, StringPoolHeader},
    utf16::SurrogatePolicy,
};

/// Size of the resource table chunk header, the global string pool follows it
pub const TABLE_HEADER_SIZE: usize = 12;

/// Options controlling how a table is decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct DecodeOptions {
    /// How unpaired UTF-16 surrogates are handled, applied to every string
    #[builder(default)]
    pub surrogates: SurrogatePolicy,
}

/// How the data of a single string ended
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StringEnd {
    /// The declared length was reached
    Length,
    /// A terminator came before the declared length
    Terminator,
    /// The string data ran into the end of its chunk
    Boundary,
}

/// Progress reported to a trace callback while decoding
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A chunk header was read at `offset`
    Chunk {
        /// Offset of the chunk from the start of the input
        offset: usize,
        /// The header that was read
        header: ChunkHeader,
    },

    /// The string pool specific header fields were read
    StringPoolHeader {
        /// Offset of the pool chunk from the start of the input
        offset: usize,
        /// The fields that were read
        header: StringPoolHeader,
    },

    /// A string was decoded
    String {
        /// Index of the string in the pool
        index: usize,
        /// Offset of the string's length prefix from the start of the input
        offset: usize,
        /// Length declared by the prefix, in code units
        declared: usize,
        /// How the data ended
        end: StringEnd,
    },

    /// Fewer package chunks than declared could be found
    PackagesIncomplete {
        /// Offset where the search stopped
        offset: usize,
        /// Number of packages declared by the table header
        declared: u32,
        /// Number of packages found
        found: usize,
    },
}

/// Forwards [`TraceEvent`]s to `tracing` and to an optional caller callback
#[derive(Clone, Copy, Default)]
pub(crate) struct Tracer<'a> {
    callback: Option<&'a dyn Fn(&TraceEvent)>,
}

impl Tracer<'_> {
    pub(crate) fn emit(&self, event: TraceEvent) {
        trace!(?event);
        if let Some(callback) = self.callback {
            callback(&event);
        }
    }
}

/// A decoded resource table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResourceTable {
    header: ChunkHeader,
    package_count: u32,
    string_pool: StringPool,
    packages: Vec<Package>,
}

impl ResourceTable {
    /// Decode a resource table using the default [`DecodeOptions`]
    pub fn decode(buffer: &[u8]) -> Result<ResourceTable> {
        ResourceTableDecoder::default().decode(buffer)
    }

    /// Header of the table chunk
    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Number of packages declared by the table header
    pub fn package_count(&self) -> u32 {
        self.package_count
    }

    /// The global string pool
    pub fn string_pool(&self) -> &StringPool {
        &self.string_pool
    }

    /// Package chunks found after the string pool, may be fewer than declared
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }
}

/// Resource table decoder
///
/// ```no_run
/// use apkres_arsc::{DecodeOptions, ResourceTableDecoder, SurrogatePolicy};
///
/// fn list_strings(buffer: &[u8]) -> apkres_arsc::error::Result<()> {
///     let options = DecodeOptions::builder()
///         .surrogates(SurrogatePolicy::Strict)
///         .build();
///     let trace = |event: &apkres_arsc::TraceEvent| eprintln!("{event:?}");
///
///     let table = ResourceTableDecoder::new(options)
///         .with_trace(&trace)
///         .decode(buffer)?;
///
///     for string in table.string_pool().iter() {
///         println!("{}", string);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Default)]
pub struct ResourceTableDecoder<'a> {
    options: DecodeOptions,
    trace: Option<&'a dyn Fn(&TraceEvent)>,
}

impl Debug for ResourceTableDecoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ResourceTableDecoder({:?}, trace: {})",
            self.options,
            self.trace.is_some()
        )
    }
}

impl<'a> ResourceTableDecoder<'a> {
    /// Create a decoder using `options`
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            trace: None,
        }
    }

    /// Report decoding progress to `callback`
    pub fn with_trace(mut self, callback: &'a dyn Fn(&TraceEvent)) -> Self {
        self.trace = Some(callback);
        self
    }

    /// The options this decoder uses
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a complete resource table held in `buffer`.
    #[instrument(skip_all, fields(len = buffer.len()), err)]
    pub fn decode(&self, buffer: &[u8]) -> Result<ResourceTable> {
        let tracer = self.tracer();

        let header = ChunkHeader::read_at(buffer, 0)?;
        tracer.emit(TraceEvent::Chunk { offset: 0, header });

        header.expect(ChunkType::Table)?;
        if header.total_size as usize != buffer.len() {
            return Err(FormatError::SizeMismatch {
                declared: header.total_size as u64,
                actual: buffer.len() as u64,
            }
            .into());
        }
        header.validate(0, buffer.len())?;

        let package_count = read_u32(buffer, ChunkHeader::SIZE)?;
        let string_pool = pool::decode_at(buffer, TABLE_HEADER_SIZE, &self.options, tracer)?;

        let packages_start = TABLE_HEADER_SIZE + string_pool.header().total_size as usize;
        let packages = find_packages(buffer, packages_start, package_count, tracer);

        debug!(
            package_count,
            packages = packages.len(),
            strings = string_pool.len(),
            "decoded resource table"
        );

        Ok(ResourceTable {
            header,
            package_count,
            string_pool,
            packages,
        })
    }

    /// Decode a lone string pool chunk starting at the first byte of `buffer`.
    pub fn decode_string_pool(&self, buffer: &[u8]) -> Result<StringPool> {
        pool::decode_at(buffer, 0, &self.options, self.tracer())
    }

    fn tracer(&self) -> Tracer<'a> {
        Tracer {
            callback: self.trace,
        }
    }
}

/// Decode a resource table using the default [`DecodeOptions`]
pub fn decode(buffer: &[u8]) -> Result<ResourceTable> {
    ResourceTable::decode(buffer)
}

/// Collect up to `declared` consecutive package chunks starting at `at`.
///
/// Package contents are not interpreted, so anything unexpected ends the search
/// instead of failing the decode.
fn find_packages(buffer: &[u8], mut at: usize, declared: u32, tracer: Tracer<'_>) -> Vec<Package> {
    let mut packages = Vec::new();

    while packages.len() < declared as usize {
        let Ok(header) = ChunkHeader::read_at(buffer, at) else {
            break;
        };
        tracer.emit(TraceEvent::Chunk { offset: at, header });

        if header.chunk_type != ChunkType::TablePackage
            || header.validate(at, buffer.len() - at).is_err()
        {
            break;
        }

        packages.push(Package { offset: at, header });
        at += header.total_size as usize;
    }

    if packages.len() < declared as usize {
        tracer.emit(TraceEvent::PackagesIncomplete {
            offset: at,
            declared,
            found: packages.len(),
        });
    }

    packages
}
