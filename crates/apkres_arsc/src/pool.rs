//! Decoding of string pool chunks
//!

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, instrument};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{Error, FormatError, Result},
    read::{DecodeOptions, StringEnd, TraceEvent, Tracer},
    types::{read_u16, take, ChunkHeader, ChunkType, StringPoolFlags, StringPoolHeader},
    utf16,
};

/// Size of a string pool chunk header, common header included
pub const STRING_POOL_HEADER_SIZE: usize = ChunkHeader::SIZE + StringPoolHeader::SIZE;

/// A decoded string pool
///
/// `offsets` and `strings` are index aligned, both hold exactly
/// [`StringPool::string_count`] entries.
///
/// ```
/// # fn doit(buffer: &[u8]) -> apkres_arsc::error::Result<()> {
/// let pool = apkres_arsc::StringPool::decode(buffer)?;
///
/// for (i, string) in pool.iter().enumerate() {
///     println!("{i}: {string}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StringPool {
    header: ChunkHeader,
    string_count: u32,
    style_count: u32,
    flags: StringPoolFlags,
    strings_start: u32,
    styles_start: u32,
    offsets: Vec<u32>,
    strings: Vec<String>,
}

impl StringPool {
    /// Decode a string pool chunk starting at the first byte of `buffer`.
    pub fn decode(buffer: &[u8]) -> Result<StringPool> {
        Self::decode_with(buffer, &DecodeOptions::default())
    }

    /// Decode a string pool chunk starting at the first byte of `buffer` using `options`.
    pub fn decode_with(buffer: &[u8], options: &DecodeOptions) -> Result<StringPool> {
        decode_at(buffer, 0, options, Tracer::default())
    }

    /// Header of the pool chunk
    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Number of strings declared by the pool header
    pub fn string_count(&self) -> u32 {
        self.string_count
    }

    /// Number of style spans declared by the pool header, styles are not decoded
    pub fn style_count(&self) -> u32 {
        self.style_count
    }

    /// Raw flags of the pool
    pub fn flags(&self) -> StringPoolFlags {
        self.flags
    }

    /// Offset of the string data from the start of the pool chunk
    pub fn strings_start(&self) -> u32 {
        self.strings_start
    }

    /// Offset of the style data from the start of the pool chunk
    pub fn styles_start(&self) -> u32 {
        self.styles_start
    }

    /// Whether strings were stored as UTF-8
    pub fn is_utf8(&self) -> bool {
        self.flags.contains(StringPoolFlags::UTF8)
    }

    /// Whether the pool is marked as sorted
    pub fn is_sorted(&self) -> bool {
        self.flags.contains(StringPoolFlags::SORTED)
    }

    /// Offsets of each string, relative to [`StringPool::strings_start`]
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// All decoded strings in pool order
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Number of strings in this pool
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether this pool contains no strings
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a string by its index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Returns an iterator over the strings in pool order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_str())
    }
}

/// Decode the pool chunk starting at `start`. Offsets in errors and trace events
/// are relative to the start of `buffer`.
#[instrument(skip(buffer, options, tracer), err)]
pub(crate) fn decode_at(
    buffer: &[u8],
    start: usize,
    options: &DecodeOptions,
    tracer: Tracer<'_>,
) -> Result<StringPool> {
    let header = ChunkHeader::read_at(buffer, start)?;
    tracer.emit(TraceEvent::Chunk {
        offset: start,
        header,
    });

    header.expect(ChunkType::StringPool)?;
    header.validate(start, buffer.len() - start)?;
    if (header.header_size as usize) < STRING_POOL_HEADER_SIZE {
        return Err(FormatError::SizeMismatch {
            declared: header.header_size as u64,
            actual: STRING_POOL_HEADER_SIZE as u64,
        }
        .into());
    }

    // nothing below may read past the end of this chunk
    let chunk_end = start + header.total_size as usize;
    let chunk = &buffer[..chunk_end];

    let fields = StringPoolHeader::read_at(chunk, start + ChunkHeader::SIZE)?;
    tracer.emit(TraceEvent::StringPoolHeader {
        offset: start,
        header: fields,
    });

    let count = fields.string_count as usize;
    let table_start = start + STRING_POOL_HEADER_SIZE;
    let table_len = count.checked_mul(4).ok_or(Error::TruncatedInput {
        offset: table_start,
        needed: usize::MAX,
        available: chunk_end.saturating_sub(table_start),
    })?;
    let offsets = take(chunk, table_start, table_len)?
        .chunks_exact(4)
        .map(LittleEndian::read_u32)
        .collect::<Vec<_>>();

    let origin = start.saturating_add(fields.strings_start as usize);
    let region = &chunk[..data_end(start, chunk_end, &fields)];
    let utf8 = fields.flags.contains(StringPoolFlags::UTF8);

    let mut strings = Vec::with_capacity(count);
    for (index, &offset) in offsets.iter().enumerate() {
        let at = origin.saturating_add(offset as usize);
        let (raw, declared, end) = if utf8 {
            read_utf8(region, at)?
        } else {
            read_utf16(region, at, options)?
        };

        tracer.emit(TraceEvent::String {
            index,
            offset: at,
            declared,
            end,
        });

        strings.push(into_text(raw));
    }

    debug!(
        strings = strings.len(),
        styles = fields.style_count,
        utf8,
        "decoded string pool"
    );

    Ok(StringPool {
        header,
        string_count: fields.string_count,
        style_count: fields.style_count,
        flags: fields.flags,
        strings_start: fields.strings_start,
        styles_start: fields.styles_start,
        offsets,
        strings,
    })
}

/// End of the string data: the style data when there is any, otherwise the chunk end.
fn data_end(start: usize, chunk_end: usize, fields: &StringPoolHeader) -> usize {
    let styles = start.saturating_add(fields.styles_start as usize);
    if fields.style_count > 0 && fields.styles_start > fields.strings_start && styles < chunk_end
    {
        styles
    } else {
        chunk_end
    }
}

/// A UTF-8 length field: one byte, or two when the high bit of the first is set.
fn utf8_length(region: &[u8], at: usize) -> Result<(usize, usize)> {
    let first = take(region, at, 1)?[0] as usize;
    if first & 0x80 == 0 {
        return Ok((first, at + 1));
    }

    let second = take(region, at + 1, 1)?[0] as usize;
    Ok((((first & 0x7F) << 8) | second, at + 2))
}

/// A UTF-16 length field: one unit, or two when the high bit of the first is set.
fn utf16_length(region: &[u8], at: usize) -> Result<(usize, usize)> {
    let first = read_u16(region, at)? as usize;
    if first & 0x8000 == 0 {
        return Ok((first, at + 2));
    }

    let second = read_u16(region, at + 2)? as usize;
    Ok((((first & 0x7FFF) << 16) | second, at + 4))
}

/// Read a UTF-8 string: character count, byte count, then the bytes.
fn read_utf8(region: &[u8], at: usize) -> Result<(Vec<u8>, usize, StringEnd)> {
    let (_characters, at) = utf8_length(region, at)?;
    let (length, at) = utf8_length(region, at)?;

    let available = region.len() - at;
    let data = &region[at..at + length.min(available)];

    let (bytes, end) = match data.iter().position(|&b| b == 0) {
        Some(terminator) => (&data[..terminator], StringEnd::Terminator),
        None if length > available => (data, StringEnd::Boundary),
        None => (data, StringEnd::Length),
    };

    Ok((bytes.to_vec(), length, end))
}

/// Read a UTF-16 string: unit count, then the units.
fn read_utf16(
    region: &[u8],
    at: usize,
    options: &DecodeOptions,
) -> Result<(Vec<u8>, usize, StringEnd)> {
    let (length, at) = utf16_length(region, at)?;

    let available = (region.len() - at) / 2;
    let data = &region[at..at + length.min(available) * 2];

    let (units, end) = match data.chunks_exact(2).position(|unit| *unit == [0, 0]) {
        Some(terminator) => (&data[..terminator * 2], StringEnd::Terminator),
        None if length > available => (data, StringEnd::Boundary),
        None => (data, StringEnd::Length),
    };

    Ok((utf16::transcode(units, options.surrogates)?, length, end))
}

fn into_text(raw: Vec<u8>) -> String {
    String::from_utf8(raw)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
