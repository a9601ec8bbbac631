//! Base types for the chunk structure of a resource table.

use std::io::Cursor;

use binrw::BinRead;
use bitflags::bitflags;
use byteorder::{ByteOrder, LittleEndian};
use derive_more::derive::Display;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, FormatError, Result};

/// Kind of a chunk, taken from the first two bytes of its header
///
/// Tags this crate has no name for are kept as [`ChunkType::Unknown`] so they are
/// never mistaken for a known kind.
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ChunkType {
    /// `RES_NULL_TYPE`
    #[display("RES_NULL_TYPE")]
    Null,
    /// `RES_STRING_POOL_TYPE`
    #[display("RES_STRING_POOL_TYPE")]
    StringPool,
    /// `RES_TABLE_TYPE`
    #[display("RES_TABLE_TYPE")]
    Table,
    /// `RES_XML_TYPE`
    #[display("RES_XML_TYPE")]
    Xml,
    /// `RES_XML_START_NAMESPACE_TYPE`
    #[display("RES_XML_START_NAMESPACE_TYPE")]
    XmlStartNamespace,
    /// `RES_XML_END_NAMESPACE_TYPE`
    #[display("RES_XML_END_NAMESPACE_TYPE")]
    XmlEndNamespace,
    /// `RES_XML_START_ELEMENT_TYPE`
    #[display("RES_XML_START_ELEMENT_TYPE")]
    XmlStartElement,
    /// `RES_XML_END_ELEMENT_TYPE`
    #[display("RES_XML_END_ELEMENT_TYPE")]
    XmlEndElement,
    /// `RES_XML_CDATA_TYPE`
    #[display("RES_XML_CDATA_TYPE")]
    XmlCdata,
    /// `RES_XML_RESOURCE_MAP_TYPE`
    #[display("RES_XML_RESOURCE_MAP_TYPE")]
    XmlResourceMap,
    /// `RES_TABLE_PACKAGE_TYPE`
    #[display("RES_TABLE_PACKAGE_TYPE")]
    TablePackage,
    /// `RES_TABLE_TYPE_TYPE`
    #[display("RES_TABLE_TYPE_TYPE")]
    TableType,
    /// `RES_TABLE_TYPE_SPEC_TYPE`
    #[display("RES_TABLE_TYPE_SPEC_TYPE")]
    TableTypeSpec,
    /// `RES_TABLE_LIBRARY_TYPE`
    #[display("RES_TABLE_LIBRARY_TYPE")]
    TableLibrary,
    /// Any tag not listed above
    #[display("unknown chunk type {_0:#06x}")]
    Unknown(u16),
}

impl ChunkType {
    /// The tag as stored in the file
    pub fn raw(self) -> u16 {
        match self {
            ChunkType::Null => 0x0000,
            ChunkType::StringPool => 0x0001,
            ChunkType::Table => 0x0002,
            ChunkType::Xml => 0x0003,
            ChunkType::XmlStartNamespace => 0x0100,
            ChunkType::XmlEndNamespace => 0x0101,
            ChunkType::XmlStartElement => 0x0102,
            ChunkType::XmlEndElement => 0x0103,
            ChunkType::XmlCdata => 0x0104,
            ChunkType::XmlResourceMap => 0x0180,
            ChunkType::TablePackage => 0x0200,
            ChunkType::TableType => 0x0201,
            ChunkType::TableTypeSpec => 0x0202,
            ChunkType::TableLibrary => 0x0203,
            ChunkType::Unknown(raw) => raw,
        }
    }
}

impl From<u16> for ChunkType {
    fn from(value: u16) -> Self {
        match value {
            0x0000 => ChunkType::Null,
            0x0001 => ChunkType::StringPool,
            0x0002 => ChunkType::Table,
            0x0003 => ChunkType::Xml,
            0x0100 => ChunkType::XmlStartNamespace,
            0x0101 => ChunkType::XmlEndNamespace,
            0x0102 => ChunkType::XmlStartElement,
            0x0103 => ChunkType::XmlEndElement,
            0x0104 => ChunkType::XmlCdata,
            0x0180 => ChunkType::XmlResourceMap,
            0x0200 => ChunkType::TablePackage,
            0x0201 => ChunkType::TableType,
            0x0202 => ChunkType::TableTypeSpec,
            0x0203 => ChunkType::TableLibrary,
            other => ChunkType::Unknown(other),
        }
    }
}

impl From<ChunkType> for u16 {
    fn from(value: ChunkType) -> Self {
        value.raw()
    }
}

/// Header shared by every chunk
///
/// | Offset | Field       | Description                                          |
/// |--------|-------------|------------------------------------------------------|
/// | 0x0000 | Type        | 2 bytes: one of the [`ChunkType`] tags               |
/// | 0x0002 | Header Size | 2 bytes: size of the chunk header, this one included |
/// | 0x0004 | Total Size  | 4 bytes: size of the whole chunk, header included    |
#[derive(BinRead, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[br(little)]
pub struct ChunkHeader {
    /// The kind of chunk
    #[br(map = |raw: u16| ChunkType::from(raw))]
    pub chunk_type: ChunkType,

    /// Size of the chunk header in bytes
    pub header_size: u16,

    /// Size of the whole chunk in bytes
    pub total_size: u32,
}

impl ChunkHeader {
    /// Number of bytes taken by the common header
    pub const SIZE: usize = 8;

    /// Read the header starting at `at`.
    ///
    /// The cursor after this header is `at + ChunkHeader::SIZE`.
    pub fn read_at(buffer: &[u8], at: usize) -> Result<ChunkHeader> {
        let bytes = take(buffer, at, Self::SIZE)?;
        ChunkHeader::read(&mut Cursor::new(bytes)).map_err(|_| truncated(buffer, at, Self::SIZE))
    }

    /// Check `header_size <= total_size <= available`, where `available` is the
    /// number of bytes from the start of this chunk to the end of the input.
    pub fn validate(&self, at: usize, available: usize) -> Result<()> {
        let header_size = self.header_size as usize;
        let total_size = self.total_size as usize;

        if header_size < Self::SIZE || header_size > total_size {
            return Err(FormatError::SizeMismatch {
                declared: header_size as u64,
                actual: total_size as u64,
            }
            .into());
        }

        if total_size > available {
            return Err(Error::TruncatedInput {
                offset: at,
                needed: total_size,
                available,
            });
        }

        Ok(())
    }

    /// Fail unless this header is of the `expected` kind
    pub fn expect(&self, expected: ChunkType) -> Result<()> {
        if self.chunk_type != expected {
            return Err(FormatError::WrongChunkType {
                expected,
                found: self.chunk_type,
            }
            .into());
        }
        Ok(())
    }
}

bitflags! {
    /// Flags stored in a string pool header
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct StringPoolFlags: u32 {
        /// The strings are sorted, this does not change how they are decoded
        const SORTED = 0x0001;
        /// Strings are stored as UTF-8, otherwise as UTF-16LE
        const UTF8 = 0x0100;

        const _ = !0;
    }
}

/// Fields of a string pool header following the common [`ChunkHeader`]
///
/// | Offset | Field         | Description                                            |
/// |--------|---------------|--------------------------------------------------------|
/// | 0x0008 | String Count  | 4 bytes: number of entries in the offset table         |
/// | 0x000C | Style Count   | 4 bytes: number of style spans                         |
/// | 0x0010 | Flags         | 4 bytes: [`StringPoolFlags`]                           |
/// | 0x0014 | Strings Start | 4 bytes: string data offset from the start of the pool |
/// | 0x0018 | Styles Start  | 4 bytes: style data offset from the start of the pool  |
#[derive(BinRead, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[br(little)]
pub struct StringPoolHeader {
    /// Number of strings in the pool
    pub string_count: u32,

    /// Number of style spans in the pool
    pub style_count: u32,

    /// Encoding and sort flags
    #[br(map = |raw: u32| StringPoolFlags::from_bits_retain(raw))]
    pub flags: StringPoolFlags,

    /// Offset from the start of the pool chunk to the string data
    pub strings_start: u32,

    /// Offset from the start of the pool chunk to the style data
    pub styles_start: u32,
}

impl StringPoolHeader {
    /// Number of bytes taken by these fields
    pub const SIZE: usize = 20;

    /// Read the fields starting at `at`
    pub fn read_at(buffer: &[u8], at: usize) -> Result<StringPoolHeader> {
        let bytes = take(buffer, at, Self::SIZE)?;
        StringPoolHeader::read(&mut Cursor::new(bytes))
            .map_err(|_| truncated(buffer, at, Self::SIZE))
    }
}

/// A package chunk found after the global string pool
///
/// Its contents are not interpreted, only its position and header are kept.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Package {
    /// Offset of the chunk from the start of the table
    pub offset: usize,

    /// The package chunk's header
    pub header: ChunkHeader,
}

impl Package {
    /// Raw bytes of this package chunk within the table it was decoded from
    pub fn data<'a>(&self, table: &'a [u8]) -> Option<&'a [u8]> {
        table.get(self.offset..self.offset + self.header.total_size as usize)
    }
}

/// Borrow `needed` bytes starting at `at`, or fail with [`Error::TruncatedInput`]
pub(crate) fn take(buffer: &[u8], at: usize, needed: usize) -> Result<&[u8]> {
    at.checked_add(needed)
        .and_then(|end| buffer.get(at..end))
        .ok_or_else(|| truncated(buffer, at, needed))
}

pub(crate) fn read_u16(buffer: &[u8], at: usize) -> Result<u16> {
    take(buffer, at, 2).map(LittleEndian::read_u16)
}

pub(crate) fn read_u32(buffer: &[u8], at: usize) -> Result<u32> {
    take(buffer, at, 4).map(LittleEndian::read_u32)
}

fn truncated(buffer: &[u8], at: usize, needed: usize) -> Error {
    Error::TruncatedInput {
        offset: at,
        needed,
        available: buffer.len().saturating_sub(at),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, FormatError, Result};
    use crate::types::{ChunkHeader, ChunkType, StringPoolFlags, StringPoolHeader};

    #[test]
    fn read_chunk_header() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x02, 0x00,             // Type
            0x0C, 0x00,             // Header Size
            0x1C, 0x00, 0x00, 0x00, // Total Size
        ];

        let expected = ChunkHeader {
            chunk_type: ChunkType::Table,
            header_size: 12,
            total_size: 28,
        };

        assert_eq!(ChunkHeader::read_at(&input, 0)?, expected);

        Ok(())
    }

    #[test]
    fn read_chunk_header_at_offset() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0xFF, 0xFF, 0xFF, 0xFF,
            0x00, 0x02,             // Type
            0x20, 0x01,             // Header Size
            0x00, 0x10, 0x00, 0x00, // Total Size
        ];

        let header = ChunkHeader::read_at(&input, 4)?;
        assert_eq!(header.chunk_type, ChunkType::TablePackage);
        assert_eq!(header.header_size, 0x0120);
        assert_eq!(header.total_size, 0x1000);

        Ok(())
    }

    #[test]
    fn read_truncated_chunk_header() {
        let input = [0x02, 0x00, 0x0C, 0x00, 0x1C];

        assert_eq!(
            ChunkHeader::read_at(&input, 0),
            Err(Error::TruncatedInput {
                offset: 0,
                needed: 8,
                available: 5
            })
        );
        assert_eq!(
            ChunkHeader::read_at(&input, 9),
            Err(Error::TruncatedInput {
                offset: 9,
                needed: 8,
                available: 0
            })
        );
    }

    #[test]
    fn unknown_chunk_types_are_kept() {
        assert_eq!(ChunkType::from(0x0205), ChunkType::Unknown(0x0205));
        assert_eq!(ChunkType::from(0x0205).raw(), 0x0205);
        assert_eq!(ChunkType::from(0x0180), ChunkType::XmlResourceMap);
        assert_eq!(u16::from(ChunkType::TableTypeSpec), 0x0202);
        assert_eq!(
            ChunkType::Unknown(0x0205).to_string(),
            "unknown chunk type 0x0205"
        );
    }

    #[test]
    fn validate_sizes() {
        let header = ChunkHeader {
            chunk_type: ChunkType::StringPool,
            header_size: 28,
            total_size: 40,
        };

        assert_eq!(header.validate(0, 40), Ok(()));
        assert_eq!(
            header.validate(12, 39),
            Err(Error::TruncatedInput {
                offset: 12,
                needed: 40,
                available: 39
            })
        );

        let inverted = ChunkHeader {
            header_size: 48,
            ..header
        };
        assert_eq!(
            inverted.validate(0, 100),
            Err(Error::Format(FormatError::SizeMismatch {
                declared: 48,
                actual: 40
            }))
        );
    }

    #[test]
    fn read_string_pool_header() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            0x03, 0x00, 0x00, 0x00, // String Count
            0x00, 0x00, 0x00, 0x00, // Style Count
            0x01, 0x01, 0x00, 0x00, // Flags
            0x28, 0x00, 0x00, 0x00, // Strings Start
            0x00, 0x00, 0x00, 0x00, // Styles Start
        ];

        let expected = StringPoolHeader {
            string_count: 3,
            style_count: 0,
            flags: StringPoolFlags::UTF8 | StringPoolFlags::SORTED,
            strings_start: 0x28,
            styles_start: 0,
        };

        assert_eq!(StringPoolHeader::read_at(&input, 0)?, expected);

        Ok(())
    }
}
