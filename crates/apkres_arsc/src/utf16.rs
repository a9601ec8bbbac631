//! Transcoding of UTF-16LE string data into UTF-8.

use byteorder::{ByteOrder, LittleEndian};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{EncodingError, Result};

/// What to do with a surrogate code unit that is not part of a valid pair
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SurrogatePolicy {
    /// Substitute U+FFFD REPLACEMENT CHARACTER
    #[default]
    Replace,

    /// Fail with [`EncodingError::InvalidSurrogate`]
    Strict,
}

/// Transcode little-endian UTF-16 bytes into UTF-8 bytes.
///
/// ```
/// use apkres_arsc::utf16::{transcode, SurrogatePolicy};
///
/// let utf8 = transcode(&[0x41, 0x00, 0x3D, 0xD8, 0x00, 0xDE], SurrogatePolicy::Strict)?;
/// assert_eq!(utf8, "A😀".as_bytes());
/// # Ok::<(), apkres_arsc::error::Error>(())
/// ```
pub fn transcode(bytes: &[u8], policy: SurrogatePolicy) -> Result<Vec<u8>> {
    if bytes.len() % 2 != 0 {
        return Err(EncodingError::OddByteLength {
            length: bytes.len(),
        }
        .into());
    }

    let units = bytes
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .collect::<Vec<_>>();

    transcode_units(&units, policy)
}

/// Transcode UTF-16 code units into UTF-8 bytes.
pub fn transcode_units(units: &[u16], policy: SurrogatePolicy) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(units.len());
    let mut scratch = [0u8; 4];

    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        i += 1;

        let code_point = match unit {
            0xD800..=0xDBFF => match units.get(i) {
                Some(&low @ 0xDC00..=0xDFFF) => {
                    i += 1;
                    0x10000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00)
                }
                _ => lone_surrogate(unit, policy)?,
            },
            0xDC00..=0xDFFF => lone_surrogate(unit, policy)?,
            _ => unit as u32,
        };

        let c = char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER);
        output.extend_from_slice(c.encode_utf8(&mut scratch).as_bytes());
    }

    Ok(output)
}

fn lone_surrogate(unit: u16, policy: SurrogatePolicy) -> Result<u32> {
    match policy {
        SurrogatePolicy::Replace => Ok(char::REPLACEMENT_CHARACTER as u32),
        SurrogatePolicy::Strict => Err(EncodingError::InvalidSurrogate { unit }.into()),
    }
}
