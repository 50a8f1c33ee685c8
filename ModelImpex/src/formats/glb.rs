//! GLB binary container codec.
//!
//! A GLB file is a 12-byte header followed by a JSON chunk and an optional
//! BIN chunk:
//!
//! ```text
//! magic "glTF" | version u32 | total length u32
//! chunk length u32 | "JSON" | json bytes (space padded to 4)
//! chunk length u32 | "BIN\0" | binary bytes
//! ```
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// GLB magic bytes.
pub const GLB_MAGIC: [u8; 4] = *b"glTF";
/// The only supported container version.
pub const GLB_VERSION: u32 = 2;
/// Chunk type tag of the JSON chunk ("JSON").
pub const CHUNK_JSON: u32 = 0x4E4F534A;
/// Chunk type tag of the binary chunk ("BIN\0").
pub const CHUNK_BIN: u32 = 0x004E4942;

const HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;

/// The two payloads of a parsed GLB container, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glb<'a> {
    /// JSON chunk body, including any trailing pad spaces.
    pub json: &'a [u8],
    /// BIN chunk body; empty when the container has no BIN chunk.
    pub bin: &'a [u8],
}

/// Returns `true` if `data` starts with the GLB magic.
#[must_use]
pub fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == GLB_MAGIC
}

/// Parse a GLB container.
///
/// # Errors
/// Returns [`Error::GlbTruncated`] if the data ends early, and a format error
/// for a wrong magic, version, chunk order or trailing data.
pub fn parse_glb(data: &[u8]) -> Result<Glb<'_>> {
    let header = take(data, 0, HEADER_SIZE)?;
    let magic = [header[0], header[1], header[2], header[3]];
    if magic != GLB_MAGIC {
        return Err(Error::InvalidGlbMagic(magic));
    }

    let version = LittleEndian::read_u32(&header[4..8]);
    if version != GLB_VERSION {
        return Err(Error::UnsupportedGlbVersion { version });
    }

    let declared = LittleEndian::read_u32(&header[8..12]) as usize;
    if declared > data.len() {
        return Err(Error::GlbTruncated {
            offset: data.len(),
            needed: declared - data.len(),
        });
    }
    if declared != data.len() {
        return Err(Error::GlbLengthMismatch {
            declared,
            actual: data.len(),
        });
    }

    let (json, mut offset) = read_chunk(data, HEADER_SIZE, CHUNK_JSON, "JSON chunk")?;

    let mut bin: &[u8] = &[];
    if offset < data.len() {
        let (body, next) = read_chunk(data, offset, CHUNK_BIN, "BIN chunk")?;
        bin = body;
        offset = next;
    }

    if offset < data.len() {
        let found = take(data, offset, CHUNK_HEADER_SIZE).map_or([0; 4], tag_bytes);
        return Err(Error::UnexpectedGlbChunk {
            offset,
            expected: "end of container",
            found,
        });
    }

    tracing::trace!("parsed GLB: {} JSON bytes, {} BIN bytes", json.len(), bin.len());
    Ok(Glb { json, bin })
}

/// Serialize a GLB container.
///
/// The JSON body is padded with spaces to a 4-byte boundary. A BIN chunk is
/// always written, even for an empty `bin`. `bin` itself is written as given,
/// so callers keep it aligned.
///
/// # Errors
/// Returns [`Error::GlbTooLarge`] if the container exceeds `u32::MAX` bytes.
pub fn write_glb(json: &[u8], bin: &[u8]) -> Result<Vec<u8>> {
    let json_padding = padding(json.len());
    let json_chunk_len = json.len() + json_padding;
    let total_len = HEADER_SIZE + CHUNK_HEADER_SIZE + json_chunk_len + CHUNK_HEADER_SIZE + bin.len();

    let total = to_u32(total_len)?;
    let mut output = Vec::with_capacity(total_len);

    // GLB header
    output.extend_from_slice(&GLB_MAGIC);
    output.extend_from_slice(&GLB_VERSION.to_le_bytes());
    output.extend_from_slice(&total.to_le_bytes());

    // JSON chunk
    output.extend_from_slice(&to_u32(json_chunk_len)?.to_le_bytes());
    output.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    output.extend_from_slice(json);
    output.resize(output.len() + json_padding, b' ');

    // Binary chunk
    output.extend_from_slice(&to_u32(bin.len())?.to_le_bytes());
    output.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    output.extend_from_slice(bin);

    Ok(output)
}

/// Bytes needed to pad `len` up to a multiple of 4.
#[must_use]
pub const fn padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

fn read_chunk<'a>(
    data: &'a [u8],
    offset: usize,
    expected_tag: u32,
    expected: &'static str,
) -> Result<(&'a [u8], usize)> {
    let header = take(data, offset, CHUNK_HEADER_SIZE)?;
    let length = LittleEndian::read_u32(&header[0..4]) as usize;
    let tag = LittleEndian::read_u32(&header[4..8]);
    if tag != expected_tag {
        return Err(Error::UnexpectedGlbChunk {
            offset,
            expected,
            found: tag_bytes(header),
        });
    }

    let body_start = offset + CHUNK_HEADER_SIZE;
    let body = take(data, body_start, length)?;
    Ok((body, body_start + length))
}

fn take(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.saturating_add(len);
    data.get(offset..end).ok_or_else(|| Error::GlbTruncated {
        offset,
        needed: end - data.len().max(offset),
    })
}

fn tag_bytes(chunk_header: &[u8]) -> [u8; 4] {
    [chunk_header[4], chunk_header[5], chunk_header[6], chunk_header[7]]
}

fn to_u32(length: usize) -> Result<u32> {
    u32::try_from(length).map_err(|_| Error::GlbTooLarge { length })
}
