//! Binary archive framing of [PvtRecord]s, as published by the receiver.
//! Every datagram carries the archive preamble followed by the record fields,
//! all in native (little-endian, 64-bit) representation.

pub mod header;

use thiserror::Error;

use crate::pvt::PvtRecord;

use header::{ArchiveHeader, NativeSizes};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("empty datagram")]
    Empty,
    #[error("truncated archive")]
    Truncated,
    #[error("not a serialization archive")]
    Signature,
    #[error("unsupported archive library version {0}")]
    LibraryVersion(u16),
    #[error("incompatible producer type sizes: {0:?}")]
    TypeSizes(NativeSizes),
    #[error("archive produced on a big-endian host")]
    Endianness,
    #[error("invalid tracking flag {0}")]
    Tracking(u8),
    #[error("unsupported record class version {0}")]
    ClassVersion(u32),
    #[error("{0} trailing byte(s) after record")]
    TrailingBytes(usize),
}

/// Complete parsers only fail when running out of input
pub(crate) fn truncated<E>(_: nom::Err<E>) -> DecodeError {
    DecodeError::Truncated
}

/// Decodes one [PvtRecord] out of a complete datagram.
/// The datagram must contain exactly one archive: any structural issue,
/// missing or extra bytes, rejects the whole datagram.
pub fn decode(bytes: &[u8]) -> Result<PvtRecord, DecodeError> {
    let (rem, _) = ArchiveHeader::parse(bytes)?;
    let (rem, record) = PvtRecord::parse(rem).map_err(truncated)?;

    if !rem.is_empty() {
        return Err(DecodeError::TrailingBytes(rem.len()));
    }

    Ok(record)
}

/// Encodes [PvtRecord] with our default [ArchiveHeader]
pub fn encode(record: &PvtRecord) -> Vec<u8> {
    encode_with(record, &ArchiveHeader::default())
}

/// Encodes [PvtRecord] with given [ArchiveHeader]
pub fn encode_with(record: &PvtRecord, header: &ArchiveHeader) -> Vec<u8> {
    let mut buf = Vec::with_capacity(header.encoded_len() + PvtRecord::ENCODED_SIZE);
    header.extend_to(&mut buf);
    record.extend_to(&mut buf);
    buf
}
