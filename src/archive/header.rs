use nom::{
    bytes::complete::take,
    number::complete::{le_i32, le_u16, le_u32, le_u64, le_u8},
    IResult,
};

use crate::archive::{truncated, DecodeError};

/// Archive signature, stored as a length prefixed string
pub const SIGNATURE: &[u8] = b"serialization::archive";

/// Library version we emit
pub const DEFAULT_LIBRARY_VERSION: u16 = 17;

/// Oldest library version sharing our preamble widths.
/// Older archives encode the class version on fewer bytes.
pub const MIN_LIBRARY_VERSION: u16 = 8;

/// Native type sizes recorded by the producer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeSizes {
    pub int: u8,
    pub long: u8,
    pub float: u8,
    pub double: u8,
}

impl Default for NativeSizes {
    /// 64-bit Linux host (LP64)
    fn default() -> Self {
        Self {
            int: 4,
            long: 8,
            float: 4,
            double: 8,
        }
    }
}

impl NativeSizes {
    /// Our fields only involve `int`, `float` and `double`. `long`
    /// differs between LP64 and LLP64 hosts and is not used.
    fn is_compatible(&self) -> bool {
        self.int == 4 && (self.long == 4 || self.long == 8) && self.float == 4 && self.double == 8
    }
}

/// Binary archive preamble, followed by the object class information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Serialization library version of the producer
    pub library_version: u16,
    /// Native type sizes of the producer
    pub sizes: NativeSizes,
    /// Serialized class version
    pub class_version: u32,
    /// Object id, only present when the object is tracked
    pub object_id: Option<u32>,
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        Self {
            library_version: DEFAULT_LIBRARY_VERSION,
            sizes: NativeSizes::default(),
            class_version: 0,
            object_id: None,
        }
    }
}

/// Preamble fields following the signature, before validation
struct RawPreamble {
    library_version: u16,
    sizes: NativeSizes,
    endianness: i32,
    tracking: u8,
    class_version: u32,
}

fn signature_len(input: &[u8]) -> IResult<&[u8], u64> {
    le_u64(input)
}

fn signature(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take(SIGNATURE.len())(input)
}

fn object_id(input: &[u8]) -> IResult<&[u8], u32> {
    le_u32(input)
}

fn preamble(input: &[u8]) -> IResult<&[u8], RawPreamble> {
    let (input, library_version) = le_u16(input)?;

    let (input, int) = le_u8(input)?;
    let (input, long) = le_u8(input)?;
    let (input, float) = le_u8(input)?;
    let (input, double) = le_u8(input)?;
    let (input, endianness) = le_i32(input)?;

    let (input, tracking) = le_u8(input)?;
    let (input, class_version) = le_u32(input)?;

    Ok((
        input,
        RawPreamble {
            library_version,
            sizes: NativeSizes {
                int,
                long,
                float,
                double,
            },
            endianness,
            tracking,
            class_version,
        },
    ))
}

impl ArchiveHeader {
    /// Encoded size of an untracked preamble, in bytes
    pub const SIZE: usize = 8 + SIGNATURE.len() + 2 + 4 + 4 + 1 + 4;

    /// Encoded size of this preamble, in bytes
    pub fn encoded_len(&self) -> usize {
        if self.object_id.is_some() {
            Self::SIZE + 4
        } else {
            Self::SIZE
        }
    }

    /// Parses and validates the archive preamble, returning the remaining bytes.
    pub fn parse(input: &[u8]) -> Result<(&[u8], Self), DecodeError> {
        if input.is_empty() {
            return Err(DecodeError::Empty);
        }

        let (rem, len) = signature_len(input).map_err(truncated)?;
        if len != SIGNATURE.len() as u64 {
            return Err(DecodeError::Signature);
        }

        let (rem, signature) = signature(rem).map_err(truncated)?;
        if signature != SIGNATURE {
            return Err(DecodeError::Signature);
        }

        let (rem, raw) = preamble(rem).map_err(truncated)?;

        if raw.library_version < MIN_LIBRARY_VERSION {
            return Err(DecodeError::LibraryVersion(raw.library_version));
        }

        if !raw.sizes.is_compatible() {
            return Err(DecodeError::TypeSizes(raw.sizes));
        }

        if raw.endianness != 1 {
            return Err(DecodeError::Endianness);
        }

        let tracked = match raw.tracking {
            0 => false,
            1 => true,
            flag => return Err(DecodeError::Tracking(flag)),
        };

        if raw.class_version != 0 {
            return Err(DecodeError::ClassVersion(raw.class_version));
        }

        // tracked objects are identified before their data
        let (rem, object_id) = if tracked {
            let (rem, id) = object_id(rem).map_err(truncated)?;
            (rem, Some(id))
        } else {
            (rem, None)
        };

        Ok((
            rem,
            Self {
                library_version: raw.library_version,
                sizes: raw.sizes,
                class_version: raw.class_version,
                object_id,
            },
        ))
    }

    /// Appends the encoded preamble to `buf`
    pub fn extend_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(SIGNATURE.len() as u64).to_le_bytes());
        buf.extend_from_slice(SIGNATURE);
        buf.extend_from_slice(&self.library_version.to_le_bytes());
        buf.push(self.sizes.int);
        buf.push(self.sizes.long);
        buf.push(self.sizes.float);
        buf.push(self.sizes.double);
        buf.extend_from_slice(&1_i32.to_le_bytes());
        buf.push(self.object_id.is_some() as u8);
        buf.extend_from_slice(&self.class_version.to_le_bytes());

        if let Some(id) = self.object_id {
            buf.extend_from_slice(&id.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ArchiveHeader, NativeSizes};
    use crate::archive::DecodeError;

    /// Preamble emitted by a 64-bit little-endian producer
    const PREAMBLE: [u8; 45] = [
        0x16, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // signature length
        b's', b'e', b'r', b'i', b'a', b'l', b'i', b'z', b'a', b't', b'i', b'o', b'n', b':', b':',
        b'a', b'r', b'c', b'h', b'i', b'v', b'e', // signature
        0x11, 0x00, // library version
        0x04, 0x08, 0x04, 0x08, // int, long, float, double
        0x01, 0x00, 0x00, 0x00, // endianness
        0x00, // tracking
        0x00, 0x00, 0x00, 0x00, // class version
    ];

    #[test]
    fn default_preamble_bytes() {
        let mut buf = Vec::new();
        ArchiveHeader::default().extend_to(&mut buf);
        assert_eq!(buf.len(), ArchiveHeader::SIZE);
        assert_eq!(buf, PREAMBLE);
    }

    #[test]
    fn parse_preamble() {
        let (rem, header) = ArchiveHeader::parse(&PREAMBLE).unwrap();
        assert!(rem.is_empty());
        assert_eq!(header, ArchiveHeader::default());
    }

    #[test]
    fn parse_other_producers() {
        let mut bytes = PREAMBLE;
        bytes[30] = 19; // newer library
        bytes[33] = 4; // LLP64 host

        let (_, header) = ArchiveHeader::parse(&bytes).unwrap();
        assert_eq!(header.library_version, 19);
        assert_eq!(header.sizes.long, 4);
        assert_eq!(header.object_id, None);
    }

    #[test]
    fn tracked_object_id() {
        // tracked object: flag set, object id follows the class version
        let mut bytes = PREAMBLE.to_vec();
        bytes[40] = 1;
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        bytes.push(0xaa);

        let (rem, header) = ArchiveHeader::parse(&bytes).unwrap();
        assert_eq!(header.object_id, Some(0));
        assert_eq!(header.encoded_len(), 49);
        assert_eq!(rem, &[0xaa]);

        let mut buf = Vec::new();
        header.extend_to(&mut buf);
        assert_eq!(buf, &bytes[..49]);

        assert_eq!(
            ArchiveHeader::parse(&bytes[..47]),
            Err(DecodeError::Truncated)
        );
    }

    #[test]
    fn preamble_rejections() {
        assert_eq!(ArchiveHeader::parse(&[]), Err(DecodeError::Empty));
        assert_eq!(
            ArchiveHeader::parse(&PREAMBLE[..20]),
            Err(DecodeError::Truncated)
        );
        assert_eq!(
            ArchiveHeader::parse(&[0x01, 0x02, 0x03]),
            Err(DecodeError::Truncated)
        );

        let mut bytes = PREAMBLE;
        bytes[0] = 0x20;
        assert_eq!(ArchiveHeader::parse(&bytes), Err(DecodeError::Signature));

        let mut bytes = PREAMBLE;
        bytes[10] = b'X';
        assert_eq!(ArchiveHeader::parse(&bytes), Err(DecodeError::Signature));

        let mut bytes = PREAMBLE;
        bytes[30] = 7;
        assert_eq!(
            ArchiveHeader::parse(&bytes),
            Err(DecodeError::LibraryVersion(7))
        );

        let mut bytes = PREAMBLE;
        bytes[35] = 4;
        assert_eq!(
            ArchiveHeader::parse(&bytes),
            Err(DecodeError::TypeSizes(NativeSizes {
                int: 4,
                long: 8,
                float: 4,
                double: 4,
            }))
        );

        let mut bytes = PREAMBLE;
        bytes[36..40].copy_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(ArchiveHeader::parse(&bytes), Err(DecodeError::Endianness));

        let mut bytes = PREAMBLE;
        bytes[40] = 2;
        assert_eq!(ArchiveHeader::parse(&bytes), Err(DecodeError::Tracking(2)));

        let mut bytes = PREAMBLE;
        bytes[41] = 1;
        assert_eq!(
            ArchiveHeader::parse(&bytes),
            Err(DecodeError::ClassVersion(1))
        );
    }
}
