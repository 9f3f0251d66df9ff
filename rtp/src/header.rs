use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

pub(crate) const HEADER_LENGTH: usize = 4;
const VERSION_SHIFT: u8 = 6;
const VERSION_MASK: u8 = 0x3;
const PADDING_SHIFT: u8 = 5;
const PADDING_MASK: u8 = 0x1;
const EXTENSION_SHIFT: u8 = 4;
const EXTENSION_MASK: u8 = 0x1;
const EXTENSION_ID_RESERVED: u8 = 0xF;
const CC_MASK: u8 = 0xF;
const PT_MASK: u8 = 0x7F;
const MARKER_SHIFT: u8 = 7;
const MARKER_MASK: u8 = 0x1;
const CSRC_LENGTH: usize = 4;

/// ExtensionProfile indicates which RTP header extension scheme is in use,
/// see RFC 8285.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u16)]
pub enum ExtensionProfile {
    OneByte = 0xBEDE,
    TwoByte = 0x1000,
    Undefined,
}

impl Default for ExtensionProfile {
    fn default() -> Self {
        ExtensionProfile::Undefined
    }
}

impl From<u16> for ExtensionProfile {
    fn from(val: u16) -> Self {
        match val {
            0xBEDE => ExtensionProfile::OneByte,
            0x1000 => ExtensionProfile::TwoByte,
            _ => ExtensionProfile::Undefined,
        }
    }
}

impl From<ExtensionProfile> for u16 {
    fn from(p: ExtensionProfile) -> Self {
        match p {
            ExtensionProfile::OneByte => 0xBEDE,
            ExtensionProfile::TwoByte => 0x1000,
            ExtensionProfile::Undefined => 0x00,
        }
    }
}

/// Extension is an RTP header extension, either RFC 8285 one-byte/two-byte
/// or a single RFC 3550 extension.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct Extension {
    pub id: u8,
    pub payload: Vec<u8>,
}

/// Header represents an RTP packet header.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct Header {
    pub version: u8,
    pub padding: bool,
    pub extension: bool,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrc: Vec<u32>,
    pub extension_profile: u16,
    pub extensions: Vec<Extension>,
}

impl Header {
    fn extension_payload_len(&self) -> usize {
        match ExtensionProfile::from(self.extension_profile) {
            ExtensionProfile::OneByte => self
                .extensions
                .iter()
                .map(|e| 1 + e.payload.len())
                .sum(),
            ExtensionProfile::TwoByte => self
                .extensions
                .iter()
                .map(|e| 2 + e.payload.len())
                .sum(),
            ExtensionProfile::Undefined => {
                self.extensions.first().map(|e| e.payload.len()).unwrap_or(0)
            }
        }
    }

    /// set_extension sets an RTP header extension, enabling extensions and
    /// choosing a profile if none is in use yet.
    pub fn set_extension(&mut self, id: u8, payload: &[u8]) -> Result<(), Error> {
        if self.extension {
            match ExtensionProfile::from(self.extension_profile) {
                ExtensionProfile::OneByte => {
                    if !(1..=14).contains(&id) {
                        return Err(Error::ErrRfc8285oneByteHeaderIdrange);
                    }
                    if payload.len() > 16 {
                        return Err(Error::ErrRfc8285oneByteHeaderSize);
                    }
                }
                ExtensionProfile::TwoByte => {
                    if id < 1 {
                        return Err(Error::ErrRfc8285twoByteHeaderIdrange);
                    }
                    if payload.len() > 255 {
                        return Err(Error::ErrRfc8285twoByteHeaderSize);
                    }
                }
                ExtensionProfile::Undefined => {
                    if id != 0 {
                        return Err(Error::ErrRfc3550headerIdrange);
                    }
                }
            }

            for extension in &mut self.extensions {
                if extension.id == id {
                    extension.payload = payload.to_vec();
                    return Ok(());
                }
            }
            self.extensions.push(Extension {
                id,
                payload: payload.to_vec(),
            });
            return Ok(());
        }

        self.extension = true;
        let len = payload.len();
        self.extension_profile = if len <= 16 {
            ExtensionProfile::OneByte.into()
        } else {
            ExtensionProfile::TwoByte.into()
        };
        self.extensions.push(Extension {
            id,
            payload: payload.to_vec(),
        });

        Ok(())
    }

    /// get_extension returns an RTP header extension's payload by id.
    pub fn get_extension(&self, id: u8) -> Option<&[u8]> {
        if !self.extension {
            return None;
        }
        self.extensions
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.payload.as_slice())
    }

    /// get_extension_ids returns the ids of all header extensions present.
    pub fn get_extension_ids(&self) -> Vec<u8> {
        if !self.extension {
            return vec![];
        }
        self.extensions.iter().map(|e| e.id).collect()
    }

    /// del_extension removes an RTP header extension by id.
    pub fn del_extension(&mut self, id: u8) -> Result<(), Error> {
        if !self.extension {
            return Err(Error::ErrHeaderExtensionsNotEnabled);
        }
        let idx = self.extensions.iter().position(|e| e.id == id);
        match idx {
            Some(i) => {
                self.extensions.remove(i);
                Ok(())
            }
            None => Err(Error::ErrHeaderExtensionNotFound),
        }
    }
}

impl Unmarshal for Header {
    /// Unmarshal parses the passed byte slice and stores the result in a new Header.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|X|  CC   |M|     PT      |       sequence number        |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                           timestamp                          |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |           synchronization source (SSRC) identifier           |
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * |            contributing source (CSRC) identifiers            |
         * |                             ....                             |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        if raw_packet.remaining() < HEADER_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficient.into());
        }

        let b0 = raw_packet.get_u8();
        let version = (b0 >> VERSION_SHIFT) & VERSION_MASK;
        let padding = ((b0 >> PADDING_SHIFT) & PADDING_MASK) > 0;
        let extension = ((b0 >> EXTENSION_SHIFT) & EXTENSION_MASK) > 0;
        let cc = (b0 & CC_MASK) as usize;

        if raw_packet.remaining() < 3 + 4 + 4 + cc * CSRC_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficient.into());
        }

        let b1 = raw_packet.get_u8();
        let marker = ((b1 >> MARKER_SHIFT) & MARKER_MASK) > 0;
        let payload_type = b1 & PT_MASK;

        let sequence_number = raw_packet.get_u16();
        let timestamp = raw_packet.get_u32();
        let ssrc = raw_packet.get_u32();

        let mut csrc = Vec::with_capacity(cc);
        for _ in 0..cc {
            csrc.push(raw_packet.get_u32());
        }

        let mut header = Header {
            version,
            padding,
            extension,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            csrc,
            extension_profile: 0,
            extensions: vec![],
        };

        if extension {
            if raw_packet.remaining() < 4 {
                return Err(Error::ErrHeaderSizeInsufficientForExtension.into());
            }

            let extension_profile = raw_packet.get_u16();
            header.extension_profile = extension_profile;
            let extension_length = raw_packet.get_u16() as usize * 4;

            if raw_packet.remaining() < extension_length {
                return Err(Error::ErrHeaderSizeInsufficientForExtension.into());
            }

            match ExtensionProfile::from(extension_profile) {
                ExtensionProfile::OneByte => {
                    let mut consumed = 0;
                    while consumed < extension_length {
                        let b = raw_packet.chunk()[0];
                        if b == 0x00 {
                            raw_packet.advance(1);
                            consumed += 1;
                            continue;
                        }

                        let ext_id = b >> 4;
                        let len = (b as usize & !0xF0) + 1;
                        raw_packet.advance(1);
                        consumed += 1;

                        if ext_id == EXTENSION_ID_RESERVED {
                            break;
                        }

                        if consumed + len > extension_length {
                            return Err(Error::ErrHeaderSizeInsufficientForExtension.into());
                        }

                        let mut payload = vec![0u8; len];
                        raw_packet.copy_to_slice(&mut payload);
                        header.extensions.push(Extension { id: ext_id, payload });

                        consumed += len;
                    }
                }
                ExtensionProfile::TwoByte => {
                    let mut consumed = 0;
                    while consumed < extension_length {
                        let b = raw_packet.chunk()[0];
                        if b == 0x00 {
                            raw_packet.advance(1);
                            consumed += 1;
                            continue;
                        }

                        let ext_id = raw_packet.get_u8();
                        consumed += 1;
                        let len = raw_packet.get_u8() as usize;
                        consumed += 1;

                        if consumed + len > extension_length {
                            return Err(Error::ErrHeaderSizeInsufficientForExtension.into());
                        }

                        let mut payload = vec![0u8; len];
                        raw_packet.copy_to_slice(&mut payload);
                        header.extensions.push(Extension { id: ext_id, payload });

                        consumed += len;
                    }
                }
                ExtensionProfile::Undefined => {
                    let mut payload = vec![0u8; extension_length];
                    raw_packet.copy_to_slice(&mut payload);
                    header.extensions.push(Extension { id: 0, payload });
                }
            }
        }

        Ok(header)
    }
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        let mut head_size = 12 + self.csrc.len() * CSRC_LENGTH;
        if self.extension {
            let extension_payload_len = self.extension_payload_len();
            let extension_payload_size = (extension_payload_len + 3) / 4;
            head_size += 4 + extension_payload_size * 4;
        }
        head_size
    }
}

impl Marshal for Header {
    /// marshal_to serializes the header and writes it into buf, which must be
    /// at least `marshal_size()` bytes long.
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize, util::Error> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::ErrBufferTooSmall.into());
        }

        buf[0] = (self.version << VERSION_SHIFT) | self.csrc.len() as u8;
        if self.padding {
            buf[0] |= 1 << PADDING_SHIFT;
        }
        if self.extension {
            buf[0] |= 1 << EXTENSION_SHIFT;
        }

        buf[1] = self.payload_type;
        if self.marker {
            buf[1] |= 1 << MARKER_SHIFT;
        }

        buf[2..4].copy_from_slice(&self.sequence_number.to_be_bytes());
        buf[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[8..12].copy_from_slice(&self.ssrc.to_be_bytes());

        let mut offset = 12;
        for csrc in &self.csrc {
            buf[offset..offset + 4].copy_from_slice(&csrc.to_be_bytes());
            offset += 4;
        }

        if self.extension {
            let ext_header_pos = offset;
            buf[offset..offset + 2].copy_from_slice(&self.extension_profile.to_be_bytes());
            offset += 4;
            let start_extensions_pos = offset;

            match ExtensionProfile::from(self.extension_profile) {
                ExtensionProfile::OneByte => {
                    for extension in &self.extensions {
                        if extension.payload.is_empty() || extension.payload.len() > 16 {
                            return Err(Error::ErrRfc8285oneByteHeaderSize.into());
                        }
                        buf[offset] = (extension.id << 4) | (extension.payload.len() - 1) as u8;
                        offset += 1;
                        buf[offset..offset + extension.payload.len()]
                            .copy_from_slice(&extension.payload);
                        offset += extension.payload.len();
                    }
                }
                ExtensionProfile::TwoByte => {
                    for extension in &self.extensions {
                        buf[offset] = extension.id;
                        offset += 1;
                        buf[offset] = extension.payload.len() as u8;
                        offset += 1;
                        buf[offset..offset + extension.payload.len()]
                            .copy_from_slice(&extension.payload);
                        offset += extension.payload.len();
                    }
                }
                ExtensionProfile::Undefined => {
                    if let Some(extension) = self.extensions.first() {
                        if extension.payload.len() % 4 != 0 {
                            return Err(Error::HeaderExtensionPayloadNot32BitWords.into());
                        }
                        buf[offset..offset + extension.payload.len()]
                            .copy_from_slice(&extension.payload);
                        offset += extension.payload.len();
                    }
                }
            }

            let ext_size = offset - start_extensions_pos;
            let rounded_ext_size = ((ext_size + 3) / 4) * 4;
            buf[ext_header_pos + 2..ext_header_pos + 4]
                .copy_from_slice(&((rounded_ext_size / 4) as u16).to_be_bytes());

            for _ in 0..(rounded_ext_size - ext_size) {
                buf[offset] = 0;
                offset += 1;
            }
        }

        Ok(offset)
    }
}

#[cfg(test)]
mod header_test {
    use bytes::Bytes;
    use util::marshal::{Marshal, MarshalSize, Unmarshal};

    use super::*;

    #[test]
    fn test_header_unmarshal_basic() {
        let mut raw = Bytes::from_static(&[
            0x90, 0xe0, 0x69, 0x8f, 0xd9, 0xc2, 0x93, 0xda, 0x1c, 0x64, 0x27, 0x82, 0x00, 0x01,
            0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF,
        ]);

        let header = Header::unmarshal(&mut raw).unwrap();
        assert_eq!(header.version, 2);
        assert!(!header.padding);
        assert!(header.extension);
        assert!(header.marker);
        assert_eq!(header.payload_type, 96);
        assert_eq!(header.sequence_number, 27023);
        assert_eq!(header.timestamp, 3653407706);
        assert_eq!(header.ssrc, 476325762);
        assert_eq!(header.extension_profile, 1);
        assert_eq!(
            header.extensions,
            vec![Extension {
                id: 0,
                payload: vec![0xFF, 0xFF, 0xFF, 0xFF],
            }]
        );
    }

    #[test]
    fn test_header_roundtrip_one_byte_extension() {
        let mut header = Header {
            version: 2,
            marker: true,
            payload_type: 96,
            sequence_number: 27023,
            timestamp: 3653407706,
            ssrc: 476325762,
            ..Default::default()
        };
        header.set_extension(5, &[0xAA]).unwrap();

        let mut buf = vec![0u8; header.marshal_size()];
        let n = header.marshal_to(&mut buf).unwrap();
        assert_eq!(n, buf.len());

        let mut cursor = Bytes::from(buf);
        let parsed = Header::unmarshal(&mut cursor).unwrap();
        assert_eq!(parsed.get_extension(5), Some(&[0xAA][..]));
    }

    #[test]
    fn test_set_extension_errors_on_bad_id_range() {
        let mut header = Header {
            extension: true,
            extension_profile: ExtensionProfile::OneByte.into(),
            ..Default::default()
        };
        assert!(header.set_extension(15, &[0x00]).is_err());
    }

    #[test]
    fn test_del_extension_missing_errors() {
        let mut header = Header {
            extension: true,
            ..Default::default()
        };
        assert!(header.del_extension(1).is_err());
    }
}
