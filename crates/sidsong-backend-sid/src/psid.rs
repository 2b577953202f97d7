//! PSID v2 container: fixed 0x76-byte header followed by the program image.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use sidsong_spec::SongMetadata;
use std::io::{self, Cursor, Read, Write};

use crate::asm::layout::{LIBRARY_LOAD, LIBRARY_PLAY};

/// PSID magic identifier.
pub const PSID_MAGIC: &[u8; 4] = b"PSID";

/// PSID format version.
pub const PSID_VERSION: u16 = 2;

/// Header size, which is also the offset of the image data.
pub const PSID_HEADER_SIZE: u16 = 0x76;

/// Width of each metadata text field.
pub const TEXT_FIELD_LEN: usize = 32;

/// Little-endian load address prefix of an image loaded at `$1000`.
pub const LOAD_ADDRESS_PREFIX: [u8; 2] = [0x00, 0x10];

/// PSID header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsidHeader {
    /// 0 means the load address is taken from the first two image bytes.
    pub load_address: u16,
    pub init_address: u16,
    pub play_address: u16,
    pub songs: u16,
    pub start_song: u16,
    /// One bit per song; 0 selects vertical-blank timing.
    pub speed: u32,
    pub title: String,
    pub author: String,
    pub released: String,
}

impl Default for PsidHeader {
    fn default() -> Self {
        Self {
            load_address: 0,
            init_address: LIBRARY_LOAD,
            play_address: LIBRARY_PLAY,
            songs: 1,
            start_song: 1,
            speed: 0,
            title: String::new(),
            author: String::new(),
            released: String::new(),
        }
    }
}

impl PsidHeader {
    /// Header for a single-song library image.
    pub fn new(metadata: SongMetadata<'_>) -> Self {
        Self {
            title: metadata.title.to_string(),
            author: metadata.author.to_string(),
            released: metadata.released.to_string(),
            ..Default::default()
        }
    }

    /// Write the header to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(PSID_MAGIC)?;
        writer.write_u16::<BigEndian>(PSID_VERSION)?;
        writer.write_u16::<BigEndian>(PSID_HEADER_SIZE)?;
        writer.write_u16::<BigEndian>(self.load_address)?;
        writer.write_u16::<BigEndian>(self.init_address)?;
        writer.write_u16::<BigEndian>(self.play_address)?;
        writer.write_u16::<BigEndian>(self.songs)?;
        writer.write_u16::<BigEndian>(self.start_song)?;
        writer.write_u32::<BigEndian>(self.speed)?;
        writer.write_all(&text_field(&self.title))?;
        writer.write_all(&text_field(&self.author))?;
        writer.write_all(&text_field(&self.released))?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PSID_HEADER_SIZE as usize);
        // Writing to a Vec cannot fail.
        let _ = self.write(&mut buf);
        buf
    }

    /// Parse a header from the start of a PSID file.
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        let mut r = Cursor::new(bytes);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != PSID_MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "not a PSID file"));
        }
        let version = r.read_u16::<BigEndian>()?;
        let data_offset = r.read_u16::<BigEndian>()?;
        if version != PSID_VERSION || data_offset != PSID_HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unsupported PSID version {} with data offset {:#x}",
                    version, data_offset
                ),
            ));
        }

        Ok(Self {
            load_address: r.read_u16::<BigEndian>()?,
            init_address: r.read_u16::<BigEndian>()?,
            play_address: r.read_u16::<BigEndian>()?,
            songs: r.read_u16::<BigEndian>()?,
            start_song: r.read_u16::<BigEndian>()?,
            speed: r.read_u32::<BigEndian>()?,
            title: read_text_field(&mut r)?,
            author: read_text_field(&mut r)?,
            released: read_text_field(&mut r)?,
        })
    }
}

/// ASCII, NUL-padded and truncated to the field width. Characters outside
/// printable ASCII become `?`.
fn text_field(text: &str) -> [u8; TEXT_FIELD_LEN] {
    let mut buf = [0u8; TEXT_FIELD_LEN];
    for (slot, c) in buf.iter_mut().zip(text.chars()) {
        *slot = if c.is_ascii() && !c.is_ascii_control() {
            c as u8
        } else {
            b'?'
        };
    }
    buf
}

fn read_text_field(r: &mut Cursor<&[u8]>) -> io::Result<String> {
    let mut buf = [0u8; TEXT_FIELD_LEN];
    r.read_exact(&mut buf)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(TEXT_FIELD_LEN);
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Header, load-address prefix (added only when missing), then the image.
pub fn package(image: &[u8], metadata: SongMetadata<'_>) -> Vec<u8> {
    let mut out = PsidHeader::new(metadata).to_bytes();
    if !image.starts_with(&LOAD_ADDRESS_PREFIX) {
        log::debug!("image has no load address, prepending $1000");
        out.extend_from_slice(&LOAD_ADDRESS_PREFIX);
    }
    out.extend_from_slice(image);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EMPTY: SongMetadata<'static> = SongMetadata {
        title: "",
        author: "",
        released: "",
    };

    #[test]
    fn test_header_write() {
        let bytes = PsidHeader::default().to_bytes();
        assert_eq!(bytes.len(), 0x76);
        assert_eq!(
            &bytes[..0x16],
            &[
                0x50, 0x53, 0x49, 0x44, 0x00, 0x02, 0x00, 0x76, 0x00, 0x00, 0x10, 0x00, 0x10,
                0x03, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00
            ]
        );
        assert!(bytes[0x16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_text_fields_are_padded_and_truncated() {
        let long = "A".repeat(40);
        let header = PsidHeader::new(SongMetadata {
            title: "Cave Theme",
            author: &long,
            released: "1987 Caf\u{e9}",
        });
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0x16..0x20], b"Cave Theme");
        assert_eq!(bytes[0x20], 0);
        assert_eq!(&bytes[0x36..0x56], "A".repeat(32).as_bytes());
        assert_eq!(&bytes[0x56..0x5f], b"1987 Caf?");
    }

    #[test]
    fn test_header_parses_back() {
        let header = PsidHeader::new(SongMetadata {
            title: "Title",
            author: "Someone",
            released: "2024",
        });
        let parsed = PsidHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.play_address, 0x1003);
    }

    #[test]
    fn test_from_bytes_rejects_other_magic() {
        let mut bytes = PsidHeader::default().to_bytes();
        bytes[0] = b'R';
        assert!(PsidHeader::from_bytes(&bytes).is_err());
        assert!(PsidHeader::from_bytes(&bytes[..10]).is_err());
    }

    #[test]
    fn test_package_adds_prefix_only_when_missing() {
        let with_prefix = package(&[0x00, 0x10, 0x4c, 0x00], EMPTY);
        assert_eq!(with_prefix.len(), 0x76 + 4);
        assert_eq!(&with_prefix[0x76..], &[0x00, 0x10, 0x4c, 0x00]);

        let bare = package(&[0x4c, 0x00], EMPTY);
        assert_eq!(&bare[0x76..], &[0x00, 0x10, 0x4c, 0x00]);
    }
}
