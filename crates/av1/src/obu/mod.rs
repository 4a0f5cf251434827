use std::io;

use crate::error::{Av1Error, Result};
use utils::read_leb128;

pub mod utils;

/// OBU Header
/// AV1-Spec-2 - 5.3.2
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct ObuHeader {
    /// `obu_type`
    ///
    /// 4 bits
    pub obu_type: ObuType,
    /// `obu_size` if `obu_has_size_field` is 1
    ///
    /// leb128()
    pub size: Option<u64>,
    /// `obu_extension_header()` if `obu_extension_flag` is 1
    pub extension_header: Option<ObuExtensionHeader>,
}

/// Obu Header Extension
/// AV1-Spec-2 - 5.3.3
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct ObuExtensionHeader {
    /// `temporal_id`
    pub temporal_id: u8,
    /// `spatial_id`
    pub spatial_id: u8,
}

impl ObuHeader {
    /// Parses an OBU header from the start of `data`.
    ///
    /// Returns the header and the number of bytes it occupies, including
    /// the `obu_size` field. A header cut short by the end of `data` yields
    /// [`Av1Error::NeedMoreData`].
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        let Some(&first) = data.first() else {
            return Err(Av1Error::NeedMoreData {
                required: 1,
                available: 0,
            });
        };

        if first & 0x80 != 0 {
            return Err(Av1Error::InvalidObu("obu_forbidden_bit is not 0".into()));
        }

        let obu_type = ObuType::from((first >> 3) & 0x0f);
        let extension_flag = first & 0x04 != 0;
        let has_size_field = first & 0x02 != 0;
        // bit 0 is obu_reserved_1bit
        let mut header_len = 1;

        let extension_header = if extension_flag {
            let Some(&ext) = data.get(1) else {
                return Err(Av1Error::NeedMoreData {
                    required: 2,
                    available: data.len(),
                });
            };
            header_len += 1;
            Some(ObuExtensionHeader {
                temporal_id: ext >> 5,
                spatial_id: (ext >> 3) & 0x03,
            })
        } else {
            None
        };

        let size = if has_size_field {
            let (size, size_len) = match read_leb128(&data[header_len..]) {
                Ok(parsed) => parsed,
                Err(Av1Error::NeedMoreData { required, .. }) => {
                    return Err(Av1Error::NeedMoreData {
                        required: header_len + required,
                        available: data.len(),
                    });
                }
                Err(e) => return Err(e),
            };
            header_len += size_len;
            Some(size)
        } else {
            None
        };

        Ok((
            ObuHeader {
                obu_type,
                size,
                extension_header,
            },
            header_len,
        ))
    }

    /// Writes this OBU header to the given writer.
    ///
    /// If `self.size` is `Some`, writes with `obu_has_size_field=1` and
    /// encodes the size as LEB128. If `None`, writes with `obu_has_size_field=0`.
    ///
    /// Returns the number of bytes written.
    pub fn mux<W: io::Write>(&self, writer: &mut W) -> io::Result<usize> {
        let mut first = (u8::from(self.obu_type) & 0x0f) << 3;
        if self.extension_header.is_some() {
            first |= 0x04;
        }
        if self.size.is_some() {
            first |= 0x02;
        }
        writer.write_all(&[first])?;
        let mut bytes_written = 1;

        if let Some(ext) = &self.extension_header {
            writer.write_all(&[((ext.temporal_id & 0x07) << 5) | ((ext.spatial_id & 0x03) << 3)])?;
            bytes_written += 1;
        }

        if let Some(size) = self.size {
            bytes_written += utils::write_leb128(writer, size)?;
        }

        Ok(bytes_written)
    }

    /// Returns the encoded size of this OBU header in bytes.
    pub fn header_size(&self) -> usize {
        let base = if self.extension_header.is_some() { 2 } else { 1 };
        let size_field = self.size.map_or(0, utils::leb128_size);
        base + size_field
    }
}

/// OBU Type
/// AV1-Spec-2 - 6.2.2
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum ObuType {
    /// `OBU_SEQUENCE_HEADER`
    SequenceHeader,
    /// `OBU_TEMPORAL_DELIMITER`
    TemporalDelimiter,
    /// `OBU_FRAME_HEADER`
    FrameHeader,
    /// `OBU_TILE_GROUP`
    TileGroup,
    /// `OBU_METADATA`
    Metadata,
    /// `OBU_FRAME`
    Frame,
    /// `OBU_REDUNDANT_FRAME_HEADER`
    RedundantFrameHeader,
    /// `OBU_TILE_LIST`
    TileList,
    /// `OBU_PADDING`
    Padding,
    /// Reserved
    Reserved(u8),
}

impl From<u8> for ObuType {
    fn from(value: u8) -> Self {
        match value {
            1 => ObuType::SequenceHeader,
            2 => ObuType::TemporalDelimiter,
            3 => ObuType::FrameHeader,
            4 => ObuType::TileGroup,
            5 => ObuType::Metadata,
            6 => ObuType::Frame,
            7 => ObuType::RedundantFrameHeader,
            8 => ObuType::TileList,
            15 => ObuType::Padding,
            _ => ObuType::Reserved(value),
        }
    }
}

impl From<ObuType> for u8 {
    fn from(value: ObuType) -> Self {
        match value {
            ObuType::SequenceHeader => 1,
            ObuType::TemporalDelimiter => 2,
            ObuType::FrameHeader => 3,
            ObuType::TileGroup => 4,
            ObuType::Metadata => 5,
            ObuType::Frame => 6,
            ObuType::RedundantFrameHeader => 7,
            ObuType::TileList => 8,
            ObuType::Padding => 15,
            ObuType::Reserved(value) => value,
        }
    }
}
