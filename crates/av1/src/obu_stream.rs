//! Low-overhead OBU location and writing.
//!
//! This module handles the low-overhead bitstream format defined in
//! the AV1 specification (Section 5.2), where OBUs are concatenated
//! with `obu_has_size_field=1`.
//!
//! Per the AV1 specification, `obu_has_size_field` MUST be 1 for all OBUs in the
//! pure low-overhead format. Container formats may drop the size field on
//! the last OBU of a sample, but a raw elementary stream has no outer
//! framing to recover the size from, so this module rejects such OBUs.
//!
//! [`locate_obu`] works on partial buffers: when the buffer ends inside an
//! OBU it reports how many bytes are needed instead of failing, so callers
//! streaming through a fixed window can refill and retry.

use std::io;

use crate::error::{Av1Error, Result};
use crate::obu::{ObuExtensionHeader, ObuHeader, ObuType};

/// Location and identity of one OBU at the start of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObuSpan {
    /// `obu_type`
    pub obu_type: ObuType,
    /// Bytes taken by the OBU header, extension header and `obu_size` field.
    pub header_len: usize,
    /// `obu_size`: bytes of payload following the header.
    pub payload_len: usize,
    /// `temporal_id`, 0 without an extension header.
    pub temporal_id: u8,
    /// `spatial_id`, 0 without an extension header.
    pub spatial_id: u8,
}

impl ObuSpan {
    /// Total encoded size of the OBU, header included.
    pub fn total_len(&self) -> usize {
        self.header_len + self.payload_len
    }

    /// Byte range of the payload relative to the start of the OBU.
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        self.header_len..self.total_len()
    }
}

/// Locates the OBU starting at `data[0]`.
///
/// Succeeds only when the whole OBU (header and payload) lies within
/// `data`; an OBU ending exactly at the end of `data` is complete.
///
/// # Errors
///
/// - [`Av1Error::NeedMoreData`] when `data` ends inside the OBU. Once the
///   header has been read, `required` is the full OBU size; before that it
///   is the smallest size that lets header parsing advance.
/// - [`Av1Error::InvalidObu`] for a set forbidden bit or a missing size field.
/// - [`Av1Error::Leb128Overflow`] for an `obu_size` above `u32::MAX`, or one
///   whose total OBU size does not fit in `usize`.
pub fn locate_obu(data: &[u8]) -> Result<ObuSpan> {
    let (header, header_len) = ObuHeader::parse(data)?;

    let size = header.size.ok_or_else(|| {
        Av1Error::InvalidObu("obu_has_size_field must be 1 in low-overhead bitstream".into())
    })?;
    let payload_len = usize::try_from(size).map_err(|_| Av1Error::Leb128Overflow)?;

    let total_len = header_len
        .checked_add(payload_len)
        .ok_or(Av1Error::Leb128Overflow)?;
    if total_len > data.len() {
        return Err(Av1Error::NeedMoreData {
            required: total_len,
            available: data.len(),
        });
    }

    let (temporal_id, spatial_id) = header
        .extension_header
        .map_or((0, 0), |ext| (ext.temporal_id, ext.spatial_id));

    Ok(ObuSpan {
        obu_type: header.obu_type,
        header_len,
        payload_len,
        temporal_id,
        spatial_id,
    })
}

/// Writes a single OBU in low-overhead bitstream format.
///
/// Constructs the OBU header with `obu_has_size_field=1` and writes the
/// header followed by the payload data.
///
/// Returns the total number of bytes written (header + payload).
pub fn write_obu<W: io::Write>(
    writer: &mut W,
    obu_type: ObuType,
    extension_header: Option<ObuExtensionHeader>,
    payload: &[u8],
) -> Result<usize> {
    let header = ObuHeader {
        obu_type,
        size: Some(payload.len() as u64),
        extension_header,
    };

    let header_bytes = header.mux(writer)?;
    writer.write_all(payload)?;

    Ok(header_bytes + payload.len())
}

#[cfg(test)]
#[cfg_attr(all(coverage_nightly, test), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_locate_single_obu() {
        // Sequence header OBU: type=1, has_size=1, size=15
        let data = b"\n\x0f\0\0\0j\xef\xbf\xe1\xbc\x02\x19\x90\x10\x10\x10@";
        let span = locate_obu(data).unwrap();
        insta::assert_debug_snapshot!(span, @r"
        ObuSpan {
            obu_type: SequenceHeader,
            header_len: 2,
            payload_len: 15,
            temporal_id: 0,
            spatial_id: 0,
        }
        ");
        assert_eq!(span.total_len(), data.len());
    }

    #[test]
    fn test_locate_ignores_trailing_bytes() {
        let mut data = Vec::new();
        write_obu(&mut data, ObuType::Padding, None, &[0xAA, 0xBB]).unwrap();
        write_obu(&mut data, ObuType::Frame, None, &[0x01; 40]).unwrap();

        let span = locate_obu(&data).unwrap();
        assert_eq!(span.obu_type, ObuType::Padding);
        assert_eq!(span.total_len(), 4);
        assert_eq!(&data[span.payload_range()], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_locate_extension_ids() {
        let mut data = Vec::new();
        let ext = ObuExtensionHeader {
            temporal_id: 5,
            spatial_id: 3,
        };
        write_obu(&mut data, ObuType::Metadata, Some(ext), b"meta").unwrap();

        let span = locate_obu(&data).unwrap();
        assert_eq!(span.header_len, 3);
        assert_eq!(span.temporal_id, 5);
        assert_eq!(span.spatial_id, 3);
        assert_eq!(span.total_len(), 7);
    }

    #[test]
    fn test_locate_partial_payload_reports_full_size() {
        let mut data = Vec::new();
        write_obu(&mut data, ObuType::Frame, None, &[0u8; 200]).unwrap();
        assert_eq!(data.len(), 203);

        let err = locate_obu(&data[..50]).unwrap_err();
        assert!(matches!(
            err,
            Av1Error::NeedMoreData {
                required: 203,
                available: 50
            }
        ));

        // one byte short
        let err = locate_obu(&data[..202]).unwrap_err();
        assert!(matches!(err, Av1Error::NeedMoreData { required: 203, .. }));
    }

    #[test]
    fn test_locate_partial_header() {
        let mut data = Vec::new();
        write_obu(&mut data, ObuType::Frame, None, &[0u8; 200]).unwrap();

        // size field is two bytes, only the first is present
        let err = locate_obu(&data[..2]).unwrap_err();
        assert!(matches!(
            err,
            Av1Error::NeedMoreData {
                required: 3,
                available: 2
            }
        ));

        let err = locate_obu(&[]).unwrap_err();
        assert!(matches!(err, Av1Error::NeedMoreData { required: 1, .. }));
    }

    #[test]
    fn test_locate_empty_payload() {
        let mut data = Vec::new();
        write_obu(&mut data, ObuType::TemporalDelimiter, None, &[]).unwrap();
        assert_eq!(data, [0x12, 0x00]);

        let span = locate_obu(&data).unwrap();
        assert_eq!(span.obu_type, ObuType::TemporalDelimiter);
        assert_eq!(span.payload_len, 0);
        assert_eq!(span.total_len(), 2);
    }

    #[test]
    fn test_obu_without_size_field_errors() {
        // OBU header byte: type=1, extension=0, has_size=0, reserved=0
        // 0b0_0001_0_0_0 = 0x08
        let err = locate_obu(&[0x08, 0xFF]).unwrap_err();
        assert!(matches!(err, Av1Error::InvalidObu(_)));
    }

    #[test]
    fn test_obu_size_overflow() {
        let err = locate_obu(&[0x0A, 0x80, 0x80, 0x80, 0x80, 0x10]).unwrap_err();
        assert!(matches!(err, Av1Error::Leb128Overflow));
    }

    #[test]
    fn test_obu_size_at_u32_max() {
        // Frame OBU with obu_size = u32::MAX
        let data = [0x32, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F, 0x00];
        let result = locate_obu(&data);

        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            result,
            Err(Av1Error::NeedMoreData {
                required: 4_294_967_301,
                available: 7
            })
        ));
        #[cfg(target_pointer_width = "32")]
        assert!(matches!(result, Err(Av1Error::Leb128Overflow)));
    }
}
