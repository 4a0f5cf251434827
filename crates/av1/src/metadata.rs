//! Metadata OBU payload decoding.
//! AV1-Spec-2 - 5.8
//!
//! All registered metadata types are decoded; a body shorter than its
//! syntax requires is an error. Unregistered and reserved types are
//! returned undecoded as [`Metadata::Other`].

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Av1Error, Result};
use crate::obu::utils::read_leb128;

/// `metadata_type`
/// AV1-Spec-2 - 6.7.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataType {
    /// `METADATA_TYPE_HDR_CLL`
    HdrCll,
    /// `METADATA_TYPE_HDR_MDCV`
    HdrMdcv,
    /// `METADATA_TYPE_SCALABILITY`
    Scalability,
    /// `METADATA_TYPE_ITUT_T35`
    ItuT35,
    /// `METADATA_TYPE_TIMECODE`
    Timecode,
    /// Unregistered user private (6..=31)
    Unregistered(u64),
    /// Reserved (0 and 32 or greater)
    Reserved(u64),
}

impl From<u64> for MetadataType {
    fn from(value: u64) -> Self {
        match value {
            1 => MetadataType::HdrCll,
            2 => MetadataType::HdrMdcv,
            3 => MetadataType::Scalability,
            4 => MetadataType::ItuT35,
            5 => MetadataType::Timecode,
            6..=31 => MetadataType::Unregistered(value),
            _ => MetadataType::Reserved(value),
        }
    }
}

/// Content light level information.
/// AV1-Spec-2 - 5.8.3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdrCll {
    /// `max_cll`
    pub max_cll: u16,
    /// `max_fall`
    pub max_fall: u16,
}

/// Mastering display colour volume.
/// AV1-Spec-2 - 5.8.4
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HdrMdcv {
    /// `primary_chromaticity_x` / `primary_chromaticity_y` for R, G, B.
    pub primaries: [(u16, u16); 3],
    /// `white_point_chromaticity_x` / `white_point_chromaticity_y`
    pub white_point: (u16, u16),
    /// `luminance_max`, 24.8 fixed point
    pub luminance_max: u32,
    /// `luminance_min`, 18.14 fixed point
    pub luminance_min: u32,
}

/// ITU-T T.35 registered user data.
/// AV1-Spec-2 - 5.8.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItuT35<'a> {
    /// `itu_t_t35_country_code`
    pub country_code: u8,
    /// `itu_t_t35_country_code_extension_byte`, present when the country
    /// code is `0xFF`.
    pub country_code_extension: Option<u8>,
    /// `itu_t_t35_payload_bytes`, everything after the country code.
    pub payload: &'a [u8],
}

/// `scalability_mode_idc` value that carries a `scalability_structure`.
const SCALABILITY_SS: u8 = 14;

/// Scalability metadata.
/// AV1-Spec-2 - 5.8.5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalability {
    /// `scalability_mode_idc`
    pub mode_idc: u8,
    /// `scalability_structure`, present when `mode_idc` is `SCALABILITY_SS`.
    pub structure: Option<ScalabilityStructure>,
}

/// Explicit layer description of a `SCALABILITY_SS` stream.
/// AV1-Spec-2 - 5.8.6
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalabilityStructure {
    /// `spatial_layers_cnt_minus_1`
    pub spatial_layers_cnt_minus_1: u8,
    /// `spatial_layer_max_width` / `spatial_layer_max_height` per layer,
    /// empty unless `spatial_layer_dimensions_present_flag` is set.
    pub spatial_layer_dimensions: Vec<(u16, u16)>,
    /// `spatial_layer_ref_id` per layer.
    pub spatial_layer_ref_ids: Vec<u8>,
    /// Temporal group entries, empty unless `temporal_group_description_present_flag` is set.
    pub temporal_group: Vec<TemporalGroupEntry>,
}

/// One picture of a temporal group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalGroupEntry {
    /// `temporal_group_temporal_id`
    pub temporal_id: u8,
    /// `temporal_group_temporal_switching_up_point_flag`
    pub temporal_switching_up_point: bool,
    /// `temporal_group_spatial_switching_up_point_flag`
    pub spatial_switching_up_point: bool,
    /// `temporal_group_ref_pic_diff`
    pub ref_pic_diff: Vec<u8>,
}

/// Timecode metadata.
/// AV1-Spec-2 - 5.8.7
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timecode {
    /// `counting_type`
    pub counting_type: u8,
    /// `full_timestamp_flag`
    pub full_timestamp: bool,
    /// `discontinuity_flag`
    pub discontinuity: bool,
    /// `cnt_dropped_flag`
    pub cnt_dropped: bool,
    /// `n_frames`
    pub n_frames: u16,
    /// `seconds_value`, `None` when not signalled.
    pub seconds: Option<u8>,
    /// `minutes_value`, `None` when not signalled.
    pub minutes: Option<u8>,
    /// `hours_value`, `None` when not signalled.
    pub hours: Option<u8>,
    /// `time_offset_length`
    pub time_offset_length: u8,
    /// `time_offset_value`
    pub time_offset_value: u32,
}

/// A decoded metadata OBU payload borrowing from the OBU data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata<'a> {
    /// `METADATA_TYPE_HDR_CLL`
    HdrCll(HdrCll),
    /// `METADATA_TYPE_HDR_MDCV`
    HdrMdcv(HdrMdcv),
    /// `METADATA_TYPE_SCALABILITY`
    Scalability(Scalability),
    /// `METADATA_TYPE_ITUT_T35`
    ItuT35(ItuT35<'a>),
    /// `METADATA_TYPE_TIMECODE`
    Timecode(Timecode),
    /// Unregistered or reserved metadata, left undecoded.
    Other {
        /// The `metadata_type` value.
        metadata_type: MetadataType,
        /// Bytes following `metadata_type`.
        data: &'a [u8],
    },
}

impl<'a> Metadata<'a> {
    /// Decodes a metadata OBU payload.
    ///
    /// `payload` must be exactly the OBU payload: header and size field
    /// excluded, nothing from the following OBU included.
    pub fn parse(payload: &'a [u8]) -> Result<Self> {
        if payload.is_empty() {
            return Err(Av1Error::InvalidMetadata("empty metadata OBU".into()));
        }

        let (metadata_type, type_len) = read_leb128(payload).map_err(|e| match e {
            Av1Error::NeedMoreData { .. } => {
                Av1Error::InvalidMetadata("truncated metadata_type".into())
            }
            e => e,
        })?;
        let metadata_type = MetadataType::from(metadata_type);
        let data = &payload[type_len..];

        match metadata_type {
            MetadataType::HdrCll => parse_hdr_cll(data).map(Metadata::HdrCll),
            MetadataType::HdrMdcv => parse_hdr_mdcv(data).map(Metadata::HdrMdcv),
            MetadataType::Scalability => parse_scalability(data).map(Metadata::Scalability),
            MetadataType::ItuT35 => parse_itut_t35(data).map(Metadata::ItuT35),
            MetadataType::Timecode => parse_timecode(data).map(Metadata::Timecode),
            metadata_type => Ok(Metadata::Other {
                metadata_type,
                data,
            }),
        }
    }

}

fn truncated(what: &'static str) -> impl FnOnce(std::io::Error) -> Av1Error {
    move |_| Av1Error::InvalidMetadata(format!("truncated {what}"))
}

fn parse_hdr_cll(mut data: &[u8]) -> Result<HdrCll> {
    let max_cll = data.read_u16::<BigEndian>().map_err(truncated("HDR CLL"))?;
    let max_fall = data.read_u16::<BigEndian>().map_err(truncated("HDR CLL"))?;
    Ok(HdrCll { max_cll, max_fall })
}

fn parse_hdr_mdcv(mut data: &[u8]) -> Result<HdrMdcv> {
    let mut primaries = [(0u16, 0u16); 3];
    for primary in &mut primaries {
        let x = data.read_u16::<BigEndian>().map_err(truncated("HDR MDCV"))?;
        let y = data.read_u16::<BigEndian>().map_err(truncated("HDR MDCV"))?;
        *primary = (x, y);
    }
    let white_x = data.read_u16::<BigEndian>().map_err(truncated("HDR MDCV"))?;
    let white_y = data.read_u16::<BigEndian>().map_err(truncated("HDR MDCV"))?;
    let luminance_max = data.read_u32::<BigEndian>().map_err(truncated("HDR MDCV"))?;
    let luminance_min = data.read_u32::<BigEndian>().map_err(truncated("HDR MDCV"))?;

    Ok(HdrMdcv {
        primaries,
        white_point: (white_x, white_y),
        luminance_max,
        luminance_min,
    })
}

fn parse_itut_t35(data: &[u8]) -> Result<ItuT35<'_>> {
    let Some((&country_code, rest)) = data.split_first() else {
        return Err(Av1Error::InvalidMetadata(
            "missing itu_t_t35_country_code".into(),
        ));
    };

    let (country_code_extension, payload) = if country_code == 0xFF {
        let Some((&extension, rest)) = rest.split_first() else {
            return Err(Av1Error::InvalidMetadata(
                "missing itu_t_t35_country_code_extension_byte".into(),
            ));
        };
        (Some(extension), rest)
    } else {
        (None, rest)
    };

    Ok(ItuT35 {
        country_code,
        country_code_extension,
        payload,
    })
}

fn parse_scalability(mut data: &[u8]) -> Result<Scalability> {
    let mode_idc = data.read_u8().map_err(truncated("scalability"))?;
    if mode_idc != SCALABILITY_SS {
        return Ok(Scalability {
            mode_idc,
            structure: None,
        });
    }

    let flags = data.read_u8().map_err(truncated("scalability structure"))?;
    let spatial_layers_cnt_minus_1 = flags >> 6;
    let layers = usize::from(spatial_layers_cnt_minus_1) + 1;
    let mut structure = ScalabilityStructure {
        spatial_layers_cnt_minus_1,
        ..Default::default()
    };

    if flags & 0x20 != 0 {
        for _ in 0..layers {
            let width = data.read_u16::<BigEndian>().map_err(truncated("spatial layer size"))?;
            let height = data.read_u16::<BigEndian>().map_err(truncated("spatial layer size"))?;
            structure
                .spatial_layer_dimensions
                .push((width, height));
        }
    }

    if flags & 0x10 != 0 {
        for _ in 0..layers {
            let ref_id = data.read_u8().map_err(truncated("spatial layer description"))?;
            structure.spatial_layer_ref_ids.push(ref_id);
        }
    }

    if flags & 0x08 != 0 {
        let group_size = data.read_u8().map_err(truncated("temporal group"))?;
        for _ in 0..group_size {
            let entry = data.read_u8().map_err(truncated("temporal group"))?;
            let ref_cnt = usize::from(entry & 0x07);
            if data.len() < ref_cnt {
                return Err(Av1Error::InvalidMetadata("truncated temporal group".into()));
            }
            let (ref_pic_diff, rest) = data.split_at(ref_cnt);
            data = rest;
            structure.temporal_group.push(TemporalGroupEntry {
                temporal_id: entry >> 5,
                temporal_switching_up_point: entry & 0x10 != 0,
                spatial_switching_up_point: entry & 0x08 != 0,
                ref_pic_diff: ref_pic_diff.to_vec(),
            });
        }
    }

    Ok(Scalability {
        mode_idc,
        structure: Some(structure),
    })
}

fn parse_timecode(data: &[u8]) -> Result<Timecode> {
    let mut reader = BitReader::new(data);
    let mut timecode = Timecode {
        counting_type: reader.read_bits(5)? as u8,
        full_timestamp: reader.read_bit()?,
        discontinuity: reader.read_bit()?,
        cnt_dropped: reader.read_bit()?,
        n_frames: reader.read_bits(9)? as u16,
        ..Default::default()
    };

    if timecode.full_timestamp {
        timecode.seconds = Some(reader.read_bits(6)? as u8);
        timecode.minutes = Some(reader.read_bits(6)? as u8);
        timecode.hours = Some(reader.read_bits(5)? as u8);
    } else if reader.read_bit()? {
        timecode.seconds = Some(reader.read_bits(6)? as u8);
        if reader.read_bit()? {
            timecode.minutes = Some(reader.read_bits(6)? as u8);
            if reader.read_bit()? {
                timecode.hours = Some(reader.read_bits(5)? as u8);
            }
        }
    }

    timecode.time_offset_length = reader.read_bits(5)? as u8;
    if timecode.time_offset_length > 0 {
        timecode.time_offset_value = reader.read_bits(timecode.time_offset_length)?;
    }

    Ok(timecode)
}

/// MSB-first reader over a metadata body.
struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    fn read_bit(&mut self) -> Result<bool> {
        let byte = self
            .data
            .get(self.bit_pos / 8)
            .ok_or_else(|| Av1Error::InvalidMetadata("truncated timecode".into()))?;
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Ok(bit == 1)
    }

    /// Reads up to 32 bits.
    fn read_bits(&mut self, count: u8) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }
}
