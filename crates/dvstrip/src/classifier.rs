//! Dolby Vision RPU detection for AV1 metadata OBUs.
//!
//! Dolby Vision carries its RPU in ITU-T T.35 metadata OBUs registered to
//! the United States (`0xB5`) under the Dolby terminal provider code
//! `0x003B`.

use av1::{ItuT35, Metadata, ObuSpan, ObuType};
use tracing::trace;

/// `itu_t_t35_country_code` for the United States.
pub const ITU_T_T35_COUNTRY_CODE_USA: u8 = 0xB5;

/// Leading T.35 payload bytes of a Dolby Vision RPU.
pub const DOLBY_VISION_PAYLOAD_PREFIX: [u8; 2] = [0x00, 0x3B];

/// What to do with an OBU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Dolby Vision: count it and leave it out of the output.
    Drop,
    /// Everything else: pass it through untouched.
    Forward,
}

/// Returns `true` if the T.35 message is a Dolby Vision RPU.
pub fn is_dolby_vision_rpu(t35: &ItuT35<'_>) -> bool {
    t35.country_code == ITU_T_T35_COUNTRY_CODE_USA
        && t35.payload.starts_with(&DOLBY_VISION_PAYLOAD_PREFIX)
}

/// Classifies one OBU given its span and payload bytes.
///
/// Only metadata OBUs are decoded. A metadata payload that fails to decode
/// is an error, never a silent [`Verdict::Forward`].
pub fn classify(span: &ObuSpan, payload: &[u8]) -> av1::Result<Verdict> {
    if span.obu_type != ObuType::Metadata {
        return Ok(Verdict::Forward);
    }

    let verdict = match Metadata::parse(payload)? {
        Metadata::ItuT35(t35) if is_dolby_vision_rpu(&t35) => Verdict::Drop,
        Metadata::HdrCll(cll) => {
            trace!(max_cll = cll.max_cll, max_fall = cll.max_fall, "HDR CLL metadata");
            Verdict::Forward
        }
        Metadata::HdrMdcv(mdcv) => {
            trace!(
                luminance_max = mdcv.luminance_max,
                luminance_min = mdcv.luminance_min,
                "HDR MDCV metadata"
            );
            Verdict::Forward
        }
        Metadata::Timecode(timecode) => {
            trace!(n_frames = timecode.n_frames, "timecode metadata");
            Verdict::Forward
        }
        _ => Verdict::Forward,
    };
    Ok(verdict)
}
