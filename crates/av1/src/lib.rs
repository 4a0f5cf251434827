//! A crate for locating and decoding AV1 Open Bitstream Units.
//!
//! Supports:
//! - OBU (Open Bitstream Unit) header parsing and writing
//! - Boundary location of low-overhead OBU streams held in partial buffers
//! - Metadata OBU decoding (HDR CLL, HDR MDCV, scalability, ITU-T T.35, timecode)
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or
//! [Apache-2.0](./LICENSE.Apache-2.0) license. You can choose between one of
//! them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod metadata;
mod obu;
pub mod obu_stream;

pub use error::{Av1Error, Result};
pub use metadata::{
    HdrCll, HdrMdcv, ItuT35, Metadata, MetadataType, Scalability, ScalabilityStructure,
    TemporalGroupEntry, Timecode,
};
pub use obu::utils::{leb128_size, read_leb128, write_leb128};
pub use obu::{ObuExtensionHeader, ObuHeader, ObuType};
pub use obu_stream::{ObuSpan, locate_obu, write_obu};
