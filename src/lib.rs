//! # Forward error correction for digital communication links
//!
//! This crate implements three tightly related coding primitives for
//! digital links:
//!
//! - A bitwise [`Interleaver`] that multiplexes the output streams of a
//!   rate-1/k convolutional encoder into a single byte stream under an
//!   arbitrary puncturing matrix, and reverses the process.
//! - A systematic polar code: [`PolarCode`] derives the non-frozen bit
//!   positions for a block size, shortened length and information length,
//!   [`PolarEncoder`] produces systematic codewords, and
//!   [`SuccessiveCancellationDecoder`] decodes them with a fast simplified
//!   successive cancellation (f-SSC) tree that recognises rate-0, rate-1,
//!   repetition and single-parity-check subtrees.
//! - A [`ReedSolomonEncoder`] over GF(2^M) (see [`GaloisField`]) with
//!   systematic encoding, syndrome checking, and error correction up to
//!   half the parity length.
//!
//! All codecs validate their parameters at construction and are immutable
//! afterwards, so a single instance can serve any number of blocks and
//! threads. The [`utils`] and [`sim`] modules provide the supporting pieces
//! for exercising the codes over a BPSK-AWGN channel.
//!
//! # Examples
//!
//! Encode and decode a block with a shortened (1024, 768, 512) polar code:
//! ```
//! use linkfec::{PolarCode, PolarEncoder, SuccessiveCancellationDecoder};
//!
//! let code = PolarCode::new(1024, 768, 512, PolarCode::DEFAULT_DESIGN_SNR)?;
//! let encoder = PolarEncoder::new(&code)?;
//! let decoder = SuccessiveCancellationDecoder::new(&code, 1)?;
//!
//! let data = vec![0x5A; 64];
//! let mut encoded = Vec::new();
//! encoder.encode(&data, &mut encoded)?;
//! assert_eq!(encoded.len(), 96);
//!
//! let mut decoded = Vec::new();
//! decoder.decode(&encoded, &mut decoded)?;
//! assert_eq!(decoded, data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Protect a 255-byte block with an outer (255, 223) Reed-Solomon code:
//! ```
//! use linkfec::{gf::polynomials, ReedSolomonEncoder};
//!
//! let rs = ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 32)?;
//! let mut buffer = vec![0x17; 255];
//! rs.encode(&mut buffer)?;
//! assert_eq!(rs.check(&buffer)?, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

pub mod bits;
mod common;
pub mod gf;
mod interleaver;
mod polar;
mod reed_solomon;
mod ssc;
pub mod sim;
pub mod utils;

pub use bits::{BinarySequence, Word};
pub use common::Error;
pub use gf::GaloisField;
pub use interleaver::Interleaver;
pub use polar::{PolarCode, PolarEncoder};
pub use reed_solomon::ReedSolomonEncoder;
pub use ssc::{Llr, SuccessiveCancellationDecoder};
