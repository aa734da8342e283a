//! Collection of useful functions for simulating code performance
//!
//! # Examples
//!
//! ```
//! use linkfec::utils;
//!
//! let mut rng = rand::rng();
//! let num_bytes = 8;
//! let es_over_n0_db = 10.0;
//! let bytes = utils::random_bytes(num_bytes, &mut rng);
//! let syms = utils::bpsk_awgn_channel(&bytes, es_over_n0_db, &mut rng);
//! let bytes_hat = utils::bpsk_slicer(&syms);
//! let err_count = utils::bit_error_count(&bytes_hat, &bytes);
//! ```

use rand::{rngs::ThreadRng, Rng};
use rand_distr::StandardNormal;

/// Returns given number of random bytes.
///
/// # Parameters
///
/// - `num_bytes`: Number of random bytes to be generated.
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bytes`: Random bytes.
pub fn random_bytes(num_bytes: usize, rng: &mut ThreadRng) -> Vec<u8> {
    (0 .. num_bytes).map(|_| rng.random()).collect()
}

/// Returns symbols at BPSK-AWGN channel output corresponding to given bytes.
///
/// Each byte is transmitted MSB-first as one BPSK symbol per bit, with bit
/// `0` mapped to `+1.0` and bit `1` to `-1.0`.
///
/// # Parameters
///
/// - `bytes`: Bytes to be transmitted over the BPSK-AWGN channel.
///
/// - `es_over_n0_db`: Ratio (dB) of symbol energy to noise power spectral
///   density at the BPSK-AWGN channel output (if the BPSK symbols are `+1.0`
///   and `-1.0`, then the noise variance is
///   `0.5 / 10f64.powf(0.1 * es_over_n0_db)`).
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `syms`: Noisy symbols at the BPSK-AWGN channel output, one per
///   transmitted bit.
pub fn bpsk_awgn_channel(bytes: &[u8], es_over_n0_db: f64, rng: &mut ThreadRng) -> Vec<f64> {
    let es_over_n0 = 10f64.powf(0.1 * es_over_n0_db);
    let noise_var = 0.5 / es_over_n0;
    let mut syms = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit in 0 .. 8 {
            let x = if byte & (1 << (7 - bit)) != 0 { -1f64 } else { 1f64 };
            syms.push(
                4.0 * es_over_n0 * (x + noise_var.sqrt() * rng.sample::<f64, _>(StandardNormal)),
            );
        }
    }
    syms
}

/// Returns BPSK slicer output packed into bytes.
///
/// # Parameters
///
/// - `syms`: Symbols to be sliced, one per bit.
///
/// # Returns
///
/// - `bytes_hat`: Bytes obtained by hard-slicing the given symbols,
///   MSB-first; trailing bits of a partial final byte are zero.
#[must_use]
pub fn bpsk_slicer(syms: &[f64]) -> Vec<u8> {
    let mut bytes = vec![0u8; syms.len().div_ceil(8)];
    for (index, &sym) in syms.iter().enumerate() {
        if sym < 0.0 {
            bytes[index / 8] |= 1 << (7 - index % 8);
        }
    }
    bytes
}

/// Returns number of bit errors in a byte sequence with respect to a
/// reference byte sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of bit positions in which the two sequences
///   differ. If they are of different lengths, then the longer sequence is
///   effectively truncated to the length of the shorter one.
pub fn bit_error_count(seq: &[u8], ref_seq: &[u8]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .map(|(&x, &y)| (x ^ y).count_ones() as usize)
        .sum()
}

/// Returns number of byte errors in a sequence with respect to a reference
/// sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of positions in which the two sequences differ. If
///   they are of different lengths, then the longer sequence is effectively
///   truncated to the length of the shorter one.
pub fn byte_error_count(seq: &[u8], ref_seq: &[u8]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let mut rng = rand::rng();
        assert!(random_bytes(0, &mut rng).is_empty());
        let num_bytes = 4096;
        let bytes = random_bytes(num_bytes, &mut rng);
        assert_eq!(bytes.len(), num_bytes);
        let num_one_bits: usize = bytes.iter().map(|&b| b.count_ones() as usize).sum();
        // Roughly half the bits should be set
        assert!(num_one_bits > 9 * num_bytes * 8 / 20);
        assert!(num_one_bits < 11 * num_bytes * 8 / 20);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_bpsk_awgn_channel() {
        let mut rng = rand::rng();
        assert!(bpsk_awgn_channel(&[], 0.0, &mut rng).is_empty());
        let es_over_n0_db = 20f64;
        let bytes = random_bytes(1250, &mut rng);
        let syms = bpsk_awgn_channel(&bytes, es_over_n0_db, &mut rng);
        assert_eq!(syms.len(), 10000);
        let es_over_n0 = 10f64.powf(0.1 * es_over_n0_db);
        let noise_var_est = syms
            .iter()
            .enumerate()
            .map(|(index, y)| {
                if bytes[index / 8] & (1 << (7 - index % 8)) != 0 {
                    y + 4.0 * es_over_n0
                } else {
                    y - 4.0 * es_over_n0
                }
            })
            .map(|x| x * x)
            .sum::<f64>()
            / 10000.0;
        assert!(noise_var_est > 7.2 * es_over_n0 && noise_var_est < 8.8 * es_over_n0);
    }

    #[test]
    fn test_bpsk_slicer() {
        assert!(bpsk_slicer(&[]).is_empty());
        assert_eq!(bpsk_slicer(&[0.0, 0.01, -0.01]), [0x20]);
        let syms = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, -2.0];
        assert_eq!(bpsk_slicer(&syms), [0x55, 0x80]);
    }

    #[test]
    fn test_bit_error_count() {
        assert_eq!(bit_error_count(&[], &[0xFF]), 0);
        assert_eq!(bit_error_count(&[0xFF], &[]), 0);
        assert_eq!(bit_error_count(&[0xFF, 0x00], &[0xFF, 0x00]), 0);
        assert_eq!(bit_error_count(&[0xFF, 0x01], &[0x0F, 0x00]), 5);
        // Longer `seq` is truncated
        assert_eq!(bit_error_count(&[0xF0, 0xFF], &[0x70]), 1);
    }

    #[test]
    fn test_byte_error_count() {
        assert_eq!(byte_error_count(&[], &[1, 2]), 0);
        assert_eq!(byte_error_count(&[1, 2], &[]), 0);
        assert_eq!(byte_error_count(&[1, 2, 3, 4], &[1, 0, 3, 0]), 2);
        assert_eq!(byte_error_count(&[1, 2, 3, 4], &[1, 2, 3]), 0);
    }
}
