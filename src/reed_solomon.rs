//! Systematic Reed-Solomon coding over GF(2^M)
//!
//! The generator polynomial has the consecutive roots `x^1 .. x^parity` of
//! the field's primitive element, so a buffer is a codeword exactly when it
//! evaluates to zero at each of those roots. Encoding appends the remainder
//! of the message polynomial; decoding computes the syndromes and, when any
//! is non-zero, locates and corrects up to `parity / 2` symbol errors with
//! the Berlekamp-Massey error locator, a Chien root search and Forney's
//! magnitude formula.

use crate::bits::BinarySequence;
use crate::gf::GaloisField;
use crate::Error;

/// Systematic Reed-Solomon encoder/decoder
///
/// A buffer passed to [`Self::encode`], [`Self::check`] or [`Self::decode`]
/// holds the message bytes followed by `parity` bytes of parity, with the
/// first byte as the highest-order coefficient of the codeword polynomial.
///
/// # Examples
///
/// ```
/// use linkfec::{gf::polynomials, ReedSolomonEncoder};
///
/// let rs = ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 32)?;
/// let mut buffer = vec![0u8; 255];
/// for (index, byte) in buffer[.. 223].iter_mut().enumerate() {
///     *byte = index as u8;
/// }
/// rs.encode(&mut buffer)?;
/// assert_eq!(rs.check(&buffer)?, 0);
/// buffer[100] ^= 0x55;
/// assert_ne!(rs.check(&buffer)?, 0);
/// assert_eq!(rs.decode(&mut buffer)?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ReedSolomonEncoder {
    /// Field arithmetic tables
    gf: GaloisField,
    /// Number of parity symbols
    parity: usize,
    /// Generator polynomial, highest power first, monic of degree `parity`
    generator: Vec<u8>,
}

impl ReedSolomonEncoder {
    /// Returns Reed-Solomon encoder/decoder for given field and parity length.
    ///
    /// # Parameters
    ///
    /// - `degree`: Field degree `M`, with `2 <= M <= 8`.
    ///
    /// - `primitive`: Primitive polynomial for the field, as a bit sequence
    ///   of length `M + 1`.
    ///
    /// - `parity`: Number of parity symbols; must be non-zero and smaller
    ///   than the field size minus one.
    ///
    /// # Errors
    ///
    /// Returns an error if the field parameters are invalid or if `parity`
    /// is out of range.
    pub fn new(degree: usize, primitive: &BinarySequence, parity: usize) -> Result<Self, Error> {
        let gf = GaloisField::new(degree, primitive)?;
        if parity == 0 || parity >= gf.field_size() - 1 {
            return Err(Error::InvalidInput(format!(
                "Number of parity symbols must be between 1 and {} (found {parity})",
                gf.field_size() - 2
            )));
        }
        let mut generator = vec![1];
        for root_exponent in 1 ..= parity {
            generator = gf.poly_multiply(&generator, &[1, gf.alpha_pow(root_exponent)]);
        }
        Ok(Self {
            gf,
            parity,
            generator,
        })
    }

    /// Returns number of parity symbols.
    #[must_use]
    pub fn parity(&self) -> usize {
        self.parity
    }

    /// Returns the generator polynomial, highest power first.
    #[must_use]
    pub fn generator(&self) -> &[u8] {
        &self.generator
    }

    /// Computes parity over the leading message bytes of `buffer` and writes
    /// it into the trailing `parity` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is no longer than the parity length,
    /// if it exceeds the field's maximum codeword length, or if any message
    /// byte is not a field element.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<(), Error> {
        self.check_buffer(buffer)?;
        let data_len = buffer.len() - self.parity;
        let mut message = buffer[.. data_len].to_vec();
        message.resize(buffer.len(), 0);
        let parity = self.gf.remainder(&message, &self.generator);
        buffer[data_len ..].copy_from_slice(&parity);
        Ok(())
    }

    /// Returns the maximum syndrome value of `buffer`; zero means the buffer
    /// is a codeword.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is no longer than the parity length,
    /// if it exceeds the field's maximum codeword length, or if any byte is
    /// not a field element.
    pub fn check(&self, buffer: &[u8]) -> Result<u8, Error> {
        self.check_buffer(buffer)?;
        // OK to unwrap: There is at least one parity symbol, hence at least
        // one syndrome.
        Ok(*self.syndromes(buffer).iter().max().unwrap())
    }

    /// Corrects up to `parity / 2` symbol errors in `buffer` in place.
    ///
    /// # Returns
    ///
    /// - `num_corrected`: Number of symbols corrected; `0` if the buffer was
    ///   already a codeword.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodingFailure`] if the error pattern is beyond the
    /// correction capability of the code, and [`Error::InvalidInput`] for
    /// the buffer conditions of [`Self::check`].
    pub fn decode(&self, buffer: &mut [u8]) -> Result<usize, Error> {
        self.check_buffer(buffer)?;
        let syndromes = self.syndromes(buffer);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(0);
        }
        let locator = self.error_locator(&syndromes);
        let num_errors = locator.len() - 1;
        if num_errors == 0 || num_errors > self.parity / 2 {
            return Err(Error::DecodingFailure(format!(
                "Cannot correct more than {} symbol errors",
                self.parity / 2
            )));
        }
        let positions = self.error_positions(&locator, buffer.len())?;
        if positions.len() != num_errors {
            return Err(Error::DecodingFailure(
                "Error locator degree does not match its root count".to_string(),
            ));
        }
        self.correct_errors(buffer, &syndromes, &locator, &positions)?;
        if self.syndromes(buffer).iter().any(|&s| s != 0) {
            return Err(Error::DecodingFailure(
                "Correction left a non-zero syndrome".to_string(),
            ));
        }
        Ok(positions.len())
    }

    /// Validates buffer length and symbol range for the field.
    fn check_buffer(&self, buffer: &[u8]) -> Result<(), Error> {
        if buffer.len() <= self.parity || buffer.len() > self.gf.field_size() - 1 {
            return Err(Error::InvalidInput(format!(
                "Buffer length must be between {} and {} (found {})",
                self.parity + 1,
                self.gf.field_size() - 1,
                buffer.len()
            )));
        }
        if usize::from(*buffer.iter().max().unwrap_or(&0)) >= self.gf.field_size() {
            return Err(Error::InvalidInput(format!(
                "Buffer holds values outside GF(2^{})",
                self.gf.degree()
            )));
        }
        Ok(())
    }

    /// Returns the `parity` syndromes `S_j = c(x^j)` for `j = 1 .. parity`.
    fn syndromes(&self, buffer: &[u8]) -> Vec<u8> {
        (1 ..= self.parity)
            .map(|exponent| self.gf.evaluate(buffer, self.gf.alpha_pow(exponent)))
            .collect()
    }

    /// Berlekamp-Massey: returns the error locator polynomial in
    /// lowest-power-first order, trimmed to its true degree.
    fn error_locator(&self, syndromes: &[u8]) -> Vec<u8> {
        let mut locator = vec![0; self.parity + 1];
        locator[0] = 1;
        let mut previous = locator.clone();
        let mut degree = 0;
        let mut shift = 1;
        let mut previous_discrepancy = 1;
        for step in 0 .. syndromes.len() {
            let mut discrepancy = syndromes[step];
            for tap in 1 ..= degree {
                if locator[tap] != 0 {
                    discrepancy ^= self.gf.multiply(locator[tap], syndromes[step - tap]);
                }
            }
            if discrepancy == 0 {
                shift += 1;
                continue;
            }
            let snapshot = locator.clone();
            let scale = self.gf.divide(discrepancy, previous_discrepancy);
            for (index, &coefficient) in previous.iter().enumerate() {
                if coefficient != 0 && index + shift <= self.parity {
                    locator[index + shift] ^= self.gf.multiply(scale, coefficient);
                }
            }
            if 2 * degree <= step {
                degree = step + 1 - degree;
                previous_discrepancy = discrepancy;
                previous = snapshot;
                shift = 1;
            } else {
                shift += 1;
            }
        }
        locator.truncate(degree + 1);
        while locator.len() > 1 && locator[locator.len() - 1] == 0 {
            locator.pop();
        }
        locator
    }

    /// Chien search: returns the ascending positions, counted from the end
    /// of the buffer, at which the locator has a root.
    fn error_positions(&self, locator: &[u8], buffer_len: usize) -> Result<Vec<usize>, Error> {
        let group_order = self.gf.field_size() - 1;
        let mut positions = Vec::new();
        for position in 0 .. buffer_len {
            let x_inverse = self.gf.alpha_pow(group_order - position % group_order);
            if evaluate_low_first(&self.gf, locator, x_inverse) == 0 {
                positions.push(position);
            }
        }
        if positions.is_empty() {
            return Err(Error::DecodingFailure(
                "No error positions found within the buffer".to_string(),
            ));
        }
        Ok(positions)
    }

    /// Forney's formula: computes and applies the error magnitudes.
    fn correct_errors(
        &self,
        buffer: &mut [u8],
        syndromes: &[u8],
        locator: &[u8],
        positions: &[usize],
    ) -> Result<(), Error> {
        // Error evaluator: (S(x) * locator(x)) mod x^parity, lowest power first.
        let mut evaluator = vec![0; self.parity];
        for (index, &syndrome) in syndromes.iter().enumerate() {
            if syndrome == 0 {
                continue;
            }
            for (offset, &coefficient) in locator.iter().enumerate() {
                if coefficient != 0 && index + offset < self.parity {
                    evaluator[index + offset] ^= self.gf.multiply(syndrome, coefficient);
                }
            }
        }
        // Formal derivative of the locator; only odd powers survive in
        // characteristic two.
        let derivative: Vec<u8> = (1 .. locator.len())
            .map(|index| if index % 2 == 1 { locator[index] } else { 0 })
            .collect();
        let group_order = self.gf.field_size() - 1;
        for &position in positions {
            let x_inverse = self.gf.alpha_pow(group_order - position % group_order);
            let numerator = evaluate_low_first(&self.gf, &evaluator, x_inverse);
            let denominator = evaluate_low_first(&self.gf, &derivative, x_inverse);
            if denominator == 0 {
                return Err(Error::DecodingFailure(
                    "Locator derivative vanished at an error position".to_string(),
                ));
            }
            buffer[buffer.len() - 1 - position] ^= self.gf.divide(numerator, denominator);
        }
        Ok(())
    }
}

/// Evaluates a lowest-power-first polynomial at `x`.
fn evaluate_low_first(gf: &GaloisField, poly: &[u8], x: u8) -> u8 {
    poly.iter()
        .rev()
        .fold(0, |acc, &coefficient| gf.multiply(acc, x) ^ coefficient)
}

#[cfg(test)]
mod tests_of_reed_solomon {
    use super::*;
    use crate::gf::polynomials;

    /// Deterministic byte pattern for codec tests.
    fn test_bytes(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(1);
        (0 .. len)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                (state >> 56) as u8
            })
            .collect()
    }

    fn rs_255_223() -> ReedSolomonEncoder {
        ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 32).unwrap()
    }

    #[test]
    fn test_new() {
        // Invalid parity lengths
        assert!(ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 0).is_err());
        assert!(ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 255).is_err());
        // Invalid field
        assert!(ReedSolomonEncoder::new(3, &polynomials::m_8_285(), 2).is_err());
        // Valid input
        let rs = rs_255_223();
        assert_eq!(rs.parity(), 32);
        assert_eq!(rs.generator().len(), 33);
    }

    #[test]
    fn test_generator_polynomial() {
        // Degree equals the parity length and the polynomial is monic
        let rs = rs_255_223();
        assert_eq!(rs.generator()[0], 1);
        // Four parity symbols over 0x11D: (x + a)(x + a^2)(x + a^3)(x + a^4)
        let rs = ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 4).unwrap();
        assert_eq!(rs.generator(), [1, 30, 216, 231, 116]);
    }

    #[test]
    fn test_encode_then_check_is_zero() {
        let rs = rs_255_223();
        for seed in 0 .. 10 {
            let mut buffer = test_bytes(223, seed);
            buffer.resize(255, 0);
            rs.encode(&mut buffer).unwrap();
            assert_eq!(rs.check(&buffer).unwrap(), 0, "seed {seed}");
        }
    }

    #[test]
    fn test_single_corruption_is_detected() {
        let rs = rs_255_223();
        let mut buffer = test_bytes(223, 42);
        buffer.resize(255, 0);
        rs.encode(&mut buffer).unwrap();
        for position in [0, 1, 100, 222, 223, 254] {
            let mut corrupted = buffer.clone();
            corrupted[position] ^= 0x01;
            assert_ne!(rs.check(&corrupted).unwrap(), 0, "position {position}");
        }
    }

    #[test]
    fn test_decode_corrects_errors() {
        let rs = rs_255_223();
        let mut buffer = test_bytes(223, 7);
        buffer.resize(255, 0);
        rs.encode(&mut buffer).unwrap();
        let codeword = buffer.clone();
        // Clean word decodes with no corrections
        assert_eq!(rs.decode(&mut buffer).unwrap(), 0);
        // Up to parity/2 errors are corrected
        for num_errors in [1, 2, 8, 16] {
            let mut corrupted = codeword.clone();
            for error in 0 .. num_errors {
                corrupted[error * 14 + 3] ^= (error as u8) | 0x40;
            }
            assert_eq!(rs.decode(&mut corrupted).unwrap(), num_errors);
            assert_eq!(corrupted, codeword);
        }
    }

    #[test]
    fn test_decode_fails_beyond_capability() {
        let rs = ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 4).unwrap();
        let mut buffer = test_bytes(16, 9);
        buffer.resize(20, 0);
        rs.encode(&mut buffer).unwrap();
        // Three errors exceed the two-error capability of four parity symbols
        buffer[0] ^= 0x11;
        buffer[5] ^= 0x22;
        buffer[10] ^= 0x33;
        assert!(rs.decode(&mut buffer).is_err());
    }

    #[test]
    fn test_buffer_validation() {
        let rs = ReedSolomonEncoder::new(8, &polynomials::m_8_285(), 4).unwrap();
        let mut short = vec![0; 4];
        assert!(rs.encode(&mut short).is_err());
        let mut long = vec![0; 256];
        assert!(rs.encode(&mut long).is_err());
        // Sub-byte fields reject out-of-range symbols
        let poly = BinarySequence::from_bits(&[1, 0, 0, 1, 1]).unwrap();
        let rs = ReedSolomonEncoder::new(4, &poly, 4).unwrap();
        let mut buffer = vec![0x1F; 10];
        assert!(rs.encode(&mut buffer).is_err());
        let mut buffer = vec![0x0F; 10];
        assert!(rs.encode(&mut buffer).is_ok());
    }
}
