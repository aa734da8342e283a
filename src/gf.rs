//! Galois field arithmetic over GF(2^M)

use crate::{bits::BinarySequence, Error};

/// Commonly used primitive polynomials
pub mod polynomials {
    use crate::bits::BinarySequence;

    /// Returns the degree-8 primitive polynomial `0x11D` (`x^8 + x^4 + x^3 + x^2 + 1`).
    #[must_use]
    pub fn m_8_285() -> BinarySequence {
        // OK to unwrap: The bit values are literal binary digits.
        BinarySequence::from_bits(&[1, 0, 0, 0, 1, 1, 1, 0, 1]).unwrap()
    }

    /// Returns the degree-8 primitive polynomial `0x12D` (`x^8 + x^5 + x^3 + x^2 + 1`).
    #[must_use]
    pub fn m_8_301() -> BinarySequence {
        // OK to unwrap: The bit values are literal binary digits.
        BinarySequence::from_bits(&[1, 0, 0, 1, 0, 1, 1, 0, 1]).unwrap()
    }
}

/// Galois field GF(2^M) with log/antilog multiplication tables
///
/// Field elements are stored one per byte. The tables are built at
/// construction time by repeated multiplication by the primitive element
/// `x`; the antilog table is stored twice over so that products of two
/// logarithms can index it without a modulo reduction.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GaloisField {
    /// Field degree M
    degree: usize,
    /// Number of field elements (2^M)
    field_size: usize,
    /// Logarithm table: `log[a]` is the exponent `i` with `x^i = a`
    log: Vec<usize>,
    /// Antilogarithm table: `antilog[i] = x^(i mod (2^M - 1))`, stored twice over
    antilog: Vec<u8>,
}

impl GaloisField {
    /// Returns Galois field for given degree and primitive polynomial.
    ///
    /// # Parameters
    ///
    /// - `degree`: Field degree `M`, with `2 <= M <= 8`.
    ///
    /// - `primitive`: Primitive polynomial as a bit sequence of length `M + 1`
    ///   with the coefficient of `x^M` first.
    ///
    /// # Errors
    ///
    /// Returns an error if `degree` is outside `[2, 8]`, if `primitive` does
    /// not have length `degree + 1` with a leading `1`, or if `x` does not
    /// generate the multiplicative group of the field (i.e., the polynomial
    /// is not primitive).
    ///
    /// # Examples
    ///
    /// ```
    /// use linkfec::{gf::polynomials, GaloisField};
    ///
    /// let gf = GaloisField::new(8, &polynomials::m_8_285())?;
    /// assert_eq!(gf.multiply(2, 128), 29);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(degree: usize, primitive: &BinarySequence) -> Result<Self, Error> {
        if !(2 ..= 8).contains(&degree) {
            return Err(Error::InvalidInput(format!(
                "Field degree must be in the range [2, 8] (found {degree})"
            )));
        }
        if primitive.len() != degree + 1 || !primitive.test(0) {
            return Err(Error::InvalidInput(format!(
                "Primitive polynomial must have {} coefficients with a leading 1 (found {} coefficients)",
                degree + 1,
                primitive.len()
            )));
        }
        let mut primitive_value = 0usize;
        for index in 0 ..= degree {
            primitive_value = (primitive_value << 1) | usize::from(primitive.test(index));
        }
        let field_size = 1 << degree;
        let mut log = vec![0; field_size];
        let mut antilog = vec![0; 2 * field_size];
        let mut element = 1usize;
        for exponent in 0 .. field_size - 1 {
            antilog[exponent] = element as u8;
            log[element] = exponent;
            element <<= 1;
            if element & field_size != 0 {
                element ^= primitive_value;
            }
            if element == 1 && exponent + 1 < field_size - 1 {
                return Err(Error::InvalidInput(format!(
                    "Polynomial {primitive_value:#x} is not primitive: x has order {}",
                    exponent + 1
                )));
            }
        }
        if element != 1 {
            return Err(Error::InvalidInput(format!(
                "Polynomial {primitive_value:#x} is not primitive"
            )));
        }
        for exponent in field_size - 1 .. 2 * field_size {
            antilog[exponent] = antilog[exponent - (field_size - 1)];
        }
        Ok(Self {
            degree,
            field_size,
            log,
            antilog,
        })
    }

    /// Returns field degree M.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns number of field elements (2^M).
    #[must_use]
    pub fn field_size(&self) -> usize {
        self.field_size
    }

    /// Returns product of two field elements.
    #[must_use]
    pub fn multiply(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            0
        } else {
            self.antilog[self.log[a as usize] + self.log[b as usize]]
        }
    }

    /// Returns quotient of two field elements; `b` must be non-zero.
    #[must_use]
    pub fn divide(&self, a: u8, b: u8) -> u8 {
        debug_assert!(b != 0);
        if a == 0 {
            0
        } else {
            self.antilog[self.log[a as usize] + self.field_size - 1 - self.log[b as usize]]
        }
    }

    /// Returns `x^exponent`.
    #[must_use]
    pub fn alpha_pow(&self, exponent: usize) -> u8 {
        self.antilog[exponent % (self.field_size - 1)]
    }

    /// Evaluates a polynomial at `x` using Horner's method.
    ///
    /// The first element of `poly` is the coefficient of the highest power.
    #[must_use]
    pub fn evaluate(&self, poly: &[u8], x: u8) -> u8 {
        poly.iter()
            .fold(0, |acc, &coefficient| self.multiply(acc, x) ^ coefficient)
    }

    /// Returns remainder of polynomial long division of `message` by `generator`.
    ///
    /// Both polynomials are in highest-power-first order and the generator
    /// must be monic. The returned remainder holds the trailing
    /// `generator.len() - 1` coefficients of the reduced message.
    #[must_use]
    pub fn remainder(&self, message: &[u8], generator: &[u8]) -> Vec<u8> {
        let parity_len = generator.len() - 1;
        let mut work = message.to_vec();
        for index in 0 .. work.len() - parity_len {
            let factor = work[index];
            if factor != 0 {
                for (offset, &coefficient) in generator.iter().enumerate().skip(1) {
                    work[index + offset] ^= self.multiply(coefficient, factor);
                }
            }
        }
        work.split_off(work.len() - parity_len)
    }

    /// Returns product of two polynomials over the field.
    ///
    /// Both polynomials are in highest-power-first order.
    #[must_use]
    pub fn poly_multiply(&self, poly1: &[u8], poly2: &[u8]) -> Vec<u8> {
        let mut product = vec![0; poly1.len() + poly2.len() - 1];
        for (index1, &coefficient1) in poly1.iter().enumerate() {
            if coefficient1 == 0 {
                continue;
            }
            for (index2, &coefficient2) in poly2.iter().enumerate() {
                product[index1 + index2] ^= self.multiply(coefficient1, coefficient2);
            }
        }
        product
    }
}

#[cfg(test)]
mod tests_of_galois_field {
    use super::*;

    fn gf_256() -> GaloisField {
        GaloisField::new(8, &polynomials::m_8_285()).unwrap()
    }

    #[test]
    fn test_new() {
        // Invalid degree
        assert!(GaloisField::new(1, &polynomials::m_8_285()).is_err());
        assert!(GaloisField::new(9, &polynomials::m_8_285()).is_err());
        // Degree/polynomial length mismatch
        assert!(GaloisField::new(4, &polynomials::m_8_285()).is_err());
        // Missing leading coefficient
        let poly = BinarySequence::from_bits(&[0, 0, 0, 0, 1, 1, 1, 0, 1]).unwrap();
        assert!(GaloisField::new(8, &poly).is_err());
        // 0x11B is irreducible but x is not a generator of GF(256) under it
        let poly = BinarySequence::from_bits(&[1, 0, 0, 0, 1, 1, 0, 1, 1]).unwrap();
        assert!(GaloisField::new(8, &poly).is_err());
        // Valid polynomials
        assert!(GaloisField::new(8, &polynomials::m_8_285()).is_ok());
        assert!(GaloisField::new(8, &polynomials::m_8_301()).is_ok());
        let poly = BinarySequence::from_bits(&[1, 0, 0, 1, 1]).unwrap();
        assert!(GaloisField::new(4, &poly).is_ok());
    }

    #[test]
    fn test_multiply() {
        let gf = gf_256();
        assert_eq!(gf.multiply(0, 7), 0);
        assert_eq!(gf.multiply(7, 0), 0);
        assert_eq!(gf.multiply(1, 7), 7);
        assert_eq!(gf.multiply(2, 2), 4);
        assert_eq!(gf.multiply(2, 128), 29);
        assert_eq!(gf.multiply(0x53, 0xCA), 143);
        assert_eq!(gf.multiply(0xFF, 0xFF), 226);
        // Commutativity over a sample of pairs
        for a in [1u8, 2, 3, 29, 127, 255] {
            for b in [1u8, 5, 64, 200, 254] {
                assert_eq!(gf.multiply(a, b), gf.multiply(b, a));
            }
        }
    }

    #[test]
    fn test_divide() {
        let gf = gf_256();
        assert_eq!(gf.divide(0, 7), 0);
        assert_eq!(gf.divide(7, 7), 1);
        assert_eq!(gf.divide(1, 2), 142);
        // Division inverts multiplication for all non-zero elements
        for a in 1 ..= 255u8 {
            assert_eq!(gf.divide(gf.multiply(a, 29), 29), a);
        }
    }

    #[test]
    fn test_alpha_pow() {
        let gf = gf_256();
        assert_eq!(gf.alpha_pow(0), 1);
        assert_eq!(gf.alpha_pow(1), 2);
        assert_eq!(gf.alpha_pow(8), 29);
        assert_eq!(gf.alpha_pow(255), 1);
    }

    #[test]
    fn test_evaluate() {
        let gf = gf_256();
        assert_eq!(gf.evaluate(&[], 7), 0);
        assert_eq!(gf.evaluate(&[5], 7), 5);
        // x^2 + 2x + 3 at x = 2
        assert_eq!(gf.evaluate(&[1, 2, 3], 2), 3);
    }

    #[test]
    fn test_remainder() {
        let gf = gf_256();
        // (x + 2)(x + 4) = x^2 + 6x + 8
        let generator = gf.poly_multiply(&[1, 2], &[1, 4]);
        assert_eq!(generator, [1, 6, 8]);
        let remainder = gf.remainder(&[1, 2, 3, 4, 0, 0], &generator);
        assert_eq!(remainder, [33, 74]);
        // Appending the remainder produces an exact multiple of the generator
        let codeword = [1, 2, 3, 4, 33, 74];
        assert_eq!(gf.evaluate(&codeword, 2), 0);
        assert_eq!(gf.evaluate(&codeword, 4), 0);
    }

    #[test]
    fn test_poly_multiply() {
        let gf = gf_256();
        assert_eq!(gf.poly_multiply(&[1], &[1, 2]), [1, 2]);
        assert_eq!(gf.poly_multiply(&[1, 2], &[1, 4]), [1, 6, 8]);
        assert_eq!(gf.poly_multiply(&[0, 1], &[1, 1]), [0, 1, 1]);
    }
}
