//! Bitwise interleaver for punctured convolutional codes
//!
//! Multiplexes the output streams of a rate-1/k convolutional encoder into a
//! single byte stream under an arbitrary puncturing matrix, and reverses the
//! process. Rather than moving bits one at a time, each polynomial's bits
//! are spread across a machine word with a precomputed schedule of
//! shift-and-mask passes whose shift amounts halve on every pass, and the
//! spread words of all polynomials are then folded together.

use crate::bits::{mask_bits, mask_from_positions, BinarySequence, Word, WORD_BITS};
use crate::Error;

/// One shift-and-mask pass of a spread or despread schedule
#[derive(Clone, Eq, PartialEq, Debug, Copy)]
struct SchedulePass {
    /// Shift amount (a power of two)
    shift: usize,
    /// Mask selecting the bits that stay in place
    static_mask: Word,
    /// Mask selecting the bits that move by `shift`
    shift_mask: Word,
}

/// Bitwise interleaver/deinterleaver for a punctured convolutional code
///
/// # Examples
///
/// ```
/// use linkfec::{BinarySequence, Interleaver};
///
/// // Rate-2/3 puncturing of a rate-1/2 code, 4-byte blocks
/// let matrix = BinarySequence::from_bits(&[1, 1, 0, 1])?;
/// let interleaver = Interleaver::new(&matrix, 2, 4)?;
/// let input = vec![0xAAAA_0000_0000_0000, 0x5555_0000_0000_0000];
/// let mut output = Vec::new();
/// interleaver.interleave(&input, &mut output)?;
/// assert_eq!(output, [0xB6, 0xDB, 0x6D, 0x00, 0x00, 0x00]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Interleaver {
    /// Number of code polynomials (streams)
    num_poly: usize,
    /// Block size in bytes per stream
    block_size: usize,
    /// Number of phases in one puncturing matrix cycle
    cycle_len: usize,
    /// Number of bits consumed per stream per interleaver iteration
    num_in_bits: usize,
    /// Number of bits emitted per interleaver iteration
    num_out_bits: usize,
    /// Number of iterations required to cover a block
    num_iterations: usize,
    /// Length of the input buffer in words
    in_buf_len: usize,
    /// Length of the output buffer in bytes
    out_buf_len: usize,
    /// Per-polynomial spread schedules (shifts halving from half a word to 1)
    spread_schedules: Vec<Vec<SchedulePass>>,
    /// Per-polynomial despread schedules (shifts doubling from 1 to half a word)
    despread_schedules: Vec<Vec<SchedulePass>>,
}

impl Interleaver {
    /// Returns interleaver for given puncturing matrix, polynomial count and block size.
    ///
    /// # Parameters
    ///
    /// - `puncturing_matrix`: Bit matrix stored phase-major: the bit for
    ///   phase `i` of polynomial `p` is at index `i * num_poly + p`. A `1`
    ///   emits the corresponding stream bit, a `0` discards it.
    ///
    /// - `num_poly`: Number of code polynomials `k`; the puncturing matrix
    ///   length must be a multiple of this.
    ///
    /// - `block_size`: Number of bytes consumed from each stream per block.
    ///
    /// # Errors
    ///
    /// Returns an error if `block_size` is `0`, if `num_poly` is less than
    /// `2`, if the puncturing matrix is empty or its length is not a
    /// multiple of `num_poly`, if the matrix has more set bits than fit a
    /// machine word, if `block_size` does not cover a whole number of
    /// matrix cycles, if any matrix row is all-zero, or if the matrix
    /// requires a bit to move towards the start of the word while
    /// spreading (such matrices are not supported).
    pub fn new(
        puncturing_matrix: &BinarySequence,
        num_poly: usize,
        block_size: usize,
    ) -> Result<Self, Error> {
        if block_size == 0 {
            return Err(Error::InvalidInput(
                "Block size must be at least 1 byte".to_string(),
            ));
        }
        if num_poly < 2 {
            return Err(Error::InvalidInput(
                "Minimum of two polynomials are required".to_string(),
            ));
        }
        if puncturing_matrix.is_empty() || puncturing_matrix.len() % num_poly != 0 {
            return Err(Error::InvalidInput(format!(
                "Puncturing matrix length must be a non-zero multiple of the \
                 polynomial count {num_poly} (found {})",
                puncturing_matrix.len()
            )));
        }
        let matrix_ones = puncturing_matrix.ones();
        if matrix_ones == 0 || WORD_BITS / matrix_ones == 0 {
            return Err(Error::InvalidInput(format!(
                "Word size must be large enough to fit at least one puncturing \
                 matrix cycle (found {matrix_ones} set bits)"
            )));
        }
        let cycle_len = puncturing_matrix.len() / num_poly;
        if block_size % cycle_len != 0 {
            return Err(Error::InvalidInput(format!(
                "Block size must correspond to an integer number of puncturing \
                 matrix cycles of length {cycle_len} (found {block_size})"
            )));
        }
        let max_bits = WORD_BITS * cycle_len / matrix_ones;
        let num_in_bits = (max_bits / cycle_len) * cycle_len;
        let num_out_bits = num_in_bits * matrix_ones / cycle_len;
        let num_iterations = (block_size * 8).div_ceil(num_in_bits).max(1);
        let in_buf_len = num_poly * block_size.div_ceil(WORD_BITS / 8);
        let out_buf_len = block_size * matrix_ones / cycle_len;

        let mut spread_schedules = Vec::with_capacity(num_poly);
        let mut despread_schedules = Vec::with_capacity(num_poly);
        for poly in 0 .. num_poly {
            let row_ones_indices: Vec<usize> = (0 .. cycle_len)
                .filter(|&phase| puncturing_matrix.test(phase * num_poly + poly))
                .collect();
            if row_ones_indices.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "Puncturing matrix row for polynomial {poly} must keep at \
                     least one bit per cycle"
                )));
            }
            let num_poly_bits = (num_in_bits / cycle_len) * row_ones_indices.len();
            let mut input_indices = Vec::with_capacity(num_poly_bits);
            let mut diffs = Vec::with_capacity(num_poly_bits);
            for n in 0 .. num_poly_bits {
                let cycle = n / row_ones_indices.len();
                let phase = row_ones_indices[n % row_ones_indices.len()];
                let input_index = cycle * cycle_len + phase;
                let emitted_before = puncturing_matrix.sum(phase * num_poly + poly);
                let output_index = (cycle * matrix_ones + emitted_before) as isize - poly as isize;
                let diff = output_index - input_index as isize;
                if diff < 0 {
                    return Err(Error::InvalidInput(format!(
                        "Unsupported puncturing matrix: bit {n} of polynomial \
                         {poly} would move towards the start of the word"
                    )));
                }
                input_indices.push(input_index);
                #[allow(clippy::cast_sign_loss)]
                diffs.push(diff as usize);
            }
            spread_schedules.push(spread_schedule(&input_indices, &diffs));
            despread_schedules.push(despread_schedule(&input_indices, &diffs));
        }

        Ok(Self {
            num_poly,
            block_size,
            cycle_len,
            num_in_bits,
            num_out_bits,
            num_iterations,
            in_buf_len,
            out_buf_len,
            spread_schedules,
            despread_schedules,
        })
    }

    /// Returns number of code polynomials.
    #[must_use]
    pub fn num_poly(&self) -> usize {
        self.num_poly
    }

    /// Returns block size in bytes per stream.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns number of phases in one puncturing matrix cycle.
    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.cycle_len
    }

    /// Returns length in words of the input buffer for [`Self::interleave`].
    ///
    /// The buffer holds the streams word-interleaved: word `w` of polynomial
    /// `p` is at index `w * num_poly + p`, with stream bits packed from the
    /// MSB down.
    #[must_use]
    pub fn in_buf_len(&self) -> usize {
        self.in_buf_len
    }

    /// Returns length in bytes of the output buffer filled by [`Self::interleave`].
    #[must_use]
    pub fn out_buf_len(&self) -> usize {
        self.out_buf_len
    }

    /// Interleaves a block of stream words into a byte stream.
    ///
    /// # Parameters
    ///
    /// - `input`: Stream words, laid out as described by [`Self::in_buf_len`].
    ///
    /// - `output`: Buffer for the interleaved bytes (any pre-existing
    ///   contents will be cleared).
    ///
    /// # Errors
    ///
    /// Returns an error if `input.len()` is not equal to `self.in_buf_len()`.
    pub fn interleave(&self, input: &[Word], output: &mut Vec<u8>) -> Result<(), Error> {
        if input.len() != self.in_buf_len {
            return Err(Error::InvalidInput(format!(
                "Invalid interleaver input length (expected {}, found {})",
                self.in_buf_len,
                input.len()
            )));
        }
        let mut spread_words = Vec::with_capacity(self.num_iterations);
        for iteration in 0 .. self.num_iterations {
            let coarse_offset = ((iteration * self.num_in_bits) / WORD_BITS) * self.num_poly;
            let fine_offset = (iteration * self.num_in_bits) % WORD_BITS;
            let mut folded = 0;
            for (poly, schedule) in self.spread_schedules.iter().enumerate() {
                let mut word = input[coarse_offset + poly] << fine_offset;
                if coarse_offset < self.in_buf_len - self.num_poly && fine_offset > 0 {
                    word |= input[coarse_offset + poly + self.num_poly]
                        >> (WORD_BITS - fine_offset);
                }
                word &= mask_bits(self.num_in_bits);
                folded |= apply_spread(word, schedule) >> poly;
            }
            spread_words.push(folded);
        }
        output.clear();
        for byte_index in 0 .. self.out_buf_len {
            output.push(self.pack_byte(&spread_words, byte_index));
        }
        Ok(())
    }

    /// Deinterleaves a byte stream back into stream words.
    ///
    /// Punctured bit positions are zero in the output; callers treating the
    /// result as log-likelihood ratios must substitute their own erasure
    /// value for them.
    ///
    /// # Parameters
    ///
    /// - `input`: Interleaved bytes, of length `self.out_buf_len()`.
    ///
    /// - `output`: Buffer for the stream words (any pre-existing contents
    ///   will be cleared).
    ///
    /// # Errors
    ///
    /// Returns an error if `input.len()` is not equal to `self.out_buf_len()`.
    pub fn deinterleave(&self, input: &[u8], output: &mut Vec<Word>) -> Result<(), Error> {
        if input.len() != self.out_buf_len {
            return Err(Error::InvalidInput(format!(
                "Invalid deinterleaver input length (expected {}, found {})",
                self.out_buf_len,
                input.len()
            )));
        }
        let mut packed = vec![0; self.num_iterations];
        for (byte_index, &byte) in input.iter().enumerate() {
            self.unpack_byte(byte, byte_index, &mut packed);
        }
        output.clear();
        output.resize(self.in_buf_len, 0);
        for (iteration, &word) in packed.iter().enumerate() {
            let coarse_offset = ((iteration * self.num_in_bits) / WORD_BITS) * self.num_poly;
            let fine_offset = (iteration * self.num_in_bits) % WORD_BITS;
            for (poly, schedule) in self.despread_schedules.iter().enumerate() {
                let despread = apply_despread(word << poly, schedule);
                output[coarse_offset + poly] |= despread >> fine_offset;
                if coarse_offset < self.in_buf_len - self.num_poly && fine_offset > 0 {
                    output[coarse_offset + poly + self.num_poly] |=
                        despread << (WORD_BITS - fine_offset);
                }
            }
        }
        Ok(())
    }

    /// Packs output byte `byte_index` from the spread words.
    #[allow(clippy::cast_possible_truncation)]
    fn pack_byte(&self, words: &[Word], byte_index: usize) -> u8 {
        let coarse_offset = (byte_index * 8) / self.num_out_bits;
        let fine_offset = (byte_index * 8) % self.num_out_bits;
        let mask = mask_bits(self.num_out_bits);
        let mut byte = if fine_offset <= WORD_BITS - 8 {
            ((words[coarse_offset] & mask) >> (WORD_BITS - 8 - fine_offset)) as u8
        } else {
            ((words[coarse_offset] & mask) << (fine_offset - (WORD_BITS - 8))) as u8
        };
        if self.num_out_bits - fine_offset < 8 {
            byte |= (words[coarse_offset + 1]
                >> (WORD_BITS - 8 + self.num_out_bits - fine_offset)) as u8;
        }
        byte
    }

    /// Unpacks input byte `byte_index` into the packed word array.
    fn unpack_byte(&self, byte: u8, byte_index: usize, words: &mut [Word]) {
        let coarse_offset = (byte_index * 8) / self.num_out_bits;
        let fine_offset = (byte_index * 8) % self.num_out_bits;
        let mask = mask_bits(self.num_out_bits);
        let byte = Word::from(byte);
        if fine_offset <= WORD_BITS - 8 {
            words[coarse_offset] |= (byte << (WORD_BITS - 8 - fine_offset)) & mask;
        } else {
            words[coarse_offset] |= (byte >> (fine_offset - (WORD_BITS - 8))) & mask;
        }
        if self.num_out_bits - fine_offset < 8 {
            words[coarse_offset + 1] |=
                byte << (WORD_BITS - 8 + self.num_out_bits - fine_offset);
        }
    }
}

/// Builds the spread schedule for one polynomial.
///
/// Shift amounts halve from half a word down to 1; a pass is emitted when
/// any remaining displacement has the corresponding bit set. The final pass
/// is always emitted so that bits outside the index sequence are masked off.
fn spread_schedule(input_indices: &[usize], diffs: &[usize]) -> Vec<SchedulePass> {
    let mut indices = input_indices.to_vec();
    let mut diffs = diffs.to_vec();
    let mut passes = Vec::new();
    let mut shift = WORD_BITS / 2;
    loop {
        if shift == 1 || diffs.iter().any(|&diff| diff & shift != 0) {
            passes.push(masks_for_pass(&indices, &diffs, shift));
            for (index, diff) in indices.iter_mut().zip(diffs.iter_mut()) {
                if *diff & shift != 0 {
                    *index += shift;
                    *diff -= shift;
                }
            }
        }
        if shift == 1 {
            break;
        }
        shift /= 2;
    }
    passes
}

/// Builds the despread schedule for one polynomial.
///
/// Runs the spread schedule in reverse: shift amounts double from 1 up to
/// half a word and bits move back towards the start of the word.
fn despread_schedule(input_indices: &[usize], diffs: &[usize]) -> Vec<SchedulePass> {
    let mut indices: Vec<usize> = input_indices
        .iter()
        .zip(diffs.iter())
        .map(|(&index, &diff)| index + diff)
        .collect();
    let mut diffs = diffs.to_vec();
    let mut passes = Vec::new();
    let mut shift = 1;
    loop {
        if shift == WORD_BITS / 2 || diffs.iter().any(|&diff| diff & shift != 0) {
            passes.push(masks_for_pass(&indices, &diffs, shift));
            for (index, diff) in indices.iter_mut().zip(diffs.iter_mut()) {
                if *diff & shift != 0 {
                    *index -= shift;
                    *diff -= shift;
                }
            }
        }
        if shift == WORD_BITS / 2 {
            break;
        }
        shift *= 2;
    }
    passes
}

/// Returns the static/moving masks for one schedule pass.
fn masks_for_pass(indices: &[usize], diffs: &[usize], shift: usize) -> SchedulePass {
    let moving: Vec<usize> = indices
        .iter()
        .zip(diffs.iter())
        .filter_map(|(&index, &diff)| if diff & shift != 0 { Some(index) } else { None })
        .collect();
    let staying: Vec<usize> = indices
        .iter()
        .zip(diffs.iter())
        .filter_map(|(&index, &diff)| if diff & shift == 0 { Some(index) } else { None })
        .collect();
    SchedulePass {
        shift,
        static_mask: mask_from_positions(&staying),
        shift_mask: mask_from_positions(&moving),
    }
}

/// Spreads a packed word out to its interleaved bit positions.
fn apply_spread(word: Word, schedule: &[SchedulePass]) -> Word {
    schedule.iter().fold(word, |word, pass| {
        (word & pass.static_mask) | ((word & pass.shift_mask) >> pass.shift)
    })
}

/// Gathers interleaved bits back into a packed word.
fn apply_despread(word: Word, schedule: &[SchedulePass]) -> Word {
    schedule.iter().fold(word, |word, pass| {
        (word & pass.static_mask) | ((word & pass.shift_mask) << pass.shift)
    })
}
