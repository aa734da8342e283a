//! Simulation of polar code performance over a BPSK-AWGN channel
//!
//! The [`bpsk_awgn_sim`] function measures the bit and block error rates of
//! a systematic polar code with hard-decision successive cancellation
//! decoding: each block is encoded, sent over a BPSK-AWGN channel, sliced
//! back to bytes and decoded. The parameters of a simulation and the
//! results from it are captured in the [`SimParams`] and [`SimResults`]
//! structs, and [`run_bpsk_awgn_sims`] runs a set of simulations and saves
//! the results to a JSON file.
//!
//! # Examples
//!
//! ```
//! use linkfec::sim::{self, SimParams};
//!
//! let mut rng = rand::rng();
//! let params = SimParams {
//!     block_len: 256,
//!     code_len: 256,
//!     data_len: 128,
//!     design_snr: -2,
//!     es_over_n0_db: 8.0,
//!     num_block_errors_min: 10,
//!     num_blocks_per_run: 10,
//!     num_runs_min: 1,
//!     num_runs_max: 2,
//! };
//! let results = sim::bpsk_awgn_sim(&params, &mut rng)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;

use crate::{utils, Error, PolarCode, PolarEncoder, SuccessiveCancellationDecoder};

/// Parameters for polar code simulation over BPSK-AWGN channel
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Block size N in bits
    pub block_len: usize,
    /// Codeword length M in bits after shortening
    pub code_len: usize,
    /// Number of information bits K per block
    pub data_len: usize,
    /// Design SNR for the code construction
    pub design_snr: i32,
    /// Ratio (dB) of symbol energy to noise power spectral density at BPSK-AWGN channel output
    pub es_over_n0_db: f64,
    /// Desired minimum number of block errors
    pub num_block_errors_min: u32,
    /// Number of blocks to be transmitted per run
    pub num_blocks_per_run: u32,
    /// Minimum number of runs of blocks to be simulated
    pub num_runs_min: u32,
    /// Maximum number of runs of blocks to be simulated
    pub num_runs_max: u32,
}

impl SimParams {
    /// Checks validity of simulation parameters.
    fn check(&self) -> Result<(), Error> {
        PolarCode::new(self.block_len, self.code_len, self.data_len, self.design_snr)?;
        if self.num_blocks_per_run == 0 {
            return Err(Error::InvalidInput(
                "Number of blocks per run cannot be zero".to_string(),
            ));
        }
        if self.num_runs_min > self.num_runs_max {
            return Err(Error::InvalidInput(format!(
                "Minimum number of runs ({}) exceeds maximum number of runs ({})",
                self.num_runs_min, self.num_runs_max,
            )));
        }
        Ok(())
    }

    /// Prints simulation parameters.
    fn print(&self) {
        eprintln!();
        eprintln!(
            "({}, {}, {}) polar code, design SNR {}",
            self.block_len, self.code_len, self.data_len, self.design_snr,
        );
        eprintln!("Es/N0 of {} dB", self.es_over_n0_db);
        eprintln!("Minimum of {} block errors", self.num_block_errors_min);
        eprintln!("{} blocks per run", self.num_blocks_per_run);
        eprintln!("Minimum of {} runs", self.num_runs_min);
        eprintln!("Maximum of {} runs", self.num_runs_max);
    }
}

/// Results from polar code simulation over BPSK-AWGN channel
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimResults {
    /// Simulation parameters
    pub params: SimParams,
    /// Number of blocks transmitted
    pub num_blocks: u32,
    /// Number of information bits transmitted
    pub num_data_bits: u64,
    /// Number of block errors
    pub num_block_errors: u32,
    /// Number of information bit errors
    pub num_data_bit_errors: u64,
}

impl SimResults {
    /// Returns initialized simulation results.
    #[must_use]
    fn new(params: &SimParams) -> Self {
        Self {
            params: *params,
            num_blocks: 0,
            num_data_bits: 0,
            num_block_errors: 0,
            num_data_bit_errors: 0,
        }
    }

    /// Returns block error rate.
    #[must_use]
    pub fn block_error_rate(&self) -> f64 {
        if self.num_blocks > 0 {
            f64::from(self.num_block_errors) / f64::from(self.num_blocks)
        } else {
            0.0
        }
    }

    /// Returns information bit error rate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bit_error_rate(&self) -> f64 {
        if self.num_data_bits > 0 {
            self.num_data_bit_errors as f64 / self.num_data_bits as f64
        } else {
            0.0
        }
    }

    /// Prints progress message.
    fn print_progress_message(&self) {
        if self.run_complete() {
            eprint!(
                "\r({:4}, {:4}, {:4}), Es/N0 = {:6.3} dB: \
                 BER = {:9.4e}, BLER = {:9.4e} ({}/{}, {}/{})",
                self.params.block_len,
                self.params.code_len,
                self.params.data_len,
                self.params.es_over_n0_db,
                self.bit_error_rate(),
                self.block_error_rate(),
                self.num_data_bit_errors,
                self.num_data_bits,
                self.num_block_errors,
                self.num_blocks,
            );
            if self.sim_complete() {
                eprintln!();
            }
        }
    }

    /// Returns `true` iff a run of blocks is now complete.
    fn run_complete(&self) -> bool {
        self.num_blocks % self.params.num_blocks_per_run == 0
    }

    /// Returns `true` iff the simulation is now complete.
    fn sim_complete(&self) -> bool {
        self.run_complete()
            && self.num_blocks >= self.params.num_runs_min * self.params.num_blocks_per_run
            && (self.num_block_errors >= self.params.num_block_errors_min
                || self.num_blocks >= self.params.num_runs_max * self.params.num_blocks_per_run)
    }

    /// Updates simulation results after a block.
    fn update_after_block(&mut self, num_data_bit_errors_this_block: u32) {
        self.num_blocks += 1;
        self.num_data_bits += self.params.data_len as u64;
        if num_data_bit_errors_this_block > 0 {
            self.num_block_errors += 1;
            self.num_data_bit_errors += u64::from(num_data_bit_errors_this_block);
        }
    }
}

/// Runs simulation of a polar code over a BPSK-AWGN channel.
///
/// # Parameters
///
/// - `params`: Parameters for the simulation.
///
/// - `rng`: Random number generator for the simulation.
///
/// # Returns
///
/// - `results`: Results from the simulation.
///
/// # Errors
///
/// Returns an error if the code parameters in `params` are invalid, if
/// `params.num_blocks_per_run` is `0`, or if `params.num_runs_min` exceeds
/// `params.num_runs_max`.
#[allow(clippy::cast_possible_truncation)]
pub fn bpsk_awgn_sim(params: &SimParams, rng: &mut ThreadRng) -> Result<SimResults, Error> {
    params.check()?;
    let code = PolarCode::new(params.block_len, params.code_len, params.data_len, params.design_snr)?;
    let encoder = PolarEncoder::new(&code)?;
    let decoder = SuccessiveCancellationDecoder::new(&code, 1)?;
    let mut results = SimResults::new(params);
    let mut encoded = Vec::new();
    let mut decoded = Vec::new();
    while !results.sim_complete() {
        let data = utils::random_bytes(params.data_len / 8, rng);
        encoder.encode(&data, &mut encoded)?;
        let syms = utils::bpsk_awgn_channel(&encoded, params.es_over_n0_db, rng);
        let received = utils::bpsk_slicer(&syms);
        decoder.decode(&received, &mut decoded)?;
        let num_data_bit_errors_this_block = utils::bit_error_count(&decoded, &data);
        results.update_after_block(num_data_bit_errors_this_block as u32);
        results.print_progress_message();
    }
    Ok(results)
}

/// Runs simulations of polar codes over a BPSK-AWGN channel and saves
/// results to a JSON file.
///
/// # Parameters
///
/// - `all_params`: Parameters for each simulation scenario of interest.
///
/// - `rng`: Random number generator for the simulations.
///
/// - `json_filename`: Name of the JSON file to which all simulation results
///   must be written.
///
/// # Errors
///
/// Returns an error if there is an error in creating or writing to the JSON
/// file for the simulation results. Scenarios with invalid parameters are
/// skipped with a warning.
pub fn run_bpsk_awgn_sims(
    all_params: &[SimParams],
    rng: &mut ThreadRng,
    json_filename: &str,
) -> Result<(), Error> {
    let mut all_results = Vec::with_capacity(all_params.len());
    for params in all_params {
        params.print();
        if let Ok(results) = bpsk_awgn_sim(params, rng) {
            all_results.push(results);
        } else {
            eprintln!("WARNING: Invalid simulation parameters");
        }
    }
    save_all_sim_results_to_file(&all_results, json_filename)?;
    Ok(())
}

/// Saves all simulation results to a JSON file.
///
/// # Parameters
///
/// - `all_results`: All simulation results to be saved.
///
/// - `json_filename`: Name of the JSON file to which all simulation results
///   must be written.
///
/// # Errors
///
/// Returns an error if creating or writing to the JSON file fails.
pub fn save_all_sim_results_to_file(
    all_results: &[SimResults],
    json_filename: &str,
) -> Result<(), Error> {
    let writer = BufWriter::new(File::create(json_filename)?);
    serde_json::to_writer_pretty(writer, all_results)?;
    Ok(())
}

/// Returns all simulation results from a JSON file.
///
/// # Parameters
///
/// - `json_filename`: Name of the JSON file from which all simulation
///   results must be read.
///
/// # Errors
///
/// Returns an error if opening or reading from the JSON file fails.
pub fn all_sim_results_from_file(json_filename: &str) -> Result<Vec<SimResults>, Error> {
    let reader = BufReader::new(File::open(json_filename)?);
    let all_results = serde_json::from_reader(reader)?;
    Ok(all_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    fn params() -> SimParams {
        SimParams {
            block_len: 256,
            code_len: 256,
            data_len: 128,
            design_snr: -2,
            es_over_n0_db: 8.0,
            num_block_errors_min: 5,
            num_blocks_per_run: 10,
            num_runs_min: 1,
            num_runs_max: 2,
        }
    }

    #[test]
    fn test_check() {
        assert!(params().check().is_ok());
        let mut bad = params();
        bad.data_len = 300;
        assert!(bad.check().is_err());
        let mut bad = params();
        bad.num_blocks_per_run = 0;
        assert!(bad.check().is_err());
        let mut bad = params();
        bad.num_runs_min = 3;
        assert!(bad.check().is_err());
    }

    #[test]
    fn test_error_rates() {
        let mut results = SimResults::new(&params());
        assert_float_eq!(results.bit_error_rate(), 0.0, abs <= 1e-12);
        assert_float_eq!(results.block_error_rate(), 0.0, abs <= 1e-12);
        results.update_after_block(0);
        results.update_after_block(4);
        assert_eq!(results.num_blocks, 2);
        assert_eq!(results.num_block_errors, 1);
        assert_float_eq!(results.block_error_rate(), 0.5, abs <= 1e-12);
        assert_float_eq!(results.bit_error_rate(), 4.0 / 256.0, abs <= 1e-12);
    }

    #[test]
    fn test_sim_complete() {
        let mut results = SimResults::new(&params());
        assert!(!results.sim_complete());
        // One full run with enough block errors completes the simulation
        for _ in 0 .. 10 {
            results.update_after_block(1);
        }
        assert!(results.sim_complete());
        // Without enough block errors, the maximum number of runs applies
        let mut results = SimResults::new(&params());
        for _ in 0 .. 10 {
            results.update_after_block(0);
        }
        assert!(!results.sim_complete());
        for _ in 0 .. 10 {
            results.update_after_block(0);
        }
        assert!(results.sim_complete());
    }

    #[test]
    fn test_bpsk_awgn_sim() {
        let mut rng = rand::rng();
        // Invalid parameters
        let mut bad = params();
        bad.block_len = 100;
        assert!(bpsk_awgn_sim(&bad, &mut rng).is_err());
        // At a high SNR the channel is effectively clean
        let mut clean = params();
        clean.es_over_n0_db = 20.0;
        let results = bpsk_awgn_sim(&clean, &mut rng).unwrap();
        assert_eq!(results.num_blocks, 20);
        assert_eq!(results.num_block_errors, 0);
    }
}
