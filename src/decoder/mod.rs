//! Contract for the external pgen bitstream decoder.
//!
//! Decoding the compressed genotype store is not done in this crate. Any
//! backend (pgenlib bindings, a service client, an in-memory table) plugs in by
//! implementing [`GenotypeDecoder`], which hands out one [`DecoderSession`] per
//! retrieval call.
//!
//! ## Sessions
//!
//! A session is acquired with [`GenotypeDecoder::open`] and released when it is
//! dropped, so every exit path of a retrieval call (including `?` returns)
//! releases it. Sessions are not shared between calls or threads.
//!
//! ## Sample subsets
//!
//! `open` takes an optional subset of 0-based sample positions which must be
//! strictly ascending. With a subset, every output row has one entry per subset
//! position (two for allele buffers) in ascending position order. Without one,
//! rows cover all [`DecoderSession::raw_sample_count`] samples.
//!
//! ## Buffers
//!
//! | Call | Output shape |
//! |------|--------------|
//! | `read_dosages` | `[n]` |
//! | `read_dosages_list` / `read_dosages_range` | `[variants, n]` |
//! | `read_alleles` | `[2n]` |
//! | `read_alleles_list` / `read_alleles_range` | `[variants, 2n]` |
//!
//! Allele slots `2k` and `2k + 1` belong to sample `k`; both hold
//! [`MISSING_ALLELE`] for a missing call, and unphased calls put the lower code
//! first.
//!
//! [`MISSING_ALLELE`]: crate::core::types::MISSING_ALLELE

use std::path::Path;

use ndarray::{ArrayViewMut1, ArrayViewMut2};
use thiserror::Error;

use crate::core::types::Dosage;

pub mod memory;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output buffer has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Variant index {index} out of bounds for {num_variants} variants")]
    VariantOutOfBounds { index: u32, num_variants: usize },

    #[error("Sample index {index} out of bounds for {num_samples} samples")]
    SampleOutOfBounds { index: u32, num_samples: usize },

    #[error("Sample subset must be strictly ascending")]
    UnsortedSubset,

    #[error("Invalid variant range {start}..{end_exclusive}")]
    InvalidRange { start: u32, end_exclusive: u32 },

    /// Failure reported by the backend, passed through as-is
    #[error("Decoder error: {0}")]
    Backend(String),
}

/// Factory for scoped decoding sessions over a genotype store
pub trait GenotypeDecoder {
    type Session: DecoderSession;

    /// Open a session on the store at `path`, optionally restricted to a
    /// strictly ascending list of sample positions.
    ///
    /// # Errors
    ///
    /// Returns a `DecoderError` if the store cannot be opened or the subset is
    /// rejected.
    fn open(
        &self,
        path: &Path,
        sample_subset: Option<&[u32]>,
    ) -> Result<Self::Session, DecoderError>;
}

/// An open decoding session; released on drop.
///
/// # Errors
///
/// Every read returns a `DecoderError` when the variant index is out of bounds,
/// the output buffer has the wrong shape, or the backend fails.
pub trait DecoderSession {
    /// Number of samples in the store, ignoring any subset
    fn raw_sample_count(&self) -> u32;

    fn read_dosages<T: Dosage>(
        &mut self,
        variant_idx: u32,
        out: ArrayViewMut1<'_, T>,
    ) -> Result<(), DecoderError>;

    fn read_dosages_list<T: Dosage>(
        &mut self,
        variant_idxs: &[u32],
        out: ArrayViewMut2<'_, T>,
    ) -> Result<(), DecoderError>;

    fn read_dosages_range<T: Dosage>(
        &mut self,
        start: u32,
        end_exclusive: u32,
        out: ArrayViewMut2<'_, T>,
    ) -> Result<(), DecoderError>;

    fn read_alleles(
        &mut self,
        variant_idx: u32,
        out: ArrayViewMut1<'_, i32>,
    ) -> Result<(), DecoderError>;

    fn read_alleles_list(
        &mut self,
        variant_idxs: &[u32],
        out: ArrayViewMut2<'_, i32>,
    ) -> Result<(), DecoderError>;

    fn read_alleles_range(
        &mut self,
        start: u32,
        end_exclusive: u32,
        out: ArrayViewMut2<'_, i32>,
    ) -> Result<(), DecoderError>;
}
