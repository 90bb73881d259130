//! Positional genotype reads.
//!
//! Each function opens one decoder session for the duration of the call and
//! drops it before returning, on success and on every error path. Sample
//! subsets must be strictly ascending and are checked before any read.

use std::path::Path;

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::core::types::Dosage;
use crate::decoder::{DecoderSession, GenotypeDecoder};
use crate::retrieval::RetrievalError;
use crate::utils::validation::validate_subset;

/// Open a session and check the subset against the store's raw sample count.
/// Returns the session and the number of output samples.
fn open_session<D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    sample_subset: Option<&[u32]>,
) -> Result<(D::Session, usize), RetrievalError> {
    if let Some(subset) = sample_subset {
        // Bounds are unknown until the store is open; catch ordering first
        validate_subset(subset, usize::MAX)?;
    }

    let session = decoder.open(path, sample_subset)?;
    let raw_count = session.raw_sample_count() as usize;

    let num_samples = match sample_subset {
        Some(subset) => {
            validate_subset(subset, raw_count)?;
            subset.len()
        }
        None => raw_count,
    };

    Ok((session, num_samples))
}

/// Translate an inclusive `start..=end` into the decoder's `start..end_exclusive`
fn exclusive_end(start: u32, end: u32) -> Result<u32, RetrievalError> {
    if start > end {
        return Err(RetrievalError::InvalidRange { start, end });
    }
    // Positions are u32, so no store holds a variant at u32::MAX
    end.checked_add(1).ok_or(RetrievalError::VariantOutOfRange {
        index: end,
        num_variants: u32::MAX as usize,
    })
}

/// Dosages of one variant
///
/// # Errors
///
/// Returns `RetrievalError::Validation` for an unsorted or out-of-bounds
/// subset, or `RetrievalError::Decoder` if the decoder fails.
pub fn read_dosages<T: Dosage, D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    variant_idx: u32,
    sample_subset: Option<&[u32]>,
) -> Result<Array1<T>, RetrievalError> {
    let (mut session, num_samples) = open_session(decoder, path, sample_subset)?;
    let mut dosages = Array1::<T>::zeros(num_samples);
    session.read_dosages(variant_idx, dosages.view_mut())?;
    Ok(dosages)
}

/// Interleaved allele codes of one variant, length `2 * samples`.
///
/// Slots `2k` and `2k + 1` belong to sample `k`; both are
/// [`MISSING_ALLELE`](crate::core::types::MISSING_ALLELE) for a missing call,
/// and unphased calls have the lower code first.
///
/// # Errors
///
/// As [`read_dosages`].
pub fn read_alleles<D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    variant_idx: u32,
    sample_subset: Option<&[u32]>,
) -> Result<Array1<i32>, RetrievalError> {
    let (mut session, num_samples) = open_session(decoder, path, sample_subset)?;
    let mut alleles = Array1::<i32>::zeros(2 * num_samples);
    session.read_alleles(variant_idx, alleles.view_mut())?;
    Ok(alleles)
}

/// Dosages for a list of variants, rows in the given order
///
/// # Errors
///
/// As [`read_dosages`].
pub fn read_dosages_list<T: Dosage, D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    variant_idxs: &[u32],
    sample_subset: Option<&[u32]>,
) -> Result<Array2<T>, RetrievalError> {
    let (mut session, num_samples) = open_session(decoder, path, sample_subset)?;
    let mut dosages = Array2::<T>::zeros((variant_idxs.len(), num_samples));
    session.read_dosages_list(variant_idxs, dosages.view_mut())?;
    Ok(dosages)
}

/// Interleaved allele codes for a list of variants, `variants x 2 * samples`
///
/// # Errors
///
/// As [`read_dosages`].
pub fn read_alleles_list<D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    variant_idxs: &[u32],
    sample_subset: Option<&[u32]>,
) -> Result<Array2<i32>, RetrievalError> {
    let (mut session, num_samples) = open_session(decoder, path, sample_subset)?;
    let mut alleles = Array2::<i32>::zeros((variant_idxs.len(), 2 * num_samples));
    session.read_alleles_list(variant_idxs, alleles.view_mut())?;
    Ok(alleles)
}

/// Dosages for the variants at positions `start..=end` (end inclusive)
///
/// # Errors
///
/// Returns `RetrievalError::InvalidRange` if `start > end`,
/// `RetrievalError::VariantOutOfRange` if `end` is `u32::MAX`, otherwise as
/// [`read_dosages`].
pub fn read_dosages_range<T: Dosage, D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    start: u32,
    end: u32,
    sample_subset: Option<&[u32]>,
) -> Result<Array2<T>, RetrievalError> {
    let end_exclusive = exclusive_end(start, end)?;
    let (mut session, num_samples) = open_session(decoder, path, sample_subset)?;
    let num_variants = (end_exclusive - start) as usize;
    debug!(
        "Reading {} dosages for variants {}..={} x {} samples",
        T::DTYPE,
        start,
        end,
        num_samples
    );

    let mut dosages = Array2::<T>::zeros((num_variants, num_samples));
    session.read_dosages_range(start, end_exclusive, dosages.view_mut())?;
    Ok(dosages)
}

/// Interleaved allele codes for positions `start..=end` (end inclusive)
///
/// # Errors
///
/// As [`read_dosages_range`].
pub fn read_alleles_range<D: GenotypeDecoder>(
    decoder: &D,
    path: &Path,
    start: u32,
    end: u32,
    sample_subset: Option<&[u32]>,
) -> Result<Array2<i32>, RetrievalError> {
    let end_exclusive = exclusive_end(start, end)?;
    let (mut session, num_samples) = open_session(decoder, path, sample_subset)?;
    let num_variants = (end_exclusive - start) as usize;

    let mut alleles = Array2::<i32>::zeros((num_variants, 2 * num_samples));
    session.read_alleles_range(start, end_exclusive, alleles.view_mut())?;
    Ok(alleles)
}
