//! Dense in-memory implementation of the decoder contract.
//!
//! Useful when genotypes are already held in memory and as the decoder in
//! tests. It enforces the same contract a file-backed decoder does: sorted
//! subsets, bounds-checked variant indexes and exact output shapes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ndarray::{Array2, ArrayViewMut1, ArrayViewMut2, Axis};
use tracing::debug;

use crate::core::types::{Dosage, MISSING_ALLELE, MISSING_DOSAGE};
use crate::decoder::{DecoderError, DecoderSession, GenotypeDecoder};

#[derive(Debug)]
struct Genotypes {
    /// variants x samples
    dosages: Array2<f64>,
    /// variants x (2 * samples), interleaved
    alleles: Array2<i32>,
    opened: AtomicUsize,
    released: AtomicUsize,
    last_path: Mutex<Option<PathBuf>>,
}

/// Decoder over genotypes held in memory.
///
/// Cloning is cheap and clones share the same data and session counters.
#[derive(Debug, Clone)]
pub struct InMemoryDecoder {
    inner: Arc<Genotypes>,
}

impl InMemoryDecoder {
    /// Build from a dosage matrix and an interleaved allele matrix.
    ///
    /// # Errors
    ///
    /// Returns `DecoderError::ShapeMismatch` unless `alleles` has the same
    /// number of rows as `dosages` and twice as many columns.
    pub fn new(dosages: Array2<f64>, alleles: Array2<i32>) -> Result<Self, DecoderError> {
        let (n_variants, n_samples) = dosages.dim();
        if alleles.dim() != (n_variants, 2 * n_samples) {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![n_variants, 2 * n_samples],
                actual: alleles.shape().to_vec(),
            });
        }

        Ok(Self {
            inner: Arc::new(Genotypes {
                dosages,
                alleles,
                opened: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                last_path: Mutex::new(None),
            }),
        })
    }

    /// Build from interleaved allele codes, deriving each dosage as the count
    /// of non-reference (non-zero) alleles. Missing calls get [`MISSING_DOSAGE`].
    ///
    /// # Errors
    ///
    /// Returns `DecoderError::ShapeMismatch` if `alleles` has an odd number of
    /// columns.
    pub fn from_alleles(alleles: Array2<i32>) -> Result<Self, DecoderError> {
        let (n_variants, width) = alleles.dim();
        if width % 2 != 0 {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![n_variants, width + 1],
                actual: vec![n_variants, width],
            });
        }

        let dosages = Array2::from_shape_fn((n_variants, width / 2), |(v, s)| {
            let (a, b) = (alleles[[v, 2 * s]], alleles[[v, 2 * s + 1]]);
            if a == MISSING_ALLELE || b == MISSING_ALLELE {
                MISSING_DOSAGE
            } else {
                f64::from(u8::from(a != 0) + u8::from(b != 0))
            }
        });

        Self::new(dosages, alleles)
    }

    #[must_use]
    pub fn num_variants(&self) -> usize {
        self.inner.dosages.nrows()
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.inner.dosages.ncols()
    }

    /// Sessions opened so far
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Sessions dropped so far
    #[must_use]
    pub fn sessions_released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Path passed to the most recent `open`
    #[must_use]
    pub fn last_path(&self) -> Option<PathBuf> {
        self.inner.last_path.lock().ok().and_then(|p| p.clone())
    }
}

impl GenotypeDecoder for InMemoryDecoder {
    type Session = InMemorySession;

    fn open(
        &self,
        path: &Path,
        sample_subset: Option<&[u32]>,
    ) -> Result<Self::Session, DecoderError> {
        let num_samples = self.num_samples();

        let columns = match sample_subset {
            None => (0..num_samples).collect(),
            Some(subset) => {
                if subset.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(DecoderError::UnsortedSubset);
                }
                if let Some(&index) = subset.iter().find(|&&s| s as usize >= num_samples) {
                    return Err(DecoderError::SampleOutOfBounds { index, num_samples });
                }
                subset.iter().map(|&s| s as usize).collect()
            }
        };

        if let Ok(mut last) = self.inner.last_path.lock() {
            *last = Some(path.to_path_buf());
        }
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        debug!("Opened in-memory session on {}", path.display());

        Ok(InMemorySession {
            genotypes: Arc::clone(&self.inner),
            columns,
        })
    }
}

/// Session handed out by [`InMemoryDecoder`]
#[derive(Debug)]
pub struct InMemorySession {
    genotypes: Arc<Genotypes>,
    /// Sample columns to emit, ascending
    columns: Vec<usize>,
}

impl InMemorySession {
    fn check_variant(&self, index: u32) -> Result<usize, DecoderError> {
        let num_variants = self.genotypes.dosages.nrows();
        if index as usize >= num_variants {
            return Err(DecoderError::VariantOutOfBounds {
                index,
                num_variants,
            });
        }
        Ok(index as usize)
    }

    fn check_range(&self, start: u32, end_exclusive: u32) -> Result<(), DecoderError> {
        if start > end_exclusive {
            return Err(DecoderError::InvalidRange {
                start,
                end_exclusive,
            });
        }
        if end_exclusive > start {
            self.check_variant(end_exclusive - 1)?;
        }
        Ok(())
    }

    fn check_shape(expected: &[usize], actual: &[usize]) -> Result<(), DecoderError> {
        if expected == actual {
            Ok(())
        } else {
            Err(DecoderError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            })
        }
    }

    fn fill_dosage_row<T: Dosage>(&self, variant: usize, mut out: ArrayViewMut1<'_, T>) {
        let row = self.genotypes.dosages.row(variant);
        for (slot, &col) in out.iter_mut().zip(&self.columns) {
            *slot = T::from_f64(row[col]).unwrap_or_else(T::nan);
        }
    }

    fn fill_allele_row(&self, variant: usize, mut out: ArrayViewMut1<'_, i32>) {
        let row = self.genotypes.alleles.row(variant);
        for (k, &col) in self.columns.iter().enumerate() {
            let (a, b) = (row[2 * col], row[2 * col + 1]);
            out[2 * k] = a;
            out[2 * k + 1] = b;
        }
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.genotypes.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl DecoderSession for InMemorySession {
    fn raw_sample_count(&self) -> u32 {
        // Construction paths never hold more than u32::MAX samples in practice
        u32::try_from(self.genotypes.dosages.ncols()).unwrap_or(u32::MAX)
    }

    fn read_dosages<T: Dosage>(
        &mut self,
        variant_idx: u32,
        out: ArrayViewMut1<'_, T>,
    ) -> Result<(), DecoderError> {
        let variant = self.check_variant(variant_idx)?;
        Self::check_shape(&[self.columns.len()], out.shape())?;
        self.fill_dosage_row(variant, out);
        Ok(())
    }

    fn read_dosages_list<T: Dosage>(
        &mut self,
        variant_idxs: &[u32],
        mut out: ArrayViewMut2<'_, T>,
    ) -> Result<(), DecoderError> {
        let variants = variant_idxs
            .iter()
            .map(|&v| self.check_variant(v))
            .collect::<Result<Vec<_>, _>>()?;
        Self::check_shape(&[variants.len(), self.columns.len()], out.shape())?;
        for (variant, row) in variants.into_iter().zip(out.axis_iter_mut(Axis(0))) {
            self.fill_dosage_row(variant, row);
        }
        Ok(())
    }

    fn read_dosages_range<T: Dosage>(
        &mut self,
        start: u32,
        end_exclusive: u32,
        mut out: ArrayViewMut2<'_, T>,
    ) -> Result<(), DecoderError> {
        self.check_range(start, end_exclusive)?;
        let rows = (end_exclusive - start) as usize;
        Self::check_shape(&[rows, self.columns.len()], out.shape())?;
        for (variant, row) in (start as usize..).zip(out.axis_iter_mut(Axis(0))) {
            self.fill_dosage_row(variant, row);
        }
        Ok(())
    }

    fn read_alleles(
        &mut self,
        variant_idx: u32,
        out: ArrayViewMut1<'_, i32>,
    ) -> Result<(), DecoderError> {
        let variant = self.check_variant(variant_idx)?;
        Self::check_shape(&[2 * self.columns.len()], out.shape())?;
        self.fill_allele_row(variant, out);
        Ok(())
    }

    fn read_alleles_list(
        &mut self,
        variant_idxs: &[u32],
        mut out: ArrayViewMut2<'_, i32>,
    ) -> Result<(), DecoderError> {
        let variants = variant_idxs
            .iter()
            .map(|&v| self.check_variant(v))
            .collect::<Result<Vec<_>, _>>()?;
        Self::check_shape(&[variants.len(), 2 * self.columns.len()], out.shape())?;
        for (variant, row) in variants.into_iter().zip(out.axis_iter_mut(Axis(0))) {
            self.fill_allele_row(variant, row);
        }
        Ok(())
    }

    fn read_alleles_range(
        &mut self,
        start: u32,
        end_exclusive: u32,
        mut out: ArrayViewMut2<'_, i32>,
    ) -> Result<(), DecoderError> {
        self.check_range(start, end_exclusive)?;
        let rows = (end_exclusive - start) as usize;
        Self::check_shape(&[rows, 2 * self.columns.len()], out.shape())?;
        for (variant, row) in (start as usize..).zip(out.axis_iter_mut(Axis(0))) {
            self.fill_allele_row(variant, row);
        }
        Ok(())
    }
}
