//! Labeled result types.
//!
//! Every buffer returned by a retrieval call is owned by the caller and carries
//! the variant ids of its rows and the sample ids of its columns.

use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

/// Dosages of one variant across the selected samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosageVector<T> {
    pub variant_id: String,
    pub sample_ids: Vec<String>,
    pub values: Array1<T>,
}

impl<T> DosageVector<T> {
    /// Value for one sample, by id
    #[must_use]
    pub fn get(&self, sample_id: &str) -> Option<&T> {
        let col = self.sample_ids.iter().position(|s| s == sample_id)?;
        self.values.get(col)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Allele codes of one variant, interleaved as `[a0, b0, a1, b1, ...]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlleleVector {
    pub variant_id: String,
    pub sample_ids: Vec<String>,
    /// Length `2 * sample_ids.len()`
    pub codes: Array1<i32>,
}

impl AlleleVector {
    /// First allele of each sample (even slots)
    #[must_use]
    pub fn first(&self) -> ArrayView1<'_, i32> {
        self.codes.slice(s![..;2])
    }

    /// Second allele of each sample (odd slots)
    #[must_use]
    pub fn second(&self) -> ArrayView1<'_, i32> {
        self.codes.slice(s![1..;2])
    }

    /// Both alleles of one sample, by id
    #[must_use]
    pub fn get(&self, sample_id: &str) -> Option<(i32, i32)> {
        let col = self.sample_ids.iter().position(|s| s == sample_id)?;
        Some((*self.codes.get(2 * col)?, *self.codes.get(2 * col + 1)?))
    }
}

/// A variants x samples matrix labeled on both axes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenotypeMatrix<T> {
    /// Row labels
    pub variant_ids: Vec<String>,
    /// Column labels
    pub sample_ids: Vec<String>,
    pub values: Array2<T>,
}

impl<T> GenotypeMatrix<T> {
    #[must_use]
    pub fn new(variant_ids: Vec<String>, sample_ids: Vec<String>, values: Array2<T>) -> Self {
        debug_assert_eq!(values.dim(), (variant_ids.len(), sample_ids.len()));
        Self {
            variant_ids,
            sample_ids,
            values,
        }
    }

    #[must_use]
    pub fn n_variants(&self) -> usize {
        self.values.nrows()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Row labeled `variant_id`. A repeated label resolves to its last row,
    /// the same row the identifier index picks under `LastWins`.
    #[must_use]
    pub fn row(&self, variant_id: &str) -> Option<ArrayView1<'_, T>> {
        let row = self.variant_ids.iter().rposition(|v| v == variant_id)?;
        Some(self.values.row(row))
    }

    /// Column labeled `sample_id`
    #[must_use]
    pub fn column(&self, sample_id: &str) -> Option<ArrayView1<'_, T>> {
        let col = self.sample_ids.iter().position(|s| s == sample_id)?;
        Some(self.values.column(col))
    }

    #[must_use]
    pub fn get(&self, variant_id: &str, sample_id: &str) -> Option<&T> {
        let row = self.variant_ids.iter().rposition(|v| v == variant_id)?;
        let col = self.sample_ids.iter().position(|s| s == sample_id)?;
        self.values.get((row, col))
    }
}

/// First and second allele matrices split from an interleaved allele buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlleleMatrices {
    pub first: GenotypeMatrix<i32>,
    pub second: GenotypeMatrix<i32>,
}

impl AlleleMatrices {
    /// Split a `variants x 2n` interleaved buffer into two `variants x n` matrices
    #[must_use]
    pub fn from_interleaved(
        variant_ids: Vec<String>,
        sample_ids: Vec<String>,
        interleaved: &Array2<i32>,
    ) -> Self {
        let (first, second) = split_alleles(interleaved);
        Self {
            first: GenotypeMatrix::new(variant_ids.clone(), sample_ids.clone(), first),
            second: GenotypeMatrix::new(variant_ids, sample_ids, second),
        }
    }
}

/// De-interleave allele codes: even columns are first alleles, odd columns second
#[must_use]
pub fn split_alleles(interleaved: &Array2<i32>) -> (Array2<i32>, Array2<i32>) {
    (
        interleaved.slice(s![.., ..;2]).to_owned(),
        interleaved.slice(s![.., 1..;2]).to_owned(),
    )
}

/// Reorder the columns of a decoded buffer into presentation order.
///
/// `order[k]` is the decoded column shown at output column `k`. With
/// `interleaved`, each sample spans two adjacent columns which move together.
pub(crate) fn reorder_columns<T: Clone>(
    values: &Array2<T>,
    order: &[usize],
    interleaved: bool,
) -> Array2<T> {
    if interleaved {
        let expanded: Vec<usize> = order.iter().flat_map(|&c| [2 * c, 2 * c + 1]).collect();
        values.select(Axis(1), &expanded)
    } else {
        values.select(Axis(1), order)
    }
}
