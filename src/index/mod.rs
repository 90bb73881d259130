//! Bidirectional mapping between identifiers and store positions.
//!
//! Variant ids and sample ids are what callers pass around; the decoder only
//! understands 0-based positions. [`IdentifierIndex`] is built once from the
//! loaded tables and answers lookups in O(1) both ways.
//!
//! ## Duplicate variant ids
//!
//! Duplicate variant ids are handled by an explicit [`DuplicatePolicy`]:
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | `LastWins` (default) | the id maps to its last row; a warning is logged |
//! | `Reject` | construction fails with [`LookupError::DuplicateVariant`] |
//!
//! Duplicate sample ids resolve to their first row, as a front-to-back scan of
//! the sample list would.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::core::sample::SampleTable;
use crate::core::types::DuplicatePolicy;
use crate::core::variant::VariantTable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown variant id: '{0}'")]
    UnknownVariant(String),

    #[error("Unknown sample id: '{0}'")]
    UnknownSample(String),

    #[error("Duplicate variant id '{id}' at rows {first} and {second}")]
    DuplicateVariant { id: String, first: u32, second: u32 },

    #[error("Table has {0} rows, more than a 32-bit position can address")]
    TooManyRows(usize),
}

/// Identifier <-> position lookups for one fileset
#[derive(Debug, Clone)]
pub struct IdentifierIndex {
    variant_ids: Vec<String>,
    variant_to_index: HashMap<String, u32>,
    sample_ids: Vec<String>,
    sample_to_index: HashMap<String, u32>,
}

impl IdentifierIndex {
    /// Build the index from loaded tables
    ///
    /// # Errors
    ///
    /// Returns `LookupError::DuplicateVariant` under `DuplicatePolicy::Reject`
    /// when a variant id repeats, or `LookupError::TooManyRows` if a table does
    /// not fit in `u32` positions.
    pub fn build(
        variants: &VariantTable,
        samples: &SampleTable,
        policy: DuplicatePolicy,
    ) -> Result<Self, LookupError> {
        if u32::try_from(variants.len()).is_err() {
            return Err(LookupError::TooManyRows(variants.len()));
        }
        if u32::try_from(samples.len()).is_err() {
            return Err(LookupError::TooManyRows(samples.len()));
        }

        let variant_ids = variants.ids();
        let mut variant_to_index = HashMap::with_capacity(variant_ids.len());

        for (pos, id) in (0u32..).zip(&variant_ids) {
            if let Some(previous) = variant_to_index.insert(id.clone(), pos) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(LookupError::DuplicateVariant {
                            id: id.clone(),
                            first: previous,
                            second: pos,
                        });
                    }
                    DuplicatePolicy::LastWins => {
                        warn!(
                            "Duplicate variant id '{}' at rows {} and {}; using row {}",
                            id, previous, pos, pos
                        );
                    }
                }
            }
        }

        let sample_ids = samples.ids();
        let mut sample_to_index = HashMap::with_capacity(sample_ids.len());
        for (pos, id) in (0u32..).zip(&sample_ids) {
            sample_to_index.entry(id.clone()).or_insert(pos);
        }

        Ok(Self {
            variant_ids,
            variant_to_index,
            sample_ids,
            sample_to_index,
        })
    }

    /// 0-based store position of a variant id
    ///
    /// # Errors
    ///
    /// Returns `LookupError::UnknownVariant` if the id is not in the table.
    pub fn index_of_variant(&self, id: &str) -> Result<u32, LookupError> {
        self.variant_to_index
            .get(id)
            .copied()
            .ok_or_else(|| LookupError::UnknownVariant(id.to_string()))
    }

    /// 0-based store position of a sample id
    ///
    /// # Errors
    ///
    /// Returns `LookupError::UnknownSample` if the id is not in the table.
    pub fn index_of_sample(&self, id: &str) -> Result<u32, LookupError> {
        self.sample_to_index
            .get(id)
            .copied()
            .ok_or_else(|| LookupError::UnknownSample(id.to_string()))
    }

    /// Resolve a list of variant ids, keeping the given order
    ///
    /// # Errors
    ///
    /// Returns `LookupError::UnknownVariant` for the first id not in the table.
    pub fn indexes_of_variants<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<u32>, LookupError> {
        ids.iter()
            .map(|id| self.index_of_variant(id.as_ref()))
            .collect()
    }

    #[must_use]
    pub fn variant_id_at(&self, index: u32) -> Option<&str> {
        self.variant_ids.get(index as usize).map(String::as_str)
    }

    #[must_use]
    pub fn sample_id_at(&self, index: u32) -> Option<&str> {
        self.sample_ids.get(index as usize).map(String::as_str)
    }

    #[must_use]
    pub fn contains_variant(&self, id: &str) -> bool {
        self.variant_to_index.contains_key(id)
    }

    /// All variant ids in store order
    #[must_use]
    pub fn variant_ids(&self) -> &[String] {
        &self.variant_ids
    }

    /// All sample ids in store order
    #[must_use]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    #[must_use]
    pub fn num_variants(&self) -> usize {
        self.variant_ids.len()
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.sample_ids.len()
    }
}
