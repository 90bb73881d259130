//! Sample subset resolution.
//!
//! A [`SampleSelection`] pairs the positions handed to the decoder with the
//! sample ids used to label output columns. It is immutable: resolve a new one
//! to change the active samples, then pass it to each retrieval call.
//!
//! ## Ordering
//!
//! The decoder always receives positions in ascending store order. The
//! presentation order of columns is chosen at resolution time:
//!
//! - `sort_to_store_order = true`: ids are reordered together with positions,
//!   so columns follow store order.
//! - `sort_to_store_order = false`: ids keep the requested order, and the
//!   selection records how decoded columns map to presentation columns so each
//!   column's values stay with its label.

use thiserror::Error;

use crate::index::{IdentifierIndex, LookupError};
use crate::utils::validation::{validate_permutation, validate_subset, ValidationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The active set of samples and the order their columns are presented in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSelection {
    /// Ascending store positions; `None` means every sample, no decoder filter
    positions: Option<Vec<u32>>,
    /// Column labels in presentation order
    ids: Vec<String>,
    /// `column_order[k]` is the decoded column shown at output column `k`;
    /// `None` when presentation order is store order
    column_order: Option<Vec<usize>>,
}

impl SampleSelection {
    /// Every sample, in store order
    #[must_use]
    pub fn all(ids: Vec<String>) -> Self {
        Self {
            positions: None,
            ids,
            column_order: None,
        }
    }

    /// An explicit subset whose ids are already in position order.
    ///
    /// No checks are made here; retrieval calls validate the selection before
    /// any decoder session is opened.
    #[must_use]
    pub fn from_positions(positions: Vec<u32>, ids: Vec<String>) -> Self {
        Self {
            positions: Some(positions),
            ids,
            column_order: None,
        }
    }

    /// Resolve requested sample ids against the index.
    ///
    /// `None` selects every sample in store order. Otherwise each id is mapped
    /// to its position; positions are stably sorted for the decoder and
    /// `sort_to_store_order` decides whether the ids follow that sort or keep
    /// the requested order.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::UnknownSample` for the first unknown id, or
    /// `ValidationError::DuplicatePosition` if a sample is requested twice.
    pub fn resolve<S: AsRef<str>>(
        index: &IdentifierIndex,
        requested: Option<&[S]>,
        sort_to_store_order: bool,
    ) -> Result<Self, SelectionError> {
        let Some(requested) = requested else {
            return Ok(Self::all(index.sample_ids().to_vec()));
        };

        let resolved = requested
            .iter()
            .map(|id| index.index_of_sample(id.as_ref()))
            .collect::<Result<Vec<u32>, _>>()?;

        // Stable argsort: order[j] is the request slot landing at sorted slot j
        let mut order: Vec<usize> = (0..resolved.len()).collect();
        order.sort_by_key(|&i| resolved[i]);

        let positions: Vec<u32> = order.iter().map(|&i| resolved[i]).collect();
        validate_subset(&positions, index.num_samples())?;

        if sort_to_store_order {
            let ids = order.iter().map(|&i| requested[i].as_ref().to_string()).collect();
            return Ok(Self::from_positions(positions, ids));
        }

        // Inverse permutation: request slot k is decoded at column inverse[k]
        let mut inverse = vec![0usize; order.len()];
        for (sorted_slot, &request_slot) in order.iter().enumerate() {
            inverse[request_slot] = sorted_slot;
        }
        let is_identity = inverse.iter().enumerate().all(|(k, &c)| k == c);

        Ok(Self {
            positions: Some(positions),
            ids: requested.iter().map(|id| id.as_ref().to_string()).collect(),
            column_order: (!is_identity).then_some(inverse),
        })
    }

    /// Positions for the decoder, or `None` for no filter
    #[must_use]
    pub fn positions(&self) -> Option<&[u32]> {
        self.positions.as_deref()
    }

    /// Column labels in presentation order
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Decoded-column index for each presentation column, when reordered
    #[must_use]
    pub fn column_order(&self) -> Option<&[usize]> {
        self.column_order.as_deref()
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.positions.is_none()
    }

    /// Number of output columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check the selection against a store of `num_samples` samples
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if positions are unsorted, duplicated or out
    /// of bounds, if labels and positions disagree in length, or if the column
    /// order is not a permutation.
    pub fn validate(&self, num_samples: usize) -> Result<(), ValidationError> {
        let width = match &self.positions {
            Some(positions) => {
                validate_subset(positions, num_samples)?;
                positions.len()
            }
            None => num_samples,
        };

        if width != self.ids.len() {
            return Err(ValidationError::LabelMismatch {
                positions: width,
                ids: self.ids.len(),
            });
        }

        if let Some(order) = &self.column_order {
            validate_permutation(order, width)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sample::SampleTable;
    use crate::core::types::DuplicatePolicy;
    use crate::core::variant::VariantTable;

    fn index() -> IdentifierIndex {
        IdentifierIndex::build(
            &VariantTable::default(),
            &SampleTable::from_ids(["S0", "S1", "S2", "S3", "S4"]),
            DuplicatePolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_none_selects_all() {
        let selection = SampleSelection::resolve::<&str>(&index(), None, true).unwrap();
        assert!(selection.is_all());
        assert_eq!(selection.positions(), None);
        assert_eq!(selection.ids(), ["S0", "S1", "S2", "S3", "S4"]);
        assert!(selection.validate(5).is_ok());
    }

    #[test]
    fn test_resolve_sorted_to_store_order() {
        let selection =
            SampleSelection::resolve(&index(), Some(&["S3", "S0", "S2"][..]), true).unwrap();
        assert_eq!(selection.positions(), Some(&[0, 2, 3][..]));
        assert_eq!(selection.ids(), ["S0", "S2", "S3"]);
        assert_eq!(selection.column_order(), None);
    }

    #[test]
    fn test_resolve_keeps_requested_order() {
        let selection =
            SampleSelection::resolve(&index(), Some(&["S3", "S0", "S2"][..]), false).unwrap();
        // Decoder still gets sorted positions
        assert_eq!(selection.positions(), Some(&[0, 2, 3][..]));
        assert_eq!(selection.ids(), ["S3", "S0", "S2"]);
        // S3 is decoded at column 2, S0 at column 0, S2 at column 1
        assert_eq!(selection.column_order(), Some(&[2, 0, 1][..]));
        assert!(selection.validate(5).is_ok());
    }

    #[test]
    fn test_resolve_presorted_same_positions_either_way() {
        let requested = ["S1", "S2", "S4"];
        let sorted = SampleSelection::resolve(&index(), Some(&requested[..]), true).unwrap();
        let unsorted = SampleSelection::resolve(&index(), Some(&requested[..]), false).unwrap();
        assert_eq!(sorted.positions(), unsorted.positions());
        assert_eq!(sorted, unsorted);
    }

    #[test]
    fn test_resolve_deterministic() {
        let a = SampleSelection::resolve(&index(), Some(&["S4", "S1"][..]), false).unwrap();
        let b = SampleSelection::resolve(&index(), Some(&["S4", "S1"][..]), false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_unknown_sample() {
        let result = SampleSelection::resolve(&index(), Some(&["S1", "nobody"][..]), true);
        assert_eq!(
            result.unwrap_err(),
            SelectionError::Lookup(LookupError::UnknownSample("nobody".to_string()))
        );
    }

    #[test]
    fn test_resolve_duplicate_sample() {
        let result = SampleSelection::resolve(&index(), Some(&["S1", "S1"][..]), true);
        assert_eq!(
            result.unwrap_err(),
            SelectionError::Validation(ValidationError::DuplicatePosition(1))
        );
    }

    #[test]
    fn test_resolve_empty_request() {
        let selection = SampleSelection::resolve::<&str>(&index(), Some(&[][..]), true).unwrap();
        assert!(!selection.is_all());
        assert!(selection.is_empty());
        assert_eq!(selection.positions(), Some(&[][..]));
    }

    #[test]
    fn test_validate_free_form_selection() {
        let unsorted =
            SampleSelection::from_positions(vec![2, 1], vec!["S2".into(), "S1".into()]);
        assert!(matches!(
            unsorted.validate(5),
            Err(ValidationError::UnsortedSubset { prev: 2, next: 1 })
        ));

        let mislabeled = SampleSelection::from_positions(vec![1, 2], vec!["S1".into()]);
        assert!(matches!(
            mislabeled.validate(5),
            Err(ValidationError::LabelMismatch { .. })
        ));

        let all_wrong_width = SampleSelection::all(vec!["S0".into()]);
        assert!(all_wrong_width.validate(5).is_err());
    }
}
