//! Checks applied to positional inputs before they reach the decoder.

/// Validation errors for sample subsets and labels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Sample subset is not sorted: position {next} follows {prev}")]
    UnsortedSubset { prev: u32, next: u32 },

    #[error("Sample subset contains position {0} more than once")]
    DuplicatePosition(u32),

    #[error("Sample position {position} out of bounds for {num_samples} samples")]
    PositionOutOfBounds { position: u32, num_samples: usize },

    #[error("Selection has {positions} positions but {ids} sample ids")]
    LabelMismatch { positions: usize, ids: usize },

    #[error("Column order is not a permutation of 0..{0}")]
    InvalidColumnOrder(usize),
}

/// Validate a sample subset against the decoder's contract.
///
/// Positions must be strictly ascending (sorted, no duplicates) and every
/// position must address a sample in a store of `num_samples` samples.
///
/// # Examples
///
/// ```
/// use pgen_retrieval::utils::validation::{validate_subset, ValidationError};
///
/// assert!(validate_subset(&[0, 2, 5], 6).is_ok());
/// assert_eq!(validate_subset(&[2, 2], 6), Err(ValidationError::DuplicatePosition(2)));
/// assert!(validate_subset(&[3, 1], 6).is_err());
/// assert!(validate_subset(&[6], 6).is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::DuplicatePosition`, `ValidationError::UnsortedSubset`
/// or `ValidationError::PositionOutOfBounds` for the first offending position.
pub fn validate_subset(positions: &[u32], num_samples: usize) -> Result<(), ValidationError> {
    for pair in positions.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev == next {
            return Err(ValidationError::DuplicatePosition(next));
        }
        if next < prev {
            return Err(ValidationError::UnsortedSubset { prev, next });
        }
    }

    // Sorted, so the last position is the largest
    if let Some(&last) = positions.last() {
        if last as usize >= num_samples {
            return Err(ValidationError::PositionOutOfBounds {
                position: last,
                num_samples,
            });
        }
    }

    Ok(())
}

/// Check that `order` is a permutation of `0..len`.
///
/// # Errors
///
/// Returns `ValidationError::InvalidColumnOrder` otherwise.
pub fn validate_permutation(order: &[usize], len: usize) -> Result<(), ValidationError> {
    if order.len() != len {
        return Err(ValidationError::InvalidColumnOrder(len));
    }
    let mut seen = vec![false; len];
    for &i in order {
        match seen.get_mut(i) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(ValidationError::InvalidColumnOrder(len)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_subset_ok() {
        assert!(validate_subset(&[], 0).is_ok());
        assert!(validate_subset(&[0], 1).is_ok());
        assert!(validate_subset(&[1, 4, 9], 10).is_ok());
    }

    #[test]
    fn test_validate_subset_unsorted() {
        assert_eq!(
            validate_subset(&[1, 4, 3], 10),
            Err(ValidationError::UnsortedSubset { prev: 4, next: 3 })
        );
    }

    #[test]
    fn test_validate_subset_duplicate() {
        assert_eq!(
            validate_subset(&[1, 1, 3], 10),
            Err(ValidationError::DuplicatePosition(1))
        );
    }

    #[test]
    fn test_validate_subset_out_of_bounds() {
        assert_eq!(
            validate_subset(&[0, 10], 10),
            Err(ValidationError::PositionOutOfBounds {
                position: 10,
                num_samples: 10
            })
        );
    }

    #[test]
    fn test_validate_permutation() {
        assert!(validate_permutation(&[2, 0, 1], 3).is_ok());
        assert!(validate_permutation(&[], 0).is_ok());
        assert!(validate_permutation(&[0, 0, 1], 3).is_err());
        assert!(validate_permutation(&[0, 3, 1], 3).is_err());
        assert!(validate_permutation(&[0, 1], 3).is_err());
    }
}
