use serde::{Deserialize, Serialize};

/// Allele code written by the decoder for a missing genotype (both slots).
pub const MISSING_ALLELE: i32 = -9;

/// Dosage value written by the decoder for a missing genotype.
pub const MISSING_DOSAGE: f64 = -9.0;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating point element type of a dosage buffer (`f32` or `f64`).
///
/// The choice of `T` at a call site is the dtype request: the decoder fills a
/// buffer of exactly this type, no intermediate conversion is done here.
pub trait Dosage:
    num_traits::Float
    + num_traits::FromPrimitive
    + Default
    + std::fmt::Debug
    + Send
    + Sync
    + Serialize
    + 'static
    + sealed::Sealed
{
    /// Short dtype name, as used in log messages.
    const DTYPE: &'static str;
}

impl Dosage for f32 {
    const DTYPE: &'static str = "float32";
}

impl Dosage for f64 {
    const DTYPE: &'static str = "float64";
}

/// How the variant index treats a variant id that appears on more than one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later row overwrites the earlier mapping. Lookups of a duplicated id
    /// resolve to its last occurrence; a warning is logged per duplicate.
    #[default]
    LastWins,
    /// Index construction fails on the first duplicated id.
    Reject,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastWins => write!(f, "last-wins"),
            Self::Reject => write!(f, "reject"),
        }
    }
}
