//! Core data types for genotype retrieval.
//!
//! - [`VariantRecord`] / [`VariantTable`]: rows of the `.pvar` sidecar, in store order
//! - [`SampleRecord`] / [`SampleTable`]: rows of the `.psam` sidecar, in store order
//! - [`Dosage`]: element type of dosage buffers (`f32` or `f64`)
//! - [`DuplicatePolicy`]: how duplicated variant ids are indexed
//!
//! ## Positions
//!
//! The row number of a record in either table is its 0-based position in the
//! genotype store. Positions are what the decoder consumes; identifiers are what
//! callers use.
//!
//! [`VariantRecord`]: variant::VariantRecord
//! [`VariantTable`]: variant::VariantTable
//! [`SampleRecord`]: sample::SampleRecord
//! [`SampleTable`]: sample::SampleTable
//! [`Dosage`]: types::Dosage
//! [`DuplicatePolicy`]: types::DuplicatePolicy

pub mod sample;
pub mod types;
pub mod variant;
