//! # pgen-retrieval
//!
//! Random-access retrieval of genotype dosages and allele codes from PLINK2
//! pgen filesets, keyed by variant and sample identifiers.
//!
//! A fileset is three files sharing a prefix: the binary genotype store
//! (`.pgen`), the variant sidecar (`.pvar`) and the sample sidecar (`.psam`).
//! This crate loads the sidecars, maps identifiers to the positional indexes the
//! genotype decoder works with, resolves sample subsets, and returns labeled
//! matrices. Decoding the compressed `.pgen` bitstream is left to a backend
//! implementing [`GenotypeDecoder`].
//!
//! ## Features
//!
//! - **Four retrieval modes**: single variant, variant list, contiguous range
//!   and full table, for both dosages and allele codes
//! - **Sample subsets**: any subset of samples, presented in store order or in
//!   the order requested
//! - **Labeled results**: every matrix carries its variant ids and sample ids
//! - **Scoped decoding**: each call opens and releases its own decoder session
//!
//! ## Example
//!
//! ```rust,no_run
//! use pgen_retrieval::{InMemoryDecoder, PgenStore};
//! use ndarray::Array2;
//!
//! # let decoder = InMemoryDecoder::from_alleles(Array2::zeros((3, 4))).unwrap();
//! let store = PgenStore::open("cohort", decoder).unwrap();
//! let samples = store.resolve_samples(Some(&["HG00096", "HG00099"][..]), true).unwrap();
//!
//! let dosages = store.get_dosages::<f32>("rs367896724", &samples).unwrap();
//! let table = store.load_full_table::<f64>(&samples).unwrap();
//! println!("{} x {}", table.n_variants(), table.n_samples());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Variant and sample records, dosage element types
//! - [`parsing`]: `.pvar` / `.psam` parsers
//! - [`index`]: Identifier <-> position mapping
//! - [`selection`]: Sample subset resolution
//! - [`decoder`]: Decoder contract and an in-memory implementation
//! - [`retrieval`]: Positional reads and the identifier-level [`PgenStore`]
//! - [`config`]: Store configuration

pub mod config;
pub mod core;
pub mod decoder;
pub mod index;
pub mod parsing;
pub mod retrieval;
pub mod selection;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::StoreConfig;
pub use crate::core::sample::{SampleRecord, SampleTable};
pub use crate::core::types::*;
pub use crate::core::variant::{VariantRecord, VariantTable};
pub use decoder::memory::InMemoryDecoder;
pub use decoder::{DecoderError, DecoderSession, GenotypeDecoder};
pub use index::{IdentifierIndex, LookupError};
pub use retrieval::matrix::{AlleleMatrices, AlleleVector, DosageVector, GenotypeMatrix};
pub use retrieval::store::{load_dosages_table, PgenStore};
pub use retrieval::RetrievalError;
pub use selection::SampleSelection;
