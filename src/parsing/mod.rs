//! Parsers for the text sidecars of a PLINK2 fileset.
//!
//! - **`.pvar`**: one row per variant, in store order
//!   (`CHROM POS ID REF ALT [QUAL [FILTER [INFO]]]`)
//! - **`.psam`**: header row plus one row per sample, in store order; the first
//!   column is the sample key
//!
//! Both parsers accept gzip/bgzip compressed input when the file name ends in
//! `.gz` or `.bgz`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pgen_retrieval::parsing::{psam, pvar};
//! use std::path::Path;
//!
//! let variants = pvar::parse_pvar_file(Path::new("cohort.pvar")).unwrap();
//! let samples = psam::parse_psam_file(Path::new("cohort.psam")).unwrap();
//! println!("{} variants x {} samples", variants.len(), samples.len());
//! ```

use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod psam;
pub mod pvar;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed sidecar row or header
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read a whole sidecar into memory, decompressing if the name says so
pub(crate) fn read_sidecar(path: &Path) -> Result<String, ParseError> {
    if is_gzipped(path) {
        let mut content = String::new();
        MultiGzDecoder::new(std::fs::File::open(path)?).read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
