use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::config::{FilesetPaths, StoreConfig};
use crate::core::sample::SampleTable;
use crate::core::types::{Dosage, DuplicatePolicy};
use crate::core::variant::VariantTable;
use crate::decoder::GenotypeDecoder;
use crate::index::IdentifierIndex;
use crate::parsing::{psam, pvar};
use crate::retrieval::matrix::{
    reorder_columns, AlleleMatrices, AlleleVector, DosageVector, GenotypeMatrix,
};
use crate::retrieval::{reader, RetrievalError};
use crate::selection::SampleSelection;

/// Identifier-level access to one pgen fileset.
///
/// Tables and the identifier index are loaded once and never change. Every
/// retrieval call takes the [`SampleSelection`] to apply, opens its own decoder
/// session and returns a freshly allocated, labeled buffer. A store can be
/// shared between threads whenever its decoder can.
#[derive(Debug)]
pub struct PgenStore<D> {
    decoder: D,
    paths: FilesetPaths,
    config: StoreConfig,
    variants: VariantTable,
    samples: SampleTable,
    index: IdentifierIndex,
}

impl<D: GenotypeDecoder> PgenStore<D> {
    /// Open `<prefix>.pgen` / `.pvar` / `.psam` with the default config
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Parse` if a sidecar cannot be read or is
    /// malformed.
    pub fn open(prefix: impl AsRef<Path>, decoder: D) -> Result<Self, RetrievalError> {
        Self::open_with_config(prefix, decoder, StoreConfig::default())
    }

    /// Open a fileset, honoring path overrides and the duplicate-id policy
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Parse` for unreadable or malformed sidecars, or
    /// `RetrievalError::Lookup` if the duplicate policy rejects the variant ids.
    pub fn open_with_config(
        prefix: impl AsRef<Path>,
        decoder: D,
        config: StoreConfig,
    ) -> Result<Self, RetrievalError> {
        let paths = config.resolve_paths(prefix.as_ref());
        let variants = pvar::parse_pvar_file(&paths.pvar)?;
        let samples = psam::parse_psam_file(&paths.psam)?;
        Self::from_parts(decoder, paths, config, variants, samples)
    }

    /// Open a fileset with a config read from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Config` if the config file cannot be read or
    /// parsed, otherwise as [`PgenStore::open_with_config`].
    pub fn open_with_config_file(
        prefix: impl AsRef<Path>,
        decoder: D,
        config_path: impl AsRef<Path>,
    ) -> Result<Self, RetrievalError> {
        let config = StoreConfig::load_from_file(config_path.as_ref())?;
        debug!("Loaded store config from {}", config_path.as_ref().display());
        Self::open_with_config(prefix, decoder, config)
    }

    /// Build a store from tables that are already loaded
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Lookup` if `policy` rejects the variant ids.
    pub fn from_tables(
        pgen_path: impl Into<PathBuf>,
        decoder: D,
        variants: VariantTable,
        samples: SampleTable,
        policy: DuplicatePolicy,
    ) -> Result<Self, RetrievalError> {
        let pgen = pgen_path.into();
        let paths = FilesetPaths {
            pvar: pgen.with_extension("pvar"),
            psam: pgen.with_extension("psam"),
            pgen,
        };
        let config = StoreConfig::default().with_duplicate_policy(policy);
        Self::from_parts(decoder, paths, config, variants, samples)
    }

    fn from_parts(
        decoder: D,
        paths: FilesetPaths,
        config: StoreConfig,
        variants: VariantTable,
        samples: SampleTable,
    ) -> Result<Self, RetrievalError> {
        let index = IdentifierIndex::build(&variants, &samples, config.duplicate_policy)?;
        debug!(
            "Indexed {}: {} variants x {} samples ({} duplicate policy)",
            paths.pgen.display(),
            variants.len(),
            samples.len(),
            config.duplicate_policy
        );

        Ok(Self {
            decoder,
            paths,
            config,
            variants,
            samples,
            index,
        })
    }

    // === Metadata ===

    #[must_use]
    pub fn variants(&self) -> &VariantTable {
        &self.variants
    }

    #[must_use]
    pub fn samples(&self) -> &SampleTable {
        &self.samples
    }

    #[must_use]
    pub fn index(&self) -> &IdentifierIndex {
        &self.index
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn pgen_path(&self) -> &Path {
        &self.paths.pgen
    }

    #[must_use]
    pub fn num_variants(&self) -> usize {
        self.variants.len()
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    // === Sample selection ===

    /// Every sample in store order, with no decoder filter
    #[must_use]
    pub fn all_samples(&self) -> SampleSelection {
        SampleSelection::all(self.index.sample_ids().to_vec())
    }

    /// Resolve requested sample ids into a selection
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Lookup` for an unknown sample id, or
    /// `RetrievalError::Validation` if an id is requested twice.
    pub fn resolve_samples<S: AsRef<str>>(
        &self,
        requested: Option<&[S]>,
        sort_to_store_order: bool,
    ) -> Result<SampleSelection, RetrievalError> {
        Ok(SampleSelection::resolve(
            &self.index,
            requested,
            sort_to_store_order,
        )?)
    }

    /// The selection described by the config's `select_samples` / `sort_samples`
    ///
    /// # Errors
    ///
    /// As [`resolve_samples`](Self::resolve_samples).
    pub fn default_selection(&self) -> Result<SampleSelection, RetrievalError> {
        self.resolve_samples(
            self.config.select_samples.as_deref(),
            self.config.sort_samples,
        )
    }

    // === Retrieval ===

    /// Dosages of one variant for the selected samples
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::Lookup` for an unknown variant id (before any
    /// decoder session is opened), `RetrievalError::Validation` for an invalid
    /// selection, or `RetrievalError::Decoder` if decoding fails.
    pub fn get_dosages<T: Dosage>(
        &self,
        variant_id: &str,
        selection: &SampleSelection,
    ) -> Result<DosageVector<T>, RetrievalError> {
        let variant_idx = self.index.index_of_variant(variant_id)?;
        self.check_selection(selection)?;

        let values: Array1<T> = reader::read_dosages(
            &self.decoder,
            &self.paths.pgen,
            variant_idx,
            selection.positions(),
        )?;
        self.check_width(values.len(), selection)?;

        let values = match selection.column_order() {
            Some(order) => values.select(Axis(0), order),
            None => values,
        };

        Ok(DosageVector {
            variant_id: variant_id.to_string(),
            sample_ids: selection.ids().to_vec(),
            values,
        })
    }

    /// Interleaved allele codes of one variant for the selected samples
    ///
    /// # Errors
    ///
    /// As [`get_dosages`](Self::get_dosages).
    pub fn get_alleles(
        &self,
        variant_id: &str,
        selection: &SampleSelection,
    ) -> Result<AlleleVector, RetrievalError> {
        let variant_idx = self.index.index_of_variant(variant_id)?;
        self.check_selection(selection)?;

        let codes = reader::read_alleles(
            &self.decoder,
            &self.paths.pgen,
            variant_idx,
            selection.positions(),
        )?;
        self.check_width(codes.len() / 2, selection)?;

        let codes = match selection.column_order() {
            Some(order) => {
                let expanded: Vec<usize> =
                    order.iter().flat_map(|&c| [2 * c, 2 * c + 1]).collect();
                codes.select(Axis(0), &expanded)
            }
            None => codes,
        };

        Ok(AlleleVector {
            variant_id: variant_id.to_string(),
            sample_ids: selection.ids().to_vec(),
            codes,
        })
    }

    /// Dosages for a list of variants; rows follow the order of `variant_ids`
    ///
    /// An empty list yields a zero-row matrix without opening a session.
    ///
    /// # Errors
    ///
    /// As [`get_dosages`](Self::get_dosages).
    pub fn get_dosages_list<T: Dosage, S: AsRef<str>>(
        &self,
        variant_ids: &[S],
        selection: &SampleSelection,
    ) -> Result<GenotypeMatrix<T>, RetrievalError> {
        let variant_idxs = self.index.indexes_of_variants(variant_ids)?;
        self.check_selection(selection)?;

        let values: Array2<T> = if variant_idxs.is_empty() {
            Array2::zeros((0, selection.len()))
        } else {
            reader::read_dosages_list(
                &self.decoder,
                &self.paths.pgen,
                &variant_idxs,
                selection.positions(),
            )?
        };

        let labels = variant_ids.iter().map(|id| id.as_ref().to_string()).collect();
        self.label(labels, values, selection, false)
    }

    /// First and second allele matrices for a list of variants
    ///
    /// # Errors
    ///
    /// As [`get_dosages`](Self::get_dosages).
    pub fn get_alleles_list<S: AsRef<str>>(
        &self,
        variant_ids: &[S],
        selection: &SampleSelection,
    ) -> Result<AlleleMatrices, RetrievalError> {
        let variant_idxs = self.index.indexes_of_variants(variant_ids)?;
        self.check_selection(selection)?;

        let interleaved = if variant_idxs.is_empty() {
            Array2::zeros((0, 2 * selection.len()))
        } else {
            reader::read_alleles_list(
                &self.decoder,
                &self.paths.pgen,
                &variant_idxs,
                selection.positions(),
            )?
        };

        let labels = variant_ids.iter().map(|id| id.as_ref().to_string()).collect();
        let interleaved = self.label(labels, interleaved, selection, true)?;
        Ok(AlleleMatrices::from_interleaved(
            interleaved.variant_ids,
            interleaved.sample_ids,
            &interleaved.values,
        ))
    }

    /// Dosages for store positions `start..=end` (0-based, end inclusive)
    ///
    /// # Errors
    ///
    /// Returns `RetrievalError::InvalidRange` if `start > end`,
    /// `RetrievalError::VariantOutOfRange` if `end` is past the last variant,
    /// otherwise as [`get_dosages`](Self::get_dosages).
    pub fn get_dosages_range<T: Dosage>(
        &self,
        start: u32,
        end: u32,
        selection: &SampleSelection,
    ) -> Result<GenotypeMatrix<T>, RetrievalError> {
        let labels = self.range_labels(start, end)?;
        self.check_selection(selection)?;

        let values = reader::read_dosages_range(
            &self.decoder,
            &self.paths.pgen,
            start,
            end,
            selection.positions(),
        )?;
        self.label(labels, values, selection, false)
    }

    /// First and second allele matrices for store positions `start..=end`
    ///
    /// # Errors
    ///
    /// As [`get_dosages_range`](Self::get_dosages_range).
    pub fn get_alleles_range(
        &self,
        start: u32,
        end: u32,
        selection: &SampleSelection,
    ) -> Result<AlleleMatrices, RetrievalError> {
        let labels = self.range_labels(start, end)?;
        self.check_selection(selection)?;

        let interleaved = reader::read_alleles_range(
            &self.decoder,
            &self.paths.pgen,
            start,
            end,
            selection.positions(),
        )?;
        let interleaved = self.label(labels, interleaved, selection, true)?;
        Ok(AlleleMatrices::from_interleaved(
            interleaved.variant_ids,
            interleaved.sample_ids,
            &interleaved.values,
        ))
    }

    /// Dosages for every variant, rows in store order
    ///
    /// # Errors
    ///
    /// As [`get_dosages_range`](Self::get_dosages_range).
    pub fn load_full_table<T: Dosage>(
        &self,
        selection: &SampleSelection,
    ) -> Result<GenotypeMatrix<T>, RetrievalError> {
        match u32::try_from(self.num_variants()) {
            Ok(0) => {
                self.check_selection(selection)?;
                Ok(GenotypeMatrix::new(
                    Vec::new(),
                    selection.ids().to_vec(),
                    Array2::zeros((0, selection.len())),
                ))
            }
            Ok(n) => self.get_dosages_range(0, n - 1, selection),
            // The index refuses tables this large at construction
            Err(_) => Err(RetrievalError::VariantOutOfRange {
                index: u32::MAX,
                num_variants: self.num_variants(),
            }),
        }
    }

    // === Helpers ===

    fn check_selection(&self, selection: &SampleSelection) -> Result<(), RetrievalError> {
        selection.validate(self.num_samples())?;
        Ok(())
    }

    /// The decoder's unfiltered width must match the sample table
    fn check_width(&self, width: usize, selection: &SampleSelection) -> Result<(), RetrievalError> {
        if selection.is_all() && width != self.num_samples() {
            return Err(RetrievalError::SampleCountMismatch {
                store: width,
                table: self.num_samples(),
            });
        }
        Ok(())
    }

    fn range_labels(&self, start: u32, end: u32) -> Result<Vec<String>, RetrievalError> {
        if start > end {
            return Err(RetrievalError::InvalidRange { start, end });
        }
        let ids = self.index.variant_ids();
        if end as usize >= ids.len() {
            return Err(RetrievalError::VariantOutOfRange {
                index: end,
                num_variants: ids.len(),
            });
        }
        Ok(ids[start as usize..=end as usize].to_vec())
    }

    /// Check width, move columns into presentation order and attach labels
    fn label<T: Clone>(
        &self,
        variant_ids: Vec<String>,
        values: Array2<T>,
        selection: &SampleSelection,
        interleaved: bool,
    ) -> Result<GenotypeMatrix<T>, RetrievalError> {
        let width = if interleaved {
            values.ncols() / 2
        } else {
            values.ncols()
        };
        self.check_width(width, selection)?;

        let values = match selection.column_order() {
            Some(order) => reorder_columns(&values, order, interleaved),
            None => values,
        };

        Ok(GenotypeMatrix {
            variant_ids,
            sample_ids: selection.ids().to_vec(),
            values,
        })
    }
}

/// Load dosages for every variant and the selected samples of a fileset.
///
/// `select_samples` of `None` selects every sample; a list is presented in
/// store order.
///
/// # Errors
///
/// As [`PgenStore::open`] and [`PgenStore::load_full_table`], plus
/// `RetrievalError::Lookup` for unknown sample ids.
pub fn load_dosages_table<T: Dosage, D: GenotypeDecoder, S: AsRef<str>>(
    prefix: impl AsRef<Path>,
    decoder: D,
    select_samples: Option<&[S]>,
) -> Result<GenotypeMatrix<T>, RetrievalError> {
    let store = PgenStore::open(prefix, decoder)?;
    let selection = store.resolve_samples(select_samples, true)?;
    store.load_full_table(&selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::core::variant::VariantRecord;
    use crate::decoder::memory::InMemoryDecoder;
    use crate::index::LookupError;
    use crate::utils::validation::ValidationError;
    use ndarray::array;

    /// 4 variants (v0..v3) x 3 samples (S0..S2)
    fn store() -> PgenStore<InMemoryDecoder> {
        let decoder = InMemoryDecoder::from_alleles(array![
            [0, 1, -9, -9, 1, 1],
            [0, 0, 0, 1, 1, 1],
            [1, 1, 0, 0, 0, 1],
            [0, 0, 1, 1, 0, 0],
        ])
        .unwrap();
        let variants = VariantTable::new(
            (0..4u64)
                .map(|i| VariantRecord::new("1", 100 * (i + 1), format!("v{i}"), "A", "G"))
                .collect(),
        );
        PgenStore::from_tables(
            "/data/test.pgen",
            decoder,
            variants,
            SampleTable::from_ids(["S0", "S1", "S2"]),
            DuplicatePolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_get_dosages_all_samples() {
        let store = store();
        let dosages = store.get_dosages::<f32>("v1", &store.all_samples()).unwrap();
        assert_eq!(dosages.variant_id, "v1");
        assert_eq!(dosages.sample_ids, vec!["S0", "S1", "S2"]);
        assert_eq!(dosages.values, array![0.0f32, 1.0, 2.0]);
        assert_eq!(store.decoder().last_path().unwrap(), Path::new("/data/test.pgen"));
    }

    #[test]
    fn test_get_alleles_deinterleaves() {
        let store = store();
        let alleles = store.get_alleles("v0", &store.all_samples()).unwrap();
        assert_eq!(alleles.codes.len(), 6);
        assert_eq!(alleles.first(), array![0, -9, 1]);
        assert_eq!(alleles.second(), array![1, -9, 1]);
    }

    #[test]
    fn test_unknown_variant_opens_no_session() {
        let store = store();
        let result = store.get_dosages::<f64>("no-such-id", &store.all_samples());
        assert!(matches!(
            result,
            Err(RetrievalError::Lookup(LookupError::UnknownVariant(_)))
        ));
        assert_eq!(store.decoder().sessions_opened(), 0);
    }

    #[test]
    fn test_request_order_selection_keeps_values_with_labels() {
        let store = store();
        let selection = store.resolve_samples(Some(&["S2", "S0"][..]), false).unwrap();

        let dosages = store.get_dosages::<f64>("v0", &selection).unwrap();
        assert_eq!(dosages.sample_ids, vec!["S2", "S0"]);
        assert_eq!(dosages.values, array![2.0, 1.0]);

        let alleles = store.get_alleles("v2", &selection).unwrap();
        assert_eq!(alleles.get("S2"), Some((0, 1)));
        assert_eq!(alleles.get("S0"), Some((1, 1)));

        let matrix = store.get_alleles_range(0, 1, &selection).unwrap();
        assert_eq!(matrix.first.values, array![[1, 0], [1, 0]]);
        assert_eq!(matrix.second.values, array![[1, 1], [1, 0]]);
    }

    #[test]
    fn test_invalid_free_form_selection() {
        let store = store();
        let selection =
            SampleSelection::from_positions(vec![1, 1], vec!["S1".into(), "S1".into()]);
        let result = store.get_dosages_list::<f32, _>(&["v0"], &selection);
        assert!(matches!(
            result,
            Err(RetrievalError::Validation(ValidationError::DuplicatePosition(1)))
        ));
        assert_eq!(store.decoder().sessions_opened(), 0);
    }

    #[test]
    fn test_empty_list_is_zero_rows() {
        let store = store();
        let empty: [&str; 0] = [];
        let dosages = store
            .get_dosages_list::<f32, _>(&empty, &store.all_samples())
            .unwrap();
        assert_eq!(dosages.values.dim(), (0, 3));

        let alleles = store.get_alleles_list(&empty, &store.all_samples()).unwrap();
        assert_eq!(alleles.first.values.dim(), (0, 3));
        assert_eq!(store.decoder().sessions_opened(), 0);
    }

    #[test]
    fn test_range_errors() {
        let store = store();
        let all = store.all_samples();
        assert!(matches!(
            store.get_dosages_range::<f32>(2, 1, &all),
            Err(RetrievalError::InvalidRange { start: 2, end: 1 })
        ));
        assert!(matches!(
            store.get_dosages_range::<f32>(0, 4, &all),
            Err(RetrievalError::VariantOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn test_sample_count_mismatch() {
        // Decoder holds 3 samples, table lists 2
        let store = PgenStore::from_tables(
            "x.pgen",
            InMemoryDecoder::from_alleles(array![[0, 0, 0, 1, 1, 1]]).unwrap(),
            VariantTable::new(vec![VariantRecord::new("1", 1, "v0", "A", "G")]),
            SampleTable::from_ids(["S0", "S1"]),
            DuplicatePolicy::default(),
        )
        .unwrap();

        let result = store.get_dosages::<f32>("v0", &store.all_samples());
        assert!(matches!(
            result,
            Err(RetrievalError::SampleCountMismatch { store: 3, table: 2 })
        ));
        assert_eq!(store.decoder().sessions_released(), 1);
    }

    #[test]
    fn test_load_full_table_empty_store() {
        let store = PgenStore::from_tables(
            "x.pgen",
            InMemoryDecoder::from_alleles(Array2::zeros((0, 4))).unwrap(),
            VariantTable::default(),
            SampleTable::from_ids(["S0", "S1"]),
            DuplicatePolicy::default(),
        )
        .unwrap();

        let table = store.load_full_table::<f64>(&store.all_samples()).unwrap();
        assert_eq!(table.values.dim(), (0, 2));
        assert!(table.variant_ids.is_empty());
    }

    #[test]
    fn test_repeated_variant_id_agrees_with_full_table() {
        let variants = VariantTable::new(vec![
            VariantRecord::new("1", 100, "dup", "A", "G"),
            VariantRecord::new("1", 200, "dup", "A", "G"),
        ]);
        let store = PgenStore::from_tables(
            "/data/test.pgen",
            InMemoryDecoder::from_alleles(array![[0, 0, 0, 0], [1, 1, 1, 1]]).unwrap(),
            variants,
            SampleTable::from_ids(["S0", "S1"]),
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        let selection = store.all_samples();

        let single = store.get_dosages::<f64>("dup", &selection).unwrap();
        let table = store.load_full_table::<f64>(&selection).unwrap();
        assert_eq!(single.values, array![2.0, 2.0]);
        assert_eq!(table.row("dup").unwrap(), single.values);
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PgenStore::open_with_config_file(
            dir.path().join("cohort"),
            InMemoryDecoder::from_alleles(array![[0, 0]]).unwrap(),
            dir.path().join("missing.json"),
        );
        assert!(matches!(
            result,
            Err(RetrievalError::Config(ConfigError::ReadError(_)))
        ));
    }

    #[test]
    fn test_default_selection_from_config() {
        let mut store = store();
        store.config = StoreConfig::default()
            .with_samples(["S2", "S1"])
            .with_sort_samples(true);

        let selection = store.default_selection().unwrap();
        assert_eq!(selection.ids(), ["S1", "S2"]);
        assert_eq!(selection.positions(), Some(&[1, 2][..]));
    }
}
