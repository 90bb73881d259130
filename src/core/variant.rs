use serde::{Deserialize, Serialize};

/// A single row of a `.pvar` variant sidecar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Chromosome code (CHROM column)
    pub chrom: String,

    /// Base-pair coordinate (POS column)
    pub pos: u64,

    /// Variant identifier (ID column), expected to be unique
    pub id: String,

    /// Reference allele (REF column)
    #[serde(rename = "ref")]
    pub ref_allele: String,

    /// Alternate allele(s) (ALT column), comma-separated when multiallelic
    #[serde(rename = "alt")]
    pub alt_allele: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qual: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl VariantRecord {
    #[must_use]
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        id: impl Into<String>,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            id: id.into(),
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
            qual: None,
            filter: None,
            info: None,
        }
    }
}

/// Variants in the positional order of the genotype store.
///
/// The row number of a record is the 0-based variant index the decoder expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantTable {
    pub records: Vec<VariantRecord>,
}

impl VariantTable {
    #[must_use]
    pub fn new(records: Vec<VariantRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at a 0-based store position
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&VariantRecord> {
        self.records.get(index)
    }

    /// Variant ids in store order
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VariantRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a VariantTable {
    type Item = &'a VariantRecord;
    type IntoIter = std::slice::Iter<'a, VariantRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_table_order() {
        let table = VariantTable::new(vec![
            VariantRecord::new("chr1", 100, "rs1", "A", "G"),
            VariantRecord::new("chr1", 200, "rs2", "C", "T"),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.ids(), vec!["rs1", "rs2"]);
        assert_eq!(table.get(1).unwrap().pos, 200);
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_variant_record_serde_names() {
        let record = VariantRecord::new("chr2", 5, "rs9", "A", "T");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"ref\":\"A\""));
        assert!(json.contains("\"alt\":\"T\""));
        assert!(!json.contains("qual"));
    }
}
