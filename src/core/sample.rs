use serde::{Deserialize, Serialize};

/// A single row of a `.psam` sample sidecar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Sample key (first column)
    pub id: String,

    /// Remaining columns, passed through unmodified
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl SampleRecord {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Samples in the positional order of the genotype store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleTable {
    /// Header names of the attribute columns (the key column excluded)
    pub columns: Vec<String>,

    /// Header name of the key column, without a leading `#`
    pub key_column: String,

    pub records: Vec<SampleRecord>,
}

impl SampleTable {
    #[must_use]
    pub fn new(
        key_column: impl Into<String>,
        columns: Vec<String>,
        records: Vec<SampleRecord>,
    ) -> Self {
        Self {
            columns,
            key_column: key_column.into(),
            records,
        }
    }

    /// Build a table with only sample ids and no attribute columns
    #[must_use]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Vec::new(),
            key_column: "IID".to_string(),
            records: ids.into_iter().map(SampleRecord::new).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SampleRecord> {
        self.records.get(index)
    }

    /// Sample ids in store order
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Value of a named attribute column for the sample at `index`
    #[must_use]
    pub fn attribute(&self, index: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.records
            .get(index)
            .and_then(|r| r.attributes.get(col))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_table_attribute_lookup() {
        let table = SampleTable::new(
            "IID",
            vec!["SEX".to_string(), "PHENO".to_string()],
            vec![
                SampleRecord::new("S1").with_attributes(vec!["1".into(), "0.5".into()]),
                SampleRecord::new("S2").with_attributes(vec!["2".into(), "NA".into()]),
            ],
        );

        assert_eq!(table.ids(), vec!["S1", "S2"]);
        assert_eq!(table.attribute(1, "SEX"), Some("2"));
        assert_eq!(table.attribute(0, "PHENO"), Some("0.5"));
        assert_eq!(table.attribute(0, "MISSING"), None);
        assert_eq!(table.attribute(5, "SEX"), None);
    }

    #[test]
    fn test_from_ids() {
        let table = SampleTable::from_ids(["a", "b", "c"]);
        assert_eq!(table.len(), 3);
        assert!(table.columns.is_empty());
    }
}
