//! Parser for PLINK2 `.psam` sample sidecars.
//!
//! The first non-`##` line is the header. Its first column (with any leading
//! `#` removed, e.g. `#IID` or `#FID`) is the sample key; the remaining columns
//! are passed through as opaque attributes.

use std::path::Path;

use tracing::debug;

use crate::core::sample::{SampleRecord, SampleTable};
use crate::parsing::{read_sidecar, ParseError};

/// Parse a `.psam` (or `.psam.gz`) file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if the header or any row is malformed.
pub fn parse_psam_file(path: &Path) -> Result<SampleTable, ParseError> {
    let content = read_sidecar(path)?;
    let table = parse_psam_text(&content)?;
    debug!("Loaded {} samples from {}", table.len(), path.display());
    Ok(table)
}

/// Parse `.psam` text, preserving row order
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if there is no header, a row's field
/// count differs from the header's, or a sample id is empty.
pub fn parse_psam_text(text: &str) -> Result<SampleTable, ParseError> {
    // Line numbers in errors are 1-based for user friendliness
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with("##"));

    let Some((header_num, header_line)) = lines.next() else {
        return Err(ParseError::InvalidFormat(
            "No header found in sample file".to_string(),
        ));
    };

    let mut columns: Vec<String> = header_line
        .split('\t')
        .map(|f| f.trim_start_matches('#').to_string())
        .collect();
    if columns[0].is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "Line {header_num}: header has an empty key column"
        )));
    }

    let mut records = Vec::new();
    for (line_num, line) in lines {
        let fields: Vec<&str> = line.split('\t').collect();

        if fields.len() != columns.len() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} fields, header has {}",
                fields.len(),
                columns.len()
            )));
        }

        let id = fields[0].trim();
        if id.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has an empty sample id"
            )));
        }

        let attributes = fields[1..].iter().map(|s| (*s).to_string()).collect();
        records.push(SampleRecord::new(id).with_attributes(attributes));
    }

    let key_column = columns.remove(0);
    Ok(SampleTable::new(key_column, columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_psam_text() {
        let psam = "#IID\tSEX\tPHENO1
HG00096\t1\t0.25
HG00097\t2\tNA
HG00099\t2\t1.5
";

        let table = parse_psam_text(psam).unwrap();
        assert_eq!(table.key_column, "IID");
        assert_eq!(table.columns, vec!["SEX", "PHENO1"]);
        assert_eq!(table.ids(), vec!["HG00096", "HG00097", "HG00099"]);
        assert_eq!(table.attribute(1, "PHENO1"), Some("NA"));
    }

    #[test]
    fn test_parse_psam_first_column_is_key() {
        // With FID present, the first column is still the key
        let psam = "#FID\tIID\tSEX\nfam1\tS1\t1\nfam2\tS2\t2\n";

        let table = parse_psam_text(psam).unwrap();
        assert_eq!(table.key_column, "FID");
        assert_eq!(table.ids(), vec!["fam1", "fam2"]);
        assert_eq!(table.attribute(0, "IID"), Some("S1"));
    }

    #[test]
    fn test_parse_psam_skips_meta_lines() {
        let psam = "## created by test\n#IID\nA\nB\n";
        let table = parse_psam_text(psam).unwrap();
        assert_eq!(table.ids(), vec!["A", "B"]);
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_parse_psam_wrong_field_count() {
        let psam = "#IID\tSEX\nS1\t1\nS2\n";
        match parse_psam_text(psam) {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("Line 3")),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_psam_empty_id() {
        let psam = "#IID\tSEX\n\t1\n";
        assert!(matches!(
            parse_psam_text(psam),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_psam_no_header() {
        assert!(matches!(
            parse_psam_text(""),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_psam_header_only() {
        let table = parse_psam_text("#IID\tSEX\n").unwrap();
        assert!(table.is_empty());
    }
}
