//! Parser for PLINK2 `.pvar` variant sidecars.
//!
//! Format: tab-delimited, `CHROM POS ID REF ALT [QUAL [FILTER [INFO]]]`.
//! Lines starting with `#` (`##` meta lines and the `#CHROM` header) are skipped.

use std::path::Path;

use tracing::debug;

use crate::core::variant::{VariantRecord, VariantTable};
use crate::parsing::{read_sidecar, ParseError};

/// Columns every row must carry: CHROM POS ID REF ALT
pub const MIN_PVAR_COLUMNS: usize = 5;

/// Columns a row may carry at most: the above plus QUAL FILTER INFO
pub const MAX_PVAR_COLUMNS: usize = 8;

/// Parse a `.pvar` (or `.pvar.gz`) file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if any row is malformed.
pub fn parse_pvar_file(path: &Path) -> Result<VariantTable, ParseError> {
    let content = read_sidecar(path)?;
    let table = parse_pvar_text(&content)?;
    debug!("Loaded {} variants from {}", table.len(), path.display());
    Ok(table)
}

/// Parse `.pvar` text, preserving row order
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a row has fewer than 5 or more than 8
/// fields, a different field count than the first row, or a non-integer POS.
pub fn parse_pvar_text(text: &str) -> Result<VariantTable, ParseError> {
    let mut records = Vec::new();
    let mut expected_columns: Option<usize> = None;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').collect();

        if !(MIN_PVAR_COLUMNS..=MAX_PVAR_COLUMNS).contains(&fields.len()) {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} fields, expected {MIN_PVAR_COLUMNS} to {MAX_PVAR_COLUMNS}",
                fields.len()
            )));
        }

        match expected_columns {
            None => expected_columns = Some(fields.len()),
            Some(n) if n != fields.len() => {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {line_num} has {} fields, previous rows have {n}",
                    fields.len()
                )));
            }
            Some(_) => {}
        }

        let pos: u64 = fields[1].trim().parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid position on line {}: '{}'",
                line_num, fields[1]
            ))
        })?;

        let mut record = VariantRecord::new(fields[0], pos, fields[2], fields[3], fields[4]);
        record.qual = fields.get(5).map(|s| (*s).to_string());
        record.filter = fields.get(6).map(|s| (*s).to_string());
        record.info = fields.get(7).map(|s| (*s).to_string());

        records.push(record);
    }

    Ok(VariantTable::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pvar_text() {
        let pvar = "##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
chr1\t10177\trs367896724\tA\tAC\t.\tPASS\tAF=0.42
chr1\t10352\trs555500075\tT\tTA\t.\tPASS\t.
chr2\t10616\trs376342519\tCCGCCGTTGCAAAGGCGCGCCG\tC\t100\t.\t.
";

        let table = parse_pvar_text(pvar).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records[0].id, "rs367896724");
        assert_eq!(table.records[0].pos, 10177);
        assert_eq!(table.records[0].alt_allele, "AC");
        assert_eq!(table.records[0].filter.as_deref(), Some("PASS"));
        assert_eq!(table.records[0].info.as_deref(), Some("AF=0.42"));
        assert_eq!(table.records[2].chrom, "chr2");
        assert_eq!(table.records[2].qual.as_deref(), Some("100"));
    }

    #[test]
    fn test_parse_pvar_minimal_columns() {
        let pvar = "#CHROM\tPOS\tID\tREF\tALT\n1\t100\tv1\tA\tG\n1\t200\tv2\tC\tT\n";

        let table = parse_pvar_text(pvar).unwrap();
        assert_eq!(table.ids(), vec!["v1", "v2"]);
        assert!(table.records[1].qual.is_none());
        assert!(table.records[1].info.is_none());
    }

    #[test]
    fn test_parse_pvar_preserves_file_order() {
        let pvar = "2\t5\tb\tA\tG\n1\t9\ta\tA\tG\n1\t1\tc\tA\tG\n";
        let table = parse_pvar_text(pvar).unwrap();
        assert_eq!(table.ids(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_parse_pvar_too_few_fields() {
        let result = parse_pvar_text("1\t100\tv1\tA\n");
        match result {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("Line 1")),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_pvar_too_many_fields() {
        let result = parse_pvar_text("1\t100\tv1\tA\tG\t.\t.\t.\textra\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_pvar_inconsistent_fields() {
        let result = parse_pvar_text("1\t100\tv1\tA\tG\n1\t200\tv2\tA\tG\t.\n");
        match result {
            Err(ParseError::InvalidFormat(msg)) => assert!(msg.contains("Line 2")),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_pvar_bad_position() {
        let result = parse_pvar_text("1\tabc\tv1\tA\tG\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_pvar_keeps_duplicate_ids() {
        let table = parse_pvar_text("1\t1\tdup\tA\tG\n1\t2\tdup\tA\tG\n").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_parse_pvar_empty() {
        let table = parse_pvar_text("#CHROM\tPOS\tID\tREF\tALT\n").unwrap();
        assert!(table.is_empty());
    }
}
