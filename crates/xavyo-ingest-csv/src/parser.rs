//! Row parser for annotation files.
//!
//! Reads a delimited file with a header row into ordered field-value records.
//! Only presence of the required columns is checked; cell contents are passed
//! through trimmed and otherwise untouched.

use std::collections::HashMap;
use std::io::Read;

use xavyo_ingest::error::{IngestError, IngestResult};

/// Column naming the target entity.
pub const RESOURCE_COLUMN: &str = "resource";
/// Column naming the target field, empty for entity-level rows.
pub const SUBRESOURCE_COLUMN: &str = "subresource";
/// Column holding glossary term references.
pub const GLOSSARY_TERMS_COLUMN: &str = "glossary_terms";
/// Column holding tag references.
pub const TAGS_COLUMN: &str = "tags";
/// Column holding owner references.
pub const OWNERS_COLUMN: &str = "owners";

/// Columns every annotation file must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    RESOURCE_COLUMN,
    SUBRESOURCE_COLUMN,
    GLOSSARY_TERMS_COLUMN,
    TAGS_COLUMN,
    OWNERS_COLUMN,
];

/// One parsed data row: column name -> trimmed cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line number (header = 1, first data row = 2).
    pub line_number: usize,
    fields: HashMap<String, String>,
}

impl CsvRow {
    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<'a>(
        line_number: usize,
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            line_number,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.trim().to_string()))
                .collect(),
        }
    }

    /// Cell text for `column`; empty when the cell or the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Streaming reader over the data rows of an annotation file.
pub struct RowReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    headers: Vec<String>,
    line_number: usize,
}

impl<R: Read> RowReader<R> {
    /// Open a reader and validate the header row.
    pub fn new(reader: R, delimiter: u8) -> IngestResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| strip_bom(h).trim().to_string())
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == col))
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::invalid_config(format!(
                "annotation file is missing required columns: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            records: reader.into_records(),
            headers,
            line_number: 1,
        })
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = IngestResult<CsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.line_number += 1;
        let line_number = self.line_number;

        Some(record.map_err(IngestError::from).map(|record| {
            CsvRow::from_pairs(
                line_number,
                self.headers
                    .iter()
                    .map(String::as_str)
                    .zip(record.iter()),
            )
        }))
    }
}

/// Strip a leading UTF-8 BOM from the first header cell.
fn strip_bom(header: &str) -> &str {
    header.strip_prefix('\u{feff}').unwrap_or(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "resource,subresource,glossary_terms,tags,owners";

    /// UTF-8 BOM bytes.
    const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

    fn read_all(data: &str) -> IngestResult<Vec<CsvRow>> {
        RowReader::new(data.as_bytes(), b',')?.collect()
    }

    #[test]
    fn test_parse_rows() {
        let data = format!(
            "{HEADER}\nurn:li:dataset:a,,[urn:li:glossaryTerm:T],[urn:li:tag:L],[urn:li:corpuser:u]\n\
             urn:li:dataset:b,field_foo,,[urn:li:tag:L],\n"
        );
        let rows = read_all(&data).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line_number, 2);
        assert_eq!(rows[0].get(RESOURCE_COLUMN), "urn:li:dataset:a");
        assert_eq!(rows[0].get(SUBRESOURCE_COLUMN), "");
        assert_eq!(rows[0].get(OWNERS_COLUMN), "[urn:li:corpuser:u]");
        assert_eq!(rows[1].get(SUBRESOURCE_COLUMN), "field_foo");
        assert_eq!(rows[1].get(GLOSSARY_TERMS_COLUMN), "");
    }

    #[test]
    fn test_missing_required_column() {
        let result = read_all("resource,subresource,tags,owners\nurn:li:dataset:a,,,\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("glossary_terms"));
    }

    #[test]
    fn test_quoted_cells_keep_embedded_delimiter() {
        let data = format!(
            "{HEADER}\nurn:li:dataset:a,,,\"[urn:li:tag:A,urn:li:tag:B]\",\n"
        );
        let rows = read_all(&data).unwrap();
        assert_eq!(rows[0].get(TAGS_COLUMN), "[urn:li:tag:A,urn:li:tag:B]");
    }

    #[test]
    fn test_short_rows_read_as_empty_cells() {
        let data = format!("{HEADER}\nurn:li:dataset:a,field\n");
        let rows = read_all(&data).unwrap();
        assert_eq!(rows[0].get(TAGS_COLUMN), "");
        assert_eq!(rows[0].get(OWNERS_COLUMN), "");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let data = "resource;subresource;glossary_terms;tags;owners\nurn:li:dataset:a;;;[urn:li:tag:A];\n";
        let rows: Vec<CsvRow> = RowReader::new(data.as_bytes(), b';')
            .unwrap()
            .collect::<IngestResult<_>>()
            .unwrap();
        assert_eq!(rows[0].get(TAGS_COLUMN), "[urn:li:tag:A]");
    }

    #[test]
    fn test_bom_is_stripped_from_header() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(format!("{HEADER}\nurn:li:dataset:a,,,,\n").as_bytes());
        let rows: Vec<CsvRow> = RowReader::new(data.as_slice(), b',')
            .unwrap()
            .collect::<IngestResult<_>>()
            .unwrap();
        assert_eq!(rows[0].get(RESOURCE_COLUMN), "urn:li:dataset:a");
    }

    #[test]
    fn test_cells_are_trimmed() {
        let data = format!("{HEADER}\n  urn:li:dataset:a  , ,,,\n");
        let rows = read_all(&data).unwrap();
        assert_eq!(rows[0].get(RESOURCE_COLUMN), "urn:li:dataset:a");
        assert_eq!(rows[0].get(SUBRESOURCE_COLUMN), "");
    }
}
