//! Delimited-text catalog reader
//!
//! Catalog files are loosely structured CSV: the first non-blank line is the
//! header, the field delimiter is either `,` or `;` (detected from the header)
//! and rows are kept unsplit so loaders can split them with the detected
//! delimiter.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Errors that abort a catalog load
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The file exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Field delimiter of a catalog file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_char())
    }
}

/// Header, delimiter and raw data rows of one catalog file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedRecords {
    /// Lowercased, trimmed column names
    pub header: Vec<String>,
    pub delimiter: Delimiter,
    /// Non-blank, trimmed data lines in file order
    pub rows: Vec<String>,
}

impl DelimitedRecords {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() || self.rows.is_empty()
    }

    /// Position of the first column matching any of `names` (tried in order)
    pub fn column_index(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|name| self.header.iter().position(|column| column == name))
    }

    /// Split a data row into raw (untrimmed) fields
    pub fn split<'a>(&self, row: &'a str) -> Vec<&'a str> {
        row.split(self.delimiter.as_char()).collect()
    }
}

/// Trimmed field at `index`, or `""` when the column is unresolved or the
/// row is too short
pub fn field<'a>(parts: &[&'a str], index: Option<usize>) -> &'a str {
    index
        .and_then(|i| parts.get(i))
        .map(|value| value.trim())
        .unwrap_or("")
}

/// Pick the delimiter of a header line. Commas win ties, and a header with
/// neither character falls back to comma.
pub fn detect_delimiter(line: &str) -> Delimiter {
    let line = line.trim_start_matches(BYTE_ORDER_MARK);
    let semicolons = line.matches(';').count();
    let commas = line.matches(',').count();

    if commas >= semicolons {
        Delimiter::Comma
    } else {
        Delimiter::Semicolon
    }
}

/// Split catalog text into header and rows.
///
/// `source` only labels log lines. Missing required columns are reported and
/// otherwise ignored: the loader resolves them to empty fields.
pub fn parse_records(source: &str, text: &str, required: &[&str]) -> DelimitedRecords {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() <= 1 {
        warn!("CSV looks empty (lines <= 1): {}", source);
        return DelimitedRecords::default();
    }

    let header_line = lines[0].trim_start_matches(BYTE_ORDER_MARK);
    let delimiter = detect_delimiter(header_line);
    info!("Detected delimiter in {}: {}", source, delimiter);

    let header: Vec<String> = header_line
        .split(delimiter.as_char())
        .map(|column| column.trim().to_lowercase())
        .collect();

    for column in required {
        if !header.iter().any(|h| h == column) {
            warn!(
                "Header of {} is missing required column: {}. Header: {:?}",
                source, column, header
            );
        }
    }

    DelimitedRecords {
        header,
        delimiter,
        rows: lines[1..].iter().map(|line| line.to_string()).collect(),
    }
}

/// Read a catalog file from disk.
///
/// A missing file yields empty records; any other IO failure is returned.
/// Invalid UTF-8 is replaced rather than rejected.
pub async fn read_records(path: &Path, required: &[&str]) -> Result<DelimitedRecords, CatalogError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("File not found: {}", path.display());
            return Ok(DelimitedRecords::default());
        }
        Err(source) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    info!("Reading {}", path.display());

    let text = String::from_utf8_lossy(&bytes);
    Ok(parse_records(&path.display().to_string(), &text, required))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c,d;e"), Delimiter::Comma);
        assert_eq!(detect_delimiter("nome"), Delimiter::Comma);
        assert_eq!(detect_delimiter("a,b;c;d"), Delimiter::Semicolon);
        // Tie favors comma
        assert_eq!(detect_delimiter("a,b;c"), Delimiter::Comma);
        assert_eq!(detect_delimiter("\u{feff}nome;url"), Delimiter::Semicolon);
    }

    #[test]
    fn test_parse_records_basic() {
        let text = "Nome ; GRUPO;url\r\nCanal A;Noticias;http://x/a.ts\r\n\r\n   \nCanal B;Esportes;http://x/b.m3u8\n";
        let records = parse_records("canais_tv.csv", text, &["nome", "url"]);

        assert_eq!(records.header, vec!["nome", "grupo", "url"]);
        assert_eq!(records.delimiter, Delimiter::Semicolon);
        assert_eq!(
            records.rows,
            vec!["Canal A;Noticias;http://x/a.ts", "Canal B;Esportes;http://x/b.m3u8"]
        );
    }

    #[test]
    fn test_parse_records_strips_bom() {
        let text = "\u{feff}index,nome,url\n1,Canal,http://x";
        let records = parse_records("test", text, &[]);
        assert_eq!(records.header, vec!["index", "nome", "url"]);
        assert_eq!(records.column_index(&["index"]), Some(0));
    }

    #[test]
    fn test_parse_records_header_only_is_empty() {
        let records = parse_records("test", "nome;url\n\n  \n", &["nome"]);
        assert!(records.is_empty());
        assert!(records.header.is_empty());
        assert_eq!(records.delimiter, Delimiter::Comma);

        assert!(parse_records("test", "", &[]).is_empty());
    }

    #[test]
    fn test_missing_required_column_still_loads() {
        let records = parse_records("test", "nome;grupo\nCanal;TV", &["nome", "url"]);
        assert_eq!(records.rows.len(), 1);
        assert_eq!(records.column_index(&["url"]), None);

        let parts = records.split(&records.rows[0]);
        assert_eq!(field(&parts, records.column_index(&["url"])), "");
        assert_eq!(field(&parts, records.column_index(&["nome"])), "Canal");
    }

    #[test]
    fn test_column_index_alternates() {
        let records = parse_records("test", "nome;tvg-logo;url\nA;l;u", &[]);
        assert_eq!(records.column_index(&["logo", "tvg-logo"]), Some(1));
        assert_eq!(records.column_index(&["missing"]), None);
    }

    #[test]
    fn test_field_short_row() {
        let parts = vec!["  a ", "b"];
        assert_eq!(field(&parts, Some(0)), "a");
        assert_eq!(field(&parts, Some(5)), "");
        assert_eq!(field(&parts, None), "");
    }

    #[tokio::test]
    async fn test_read_records_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let records = read_records(&dir.path().join("nope.csv"), &["nome"])
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_read_records_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filmes.csv");
        std::fs::write(&path, "titulo,url\nMatrix,http://x/m.mp4\n").unwrap();

        let records = read_records(&path, &["titulo", "url"]).await.unwrap();
        assert_eq!(records.delimiter, Delimiter::Comma);
        assert_eq!(records.rows, vec!["Matrix,http://x/m.mp4"]);
    }

    #[tokio::test]
    async fn test_read_records_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_records(dir.path(), &[]).await;
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
