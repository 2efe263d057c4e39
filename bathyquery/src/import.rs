//! Survey CSV import.
//!
//! Survey reports are exported as semicolon-separated text with a few
//! preamble rows, followed by one row per sounding. Latitude and longitude
//! are DMS strings in fixed columns:
//!
//! ```text
//! Relatório de levantamento;;;
//! Embarcação;...;
//! Id;Data;Hora;Prof;Latitude;...;...;Longitude
//! 1;2024-03-01;10:00;12,4;2°12'36"S;...;...;47°25'48"W
//! ```
//!
//! Rows whose coordinates do not parse are skipped and reported, never
//! fatal. Only I/O-level failures abort an import.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::coord::{parse_dms, Coordinate};

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The survey file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preamble could not be read.
    #[error("Failed to read survey: {0}")]
    Read(#[from] std::io::Error),

    /// The CSV stream could not be read.
    #[error("Failed to read survey CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Column layout of a survey export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyLayout {
    /// Field delimiter.
    pub delimiter: u8,
    /// Preamble rows skipped before data starts.
    pub skip_rows: usize,
    /// Zero-based column holding the DMS latitude.
    pub latitude_column: usize,
    /// Zero-based column holding the DMS longitude.
    pub longitude_column: usize,
}

impl Default for SurveyLayout {
    fn default() -> Self {
        Self {
            delimiter: b';',
            skip_rows: 3,
            latitude_column: 4,
            longitude_column: 7,
        }
    }
}

/// A data row that was left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// One-based line number of the row in the file.
    pub line: u64,
    /// Why the row was skipped.
    pub reason: String,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyImport {
    /// Coordinates in file order, as decimal-degree text.
    pub coordinates: Vec<Coordinate>,
    /// Rows that could not be used.
    pub skipped: Vec<SkippedRow>,
}

/// Reads survey rows from any reader.
///
/// `skip_rows` counts physical lines, blank ones included, so a preamble
/// with empty lines never swallows the first data row.
pub fn read_survey<R: Read>(reader: R, layout: &SurveyLayout) -> Result<SurveyImport, ImportError> {
    let mut reader = BufReader::new(reader);
    let preamble_lines = skip_lines(&mut reader, layout.skip_rows)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut import = SurveyImport::default();

    for result in csv_reader.byte_records() {
        let record = result?;
        let line = preamble_lines + record.position().map(|p| p.line()).unwrap_or_default();

        match parse_row(&record, layout) {
            Ok(coord) => import.coordinates.push(coord),
            Err(reason) => {
                warn!(line, reason = %reason, "Skipping survey row");
                import.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    info!(
        imported = import.coordinates.len(),
        skipped = import.skipped.len(),
        "Survey import finished"
    );
    Ok(import)
}

/// Opens and reads a survey file.
pub fn read_survey_file(path: &Path, layout: &SurveyLayout) -> Result<SurveyImport, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_survey(file, layout)
}

/// Consumes up to `count` lines, returning how many were present.
fn skip_lines<R: BufRead>(reader: &mut R, count: usize) -> Result<u64, ImportError> {
    let mut line = Vec::new();
    let mut skipped = 0;
    for _ in 0..count {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        skipped += 1;
    }
    Ok(skipped)
}

fn parse_row(record: &csv::ByteRecord, layout: &SurveyLayout) -> Result<Coordinate, String> {
    let column = |index: usize, name: &str| -> Result<f64, String> {
        let raw = record
            .get(index)
            .ok_or_else(|| format!("missing {} column {}", name, index))?;
        parse_dms(&decode_field(raw)).map_err(|e| format!("{}: {}", name, e))
    };

    let latitude = column(layout.latitude_column, "latitude")?;
    let longitude = column(layout.longitude_column, "longitude")?;
    Ok(Coordinate::from_degrees(latitude, longitude))
}

/// Decodes a field as UTF-8, falling back to Latin-1.
///
/// Survey software on Windows commonly writes Latin-1, where the degree
/// sign is the single byte 0xB0.
fn decode_field(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(raw.iter().map(|&b| b as char).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SURVEY: &str = "\
Relatorio de levantamento;;;;;;;
Embarcacao;Aurora;;;;;;
Id;Data;Hora;Prof;Latitude;A;B;Longitude
1;2024-03-01;10:00;12,4;2°12'36\"S;x;y;47°25'48\"W
2;2024-03-01;10:05;13,1;23°12'30.5\"S;x;y;43°10'12\"W
";

    #[test]
    fn test_reads_coordinates_after_preamble() {
        let import = read_survey(SURVEY.as_bytes(), &SurveyLayout::default()).unwrap();

        assert_eq!(
            import.coordinates,
            vec![
                Coordinate::new("-2.21", "-47.43"),
                Coordinate::new("-23.21", "-43.17"),
            ]
        );
        assert!(import.skipped.is_empty());
    }

    #[test]
    fn test_skips_bad_rows() {
        let data = format!(
            "{}3;2024-03-01;10:10;9,0;not a coordinate;x;y;47°25'48\"W\n4;short;row\n",
            SURVEY
        );
        let import = read_survey(data.as_bytes(), &SurveyLayout::default()).unwrap();

        assert_eq!(import.coordinates.len(), 2);
        assert_eq!(import.skipped.len(), 2);
        assert_eq!(import.skipped[0].line, 6);
        assert!(import.skipped[0].reason.contains("latitude"));
        assert!(import.skipped[1].reason.contains("missing latitude column 4"));
    }

    #[test]
    fn test_blank_preamble_line_counts_as_a_row() {
        let data = "\
Relatorio;;;;;;;

Id;Data;Hora;Prof;Latitude;A;B;Longitude
1;2024-03-01;10:00;12,4;2°12'36\"S;x;y;47°25'48\"W
2;2024-03-01;10:05;13,1;23°12'30.5\"S;x;y;43°10'12\"W
";
        let import = read_survey(data.as_bytes(), &SurveyLayout::default()).unwrap();

        assert_eq!(
            import.coordinates,
            vec![
                Coordinate::new("-2.21", "-47.43"),
                Coordinate::new("-23.21", "-43.17"),
            ]
        );
        assert!(import.skipped.is_empty());
    }

    #[test]
    fn test_short_file_is_all_preamble() {
        let import =
            read_survey("only\ntwo lines\n".as_bytes(), &SurveyLayout::default()).unwrap();
        assert_eq!(import, SurveyImport::default());
    }

    #[test]
    fn test_latin1_degree_sign() {
        let mut data = b"a\nb\nc\n1;d;h;p;".to_vec();
        data.extend_from_slice(b"2\xB012'36\"S;x;y;47\xB025'48\"W\n");

        let import = read_survey(data.as_slice(), &SurveyLayout::default()).unwrap();
        assert_eq!(import.coordinates, vec![Coordinate::new("-2.21", "-47.43")]);
    }

    #[test]
    fn test_custom_layout() {
        let layout = SurveyLayout {
            delimiter: b',',
            skip_rows: 0,
            latitude_column: 0,
            longitude_column: 1,
        };
        let import = read_survey("51°30'0\"N,0°7'39\"W\n".as_bytes(), &layout).unwrap();
        assert_eq!(import.coordinates, vec![Coordinate::new("51.5", "-0.13")]);
    }

    #[test]
    fn test_read_survey_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SURVEY.as_bytes()).unwrap();

        let import = read_survey_file(file.path(), &SurveyLayout::default()).unwrap();
        assert_eq!(import.coordinates.len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = read_survey_file(Path::new("/nonexistent/survey.csv"), &SurveyLayout::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
