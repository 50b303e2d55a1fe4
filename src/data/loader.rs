use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AggregatorConfig;
use crate::error::{DataError, Result};

use super::model::RunTable;

// ---------------------------------------------------------------------------
// Run sources
// ---------------------------------------------------------------------------

/// Where run files come from. The filesystem in production; tests can
/// substitute an in-memory source.
pub trait RunSource {
    /// Run files directly inside `dir` whose extension is one of `extensions`,
    /// in a deterministic order.
    fn list_runs(&self, dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>>;

    /// Raw contents of one run file.
    fn read_run(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Reads run files from local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl RunSource for FsSource {
    fn list_runs(&self, dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| DataError::io(dir, e))?;

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DataError::io(dir, e))?;
            let path = entry.path();
            if !path.is_file() || !has_run_extension(&path, extensions) {
                continue;
            }
            runs.push(path);
        }
        runs.sort();
        log::debug!("{}: {} run files", dir.display(), runs.len());
        Ok(runs)
    }

    fn read_run(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| DataError::io(path, e))
    }
}

/// Case-insensitive extension match.
pub fn has_run_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

// ---------------------------------------------------------------------------
// Run file parser
// ---------------------------------------------------------------------------

/// Parse one run file.
///
/// Layout: a header row of quantity names followed by one row of numbers
/// per generation, delimited and quoted as configured. A stray delimiter at
/// the end of a line produces an empty trailing field; that field is dropped
/// from the header and tolerated on data rows.
pub fn parse_run(bytes: &[u8], path: &Path, config: &AggregatorConfig) -> Result<RunTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .quote(config.quote_byte())
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut quantities: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    if quantities.last().is_some_and(String::is_empty) {
        quantities.pop();
    }
    validate_header(&quantities, path)?;

    let width = quantities.len();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); width];

    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        let line = record.position().map(|p| p.line());

        let fields = if record.len() == width + 1 && record.get(width) == Some("") {
            width
        } else {
            record.len()
        };
        if fields != width {
            return Err(DataError::parse(
                path,
                line,
                format!("expected {width} fields, found {}", record.len()),
            ));
        }

        for (col, (field, name)) in columns.iter_mut().zip(record.iter().zip(&quantities)) {
            let value = field.parse::<f64>().map_err(|_| {
                DataError::parse(path, line, format!("'{field}' in column '{name}' is not a number"))
            })?;
            col.push(value);
        }
    }

    log::trace!(
        "{}: {} quantities, {} generations",
        path.display(),
        width,
        columns.first().map_or(0, Vec::len)
    );

    Ok(RunTable {
        quantities,
        columns,
    })
}

fn validate_header(quantities: &[String], path: &Path) -> Result<()> {
    if quantities.is_empty() {
        return Err(DataError::parse(path, Some(1), "missing header row"));
    }
    if quantities.iter().any(String::is_empty) {
        return Err(DataError::parse(path, Some(1), "empty quantity name in header"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = quantities.iter().find(|q| !seen.insert(q.as_str())) {
        return Err(DataError::parse(
            path,
            Some(1),
            format!("duplicate quantity '{dup}' in header"),
        ));
    }
    Ok(())
}

fn csv_error(path: &Path, err: csv::Error) -> DataError {
    let line = err.position().map(|p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(source) => DataError::io(path, source),
        csv::ErrorKind::Utf8 { err, .. } => DataError::parse(path, line, err.to_string()),
        other => DataError::parse(path, line, format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<RunTable> {
        parse_run(text.as_bytes(), Path::new("run.dat"), &AggregatorConfig::default())
    }

    #[test]
    fn test_trailing_header_artifact_dropped() {
        let table = parse("a b \n1 2\n3 4\n").unwrap();
        assert_eq!(table.quantities, vec!["a", "b"]);
        assert_eq!(table.columns, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
    }

    #[test]
    fn test_trailing_delimiter_on_rows_tolerated() {
        let table = parse("a b \n1 2 \n3 4 \n").unwrap();
        assert_eq!(table.columns[1], vec![2.0, 4.0]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = parse("v\n1\n\n2\n\n").unwrap();
        assert_eq!(table.quantities, vec!["v"]);
        assert_eq!(table.columns, vec![vec![1.0, 2.0]]);
    }

    #[test]
    fn test_quoted_header() {
        let table = parse("\"best fitness\" \"diversity\"\n0.5 1e-3\n").unwrap();
        assert_eq!(table.quantities, vec!["best fitness", "diversity"]);
        assert_eq!(table.columns[1], vec![0.001]);
    }

    #[test]
    fn test_row_width_mismatch_is_parse_error() {
        let err = parse("a b\n1 2\n3\n").unwrap_err();
        match err {
            DataError::Parse { line, message, .. } => {
                assert_eq!(line, Some(3));
                assert!(message.contains("expected 2 fields"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(parse("a b\n1 2 3\n"), Err(DataError::Parse { .. })));
    }

    #[test]
    fn test_non_numeric_field_is_parse_error() {
        let err = parse("a b\n1 two\n").unwrap_err();
        assert!(err.to_string().contains("'two' in column 'b'"));
    }

    #[test]
    fn test_header_problems() {
        assert!(matches!(parse(""), Err(DataError::Parse { .. })));
        assert!(matches!(parse("a a\n1 2\n"), Err(DataError::Parse { .. })));
        assert!(matches!(parse("a  b\n1 2\n"), Err(DataError::Parse { .. })));
    }

    #[test]
    fn test_header_only_file_has_zero_generations() {
        let table = parse("a b\n").unwrap();
        assert_eq!(table.generations(), 0);
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_tab_delimiter() {
        let config = AggregatorConfig {
            delimiter: '\t',
            ..AggregatorConfig::default()
        };
        let table = parse_run(b"x\ty\t\n1\t2\n", Path::new("run.div"), &config).unwrap();
        assert_eq!(table.quantities, vec!["x", "y"]);
    }

    #[test]
    fn test_fs_source_lists_both_extensions_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.div", "a.dat", "c.DAT", "notes.txt"] {
            fs::write(dir.path().join(name), "x\n1\n").unwrap();
        }
        fs::create_dir(dir.path().join("nested.dat")).unwrap();

        let exts = AggregatorConfig::default().extensions;
        let runs = FsSource.list_runs(dir.path(), &exts).unwrap();
        let names: Vec<_> = runs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.dat", "b.div", "c.DAT"]);
    }

    #[test]
    fn test_fs_source_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let exts = AggregatorConfig::default().extensions;
        assert!(matches!(
            FsSource.list_runs(&missing, &exts),
            Err(DataError::Io { .. })
        ));
    }
}
