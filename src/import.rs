use crate::error::{Error, Result};
use crate::store::WordInserter;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 2] = ["english", "vietnamese"];

#[derive(Debug, Deserialize)]
struct VocabRow {
    english: String,
    vietnamese: String,
    #[serde(default)]
    part_of_speech: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    /// Blank rows and pairs already in the store
    pub skipped: usize,
    /// Rows that could not be parsed
    pub errors: usize,
}

/// Import a header-based CSV with `english`, `vietnamese` and optional `part_of_speech` columns.
pub fn import_csv_file<W: WordInserter, P: AsRef<Path>>(store: &mut W, path: P) -> Result<ImportReport> {
    let file = std::fs::File::open(path.as_ref())?;
    log::info!("Importing vocabulary from {}", path.as_ref().display());
    import_csv(store, file)
}

/// Bad rows are counted and skipped. Only a missing column, an I/O failure
/// or a store failure stops the import.
pub fn import_csv<W: WordInserter, R: Read>(store: &mut W, reader: R) -> Result<ImportReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?;
    if let Some(missing) = REQUIRED_COLUMNS
        .into_iter()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(Error::MissingColumn(missing));
    }

    let mut report = ImportReport::default();
    for (line, row) in csv_reader.deserialize::<VocabRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable row {}: {e}", line + 2);
                report.errors += 1;
                continue;
            }
        };
        if row.english.is_empty() || row.vietnamese.is_empty() {
            report.skipped += 1;
            continue;
        }
        if store.contains_word(&row.english, &row.vietnamese)? {
            log::debug!("Already have {} / {}", row.english, row.vietnamese);
            report.skipped += 1;
            continue;
        }
        let part = row.part_of_speech.as_deref().filter(|p| !p.is_empty());
        store.insert_word(&row.english, &row.vietnamese, part)?;
        report.imported += 1;
    }

    log::info!(
        "Imported {} words, skipped {}, {} bad rows",
        report.imported,
        report.skipped,
        report.errors
    );
    Ok(report)
}
