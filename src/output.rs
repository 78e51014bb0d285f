// CSV output: file naming and row serialization.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::record::VideoRecord;

/// Column headers, in the order `VideoRecord` serializes them. Used when
/// there are no rows to derive the header from.
pub const HEADERS: [&str; 14] = [
    "Video URL",
    "Title",
    "Description",
    "Channel Title",
    "Keyword Tags",
    "YouTube Video Category",
    "Topic Details",
    "Video Published at",
    "Video Duration",
    "View Count",
    "Comment Count",
    "Location of Recording",
    "Captions Available",
    "Caption Text",
];

/// Lowercase the genre and replace characters that do not belong in a
/// file name.
pub fn safe_filename(genre: &str) -> String {
    genre
        .to_lowercase()
        .replace(' ', "_")
        .replace('&', "and")
        .replace('/', "_")
}

/// `<dir>/<safe genre>_videos_data.csv`
pub fn output_path(dir: &Path, genre: &str) -> PathBuf {
    dir.join(format!("{}_videos_data.csv", safe_filename(genre)))
}

/// Serialize rows (header first) into any writer.
pub fn write_records<W: Write>(writer: W, records: &[VideoRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(HEADERS)?;
    }
    for record in records {
        wtr.serialize(record).context("Serializing CSV row")?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write all rows to it.
pub fn save_csv(path: &Path, records: &[VideoRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating output directory {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Creating {}", path.display()))?;
    write_records(file, records).with_context(|| format!("Writing {}", path.display()))
}
