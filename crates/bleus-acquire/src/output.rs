use crate::error::{Result, ScrapeError};
use crate::types::Provenance;
use bleus_model::Table;
use csv::{Terminator, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// Write the table as CSV: header row, comma-delimited, `\n`-terminated, no
/// row-index column.
///
/// The file is first written next to its destination and then renamed over
/// it, so a failed run never leaves a truncated file and any previous output
/// stays as it was.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let tmp = temp_path(path);

    if let Err(err) = write_csv_to(table, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        ScrapeError::io(path, source)
    })?;

    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.width(),
        "Wrote CSV"
    );
    Ok(())
}

fn write_csv_to(table: &Table, path: &Path) -> Result<()> {
    let csv_err = |source| ScrapeError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(&table.headers).map_err(csv_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|source| ScrapeError::io(path, source))?;
    Ok(())
}

/// Cache the rendered page so it can be re-examined, or re-processed offline,
/// without re-fetching.
pub fn cache_html(path: &Path, html: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, html).map_err(|source| ScrapeError::io(path, source))?;
    tracing::info!(path = %path.display(), bytes = html.len(), "Cached rendered HTML");
    Ok(())
}

/// Write the provenance sidecar as pretty JSON.
pub fn write_provenance(path: &Path, provenance: &Provenance) -> Result<()> {
    let json = serde_json::to_string_pretty(provenance).map_err(|source| ScrapeError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_parent_dir(path)?;
    fs::write(path, json).map_err(|source| ScrapeError::io(path, source))?;
    tracing::info!(path = %path.display(), "Wrote provenance");
    Ok(())
}

/// `matchs.csv` -> `matchs.csv.source.json`
pub fn provenance_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".source.json");
    PathBuf::from(name)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ScrapeError::io(dir, source))
        }
        _ => Ok(()),
    }
}
