use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use starlane_lib::{SpatialStore, SystemRecord};
use tracing::info;

/// Stream a compressed galaxy dump into the store.
///
/// The dump is a JSON array with one system object per line; the array
/// framing and trailing commas are stripped before each line is decoded.
pub fn run(index_db: &Path, galaxy_db: &Path, dump: &Path) -> Result<()> {
    let store = SpatialStore::open(index_db, galaxy_db, false)
        .context("unable to open store for writing")?;

    let file = File::open(dump)
        .with_context(|| format!("unable to open dump file {}", dump.display()))?;
    let reader = BufReader::new(GzDecoder::new(file));

    let mut imported: u64 = 0;
    for line in reader.lines() {
        let line = line.context("error reading dump stream")?;
        let Some(json) = record_json(&line) else {
            continue;
        };
        let record: SystemRecord = serde_json::from_str(json)
            .with_context(|| format!("error decoding dump record: {json}"))?;
        store
            .insert_system(record)
            .context("error queueing system for import")?;

        imported += 1;
        if imported % 1_000_000 == 0 {
            info!(imported, "import progress");
        }
    }

    store
        .finish_insert()
        .context("import finished with errors")?;

    info!(imported, "import complete");
    println!("Imported {imported} systems.");
    Ok(())
}

fn record_json(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "[" || trimmed == "]" {
        return None;
    }
    Some(trimmed.strip_suffix(',').unwrap_or(trimmed))
}
