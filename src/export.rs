use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::{
    prelude::*,
    table::{PriceTable, cell_text},
};

/// `PTF_YYYYMMDD_HHMMSS.csv`, stamped with the run time.
#[must_use]
pub fn file_name(now: NaiveDateTime) -> String {
    format!("PTF_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write the table with its header into a new timestamped file in the directory.
#[instrument(skip_all, fields(directory = %directory.display()))]
pub fn write_csv(table: &PriceTable, directory: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let path = directory.join(file_name(now));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(cell_text).map(Cow::into_owned))?;
    }
    writer.flush().with_context(|| format!("failed to write `{}`", path.display()))?;
    info!(path = %path.display(), n_rows = table.rows().len(), "saved");
    Ok(path)
}
