//! Writing processed frames to disk.

use crate::events::{EventObserver, PipelineEvent};
use crate::persistence::error::PersistenceError;
use crate::types::artifact::{ArtifactKind, Artifacts};
use crate::utils::ensure_dir_exists;
use bon::Builder;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Options for [`save_frame`].
#[derive(Debug, Clone, Builder)]
pub struct SaveOptions {
    /// Also attempt a parquet copy next to the CSV.
    #[builder(default = true)]
    pub write_parquet: bool,
    #[builder(default = ParquetCompression::Snappy)]
    pub parquet_compression: ParquetCompression,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Persists a non-empty frame as `<processed_dir>/<base_filename>.csv` and, best-effort,
/// `<processed_dir>/<base_filename>.parquet`.
///
/// An empty frame writes nothing and returns an empty map. A failing parquet write is
/// reported to `observer` as [`PipelineEvent::SecondaryWriteFailed`] and leaves the
/// parquet kind out of the returned map; only CSV failures are errors.
///
/// # Examples
///
/// ```no_run
/// use openmeteo_daily::{save_frame, ArtifactKind, LogObserver, SaveOptions};
/// use polars::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let df = df!("temperature_2m_max" => [30.1, 28.3])?;
/// let artifacts = save_frame(
///     &df,
///     "sydney_daily_2024",
///     Path::new("data/processed"),
///     &SaveOptions::default(),
///     &LogObserver,
/// )?;
/// assert!(artifacts.contains_key(&ArtifactKind::Csv));
/// # Ok(())
/// # }
/// ```
pub fn save_frame(
    df: &DataFrame,
    base_filename: &str,
    processed_dir: &Path,
    options: &SaveOptions,
    observer: &dyn EventObserver,
) -> Result<Artifacts, PersistenceError> {
    let mut artifacts = Artifacts::new();
    if df.height() == 0 {
        observer.on_event(&PipelineEvent::SaveSkipped {
            base_filename: base_filename.to_string(),
        });
        return Ok(artifacts);
    }

    ensure_dir_exists(processed_dir)
        .map_err(|e| PersistenceError::DirCreation(processed_dir.to_path_buf(), e))?;

    // Writers need `&mut`; columns are reference counted so the clone is shallow.
    let mut df = df.clone();

    let csv_path = artifact_path(processed_dir, base_filename, ArtifactKind::Csv);
    write_csv(&mut df, &csv_path)?;
    artifacts.insert(ArtifactKind::Csv, csv_path);

    if options.write_parquet {
        let parquet_path = artifact_path(processed_dir, base_filename, ArtifactKind::Parquet);
        match write_parquet(&mut df, &parquet_path, options.parquet_compression) {
            Ok(()) => {
                artifacts.insert(ArtifactKind::Parquet, parquet_path);
            }
            Err(e) => observer.on_event(&PipelineEvent::SecondaryWriteFailed {
                base_filename: base_filename.to_string(),
                error: e.to_string(),
            }),
        }
    }

    observer.on_event(&PipelineEvent::ArtifactsSaved {
        base_filename: base_filename.to_string(),
        artifacts: artifacts.clone(),
    });
    Ok(artifacts)
}

pub fn artifact_path(dir: &Path, base_filename: &str, kind: ArtifactKind) -> PathBuf {
    dir.join(format!("{}.{}", base_filename, kind.extension()))
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), PersistenceError> {
    let mut file =
        File::create(path).map_err(|e| PersistenceError::FileCreate(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| PersistenceError::CsvWrite(path.to_path_buf(), e))
}

fn write_parquet(
    df: &mut DataFrame,
    path: &Path,
    compression: ParquetCompression,
) -> Result<(), PersistenceError> {
    let file =
        File::create(path).map_err(|e| PersistenceError::FileCreate(path.to_path_buf(), e))?;
    ParquetWriter::new(file)
        .with_compression(compression)
        .finish(df)
        .map_err(|e| PersistenceError::ParquetWrite(path.to_path_buf(), e))?;
    Ok(())
}
