use super::types::Parcel;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

const DATA_VERSION: u32 = 1;

/// On-disk document holding the parcel collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelFile {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parcels: Vec<Parcel>,
}

impl Default for ParcelFile {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            updated_at: None,
            parcels: Vec::new(),
        }
    }
}

/// Get the default data file path (~/.config/parcel-score/parcels.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("parcels.json")
}

/// Load the parcel collection from a JSON file
///
/// If the file doesn't exist, returns an empty collection.
/// Unsupported versions and malformed parcels are errors.
pub fn load_parcels(path: &Path) -> Result<ParcelFile> {
    if !path.exists() {
        return Ok(ParcelFile::default());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open parcel data file at {}", path.display()))?;

    let mut data: ParcelFile = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse parcel data in {}", path.display()))?;

    if data.version != DATA_VERSION {
        anyhow::bail!("Unsupported parcel data version: {}", data.version);
    }

    for parcel in &mut data.parcels {
        parcel.validate()?;
        parcel.recompute_price_per_m2();
    }

    Ok(data)
}

/// Save the parcel collection atomically, stamping `updated_at`.
pub fn save_parcels(path: &Path, data: &mut ParcelFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    data.updated_at = Some(Utc::now());

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, data).context("Failed to serialize parcel data")?;

    file.commit().context("Failed to save parcel data")?;

    Ok(())
}
