use crate::error::DashboardError;
use crate::pipeline::Direction;
use crate::session::ChartChoices;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One dashboard interaction: what to load, how to filter it and what to export.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    /// File to ingest
    pub input: PathBuf,
    /// Declared type, defaults to the extension of `input`
    #[serde(default)]
    pub extension: Option<String>,
    /// Worksheet of a workbook input
    #[serde(default)]
    pub sheet: Option<String>,
    pub date_column: String,
    /// Manual window, defaults to the full date range
    #[serde(default)]
    pub window: Option<WindowConfig>,
    /// Period shifts applied in order after the window is set
    #[serde(default)]
    pub shifts: Vec<Direction>,
    #[serde(default)]
    pub charts: ChartChoices,
    /// Where to write the PDF report; no report without it
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl DashboardConfig {
    pub fn extension(&self) -> String {
        match &self.extension {
            Some(extension) => extension.to_owned(),
            None => self
                .input
                .extension()
                .map(|extension| extension.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug)]
pub struct Configurator {
    path: PathBuf,
}

impl Configurator {
    #[instrument]
    pub fn new(path: &Path) -> Self {
        Self { path: path.into() }
    }

    #[instrument]
    pub fn load(&self) -> Result<DashboardConfig, DashboardError> {
        let data = std::fs::read_to_string(&self.path)?;
        let config: DashboardConfig = serde_json::from_str(&data)?;
        info!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
