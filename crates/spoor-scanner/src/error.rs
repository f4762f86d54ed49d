use thiserror::Error;

/// Calibration could not run.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration skipped, site catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Failed to load dictionary {path}: {source}")]
    Dictionary {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;
