use thiserror::Error;

/// Errors surfaced by the tracker. Duplicate and unsupported uploads are
/// not errors; they are reported as skip reasons by the intake.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("{0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Google Sheets request failed: {0}")]
    Sheets(#[from] google_sheets4::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
