use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzeError {
    /// Machine-checkable failure category, so boundaries can branch on the
    /// kind instead of parsing the message string.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::MissingColumns(_) => "schema",
            AnalyzeError::Config(_) => "config",
            _ => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzeError>;
