use thiserror::Error;

/// Coarse classification of a [`DashboardError`].
///
/// Every halt in the pipeline falls into one of these buckets; callers use it to decide
/// what to tell the user (re-upload, pick another column, adjust the window, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The declared file extension is not one the ingestor understands.
    UnsupportedType,
    /// The file is malformed, has a bad encoding or lacks the requested sheet.
    ParseError,
    /// The chosen date column has no parseable date left.
    NoValidDates,
    /// A caller-supplied selection (column, window, chart column) is not usable.
    InvalidInput,
    /// A chart image or the PDF report could not be produced.
    Render,
    /// Reading or writing the local file system failed.
    Io,
}

/// Main error type for the dashboard pipeline.
/// Aggregates errors from the standard library, the parsing libraries and the domain checks.
#[derive(Error, Debug)]
pub enum DashboardError {
    // Domain errors
    #[error("Unsupported file type '{0}'")]
    UnsupportedType(String),

    #[error("Parse file failed: {0}")]
    ParseError(String),

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("No valid dates in column '{0}'")]
    NoValidDates(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Column '{name}' is not {expected}")]
    ColumnClassMismatch { name: String, expected: &'static str },

    #[error("No date column selected")]
    NoDateColumn,

    #[error("Invalid date window {start} .. {end}")]
    InvalidWindow { start: String, end: String },

    #[error("Render chart '{0}' failed: {1}")]
    ChartError(String, String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    ImageError(#[from] image::ImageError),

    #[error("{0}")]
    PdfError(#[from] lopdf::Error),

    #[error("{0}")]
    ConfigError(#[from] serde_json::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),
}

impl DashboardError {
    /// Classifies the error so callers can react without matching every variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::NoValidDates(_) => ErrorKind::NoValidDates,
            Self::ColumnNotFound(_)
            | Self::DuplicateColumn(_)
            | Self::ColumnClassMismatch { .. }
            | Self::NoDateColumn
            | Self::InvalidWindow { .. }
            | Self::ConfigError(_) => ErrorKind::InvalidInput,
            Self::ChartError(..) | Self::ImageError(_) | Self::PdfError(_) => ErrorKind::Render,
            Self::IoError(_) => ErrorKind::Io,
            Self::ParseError(_)
            | Self::SheetNotFound(_)
            | Self::ParseIntError(_)
            | Self::ParseFloatError(_)
            | Self::StringEncodingError(_)
            | Self::CsvError(_)
            | Self::ZipError(_)
            | Self::XmlError(_)
            | Self::XmlEncodingError(_)
            | Self::XmlAttributeError(_)
            | Self::XmlHelperError(_) => ErrorKind::ParseError,
        }
    }
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, DashboardError> {
    /// Prefixes the error message while keeping parse failures classified as such.
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| match e.kind() {
            ErrorKind::ParseError => DashboardError::ParseError(format!("{}: {}", message, e)),
            _ => e,
        })
    }
}
