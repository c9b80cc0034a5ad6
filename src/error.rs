use thiserror::Error;

/// Failures while turning text into a [`Document`](crate::Document).
///
/// Malformed Markdown is never an error; the only failure is an input that
/// exceeds the configured size limit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("input is {len} bytes, exceeding the limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },
}

/// Failures while producing an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("DOCX packaging failed: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Typst compilation failed: {0}")]
    Compile(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}
