use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Document has no pages")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, CropError>;
