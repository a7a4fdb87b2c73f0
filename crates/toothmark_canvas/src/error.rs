use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Failed to allocate drawing surface of {width}x{height}")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("Invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("Background buffer of {len} bytes does not match {width}x{height} RGBA")]
    BackgroundMismatch { len: usize, width: u32, height: u32 },

    #[error("PNG encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, CanvasError>;
