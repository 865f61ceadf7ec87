use thiserror::Error;
use trellis_layout::LayoutError;
use trellis_style::StyleParseError;

/// Errors raised while building or laying out a tree through this crate.
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Style is invalid: {0}")]
    Style(#[from] StyleParseError),
}
