//! Weight error types

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WeightError {
    /// Negative, NaN or infinite value handed to a conversion
    #[error("Invalid weight value: {value} (must be a finite number >= 0)")]
    InvalidInput { value: f64 },

    /// Decimal places beyond what display formatting supports
    #[error("precision must be 0..={max}, got {precision}")]
    PrecisionOutOfRange { precision: u32, max: u32 },
}

pub type WeightResult<T> = Result<T, WeightError>;
