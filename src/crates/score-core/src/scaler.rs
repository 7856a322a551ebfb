//! Min-max rescaling of integer codes into a bounded feature range.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

/// Target interval for normalized values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    lower: f64,
    upper: f64,
}

impl FeatureRange {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(FeatureError::InvalidRange { lower, upper });
        }
        Ok(FeatureRange { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Default for FeatureRange {
    fn default() -> Self {
        FeatureRange {
            lower: 0.0,
            upper: 1.0,
        }
    }
}

/// A fitted min-max transform.
///
/// Keeps the observed minimum and maximum so normalized values can be mapped
/// back to the codes they came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
    pub range: FeatureRange,
}

impl MinMaxScaler {
    pub fn fit(values: &[f64], range: FeatureRange) -> Result<Self> {
        let mut data_min = f64::INFINITY;
        let mut data_max = f64::NEG_INFINITY;

        for &value in values {
            if !value.is_finite() {
                return Err(FeatureError::Fit(format!("non-finite value {}", value)));
            }
            data_min = data_min.min(value);
            data_max = data_max.max(value);
        }

        if values.is_empty() {
            return Err(FeatureError::Fit("no values to fit".to_string()));
        }

        Ok(MinMaxScaler {
            data_min,
            data_max,
            range,
        })
    }

    /// Fit over integer codes and return the scaler with the rescaled codes
    pub fn fit_codes(codes: &[u32], range: FeatureRange) -> Result<(Self, Vec<f64>)> {
        let values: Vec<f64> = codes.iter().map(|&c| c as f64).collect();
        let scaler = Self::fit(&values, range)?;
        let scaled = values.iter().map(|&v| scaler.transform(v)).collect();
        Ok((scaler, scaled))
    }

    /// Whether every fitted value was the same
    pub fn is_degenerate(&self) -> bool {
        self.data_max == self.data_min
    }

    pub fn transform(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return self.range.lower;
        }
        let unit = (value - self.data_min) / (self.data_max - self.data_min);
        self.range.lower + unit * self.range.width()
    }

    /// Map a normalized value back into the fitted data range.
    ///
    /// Only meaningful for values produced by [`transform`](Self::transform)
    /// on fitted data.
    pub fn inverse_transform(&self, scaled: f64) -> f64 {
        if self.is_degenerate() {
            return self.data_min;
        }
        let unit = (scaled - self.range.lower) / self.range.width();
        self.data_min + unit * (self.data_max - self.data_min)
    }

    /// Nearest integer code for a normalized value, `None` if it lands below zero
    pub fn inverse_code(&self, scaled: f64) -> Option<u32> {
        let value = self.inverse_transform(scaled).round();
        if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
            Some(value as u32)
        } else {
            None
        }
    }
}
