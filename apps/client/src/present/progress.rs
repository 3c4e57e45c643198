//! Progress indicator: proportional fill with a one-decimal percentage label.

use serde::Serialize;

use crate::present::one_decimal;

pub const DEFAULT_PROGRESS_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressColor {
    #[default]
    Blue,
    Green,
    Yellow,
    Red,
}

/// Tier for a 0 – 100 confidence: green from 70, yellow from 40, red below.
pub fn confidence_color(confidence: f64) -> ProgressColor {
    if confidence >= 70.0 {
        ProgressColor::Green
    } else if confidence >= 40.0 {
        ProgressColor::Yellow
    } else {
        ProgressColor::Red
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressIndicator {
    value: f64,
    max: f64,
    color: ProgressColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    /// Width of the filled portion, 0 – 100.
    pub fill_percent: f64,
    pub label: String,
    pub color: ProgressColor,
}

impl ProgressIndicator {
    pub fn new(value: f64, max: f64) -> Self {
        Self {
            value,
            max,
            color: ProgressColor::default(),
        }
    }

    pub fn with_color(mut self, color: ProgressColor) -> Self {
        self.color = color;
        self
    }

    /// `value / max` as a percentage, saturating at 100.
    pub fn percentage(&self) -> f64 {
        if !(self.max > 0.0) || !self.value.is_finite() {
            return 0.0;
        }
        (self.value * 100.0 / self.max).clamp(0.0, 100.0)
    }

    pub fn label(&self) -> String {
        format!("{}%", one_decimal(self.percentage()))
    }

    pub fn render(&self) -> ProgressView {
        ProgressView {
            fill_percent: self.percentage(),
            label: self.label(),
            color: self.color,
        }
    }
}
