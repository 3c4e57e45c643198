//! Rating indicator: `max` discrete units, full / half / empty.

use serde::Serialize;

use crate::present::one_decimal;

pub const DEFAULT_RATING_MAX: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFill {
    Full,
    Half,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingIndicator {
    rating: f64,
    max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingView {
    pub units: Vec<UnitFill>,
    pub label: String,
}

impl RatingIndicator {
    pub fn new(rating: f64, max: u32) -> Self {
        Self { rating, max }
    }

    /// Unit `i` is half when `rating - i` lies strictly between 0 and 1,
    /// full when `rating > i` otherwise. NaN compares false everywhere, so a
    /// missing rating renders all units empty.
    pub fn unit(&self, index: u32) -> UnitFill {
        let remainder = self.rating - f64::from(index);
        if remainder > 0.0 && remainder < 1.0 {
            UnitFill::Half
        } else if self.rating > f64::from(index) {
            UnitFill::Full
        } else {
            UnitFill::Empty
        }
    }

    pub fn units(&self) -> Vec<UnitFill> {
        (0..self.max).map(|i| self.unit(i)).collect()
    }

    /// `"3.5/5"`, or `"N/A/5"` when the rating is not a number.
    pub fn label(&self) -> String {
        format!("{}/{}", one_decimal(self.rating), self.max)
    }

    pub fn render(&self) -> RatingView {
        RatingView {
            units: self.units(),
            label: self.label(),
        }
    }
}
