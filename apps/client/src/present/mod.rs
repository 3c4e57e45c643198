// Presentation primitives and the read-only view models the page renders.
// Everything here is a pure function of controller state.

pub mod progress;
pub mod rating;
pub mod view;

pub const NOT_AVAILABLE: &str = "N/A";

/// One decimal place with ties rounded away from zero (`3.25` -> `"3.3"`).
/// `{:.1}` alone rounds ties to even. Non-finite values render as `N/A`.
pub fn one_decimal(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.1}", (value * 10.0).round() / 10.0)
}
