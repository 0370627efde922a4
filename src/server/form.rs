//! Form field parsing for /calculate.

use std::collections::HashMap;

use crate::error::{ImpactError, ImpactResult};
use crate::mapping::ImpactParameters;

pub const FIELD_MASS: &str = "mass";
pub const FIELD_SPEED: &str = "speed";
pub const FIELD_HEIGHT: &str = "height_of_burst";
pub const FIELD_ANGLE: &str = "entry_angle";

/// Parse one numeric field. Surrounding whitespace is ignored; missing,
/// empty, non-numeric and non-finite values are all invalid input.
pub fn parse_field(fields: &HashMap<String, String>, name: &'static str) -> ImpactResult<f64> {
    let raw = fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(ImpactError::InvalidInput { field: name })?;

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ImpactError::InvalidInput { field: name }),
    }
}

pub fn parse_parameters(fields: &HashMap<String, String>) -> ImpactResult<ImpactParameters> {
    Ok(ImpactParameters {
        mass_kg: parse_field(fields, FIELD_MASS)?,
        speed_km_s: parse_field(fields, FIELD_SPEED)?,
        height_of_burst_km: parse_field(fields, FIELD_HEIGHT)?,
        entry_angle_deg: parse_field(fields, FIELD_ANGLE)?,
    })
}
