//! Scalar-to-visual mappings from impactor parameters to footprint geometry.
//!
//! Every function here is total: out-of-range and non-finite inputs are
//! clamped into the output domain instead of being rejected, so the renderer
//! always receives drawable geometry.

use serde::Serialize;

use crate::config::MappingConfig;

/// Kinetic energy (J) mapped to the smallest footprint
pub const ENERGY_FLOOR_J: f64 = 1e9;
/// Kinetic energy (J) at which the footprint saturates
pub const ENERGY_CEILING_J: f64 = 1e14;
/// Major axis range in viewport units
pub const MAJOR_AXIS_MIN: f64 = 2.0;
pub const MAJOR_AXIS_MAX: f64 = 14.0;

pub const ECCENTRICITY_MIN: f64 = 0.05;
pub const ECCENTRICITY_MAX: f64 = 0.95;

/// Darkest fill shade reachable (at or above the reference mass)
pub const SHADE_MIN: f64 = 0.15;

/// Lower bound on `1 - e^2` so the minor axis never collapses to zero
const MIN_AXIS_RATIO_SQ: f64 = 0.0025;

pub const DEFAULT_HEIGHT_REF_KM: f64 = 50.0;
pub const DEFAULT_MASS_REF_KG: f64 = 10_000.0;

/// Caller-supplied impactor description for a single request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactParameters {
    pub mass_kg: f64,
    pub speed_km_s: f64,
    pub height_of_burst_km: f64,
    pub entry_angle_deg: f64,
}

/// Plot geometry derived from [`ImpactParameters`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneGeometry {
    pub major_axis: f64,
    pub eccentricity: f64,
    pub minor_axis: f64,
    pub fill_shade: f64,
    pub rotation_deg: f64,
}

impl SceneGeometry {
    pub fn derive(params: &ImpactParameters, mapping: &MappingConfig) -> Self {
        let major_axis = size_from_mass_speed(params.mass_kg, params.speed_km_s);
        let eccentricity = eccentricity_from_height(params.height_of_burst_km, mapping.height_ref_km);
        let minor_axis = minor_from_major_and_eccentricity(major_axis, eccentricity);
        let fill_shade = shade_from_mass(params.mass_kg, mapping.mass_ref_kg);
        let rotation_deg = if params.entry_angle_deg.is_finite() {
            params.entry_angle_deg
        } else {
            0.0
        };

        Self {
            major_axis,
            eccentricity,
            minor_axis,
            fill_shade,
            rotation_deg,
        }
    }
}

/// Clamp to [0, 1], treating NaN as 0.
#[inline]
fn unit_fraction(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Kinetic energy in joules for a mass in kg moving at `speed_km_s`.
pub fn kinetic_energy_j(mass_kg: f64, speed_km_s: f64) -> f64 {
    let speed_m_s = speed_km_s * 1000.0;
    0.5 * mass_kg * speed_m_s * speed_m_s
}

/// Major axis from kinetic energy on a log scale, saturating at both ends.
pub fn size_from_mass_speed(mass_kg: f64, speed_km_s: f64) -> f64 {
    let log_e = kinetic_energy_j(mass_kg, speed_km_s).max(1.0).log10();
    let lo = ENERGY_FLOOR_J.log10();
    let hi = ENERGY_CEILING_J.log10();
    let t = unit_fraction((log_e - lo) / (hi - lo));
    MAJOR_AXIS_MIN + t * (MAJOR_AXIS_MAX - MAJOR_AXIS_MIN)
}

/// Eccentricity from burst height. Height 0 gives the flattest ellipse.
pub fn eccentricity_from_height(height_km: f64, ref_km: f64) -> f64 {
    let f = unit_fraction(height_km / ref_km);
    (1.0 - 0.9 * f).clamp(ECCENTRICITY_MIN, ECCENTRICITY_MAX)
}

/// Grayscale fill (0 = black, 1 = white); heavier impactors are darker.
pub fn shade_from_mass(mass_kg: f64, ref_mass_kg: f64) -> f64 {
    let f = unit_fraction(mass_kg / ref_mass_kg);
    1.0 - (1.0 - SHADE_MIN) * f
}

pub fn minor_from_major_and_eccentricity(major_axis: f64, eccentricity: f64) -> f64 {
    major_axis * (1.0 - eccentricity * eccentricity).max(MIN_AXIS_RATIO_SQ).sqrt()
}
