//! Full pipeline: impactor parameters -> geometry -> PNG.

use tracing::debug;

use crate::config::Config;
use crate::error::ImpactResult;
use crate::mapping::{ImpactParameters, SceneGeometry};
use crate::renderer::{self, RenderedImage};

/// Outcome of one calculation
#[derive(Debug, Clone)]
pub struct Footprint {
    pub params: ImpactParameters,
    pub geometry: SceneGeometry,
    pub image: RenderedImage,
}

/// Map and render a single request. Each call owns its own canvas.
pub fn compute(params: ImpactParameters, config: &Config) -> ImpactResult<Footprint> {
    let geometry = SceneGeometry::derive(&params, &config.mapping);
    debug!(?params, ?geometry, "Derived footprint geometry");

    let image = renderer::render_geometry(&geometry, &config.render)?;

    Ok(Footprint {
        params,
        geometry,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenario_renders() {
        let params = ImpactParameters {
            mass_kg: 1000.0,
            speed_km_s: 20.0,
            height_of_burst_km: 10.0,
            entry_angle_deg: 45.0,
        };
        let fp = compute(params, &Config::default()).unwrap();
        assert!(!fp.image.png_data.is_empty());
        assert!(fp.geometry.major_axis > 2.0 && fp.geometry.major_axis < 14.0);
        assert_eq!(fp.params, params);

        let again = compute(params, &Config::default()).unwrap();
        assert_eq!(fp.geometry, again.geometry);
    }
}
