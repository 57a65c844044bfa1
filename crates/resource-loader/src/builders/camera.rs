use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// Camera parameters a `json:///Camera*` resource can configure. Angle
/// fields accept either the `_deg` or `_rad` suffixed key; degrees are
/// normalized to radians on the way in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub near: f64,
    pub far: f64,
    pub orbit_min: f64,
    pub orbit_max: f64,
    pub fov_rad: f64,
    pub azimuth_min_rad: f64,
    pub azimuth_max_rad: f64,
    pub elevation_min_rad: f64,
    pub elevation_max_rad: f64,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
            orbit_min: 1.0,
            orbit_max: 10.0,
            fov_rad: std::f64::consts::FRAC_PI_4,
            azimuth_min_rad: 0.0,
            azimuth_max_rad: std::f64::consts::TAU,
            elevation_min_rad: -std::f64::consts::FRAC_PI_2,
            elevation_max_rad: std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Maps well-known scalar paths to camera setters.
#[derive(Default)]
pub struct CameraBuilder {
    params: CameraParams,
    success: bool,
}

impl CameraBuilder {
    pub fn new() -> Self {
        Self {
            params: CameraParams::default(),
            success: false,
        }
    }

    pub fn into_result(self) -> Option<CameraParams> {
        self.success.then_some(self.params)
    }
}

impl StreamingBuilder for CameraBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        let [PathSegment::Key(key)] = path else {
            return;
        };
        let Some(v) = values.first().and_then(ScalarValue::as_f64) else {
            return;
        };
        match key.as_str() {
            "near" => self.params.near = v,
            "far" => self.params.far = v,
            "orbit_min" => self.params.orbit_min = v,
            "orbit_max" => self.params.orbit_max = v,
            "fov_deg" => self.params.fov_rad = v.to_radians(),
            "fov_rad" => self.params.fov_rad = v,
            "azimuth_min_deg" => self.params.azimuth_min_rad = v.to_radians(),
            "azimuth_min_rad" => self.params.azimuth_min_rad = v,
            "azimuth_max_deg" => self.params.azimuth_max_rad = v.to_radians(),
            "azimuth_max_rad" => self.params.azimuth_max_rad = v,
            "elevation_min_deg" => self.params.elevation_min_rad = v.to_radians(),
            "elevation_min_rad" => self.params.elevation_min_rad = v,
            "elevation_max_deg" => self.params.elevation_max_rad = v.to_radians(),
            "elevation_max_rad" => self.params.elevation_max_rad = v,
            _ => {}
        }
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::walk_value_tree;

    #[test]
    fn degree_fields_normalize_to_radians() {
        let value = serde_json::json!({"fov_deg": 90.0, "near": 0.5, "far": 100.0});
        let mut builder = CameraBuilder::new();
        walk_value_tree(&value, &mut builder);

        let params = builder.into_result().unwrap();
        assert!((params.fov_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert_eq!(params.near, 0.5);
        assert_eq!(params.far, 100.0);
    }

    #[test]
    fn unrecognized_keys_are_ignored_not_errors() {
        let value = serde_json::json!({"near": 1.0, "bogus_field": 42});
        let mut builder = CameraBuilder::new();
        walk_value_tree(&value, &mut builder);
        assert!(builder.into_result().is_some());
    }
}
