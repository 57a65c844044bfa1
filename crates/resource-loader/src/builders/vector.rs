use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// A 3-component vector, keyed in the source JSON as either
/// `values[i].x/.y/.z` or a 3-element `values[i]` span.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A row-major 4x4 matrix, keyed as a 16-element `data[i]` span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4(pub [f64; 16]);

impl Default for Mat4 {
    fn default() -> Self {
        Self([0.0; 16])
    }
}

impl Mat4 {
    pub fn diag(d0: f64, d1: f64, d2: f64, d3: f64) -> Self {
        let mut m = [0.0; 16];
        m[0] = d0;
        m[5] = d1;
        m[10] = d2;
        m[15] = d3;
        Self(m)
    }
}

/// Collects a top-level `values[]` array of scalars into `Vec<f64>`.
///
/// Matches `request_float_vector({url})`: `[1,2,3,5,8,13,21]` arrives as one
/// scalar span at path `values` and is copied through unchanged.
#[derive(Default)]
pub struct FloatVectorBuilder {
    out: Vec<f64>,
    success: bool,
}

impl FloatVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_result(self) -> Option<Vec<f64>> {
        self.success.then_some(self.out)
    }
}

impl StreamingBuilder for FloatVectorBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        if is_top_level_values(path) {
            self.out
                .extend(values.iter().filter_map(ScalarValue::as_f64));
        }
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}

/// Collects `values[i] = [x,y,z]` spans, or the coalesced `.x/.y/.z`
/// variant, into a `Vec<Vec3>`.
#[derive(Default)]
pub struct Vec3VectorBuilder {
    out: Vec<Vec3>,
    partial: Vec3,
    has_partial: bool,
    success: bool,
}

impl Vec3VectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_result(self) -> Option<Vec<Vec3>> {
        self.success.then_some(self.out)
    }
}

impl StreamingBuilder for Vec3VectorBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        // A 3-element span at `values[i]` is the vector itself.
        if is_top_level_values_index(path) && values.len() == 3 {
            let get = |v: &ScalarValue| v.as_f64().unwrap_or(0.0);
            self.out.push(Vec3 {
                x: get(&values[0]),
                y: get(&values[1]),
                z: get(&values[2]),
            });
            return;
        }

        // `values[i].x` / `.y` / `.z` coalesce into one Vec3 on object finish.
        if let [PathSegment::Key(k), PathSegment::Index(_), PathSegment::Key(field)] = path {
            if k == "values" {
                if let Some(v) = values.first().and_then(ScalarValue::as_f64) {
                    self.has_partial = true;
                    match field.as_str() {
                        "x" => self.partial.x = v,
                        "y" => self.partial.y = v,
                        "z" => self.partial.z = v,
                        _ => {}
                    }
                }
            }
        }
    }

    fn finish_object(&mut self, path: &ValuePath) {
        // `values[i].x/.y/.z` coalesces into one Vec3 when its object scope
        // closes.
        if is_top_level_values_index(path) && self.has_partial {
            self.out.push(self.partial);
            self.partial = Vec3::default();
            self.has_partial = false;
        }
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}

/// Collects 16-element `data[i]` spans into row-major `Mat4` values.
#[derive(Default)]
pub struct Mat4VectorBuilder {
    out: Vec<Mat4>,
    success: bool,
}

impl Mat4VectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_result(self) -> Option<Vec<Mat4>> {
        self.success.then_some(self.out)
    }
}

impl StreamingBuilder for Mat4VectorBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        if is_top_level_values_index(path) && values.len() == 16 {
            let mut m = [0.0; 16];
            for (i, v) in values.iter().enumerate() {
                m[i] = v.as_f64().unwrap_or(0.0);
            }
            self.out.push(Mat4(m));
        }
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}

fn is_top_level_values(path: &ValuePath) -> bool {
    matches!(path, [PathSegment::Key(k)] if k == "values")
}

fn is_top_level_values_index(path: &ValuePath) -> bool {
    matches!(path, [PathSegment::Key(k), PathSegment::Index(_)] if k == "values")
}
