use std::rc::Rc;

use crate::gl::{GlContext, GlObjectKind, GlTextureImageParams, GlTextureParams};
use crate::handle::OwnedGlName;

use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// Parses the header fields of a `.eagitex` texture descriptor
/// (dimensions/levels/format) and commits `glTexStorage*`-equivalent
/// allocation through the context on finish.
pub struct GlTextureBuilder {
    ctx: Rc<dyn GlContext>,
    params: GlTextureParams,
    result: Option<(OwnedGlName, GlTextureParams)>,
}

impl GlTextureBuilder {
    pub fn new(ctx: Rc<dyn GlContext>) -> Self {
        Self {
            ctx,
            params: GlTextureParams::default(),
            result: None,
        }
    }

    pub fn into_result(self) -> Option<(OwnedGlName, GlTextureParams)> {
        self.result
    }
}

impl StreamingBuilder for GlTextureBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        let [PathSegment::Key(key)] = path else {
            return;
        };
        let first = values.first();
        match key.as_str() {
            "width" => {
                if let Some(v) = first.and_then(ScalarValue::as_i64) {
                    self.params.width = v as u32;
                    self.params.note_dimension(1);
                }
            }
            "height" => {
                if let Some(v) = first.and_then(ScalarValue::as_i64) {
                    self.params.height = v as u32;
                    self.params.note_dimension(2);
                }
            }
            "depth" => {
                if let Some(v) = first.and_then(ScalarValue::as_i64) {
                    self.params.depth = v as u32;
                    self.params.note_dimension(3);
                }
            }
            "levels" => {
                if let Some(v) = first.and_then(ScalarValue::as_i64) {
                    self.params.levels = v as u32;
                }
            }
            "iformat" => {
                if let Some(s) = first.and_then(ScalarValue::as_str) {
                    self.params.iformat = Some(s.to_string());
                }
            }
            "format" => {
                if let Some(s) = first.and_then(ScalarValue::as_str) {
                    self.params.format = Some(s.to_string());
                }
            }
            "data_type" => {
                if let Some(s) = first.and_then(ScalarValue::as_str) {
                    self.params.data_type = Some(s.to_string());
                }
            }
            "generate_mipmap" => {
                if let Some(b) = first.and_then(ScalarValue::as_bool) {
                    self.params.generate_mipmap = b;
                }
            }
            _ => {}
        }
    }

    fn finish(&mut self) -> bool {
        let name = self.ctx.create(GlObjectKind::Texture);
        self.ctx.upload_texture_storage(name, &self.params);
        self.result = Some((OwnedGlName::new(name, GlObjectKind::Texture), self.params.clone()));
        true
    }
}

/// Parses one `images[]` entry of a `.eagitexi` stream: offsets/channels/
/// dimensions plus a raw pixel-data span, optionally tagged with a cube-map
/// `face` index.
pub struct GlTextureImageBuilder {
    ctx: Rc<dyn GlContext>,
    texture: crate::gl::GlName,
    params: GlTextureImageParams,
    pixels: Vec<u8>,
    success: bool,
}

impl GlTextureImageBuilder {
    pub fn new(ctx: Rc<dyn GlContext>, texture: crate::gl::GlName) -> Self {
        Self {
            ctx,
            texture,
            params: GlTextureImageParams::default(),
            pixels: Vec::new(),
            success: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

impl StreamingBuilder for GlTextureImageBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        let [PathSegment::Key(key)] = path else {
            return;
        };
        if key == "data" {
            self.pixels
                .extend(values.iter().filter_map(|v| v.as_i64()).map(|b| b as u8));
            return;
        }
        let Some(v) = values.first().and_then(ScalarValue::as_i64) else {
            if key == "format" || key == "data_type" || key == "data_filter" {
                if let Some(s) = values.first().and_then(ScalarValue::as_str) {
                    match key.as_str() {
                        "format" => self.params.format = Some(s.to_string()),
                        "data_type" => self.params.data_type = Some(s.to_string()),
                        "data_filter" => self.params.data_filter = Some(s.to_string()),
                        _ => {}
                    }
                }
            }
            return;
        };
        match key.as_str() {
            "level" => self.params.level = v as u32,
            "x_offs" => self.params.x_offs = v as u32,
            "y_offs" => self.params.y_offs = v as u32,
            "z_offs" => self.params.z_offs = v as u32,
            "channels" => self.params.channels = v as u32,
            "width" => self.params.width = v as u32,
            "height" => self.params.height = v as u32,
            "depth" => self.params.depth = v as u32,
            "face" => self.params.set_cubemap_face(v as u8),
            _ => {}
        }
    }

    fn finish(&mut self) -> bool {
        self.ctx
            .upload_texture_image(self.texture, &self.params, &self.pixels);
        self.success = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::walk_value_tree;
    use crate::gl::test_support::FakeGlContext;

    #[test]
    fn texture_header_widens_dimensions_from_depth() {
        let fake = Rc::new(FakeGlContext::default());
        let ctx: Rc<dyn GlContext> = fake.clone();
        let value = serde_json::json!({"width": 4, "height": 4, "depth": 1, "levels": 1});

        let mut builder = GlTextureBuilder::new(ctx);
        walk_value_tree(&value, &mut builder);
        let (_name, params) = builder.into_result().unwrap();
        assert_eq!(params.dimensions, 3);
        assert_eq!(params.width, 4);
    }

    #[test]
    fn image_entry_uploads_pixels_and_projects_cubemap_face() {
        let fake = Rc::new(FakeGlContext::default());
        let ctx: Rc<dyn GlContext> = fake.clone();
        let texture = fake.create(GlObjectKind::Texture);
        let value = serde_json::json!({"face": 2, "width": 2, "height": 2, "data": [1,2,3,4]});

        let mut builder = GlTextureImageBuilder::new(ctx, texture);
        walk_value_tree(&value, &mut builder);
        assert!(builder.is_success());

        let (_tex, pixels) = &fake.uploaded_images.borrow()[0];
        assert_eq!(pixels, &vec![1u8, 2, 3, 4]);
    }
}
