//! Abstract GL capability surface.
//!
//! The windowing layer, the real GL/EGL bindings, and the main loop are all
//! external collaborators per the scope notes — this module only models the
//! capability the streaming builders need: "allocate texture / attach
//! shader / upload image". A real application wires a concrete
//! `GlContext` backed by its own GL binding; this crate never links one.

use std::fmt;

/// Opaque name of a GL object, as returned by `glGen*`-equivalent calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlName(pub u32);

/// The kind of GL object an [`GlName`] refers to, used to pick the matching
/// `glDelete*` call and for diagnostic messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlObjectKind {
    Shader,
    Program,
    Texture,
    Buffer,
}

/// The six-way enumeration of shader stages a `shaders[]` entry in a GL
/// program descriptor may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    Fragment,
    Geometry,
    Compute,
    TessControl,
    TessEvaluation,
}

impl ShaderType {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "vertex" => Self::Vertex,
            "fragment" => Self::Fragment,
            "geometry" => Self::Geometry,
            "compute" => Self::Compute,
            "tess_control" => Self::TessControl,
            "tess_evaluation" => Self::TessEvaluation,
            _ => return None,
        })
    }
}

/// Intermediate descriptor accumulated while streaming a `.eagitex` texture
/// descriptor (component §3, "GL texture parameters").
#[derive(Debug, Clone, Default)]
pub struct GlTextureParams {
    pub dimensions: u8,
    pub levels: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub iformat: Option<String>,
    pub format: Option<String>,
    pub data_type: Option<String>,
    pub generate_mipmap: bool,
}

impl GlTextureParams {
    /// Widens `dimensions` to `max(dimensions, n)`, the invariant the spec
    /// requires when an N-dimensional field (e.g. `depth` for N=3) is set.
    pub fn note_dimension(&mut self, n: u8) {
        self.dimensions = self.dimensions.max(n);
    }
}

/// Intermediate descriptor for one `images[]` entry of a `.eagitexi` stream.
#[derive(Debug, Clone, Default)]
pub struct GlTextureImageParams {
    pub level: u32,
    pub x_offs: u32,
    pub y_offs: u32,
    pub z_offs: u32,
    pub channels: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub data_type: Option<String>,
    pub format: Option<String>,
    pub data_filter: Option<String>,
}

impl GlTextureImageParams {
    /// Projects a cube-map face index onto `z_offs`, per the invariant that
    /// cube-map targets fold their face index into the z offset.
    pub fn set_cubemap_face(&mut self, face: u8) {
        debug_assert!(face < 6);
        self.z_offs = u32::from(face);
    }
}

/// The abstract capability this crate requires from a real GL binding.
///
/// Per Design Notes item (ii), this is modeled with `Rc`-compatible, non-
/// `Send`/`Sync` semantics deliberately: the single-thread rule from the
/// concurrency model is a compile-time property here, not a runtime check.
pub trait GlContext {
    fn create(&self, kind: GlObjectKind) -> GlName;
    fn delete(&self, kind: GlObjectKind, name: GlName);
    fn compile_shader(&self, ty: ShaderType, source: &str) -> Result<GlName, String>;
    fn link_program(&self, shaders: &[GlName]) -> Result<GlName, String>;
    fn upload_texture_storage(&self, texture: GlName, params: &GlTextureParams);
    fn upload_texture_image(
        &self,
        texture: GlName,
        params: &GlTextureImageParams,
        pixels: &[u8],
    );
    fn upload_buffer_data(&self, buffer: GlName, label: Option<&str>, data: &[u8]);
    fn object_label(&self, kind: GlObjectKind, name: GlName, label: &str);
}

impl fmt::Debug for dyn GlContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn GlContext")
    }
}

/// Test double used by the crate's own unit tests and available to
/// downstream integration tests that want to exercise the GL-consuming
/// builders without a real GL binding.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::{GlContext, GlName, GlObjectKind, GlTextureImageParams, GlTextureParams, ShaderType};
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct FakeGlContext {
        next: RefCell<u32>,
        deleted: RefCell<u32>,
        pub uploaded_images: RefCell<Vec<(GlName, Vec<u8>)>>,
        pub uploaded_buffers: RefCell<Vec<(GlName, Vec<u8>)>>,
        pub labels: RefCell<Vec<(GlObjectKind, GlName, String)>>,
    }

    impl FakeGlContext {
        pub fn deleted_count(&self) -> u32 {
            *self.deleted.borrow()
        }
    }

    impl GlContext for FakeGlContext {
        fn create(&self, _kind: GlObjectKind) -> GlName {
            let mut next = self.next.borrow_mut();
            *next += 1;
            GlName(*next)
        }

        fn delete(&self, _kind: GlObjectKind, _name: GlName) {
            *self.deleted.borrow_mut() += 1;
        }

        fn compile_shader(&self, _ty: ShaderType, _source: &str) -> Result<GlName, String> {
            Ok(self.create(GlObjectKind::Shader))
        }

        fn link_program(&self, _shaders: &[GlName]) -> Result<GlName, String> {
            Ok(self.create(GlObjectKind::Program))
        }

        fn upload_texture_storage(&self, _texture: GlName, _params: &GlTextureParams) {}

        fn upload_texture_image(
            &self,
            texture: GlName,
            _params: &GlTextureImageParams,
            pixels: &[u8],
        ) {
            self.uploaded_images
                .borrow_mut()
                .push((texture, pixels.to_vec()));
        }

        fn upload_buffer_data(&self, buffer: GlName, _label: Option<&str>, data: &[u8]) {
            self.uploaded_buffers
                .borrow_mut()
                .push((buffer, data.to_vec()));
        }

        fn object_label(&self, kind: GlObjectKind, name: GlName, label: &str) {
            self.labels.borrow_mut().push((kind, name, label.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubemap_face_projects_onto_z_offs() {
        let mut params = GlTextureImageParams::default();
        params.set_cubemap_face(3);
        assert_eq!(params.z_offs, 3);
    }

    #[test]
    fn note_dimension_widens_but_never_narrows() {
        let mut params = GlTextureParams::default();
        params.note_dimension(2);
        params.note_dimension(1);
        assert_eq!(params.dimensions, 2);
        params.note_dimension(3);
        assert_eq!(params.dimensions, 3);
    }

    #[test]
    fn shader_type_parses_known_names_only() {
        assert_eq!(ShaderType::parse("fragment"), Some(ShaderType::Fragment));
        assert_eq!(ShaderType::parse("bogus"), None);
    }
}
