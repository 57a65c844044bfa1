use std::collections::BTreeMap;

use crate::gl::ShaderType;

use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// One entry of a `.eagiprog` descriptor's `inputs` map: which vertex
/// attribute a named shader input binds to, and which variant of it (for
/// inputs with more than one declared variant).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramInputBinding {
    pub attrib_kind: String,
    pub variant_index: Option<i64>,
}

/// One `shaders[]` entry: the locator of the shader source plus the stage
/// it should be compiled as.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderRef {
    pub locator: String,
    pub shader_type: ShaderType,
}

#[derive(Default)]
struct PartialShaderRef {
    locator: Option<String>,
    shader_type: Option<ShaderType>,
}

/// Parses a `.eagiprog` program descriptor: a named `inputs` map plus a
/// `shaders` array of `{url, type}` entries.
///
/// This builder only produces the descriptor — it has no access to the
/// owning loader, so it cannot itself issue the recursive `request_gl_shader`
/// calls the spec describes for each `shaders[]` entry. The pending-request
/// arena reads `shaders` back out of the finished descriptor and issues
/// those child requests, joining them the way any other dependent-resource
/// kind is joined.
#[derive(Default)]
pub struct GlProgramBuilder {
    inputs: BTreeMap<String, ProgramInputBinding>,
    shaders: BTreeMap<usize, PartialShaderRef>,
    success: bool,
}

/// The parsed, pre-linked shape of a program descriptor.
#[derive(Debug, Clone, Default)]
pub struct GlProgramDescriptor {
    pub inputs: BTreeMap<String, ProgramInputBinding>,
    pub shaders: Vec<ShaderRef>,
}

impl GlProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_result(self) -> Option<GlProgramDescriptor> {
        if !self.success {
            return None;
        }
        // Entries with an unparseable or missing `type` are dropped rather
        // than failing the whole program descriptor, matching the "unknown
        // optional JSON key handled silently" recovery policy; a program
        // whose shaders are all dropped simply has nothing to link.
        let shaders = self
            .shaders
            .into_values()
            .filter_map(|s| {
                Some(ShaderRef {
                    locator: s.locator?,
                    shader_type: s.shader_type?,
                })
            })
            .collect();
        Some(GlProgramDescriptor {
            inputs: self.inputs,
            shaders,
        })
    }
}

impl StreamingBuilder for GlProgramBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        match path {
            [PathSegment::Key(root), PathSegment::Key(name), PathSegment::Key(field)]
                if root == "inputs" =>
            {
                let entry = self.inputs.entry(name.clone()).or_default();
                match field.as_str() {
                    "attrib_kind" => {
                        if let Some(s) = values.first().and_then(ScalarValue::as_str) {
                            entry.attrib_kind = s.to_string();
                        }
                    }
                    "variant_index" => {
                        if let Some(i) = values.first().and_then(ScalarValue::as_i64) {
                            entry.variant_index = Some(i);
                        }
                    }
                    _ => {}
                }
            }
            [PathSegment::Key(root), PathSegment::Index(i), PathSegment::Key(field)]
                if root == "shaders" =>
            {
                let entry = self.shaders.entry(*i).or_default();
                match field.as_str() {
                    "url" => {
                        if let Some(s) = values.first().and_then(ScalarValue::as_str) {
                            entry.locator = Some(s.to_string());
                        }
                    }
                    "type" => {
                        if let Some(s) = values.first().and_then(ScalarValue::as_str) {
                            entry.shader_type = ShaderType::parse(s);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn finish_object(&mut self, path: &ValuePath) {
        // Marks the point at which one `shaders[i]` entry or the whole
        // descriptor is complete; the descriptor itself carries no further
        // state for this event since entries are finalized in
        // `into_result`.
        let _ = path;
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}
