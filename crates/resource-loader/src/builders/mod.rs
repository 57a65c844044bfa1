//! Streaming value-tree builders (component D).
//!
//! Each builder consumes `(path, values)` events from a value-tree
//! traversal. The traversal itself (see [`walk_value_tree`]) buffers a
//! source's bytes into a complete `serde_json::Value` on `stream_finished`
//! and then walks it once, emitting the same event sequence a true
//! incremental SAX-style parser would produce for a JSON document —
//! documented as a deliberate simplification in `DESIGN.md` (Open Question
//! resolution): builders are still one-shot, single-threaded, and pushed
//! rather than pulled, they just don't see partial objects mid-stream.

mod camera;
mod gl_buffer;
mod gl_program;
mod gl_texture;
mod input_setup;
mod mapped_struct;
mod vector;

pub use camera::{CameraBuilder, CameraParams};
pub use gl_buffer::GlBufferBuilder;
pub use gl_program::{GlProgramBuilder, GlProgramDescriptor, ProgramInputBinding, ShaderRef};
pub use gl_texture::{GlTextureBuilder, GlTextureImageBuilder};
pub use input_setup::{FeedbackRule, InputSetupBuilder, MessageId, SlotBinding, UiInput};
pub use mapped_struct::{MappedStructBuilder, MappedStructLoader};
pub use vector::{FloatVectorBuilder, Mat4, Mat4VectorBuilder, Vec3, Vec3VectorBuilder};

/// One component of a value-tree path: either an object key or an array
/// index, in traversal order from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

pub type ValuePath = [PathSegment];

/// A scalar value carried by a traversal event. Builders match on the
/// variant they expect at a given path and ignore the rest, matching the
/// spec's "unknown optional JSON key... handled silently" recovery policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ScalarValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Push-parser over value-tree traversal events, producing one typed
/// artifact. Builders are one-shot: once `finish` or `failed` is called the
/// builder must not receive further events.
pub trait StreamingBuilder {
    /// Upper bound on a single string/array token this builder will accept;
    /// the traversal may use this to reject pathological input early.
    fn max_token_size(&self) -> usize {
        usize::MAX
    }

    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        let _ = (path, values);
    }

    fn add_object(&mut self, path: &ValuePath) {
        let _ = path;
    }

    fn finish_object(&mut self, path: &ValuePath) {
        let _ = path;
    }

    /// Called once, after the full traversal completes. Returns whether the
    /// builder produced a valid artifact (`_success`); `false` drives the
    /// owning pending request to `ResourceStatus::Error`.
    fn finish(&mut self) -> bool;

    fn failed(&mut self) {}
}

/// Walks a complete JSON value, emitting the same event sequence an
/// incremental parser would, then calls `finish`/`failed` on `builder`.
/// Returns `builder.finish()`'s result.
pub fn walk_value_tree(value: &serde_json::Value, builder: &mut dyn StreamingBuilder) -> bool {
    let mut path = Vec::new();
    walk(value, &mut path, builder);
    builder.finish()
}

fn walk(value: &serde_json::Value, path: &mut Vec<PathSegment>, builder: &mut dyn StreamingBuilder) {
    match value {
        serde_json::Value::Object(map) => {
            builder.add_object(path);
            for (key, child) in map {
                path.push(PathSegment::Key(key.clone()));
                walk(child, path, builder);
                path.pop();
            }
            builder.finish_object(path);
        }
        serde_json::Value::Array(items) => {
            if let Some(scalars) = as_scalar_span(items) {
                builder.add_values(path, &scalars);
            } else {
                for (i, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(i));
                    walk(item, path, builder);
                    path.pop();
                }
            }
        }
        scalar => {
            if let Some(v) = to_scalar(scalar) {
                builder.add_values(path, &[v]);
            }
        }
    }
}

fn as_scalar_span(items: &[serde_json::Value]) -> Option<Vec<ScalarValue>> {
    items.iter().map(to_scalar).collect()
}

fn to_scalar(value: &serde_json::Value) -> Option<ScalarValue> {
    match value {
        serde_json::Value::Bool(b) => Some(ScalarValue::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(ScalarValue::Int(i))
            } else {
                n.as_f64().map(ScalarValue::Float)
            }
        }
        serde_json::Value::String(s) => Some(ScalarValue::Str(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingBuilder {
        values: Vec<(Vec<PathSegment>, Vec<ScalarValue>)>,
        objects_opened: Vec<Vec<PathSegment>>,
    }

    impl StreamingBuilder for RecordingBuilder {
        fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
            self.values.push((path.to_vec(), values.to_vec()));
        }

        fn add_object(&mut self, path: &ValuePath) {
            self.objects_opened.push(path.to_vec());
        }

        fn finish(&mut self) -> bool {
            true
        }
    }

    #[test]
    fn scalar_arrays_are_delivered_as_a_single_span() {
        let value = serde_json::json!({"values": [1, 2, 3, 5, 8, 13, 21]});
        let mut builder = RecordingBuilder::default();
        assert!(walk_value_tree(&value, &mut builder));

        assert_eq!(builder.values.len(), 1);
        let (path, values) = &builder.values[0];
        assert_eq!(path, &[PathSegment::Key("values".to_string())]);
        assert_eq!(values.iter().map(|v| v.as_i64().unwrap()).collect::<Vec<_>>(), vec![1, 2, 3, 5, 8, 13, 21]);
    }

    #[test]
    fn nested_objects_open_and_close_in_order() {
        let value = serde_json::json!({"a": {"b": 1}});
        let mut builder = RecordingBuilder::default();
        walk_value_tree(&value, &mut builder);

        assert_eq!(builder.objects_opened[0], Vec::<PathSegment>::new());
        assert_eq!(builder.objects_opened[1], vec![PathSegment::Key("a".to_string())]);
    }
}
