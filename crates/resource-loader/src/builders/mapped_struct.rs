use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// One field of a compile-time data-member map: the JSON key a field is
/// read from, plus a setter closure writing into the caller-owned struct.
pub struct FieldMapping<T> {
    pub key: &'static str,
    pub set: Box<dyn Fn(&mut T, &ScalarValue)>,
}

/// Bridges top-level value-tree attributes to caller-declared struct fields.
///
/// Matches the original's "mapped-struct builder and loader" pair: this
/// type plays both roles in one, since Rust ownership makes a separate
/// "loader writes into a caller struct" wrapper unnecessary — `into_result`
/// already hands back the populated value (or `None` on failure), which is
/// the loader variant's whole job.
pub struct MappedStructBuilder<T> {
    target: T,
    fields: Vec<FieldMapping<T>>,
    success: bool,
}

impl<T> MappedStructBuilder<T> {
    pub fn new(default: T, fields: Vec<FieldMapping<T>>) -> Self {
        Self {
            target: default,
            fields,
            success: false,
        }
    }

    pub fn into_result(self) -> Option<T> {
        self.success.then_some(self.target)
    }
}

impl<T> StreamingBuilder for MappedStructBuilder<T> {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        let [PathSegment::Key(key)] = path else {
            return;
        };
        if let (Some(mapping), Some(value)) = (
            self.fields.iter().find(|f| f.key == key.as_str()),
            values.first(),
        ) {
            (mapping.set)(&mut self.target, value);
        }
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}

/// Alias kept for symmetry with the spec's naming ("builder and loader");
/// in this crate they are the same type.
pub type MappedStructLoader<T> = MappedStructBuilder<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::walk_value_tree;

    #[derive(Debug, Default, PartialEq)]
    struct Settings {
        gain: f64,
        name: String,
    }

    #[test]
    fn maps_declared_fields_and_ignores_unknown_keys() {
        let value = serde_json::json!({"gain": 0.5, "name": "master", "unused": 1});
        let fields = vec![
            FieldMapping {
                key: "gain",
                set: Box::new(|t: &mut Settings, v: &ScalarValue| {
                    if let Some(f) = v.as_f64() {
                        t.gain = f;
                    }
                }),
            },
            FieldMapping {
                key: "name",
                set: Box::new(|t: &mut Settings, v: &ScalarValue| {
                    if let Some(s) = v.as_str() {
                        t.name = s.to_string();
                    }
                }),
            },
        ];

        let mut builder = MappedStructBuilder::new(Settings::default(), fields);
        walk_value_tree(&value, &mut builder);

        assert_eq!(
            builder.into_result().unwrap(),
            Settings { gain: 0.5, name: "master".to_string() }
        );
    }
}
