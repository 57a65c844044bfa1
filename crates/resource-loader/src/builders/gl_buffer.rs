use std::rc::Rc;

use crate::gl::{GlContext, GlObjectKind};
use crate::handle::OwnedGlName;

use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// Parses a GL buffer descriptor (`label` + a `data` byte span) and commits
/// it through the supplied context when the traversal finishes.
pub struct GlBufferBuilder {
    ctx: Rc<dyn GlContext>,
    label: Option<String>,
    data: Vec<u8>,
    result: Option<OwnedGlName>,
}

impl GlBufferBuilder {
    pub fn new(ctx: Rc<dyn GlContext>) -> Self {
        Self {
            ctx,
            label: None,
            data: Vec::new(),
            result: None,
        }
    }

    pub fn into_result(self) -> Option<OwnedGlName> {
        self.result
    }
}

impl StreamingBuilder for GlBufferBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        match path {
            [PathSegment::Key(key)] if key == "label" => {
                if let Some(s) = values.first().and_then(ScalarValue::as_str) {
                    self.label = Some(s.to_string());
                }
            }
            [PathSegment::Key(key)] if key == "data" => {
                self.data
                    .extend(values.iter().filter_map(|v| v.as_i64()).map(|b| b as u8));
            }
            _ => {}
        }
    }

    fn finish(&mut self) -> bool {
        let name = self.ctx.create(GlObjectKind::Buffer);
        self.ctx
            .upload_buffer_data(name, self.label.as_deref(), &self.data);
        if let Some(label) = &self.label {
            self.ctx.object_label(GlObjectKind::Buffer, name, label);
        }
        self.result = Some(OwnedGlName::new(name, GlObjectKind::Buffer));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::walk_value_tree;
    use crate::gl::test_support::FakeGlContext;

    #[test]
    fn uploads_label_and_data_on_finish() {
        let fake = Rc::new(FakeGlContext::default());
        let ctx: Rc<dyn GlContext> = fake.clone();
        let value = serde_json::json!({"label": "vertices", "data": [1, 2, 3, 4]});

        let mut builder = GlBufferBuilder::new(Rc::clone(&ctx));
        walk_value_tree(&value, &mut builder);
        let owned = builder.into_result().unwrap();

        assert_eq!(fake.uploaded_buffers.borrow()[0].1, vec![1, 2, 3, 4]);
        assert_eq!(fake.labels.borrow()[0].2, "vertices");

        owned.release(&*ctx);
        assert_eq!(fake.deleted_count(), 1);
    }
}
