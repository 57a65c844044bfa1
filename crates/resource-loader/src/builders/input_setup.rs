use std::collections::BTreeMap;

use super::{PathSegment, ScalarValue, StreamingBuilder, ValuePath};

/// A two-component message id, written in the source JSON as `[class,
/// method]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageId {
    pub class: String,
    pub method: String,
}

/// One entry of an `input` array: adds a UI button/toggle/slider bound to a
/// message id.
#[derive(Debug, Clone, PartialEq)]
pub struct UiInput {
    pub kind: String,
    pub message: MessageId,
}

/// One entry of a `slot` array: binds a key/cursor signal to a message id.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotBinding {
    pub signal: String,
    pub message: MessageId,
}

/// One entry of a `feedback` array: installs a feedback rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRule {
    pub condition: String,
    pub message: MessageId,
}

/// Distinguishes which of the three sibling arrays (`input`, `slot`,
/// `feedback`) a nested object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseTag {
    Input,
    Slot,
    Feedback,
}

impl ParseTag {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "input" => Some(Self::Input),
            "slot" => Some(Self::Slot),
            "feedback" => Some(Self::Feedback),
            _ => None,
        }
    }
}

#[derive(Default)]
struct PartialEntry {
    label_field: Option<String>,
    message: Option<[ScalarValue; 2]>,
}

/// Parses the input-setup JSON described in the spec: a top-level object
/// whose keys are mapping identifiers, each holding sibling `input`/`slot`/
/// `feedback` arrays terminated by a `[class, method]` message id.
#[derive(Default)]
pub struct InputSetupBuilder {
    inputs: Vec<UiInput>,
    slots: Vec<SlotBinding>,
    feedback: Vec<FeedbackRule>,
    partials: BTreeMap<(Vec<String>, ParseTagKey), PartialEntry>,
    success: bool,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum ParseTagKey {
    Input,
    Slot,
    Feedback,
}

impl From<ParseTag> for ParseTagKey {
    fn from(t: ParseTag) -> Self {
        match t {
            ParseTag::Input => Self::Input,
            ParseTag::Slot => Self::Slot,
            ParseTag::Feedback => Self::Feedback,
        }
    }
}

impl InputSetupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &[UiInput] {
        &self.inputs
    }

    pub fn slots(&self) -> &[SlotBinding] {
        &self.slots
    }

    pub fn feedback_rules(&self) -> &[FeedbackRule] {
        &self.feedback
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    fn tag_and_key(path: &ValuePath) -> Option<(ParseTag, Vec<String>)> {
        // Paths of interest: [mapping, tag, idx, field]
        if let [PathSegment::Key(_mapping), PathSegment::Key(tag), PathSegment::Index(idx), ..] =
            path
        {
            let tag = ParseTag::from_key(tag)?;
            return Some((tag, vec![tag_name(tag).to_string(), idx.to_string()]));
        }
        None
    }
}

fn tag_name(tag: ParseTag) -> &'static str {
    match tag {
        ParseTag::Input => "input",
        ParseTag::Slot => "slot",
        ParseTag::Feedback => "feedback",
    }
}

impl StreamingBuilder for InputSetupBuilder {
    fn add_values(&mut self, path: &ValuePath, values: &[ScalarValue]) {
        let Some((tag, key)) = Self::tag_and_key(path) else {
            return;
        };
        let entry = self.partials.entry((key, tag.into())).or_default();

        match path.last() {
            Some(PathSegment::Key(field)) if field == "message" && values.len() == 2 => {
                entry.message = Some([values[0].clone(), values[1].clone()]);
            }
            Some(PathSegment::Key(field)) if matches!(field.as_str(), "kind" | "signal" | "condition") => {
                if let Some(s) = values.first().and_then(ScalarValue::as_str) {
                    entry.label_field = Some(s.to_string());
                }
            }
            _ => {}
        }
    }

    fn finish_object(&mut self, path: &ValuePath) {
        let Some((tag, key)) = Self::tag_and_key(path) else {
            return;
        };
        // Only finalize once, when the index-scoped object itself closes
        // (path length 3: mapping/tag/idx), not on every nested field.
        if path.len() != 3 {
            return;
        }
        let Some(entry) = self.partials.remove(&(key, tag.into())) else {
            return;
        };
        let message = entry.message.map(|[c, m]| MessageId {
            class: c.as_str().unwrap_or_default().to_string(),
            method: m.as_str().unwrap_or_default().to_string(),
        });
        let Some(message) = message else {
            return;
        };
        let label = entry.label_field.unwrap_or_default();
        match tag {
            ParseTag::Input => self.inputs.push(UiInput { kind: label, message }),
            ParseTag::Slot => self.slots.push(SlotBinding { signal: label, message }),
            ParseTag::Feedback => self
                .feedback
                .push(FeedbackRule { condition: label, message }),
        }
    }

    fn finish(&mut self) -> bool {
        self.success = true;
        true
    }
}
