use std::fmt;

use serde_json::Value;

/// Canonical shift report, built once per submission by the normalizer.
///
/// Text keeps the case the officer typed; uppercasing happens at render time.
#[derive(Debug)]
pub struct ReportRecord {
    pub name: String,
    pub registration_id: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    /// Objects found at the base, in printed form order
    pub found_objects: Vec<FoundObject>,
    /// Patrolled zones: catalog zones first, then unknown zones as submitted
    pub patrols: Vec<Narrative>,
    pub incidents: Vec<Narrative>,
    pub notes: Option<String>,
    pub images: Vec<Attachment>,
    pub videos: Vec<Attachment>,
}

/// One entry of the "objects found" checklist
#[derive(Debug, Clone, PartialEq)]
pub enum FoundObject {
    /// Plain checkbox
    Flag { label: String, present: bool },
    /// Checkbox with a count of items
    Quantity {
        label: String,
        present: bool,
        quantity: u32,
    },
    /// "None of the above" with a free-text description of what was found
    Other {
        label: String,
        present: bool,
        details: String,
    },
    /// Key outside the catalog, kept exactly as submitted
    Unrecognized { key: String, value: Value },
}

impl FoundObject {
    /// Whether the officer ticked this entry
    pub fn is_marked(&self) -> bool {
        match self {
            FoundObject::Flag { present, .. }
            | FoundObject::Quantity { present, .. }
            | FoundObject::Other { present, .. } => *present,
            FoundObject::Unrecognized { value, .. } => is_truthy(value),
        }
    }
}

/// JavaScript truthiness, which is what the form's checkboxes were built on
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Narrative attached to a patrol zone or incident category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narrative {
    /// Catalog label, or the submitted key when it is not in the catalog
    pub key: String,
    pub text: Option<String>,
    pub in_catalog: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
}

impl AttachmentKind {
    /// Archive folder holding attachments of this kind
    pub fn folder(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "IMAGES",
            AttachmentKind::Video => "VIDEOS",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentKind::Image => write!(f, "image"),
            AttachmentKind::Video => write!(f, "video"),
        }
    }
}

/// Uploaded photo or video
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Never empty
    pub filename: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("kind", &self.kind)
            .field("filename", &self.filename)
            .field("size", &self.data.len())
            .finish()
    }
}

impl ReportRecord {
    /// Images followed by videos, in upload order
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.images.iter().chain(self.videos.iter())
    }

    /// Sum of all attachment sizes in bytes
    pub fn attachments_size(&self) -> usize {
        self.attachments().map(Attachment::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!("sim")));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_unrecognized_marked_by_value() {
        let ticked = FoundObject::Unrecognized {
            key: "RADIO".to_string(),
            value: json!(true),
        };
        let unticked = FoundObject::Unrecognized {
            key: "RADIO".to_string(),
            value: json!(false),
        };
        assert!(ticked.is_marked());
        assert!(!unticked.is_marked());
    }
}
