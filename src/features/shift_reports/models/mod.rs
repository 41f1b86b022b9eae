pub mod catalog;
mod report_record;

pub use report_record::{
    is_truthy, Attachment, AttachmentKind, FoundObject, Narrative, ReportRecord,
};
