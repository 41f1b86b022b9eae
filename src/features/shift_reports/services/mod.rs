mod archive_packager;
mod delivery_dispatcher;
mod document;
mod normalizer;
mod report_pipeline;

pub use report_pipeline::ShiftReportService;
