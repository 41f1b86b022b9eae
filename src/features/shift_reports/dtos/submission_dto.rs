use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Accepted names for each text field: English name first, then the
/// Portuguese name posted by the legacy web form
pub const NAME_FIELDS: &[&str] = &["name", "nome"];
pub const REGISTRATION_ID_FIELDS: &[&str] = &["registrationId", "matricula"];
pub const START_DATE_FIELDS: &[&str] = &["startDate", "dataInicio"];
pub const START_TIME_FIELDS: &[&str] = &["startTime", "horaInicio"];
pub const END_DATE_FIELDS: &[&str] = &["endDate", "dataSaida"];
pub const END_TIME_FIELDS: &[&str] = &["endTime", "horaSaida"];
pub const OBJECTS_FIELDS: &[&str] = &["objects", "objetos"];
pub const PATROLS_FIELDS: &[&str] = &["patrols", "patrulhamento"];
pub const INCIDENTS_FIELDS: &[&str] = &["incidents", "ocorrencias"];
pub const NOTES_FIELDS: &[&str] = &["notes", "observacoes"];

/// Accepted names for the file-array fields
pub const IMAGES_FIELDS: &[&str] = &["images", "fotos"];
pub const VIDEOS_FIELDS: &[&str] = &["videos"];

/// Weakly-typed submission as it arrives at the boundary.
///
/// Text fields hold either a plain string or a nested structure; nested
/// structures may themselves arrive JSON-encoded inside a string.
#[derive(Debug, Default)]
pub struct RawSubmission {
    pub fields: Map<String, Value>,
    pub images: Vec<UploadedFile>,
    pub videos: Vec<UploadedFile>,
}

/// File part read from the multipart body
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("size", &self.data.len())
            .finish()
    }
}

impl RawSubmission {
    /// Set a plain text field
    pub fn insert_text(&mut self, field: &str, value: impl Into<String>) {
        self.fields
            .insert(field.to_string(), Value::String(value.into()));
    }
}

/// Submit shift report request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportDto {
    /// Officer name (alias: `nome`)
    #[schema(example = "João Silva")]
    pub name: Option<String>,
    /// Registration id (alias: `matricula`)
    #[schema(example = "1234")]
    pub registration_id: Option<String>,
    /// Shift start date (alias: `dataInicio`)
    #[schema(example = "2024-01-10")]
    pub start_date: Option<String>,
    /// Shift start time (alias: `horaInicio`)
    #[schema(example = "07:00")]
    pub start_time: Option<String>,
    /// Shift end date (alias: `dataSaida`)
    pub end_date: Option<String>,
    /// Shift end time (alias: `horaSaida`)
    pub end_time: Option<String>,
    /// JSON-encoded objects checklist (alias: `objetos`)
    #[schema(example = r#"{"cones":{"marcado":true,"quantidade":"5"},"CELULAR":true}"#)]
    pub objects: Option<String>,
    /// JSON-encoded patrol narratives per zone (alias: `patrulhamento`)
    #[schema(example = r#"{"CENTRO":{"primeiro":"patrulha sem ocorrencias"}}"#)]
    pub patrols: Option<String>,
    /// JSON-encoded incident narratives per category (alias: `ocorrencias`)
    pub incidents: Option<String>,
    /// Free-text observations (alias: `observacoes`)
    pub notes: Option<String>,
    /// Photos (alias: `fotos`)
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Option<Vec<String>>,
    /// Videos
    #[schema(value_type = Vec<String>, format = Binary)]
    pub videos: Option<Vec<String>>,
}
