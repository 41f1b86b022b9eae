//! Turns the weakly-typed multipart submission into a [`ReportRecord`].
//!
//! Only structural problems are errors: a nested field that was sent as a
//! non-empty string but does not hold a JSON object. Everything else (empty
//! names, odd dates, non-numeric counts) passes through or falls back to a
//! default so the report can still be rendered.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::core::error::AppError;
use crate::features::shift_reports::dtos::{
    RawSubmission, UploadedFile, END_DATE_FIELDS, END_TIME_FIELDS, INCIDENTS_FIELDS,
    NAME_FIELDS, NOTES_FIELDS, OBJECTS_FIELDS, PATROLS_FIELDS, REGISTRATION_ID_FIELDS,
    START_DATE_FIELDS, START_TIME_FIELDS,
};
use crate::features::shift_reports::models::catalog::{
    self, ObjectKind, INCIDENT_CATEGORIES, PATROL_ZONES,
};
use crate::features::shift_reports::models::{
    is_truthy, Attachment, AttachmentKind, FoundObject, Narrative, ReportRecord,
};
use crate::shared::validation::base_filename;

/// Keys that may hold the narrative inside a zone or incident object
const NARRATIVE_KEYS: &[&str] = &["primeiro", "descricao", "narrativa", "texto"];

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Campo '{field}' contém JSON inválido: {source}")]
    MalformedJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Campo '{field}' deve ser um objeto JSON")]
    NotAnObject { field: &'static str },
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Build the canonical record for one submission
pub fn normalize(raw: RawSubmission) -> Result<ReportRecord, NormalizeError> {
    let RawSubmission {
        fields,
        images,
        videos,
    } = raw;

    let objects = structured_field(&fields, OBJECTS_FIELDS)?;
    let patrols = structured_field(&fields, PATROLS_FIELDS)?;
    let incidents = structured_field(&fields, INCIDENTS_FIELDS)?;

    let notes = Some(text_field(&fields, NOTES_FIELDS)).filter(|s| !s.trim().is_empty());

    let record = ReportRecord {
        name: text_field(&fields, NAME_FIELDS),
        registration_id: text_field(&fields, REGISTRATION_ID_FIELDS),
        start_date: text_field(&fields, START_DATE_FIELDS),
        start_time: text_field(&fields, START_TIME_FIELDS),
        end_date: text_field(&fields, END_DATE_FIELDS),
        end_time: text_field(&fields, END_TIME_FIELDS),
        found_objects: found_objects(objects),
        patrols: narratives(patrols, PATROL_ZONES),
        incidents: narratives(incidents, INCIDENT_CATEGORIES),
        notes,
        images: attachments(images, AttachmentKind::Image),
        videos: attachments(videos, AttachmentKind::Video),
    };

    debug!(
        "Normalized submission: objects={}, patrols={} ({} outside catalog), incidents={}, images={}, videos={}",
        record.found_objects.len(),
        record.patrols.len(),
        record.patrols.iter().filter(|p| !p.in_catalog).count(),
        record.incidents.len(),
        record.images.len(),
        record.videos.len()
    );

    Ok(record)
}

/// First present value among the accepted names for a field
fn lookup_field<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| fields.get(*name))
}

fn text_field(fields: &Map<String, Value>, names: &[&str]) -> String {
    match lookup_field(fields, names) {
        Some(value) => value_as_text(value),
        None => String::new(),
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Parse-if-string: nested fields arrive either already structured or
/// JSON-encoded. Absent or blank fields become an empty object.
fn structured_field(
    fields: &Map<String, Value>,
    names: &'static [&'static str],
) -> Result<Map<String, Value>, NormalizeError> {
    let field = names[0];

    match lookup_field(fields, names) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Map::new()),
        Some(Value::String(s)) => {
            match serde_json::from_str::<Value>(s)
                .map_err(|source| NormalizeError::MalformedJson { field, source })?
            {
                Value::Object(map) => Ok(map),
                Value::Null => Ok(Map::new()),
                _ => Err(NormalizeError::NotAnObject { field }),
            }
        }
        Some(_) => Err(NormalizeError::NotAnObject { field }),
    }
}

/// Coerce a count to an integer, falling back to 0 for anything non-numeric
pub fn coerce_quantity(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).unwrap_or(u32::MAX)
            } else {
                n.as_f64().map_or(0, float_to_count)
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(float_to_count))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn float_to_count(f: f64) -> u32 {
    if f.is_finite() && f >= 0.0 {
        f.trunc().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Flag read from either a bare value or a `{ "marcado": ... }` object
fn marked(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.get("marcado").is_some_and(is_truthy),
        other => is_truthy(other),
    }
}

fn found_objects(objects: Map<String, Value>) -> Vec<FoundObject> {
    let mut entries: Vec<(usize, FoundObject)> = Vec::with_capacity(objects.len());
    let mut seen = HashSet::new();

    for (key, value) in objects {
        let rank = catalog::object_rank(&key);

        let entry = match catalog::object_kind(&key) {
            Some((kind, label)) => {
                // "cones" and "CONES" both name the same checkbox; keep the first
                if !seen.insert(label) {
                    debug!("Ignoring duplicate object key: {}", key);
                    continue;
                }
                let label = label.to_string();
                let present = marked(&value);

                match kind {
                    ObjectKind::Quantity => {
                        let quantity = match &value {
                            Value::Object(map) => coerce_quantity(map.get("quantidade")),
                            other => coerce_quantity(Some(other)),
                        };
                        FoundObject::Quantity {
                            label,
                            present,
                            quantity,
                        }
                    }
                    ObjectKind::Flag => FoundObject::Flag { label, present },
                    ObjectKind::Other => {
                        let details = match &value {
                            Value::Object(map) => {
                                map.get("outros").map(value_as_text).unwrap_or_default()
                            }
                            _ => String::new(),
                        };
                        FoundObject::Other {
                            label,
                            present,
                            details,
                        }
                    }
                }
            }
            None => FoundObject::Unrecognized { key, value },
        };

        entries.push((rank, entry));
    }

    // Stable sort keeps submission order within the same rank
    entries.sort_by_key(|(rank, _)| *rank);
    entries.into_iter().map(|(_, entry)| entry).collect()
}

fn narrative_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => NARRATIVE_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .map(value_as_text)
            .find(|s| !s.trim().is_empty())
            .unwrap_or_default(),
        Value::Number(_) | Value::Bool(_) => value_as_text(value),
        _ => String::new(),
    };

    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Catalog entries in catalog order, then unknown keys in submission order
fn narratives(map: Map<String, Value>, catalog_entries: &[&'static str]) -> Vec<Narrative> {
    let mut known: Vec<(usize, Narrative)> = Vec::new();
    let mut unknown: Vec<Narrative> = Vec::new();
    let mut seen = HashSet::new();

    for (key, value) in map {
        let text = narrative_text(&value);
        match catalog::lookup(catalog_entries, &key) {
            Some(label) => {
                if !seen.insert(label) {
                    debug!("Ignoring duplicate catalog key: {}", key);
                    continue;
                }
                let position = catalog_entries
                    .iter()
                    .position(|entry| *entry == label)
                    .unwrap_or(usize::MAX);
                known.push((
                    position,
                    Narrative {
                        key: label.to_string(),
                        text,
                        in_catalog: true,
                    },
                ));
            }
            None => unknown.push(Narrative {
                key,
                text,
                in_catalog: false,
            }),
        }
    }

    known.sort_by_key(|(position, _)| *position);
    known
        .into_iter()
        .map(|(_, narrative)| narrative)
        .chain(unknown)
        .collect()
}

fn attachments(files: Vec<UploadedFile>, kind: AttachmentKind) -> Vec<Attachment> {
    files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            let filename = file
                .file_name
                .as_deref()
                .map(base_filename)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("arquivo-{}", index + 1));

            Attachment {
                kind,
                filename,
                data: file.data,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(fields: Value) -> RawSubmission {
        let Value::Object(fields) = fields else {
            panic!("fields must be an object");
        };
        RawSubmission {
            fields,
            ..Default::default()
        }
    }

    #[test]
    fn test_coerce_quantity() {
        assert_eq!(coerce_quantity(Some(&json!("7"))), 7);
        assert_eq!(coerce_quantity(Some(&json!("abc"))), 0);
        assert_eq!(coerce_quantity(Some(&json!(" 12 "))), 12);
        assert_eq!(coerce_quantity(Some(&json!(3))), 3);
        assert_eq!(coerce_quantity(Some(&json!(2.9))), 2);
        assert_eq!(coerce_quantity(Some(&json!(-4))), 0);
        assert_eq!(coerce_quantity(Some(&json!("-4"))), 0);
        assert_eq!(coerce_quantity(Some(&json!(true))), 0);
        assert_eq!(coerce_quantity(None), 0);
    }

    #[test]
    fn test_absent_structured_fields_are_empty() {
        let record = normalize(submission(json!({ "name": "Maria" }))).unwrap();
        assert!(record.found_objects.is_empty());
        assert!(record.patrols.is_empty());
        assert!(record.incidents.is_empty());
        assert_eq!(record.notes, None);
        assert_eq!(record.registration_id, "");
    }

    #[test]
    fn test_blank_json_string_is_empty() {
        let record = normalize(submission(json!({ "objects": "  ", "patrols": "" }))).unwrap();
        assert!(record.found_objects.is_empty());
        assert!(record.patrols.is_empty());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = normalize(submission(json!({ "patrols": "{not json" }))).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MalformedJson {
                field: "patrols",
                ..
            }
        ));
    }

    #[test]
    fn test_json_array_is_rejected() {
        let err = normalize(submission(json!({ "objects": "[1, 2]" }))).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAnObject { field: "objects" }));
    }

    #[test]
    fn test_structured_value_accepted_without_encoding() {
        let record = normalize(submission(json!({
            "objects": { "cones": { "marcado": true, "quantidade": "7" } }
        })))
        .unwrap();

        assert_eq!(
            record.found_objects,
            vec![FoundObject::Quantity {
                label: "cones".to_string(),
                present: true,
                quantity: 7,
            }]
        );
    }

    #[test]
    fn test_portuguese_aliases() {
        let record = normalize(submission(json!({
            "nome": "João",
            "matricula": "99",
            "dataInicio": "2024-01-10",
            "horaInicio": "07:00",
            "dataSaida": "2024-01-11",
            "horaSaida": "07:00",
            "observacoes": "tudo certo",
            "objetos": "{\"CELULAR\": true}",
            "patrulhamento": "{\"CENTRO\": {\"primeiro\": \"ronda\"}}"
        })))
        .unwrap();

        assert_eq!(record.name, "João");
        assert_eq!(record.registration_id, "99");
        assert_eq!(record.end_date, "2024-01-11");
        assert_eq!(record.notes.as_deref(), Some("tudo certo"));
        assert_eq!(record.found_objects.len(), 1);
        assert_eq!(record.patrols[0].text.as_deref(), Some("ronda"));
    }

    #[test]
    fn test_found_objects_follow_form_order() {
        let record = normalize(submission(json!({
            "objects": json!({
                "NENHUMA DAS OPÇÕES": { "marcado": true, "outros": "lanterna" },
                "RADIO": true,
                "CELULAR": true,
                "cones": { "marcado": false, "quantidade": "abc" }
            })
            .to_string()
        })))
        .unwrap();

        assert_eq!(
            record.found_objects,
            vec![
                FoundObject::Quantity {
                    label: "cones".to_string(),
                    present: false,
                    quantity: 0,
                },
                FoundObject::Flag {
                    label: "CELULAR".to_string(),
                    present: true,
                },
                FoundObject::Unrecognized {
                    key: "RADIO".to_string(),
                    value: json!(true),
                },
                FoundObject::Other {
                    label: "NENHUMA DAS OPÇÕES".to_string(),
                    present: true,
                    details: "lanterna".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_patrols_catalog_order_then_unknown() {
        let record = normalize(submission(json!({
            "patrols": {
                "SITIO NOVO": "ronda extra",
                "centro": { "primeiro": "  " },
                "DISTRITO BOCA DA MATA": { "primeiro": "sem alteracoes" }
            }
        })))
        .unwrap();

        let keys: Vec<&str> = record.patrols.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["DISTRITO BOCA DA MATA", "CENTRO", "SITIO NOVO"]);
        assert_eq!(record.patrols[1].text, None);
        assert!(!record.patrols[2].in_catalog);
    }

    #[test]
    fn test_incidents_fold_onto_catalog() {
        let record = normalize(submission(json!({
            "ocorrencias": json!({
                "furto / roubo": { "descricao": "bicicleta levada da praça" },
                "Perturbação do sossego": { "primeiro": "som alto" },
                "ACIDENTE DE TRÂNSITO": { "descricao": "" },
                "ANIMAL SOLTO": "cavalo na pista"
            })
            .to_string()
        })))
        .unwrap();

        let keys: Vec<&str> = record.incidents.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                INCIDENT_CATEGORIES[0],
                INCIDENT_CATEGORIES[1],
                INCIDENT_CATEGORIES[3],
                "ANIMAL SOLTO"
            ]
        );

        let texts: Vec<Option<&str>> = record.incidents.iter().map(|i| i.text.as_deref()).collect();
        assert_eq!(
            texts,
            vec![
                Some("som alto"),
                None,
                Some("bicicleta levada da praça"),
                Some("cavalo na pista")
            ]
        );
        assert!(record.incidents[..3].iter().all(|i| i.in_catalog));
        assert!(!record.incidents[3].in_catalog);
    }

    #[test]
    fn test_attachment_names_are_sanitized() {
        let raw = RawSubmission {
            images: vec![
                UploadedFile {
                    file_name: Some("../../secret/IMG_1.jpg".to_string()),
                    data: vec![1, 2, 3],
                },
                UploadedFile {
                    file_name: None,
                    data: vec![4],
                },
            ],
            ..Default::default()
        };

        let record = normalize(raw).unwrap();
        assert_eq!(record.images[0].filename, "IMG_1.jpg");
        assert_eq!(record.images[1].filename, "arquivo-2");
        assert_eq!(record.attachments_size(), 4);
    }
}
