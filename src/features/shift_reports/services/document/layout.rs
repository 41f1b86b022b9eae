//! Two-pass page layout for the shift report.
//!
//! The first pass turns a [`ReportRecord`] into a flat list of logical lines.
//! The second pass wraps and paginates them, and only once every page exists
//! are the "PÁGINA X DE Y" footers placed, so the total is always the real one.

use crate::features::shift_reports::models::catalog::{CONES_KEY, CONES_UNIT_LABEL};
use crate::features::shift_reports::models::{FoundObject, Narrative, ReportRecord};
use crate::shared::constants::PLACEHOLDER;

use super::metrics::{text_width, wrap};

/// US Letter, in points
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 72.0;

const BODY_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 18.0;
const ORGANIZATION_SIZE: f32 = 14.0;
const FOOTER_SIZE: f32 = 9.0;
const LINE_SPACING: f32 = 1.25;
const SECTION_GAP: f32 = BODY_SIZE;

/// Baseline of the page footer
const FOOTER_BASELINE: f32 = MARGIN / 2.0;

const LOGO_MAX_WIDTH: f32 = 120.0;
const LOGO_MAX_HEIGHT: f32 = 60.0;

pub const REPORT_TITLE: &str = "RELATÓRIO DE PLANTÃO";
const BULLET: &str = "- ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

/// Logical line produced by the content pass
#[derive(Debug, Clone)]
enum Block {
    Text {
        text: String,
        style: FontStyle,
        size: f32,
        align: Align,
    },
    Gap(f32),
}

/// A run of text positioned on a page (baseline origin, points)
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub style: FontStyle,
}

/// Where the logo is drawn (lower-left corner and size, points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub texts: Vec<PlacedText>,
    pub logo: Option<ImageBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub pages: Vec<PageLayout>,
}

/// Uppercased value, or the placeholder when blank
fn display(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

fn heading(text: &str, size: f32, align: Align) -> Block {
    Block::Text {
        text: text.to_string(),
        style: FontStyle::Bold,
        size,
        align,
    }
}

fn body(text: String) -> Block {
    Block::Text {
        text,
        style: FontStyle::Regular,
        size: BODY_SIZE,
        align: Align::Left,
    }
}

fn found_object_line(object: &FoundObject) -> Option<String> {
    if !object.is_marked() {
        return None;
    }

    let line = match object {
        FoundObject::Quantity {
            label, quantity, ..
        } if label == CONES_KEY => {
            format!("{}{} {}", BULLET, quantity, CONES_UNIT_LABEL)
        }
        FoundObject::Quantity {
            label, quantity, ..
        } => format!("{}{} {}", BULLET, quantity, display(label)),
        FoundObject::Flag { label, .. } => format!("{}{}", BULLET, display(label)),
        FoundObject::Other { label, details, .. } => {
            if details.trim().is_empty() {
                format!("{}{}", BULLET, display(label))
            } else {
                format!("{}{}", BULLET, display(details))
            }
        }
        FoundObject::Unrecognized { key, .. } => format!("{}{}", BULLET, display(key)),
    };

    Some(line)
}

fn narrative_line(narrative: &Narrative) -> String {
    format!(
        "{}{}: {}",
        BULLET,
        display(&narrative.key),
        display(narrative.text.as_deref().unwrap_or_default())
    )
}

/// Section title followed by its lines, or a placeholder line when empty
fn section(blocks: &mut Vec<Block>, title: &str, lines: Vec<String>) {
    blocks.push(Block::Gap(SECTION_GAP));
    blocks.push(heading(title, BODY_SIZE, Align::Left));
    if lines.is_empty() {
        blocks.push(body(PLACEHOLDER.to_string()));
    } else {
        blocks.extend(lines.into_iter().map(body));
    }
}

/// First pass: the report content as logical lines, in reading order
fn content_blocks(record: &ReportRecord, organization: &str) -> Vec<Block> {
    let mut blocks = vec![
        heading(&display(organization), ORGANIZATION_SIZE, Align::Center),
        heading(REPORT_TITLE, TITLE_SIZE, Align::Center),
        Block::Gap(SECTION_GAP),
        body(format!("NOME: {}", display(&record.name))),
        body(format!("MATRÍCULA: {}", display(&record.registration_id))),
        body(format!(
            "DATA INÍCIO: {} - HORA: {}",
            display(&record.start_date),
            display(&record.start_time)
        )),
        body(format!(
            "DATA SAÍDA: {} - HORA: {}",
            display(&record.end_date),
            display(&record.end_time)
        )),
    ];

    section(
        &mut blocks,
        "OBJETOS ENCONTRADOS NA BASE:",
        record
            .found_objects
            .iter()
            .filter_map(found_object_line)
            .collect(),
    );

    section(
        &mut blocks,
        "PATRULHAMENTO PREVENTIVO:",
        record.patrols.iter().map(narrative_line).collect(),
    );

    section(
        &mut blocks,
        "OCORRÊNCIAS:",
        record.incidents.iter().map(narrative_line).collect(),
    );

    // Observations keep the officer's line breaks
    let notes = record
        .notes
        .as_deref()
        .map(|notes| {
            notes
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_uppercase)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    section(&mut blocks, "OBSERVAÇÕES:", notes);

    blocks
}

/// Fit the logo into its box, keeping the aspect ratio
fn logo_box(dimensions: (u32, u32)) -> Option<ImageBox> {
    let (w, h) = dimensions;
    if w == 0 || h == 0 {
        return None;
    }

    let scale = (LOGO_MAX_WIDTH / w as f32).min(LOGO_MAX_HEIGHT / h as f32);
    let width = w as f32 * scale;
    let height = h as f32 * scale;

    Some(ImageBox {
        x: (PAGE_WIDTH - width) / 2.0,
        y: PAGE_HEIGHT - MARGIN - height,
        width,
        height,
    })
}

struct Paginator {
    pages: Vec<PageLayout>,
    current: PageLayout,
    cursor: f32,
}

impl Paginator {
    /// Lowest baseline body text may use; below it sits the footer
    const BOTTOM: f32 = MARGIN;
    const TOP: f32 = PAGE_HEIGHT - MARGIN;

    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: PageLayout::default(),
            cursor: Self::TOP,
        }
    }

    fn is_page_empty(&self) -> bool {
        self.current.texts.is_empty() && self.current.logo.is_none()
    }

    fn break_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.cursor = Self::TOP;
    }

    fn place_logo(&mut self, image: ImageBox) {
        self.current.logo = Some(image);
        self.cursor = image.y - SECTION_GAP / 2.0;
    }

    fn gap(&mut self, height: f32) {
        // Gaps never carry over to the top of a new page
        if self.is_page_empty() {
            return;
        }
        self.cursor -= height;
    }

    fn line(&mut self, text: String, style: FontStyle, size: f32, align: Align) {
        let advance = size * LINE_SPACING;
        if self.cursor - advance < Self::BOTTOM {
            self.break_page();
        }

        self.cursor -= advance;
        let x = match align {
            Align::Left => MARGIN,
            Align::Center => ((PAGE_WIDTH - text_width(&text, style, size)) / 2.0).max(MARGIN),
        };

        self.current.texts.push(PlacedText {
            text,
            x,
            y: self.cursor,
            size,
            style,
        });
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.is_page_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Lay out a report.
///
/// `logo` holds the pixel dimensions of the logo image when one is available.
pub fn layout(
    record: &ReportRecord,
    organization: &str,
    logo: Option<(u32, u32)>,
) -> DocumentLayout {
    let max_width = PAGE_WIDTH - 2.0 * MARGIN;
    let mut paginator = Paginator::new();

    if let Some(image) = logo.and_then(logo_box) {
        paginator.place_logo(image);
    }

    for block in content_blocks(record, organization) {
        match block {
            Block::Gap(height) => paginator.gap(height),
            Block::Text {
                text,
                style,
                size,
                align,
            } => {
                for line in wrap(&text, style, size, max_width) {
                    paginator.line(line, style, size, align);
                }
            }
        }
    }

    let mut pages = paginator.finish();

    // Third step: the page count is final, number the pages
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        let text = format!("PÁGINA {} DE {}", index + 1, total);
        let x = (PAGE_WIDTH - text_width(&text, FontStyle::Regular, FOOTER_SIZE)) / 2.0;
        page.texts.push(PlacedText {
            text,
            x,
            y: FOOTER_BASELINE,
            size: FOOTER_SIZE,
            style: FontStyle::Regular,
        });
    }

    DocumentLayout { pages }
}

#[cfg(test)]
impl DocumentLayout {
    /// Every text run in reading order
    pub fn texts(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.texts.iter().map(|t| t.text.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shift_reports::models::catalog::{INCIDENT_CATEGORIES, NONE_OF_THE_ABOVE_KEY};
    use serde_json::json;

    fn empty_record() -> ReportRecord {
        ReportRecord {
            name: String::new(),
            registration_id: String::new(),
            start_date: String::new(),
            start_time: String::new(),
            end_date: String::new(),
            end_time: String::new(),
            found_objects: Vec::new(),
            patrols: Vec::new(),
            incidents: Vec::new(),
            notes: None,
            images: Vec::new(),
            videos: Vec::new(),
        }
    }

    fn zone(key: &str, text: Option<&str>) -> Narrative {
        Narrative {
            key: key.to_string(),
            text: text.map(str::to_string),
            in_catalog: true,
        }
    }

    #[test]
    fn test_empty_record_uses_placeholders() {
        let doc = layout(&empty_record(), "ORG", None);
        let texts = doc.texts();

        assert!(texts.contains(&"NOME: -"));
        assert!(texts.contains(&"MATRÍCULA: -"));
        assert!(texts.contains(&"DATA INÍCIO: - - HORA: -"));
        assert!(texts.contains(&"DATA SAÍDA: - - HORA: -"));

        // Every section heading is followed by a placeholder line
        for title in [
            "OBJETOS ENCONTRADOS NA BASE:",
            "PATRULHAMENTO PREVENTIVO:",
            "OCORRÊNCIAS:",
            "OBSERVAÇÕES:",
        ] {
            let pos = texts.iter().position(|t| *t == title).unwrap();
            assert_eq!(texts[pos + 1], "-");
        }

        assert!(texts.iter().all(|t| !t.trim().is_empty()));
        assert!(texts.iter().all(|t| !t.ends_with(": ")));
    }

    #[test]
    fn test_values_are_uppercased() {
        let mut record = empty_record();
        record.name = "João da Silva".to_string();
        record.notes = Some("viatura abastecida\n\nsem alterações".to_string());

        let doc = layout(&record, "org", None);
        let texts = doc.texts();

        assert!(texts.contains(&"NOME: JOÃO DA SILVA"));
        assert!(texts.contains(&"VIATURA ABASTECIDA"));
        assert!(texts.contains(&"SEM ALTERAÇÕES"));
        assert_eq!(texts[0], "ORG");
        assert_eq!(texts[1], REPORT_TITLE);
        // The record itself keeps the original case
        assert_eq!(record.name, "João da Silva");
    }

    #[test]
    fn test_found_objects_lines() {
        let mut record = empty_record();
        record.found_objects = vec![
            FoundObject::Quantity {
                label: CONES_KEY.to_string(),
                present: true,
                quantity: 5,
            },
            FoundObject::Flag {
                label: "CELULAR".to_string(),
                present: true,
            },
            FoundObject::Flag {
                label: "CAMÊRA CORPORAL".to_string(),
                present: false,
            },
            FoundObject::Unrecognized {
                key: "radio".to_string(),
                value: json!(true),
            },
            FoundObject::Unrecognized {
                key: "lanterna".to_string(),
                value: json!(false),
            },
            FoundObject::Other {
                label: NONE_OF_THE_ABOVE_KEY.to_string(),
                present: true,
                details: "colete balístico".to_string(),
            },
        ];

        let texts = layout(&record, "ORG", None).texts().join("\n");
        assert!(texts.contains("- 5 CONE(S)"));
        assert!(texts.contains("- CELULAR"));
        assert!(!texts.contains("CAMÊRA CORPORAL"));
        assert!(texts.contains("- RADIO"));
        assert!(!texts.contains("LANTERNA"));
        assert!(texts.contains("- COLETE BALÍSTICO"));
    }

    #[test]
    fn test_none_of_the_above_without_details_prints_label() {
        let mut record = empty_record();
        record.found_objects = vec![FoundObject::Other {
            label: NONE_OF_THE_ABOVE_KEY.to_string(),
            present: true,
            details: "  ".to_string(),
        }];

        let doc = layout(&record, "ORG", None);
        let texts = doc.texts();
        assert!(texts.contains(&"- NENHUMA DAS OPÇÕES"));
    }

    #[test]
    fn test_unmarked_cones_are_omitted() {
        let mut record = empty_record();
        record.found_objects = vec![FoundObject::Quantity {
            label: CONES_KEY.to_string(),
            present: false,
            quantity: 3,
        }];

        let doc = layout(&record, "ORG", None);
        let texts = doc.texts();
        assert!(!texts.iter().any(|t| t.contains("CONE(S)")));
        let pos = texts
            .iter()
            .position(|t| *t == "OBJETOS ENCONTRADOS NA BASE:")
            .unwrap();
        assert_eq!(texts[pos + 1], "-");
    }

    #[test]
    fn test_every_present_zone_rendered_once() {
        let mut record = empty_record();
        record.patrols = vec![
            zone("DISTRITO BOCA DA MATA", None),
            zone("CENTRO", Some("patrulha sem ocorrencias")),
        ];

        let doc = layout(&record, "ORG", None);
        let texts = doc.texts();
        assert_eq!(
            texts
                .iter()
                .filter(|t| **t == "- CENTRO: PATRULHA SEM OCORRENCIAS")
                .count(),
            1
        );
        assert_eq!(
            texts
                .iter()
                .filter(|t| **t == "- DISTRITO BOCA DA MATA: -")
                .count(),
            1
        );
    }

    #[test]
    fn test_incidents_section_lines() {
        let mut record = empty_record();
        record.incidents = vec![
            zone(INCIDENT_CATEGORIES[0], Some("som alto na praça")),
            zone(INCIDENT_CATEGORIES[1], None),
        ];

        let doc = layout(&record, "ORG", None);
        let texts = doc.texts();
        let pos = texts.iter().position(|t| *t == "OCORRÊNCIAS:").unwrap();

        assert_eq!(texts[pos + 1], "- PERTURBAÇÃO DO SOSSEGO: SOM ALTO NA PRAÇA");
        assert_eq!(texts[pos + 2], "- ACIDENTE DE TRÂNSITO: -");
        assert_eq!(texts[pos + 3], "OBSERVAÇÕES:");
    }

    #[test]
    fn test_long_notes_paginate_with_true_page_count() {
        let mut record = empty_record();
        record.notes = Some(
            (1..=120)
                .map(|i| format!("linha de observação número {}", i))
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let doc = layout(&record, "ORG", None);
        let total = doc.pages.len();
        assert!(total >= 3);

        for (index, page) in doc.pages.iter().enumerate() {
            let footer = page.texts.last().unwrap();
            assert_eq!(footer.text, format!("PÁGINA {} DE {}", index + 1, total));

            for text in &page.texts {
                assert!(text.y >= FOOTER_BASELINE);
                assert!(text.y <= PAGE_HEIGHT - MARGIN);
            }
            // Body text stays above the bottom margin
            for text in &page.texts[..page.texts.len() - 1] {
                assert!(text.y >= MARGIN);
            }
        }

        let texts = doc.texts();
        assert!(texts.contains(&"LINHA DE OBSERVAÇÃO NÚMERO 1"));
        assert!(texts.contains(&"LINHA DE OBSERVAÇÃO NÚMERO 120"));
    }

    #[test]
    fn test_single_page_footer() {
        let doc = layout(&empty_record(), "ORG", None);
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.texts().last(), Some(&"PÁGINA 1 DE 1"));
    }

    #[test]
    fn test_logo_pushes_content_down() {
        let without = layout(&empty_record(), "ORG", None);
        let with = layout(&empty_record(), "ORG", Some((400, 100)));

        let logo = with.pages[0].logo.unwrap();
        assert!((logo.width - LOGO_MAX_WIDTH).abs() < 0.01);
        assert!((logo.height - 30.0).abs() < 0.01);
        assert!(with.pages[0].texts[0].y < without.pages[0].texts[0].y);
        assert!(with.pages[0].texts[0].y < logo.y);
        assert!(without.pages[0].logo.is_none());
    }

    #[test]
    fn test_layout_is_deterministic() {
        let mut record = empty_record();
        record.name = "Maria".to_string();
        record.patrols = vec![zone("CENTRO", Some("ok"))];
        assert_eq!(
            layout(&record, "ORG", Some((10, 10))),
            layout(&record, "ORG", Some((10, 10)))
        );
    }
}
