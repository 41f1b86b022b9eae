//! Serializes a [`DocumentLayout`] into PDF bytes with lopdf.
//!
//! Text uses the standard Helvetica faces, so no font program is embedded.
//! Nothing time-dependent is written: the same layout always yields the same
//! bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::layout::{DocumentLayout, FontStyle, ImageBox, PlacedText, PAGE_HEIGHT, PAGE_WIDTH};
use super::RenderError;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const LOGO_NAME: &str = "Im1";

/// Decoded logo pixels, 8-bit RGB
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Map a character to its WinAnsiEncoding byte, `?` when it has none
pub fn win_ansi_byte(c: char) -> u8 {
    match c {
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        // Latin-1 maps onto itself, apart from the C1 control range
        c if (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c) => c as u8,
        _ => b'?',
    }
}

pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn font_name(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => REGULAR_FONT,
        FontStyle::Bold => BOLD_FONT,
    }
}

/// Points rounded to whole units
fn pt(value: f32) -> Object {
    Object::Integer(value.round() as i64)
}

fn text_operations(text: &PlacedText) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font_name(text.style).into()), pt(text.size)],
        ),
        Operation::new("Td", vec![pt(text.x), pt(text.y)]),
        Operation::new(
            "Tj",
            vec![Object::String(
                encode_win_ansi(&text.text),
                StringFormat::Literal,
            )],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn image_operations(image: &ImageBox) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                pt(image.width),
                Object::Integer(0),
                Object::Integer(0),
                pt(image.height),
                pt(image.x),
                pt(image.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(LOGO_NAME.into())]),
        Operation::new("Q", vec![]),
    ]
}

fn font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Write the layout out as a complete PDF file
pub fn write_pdf(layout: &DocumentLayout, logo: Option<&RgbImage>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = font(&mut doc, "Helvetica");
    let bold_id = font(&mut doc, "Helvetica-Bold");

    let mut resources = dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    };

    if let Some(image) = logo {
        let xobject = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            image.pixels.clone(),
        );
        let image_id = doc.add_object(xobject);
        resources.set("XObject", dictionary! { LOGO_NAME => image_id });
    }

    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let mut operations = Vec::new();
        if let (Some(image_box), Some(_)) = (page.logo.as_ref(), logo) {
            operations.extend(image_operations(image_box));
        }
        for text in &page.texts {
            operations.extend(text_operations(text));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![pt(0.0), pt(0.0), pt(PAGE_WIDTH), pt(PAGE_HEIGHT)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Write(e.to_string()))?;

    Ok(buffer)
}
