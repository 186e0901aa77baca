// src/pdf_text.rs

use crate::error::Result;
use crate::heuristics::{self, RateConFields};
use lopdf::{Dictionary, Document, Object};
use tracing::{info, warn};

/// Result of attempting to extract text from a PDF.
#[derive(Debug)]
pub enum PdfContent {
    /// The PDF contains extractable text.
    Text(String),
    /// The PDF appears to be scanned / image-only.
    ScannedImage,
    /// Something went wrong during extraction.
    Error(String),
}

impl PdfContent {
    pub fn label(&self) -> &'static str {
        match self {
            PdfContent::Text(_) => "text",
            PdfContent::ScannedImage => "scanned",
            PdfContent::Error(_) => "error",
        }
    }
}

/// Minimum number of non-whitespace characters we expect from a
/// "real" text PDF. Below this threshold we treat it as scanned.
const MIN_TEXT_CHARS: usize = 30;

/// Share of image-only pages at which the whole document counts as scanned.
const SCANNED_PAGE_RATIO: f64 = 0.8;

/// Takes raw PDF bytes and returns `PdfContent`.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> PdfContent {
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };

    if looks_like_scanned(&doc) {
        info!("PDF structural check: likely scanned / image-only");
        return PdfContent::ScannedImage;
    }

    match pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => {
            let meaningful = text.chars().filter(|c| !c.is_whitespace()).count();
            if meaningful < MIN_TEXT_CHARS {
                info!(chars = meaningful, "Extracted text too short — treating as scanned");
                PdfContent::ScannedImage
            } else {
                info!(chars = meaningful, "Text extracted successfully");
                PdfContent::Text(text)
            }
        }
        Err(e) => {
            warn!(error = %e, "pdf-extract failed — may be scanned or corrupted");
            PdfContent::ScannedImage
        }
    }
}

/// Read the rate confirmation fields out of a PDF. Anything that isn't a
/// readable text PDF comes back as all defaults, i.e. an unsupported format.
pub fn extract_fields(pdf_bytes: &[u8]) -> RateConFields {
    match extract_text_from_pdf(pdf_bytes) {
        PdfContent::Text(text) => heuristics::extract_ratecon(&text),
        PdfContent::ScannedImage => {
            info!("No text layer — cannot read fields");
            RateConFields::default()
        }
        PdfContent::Error(e) => {
            tracing::error!(error = %e, "PDF extraction error");
            RateConFields::default()
        }
    }
}

/// Debug a single PDF: classification, the start of its text, and the fields we read.
///
/// Usage: `ratecon inspect <file.pdf>`
pub fn inspect_pdf(name: &str, pdf_bytes: &[u8]) -> Result<()> {
    info!(file = %name, pdf_bytes = pdf_bytes.len(), "Inspecting PDF");

    let content = extract_text_from_pdf(pdf_bytes);
    println!("Classification: {}", content.label());
    let text = match &content {
        PdfContent::Text(text) => {
            println!("\n--- Extracted Text (first 2000 chars) ---");
            println!("{}", text.chars().take(2000).collect::<String>());
            println!("--- End ---\n");
            text
        }
        PdfContent::ScannedImage => {
            println!("\n⚠ PDF is scanned/image-only — cannot extract text.\n");
            return Ok(());
        }
        PdfContent::Error(e) => {
            println!("\n✗ Error: {e}\n");
            return Ok(());
        }
    };

    let fields = heuristics::extract_ratecon(text);
    let (filled, total) = fields.coverage();
    info!(filled, total, supported = fields.is_supported(), "Heuristic coverage");
    println!("{}", serde_json::to_string_pretty(&fields)?);
    println!("--- {filled}/{total} fields ---");
    Ok(())
}

/// Inspect the page tree: a page with image XObjects but no fonts is a scan.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false;
    }

    let image_only_pages = pages
        .values()
        .filter_map(|id| doc.get_object(*id).ok())
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|page| {
            let has_fonts = resource_entries(doc, page, b"Font") > 0;
            let has_images = resource_entries(doc, page, b"XObject") > 0;
            has_images && !has_fonts
        })
        .count();

    let total = pages.len();
    let ratio = image_only_pages as f64 / total as f64;
    info!(
        total_pages = total,
        image_only = image_only_pages,
        ratio = format!("{ratio:.2}"),
        "Scanned-page analysis"
    );

    ratio >= SCANNED_PAGE_RATIO
}

/// Number of entries in the page's `Resources/<kind>` dictionary, following references.
fn resource_entries(doc: &Document, page: &Dictionary, kind: &[u8]) -> usize {
    page.get(b"Resources")
        .ok()
        .and_then(|r| resolve_dict(doc, r))
        .and_then(|res| res.get(kind).ok())
        .and_then(|k| resolve_dict(doc, k))
        .map_or(0, |d| d.len())
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    doc.dereference(obj)
        .ok()
        .and_then(|(_, resolved)| resolved.as_dict().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    /// Single-page PDF with the given page resources and content operations.
    fn one_page_pdf(
        resources: impl FnOnce(&mut Document) -> Dictionary,
        operations: Vec<Operation>,
    ) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources = resources(&mut doc);
        let resources_id = doc.add_object(resources);
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn font_resources() -> Dictionary {
        dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Courier",
                    "Encoding" => "WinAnsiEncoding",
                },
            },
        }
    }

    fn text_ops(lines: &[&str]) -> Vec<Operation> {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 700.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                ops.push(Operation::new("Td", vec![0.into(), (-24).into()]));
            }
            ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        ops.push(Operation::new("ET", vec![]));
        ops
    }

    #[test]
    fn test_text_pdf_fields() {
        let pdf = one_page_pdf(
            |_| font_resources(),
            text_ops(&[
                "Load # LD-4471",
                "Equipment: 40HC",
                "Container #: MSKU7654321",
                "Total Rate: $1,470.00",
            ]),
        );

        let content = extract_text_from_pdf(&pdf);
        assert_eq!(content.label(), "text");

        let fields = extract_fields(&pdf);
        assert_eq!(fields.reference, "LD-4471");
        assert_eq!(fields.rate, "1470.00");
        assert_eq!(fields.container, "MSKU7654321");
        assert!(fields.equipment.starts_with("40HC"));
        assert!(inspect_pdf("ld-4471.pdf", &pdf).is_ok());
    }

    #[test]
    fn test_image_only_pdf_is_scanned() {
        let image_resources = |doc: &mut Document| {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0x80],
            ));
            dictionary! { "XObject" => dictionary! { "Im1" => image_id } }
        };
        let pdf = one_page_pdf(
            image_resources,
            vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![612.into(), 0.into(), 0.into(), 792.into(), 0.into(), 0.into()],
                ),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ],
        );

        let content = extract_text_from_pdf(&pdf);
        assert!(matches!(content, PdfContent::ScannedImage));
        assert_eq!(extract_fields(&pdf), RateConFields::default());
    }

    #[test]
    fn test_short_text_counts_as_scanned() {
        let pdf = one_page_pdf(|_| font_resources(), text_ops(&["Hi"]));
        assert!(matches!(extract_text_from_pdf(&pdf), PdfContent::ScannedImage));
    }

    #[test]
    fn test_garbage_bytes() {
        let result = extract_text_from_pdf(b"this is not a pdf");
        assert!(matches!(result, PdfContent::Error(_)));
        assert_eq!(result.label(), "error");
    }

    #[test]
    fn test_garbage_bytes_yield_unsupported_fields() {
        let fields = extract_fields(b"%PDF-garbage");
        assert!(!fields.is_supported());
        assert_eq!(fields, RateConFields::default());
    }

    #[test]
    fn test_inspect_unreadable_pdf_is_not_an_error() {
        assert!(inspect_pdf("junk.pdf", b"not a pdf").is_ok());
    }
}
