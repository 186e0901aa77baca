//! Minimal Office Open XML workbook writer: one worksheet, inline strings.

use super::EXCEL_SHEET_NAME;
use crate::analytics::parse_rate;
use crate::error::Result;
use crate::record::{COLUMNS, LoadRecord};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const RATE_COLUMN: usize = 5;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Build an `.xlsx` snapshot: header row plus one row per record.
pub fn to_xlsx(records: &[LoadRecord]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;
    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;
    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(&workbook_xml()?)?;
    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(&sheet_xml(records)?)?;

    Ok(zip.finish()?.into_inner())
}

fn workbook_xml() -> Result<Vec<u8>> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    w.write_event(Event::Start(
        BytesStart::new("workbook").with_attributes([("xmlns", MAIN_NS), ("xmlns:r", REL_NS)]),
    ))?;
    w.write_event(Event::Start(BytesStart::new("sheets")))?;
    w.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
        ("name", EXCEL_SHEET_NAME),
        ("sheetId", "1"),
        ("r:id", "rId1"),
    ])))?;
    w.write_event(Event::End(BytesEnd::new("sheets")))?;
    w.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(w.into_inner())
}

fn sheet_xml(records: &[LoadRecord]) -> Result<Vec<u8>> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    w.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)]),
    ))?;
    w.write_event(Event::Start(BytesStart::new("sheetData")))?;

    write_row(&mut w, 1, &COLUMNS, false)?;
    for (i, record) in records.iter().enumerate() {
        write_row(&mut w, i + 2, &record.to_row(), true)?;
    }

    w.write_event(Event::End(BytesEnd::new("sheetData")))?;
    w.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(w.into_inner())
}

fn write_row(w: &mut Writer<Vec<u8>>, row: usize, cells: &[&str], data: bool) -> Result<()> {
    let row_ref = row.to_string();
    w.write_event(Event::Start(
        BytesStart::new("row").with_attributes([("r", row_ref.as_str())]),
    ))?;

    for (col, value) in cells.iter().enumerate() {
        let cell_ref = format!("{}{row}", column_letter(col));
        if data && col == RATE_COLUMN && is_number(value) {
            w.write_event(Event::Start(
                BytesStart::new("c").with_attributes([("r", cell_ref.as_str())]),
            ))?;
            w.write_event(Event::Start(BytesStart::new("v")))?;
            w.write_event(Event::Text(BytesText::new(&parse_rate(value).to_string())))?;
            w.write_event(Event::End(BytesEnd::new("v")))?;
        } else {
            w.write_event(Event::Start(
                BytesStart::new("c")
                    .with_attributes([("r", cell_ref.as_str()), ("t", "inlineStr")]),
            ))?;
            w.write_event(Event::Start(BytesStart::new("is")))?;
            w.write_event(Event::Start(
                BytesStart::new("t").with_attributes([("xml:space", "preserve")]),
            ))?;
            w.write_event(Event::Text(BytesText::new(value)))?;
            w.write_event(Event::End(BytesEnd::new("t")))?;
            w.write_event(Event::End(BytesEnd::new("is")))?;
        }
        w.write_event(Event::End(BytesEnd::new("c")))?;
    }

    w.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn is_number(value: &str) -> bool {
    let cleaned: String = value.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.trim().parse::<f64>().is_ok_and(f64::is_finite)
}

/// Zero-based column index to spreadsheet letters (0 -> A, 26 -> AA).
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_row_count_matches_records() {
        let recs = vec![
            sample("R-1", "a.pdf", "470.00"),
            sample("R-2", "b.pdf", "400"),
            sample("R-3", "c.pdf", "TBD"),
        ];
        let bytes = to_xlsx(&recs).unwrap();
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert_eq!(sheet.matches("<row ").count(), recs.len() + 1);
        assert!(sheet.contains("<c r=\"F2\"><v>470</v></c>"));
        assert!(sheet.contains(">TBD</t>"));
        assert!(sheet.contains(">Reference #</t>"));
    }

    #[test]
    fn test_sheet_name_and_escaping() {
        let mut rec = sample("R-1", "a&b.pdf", "470.00");
        rec.notes = "<check>".to_string();
        let bytes = to_xlsx(&[rec]).unwrap();
        let workbook = read_part(&bytes, "xl/workbook.xml");
        assert!(workbook.contains("name=\"RateCons\""));
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains("a&amp;b.pdf"));
        assert!(sheet.contains("&lt;check&gt;"));
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(8), "I");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }
}
