use crate::record::{COLUMNS, LoadRecord};

/// Header plus one line per record; RFC 4180 quoting, LF line endings.
pub fn to_csv(records: &[LoadRecord]) -> Vec<u8> {
    let mut out = String::new();
    push_line(&mut out, COLUMNS.iter().copied());
    for record in records {
        push_line(&mut out, record.to_row().into_iter());
    }
    out.into_bytes()
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if cell.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
