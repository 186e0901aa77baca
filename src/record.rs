// src/record.rs

use std::collections::HashMap;

/// Sheet header, in column order.
pub const COLUMNS: [&str; 9] = [
    "Date Added",
    "Customer",
    "Reference #",
    "Equipment",
    "Container #",
    "Rate",
    "File",
    "Status",
    "Notes",
];

pub const STATUS_ACTIVE: &str = "Active";

/// One processed load, one spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRecord {
    pub date_added: String,
    pub customer: String,
    pub reference: String,
    pub equipment: String,
    pub container: String,
    pub rate: String,
    pub file: String,
    pub status: String,
    pub notes: String,
}

impl LoadRecord {
    /// Cells in `COLUMNS` order.
    pub fn to_row(&self) -> [&str; 9] {
        [
            &self.date_added,
            &self.customer,
            &self.reference,
            &self.equipment,
            &self.container,
            &self.rate,
            &self.file,
            &self.status,
            &self.notes,
        ]
    }

    /// Build a record from cells in `COLUMNS` order. Short rows pad with empty strings.
    pub fn from_row(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            date_added: cell(0),
            customer: cell(1),
            reference: cell(2),
            equipment: cell(3),
            container: cell(4),
            rate: cell(5),
            file: cell(6),
            status: cell(7),
            notes: cell(8),
        }
    }
}

/// Map a header row plus data rows to records, matching cells to columns
/// by header name. Unknown headers are ignored, missing ones read as empty.
pub fn records_from_table(table: &[Vec<String>]) -> Vec<LoadRecord> {
    let Some((header, rows)) = table.split_first() else {
        return Vec::new();
    };

    let positions: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    rows.iter()
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| {
            let ordered: Vec<String> = COLUMNS
                .iter()
                .map(|col| {
                    positions
                        .get(col)
                        .and_then(|&i| row.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            LoadRecord::from_row(&ordered)
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample(reference: &str, file: &str, rate: &str) -> LoadRecord {
    LoadRecord {
        date_added: "2025-03-14".to_string(),
        customer: "Covenant".to_string(),
        reference: reference.to_string(),
        equipment: "40' Container".to_string(),
        container: "MSCU1234567".to_string(),
        rate: rate.to_string(),
        file: file.to_string(),
        status: STATUS_ACTIVE.to_string(),
        notes: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_row_roundtrip() {
        let rec = sample("R-100", "a.pdf", "470.00");
        let cells: Vec<String> = rec.to_row().iter().map(|c| c.to_string()).collect();
        assert_eq!(LoadRecord::from_row(&cells), rec);
    }

    #[test]
    fn test_table_maps_by_header_name() {
        let table = vec![
            strings(&["Reference #", "Rate", "File", "Extra"]),
            strings(&["R-1", "435", "one.pdf", "ignored"]),
            strings(&["R-2"]),
        ];
        let recs = records_from_table(&table);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].reference, "R-1");
        assert_eq!(recs[0].rate, "435");
        assert_eq!(recs[0].file, "one.pdf");
        assert_eq!(recs[0].customer, "");
        assert_eq!(recs[1].reference, "R-2");
        assert_eq!(recs[1].file, "");
    }

    #[test]
    fn test_empty_table_and_blank_rows() {
        assert!(records_from_table(&[]).is_empty());
        let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        assert!(records_from_table(&[header.clone()]).is_empty());
        assert!(records_from_table(&[header, strings(&["", " "])]).is_empty());
    }
}
