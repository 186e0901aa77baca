// src/intake.rs

use crate::config::TrackerSettings;
use crate::error::Result;
use crate::heuristics::RateConFields;
use crate::record::{LoadRecord, STATUS_ACTIVE};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// An uploaded file: name, size on disk and raw bytes. Oversized files
/// keep their size but carry no bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl Upload {
    #[cfg(test)]
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// Read a file for intake. The size comes from metadata, so a file above
/// `max_file_size` is never loaded into memory.
pub async fn read_upload(path: &Path, max_file_size: u64) -> Result<Upload> {
    let size = tokio::fs::metadata(path).await?.len();
    let bytes = if size > max_file_size {
        warn!(file = %path.display(), size, max_file_size, "File over size limit, not reading");
        Vec::new()
    } else {
        tokio::fs::read(path).await?
    };
    Ok(Upload {
        name: file_name(path),
        size,
        bytes,
    })
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Why an upload did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    TooLarge,
    DuplicateFilename,
    UnsupportedFormat,
    DuplicateReference(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooLarge => write!(f, "File exceeds size limit."),
            SkipReason::DuplicateFilename => write!(f, "Duplicate filename."),
            SkipReason::UnsupportedFormat => write!(f, "Unsupported Format."),
            SkipReason::DuplicateReference(r) => write!(f, "Duplicate Reference # {r}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub file: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct IntakeReport {
    pub accepted: Vec<LoadRecord>,
    pub skipped: Vec<Skipped>,
}

/// Turn uploads into new records, rejecting anything whose file name or
/// reference number is already in `existing` or earlier in the same batch.
///
/// `extract` maps PDF bytes to fields; callers pass `pdf_text::extract_fields`.
pub fn process_uploads<F>(
    uploads: &[Upload],
    existing: &[LoadRecord],
    settings: &TrackerSettings,
    today: &str,
    extract: F,
) -> IntakeReport
where
    F: Fn(&[u8]) -> RateConFields,
{
    let mut report = IntakeReport::default();
    if uploads.is_empty() {
        warn!("Please upload files before processing.");
        return report;
    }

    let mut seen_files: HashSet<String> = existing.iter().map(|r| r.file.clone()).collect();
    let mut seen_refs: HashSet<String> = existing.iter().map(|r| r.reference.clone()).collect();

    for (i, upload) in uploads.iter().enumerate() {
        let span = tracing::info_span!("intake", idx = i + 1, of = uploads.len(), file = %upload.name);
        let _guard = span.enter();

        let skip = |reason: SkipReason| {
            info!(reason = %reason, "Skipped");
            Skipped {
                file: upload.name.clone(),
                reason,
            }
        };

        if upload.size > settings.max_file_size {
            report.skipped.push(skip(SkipReason::TooLarge));
            continue;
        }
        if seen_files.contains(&upload.name) {
            report.skipped.push(skip(SkipReason::DuplicateFilename));
            continue;
        }

        let fields = extract(&upload.bytes);
        if !fields.is_supported() {
            report.skipped.push(skip(SkipReason::UnsupportedFormat));
            continue;
        }
        if seen_refs.contains(&fields.reference) {
            report
                .skipped
                .push(skip(SkipReason::DuplicateReference(fields.reference.clone())));
            continue;
        }

        seen_files.insert(upload.name.clone());
        seen_refs.insert(fields.reference.clone());

        info!(reference = %fields.reference, rate = %fields.rate, "Accepted");
        report.accepted.push(LoadRecord {
            date_added: today.to_string(),
            customer: settings.default_customer.clone(),
            reference: fields.reference,
            equipment: fields.equipment,
            container: fields.container,
            rate: fields.rate,
            file: upload.name.clone(),
            status: STATUS_ACTIVE.to_string(),
            notes: String::new(),
        });
    }

    info!(
        accepted = report.accepted.len(),
        skipped = report.skipped.len(),
        "Intake complete"
    );
    report
}

/// Today's date as `YYYY-MM-DD`, UTC.
pub fn today() -> String {
    let date = time::OffsetDateTime::now_utc().date();
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}
