//! Bundles the rendered document and the uploaded media into one ZIP.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use thiserror::Error;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::core::error::AppError;
use crate::features::shift_reports::models::{Attachment, ReportRecord};
use crate::shared::constants::MSG_ARCHIVE_TOO_LARGE;

const COMPRESSION_LEVEL: i64 = 9;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Archive of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PackageError> for AppError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::TooLarge { .. } => {
                AppError::PayloadTooLarge(MSG_ARCHIVE_TOO_LARGE.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// Push-based ZIP writer.
///
/// Entries are appended one at a time; the bytes only become available through
/// [`ArchiveWriter::finish`], so a half-written archive can never escape.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: HashSet<String>,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        // Fixed timestamp so identical inputs produce identical archives
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .last_modified_time(DateTime::default());

        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
            entries: HashSet::new(),
        }
    }

    /// Write one entry, returning the name it was stored under
    fn append(&mut self, name: String, data: &[u8]) -> Result<String, PackageError> {
        let name = self.unique_name(name);
        self.zip.start_file(name.as_str(), self.options)?;
        self.zip.write_all(data)?;
        self.entries.insert(name.clone());
        Ok(name)
    }

    /// Append the rendered report at the archive root
    pub fn append_document(&mut self, file_name: &str, document: &[u8]) -> Result<String, PackageError> {
        self.append(file_name.to_string(), document)
    }

    /// Append an upload under its kind's folder
    pub fn append_attachment(&mut self, attachment: &Attachment) -> Result<String, PackageError> {
        let name = format!("{}/{}", attachment.kind.folder(), attachment.filename);
        self.append(name, &attachment.data)
    }

    /// `foto.jpg` → `foto (2).jpg`, `foto (3).jpg`, … until the name is free
    fn unique_name(&self, name: String) -> String {
        if !self.entries.contains(&name) {
            return name;
        }

        let (folder, file) = match name.rsplit_once('/') {
            Some((folder, file)) => (Some(folder), file),
            None => (None, name.as_str()),
        };
        let (stem, extension) = match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file, None),
        };

        let mut n = 2;
        loop {
            let file = match extension {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            let candidate = match folder {
                Some(folder) => format!("{}/{}", folder, file),
                None => file,
            };
            if !self.entries.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn finish(self) -> Result<Vec<u8>, PackageError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ArchivePackager {
    ceiling: usize,
}

impl ArchivePackager {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    /// Reject inputs whose raw size already exceeds the ceiling
    pub fn preflight(&self, raw_size: usize) -> Result<(), PackageError> {
        if raw_size > self.ceiling {
            return Err(PackageError::TooLarge {
                size: raw_size,
                limit: self.ceiling,
            });
        }
        Ok(())
    }

    /// Build `{base}.pdf` plus `IMAGES/` and `VIDEOS/` entries.
    ///
    /// Fails with [`PackageError::TooLarge`] before compressing anything when
    /// the raw inputs already exceed the ceiling, and again if the finished
    /// archive does.
    pub fn package(
        &self,
        document: &[u8],
        base_name: &str,
        record: &ReportRecord,
    ) -> Result<Vec<u8>, PackageError> {
        let raw_size = document.len() + record.attachments_size();
        self.preflight(raw_size)?;

        let mut writer = ArchiveWriter::new();
        writer.append_document(&format!("{}.pdf", base_name), document)?;
        for attachment in record.attachments() {
            let stored = writer.append_attachment(attachment)?;
            debug!("Archived {} ({} bytes)", stored, attachment.len());
        }
        let archive = writer.finish()?;

        if archive.len() > self.ceiling {
            return Err(PackageError::TooLarge {
                size: archive.len(),
                limit: self.ceiling,
            });
        }

        info!(
            "Packaged archive: entries={}, raw_bytes={}, archive_bytes={}",
            1 + record.images.len() + record.videos.len(),
            raw_size,
            archive.len()
        );

        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shift_reports::models::AttachmentKind;
    use std::io::Read;
    use zip::ZipArchive;

    fn attachment(kind: AttachmentKind, filename: &str, data: Vec<u8>) -> Attachment {
        Attachment {
            kind,
            filename: filename.to_string(),
            data,
        }
    }

    fn record(images: Vec<Attachment>, videos: Vec<Attachment>) -> ReportRecord {
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
            images,
            videos,
        }
    }

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_layout_document_first_then_images_then_videos() {
        let record = record(
            vec![
                attachment(AttachmentKind::Image, "a.jpg", vec![1; 64]),
                attachment(AttachmentKind::Image, "b.png", vec![2; 64]),
            ],
            vec![attachment(AttachmentKind::Video, "c.mp4", vec![3; 64])],
        );

        let archive = ArchivePackager::new(1024 * 1024)
            .package(b"%PDF-1.5 fake", "JOAO-1234-10-01-2024", &record)
            .unwrap();

        assert_eq!(
            entry_names(&archive),
            vec![
                "JOAO-1234-10-01-2024.pdf",
                "IMAGES/a.jpg",
                "IMAGES/b.png",
                "VIDEOS/c.mp4"
            ]
        );
    }

    #[test]
    fn test_attachment_bytes_are_not_truncated() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let record = record(
            vec![attachment(AttachmentKind::Image, "big.jpg", data.clone())],
            Vec::new(),
        );

        let archive = ArchivePackager::new(1024 * 1024)
            .package(b"pdf", "R", &record)
            .unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut file = zip.by_name("IMAGES/big.jpg").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
        let mut stored = Vec::new();
        file.read_to_end(&mut stored).unwrap();
        assert_eq!(stored, data);
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let record = record(
            vec![
                attachment(AttachmentKind::Image, "foto.jpg", vec![1]),
                attachment(AttachmentKind::Image, "foto.jpg", vec![2]),
                attachment(AttachmentKind::Image, "foto.jpg", vec![3]),
                attachment(AttachmentKind::Image, "arquivo", vec![4]),
                attachment(AttachmentKind::Image, "arquivo", vec![5]),
            ],
            vec![attachment(AttachmentKind::Video, "foto.jpg", vec![6])],
        );

        let archive = ArchivePackager::new(64 * 1024)
            .package(b"pdf", "R", &record)
            .unwrap();

        assert_eq!(
            entry_names(&archive),
            vec![
                "R.pdf",
                "IMAGES/foto.jpg",
                "IMAGES/foto (2).jpg",
                "IMAGES/foto (3).jpg",
                "IMAGES/arquivo",
                "IMAGES/arquivo (2)",
                "VIDEOS/foto.jpg",
            ]
        );
    }

    #[test]
    fn test_raw_size_over_ceiling_is_rejected() {
        let record = record(
            vec![attachment(AttachmentKind::Image, "a.jpg", vec![0; 2048])],
            Vec::new(),
        );

        let err = ArchivePackager::new(1024)
            .package(b"pdf", "R", &record)
            .unwrap_err();

        assert!(matches!(
            err,
            PackageError::TooLarge {
                size: 2051,
                limit: 1024
            }
        ));
    }

    #[test]
    fn test_archive_over_ceiling_is_rejected() {
        // Raw inputs fit exactly, but incompressible data plus ZIP headers do not
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let data: Vec<u8> = (0..4096)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 32) as u8
            })
            .collect();
        let record = record(
            vec![attachment(AttachmentKind::Image, "noise.bin", data)],
            Vec::new(),
        );
        let raw_size = 3 + record.attachments_size();

        let packager = ArchivePackager::new(raw_size);
        assert!(packager.preflight(raw_size).is_ok());

        let err = packager.package(b"pdf", "R", &record).unwrap_err();
        match err {
            PackageError::TooLarge { size, limit } => {
                assert_eq!(limit, raw_size);
                assert!(size > raw_size);
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_packaging_is_deterministic() {
        let record = record(
            vec![attachment(AttachmentKind::Image, "a.jpg", vec![7; 100])],
            Vec::new(),
        );
        let packager = ArchivePackager::new(4096);

        assert_eq!(
            packager.package(b"pdf", "R", &record).unwrap(),
            packager.package(b"pdf", "R", &record).unwrap()
        );
    }

    #[test]
    fn test_too_large_maps_to_payload_too_large() {
        let err: AppError = PackageError::TooLarge {
            size: 2,
            limit: 1,
        }
        .into();
        assert!(matches!(err, AppError::PayloadTooLarge(msg) if msg == MSG_ARCHIVE_TOO_LARGE));
    }
}
