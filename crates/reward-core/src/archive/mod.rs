//! Resolving helper executables inside release archives
//!
//! Helper binaries are published as platform-specific archives in several
//! formats. [`Extractor::decompress_from_archive`] picks the format from the
//! archive's file name, finds the wanted executable inside it and hands back a
//! stream of its bytes.

mod platform;
mod unzip;

pub use platform::Platform;

use crate::ArchiveError;
use flate2::read::{GzDecoder, MultiGzDecoder};
use std::io::{Cursor, Read};
use xz2::read::XzDecoder;
use zip::ZipArchive;

/// Stream of one archive member's bytes. Owns the underlying archive reader;
/// drop it (or read it to the end) to release the archive.
pub type MemberStream = Box<dyn Read + Send>;

type OpenFn = fn(&Extractor, MemberStream, &str, &str) -> Result<MemberStream, ArchiveError>;

/// One supported archive format: the file-name suffixes that select it and the
/// handler that resolves a member inside it
struct ArchiveFormat {
    name: &'static str,
    suffixes: &'static [&'static str],
    open: OpenFn,
}

impl ArchiveFormat {
    fn matches(&self, archive_name: &str) -> bool {
        self.suffixes.iter().any(|s| archive_name.ends_with(s))
    }
}

/// Zip members are buffered whole, so their declared size is bounded
const MAX_ZIP_MEMBER_SIZE: u64 = 1 << 30;

/// Checked in order; the first match wins. Names matching nothing are
/// treated as already decompressed.
const FORMATS: &[ArchiveFormat] = &[
    ArchiveFormat {
        name: "zip",
        suffixes: &[".zip"],
        open: Extractor::open_zip,
    },
    ArchiveFormat {
        name: "tar.gz",
        suffixes: &[".tar.gz", ".tgz"],
        open: Extractor::open_tar_gz,
    },
    ArchiveFormat {
        name: "gzip",
        suffixes: &[".gzip", ".gz"],
        open: Extractor::open_gzip,
    },
    ArchiveFormat {
        name: "tar.xz",
        suffixes: &[".tar.xz"],
        open: Extractor::open_tar_xz,
    },
    ArchiveFormat {
        name: "xz",
        suffixes: &[".xz"],
        open: Extractor::open_xz,
    },
];

/// Name of the format selected for `archive_name`, or `None` for passthrough
pub fn detect_format(archive_name: &str) -> Option<&'static str> {
    FORMATS
        .iter()
        .find(|f| f.matches(archive_name))
        .map(|f| f.name)
}

/// Extracts helper executables, matching platform-suffixed names for
/// `platform`
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    platform: Platform,
}

impl Extractor {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Find the executable `wanted` inside `source`, whose format is chosen
    /// from the suffix of `archive_name`.
    pub fn decompress_from_archive<R>(
        &self,
        source: R,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError>
    where
        R: Read + Send + 'static,
    {
        let source: MemberStream = Box::new(source);

        match FORMATS.iter().find(|f| f.matches(archive_name)) {
            Some(format) => {
                tracing::debug!("Decompressing {} file {}", format.name, archive_name);
                (format.open)(self, source, archive_name, wanted)
            }
            None => {
                tracing::debug!("Decompression is not needed for {}", archive_name);
                Ok(source)
            }
        }
    }

    fn open_zip(
        &self,
        mut source: MemberStream,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError> {
        // Zip needs random access to the central directory
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        let mut zip = ZipArchive::new(Cursor::new(buf))?;

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            tracing::debug!("zip entry: {}", file.name());

            if file.is_dir() {
                continue;
            }

            let name = file.name().rsplit('/').next().unwrap_or_default();
            if self.platform.matches_executable(wanted, name) {
                tracing::debug!("Executable file {} was found in zip archive", file.name());
                if file.size() > MAX_ZIP_MEMBER_SIZE {
                    return Err(ArchiveError::MemberTooLarge {
                        name: file.name().to_string(),
                        size: file.size(),
                    });
                }
                let mut data = Vec::new();
                file.read_to_end(&mut data)?;
                return Ok(Box::new(Cursor::new(data)));
            }
        }

        Err(ArchiveError::MemberNotFound {
            wanted: wanted.to_string(),
            archive: archive_name.to_string(),
            found: None,
        })
    }

    fn open_tar_gz(
        &self,
        source: MemberStream,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError> {
        self.scan_tar(MultiGzDecoder::new(source), archive_name, wanted)
    }

    fn open_tar_xz(
        &self,
        source: MemberStream,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError> {
        self.scan_tar(XzDecoder::new(source), archive_name, wanted)
    }

    fn open_gzip(
        &self,
        source: MemberStream,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError> {
        let decoder = GzDecoder::new(source);

        let header = decoder.header().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not a valid gzip file", archive_name),
            )
        })?;

        let name = header
            .filename()
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();

        if !self.platform.matches_executable(wanted, &name) {
            return Err(ArchiveError::MemberNotFound {
                wanted: wanted.to_string(),
                archive: archive_name.to_string(),
                found: Some(name),
            });
        }

        tracing::debug!("Executable file {} was found in gzip file", name);
        Ok(Box::new(decoder))
    }

    fn open_xz(
        &self,
        source: MemberStream,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError> {
        // Bare xz carries no file name
        tracing::debug!(
            "Decompressed file from {} is assumed to be the executable {}",
            archive_name,
            wanted
        );
        Ok(Box::new(XzDecoder::new(source)))
    }

    /// Scan tar entries to the first matching regular file and return a
    /// stream limited to that entry's data.
    fn scan_tar<R>(
        &self,
        source: R,
        archive_name: &str,
        wanted: &str,
    ) -> Result<MemberStream, ArchiveError>
    where
        R: Read + Send + 'static,
    {
        let mut archive = tar::Archive::new(source);
        let mut member_size = None;

        for entry in archive.entries()? {
            let entry = entry?;
            if entry.header().entry_type().is_dir() {
                continue;
            }

            let path = entry.path()?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if self.platform.matches_executable(wanted, &name) {
                tracing::debug!("Executable file {} was found in tar archive", path.display());
                member_size = Some(entry.size());
                break;
            }
        }

        // The entry's header has been consumed but not its data, so the raw
        // reader is positioned at the first byte of the member.
        match member_size {
            Some(size) => Ok(Box::new(archive.into_inner().take(size))),
            None => Err(ArchiveError::MemberNotFound {
                wanted: wanted.to_string(),
                archive: archive_name.to_string(),
                found: None,
            }),
        }
    }
}
