//! Bulk zip extraction with zip-slip protection

use super::Extractor;
use crate::ArchiveError;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

impl Extractor {
    /// Recreate every entry of the zip read from `source` under `dest`,
    /// returning the written paths in archive order.
    ///
    /// Every entry path is checked before anything is written: an entry that
    /// would land outside `dest` fails the whole extraction with
    /// [`ArchiveError::PathEscape`] and leaves the filesystem untouched.
    pub fn unzip<R: Read>(&self, mut source: R, dest: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        let mut zip = ZipArchive::new(Cursor::new(buf))?;

        let mut plan = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let entry = zip.by_index_raw(i)?;
            let target = resolve_inside(dest, entry.name()).ok_or_else(|| {
                ArchiveError::PathEscape {
                    entry: entry.name().to_string(),
                    dest: dest.to_path_buf(),
                }
            })?;
            plan.push((target, entry.is_dir(), entry.unix_mode()));
        }

        let mut written = Vec::with_capacity(plan.len());
        for (i, (target, is_dir, mode)) in plan.into_iter().enumerate() {
            if is_dir {
                std::fs::create_dir_all(&target)?;
                written.push(target);
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut file = zip.by_index(i)?;
            let mut out = std::fs::File::create(&target)?;
            std::io::copy(&mut file, &mut out)?;
            drop(out);

            #[cfg(unix)]
            if let Some(mode) = mode {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&target, std::fs::Permissions::from_mode(mode & 0o7777))?;
            }
            #[cfg(not(unix))]
            let _ = mode;

            tracing::debug!("Extracted {}", target.display());
            written.push(target);
        }

        Ok(written)
    }
}

/// Lexically join `name` onto `dest`, returning `None` unless the result lies
/// strictly inside `dest`
fn resolve_inside(dest: &Path, name: &str) -> Option<PathBuf> {
    let mut out = dest.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if depth == 0 {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::{zip_bytes, PAYLOAD};
    use crate::archive::Platform;

    fn extractor() -> Extractor {
        Extractor::new(Platform::new("linux", "amd64"))
    }

    #[test]
    fn test_resolve_inside() {
        let dest = Path::new("/opt/reward");
        assert_eq!(
            resolve_inside(dest, "bin/mutagen"),
            Some(PathBuf::from("/opt/reward/bin/mutagen"))
        );
        assert_eq!(
            resolve_inside(dest, "./bin/../mutagen"),
            Some(PathBuf::from("/opt/reward/mutagen"))
        );
        assert_eq!(resolve_inside(dest, "../../evil"), None);
        assert_eq!(resolve_inside(dest, "bin/../../evil"), None);
        assert_eq!(resolve_inside(dest, "/etc/passwd"), None);
        assert_eq!(resolve_inside(dest, "."), None);
    }

    #[test]
    fn test_unzip_recreates_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let zip = zip_bytes(&[
            ("bin/", &b""[..]),
            ("bin/mutagen", PAYLOAD),
            ("share/mutagen-agents.tar.gz", &b"agents"[..]),
        ]);

        let written = extractor().unzip(Cursor::new(zip), tmp.path()).unwrap();

        assert_eq!(
            written,
            vec![
                tmp.path().join("bin"),
                tmp.path().join("bin/mutagen"),
                tmp.path().join("share/mutagen-agents.tar.gz"),
            ]
        );
        assert_eq!(std::fs::read(tmp.path().join("bin/mutagen")).unwrap(), PAYLOAD);
        assert_eq!(
            std::fs::read(tmp.path().join("share/mutagen-agents.tar.gz")).unwrap(),
            b"agents"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unzip_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let zip = zip_bytes(&[("mutagen", PAYLOAD)]);
        extractor().unzip(Cursor::new(zip), tmp.path()).unwrap();

        let mode = std::fs::metadata(tmp.path().join("mutagen"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_unzip_rejects_zip_slip_and_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("out");
        std::fs::create_dir_all(&dest).unwrap();

        let zip = zip_bytes(&[("good.txt", &b"fine"[..]), ("../../evil", &b"malicious"[..])]);
        let err = extractor().unzip(Cursor::new(zip), &dest).unwrap_err();

        match err {
            ArchiveError::PathEscape { entry, .. } => assert_eq!(entry, "../../evil"),
            other => panic!("expected PathEscape, got {:?}", other),
        }
        assert_eq!(std::fs::read_dir(&dest).unwrap().count(), 0);
        assert!(!tmp.path().join("evil").exists());
    }
}
