//! Installing and updating versioned helper binaries (compose, sync daemon)

use crate::{CoreError, Extractor, Result, Shell};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A versioned helper binary release artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperBinary {
    /// Executable name inside the archive (without platform suffix)
    pub name: String,
    pub version: String,
    /// Download URL of the platform-specific archive
    pub url: String,
}

impl HelperBinary {
    pub fn new(name: impl Into<String>, version: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            url: url.into(),
        }
    }

    /// File name of the archive, used to pick the decompression format
    pub fn archive_name(&self) -> &str {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default()
    }

    /// Download the archive and install the executable into `dest_dir`
    pub async fn install(&self, extractor: &Extractor, dest_dir: &Path) -> Result<PathBuf> {
        tracing::info!("Installing {} {} from {}", self.name, self.version, self.url);
        let archive = download_archive(&self.url).await?;
        install_executable(extractor, archive, self.archive_name(), &self.name, dest_dir)
    }
}

/// Download an archive into memory
///
/// Only HTTPS is allowed, except for localhost.
pub async fn download_archive(url: &str) -> Result<Vec<u8>> {
    if !url.starts_with("https://")
        && !url.starts_with("http://localhost")
        && !url.starts_with("http://127.0.0.1")
        && !url.starts_with("http://[::1]")
    {
        return Err(CoreError::Download {
            url: url.to_string(),
            reason: "Only HTTPS URLs are allowed for downloads (except localhost)".into(),
        });
    }

    tracing::debug!("Downloading {}", url);

    let resp = reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map_err(|e| CoreError::Download {
            url: url.to_string(),
            reason: format!("HTTP request failed: {}", e),
        })?;

    if !resp.status().is_success() {
        return Err(CoreError::Download {
            url: url.to_string(),
            reason: format!("HTTP {}", resp.status()),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| CoreError::Download {
        url: url.to_string(),
        reason: format!("Failed to read response body: {}", e),
    })?;

    Ok(bytes.to_vec())
}

/// Resolve `executable` inside `archive` and install it as
/// `dest_dir/<executable>` (`.exe` appended on Windows), replacing any
/// previous version atomically.
pub fn install_executable(
    extractor: &Extractor,
    archive: Vec<u8>,
    archive_name: &str,
    executable: &str,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let mut member = extractor.decompress_from_archive(Cursor::new(archive), archive_name, executable)?;

    std::fs::create_dir_all(dest_dir)?;

    let target = dest_dir.join(extractor.platform().executable_file_name(executable));

    let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)?;
    std::io::copy(&mut member, &mut tmp)?;
    drop(member);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o755))?;
    }

    tmp.persist(&target).map_err(|e| CoreError::Io(e.error))?;

    tracing::info!("Installed {}", target.display());
    Ok(target)
}

/// Version reported by `binary args...`, if it runs and prints one
pub fn installed_version(shell: &dyn Shell, binary: &str, args: &[&str]) -> Option<String> {
    let options = crate::ExecOptions::new().capture_output(true);
    match shell.execute_with_options(binary, args, &options) {
        Ok(result) => parse_version(&result.stdout_lossy()),
        Err(e) => {
            tracing::debug!("Cannot determine {} version: {}", binary, e);
            None
        }
    }
}

/// First version-like token (`1.2.3`, `v2.13.0`) in command output
pub fn parse_version(output: &str) -> Option<String> {
    output.split_whitespace().find_map(|token| {
        let token = token.trim_matches(|c: char| c == ',' || c == '"' || c == '\'');
        let token = token.strip_prefix('v').unwrap_or(token);
        let starts_with_digit = token.chars().next().is_some_and(|c| c.is_ascii_digit());
        (starts_with_digit && token.contains('.')).then(|| token.to_string())
    })
}

/// Whether `installed` is missing or older than `wanted`
pub fn needs_update(installed: Option<&str>, wanted: &str) -> bool {
    match installed {
        None => true,
        Some(installed) => version_parts(installed) < version_parts(wanted),
    }
}

fn version_parts(version: &str) -> Vec<u64> {
    let version = version.strip_prefix('v').unwrap_or(version);
    // Pre-release and build metadata do not take part in the comparison
    let core = version.split(['-', '+']).next().unwrap_or_default();

    let mut parts: Vec<u64> = core
        .split('.')
        .map(|p| {
            let digits: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        })
        .collect();

    while parts.last() == Some(&0) {
        parts.pop();
    }
    parts
}
