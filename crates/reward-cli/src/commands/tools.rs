use anyhow::{Context, Result};
use reward_core::install::{installed_version, needs_update};
use reward_core::{util, Extractor, HelperBinary, Platform, Shell};
use std::path::{Path, PathBuf};

/// Where helper binaries go when `--dest` is not given
pub fn default_bin_dir() -> Result<PathBuf> {
    Ok(util::app_home_dir()?.join("bin"))
}

/// Download and install a helper binary
///
/// With `version`, an installed binary that already reports that version (or
/// newer) through `<binary> version` is left in place and `None` is returned.
pub async fn install(
    shell: &dyn Shell,
    extractor: &Extractor,
    url: &str,
    executable: &str,
    dest: Option<&str>,
    version: Option<&str>,
) -> Result<Option<PathBuf>> {
    let dest_dir = match dest {
        Some(dir) => util::expand_path(dir)?,
        None => default_bin_dir()?,
    };

    if let Some(wanted) = version {
        let binary = dest_dir.join(extractor.platform().executable_file_name(executable));
        let current = installed_version(shell, &binary.to_string_lossy(), &["version"]);
        if !needs_update(current.as_deref(), wanted) {
            println!(
                "{} {} is up to date",
                executable,
                current.as_deref().unwrap_or(wanted)
            );
            return Ok(None);
        }
    }

    let helper = HelperBinary::new(executable, version.unwrap_or("latest"), url);
    let path = helper
        .install(extractor, &dest_dir)
        .await
        .with_context(|| format!("Failed to install {}", executable))?;

    println!("Installed {} to {}", executable, path.display());
    Ok(Some(path))
}

/// Extract every entry of a zip archive into `dest`
pub fn unzip(file: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let archive = std::fs::File::open(file)
        .with_context(|| format!("Cannot open {}", file.display()))?;

    std::fs::create_dir_all(dest)?;
    let written = Extractor::new(Platform::current())
        .unzip(archive, dest)
        .with_context(|| format!("Failed to extract {}", file.display()))?;

    println!("Extracted {} entries to {}", written.len(), dest.display());
    Ok(written)
}
