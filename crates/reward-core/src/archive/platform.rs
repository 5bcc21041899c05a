//! Platform identifiers as used in helper-binary release artifact names

/// Operating system and architecture, named the way release artifacts name
/// them (`linux`/`darwin`/`windows`, `amd64`/`arm64`/...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary is running on
    pub fn current() -> Self {
        Self::new(
            artifact_os(std::env::consts::OS),
            artifact_arch(std::env::consts::ARCH),
        )
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// File name an installed executable gets on this platform
    pub fn executable_file_name(&self, executable: &str) -> String {
        if self.is_windows() && !executable.ends_with(".exe") {
            format!("{}.exe", executable)
        } else {
            executable.to_string()
        }
    }

    /// Whether `candidate` names the executable `wanted` on this platform:
    /// either exactly, or as `wanted_OS_ARCH` / `wanted-OS-ARCH`
    /// (plus `.exe` on Windows).
    pub fn matches_executable(&self, wanted: &str, candidate: &str) -> bool {
        if wanted == candidate {
            return true;
        }

        ['_', '-'].iter().any(|sep| {
            let mut full = format!("{wanted}{sep}{}{sep}{}", self.os, self.arch);
            if self.is_windows() {
                full.push_str(".exe");
            }
            full == candidate
        })
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn artifact_os(os: &str) -> String {
    match os {
        "macos" => "darwin",
        other => other,
    }
    .to_string()
}

fn artifact_arch(arch: &str) -> String {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
    .to_string()
}
