//! Platform detection for selecting the correct Bun release artifact.
//!
//! Bun publishes one zip per operating system and CPU architecture, with a few
//! optional build variants:
//! - **OS**: `darwin`, `linux`, `windows`
//! - **Architecture**: `x64`, `aarch64`
//! - **Variant**: `baseline` (no AVX2), `profile` (with symbols), `musl`
//!
//! # Artifact Name Format
//!
//! ```text
//! bun-<os>-<arch>[-<variant>].zip
//! bun-linux-x64.zip
//! bun-darwin-aarch64.zip
//! bun-linux-x64-musl.zip
//! ```
//!
//! Host names are reported in `uname` style (`Linux`, `Darwin`, `x86_64`,
//! `arm64`) and mapped through two fixed tables. Anything the tables don't know
//! passes through lower-cased.

use std::fmt;
use std::str::FromStr;

/// Bun build flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Default build for the platform
    #[default]
    Default,
    /// Build without AVX2 instructions
    Baseline,
    /// Build with profiling symbols
    Profile,
    /// Build linked against musl libc
    Musl,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Baseline => "baseline",
            Self::Profile => "profile",
            Self::Musl => "musl",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "" => Some(Self::Default),
            "baseline" => Some(Self::Baseline),
            "profile" => Some(Self::Profile),
            "musl" => Some(Self::Musl),
            _ => None,
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("invalid choice: '{s}' (choose from '', 'baseline', 'profile', 'musl')")
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical (os, arch) pair used in Bun artifact names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformKey {
    pub os: String,
    pub arch: String,
    /// Host is an x86_64 musl target
    pub musl: bool,
}

impl PlatformKey {
    /// Build a key from `uname`-style system and machine names.
    pub fn from_host_names(system: &str, machine: &str) -> Self {
        Self {
            os: map_os(system),
            arch: map_arch(machine),
            musl: false,
        }
    }

    /// Detect the platform this binary runs on.
    pub fn detect() -> Self {
        let mut key = Self::from_host_names(host_system_name(), std::env::consts::ARCH);
        key.musl = is_x86_64_musl();
        key
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Name of the directory holding executables inside an environment.
    pub fn bin_dir_name(&self) -> &'static str {
        if self.is_windows() { "Scripts" } else { "bin" }
    }

    /// File name of the bun executable.
    pub fn bun_binary_name(&self) -> &'static str {
        if self.is_windows() { "bun.exe" } else { "bun" }
    }

    /// Variant to download: explicit wins, musl hosts fall back to `musl`.
    pub fn effective_variant(&self, requested: Variant) -> Variant {
        if requested != Variant::Default {
            return requested;
        }
        if self.musl && self.os == "linux" {
            return Variant::Musl;
        }
        Variant::Default
    }

    /// Zip file name for this platform, e.g. `bun-linux-x64-musl.zip`.
    pub fn artifact_name(&self, variant: Variant) -> String {
        match self.effective_variant(variant) {
            Variant::Default => format!("bun-{}-{}.zip", self.os, self.arch),
            v => format!("bun-{}-{}-{}.zip", self.os, self.arch, v),
        }
    }
}

fn map_arch(machine: &str) -> String {
    match machine {
        "x86_64" | "amd64" | "AMD64" => "x64".to_string(),
        "ARM64" | "arm64" | "aarch64" => "aarch64".to_string(),
        other => other.to_lowercase(),
    }
}

fn map_os(system: &str) -> String {
    match system {
        "Darwin" => "darwin".to_string(),
        "Linux" => "linux".to_string(),
        "Windows" => "windows".to_string(),
        other => other.to_lowercase(),
    }
}

/// `uname -s` style name of the compile target OS.
fn host_system_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "Darwin",
        "linux" => "Linux",
        "windows" => "Windows",
        other => other,
    }
}

/// True when built for `x86_64-unknown-linux-musl`.
pub fn is_x86_64_musl() -> bool {
    cfg!(all(
        target_os = "linux",
        target_arch = "x86_64",
        target_env = "musl"
    ))
}
