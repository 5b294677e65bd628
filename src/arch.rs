//! Package architectures and their toolchain names

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Placeholder replaced by an architecture name in paths and arguments.
pub const ARCH_PLACEHOLDER: &str = "$arch";

/// Public architecture of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 32-bit x86
    X86,
    /// 64-bit x86
    X64,
}

impl Arch {
    /// All supported architectures
    pub const ALL: [Arch; 2] = [Arch::X86, Arch::X64];

    /// The public name, as used in package and application output paths.
    pub fn name(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
        }
    }

    /// The name the runtime's toolchain uses for this architecture.
    ///
    /// Only `x86` is spelled differently (`win32`); every other
    /// architecture keeps its public name.
    pub fn toolchain_name(self) -> &'static str {
        match self {
            Arch::X86 => "win32",
            other => other.name(),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .into_iter()
            .find(|arch| arch.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownArch {
                value: s.to_string(),
            })
    }
}

/// Replace every architecture placeholder in `template` with `name`.
pub fn substitute(template: &str, name: &str) -> String {
    template.replace(ARCH_PLACEHOLDER, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arch() {
        assert_eq!("x86".parse::<Arch>().unwrap(), Arch::X86);
        assert_eq!("X64".parse::<Arch>().unwrap(), Arch::X64);
        assert!(matches!(
            "arm64".parse::<Arch>(),
            Err(Error::UnknownArch { .. })
        ));
    }

    #[test]
    fn test_toolchain_name_mapping() {
        assert_eq!(Arch::X86.toolchain_name(), "win32");
        assert_ne!(Arch::X86.toolchain_name(), Arch::X86.name());
        assert_eq!(Arch::X64.toolchain_name(), "x64");
    }

    #[test]
    fn test_substitute() {
        assert_eq!(substitute("PCBuild/$arch", "win32"), "PCBuild/win32");
        assert_eq!(substitute("build/$arch/$arch", "x64"), "build/x64/x64");
        assert_eq!(substitute("Lib", "x64"), "Lib");
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for arch in Arch::ALL {
            assert_eq!(arch.to_string().parse::<Arch>().unwrap(), arch);
        }
    }
}
