//! Target architecture types.

use std::fmt;

/// Target architecture of a build.
///
/// The tag (`ia32`, `x64`) names the build output directory, the solution
/// directory and the per-architecture installer package.
///
/// # Examples
///
/// ```
/// use release_builder::bundler::Architecture;
///
/// assert_eq!(Architecture::X64.tag(), "x64");
/// assert_eq!(Architecture::ALL, [Architecture::Ia32, Architecture::X64]);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// 32-bit x86
    Ia32,
    /// 64-bit x86
    X64,
}

impl Architecture {
    /// Every supported architecture, in build order.
    pub const ALL: [Architecture; 2] = [Architecture::Ia32, Architecture::X64];

    /// Short tag used in paths and artifact names.
    pub fn tag(self) -> &'static str {
        match self {
            Architecture::Ia32 => "ia32",
            Architecture::X64 => "x64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_tags() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            arch: Vec<Architecture>,
        }

        let parsed: Wrapper = toml::from_str(r#"arch = ["x64", "ia32"]"#).unwrap();
        assert_eq!(parsed.arch, vec![Architecture::X64, Architecture::Ia32]);
    }
}
