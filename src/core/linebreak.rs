use serde::{Deserialize, Serialize};

/// Newline sequence of the host platform
#[cfg(windows)]
pub const PLATFORM_LINE_BREAK: &str = "\r\n";
#[cfg(not(windows))]
pub const PLATFORM_LINE_BREAK: &str = "\n";

/// Sequence appended after every transmitted or received unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreak {
    None,
    Cr,
    Lf,
    CrLf,
    LfCr,
    /// Host convention, see [`PLATFORM_LINE_BREAK`]
    #[default]
    Platform,
}

impl LineBreak {
    pub const ALL: [LineBreak; 6] = [
        LineBreak::None,
        LineBreak::Cr,
        LineBreak::Lf,
        LineBreak::CrLf,
        LineBreak::LfCr,
        LineBreak::Platform,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreak::None => "",
            LineBreak::Cr => "\r",
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::LfCr => "\n\r",
            LineBreak::Platform => PLATFORM_LINE_BREAK,
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    pub fn next(&self) -> Self {
        match self {
            LineBreak::None => LineBreak::Cr,
            LineBreak::Cr => LineBreak::Lf,
            LineBreak::Lf => LineBreak::CrLf,
            LineBreak::CrLf => LineBreak::LfCr,
            LineBreak::LfCr => LineBreak::Platform,
            LineBreak::Platform => LineBreak::None,
        }
    }
}

impl std::fmt::Display for LineBreak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineBreak::None => write!(f, "None"),
            LineBreak::Cr => write!(f, "CR"),
            LineBreak::Lf => write!(f, "LF"),
            LineBreak::CrLf => write!(f, "CR+LF"),
            LineBreak::LfCr => write!(f, "LF+CR"),
            LineBreak::Platform => write!(f, "System"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(LineBreak::None.as_str(), "");
        assert_eq!(LineBreak::Cr.as_str(), "\r");
        assert_eq!(LineBreak::Lf.as_str(), "\n");
        assert_eq!(LineBreak::CrLf.as_bytes(), b"\r\n");
        assert_eq!(LineBreak::LfCr.as_bytes(), b"\n\r");
        assert_eq!(LineBreak::Platform.as_str(), PLATFORM_LINE_BREAK);
    }

    #[test]
    fn test_default_is_platform() {
        assert_eq!(LineBreak::default(), LineBreak::Platform);
    }

    #[test]
    fn test_cycle_visits_every_kind() {
        let mut kind = LineBreak::None;
        for expected in LineBreak::ALL.iter().skip(1) {
            kind = kind.next();
            assert_eq!(kind, *expected);
        }
        assert_eq!(kind.next(), LineBreak::None);
    }

    #[test]
    fn test_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            kind: LineBreak,
        }

        let toml_str = toml::to_string(&Wrapper { kind: LineBreak::CrLf }).unwrap();
        assert!(toml_str.contains("crlf"));
        let parsed: Wrapper = toml::from_str("kind = \"lfcr\"").unwrap();
        assert_eq!(parsed.kind, LineBreak::LfCr);
    }
}
