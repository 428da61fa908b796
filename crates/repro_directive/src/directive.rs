//! Single-line directive recognition.

use once_cell::sync::Lazy;
use regex::Regex;

/// Directive that starts a new virtual file
pub const FILENAME_DIRECTIVE: &str = "filename";

static FLAG_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//\s?@(\w+)\s*$").expect("flag directive pattern"));

static VALUE_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//\s?@(\w+):(.*)$").expect("value directive pattern"));

/// A recognized directive line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `// @name`
    Flag {
        /// Option name
        name: String,
    },
    /// `// @name: value`
    Value {
        /// Option name
        name: String,
        /// Value with one leading space stripped
        value: String,
    },
}

impl Directive {
    /// Recognize a directive; `None` for ordinary source lines
    ///
    /// A value is the text after the colon without its first space and
    /// without trailing whitespace.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        if let Some(caps) = FLAG_DIRECTIVE.captures(line) {
            return Some(Self::Flag {
                name: caps[1].to_string(),
            });
        }
        let caps = VALUE_DIRECTIVE.captures(line)?;
        let raw = &caps[2];
        let value = raw.strip_prefix(' ').unwrap_or(raw).trim_end();
        Some(Self::Value {
            name: caps[1].to_string(),
            value: value.to_string(),
        })
    }

    /// Option name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Flag { name } | Self::Value { name, .. } => name,
        }
    }

    /// Raw value; flags are `"true"`
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Flag { .. } => "true",
            Self::Value { value, .. } => value,
        }
    }

    /// Check if this is the `filename` directive
    #[must_use]
    pub fn is_filename(&self) -> bool {
        matches!(self, Self::Value { name, .. } if name.eq_ignore_ascii_case(FILENAME_DIRECTIVE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag() {
        assert_eq!(
            Directive::parse("// @strict"),
            Some(Directive::Flag {
                name: "strict".to_string()
            })
        );
        assert_eq!(Directive::parse("//@noLib  ").unwrap().name(), "noLib");
        assert_eq!(Directive::parse("// @strict").unwrap().value(), "true");
    }

    #[test]
    fn test_value() {
        let d = Directive::parse("// @module: umd").unwrap();
        assert_eq!(d.name(), "module");
        assert_eq!(d.value(), "umd");

        let d = Directive::parse("//@strictNullchecks:true").unwrap();
        assert_eq!(d.value(), "true");

        // Only the first space after the colon is separator.
        let d = Directive::parse("// @outDir:  two spaces").unwrap();
        assert_eq!(d.value(), " two spaces");
    }

    #[test]
    fn test_value_trailing_whitespace_trimmed() {
        // Trailing blanks are dropped so `true ` still parses as a boolean.
        let d = Directive::parse("// @declaration: true \t").unwrap();
        assert_eq!(d.value(), "true");

        let d = Directive::parse("// @outDir:  two spaces ").unwrap();
        assert_eq!(d.value(), " two spaces");

        let d = Directive::parse("// @filename: a.ts\r").unwrap();
        assert_eq!(d.value(), "a.ts");
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let d = Directive::parse("// @filename: c:weird.ts").unwrap();
        assert!(d.is_filename());
        assert_eq!(d.value(), "c:weird.ts");
    }

    #[test]
    fn test_not_directives() {
        assert_eq!(Directive::parse("let x = 1; // @strict"), None);
        assert_eq!(Directive::parse("  // @strict"), None);
        assert_eq!(Directive::parse("//  @strict"), None);
        assert_eq!(Directive::parse("// plain comment"), None);
        assert_eq!(Directive::parse("// @flag with words"), None);
    }

    #[test]
    fn test_filename_case_insensitive() {
        assert!(Directive::parse("// @FileName: a.ts").unwrap().is_filename());
        assert!(!Directive::parse("// @filename").unwrap().is_filename());
    }
}
