//! Parsed repro and replay onto a target.

use crate::reader::ReproReader;
use repro_core::{HarnessFlags, HarnessResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File name used when the caller supplies none
pub const DEFAULT_FILE_NAME: &str = "repro.ts";

/// Receiver of a replayed repro
pub trait ReproTarget {
    /// Add a file that is passed to the backend as an entry point
    fn add_root_file(&mut self, name: &str, content: &str);

    /// Assign an option from its raw directive value
    ///
    /// # Errors
    ///
    /// Returns error if the option is unknown or the value invalid
    fn set_option(&mut self, name: &str, raw: &str) -> HarnessResult<()>;
}

/// One step of a repro, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReproEntry {
    /// Option assignment
    Option {
        /// Name as written
        name: String,
        /// Raw value
        value: String,
        /// 1-based source line
        line: usize,
    },
    /// Completed virtual file
    File {
        /// File name
        name: String,
        /// Content joined with CR-LF
        content: String,
    },
}

/// A parsed repro blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repro {
    entries: Vec<ReproEntry>,
}

impl Repro {
    /// Parse a blob
    #[must_use]
    pub fn parse(text: &str, default_file_name: &str) -> Self {
        ReproReader::read(text, default_file_name)
    }

    pub(crate) fn from_entries(entries: Vec<ReproEntry>) -> Self {
        Self { entries }
    }

    /// All entries in source order
    #[must_use]
    pub fn entries(&self) -> &[ReproEntry] {
        &self.entries
    }

    /// `(name, content)` of each file in order
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|e| match e {
            ReproEntry::File { name, content } => Some((name.as_str(), content.as_str())),
            ReproEntry::Option { .. } => None,
        })
    }

    /// `(name, raw value)` of each option assignment in order
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|e| match e {
            ReproEntry::Option { name, value, .. } => Some((name.as_str(), value.as_str())),
            ReproEntry::File { .. } => None,
        })
    }

    /// Check if the blob turns on the harness `regress` flag
    #[must_use]
    pub fn requests_regression(&self) -> bool {
        let mut flags = HarnessFlags::default();
        for (name, value) in self.options() {
            // Malformed values are reported when the repro is applied.
            let _ = flags.apply(name, value);
        }
        flags.regress
    }

    /// Replay every entry in order, stopping at the first option error
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the target
    pub fn apply(&self, target: &mut dyn ReproTarget) -> HarnessResult<()> {
        for entry in &self.entries {
            match entry {
                ReproEntry::Option { name, value, line } => {
                    debug!(option = %name, value = %value, line, "applying directive");
                    target.set_option(name, value)?;
                }
                ReproEntry::File { name, content } => target.add_root_file(name, content),
            }
        }
        Ok(())
    }
}

/// Parse a blob and replay it onto `target`
///
/// # Errors
///
/// Returns the first option error; entries after it are not applied
pub fn load_repro(
    target: &mut dyn ReproTarget,
    text: &str,
    default_file_name: &str,
) -> HarnessResult<Repro> {
    let repro = Repro::parse(text, default_file_name);
    repro.apply(target)?;
    Ok(repro)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repro_core::HarnessError;

    #[derive(Default)]
    struct Recorder {
        files: Vec<(String, String)>,
        options: Vec<(String, String)>,
    }

    impl ReproTarget for Recorder {
        fn add_root_file(&mut self, name: &str, content: &str) {
            self.files.push((name.to_string(), content.to_string()));
        }

        fn set_option(&mut self, name: &str, raw: &str) -> HarnessResult<()> {
            if name == "bogus" {
                return Err(HarnessError::UnknownOption {
                    name: name.to_string(),
                });
            }
            self.options.push((name.to_string(), raw.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_apply_in_order() {
        let text = "// @module: umd\n// @filename: a.ts\nexport const m = 1;\n// @strict\n// @filename: b.ts\nm;";
        let mut target = Recorder::default();
        let repro = load_repro(&mut target, text, DEFAULT_FILE_NAME).unwrap();
        assert_eq!(repro.files().count(), 2);
        assert_eq!(
            target.options,
            vec![
                ("module".to_string(), "umd".to_string()),
                ("strict".to_string(), "true".to_string())
            ]
        );
        assert_eq!(target.files[0].0, "a.ts");
        assert_eq!(target.files[1], ("b.ts".to_string(), "m;".to_string()));
    }

    #[test]
    fn test_apply_aborts_on_unknown_option() {
        let text = "let a = 1;\n// @bogus\n// @filename: b.ts\nlet b = 2;";
        let mut target = Recorder::default();
        let err = load_repro(&mut target, text, "a.ts").unwrap_err();
        assert!(matches!(err, HarnessError::UnknownOption { .. }));
        assert!(target.files.is_empty());
    }

    #[test]
    fn test_requests_regression() {
        assert!(Repro::parse("// @regress\nlet a;", "a.ts").requests_regression());
        assert!(Repro::parse("// @Regress: true\n", "a.ts").requests_regression());
        assert!(!Repro::parse("// @regress: false\n", "a.ts").requests_regression());
        assert!(!Repro::parse("let a;", "a.ts").requests_regression());
    }

    #[test]
    fn test_replay_twice_is_identical() {
        let repro = Repro::parse("// @strict\nlet a = 1;", "a.ts");
        let mut first = Recorder::default();
        let mut second = Recorder::default();
        repro.apply(&mut first).unwrap();
        repro.apply(&mut second).unwrap();
        assert_eq!(first.files, second.files);
        assert_eq!(first.options, second.options);
    }
}
