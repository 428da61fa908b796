//! Line-by-line repro scanner.

use crate::directive::Directive;
use crate::repro::{Repro, ReproEntry};

/// Joins the lines of each reconstructed file
const LINE_JOIN: &str = "\r\n";

/// Scanner state: the file currently being collected
///
/// Plain lines append to the buffer, option directives are recorded without
/// touching it, and a `filename` directive flushes it and starts a new file.
/// [`ReproReader::finish`] always flushes once more.
#[derive(Debug, Clone)]
pub struct ReproReader {
    /// Name of the file being collected
    filename: String,
    /// Lines collected so far
    buffer: Vec<String>,
    /// Entries produced so far
    entries: Vec<ReproEntry>,
}

impl ReproReader {
    /// Start collecting under `default_file_name`
    #[must_use]
    pub fn new(default_file_name: &str) -> Self {
        Self {
            filename: default_file_name.to_string(),
            buffer: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Scan a whole blob
    #[must_use]
    pub fn read(text: &str, default_file_name: &str) -> Repro {
        let mut reader = Self::new(default_file_name);
        for (index, line) in text.split('\n').enumerate() {
            reader.feed(index + 1, line.strip_suffix('\r').unwrap_or(line));
        }
        reader.finish()
    }

    /// Consume one line (without its terminator)
    pub fn feed(&mut self, line_number: usize, line: &str) {
        match Directive::parse(line) {
            Some(directive) if directive.is_filename() => {
                if !self.buffer.is_empty() {
                    self.flush();
                }
                self.filename = directive.value().to_string();
            }
            Some(directive) => self.entries.push(ReproEntry::Option {
                name: directive.name().to_string(),
                value: directive.value().to_string(),
                line: line_number,
            }),
            None => {
                if self.buffer.is_empty() && line.trim().is_empty() {
                    return;
                }
                self.buffer.push(line.to_string());
            }
        }
    }

    /// Name of the file being collected
    #[must_use]
    pub fn current_file(&self) -> &str {
        &self.filename
    }

    /// Flush the final buffer, even when empty
    #[must_use]
    pub fn finish(mut self) -> Repro {
        self.flush();
        Repro::from_entries(self.entries)
    }

    fn flush(&mut self) {
        let content = self.buffer.join(LINE_JOIN);
        self.buffer.clear();
        self.entries.push(ReproEntry::File {
            name: self.filename.clone(),
            content,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(repro: &Repro) -> Vec<(&str, &str)> {
        repro.files().collect()
    }

    #[test]
    fn test_no_directives_single_file() {
        let repro = ReproReader::read("let a = 1;\nlet b = 2;\n", "repro.ts");
        assert_eq!(files(&repro), vec![("repro.ts", "let a = 1;\r\nlet b = 2;\r\n")]);
        assert_eq!(repro.options().count(), 0);
    }

    #[test]
    fn test_crlf_input() {
        let repro = ReproReader::read("let a = 1;\r\nlet b = 2;", "x.ts");
        assert_eq!(files(&repro), vec![("x.ts", "let a = 1;\r\nlet b = 2;")]);
    }

    #[test]
    fn test_empty_input() {
        let repro = ReproReader::read("", "empty.ts");
        assert_eq!(files(&repro), vec![("empty.ts", "")]);
    }

    #[test]
    fn test_leading_blank_lines_skipped() {
        let repro = ReproReader::read("\n\n  \nlet a = 1;\n\nlet b = 2;", "r.ts");
        assert_eq!(files(&repro), vec![("r.ts", "let a = 1;\r\n\r\nlet b = 2;")]);
    }

    #[test]
    fn test_filename_flushes_previous() {
        let text = "let shared = 0;\n// @filename: b.ts\nlet b = 1;\n";
        let repro = ReproReader::read(text, "a.ts");
        assert_eq!(
            files(&repro),
            vec![("a.ts", "let shared = 0;"), ("b.ts", "let b = 1;\r\n")]
        );
    }

    #[test]
    fn test_leading_directives_no_empty_file() {
        let text = "// @declaration: true\n// @filename: a.ts\nexport const m = 1;\n";
        let repro = ReproReader::read(text, "repro.ts");
        assert_eq!(files(&repro), vec![("a.ts", "export const m = 1;\r\n")]);
        let options: Vec<_> = repro.options().collect();
        assert_eq!(options, vec![("declaration", "true")]);
    }

    #[test]
    fn test_trailing_filename_produces_empty_file() {
        let text = "let a = 1;\n// @filename: empty.ts\n";
        let repro = ReproReader::read(text, "a.ts");
        assert_eq!(files(&repro), vec![("a.ts", "let a = 1;"), ("empty.ts", "")]);
    }

    #[test]
    fn test_option_lines_not_in_content() {
        let text = "let a = 1;\n// @strict\nlet b = 2;";
        let repro = ReproReader::read(text, "a.ts");
        assert_eq!(files(&repro), vec![("a.ts", "let a = 1;\r\nlet b = 2;")]);
        match &repro.entries()[0] {
            ReproEntry::Option { name, value, line } => {
                assert_eq!(name, "strict");
                assert_eq!(value, "true");
                assert_eq!(*line, 2);
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_feed_tracks_current_file() {
        let mut reader = ReproReader::new("first.ts");
        reader.feed(1, "// @filename: second.ts");
        assert_eq!(reader.current_file(), "second.ts");
        let repro = reader.finish();
        assert_eq!(files(&repro), vec![("second.ts", "")]);
    }

    proptest::proptest! {
        #[test]
        fn prop_plain_blob_is_one_file(lines in proptest::collection::vec("[a-z][a-z0-9 =;]{0,20}", 1..8)) {
            let text = lines.join("\n");
            let repro = ReproReader::read(&text, "repro.ts");
            let expected = lines.join("\r\n");
            proptest::prop_assert_eq!(files(&repro), vec![("repro.ts", expected.as_str())]);
        }
    }
}
