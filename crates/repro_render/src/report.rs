//! Report decoration.
//!
//! A formatter wraps already-rendered text for a particular medium. It adds
//! markup around content and never alters the content itself.

/// Width a console section header is padded toward
const CONSOLE_HEADER_WIDTH: usize = 58;

/// Output medium for reports
pub trait ReportFormatter {
    /// Heading that separates sections, such as one per backend version
    fn section_header(&self, headline: &str) -> String;

    /// Title of a report
    fn title(&self, title: &str) -> String;

    /// Source code excerpt
    fn codeblock(&self, code: &str) -> String;

    /// Preformatted text that is not source code
    fn literal(&self, text: &str) -> String;
}

/// GitHub-flavored Markdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Markdown;

impl ReportFormatter for Markdown {
    fn section_header(&self, headline: &str) -> String {
        format!("**{headline}**")
    }

    fn title(&self, title: &str) -> String {
        format!("### {title}")
    }

    fn codeblock(&self, code: &str) -> String {
        format!("```js\r\n{code}\r\n```")
    }

    fn literal(&self, text: &str) -> String {
        format!("```\r\n{text}\r\n```")
    }
}

/// Plain terminal text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Console;

impl ReportFormatter for Console {
    fn section_header(&self, headline: &str) -> String {
        // Pad length rounds down to an even count.
        let pad_len = (CONSOLE_HEADER_WIDTH.saturating_sub(headline.chars().count()) >> 1) << 1;
        let pad = "=".repeat(pad_len);
        format!("{pad} {headline} {pad}")
    }

    fn title(&self, title: &str) -> String {
        format!(">> {title} <<")
    }

    fn codeblock(&self, code: &str) -> String {
        code.split('\n')
            .map(|line| format!("    {}", line.strip_suffix('\r').unwrap_or(line)))
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    fn literal(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Formatter for the requested medium
#[must_use]
pub fn formatter(markdown: bool) -> &'static dyn ReportFormatter {
    if markdown { &Markdown } else { &Console }
}
