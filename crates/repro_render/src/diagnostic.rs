//! Source excerpt rendering.
//!
//! A located diagnostic renders as the lines its span touches, each paired
//! with an underline row, followed by a `category code: message` line:
//!
//! ```text
//! repro.ts:1 let x: number = "s";
//!                            ~~~
//! error 2322: Type '"s"' is not assignable to type 'number'.
//! ```

use repro_core::Diagnostic;

/// Columns a tab occupies once expanded
pub const TAB_WIDTH: usize = 4;

/// Render one diagnostic against the text of the file it points into
///
/// Diagnostics without a location, or whose source text is unavailable,
/// render as the flattened message alone. Spans running past the end of
/// the text are clamped.
#[must_use]
pub fn render_diagnostic(diagnostic: &Diagnostic, source: Option<&str>) -> String {
    let message = diagnostic.message_text();
    let (Some(location), Some(text)) = (diagnostic.location.as_ref(), source) else {
        return message;
    };

    let bytes = text.as_bytes();
    let start = location.start.min(text.len());
    let end = location.start.saturating_add(location.length).min(text.len());
    let line_start = bytes[..start]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let line_end = bytes[end..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(text.len(), |i| end + i);

    let mut lines = Vec::new();
    let mut source_line = String::new();
    let mut underline = String::new();
    let mut segment_start = line_start;
    for (offset, c) in text[line_start..line_end].char_indices() {
        let pos = line_start + offset;
        match c {
            '\n' => {
                lines.push(expand_tabs(&source_line));
                lines.push(expand_tabs(&underline).trim_end().to_string());
                source_line.clear();
                underline.clear();
                segment_start = pos + 1;
            }
            '\r' => {}
            c => {
                source_line.push(c);
                if (start..end).contains(&pos) {
                    if c == '\t' {
                        underline.push_str(&"~".repeat(TAB_WIDTH));
                    } else {
                        underline.push('~');
                    }
                } else if c.is_whitespace() {
                    underline.push(c);
                } else {
                    underline.push(' ');
                }
            }
        }
    }

    let line_number = bytes[..segment_start].iter().filter(|&&b| b == b'\n').count() + 1;
    let prefix = format!("{}:{} ", location.file, line_number);
    let blank = " ".repeat(prefix.chars().count());
    lines.push(format!("{prefix}{}", expand_tabs(&source_line)));
    lines.push(format!("{blank}{}", expand_tabs(&underline)).trim_end().to_string());
    lines.push(format!(
        "{} {}: {}",
        diagnostic.category, diagnostic.code, message
    ));
    lines.join("\n")
}

fn expand_tabs(line: &str) -> String {
    line.replace('\t', &" ".repeat(TAB_WIDTH))
}
