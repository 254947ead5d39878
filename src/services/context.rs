//! Bounded rendering of scanned files into a single prompt context block.

use crate::types::FileRecord;
use std::fmt;

/// Opens the context block.
pub const CONTEXT_HEADER: &str = "\n\n--- DIRECTORY CODE CONTEXT ---\n\n";

/// Closes the context block.
pub const CONTEXT_FOOTER: &str = "\n--- END DIRECTORY CODE CONTEXT ---\n\n";

/// Appended once when the next file would exceed the budget.
pub const TRUNCATION_NOTICE: &str =
    "\n[... Additional files truncated to stay within token limits ...]\n";

/// Fixed markers that may be emitted on top of the budget.
pub const MARKER_OVERHEAD: usize =
    CONTEXT_HEADER.len() + CONTEXT_FOOTER.len() + TRUNCATION_NOTICE.len();

/// Default character budget for an assembled context.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 50_000;

/// An assembled directory context.
///
/// `text.chars().count() <= max_length + MARKER_OVERHEAD` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryContext {
    pub text: String,
    /// Number of files rendered in full.
    pub files_included: usize,
    /// Whether the truncation notice was appended.
    pub truncated: bool,
}

impl DirectoryContext {
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for DirectoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn render_file(record: &FileRecord) -> String {
    format!("\n## File: {}\n```\n{}\n```\n", record.path, record.content)
}

/// Renders `records` in order until the next file would push the running
/// length (header included) past `max_length`.
///
/// Lengths are counted in characters. Never fails; a budget smaller than the
/// first file produces the markers and the truncation notice only.
#[must_use]
pub fn assemble(records: &[FileRecord], max_length: usize) -> DirectoryContext {
    let mut text = String::from(CONTEXT_HEADER);
    let mut total = CONTEXT_HEADER.chars().count();
    let mut files_included = 0;
    let mut truncated = false;

    for record in records {
        let block = render_file(record);
        let block_len = block.chars().count();

        if total + block_len > max_length {
            text.push_str(TRUNCATION_NOTICE);
            truncated = true;
            break;
        }

        text.push_str(&block);
        total += block_len;
        files_included += 1;
    }

    text.push_str(CONTEXT_FOOTER);

    if truncated {
        tracing::debug!(
            "Context truncated after {} of {} files (budget {} chars)",
            files_included,
            records.len(),
            max_length
        );
    }

    DirectoryContext {
        text,
        files_included,
        truncated,
    }
}
