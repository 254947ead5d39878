//! Human-friendly CLI output formatters.
//!
//! Each `fmt_*` function formats one command's output for terminal display.
//! When `color` is true, ANSI escape codes are emitted via `owo_colors`.

use crate::services::DirectoryContext;
use crate::tools::{ToolDefinition, ToolResult};
use crate::types::FileRecord;
use owo_colors::OwoColorize;
use std::io::{self, Write};

// ── scan ────────────────────────────────────────────────────────────────────

pub fn fmt_scan(w: &mut impl Write, records: &[FileRecord], color: bool) -> io::Result<()> {
    let mut total = 0usize;

    for record in records {
        let chars = record.content.chars().count();
        total += chars;
        if color {
            writeln!(w, "{}  {}", format_args!("{chars:>8}").dimmed(), record.path.bold())?;
        } else {
            writeln!(w, "{chars:>8}  {}", record.path)?;
        }
    }

    writeln!(w, "{} files, {} chars", records.len(), total)?;
    Ok(())
}

// ── context ─────────────────────────────────────────────────────────────────

pub fn fmt_context(w: &mut impl Write, ctx: &DirectoryContext, color: bool) -> io::Result<()> {
    write!(w, "{}", ctx.as_str())?;

    let summary = format!(
        "{} files, {} chars{}",
        ctx.files_included,
        ctx.as_str().chars().count(),
        if ctx.truncated { ", truncated" } else { "" }
    );

    if color && ctx.truncated {
        writeln!(w, "{}", summary.yellow())?;
    } else if color {
        writeln!(w, "{}", summary.dimmed())?;
    } else {
        writeln!(w, "{summary}")?;
    }

    Ok(())
}

// ── tools ───────────────────────────────────────────────────────────────────

pub fn fmt_tools(w: &mut impl Write, tools: &[ToolDefinition], color: bool) -> io::Result<()> {
    for tool in tools {
        if color {
            writeln!(w, "{}", tool.name.bold())?;
            writeln!(w, "  {}", tool.description.dimmed())?;
        } else {
            writeln!(w, "{}", tool.name)?;
            writeln!(w, "  {}", tool.description)?;
        }

        let required: Vec<&str> = tool.required().collect();
        if let Some(props) = tool.input_schema.get("properties").and_then(|p| p.as_object()) {
            for name in props.keys() {
                let marker = if required.contains(&name.as_str()) { "*" } else { " " };
                if color && marker == "*" {
                    writeln!(w, "  {} {}", marker.green(), name)?;
                } else {
                    writeln!(w, "  {marker} {name}")?;
                }
            }
        }
    }

    Ok(())
}

// ── call ────────────────────────────────────────────────────────────────────

pub fn fmt_tool_result(w: &mut impl Write, result: &ToolResult, color: bool) -> io::Result<()> {
    let text = result.text();
    if color && result.is_error {
        writeln!(w, "{}", text.red())?;
    } else {
        writeln!(w, "{text}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assemble;
    use crate::tools::ToolRegistry;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_fmt_scan_plain() {
        let records = vec![FileRecord::new("a.js", "12345"), FileRecord::new("b/c.css", "xy")];
        let out = render(|w| fmt_scan(w, &records, false));

        assert!(out.contains("       5  a.js\n"));
        assert!(out.contains("       2  b/c.css\n"));
        assert!(out.ends_with("2 files, 7 chars\n"));
    }

    #[test]
    fn test_fmt_context_reports_truncation() {
        let records = vec![FileRecord::new("a.js", "x".repeat(200))];
        let ctx = assemble(&records, 100);
        let out = render(|w| fmt_context(w, &ctx, false));

        assert!(out.contains("0 files"));
        assert!(out.trim_end().ends_with("truncated"));
    }

    #[test]
    fn test_fmt_tools_marks_required() {
        let registry = ToolRegistry::new();
        let out = render(|w| fmt_tools(w, registry.list_tools(), false));

        assert!(out.contains("match_html_to_block\n"));
        assert!(out.contains("  * message\n"));
        assert!(out.contains("    systemPrompt\n"));
    }

    #[test]
    fn test_fmt_tool_result_plain() {
        let out = render(|w| fmt_tool_result(w, &ToolResult::error("Error: boom"), false));
        assert_eq!(out, "Error: boom\n");
    }
}
