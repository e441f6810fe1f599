//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! photo.png
//!     Size: 800x600
//!     Transparency: translucent
//! ```
//!
//! ## Single file
//!
//! ```text
//! photo.png (800x600) → small.png (400x300)
//!     resize 400x0
//!     grayscale
//! ```
//!
//! ## Batch
//!
//! ```text
//! Processing 3 images on 8 threads
//! 002/003 travel/tokyo.jpg (4000x3000) → out/travel/tokyo.png (800x600)
//! 001/003 cover.jpg (1200x1200) → out/cover.png (800x800)
//! 003/003 broken.jpg FAILED
//!     Image codec failed: Failed to decode broken.jpg: ...
//!
//! Processed 2 images, 1 failed
//! Report: out/report.json
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::imaging::{PixelBuffer, Transparency};
use crate::pipeline::{BatchReport, FileReport, ProcessEvent, Step};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{width}x{height}")
}

/// `input (WxH) → output (WxH)`
fn transfer_line(report: &FileReport) -> String {
    format!(
        "{} ({}) \u{2192} {} ({})",
        report.input.display(),
        format_dimensions(report.source_dimensions),
        report.output.display(),
        format_dimensions(report.output_dimensions)
    )
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

// ============================================================================
// Info
// ============================================================================

/// Describe a decoded image.
pub fn format_info(path: &Path, buffer: &PixelBuffer) -> Vec<String> {
    let transparency = match buffer.transparency() {
        Transparency::Opaque => "opaque",
        Transparency::Translucent => "translucent",
    };
    vec![
        path.display().to_string(),
        format!("{}Size: {}", indent(1), format_dimensions(buffer.dimensions())),
        format!("{}Transparency: {}", indent(1), transparency),
    ]
}

pub fn print_info(path: &Path, buffer: &PixelBuffer) {
    for line in format_info(path, buffer) {
        println!("{}", line);
    }
}

// ============================================================================
// Single file
// ============================================================================

/// One-file result: the transfer line, then the applied steps indented.
pub fn format_file_report(report: &FileReport, steps: &[Step]) -> Vec<String> {
    let mut lines = vec![transfer_line(report)];
    if steps.is_empty() {
        lines.push(format!("{}(no steps, re-encoded)", indent(1)));
    }
    lines.extend(
        steps
            .iter()
            .map(|step| format!("{}{}", indent(1), step.label())),
    );
    lines
}

pub fn print_file_report(report: &FileReport, steps: &[Step]) {
    for line in format_file_report(report, steps) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total, threads } => vec![format!(
            "Processing {} on {}",
            plural(*total, "image", "images"),
            plural(*threads, "thread", "threads")
        )],
        ProcessEvent::FileProcessed {
            index,
            total,
            report,
        } => vec![format!(
            "{}/{} {}",
            format_index(*index),
            format_index(*total),
            transfer_line(report)
        )],
        ProcessEvent::FileFailed {
            index,
            total,
            input,
            error,
        } => vec![
            format!(
                "{}/{} {} FAILED",
                format_index(*index),
                format_index(*total),
                input.display()
            ),
            format!("{}{}", indent(1), error),
        ],
    }
}

/// Closing summary for a batch run.
pub fn format_batch_summary(report: &BatchReport, report_path: &Path) -> Vec<String> {
    let mut lines = vec![String::new()];
    if report.failed.is_empty() {
        lines.push(format!(
            "Processed {}",
            plural(report.processed.len(), "image", "images")
        ));
    } else {
        lines.push(format!(
            "Processed {}, {} failed",
            plural(report.processed.len(), "image", "images"),
            report.failed.len()
        ));
        for failed in &report.failed {
            lines.push(format!("{}{}", indent(1), failed.input.display()));
        }
    }
    lines.push(format!("Report: {}", report_path.display()));
    lines
}

pub fn print_batch_summary(report: &BatchReport, report_path: &Path) {
    for line in format_batch_summary(report, report_path) {
        println!("{}", line);
    }
}
