//! CLI output formatting for `check`, `link` and `simulate`.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and name; details follow
//! on indented context lines. The same two-level shape is used for gallery
//! categories in `check` and for timeline entries in `simulate`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Contact
//!     WhatsApp: wa.me/916207806187
//!     Email: ayush@artist.com
//!
//! Gallery
//! 001 Abstract Acrylic (5 images)
//!     Key: abstract
//! 002 Colour Portrait (1 image)
//!     Key: color-portrait
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Simulate
//!
//! ```text
//! 0ms init
//!     show_loader content="Loading Ayush's Portfolio Preparing..."
//!     set_slide_state index=0 state="active"
//! 1200ms category_selected
//!     render_gallery grid="" title="Abstract Acrylic"
//! 1500ms fade_loader (timer)
//!     fade_loader
//!
//! Final state
//!     slide: 0
//!     modal: galleryModal
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::SiteConfig;
use crate::form::Field;
use crate::page::PageOp;
use crate::simulate::{Report, ReportEntry, Source};
use std::path::Path;

/// Markup and long strings in op details are cut to this many characters.
const DETAIL_WIDTH: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Abstract Acrylic (5 images)
/// 003 Colour Portrait (1 image)
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(1) => format!("{} {} (1 image)", format_index(index), title),
        Some(n) => format!("{} {} ({} images)", format_index(index), title, n),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                result.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

// ============================================================================
// check
// ============================================================================

/// Summarize a loaded config: contact targets, gallery catalog, sources.
pub fn format_check_output(config: &SiteConfig, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let contact = &config.contact;

    lines.push("Contact".to_string());
    lines.push(format!(
        "    {}: {}/{}",
        contact.messaging_name, contact.messaging_host, contact.recipient
    ));
    lines.push(format!("    Email: {}", contact.email));
    lines.push(format!("    Signature: {}", contact.signature));

    lines.push(String::new());
    lines.push("Gallery".to_string());
    if config.gallery.is_empty() {
        lines.push("    (no categories)".to_string());
    }
    for (i, category) in config.gallery.iter().enumerate() {
        lines.push(entity_header(i + 1, &category.title, Some(category.images.len())));
        lines.push(format!("    Key: {}", category.key));
    }

    lines.push(String::new());
    lines.push("Timing".to_string());
    lines.push(format!(
        "    Carousel: {}ms autoplay, {}ms transition",
        config.carousel.autoplay_ms, config.carousel.transition_ms
    ));
    lines.push(format!(
        "    Notifications: {}ms",
        config.notifications.dismiss_ms
    ));
    lines.push(format!(
        "    Loader: {}ms + {}ms fade",
        config.loader.hide_after_ms, config.loader.fade_ms
    ));

    lines.push(String::new());
    lines.push("Config".to_string());
    if root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    } else {
        lines.push("    (stock defaults)".to_string());
    }

    lines
}

pub fn print_check_output(config: &SiteConfig, root: &Path) {
    for line in format_check_output(config, root) {
        println!("{}", line);
    }
}

// ============================================================================
// link
// ============================================================================

/// One line per failing field, in form order.
pub fn format_field_errors(errors: &[(Field, &str)]) -> Vec<String> {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field.name(), message))
        .collect()
}

// ============================================================================
// simulate
// ============================================================================

/// Render one page operation on a single line: `name key=value ...`.
///
/// Keys come out in alphabetical order. Markup is reduced to its text.
pub fn format_op(op: &PageOp) -> String {
    let value = match serde_json::to_value(op) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => return format!("{:?}", op),
    };
    let mut parts = Vec::new();
    for (key, value) in &value {
        if key == "op" {
            if let Some(name) = value.as_str() {
                parts.insert(0, name.to_string());
            }
            continue;
        }
        let rendered = match value {
            serde_json::Value::String(s) if s.contains('<') => {
                format!("{:?}", truncate_desc(&strip_html_tags(s), DETAIL_WIDTH))
            }
            serde_json::Value::String(s) => format!("{:?}", truncate_desc(s, DETAIL_WIDTH)),
            other => other.to_string(),
        };
        parts.push(format!("{}={}", key, rendered));
    }
    parts.join(" ")
}

fn entry_header(entry: &ReportEntry) -> String {
    match entry.source {
        Source::Timer => format!("{}ms {} (timer)", entry.at, entry.label),
        _ => format!("{}ms {}", entry.at, entry.label),
    }
}

/// Timeline of a simulated session followed by the final state.
///
/// Timer entries that changed nothing on the page are omitted.
pub fn format_simulate_output(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(err) = &report.init_error {
        lines.push(format!("Initialization failed: {}", err));
    }

    for entry in &report.entries {
        if entry.source == Source::Timer && entry.ops.is_empty() {
            continue;
        }
        lines.push(entry_header(entry));
        for op in &entry.ops {
            lines.push(format!("{}{}", indent(1), format_op(op)));
        }
    }

    let state = &report.state;
    lines.push(String::new());
    lines.push("Final state".to_string());
    let mut field = |name: &str, value: String| lines.push(format!("{}{}: {}", indent(1), name, value));
    field("time", format!("{}ms", state.now));
    if let Some(slide) = state.slide {
        field("slide", slide.to_string());
    }
    field("autoplay", state.autoplay.to_string());
    if let Some(section) = &state.active_section {
        field("section", section.clone());
    }
    field(
        "modal",
        state
            .modal
            .kind()
            .map_or_else(|| "none".to_string(), |kind| kind.dom_name().to_string()),
    );
    if let Some(notification) = &state.notification {
        field("notification", notification.message.clone());
    }
    for (name, message) in &state.field_errors {
        field(&format!("error[{}]", name.name()), message.clone());
    }
    field("pending timers", state.pending_timers.to_string());
    if state.disposed {
        field("disposed", "true".to_string());
    }

    lines
}

pub fn print_simulate_output(report: &Report) {
    for line in format_simulate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::{self, Script};
    use crate::types::SlideState;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn strip_html_tags_removes_tags() {
        assert_eq!(strip_html_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn strip_html_tags_separates_blocks() {
        assert_eq!(
            strip_html_tags("<div><h2>Title</h2><p>Body</p></div>"),
            "Title Body"
        );
    }

    #[test]
    fn strip_html_tags_empty() {
        assert_eq!(strip_html_tags(""), "");
    }

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_counts_chars_not_bytes() {
        assert_eq!(truncate_desc("🎨🎨🎨", 2), "🎨🎨...");
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn entity_header_counts() {
        assert_eq!(
            entity_header(1, "Water Colour", Some(3)),
            "001 Water Colour (3 images)"
        );
        assert_eq!(
            entity_header(3, "Colour Portrait", Some(1)),
            "003 Colour Portrait (1 image)"
        );
        assert_eq!(entity_header(2, "Misc", None), "002 Misc");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    // =========================================================================
    // check
    // =========================================================================

    #[test]
    fn check_lists_catalog_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let lines = format_check_output(&SiteConfig::default(), tmp.path());
        assert_eq!(lines[0], "Contact");
        assert_eq!(lines[1], "    WhatsApp: wa.me/916207806187");
        assert!(lines.contains(&"001 Abstract Acrylic (5 images)".to_string()));
        assert!(lines.contains(&"003 Colour Portrait (1 image)".to_string()));
        assert!(lines.contains(&"    Key: watercolor".to_string()));
        assert_eq!(lines.last().unwrap(), "    (stock defaults)");
    }

    #[test]
    fn check_notes_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("config.toml"), "").unwrap();
        let lines = format_check_output(&SiteConfig::default(), tmp.path());
        assert_eq!(lines.last().unwrap(), "    config.toml");
    }

    // =========================================================================
    // link
    // =========================================================================

    #[test]
    fn field_errors_name_the_input() {
        let lines = format_field_errors(&[
            (Field::Name, "Name must be at least 2 characters long"),
            (Field::Mobile, "Please enter a valid mobile number"),
        ]);
        assert_eq!(
            lines,
            vec![
                "name: Name must be at least 2 characters long",
                "mobile: Please enter a valid mobile number",
            ]
        );
    }

    // =========================================================================
    // simulate
    // =========================================================================

    #[test]
    fn op_fields_are_sorted_after_name() {
        let op = PageOp::SetSlideState {
            index: 2,
            state: SlideState::Active,
        };
        assert_eq!(format_op(&op), r#"set_slide_state index=2 state="active""#);
        assert_eq!(format_op(&PageOp::FadeLoader), "fade_loader");
    }

    #[test]
    fn op_markup_is_reduced_to_text() {
        let op = PageOp::ShowLoader {
            content: "<div class=\"loader\"><h2>Loading</h2><p>Please wait</p></div>".to_string(),
        };
        assert_eq!(format_op(&op), r#"show_loader content="Loading Please wait""#);
    }

    #[test]
    fn simulate_output_skips_idle_timers() {
        let script: Script = serde_json::from_str(r#"{"until": 1000}"#).unwrap();
        let report = simulate::run(SiteConfig::default(), script).unwrap();
        let lines = format_simulate_output(&report);
        assert_eq!(lines[0], "0ms init");
        // The transition release at 1000ms touches nothing on the page.
        assert!(!lines.iter().any(|l| l.contains("release_transition")));
        assert!(lines.contains(&"Final state".to_string()));
        assert!(lines.contains(&"    slide: 0".to_string()));
        assert!(lines.contains(&"    modal: none".to_string()));
    }

    #[test]
    fn simulate_output_reports_init_failure() {
        let mut script = Script::default();
        script.layout.carousel.indicators = 1;
        let report = simulate::run(SiteConfig::default(), script).unwrap();
        let lines = format_simulate_output(&report);
        assert!(lines[0].starts_with("Initialization failed:"));
    }
}
