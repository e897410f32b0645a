/*!
 * Plain-text rendering of the results view for the terminal.
 */

use std::fmt::Write;

use crate::model::{ArtDirection, ScriptDocument};
use crate::session::{ResultSession, Selection, SessionView};

/// Render the script section. Line numbers are 1-based; the selected line is
/// marked with `>`.
pub fn render_script(document: &ScriptDocument, selection: &Selection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Generated Script");
    let _ = writeln!(out, "Estimated Duration: {}", document.script.estimated_duration);
    for (index, line) in document.script.lines.iter().enumerate() {
        let marker = if selection.is_selected(index) { '>' } else { ' ' };
        let _ = writeln!(out, "{} {:>2}. {}", marker, index + 1, line.text);
        let _ = writeln!(out, "       Voice Direction: {}", line.voice_direction);
    }
    out
}

/// Render the art direction section
pub fn render_art_direction(art: &ArtDirection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Art Direction");
    let _ = writeln!(out, "  Visual Style: {}", art.visual_style);
    let _ = writeln!(out, "  Color Palette: {}", art.color_palette.join(", "));
    let _ = writeln!(out, "  Typography: headings {}, body {}", art.typography.headings, art.typography.body);
    let _ = writeln!(out, "  Key Visual Elements:");
    for element in &art.key_elements {
        let _ = writeln!(out, "    - {}", element);
    }
    let _ = writeln!(out, "  Layout: {}", art.layout);
    out
}

/// Render the whole results view, including the refine panel and any error
pub fn render_session(session: &ResultSession) -> String {
    let document = match session.view() {
        SessionView::Ready(document) => document,
        SessionView::NoData => return "No script data available\n".to_string(),
        SessionView::Error(message) => return format!("No script data available ({})\n", message),
    };

    let selection = session.selection();
    let mut out = render_script(&document, &selection);

    if let Some(index) = selection.index() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Refine Selected Line ({})", index + 1);
        let feedback = selection.feedback();
        if feedback.is_empty() {
            let _ = writeln!(out, "  Feedback: <none>");
        } else {
            let _ = writeln!(out, "  Feedback: {}", feedback);
        }
        let _ = writeln!(out, "  [{}]", session.refine_label());
    }
    if let Some(error) = session.last_error() {
        let _ = writeln!(out, "Error: {}", error);
    }

    let _ = writeln!(out);
    out.push_str(&render_art_direction(&document.art_direction));
    out
}
