//! Annotation and tag edits against a single trade.
//!
//! Chart annotations mirror themselves into the trade's note fields with a
//! recognizable prefix, so the journal text stays readable without the
//! chart. Deleting an annotation leaves its note line behind on purpose:
//! the written record outlives the marker.

use crate::domain::{Annotation, AnnotationId, TagKind, Trade};

/// Prefix for note lines that mirror a chart annotation.
pub const CHART_NOTE_PREFIX: &str = "[Chart] ";

/// Insert or replace an annotation and keep the trade's notes and tags in
/// step.
///
/// A new annotation appends `[Chart] {text}` to the note field of its
/// category. Editing an existing annotation rewrites the first matching
/// mirrored line in place when it is still there, and appends a fresh line
/// when the user has edited it away. An attached tag is applied to the
/// trade: setup is overwritten, multi-valued kinds are added once.
pub fn save_annotation(trade: &mut Trade, annotation: Annotation) {
    let note_line = format!("{CHART_NOTE_PREFIX}{}", annotation.text);
    let tag = annotation
        .tag_type
        .zip(annotation.tag_value.clone())
        .filter(|(_, value)| !value.is_empty());

    match trade.annotations.iter().position(|a| a.id == annotation.id) {
        Some(at) => {
            let old_text = trade.annotations[at].text.clone();
            if old_text != annotation.text {
                let old_line = format!("{CHART_NOTE_PREFIX}{old_text}");
                let field = trade.notes.get(annotation.category).to_string();
                if field.contains(&old_line) {
                    trade
                        .notes
                        .set(annotation.category, field.replacen(&old_line, &note_line, 1));
                } else {
                    trade.notes.append_line(annotation.category, &note_line);
                }
            }
            trade.annotations[at] = annotation;
        }
        None => {
            trade.notes.append_line(annotation.category, &note_line);
            trade.annotations.push(annotation);
        }
    }

    if let Some((kind, value)) = tag {
        ensure_tag(trade, kind, &value);
    }
}

/// Remove an annotation by id. Returns whether anything was removed. The
/// mirrored note line is kept.
pub fn delete_annotation(trade: &mut Trade, id: &AnnotationId) -> bool {
    let before = trade.annotations.len();
    trade.annotations.retain(|a| &a.id != id);
    trade.annotations.len() != before
}

/// Flip a tag on a trade. Multi-valued kinds toggle membership; the
/// single-valued setup is assigned, or cleared when it already matches.
/// Returns whether the tag is present afterwards.
pub fn toggle_tag(trade: &mut Trade, kind: TagKind, value: &str) -> bool {
    let tags = match kind {
        TagKind::Setup => {
            if trade.setup == value {
                trade.setup.clear();
                return false;
            }
            trade.setup = value.to_string();
            return true;
        }
        TagKind::Mistake => &mut trade.mistakes,
        TagKind::Success => &mut trade.successes,
        TagKind::Mindset => &mut trade.mindsets,
    };
    match tags.iter().position(|t| t == value) {
        Some(at) => {
            tags.remove(at);
            false
        }
        None => {
            tags.push(value.to_string());
            true
        }
    }
}

fn ensure_tag(trade: &mut Trade, kind: TagKind, value: &str) {
    let tags = match kind {
        TagKind::Setup => {
            trade.setup = value.to_string();
            return;
        }
        TagKind::Mistake => &mut trade.mistakes,
        TagKind::Success => &mut trade.successes,
        TagKind::Mindset => &mut trade.mindsets,
    };
    if !tags.iter().any(|t| t == value) {
        tags.push(value.to_string());
    }
}
