//! Section hierarchy construction from the flat block list.
//!
//! A single pass with a stack of open sections. Headings open a section at
//! their level, popping anything at the same or deeper level first; body
//! blocks append to the innermost open section. Malformed nesting is
//! repaired, never rejected.

use std::collections::HashMap;

use crate::normalize::Block;
use crate::types::Section;

/// Label of the implicit root section holding content that precedes any
/// heading.
pub const PREAMBLE_LABEL: &str = "Innledning";

struct Frame {
    level: u8,
    section: Section,
    child_labels: HashMap<String, usize>,
}

/// Pop the innermost frame and attach its section to its parent (or the
/// root list).
fn close(stack: &mut Vec<Frame>, roots: &mut Vec<Section>) {
    if let Some(frame) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.section.children.push(frame.section),
            None => roots.push(frame.section),
        }
    }
}

/// Make `label` unique among its siblings, suffixing ` (2)`, ` (3)` … on
/// collision.
fn dedup_label(label: &str, seen: &mut HashMap<String, usize>, warnings: &mut Vec<String>) -> String {
    let n = seen.get(label).copied().unwrap_or(0) + 1;
    seen.insert(label.to_string(), n);
    if n == 1 {
        return label.to_string();
    }
    let unique = format!("{label} ({n})");
    seen.entry(unique.clone()).or_insert(1);
    warnings.push(format!(
        "duplicate sibling label {label:?} renamed to {unique:?}"
    ));
    unique
}

/// Build the section tree from extracted blocks.
///
/// Repairs applied along the way, each with a warning:
/// - content before any heading goes into an implicit [`PREAMBLE_LABEL`]
///   root section;
/// - a heading deeper than the current nesting allows (orphan sub-heading)
///   is attached at the top level;
/// - duplicate sibling labels are disambiguated with a numeric suffix.
#[must_use]
pub fn build(blocks: &[Block], warnings: &mut Vec<String>) -> Vec<Section> {
    let mut roots: Vec<Section> = Vec::new();
    let mut root_labels: HashMap<String, usize> = HashMap::new();
    let mut stack: Vec<Frame> = Vec::new();

    for block in blocks {
        match block {
            Block::Heading { level, label, title } => {
                let level = (*level).max(1);

                // Close same-or-deeper sections (the preamble frame, at
                // u8::MAX, closes on any heading).
                while stack.last().is_some_and(|f| f.level >= level) {
                    close(&mut stack, &mut roots);
                }

                if level as usize > stack.len() + 1 {
                    warnings.push(format!(
                        "orphan heading {label:?} (level {level}) attached at top level"
                    ));
                    while !stack.is_empty() {
                        close(&mut stack, &mut roots);
                    }
                }

                let (parent_path, labels) = match stack.last_mut() {
                    Some(frame) => (frame.section.path.clone(), &mut frame.child_labels),
                    None => (Vec::new(), &mut root_labels),
                };
                let unique = dedup_label(label, labels, warnings);

                let mut path = parent_path;
                path.push(unique);
                let mut section = Section::new(path);
                section.heading = title.clone();

                stack.push(Frame {
                    level,
                    section,
                    child_labels: HashMap::new(),
                });
            }
            Block::Paragraph(text) | Block::Preserved(text) => {
                if stack.is_empty() {
                    let unique = dedup_label(PREAMBLE_LABEL, &mut root_labels, warnings);
                    stack.push(Frame {
                        level: u8::MAX,
                        section: Section::new(vec![unique]),
                        child_labels: HashMap::new(),
                    });
                }
                if let Some(frame) = stack.last_mut() {
                    frame.section.body.push(text.clone());
                }
            }
        }
    }

    while !stack.is_empty() {
        close(&mut stack, &mut roots);
    }

    roots
}
