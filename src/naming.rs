//! Folder label sanitization and name table validation.
//!
//! Runs before any filesystem mutation so a bad table never leaves
//! half-written output behind.

const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NameTableError {
    #[error("expected {expected} {axis} names, got {got}")]
    LengthMismatch {
        axis: Axis,
        expected: usize,
        got: usize,
    },

    #[error("duplicate {axis} name after sanitizing: {label}")]
    DuplicateLabel { axis: Axis, label: String },
}

/// Makes a user-supplied label safe to use as a path segment.
///
/// Forbidden filesystem characters and control characters become `_`,
/// internal whitespace runs collapse to a single `_`, and a label that
/// sanitizes away entirely or to dots only becomes `unnamed`.
pub fn sanitize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_gap = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }

        if pending_gap {
            out.push('_');
            pending_gap = false;
        }

        if ch.is_control() || FORBIDDEN.contains(&ch) {
            out.push('_');
        } else {
            out.push(ch);
        }
    }

    // `.` and `..` are path traversal as a segment, never a folder name
    if out.is_empty() || out.chars().all(|c| c == '.') {
        "unnamed".to_owned()
    } else {
        out
    }
}

/// Validated per-axis folder labels, one entry per row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTable {
    labels: Vec<String>,
}

impl NameTable {
    pub fn new(raw: &[String], expected: usize, axis: Axis) -> Result<Self, NameTableError> {
        if raw.len() != expected {
            return Err(NameTableError::LengthMismatch {
                axis,
                expected,
                got: raw.len(),
            });
        }

        let labels = raw.iter().map(|l| sanitize_label(l)).collect::<Vec<_>>();

        for (idx, label) in labels.iter().enumerate() {
            if labels[..idx].contains(label) {
                return Err(NameTableError::DuplicateLabel {
                    axis,
                    label: label.clone(),
                });
            }
        }

        Ok(Self { labels })
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.labels.get(index as usize).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn sanitize_passes_clean_labels_through() {
        assert_eq!(sanitize_label("attack"), "attack");
        assert_eq!(sanitize_label("idle-2"), "idle-2");
    }

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(sanitize_label("a/b:c"), "a_b_c");
        assert_eq!(sanitize_label("what?"), "what_");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_label("walk  left"), "walk_left");
        assert_eq!(sanitize_label("  trimmed \t name "), "trimmed_name");
    }

    #[test]
    fn sanitize_falls_back_for_empty_labels() {
        assert_eq!(sanitize_label(""), "unnamed");
        assert_eq!(sanitize_label("   "), "unnamed");
    }

    #[test]
    fn sanitize_rejects_dot_only_labels() {
        assert_eq!(sanitize_label("."), "unnamed");
        assert_eq!(sanitize_label(".."), "unnamed");
        assert_eq!(sanitize_label("..."), "unnamed");
        assert_eq!(sanitize_label(" .. "), "unnamed");
        // dots inside a real name stay untouched
        assert_eq!(sanitize_label("v1.2"), "v1.2");
        assert_eq!(sanitize_label(".hidden"), ".hidden");
    }

    #[test]
    fn table_rejects_length_mismatch() {
        let err = NameTable::new(&strings(&["a", "b"]), 3, Axis::Row).unwrap_err();
        assert_eq!(
            err,
            NameTableError::LengthMismatch {
                axis: Axis::Row,
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn table_rejects_duplicates_after_sanitizing() {
        // distinct raw labels that collide once sanitized
        let err = NameTable::new(&strings(&["a b", "a  b"]), 2, Axis::Column).unwrap_err();
        assert_eq!(
            err,
            NameTableError::DuplicateLabel {
                axis: Axis::Column,
                label: "a_b".to_owned()
            }
        );
    }

    #[test]
    fn table_lookup() {
        let table = NameTable::new(&strings(&["top", "bottom"]), 2, Axis::Row).unwrap();
        assert_eq!(table.get(0), Some("top"));
        assert_eq!(table.get(1), Some("bottom"));
        assert_eq!(table.get(2), None);
    }
}
