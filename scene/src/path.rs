//! Attribute path parsing.
//!
//! Attribute paths are dotted sequences of identifiers with optional indices:
//! `"tx"`, `"target[1]"`, `"pivot.pivotX"`. Node paths are handled separately
//! (`|`-separated full paths or bare leaf names).

use once_cell::sync::Lazy;
use regex_lite::Regex;

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static pattern"));

/// Returns true for a well-formed node or attribute identifier.
pub(crate) fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// One step of an attribute path: a name plus an optional element index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSegment {
    pub name: String,
    pub index: Option<usize>,
}

/// Parsed attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrAddr {
    segments: Vec<AttrSegment>,
}

impl AttrAddr {
    /// Parse an attribute path; `None` for malformed input.
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = Vec::new();
        for part in path.split('.') {
            let (name, index) = match part.find('[') {
                Some(open) => {
                    if !part.ends_with(']') {
                        return None;
                    }
                    let idx: usize = part[open + 1..part.len() - 1].parse().ok()?;
                    (&part[..open], Some(idx))
                }
                None => (part, None),
            };
            if !is_valid_name(name) {
                return None;
            }
            segments.push(AttrSegment {
                name: name.to_string(),
                index,
            });
        }
        if segments.is_empty() {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[AttrSegment] {
        &self.segments
    }

    /// The final step, which carries the element index if any.
    pub fn leaf(&self) -> &AttrSegment {
        self.segments.last().expect("segments are never empty")
    }

    /// Element index on the final step.
    pub fn index(&self) -> Option<usize> {
        self.leaf().index
    }
}

impl std::fmt::Display for AttrAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", seg.name)?;
            if let Some(idx) = seg.index {
                write!(f, "[{}]", idx)?;
            }
        }
        Ok(())
    }
}
