//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile `/users/:id/*rest` style patterns into segments
//! - Match concrete paths, extracting params
//! - Build concrete paths back from params (named navigation)
//!
//! # Design Decisions
//! - Static segments are case-sensitive
//! - Empty segments are ignored, so `/a//b/` matches `/a/b`
//! - A catch-all (`*` or `*name`) must be the last segment and may match
//!   nothing; an unnamed catch-all captures into `pathMatch`
//! - No regex to keep matching linear in the number of segments

use crate::location::{Params, QueryValue};
use crate::matcher::MatcherError;

const DEFAULT_CATCH_ALL: &str = "pathMatch";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A compiled absolute path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern.
    pub fn parse(raw: &str) -> Result<Self, MatcherError> {
        let invalid = |reason: &str| MatcherError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = split_segments(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter without a name"));
                }
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != parts.len() {
                    return Err(invalid("catch-all must be the last segment"));
                }
                let name = if name.is_empty() { DEFAULT_CATCH_ALL } else { name };
                Segment::CatchAll(name.to_string())
            } else {
                Segment::Static((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of every parameter, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Match a concrete path, returning the extracted params.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = split_segments(path).collect();
        let mut params = Params::new();
        let mut index = 0;

        for segment in &self.segments {
            match segment {
                Segment::Static(expected) => {
                    if parts.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                    index += 1;
                }
                Segment::Param(name) => {
                    let value = parts.get(index)?;
                    params.insert(name.clone(), QueryValue::from(*value));
                    index += 1;
                }
                Segment::CatchAll(name) => {
                    let rest = parts.get(index..).unwrap_or_default().join("/");
                    params.insert(name.clone(), QueryValue::from(rest));
                    index = parts.len();
                }
            }
        }

        (index == parts.len()).then_some(params)
    }

    /// Build a concrete path. Returns the name of the first missing param on
    /// failure.
    pub fn build(&self, params: &Params) -> Result<String, String> {
        let mut path = String::new();
        for segment in &self.segments {
            let piece = match segment {
                Segment::Static(value) => value.clone(),
                Segment::Param(name) => params
                    .get(name)
                    .and_then(QueryValue::first)
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| name.clone())?
                    .to_string(),
                Segment::CatchAll(name) => match params.get(name) {
                    Some(value) => value.values().collect::<Vec<_>>().join("/"),
                    None => String::new(),
                },
            };
            if !piece.is_empty() {
                path.push('/');
                path.push_str(piece.trim_matches('/'));
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

/// Join a child pattern onto its parent's absolute pattern.
pub fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
