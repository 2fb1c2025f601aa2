use std::fmt;
use std::str::FromStr;

use super::errors::PolicyError;

/// Path pattern for policy rules.
///
/// Segments match literally, `*` matches exactly one segment, and a trailing
/// `/**` matches the prefix itself and anything beneath it. Empty segments
/// are ignored on both sides, so `/admin/` and `/admin` are the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
    recursive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PolicyError> {
        let raw = pattern.trim();
        if !raw.starts_with('/') {
            return Err(PolicyError::InvalidPattern(format!(
                "'{raw}' must start with '/'"
            )));
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let recursive = parts.last() == Some(&"**");
        let fixed = if recursive {
            &parts[..parts.len() - 1]
        } else {
            &parts[..]
        };

        let segments = fixed
            .iter()
            .map(|part| match *part {
                "*" => Ok(Segment::Any),
                "**" => Err(PolicyError::InvalidPattern(format!(
                    "'{raw}': '**' is only allowed as the last segment"
                ))),
                "." | ".." => Err(PolicyError::InvalidPattern(format!(
                    "'{raw}': relative segments are not allowed"
                ))),
                literal => Ok(Segment::Literal(literal.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
            recursive,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let path_segments = normalize(path);

        if self.recursive {
            if path_segments.len() < self.segments.len() {
                return false;
            }
        } else if path_segments.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments.iter())
            .all(|(segment, actual)| match segment {
                Segment::Any => true,
                Segment::Literal(literal) => literal == actual,
            })
    }
}

/// Split a request path into segments, dropping the query string and resolving `.` and `..`.
fn normalize(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

impl FromStr for PathPattern {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
