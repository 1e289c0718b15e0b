//! Templates with named insertion points.

use crate::ShaderError;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Include(String),
}

/// A parsed shader template.
///
/// Every line of the form `#include <name>` becomes the insertion point
/// `name`. All other lines are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    name: String,
    segments: Vec<Segment>,
}

impl ShaderSource {
    pub fn parse(name: impl Into<String>, source: &str) -> Self {
        let segments = source
            .lines()
            .map(|line| match include_name(line) {
                Some(point) => Segment::Include(point.to_string()),
                None => Segment::Text(line.to_string()),
            })
            .collect();
        Self {
            name: name.into(),
            segments,
        }
    }

    /// Template name, used in error messages and labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_point(&self, point: &str) -> bool {
        self.position(point).is_some()
    }

    /// Names of the insertion points still present, in source order.
    pub fn points(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Include(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Insert `code` right after the insertion point, keeping the point.
    pub fn insert_after(&mut self, point: &str, code: &str) -> Result<(), ShaderError> {
        let index = self.require(point)?;
        self.segments.insert(index + 1, Segment::Text(code.to_string()));
        Ok(())
    }

    /// Insert `code` right before the insertion point, keeping the point.
    pub fn insert_before(&mut self, point: &str, code: &str) -> Result<(), ShaderError> {
        let index = self.require(point)?;
        self.segments.insert(index, Segment::Text(code.to_string()));
        Ok(())
    }

    /// Replace the insertion point with `code`. The point is consumed.
    pub fn replace(&mut self, point: &str, code: &str) -> Result<(), ShaderError> {
        let index = self.require(point)?;
        self.segments[index] = Segment::Text(code.to_string());
        Ok(())
    }

    /// Drop the insertion point so it expands to nothing.
    pub fn remove(&mut self, point: &str) -> Result<(), ShaderError> {
        let index = self.require(point)?;
        self.segments.remove(index);
        Ok(())
    }

    /// Expand the remaining insertion points with `chunks` and return the final source.
    pub fn resolve<F>(&self, chunks: F) -> Result<String, ShaderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Include(point) => {
                    let code = chunks(point).ok_or_else(|| ShaderError::UnknownChunk {
                        template: self.name.clone(),
                        chunk: point.clone(),
                    })?;
                    out.push_str(&code);
                }
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn position(&self, point: &str) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| matches!(segment, Segment::Include(name) if name == point))
    }

    fn require(&self, point: &str) -> Result<usize, ShaderError> {
        self.position(point)
            .ok_or_else(|| ShaderError::MissingInsertionPoint {
                template: self.name.clone(),
                point: point.to_string(),
            })
    }
}

fn include_name(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix("#include")?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}
