//! Dotted field-path resolution against a [`Schema`].

use crate::errors::FilterError;
use crate::schema::{FieldType, Schema};

use super::types::DataType;
use super::MAX_PATH_DEPTH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Declared field name, in the schema's casing.
    pub name: String,
    /// How many collection levels the field wraps (0 for a plain field,
    /// 2 for a list of lists).
    pub collection_depth: usize,
}

/// A run of path segments ending at a collection field; everything after it is
/// evaluated against each element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub path: Vec<String>,
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub segments: Vec<PathSegment>,
    pub leaf: DataType,
}

impl ResolvedPath {
    /// Normalized dotted path with schema casing.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.segments.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(".")
    }

    /// True when any segment crosses a collection.
    #[must_use]
    pub fn is_existential(&self) -> bool {
        self.segments.iter().any(|s| s.collection_depth > 0)
    }

    /// Splits the path into existential hops (outermost first) and the leaf
    /// path relative to the innermost element. The leaf path is empty when
    /// the path ends on a collection of scalars.
    #[must_use]
    pub fn split_hops(&self) -> (Vec<Hop>, Vec<String>) {
        let mut hops = Vec::new();
        let mut pending = Vec::new();
        for seg in &self.segments {
            pending.push(seg.name.clone());
            if seg.collection_depth > 0 {
                hops.push(Hop { path: std::mem::take(&mut pending), depth: seg.collection_depth });
            }
        }
        (hops, pending)
    }
}

/// Resolves `path` case-insensitively. The path must end on a scalar field.
///
/// # Errors
/// `FilterError::InvalidField` if the path is empty, a segment is unknown, a
/// segment descends into a scalar, or the path ends on a record.
pub fn resolve_path(schema: &Schema, path: &str) -> Result<ResolvedPath, FilterError> {
    let invalid = || FilterError::InvalidField(path.to_owned());
    let parts: Vec<&str> = path.split('.').map(str::trim).filter(|s| !s.is_empty()).collect();
    if parts.is_empty() || parts.len() > MAX_PATH_DEPTH {
        return Err(invalid());
    }

    let mut current = schema;
    let mut segments = Vec::with_capacity(parts.len());
    let mut leaf = None;
    for (i, part) in parts.iter().enumerate() {
        let def = current.lookup(part).ok_or_else(invalid)?;
        let mut ty = &def.ty;
        let mut depth = 0usize;
        while let FieldType::List(inner) = ty {
            depth += 1;
            ty = inner.as_ref();
        }
        segments.push(PathSegment { name: def.name.clone(), collection_depth: depth });
        let last = i + 1 == parts.len();
        match ty {
            FieldType::Record(next) if !last => current = next.as_ref(),
            FieldType::Scalar(dt) if last => leaf = Some(*dt),
            _ => return Err(invalid()),
        }
    }
    let resolved = ResolvedPath { segments, leaf: leaf.ok_or_else(invalid)? };
    log::trace!("resolved field path '{path}' to '{}'", resolved.canonical());
    Ok(resolved)
}
