#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

use std::{
    error::Error,
    fmt::{self, Display},
};

use facet_core::Shape;
use facet_reflect::ReflectError;

mod classify;
mod field;
mod populate;
mod scalar;
mod tags;
mod type_name;
mod walk;

pub use classify::{
    as_type, deep_indirect, find_embedded_slice_or_map, is_scalar, is_slice_or_map, is_struct,
    is_zero, no_empty_fields,
};
pub use facet_reflect::Peek;
pub use field::{FieldExt, IGNORE, PRIVATE, Tag};
pub use populate::{CoerceError, populate_fields_from_tags, read_tag, tag_key};
pub use scalar::{ParseBoolError, ParseFailure, ScalarType, ScalarValue, coerce, parse_bool};
pub use tags::{StructTag, TagSource};
pub use type_name::{
    NamedParts, PACKAGE_SEPARATOR, TypeString, type_string_in, type_string_of, type_string_of_val,
};
pub use walk::{
    FieldPath, VisitedField, has_tagged_fields, tagged_name, walk_fields_recursively,
    walk_tagged_fields, walk_tagged_peek,
};

/// Error type for walking, resolving and populating.
#[derive(Debug)]
pub struct TagwalkError {
    kind: TagwalkErrorKind,
}

impl TagwalkError {
    /// Returns a reference to the error kind for detailed error inspection.
    pub fn kind(&self) -> &TagwalkErrorKind {
        &self.kind
    }

    /// Consumes the error, returning its kind.
    pub fn into_kind(self) -> TagwalkErrorKind {
        self.kind
    }
}

impl Display for TagwalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.kind;
        write!(f, "{kind}")
    }
}

impl Error for TagwalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            TagwalkErrorKind::Coercion(errors) if errors.len() == 1 => Some(&errors[0]),
            _ => None,
        }
    }
}

impl<K: Into<TagwalkErrorKind>> From<K> for TagwalkError {
    fn from(value: K) -> Self {
        let kind = value.into();
        TagwalkError { kind }
    }
}

/// Detailed classification of errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum TagwalkErrorKind {
    /// One or more tag values could not be converted, in field order.
    Coercion(Vec<CoerceError>),
    /// A field path was not reached by a tagged walk under the namespace:
    /// it does not exist, is ignored, is untagged, or sits below a field
    /// that is not flattened.
    UnreachableField {
        /// The requested path.
        path: FieldPath,
        /// The namespace of the walk.
        namespace: String,
    },
    /// The value does not have the expected kind.
    WrongShape {
        /// What was expected, e.g. `struct`.
        expected: &'static str,
        /// The shape that was received.
        actual: &'static Shape,
    },
    /// Fields holding their zero value.
    MissingFields(Vec<&'static str>),
    /// Error from the reflection system while rebuilding a value.
    Reflect(ReflectError),
}

impl Display for TagwalkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagwalkErrorKind::Coercion(errors) => {
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            TagwalkErrorKind::UnreachableField { path, namespace } => {
                write!(
                    f,
                    "field '{path}' is not reachable under namespace '{namespace}'"
                )
            }
            TagwalkErrorKind::WrongShape { expected, actual } => {
                write!(f, "{expected} expected, {actual} received")
            }
            TagwalkErrorKind::MissingFields(names) => {
                write!(f, "missing: [{}]", names.join(" "))
            }
            TagwalkErrorKind::Reflect(reflect_error) => write!(f, "{reflect_error}"),
        }
    }
}

impl From<CoerceError> for TagwalkErrorKind {
    fn from(value: CoerceError) -> Self {
        Self::Coercion(vec![value])
    }
}

impl From<ReflectError> for TagwalkErrorKind {
    fn from(value: ReflectError) -> Self {
        Self::Reflect(value)
    }
}
