use std::{
    borrow::Cow,
    error::Error,
    fmt::{self, Display},
    mem,
};

use facet_core::{Def, Facet, Shape, Type, UserType};
use facet_reflect::{Partial, ReflectError};
use heck::ToLowerCamelCase;

use crate::{
    FieldExt, ParseFailure, ScalarType, ScalarValue, TagSource, TagwalkError, TagwalkErrorKind,
    coerce, deep_indirect,
};

/// A tag value that could not be converted into its destination field.
#[derive(Clone, Debug, PartialEq)]
pub struct CoerceError {
    /// The tag key that was read.
    pub key: String,
    /// The raw tag value.
    pub raw: String,
    /// The type the value was coerced into.
    pub target: ScalarType,
    /// Why the conversion failed.
    pub failure: ParseFailure,
}

impl Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse {} value {} in tag {}: {}",
            self.target.kind_name(),
            self.raw,
            self.key,
            self.failure
        )
    }
}

impl Error for CoerceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.failure)
    }
}

/// The tag key a field is read from: its name in lowerCamelCase.
pub fn tag_key(field_name: &str) -> String {
    field_name.to_lower_camel_case()
}

/// Looks up a field's value.
///
/// Exact matches on the lowerCamelCase key and on the declared name come
/// first; after them both spellings are tried again ignoring ASCII case.
/// The returned key is the one found in `source`.
fn lookup_field<'s, S>(source: &'s S, field_name: &str) -> Option<(String, Cow<'s, str>)>
where
    S: TagSource + ?Sized,
{
    let key = tag_key(field_name);
    if let Some(raw) = source.lookup_tag(&key) {
        return Some((key, raw));
    }
    if key != field_name {
        if let Some(raw) = source.lookup_tag(field_name) {
            return Some((field_name.to_owned(), raw));
        }
    }
    let (found, raw) = source
        .lookup_tag_ignore_case(&key)
        .or_else(|| source.lookup_tag_ignore_case(field_name))?;
    log::trace!("{field_name} matched key {found} ignoring case");
    Some((found.into_owned(), raw))
}

/// The scalar a tag value must be coerced into to land in `shape`, looking
/// through options and pointers.
fn assignable_scalar(shape: &'static Shape) -> Option<ScalarType> {
    ScalarType::from_shape(deep_indirect(shape)).filter(|scalar| *scalar != ScalarType::Str)
}

fn coerce_for(key: &str, raw: &str, target: ScalarType) -> Result<ScalarValue, CoerceError> {
    coerce(raw, target).map_err(|failure| CoerceError {
        key: key.to_owned(),
        raw: raw.to_owned(),
        target,
        failure,
    })
}

/// Stores `value` into the frame `partial` is positioned at, entering
/// options and smart pointers on the way down.
fn set_scalar(partial: &mut Partial<'_>, value: ScalarValue) -> Result<(), ReflectError> {
    match partial.shape().def {
        Def::Option(_) => {
            partial.begin_some()?;
            set_scalar(partial, value)?;
            partial.end()?;
        }
        Def::Pointer(_) => {
            partial.begin_smart_ptr()?;
            set_scalar(partial, value)?;
            partial.end()?;
        }
        _ => value.set_into(partial)?,
    }
    Ok(())
}

/// Fills the exported fields of `dest` from `source`.
///
/// Each field is read from the key named after it in lowerCamelCase
/// (`max_length` reads `maxLength`), falling back to the declared name and
/// then to either spelling in any letter case. Scalar fields are
/// overwritten, `Option` fields become `Some` only when their key is
/// present, and fields with absent keys or non-scalar types are left alone.
///
/// Every field is attempted. Failures are collected into a single
/// [`TagwalkErrorKind::Coercion`] error; fields that were read successfully
/// keep their new values.
///
/// The value is rebuilt through [`Partial`], so `dest` briefly holds
/// `T::default()`; it is left there if reflection itself fails.
pub fn populate_fields_from_tags<'facet, T, S>(dest: &mut T, source: &S) -> Result<(), TagwalkError>
where
    T: Facet<'facet> + Default,
    S: TagSource + ?Sized,
{
    let shape = T::SHAPE;
    log::trace!("populating {shape} from tags");
    let Type::User(UserType::Struct(struct_def)) = shape.ty else {
        return Err(TagwalkErrorKind::WrongShape {
            expected: "struct",
            actual: shape,
        }
        .into());
    };

    let mut updates = Vec::new();
    let mut errors = Vec::new();
    for (index, field) in struct_def.fields.iter().enumerate() {
        if !field.is_exported() {
            continue;
        }
        let Some(target) = assignable_scalar(field.shape) else {
            continue;
        };
        let Some((key, raw)) = lookup_field(source, field.name) else {
            continue;
        };
        match coerce_for(&key, &raw, target) {
            Ok(value) => updates.push((index, value)),
            Err(error) => {
                log::debug!("{error}");
                errors.push(error);
            }
        }
    }

    if !updates.is_empty() {
        let mut typed_partial = Partial::alloc::<T>()?;
        {
            let partial = typed_partial.inner_mut();
            partial.set(mem::take(dest))?;
            for (index, value) in updates {
                partial.begin_nth_field(index)?;
                set_scalar(partial, value)?;
                partial.end()?;
            }
        }
        *dest = *typed_partial.build()?;
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TagwalkErrorKind::Coercion(errors).into())
    }
}

/// Reads `key` from `source` into `dest`, which may be a scalar, an
/// `Option` of a scalar or a smart pointer to one.
///
/// Returns whether the key was present. `dest` is untouched when it is not.
pub fn read_tag<'facet, S, T>(source: &S, key: &str, dest: &mut T) -> Result<bool, TagwalkError>
where
    S: TagSource + ?Sized,
    T: Facet<'facet>,
{
    let Some(raw) = source.lookup_tag(key) else {
        return Ok(false);
    };
    let Some(target) = assignable_scalar(T::SHAPE) else {
        return Err(TagwalkErrorKind::WrongShape {
            expected: "scalar",
            actual: T::SHAPE,
        }
        .into());
    };
    let value = coerce_for(key, &raw, target)?;

    let mut typed_partial = Partial::alloc::<T>()?;
    set_scalar(typed_partial.inner_mut(), value)?;
    *dest = *typed_partial.build()?;
    Ok(true)
}
