use facet_core::{Def, Facet, Shape, Type, UserType};
use facet_reflect::Peek;

use crate::{FieldExt, ScalarType, TagwalkError, TagwalkErrorKind};

/// What a value is behind one level of `Option` or pointer.
pub(crate) enum Pointee<'mem, 'facet> {
    /// Neither an option nor a pointer.
    Value,
    /// The value held or pointed at.
    Target(Peek<'mem, 'facet>),
    /// `None`, or a pointer with nothing to borrow.
    Nil,
}

/// Looks one level through an `Option` or a pointer.
pub(crate) fn pointee<'mem, 'facet>(value: Peek<'mem, 'facet>) -> Pointee<'mem, 'facet> {
    match value.shape().def {
        Def::Option(_) => match value.into_option() {
            Ok(option) => option.value().map_or(Pointee::Nil, Pointee::Target),
            Err(_) => Pointee::Value,
        },
        Def::Pointer(_) => match value.into_pointer() {
            Ok(pointer) => pointer.borrow_inner().map_or(Pointee::Nil, Pointee::Target),
            Err(_) => Pointee::Value,
        },
        _ => Pointee::Value,
    }
}

fn indirect(shape: &'static Shape) -> Option<&'static Shape> {
    match shape.def {
        Def::Option(option_def) => Some(option_def.t),
        Def::Pointer(pointer_def) => pointer_def.pointee(),
        _ => None,
    }
}

/// Follows options and pointers down to the first shape that is neither.
pub fn deep_indirect(shape: &'static Shape) -> &'static Shape {
    let mut shape = shape;
    while let Some(inner) = indirect(shape) {
        shape = inner;
    }
    shape
}

/// Whether `shape` is a struct, possibly behind options and pointers.
pub fn is_struct(shape: &'static Shape) -> bool {
    matches!(
        deep_indirect(shape).ty,
        Type::User(UserType::Struct(_))
    )
}

/// Whether `shape` is a list, slice, array or map, possibly behind options
/// and pointers.
pub fn is_slice_or_map(shape: &'static Shape) -> bool {
    matches!(
        deep_indirect(shape).def,
        Def::List(_) | Def::Slice(_) | Def::Array(_) | Def::Map(_)
    )
}

/// Whether `shape` is a scalar, possibly behind options and pointers.
pub fn is_scalar(shape: &'static Shape) -> bool {
    ScalarType::from_shape(deep_indirect(shape)).is_some()
}

/// Finds the first embedded field of `shape` (or of its embedded structs,
/// depth first) whose type is a list, slice, array or map.
pub fn find_embedded_slice_or_map(shape: &'static Shape) -> Option<&'static Shape> {
    let Type::User(UserType::Struct(struct_def)) = deep_indirect(shape).ty else {
        return None;
    };
    struct_def
        .fields
        .iter()
        .filter(|field| field.is_embedded())
        .find_map(|field| {
            let field_shape = field.shape;
            if is_slice_or_map(field_shape) {
                Some(field_shape)
            } else {
                find_embedded_slice_or_map(field_shape)
            }
        })
}

/// Whether `value` equals the zero value of its type.
///
/// Scalars compare against their zero (`-0.0` is not the zero float),
/// options are zero when `None`, collections when empty, arrays and structs
/// when every element or field is. Pointers are never zero.
pub fn is_zero<'facet, T: Facet<'facet>>(value: &T) -> bool {
    peek_is_zero(Peek::new(value))
}

pub(crate) fn peek_is_zero(value: Peek<'_, '_>) -> bool {
    let shape = value.shape();
    if let Some(scalar) = ScalarType::from_shape(shape) {
        return scalar_is_zero(value, scalar);
    }
    match shape.def {
        Def::Option(_) => {
            return value
                .into_option()
                .is_ok_and(|option| option.is_none());
        }
        Def::Pointer(_) => return false,
        Def::List(_) | Def::Slice(_) => {
            return value
                .into_list_like()
                .is_ok_and(|list| list.len() == 0);
        }
        Def::Array(_) => {
            return value
                .into_list_like()
                .is_ok_and(|list| list.iter().all(peek_is_zero));
        }
        Def::Map(_) => return value.into_map().is_ok_and(|map| map.len() == 0),
        _ => {}
    }
    match value.into_struct() {
        Ok(struct_peek) => (0..struct_peek.ty().fields.len())
            .all(|index| struct_peek.field(index).is_ok_and(peek_is_zero)),
        Err(_) => {
            log::trace!("{shape} has no zero value, treating it as set");
            false
        }
    }
}

fn scalar_is_zero(value: Peek<'_, '_>, scalar: ScalarType) -> bool {
    match scalar {
        ScalarType::Bool => value.get::<bool>().is_ok_and(|v| !*v),
        ScalarType::Char => value.get::<char>().is_ok_and(|v| *v == '\0'),
        ScalarType::String => value.get::<String>().is_ok_and(String::is_empty),
        ScalarType::Str => value.as_str().is_some_and(str::is_empty),
        ScalarType::I8 => value.get::<i8>().is_ok_and(|v| *v == 0),
        ScalarType::I16 => value.get::<i16>().is_ok_and(|v| *v == 0),
        ScalarType::I32 => value.get::<i32>().is_ok_and(|v| *v == 0),
        ScalarType::I64 => value.get::<i64>().is_ok_and(|v| *v == 0),
        ScalarType::I128 => value.get::<i128>().is_ok_and(|v| *v == 0),
        ScalarType::Isize => value.get::<isize>().is_ok_and(|v| *v == 0),
        ScalarType::U8 => value.get::<u8>().is_ok_and(|v| *v == 0),
        ScalarType::U16 => value.get::<u16>().is_ok_and(|v| *v == 0),
        ScalarType::U32 => value.get::<u32>().is_ok_and(|v| *v == 0),
        ScalarType::U64 => value.get::<u64>().is_ok_and(|v| *v == 0),
        ScalarType::U128 => value.get::<u128>().is_ok_and(|v| *v == 0),
        ScalarType::Usize => value.get::<usize>().is_ok_and(|v| *v == 0),
        // -0.0 is not the zero value
        ScalarType::F32 => value.get::<f32>().is_ok_and(|v| v.to_bits() == 0),
        ScalarType::F64 => value.get::<f64>().is_ok_and(|v| v.to_bits() == 0),
    }
}

/// Checks that no field of the struct behind `value` holds its zero value.
///
/// Fails with [`TagwalkErrorKind::MissingFields`] naming the zero fields in
/// declaration order, or [`TagwalkErrorKind::WrongShape`] for non-structs.
pub fn no_empty_fields<'facet, T: Facet<'facet>>(value: &T) -> Result<(), TagwalkError> {
    peek_no_empty_fields(Peek::new(value))
}

fn peek_no_empty_fields(value: Peek<'_, '_>) -> Result<(), TagwalkError> {
    let shape = value.shape();
    if let Pointee::Target(target) = pointee(value.clone()) {
        return peek_no_empty_fields(target);
    }
    let Ok(struct_peek) = value.into_struct() else {
        return Err(TagwalkErrorKind::WrongShape {
            expected: "struct",
            actual: shape,
        }
        .into());
    };

    let missing: Vec<&'static str> = struct_peek
        .ty()
        .fields
        .iter()
        .enumerate()
        .filter(|(index, _)| struct_peek.field(*index).is_ok_and(peek_is_zero))
        .map(|(_, field)| field.name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TagwalkErrorKind::MissingFields(missing).into())
    }
}

/// Reads `value`, or the first value along its chain of options and
/// pointers, as a `T`.
pub fn as_type<'mem, 'facet, T: Facet<'facet>>(value: Peek<'mem, 'facet>) -> Option<&'mem T> {
    if let Ok(target) = value.get::<T>() {
        return Some(target);
    }
    match pointee(value) {
        Pointee::Target(target) => as_type(target),
        Pointee::Nil | Pointee::Value => None,
    }
}
