use std::{
    char::ParseCharError,
    error::Error,
    fmt::{self, Display},
    num::{ParseFloatError, ParseIntError},
};

use facet_core::{Shape, Type};
use facet_reflect::{Partial, ReflectError};

/// The scalar types a tag value can be coerced into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `String`
    String,
    /// `str`, described but never assigned
    Str,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `i128`
    I128,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `u128`
    U128,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl ScalarType {
    /// The Rust spelling of the type.
    pub const fn rust_name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Char => "char",
            ScalarType::String => "String",
            ScalarType::Str => "str",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::I128 => "i128",
            ScalarType::Isize => "isize",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::U128 => "u128",
            ScalarType::Usize => "usize",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
        }
    }

    /// The scalar type described by `shape`, if any.
    ///
    /// Pointers and options are not looked through.
    pub fn from_shape(shape: &Shape) -> Option<Self> {
        let scalar = match shape.type_identifier {
            "String" => ScalarType::String,
            "str" | "&str" => ScalarType::Str,
            _ if !matches!(shape.ty, Type::Primitive(_)) => return None,
            "bool" => ScalarType::Bool,
            "char" => ScalarType::Char,
            "i8" => ScalarType::I8,
            "i16" => ScalarType::I16,
            "i32" => ScalarType::I32,
            "i64" => ScalarType::I64,
            "i128" => ScalarType::I128,
            "isize" => ScalarType::Isize,
            "u8" => ScalarType::U8,
            "u16" => ScalarType::U16,
            "u32" => ScalarType::U32,
            "u64" => ScalarType::U64,
            "u128" => ScalarType::U128,
            "usize" => ScalarType::Usize,
            "f32" => ScalarType::F32,
            "f64" => ScalarType::F64,
            _ => return None,
        };
        Some(scalar)
    }

    /// The kind word used in coercion error messages.
    pub fn kind_name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Char => "char",
            ScalarType::String | ScalarType::Str => "string",
            ScalarType::I8
            | ScalarType::I16
            | ScalarType::I32
            | ScalarType::I64
            | ScalarType::I128
            | ScalarType::Isize => "int",
            ScalarType::U8
            | ScalarType::U16
            | ScalarType::U32
            | ScalarType::U64
            | ScalarType::U128
            | ScalarType::Usize => "uint",
            ScalarType::F32 | ScalarType::F64 => "float",
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

/// A typed scalar, ready to be assigned into a field of the matching type.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum ScalarValue {
    Bool(bool),
    Char(char),
    String(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
}

impl ScalarValue {
    /// Moves the value into the frame `partial` is positioned at.
    pub fn set_into(self, partial: &mut Partial<'_>) -> Result<(), ReflectError> {
        match self {
            ScalarValue::Bool(value) => partial.set(value)?,
            ScalarValue::Char(value) => partial.set(value)?,
            ScalarValue::String(value) => partial.set(value)?,
            ScalarValue::I8(value) => partial.set(value)?,
            ScalarValue::I16(value) => partial.set(value)?,
            ScalarValue::I32(value) => partial.set(value)?,
            ScalarValue::I64(value) => partial.set(value)?,
            ScalarValue::I128(value) => partial.set(value)?,
            ScalarValue::Isize(value) => partial.set(value)?,
            ScalarValue::U8(value) => partial.set(value)?,
            ScalarValue::U16(value) => partial.set(value)?,
            ScalarValue::U32(value) => partial.set(value)?,
            ScalarValue::U64(value) => partial.set(value)?,
            ScalarValue::U128(value) => partial.set(value)?,
            ScalarValue::Usize(value) => partial.set(value)?,
            ScalarValue::F32(value) => partial.set(value)?,
            ScalarValue::F64(value) => partial.set(value)?,
        };
        Ok(())
    }
}

/// Why a raw string could not be coerced.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseFailure {
    /// Not a decimal integer in range.
    Int(ParseIntError),
    /// Not a decimal float.
    Float(ParseFloatError),
    /// Not a boolean literal.
    Bool(ParseBoolError),
    /// Not exactly one character.
    Char(ParseCharError),
    /// The target type cannot be produced from a string.
    Unsupported(ScalarType),
}

impl Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::Int(e) => write!(f, "{e}"),
            ParseFailure::Float(e) => write!(f, "{e}"),
            ParseFailure::Bool(e) => write!(f, "{e}"),
            ParseFailure::Char(e) => write!(f, "{e}"),
            ParseFailure::Unsupported(ty) => write!(f, "{ty} cannot be read from a tag"),
        }
    }
}

impl Error for ParseFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseFailure::Int(e) => Some(e),
            ParseFailure::Float(e) => Some(e),
            ParseFailure::Bool(e) => Some(e),
            ParseFailure::Char(e) => Some(e),
            ParseFailure::Unsupported(_) => None,
        }
    }
}

impl From<ParseIntError> for ParseFailure {
    fn from(value: ParseIntError) -> Self {
        Self::Int(value)
    }
}

impl From<ParseFloatError> for ParseFailure {
    fn from(value: ParseFloatError) -> Self {
        Self::Float(value)
    }
}

impl From<ParseBoolError> for ParseFailure {
    fn from(value: ParseBoolError) -> Self {
        Self::Bool(value)
    }
}

impl From<ParseCharError> for ParseFailure {
    fn from(value: ParseCharError) -> Self {
        Self::Char(value)
    }
}

/// A string that is none of `1 t true 0 f false` (in any case).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseBoolError;

impl Display for ParseBoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid boolean literal")
    }
}

impl Error for ParseBoolError {}

/// Parses a boolean literal, accepting `1`, `t`, `true`, `0`, `f` and `false`
/// in any letter case.
pub fn parse_bool(raw: &str) -> Result<bool, ParseBoolError> {
    match raw {
        "1" => return Ok(true),
        "0" => return Ok(false),
        _ => {}
    }
    if raw.eq_ignore_ascii_case("t") || raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("f") || raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ParseBoolError)
    }
}

/// Converts `raw` into a value of `target`.
pub fn coerce(raw: &str, target: ScalarType) -> Result<ScalarValue, ParseFailure> {
    let value = match target {
        ScalarType::String => ScalarValue::String(raw.to_owned()),
        ScalarType::Str => return Err(ParseFailure::Unsupported(target)),
        ScalarType::Bool => ScalarValue::Bool(parse_bool(raw)?),
        ScalarType::Char => ScalarValue::Char(raw.parse()?),
        ScalarType::I8 => ScalarValue::I8(raw.parse()?),
        ScalarType::I16 => ScalarValue::I16(raw.parse()?),
        ScalarType::I32 => ScalarValue::I32(raw.parse()?),
        ScalarType::I64 => ScalarValue::I64(raw.parse()?),
        ScalarType::I128 => ScalarValue::I128(raw.parse()?),
        ScalarType::Isize => ScalarValue::Isize(raw.parse()?),
        ScalarType::U8 => ScalarValue::U8(raw.parse()?),
        ScalarType::U16 => ScalarValue::U16(raw.parse()?),
        ScalarType::U32 => ScalarValue::U32(raw.parse()?),
        ScalarType::U64 => ScalarValue::U64(raw.parse()?),
        ScalarType::U128 => ScalarValue::U128(raw.parse()?),
        ScalarType::Usize => ScalarValue::Usize(raw.parse()?),
        ScalarType::F32 => ScalarValue::F32(raw.parse()?),
        ScalarType::F64 => ScalarValue::F64(raw.parse()?),
    };
    Ok(value)
}
