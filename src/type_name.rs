use std::{
    any,
    fmt::{self, Display},
    ops::Deref,
};

/// Separator between a package name and a module path that does not start
/// with that package's crate identifier.
pub const PACKAGE_SEPARATOR: char = '#';

/// Canonical, reconstructible name of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeString(String);

impl TypeString {
    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Splits the name of a named type back into its parts.
    ///
    /// Returns `None` for built-in composites (`&T`, `[T]`, ...) and scalars.
    pub fn named_parts(&self) -> Option<NamedParts<'_>> {
        let name = self.0.as_str();
        if name.starts_with(['&', '*', '[']) {
            return None;
        }
        let head = name.split_once('<').map_or(name, |(head, _)| head);
        let (package, head) = match head.split_once(PACKAGE_SEPARATOR) {
            Some((package, rest)) => (Some(package), rest),
            None => (None, head),
        };
        let (module_path, type_identifier) = head.rsplit_once("::")?;
        Some(NamedParts {
            package,
            module_path,
            type_identifier,
        })
    }
}

impl Display for TypeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for TypeString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<TypeString> for String {
    fn from(value: TypeString) -> Self {
        value.0
    }
}

/// The parts of a named [`TypeString`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedParts<'a> {
    /// Package name, present only when the module path does not start with
    /// the package's crate identifier.
    pub package: Option<&'a str>,
    /// Module path of the declaring module.
    pub module_path: &'a str,
    /// Declared name of the type.
    pub type_identifier: &'a str,
}

/// Canonical name of `T`, without package disambiguation.
///
/// Standard library paths shrink to their last segment (`String`,
/// `HashMap<K, V>`, `Box<T>`), everything else keeps its full module path.
/// Use [`type_string!`](crate::type_string) to also get the `package#`
/// prefix.
pub fn type_string_of<T: ?Sized>() -> TypeString {
    TypeString(normalize(any::type_name::<T>(), None))
}

/// Canonical name of the type of `value`.
pub fn type_string_of_val<T: ?Sized>(value: &T) -> TypeString {
    let _ = value;
    type_string_of::<T>()
}

/// Canonical name of `T` as seen from a crate built by Cargo package
/// `package`, whose root module is the first segment of `module_path`.
///
/// Paths in that crate are prefixed with `package#` when the package name,
/// with `-` read as `_`, differs from the crate identifier.
pub fn type_string_in<T: ?Sized>(package: &str, module_path: &str) -> TypeString {
    let crate_ident = module_path.split("::").next().unwrap_or(module_path);
    TypeString(normalize(any::type_name::<T>(), Some((package, crate_ident))))
}

/// Canonical name of a type, with the calling package's name in front of
/// paths from the calling crate when the two differ.
///
/// ```
/// struct Local;
///
/// let name = tagwalk::type_string!(Option<Local>);
/// assert!(name.starts_with("Option<") && name.ends_with("::Local>"));
/// ```
#[macro_export]
macro_rules! type_string {
    ($ty:ty) => {
        $crate::type_string_in::<$ty>(env!("CARGO_PKG_NAME"), module_path!())
    };
}

const STD_CRATES: [&str; 3] = ["std", "core", "alloc"];

/// Rewrites every path in `raw`, leaving punctuation alone.
fn normalize(raw: &str, package: Option<(&str, &str)>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while !rest.is_empty() {
        let path_len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
            .unwrap_or(rest.len());
        if path_len == 0 {
            let punct_len = rest
                .find(|c: char| c.is_alphanumeric() || c == '_' || c == ':')
                .unwrap_or(rest.len());
            out.push_str(&rest[..punct_len]);
            rest = &rest[punct_len..];
            continue;
        }
        write_path(&rest[..path_len], package, &mut out);
        rest = &rest[path_len..];
    }
    out
}

fn write_path(path: &str, package: Option<(&str, &str)>, out: &mut String) {
    let Some((first, _)) = path.split_once("::") else {
        out.push_str(path);
        return;
    };
    if STD_CRATES.contains(&first) {
        out.push_str(path.rsplit("::").next().unwrap_or(path));
        return;
    }
    if let Some((package, crate_ident)) = package {
        if first == crate_ident && package.replace('-', "_") != crate_ident {
            out.push_str(package);
            out.push(PACKAGE_SEPARATOR);
        }
    }
    out.push_str(path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_is_kept_only_when_ambiguous() {
        let renamed = Some(("Fancy-Path", "fancypath"));
        assert_eq!(
            normalize("fancypath::inner::Sample", renamed),
            "Fancy-Path#fancypath::inner::Sample"
        );
        let plain = Some(("sample-crate", "sample_crate"));
        assert_eq!(
            normalize("sample_crate::sample::TestSampleStruct", plain),
            "sample_crate::sample::TestSampleStruct"
        );
        // other crates are never prefixed
        assert_eq!(
            normalize("other::Thing<fancypath::A>", renamed),
            "other::Thing<Fancy-Path#fancypath::A>"
        );
    }

    #[test]
    fn named_parts_split_back() {
        let name = TypeString(normalize(
            "fancypath::inner::Sample",
            Some(("Fancy-Path", "fancypath")),
        ));
        assert_eq!(
            name.named_parts(),
            Some(NamedParts {
                package: Some("Fancy-Path"),
                module_path: "fancypath::inner",
                type_identifier: "Sample",
            })
        );
        let name = TypeString(normalize("sample_crate::sample::TestSampleStruct", None));
        assert_eq!(
            name.named_parts(),
            Some(NamedParts {
                package: None,
                module_path: "sample_crate::sample",
                type_identifier: "TestSampleStruct",
            })
        );
        assert_eq!(type_string_of::<&str>().named_parts(), None);
        assert_eq!(type_string_of::<u8>().named_parts(), None);
        assert_eq!(type_string_of::<String>().named_parts(), None);
    }

    #[test]
    fn builtins_use_rust_syntax() {
        assert_eq!(type_string_of::<Vec<String>>(), "Vec<String>");
        assert_eq!(type_string_of::<&str>(), "&str");
        assert_eq!(type_string_of::<&mut [u8]>(), "&mut [u8]");
        assert_eq!(type_string_of::<[f32; 3]>(), "[f32; 3]");
        assert_eq!(type_string_of::<*const *mut i64>(), "*const *mut i64");
        assert_eq!(
            type_string_of::<Option<Box<std::collections::HashMap<String, Vec<bool>>>>>(),
            "Option<Box<HashMap<String, Vec<bool>>>>"
        );
    }
}
