use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use crate::Tag;

/// Anything that can answer "what is the raw value for this key?".
///
/// Used as the input of [`populate_fields_from_tags`](crate::populate_fields_from_tags).
pub trait TagSource {
    /// The raw value stored under `key`, or `None` when the key is absent.
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>>;

    /// The first entry whose key equals `key` ignoring ASCII case, as
    /// `(stored key, raw value)`.
    ///
    /// The default only finds exact matches; sources that can list their
    /// keys override it.
    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        self.lookup_tag(key)
            .map(|value| (Cow::Owned(key.to_owned()), value))
    }
}

impl<T: TagSource + ?Sized> TagSource for &T {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).lookup_tag(key)
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        (**self).lookup_tag_ignore_case(key)
    }
}

/// First `(key, value)` pair whose key matches `key` ignoring ASCII case.
fn find_ignore_case<'a, I>(pairs: I, key: &str) -> Option<(Cow<'a, str>, Cow<'a, str>)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(name, value)| (Cow::Borrowed(name), Cow::Borrowed(value)))
}

impl TagSource for Tag {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.lookup(key).map(Cow::Borrowed)
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        find_ignore_case(self.pairs(), key)
    }
}

impl<S: BuildHasher> TagSource for HashMap<String, String, S> {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        find_ignore_case(self.iter().map(|(k, v)| (k.as_str(), v.as_str())), key)
    }
}

impl<S: BuildHasher> TagSource for HashMap<&str, &str, S> {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(*value))
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        find_ignore_case(self.iter().map(|(k, v)| (*k, *v)), key)
    }
}

impl TagSource for BTreeMap<String, String> {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(value.as_str()))
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        find_ignore_case(self.iter().map(|(k, v)| (k.as_str(), v.as_str())), key)
    }
}

impl TagSource for BTreeMap<&str, &str> {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Borrowed(*value))
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        find_ignore_case(self.iter().map(|(k, v)| (*k, *v)), key)
    }
}

impl TagSource for [(&str, &str)] {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| Cow::Borrowed(*value))
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        find_ignore_case(self.iter().copied(), key)
    }
}

/// A tag string in the `key:"value" key2:"value2"` mini-format.
///
/// Keys are runs of characters other than space, colon and double quote.
/// Values are double-quoted and may contain `\"`, `\\`, `\n`, `\t` and `\r`
/// escapes. Parsing stops silently at the first malformed pair, so keys after
/// it are reported absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    /// Wraps a raw tag string.
    pub const fn new(raw: &'a str) -> Self {
        Self(raw)
    }

    /// The raw tag string.
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// The unquoted value under `key`.
    pub fn lookup(&self, key: &str) -> Option<Cow<'a, str>> {
        self.pairs()
            .find(|(name, _)| *name == key)
            .and_then(|(_, quoted)| unquote(quoted))
    }

    /// The unquoted value under `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> Cow<'a, str> {
        self.lookup(key).unwrap_or_default()
    }

    /// `(key, quoted value body)` pairs in order of appearance.
    fn pairs(&self) -> Pairs<'a> {
        Pairs { rest: self.0 }
    }
}

impl TagSource for StructTag<'_> {
    fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
        self.lookup(key)
    }

    fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
        let (name, quoted) = self
            .pairs()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))?;
        Some((Cow::Borrowed(name), unquote(quoted)?))
    }
}

struct Pairs<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.rest.trim_start_matches(' ');
        let key_len = tag
            .bytes()
            .take_while(|&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
            .count();
        let bytes = tag.as_bytes();
        if key_len == 0 || bytes.get(key_len) != Some(&b':') || bytes.get(key_len + 1) != Some(&b'"')
        {
            self.rest = "";
            return None;
        }
        let key = &tag[..key_len];
        let body_start = key_len + 2;

        let mut i = body_start;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            self.rest = "";
            return None;
        }

        self.rest = &tag[i + 1..];
        Some((key, &tag[body_start..i]))
    }
}

fn unquote(body: &str) -> Option<Cow<'_, str>> {
    if !body.contains('\\') {
        return Some(Cow::Borrowed(body));
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            other => {
                log::debug!("unknown escape '\\{other}' in tag value");
                return None;
            }
        }
    }
    Some(Cow::Owned(out))
}

#[cfg(feature = "kdl")]
mod kdl_source {
    use std::borrow::Cow;

    use kdl::{KdlNode, KdlValue};

    use super::TagSource;

    /// Properties of a KDL node as tag values.
    ///
    /// Strings are used verbatim, numbers and booleans through their textual
    /// form. `#null` counts as absent. The last duplicate property wins.
    impl TagSource for KdlNode {
        fn lookup_tag(&self, key: &str) -> Option<Cow<'_, str>> {
            let entry = self
                .entries()
                .iter()
                .rev()
                .find(|entry| entry.name().is_some_and(|name| name.value() == key))?;
            property_value(entry.value())
        }

        fn lookup_tag_ignore_case(&self, key: &str) -> Option<(Cow<'_, str>, Cow<'_, str>)> {
            let (name, entry) = self.entries().iter().rev().find_map(|entry| {
                let name = entry.name()?.value();
                name.eq_ignore_ascii_case(key).then_some((name, entry))
            })?;
            Some((Cow::Borrowed(name), property_value(entry.value())?))
        }
    }

    fn property_value(value: &KdlValue) -> Option<Cow<'_, str>> {
        match value {
            KdlValue::String(string) => Some(Cow::Borrowed(string.as_str())),
            KdlValue::Integer(integer) => Some(Cow::Owned(integer.to_string())),
            KdlValue::Float(float) => Some(Cow::Owned(float.to_string())),
            KdlValue::Bool(bool) => Some(Cow::Borrowed(if *bool { "true" } else { "false" })),
            KdlValue::Null => None,
        }
    }
}
