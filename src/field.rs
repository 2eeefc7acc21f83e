use std::fmt::{self, Display, Write as _};

use facet_core::{Field, FieldAttribute, FieldFlags};

/// Tag value that hides a field under a namespace.
pub const IGNORE: &str = "-";

/// Attribute marking a field as private to its type: `#[facet(private)]`.
///
/// Facet does not record Rust visibility, so walks and populate rely on this
/// marker to leave a field out.
pub const PRIVATE: &str = "private";

/// Namespace-keyed metadata attached to a field.
///
/// Read from the arbitrary attributes of a Facet field, where
/// `#[facet(json = "a", query = "-")]` puts `json` and `query` tags on the
/// field. Lookups keep an absent namespace and a present-but-empty one apart.
#[derive(Clone, Copy, Debug)]
pub struct Tag {
    attributes: &'static [FieldAttribute],
}

impl Tag {
    /// A tag with no namespaces.
    pub const EMPTY: Tag = Tag { attributes: &[] };

    /// The tags of `field`.
    pub fn of(field: &Field) -> Self {
        Self {
            attributes: field.attributes,
        }
    }

    /// `(namespace, value)` pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> + 'static {
        self.attributes.iter().filter_map(|attribute| match attribute {
            FieldAttribute::Arbitrary(raw) => split_pair(*raw),
            _ => None,
        })
    }

    /// The value under `namespace`, if the namespace is present.
    pub fn lookup(&self, namespace: &str) -> Option<&'static str> {
        self.pairs()
            .find(|(key, _)| *key == namespace)
            .map(|(_, value)| value)
    }

    /// The value under `namespace`, or `""` when absent.
    pub fn get(&self, namespace: &str) -> &'static str {
        self.lookup(namespace).unwrap_or_default()
    }

    /// Whether the field carries no namespaces at all.
    pub fn is_empty(&self) -> bool {
        self.pairs().next().is_none()
    }
}

/// Splits `ns = "value"` as the derive renders it.
fn split_pair(raw: &'static str) -> Option<(&'static str, &'static str)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

impl Display for Tag {
    /// Renders the tag in the `key:"value"` mini-format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{key}:\"")?;
            for c in value.chars() {
                match c {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\t' => f.write_str("\\t")?,
                    c => f.write_char(c)?,
                }
            }
            f.write_char('"')?;
        }
        Ok(())
    }
}

/// Walk-related views of a Facet [`Field`].
pub trait FieldExt {
    /// The namespace tags of the field.
    fn tags(&self) -> Tag;

    /// Whether the field is `#[facet(flatten)]`, i.e. embedded.
    fn is_embedded(&self) -> bool;

    /// Whether the field is part of the public surface of its type.
    fn is_exported(&self) -> bool;
}

impl FieldExt for Field {
    fn tags(&self) -> Tag {
        Tag::of(self)
    }

    fn is_embedded(&self) -> bool {
        self.flags.contains(FieldFlags::FLATTEN)
    }

    fn is_exported(&self) -> bool {
        !self
            .attributes
            .contains(&FieldAttribute::Arbitrary(PRIVATE))
    }
}
