use std::{
    convert::Infallible,
    fmt::{self, Display},
    ops::ControlFlow,
    str::FromStr,
};

use facet_core::{Facet, Field, Type, UserType};
use facet_reflect::{Partial, Peek};

use crate::{
    FieldExt, IGNORE, TagwalkError, TagwalkErrorKind,
    classify::{Pointee, deep_indirect, is_struct, pointee},
};

/// A field reached during a walk.
///
/// Only borrowed for the duration of the visitor call.
#[derive(Clone)]
pub struct VisitedField<'a, 'facet> {
    /// The live value of the field.
    pub value: Peek<'a, 'facet>,
    /// The field descriptor.
    pub field: &'static Field,
    /// Fields from the walk root down to the struct owning `field`,
    /// embedded fields included.
    pub path: &'a [&'static Field],
    /// The tag value under the walk namespace, `""` when the walk has no
    /// namespace.
    pub tag: &'static str,
}

impl VisitedField<'_, '_> {
    /// The externally visible name: the tag value if there is one, the
    /// declared name otherwise.
    pub fn name(&self) -> &'static str {
        if self.tag.is_empty() {
            self.field.name
        } else {
            self.tag
        }
    }

    /// Whether `path` followed by this field's name equals `target`.
    fn is_at(&self, target: &FieldPath) -> bool {
        let segments = target.segments();
        segments.len() == self.path.len() + 1
            && self
                .path
                .iter()
                .map(|field| field.name)
                .chain(std::iter::once(self.field.name))
                .eq(segments.iter().map(String::as_str))
    }
}

/// Symbolic address of a field: declared field names from a root value down
/// to the field, embedded fields included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Builds a path from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The field names, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = Infallible;

    /// Splits a dotted path such as `data.deeper`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.split('.').filter(|segment| !segment.is_empty())))
    }
}

impl<const N: usize> From<[&str; N]> for FieldPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<&[&str]> for FieldPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        let Ok(parsed) = path.parse::<FieldPath>();
        parsed
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Flatten untagged embedded fields, emit tagged fields as leaves.
    Tagged,
    /// Emit every field, then descend into it.
    Recursive,
}

type Visit<'v, 'facet> = dyn FnMut(VisitedField<'_, 'facet>) -> ControlFlow<()> + 'v;

struct Walker<'n, 'v, 'facet> {
    mode: Mode,
    namespace: &'n str,
    path: Vec<&'static Field>,
    visit: &'v mut Visit<'v, 'facet>,
}

impl<'facet> Walker<'_, '_, 'facet> {
    fn walk_struct(&mut self, value: Peek<'_, 'facet>) -> ControlFlow<()> {
        let Ok(struct_peek) = value.into_struct() else {
            return ControlFlow::Continue(());
        };
        for (index, field) in struct_peek.ty().fields.iter().enumerate() {
            let Ok(field_value) = struct_peek.field(index) else {
                continue;
            };
            self.walk_field(field_value, field)?;
        }
        ControlFlow::Continue(())
    }

    fn walk_field(&mut self, value: Peek<'_, 'facet>, field: &'static Field) -> ControlFlow<()> {
        match self.mode {
            Mode::Tagged => {
                let tag = if self.namespace.is_empty() {
                    ""
                } else {
                    field.tags().get(self.namespace)
                };
                if tag == IGNORE {
                    log::trace!("{} is ignored under '{}'", field.name, self.namespace);
                    return ControlFlow::Continue(());
                }
                if field.is_embedded() {
                    if tag.is_empty() {
                        log::trace!("flattening embedded {}", field.name);
                        return self.descend(value, field);
                    }
                } else if !field.is_exported() || (tag.is_empty() && !self.namespace.is_empty()) {
                    return ControlFlow::Continue(());
                }
                self.emit(value, field, tag)
            }
            Mode::Recursive => {
                if !field.is_embedded() && !field.is_exported() {
                    return ControlFlow::Continue(());
                }
                self.emit(value.clone(), field, "")?;
                self.descend(value, field)
            }
        }
    }

    fn emit(
        &mut self,
        value: Peek<'_, 'facet>,
        field: &'static Field,
        tag: &'static str,
    ) -> ControlFlow<()> {
        (self.visit)(VisitedField {
            value,
            field,
            path: &self.path,
            tag,
        })
    }

    /// Walks the struct behind `value` with `field` pushed onto the path.
    ///
    /// Options and pointers are followed. An empty embedded one is replaced
    /// by a transient default of its target type, unless a field of that
    /// type is already on the path.
    fn descend(&mut self, value: Peek<'_, 'facet>, field: &'static Field) -> ControlFlow<()> {
        match pointee(value.clone()) {
            Pointee::Value => {
                if !matches!(value.shape().ty, Type::User(UserType::Struct(_))) {
                    return ControlFlow::Continue(());
                }
                self.path.push(field);
                let flow = self.walk_struct(value);
                self.path.pop();
                flow
            }
            Pointee::Target(target) => self.descend(target, field),
            Pointee::Nil => {
                let target = deep_indirect(field.shape);
                if !field.is_embedded() || !is_struct(target) || self.is_on_path(target) {
                    return ControlFlow::Continue(());
                }
                log::trace!("instantiating transient {target} for {}", field.name);
                let Ok(mut partial) = Partial::alloc_shape(target) else {
                    log::debug!("cannot allocate {target}, skipping {}", field.name);
                    return ControlFlow::Continue(());
                };
                if let Err(error) = partial.set_default() {
                    log::debug!("{target} has no default, skipping {}: {error}", field.name);
                    return ControlFlow::Continue(());
                }
                match partial.build() {
                    Ok(transient) => self.descend(transient.peek(), field),
                    Err(error) => {
                        log::debug!("cannot build {target} for {}: {error}", field.name);
                        ControlFlow::Continue(())
                    }
                }
            }
        }
    }

    fn is_on_path(&self, target: &'static facet_core::Shape) -> bool {
        self.path
            .iter()
            .any(|ancestor| deep_indirect(ancestor.shape) == target)
    }
}

fn run<'facet>(
    value: Peek<'_, 'facet>,
    mode: Mode,
    namespace: &str,
    visit: &mut Visit<'_, 'facet>,
) -> ControlFlow<()> {
    match pointee(value.clone()) {
        Pointee::Value => Walker {
            mode,
            namespace,
            path: Vec::new(),
            visit,
        }
        .walk_struct(value),
        Pointee::Target(target) => run(target, mode, namespace, visit),
        Pointee::Nil => ControlFlow::Continue(()),
    }
}

/// Visits the fields of `value` that are visible under `namespace`.
///
/// * A field tagged `-` under the namespace is skipped together with
///   everything below it.
/// * An embedded (`#[facet(flatten)]`) field without a tag is flattened: its
///   fields are visited in its place, and it is not visited itself.
/// * Other fields are visited when they are not `#[facet(private)]` and carry
///   a tag under the namespace. They are not descended into, embedded or not.
///
/// With an empty namespace every exported field is visited and every
/// embedded field is flattened. Fields are visited in declaration order.
pub fn walk_tagged_fields<'facet, T, F>(value: &T, namespace: &str, visit: F)
where
    T: Facet<'facet>,
    F: FnMut(VisitedField<'_, 'facet>),
{
    walk_tagged_peek(Peek::new(value), namespace, visit);
}

/// [`walk_tagged_fields`] over a value already under reflection, such as
/// [`VisitedField::value`].
pub fn walk_tagged_peek<'facet, F>(value: Peek<'_, 'facet>, namespace: &str, mut visit: F)
where
    F: FnMut(VisitedField<'_, 'facet>),
{
    log::trace!("walking {} under '{namespace}'", value.shape());
    let _ = run(value, Mode::Tagged, namespace, &mut |field| {
        visit(field);
        ControlFlow::Continue(())
    });
}

/// Visits every exported or embedded field of `value` in pre-order,
/// descending into struct-typed fields after visiting them.
///
/// `VisitedField::path` holds the chain of fields leading to the visited
/// one, which lets callers build composite keys like `Outer[Inner]`.
pub fn walk_fields_recursively<'facet, T, F>(value: &T, mut visit: F)
where
    T: Facet<'facet>,
    F: FnMut(VisitedField<'_, 'facet>),
{
    let value = Peek::new(value);
    log::trace!("walking {} recursively", value.shape());
    let _ = run(value, Mode::Recursive, "", &mut |field| {
        visit(field);
        ControlFlow::Continue(())
    });
}

/// Whether a tagged walk under `namespace` would visit anything.
pub fn has_tagged_fields<'facet, T: Facet<'facet>>(value: &T, namespace: &str) -> bool {
    run(Peek::new(value), Mode::Tagged, namespace, &mut |_| {
        ControlFlow::Break(())
    })
    .is_break()
}

/// Resolves the name the field at `target` is known by under `namespace`.
///
/// `target` is relative to `root` and must name embedded fields explicitly.
/// The result is the field's tag value under the namespace, or its declared
/// name when the namespace is empty.
///
/// Asking for a field that a tagged walk under `namespace` does not visit is
/// a programming error and yields [`TagwalkErrorKind::UnreachableField`].
pub fn tagged_name<'facet, T: Facet<'facet>>(
    root: &T,
    target: &FieldPath,
    namespace: &str,
) -> Result<&'static str, TagwalkError> {
    let shape = T::SHAPE;
    log::trace!("resolving {target} in {shape} under '{namespace}'");
    if !is_struct(shape) {
        return Err(TagwalkErrorKind::WrongShape {
            expected: "struct",
            actual: shape,
        }
        .into());
    }

    let mut found = None;
    let _ = run(Peek::new(root), Mode::Tagged, namespace, &mut |visited| {
        if visited.is_at(target) {
            found = Some(visited.name());
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    found.ok_or_else(|| {
        log::debug!("{target} is not reachable under '{namespace}'");
        TagwalkErrorKind::UnreachableField {
            path: target.clone(),
            namespace: namespace.to_owned(),
        }
        .into()
    })
}
