//! Declared type hints and inferred type data.
//!
//! A [`TypeHint`] is what the programmer wrote on a parameter or return
//! type. [`TypeData`] is what inference resolved. Override checking works
//! on hints first and falls back to the type-data lattice when a hint is a
//! compile-time constant type.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ClassId, ProgramGraph};

/// Scalar and special types of the source language.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// Not yet inferred; accepts anything.
    Any,
    Null,
    False,
    Bool,
    Int,
    Float,
    String,
    /// Dynamically tagged value.
    Mixed,
    Void,
}

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Any => "any",
            PrimitiveType::Null => "null",
            PrimitiveType::False => "false",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::String => "string",
            PrimitiveType::Mixed => "mixed",
            PrimitiveType::Void => "void",
        }
    }

    /// Whether a value of type `self` may flow where `to` is expected
    /// without an explicit conversion.
    pub fn is_assignable_to(self, to: PrimitiveType) -> bool {
        if self == to || to == PrimitiveType::Any {
            return true;
        }
        match (self, to) {
            (PrimitiveType::Any | PrimitiveType::Void, _) => false,
            (_, PrimitiveType::Mixed) => true,
            (PrimitiveType::False, PrimitiveType::Bool) => true,
            (PrimitiveType::Int, PrimitiveType::Float) => true,
            _ => false,
        }
    }
}

/// A declared type annotation.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    Primitive(PrimitiveType),
    /// `T[]`
    Array(Box<TypeHint>),
    /// `?T`, `T|false`, `?T|false`
    Optional {
        inner: Box<TypeHint>,
        #[serde(default)]
        or_null: bool,
        #[serde(default)]
        or_false: bool,
    },
    Instance(ClassId),
    Tuple(Vec<TypeHint>),
    /// Callables have no constant type data; they are resolved per call site.
    Callable,
}

impl TypeHint {
    pub fn optional(inner: TypeHint, or_null: bool, or_false: bool) -> Self {
        TypeHint::Optional {
            inner: Box::new(inner),
            or_null,
            or_false,
        }
    }

    pub fn array(inner: TypeHint) -> Self {
        TypeHint::Array(Box::new(inner))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeHint::Primitive(PrimitiveType::Void))
    }

    /// Whether this hint maps to a single [`TypeData`] known at compile time.
    pub fn is_typedata_constexpr(&self) -> bool {
        let mut pending = vec![self];
        while let Some(hint) = pending.pop() {
            match hint {
                TypeHint::Callable => return false,
                TypeHint::Primitive(_) | TypeHint::Instance(_) => {}
                TypeHint::Array(inner) | TypeHint::Optional { inner, .. } => pending.push(inner),
                TypeHint::Tuple(items) => pending.extend(items),
            }
        }
        true
    }

    /// The constant type data this hint denotes, if any.
    pub fn to_type_data(&self) -> Option<TypeData> {
        match self {
            TypeHint::Primitive(p) => Some(TypeData::primitive(*p)),
            TypeHint::Instance(class) => Some(TypeData::instance(*class)),
            TypeHint::Array(inner) => inner.to_type_data().map(TypeData::array),
            TypeHint::Optional {
                inner,
                or_null,
                or_false,
            } => inner.to_type_data().map(|mut data| {
                data.or_null |= *or_null;
                data.or_false |= *or_false;
                data
            }),
            TypeHint::Tuple(items) => items
                .iter()
                .map(TypeHint::to_type_data)
                .collect::<Option<Vec<_>>>()
                .map(TypeData::tuple),
            TypeHint::Callable => None,
        }
    }

    /// Render for diagnostics, e.g. `?Animal`, `int[]`, `string|false`.
    pub fn display(&self, graph: &ProgramGraph) -> String {
        match self {
            TypeHint::Primitive(p) => p.name().to_string(),
            TypeHint::Array(inner) => format!("{}[]", inner.display(graph)),
            TypeHint::Optional {
                inner,
                or_null,
                or_false,
            } => {
                let prefix = if *or_null { "?" } else { "" };
                let suffix = if *or_false { "|false" } else { "" };
                format!("{prefix}{}{suffix}", inner.display(graph))
            }
            TypeHint::Instance(class) => graph.class(*class).name.clone(),
            TypeHint::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|h| h.display(graph)).collect();
                format!("tuple({})", parts.join(", "))
            }
            TypeHint::Callable => "callable".to_string(),
        }
    }
}

/// Shape of an inferred type.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Array(Box<TypeData>),
    Instance(ClassId),
    Tuple(Vec<TypeData>),
}

/// An inferred type: a shape plus the "may also be null/false" flags.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct TypeData {
    pub kind: TypeKind,
    #[serde(default)]
    pub or_null: bool,
    #[serde(default)]
    pub or_false: bool,
}

impl TypeData {
    pub fn primitive(p: PrimitiveType) -> Self {
        TypeData {
            kind: TypeKind::Primitive(p),
            or_null: false,
            or_false: false,
        }
    }

    pub fn array(inner: TypeData) -> Self {
        TypeData {
            kind: TypeKind::Array(Box::new(inner)),
            or_null: false,
            or_false: false,
        }
    }

    pub fn instance(class: ClassId) -> Self {
        TypeData {
            kind: TypeKind::Instance(class),
            or_null: false,
            or_false: false,
        }
    }

    pub fn tuple(items: Vec<TypeData>) -> Self {
        TypeData {
            kind: TypeKind::Tuple(items),
            or_null: false,
            or_false: false,
        }
    }

    pub fn void() -> Self {
        Self::primitive(PrimitiveType::Void)
    }

    #[must_use]
    pub fn or_null(mut self) -> Self {
        self.or_null = true;
        self
    }

    #[must_use]
    pub fn or_false(mut self) -> Self {
        self.or_false = true;
        self
    }

    /// Every class mentioned anywhere inside this type, recursing into
    /// arrays and tuples.
    pub fn collect_classes(&self, out: &mut BTreeSet<ClassId>) {
        let mut pending = vec![self];
        while let Some(data) = pending.pop() {
            match &data.kind {
                TypeKind::Primitive(_) => {}
                TypeKind::Instance(class) => {
                    out.insert(*class);
                }
                TypeKind::Array(inner) => pending.push(inner),
                TypeKind::Tuple(items) => pending.extend(items),
            }
        }
    }

    fn accepts_null(&self) -> bool {
        self.or_null
            || matches!(
                self.kind,
                TypeKind::Primitive(PrimitiveType::Null | PrimitiveType::Mixed | PrimitiveType::Any)
            )
    }

    fn accepts_false(&self) -> bool {
        self.or_false
            || matches!(
                self.kind,
                TypeKind::Primitive(
                    PrimitiveType::False
                        | PrimitiveType::Bool
                        | PrimitiveType::Mixed
                        | PrimitiveType::Any
                )
            )
    }

    /// Subtyping in the inferred-type lattice: can every value of `self` be
    /// stored where `other` is expected?
    pub fn is_less_or_equal(&self, other: &TypeData, graph: &ProgramGraph) -> bool {
        if self.or_null && !other.accepts_null() {
            return false;
        }
        if self.or_false && !other.accepts_false() {
            return false;
        }
        match (&self.kind, &other.kind) {
            (_, TypeKind::Primitive(PrimitiveType::Any)) => true,
            (TypeKind::Primitive(PrimitiveType::Null), _) if other.accepts_null() => true,
            (TypeKind::Primitive(PrimitiveType::False), _) if other.accepts_false() => true,
            (TypeKind::Primitive(lhs), TypeKind::Primitive(rhs)) => lhs.is_assignable_to(*rhs),
            (TypeKind::Array(lhs), TypeKind::Array(rhs)) => lhs.is_less_or_equal(rhs, graph),
            // mixed holds arrays of mixed, never instances
            (TypeKind::Array(lhs), TypeKind::Primitive(PrimitiveType::Mixed)) => {
                lhs.is_less_or_equal(&TypeData::primitive(PrimitiveType::Mixed), graph)
            }
            (TypeKind::Instance(lhs), TypeKind::Instance(rhs)) => graph.is_parent_of(*rhs, *lhs),
            (TypeKind::Tuple(lhs), TypeKind::Tuple(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs
                        .iter()
                        .zip(rhs)
                        .all(|(l, r)| l.is_less_or_equal(r, graph))
            }
            _ => false,
        }
    }

    /// Render for diagnostics.
    pub fn display(&self, graph: &ProgramGraph) -> String {
        let base = match &self.kind {
            TypeKind::Primitive(p) => p.name().to_string(),
            TypeKind::Array(inner) => format!("{}[]", inner.display(graph)),
            TypeKind::Instance(class) => graph.class(*class).name.clone(),
            TypeKind::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|t| t.display(graph)).collect();
                format!("tuple({})", parts.join(", "))
            }
        };
        let prefix = if self.or_null { "?" } else { "" };
        let suffix = if self.or_false { "|false" } else { "" };
        format!("{prefix}{base}{suffix}")
    }
}
