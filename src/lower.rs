//! Lowering of schema types to Rust type expressions and codec shapes.
//!
//! Everything the target type system cannot express faithfully (maps, unions,
//! intersections, anonymous literals, tuples, unknown primitives) collapses to
//! the opaque `Value` escape type.
use std::collections::HashSet;
use std::fmt;

use crate::config::GeneratorConfig;
use crate::flatten::PropertyResolver;
use crate::ir::{Catalog, Structure, TypeRef};
use crate::naming;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// The seven recognised primitive names, collapsed to the five Rust shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    String,
    Integer,
    Decimal,
    Boolean,
    Null,
}

/// Rust type expression for a field or alias target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    Base(BaseKind),
    /// Opaque `serde_json::Value`.
    Json,
    Named(String),
    Sequence(Box<TargetType>),
    Boxed(Box<TargetType>),
    Optional(Box<TargetType>),
}

/// How a value of some schema type is encoded and decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Base(BaseKind),
    /// Delegates to `<name as JsonCodec>`.
    Entity(String),
    Sequence(Box<Shape>),
    /// Passed through untouched.
    Opaque,
}

pub struct TypeResolver<'a> {
    catalog: &'a Catalog<'a>,
    config: &'a GeneratorConfig,
    properties: &'a PropertyResolver<'a>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl BaseKind {
    pub fn from_base_name(name: &str) -> Option<Self> {
        match name {
            "string" | "DocumentUri" | "URI" | "RegExp" => Some(BaseKind::String),
            "integer" | "uinteger" => Some(BaseKind::Integer),
            "decimal" => Some(BaseKind::Decimal),
            "boolean" => Some(BaseKind::Boolean),
            "null" => Some(BaseKind::Null),
            _ => None,
        }
    }

    /// Base kind of a `base` or literal-constant type.
    pub fn of(type_ref: &TypeRef) -> Option<Self> {
        match type_ref {
            TypeRef::Base { name } => Self::from_base_name(name),
            TypeRef::StringLiteral { .. } => Some(BaseKind::String),
            TypeRef::IntegerLiteral { .. } => Some(BaseKind::Integer),
            TypeRef::BooleanLiteral { .. } => Some(BaseKind::Boolean),
            _ => None,
        }
    }

    pub fn rust_type(self) -> &'static str {
        match self {
            BaseKind::String => "String",
            BaseKind::Integer => "i64",
            BaseKind::Decimal => "f64",
            BaseKind::Boolean => "bool",
            BaseKind::Null => "()",
        }
    }
}

/// True for recognised `base` primitives and the three literal-constant kinds.
///
/// Must agree with the `base` rows of [`TypeResolver::resolve`].
pub fn is_base_type(type_ref: &TypeRef) -> bool {
    BaseKind::of(type_ref).is_some()
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Base(kind) => f.write_str(kind.rust_type()),
            TargetType::Json => f.write_str("Value"),
            TargetType::Named(name) => f.write_str(name),
            TargetType::Sequence(item) => write!(f, "Vec<{item}>"),
            TargetType::Boxed(inner) => write!(f, "Box<{inner}>"),
            TargetType::Optional(inner) => write!(f, "Option<{inner}>"),
        }
    }
}

impl TargetType {
    pub fn boxed(self) -> Self {
        TargetType::Boxed(Box::new(self))
    }

    pub fn optional(self) -> Self {
        TargetType::Optional(Box::new(self))
    }
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        catalog: &'a Catalog<'a>,
        config: &'a GeneratorConfig,
        properties: &'a PropertyResolver<'a>,
    ) -> Self {
        Self { catalog, config, properties }
    }

    /// Rust type expression for `type_ref`, wrapped in `Option` when `optional`.
    pub fn resolve(&self, type_ref: &TypeRef, optional: bool) -> TargetType {
        let ty = match type_ref {
            TypeRef::Base { .. }
            | TypeRef::StringLiteral { .. }
            | TypeRef::IntegerLiteral { .. }
            | TypeRef::BooleanLiteral { .. } => match BaseKind::of(type_ref) {
                Some(kind) => TargetType::Base(kind),
                None => TargetType::Json,
            },
            TypeRef::Reference { name } if self.config.is_string_alias(name) => {
                TargetType::Base(BaseKind::String)
            }
            TypeRef::Reference { name } => TargetType::Named(naming::type_name(name)),
            TypeRef::Array { element } => {
                TargetType::Sequence(Box::new(self.resolve(element, false)))
            }
            TypeRef::Map { .. }
            | TypeRef::Or { .. }
            | TypeRef::And { .. }
            | TypeRef::Literal { .. }
            | TypeRef::Tuple { .. } => TargetType::Json,
        };
        if optional { ty.optional() } else { ty }
    }

    /// Codec shape for `type_ref`; aliases lend the shape of their target.
    pub fn shape(&self, type_ref: &TypeRef) -> Shape {
        self.shape_guarded(type_ref, &mut HashSet::new())
    }

    fn shape_guarded<'r>(&self, type_ref: &'r TypeRef, seen: &mut HashSet<&'r str>) -> Shape
    where
        'a: 'r,
    {
        match type_ref {
            TypeRef::Reference { name } => {
                if self.config.is_string_alias(name) {
                    return Shape::Base(BaseKind::String);
                }
                let sanitized = naming::type_name(name);
                if self.config.is_excluded(&sanitized)
                    || self.catalog.structure(name).is_some()
                    || self.catalog.enumeration(name).is_some()
                {
                    return Shape::Entity(sanitized);
                }
                let Some(alias) = self.catalog.alias(name) else {
                    return Shape::Entity(sanitized);
                };
                // alias cycle: fall back to the alias' own name
                if !seen.insert(alias.name.as_str()) {
                    return Shape::Entity(sanitized);
                }
                match &alias.type_ref {
                    TypeRef::Or { .. } => Shape::Opaque,
                    target => self.shape_guarded(target, seen),
                }
            }
            TypeRef::Array { element } => Shape::Sequence(Box::new(self.shape_guarded(element, seen))),
            other => match BaseKind::of(other) {
                Some(kind) => Shape::Base(kind),
                None => Shape::Opaque,
            },
        }
    }

    /// Whether a field of `type_ref` inside structure `owner` (sanitized name)
    /// has to be boxed: its type is a structure that contains `owner` again
    /// through by-value fields.
    pub fn needs_indirection(&self, owner: &str, type_ref: &TypeRef) -> bool {
        match self.by_value_structure(type_ref) {
            Some(structure) => self.reaches(structure, owner, &mut HashSet::new()),
            None => false,
        }
    }

    fn reaches(&self, from: &'a Structure, owner: &str, visited: &mut HashSet<&'a str>) -> bool {
        if naming::type_name(&from.name) == owner {
            return true;
        }
        if !visited.insert(from.name.as_str()) {
            return false;
        }
        self.properties.flatten(from).into_iter().any(|prop| {
            self.by_value_structure(&prop.type_ref)
                .is_some_and(|next| self.reaches(next, owner, visited))
        })
    }

    /// The structure stored inline for `type_ref`, following reference aliases.
    fn by_value_structure(&self, type_ref: &TypeRef) -> Option<&'a Structure> {
        let mut name = type_ref.reference_name()?;
        let mut hops = HashSet::new();
        loop {
            if self.config.is_string_alias(name) || self.config.is_excluded(&naming::type_name(name)) {
                return None;
            }
            if let Some(structure) = self.catalog.structure(name) {
                return Some(structure);
            }
            let alias = self.catalog.alias(name)?;
            if !hops.insert(alias.name.as_str()) {
                return None;
            }
            name = alias.type_ref.reference_name()?;
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
