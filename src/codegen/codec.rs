//! Declarations plus `JsonCodec` impls for enumerations, structures and aliases.
//!
//! Decoders fail hard on scalar kind mismatches, missing required keys and
//! unknown enum literals. Arrays and opaque values degrade silently: a
//! non-array decodes to `[]`, malformed primitive elements decode to their
//! default, opaque values pass through untouched.
use indexmap::IndexSet;

use super::{doc_comment, push_line};
use crate::ir::{Enumeration, Property, Structure, TypeAlias, TypeRef};
use crate::lower::{BaseKind, Shape, TargetType, TypeResolver};
use crate::naming;

pub struct CodecSynthesizer<'a> {
    types: &'a TypeResolver<'a>,
}

/// Everything needed to emit one struct field and its codec arms.
struct FieldPlan<'p> {
    key: &'p str,
    field: String,
    ty: TargetType,
    shape: Shape,
    optional: bool,
    /// Optional inline escape-hatch kind: a present `null` is kept.
    passthrough: bool,
    boxed: bool,
    documentation: Option<&'p str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backing {
    String,
    Integer,
}

impl<'a> CodecSynthesizer<'a> {
    pub fn new(types: &'a TypeResolver<'a>) -> Self {
        Self { types }
    }

    // ---- enumerations ----

    pub fn enumeration(&self, out: &mut String, name: &str, enumeration: &Enumeration) {
        let backing = self.backing(enumeration);

        let mut seen = IndexSet::new();
        let variants = enumeration
            .values
            .iter()
            .filter_map(|value| {
                let variant = naming::variant_name(&value.name);
                if seen.insert(variant.clone()) {
                    Some((variant, value))
                } else {
                    tracing::warn!(enumeration = %name, variant = %variant, "duplicate variant dropped");
                    None
                }
            })
            .collect::<Vec<_>>();

        doc_comment(out, 0, enumeration.documentation.as_deref());
        push_line(out, 0, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        push_line(out, 0, &format!("pub enum {name} {{"));
        for (variant, value) in &variants {
            doc_comment(out, 1, value.documentation.as_deref());
            push_line(out, 1, &format!("{variant},"));
        }
        push_line(out, 0, "}");
        out.push('\n');

        push_line(out, 0, &format!("impl JsonCodec for {name} {{"));
        push_line(out, 1, "fn to_json(&self) -> Value {");
        push_line(out, 2, "match *self {");
        for (variant, value) in &variants {
            let encoded = match backing {
                Backing::String => format!("Value::String({:?}.to_string())", value.value.as_text()),
                Backing::Integer => format!("Value::from({}i64)", value.value.as_integer().unwrap_or_default()),
            };
            push_line(out, 3, &format!("Self::{variant} => {encoded},"));
        }
        push_line(out, 2, "}");
        push_line(out, 1, "}");
        out.push('\n');

        push_line(out, 1, "fn from_json(value: &Value) -> Result<Self, DecodeError> {");
        let (scrutinee, wrong_kind) = match backing {
            Backing::String => ("value.as_str()", "ExpectedString"),
            Backing::Integer => ("integer_value(value)", "ExpectedNumber"),
        };
        push_line(out, 2, &format!("match {scrutinee} {{"));
        for (variant, value) in &variants {
            let pattern = match backing {
                Backing::String => format!("{:?}", value.value.as_text()),
                Backing::Integer => value.value.as_integer().unwrap_or_default().to_string(),
            };
            push_line(out, 3, &format!("Some({pattern}) => Ok(Self::{variant}),"));
        }
        push_line(out, 3, "Some(_) => Err(DecodeError::InvalidEnumValue),");
        push_line(out, 3, &format!("None => Err(DecodeError::{wrong_kind}),"));
        push_line(out, 2, "}");
        push_line(out, 1, "}");
        push_line(out, 0, "}");
    }

    /// Integer-backed only when the base lowers to `i64` and every literal is an integer.
    fn backing(&self, enumeration: &Enumeration) -> Backing {
        let integer_base = self.types.resolve(&enumeration.type_ref, false)
            == TargetType::Base(BaseKind::Integer);
        if integer_base && enumeration.values.iter().all(|v| v.value.as_integer().is_some()) {
            Backing::Integer
        } else {
            Backing::String
        }
    }

    // ---- structures ----

    /// `props` is the flattened property list, in emission order.
    pub fn structure(&self, out: &mut String, name: &str, structure: &Structure, props: &[&Property]) {
        let plans = props
            .iter()
            .map(|prop| self.plan_field(name, prop))
            .collect::<Vec<_>>();

        doc_comment(out, 0, structure.documentation.as_deref());
        push_line(out, 0, "#[derive(Debug, Clone, PartialEq)]");
        if plans.is_empty() {
            push_line(out, 0, &format!("pub struct {name} {{}}"));
        } else {
            push_line(out, 0, &format!("pub struct {name} {{"));
            for plan in &plans {
                doc_comment(out, 1, plan.documentation);
                push_line(out, 1, &format!("pub {}: {},", plan.field, plan.ty));
            }
            push_line(out, 0, "}");
        }
        out.push('\n');

        push_line(out, 0, &format!("impl JsonCodec for {name} {{"));
        self.structure_encoder(out, &plans);
        out.push('\n');
        self.structure_decoder(out, &plans);
        push_line(out, 0, "}");
    }

    fn plan_field<'p>(&self, owner: &str, prop: &'p Property) -> FieldPlan<'p> {
        let boxed = self.types.needs_indirection(owner, &prop.type_ref);
        let mut ty = self.types.resolve(&prop.type_ref, false);
        if boxed {
            ty = ty.boxed();
        }
        if prop.optional {
            ty = ty.optional();
        }
        let shape = self.types.shape(&prop.type_ref);
        let passthrough = prop.optional
            && shape == Shape::Opaque
            && !matches!(prop.type_ref, TypeRef::Reference { .. });
        FieldPlan {
            key: &prop.name,
            field: naming::field_name(&prop.name),
            ty,
            shape,
            optional: prop.optional,
            passthrough,
            boxed,
            documentation: prop.documentation.as_deref(),
        }
    }

    fn structure_encoder(&self, out: &mut String, plans: &[FieldPlan<'_>]) {
        push_line(out, 1, "fn to_json(&self) -> Value {");
        if plans.is_empty() {
            push_line(out, 2, "Value::Object(Map::new())");
            push_line(out, 1, "}");
            return;
        }
        push_line(out, 2, "let mut object = Map::new();");
        for plan in plans {
            let key = format!("{:?}.to_string()", plan.key);
            if plan.optional && plan.shape == Shape::Base(BaseKind::Null) {
                push_line(out, 2, &format!("if self.{}.is_some() {{", plan.field));
                push_line(out, 3, &format!("object.insert({key}, Value::Null);"));
                push_line(out, 2, "}");
            } else if plan.optional {
                push_line(out, 2, &format!("if let Some(value) = &self.{} {{", plan.field));
                let encoded = encode_expr(&plan.shape, "value", true);
                push_line(out, 3, &format!("object.insert({key}, {encoded});"));
                push_line(out, 2, "}");
            } else {
                let place = format!("self.{}", plan.field);
                let encoded = encode_expr(&plan.shape, &place, false);
                push_line(out, 2, &format!("object.insert({key}, {encoded});"));
            }
        }
        push_line(out, 2, "Value::Object(object)");
        push_line(out, 1, "}");
    }

    fn structure_decoder(&self, out: &mut String, plans: &[FieldPlan<'_>]) {
        push_line(out, 1, "fn from_json(value: &Value) -> Result<Self, DecodeError> {");
        if plans.is_empty() {
            push_line(out, 2, "value.as_object().ok_or(DecodeError::ExpectedObject)?;");
            push_line(out, 2, "Ok(Self {})");
            push_line(out, 1, "}");
            return;
        }
        push_line(out, 2, "let object = value.as_object().ok_or(DecodeError::ExpectedObject)?;");
        push_line(out, 2, "Ok(Self {");
        for plan in plans {
            let key = format!("{:?}", plan.key);
            match (plan.optional, &plan.shape) {
                _ if plan.passthrough => {
                    push_line(out, 3, &format!("{}: object.get({key}).cloned(),", plan.field));
                }
                (true, shape) => {
                    let decoded = wrap_boxed(decode_expr(shape, "field"), plan.boxed);
                    push_line(out, 3, &format!("{}: match optional_field(object, {key}) {{", plan.field));
                    push_line(out, 4, &format!("Some(field) => Some({decoded}),"));
                    push_line(out, 4, "None => None,");
                    push_line(out, 3, "},");
                }
                (false, shape) => {
                    let input = format!("required_field(object, {key})?");
                    let decoded = wrap_boxed(decode_expr(shape, &input), plan.boxed);
                    push_line(out, 3, &format!("{}: {decoded},", plan.field));
                }
            }
        }
        push_line(out, 2, "})");
        push_line(out, 1, "}");
    }

    // ---- aliases ----

    /// Aliases are bare `type` items and borrow the codec of what they name.
    pub fn alias(&self, out: &mut String, name: &str, alias: &TypeAlias) {
        let target = self.types.resolve(&alias.type_ref, false);
        doc_comment(out, 0, alias.documentation.as_deref());
        push_line(out, 0, &format!("pub type {name} = {target};"));
    }
}

// ————————————————————————————————————————————————————————————————————————————
// EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

/// Expression turning `place` into a `Value`. `by_ref` when `place` is a reference.
fn encode_expr(shape: &Shape, place: &str, by_ref: bool) -> String {
    let copied = || if by_ref { format!("*{place}") } else { place.to_string() };
    match shape {
        Shape::Base(BaseKind::String) => format!("Value::String({place}.clone())"),
        Shape::Base(BaseKind::Integer | BaseKind::Decimal) => format!("Value::from({})", copied()),
        Shape::Base(BaseKind::Boolean) => format!("Value::Bool({})", copied()),
        Shape::Base(BaseKind::Null) => "Value::Null".to_string(),
        Shape::Entity(_) => format!("{place}.to_json()"),
        Shape::Sequence(item) => format!(
            "Value::Array({place}.iter().map(|item| {}).collect())",
            encode_expr(item, "item", true)
        ),
        Shape::Opaque => format!("{place}.clone()"),
    }
}

/// Expression decoding `input` (a `&Value`), propagating errors with `?`.
fn decode_expr(shape: &Shape, input: &str) -> String {
    match shape {
        Shape::Base(BaseKind::String) => {
            format!("{input}.as_str().ok_or(DecodeError::ExpectedString)?.to_string()")
        }
        Shape::Base(BaseKind::Integer) => format!("integer_value({input}).ok_or(DecodeError::ExpectedNumber)?"),
        Shape::Base(BaseKind::Decimal) => format!("{input}.as_f64().ok_or(DecodeError::ExpectedNumber)?"),
        Shape::Base(BaseKind::Boolean) => format!("{input}.as_bool().ok_or(DecodeError::ExpectedBoolean)?"),
        Shape::Base(BaseKind::Null) => format!("{input}.as_null().unwrap_or_default()"),
        Shape::Entity(name) => format!("{name}::from_json({input})?"),
        Shape::Sequence(item) => format!("decode_array({input}, {})?", decode_element(item)),
        Shape::Opaque => format!("{input}.clone()"),
    }
}

/// Per-element decoder handed to `decode_array`.
///
/// Primitive elements never fail: a malformed item becomes the type's default.
fn decode_element(shape: &Shape) -> String {
    match shape {
        Shape::Base(BaseKind::String) => "|item| Ok(item.as_str().unwrap_or_default().to_string())".to_string(),
        Shape::Base(BaseKind::Integer) => "|item| Ok(integer_value(item).unwrap_or_default())".to_string(),
        Shape::Base(BaseKind::Decimal) => "|item| Ok(item.as_f64().unwrap_or_default())".to_string(),
        Shape::Base(BaseKind::Boolean) => "|item| Ok(item.as_bool().unwrap_or_default())".to_string(),
        Shape::Base(BaseKind::Null) => "|item| Ok(item.as_null().unwrap_or_default())".to_string(),
        Shape::Entity(name) => format!("{name}::from_json"),
        Shape::Sequence(inner) => format!("|item| decode_array(item, {})", decode_element(inner)),
        Shape::Opaque => "|item| Ok(item.clone())".to_string(),
    }
}

fn wrap_boxed(expr: String, boxed: bool) -> String {
    if boxed { format!("Box::new({expr})") } else { expr }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
