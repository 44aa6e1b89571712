//! Schema model: the typed IR the generator lowers.
//!
//! Mirrors the protocol metamodel document. Field names follow the document
//! (`metaData.version`, `structures`, `typeAliases`, ...) via serde renames.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaModel {
    pub meta_data: MetaData,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub structures: Vec<Structure>,
    #[serde(default)]
    pub enumerations: Vec<Enumeration>,
    #[serde(default)]
    pub type_aliases: Vec<TypeAlias>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaData {
    pub version: String,
}

/// Informational only; never lowered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub message_direction: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// Informational only; never lowered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub method: String,
    #[serde(default)]
    pub message_direction: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub extends: Vec<TypeRef>,
    #[serde(default)]
    pub mixins: Vec<TypeRef>,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// One occurrence of a type within the schema. Tagged on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeRef {
    Base { name: String },
    Reference { name: String },
    Array { element: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Or { items: Vec<TypeRef> },
    And { items: Vec<TypeRef> },
    Literal { value: LiteralShape },
    StringLiteral { value: String },
    IntegerLiteral { value: i64 },
    BooleanLiteral { value: bool },
    Tuple { items: Vec<TypeRef> },
}

/// Anonymous inline object (`{ kind: "literal" }`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LiteralShape {
    #[serde(default)]
    pub properties: Vec<LiteralProperty>,
}

/// Property of an anonymous literal. Kept apart from [`Property`] because
/// literal types are never structurally lowered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enumeration {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub values: Vec<EnumValue>,
    /// Advisory; decoders still reject unknown values.
    #[serde(default)]
    pub supports_custom_values: bool,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: EnumLiteral,
    #[serde(default)]
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    Integer(i64),
    String(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub documentation: Option<String>,
}

/// Raw-name lookup over the declarations of one model.
///
/// On duplicate raw names the first declaration wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog<'a> {
    pub structures: IndexMap<&'a str, &'a Structure>,
    pub enumerations: IndexMap<&'a str, &'a Enumeration>,
    pub aliases: IndexMap<&'a str, &'a TypeAlias>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl MetaModel {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            meta_data: MetaData { version: version.into() },
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self)
    }
}

impl<'a> Catalog<'a> {
    pub fn new(model: &'a MetaModel) -> Self {
        let mut catalog = Catalog::default();
        for structure in &model.structures {
            catalog.structures.entry(structure.name.as_str()).or_insert(structure);
        }
        for enumeration in &model.enumerations {
            catalog.enumerations.entry(enumeration.name.as_str()).or_insert(enumeration);
        }
        for alias in &model.type_aliases {
            catalog.aliases.entry(alias.name.as_str()).or_insert(alias);
        }
        catalog
    }

    pub fn structure(&self, name: &str) -> Option<&'a Structure> {
        self.structures.get(name).copied()
    }

    pub fn enumeration(&self, name: &str) -> Option<&'a Enumeration> {
        self.enumerations.get(name).copied()
    }

    pub fn alias(&self, name: &str) -> Option<&'a TypeAlias> {
        self.aliases.get(name).copied()
    }
}

impl TypeRef {
    pub fn base(name: impl Into<String>) -> Self {
        TypeRef::Base { name: name.into() }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        TypeRef::Reference { name: name.into() }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array { element: Box::new(element) }
    }

    pub fn or(items: Vec<TypeRef>) -> Self {
        TypeRef::Or { items }
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map { key: Box::new(key), value: Box::new(value) }
    }

    /// Name of the referenced entity, for `reference` types only.
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            TypeRef::Reference { name } => Some(name),
            _ => None,
        }
    }
}

impl Structure {
    pub fn new(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            properties,
            extends: Vec::new(),
            mixins: Vec::new(),
            documentation: None,
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(TypeRef::reference(parent));
        self
    }

    pub fn mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixins.push(TypeRef::reference(mixin));
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.documentation = Some(docs.into());
        self
    }
}

impl Property {
    pub fn required(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            optional: false,
            documentation: None,
        }
    }

    pub fn optional(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            optional: true,
            documentation: None,
        }
    }
}

impl Enumeration {
    pub fn new(name: impl Into<String>, base: &str, values: Vec<(&str, EnumLiteral)>) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::base(base),
            values: values
                .into_iter()
                .map(|(name, value)| EnumValue {
                    name: name.to_string(),
                    value,
                    documentation: None,
                })
                .collect(),
            supports_custom_values: false,
            documentation: None,
        }
    }
}

impl EnumLiteral {
    pub fn as_text(&self) -> String {
        match self {
            EnumLiteral::Integer(value) => value.to_string(),
            EnumLiteral::String(value) => value.clone(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            EnumLiteral::Integer(value) => Some(*value),
            EnumLiteral::String(value) => value.parse().ok(),
        }
    }
}

impl TypeAlias {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            documentation: None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_metamodel_document() {
        let doc = json!({
            "metaData": { "version": "3.17.0" },
            "requests": [{ "method": "initialize", "messageDirection": "clientToServer" }],
            "notifications": [],
            "structures": [{
                "name": "Thing",
                "properties": [
                    { "name": "kind", "type": { "kind": "reference", "name": "Kind" } },
                    { "name": "tags", "type": { "kind": "array", "element": { "kind": "base", "name": "string" } }, "optional": true },
                    { "name": "shape", "type": { "kind": "literal", "value": { "properties": [] } } },
                    { "name": "fixed", "type": { "kind": "stringLiteral", "value": "create" } }
                ],
                "extends": [{ "kind": "reference", "name": "Base" }]
            }],
            "enumerations": [{
                "name": "Kind",
                "type": { "kind": "base", "name": "integer" },
                "values": [{ "name": "one", "value": 1 }, { "name": "two", "value": "2" }],
                "supportsCustomValues": true
            }],
            "typeAliases": [{
                "name": "Payload",
                "type": { "kind": "or", "items": [{ "kind": "base", "name": "string" }, { "kind": "base", "name": "null" }] }
            }]
        });
        let model: MetaModel = serde_json::from_value(doc).unwrap();
        assert_eq!(model.meta_data.version, "3.17.0");
        assert_eq!(model.requests.len(), 1);
        let thing = &model.structures[0];
        assert_eq!(thing.properties[0].type_ref, TypeRef::reference("Kind"));
        assert!(thing.properties[1].optional);
        assert_eq!(thing.extends[0].reference_name(), Some("Base"));
        assert!(matches!(thing.properties[2].type_ref, TypeRef::Literal { .. }));
        let kind = &model.enumerations[0];
        assert_eq!(kind.values[0].value, EnumLiteral::Integer(1));
        assert_eq!(kind.values[1].value, EnumLiteral::String("2".into()));
        assert!(kind.supports_custom_values);
        assert!(matches!(model.type_aliases[0].type_ref, TypeRef::Or { ref items } if items.len() == 2));
    }

    #[test]
    fn catalog_keeps_first_declaration() {
        let mut model = MetaModel::new("1");
        model.structures.push(Structure::new("A", vec![Property::required("x", TypeRef::base("string"))]));
        model.structures.push(Structure::new("A", vec![]));
        let catalog = model.catalog();
        assert_eq!(catalog.structures.len(), 1);
        assert_eq!(catalog.structure("A").unwrap().properties.len(), 1);
        assert!(catalog.alias("A").is_none());
    }

    #[test]
    fn enum_literals_convert() {
        assert_eq!(EnumLiteral::Integer(3).as_text(), "3");
        assert_eq!(EnumLiteral::String("7".into()).as_integer(), Some(7));
        assert_eq!(EnumLiteral::String("x".into()).as_integer(), None);
    }
}
