//! Emission driver: walks the model once and assembles the output text.
//!
//! Order is fixed: enumerations, structures, type aliases, each in
//! declaration order. No dependency sorting; Rust items are order-independent.
pub mod codec;

use indexmap::IndexSet;

use crate::config::GeneratorConfig;
use crate::flatten::PropertyResolver;
use crate::ir::MetaModel;
use crate::lower::TypeResolver;
use crate::naming;
use codec::CodecSynthesizer;

/// Longest documentation summary carried into the output, in characters.
pub const DOC_SUMMARY_MAX: usize = 120;

const INDENT: &str = "    ";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Counts for one run; logged, never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub version: String,
    pub enumerations: usize,
    pub structures: usize,
    pub aliases: usize,
    pub excluded: usize,
    pub duplicates: usize,
    pub requests: usize,
    pub notifications: usize,
}

/// One generation run. The registry of emitted names lives and dies with it.
pub struct Codegen<'c> {
    config: &'c GeneratorConfig,
    registry: IndexSet<String>,
    out: String,
    summary: GenerationSummary,
}

enum Admission {
    Emit(String),
    Excluded,
    Duplicate,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<'c> Codegen<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            registry: IndexSet::new(),
            out: String::new(),
            summary: GenerationSummary::default(),
        }
    }

    pub fn emit(&mut self, model: &MetaModel) {
        let catalog = model.catalog();
        let properties = PropertyResolver::new(&catalog);
        let types = TypeResolver::new(&catalog, self.config, &properties);
        let codecs = CodecSynthesizer::new(&types);

        self.summary.version = model.meta_data.version.clone();
        self.summary.requests = model.requests.len();
        self.summary.notifications = model.notifications.len();

        self.out.push_str(&format!(
            "// Generated from protocol metamodel version {}. Do not edit.\n",
            model.meta_data.version
        ));

        for enumeration in &model.enumerations {
            if let Some(name) = self.admit(&enumeration.name) {
                let mut text = String::new();
                codecs.enumeration(&mut text, &name, enumeration);
                self.append(text);
                self.summary.enumerations += 1;
            }
        }
        for structure in &model.structures {
            if let Some(name) = self.admit(&structure.name) {
                let props = properties.flatten(structure);
                let mut text = String::new();
                codecs.structure(&mut text, &name, structure, &props);
                self.append(text);
                self.summary.structures += 1;
            }
        }
        for alias in &model.type_aliases {
            if let Some(name) = self.admit(&alias.name) {
                let mut text = String::new();
                codecs.alias(&mut text, &name, alias);
                self.append(text);
                self.summary.aliases += 1;
            }
        }

        tracing::info!(
            version = %self.summary.version,
            enumerations = self.summary.enumerations,
            structures = self.summary.structures,
            aliases = self.summary.aliases,
            excluded = self.summary.excluded,
            duplicates = self.summary.duplicates,
            requests = self.summary.requests,
            notifications = self.summary.notifications,
            "generation finished"
        );
    }

    pub fn summary(&self) -> &GenerationSummary {
        &self.summary
    }

    /// Names registered so far, in emission order.
    pub fn registry(&self) -> impl Iterator<Item = &str> {
        self.registry.iter().map(String::as_str)
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn admit(&mut self, raw: &str) -> Option<String> {
        match self.admission(raw) {
            Admission::Emit(name) => Some(name),
            Admission::Excluded => {
                tracing::debug!(name = raw, "excluded, skipping");
                self.summary.excluded += 1;
                None
            }
            Admission::Duplicate => {
                tracing::debug!(name = raw, "already emitted, skipping");
                self.summary.duplicates += 1;
                None
            }
        }
    }

    fn admission(&mut self, raw: &str) -> Admission {
        let name = naming::type_name(raw);
        if self.config.is_excluded(&name) {
            Admission::Excluded
        } else if !self.registry.insert(name.clone()) {
            Admission::Duplicate
        } else {
            Admission::Emit(name)
        }
    }

    /// Entities are separated by exactly one blank line.
    fn append(&mut self, entity: String) {
        self.out.push('\n');
        self.out.push_str(&entity);
    }
}

/// Generate the full artifact for `model` in one run.
pub fn generate(model: &MetaModel, config: &GeneratorConfig) -> String {
    let mut cg = Codegen::new(config);
    cg.emit(model);
    cg.into_string()
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

pub(crate) fn push_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

/// One `///` line: the first non-blank line of `doc`, truncated.
pub(crate) fn doc_comment(out: &mut String, depth: usize, doc: Option<&str>) {
    if let Some(summary) = doc.and_then(doc_summary) {
        push_line(out, depth, &format!("/// {summary}"));
    }
}

fn doc_summary(doc: &str) -> Option<String> {
    let line = doc.lines().map(str::trim).find(|line| !line.is_empty())?;
    Some(line.chars().take(DOC_SUMMARY_MAX).collect::<String>().trim_end().to_string())
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{EnumLiteral, Enumeration, Property, Structure, TypeAlias, TypeRef};
    use pretty_assertions::assert_eq;

    fn kind_and_thing() -> MetaModel {
        let doc = serde_json::json!({
            "metaData": { "version": "3.17.0" },
            "enumerations": [{
                "name": "Kind",
                "type": { "kind": "base", "name": "string" },
                "values": [{ "name": "a", "value": "A" }, { "name": "b", "value": "B" }]
            }],
            "structures": [{
                "name": "Thing",
                "properties": [{ "name": "kind", "type": { "kind": "reference", "name": "Kind" }, "optional": false }]
            }]
        });
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn end_to_end_text() {
        let text = generate(&kind_and_thing(), &GeneratorConfig::default());
        let expected = r#"// Generated from protocol metamodel version 3.17.0. Do not edit.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    A,
    B,
}

impl JsonCodec for Kind {
    fn to_json(&self) -> Value {
        match *self {
            Self::A => Value::String("A".to_string()),
            Self::B => Value::String("B".to_string()),
        }
    }

    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        match value.as_str() {
            Some("A") => Ok(Self::A),
            Some("B") => Ok(Self::B),
            Some(_) => Err(DecodeError::InvalidEnumValue),
            None => Err(DecodeError::ExpectedString),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub kind: Kind,
}

impl JsonCodec for Thing {
    fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("kind".to_string(), self.kind.to_json());
        Value::Object(object)
    }

    fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::ExpectedObject)?;
        Ok(Self {
            kind: Kind::from_json(required_field(object, "kind")?)?,
        })
    }
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn output_is_deterministic_and_runs_are_independent() {
        let model = kind_and_thing();
        let config = GeneratorConfig::default();
        assert_eq!(generate(&model, &config), generate(&model, &config));
    }

    #[test]
    fn order_is_enums_structures_aliases() {
        let mut model = MetaModel::new("1");
        model.type_aliases.push(TypeAlias::new("Alias", TypeRef::base("string")));
        model.structures.push(Structure::new("Second", vec![]));
        model.structures.push(Structure::new("First", vec![]));
        model.enumerations.push(Enumeration::new("Enum", "string", vec![]));
        let config = GeneratorConfig::empty();
        let mut cg = Codegen::new(&config);
        cg.emit(&model);
        assert_eq!(cg.registry().collect::<Vec<_>>(), ["Enum", "Second", "First", "Alias"]);
        let text = cg.into_string();
        let enum_at = text.find("pub enum Enum").unwrap();
        let second_at = text.find("pub struct Second").unwrap();
        let first_at = text.find("pub struct First").unwrap();
        let alias_at = text.find("pub type Alias").unwrap();
        assert!(enum_at < second_at && second_at < first_at && first_at < alias_at);
        assert!(text.ends_with("}\n\npub type Alias = String;\n"));
    }

    #[test]
    fn excluded_entities_never_appear() {
        let mut model = kind_and_thing();
        model.structures.push(Structure::new(
            "Holder",
            vec![
                Property::required("a", TypeRef::reference("Position")),
                Property::optional("b", TypeRef::array(TypeRef::reference("Position"))),
            ],
        ));
        model.structures.push(Structure::new("Position", vec![Property::required("line", TypeRef::base("uinteger"))]));
        model.type_aliases.push(TypeAlias::new("LSPAny", TypeRef::or(vec![])));
        let config = GeneratorConfig::default().with_excluded(["Position"]);
        let mut cg = Codegen::new(&config);
        cg.emit(&model);
        assert_eq!(cg.summary().excluded, 2);
        let text = cg.into_string();
        assert!(!text.contains("pub struct Position"));
        assert!(!text.contains("impl JsonCodec for Position"));
        assert!(!text.contains("pub type LSPAny"));
        assert!(text.contains("pub a: Position,"));
    }

    #[test]
    fn sanitized_duplicates_emit_once() {
        let mut model = MetaModel::new("1");
        model.structures.push(Structure::new("_InitializeParams", vec![Property::required("processId", TypeRef::base("integer"))]));
        model.structures.push(
            Structure::new("InitializeParams", vec![Property::optional("trace", TypeRef::base("string"))])
                .extends("_InitializeParams"),
        );
        let config = GeneratorConfig::empty();
        let mut cg = Codegen::new(&config);
        cg.emit(&model);
        assert_eq!(cg.summary().structures, 1);
        assert_eq!(cg.summary().duplicates, 1);
        let text = cg.into_string();
        assert_eq!(text.matches("pub struct InitializeParams").count(), 1);
        assert!(text.contains("pub process_id: i64,"));
        assert!(!text.contains("pub trace"));
    }

    #[test]
    fn summary_counts_informational_catalog() {
        let mut model = kind_and_thing();
        model.requests = serde_json::from_value(serde_json::json!([
            { "method": "initialize" }, { "method": "shutdown" }
        ]))
        .unwrap();
        model.notifications = serde_json::from_value(serde_json::json!([{ "method": "exit" }])).unwrap();
        let config = GeneratorConfig::default();
        let mut cg = Codegen::new(&config);
        cg.emit(&model);
        let summary = cg.summary().clone();
        assert_eq!(summary.requests, 2);
        assert_eq!(summary.notifications, 1);
        assert_eq!(summary.enumerations, 1);
        assert_eq!(summary.structures, 1);
        assert_eq!(summary.version, "3.17.0");
        let text = cg.into_string();
        assert!(!text.contains("initialize"));
    }

    #[test]
    fn doc_summaries_are_one_truncated_line() {
        assert_eq!(doc_summary("\n  First line.  \nSecond."), Some("First line.".to_string()));
        assert_eq!(doc_summary("   \n"), None);
        let long = "é".repeat(DOC_SUMMARY_MAX + 10);
        assert_eq!(doc_summary(&long).unwrap().chars().count(), DOC_SUMMARY_MAX);
        let mut out = String::new();
        doc_comment(&mut out, 1, Some("Field docs.\n@since 3.16"));
        assert_eq!(out, "    /// Field docs.\n");
    }

    #[test]
    fn enum_docs_and_variant_docs_are_emitted() {
        let mut model = MetaModel::new("1");
        let mut level = Enumeration::new("Level", "integer", vec![("low", EnumLiteral::Integer(1))]);
        level.documentation = Some("How loud.".into());
        level.values[0].documentation = Some("Quiet.".into());
        model.enumerations.push(level);
        let text = generate(&model, &GeneratorConfig::empty());
        assert!(text.contains("/// How loud.\n#[derive"));
        assert!(text.contains("    /// Quiet.\n    Low,\n"));
    }
}
