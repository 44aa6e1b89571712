//! Identifier sanitizing for emitted Rust items.
use once_cell::sync::Lazy;
use regex::Regex;

static NON_IDENT_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"));

/// Strict and reserved keywords a field may not be named after.
pub const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Type and entity names: one leading `_` dropped, first letter uppercased.
///
/// `_InitializeParams` and `InitializeParams` both map to `InitializeParams`;
/// the emission registry keeps whichever comes first.
pub fn type_name(name: &str) -> String {
    let name = name.strip_prefix('_').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Enum variant names: [`type_name`] plus `[^A-Za-z0-9_]` → `_`; a keyword
/// result (`Self`) gets a trailing `_`.
pub fn variant_name(name: &str) -> String {
    let name = type_name(name);
    let name = NON_IDENT_CHAR.replace_all(&name, "_").into_owned();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("V{name}")
    } else if name == "Self" || RESERVED_WORDS.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// Field names: camelCase → snake_case, reserved words get a trailing `_`.
pub fn field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    // only strip the separator we inserted, not one the schema had
    if name.starts_with(char::is_uppercase) {
        out.remove(0);
    }
    if RESERVED_WORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(type_name("textDocument"), "TextDocument");
        assert_eq!(type_name("_InitializeParams"), "InitializeParams");
        assert_eq!(type_name("LSPAny"), "LSPAny");
        assert_eq!(type_name(""), "");
    }

    #[test]
    fn variant_names() {
        assert_eq!(variant_name("plainText"), "PlainText");
        assert_eq!(variant_name("$/cancel"), "__cancel");
        assert_eq!(variant_name("utf-8"), "Utf_8");
        assert_eq!(variant_name("1"), "V1");
        assert_eq!(variant_name("self"), "Self_");
        assert_eq!(variant_name("Self"), "Self_");
        assert_eq!(variant_name("selfish"), "Selfish");
    }

    #[test]
    fn field_names() {
        assert_eq!(field_name("textDocument"), "text_document");
        assert_eq!(field_name("uri"), "uri");
        assert_eq!(field_name("URI"), "u_r_i");
        assert_eq!(field_name("Foo"), "foo");
        assert_eq!(field_name("type"), "type_");
        assert_eq!(field_name("self"), "self_");
        assert_eq!(field_name("_meta"), "_meta");
    }

    #[test]
    fn field_names_are_idempotent() {
        for name in ["textDocument", "type", "workDoneToken", "_meta", "URI", "match"] {
            let once = field_name(name);
            assert_eq!(field_name(&once), once, "{name}");
        }
    }
}
