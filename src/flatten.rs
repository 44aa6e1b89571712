//! Inheritance flattening over `extends` and `mixins`.
//!
//! Phases, each in declaration order:
//! 1. every `extends` target, recursively
//! 2. every `mixins` target, recursively
//! 3. the structure's own properties
//!
//! Dedup is by property name and the first write wins, so an inherited
//! property shadows a same-named one declared lower in the hierarchy.
use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ir::{Catalog, Property, Structure, TypeRef};

pub struct PropertyResolver<'a> {
    catalog: &'a Catalog<'a>,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(catalog: &'a Catalog<'a>) -> Self {
        Self { catalog }
    }

    /// Every property `structure` effectively carries, in emission order.
    pub fn flatten(&self, structure: &'a Structure) -> Vec<&'a Property> {
        let mut visited = HashSet::new();
        let mut props = IndexMap::new();
        self.collect(structure, &mut visited, &mut props);
        props.into_values().collect()
    }

    fn collect(
        &self,
        structure: &'a Structure,
        visited: &mut HashSet<&'a str>,
        props: &mut IndexMap<&'a str, &'a Property>,
    ) {
        // re-entry through a cycle contributes nothing
        if !visited.insert(structure.name.as_str()) {
            return;
        }
        for parent in structure.extends.iter().chain(&structure.mixins) {
            if let Some(parent) = self.lookup(parent) {
                self.collect(parent, visited, props);
            }
        }
        for prop in &structure.properties {
            props.entry(prop.name.as_str()).or_insert(prop);
        }
    }

    fn lookup(&self, type_ref: &TypeRef) -> Option<&'a Structure> {
        type_ref
            .reference_name()
            .and_then(|name| self.catalog.structure(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MetaModel;

    fn names(props: &[&Property]) -> Vec<String> {
        props.iter().map(|p| p.name.clone()).collect()
    }

    fn model(structures: Vec<Structure>) -> MetaModel {
        let mut model = MetaModel::new("test");
        model.structures = structures;
        model
    }

    #[test]
    fn extends_then_mixins_then_own() {
        let model = model(vec![
            Structure::new("A", vec![Property::required("a", TypeRef::base("string"))]),
            Structure::new("M", vec![Property::required("m", TypeRef::base("string"))]),
            Structure::new("B", vec![Property::required("b", TypeRef::base("string"))])
                .mixin("M")
                .extends("A"),
        ]);
        let catalog = model.catalog();
        let resolver = PropertyResolver::new(&catalog);
        let props = resolver.flatten(catalog.structure("B").unwrap());
        assert_eq!(names(&props), ["a", "m", "b"]);
    }

    #[test]
    fn ancestor_property_wins_over_redeclaration() {
        let model = model(vec![
            Structure::new("A", vec![Property::required("x", TypeRef::base("integer"))]),
            Structure::new("B", vec![Property::required("x", TypeRef::base("string"))]).extends("A"),
        ]);
        let catalog = model.catalog();
        let resolver = PropertyResolver::new(&catalog);
        let props = resolver.flatten(catalog.structure("B").unwrap());
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].type_ref, TypeRef::base("integer"));
    }

    #[test]
    fn cyclic_extends_terminates() {
        let model = model(vec![
            Structure::new("A", vec![Property::required("a", TypeRef::base("string"))]).extends("B"),
            Structure::new("B", vec![Property::required("b", TypeRef::base("string"))]).extends("A"),
        ]);
        let catalog = model.catalog();
        let resolver = PropertyResolver::new(&catalog);
        assert_eq!(names(&resolver.flatten(catalog.structure("A").unwrap())), ["b", "a"]);
        assert_eq!(names(&resolver.flatten(catalog.structure("B").unwrap())), ["a", "b"]);
    }

    #[test]
    fn self_mixin_and_unknown_parents_are_skipped() {
        let mut odd = Structure::new("Odd", vec![Property::required("o", TypeRef::base("string"))])
            .extends("Missing")
            .mixin("Odd");
        odd.extends.push(TypeRef::base("string"));
        let model = model(vec![odd]);
        let catalog = model.catalog();
        let resolver = PropertyResolver::new(&catalog);
        assert_eq!(names(&resolver.flatten(catalog.structure("Odd").unwrap())), ["o"]);
    }

    #[test]
    fn diamond_contributes_shared_ancestor_once() {
        let model = model(vec![
            Structure::new("D", vec![Property::required("d", TypeRef::base("string"))]),
            Structure::new("L", vec![Property::required("l", TypeRef::base("string"))]).extends("D"),
            Structure::new("R", vec![Property::required("r", TypeRef::base("string"))]).extends("D"),
            Structure::new("Top", vec![]).extends("L").extends("R"),
        ]);
        let catalog = model.catalog();
        let resolver = PropertyResolver::new(&catalog);
        assert_eq!(names(&resolver.flatten(catalog.structure("Top").unwrap())), ["d", "l", "r"]);
    }
}
