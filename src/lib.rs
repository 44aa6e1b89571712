//! Generates Rust data types with paired JSON codecs from an LSP-style
//! protocol metamodel document.
//!
//! Pipeline: [`ir`] (parsed model) → [`flatten`] (inheritance) → [`lower`]
//! (type expressions and codec shapes) → [`codegen`] (text). Generated code
//! links against [`runtime`].
pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod flatten;
pub mod ir;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod runtime;

pub use codegen::{Codegen, GenerationSummary, generate};
pub use config::GeneratorConfig;
pub use ir::MetaModel;
