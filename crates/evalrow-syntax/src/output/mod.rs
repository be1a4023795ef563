//! Source writers for the syntax tree.

pub mod typescript;

pub use typescript::TypeScriptWriter;
