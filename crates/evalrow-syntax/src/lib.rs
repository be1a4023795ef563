//! TypeScript syntax tree and writer.
//!
//! `evalrow-syntax` keeps generated TypeScript as data until the last
//! moment: generators build a [`Module`] out of declarations, statements
//! and expressions, and [`TypeScriptWriter`] turns it into text. Structural
//! questions ("is this field optional?", "is this type a reference?") are
//! answered against the tree, formatting only against the writer.
//!
//! # Example
//!
//! ```
//! use evalrow_syntax::{Interface, Item, Module, Property, TsType, TypeScriptWriter};
//!
//! let module = Module::new(vec![Item::Interface(Interface::new(
//!     "User",
//!     vec![
//!         Property::required("id", TsType::String),
//!         Property::optional("email", TsType::String),
//!     ],
//! ))]);
//!
//! let ts = TypeScriptWriter::emit(&module);
//! assert!(ts.contains("export interface User {"));
//! assert!(ts.contains("  email?: string;"));
//! ```

pub mod ir;
pub mod output;

// Re-exports: IR types
pub use ir::{
    BinaryOp, Expr, Function, Interface, Item, Literal, Module, ObjectMember, Param, Property,
    Stmt, TsType, TypeAlias, UnaryOp,
};

// Re-exports: writer
pub use output::TypeScriptWriter;
