//! TypeScript syntax tree.
//!
//! Just enough of TypeScript to describe generated modules: type
//! declarations on one side, plain functions with statements and
//! expressions on the other. Nodes are data; rendering lives in
//! [`crate::output`].

use serde::Serialize;

/// A TypeScript source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Module {
    pub items: Vec<Item>,
}

/// A top-level item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    /// Leading block comment (file header).
    Comment(String),
    /// `import type { A, B } from "./x";`
    ImportTypes { names: Vec<String>, from: String },
    /// `export type { A, B } from "./x";`
    ExportTypes { names: Vec<String>, from: String },
    Interface(Interface),
    TypeAlias(TypeAlias),
    Function(Function),
}

/// An interface declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub name: String,
    pub docs: Option<String>,
    pub exported: bool,
    pub properties: Vec<Property>,
}

/// A property signature inside an interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: String,
    pub ty: TsType,
    /// Rendered with `?`.
    pub optional: bool,
    pub docs: Option<String>,
}

/// `type Name = ...;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAlias {
    pub name: String,
    pub docs: Option<String>,
    pub exported: bool,
    pub ty: TsType,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TsType {
    // Keywords
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
    Unknown,
    Void,

    /// `"value"`
    StringLiteral(String),
    /// Named type declared elsewhere.
    Ref(String),
    /// `T[]`
    Array(Box<TsType>),
    /// `Name<A, B>` (`Record`, `Partial`, `Omit`, ...)
    Generic { name: String, args: Vec<TsType> },
    /// `A | B`
    Union(Vec<TsType>),
    /// Return-position type guard: `param is T`
    Predicate { param: String, ty: Box<TsType> },
}

/// A function declaration or, with an empty name, an arrow function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub docs: Option<String>,
    pub exported: bool,
    pub params: Vec<Param>,
    pub returns: Option<TsType>,
    pub body: Vec<Stmt>,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TsType>,
    /// Rendered with `?`.
    pub optional: bool,
    pub default: Option<Expr>,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Expr(Expr),
    Let {
        name: String,
        ty: Option<TsType>,
        init: Option<Expr>,
        mutable: bool,
    },
    Block(Vec<Stmt>),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    Return(Option<Expr>),
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Ident(String),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `object.property`, `object[property]`, `object?.property`, `object?.[property]`
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
        optional: bool,
    },
    Array(Vec<Expr>),
    Object(Vec<ObjectMember>),
    Function(Box<Function>),
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// A member of an object literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ObjectMember {
    /// `key: value`
    Property(String, Expr),
    /// `key`
    Shorthand(String),
    /// `...expr`
    Spread(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// `??`
    Nullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
    /// `typeof`
    TypeOf,
}

impl Module {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// All interfaces, in order.
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.items.iter().filter_map(|item| match item {
            Item::Interface(i) => Some(i),
            _ => None,
        })
    }

    /// All functions, in order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces().find(|i| i.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|f| f.name == name)
    }
}

impl Interface {
    pub fn new(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            docs: None,
            exported: true,
            properties,
        }
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl Property {
    pub fn required(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            docs: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: true,
            docs: None,
        }
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl TsType {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref(name.into())
    }

    pub fn array(item: TsType) -> Self {
        Self::Array(Box::new(item))
    }

    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        Self::Generic {
            name: name.into(),
            args,
        }
    }

    /// `Record<string, value>`
    pub fn record(value: TsType) -> Self {
        Self::generic("Record", vec![Self::String, value])
    }

    pub fn nullable(inner: TsType) -> Self {
        Self::Union(vec![inner, Self::Null])
    }

    pub fn predicate(param: impl Into<String>, ty: TsType) -> Self {
        Self::Predicate {
            param: param.into(),
            ty: Box::new(ty),
        }
    }
}

impl Function {
    /// An exported function declaration.
    pub fn exported(
        name: impl Into<String>,
        params: Vec<Param>,
        returns: TsType,
        body: Vec<Stmt>,
    ) -> Self {
        Self {
            name: name.into(),
            docs: None,
            exported: true,
            params,
            returns: Some(returns),
            body,
        }
    }

    /// An arrow function.
    pub fn arrow(params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Self {
            name: String::new(),
            docs: None,
            exported: false,
            params,
            returns: None,
            body,
        }
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            optional: false,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            optional: true,
            ..Self::new(name, ty)
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Self::Expr(expr)
    }

    pub fn const_decl(name: impl Into<String>, ty: Option<TsType>, init: Expr) -> Self {
        Self::Let {
            name: name.into(),
            ty,
            init: Some(init),
            mutable: false,
        }
    }

    pub fn let_decl(name: impl Into<String>, ty: Option<TsType>, init: Option<Expr>) -> Self {
        Self::Let {
            name: name.into(),
            ty,
            init,
            mutable: true,
        }
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Self::Block(stmts)
    }

    pub fn if_stmt(test: Expr, consequent: Stmt, alternate: Option<Stmt>) -> Self {
        Self::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        }
    }

    pub fn return_stmt(expr: Option<Expr>) -> Self {
        Self::Return(expr)
    }
}

impl Expr {
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    pub fn number(value: impl Into<f64>) -> Self {
        Self::Literal(Literal::Number(value.into()))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Self::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn not(expr: Expr) -> Self {
        Self::unary(UnaryOp::Not, expr)
    }

    pub fn type_of(expr: Expr) -> Self {
        Self::unary(UnaryOp::TypeOf, expr)
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// Call a method: `object.method(args)`.
    pub fn method(object: Expr, method: &str, args: Vec<Expr>) -> Self {
        Self::call(Self::member(object, method), args)
    }

    pub fn member(object: Expr, property: &str) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Box::new(Self::string(property)),
            computed: false,
            optional: false,
        }
    }

    /// `object?.property`
    pub fn optional_member(object: Expr, property: &str) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Box::new(Self::string(property)),
            computed: false,
            optional: true,
        }
    }

    /// `object[index]`, or `object?.[index]` when `optional`.
    pub fn index(object: Expr, index: Expr, optional: bool) -> Self {
        Self::Member {
            object: Box::new(object),
            property: Box::new(index),
            computed: true,
            optional,
        }
    }

    pub fn array(items: Vec<Expr>) -> Self {
        Self::Array(items)
    }

    pub fn object(members: Vec<ObjectMember>) -> Self {
        Self::Object(members)
    }

    pub fn arrow(params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Self::Function(Box::new(Function::arrow(params, body)))
    }

    /// Chain `exprs` with `op`, left-associated. Empty input yields `None`.
    pub fn chain(op: BinaryOp, exprs: Vec<Expr>) -> Option<Self> {
        exprs
            .into_iter()
            .reduce(|left, right| Self::binary(left, op, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_left_associates() {
        let chained = Expr::chain(
            BinaryOp::And,
            vec![Expr::ident("a"), Expr::ident("b"), Expr::ident("c")],
        )
        .unwrap();
        match chained {
            Expr::Binary { left, op, right } => {
                assert_eq!(op, BinaryOp::And);
                assert_eq!(*right, Expr::ident("c"));
                assert!(matches!(*left, Expr::Binary { .. }));
            }
            _ => panic!("expected binary"),
        }
        assert!(Expr::chain(BinaryOp::Or, vec![]).is_none());
    }

    #[test]
    fn module_lookups() {
        let module = Module::new(vec![
            Item::Interface(Interface::new(
                "User",
                vec![Property::required("id", TsType::String)],
            )),
            Item::Function(Function::exported("isUser", vec![], TsType::Boolean, vec![])),
        ]);
        assert!(module.interface("User").unwrap().property("id").is_some());
        assert!(module.function("isUser").is_some());
        assert!(module.interface("Missing").is_none());
    }
}
