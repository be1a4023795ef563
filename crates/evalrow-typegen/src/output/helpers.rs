//! TypeScript runtime helpers backend.
//!
//! Emits type guards, accessors, a constructor and a validator for the
//! root record. Field names come from the IR rather than being hard-coded,
//! so a model whose shape no longer fits the helpers fails generation with
//! a [`HelperError`] instead of producing code that does not type-check.
//!
//! Error text in the validator is shared with
//! [`evalrow_model::validate_evaluation_row`].

use crate::GenerateError;
use crate::ir::{Field, RecordDef, Schema, Type};
use crate::options::GenerateOptions;
use crate::traits::{Backend, BackendCategory};
use evalrow_model::check::errors;
use evalrow_syntax::{
    BinaryOp, Expr, Function, Interface, Item, Module, ObjectMember, Param, Property, Stmt,
    TsType, TypeScriptWriter,
};

/// Name of the result interface emitted by the validator.
pub const VALIDATION_RESULT: &str = "ValidationResult";

/// Options for helper generation.
#[derive(Debug, Clone)]
pub struct HelperOptions {
    /// Root field holding the conversation.
    pub messages_field: String,
    /// Message field holding the role.
    pub role_field: String,
    /// Root field holding the evaluation result.
    pub result_field: String,
    /// Result field holding per-step outputs.
    pub steps_field: String,
    /// Root field holding the metadata bag.
    pub metadata_field: String,
    /// Roles that get a dedicated accessor (`getAssistantMessages`, ...).
    pub roles: Vec<String>,
    /// Header comment; a default naming the root record is used when empty.
    pub header: Option<String>,
}

impl Default for HelperOptions {
    fn default() -> Self {
        Self {
            messages_field: "messages".into(),
            role_field: "role".into(),
            result_field: "evaluation_result".into(),
            steps_field: "step_outputs".into(),
            metadata_field: "input_metadata".into(),
            roles: vec!["assistant".into(), "user".into()],
            header: None,
        }
    }
}

/// The model cannot carry the helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HelperError {
    #[error("record `{0}` is not defined")]
    MissingRecord(String),

    #[error("{record} has no field `{field}`")]
    MissingField { record: String, field: String },

    #[error("{record}.{field} must be {expected}")]
    Shape {
        record: String,
        field: String,
        expected: &'static str,
    },
}

/// TypeScript helpers backend.
pub struct HelpersBackend;

impl Backend for HelpersBackend {
    fn name(&self) -> &'static str {
        "typescript-helpers"
    }

    fn language(&self) -> &'static str {
        "typescript"
    }

    fn category(&self) -> BackendCategory {
        BackendCategory::Validators
    }

    fn file_name<'a>(&self, options: &'a GenerateOptions) -> &'a str {
        &options.files.helpers
    }

    fn generate(&self, schema: &Schema, options: &GenerateOptions) -> Result<String, GenerateError> {
        let module = helpers(schema, &options.helpers, &options.files.declarations_module())?;
        Ok(TypeScriptWriter::emit(&module))
    }
}

/// Static instance for registry.
pub static HELPERS_BACKEND: HelpersBackend = HelpersBackend;

/// Render the helpers file. `types_module` is the import path of the
/// declaration file (e.g. `./evaluation-row.d`).
pub fn generate_helpers(
    schema: &Schema,
    options: &HelperOptions,
    types_module: &str,
) -> Result<String, HelperError> {
    Ok(TypeScriptWriter::emit(&helpers(schema, options, types_module)?))
}

/// Resolved names the helpers are written against.
struct Plan<'a> {
    root: &'a str,
    message: &'a str,
    messages: &'a str,
    role: &'a str,
    result: &'a str,
    steps: &'a str,
    metadata: &'a str,
}

fn plan<'a>(schema: &'a Schema, options: &'a HelperOptions) -> Result<Plan<'a>, HelperError> {
    let root = schema
        .root_def()
        .ok_or_else(|| HelperError::MissingRecord(schema.root.clone()))?;

    let messages = field(root, &options.messages_field)?;
    let message = match &messages.ty {
        Type::Array(item) if messages.required => match item.as_ref() {
            Type::Ref(name) => Some(name.as_str()),
            _ => None,
        },
        _ => None,
    }
    .ok_or_else(|| shape(root, messages, "a required array of records"))?;
    let message_def = record(schema, message)?;

    let role = field(message_def, &options.role_field)?;
    if !role.required || role.ty != Type::String {
        return Err(shape(message_def, role, "a required string"));
    }

    let result = field(root, &options.result_field)?;
    let Type::Ref(result_name) = result.ty.strip_optional() else {
        return Err(shape(root, result, "a record"));
    };
    let result_def = record(schema, result_name)?;

    let steps = field(result_def, &options.steps_field)?;
    if !matches!(steps.ty.strip_optional(), Type::Array(_)) {
        return Err(shape(result_def, steps, "an array"));
    }

    let metadata = field(root, &options.metadata_field)?;
    if !matches!(metadata.ty.strip_optional(), Type::Map(_)) {
        return Err(shape(root, metadata, "a string-keyed map"));
    }

    Ok(Plan {
        root: &root.name,
        message,
        messages: &messages.name,
        role: &role.name,
        result: &result.name,
        steps: &steps.name,
        metadata: &metadata.name,
    })
}

fn record<'a>(schema: &'a Schema, name: &str) -> Result<&'a RecordDef, HelperError> {
    schema
        .get(name)
        .ok_or_else(|| HelperError::MissingRecord(name.to_string()))
}

fn field<'a>(def: &'a RecordDef, name: &str) -> Result<&'a Field, HelperError> {
    def.field(name).ok_or_else(|| HelperError::MissingField {
        record: def.name.clone(),
        field: name.to_string(),
    })
}

fn shape(def: &RecordDef, field: &Field, expected: &'static str) -> HelperError {
    HelperError::Shape {
        record: def.name.clone(),
        field: field.name.clone(),
        expected,
    }
}

/// Build the helpers file as a syntax tree.
pub fn helpers(
    schema: &Schema,
    options: &HelperOptions,
    types_module: &str,
) -> Result<Module, HelperError> {
    let plan = plan(schema, options)?;
    let header = options.header.clone().unwrap_or_else(|| {
        format!(
            "Runtime helpers for {}\n\nGenerated from the evaluation record model. Do not edit by hand.",
            plan.root
        )
    });

    let mut imports = vec![plan.root.to_string()];
    if plan.message != plan.root {
        imports.push(plan.message.to_string());
    }

    let mut module = Module::new(vec![
        Item::Comment(header),
        Item::ImportTypes {
            names: imports,
            from: types_module.to_string(),
        },
        Item::ExportTypes {
            names: schema.names().into_iter().map(String::from).collect(),
            from: types_module.to_string(),
        },
        Item::Interface(
            Interface::new(
                VALIDATION_RESULT,
                vec![
                    Property::required("valid", TsType::Boolean),
                    Property::required("errors", TsType::array(TsType::String)),
                ],
            )
            .with_docs(format!("Outcome of validate{}", plan.root)),
        ),
    ]);

    let mut functions = vec![
        type_guard(&plan),
        trajectory_check(&plan),
        messages_by_role(&plan),
    ];
    for role in &options.roles {
        functions.push(role_accessor(&plan, role));
    }
    functions.push(metadata_accessor(&plan));
    functions.push(constructor(&plan));
    functions.push(validator(&plan));

    for function in functions {
        module.push(Item::Function(function));
    }
    Ok(module)
}

fn pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn ident(name: &str) -> Expr {
    Expr::ident(name)
}

fn and(exprs: Vec<Expr>) -> Option<Expr> {
    Expr::chain(BinaryOp::And, exprs)
}

fn or(exprs: Vec<Expr>) -> Option<Expr> {
    Expr::chain(BinaryOp::Or, exprs)
}

fn type_is(expr: Expr, op: BinaryOp, name: &str) -> Expr {
    Expr::binary(Expr::type_of(expr), op, Expr::string(name))
}

fn is_array(expr: Expr) -> Expr {
    Expr::method(ident("Array"), "isArray", vec![expr])
}

fn push_error(message: Expr) -> Stmt {
    Stmt::expr(Expr::method(ident("errors"), "push", vec![message]))
}

/// `obj !== null && typeof obj === "object" && Array.isArray(obj.messages) && ...`
fn type_guard(plan: &Plan) -> Function {
    let message_ok = and(vec![
        Expr::binary(ident("msg"), BinaryOp::Ne, Expr::null()),
        type_is(ident("msg"), BinaryOp::Eq, "object"),
        type_is(Expr::member(ident("msg"), plan.role), BinaryOp::Eq, "string"),
    ]);
    let every = Expr::method(
        Expr::member(ident("obj"), plan.messages),
        "every",
        vec![Expr::arrow(
            vec![Param::new("msg", TsType::Any)],
            vec![Stmt::return_stmt(message_ok)],
        )],
    );

    Function::exported(
        format!("is{}", plan.root),
        vec![Param::new("obj", TsType::Any)],
        TsType::predicate("obj", TsType::reference(plan.root)),
        vec![Stmt::return_stmt(and(vec![
            Expr::binary(ident("obj"), BinaryOp::Ne, Expr::null()),
            type_is(ident("obj"), BinaryOp::Eq, "object"),
            is_array(Expr::member(ident("obj"), plan.messages)),
            every,
        ]))],
    )
    .with_docs(format!("Type guard for {}", plan.root))
}

/// `(row.evaluation_result?.step_outputs?.length ?? 0) > 0`
fn trajectory_check(plan: &Plan) -> Function {
    let length = Expr::optional_member(
        Expr::optional_member(Expr::member(ident("row"), plan.result), plan.steps),
        "length",
    );
    Function::exported(
        "isTrajectoryEvaluation",
        vec![Param::new("row", TsType::reference(plan.root))],
        TsType::Boolean,
        vec![Stmt::return_stmt(Some(Expr::binary(
            Expr::binary(length, BinaryOp::Nullish, Expr::number(0)),
            BinaryOp::Gt,
            Expr::number(0),
        )))],
    )
    .with_docs("Whether the row carries per-step outputs")
}

fn messages_by_role(plan: &Plan) -> Function {
    let matches = Expr::binary(
        Expr::member(ident("msg"), plan.role),
        BinaryOp::Eq,
        ident("role"),
    );
    Function::exported(
        messages_by_role_name(plan),
        vec![
            Param::new("row", TsType::reference(plan.root)),
            Param::new("role", TsType::String),
        ],
        TsType::array(TsType::reference(plan.message)),
        vec![Stmt::return_stmt(Some(Expr::method(
            Expr::member(ident("row"), plan.messages),
            "filter",
            vec![Expr::arrow(
                vec![Param::new("msg", TsType::reference(plan.message))],
                vec![Stmt::return_stmt(Some(matches))],
            )],
        )))],
    )
    .with_docs(format!("Messages with the given {}", plan.role))
}

fn messages_by_role_name(plan: &Plan) -> String {
    format!(
        "get{}By{}",
        pascal_case(plan.messages),
        pascal_case(plan.role)
    )
}

fn role_accessor(plan: &Plan, role: &str) -> Function {
    Function::exported(
        format!("get{}{}", pascal_case(role), pascal_case(plan.messages)),
        vec![Param::new("row", TsType::reference(plan.root))],
        TsType::array(TsType::reference(plan.message)),
        vec![Stmt::return_stmt(Some(Expr::call(
            ident(&messages_by_role_name(plan)),
            vec![ident("row"), Expr::string(role)],
        )))],
    )
    .with_docs(format!("Messages with {} \"{role}\"", plan.role))
}

/// `row.input_metadata?.[key] ?? defaultValue`
fn metadata_accessor(plan: &Plan) -> Function {
    let lookup = Expr::index(
        Expr::member(ident("row"), plan.metadata),
        ident("key"),
        true,
    );
    Function::exported(
        format!("get{}", pascal_case(plan.metadata)),
        vec![
            Param::new("row", TsType::reference(plan.root)),
            Param::new("key", TsType::String),
            Param::optional("defaultValue", TsType::Any),
        ],
        TsType::Any,
        vec![Stmt::return_stmt(Some(Expr::binary(
            lookup,
            BinaryOp::Nullish,
            ident("defaultValue"),
        )))],
    )
    .with_docs(format!("Value under `key` in {}, or `defaultValue`", plan.metadata))
}

/// `{ ...fields, messages }`
fn constructor(plan: &Plan) -> Function {
    let rest = TsType::generic(
        "Partial",
        vec![TsType::generic(
            "Omit",
            vec![
                TsType::reference(plan.root),
                TsType::StringLiteral(plan.messages.to_string()),
            ],
        )],
    );
    let messages = if plan.messages == "messages" {
        ObjectMember::Shorthand("messages".into())
    } else {
        ObjectMember::Property(plan.messages.to_string(), ident("messages"))
    };

    Function::exported(
        format!("create{}", plan.root),
        vec![
            Param::new("messages", TsType::array(TsType::reference(plan.message))),
            Param::new("fields", rest).with_default(Expr::object(vec![])),
        ],
        TsType::reference(plan.root),
        vec![Stmt::return_stmt(Some(Expr::object(vec![
            ObjectMember::Spread(ident("fields")),
            messages,
        ])))],
    )
    .with_docs(format!("Build a {} from messages and optional fields", plan.root))
}

fn validator(plan: &Plan) -> Function {
    let obj = || ident("obj");
    let list = || Expr::member(obj(), plan.messages);

    let not_object = or(vec![
        Expr::binary(obj(), BinaryOp::Eq, Expr::null()),
        type_is(obj(), BinaryOp::Ne, "object"),
        is_array(obj()),
    ]);
    let reject = Stmt::return_stmt(Some(Expr::object(vec![
        ObjectMember::Property("valid".into(), Expr::bool(false)),
        ObjectMember::Property(
            "errors".into(),
            Expr::array(vec![Expr::string(errors::NOT_AN_OBJECT)]),
        ),
    ])));

    let (prefix, suffix) = errors::role_not_string_parts(plan.messages, plan.role);
    let bad_message = or(vec![
        Expr::binary(ident("msg"), BinaryOp::Eq, Expr::null()),
        type_is(ident("msg"), BinaryOp::Ne, "object"),
        type_is(Expr::member(ident("msg"), plan.role), BinaryOp::Ne, "string"),
    ]);
    let each = Expr::method(
        list(),
        "forEach",
        vec![Expr::arrow(
            vec![
                Param::new("msg", TsType::Any),
                Param::new("index", TsType::Number),
            ],
            vec![Stmt::if_stmt(
                bad_message.unwrap_or_else(|| Expr::bool(false)),
                push_error(
                    Expr::chain(
                        BinaryOp::Add,
                        vec![Expr::string(prefix), ident("index"), Expr::string(suffix)],
                    )
                    .unwrap_or_else(|| Expr::string("")),
                ),
                None,
            )],
        )],
    );

    let check_list = Stmt::if_stmt(
        Expr::not(is_array(list())),
        push_error(Expr::string(errors::not_an_array(plan.messages))),
        Some(Stmt::block(vec![
            Stmt::if_stmt(
                Expr::binary(Expr::member(list(), "length"), BinaryOp::Eq, Expr::number(0)),
                push_error(Expr::string(errors::empty(plan.messages))),
                None,
            ),
            Stmt::expr(each),
        ])),
    );

    Function::exported(
        format!("validate{}", plan.root),
        vec![Param::new("obj", TsType::Any)],
        TsType::reference(VALIDATION_RESULT),
        vec![
            Stmt::const_decl(
                "errors",
                Some(TsType::array(TsType::String)),
                Expr::array(vec![]),
            ),
            Stmt::if_stmt(
                not_object.unwrap_or_else(|| Expr::bool(false)),
                reject,
                None,
            ),
            check_list,
            Stmt::return_stmt(Some(Expr::object(vec![
                ObjectMember::Property(
                    "valid".into(),
                    Expr::binary(
                        Expr::member(ident("errors"), "length"),
                        BinaryOp::Eq,
                        Expr::number(0),
                    ),
                ),
                ObjectMember::Shorthand("errors".into()),
            ]))),
        ],
    )
    .with_docs(format!(
        "Validate {} structure, collecting every error",
        plan.root
    ))
}
