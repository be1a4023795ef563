//! TypeScript writer.
//!
//! Renders a [`Module`] as TypeScript source. Formatting is fixed: two-space
//! indent, double-quoted strings, one blank line between top-level items.

use crate::ir::*;

/// Emits IR as TypeScript source code.
pub struct TypeScriptWriter {
    output: String,
    indent: usize,
}

impl TypeScriptWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a module to TypeScript source.
    pub fn emit(module: &Module) -> String {
        let mut writer = Self::new();
        writer.write_module(module);
        writer.output
    }

    /// Render a single type expression.
    pub fn emit_type(ty: &TsType) -> String {
        let mut writer = Self::new();
        writer.write_type(ty);
        writer.output
    }

    /// Render a single expression.
    pub fn emit_expr(expr: &Expr) -> String {
        let mut writer = Self::new();
        writer.write_expr(expr);
        writer.output
    }

    fn write_module(&mut self, module: &Module) {
        for (i, item) in module.items.iter().enumerate() {
            if i > 0 {
                self.output.push('\n');
            }
            self.write_item(item);
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_block_docs(&mut self, docs: &str) {
        self.write_indent();
        self.output.push_str("/**\n");
        for line in docs.lines() {
            self.write_indent();
            if line.trim().is_empty() {
                self.output.push_str(" *\n");
            } else {
                self.output.push_str(" * ");
                self.output.push_str(line.trim_end());
                self.output.push('\n');
            }
        }
        self.write_indent();
        self.output.push_str(" */\n");
    }

    fn write_member_docs(&mut self, docs: &str) {
        if docs.lines().count() > 1 {
            self.write_block_docs(docs);
        } else {
            self.write_indent();
            self.output.push_str("/** ");
            self.output.push_str(docs.trim());
            self.output.push_str(" */\n");
        }
    }

    fn write_item(&mut self, item: &Item) {
        match item {
            Item::Comment(text) => self.write_block_docs(text),

            Item::ImportTypes { names, from } => {
                self.output.push_str("import type { ");
                self.output.push_str(&names.join(", "));
                self.output.push_str(" } from \"");
                self.output.push_str(&escape_string(from));
                self.output.push_str("\";\n");
            }

            Item::ExportTypes { names, from } => {
                self.output.push_str("export type { ");
                self.output.push_str(&names.join(", "));
                self.output.push_str(" } from \"");
                self.output.push_str(&escape_string(from));
                self.output.push_str("\";\n");
            }

            Item::Interface(interface) => self.write_interface(interface),

            Item::TypeAlias(alias) => {
                if let Some(docs) = &alias.docs {
                    self.write_block_docs(docs);
                }
                if alias.exported {
                    self.output.push_str("export ");
                }
                self.output.push_str("type ");
                self.output.push_str(&alias.name);
                self.output.push_str(" = ");
                self.write_type(&alias.ty);
                self.output.push_str(";\n");
            }

            Item::Function(f) => {
                if let Some(docs) = &f.docs {
                    self.write_block_docs(docs);
                }
                self.write_function(f);
                self.output.push('\n');
            }
        }
    }

    fn write_interface(&mut self, interface: &Interface) {
        if let Some(docs) = &interface.docs {
            self.write_block_docs(docs);
        }
        if interface.exported {
            self.output.push_str("export ");
        }
        self.output.push_str("interface ");
        self.output.push_str(&interface.name);
        if interface.properties.is_empty() {
            self.output.push_str(" {}\n");
            return;
        }
        self.output.push_str(" {\n");
        self.indent += 1;
        for property in &interface.properties {
            if let Some(docs) = &property.docs {
                self.write_member_docs(docs);
            }
            self.write_indent();
            self.write_key(&property.name);
            if property.optional {
                self.output.push('?');
            }
            self.output.push_str(": ");
            self.write_type(&property.ty);
            self.output.push_str(";\n");
        }
        self.indent -= 1;
        self.output.push_str("}\n");
    }

    fn write_key(&mut self, key: &str) {
        if is_valid_identifier(key) {
            self.output.push_str(key);
        } else {
            self.output.push('"');
            self.output.push_str(&escape_string(key));
            self.output.push('"');
        }
    }

    fn write_type(&mut self, ty: &TsType) {
        match ty {
            TsType::String => self.output.push_str("string"),
            TsType::Number => self.output.push_str("number"),
            TsType::Boolean => self.output.push_str("boolean"),
            TsType::Null => self.output.push_str("null"),
            TsType::Undefined => self.output.push_str("undefined"),
            TsType::Any => self.output.push_str("any"),
            TsType::Unknown => self.output.push_str("unknown"),
            TsType::Void => self.output.push_str("void"),
            TsType::StringLiteral(s) => {
                self.output.push('"');
                self.output.push_str(&escape_string(s));
                self.output.push('"');
            }
            TsType::Ref(name) => self.output.push_str(name),
            TsType::Array(item) => {
                let wrap = matches!(item.as_ref(), TsType::Union(_) | TsType::Predicate { .. });
                if wrap {
                    self.output.push('(');
                }
                self.write_type(item);
                if wrap {
                    self.output.push(')');
                }
                self.output.push_str("[]");
            }
            TsType::Generic { name, args } => {
                self.output.push_str(name);
                self.output.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_type(arg);
                }
                self.output.push('>');
            }
            TsType::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(" | ");
                    }
                    self.write_type(member);
                }
            }
            TsType::Predicate { param, ty } => {
                self.output.push_str(param);
                self.output.push_str(" is ");
                self.write_type(ty);
            }
        }
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        self.write_indent();
        match stmt {
            Stmt::Expr(expr) => {
                self.write_expr(expr);
                self.output.push(';');
            }

            Stmt::Let {
                name,
                ty,
                init,
                mutable,
            } => {
                self.output.push_str(if *mutable { "let " } else { "const " });
                self.output.push_str(name);
                if let Some(ty) = ty {
                    self.output.push_str(": ");
                    self.write_type(ty);
                }
                if let Some(init) = init {
                    self.output.push_str(" = ");
                    self.write_expr(init);
                }
                self.output.push(';');
            }

            Stmt::Block(_) => self.write_block_stmt(stmt),

            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.write_if(test, consequent, alternate.as_deref());
            }

            Stmt::Return(expr) => {
                self.output.push_str("return");
                if let Some(e) = expr {
                    self.output.push(' ');
                    self.write_expr(e);
                }
                self.output.push(';');
            }
        }
    }

    fn write_if(&mut self, test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>) {
        self.output.push_str("if (");
        self.write_expr(test);
        self.output.push_str(") ");
        self.write_block_stmt(consequent);
        if let Some(alt) = alternate {
            self.output.push_str(" else ");
            // else-if chains stay on the closing brace line
            if let Stmt::If {
                test,
                consequent,
                alternate,
            } = alt
            {
                self.write_if(test, consequent, alternate.as_deref());
            } else {
                self.write_block_stmt(alt);
            }
        }
    }

    fn write_block_stmt(&mut self, stmt: &Stmt) {
        self.output.push_str("{\n");
        self.indent += 1;
        match stmt {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.write_stmt(s);
                    self.output.push('\n');
                }
            }
            _ => {
                self.write_stmt(stmt);
                self.output.push('\n');
            }
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push('}');
    }

    fn write_params(&mut self, params: &[Param]) {
        self.output.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&param.name);
            // A default already makes the parameter optional
            if param.optional && param.default.is_none() {
                self.output.push('?');
            }
            if let Some(ty) = &param.ty {
                self.output.push_str(": ");
                self.write_type(ty);
            }
            if let Some(default) = &param.default {
                self.output.push_str(" = ");
                self.write_expr(default);
            }
        }
        self.output.push(')');
    }

    fn write_body(&mut self, body: &[Stmt]) {
        self.output.push_str("{\n");
        self.indent += 1;
        for stmt in body {
            self.write_stmt(stmt);
            self.output.push('\n');
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push('}');
    }

    fn write_function(&mut self, f: &Function) {
        if f.exported {
            self.output.push_str("export ");
        }
        self.output.push_str("function ");
        self.output.push_str(&f.name);
        self.write_params(&f.params);
        if let Some(returns) = &f.returns {
            self.output.push_str(": ");
            self.write_type(returns);
        }
        self.output.push(' ');
        self.write_body(&f.body);
    }

    fn write_arrow(&mut self, f: &Function) {
        self.write_params(&f.params);
        if let Some(returns) = &f.returns {
            self.output.push_str(": ");
            self.write_type(returns);
        }
        self.output.push_str(" => ");

        // Single return statement can be expression body
        if let [Stmt::Return(Some(expr))] = f.body.as_slice() {
            let wrap = matches!(expr, Expr::Object(_));
            if wrap {
                self.output.push('(');
            }
            self.write_expr(expr);
            if wrap {
                self.output.push(')');
            }
            return;
        }

        self.write_body(&f.body);
    }

    fn write_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.write_literal(lit),

            Expr::Ident(name) => self.output.push_str(name),

            Expr::Binary { left, op, right } => {
                self.write_operand(left, *op, false);
                self.output.push(' ');
                self.output.push_str(binary_op(*op));
                self.output.push(' ');
                self.write_operand(right, *op, true);
            }

            Expr::Unary { op, expr } => {
                self.output.push_str(unary_op(*op));
                self.write_wrapped(expr, matches!(**expr, Expr::Binary { .. } | Expr::Function(_)));
            }

            Expr::Call { callee, args } => {
                self.write_wrapped(callee, needs_postfix_parens(callee));
                self.output.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr(arg);
                }
                self.output.push(')');
            }

            Expr::Member {
                object,
                property,
                computed,
                optional,
            } => {
                self.write_wrapped(object, needs_postfix_parens(object));
                match property.as_ref() {
                    Expr::Literal(Literal::String(s)) if !*computed && is_valid_identifier(s) => {
                        self.output.push_str(if *optional { "?." } else { "." });
                        self.output.push_str(s);
                    }
                    _ => {
                        self.output.push_str(if *optional { "?.[" } else { "[" });
                        self.write_expr(property);
                        self.output.push(']');
                    }
                }
            }

            Expr::Array(items) => {
                self.output.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr(item);
                }
                self.output.push(']');
            }

            Expr::Object(members) => {
                if members.is_empty() {
                    self.output.push_str("{}");
                    return;
                }
                self.output.push_str("{ ");
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    match member {
                        ObjectMember::Property(key, value) => {
                            self.write_key(key);
                            self.output.push_str(": ");
                            self.write_expr(value);
                        }
                        ObjectMember::Shorthand(name) => self.output.push_str(name),
                        ObjectMember::Spread(expr) => {
                            self.output.push_str("...");
                            self.write_expr(expr);
                        }
                    }
                }
                self.output.push_str(" }");
            }

            Expr::Function(f) => {
                if f.name.is_empty() {
                    self.write_arrow(f);
                } else {
                    self.write_function(f);
                }
            }
        }
    }

    fn write_wrapped(&mut self, expr: &Expr, wrap: bool) {
        if wrap {
            self.output.push('(');
        }
        self.write_expr(expr);
        if wrap {
            self.output.push(')');
        }
    }

    fn write_operand(&mut self, expr: &Expr, parent: BinaryOp, right: bool) {
        let wrap = match expr {
            Expr::Binary { op, .. } => needs_parens(*op, parent, right),
            Expr::Function(_) => true,
            _ => false,
        };
        self.write_wrapped(expr, wrap);
    }

    fn write_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Null => self.output.push_str("null"),
            Literal::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Literal::Number(n) => {
                // Format number cleanly (no trailing .0 for integers)
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    self.output.push_str(&(*n as i64).to_string());
                } else {
                    self.output.push_str(&n.to_string());
                }
            }
            Literal::String(s) => {
                self.output.push('"');
                self.output.push_str(&escape_string(s));
                self.output.push('"');
            }
        }
    }
}

impl Default for TypeScriptWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Eq => "===",
        BinaryOp::Ne => "!==",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Nullish => "??",
    }
}

fn unary_op(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "!",
        UnaryOp::Neg => "-",
        UnaryOp::TypeOf => "typeof ",
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Nullish => 1,
        BinaryOp::Or => 2,
        BinaryOp::And => 3,
        BinaryOp::Eq | BinaryOp::Ne => 4,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 5,
        BinaryOp::Add => 6,
    }
}

fn needs_parens(child: BinaryOp, parent: BinaryOp, right: bool) -> bool {
    // `??` cannot be mixed with `&&`/`||` without parentheses
    let nullish = BinaryOp::Nullish;
    if (child == nullish) != (parent == nullish) {
        return true;
    }
    let (c, p) = (precedence(child), precedence(parent));
    c < p || (c == p && right)
}

fn needs_postfix_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary { .. } | Expr::Unary { .. } | Expr::Function(_) | Expr::Object(_)
    )
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_alphabetic() && first != '_' && first != '$' {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(stmt: Stmt) -> String {
        let f = Function::exported("f", vec![], TsType::Void, vec![stmt]);
        let ts = TypeScriptWriter::emit(&Module::new(vec![Item::Function(f)]));
        ts.lines()
            .skip(1)
            .take_while(|l| *l != "}")
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_simple_const() {
        let out = stmt(Stmt::const_decl("x", None, Expr::number(42)));
        assert_eq!(out, "const x = 42;");
    }

    #[test]
    fn test_typed_let() {
        let out = stmt(Stmt::let_decl(
            "errors",
            Some(TsType::array(TsType::String)),
            Some(Expr::array(vec![])),
        ));
        assert_eq!(out, "let errors: string[] = [];");
    }

    #[test]
    fn test_method_call() {
        let out = stmt(Stmt::expr(Expr::method(
            Expr::ident("console"),
            "log",
            vec![Expr::string("hello")],
        )));
        assert_eq!(out, "console.log(\"hello\");");
    }

    #[test]
    fn test_precedence_skips_redundant_parens() {
        let expr = Expr::binary(
            Expr::binary(Expr::ident("a"), BinaryOp::Eq, Expr::number(1)),
            BinaryOp::And,
            Expr::binary(Expr::ident("b"), BinaryOp::Or, Expr::ident("c")),
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "a === 1 && (b || c)");
    }

    #[test]
    fn test_nullish_is_always_parenthesized_among_logical_ops() {
        let expr = Expr::binary(
            Expr::binary(Expr::ident("a"), BinaryOp::Nullish, Expr::ident("b")),
            BinaryOp::Or,
            Expr::ident("c"),
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "(a ?? b) || c");
    }

    #[test]
    fn test_typeof_and_not() {
        let expr = Expr::not(Expr::binary(
            Expr::type_of(Expr::ident("x")),
            BinaryOp::Eq,
            Expr::string("string"),
        ));
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "!(typeof x === \"string\")");
    }

    #[test]
    fn test_optional_chaining() {
        let expr = Expr::index(
            Expr::optional_member(Expr::ident("row"), "input_metadata"),
            Expr::ident("key"),
            true,
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "row?.input_metadata?.[key]");
    }

    #[test]
    fn test_arrow_function() {
        let expr = Expr::arrow(
            vec![Param::new("msg", TsType::reference("Message"))],
            vec![Stmt::return_stmt(Some(Expr::binary(
                Expr::member(Expr::ident("msg"), "role"),
                BinaryOp::Eq,
                Expr::string("user"),
            )))],
        );
        assert_eq!(
            TypeScriptWriter::emit_expr(&expr),
            "(msg: Message) => msg.role === \"user\""
        );
    }

    #[test]
    fn test_arrow_returning_object_is_wrapped() {
        let expr = Expr::arrow(
            vec![],
            vec![Stmt::return_stmt(Some(Expr::object(vec![])))],
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "() => ({})");
    }

    #[test]
    fn test_object_literal() {
        let expr = Expr::object(vec![
            ObjectMember::Spread(Expr::ident("rest")),
            ObjectMember::Shorthand("messages".into()),
            ObjectMember::Property("tool-id".into(), Expr::number(1)),
        ]);
        assert_eq!(
            TypeScriptWriter::emit_expr(&expr),
            "{ ...rest, messages, \"tool-id\": 1 }"
        );
    }

    #[test]
    fn test_if_else() {
        let out = stmt(Stmt::if_stmt(
            Expr::ident("ok"),
            Stmt::return_stmt(Some(Expr::number(1))),
            Some(Stmt::block(vec![Stmt::return_stmt(Some(Expr::number(0)))])),
        ));
        assert_eq!(out, "if (ok) {\nreturn 1;\n} else {\nreturn 0;\n}");
    }

    #[test]
    fn test_types() {
        let ty = TsType::array(TsType::nullable(TsType::reference("Message")));
        assert_eq!(TypeScriptWriter::emit_type(&ty), "(Message | null)[]");

        let record = TsType::record(TsType::Any);
        assert_eq!(TypeScriptWriter::emit_type(&record), "Record<string, any>");

        let guard = TsType::predicate("obj", TsType::reference("EvaluationRow"));
        assert_eq!(TypeScriptWriter::emit_type(&guard), "obj is EvaluationRow");

        let literal = TsType::StringLiteral("function".into());
        assert_eq!(TypeScriptWriter::emit_type(&literal), "\"function\"");
    }

    #[test]
    fn test_interface() {
        let module = Module::new(vec![Item::Interface(
            Interface::new(
                "Message",
                vec![
                    Property::required("role", TsType::String).with_docs("Sender role"),
                    Property::optional("content", TsType::nullable(TsType::String)),
                ],
            )
            .with_docs("A chat message"),
        )]);
        let ts = TypeScriptWriter::emit(&module);
        assert_eq!(
            ts,
            "/**\n * A chat message\n */\nexport interface Message {\n  /** Sender role */\n  role: string;\n  content?: string | null;\n}\n"
        );
    }

    #[test]
    fn test_items_are_separated_by_blank_lines() {
        let module = Module::new(vec![
            Item::ImportTypes {
                names: vec!["A".into(), "B".into()],
                from: "./types.d".into(),
            },
            Item::TypeAlias(TypeAlias {
                name: "Id".into(),
                docs: None,
                exported: true,
                ty: TsType::String,
            }),
        ]);
        let ts = TypeScriptWriter::emit(&module);
        assert_eq!(
            ts,
            "import type { A, B } from \"./types.d\";\n\nexport type Id = string;\n"
        );
    }

    #[test]
    fn test_optional_param_with_default() {
        let f = Function::exported(
            "f",
            vec![
                Param::optional("fallback", TsType::Any),
                Param::new("rest", TsType::Any).with_default(Expr::object(vec![])),
            ],
            TsType::Void,
            vec![],
        );
        let ts = TypeScriptWriter::emit(&Module::new(vec![Item::Function(f)]));
        assert_eq!(
            ts,
            "export function f(fallback?: any, rest: any = {}): void {\n}\n"
        );
    }
}
