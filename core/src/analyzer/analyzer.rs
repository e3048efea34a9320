use bumpalo::Bump;
use tracing::{debug, trace};

use crate::{
    analyzer::error::{TypeError, TypeErrorKind},
    analyzer::typed_expr::{
        Callee, Case, EntryPoint, Expr, ExprInner, FoldBound, FoldCombiner, FunctionDef,
        TypedDecl, TypedScript,
    },
    diagnostics::Context,
    directives::{ContentType, DirectiveSet, ScriptType},
    parser::{
        self, AnnotatedSource, BinaryOp, BoolOp, ComparisonOp, ParsedExpr, ParsedScript, Span,
        UnaryOp,
    },
    scope_stack::{BindError, CompleteScope, ScopeStack},
    stdlib::{self, Builtin, SignatureError},
    types::{Type, TypeConversionError, TypeManager, is_assignable, type_expr_to_type},
    values::Value,
};

/// Rounds of widening tried for the accumulator of a `FOLD` lambda.
const MAX_ACCUMULATOR_WIDENING: usize = 4;

/// Type-check a complete script against its validated directives.
pub fn analyze<'a>(
    type_manager: &'a TypeManager<'a>,
    script: ParsedScript<'a>,
    directives: DirectiveSet,
) -> Result<TypedScript<'a>, TypeError> {
    debug!(
        version = directives.stdlib_version,
        content = %directives.content_type,
        decls = script.decls.len(),
        "Type checking script"
    );
    let mut analyzer = Analyzer::new(type_manager, script.ann, directives);
    analyzer.push_globals();
    analyzer.scopes.push_open();

    let mut decls = Vec::new();
    let mut callables: Vec<EntryPoint<'a>> = Vec::new();
    let mut verifier: Option<EntryPoint<'a>> = None;
    let mut seen_annotated = false;

    for decl in script.decls {
        match decl {
            parser::Decl::Let { .. } | parser::Decl::Func(_) if seen_annotated => {
                return Err(analyzer.error(TypeErrorKind::AnnotationOrderViolation, decl.span()));
            }
            parser::Decl::Let { name, value, span } => {
                let value = analyzer.analyze(value)?;
                analyzer.declare(*name, Binding::Value(value.0), span.clone())?;
                trace!(name = *name, ty = %value.0, "Global");
                decls.push(TypedDecl::Let { name: *name, value });
            }
            parser::Decl::Func(func) => {
                let def = analyzer.analyze_function(func, None)?;
                analyzer.declare(func.name, Binding::Function(def), func.span.clone())?;
                trace!(name = func.name, ret = %def.ret, "Function");
                decls.push(TypedDecl::Function(def));
            }
            parser::Decl::Annotated { annotation, func } => {
                seen_annotated = true;
                let entry = analyzer.analyze_entry_point(annotation, func, verifier.is_some())?;
                if annotation.name == "Verifier" {
                    verifier = Some(entry);
                } else {
                    if callables.iter().any(|c| c.def.name == func.name)
                        || analyzer.scopes.lookup(func.name).is_some()
                    {
                        return Err(analyzer.error(
                            TypeErrorKind::DuplicateBinding {
                                name: func.name.to_string(),
                            },
                            func.span.clone(),
                        ));
                    }
                    callables.push(entry);
                }
            }
        }
    }

    let body = match (directives.content_type, script.body) {
        (ContentType::Expression, Some(body)) => {
            let typed = analyzer.analyze(body)?;
            analyzer.expect_result(typed.0, analyzer.tm.bool(), analyzer.span_of(body))?;
            Some(typed)
        }
        (ContentType::Expression, None) => {
            let end = analyzer.ann.source.len();
            return Err(analyzer.error(TypeErrorKind::MissingResultExpression, Span::new(end, end)));
        }
        (ContentType::DApp, Some(body)) => {
            return Err(analyzer.error(TypeErrorKind::UnexpectedExpression, analyzer.span_of(body)));
        }
        (ContentType::DApp, None) => None,
    };

    debug!(
        callables = callables.len(),
        verifier = verifier.is_some(),
        "Type checking done"
    );
    let arena = analyzer.arena;
    Ok(TypedScript {
        directives,
        decls: arena.alloc_slice_fill_iter(decls),
        body,
        callables: arena.alloc_slice_fill_iter(callables),
        verifier,
        ann: analyzer.ann,
    })
}

/// Type-check a bare expression. No result type is imposed.
pub fn analyze_expression<'a>(
    type_manager: &'a TypeManager<'a>,
    expr: ParsedExpr<'a>,
    directives: DirectiveSet,
) -> Result<TypedScript<'a>, TypeError> {
    let mut analyzer = Analyzer::new(type_manager, expr.ann, directives);
    analyzer.push_globals();
    let body = analyzer.analyze(expr.expr)?;
    debug!(ty = %body.0, "Type checked expression");
    Ok(TypedScript {
        directives,
        decls: &[],
        body: Some(body),
        callables: &[],
        verifier: None,
        ann: analyzer.ann,
    })
}

/// What a name refers to.
#[derive(Debug, Clone, Copy)]
enum Binding<'a> {
    Value(&'a Type<'a>),
    Function(&'a FunctionDef<'a>),
    Builtin(&'static Builtin),
}

#[derive(Debug, Clone)]
struct Entry<'a> {
    binding: Binding<'a>,
    /// Where the name was declared. `None` for globals and builtins.
    span: Option<Span>,
}

struct Analyzer<'a> {
    tm: &'a TypeManager<'a>,
    arena: &'a Bump,
    directives: DirectiveSet,
    ann: AnnotatedSource<'a>,
    scopes: ScopeStack<'a, Entry<'a>>,
}

impl<'a> Analyzer<'a> {
    fn new(tm: &'a TypeManager<'a>, ann: AnnotatedSource<'a>, directives: DirectiveSet) -> Self {
        Self {
            tm,
            arena: tm.arena(),
            directives,
            ann,
            scopes: ScopeStack::new(),
        }
    }

    /// Globals and the builtins of the script's library version.
    fn push_globals(&mut self) {
        let tm = self.tm;
        let std = tm.std();
        let value = |ty: &'a Type<'a>| Entry {
            binding: Binding::Value(ty),
            span: None,
        };
        let this = match self.directives.script_type {
            ScriptType::Account => std.address,
            ScriptType::Asset => std.asset_info,
        };

        let mut bindings = vec![("height", value(self.tm.int())), ("this", value(this))];
        if self.directives.content_type == ContentType::Expression {
            bindings.push(("tx", value(std.transaction)));
        }
        bindings.extend(
            stdlib::available(self.directives.stdlib_version).map(|b| {
                (
                    b.name,
                    Entry {
                        binding: Binding::Builtin(b),
                        span: None,
                    },
                )
            }),
        );

        let scope = CompleteScope::from_unsorted(self.arena, bindings)
            .unwrap_or_else(|e| unreachable!("builtin table: {}", e));
        self.scopes.push(scope);
    }

    fn alloc(&self, ty: &'a Type<'a>, inner: ExprInner<'a>, span: Span) -> &'a Expr<'a> {
        let expr = self.arena.alloc(Expr(ty, inner));
        self.ann.add_span(expr, span);
        expr
    }

    fn span_of(&self, expr: &parser::Expr<'a>) -> Span {
        self.ann.span_of(expr).unwrap_or_default()
    }

    fn error(&self, kind: TypeErrorKind, span: Span) -> TypeError {
        TypeError::new(kind, self.ann.source, span)
    }

    fn mismatch(&self, expected: impl ToString, found: impl ToString, span: Span) -> TypeError {
        self.error(
            TypeErrorKind::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
            span,
        )
    }

    fn expect(&self, ty: &'a Type<'a>, expected: &'a Type<'a>, span: Span) -> Result<(), TypeError> {
        if is_assignable(ty, expected) {
            Ok(())
        } else {
            Err(self.mismatch(expected, ty, span))
        }
    }

    fn expect_result(
        &self,
        ty: &'a Type<'a>,
        expected: &'a Type<'a>,
        span: Span,
    ) -> Result<(), TypeError> {
        if is_assignable(ty, expected) {
            return Ok(());
        }
        Err(self.error(
            TypeErrorKind::ResultTypeViolation {
                expected: expected.to_string(),
                found: ty.to_string(),
            },
            span,
        ))
    }

    fn resolve_type(&self, ty: &parser::TypeExpr<'a>, span: Span) -> Result<&'a Type<'a>, TypeError> {
        type_expr_to_type(self.tm, ty).map_err(|e| match e {
            TypeConversionError::UnknownType { name } => {
                self.error(TypeErrorKind::UnknownType { name }, span)
            }
        })
    }

    /// Bind `name` in the innermost scope. Rebinding a visible name is an
    /// error, whichever scope holds it.
    fn declare(&mut self, name: &'a str, binding: Binding<'a>, span: Span) -> Result<(), TypeError> {
        let entry = Entry {
            binding,
            span: Some(span.clone()),
        };
        match self.scopes.declare(name, entry) {
            Ok(()) => Ok(()),
            Err(BindError::AlreadyBound(_)) => {
                let mut err = self.error(
                    TypeErrorKind::DuplicateBinding {
                        name: name.to_string(),
                    },
                    span,
                );
                if let Some(previous) = self.scopes.lookup(name).and_then(|e| e.span.clone()) {
                    err = err.with_context(Context::DefinedHere {
                        what: format!("'{}'", name),
                        span: previous,
                    });
                }
                Err(err)
            }
            Err(e) => unreachable!("declaring '{}': {}", name, e),
        }
    }

    /// Run `f` inside a fresh open scope.
    fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.scopes.push_open();
        let result = f(self);
        let popped = self.scopes.pop();
        debug_assert!(popped.is_ok());
        result
    }

    fn analyze_function(
        &mut self,
        func: &'a parser::FuncDef<'a>,
        implicit: Option<(&'a str, &'a Type<'a>, Span)>,
    ) -> Result<&'a FunctionDef<'a>, TypeError> {
        self.scoped(|this| {
            if let Some((name, ty, span)) = implicit {
                this.declare(name, Binding::Value(ty), span)?;
            }
            let mut params = Vec::with_capacity(func.params.len());
            for param in func.params {
                let ty = this.resolve_type(&param.ty, param.span.clone())?;
                this.declare(param.name, Binding::Value(ty), param.span.clone())?;
                params.push((param.name, ty));
            }
            let body = this.analyze(func.body)?;
            Ok(&*this.arena.alloc(FunctionDef {
                name: func.name,
                params: this.arena.alloc_slice_copy(&params),
                body,
                ret: body.0,
            }))
        })
    }

    fn analyze_entry_point(
        &mut self,
        annotation: &parser::Annotation<'a>,
        func: &'a parser::FuncDef<'a>,
        has_verifier: bool,
    ) -> Result<EntryPoint<'a>, TypeError> {
        let invalid = |message: String| {
            self.error(
                TypeErrorKind::InvalidAnnotation { message },
                annotation.span.clone(),
            )
        };
        if self.directives.content_type != ContentType::DApp {
            return Err(invalid(format!(
                "@{} is only allowed in DApp scripts",
                annotation.name
            )));
        }

        let tm = self.tm;
        let std = tm.std();
        let (implicit, expected) = match annotation.name {
            "Callable" => (std.invocation, None),
            "Verifier" => {
                if has_verifier {
                    return Err(self.error(TypeErrorKind::DuplicateVerifier, annotation.span.clone()));
                }
                if !func.params.is_empty() {
                    return Err(invalid(format!(
                        "verifier '{}' cannot take parameters",
                        func.name
                    )));
                }
                (std.transaction, Some(self.tm.bool()))
            }
            other => return Err(invalid(format!("unknown annotation @{}", other))),
        };

        let def = self.analyze_function(
            func,
            Some((annotation.binding, implicit, annotation.span.clone())),
        )?;
        let result_span = self.span_of(func.body);
        match expected {
            Some(ty) => self.expect_result(def.ret, ty, result_span)?,
            None => {
                for ((name, ty), param) in def.params.iter().zip(func.params) {
                    if !is_callable_param(ty) {
                        return Err(self.error(
                            TypeErrorKind::InvalidAnnotation {
                                message: format!(
                                    "callable parameter '{}' cannot have type {}",
                                    name, ty
                                ),
                            },
                            param.span.clone(),
                        ));
                    }
                }
                if !std.is_action_result(def.ret) {
                    return Err(self.error(
                        TypeErrorKind::ResultTypeViolation {
                            expected: "WriteSet|TransferSet|ScriptResult".to_string(),
                            found: def.ret.to_string(),
                        },
                        result_span,
                    ));
                }
            }
        }
        trace!(name = func.name, annotation = annotation.name, "Entry point");
        Ok(EntryPoint {
            binding: annotation.binding,
            def,
        })
    }

    fn analyze(&mut self, expr: &'a parser::Expr<'a>) -> Result<&'a Expr<'a>, TypeError> {
        let span = self.span_of(expr);
        match expr {
            parser::Expr::Literal(literal) => Ok(self.analyze_literal(literal, span)),
            parser::Expr::Ident(name) => self.analyze_ident(name, span),
            parser::Expr::Call { name, args } => self.analyze_call(name, args, span),
            parser::Expr::Binary { op, left, right } => {
                self.analyze_binary(*op, left, right, span)
            }
            parser::Expr::Boolean { op, left, right } => {
                self.analyze_boolean(*op, left, right, span)
            }
            parser::Expr::Comparison { op, left, right } => {
                self.analyze_comparison(*op, left, right, span)
            }
            parser::Expr::Unary { op, expr } => self.analyze_unary(*op, expr, span),
            parser::Expr::Field { value, field } => self.analyze_field(value, field, span),
            parser::Expr::Index { value, index } => self.analyze_index(value, index, span),
            parser::Expr::List(items) => self.analyze_list(items, span),
            parser::Expr::If {
                cond,
                then_branch,
                else_branch,
            } => self.analyze_if(cond, then_branch, else_branch, span),
            parser::Expr::Match { scrutinee, cases } => {
                self.analyze_match(scrutinee, cases, span)
            }
            parser::Expr::Let { name, value, body } => {
                let value = self.analyze(value)?;
                let decl_span = Span::new(span.0.start, self.span_of_typed(value).0.end);
                let body = self.scoped(|this| {
                    this.declare(name, Binding::Value(value.0), decl_span)?;
                    this.analyze(body)
                })?;
                Ok(self.alloc(body.0, ExprInner::Let { name, value, body }, span))
            }
            parser::Expr::Function { def, body } => {
                let typed_def = self.analyze_function(def, None)?;
                let body = self.scoped(|this| {
                    this.declare(def.name, Binding::Function(typed_def), def.span.clone())?;
                    this.analyze(body)
                })?;
                Ok(self.alloc(
                    body.0,
                    ExprInner::Function {
                        def: typed_def,
                        body,
                    },
                    span,
                ))
            }
            parser::Expr::Fold {
                bound,
                collection,
                init,
                combiner,
            } => self.analyze_fold(*bound, collection, init, *combiner, span),
        }
    }

    fn span_of_typed(&self, expr: &Expr<'a>) -> Span {
        self.ann.span_of(expr).unwrap_or_default()
    }

    fn analyze_literal(&self, literal: &parser::Literal<'a>, span: Span) -> &'a Expr<'a> {
        let (ty, value) = match *literal {
            parser::Literal::Int(i) => (self.tm.int(), Value::Int(i)),
            parser::Literal::Bool(b) => (self.tm.bool(), Value::Bool(b)),
            parser::Literal::Str(s) => (self.tm.str(), Value::Str(s)),
            parser::Literal::Bytes(b) => (self.tm.bytes(), Value::Bytes(b)),
            parser::Literal::Unit => (self.tm.unit(), Value::Unit),
        };
        self.alloc(ty, ExprInner::Constant(value), span)
    }

    fn analyze_ident(&self, name: &'a str, span: Span) -> Result<&'a Expr<'a>, TypeError> {
        match self.scopes.lookup(name).map(|e| e.binding) {
            Some(Binding::Value(ty)) => Ok(self.alloc(ty, ExprInner::Ident(name), span)),
            Some(Binding::Function(_) | Binding::Builtin(_)) => {
                Err(self.mismatch("a value", format!("function '{}'", name), span))
            }
            None => Err(self.error(
                TypeErrorKind::UnboundVariable {
                    name: name.to_string(),
                },
                span,
            )),
        }
    }

    fn analyze_call(
        &mut self,
        name: &'a str,
        args: &'a [&'a parser::Expr<'a>],
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let entry = self.scopes.lookup(name).cloned().ok_or_else(|| {
            self.error(
                TypeErrorKind::UnboundVariable {
                    name: name.to_string(),
                },
                span.clone(),
            )
        })?;
        let typed_args = args
            .iter()
            .map(|arg| self.analyze(arg))
            .collect::<Result<Vec<_>, _>>()?;
        let arg_types: Vec<&'a Type<'a>> = typed_args.iter().map(|arg| arg.0).collect();
        let in_call = Context::InFunctionCall {
            name: name.to_string(),
            span: span.clone(),
        };

        let (callee, ty) = match entry.binding {
            Binding::Value(ty) => {
                return Err(self.mismatch("a function", ty, span));
            }
            Binding::Builtin(builtin) => {
                let ty = (builtin.typer)(self.tm, &arg_types).map_err(|e| match e {
                    SignatureError::ArgCount { expected, found } => self.error(
                        TypeErrorKind::ArgumentCountMismatch {
                            name: name.to_string(),
                            expected,
                            found,
                        },
                        span.clone(),
                    ),
                    SignatureError::Arg {
                        index,
                        expected,
                        found,
                    } => self
                        .mismatch(expected, found, self.span_of(args[index]))
                        .with_context(in_call.clone()),
                })?;
                (Callee::Builtin(builtin), ty)
            }
            Binding::Function(def) => {
                if def.params.len() != args.len() {
                    return Err(self.error(
                        TypeErrorKind::ArgumentCountMismatch {
                            name: name.to_string(),
                            expected: def.params.len().to_string(),
                            found: args.len(),
                        },
                        span,
                    ));
                }
                for ((arg, ty), (param, param_ty)) in args.iter().zip(&arg_types).zip(def.params) {
                    if !is_assignable(ty, param_ty) {
                        let mut err = self
                            .mismatch(param_ty, ty, self.span_of(arg))
                            .with_context(in_call.clone());
                        if let Some(defined) = entry.span.clone() {
                            err = err.with_context(Context::DefinedHere {
                                what: format!("parameter '{}'", param),
                                span: defined,
                            });
                        }
                        return Err(err);
                    }
                }
                (Callee::User(def), def.ret)
            }
        };

        Ok(self.alloc(
            ty,
            ExprInner::Call {
                callee,
                args: self.arena.alloc_slice_copy(&typed_args),
            },
            span,
        ))
    }

    fn analyze_binary(
        &mut self,
        op: BinaryOp,
        left: &'a parser::Expr<'a>,
        right: &'a parser::Expr<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let (left_span, right_span) = (self.span_of(left), self.span_of(right));
        let left = self.analyze(left)?;
        let right = self.analyze(right)?;
        let tm = self.tm;

        let ty = match op {
            BinaryOp::Add if *left.0 == Type::Str || *right.0 == Type::Str => {
                self.expect(left.0, tm.str(), left_span)?;
                self.expect(right.0, tm.str(), right_span)?;
                tm.str()
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                self.expect(left.0, tm.int(), left_span)?;
                self.expect(right.0, tm.int(), right_span)?;
                tm.int()
            }
            BinaryOp::Concat => self.concat_type(left.0, right.0).ok_or_else(|| {
                self.mismatch(
                    "two Strings, ByteVectors or Lists",
                    format!("{} ++ {}", left.0, right.0),
                    span.clone(),
                )
            })?,
            BinaryOp::Append => match left.0 {
                Type::List(elem) => tm.list(tm.join(*elem, right.0)),
                Type::Nothing => tm.list(right.0),
                other => return Err(self.mismatch("a List", other, left_span)),
            },
        };

        Ok(self.alloc(ty, ExprInner::Binary { op, left, right }, span))
    }

    fn concat_type(&self, left: &'a Type<'a>, right: &'a Type<'a>) -> Option<&'a Type<'a>> {
        let concatenable = |ty: &Type<'_>| {
            matches!(ty, Type::Str | Type::Bytes | Type::List(_) | Type::Nothing)
        };
        match (left, right) {
            (Type::Str, Type::Str) | (Type::Bytes, Type::Bytes) => Some(left),
            (Type::List(a), Type::List(b)) => Some(self.tm.list(self.tm.join(a, b))),
            (Type::Nothing, other) | (other, Type::Nothing) if concatenable(other) => Some(other),
            _ => None,
        }
    }

    fn analyze_boolean(
        &mut self,
        op: BoolOp,
        left: &'a parser::Expr<'a>,
        right: &'a parser::Expr<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let (left_span, right_span) = (self.span_of(left), self.span_of(right));
        let left = self.analyze(left)?;
        let right = self.analyze(right)?;
        self.expect(left.0, self.tm.bool(), left_span)?;
        self.expect(right.0, self.tm.bool(), right_span)?;
        Ok(self.alloc(self.tm.bool(), ExprInner::Boolean { op, left, right }, span))
    }

    fn analyze_comparison(
        &mut self,
        op: ComparisonOp,
        left: &'a parser::Expr<'a>,
        right: &'a parser::Expr<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let (left_span, right_span) = (self.span_of(left), self.span_of(right));
        let left = self.analyze(left)?;
        let right = self.analyze(right)?;

        match op {
            ComparisonOp::Eq | ComparisonOp::Neq => {
                if !is_assignable(left.0, right.0) && !is_assignable(right.0, left.0) {
                    return Err(self.mismatch(left.0, right.0, right_span));
                }
            }
            ComparisonOp::Lt | ComparisonOp::Le | ComparisonOp::Gt | ComparisonOp::Ge => {
                self.expect(left.0, self.tm.int(), left_span)?;
                self.expect(right.0, self.tm.int(), right_span)?;
            }
        }
        Ok(self.alloc(
            self.tm.bool(),
            ExprInner::Comparison { op, left, right },
            span,
        ))
    }

    fn analyze_unary(
        &mut self,
        op: UnaryOp,
        expr: &'a parser::Expr<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let operand_span = self.span_of(expr);
        let expr = self.analyze(expr)?;
        let ty = match op {
            UnaryOp::Neg => self.tm.int(),
            UnaryOp::Not => self.tm.bool(),
        };
        self.expect(expr.0, ty, operand_span)?;
        Ok(self.alloc(ty, ExprInner::Unary { op, expr }, span))
    }

    /// On a union, the field must exist on every member; the result is the
    /// union of the field types.
    fn analyze_field(
        &mut self,
        value: &'a parser::Expr<'a>,
        field: &'a str,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let value = self.analyze(value)?;
        let mut field_types = Vec::new();
        for member in value.0.members() {
            match member.as_struct().and_then(|s| s.field(field)) {
                Some(ty) => field_types.push(ty),
                None => {
                    let mut err = self.mismatch(
                        format!("a struct with field '{}'", field),
                        member,
                        span.clone(),
                    );
                    if value.0.is_union() {
                        err = err.with_context(Context::InExpression {
                            kind: format!("field access on {}", value.0),
                            span: self.span_of_typed(value),
                        });
                    }
                    return Err(err);
                }
            }
        }
        let ty = self.tm.union(&field_types);
        Ok(self.alloc(ty, ExprInner::Field { value, field }, span))
    }

    fn analyze_index(
        &mut self,
        value: &'a parser::Expr<'a>,
        index: &'a parser::Expr<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let (value_span, index_span) = (self.span_of(value), self.span_of(index));
        let value = self.analyze(value)?;
        let index = self.analyze(index)?;
        let ty = match value.0 {
            Type::List(elem) => *elem,
            Type::Nothing => self.tm.nothing(),
            other => return Err(self.mismatch("a List", other, value_span)),
        };
        self.expect(index.0, self.tm.int(), index_span)?;
        Ok(self.alloc(ty, ExprInner::Index { value, index }, span))
    }

    fn analyze_list(
        &mut self,
        items: &'a [&'a parser::Expr<'a>],
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let items = items
            .iter()
            .map(|item| self.analyze(item))
            .collect::<Result<Vec<_>, _>>()?;
        let elem_types: Vec<&'a Type<'a>> = items.iter().map(|item| item.0).collect();
        let ty = self.tm.list(self.tm.union(&elem_types));
        Ok(self.alloc(
            ty,
            ExprInner::List(self.arena.alloc_slice_copy(&items)),
            span,
        ))
    }

    fn analyze_if(
        &mut self,
        cond: &'a parser::Expr<'a>,
        then_branch: &'a parser::Expr<'a>,
        else_branch: &'a parser::Expr<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let cond_span = self.span_of(cond);
        let cond = self.analyze(cond)?;
        self.expect(cond.0, self.tm.bool(), cond_span)?;
        let then_branch = self.analyze(then_branch)?;
        let else_branch = self.analyze(else_branch)?;
        let ty = self.tm.join(then_branch.0, else_branch.0);
        Ok(self.alloc(
            ty,
            ExprInner::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn analyze_match(
        &mut self,
        scrutinee: &'a parser::Expr<'a>,
        cases: &'a [parser::MatchCase<'a>],
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let scrutinee = self.analyze(scrutinee)?;
        let scrutinee_ty = scrutinee.0;
        let in_match = Context::InExpression {
            kind: format!("match on {}", scrutinee_ty),
            span: self.span_of_typed(scrutinee),
        };

        let mut covered: Vec<&'a Type<'a>> = Vec::new();
        let mut has_catch_all = false;
        let mut typed_cases = Vec::with_capacity(cases.len());
        let mut result = self.tm.nothing();

        for case in cases {
            let (types, binding_ty): (&'a [&'a Type<'a>], _) = if case.is_catch_all() {
                has_catch_all = true;
                (&[], self.uncovered(scrutinee_ty, &covered))
            } else {
                let mut types = Vec::with_capacity(case.types.len());
                for ty in case.types {
                    let ty = self.resolve_type(ty, case.span.clone())?;
                    if !is_assignable(ty, scrutinee_ty) {
                        return Err(self
                            .mismatch(format!("a member of {}", scrutinee_ty), ty, case.span.clone())
                            .with_context(in_match.clone()));
                    }
                    types.push(ty);
                }
                covered.extend(&types);
                let narrowed = self.tm.union(&types);
                (&*self.arena.alloc_slice_copy(&types), narrowed)
            };

            let body = match case.binding {
                Some(binding) => self.scoped(|this| {
                    this.declare(binding, Binding::Value(binding_ty), case.span.clone())?;
                    this.analyze(case.body)
                })?,
                None => self.analyze(case.body)?,
            };
            result = self.tm.join(result, body.0);
            typed_cases.push(Case {
                types,
                binding: case.binding,
                body,
            });
        }

        if !has_catch_all {
            let missing = self.uncovered(scrutinee_ty, &covered);
            if *missing != Type::Nothing {
                return Err(self.error(
                    TypeErrorKind::NonExhaustiveMatch {
                        missing: missing.members().iter().map(|m| m.to_string()).collect(),
                    },
                    span,
                ));
            }
        }

        Ok(self.alloc(
            result,
            ExprInner::Match {
                scrutinee,
                cases: self.arena.alloc_slice_fill_iter(typed_cases),
            },
            span,
        ))
    }

    /// Members of `ty` not covered by any of the `covered` pattern types.
    fn uncovered(&self, ty: &'a Type<'a>, covered: &[&'a Type<'a>]) -> &'a Type<'a> {
        let covered = self.tm.union(covered);
        let remaining: Vec<&'a Type<'a>> = ty
            .members()
            .into_iter()
            .filter(|member| !is_assignable(member, covered))
            .collect();
        self.tm.union(&remaining)
    }

    fn analyze_fold(
        &mut self,
        bound: parser::FoldBound<'a>,
        collection: &'a parser::Expr<'a>,
        init: &'a parser::Expr<'a>,
        combiner: parser::Combiner<'a>,
        span: Span,
    ) -> Result<&'a Expr<'a>, TypeError> {
        let (collection_span, init_span) = (self.span_of(collection), self.span_of(init));
        let collection = self.analyze(collection)?;
        let elem = match collection.0 {
            Type::List(elem) => *elem,
            Type::Nothing => self.tm.nothing(),
            other => return Err(self.mismatch("a List", other, collection_span)),
        };
        let init = self.analyze(init)?;
        let in_fold = Context::InExpression {
            kind: "FOLD".to_string(),
            span: span.clone(),
        };

        let (combiner, ty) = match combiner {
            parser::Combiner::Named(name) => {
                let def = match self.scopes.lookup(name).map(|e| e.binding) {
                    Some(Binding::Function(def)) => def,
                    Some(_) => {
                        return Err(self
                            .mismatch("a function of two arguments", format!("'{}'", name), span)
                            .with_context(in_fold));
                    }
                    None => {
                        return Err(self.error(
                            TypeErrorKind::UnboundVariable {
                                name: name.to_string(),
                            },
                            span,
                        ));
                    }
                };
                let &[(_, acc), (_, item)] = def.params else {
                    return Err(self.error(
                        TypeErrorKind::ArgumentCountMismatch {
                            name: name.to_string(),
                            expected: "2".to_string(),
                            found: def.params.len(),
                        },
                        span,
                    ));
                };
                self.expect(init.0, acc, init_span)
                    .map_err(|e| e.with_context(in_fold.clone()))?;
                self.expect(elem, item, collection_span)
                    .map_err(|e| e.with_context(in_fold.clone()))?;
                self.expect(def.ret, acc, span.clone())
                    .map_err(|e| e.with_context(in_fold.clone()))?;
                (FoldCombiner::Named(def), def.ret)
            }
            parser::Combiner::Lambda {
                acc,
                elem: item,
                body,
            } => {
                let def = self.analyze_fold_lambda(acc, item, body, init.0, elem, &span)?;
                (FoldCombiner::Lambda(def), def.params[0].1)
            }
        };

        let bound = match bound {
            parser::FoldBound::Literal(n) => FoldBound::Constant(n),
            parser::FoldBound::Named(_) | parser::FoldBound::Missing => FoldBound::Unresolved,
        };
        Ok(self.alloc(
            ty,
            ExprInner::Fold {
                bound,
                collection,
                init,
                combiner,
            },
            span,
        ))
    }

    /// Parameter types of a lambda combiner are inferred: the accumulator
    /// starts at the type of `init` and widens until the body's type fits.
    fn analyze_fold_lambda(
        &mut self,
        acc: &'a str,
        item: &'a str,
        body: &'a parser::Expr<'a>,
        init_ty: &'a Type<'a>,
        elem_ty: &'a Type<'a>,
        span: &Span,
    ) -> Result<&'a FunctionDef<'a>, TypeError> {
        let mut acc_ty = init_ty;
        for _ in 0..MAX_ACCUMULATOR_WIDENING {
            let typed_body = self.scoped(|this| {
                this.declare(acc, Binding::Value(acc_ty), span.clone())?;
                this.declare(item, Binding::Value(elem_ty), span.clone())?;
                this.analyze(body)
            })?;
            if is_assignable(typed_body.0, acc_ty) {
                return Ok(self.arena.alloc(FunctionDef {
                    name: "lambda",
                    params: self.arena.alloc_slice_copy(&[(acc, acc_ty), (item, elem_ty)]),
                    body: typed_body,
                    ret: typed_body.0,
                }));
            }
            acc_ty = self.tm.join(acc_ty, typed_body.0);
        }
        Err(self
            .mismatch(init_ty, acc_ty, self.span_of(body))
            .with_context(Context::ExpectedBecause {
                reason: "the accumulator keeps the type of the initial value".to_string(),
                span: span.clone(),
            }))
    }
}

/// Types a callable parameter may have.
fn is_callable_param(ty: &Type<'_>) -> bool {
    let primitive = |ty: &Type<'_>| matches!(ty, Type::Int | Type::Str | Type::Bool | Type::Bytes);
    match ty {
        Type::List(elem) => match elem {
            Type::Union(members) => members.iter().all(|m| primitive(m)),
            other => primitive(other),
        },
        other => primitive(other),
    }
}
