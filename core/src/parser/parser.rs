use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::diagnostics::Context;
use crate::parser::error::{ParseError, ParseErrorKind, convert_pest_error};
use crate::parser::parsed_expr::{
    Annotation, Combiner, Decl, Expr, FoldBound, FuncDef, Literal, MatchCase, Param, ParsedExpr,
    ParsedScript, RawDirective, TypeExpr,
};
use crate::parser::syntax::{AnnotatedSource, BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};
use crate::syntax::bytes_literal::Encoding;
use crate::syntax::string_literal::unescape_string;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::infix(Rule::or_op, Assoc::Left))          // `||`
        .op(Op::infix(Rule::and_op, Assoc::Left))         // `&&`
        .op(
            Op::infix(Rule::eq_op, Assoc::Left) |
            Op::infix(Rule::neq_op, Assoc::Left)
        )                                                 // `==`, `!=`
        .op(
            Op::infix(Rule::lt_op, Assoc::Left) |
            Op::infix(Rule::le_op, Assoc::Left) |
            Op::infix(Rule::gt_op, Assoc::Left) |
            Op::infix(Rule::ge_op, Assoc::Left)
        )                                                 // `<`, `<=`, `>`, `>=`
        .op(
            Op::infix(Rule::concat_op, Assoc::Left) |
            Op::infix(Rule::append_op, Assoc::Left)
        )                                                 // `++`, `:+`
        .op(
            Op::infix(Rule::add_op, Assoc::Left) |
            Op::infix(Rule::sub_op, Assoc::Left)
        )                                                 // `+`, `-`
        .op(
            Op::infix(Rule::mul_op, Assoc::Left) |
            Op::infix(Rule::div_op, Assoc::Left) |
            Op::infix(Rule::rem_op, Assoc::Left)
        )                                                 // `*`, `/`, `%`
        .op(Op::prefix(Rule::neg_op) | Op::prefix(Rule::not_op)) // `-`, `!`

        // Postfix operators.
        .op(Op::postfix(Rule::field_op) | Op::postfix(Rule::index_op)) // `.`, `[]`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/script.pest"]
pub struct ScriptParser;

/// Parse only the directive prefix of `source`.
///
/// Directives are validated before the rest of the script is looked at, so a
/// script with bad directives reports them even if its body does not parse.
pub fn parse_header(source: &str) -> Result<Vec<RawDirective<'_>>, ParseError> {
    let pairs =
        ScriptParser::parse(Rule::header, source).map_err(|e| convert_pest_error(e, source))?;
    Ok(pairs
        .flat_map(|header| header.into_inner())
        .filter(|pair| pair.as_rule() == Rule::directive)
        .map(parse_directive)
        .collect())
}

/// Nesting depth accepted by [`parse`] and [`parse_expression`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Parse a complete script.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<ParsedScript<'a>, ParseError> {
    parse_with_max_depth(arena, source, DEFAULT_MAX_DEPTH)
}

/// Parse a complete script, rejecting sources nested deeper than `max_depth`.
pub fn parse_with_max_depth<'a>(
    arena: &'a Bump,
    source: &'a str,
    max_depth: usize,
) -> Result<ParsedScript<'a>, ParseError> {
    check_nesting(source, max_depth)?;
    let mut pairs =
        ScriptParser::parse(Rule::script, source).map_err(|e| convert_pest_error(e, source))?;
    let script = pairs.next().ok_or_else(|| missing(source, Span(0..0), "script"))?;

    let ctx = ParseContext::new(arena, source);
    let mut directives = Vec::new();
    let mut decls = Vec::new();
    let mut body = None;

    for pair in script.into_inner() {
        match pair.as_rule() {
            Rule::directive => directives.push(parse_directive(pair)),
            Rule::let_decl | Rule::func_decl | Rule::annotated_func => {
                decls.push(ctx.parse_decl(pair)?)
            }
            Rule::expression => body = Some(ctx.parse_expr(pair)?),
            Rule::EOI => {}
            rule => return Err(ctx.unexpected(rule, pair.as_span().into())),
        }
    }

    Ok(ParsedScript {
        source,
        directives,
        decls: arena.alloc_slice_fill_iter(decls),
        body,
        ann: ctx.ann,
    })
}

/// Parse a bare expression (no directives, no top-level declarations).
pub fn parse_expression<'a>(arena: &'a Bump, source: &'a str) -> Result<ParsedExpr<'a>, ParseError> {
    parse_expression_with_max_depth(arena, source, DEFAULT_MAX_DEPTH)
}

pub fn parse_expression_with_max_depth<'a>(
    arena: &'a Bump,
    source: &'a str,
    max_depth: usize,
) -> Result<ParsedExpr<'a>, ParseError> {
    check_nesting(source, max_depth)?;
    let mut pairs = ScriptParser::parse(Rule::expression_main, source)
        .map_err(|e| convert_pest_error(e, source))?;
    let main = pairs.next().ok_or_else(|| missing(source, Span(0..0), "expression"))?;
    let span: Span = main.as_span().into();
    let expr_pair = main
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::expression)
        .ok_or_else(|| missing(source, span, "expression"))?;

    let ctx = ParseContext::new(arena, source);
    let expr = ctx.parse_expr(expr_pair)?;
    Ok(ParsedExpr { expr, ann: ctx.ann })
}

/// Measure nesting on the raw text.
///
/// The grammar and every later phase recurse once per level, so the limit is
/// enforced before pest sees the source. Brackets open a level. Each `if`
/// opens one that lasts until its bracket closes or the expression ends at a
/// `,`, `;`, `case` or declaration, so an `else if` chain nests like the tree
/// it builds. A run of prefix operators counts one level per operator.
/// String, byte and comment text is skipped.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    // Open `if`s at the current bracket level, and at each enclosing one.
    let mut ifs = 0usize;
    let mut enclosing_ifs = Vec::new();
    let mut prefix_run = 0usize;
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let c = bytes[pos];
        pos += 1;
        let mut level = depth;
        let mut ends_expression = false;
        match c {
            b'{' if bytes[start..].starts_with(b"{-#") => {
                pos = find_from(bytes, start, b"#-}").map_or(bytes.len(), |end| end + 3);
                prefix_run = 0;
                continue;
            }
            b'#' => {
                pos = find_from(bytes, start, b"\n").unwrap_or(bytes.len());
                continue;
            }
            b'"' => {
                while pos < bytes.len() && bytes[pos] != b'"' {
                    pos += if bytes[pos] == b'\\' { 2 } else { 1 };
                }
                pos += 1;
            }
            b'\'' => {
                pos = find_from(bytes, pos, b"'").map_or(bytes.len(), |end| end + 1);
            }
            b'(' | b'[' | b'{' => {
                enclosing_ifs.push(ifs);
                ifs = 0;
                depth += 1;
                level = depth;
            }
            b')' | b']' | b'}' => {
                depth = depth.saturating_sub(ifs + 1);
                ifs = enclosing_ifs.pop().unwrap_or(0);
            }
            b',' | b';' | b'@' => ends_expression = true,
            b'!' if bytes.get(pos) != Some(&b'=') => {
                prefix_run += 1;
                level = depth + prefix_run;
            }
            b'-' => {
                prefix_run += 1;
                level = depth + prefix_run;
            }
            c if c.is_ascii_whitespace() => continue,
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while bytes.get(pos).is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_') {
                    pos += 1;
                }
                match &bytes[start..pos] {
                    b"if" => {
                        ifs += 1;
                        depth += 1;
                        level = depth;
                    }
                    b"let" | b"func" | b"case" => ends_expression = true,
                    _ => {}
                }
            }
            _ => {}
        }
        if ends_expression {
            depth = depth.saturating_sub(ifs);
            ifs = 0;
        }
        if !matches!(c, b'!' | b'-') {
            prefix_run = 0;
        }
        if level > max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    depth: level,
                    max_depth,
                },
                source,
                Span(start..pos.min(bytes.len())),
            ));
        }
    }
    Ok(())
}

fn find_from(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn parse_directive(pair: Pair<'_, Rule>) -> RawDirective<'_> {
    let span = pair.as_span().into();
    let mut name = "";
    let mut value = "";
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::directive_name => name = inner.as_str(),
            Rule::directive_value => value = inner.as_str(),
            _ => {}
        }
    }
    RawDirective { name, value, span }
}

fn missing(source: &str, span: Span, what: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::Other {
            message: format!("missing {}", what),
        },
        source,
        span,
    )
}

/// Keyword tokens carry no information once the grammar has matched them.
fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_let
            | Rule::kw_func
            | Rule::kw_if
            | Rule::kw_then
            | Rule::kw_else
            | Rule::kw_match
            | Rule::kw_case
            | Rule::kw_fold
    )
}

/// Children of `pair` without keyword tokens.
fn children<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

struct ParseContext<'a> {
    arena: &'a Bump,
    source: &'a str,
    ann: AnnotatedSource<'a>,
}

impl<'a> ParseContext<'a> {
    fn new(arena: &'a Bump, source: &'a str) -> Self {
        Self {
            arena,
            source,
            ann: AnnotatedSource::new(source),
        }
    }

    fn alloc(&self, expr: Expr<'a>, span: Span) -> &'a Expr<'a> {
        let expr = self.arena.alloc(expr);
        self.ann.add_span(expr, span);
        expr
    }

    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, self.source, span)
    }

    fn unexpected(&self, rule: Rule, span: Span) -> ParseError {
        self.error(
            ParseErrorKind::Other {
                message: format!("Unhandled rule: {:?}", rule),
            },
            span,
        )
    }

    fn next_pair<'i>(
        &self,
        pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
        span: &Span,
        what: &str,
    ) -> Result<Pair<'i, Rule>, ParseError> {
        pairs
            .next()
            .ok_or_else(|| missing(self.source, span.clone(), what))
    }

    fn parse_decl(&self, pair: Pair<'a, Rule>) -> Result<Decl<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        match pair.as_rule() {
            Rule::let_decl => {
                let mut inner = children(pair);
                let name = self.next_pair(&mut inner, &span, "binding name")?.as_str();
                let value = self.parse_expr(self.next_pair(&mut inner, &span, "binding value")?)?;
                Ok(Decl::Let { name, value, span })
            }
            Rule::func_decl => Ok(Decl::Func(self.parse_func(pair)?)),
            Rule::annotated_func => {
                let mut inner = pair.into_inner();
                let annotation_pair = self.next_pair(&mut inner, &span, "annotation")?;
                let annotation = self.parse_annotation(annotation_pair)?;
                let func = self.parse_func(self.next_pair(&mut inner, &span, "function")?)?;
                Ok(Decl::Annotated { annotation, func })
            }
            rule => Err(self.unexpected(rule, span)),
        }
    }

    fn parse_annotation(&self, pair: Pair<'a, Rule>) -> Result<Annotation<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = pair.into_inner();
        let name = self.next_pair(&mut inner, &span, "annotation name")?.as_str();
        let binding = self
            .next_pair(&mut inner, &span, "annotation binding")?
            .as_str();
        Ok(Annotation {
            name,
            binding,
            span,
        })
    }

    fn parse_func(&self, pair: Pair<'a, Rule>) -> Result<&'a FuncDef<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let mut name = "";
        let mut params: &'a [Param<'a>] = &[];
        let mut body = None;
        for inner in children(pair) {
            match inner.as_rule() {
                Rule::ident => name = inner.as_str(),
                Rule::params => params = self.parse_params(inner)?,
                Rule::expression => body = Some(self.parse_expr(inner)?),
                rule => return Err(self.unexpected(rule, inner.as_span().into())),
            }
        }
        let body = body.ok_or_else(|| missing(self.source, span.clone(), "function body"))?;
        Ok(self.arena.alloc(FuncDef {
            name,
            params,
            body,
            span,
        }))
    }

    fn parse_params(&self, pair: Pair<'a, Rule>) -> Result<&'a [Param<'a>], ParseError> {
        let params = pair
            .into_inner()
            .map(|param| {
                let span: Span = param.as_span().into();
                let mut inner = param.into_inner();
                let name = self.next_pair(&mut inner, &span, "parameter name")?.as_str();
                let ty = self.parse_type_expr(self.next_pair(&mut inner, &span, "parameter type")?)?;
                Ok(Param { name, ty, span })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(self.arena.alloc_slice_fill_iter(params))
    }

    fn parse_type_expr(&self, pair: Pair<'a, Rule>) -> Result<TypeExpr<'a>, ParseError> {
        match pair.as_rule() {
            Rule::type_expr => {
                let mut members = pair
                    .into_inner()
                    .map(|p| self.parse_type_expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                if members.len() == 1 {
                    Ok(members.remove(0))
                } else {
                    Ok(TypeExpr::Union(self.arena.alloc_slice_fill_iter(members)))
                }
            }
            Rule::list_type => {
                let span: Span = pair.as_span().into();
                let mut inner = pair.into_inner();
                let elem = self.parse_type_expr(self.next_pair(&mut inner, &span, "element type")?)?;
                Ok(TypeExpr::List(self.arena.alloc(elem)))
            }
            Rule::type_name => Ok(TypeExpr::Named(pair.as_str())),
            rule => Err(self.unexpected(rule, pair.as_span().into())),
        }
    }

    fn parse_expr(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        match pair.as_rule() {
            Rule::expression => self.parse_operators(pair.into_inner()),

            Rule::grouped => {
                let mut inner = pair.into_inner();
                self.parse_expr(self.next_pair(&mut inner, &span, "expression")?)
            }

            Rule::integer => {
                let text = pair.as_str();
                let value = text.parse::<i64>().map_err(|_| {
                    self.error(
                        ParseErrorKind::InvalidNumber {
                            text: text.to_string(),
                        },
                        span.clone(),
                    )
                })?;
                Ok(self.alloc(Expr::Literal(Literal::Int(value)), span))
            }

            Rule::boolean => {
                let value = pair.as_str() == "true";
                Ok(self.alloc(Expr::Literal(Literal::Bool(value)), span))
            }

            Rule::unit_lit => Ok(self.alloc(Expr::Literal(Literal::Unit), span)),

            Rule::string => {
                let body = pair
                    .into_inner()
                    .next()
                    .map(|inner| inner.as_str())
                    .unwrap_or("");
                let value = unescape_string(self.arena, body).map_err(|e| {
                    self.error(
                        ParseErrorKind::InvalidLiteral {
                            message: e.to_string(),
                        },
                        span.clone(),
                    )
                })?;
                Ok(self.alloc(Expr::Literal(Literal::Str(value)), span))
            }

            Rule::bytes => {
                let mut inner = pair.into_inner();
                let prefix = self.next_pair(&mut inner, &span, "encoding")?.as_str();
                let body = inner.next().map(|p| p.as_str()).unwrap_or("");
                let encoding = Encoding::from_prefix(prefix).ok_or_else(|| {
                    self.error(
                        ParseErrorKind::InvalidLiteral {
                            message: format!("unknown byte encoding '{}'", prefix),
                        },
                        span.clone(),
                    )
                })?;
                let bytes = encoding.decode(body).map_err(|e| {
                    self.error(
                        ParseErrorKind::InvalidLiteral {
                            message: e.to_string(),
                        },
                        span.clone(),
                    )
                })?;
                let bytes = self.arena.alloc_slice_copy(&bytes);
                Ok(self.alloc(Expr::Literal(Literal::Bytes(bytes)), span))
            }

            Rule::ident => Ok(self.alloc(Expr::Ident(pair.as_str()), span)),

            Rule::list => {
                let items = pair
                    .into_inner()
                    .map(|p| self.parse_expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let items = self.arena.alloc_slice_copy(&items);
                Ok(self.alloc(Expr::List(items), span))
            }

            Rule::call => {
                let mut inner = pair.into_inner();
                let name = self.next_pair(&mut inner, &span, "function name")?.as_str();
                let args = inner
                    .map(|p| self.parse_expr(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let args = self.arena.alloc_slice_copy(&args);
                Ok(self.alloc(Expr::Call { name, args }, span))
            }

            Rule::if_expr => {
                let mut inner = children(pair);
                let cond = self.parse_expr(self.next_pair(&mut inner, &span, "condition")?)?;
                let then_branch =
                    self.parse_expr(self.next_pair(&mut inner, &span, "then branch")?)?;
                let else_branch =
                    self.parse_expr(self.next_pair(&mut inner, &span, "else branch")?)?;
                Ok(self.alloc(
                    Expr::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                    span,
                ))
            }

            Rule::match_expr => {
                let mut inner = children(pair);
                let scrutinee =
                    self.parse_expr(self.next_pair(&mut inner, &span, "match scrutinee")?)?;
                let cases = inner
                    .map(|case| self.parse_case(case))
                    .collect::<Result<Vec<_>, _>>()?;
                let cases = self.arena.alloc_slice_fill_iter(cases);
                Ok(self.alloc(Expr::Match { scrutinee, cases }, span))
            }

            Rule::block => self.parse_block(pair),

            Rule::fold => self.parse_fold(pair),

            rule => Err(self.unexpected(rule, span)),
        }
    }

    fn parse_operators(&self, pairs: Pairs<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        PRATT_PARSER
            .map_primary(|primary| self.parse_expr(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let op_span: Span = op.as_span().into();
                let span = Span::combine(&op_span, &self.span_of(rhs, &op_span));
                let op = match op.as_rule() {
                    Rule::neg_op => UnaryOp::Neg,
                    Rule::not_op => UnaryOp::Not,
                    rule => return Err(self.unexpected(rule, op_span)),
                };
                Ok(self.alloc(Expr::Unary { op, expr: rhs }, span))
            })
            .map_infix(|lhs, op, rhs| {
                let (left, right) = (lhs?, rhs?);
                let op_span: Span = op.as_span().into();
                let span = Span::combine(&self.span_of(left, &op_span), &self.span_of(right, &op_span));
                let expr = match op.as_rule() {
                    Rule::or_op => Expr::Boolean { op: BoolOp::Or, left, right },
                    Rule::and_op => Expr::Boolean { op: BoolOp::And, left, right },
                    Rule::eq_op => comparison(ComparisonOp::Eq, left, right),
                    Rule::neq_op => comparison(ComparisonOp::Neq, left, right),
                    Rule::lt_op => comparison(ComparisonOp::Lt, left, right),
                    Rule::le_op => comparison(ComparisonOp::Le, left, right),
                    Rule::gt_op => comparison(ComparisonOp::Gt, left, right),
                    Rule::ge_op => comparison(ComparisonOp::Ge, left, right),
                    Rule::concat_op => binary(BinaryOp::Concat, left, right),
                    Rule::append_op => binary(BinaryOp::Append, left, right),
                    Rule::add_op => binary(BinaryOp::Add, left, right),
                    Rule::sub_op => binary(BinaryOp::Sub, left, right),
                    Rule::mul_op => binary(BinaryOp::Mul, left, right),
                    Rule::div_op => binary(BinaryOp::Div, left, right),
                    Rule::rem_op => binary(BinaryOp::Rem, left, right),
                    rule => return Err(self.unexpected(rule, op_span)),
                };
                Ok(self.alloc(expr, span))
            })
            .map_postfix(|lhs, op| {
                let value = lhs?;
                let op_span: Span = op.as_span().into();
                let span = Span::combine(&self.span_of(value, &op_span), &op_span);
                match op.as_rule() {
                    Rule::field_op => {
                        let mut inner = op.into_inner();
                        let field = self.next_pair(&mut inner, &op_span, "field name")?.as_str();
                        Ok(self.alloc(Expr::Field { value, field }, span))
                    }
                    Rule::index_op => {
                        let mut inner = op.into_inner();
                        let index = self.parse_expr(self.next_pair(&mut inner, &op_span, "index")?)?;
                        Ok(self.alloc(Expr::Index { value, index }, span))
                    }
                    rule => Err(self.unexpected(rule, op_span)),
                }
            })
            .parse(pairs)
    }

    fn span_of(&self, expr: &Expr<'a>, fallback: &Span) -> Span {
        self.ann.span_of(expr).unwrap_or_else(|| fallback.clone())
    }

    fn parse_case(&self, pair: Pair<'a, Rule>) -> Result<MatchCase<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let mut inner = children(pair);
        let pattern = self.next_pair(&mut inner, &span, "case pattern")?;
        let body = self.parse_expr(self.next_pair(&mut inner, &span, "case body")?)?;

        let mut binding = None;
        let mut types: &'a [TypeExpr<'a>] = &[];
        for part in pattern.into_inner() {
            match part.as_rule() {
                Rule::wildcard => {}
                Rule::ident => binding = Some(part.as_str()),
                Rule::type_expr => {
                    types = match self.parse_type_expr(part)? {
                        TypeExpr::Union(members) => members,
                        single => core::slice::from_ref(self.arena.alloc(single)),
                    }
                }
                rule => return Err(self.unexpected(rule, part.as_span().into())),
            }
        }

        Ok(MatchCase {
            binding,
            types,
            body,
            span,
        })
    }

    /// `{ decl* expr }` becomes nested `Let`/`Function` nodes around `expr`.
    fn parse_block(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let mut decls = Vec::new();
        let mut result = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::let_decl | Rule::func_decl => decls.push(self.parse_decl(inner)?),
                Rule::expression => result = Some(self.parse_expr(inner)?),
                rule => return Err(self.unexpected(rule, inner.as_span().into())),
            }
        }
        let mut body = result.ok_or_else(|| missing(self.source, span.clone(), "block result"))?;

        for decl in decls.into_iter().rev() {
            let decl_span = Span::new(decl.span().0.start, span.0.end);
            body = match decl {
                Decl::Let { name, value, .. } => {
                    self.alloc(Expr::Let { name, value, body }, decl_span)
                }
                Decl::Func(def) => self.alloc(Expr::Function { def, body }, decl_span),
                Decl::Annotated { annotation, .. } => {
                    return Err(self.error(
                        ParseErrorKind::Other {
                            message: "annotated functions are only allowed at the top level"
                                .to_string(),
                        },
                        annotation.span,
                    ));
                }
            };
        }
        Ok(body)
    }

    fn parse_fold(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        let mut bound = FoldBound::Missing;
        let mut operands = Vec::with_capacity(2);
        let mut combiner = None;

        for inner in children(pair) {
            match inner.as_rule() {
                Rule::fold_bound => {
                    let bound_span: Span = inner.as_span().into();
                    let mut parts = inner.into_inner();
                    let value = self.next_pair(&mut parts, &bound_span, "fold bound")?;
                    bound = match value.as_rule() {
                        Rule::integer => {
                            let text = value.as_str();
                            FoldBound::Literal(text.parse::<i64>().map_err(|_| {
                                self.error(
                                    ParseErrorKind::InvalidNumber {
                                        text: text.to_string(),
                                    },
                                    bound_span.clone(),
                                )
                                .with_context(Context::WhileParsing {
                                    what: "FOLD bound".to_string(),
                                    span: span.clone(),
                                })
                            })?)
                        }
                        _ => FoldBound::Named(value.as_str()),
                    };
                }
                Rule::expression => operands.push(self.parse_expr(inner)?),
                Rule::lambda => {
                    let lambda_span: Span = inner.as_span().into();
                    let mut parts = inner.into_inner();
                    let acc = self.next_pair(&mut parts, &lambda_span, "accumulator")?.as_str();
                    let elem = self.next_pair(&mut parts, &lambda_span, "element")?.as_str();
                    let body = self.parse_expr(self.next_pair(&mut parts, &lambda_span, "body")?)?;
                    combiner = Some(Combiner::Lambda { acc, elem, body });
                }
                Rule::ident => combiner = Some(Combiner::Named(inner.as_str())),
                rule => return Err(self.unexpected(rule, inner.as_span().into())),
            }
        }

        let &[collection, init] = operands.as_slice() else {
            return Err(missing(self.source, span, "fold operands"));
        };
        let combiner = combiner.ok_or_else(|| missing(self.source, span.clone(), "combiner"))?;
        Ok(self.alloc(
            Expr::Fold {
                bound,
                collection,
                init,
                combiner,
            },
            span,
        ))
    }
}

fn binary<'a>(op: BinaryOp, left: &'a Expr<'a>, right: &'a Expr<'a>) -> Expr<'a> {
    Expr::Binary { op, left, right }
}

fn comparison<'a>(op: ComparisonOp, left: &'a Expr<'a>, right: &'a Expr<'a>) -> Expr<'a> {
    Expr::Comparison { op, left, right }
}
