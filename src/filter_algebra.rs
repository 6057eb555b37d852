//! Set-algebraic and numeric-support selection over clusters, including a
//! sandboxed boolean expression DSL (C10).

use std::collections::BTreeSet;

use crate::cluster::Cluster;
use crate::err::AppError;

/// A cluster's source set, derived once per cluster from the union of its
/// members' `source` fields.
fn source_set(cluster: &Cluster) -> BTreeSet<&str> {
    cluster.members.iter().map(|r| r.source.as_str()).collect()
}

/// Exactly one merge strategy is required per invocation; `--min-support`
/// and `--max-support` are the only pair that may combine.
#[derive(Debug, Clone)]
pub enum Strategy {
    Intersect,
    Union,
    /// One or more file identifiers; a cluster matches when its source set
    /// is the singleton `{q}` for any `q` among them (§4.10 "specific"
    /// predicate, OR'd across the given files).
    Specific(Vec<String>),
    SupportRange {
        min: Option<i64>,
        max: Option<i64>,
    },
    ExactSupport(i64),
    Expression(String),
}

/// Apply a strategy to a cluster set given the full ordered input-file list
/// (file basenames, used both as `Q` for intersect/union and as the
/// identifier universe for the expression DSL).
pub fn select_clusters<'a>(
    clusters: &'a [Cluster],
    all_files: &[String],
    strategy: &Strategy,
) -> Result<Vec<&'a Cluster>, AppError> {
    match strategy {
        Strategy::Intersect => {
            let q: BTreeSet<&str> = all_files.iter().map(String::as_str).collect();
            Ok(clusters
                .iter()
                .filter(|c| q.iter().all(|f| source_set(c).contains(f)))
                .collect())
        }
        Strategy::Union => {
            let q: BTreeSet<&str> = all_files.iter().map(String::as_str).collect();
            Ok(clusters
                .iter()
                .filter(|c| source_set(c).intersection(&q).next().is_some())
                .collect())
        }
        Strategy::Specific(files) => Ok(clusters
            .iter()
            .filter(|c| {
                let s = source_set(c);
                s.len() == 1 && files.iter().any(|f| s.contains(f.as_str()))
            })
            .collect()),
        Strategy::SupportRange { min, max } => Ok(clusters
            .iter()
            .filter(|c| {
                let n = source_set(c).len() as i64;
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            })
            .collect()),
        Strategy::ExactSupport(k) => Ok(clusters
            .iter()
            .filter(|c| source_set(c).len() as i64 == *k)
            .collect()),
        Strategy::Expression(expr) => {
            let ast = parse_expression(expr)?;
            Ok(clusters
                .iter()
                .filter(|c| {
                    let sources = source_set(c);
                    let env: BTreeSet<String> = sources.iter().map(|s| sanitize_identifier(s)).collect();
                    eval(&ast, &env)
                })
                .collect())
        }
    }
}

/// Non-word characters become `_`; a leading digit gets a `_` prefix, so the
/// result is always a valid bare identifier in the expression grammar.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[derive(Debug, Clone)]
enum Expr {
    Var(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

fn eval(expr: &Expr, env: &BTreeSet<String>) -> bool {
    match expr {
        Expr::Var(name) => env.contains(name),
        Expr::Not(inner) => !eval(inner, env),
        Expr::And(lhs, rhs) => eval(lhs, env) && eval(rhs, env),
        Expr::Or(lhs, rhs) => eval(lhs, env) || eval(rhs, env),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, AppError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push(Token::LParen);
        } else if c == ')' {
            chars.next();
            tokens.push(Token::RParen);
        } else if c.is_alphanumeric() || c == '_' {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(match word.as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                "NOT" => Token::Not,
                _ => Token::Ident(sanitize_identifier(&word)),
            });
        } else {
            return Err(AppError::Expression(format!("unexpected character {c:?}")));
        }
    }
    Ok(tokens)
}

/// Recursive-descent parser: precedence `NOT` > `AND` > `OR`, left-
/// associative, `(`/`)` for grouping. No operator reaches outside this
/// token stream — there is no eval, no environment or filesystem access.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn parse_or(&mut self) -> Result<Expr, AppError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, AppError> {
        let mut lhs = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, AppError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, AppError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(Expr::Var(name)),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(AppError::Expression("unbalanced parentheses".into())),
                }
            }
            other => Err(AppError::Expression(format!("unexpected token {other:?}"))),
        }
    }
}

fn parse_expression(input: &str) -> Result<Expr, AppError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(AppError::Expression("empty expression".into()));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(AppError::Expression("trailing tokens after expression".into()));
    }
    Ok(expr)
}
