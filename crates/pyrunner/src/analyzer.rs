//! Static complexity heuristic
//!
//! Classifies a snippet by counting `for`/`while` statements and how deeply
//! they nest. This is a structural check, not an asymptotic analysis: it is
//! blind to recursion, logarithmic loops, comprehensions and loop bounds.

use rustpython_parser::{Parse, ast};
use tracing::{debug, instrument};

use crate::types::ComplexityVerdict;

/// Loop statistics gathered from a syntax tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopCensus {
    /// Number of `for` and `while` statements
    pub loops: usize,

    /// Sum over every loop of the loops strictly inside it
    pub nested: usize,
}

impl LoopCensus {
    /// Collect loop statistics for a parsed module body
    pub fn of_suite(suite: &[ast::Stmt]) -> Self {
        let mut census = Self::default();
        census.visit(suite, 0);
        census
    }

    fn visit(&mut self, stmts: &[ast::Stmt], enclosing: usize) {
        for stmt in stmts {
            match stmt {
                ast::Stmt::For(ast::StmtFor { body, orelse, .. })
                | ast::Stmt::While(ast::StmtWhile { body, orelse, .. }) => {
                    // A loop at depth d is "nested" once for each of its d ancestors
                    self.loops += 1;
                    self.nested += enclosing;
                    self.visit(body, enclosing + 1);
                    self.visit(orelse, enclosing + 1);
                }
                ast::Stmt::AsyncFor(ast::StmtAsyncFor { body, orelse, .. }) => {
                    self.visit(body, enclosing);
                    self.visit(orelse, enclosing);
                }
                ast::Stmt::If(ast::StmtIf { body, orelse, .. }) => {
                    self.visit(body, enclosing);
                    self.visit(orelse, enclosing);
                }
                ast::Stmt::FunctionDef(ast::StmtFunctionDef { body, .. })
                | ast::Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef { body, .. })
                | ast::Stmt::ClassDef(ast::StmtClassDef { body, .. })
                | ast::Stmt::With(ast::StmtWith { body, .. })
                | ast::Stmt::AsyncWith(ast::StmtAsyncWith { body, .. }) => {
                    self.visit(body, enclosing);
                }
                ast::Stmt::Match(ast::StmtMatch { cases, .. }) => {
                    for case in cases {
                        self.visit(&case.body, enclosing);
                    }
                }
                ast::Stmt::Try(ast::StmtTry {
                    body,
                    handlers,
                    orelse,
                    finalbody,
                    ..
                })
                | ast::Stmt::TryStar(ast::StmtTryStar {
                    body,
                    handlers,
                    orelse,
                    finalbody,
                    ..
                }) => {
                    self.visit(body, enclosing);
                    for handler in handlers {
                        let ast::ExceptHandler::ExceptHandler(handler) = handler;
                        self.visit(&handler.body, enclosing);
                    }
                    self.visit(orelse, enclosing);
                    self.visit(finalbody, enclosing);
                }
                _ => {}
            }
        }
    }

    /// Map the statistics onto a verdict
    pub fn verdict(&self) -> ComplexityVerdict {
        if self.nested > 0 {
            ComplexityVerdict::Quadratic
        } else if self.loops > 0 {
            ComplexityVerdict::Linear
        } else {
            ComplexityVerdict::Constant
        }
    }
}

/// Classify a snippet's time complexity
///
/// Never fails: source that does not parse yields [`ComplexityVerdict::Unknown`].
#[instrument(skip(code), fields(len = code.len()))]
pub fn classify(code: &str) -> ComplexityVerdict {
    match ast::Suite::parse(code, "<snippet>") {
        Ok(suite) => {
            let census = LoopCensus::of_suite(&suite);
            let verdict = census.verdict();
            debug!(loops = census.loops, nested = census.nested, ?verdict, "classified snippet");
            verdict
        }
        Err(e) => {
            debug!(error = %e, "snippet did not parse");
            ComplexityVerdict::Unknown
        }
    }
}
