//! Syntax tree produced by the parser.

use std::fmt;

/// A parsed script: the mandatory header followed by top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub header: Header,
    pub statements: Vec<Statement>,
}

/// The `#! <locator> : <branch>` clause that drives the bootstrap sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub repo: String,
    pub branch: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        name: String,
        value: Expression,
        line: usize,
    },
    Command(CommandStmt),
    For {
        variable: String,
        range: Expression,
        body: Vec<Statement>,
        line: usize,
    },
    If {
        condition: Expression,
        then_block: Vec<Statement>,
        else_block: Option<Vec<Statement>>,
        line: usize,
    },
    Expr {
        expr: Expression,
        line: usize,
    },
}

impl Statement {
    /// Line on which the statement starts.
    pub fn line(&self) -> usize {
        match self {
            Statement::Let { line, .. }
            | Statement::For { line, .. }
            | Statement::If { line, .. }
            | Statement::Expr { line, .. } => *line,
            Statement::Command(cmd) => cmd.line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandStmt {
    pub name: String,
    pub options: Vec<CommandOption>,
    pub line: usize,
}

/// A `.name` or `.name(value)` modifier on a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    pub name: String,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    String(String),
    Number(f64),
    Bool(bool),
    Semver(Semver),
    Array(Vec<Expression>),
    Call {
        name: String,
        args: Vec<Expression>,
    },
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
}

impl BinOp {
    /// Binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::NotEq => 3,
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => 4,
            BinOp::Add | BinOp::Sub => 5,
            BinOp::Mul | BinOp::Div => 6,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A `[v]MAJOR.MINOR.PATCH[-PRE][+BUILD]` literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semver {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
    pub build: Option<String>,
}

impl fmt::Display for Semver {
    /// Canonical form, always with the leading `v`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_renders_canonical_form() {
        let v = Semver {
            major: 1,
            minor: 2,
            patch: 3,
            pre: None,
            build: None,
        };
        assert_eq!(v.to_string(), "v1.2.3");

        let v = Semver {
            major: 2,
            minor: 0,
            patch: 10,
            pre: Some("rc.1".to_string()),
            build: Some("build.5".to_string()),
        };
        assert_eq!(v.to_string(), "v2.0.10-rc.1+build.5");
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        assert!(BinOp::Mul.precedence() > BinOp::Add.precedence());
        assert!(BinOp::Add.precedence() > BinOp::Lt.precedence());
        assert!(BinOp::Lt.precedence() > BinOp::Eq.precedence());
        assert!(BinOp::Eq.precedence() > BinOp::And.precedence());
        assert!(BinOp::And.precedence() > BinOp::Or.precedence());
    }
}
