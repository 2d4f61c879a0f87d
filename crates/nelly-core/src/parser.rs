//! Builds a [`Program`] from the token stream.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Deepest nesting of blocks and sub-expressions the parser accepts.
const MAX_NESTING: usize = 200;

/// Parses a complete script into a [`Program`].
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    parser.parse_program()
}

fn binary_op(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::NotEq => BinOp::NotEq,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::LtEq => BinOp::LtEq,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::GtEq => BinOp::GtEq,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::AndAnd => BinOp::And,
        TokenKind::OrOr => BinOp::Or,
        _ => return None,
    };
    Some(op)
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
        .trim()
}

/// The subset of git's refname rules a header branch must satisfy.
fn is_branch_name(name: &str) -> bool {
    !name.starts_with('-')
        && !name.ends_with('/')
        && !name.ends_with('.')
        && !name.ends_with(".lock")
        && !name.contains("..")
        && !name.contains("//")
        && !name.contains("@{")
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            line: token.pos.line,
            column: token.pos.column,
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        self.error_at(token, format!("expected {}, found {}", expected, token.kind))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error_at(self.peek(), "nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let header = self.parse_header()?;
        let mut statements = Vec::new();
        while !self.at(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { header, statements })
    }

    fn parse_header(&mut self) -> Result<Header, ParseError> {
        let token = self.peek().clone();
        let TokenKind::Header(body) = &token.kind else {
            return Err(self.unexpected("header '#! <repository> : <branch>'"));
        };
        self.advance();

        // Branch names cannot contain ':', so the last one separates the two.
        let (repo, branch) = body
            .rsplit_once(':')
            .map(|(repo, branch)| (unquote(repo), unquote(branch)))
            .ok_or_else(|| self.error_at(&token, "header must be '#! <repository> : <branch>'"))?;
        if repo.is_empty() {
            return Err(self.error_at(&token, "header is missing the repository"));
        }
        // A split inside `scheme://` leaves no real branch behind.
        if branch.is_empty() || branch.starts_with('/') {
            return Err(self.error_at(&token, "header is missing the branch"));
        }
        if !is_branch_name(branch) {
            return Err(self.error_at(&token, format!("invalid branch name '{}' in header", branch)));
        }
        Ok(Header {
            repo: repo.to_string(),
            branch: branch.to_string(),
            line: token.pos.line,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let stmt = match &self.peek().kind {
            TokenKind::Let => self.parse_let()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::Header(_) => {
                return Err(self.error_at(self.peek(), "header must be the first line of the script"));
            }
            TokenKind::Ident(_) if self.peek_kind_at(1) == Some(&TokenKind::Assign) => {
                return Err(self.error_at(self.peek(), "assignment requires 'let'"));
            }
            TokenKind::Ident(_) if self.is_command_start() => {
                Statement::Command(self.parse_command()?)
            }
            _ => {
                let line = self.peek().pos.line;
                let expr = self.parse_expression()?;
                Statement::Expr { expr, line }
            }
        };
        while self.at(&TokenKind::Semicolon) {
            self.advance();
        }
        Ok(stmt)
    }

    /// An identifier starts a command unless it is called or used as the
    /// left operand of a binary operator.
    fn is_command_start(&self) -> bool {
        match self.peek_kind_at(1) {
            Some(TokenKind::LParen) => false,
            Some(kind) => binary_op(kind).is_none(),
            None => true,
        }
    }

    fn parse_let(&mut self) -> Result<Statement, ParseError> {
        let line = self.expect(TokenKind::Let)?.pos.line;
        let name = self.expect_ident("variable name after 'let'")?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        Ok(Statement::Let { name, value, line })
    }

    fn parse_command(&mut self) -> Result<CommandStmt, ParseError> {
        let line = self.peek().pos.line;
        let name = self.expect_ident("command name")?;
        let mut options = Vec::new();
        while self.at(&TokenKind::Dot) {
            self.advance();
            let option = self.expect_ident("option name after '.'")?;
            let value = if self.at(&TokenKind::LParen) {
                self.advance();
                let value = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Some(value)
            } else {
                None
            };
            options.push(CommandOption { name: option, value });
        }
        Ok(CommandStmt { name, options, line })
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let line = self.expect(TokenKind::For)?.pos.line;
        let variable = self.expect_ident("loop variable after 'for'")?;
        self.expect(TokenKind::In)?;
        let range = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Statement::For { variable, range, body, line })
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let line = self.expect(TokenKind::If)?.pos.line;
        let condition = self.parse_expression()?;
        let then_block = self.parse_block()?;
        let else_block = if self.at(&TokenKind::Else) {
            self.advance();
            if self.at(&TokenKind::If) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Statement::If { condition, then_block, else_block, line })
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        self.enter()?;
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.at(&TokenKind::Eof) {
                return Err(self.unexpected("'}' to close block"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.leave();
        Ok(stmts)
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.enter()?;
        let expr = self.parse_binary(1)?;
        self.leave();
        Ok(expr)
    }

    /// Precedence climbing; every operator is left-associative.
    ///
    /// Each operator deepens the tree by one, so the left spine counts
    /// against the same limit as parentheses and blocks.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, ParseError> {
        let mut left = self.parse_primary()?;
        let mut spine = 0;
        while let Some(op) = binary_op(&self.peek().kind) {
            if op.precedence() < min_precedence {
                break;
            }
            self.depth += 1;
            spine += 1;
            if self.depth > MAX_NESTING {
                return Err(self.error_at(self.peek(), "expression too deep"));
            }
            self.advance();
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth -= spine;
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                if self.at(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_list(TokenKind::RParen)?;
                    Ok(Expression::Call { name, args })
                } else {
                    Ok(Expression::Identifier(name))
                }
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expression::String(s))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expression::Number(n))
            }
            TokenKind::Semver(v) => {
                self.advance();
                Ok(Expression::Semver(v))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expression::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expression::Bool(false))
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_list(TokenKind::RBracket)?;
                Ok(Expression::Array(items))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Comma separated expressions up to `close`; a trailing comma is allowed.
    fn parse_list(&mut self, close: TokenKind) -> Result<Vec<Expression>, ParseError> {
        let mut items = Vec::new();
        while !self.at(&close) {
            items.push(self.parse_expression()?);
            if self.at(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }
}
