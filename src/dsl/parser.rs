//! Parser for the network description language.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{PhysarumError, Result};

/// Parser for network descriptions.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire network description.
    pub fn parse(&mut self) -> Result<NetworkAst> {
        let mut ast = NetworkAst::new();

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let connection = self.parse_connection(&mut ast)?;
                    ast.connections.push(connection);
                }
                _ => {
                    return Err(PhysarumError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(PhysarumError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(PhysarumError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    /// Node references may be identifiers or bare integers (`0`, `17`).
    fn expect_node(&mut self) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            _ => Err(PhysarumError::parse(
                self.current.line,
                format!("expected node name, got {:?}", self.current.kind),
            )),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<f64> {
        let line = self.current.line;
        let tok = self.expect(TokenKind::Number).map_err(|_| {
            PhysarumError::parse(line, format!("expected {}", what))
        })?;
        parse_value(&tok.text)
            .ok_or_else(|| PhysarumError::parse(line, format!("invalid number: {}", tok.text)))
    }

    /// Parse `key=value` pairs until end of line.
    fn parse_assignments(&mut self) -> Result<Vec<(String, f64, usize)>> {
        let mut pairs = Vec::new();
        while !self.at_line_end() {
            let line = self.current.line;
            let key = self.expect(TokenKind::Identifier)?.text.to_lowercase();
            self.expect(TokenKind::Equals)?;
            let value = self.expect_number(&format!("value for '{}'", key))?;
            pairs.push((key, value, line));
        }
        Ok(pairs)
    }

    fn parse_directive(&mut self, ast: &mut NetworkAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".source" | ".sink" => {
                if self.at_line_end() {
                    return Err(PhysarumError::parse(
                        line,
                        format!("{} needs at least one node", directive),
                    ));
                }
                while !self.at_line_end() {
                    let node = self.expect_node()?;
                    ast.mention(&node);
                    if directive.eq_ignore_ascii_case(".source") {
                        ast.sources.push(node);
                    } else {
                        ast.sinks.push(node);
                    }
                }
            }
            ".node" => {
                let node = self.expect_node()?;
                let pos = ast.mention(&node);
                if self.current.kind == TokenKind::Str {
                    ast.nodes[pos].label = Some(self.current.text.clone());
                    self.advance()?;
                }
            }
            ".param" => {
                for (name, value, line) in self.parse_assignments()? {
                    ast.params.push(ParamDef { name, value, line });
                }
            }
            _ => {
                return Err(PhysarumError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_connection(&mut self, ast: &mut NetworkAst) -> Result<ConnectionDef> {
        let name = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let start = self.expect_node().map_err(|_| {
            PhysarumError::invalid_connection(&name, line, "missing start node")
        })?;
        let end = self.expect_node().map_err(|_| {
            PhysarumError::invalid_connection(&name, line, "missing end node")
        })?;
        let length = self.expect_number("length").map_err(|_| {
            PhysarumError::invalid_connection(&name, line, "missing length")
        })?;
        let conductivity = self.expect_number("conductivity").map_err(|_| {
            PhysarumError::invalid_connection(&name, line, "missing conductivity")
        })?;

        let mut params = HashMap::new();
        for (key, value, _) in self.parse_assignments()? {
            params.insert(key, value);
        }

        ast.mention(&start);
        ast.mention(&end);

        Ok(ConnectionDef {
            name,
            start,
            end,
            length,
            conductivity,
            params,
            line,
        })
    }
}
