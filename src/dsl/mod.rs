//! Description language for Physarum networks.
//!
//! Networks can be written in a small line-oriented text format instead of
//! being assembled in code.
//!
//! # Grammar Overview
//!
//! ```text
//! network     = { line }
//! line        = comment | directive | connection | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name { argument }
//! connection  = name node node length conductivity { param }
//!
//! directive_name = "source" | "sink" | "node" | "param"
//! node        = identifier | number
//! param       = identifier '=' number
//! ```
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .source | Mark source nodes | `.source <node>+` |
//! | .sink | Mark sink nodes | `.sink <node>+` |
//! | .node | Declare a node with a display name | `.node <node> ["label"]` |
//! | .param | Solver parameters | `.param mue=1.2 i0=1 threshold=1e-3 iterations=50 epsilon=1e-5` |
//!
//! Connection parameters are `law` (1, 2 or 3), `alpha`, `k` (saturation
//! constant of law 2) and `weight`. Any other key is rejected when the
//! network is built.
//!
//! # Example
//!
//! ```text
//! # Two routes from food to food
//! .source a
//! .sink b
//!
//! E1 a x 1 0.8
//! E2 x b 3 0.9
//! E3 a y 7 0.5 law=2 k=10
//! E4 y b 7 0.6
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a network description string into an AST.
pub fn parse(input: &str) -> Result<NetworkAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a network description file.
pub fn parse_file(path: &std::path::Path) -> Result<NetworkAst> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::PhysarumError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse(&content)
}
