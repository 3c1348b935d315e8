//! # sqlfront - SQL Statement Front End
//!
//! A hand-written SQL lexer, recursive descent parser, and arena-allocated
//! AST covering `CREATE TABLE`, `DROP TABLE`, `DELETE`, and `SELECT`
//! statements with common table expressions, a full expression grammar, and
//! non-fatal error recovery.
//!
//! ## Architecture
//!
//! ```text
//! source text → Lexer → Parser → AST (arena-allocated) + diagnostics
//! ```
//!
//! - [`lexer`]: zero-copy tokenizer; tokens borrow from the input and carry
//!   1-based line/column positions
//! - [`ast`]: `Copy` node types allocated in a caller-provided
//!   [`bumpalo::Bump`] arena
//! - [`parser`]: recursive descent with precedence-climbing expressions;
//!   syntax errors accumulate instead of aborting, and malformed subtrees
//!   are represented by `Error` sentinels
//!
//! ## Usage
//!
//! ```ignore
//! use bumpalo::Bump;
//! use sqlfront::{Parser, Statement};
//!
//! let arena = Bump::new();
//! let mut parser = Parser::new("SELECT * FROM users WHERE id = 1;", &arena);
//! let statement = parser.next_statement();
//! if parser.has_errors() {
//!     eprintln!("{}", parser.errors()[0]);
//! } else if let Statement::Select(select) = statement {
//!     println!("{} result columns", select.result_column_list.len());
//! }
//! ```
//!
//! The AST lives as long as the arena and the input string; dropping the
//! arena frees every node at once.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use token::{Token, TokenKind};

use bumpalo::Bump;
use eyre::{bail, Result};

/// Parses every `;`-terminated statement in `sql`, failing with the first
/// recorded diagnostic. Empty input is an error.
pub fn parse<'a>(sql: &'a str, arena: &'a Bump) -> Result<Vec<Statement<'a>>> {
    let mut parser = Parser::new(sql, arena);
    let mut statements = Vec::new();
    loop {
        statements.push(parser.next_statement());
        if parser.has_errors() || parser.is_at_end() {
            break;
        }
    }
    if let Some(error) = parser.errors().first() {
        bail!("{}", error);
    }
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_multiple_statements() {
        let arena = Bump::new();
        let statements = parse(
            "CREATE TABLE t ( c );\nSELECT * FROM t;\nDROP TABLE t;",
            &arena,
        )
        .unwrap();
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0], Statement::CreateTable(_)));
        assert!(matches!(statements[1], Statement::Select(_)));
        assert!(matches!(statements[2], Statement::DropTable(_)));
    }

    #[test]
    fn parse_reports_first_diagnostic() {
        let arena = Bump::new();
        let error = parse("SELECT * FROM;", &arena).unwrap_err();
        assert!(error.to_string().contains("Unexpected token"));
    }

    #[test]
    fn parse_empty_input_is_an_error() {
        let arena = Bump::new();
        assert!(parse("", &arena).is_err());
    }
}
