//! # SQL Parser - Recursive Descent with Precedence Climbing
//!
//! Hand-written parser turning a token stream into the arena-allocated AST
//! of [`crate::ast`]. Statement structure is parsed by recursive descent;
//! expressions use a Pratt-style loop whose binding powers derive from the
//! [`BinaryOperator`] declaration order.
//!
//! ```text
//! Input SQL → Lexer → Parser → AST (arena-allocated) + diagnostics
//! ```
//!
//! ## Supported Statements
//!
//! `CREATE TABLE`, `DROP TABLE`, `DELETE`, and `SELECT`, each terminated by
//! `;`. A `WITH [RECURSIVE]` prefix is accepted before `DELETE` and
//! `SELECT` and rejected before the DDL statements.
//!
//! ## Error Recovery
//!
//! The parser never aborts. A mismatched token records a diagnostic and the
//! parser proceeds as if the expected token had been present, without
//! consuming anything; an unparseable expression or statement becomes the
//! `Error` sentinel. After a statement-level failure the parser
//! resynchronizes at the next `;` so later statements still parse. Callers
//! should check [`Parser::has_errors`] before trusting a result.
//!
//! ## Lookahead
//!
//! One current token plus an explicit two-token peek buffer, enough to
//! disambiguate `table.*` result columns and `NOT LIKE`-style inverted
//! operators. The lexer is never rewound.

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};
use bumpalo::Bump;
use std::fmt;


const UNARY_BP: u8 = 17;
const COLLATE_BP: u8 = 17;
const COMPARISON_BP: u8 = 5;

/// A recorded diagnostic. Messages live in the parse arena.
#[derive(Debug, Clone, Copy)]
pub struct ParseError<'a> {
    pub message: &'a str,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (line {}, column {})", self.message, self.line, self.column)
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    arena: &'a Bump,
    current: Token<'a>,
    lookahead: Vec<Token<'a>>,
    errors: Vec<ParseError<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, arena: &'a Bump) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            lexer,
            arena,
            current,
            lookahead: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError<'a>] {
        &self.errors
    }

    /// Parses the next `;`-terminated statement. Returns
    /// [`Statement::Error`] when the input cannot be structured; diagnostics
    /// accumulate in [`Parser::errors`] either way. Once the input is
    /// exhausted every further call records an error and returns the
    /// sentinel.
    pub fn next_statement(&mut self) -> Statement<'a> {
        if self.is_at_end() {
            self.expected("statement");
            return Statement::Error;
        }

        let cte_list = if self.check(TokenKind::With) {
            Some(self.parse_common_table_expression_list())
        } else {
            None
        };

        let statement = match self.current.kind {
            TokenKind::Create if cte_list.is_none() => self.parse_create_table(),
            TokenKind::Drop if cte_list.is_none() => self.parse_drop_table(),
            TokenKind::Delete => self.parse_delete(cte_list),
            TokenKind::Select => self.parse_select_statement(cte_list),
            _ => {
                if cte_list.is_some() {
                    self.expected("DELETE or SELECT");
                } else {
                    self.expected("CREATE, DROP, DELETE, or SELECT");
                }
                self.synchronize();
                return Statement::Error;
            }
        };

        self.consume(TokenKind::Semicolon);
        statement
    }

    fn advance(&mut self) -> Token<'a> {
        let next = if self.lookahead.is_empty() {
            self.lexer.next_token()
        } else {
            self.lookahead.remove(0)
        };
        std::mem::replace(&mut self.current, next)
    }

    fn peek_kind(&mut self, n: usize) -> TokenKind {
        while self.lookahead.len() < n {
            let token = self.lexer.next_token();
            self.lookahead.push(token);
        }
        self.lookahead[n - 1].kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn consume_if(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// On mismatch records a diagnostic, does not advance, and returns a
    /// synthetic token of the expected kind so the caller can continue as if
    /// the token had been present.
    fn consume(&mut self, kind: TokenKind) -> Token<'a> {
        if self.check(kind) {
            self.advance()
        } else {
            self.expected(kind.name());
            Token::new(kind, "", self.current.line, self.current.column)
        }
    }

    fn at_name(&self) -> bool {
        self.current.kind == TokenKind::Identifier || self.current.kind.is_keyword()
    }

    /// Accepts an identifier or any keyword spelling as a name, returning
    /// the raw lexeme. SQL allows keyword-spelled names (`table`, `match`)
    /// wherever a schema/table/column/alias name is expected.
    fn expect_name(&mut self) -> &'a str {
        if self.at_name() {
            self.advance().value
        } else {
            self.expected("identifier");
            ""
        }
    }

    fn expected(&mut self, what: &str) {
        if self.is_at_end() {
            self.add_error(format!("Unexpected end of input: expected {}", what));
        } else {
            self.add_error(format!(
                "Unexpected token: expected {}, got {}",
                what,
                self.current.kind.name()
            ));
        }
    }

    fn add_error(&mut self, message: String) {
        self.error_at(self.current.line, self.current.column, message);
    }

    fn error_at(&mut self, line: u32, column: u32, message: String) {
        let message = self.arena.alloc_str(&message);
        self.errors.push(ParseError {
            message,
            line,
            column,
        });
    }

    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.advance().kind == TokenKind::Semicolon {
                break;
            }
        }
    }

    fn parse_common_table_expression_list(&mut self) -> &'a CommonTableExpressionList<'a> {
        self.consume(TokenKind::With);
        let recursive = self.consume_if(TokenKind::Recursive);

        let mut expressions = Vec::new();
        loop {
            expressions.push(self.parse_common_table_expression());
            if !self.consume_if(TokenKind::Comma) {
                break;
            }
        }

        self.arena.alloc(CommonTableExpressionList {
            recursive,
            common_table_expressions: self.arena.alloc_slice_copy(&expressions),
        })
    }

    fn parse_common_table_expression(&mut self) -> CommonTableExpression<'a> {
        let table_name = self.expect_name();

        let mut column_names: Vec<&'a str> = Vec::new();
        if self.consume_if(TokenKind::ParenOpen) {
            loop {
                column_names.push(self.expect_name());
                if !self.consume_if(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::ParenClose);
        }

        self.consume(TokenKind::As);
        self.consume(TokenKind::ParenOpen);
        let select: Option<&'a Select<'a>> = if self.check(TokenKind::Select) {
            let body = self.parse_select_body(None);
            Some(self.arena.alloc(body))
        } else {
            None
        };
        self.consume(TokenKind::ParenClose);

        CommonTableExpression {
            table_name,
            column_names: self.arena.alloc_slice_copy(&column_names),
            select,
        }
    }

    fn parse_create_table(&mut self) -> Statement<'a> {
        self.consume(TokenKind::Create);
        let is_temporary =
            self.consume_if(TokenKind::Temp) || self.consume_if(TokenKind::Temporary);
        self.consume(TokenKind::Table);

        let is_error_if_table_exists = if self.consume_if(TokenKind::If) {
            self.consume(TokenKind::Not);
            self.consume(TokenKind::Exists);
            false
        } else {
            true
        };

        let (schema_name, table_name) = self.parse_schema_and_table_name();

        self.consume(TokenKind::ParenOpen);
        let mut columns = Vec::new();
        if self.check(TokenKind::ParenClose) {
            self.expected("column definition");
        } else {
            loop {
                columns.push(self.parse_column_definition());
                if !self.consume_if(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::ParenClose);

        Statement::CreateTable(self.arena.alloc(CreateTable {
            schema_name,
            table_name,
            columns: self.arena.alloc_slice_copy(&columns),
            is_temporary,
            is_error_if_table_exists,
        }))
    }

    fn parse_column_definition(&mut self) -> ColumnDefinition<'a> {
        let name = self.expect_name();

        // A column without a declared type stores anything, i.e. BLOB.
        let type_name = if self.check(TokenKind::Identifier) {
            self.parse_type_name()
        } else {
            TypeName {
                name: "BLOB",
                signed_numbers: &[],
            }
        };

        ColumnDefinition { name, type_name }
    }

    fn parse_type_name(&mut self) -> TypeName<'a> {
        let name = self.consume(TokenKind::Identifier).value;

        let mut signed_numbers = Vec::new();
        if self.consume_if(TokenKind::ParenOpen) {
            if let Some(value) = self.parse_signed_number() {
                signed_numbers.push(value);
            }
            if self.consume_if(TokenKind::Comma) {
                if let Some(value) = self.parse_signed_number() {
                    signed_numbers.push(value);
                }
            }
            self.consume(TokenKind::ParenClose);
        }

        TypeName {
            name,
            signed_numbers: self.arena.alloc_slice_copy(&signed_numbers),
        }
    }

    fn parse_signed_number(&mut self) -> Option<f64> {
        let negative = if self.consume_if(TokenKind::Minus) {
            true
        } else {
            self.consume_if(TokenKind::Plus);
            false
        };

        if self.check(TokenKind::NumericLiteral) {
            let token = self.advance();
            let value = self.decode_numeric_literal(token)?;
            Some(if negative { -value } else { value })
        } else {
            self.expected("numeric literal");
            None
        }
    }

    fn parse_drop_table(&mut self) -> Statement<'a> {
        self.consume(TokenKind::Drop);
        self.consume(TokenKind::Table);

        let is_error_if_table_does_not_exist = if self.consume_if(TokenKind::If) {
            self.consume(TokenKind::Exists);
            false
        } else {
            true
        };

        let (schema_name, table_name) = self.parse_schema_and_table_name();

        Statement::DropTable(self.arena.alloc(DropTable {
            schema_name,
            table_name,
            is_error_if_table_does_not_exist,
        }))
    }

    fn parse_delete(
        &mut self,
        cte_list: Option<&'a CommonTableExpressionList<'a>>,
    ) -> Statement<'a> {
        self.consume(TokenKind::Delete);
        self.consume(TokenKind::From);

        let qualified_table_name = self.parse_qualified_table_name();

        let where_clause: Option<&'a Expr<'a>> = if self.consume_if(TokenKind::Where) {
            Some(self.arena.alloc(self.parse_expression()))
        } else {
            None
        };

        let returning_clause = if self.consume_if(TokenKind::Returning) {
            Some(self.parse_returning_clause())
        } else {
            None
        };

        Statement::Delete(self.arena.alloc(Delete {
            common_table_expression_list: cte_list,
            qualified_table_name,
            where_clause,
            returning_clause,
        }))
    }

    fn parse_returning_clause(&mut self) -> &'a ReturningClause<'a> {
        if self.consume_if(TokenKind::Asterisk) {
            return self.arena.alloc(ReturningClause { columns: &[] });
        }

        let mut columns = Vec::new();
        loop {
            let expression: &'a Expr<'a> = self.arena.alloc(self.parse_expression());
            let column_alias = if self.consume_if(TokenKind::As) {
                Some(self.expect_name())
            } else {
                None
            };
            columns.push(ReturningColumn {
                expression,
                column_alias,
            });
            if !self.consume_if(TokenKind::Comma) {
                break;
            }
        }

        self.arena.alloc(ReturningClause {
            columns: self.arena.alloc_slice_copy(&columns),
        })
    }

    fn parse_select_statement(
        &mut self,
        cte_list: Option<&'a CommonTableExpressionList<'a>>,
    ) -> Statement<'a> {
        let select = self.parse_select_body(cte_list);
        Statement::Select(self.arena.alloc(select))
    }

    fn parse_select_body(
        &mut self,
        cte_list: Option<&'a CommonTableExpressionList<'a>>,
    ) -> Select<'a> {
        self.consume(TokenKind::Select);

        let select_all = if self.consume_if(TokenKind::Distinct) {
            false
        } else {
            self.consume_if(TokenKind::All);
            true
        };

        let mut result_column_list = Vec::new();
        loop {
            result_column_list.push(self.parse_result_column());
            if !self.consume_if(TokenKind::Comma) {
                break;
            }
        }

        self.consume(TokenKind::From);
        let mut table_or_subquery_list = Vec::new();
        loop {
            table_or_subquery_list.push(self.parse_table_or_subquery());
            if !self.consume_if(TokenKind::Comma) {
                break;
            }
        }

        let where_clause: Option<&'a Expr<'a>> = if self.consume_if(TokenKind::Where) {
            Some(self.arena.alloc(self.parse_expression()))
        } else {
            None
        };

        let group_by_clause: Option<&'a GroupByClause<'a>> = if self.consume_if(TokenKind::Group) {
            self.consume(TokenKind::By);
            let mut group_by_list: Vec<&'a Expr<'a>> = Vec::new();
            loop {
                group_by_list.push(self.arena.alloc(self.parse_expression()));
                if !self.consume_if(TokenKind::Comma) {
                    break;
                }
            }
            let having_clause: Option<&'a Expr<'a>> = if self.consume_if(TokenKind::Having) {
                Some(self.arena.alloc(self.parse_expression()))
            } else {
                None
            };
            Some(self.arena.alloc(GroupByClause {
                group_by_list: self.arena.alloc_slice_copy(&group_by_list),
                having_clause,
            }))
        } else {
            None
        };

        let ordering_term_list: &'a [OrderingTerm<'a>] = if self.consume_if(TokenKind::Order) {
            self.consume(TokenKind::By);
            let mut terms = Vec::new();
            loop {
                terms.push(self.parse_ordering_term());
                if !self.consume_if(TokenKind::Comma) {
                    break;
                }
            }
            self.arena.alloc_slice_copy(&terms)
        } else {
            &[]
        };

        let limit_clause: Option<&'a LimitClause<'a>> = if self.consume_if(TokenKind::Limit) {
            let limit_expression: &'a Expr<'a> = self.arena.alloc(self.parse_expression());
            let offset_expression: Option<&'a Expr<'a>> = if self.consume_if(TokenKind::Offset) {
                Some(self.arena.alloc(self.parse_expression()))
            } else {
                None
            };
            Some(self.arena.alloc(LimitClause {
                limit_expression,
                offset_expression,
            }))
        } else {
            None
        };

        Select {
            common_table_expression_list: cte_list,
            select_all,
            result_column_list: self.arena.alloc_slice_copy(&result_column_list),
            table_or_subquery_list: self.arena.alloc_slice_copy(&table_or_subquery_list),
            where_clause,
            group_by_clause,
            ordering_term_list,
            limit_clause,
        }
    }

    fn parse_result_column(&mut self) -> ResultColumn<'a> {
        if self.consume_if(TokenKind::Asterisk) {
            return ResultColumn::All;
        }

        // `table.*` needs two tokens of lookahead to distinguish from a
        // qualified column reference.
        if self.at_name()
            && self.peek_kind(1) == TokenKind::Period
            && self.peek_kind(2) == TokenKind::Asterisk
        {
            let table_name = self.expect_name();
            self.consume(TokenKind::Period);
            self.consume(TokenKind::Asterisk);
            return ResultColumn::TableAll(table_name);
        }

        let expression: &'a Expr<'a> = self.arena.alloc(self.parse_expression());
        let column_alias = if self.consume_if(TokenKind::As) {
            Some(self.expect_name())
        } else {
            None
        };
        ResultColumn::Expression {
            expression,
            column_alias,
        }
    }

    fn parse_table_or_subquery(&mut self) -> TableOrSubquery<'a> {
        if self.consume_if(TokenKind::ParenOpen) {
            let mut entries = Vec::new();
            loop {
                entries.push(self.parse_table_or_subquery());
                if !self.consume_if(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::ParenClose);
            return TableOrSubquery::Subquery(self.arena.alloc_slice_copy(&entries));
        }

        let (schema_name, table_name) = self.parse_schema_and_table_name();
        let alias = if self.consume_if(TokenKind::As) {
            Some(self.expect_name())
        } else {
            None
        };

        TableOrSubquery::Table {
            schema_name,
            table_name,
            alias,
        }
    }

    fn parse_ordering_term(&mut self) -> OrderingTerm<'a> {
        let mut expression: &'a Expr<'a> = self.arena.alloc(self.parse_expression());

        // The expression parser owns COLLATE; hoist it back out into the
        // ordering term where one was written.
        let collation_name = if let Expr::Collate {
            expr,
            collation_name,
        } = *expression
        {
            expression = expr;
            Some(collation_name)
        } else {
            None
        };

        let order = if self.consume_if(TokenKind::Desc) {
            Order::Descending
        } else {
            self.consume_if(TokenKind::Asc);
            Order::Ascending
        };

        let default_nulls = match order {
            Order::Ascending => Nulls::First,
            Order::Descending => Nulls::Last,
        };
        let nulls = if self.consume_if(TokenKind::Nulls) {
            if self.consume_if(TokenKind::First) {
                Nulls::First
            } else if self.consume_if(TokenKind::Last) {
                Nulls::Last
            } else {
                self.expected("FIRST or LAST");
                default_nulls
            }
        } else {
            default_nulls
        };

        OrderingTerm {
            expression,
            collation_name,
            order,
            nulls,
        }
    }

    fn parse_qualified_table_name(&mut self) -> QualifiedTableName<'a> {
        let (schema_name, table_name) = self.parse_schema_and_table_name();
        let alias = if self.consume_if(TokenKind::As) {
            Some(self.expect_name())
        } else {
            None
        };
        QualifiedTableName {
            schema_name,
            table_name,
            alias,
        }
    }

    fn parse_schema_and_table_name(&mut self) -> (Option<&'a str>, &'a str) {
        let name = self.expect_name();
        if self.consume_if(TokenKind::Period) {
            (Some(name), self.expect_name())
        } else {
            (None, name)
        }
    }

    fn parse_expression(&mut self) -> Expr<'a> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Expr<'a> {
        let mut lhs = self.parse_primary();

        loop {
            if let Some(op) = Self::binary_operator(self.current.kind) {
                let (l_bp, r_bp) = op.binding_power();
                if l_bp < min_bp {
                    break;
                }
                self.advance();
                let rhs = self.parse_expr_bp(r_bp);
                lhs = Expr::BinaryOp {
                    op,
                    lhs: self.arena.alloc(lhs),
                    rhs: self.arena.alloc(rhs),
                };
                continue;
            }

            if self.check(TokenKind::Collate) {
                if COLLATE_BP < min_bp {
                    break;
                }
                self.advance();
                let collation_name = self.expect_name();
                lhs = Expr::Collate {
                    expr: self.arena.alloc(lhs),
                    collation_name,
                };
                continue;
            }

            if self.check(TokenKind::Is) {
                if COMPARISON_BP < min_bp {
                    break;
                }
                self.advance();
                let inverted = self.consume_if(TokenKind::Not);
                if self.consume_if(TokenKind::Null) {
                    lhs = Expr::IsNull {
                        expr: self.arena.alloc(lhs),
                        inverted,
                    };
                } else {
                    let rhs = self.parse_expr_bp(COMPARISON_BP + 1);
                    lhs = Expr::Is {
                        lhs: self.arena.alloc(lhs),
                        rhs: self.arena.alloc(rhs),
                        inverted,
                    };
                }
                continue;
            }

            // `NOT` only continues the expression when it prefixes one of
            // the negatable operators.
            let inverted = self.check(TokenKind::Not);
            let operator_kind = if inverted {
                self.peek_kind(1)
            } else {
                self.current.kind
            };
            if !matches!(
                operator_kind,
                TokenKind::Between
                    | TokenKind::In
                    | TokenKind::Like
                    | TokenKind::Glob
                    | TokenKind::Match
                    | TokenKind::Regexp
            ) {
                break;
            }
            if COMPARISON_BP < min_bp {
                break;
            }
            if inverted {
                self.advance();
            }
            self.advance();

            match operator_kind {
                TokenKind::Between => {
                    let low = self.parse_expr_bp(COMPARISON_BP + 1);
                    self.consume(TokenKind::And);
                    let high = self.parse_expr_bp(COMPARISON_BP + 1);
                    lhs = Expr::Between {
                        expr: self.arena.alloc(lhs),
                        lhs: self.arena.alloc(low),
                        rhs: self.arena.alloc(high),
                        inverted,
                    };
                }
                TokenKind::In => {
                    lhs = self.parse_in_expression(lhs, inverted);
                }
                _ => {
                    let op = match operator_kind {
                        TokenKind::Like => MatchOperator::Like,
                        TokenKind::Glob => MatchOperator::Glob,
                        TokenKind::Match => MatchOperator::Match,
                        _ => MatchOperator::Regexp,
                    };
                    let rhs = self.parse_expr_bp(COMPARISON_BP + 1);
                    let escape: Option<&'a Expr<'a>> = if self.consume_if(TokenKind::Escape) {
                        Some(self.arena.alloc(self.parse_expr_bp(COMPARISON_BP + 1)))
                    } else {
                        None
                    };
                    lhs = Expr::Match {
                        op,
                        lhs: self.arena.alloc(lhs),
                        rhs: self.arena.alloc(rhs),
                        escape,
                        inverted,
                    };
                }
            }
        }

        lhs
    }

    fn parse_in_expression(&mut self, lhs: Expr<'a>, inverted: bool) -> Expr<'a> {
        if self.consume_if(TokenKind::ParenOpen) {
            let mut chain: Vec<&'a Expr<'a>> = Vec::new();
            if !self.check(TokenKind::ParenClose) {
                loop {
                    chain.push(self.arena.alloc(self.parse_expression()));
                    if !self.consume_if(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::ParenClose);
            Expr::InChained {
                expr: self.arena.alloc(lhs),
                chain: self.arena.alloc_slice_copy(&chain),
                inverted,
            }
        } else {
            let (schema_name, table_name) = self.parse_schema_and_table_name();
            Expr::InTable {
                expr: self.arena.alloc(lhs),
                schema_name,
                table_name,
                inverted,
            }
        }
    }

    fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
        match kind {
            TokenKind::DoublePipe => Some(BinaryOperator::Concatenate),
            TokenKind::Asterisk => Some(BinaryOperator::Multiplication),
            TokenKind::Slash => Some(BinaryOperator::Division),
            TokenKind::Percent => Some(BinaryOperator::Modulo),
            TokenKind::Plus => Some(BinaryOperator::Plus),
            TokenKind::Minus => Some(BinaryOperator::Minus),
            TokenKind::ShiftLeft => Some(BinaryOperator::ShiftLeft),
            TokenKind::ShiftRight => Some(BinaryOperator::ShiftRight),
            TokenKind::Ampersand => Some(BinaryOperator::BitwiseAnd),
            TokenKind::Pipe => Some(BinaryOperator::BitwiseOr),
            TokenKind::Lt => Some(BinaryOperator::LessThan),
            TokenKind::LtEq => Some(BinaryOperator::LessThanEquals),
            TokenKind::Gt => Some(BinaryOperator::GreaterThan),
            TokenKind::GtEq => Some(BinaryOperator::GreaterThanEquals),
            TokenKind::Eq | TokenKind::DoubleEq => Some(BinaryOperator::Equals),
            TokenKind::NotEq1 | TokenKind::NotEq2 => Some(BinaryOperator::NotEquals),
            TokenKind::And => Some(BinaryOperator::And),
            TokenKind::Or => Some(BinaryOperator::Or),
            _ => None,
        }
    }

    fn parse_primary(&mut self) -> Expr<'a> {
        match self.current.kind {
            TokenKind::NumericLiteral => {
                let token = self.advance();
                match self.decode_numeric_literal(token) {
                    Some(value) => Expr::NumericLiteral(value),
                    None => Expr::Error,
                }
            }
            TokenKind::StringLiteral => {
                let token = self.advance();
                Expr::StringLiteral(self.decode_string_literal(token.value))
            }
            TokenKind::BlobLiteral => Expr::BlobLiteral(self.advance().value),
            TokenKind::Null => {
                self.advance();
                Expr::NullLiteral
            }
            TokenKind::Minus => self.parse_unary(UnaryOperator::Minus),
            TokenKind::Plus => self.parse_unary(UnaryOperator::Plus),
            TokenKind::Tilde => self.parse_unary(UnaryOperator::BitwiseNot),
            TokenKind::Not => self.parse_unary(UnaryOperator::Not),
            TokenKind::ParenOpen => {
                self.advance();
                let first = self.parse_expression();
                if self.consume_if(TokenKind::Comma) {
                    let mut chain: Vec<&'a Expr<'a>> = vec![self.arena.alloc(first)];
                    loop {
                        chain.push(self.arena.alloc(self.parse_expression()));
                        if !self.consume_if(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.consume(TokenKind::ParenClose);
                    Expr::Chained(self.arena.alloc_slice_copy(&chain))
                } else {
                    self.consume(TokenKind::ParenClose);
                    first
                }
            }
            TokenKind::Case => self.parse_case_expression(),
            TokenKind::Cast => self.parse_cast_expression(),
            kind if kind == TokenKind::Identifier || kind.is_keyword() => {
                self.parse_column_name_expression()
            }
            _ => {
                self.expected("expression");
                // Swallow the offending token so recovery makes progress,
                // but leave structural terminators for the caller.
                if !matches!(
                    self.current.kind,
                    TokenKind::Semicolon
                        | TokenKind::ParenClose
                        | TokenKind::Comma
                        | TokenKind::Eof
                ) {
                    self.advance();
                }
                Expr::Error
            }
        }
    }

    fn parse_unary(&mut self, op: UnaryOperator) -> Expr<'a> {
        self.advance();
        let operand = self.parse_expr_bp(UNARY_BP);
        Expr::UnaryOp {
            op,
            expr: self.arena.alloc(operand),
        }
    }

    fn parse_column_name_expression(&mut self) -> Expr<'a> {
        let first = self.expect_name();
        if !self.consume_if(TokenKind::Period) {
            return Expr::ColumnName(ColumnName {
                schema_name: None,
                table_name: None,
                column_name: first,
            });
        }

        if !self.at_name() {
            self.expected("column name");
            return Expr::Error;
        }
        let second = self.expect_name();
        if !self.consume_if(TokenKind::Period) {
            return Expr::ColumnName(ColumnName {
                schema_name: None,
                table_name: Some(first),
                column_name: second,
            });
        }

        if !self.at_name() {
            self.expected("column name");
            return Expr::Error;
        }
        let third = self.expect_name();
        Expr::ColumnName(ColumnName {
            schema_name: Some(first),
            table_name: Some(second),
            column_name: third,
        })
    }

    fn parse_case_expression(&mut self) -> Expr<'a> {
        self.consume(TokenKind::Case);

        let case_expression: Option<&'a Expr<'a>> = if !self.check(TokenKind::When) {
            Some(self.arena.alloc(self.parse_expression()))
        } else {
            None
        };

        if !self.check(TokenKind::When) {
            self.expected("WHEN");
        }

        let mut when_then_clauses = Vec::new();
        while self.consume_if(TokenKind::When) {
            let when: &'a Expr<'a> = self.arena.alloc(self.parse_expression());
            self.consume(TokenKind::Then);
            let then: &'a Expr<'a> = self.arena.alloc(self.parse_expression());
            when_then_clauses.push(WhenThenClause { when, then });
        }

        let else_expression: Option<&'a Expr<'a>> = if self.consume_if(TokenKind::Else) {
            Some(self.arena.alloc(self.parse_expression()))
        } else {
            None
        };

        self.consume(TokenKind::End);

        Expr::Case {
            case_expression,
            when_then_clauses: self.arena.alloc_slice_copy(&when_then_clauses),
            else_expression,
        }
    }

    fn parse_cast_expression(&mut self) -> Expr<'a> {
        self.consume(TokenKind::Cast);
        self.consume(TokenKind::ParenOpen);
        let expr: &'a Expr<'a> = self.arena.alloc(self.parse_expression());
        self.consume(TokenKind::As);
        let type_name = if self.check(TokenKind::Identifier) {
            self.parse_type_name()
        } else {
            self.expected("type name");
            TypeName {
                name: "",
                signed_numbers: &[],
            }
        };
        self.consume(TokenKind::ParenClose);
        Expr::Cast { expr, type_name }
    }

    fn decode_numeric_literal(&mut self, token: Token<'a>) -> Option<f64> {
        let text = token.value;
        let value = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16).ok().map(|v| v as f64)
        } else {
            text.parse::<f64>().ok()
        };
        if value.is_none() {
            self.error_at(
                token.line,
                token.column,
                format!("Invalid numeric literal: {}", text),
            );
        }
        value
    }

    fn decode_string_literal(&mut self, raw: &'a str) -> &'a str {
        if raw.contains("''") {
            self.arena.alloc_str(&raw.replace("''", "'"))
        } else {
            raw
        }
    }
}
