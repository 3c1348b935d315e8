//! # SQL Abstract Syntax Tree
//!
//! AST types produced by the parser. All nodes are arena-allocated
//! (bumpalo), hold `&'a` references to their children, and borrow identifier
//! and literal text from the original input, so the whole tree is `Copy`
//! structs over a single allocation region and is freed by dropping the
//! arena.
//!
//! Three categories of types exist:
//!
//! - **Helpers**: type names, column definitions, qualified names, ordering
//!   terms, CTE lists, and the other clause-level building blocks
//! - **Expressions**: [`Expr`], a single flat enum; the negatable forms
//!   (`NOT LIKE`, `NOT IN`, `IS NOT NULL`, ...) carry an `inverted` flag
//! - **Statements**: [`Statement`], one variant per supported statement
//!
//! Both `Expr` and `Statement` have an `Error` variant. The parser never
//! aborts on malformed input; it records a diagnostic and substitutes the
//! error sentinel so the surrounding structure survives. Use
//! [`Statement::contains_error`] / [`Expr::contains_error`] to detect
//! sentinels anywhere in a tree.

/// A column's declared type: a name plus up to two numeric arguments,
/// e.g. `varchar(255, -123)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeName<'a> {
    pub name: &'a str,
    pub signed_numbers: &'a [f64],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDefinition<'a> {
    pub name: &'a str,
    pub type_name: TypeName<'a>,
}

/// One entry of a `WITH` clause. The body is `None` for the empty form
/// `name AS ()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonTableExpression<'a> {
    pub table_name: &'a str,
    pub column_names: &'a [&'a str],
    pub select: Option<&'a Select<'a>>,
}

/// `WITH [RECURSIVE] cte (, cte)*`. The expression list is never empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonTableExpressionList<'a> {
    pub recursive: bool,
    pub common_table_expressions: &'a [CommonTableExpression<'a>],
}

/// `[schema.]table [AS alias]` as used by DELETE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualifiedTableName<'a> {
    pub schema_name: Option<&'a str>,
    pub table_name: &'a str,
    pub alias: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturningColumn<'a> {
    pub expression: &'a Expr<'a>,
    pub column_alias: Option<&'a str>,
}

/// `RETURNING *` is represented by an empty column list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturningClause<'a> {
    pub columns: &'a [ReturningColumn<'a>],
}

impl<'a> ReturningClause<'a> {
    pub fn return_all_columns(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One entry of a SELECT output list: `*`, `table.*`, or `expr [AS alias]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultColumn<'a> {
    All,
    TableAll(&'a str),
    Expression {
        expression: &'a Expr<'a>,
        column_alias: Option<&'a str>,
    },
}

/// `GROUP BY expr (, expr)* [HAVING expr]`. The group-by list is never
/// empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupByClause<'a> {
    pub group_by_list: &'a [&'a Expr<'a>],
    pub having_clause: Option<&'a Expr<'a>>,
}

/// A FROM-list entry: either a named table or a parenthesized, non-empty
/// list of nested entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableOrSubquery<'a> {
    Table {
        schema_name: Option<&'a str>,
        table_name: &'a str,
        alias: Option<&'a str>,
    },
    Subquery(&'a [TableOrSubquery<'a>]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

/// `expr [COLLATE name] [ASC|DESC] [NULLS FIRST|LAST]`.
///
/// When `NULLS` is not written, ascending terms default to `First` and
/// descending terms to `Last`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderingTerm<'a> {
    pub expression: &'a Expr<'a>,
    pub collation_name: Option<&'a str>,
    pub order: Order,
    pub nulls: Nulls,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitClause<'a> {
    pub limit_expression: &'a Expr<'a>,
    pub offset_expression: Option<&'a Expr<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
    BitwiseNot,
    Not,
}

/// Binary operators, declared tightest-binding first; the declaration order
/// is the precedence order and [`BinaryOperator::binding_power`] is derived
/// from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Concatenate,
    Multiplication,
    Division,
    Modulo,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    BitwiseAnd,
    BitwiseOr,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    Equals,
    NotEquals,
    And,
    Or,
}

impl BinaryOperator {
    /// Left/right binding power for precedence climbing. All binary
    /// operators are left-associative, so the right power is one above the
    /// left.
    pub fn binding_power(self) -> (u8, u8) {
        let left = match self {
            BinaryOperator::Concatenate => 15,
            BinaryOperator::Multiplication | BinaryOperator::Division | BinaryOperator::Modulo => {
                13
            }
            BinaryOperator::Plus | BinaryOperator::Minus => 11,
            BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight
            | BinaryOperator::BitwiseAnd
            | BinaryOperator::BitwiseOr => 9,
            BinaryOperator::LessThan
            | BinaryOperator::LessThanEquals
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanEquals => 7,
            BinaryOperator::Equals | BinaryOperator::NotEquals => 5,
            BinaryOperator::And => 3,
            BinaryOperator::Or => 1,
        };
        (left, left + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOperator {
    Like,
    Glob,
    Match,
    Regexp,
}

/// Up-to-three-part dotted column reference, disambiguated left-to-right as
/// `schema.table.column`, `table.column`, or `column`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnName<'a> {
    pub schema_name: Option<&'a str>,
    pub table_name: Option<&'a str>,
    pub column_name: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhenThenClause<'a> {
    pub when: &'a Expr<'a>,
    pub then: &'a Expr<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'a> {
    /// Recovery sentinel: a diagnostic was recorded where this node sits.
    Error,
    NumericLiteral(f64),
    StringLiteral(&'a str),
    BlobLiteral(&'a str),
    NullLiteral,
    ColumnName(ColumnName<'a>),
    UnaryOp {
        op: UnaryOperator,
        expr: &'a Expr<'a>,
    },
    BinaryOp {
        op: BinaryOperator,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },
    /// Parenthesized comma-separated list, `(a, b, c)`.
    Chained(&'a [&'a Expr<'a>]),
    Cast {
        expr: &'a Expr<'a>,
        type_name: TypeName<'a>,
    },
    Case {
        case_expression: Option<&'a Expr<'a>>,
        when_then_clauses: &'a [WhenThenClause<'a>],
        else_expression: Option<&'a Expr<'a>>,
    },
    Collate {
        expr: &'a Expr<'a>,
        collation_name: &'a str,
    },
    /// `lhs [NOT] LIKE|GLOB|MATCH|REGEXP rhs [ESCAPE expr]`.
    Match {
        op: MatchOperator,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
        escape: Option<&'a Expr<'a>>,
        inverted: bool,
    },
    /// `expr IS [NOT] NULL`.
    IsNull {
        expr: &'a Expr<'a>,
        inverted: bool,
    },
    /// `lhs IS [NOT] rhs`.
    Is {
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
        inverted: bool,
    },
    /// `expr [NOT] BETWEEN lhs AND rhs`.
    Between {
        expr: &'a Expr<'a>,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
        inverted: bool,
    },
    /// `expr [NOT] IN (a, b, ...)`.
    InChained {
        expr: &'a Expr<'a>,
        chain: &'a [&'a Expr<'a>],
        inverted: bool,
    },
    /// `expr [NOT] IN [schema.]table`.
    InTable {
        expr: &'a Expr<'a>,
        schema_name: Option<&'a str>,
        table_name: &'a str,
        inverted: bool,
    },
}

impl<'a> Expr<'a> {
    /// True if this node or any descendant is the error sentinel.
    pub fn contains_error(&self) -> bool {
        match *self {
            Expr::Error => true,
            Expr::NumericLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BlobLiteral(_)
            | Expr::NullLiteral
            | Expr::ColumnName(_) => false,
            Expr::UnaryOp { expr, .. } | Expr::Collate { expr, .. } => expr.contains_error(),
            Expr::BinaryOp { lhs, rhs, .. } | Expr::Is { lhs, rhs, .. } => {
                lhs.contains_error() || rhs.contains_error()
            }
            Expr::Chained(exprs) => exprs.iter().any(|e| e.contains_error()),
            Expr::Cast { expr, .. } => expr.contains_error(),
            Expr::Case {
                case_expression,
                when_then_clauses,
                else_expression,
            } => {
                case_expression.is_some_and(|e| e.contains_error())
                    || when_then_clauses
                        .iter()
                        .any(|c| c.when.contains_error() || c.then.contains_error())
                    || else_expression.is_some_and(|e| e.contains_error())
            }
            Expr::Match {
                lhs, rhs, escape, ..
            } => {
                lhs.contains_error()
                    || rhs.contains_error()
                    || escape.is_some_and(|e| e.contains_error())
            }
            Expr::IsNull { expr, .. } => expr.contains_error(),
            Expr::Between { expr, lhs, rhs, .. } => {
                expr.contains_error() || lhs.contains_error() || rhs.contains_error()
            }
            Expr::InChained { expr, chain, .. } => {
                expr.contains_error() || chain.iter().any(|e| e.contains_error())
            }
            Expr::InTable { expr, .. } => expr.contains_error(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateTable<'a> {
    pub schema_name: Option<&'a str>,
    pub table_name: &'a str,
    pub columns: &'a [ColumnDefinition<'a>],
    pub is_temporary: bool,
    pub is_error_if_table_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTable<'a> {
    pub schema_name: Option<&'a str>,
    pub table_name: &'a str,
    pub is_error_if_table_does_not_exist: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delete<'a> {
    pub common_table_expression_list: Option<&'a CommonTableExpressionList<'a>>,
    pub qualified_table_name: QualifiedTableName<'a>,
    pub where_clause: Option<&'a Expr<'a>>,
    pub returning_clause: Option<&'a ReturningClause<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Select<'a> {
    pub common_table_expression_list: Option<&'a CommonTableExpressionList<'a>>,
    /// True for `SELECT` and `SELECT ALL`, false for `SELECT DISTINCT`.
    pub select_all: bool,
    pub result_column_list: &'a [ResultColumn<'a>],
    pub table_or_subquery_list: &'a [TableOrSubquery<'a>],
    pub where_clause: Option<&'a Expr<'a>>,
    pub group_by_clause: Option<&'a GroupByClause<'a>>,
    pub ordering_term_list: &'a [OrderingTerm<'a>],
    pub limit_clause: Option<&'a LimitClause<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statement<'a> {
    /// Recovery sentinel for statements that could not be structured.
    Error,
    CreateTable(&'a CreateTable<'a>),
    DropTable(&'a DropTable<'a>),
    Delete(&'a Delete<'a>),
    Select(&'a Select<'a>),
}

impl<'a> Statement<'a> {
    /// True if this statement is the error sentinel or any expression inside
    /// it is.
    pub fn contains_error(&self) -> bool {
        match *self {
            Statement::Error => true,
            Statement::CreateTable(_) | Statement::DropTable(_) => false,
            Statement::Delete(delete) => {
                delete.where_clause.is_some_and(|e| e.contains_error())
                    || delete.returning_clause.is_some_and(|r| {
                        r.columns.iter().any(|c| c.expression.contains_error())
                    })
            }
            Statement::Select(select) => select_contains_error(select),
        }
    }
}

fn select_contains_error(select: &Select<'_>) -> bool {
    select.result_column_list.iter().any(|c| match c {
        ResultColumn::Expression { expression, .. } => expression.contains_error(),
        _ => false,
    }) || select.where_clause.is_some_and(|e| e.contains_error())
        || select.group_by_clause.is_some_and(|g| {
            g.group_by_list.iter().any(|e| e.contains_error())
                || g.having_clause.is_some_and(|e| e.contains_error())
        })
        || select
            .ordering_term_list
            .iter()
            .any(|t| t.expression.contains_error())
        || select.limit_clause.is_some_and(|l| {
            l.limit_expression.contains_error()
                || l.offset_expression.is_some_and(|e| e.contains_error())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;

    #[test]
    fn binding_power_follows_declaration_order() {
        let operators = [
            BinaryOperator::Concatenate,
            BinaryOperator::Multiplication,
            BinaryOperator::Division,
            BinaryOperator::Modulo,
            BinaryOperator::Plus,
            BinaryOperator::Minus,
            BinaryOperator::ShiftLeft,
            BinaryOperator::ShiftRight,
            BinaryOperator::BitwiseAnd,
            BinaryOperator::BitwiseOr,
            BinaryOperator::LessThan,
            BinaryOperator::LessThanEquals,
            BinaryOperator::GreaterThan,
            BinaryOperator::GreaterThanEquals,
            BinaryOperator::Equals,
            BinaryOperator::NotEquals,
            BinaryOperator::And,
            BinaryOperator::Or,
        ];
        for pair in operators.windows(2) {
            let (earlier, _) = pair[0].binding_power();
            let (later, _) = pair[1].binding_power();
            assert!(
                earlier >= later,
                "{:?} should bind at least as tightly as {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn binding_power_is_left_associative() {
        let (left, right) = BinaryOperator::Plus.binding_power();
        assert_eq!(right, left + 1);
    }

    #[test]
    fn returning_clause_all_columns() {
        let all = ReturningClause { columns: &[] };
        assert!(all.return_all_columns());

        let arena = Bump::new();
        let expression = arena.alloc(Expr::NullLiteral);
        let columns = arena.alloc_slice_copy(&[ReturningColumn {
            expression,
            column_alias: None,
        }]);
        let some = ReturningClause { columns };
        assert!(!some.return_all_columns());
    }

    #[test]
    fn expr_contains_error_at_leaf() {
        let arena = Bump::new();
        let error = arena.alloc(Expr::Error);
        let ok = arena.alloc(Expr::NumericLiteral(1.0));
        let binary = Expr::BinaryOp {
            op: BinaryOperator::Plus,
            lhs: ok,
            rhs: error,
        };
        assert!(binary.contains_error());
        assert!(!ok.contains_error());
    }

    #[test]
    fn expr_contains_error_in_case_branches() {
        let arena = Bump::new();
        let when = arena.alloc(Expr::NumericLiteral(1.0));
        let then = arena.alloc(Expr::Error);
        let clauses = arena.alloc_slice_copy(&[WhenThenClause { when, then }]);
        let case = Expr::Case {
            case_expression: None,
            when_then_clauses: clauses,
            else_expression: None,
        };
        assert!(case.contains_error());
    }

    #[test]
    fn statement_error_is_error() {
        assert!(Statement::Error.contains_error());
    }

    #[test]
    fn select_contains_error_through_where() {
        let arena = Bump::new();
        let error = arena.alloc(Expr::Error);
        let columns = arena.alloc_slice_copy(&[ResultColumn::All]);
        let from = arena.alloc_slice_copy(&[TableOrSubquery::Table {
            schema_name: None,
            table_name: "t",
            alias: None,
        }]);
        let select = arena.alloc(Select {
            common_table_expression_list: None,
            select_all: true,
            result_column_list: columns,
            table_or_subquery_list: from,
            where_clause: Some(error),
            group_by_clause: None,
            ordering_term_list: &[],
            limit_clause: None,
        });
        assert!(Statement::Select(select).contains_error());
    }

    #[test]
    fn table_or_subquery_variants_are_exclusive() {
        let table = TableOrSubquery::Table {
            schema_name: Some("s"),
            table_name: "t",
            alias: None,
        };
        assert!(matches!(table, TableOrSubquery::Table { .. }));

        let arena = Bump::new();
        let nested = arena.alloc_slice_copy(&[table]);
        let subquery = TableOrSubquery::Subquery(nested);
        assert!(matches!(subquery, TableOrSubquery::Subquery(list) if !list.is_empty()));
    }
}
