//! Parsed query AST consumed by the extractor
//!
//! The pruner never parses SQL text: the query compiler hands over these
//! nodes already resolved against table metadata.

use serde_json::Value;

use crate::metadata::TableRef;

/// Operation kinds carried by [`SqlOperation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    And,
    Or,
    Not,
    In,
    Equal,
    NotEqual,
    /// `>`
    Bigger,
    /// `>=`
    BiggerEqual,
    /// `<`
    Smaller,
    /// `<=`
    SmallerEqual,
    IsNull,
    IsNotNull,
    Like,
}

impl OperationType {
    /// Returns the SQL spelling of the operator
    pub fn sql(&self) -> &'static str {
        match self {
            OperationType::And => "AND",
            OperationType::Or => "OR",
            OperationType::Not => "NOT",
            OperationType::In => "IN",
            OperationType::Equal => "=",
            OperationType::NotEqual => "<>",
            OperationType::Bigger => ">",
            OperationType::BiggerEqual => ">=",
            OperationType::Smaller => "<",
            OperationType::SmallerEqual => "<=",
            OperationType::IsNull => "IS NULL",
            OperationType::IsNotNull => "IS NOT NULL",
            OperationType::Like => "LIKE",
        }
    }

    /// Returns true for `>` and `>=`
    pub fn is_lower_bound(&self) -> bool {
        matches!(self, OperationType::Bigger | OperationType::BiggerEqual)
    }

    /// Returns true for `<` and `<=`
    pub fn is_upper_bound(&self) -> bool {
        matches!(self, OperationType::Smaller | OperationType::SmallerEqual)
    }
}

/// Physical table reference in a FROM clause
#[derive(Debug, Clone)]
pub struct SqlTable {
    pub table: TableRef,
}

/// `<child> AS <alias>`
#[derive(Debug, Clone)]
pub struct SqlAlias {
    pub alias: String,
    pub child: Box<SqlAst>,
}

/// Two-sided join; the extractor never looks inside one
#[derive(Debug, Clone)]
pub struct SqlJoin {
    pub left: Box<SqlAst>,
    pub right: Box<SqlAst>,
    pub on: Option<Box<SqlAst>>,
}

/// Column reference, resolved to the table that owns it
#[derive(Debug, Clone)]
pub struct SqlColumn {
    pub schema: Option<String>,
    pub table_alias: Option<String>,
    pub column_name: String,
    pub table: TableRef,
}

impl SqlColumn {
    /// Returns true if both references name the same column the same way
    pub fn same_reference(&self, other: &SqlColumn) -> bool {
        self.schema == other.schema
            && self.table_alias == other.table_alias
            && self.column_name == other.column_name
    }
}

/// Literal constant
#[derive(Debug, Clone, PartialEq)]
pub struct SqlConst {
    pub value: Value,
}

/// Bound-parameter placeholder, `?` at position `index` (zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlParameter {
    pub index: usize,
}

/// Operator applied to child expressions
#[derive(Debug, Clone)]
pub struct SqlOperation {
    pub op_type: OperationType,
    pub children: Vec<SqlAst>,
}

impl SqlOperation {
    /// Creates a new operation node
    pub fn new(op_type: OperationType, children: Vec<SqlAst>) -> Self {
        Self { op_type, children }
    }

    /// Number of operands
    pub fn size(&self) -> usize {
        self.children.len()
    }

    /// Operand at `idx`
    pub fn child(&self, idx: usize) -> Option<&SqlAst> {
        self.children.get(idx)
    }
}

/// Function call or any other computed expression
#[derive(Debug, Clone)]
pub struct SqlFunction {
    pub name: String,
    pub args: Vec<SqlAst>,
}

/// Expression and FROM-clause node
#[derive(Debug, Clone)]
pub enum SqlAst {
    Table(SqlTable),
    Alias(SqlAlias),
    Join(SqlJoin),
    Column(SqlColumn),
    Constant(SqlConst),
    Parameter(SqlParameter),
    Operation(SqlOperation),
    Function(SqlFunction),
}

impl SqlAst {
    /// Table node
    pub fn table(table: TableRef) -> Self {
        SqlAst::Table(SqlTable { table })
    }

    /// Alias wrapper
    pub fn alias(child: SqlAst, alias: impl Into<String>) -> Self {
        SqlAst::Alias(SqlAlias {
            alias: alias.into(),
            child: Box::new(child),
        })
    }

    /// Inner join without a condition
    pub fn join(left: SqlAst, right: SqlAst) -> Self {
        SqlAst::Join(SqlJoin {
            left: Box::new(left),
            right: Box::new(right),
            on: None,
        })
    }

    /// Unqualified column of `table`
    pub fn column(table: &TableRef, name: impl Into<String>) -> Self {
        SqlAst::Column(SqlColumn {
            schema: None,
            table_alias: None,
            column_name: name.into(),
            table: TableRef::clone(table),
        })
    }

    /// Literal constant
    pub fn constant(value: Value) -> Self {
        SqlAst::Constant(SqlConst { value })
    }

    /// Bound parameter
    pub fn param(index: usize) -> Self {
        SqlAst::Parameter(SqlParameter { index })
    }

    /// Operation over children
    pub fn op(op_type: OperationType, children: Vec<SqlAst>) -> Self {
        SqlAst::Operation(SqlOperation::new(op_type, children))
    }

    /// `left AND right`
    pub fn and(left: SqlAst, right: SqlAst) -> Self {
        Self::op(OperationType::And, vec![left, right])
    }

    /// `left OR right`
    pub fn or(left: SqlAst, right: SqlAst) -> Self {
        Self::op(OperationType::Or, vec![left, right])
    }

    /// `left = right`
    pub fn eq(left: SqlAst, right: SqlAst) -> Self {
        Self::op(OperationType::Equal, vec![left, right])
    }

    /// `left <op> right` for any binary comparator
    pub fn cmp(op_type: OperationType, left: SqlAst, right: SqlAst) -> Self {
        Self::op(op_type, vec![left, right])
    }

    /// `left IN (values...)`
    pub fn in_list(left: SqlAst, values: Vec<SqlAst>) -> Self {
        let mut children = Vec::with_capacity(values.len() + 1);
        children.push(left);
        children.extend(values);
        Self::op(OperationType::In, children)
    }

    /// Operation kind, if this node is an operation
    pub fn operation_type(&self) -> Option<OperationType> {
        match self {
            SqlAst::Operation(op) => Some(op.op_type),
            _ => None,
        }
    }

    /// Returns the column if this node is a bare column reference
    pub fn as_column(&self) -> Option<&SqlColumn> {
        match self {
            SqlAst::Column(col) => Some(col),
            _ => None,
        }
    }
}

/// Single SELECT statement
#[derive(Debug, Clone)]
pub struct SqlSelect {
    pub from: Option<SqlAst>,
    pub where_clause: Option<SqlAst>,
}

impl SqlSelect {
    /// SELECT over `from` without a WHERE clause
    pub fn new(from: SqlAst) -> Self {
        Self {
            from: Some(from),
            where_clause: None,
        }
    }

    /// Sets the WHERE clause
    pub fn with_where(mut self, predicate: SqlAst) -> Self {
        self.where_clause = Some(predicate);
        self
    }
}

/// `left UNION [ALL] right`
#[derive(Debug, Clone)]
pub struct SqlUnion {
    pub left: Box<SqlQuery>,
    pub right: Box<SqlQuery>,
    pub all: bool,
}

/// Top-level query
#[derive(Debug, Clone)]
pub enum SqlQuery {
    Select(SqlSelect),
    Union(SqlUnion),
}

impl SqlQuery {
    /// `left UNION ALL right`
    pub fn union_all(left: SqlQuery, right: SqlQuery) -> Self {
        SqlQuery::Union(SqlUnion {
            left: Box::new(left),
            right: Box::new(right),
            all: true,
        })
    }
}

impl From<SqlSelect> for SqlQuery {
    fn from(select: SqlSelect) -> Self {
        SqlQuery::Select(select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TableInfo;
    use crate::sql::ColumnType;
    use serde_json::json;

    #[test]
    fn test_in_list_layout() {
        let table = TableInfo::builder("orders", "ORDERS")
            .column("ID", ColumnType::Long)
            .build_ref();
        let ast = SqlAst::in_list(
            SqlAst::column(&table, "ID"),
            vec![SqlAst::constant(json!(1)), SqlAst::param(0)],
        );

        let SqlAst::Operation(op) = ast else {
            panic!("expected operation");
        };
        assert_eq!(op.op_type, OperationType::In);
        assert_eq!(op.size(), 3);
        assert!(op.child(0).unwrap().as_column().is_some());
    }

    #[test]
    fn test_same_reference_ignores_table_handle() {
        let table = TableInfo::builder("orders", "ORDERS")
            .column("ID", ColumnType::Long)
            .build_ref();
        let a = SqlColumn {
            schema: Some("PUBLIC".into()),
            table_alias: Some("O".into()),
            column_name: "ID".into(),
            table: TableRef::clone(&table),
        };
        let mut b = a.clone();
        assert!(a.same_reference(&b));

        b.table_alias = Some("O2".into());
        assert!(!a.same_reference(&b));
    }

    #[test]
    fn test_bound_directions() {
        assert!(OperationType::Bigger.is_lower_bound());
        assert!(OperationType::SmallerEqual.is_upper_bound());
        assert!(!OperationType::Equal.is_lower_bound());
        assert!(!OperationType::Equal.is_upper_bound());
    }
}
