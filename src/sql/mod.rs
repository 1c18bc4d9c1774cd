//! SQL input model
//!
//! The already-parsed query AST and declared column types. No parsing or
//! grammar validation happens here.

mod ast;
mod types;

pub use ast::{
    OperationType, SqlAlias, SqlAst, SqlColumn, SqlConst, SqlFunction, SqlJoin, SqlOperation,
    SqlParameter, SqlQuery, SqlSelect, SqlTable, SqlUnion,
};
pub use types::ColumnType;
pub(crate) use types::to_i64;
