//! Schema output types and the column type catalog

pub mod catalog;
pub mod model;

pub use catalog::{canonical_name_for, ColumnType, DeclaredType, Length, TypeFamily, CATALOG};
pub use model::{Column, ReferenceEnd, Schema, Table, TableIndex};
