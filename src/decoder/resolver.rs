//! Reference Resolver
//!
//! Committed tables are stored in an id-keyed arena during the pass; foreign
//! keys are recorded as pending edges. `resolve` runs once at end of
//! document and turns every edge into a `TableIndex` on the child table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::{ReferenceEnd, Schema, Table, TableIndex};

/// Parse-scoped table storage with document-id lookup
#[derive(Debug, Default)]
pub(crate) struct TableArena {
    tables: Vec<Table>,
    ids: HashMap<String, TableIndex>,
}

impl TableArena {
    pub fn insert(&mut self, id: String, table: Table) -> Result<TableIndex> {
        match self.ids.entry(id) {
            Entry::Occupied(entry) => Err(Error::DuplicateTableId {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let index = TableIndex(self.tables.len());
                self.tables.push(table);
                entry.insert(index);
                Ok(index)
            }
        }
    }

    fn lookup(&self, id: &str, end: ReferenceEnd) -> Result<TableIndex> {
        self.ids
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnresolvedReference {
                id: id.to_string(),
                end,
            })
    }
}

/// A declared foreign key awaiting resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingEdge {
    pub child: String,
    pub parent: String,
}

/// Resolve all pending edges and seal the arena into a `Schema`
///
/// Every edge is looked up before any table is touched, so a failure leaves
/// no table with partially populated refs.
pub(crate) fn resolve(arena: TableArena, edges: &[PendingEdge]) -> Result<Schema> {
    let resolved = edges
        .iter()
        .map(|edge| {
            let child = arena.lookup(&edge.child, ReferenceEnd::Child)?;
            let parent = arena.lookup(&edge.parent, ReferenceEnd::Parent)?;
            Ok((child, parent))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tables = arena.tables;
    for (child, parent) in resolved {
        tables[child.0].refs.push(parent);
    }

    debug!(tables = tables.len(), edges = edges.len(), "references resolved");
    Ok(Schema::new(tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena(codes: &[(&str, &str)]) -> TableArena {
        let mut arena = TableArena::default();
        for &(id, code) in codes {
            let table = Table {
                code: code.into(),
                ..Table::default()
            };
            arena.insert(id.into(), table).unwrap();
        }
        arena
    }

    fn edge(child: &str, parent: &str) -> PendingEdge {
        PendingEdge {
            child: child.into(),
            parent: parent.into(),
        }
    }

    #[test]
    fn test_resolves_in_declaration_order() {
        let arena = arena(&[("o1", "a"), ("o2", "b"), ("o3", "c")]);
        let schema = resolve(arena, &[edge("o3", "o2"), edge("o3", "o1"), edge("o2", "o1")]).unwrap();

        let c = schema.find_by_code("c").unwrap();
        let targets: Vec<&str> = schema.refs_of(c).map(|t| t.code.as_str()).collect();
        assert_eq!(targets, vec!["b", "a"]);
        assert_eq!(schema.find_by_code("b").unwrap().refs(), &[TableIndex(0)]);
        assert!(schema.find_by_code("a").unwrap().refs().is_empty());
    }

    #[test]
    fn test_unknown_child() {
        let arena = arena(&[("o1", "a")]);
        match resolve(arena, &[edge("o9", "o1")]) {
            Err(Error::UnresolvedReference { id, end }) => {
                assert_eq!(id, "o9");
                assert_eq!(end, ReferenceEnd::Child);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_parent() {
        let arena = arena(&[("o1", "a")]);
        assert!(matches!(
            resolve(arena, &[edge("o1", "o8")]),
            Err(Error::UnresolvedReference { end: ReferenceEnd::Parent, .. })
        ));
    }

    #[test]
    fn test_duplicate_id() {
        let mut arena = arena(&[("o1", "a")]);
        let err = arena.insert("o1".into(), Table::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateTableId { id } if id == "o1"));
        assert_eq!(resolve(arena, &[]).unwrap().len(), 1);
    }
}
