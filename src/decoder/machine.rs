//! Parsing State Machine
//!
//! `SchemaDecoder` consumes scan events and keeps exactly one [`Context`]
//! value describing where in the document it is. Staging records are
//! created on element openings and committed or discarded on the matching
//! close. Committed tables go into a [`TableArena`]; foreign keys become
//! [`PendingEdge`]s that are only resolved by [`SchemaDecoder::finish`].
//!
//! A decoder is single-use: one value per parse.

use std::mem;

use tracing::{debug, trace, warn};

use super::resolver::{self, PendingEdge, TableArena};
use super::staging::{ColumnStage, EndpointSlot, KeyStage, ReferenceStage, StagedColumn, TableStage};
use super::vocabulary::{classify_open, Field, Open};
use crate::error::{Entity, Error, Result};
use crate::options::{IncompletePolicy, ParseOptions};
use crate::schema::{Column, ColumnType, ReferenceEnd, Schema, Table};
use crate::xml::{ScanHandler, Tag};

/// Where the decoder currently is
#[derive(Debug, Default)]
enum Context {
    #[default]
    Idle,
    Table(TableStage),
    Column(TableStage, ColumnStage),
    Key(TableStage, KeyStage),
    /// Inside `c:PrimaryKey`, opened at the given depth
    PrimaryKey(TableStage, usize),
    Reference(ReferenceStage),
    Endpoint(ReferenceStage, EndpointSlot),
    /// Inside a foreign object's subtree; `resume` is restored on its close
    Skipping { resume: Box<Context>, depth: usize },
}

impl Context {
    fn skip(self, depth: usize) -> Context {
        Context::Skipping {
            resume: Box::new(self),
            depth,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Context::Idle => "document",
            Context::Table(_) | Context::PrimaryKey(..) => "table",
            Context::Column(..) => "column",
            Context::Key(..) => "key",
            Context::Reference(_) | Context::Endpoint(..) => "reference",
            Context::Skipping { resume, .. } => resume.describe(),
        }
    }
}

/// Event-driven schema decoder
#[derive(Debug)]
pub struct SchemaDecoder {
    options: ParseOptions,
    context: Context,
    depth: usize,
    arena: TableArena,
    edges: Vec<PendingEdge>,
}

impl SchemaDecoder {
    /// Create a decoder with default (lenient) options
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    /// Create a decoder for one parse with the given options
    pub fn with_options(options: ParseOptions) -> Self {
        SchemaDecoder {
            options,
            context: Context::Idle,
            depth: 0,
            arena: TableArena::default(),
            edges: Vec::new(),
        }
    }

    /// Resolve pending foreign keys and return the finished graph
    ///
    /// Fails if the event stream ended inside an open entity.
    pub fn finish(self) -> Result<Schema> {
        if !matches!(self.context, Context::Idle) || self.depth != 0 {
            return Err(Error::malformed(
                format!("document ended inside an open {}", self.context.describe()),
                0,
            ));
        }
        resolver::resolve(self.arena, &self.edges)
    }

    fn open(context: Context, open: Open<'_>, depth: usize) -> Context {
        match (context, open) {
            (Context::Idle, Open::TableDefinition { id }) => Context::Table(TableStage::new(id, depth)),
            (Context::Idle, Open::ReferenceDefinition { id }) => {
                Context::Reference(ReferenceStage::new(id, depth))
            }
            (Context::Idle, _) => Context::Idle,

            (Context::Table(mut table), Open::Field(field)) => {
                table.fields.open(field, depth);
                Context::Table(table)
            }
            (Context::Table(table), Open::ColumnDefinition { id }) => {
                Context::Column(table, ColumnStage::new(id, depth))
            }
            (Context::Table(table), Open::KeyDefinition { id }) => Context::Key(table, KeyStage::new(id, depth)),
            (Context::Table(table), Open::PrimaryKey) => Context::PrimaryKey(table, depth),
            (Context::Table(table), Open::Other) => Context::Table(table),

            (Context::Column(table, mut column), Open::Field(field)) => {
                column.fields.open(field, depth);
                Context::Column(table, column)
            }
            (Context::Column(table, column), Open::Other) => Context::Column(table, column),

            (Context::Key(table, mut key), Open::ColumnReference { id }) => {
                key.columns.push(id.to_string());
                Context::Key(table, key)
            }
            (Context::Key(table, key), Open::Field(_) | Open::Other) => Context::Key(table, key),

            (Context::PrimaryKey(mut table, at), Open::KeyReference { id }) => {
                table.primary_key = Some(id.to_string());
                Context::PrimaryKey(table, at)
            }
            (context @ Context::PrimaryKey(..), _) => context,

            (Context::Reference(reference), Open::ParentTable) => {
                Context::Endpoint(reference, EndpointSlot::new(ReferenceEnd::Parent, depth))
            }
            (Context::Reference(reference), Open::ChildTable) => {
                Context::Endpoint(reference, EndpointSlot::new(ReferenceEnd::Child, depth))
            }
            (Context::Reference(reference), Open::Field(_) | Open::Other) => Context::Reference(reference),

            (Context::Endpoint(reference, mut slot), Open::TableReference { id }) => {
                slot.table = Some(id.to_string());
                Context::Endpoint(reference, slot)
            }
            (context @ Context::Endpoint(..), _) => context,

            (context @ Context::Skipping { .. }, _) => context,

            // Foreign objects and misplaced definitions inside a staged entity
            (context, _) => context.skip(depth),
        }
    }

    fn close(&mut self, context: Context, depth: usize) -> Result<Context> {
        let next = match context {
            Context::Skipping { resume, depth: at } if at == depth => *resume,

            Context::Table(table) if table.depth == depth => {
                self.commit_table(table)?;
                Context::Idle
            }
            Context::Table(mut table) => {
                table.fields.close(depth);
                Context::Table(table)
            }

            Context::Column(mut table, column) if column.depth == depth => {
                self.commit_column(&mut table, column)?;
                Context::Table(table)
            }
            Context::Column(table, mut column) => {
                column.fields.close(depth);
                Context::Column(table, column)
            }

            Context::Key(mut table, key) if key.depth == depth => {
                table.keys.push(key);
                Context::Table(table)
            }
            Context::PrimaryKey(table, at) if at == depth => Context::Table(table),

            Context::Reference(reference) if reference.depth == depth => {
                self.commit_reference(reference)?;
                Context::Idle
            }
            Context::Endpoint(mut reference, slot) if slot.depth == depth => {
                reference.record(slot);
                Context::Reference(reference)
            }

            other => other,
        };
        Ok(next)
    }

    fn commit_column(&self, table: &mut TableStage, mut stage: ColumnStage) -> Result<()> {
        let Some(name) = stage.fields.take_trimmed(Field::Name) else {
            return self.incomplete(Entity::Column, stage.id.as_deref(), "name");
        };

        let declared = stage
            .fields
            .take_trimmed(Field::DataType)
            .map(|text| ColumnType::parse_declared(&text).map_err(|e| e.on_column(&name)))
            .transpose()?;
        let length = parse_number(&name, "length", stage.fields.take_trimmed(Field::Length))?;
        let precision = parse_number(&name, "precision", stage.fields.take_trimmed(Field::Precision))?;
        let not_null = stage
            .fields
            .take_trimmed(Field::Mandatory)
            .is_some_and(|flag| flag == "1" || flag.eq_ignore_ascii_case("true"));

        let column = Column {
            code: stage.fields.take_trimmed(Field::Code),
            col_type: declared.map(|d| d.col_type),
            col_length: length.or(declared.and_then(|d| d.length)),
            col_precision: precision.or(declared.and_then(|d| d.precision)),
            pk: false,
            not_null,
            comment: stage.fields.take(Field::Comment).filter(|c| !c.is_empty()),
            name,
        };

        trace!(table = %table.id, column = %column.name, col_type = ?column.col_type, "column committed");
        table.columns.push(StagedColumn {
            id: stage.id,
            column,
        });
        Ok(())
    }

    fn commit_table(&mut self, mut stage: TableStage) -> Result<()> {
        let Some(code) = stage.fields.take_trimmed(Field::Code) else {
            return self.incomplete(Entity::Table, Some(stage.id.as_str()), "code");
        };

        if let Some(key_id) = stage.primary_key.take() {
            if !stage.apply_primary_key(&key_id) {
                warn!(table = %code, key = %key_id, "primary key names an unknown key");
            }
        }

        let table = Table {
            name: stage.fields.take_trimmed(Field::Name),
            code,
            comment: stage.fields.take(Field::Comment).filter(|c| !c.is_empty()),
            columns: stage.columns.into_iter().map(|staged| staged.column).collect(),
            refs: Vec::new(),
        };

        debug!(id = %stage.id, code = %table.code, columns = table.columns.len(), "table committed");
        self.arena.insert(stage.id, table)?;
        Ok(())
    }

    fn commit_reference(&mut self, stage: ReferenceStage) -> Result<()> {
        match (stage.child, stage.parent) {
            (Some(child), Some(parent)) => {
                trace!(%child, %parent, "pending edge");
                self.edges.push(PendingEdge { child, parent });
                Ok(())
            }
            (child, _) => {
                let missing = if child.is_none() { "child" } else { "parent" };
                self.incomplete(Entity::Reference, stage.id.as_deref(), missing)
            }
        }
    }

    /// Apply the configured policy to an entity lacking a required field
    fn incomplete(&self, entity: Entity, id: Option<&str>, field: &'static str) -> Result<()> {
        match self.options.incomplete {
            IncompletePolicy::Drop => {
                warn!(%entity, id = id.unwrap_or("<anonymous>"), field, "dropping incomplete entity");
                Ok(())
            }
            IncompletePolicy::Reject => Err(Error::MissingField {
                entity,
                id: id.unwrap_or("<anonymous>").to_string(),
                field,
            }),
        }
    }
}

fn parse_number(column: &str, field: &'static str, value: Option<String>) -> Result<Option<u32>> {
    value
        .map(|text| {
            text.parse::<u32>().map_err(|_| Error::InvalidNumber {
                column: column.to_string(),
                field,
                value: text.clone(),
            })
        })
        .transpose()
}

impl Default for SchemaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanHandler for SchemaDecoder {
    fn start_element(&mut self, tag: &Tag<'_>) -> Result<()> {
        self.depth += 1;
        let context = mem::take(&mut self.context);
        self.context = Self::open(context, classify_open(tag), self.depth);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::malformed(format!("unexpected closing tag </{name}>"), 0));
        }
        let context = mem::take(&mut self.context);
        self.context = self.close(context, self.depth)?;
        self.depth -= 1;
        Ok(())
    }

    fn text(&mut self, content: &str) -> Result<()> {
        match &mut self.context {
            Context::Table(table) => table.fields.text(self.depth, content),
            Context::Column(_, column) => column.fields.text(self.depth, content),
            _ => {}
        }
        Ok(())
    }
}
