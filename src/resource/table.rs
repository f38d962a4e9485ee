//! SELECT / INSERT / UPDATE over one REST resource

use super::types::{ColumnFilter, ResourceSchema};
use crate::decode::extract_records;
use crate::engine::ApiTable;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::http::{ApiFacade, ApiRequest};
use crate::pagination::{NextPage, PaginationState, Paginator};
use crate::sql::{Constant, Expr, Insert, Operator, Select, Update};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// A remote collection addressable by id, queryable as a table
///
/// Only the subset of SQL the remote API can answer is supported: point
/// lookup and update by id, and full scans with an optional limit.
pub struct ResourceTable {
    schema: ResourceSchema,
    api: Arc<dyn ApiFacade>,
    paginator: Box<dyn Paginator>,
}

impl ResourceTable {
    pub fn new(schema: ResourceSchema, api: Arc<dyn ApiFacade>) -> Self {
        let paginator = schema.pagination.build();
        Self {
            schema,
            api,
            paginator,
        }
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Schema columns in canonical order, minus `ignore`
    pub fn get_columns(&self, ignore: Option<&ColumnFilter>) -> Vec<String> {
        self.schema
            .columns
            .iter()
            .filter(|c| ignore.map_or(true, |f| !f.contains(c)))
            .cloned()
            .collect()
    }

    /// Run a SELECT: direct fetch for `id = <value>`, otherwise a paged scan
    pub async fn select(&self, query: &Select) -> Result<Frame> {
        let columns = self.resolve_targets(&query.targets)?;

        let id = match &query.where_clause {
            Some(expr) => Some(self.id_predicate(expr).map_err(Error::unsupported_predicate)?),
            None => None,
        };

        if query.limit == Some(0) {
            return Ok(Frame::empty(columns));
        }

        let records = match id {
            Some(id) => self.fetch_one(&id).await?,
            None => self.fetch_all(query.limit).await?,
        };

        let mut frame = Frame::from_records(columns, &records);
        if let Some(limit) = query.limit {
            frame.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(frame)
    }

    /// Run an INSERT using the first value tuple only
    pub async fn insert(&self, query: &Insert) -> Result<()> {
        let row = query.values.first().map_or(&[][..], Vec::as_slice);
        if row.len() != query.columns.len() {
            return Err(Error::ValueCountMismatch {
                columns: query.columns.len(),
                values: row.len(),
            });
        }

        let mut data = Map::new();
        for (column, value) in query.columns.iter().zip(row) {
            let name = self.known_column(column.name())?;
            data.insert(name, constant_value(value)?);
        }

        info!("Creating record in {}", self.schema.name);
        self.api
            .call(ApiRequest::post(&self.schema.endpoint, Value::Object(data)))
            .await?;
        Ok(())
    }

    /// Run an UPDATE; the WHERE clause must be `id = <value>`
    pub async fn update(&self, query: &Update) -> Result<()> {
        let id = match &query.where_clause {
            Some(expr) => self.id_predicate(expr).map_err(Error::not_implemented)?,
            None => {
                return Err(Error::not_implemented(format!(
                    "UPDATE on {} requires WHERE {} = <value>",
                    self.schema.name, self.schema.id_column
                )))
            }
        };

        let mut data = Map::new();
        for (column, value) in &query.update_columns {
            let name = self.known_column(column)?;
            data.insert(name, constant_value(value)?);
        }

        info!("Updating record {} in {}", id, self.schema.name);
        self.api
            .call(ApiRequest::put(self.schema.record_endpoint(&id), Value::Object(data)))
            .await?;
        Ok(())
    }

    /// Expand `*` and validate named targets against the schema
    fn resolve_targets(&self, targets: &[Expr]) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        for target in targets {
            match target {
                Expr::Star => columns.extend(self.schema.columns.iter().cloned()),
                Expr::Identifier(ident) => columns.push(self.known_column(ident.name())?),
                other => {
                    return Err(Error::InvalidTarget {
                        target: other.to_string(),
                    })
                }
            }
        }
        Ok(columns)
    }

    fn known_column(&self, column: &str) -> Result<String> {
        if self.schema.has_column(column) {
            Ok(column.to_string())
        } else {
            Err(Error::unknown_column(&self.schema.name, column))
        }
    }

    /// Match `id = <constant>` (either side); anything else is described in the error
    fn id_predicate(&self, expr: &Expr) -> std::result::Result<Constant, String> {
        let Expr::BinaryOp { op, left, right } = expr else {
            return Err(format!("unsupported WHERE clause: {expr}"));
        };
        if *op != Operator::Eq {
            return Err(format!(
                "unsupported operator '{op}', only '{} = <value>' is supported",
                self.schema.id_column
            ));
        }

        let (ident, value) = match (left.as_ref(), right.as_ref()) {
            (Expr::Identifier(i), Expr::Constant(c)) | (Expr::Constant(c), Expr::Identifier(i)) => {
                (i, c)
            }
            _ => return Err(format!("unsupported WHERE clause: {expr}")),
        };

        if ident.name() != self.schema.id_column {
            return Err(format!(
                "only '{} = <value>' is supported, got {expr}",
                self.schema.id_column
            ));
        }
        Ok(value.clone())
    }

    async fn fetch_one(&self, id: &Constant) -> Result<Vec<Value>> {
        let endpoint = self.schema.record_endpoint(id);
        debug!("Fetching {endpoint}");

        match self.api.call(ApiRequest::get(endpoint)).await {
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(Value::Array(records)) => Ok(records.into_iter().take(1).collect()),
            Ok(record) => Ok(vec![record]),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Page through the collection until `limit` records or exhaustion
    async fn fetch_all(&self, limit: Option<u64>) -> Result<Vec<Value>> {
        let page_size = self.schema.page_size;
        let mut state = PaginationState::new();
        let mut params = self.paginator.first_params(page_size, &mut state);
        let mut next_url: Option<String> = None;
        let mut records: Vec<Value> = Vec::new();

        loop {
            let endpoint = next_url
                .take()
                .unwrap_or_else(|| self.schema.endpoint.clone());
            let body = self
                .api
                .call(ApiRequest::get(endpoint).with_params(params.clone()))
                .await?;

            let page = extract_records(&body, self.schema.records_path.as_deref())?;
            let count = page.len();
            records.extend(page);
            debug!(
                "{}: page {} returned {} records ({} total)",
                self.schema.name,
                state.page,
                count,
                records.len()
            );

            if limit.is_some_and(|l| records.len() as u64 >= l) {
                break;
            }

            match self.paginator.next_page(&body, count, page_size, &mut state) {
                NextPage::Continue { params: p, url } => {
                    params = p;
                    next_url = url;
                }
                NextPage::Done => break,
            }
        }

        Ok(records)
    }
}

impl std::fmt::Debug for ResourceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTable")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn constant_value(expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Constant(c) => Ok(c.to_json()),
        other => Err(Error::invalid_value(format!(
            "expected a literal value, got {other}"
        ))),
    }
}

#[async_trait]
impl ApiTable for ResourceTable {
    fn name(&self) -> &str {
        &self.schema.name
    }

    fn get_columns(&self, ignore: Option<&ColumnFilter>) -> Vec<String> {
        ResourceTable::get_columns(self, ignore)
    }

    async fn select(&self, query: &Select) -> Result<Frame> {
        ResourceTable::select(self, query).await
    }

    async fn insert(&self, query: &Insert) -> Result<()> {
        ResourceTable::insert(self, query).await
    }

    async fn update(&self, query: &Update) -> Result<()> {
        ResourceTable::update(self, query).await
    }
}
