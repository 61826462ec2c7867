use serde_json::Value;

use super::error::PageError;
use super::page_request::PageRequest;
use super::types::{PageEntity, SqlResult};

/// Exact-match filter on a known column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: &'static str,
    pub value: Value,
}

impl Condition {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self { column, value: value.into() }
    }
}

/// SQL for one page of an entity listing: a count query and a select query
/// sharing the same WHERE clause and bound parameters.
#[derive(Debug, Clone)]
pub struct PageQuery {
    table: &'static str,
    select: &'static str,
    conditions: Vec<String>,
    params: Vec<Value>,
    order: String,
    limit: u32,
    offset: u64,
}

impl PageQuery {
    /// Validates sort/search fields against `E`'s allow-lists and builds the
    /// query. Nothing is built when either field is rejected.
    pub fn build<E: PageEntity>(page: &PageRequest, filters: Vec<Condition>) -> Result<Self, PageError> {
        let sort_column = page.resolve_sort_field(E::SORTABLE)?;
        let search_column = page.resolve_search_field(E::SEARCHABLE)?;

        let mut query = Self {
            table: E::TABLE,
            select: E::SELECT,
            conditions: vec![],
            params: vec![],
            order: String::new(),
            limit: page.limit(),
            offset: page.offset(),
        };

        if E::SOFT_DELETE {
            query.conditions.push("\"deleted_at\" IS NULL".to_string());
        }

        for filter in filters {
            let placeholder = query.param(filter.value);
            query.conditions.push(format!("\"{}\" = {}", filter.column, placeholder));
        }

        if page.has_search() {
            let columns: Vec<&'static str> = match search_column {
                Some(column) => vec![column],
                None => E::SEARCHABLE.to_vec(),
            };
            if !columns.is_empty() {
                let pattern = format!("%{}%", escape_like(page.keyword()));
                let placeholder = query.param(Value::String(pattern));
                let predicates: Vec<String> = columns
                    .iter()
                    .map(|column| format!("\"{}\" ILIKE {} ESCAPE '\\'", column, placeholder))
                    .collect();
                if predicates.len() == 1 {
                    query.conditions.extend(predicates);
                } else {
                    query.conditions.push(format!("({})", predicates.join(" OR ")));
                }
            }
        }

        query.order = match sort_column {
            Some(column) => format!("\"{}\" {}", column, page.sort_order.to_sql()),
            None => E::DEFAULT_ORDER.to_string(),
        };

        Ok(query)
    }

    pub fn to_sql(&self) -> SqlResult {
        let query = [
            format!("SELECT {}", self.select),
            format!("FROM \"{}\"", self.table),
            self.where_clause(),
            format!("ORDER BY {}", self.order),
            format!("LIMIT {} OFFSET {}", self.limit, self.offset),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.params.clone() }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_clause = self.where_clause();
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" {}", self.table, where_clause)
        };
        SqlResult { query, params: self.params.clone() }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }
}

/// Keywords match literally: `%`, `_` and `\` lose their LIKE meaning.
fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
