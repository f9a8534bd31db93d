//! Descriptor to SQL compilation.

use tracing::debug;

use super::descriptor::{Aggregation, Metric, QueryDescriptor};
use super::entity::Table;
use crate::sql::{
    avg, case_when, col, count_star, lit_float, lit_int, param, sum, Dialect, Expr, ExprExt,
    Literal, Query, SelectExpr,
};

/// Rows fetched for `data_points`.
pub const SAMPLE_LIMIT: u64 = 10;

/// SQL produced from a descriptor, ready to execute against one dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Executable SQL with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub params: Vec<Literal>,
    pub dialect: Dialect,
    pub table: Table,
    /// Whether a GROUP BY was emitted.
    pub grouped: bool,
    query: Query,
}

impl CompiledQuery {
    fn new(query: Query, dialect: Dialect, table: Table) -> Self {
        let tokens = query.to_tokens_for_dialect(dialect);
        Self {
            sql: tokens.serialize(dialect),
            params: tokens.params(),
            dialect,
            table,
            grouped: !query.group_by.is_empty(),
            query,
        }
    }

    /// The SQL with parameter values written inline. For display and
    /// logging only.
    pub fn inline_sql(&self) -> String {
        self.query.to_inline_sql(self.dialect)
    }
}

/// Compiles [`QueryDescriptor`]s for one dialect.
///
/// Compilation never fails: metric and aggregation names that do not
/// apply to the resolved table are left out of the SQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler {
    dialect: Dialect,
}

impl QueryCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Compile the descriptor's aggregate query.
    pub fn compile(&self, descriptor: &QueryDescriptor) -> CompiledQuery {
        let table = Table::resolve(&descriptor.entity);

        let mut select: Vec<SelectExpr> = descriptor
            .metrics()
            .iter()
            .filter_map(|metric| metric_expr(metric, &table))
            .collect();
        let has_aggregates = !select.is_empty();

        let group_column = group_column(&descriptor.aggregations, &table);
        if let Some(column) = group_column {
            select.insert(0, SelectExpr::new(col(column)));
        }

        let mut query = Query::new().select(select).from(table.name());
        for condition in predicates(descriptor) {
            query = query.filter(condition);
        }

        match group_column {
            Some(column) => query = query.group_by(vec![col(column)]),
            // An ungrouped aggregate always yields one row; require at least
            // one matching row so an empty match reads as an empty result.
            None if has_aggregates => query = query.having(count_star().gt(lit_int(0))),
            None => {}
        }

        let compiled = CompiledQuery::new(query, self.dialect, table);
        debug!(dialect = %self.dialect, sql = %compiled.inline_sql(), "compiled descriptor");
        compiled
    }

    /// Compile the sample-rows query: every column of the resolved table,
    /// capped at `limit` rows. Filters and the time range do not apply.
    pub fn sample(&self, descriptor: &QueryDescriptor, limit: u64) -> CompiledQuery {
        let table = Table::resolve(&descriptor.entity);
        let query = Query::new().from(table.name()).limit(limit);
        CompiledQuery::new(query, self.dialect, table)
    }
}

/// Compile a descriptor for a dialect.
pub fn compile(descriptor: &QueryDescriptor, dialect: Dialect) -> CompiledQuery {
    QueryCompiler::new(dialect).compile(descriptor)
}

fn metric_expr(metric: &Metric, table: &Table) -> Option<SelectExpr> {
    let (expr, alias) = match metric {
        Metric::Count => (count_star(), "total_count"),
        Metric::Sum => (sum(col("amount")), "total_amount"),
        Metric::Average => (avg(col("amount")), "average_amount"),
        Metric::DefaultRate if *table == Table::Loans => (default_rate(), "default_rate"),
        Metric::DefaultRate | Metric::Other(_) => return None,
    };
    Some(SelectExpr::new(expr).with_alias(alias))
}

/// Percentage of rows with `status = 'default'`.
fn default_rate() -> Expr {
    sum(case_when(col("status").eq("default"), lit_int(1), lit_int(0)))
        .mul(lit_float(100.0))
        .div(count_star())
}

fn group_column(aggregations: &[Aggregation], table: &Table) -> Option<&'static str> {
    if aggregations.contains(&Aggregation::ByCategory) && *table == Table::Loans {
        Some("loan_type")
    } else if aggregations.contains(&Aggregation::ByType) && *table == Table::Deposits {
        Some("account_type")
    } else {
        None
    }
}

/// WHERE predicates: one equality per filter, then the date range.
fn predicates(descriptor: &QueryDescriptor) -> Vec<Expr> {
    let mut conditions: Vec<Expr> = descriptor
        .filters
        .iter()
        .map(|(column, value)| col(column).eq(param(value.into())))
        .collect();

    if let Some((start, end)) = descriptor.time_period.as_ref().and_then(|tp| tp.bounds()) {
        conditions.push(col("date").gte(param(start.into())));
        conditions.push(col("date").lte(param(end.into())));
    }

    conditions
}
