//! Integration tests for descriptor → SQL compilation.
//!
//! These tests go through the public API only and check that the SQL
//! parses for its target dialect.

use sqlparser::dialect::{SQLiteDialect, SnowflakeDialect};
use sqlparser::parser::Parser;
use strata::compile::{compile, QueryCompiler, QueryDescriptor, TimePeriod, SAMPLE_LIMIT};
use strata::sql::{Dialect, Literal};

fn assert_parses(sql: &str, dialect: Dialect) {
    let result = match dialect {
        Dialect::Sqlite => Parser::parse_sql(&SQLiteDialect {}, sql),
        Dialect::Snowflake => Parser::parse_sql(&SnowflakeDialect {}, sql),
    };
    if let Err(e) = result {
        panic!("{} SQL failed to parse: {}\n{}", dialect, e, sql);
    }
}

// ============================================================================
// Metrics and filters
// ============================================================================

#[test]
fn test_count_default_loans_snowflake() {
    let descriptor = QueryDescriptor::from_json(
        r#"{"entity": "loans", "metrics": ["count"], "filters": {"status": "default"}}"#,
    )
    .unwrap();
    let compiled = compile(&descriptor, Dialect::Snowflake);

    insta::assert_snapshot!(compiled.sql, @r"
    SELECT
      COUNT(*) AS total_count
    FROM LOANS
    WHERE status = ?
    HAVING COUNT(*) > 0
    ");
    assert_eq!(compiled.params, vec![Literal::String("default".into())]);
    assert_parses(&compiled.sql, Dialect::Snowflake);
}

#[test]
fn test_count_default_loans_sqlite() {
    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .filter("status", "default");
    let compiled = compile(&descriptor, Dialect::Sqlite);

    assert!(compiled.sql.contains("COUNT(*) AS total_count"));
    assert!(compiled.sql.contains("FROM loans"));
    assert!(compiled
        .inline_sql()
        .contains("WHERE status = 'default'"));
    assert_parses(&compiled.sql, Dialect::Sqlite);
}

#[test]
fn test_all_loan_metrics() {
    let descriptor = QueryDescriptor::new("Loan")
        .metric("count")
        .metric("sum")
        .metric("average")
        .metric("default_rate");

    for dialect in [Dialect::Sqlite, Dialect::Snowflake] {
        let compiled = compile(&descriptor, dialect);
        assert!(compiled.sql.contains("SUM(amount) AS total_amount"));
        assert!(compiled.sql.contains("AVG(amount) AS average_amount"));
        assert!(compiled.sql.contains("AS default_rate"));
        assert_parses(&compiled.sql, dialect);
    }
}

#[test]
fn test_filter_values_never_inlined() {
    let descriptor = QueryDescriptor::new("customers")
        .metric("count")
        .filter("segment", "retail' OR '1'='1");
    let compiled = compile(&descriptor, Dialect::Sqlite);

    assert!(!compiled.sql.contains("retail"));
    assert_eq!(
        compiled.params,
        vec![Literal::String("retail' OR '1'='1".into())]
    );
    assert!(compiled.inline_sql().contains("'retail'' OR ''1''=''1'"));
}

#[test]
fn test_odd_filter_column_is_quoted() {
    let descriptor = QueryDescriptor::new("loans")
        .metric("count")
        .filter("loan type", "auto");
    let compiled = compile(&descriptor, Dialect::Sqlite);

    assert!(compiled.sql.contains("WHERE \"loan type\" = ?"), "{}", compiled.sql);
    assert_parses(&compiled.sql, Dialect::Sqlite);
}

#[test]
fn test_numeric_and_bool_filters_bind_typed() {
    let descriptor = QueryDescriptor::from_json(
        r#"{"entity": "customers", "filters": {"credit_score": 700, "active": true}}"#,
    )
    .unwrap();
    let compiled = compile(&descriptor, Dialect::Sqlite);

    // caller's key order
    assert_eq!(
        compiled.params,
        vec![Literal::Int(700), Literal::Bool(true)]
    );
    assert!(
        compiled.sql.contains("WHERE credit_score = ? AND active = ?"),
        "{}",
        compiled.sql
    );
}

// ============================================================================
// Aggregations
// ============================================================================

#[test]
fn test_by_category_groups_loans() {
    let descriptor = QueryDescriptor::from_json(
        r#"{"entity": "loans", "aggregations": ["by_category"]}"#,
    )
    .unwrap();
    let compiled = compile(&descriptor, Dialect::Sqlite);

    insta::assert_snapshot!(compiled.sql, @r"
    SELECT
      loan_type,
      COUNT(*) AS total_count
    FROM loans
    GROUP BY loan_type
    ");
    assert!(compiled.grouped);
    assert_parses(&compiled.sql, Dialect::Sqlite);
}

#[test]
fn test_by_type_groups_deposits_only() {
    let deposits = QueryDescriptor::new("deposits")
        .metric("count")
        .aggregation("by_type");
    let compiled = compile(&deposits, Dialect::Snowflake);
    assert!(compiled.sql.starts_with("SELECT\n  account_type,"));
    assert!(compiled.sql.contains("GROUP BY account_type"));

    let loans = QueryDescriptor::new("loans")
        .metric("count")
        .aggregation("by_type");
    assert!(!compile(&loans, Dialect::Snowflake).grouped);
}

// ============================================================================
// Time periods
// ============================================================================

#[test]
fn test_date_range_filters_and_binds() {
    let descriptor = QueryDescriptor::new("deposits")
        .metric("count")
        .time_period(TimePeriod::range("2024-01-01", "2024-03-31"));
    let compiled = QueryCompiler::new(Dialect::Snowflake).compile(&descriptor);

    assert!(compiled.sql.contains("WHERE date >= ? AND date <= ?"));
    assert_eq!(compiled.params.len(), 2);
    assert_parses(&compiled.sql, Dialect::Snowflake);
}

#[test]
fn test_half_open_range_does_not_filter() {
    let descriptor = QueryDescriptor::from_json(
        r#"{"entity": "deposits", "time_period": {"start": "2024-01-01"}}"#,
    )
    .unwrap();
    let compiled = compile(&descriptor, Dialect::Sqlite);
    assert!(!compiled.sql.contains("WHERE"));
}

// ============================================================================
// Sample rows
// ============================================================================

#[test]
fn test_sample_ignores_predicates() {
    let descriptor = QueryDescriptor::new("loans")
        .metric("sum")
        .filter("status", "current")
        .time_period(TimePeriod::range("2024-01-01", "2024-03-31"))
        .aggregation("by_category");
    let compiler = QueryCompiler::new(Dialect::Sqlite);

    let main = compiler.compile(&descriptor);
    let sample = compiler.sample(&descriptor, SAMPLE_LIMIT);

    assert_eq!(main.params.len(), 3);
    assert!(sample.params.is_empty());
    assert!(!sample.sql.contains("WHERE"), "{}", sample.sql);
    assert!(sample.sql.starts_with("SELECT *"));
    assert!(sample.sql.ends_with("LIMIT 10"));
    assert_parses(&sample.sql, Dialect::Sqlite);
}
