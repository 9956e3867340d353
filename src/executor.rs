//! SQL execution with dialect-aware adaptation and result formatting
//!
//! Two engines sit behind one [`Database`] handle: an in-memory DuckDB
//! instance for development (seeded with a small fixed schema) and a
//! PostgreSQL pool for production. Every failure is caught at this boundary
//! and rendered as text; execution never propagates an error to the caller.

use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio_postgres::types::Type;
use tokio_postgres::NoTls;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::schema::{ColumnDescriptor, SchemaDescription, TableDescriptor};

const VALUE_DELIMITER: &str = " | ";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to build connection pool: {0}")]
    Pool(#[from] deadpool_postgres::BuildError),

    #[error("connection checkout failed: {0}")]
    Checkout(String),

    #[error("background task failed: {0}")]
    Task(String),
}

/// Engine classification derived from the connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    DevelopmentInMemory,
    Production,
}

impl Dialect {
    pub fn from_url(url: &str) -> Self {
        let lower = url.trim().to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Dialect::Production
        } else {
            Dialect::DevelopmentInMemory
        }
    }
}

/// Outcome of one statement, prior to rendering.
#[derive(Debug)]
pub enum ExecutionResult {
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    EmptyRows {
        columns: Vec<String>,
        sql: String,
    },
    AffectedCount {
        keyword: String,
        count: u64,
        sql: String,
    },
    Error {
        unknown_identifier: bool,
        message: String,
        sql: String,
    },
}

impl ExecutionResult {
    pub fn render(&self) -> String {
        match self {
            ExecutionResult::Rows { columns, rows } => {
                let mut lines = vec![columns.join(VALUE_DELIMITER)];
                for row in rows {
                    lines.push(row.join(VALUE_DELIMITER));
                }
                lines.join("\n")
            }
            ExecutionResult::EmptyRows { columns, sql } => format!(
                "{}\nLa consulta SQL se ejecutó correctamente pero no devolvió resultados.\nConsulta: {}",
                columns.join(VALUE_DELIMITER),
                sql
            ),
            ExecutionResult::AffectedCount { keyword, count, sql } => format!(
                "Operación SQL ({keyword}) exitosa. Filas afectadas: {count}.\nConsulta: {sql}"
            ),
            ExecutionResult::Error {
                unknown_identifier: true,
                sql,
                ..
            } => format!(
                "Error: La consulta hace referencia a una tabla o columna inexistente. \
                 Por favor, revisa la pregunta o usa solo las tablas y columnas disponibles.\n\
                 Consulta problemática: {sql}"
            ),
            ExecutionResult::Error { message, sql, .. } => format!(
                "Error al ejecutar la consulta SQL: {message}\nConsulta problemática: {sql}"
            ),
        }
    }
}

/// Live database handle. Connections are acquired per statement and released
/// on every exit path; each statement auto-commits.
pub enum Database {
    Memory { conn: Arc<Mutex<duckdb::Connection>> },
    Postgres { pool: Pool },
}

impl Database {
    pub fn connect(cfg: &DatabaseConfig) -> Result<Self, DatabaseError> {
        match Dialect::from_url(&cfg.url) {
            Dialect::DevelopmentInMemory => {
                let conn = duckdb::Connection::open_in_memory()?;
                Ok(Database::Memory {
                    conn: Arc::new(Mutex::new(conn)),
                })
            }
            Dialect::Production => {
                let pg_config = tokio_postgres::Config::from_str(&cfg.url)?;
                let manager = Manager::from_config(
                    pg_config,
                    NoTls,
                    ManagerConfig {
                        recycling_method: RecyclingMethod::Fast,
                    },
                );
                let pool = Pool::builder(manager).max_size(cfg.pool_size).build()?;
                Ok(Database::Postgres { pool })
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Database::Memory { .. } => Dialect::DevelopmentInMemory,
            Database::Postgres { .. } => Dialect::Production,
        }
    }

    /// Execute one statement and format the outcome as text.
    pub async fn execute(&self, sql: &str) -> String {
        self.run(sql).await.render()
    }

    async fn run(&self, sql: &str) -> ExecutionResult {
        debug!(sql, dialect = ?self.dialect(), "executing statement");
        match self {
            Database::Memory { conn } => {
                let conn = Arc::clone(conn);
                let owned = sql.to_string();
                match tokio::task::spawn_blocking(move || run_memory(&conn, &owned)).await {
                    Ok(result) => result,
                    Err(e) => ExecutionResult::Error {
                        unknown_identifier: false,
                        message: e.to_string(),
                        sql: sql.to_string(),
                    },
                }
            }
            Database::Postgres { pool } => run_postgres(pool, sql).await,
        }
    }

    /// Read table and column metadata from the engine's catalog.
    pub async fn introspect(&self) -> Result<SchemaDescription, DatabaseError> {
        match self {
            Database::Memory { conn } => {
                let conn = Arc::clone(conn);
                tokio::task::spawn_blocking(move || introspect_memory(&conn))
                    .await
                    .map_err(|e| DatabaseError::Task(e.to_string()))?
            }
            Database::Postgres { pool } => {
                let client = pool
                    .get()
                    .await
                    .map_err(|e| DatabaseError::Checkout(e.to_string()))?;
                let rows = client
                    .query(
                        "SELECT table_name, column_name, data_type \
                         FROM information_schema.columns \
                         WHERE table_schema = 'public' \
                         ORDER BY table_name, ordinal_position",
                        &[],
                    )
                    .await?;
                Ok(group_columns(rows.iter().map(|r| {
                    (
                        r.get::<_, String>(0),
                        r.get::<_, String>(1),
                        r.get::<_, String>(2),
                    )
                })))
            }
        }
    }
}

fn is_query(sql: &str) -> bool {
    let upper = sql.trim_start().to_uppercase();
    ["SELECT", "WITH", "SHOW", "EXPLAIN", "DESCRIBE"]
        .iter()
        .any(|kw| upper.starts_with(kw))
}

fn statement_keyword(sql: &str) -> String {
    sql.trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("SQL")
        .to_uppercase()
}

// ---------------------------------------------------------------------------
// Development in-memory engine (DuckDB)
// ---------------------------------------------------------------------------

fn run_memory(conn: &Mutex<duckdb::Connection>, sql: &str) -> ExecutionResult {
    let guard = match conn.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Err(e) = seed_dev_schema(&guard) {
        warn!(error = %e, "development seed failed");
    }
    let adapted = adapt_for_memory(sql);
    if adapted != sql {
        debug!(original = sql, adapted = %adapted, "adapted SQL for in-memory engine");
    }
    if is_query(&adapted) {
        run_memory_query(&guard, &adapted)
    } else {
        run_memory_update(&guard, &adapted)
    }
}

fn run_memory_query(conn: &duckdb::Connection, sql: &str) -> ExecutionResult {
    let mut stmt = match conn.prepare(sql) {
        Ok(s) => s,
        Err(e) => return classify_duckdb(&e, sql),
    };
    let mut rows = match stmt.query([]) {
        Ok(r) => r,
        Err(e) => return classify_duckdb(&e, sql),
    };
    let columns: Vec<String> = rows
        .as_ref()
        .map(|s| s.column_names())
        .unwrap_or_default();

    let mut formatted = Vec::new();
    loop {
        match rows.next() {
            Ok(Some(row)) => {
                let mut line = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    line.push(duckdb_cell(row, idx));
                }
                formatted.push(line);
            }
            Ok(None) => break,
            Err(e) => return classify_duckdb(&e, sql),
        }
    }

    if formatted.is_empty() {
        ExecutionResult::EmptyRows {
            columns,
            sql: sql.to_string(),
        }
    } else {
        ExecutionResult::Rows {
            columns,
            rows: formatted,
        }
    }
}

fn run_memory_update(conn: &duckdb::Connection, sql: &str) -> ExecutionResult {
    match conn.execute(sql, []) {
        Ok(affected) => ExecutionResult::AffectedCount {
            keyword: statement_keyword(sql),
            count: affected as u64,
            sql: sql.to_string(),
        },
        Err(e) => classify_duckdb(&e, sql),
    }
}

fn classify_duckdb(err: &duckdb::Error, sql: &str) -> ExecutionResult {
    let message = err.to_string();
    let lower = message.to_lowercase();
    let unknown = lower.contains("does not exist")
        || lower.contains("catalog error")
        || (lower.contains("referenced column") && lower.contains("not found"));
    ExecutionResult::Error {
        unknown_identifier: unknown,
        message,
        sql: sql.to_string(),
    }
}

fn duckdb_cell(row: &duckdb::Row, idx: usize) -> String {
    use duckdb::types::ValueRef;

    match row.get_ref(idx) {
        Err(e) => format!("<error: {e}>"),
        Ok(ValueRef::Null) => "NULL".to_string(),
        Ok(ValueRef::Boolean(b)) => b.to_string(),
        Ok(ValueRef::TinyInt(i)) => i.to_string(),
        Ok(ValueRef::SmallInt(i)) => i.to_string(),
        Ok(ValueRef::Int(i)) => i.to_string(),
        Ok(ValueRef::BigInt(i)) => i.to_string(),
        Ok(ValueRef::HugeInt(i)) => i.to_string(),
        Ok(ValueRef::UTinyInt(i)) => i.to_string(),
        Ok(ValueRef::USmallInt(i)) => i.to_string(),
        Ok(ValueRef::UInt(i)) => i.to_string(),
        Ok(ValueRef::UBigInt(i)) => i.to_string(),
        Ok(ValueRef::Float(f)) => f.to_string(),
        Ok(ValueRef::Double(f)) => f.to_string(),
        Ok(ValueRef::Decimal(d)) => d.to_string(),
        Ok(ValueRef::Text(s)) => String::from_utf8_lossy(s).to_string(),
        Ok(ValueRef::Blob(b)) => format!("<blob {} bytes>", b.len()),
        Ok(ValueRef::Date32(days)) => format_date32(days),
        Ok(ValueRef::Timestamp(unit, v)) => format_timestamp(unit, v),
        Ok(_) => "<unsupported>".to_string(),
    }
}

fn format_date32(days: i32) -> String {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|epoch| epoch.checked_add_signed(ChronoDuration::days(days as i64)))
        .map(|d| d.to_string())
        .unwrap_or_else(|| days.to_string())
}

fn format_timestamp(unit: duckdb::types::TimeUnit, value: i64) -> String {
    use duckdb::types::TimeUnit;

    let micros = match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    };
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc().to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Rewrite SQL constructs the in-memory engine does not share with the
/// production dialect the statements are generated for.
pub fn adapt_for_memory(sql: &str) -> String {
    static REWRITES: OnceLock<(Regex, Regex, Regex)> = OnceLock::new();
    let (date_sub, curdate, date_part) = REWRITES.get_or_init(|| {
        (
            Regex::new(r"(?i)\bDATE_SUB\(\s*([^,]+?)\s*,\s*INTERVAL\s+(\d+)\s+(\w+)\s*\)")
                .expect("static pattern"),
            Regex::new(r"(?i)\bCURDATE\(\)").expect("static pattern"),
            Regex::new(r"(?i)\b(MONTH|YEAR|QUARTER)\(([^()]+)\)").expect("static pattern"),
        )
    });

    // DATE_SUB first: its argument usually contains CURDATE().
    let sql = date_sub.replace_all(sql, "($1 - INTERVAL $2 $3)");
    let sql = curdate.replace_all(&sql, "CURRENT_DATE");
    let sql = date_part.replace_all(&sql, "EXTRACT($1 FROM $2)");
    sql.to_string()
}

/// Create the development tables and insert seed rows when empty. Safe to
/// call before every statement; creation and inserts are both guarded.
fn seed_dev_schema(conn: &duckdb::Connection) -> duckdb::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS employees (
             id INTEGER PRIMARY KEY,
             name VARCHAR,
             position VARCHAR,
             salary DOUBLE,
             hire_date DATE);
         CREATE TABLE IF NOT EXISTS documents (
             id INTEGER PRIMARY KEY,
             type VARCHAR,
             document_number VARCHAR,
             date DATE,
             contact_id INTEGER,
             total_amount DOUBLE);
         CREATE TABLE IF NOT EXISTS contacts (
             id INTEGER PRIMARY KEY,
             name VARCHAR,
             email VARCHAR,
             phone VARCHAR,
             address VARCHAR);",
    )?;

    let employees: i64 = conn.query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))?;
    if employees == 0 {
        conn.execute_batch(
            "INSERT INTO employees VALUES
                 (1, 'Juan Pérez', 'Gerente', 5000.00, DATE '2020-01-15'),
                 (2, 'María López', 'Desarrollador', 3500.00, DATE '2021-03-10'),
                 (3, 'Carlos Rodríguez', 'Analista', 3200.00, DATE '2019-11-05'),
                 (4, 'Ana Gómez', 'Diseñador', 2800.00, DATE '2022-02-20'),
                 (5, 'Pedro Martínez', 'Vendedor', 2500.00, DATE '2021-07-30'),
                 (6, 'Laura Sánchez', 'Recursos Humanos', 3000.00, DATE '2020-05-12'),
                 (7, 'Roberto Díaz', 'Contador', 3800.00, DATE '2019-09-18'),
                 (8, 'Sofía Hernández', 'Marketing', 3200.00, DATE '2021-01-25'),
                 (9, 'Miguel Torres', 'Soporte Técnico', 2700.00, DATE '2022-04-05'),
                 (10, 'Carmen Flores', 'Administrativo', 2600.00, DATE '2020-11-22');",
        )?;
    }

    let documents: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
    if documents == 0 {
        conn.execute_batch(
            "INSERT INTO documents VALUES
                 (1, 'invoice', 'INV-001', DATE '2023-01-15', 1, 1500.00),
                 (2, 'invoice', 'INV-002', DATE '2023-01-20', 2, 2300.50),
                 (3, 'invoice', 'INV-003', DATE '2023-02-05', 1, 1800.75),
                 (4, 'invoice', 'INV-004', DATE '2023-02-18', 3, 950.25),
                 (5, 'invoice', 'INV-005', DATE '2023-03-10', 2, 3200.00);",
        )?;
    }

    let contacts: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?;
    if contacts == 0 {
        conn.execute_batch(
            "INSERT INTO contacts VALUES
                 (1, 'Empresa ABC', 'contacto@abc.com', '555-1234', 'Calle Principal 123'),
                 (2, 'Distribuidora XYZ', 'ventas@xyz.com', '555-5678', 'Av. Central 456'),
                 (3, 'Servicios Técnicos', 'info@serv-tec.com', '555-9012', 'Plaza Mayor 789');",
        )?;
    }

    Ok(())
}

fn introspect_memory(conn: &Mutex<duckdb::Connection>) -> Result<SchemaDescription, DatabaseError> {
    let guard = match conn.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    // The development context should describe the seeded tables.
    seed_dev_schema(&guard)?;

    let mut stmt = guard.prepare(
        "SELECT table_name, column_name, data_type \
         FROM information_schema.columns \
         WHERE table_schema = 'main' \
         ORDER BY table_name, ordinal_position",
    )?;
    let mut rows = stmt.query([])?;
    let mut triples = Vec::new();
    while let Some(row) = rows.next()? {
        triples.push((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ));
    }
    Ok(group_columns(triples.into_iter()))
}

fn group_columns<I>(rows: I) -> SchemaDescription
where
    I: Iterator<Item = (String, String, String)>,
{
    let mut tables: Vec<TableDescriptor> = Vec::new();
    for (table, column, declared_type) in rows {
        let descriptor = ColumnDescriptor {
            name: column,
            declared_type,
        };
        match tables.last_mut() {
            Some(t) if t.name == table => t.columns.push(descriptor),
            _ => tables.push(TableDescriptor {
                name: table,
                columns: vec![descriptor],
            }),
        }
    }
    SchemaDescription { tables }
}

// ---------------------------------------------------------------------------
// Production engine (PostgreSQL)
// ---------------------------------------------------------------------------

async fn run_postgres(pool: &Pool, sql: &str) -> ExecutionResult {
    let client = match pool.get().await {
        Ok(c) => c,
        Err(e) => {
            return ExecutionResult::Error {
                unknown_identifier: false,
                message: e.to_string(),
                sql: sql.to_string(),
            }
        }
    };

    // Preparing first makes column metadata available even for zero rows.
    let stmt = match client.prepare(sql).await {
        Ok(s) => s,
        Err(e) => return classify_postgres(&e, sql),
    };

    if is_query(sql) {
        match client.query(&stmt, &[]).await {
            Ok(rows) => {
                let columns: Vec<String> =
                    stmt.columns().iter().map(|c| c.name().to_string()).collect();
                if rows.is_empty() {
                    return ExecutionResult::EmptyRows {
                        columns,
                        sql: sql.to_string(),
                    };
                }
                let mut formatted = Vec::with_capacity(rows.len());
                for row in &rows {
                    let mut line = Vec::with_capacity(columns.len());
                    for (idx, col) in row.columns().iter().enumerate() {
                        line.push(pg_cell(row, idx, col.type_()));
                    }
                    formatted.push(line);
                }
                ExecutionResult::Rows {
                    columns,
                    rows: formatted,
                }
            }
            Err(e) => classify_postgres(&e, sql),
        }
    } else {
        match client.execute(&stmt, &[]).await {
            Ok(affected) => ExecutionResult::AffectedCount {
                keyword: statement_keyword(sql),
                count: affected,
                sql: sql.to_string(),
            },
            Err(e) => classify_postgres(&e, sql),
        }
    }
}

fn classify_postgres(err: &tokio_postgres::Error, sql: &str) -> ExecutionResult {
    // 42P01 undefined_table, 42703 undefined_column, 42704 undefined_object
    let unknown = err
        .as_db_error()
        .map(|db| matches!(db.code().code(), "42P01" | "42703" | "42704"))
        .unwrap_or(false);
    ExecutionResult::Error {
        unknown_identifier: unknown,
        message: err.to_string(),
        sql: sql.to_string(),
    }
}

/// SQL NULL renders as the literal `NULL`; a value the chosen Rust type
/// cannot decode renders as `<unsupported>` so it is never mistaken for a
/// real NULL.
fn format_cell<T: ToString, E>(value: Result<Option<T>, E>) -> String {
    match value {
        Ok(Some(v)) => v.to_string(),
        Ok(None) => "NULL".to_string(),
        Err(_) => "<unsupported>".to_string(),
    }
}

fn pg_cell(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> String {
    match *ty {
        Type::BOOL => format_cell(row.try_get::<_, Option<bool>>(idx)),
        Type::INT2 => format_cell(row.try_get::<_, Option<i16>>(idx)),
        Type::INT4 => format_cell(row.try_get::<_, Option<i32>>(idx)),
        Type::INT8 => format_cell(row.try_get::<_, Option<i64>>(idx)),
        Type::FLOAT4 => format_cell(row.try_get::<_, Option<f32>>(idx)),
        Type::FLOAT8 => format_cell(row.try_get::<_, Option<f64>>(idx)),
        // NUMERIC is not representable as f64 on the wire; rust_decimal
        // carries the exact value.
        Type::NUMERIC => format_cell(row.try_get::<_, Option<Decimal>>(idx)),
        Type::TEXT | Type::VARCHAR | Type::NAME | Type::CHAR | Type::BPCHAR => {
            format_cell(row.try_get::<_, Option<String>>(idx))
        }
        Type::DATE => format_cell(row.try_get::<_, Option<NaiveDate>>(idx)),
        Type::TIME => format_cell(row.try_get::<_, Option<NaiveTime>>(idx)),
        Type::TIMESTAMP => format_cell(row.try_get::<_, Option<NaiveDateTime>>(idx)),
        Type::TIMESTAMPTZ => format_cell(row.try_get::<_, Option<DateTime<Utc>>>(idx)),
        Type::JSON | Type::JSONB => {
            format_cell(row.try_get::<_, Option<serde_json::Value>>(idx))
        }
        _ => format_cell(row.try_get::<_, Option<String>>(idx)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn memory_db() -> Database {
        Database::connect(&DatabaseConfig {
            url: "duckdb::memory:".to_string(),
            pool_size: 4,
        })
        .expect("in-memory database")
    }

    #[test]
    fn test_dialect_detection() {
        assert_eq!(
            Dialect::from_url("postgres://user:pw@db.internal/erp"),
            Dialect::Production
        );
        assert_eq!(
            Dialect::from_url("postgresql://localhost/erp"),
            Dialect::Production
        );
        assert_eq!(
            Dialect::from_url("duckdb::memory:"),
            Dialect::DevelopmentInMemory
        );
    }

    #[test]
    fn test_adapt_month_function() {
        assert_eq!(
            adapt_for_memory("SELECT MONTH(date) FROM documents;"),
            "SELECT EXTRACT(MONTH FROM date) FROM documents;"
        );
    }

    #[test]
    fn test_adapt_date_sub_and_curdate() {
        let adapted =
            adapt_for_memory("SELECT * FROM documents WHERE date >= DATE_SUB(CURDATE(), INTERVAL 1 MONTH);");
        assert_eq!(
            adapted,
            "SELECT * FROM documents WHERE date >= (CURRENT_DATE - INTERVAL 1 MONTH);"
        );
    }

    #[test]
    fn test_adapt_leaves_extract_untouched() {
        let sql = "SELECT EXTRACT(MONTH FROM date) FROM documents;";
        assert_eq!(adapt_for_memory(sql), sql);
    }

    #[tokio::test]
    async fn test_seed_count_is_stable() {
        let db = memory_db();
        let first = db.execute("SELECT COUNT(*) FROM employees;").await;
        let second = db.execute("SELECT COUNT(*) FROM employees;").await;
        assert!(first.ends_with("10"), "unexpected output: {first}");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_select_formats_header_and_rows() {
        let db = memory_db();
        let out = db.execute("SELECT * FROM contacts;").await;
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("id | name | email | phone | address"));
        assert!(out.contains("Empresa ABC"));
        assert!(out.contains("contacto@abc.com"));
    }

    #[tokio::test]
    async fn test_empty_result_keeps_header() {
        let db = memory_db();
        let out = db.execute("SELECT * FROM employees WHERE id = 999;").await;
        assert!(out.starts_with("id | name | position | salary | hire_date"));
        assert!(out.contains("no devolvió resultados"));
    }

    #[tokio::test]
    async fn test_null_renders_as_literal() {
        let db = memory_db();
        let out = db.execute("SELECT NULL AS vacio;").await;
        assert!(out.contains("NULL"));
    }

    #[tokio::test]
    async fn test_update_reports_affected_count() {
        let db = memory_db();
        let out = db
            .execute("UPDATE employees SET salary = 5100.00 WHERE id = 1;")
            .await;
        assert!(out.contains("Operación SQL (UPDATE) exitosa. Filas afectadas: 1."));
    }

    #[tokio::test]
    async fn test_unknown_table_gets_advisory() {
        let db = memory_db();
        let out = db.execute("SELECT * FROM tabla_inexistente;").await;
        assert!(out.contains("tabla o columna inexistente"));
    }

    #[tokio::test]
    async fn test_generic_error_differs_from_advisory() {
        let db = memory_db();
        let advisory = db.execute("SELECT * FROM tabla_inexistente;").await;
        let generic = db.execute("SELECT FROM WHERE;").await;
        assert!(generic.contains("Error al ejecutar la consulta SQL"));
        assert_ne!(advisory.lines().next(), generic.lines().next());
    }

    #[tokio::test]
    async fn test_mutations_persist_across_statements() {
        let db = memory_db();
        db.execute("DELETE FROM contacts WHERE id = 3;").await;
        let out = db.execute("SELECT COUNT(*) FROM contacts;").await;
        assert!(out.ends_with("2"), "unexpected output: {out}");
    }

    #[test]
    fn test_cell_formatting_distinguishes_null_from_undecodable() {
        assert_eq!(format_cell::<i64, ()>(Ok(Some(42))), "42");
        assert_eq!(format_cell::<i64, ()>(Ok(None)), "NULL");
        assert_eq!(format_cell::<i64, ()>(Err(())), "<unsupported>");
    }

    #[test]
    fn test_numeric_cells_keep_exact_scale() {
        let amount = Decimal::new(123_456, 2);
        assert_eq!(format_cell::<Decimal, ()>(Ok(Some(amount))), "1234.56");
    }

    #[tokio::test]
    async fn test_introspection_lists_seeded_tables() {
        let db = memory_db();
        let schema = db.introspect().await.expect("introspection");
        let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"employees"));
        assert!(names.contains(&"documents"));
        assert!(names.contains(&"contacts"));
        let employees = schema
            .tables
            .iter()
            .find(|t| t.name == "employees")
            .unwrap();
        assert!(employees.columns.iter().any(|c| c.name == "salary"));
    }
}
