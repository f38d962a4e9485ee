//! Kinetica SQL passthrough
//!
//! Kinetica speaks the PostgreSQL wire protocol, so statements are forwarded
//! unchanged to a PostgreSQL-compatible backend. The default backend attaches
//! the server through DuckDB's postgres extension.

use crate::error::{Error, Result};
use crate::frame::Frame;
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub const HANDLER_NAME: &str = "kinetica";

/// Kind of value a connection argument takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Str,
    Int,
    /// Secret, masked in interfaces
    Pwd,
}

/// Description of one connection argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionArg {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub arg_type: ArgType,
    pub description: &'static str,
    pub required: bool,
    pub label: &'static str,
}

const CONNECTION_ARGS: [ConnectionArg; 7] = [
    ConnectionArg {
        name: "user",
        arg_type: ArgType::Str,
        description: "The user name used to authenticate with the Kinetica server.",
        required: true,
        label: "User",
    },
    ConnectionArg {
        name: "password",
        arg_type: ArgType::Pwd,
        description: "The password to authenticate the user with the Kinetica server.",
        required: true,
        label: "Password",
    },
    ConnectionArg {
        name: "database",
        arg_type: ArgType::Str,
        description: "The database name to use when connecting with the Kinetica server.",
        required: true,
        label: "Database",
    },
    ConnectionArg {
        name: "host",
        arg_type: ArgType::Str,
        description: "The host name or IP address of the Kinetica server. NOTE: use '127.0.0.1' instead of 'localhost' to connect to local server.",
        required: true,
        label: "Host",
    },
    ConnectionArg {
        name: "port",
        arg_type: ArgType::Int,
        description: "The TCP/IP port of the Kinetica server. Must be an integer.",
        required: true,
        label: "Port",
    },
    ConnectionArg {
        name: "schema",
        arg_type: ArgType::Str,
        description: "The schema in which objects are searched first.",
        required: false,
        label: "Schema",
    },
    ConnectionArg {
        name: "sslmode",
        arg_type: ArgType::Str,
        description: "sslmode that will be used for connection.",
        required: false,
        label: "sslmode",
    },
];

/// Connection settings for a Kinetica server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub sslmode: Option<String>,
}

impl ConnectionConfig {
    /// libpq style connection string
    pub fn connection_string(&self) -> String {
        let mut parts = vec![
            format!("host={}", self.host),
            format!("port={}", self.port),
            format!("user={}", self.user),
            format!("password={}", self.password),
            format!("dbname={}", self.database),
        ];
        if let Some(sslmode) = &self.sslmode {
            parts.push(format!("sslmode={sslmode}"));
        }
        if let Some(schema) = &self.schema {
            parts.push(format!("options=-csearch_path={schema}"));
        }
        parts.join(" ")
    }

    /// `user@host:port/database`, for logs
    pub fn display(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Executes raw SQL against a database
pub trait SqlBackend: Send + Sync {
    fn execute(&self, sql: &str) -> Result<Frame>;
}

/// DuckDB connection, optionally attached to a PostgreSQL server
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Standalone in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::database(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Attach a PostgreSQL-compatible server and make it the default catalog
    pub fn postgres(config: &ConnectionConfig) -> Result<Self> {
        let backend = Self::in_memory()?;
        {
            let conn = backend.lock()?;
            conn.execute_batch("INSTALL postgres; LOAD postgres;")
                .map_err(|e| Error::database(format!("Failed to load postgres extension: {e}")))?;

            let attach_sql = format!(
                "ATTACH '{}' AS source_db (TYPE POSTGRES); USE source_db;",
                config.connection_string().replace('\'', "''")
            );
            conn.execute_batch(&attach_sql).map_err(|e| {
                Error::database(format!("Failed to attach {}: {e}", config.display()))
            })?;
        }
        info!("Attached {}", config.display());
        Ok(backend)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::database("DuckDB connection lock poisoned"))
    }
}

impl SqlBackend for DuckDbBackend {
    fn execute(&self, sql: &str) -> Result<Frame> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::database(format!("Failed to prepare query: {e}")))?;

        let mut rows = Vec::new();
        let mut result = stmt
            .query([])
            .map_err(|e| Error::database(format!("Query failed: {e}")))?;
        let columns = result
            .as_ref()
            .map(duckdb::Statement::column_names)
            .unwrap_or_default();
        while let Some(row) = result
            .next()
            .map_err(|e| Error::database(format!("Failed to read row: {e}")))?
        {
            let width = row.as_ref().column_count();
            let values = (0..width)
                .map(|i| row.get::<_, duckdb::types::Value>(i).map(duckdb_value_to_json))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::database(format!("Failed to read column: {e}")))?;
            rows.push(values);
        }

        Frame::new(columns, rows)
    }
}

impl std::fmt::Debug for DuckDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbBackend").finish_non_exhaustive()
    }
}

/// SQL passthrough handler for Kinetica
pub struct KineticaHandler {
    instance: String,
    backend: Arc<dyn SqlBackend>,
}

impl KineticaHandler {
    pub fn new(instance: impl Into<String>, backend: Arc<dyn SqlBackend>) -> Self {
        Self {
            instance: instance.into(),
            backend,
        }
    }

    /// Connect through DuckDB to the configured server
    pub fn connect(instance: impl Into<String>, config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::new(instance, Arc::new(DuckDbBackend::postgres(config)?)))
    }

    /// Handler type name, always `kinetica`
    pub fn name(&self) -> &'static str {
        HANDLER_NAME
    }

    /// Name this instance was configured under
    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn connection_args() -> &'static [ConnectionArg] {
        &CONNECTION_ARGS
    }

    pub fn connection_args_example() -> Value {
        json!({
            "host": "127.0.0.1",
            "port": 5432,
            "user": "root",
            "password": "password",
            "database": "database",
        })
    }

    /// Forward `sql` to the backend unchanged
    pub fn query(&self, sql: &str) -> Result<Frame> {
        debug!("{}: {sql}", self.instance);
        self.backend.execute(sql)
    }

    pub fn execute_query(&self, sql: &str) -> Result<Frame> {
        self.query(sql)
    }

    pub fn create_table(&self, name: &str, columns: &[(&str, &str)]) -> Result<Frame> {
        let columns = columns
            .iter()
            .map(|(column, ty)| format!("{column} {ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.query(&format!("CREATE TABLE {name} ({columns});"))
    }

    pub fn drop_table(&self, name: &str) -> Result<Frame> {
        self.query(&format!("DROP TABLE {name};"))
    }
}

impl std::fmt::Debug for KineticaHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KineticaHandler")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

fn duckdb_value_to_json(value: duckdb::types::Value) -> Value {
    use duckdb::types::Value as Db;

    match value {
        Db::Null => Value::Null,
        Db::Boolean(b) => Value::Bool(b),
        Db::TinyInt(i) => i.into(),
        Db::SmallInt(i) => i.into(),
        Db::Int(i) => i.into(),
        Db::BigInt(i) => i.into(),
        Db::UTinyInt(i) => i.into(),
        Db::USmallInt(i) => i.into(),
        Db::UInt(i) => i.into(),
        Db::UBigInt(i) => i.into(),
        Db::HugeInt(i) => Value::String(i.to_string()),
        Db::Float(f) => serde_json::Number::from_f64(f64::from(f)).map_or(Value::Null, Value::Number),
        Db::Double(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        Db::Text(s) => Value::String(s),
        Db::Blob(b) => Value::String(base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b,
        )),
        Db::Timestamp(_, micros) => {
            chrono::DateTime::from_timestamp_micros(micros).map_or(Value::Number(micros.into()), |dt| {
                Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string())
            })
        }
        Db::Date32(days) => chrono::NaiveDate::from_num_days_from_ce_opt(days + 719_163)
            .map_or(Value::Number(days.into()), |d| {
                Value::String(d.format("%Y-%m-%d").to_string())
            }),
        other => Value::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Backend recording every statement it receives
    #[derive(Default)]
    struct RecordingBackend {
        statements: Mutex<Vec<String>>,
    }

    impl SqlBackend for RecordingBackend {
        fn execute(&self, sql: &str) -> Result<Frame> {
            self.statements.lock().unwrap().push(sql.to_string());
            Frame::new(
                vec!["id".to_string(), "name".to_string()],
                vec![vec![json!(1), json!("value1")], vec![json!(2), json!("value2")]],
            )
        }
    }

    fn handler() -> (KineticaHandler, Arc<RecordingBackend>) {
        let backend = Arc::new(RecordingBackend::default());
        (KineticaHandler::new("test_name", backend.clone()), backend)
    }

    #[test]
    fn test_name_and_instance() {
        let (handler, _) = handler();
        assert_eq!(handler.name(), "kinetica");
        assert_eq!(handler.instance(), "test_name");
    }

    #[test]
    fn test_connection_args() {
        let args = KineticaHandler::connection_args();
        let names: Vec<_> = args.iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            vec!["user", "password", "database", "host", "port", "schema", "sslmode"]
        );

        for arg in args {
            let required = !matches!(arg.name, "schema" | "sslmode");
            assert_eq!(arg.required, required, "{}", arg.name);
        }
        assert_eq!(args[1].arg_type, ArgType::Pwd);
        assert_eq!(args[4].arg_type, ArgType::Int);
        assert_eq!(args[6].label, "sslmode");

        assert_eq!(
            serde_json::to_value(&args[0]).unwrap(),
            json!({
                "name": "user",
                "type": "str",
                "description": "The user name used to authenticate with the Kinetica server.",
                "required": true,
                "label": "User",
            })
        );
    }

    #[test]
    fn test_connection_args_example() {
        assert_eq!(
            KineticaHandler::connection_args_example(),
            json!({"host": "127.0.0.1", "port": 5432, "user": "root", "password": "password", "database": "database"})
        );
    }

    #[test]
    fn test_query_forwards_once() {
        let (handler, backend) = handler();
        let frame = handler.execute_query("SELECT * FROM table;").unwrap();

        assert_eq!(frame.num_rows(), 2);
        assert_eq!(
            *backend.statements.lock().unwrap(),
            vec!["SELECT * FROM table;"]
        );
    }

    #[test]
    fn test_create_and_drop_table() {
        let (handler, backend) = handler();
        handler
            .create_table("new_table", &[("id", "INTEGER"), ("name", "VARCHAR(50)")])
            .unwrap();
        handler.drop_table("table_to_drop").unwrap();

        assert_eq!(
            *backend.statements.lock().unwrap(),
            vec![
                "CREATE TABLE new_table (id INTEGER, name VARCHAR(50));",
                "DROP TABLE table_to_drop;",
            ]
        );
    }

    #[test]
    fn test_connection_string() {
        let config = ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 5432,
            user: "root".to_string(),
            password: "password".to_string(),
            database: "database".to_string(),
            schema: Some("ki_home".to_string()),
            sslmode: Some("disable".to_string()),
        };
        assert_eq!(
            config.connection_string(),
            "host=127.0.0.1 port=5432 user=root password=password dbname=database sslmode=disable options=-csearch_path=ki_home"
        );
        assert_eq!(config.display(), "root@127.0.0.1:5432/database");
    }

    #[test]
    fn test_duckdb_backend_roundtrip() {
        let handler = KineticaHandler::new("local", Arc::new(DuckDbBackend::in_memory().unwrap()));
        handler
            .create_table("items", &[("id", "INTEGER"), ("name", "VARCHAR")])
            .unwrap();
        handler
            .query("INSERT INTO items VALUES (1, 'a'), (2, NULL)")
            .unwrap();

        let frame = handler.query("SELECT id, name FROM items ORDER BY id").unwrap();
        assert_eq!(frame.columns(), &["id".to_string(), "name".to_string()][..]);
        assert_eq!(
            frame.rows(),
            &[vec![json!(1), json!("a")], vec![json!(2), Value::Null]][..]
        );

        let empty = handler.query("SELECT id FROM items WHERE id > 10").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.columns(), &["id".to_string()][..]);
    }

    #[test]
    fn test_duckdb_value_to_json() {
        use duckdb::types::Value as Db;
        assert_eq!(duckdb_value_to_json(Db::Null), Value::Null);
        assert_eq!(duckdb_value_to_json(Db::BigInt(42)), json!(42));
        assert_eq!(duckdb_value_to_json(Db::Double(1.5)), json!(1.5));
        assert_eq!(duckdb_value_to_json(Db::Date32(0)), json!("1970-01-01"));
        assert_eq!(duckdb_value_to_json(Db::Blob(b"hi".to_vec())), json!("aGk="));
    }
}
