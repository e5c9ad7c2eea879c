use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use menousdb_rs::{Client, ClientConfig, ClientError, Response};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "menousdb")]
#[command(about = "Command line client for a MenousDB server")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Write JSON logs to this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// JSON config file; flags and environment override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL
    #[arg(long, env = "MENOUSDB_URL", global = true)]
    pub url: Option<String>,

    /// API key
    #[arg(long, env = "MENOUSDB_KEY", global = true, hide_env_values = true)]
    pub key: Option<String>,

    /// Database to operate on
    #[arg(short, long, env = "MENOUSDB_DATABASE", global = true)]
    pub database: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn resolve(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(key) = &self.key {
            config.key = key.clone();
        }
        if let Some(database) = &self.database {
            config.database = Some(database.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        if config.key.is_empty() {
            anyhow::bail!("no API key given, use --key or MENOUSDB_KEY");
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Dump the whole database
    ReadDb,
    /// Create the database
    CreateDb,
    /// Delete the database
    DeleteDb,
    /// Check whether the database exists
    DbExists,
    /// Create a table with the given attributes
    CreateTable {
        table: String,
        #[arg(long, value_delimiter = ',', required = true)]
        attributes: Vec<String>,
    },
    /// Check whether a table exists
    TableExists { table: String },
    /// Insert values into a table
    Insert {
        table: String,
        #[arg(long, value_parser = parse_json)]
        values: Value,
    },
    /// Fetch every row of a table
    GetTable { table: String },
    /// Fetch rows matching conditions
    SelectWhere {
        table: String,
        #[arg(long, value_parser = parse_json)]
        conditions: Value,
    },
    /// Fetch only the given columns
    SelectColumns {
        table: String,
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },
    /// Fetch the given columns of rows matching conditions
    SelectColumnsWhere {
        table: String,
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,
        #[arg(long, value_parser = parse_json)]
        conditions: Value,
    },
    /// Delete rows matching conditions
    DeleteWhere {
        table: String,
        #[arg(long, value_parser = parse_json)]
        conditions: Value,
    },
    /// Drop a table
    DeleteTable { table: String },
    /// Update rows matching conditions
    Update {
        table: String,
        #[arg(long, value_parser = parse_json)]
        conditions: Value,
        #[arg(long, value_parser = parse_json)]
        values: Value,
    },
    /// List databases visible to the key
    Databases,
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}

/// Result of a single command
#[derive(Debug, PartialEq)]
pub enum Output {
    Text(String),
    Response(Response),
}

impl Output {
    /// Pretty JSON for decoded replies, raw text otherwise
    pub fn render(&self) -> anyhow::Result<String> {
        match self {
            Output::Text(text) | Output::Response(Response::Text(text)) => Ok(text.clone()),
            Output::Response(Response::Json(value)) => {
                serde_json::to_string_pretty(value).context("failed to format response")
            }
        }
    }
}

impl Command {
    pub async fn run(&self, client: &Client) -> Result<Output, ClientError> {
        tracing::debug!(command = ?self, "running command");

        let output = match self {
            Command::ReadDb => Output::Response(client.read_db().await?),
            Command::CreateDb => Output::Text(client.create_db().await?),
            Command::DeleteDb => Output::Text(client.delete_db().await?),
            Command::DbExists => Output::Text(client.check_db_exists().await?),
            Command::CreateTable { table, attributes } => {
                Output::Text(client.create_table(table, attributes).await?)
            }
            Command::TableExists { table } => Output::Text(client.check_table_exists(table).await?),
            Command::Insert { table, values } => {
                Output::Text(client.insert_into_table(table, values).await?)
            }
            Command::GetTable { table } => Output::Response(client.get_table(table).await?),
            Command::SelectWhere { table, conditions } => {
                Output::Response(client.select_where(table, conditions).await?)
            }
            Command::SelectColumns { table, columns } => {
                Output::Response(client.select_columns(table, columns).await?)
            }
            Command::SelectColumnsWhere {
                table,
                columns,
                conditions,
            } => Output::Response(
                client
                    .select_columns_where(table, columns, conditions)
                    .await?,
            ),
            Command::DeleteWhere { table, conditions } => {
                Output::Response(client.delete_where(table, conditions).await?)
            }
            Command::DeleteTable { table } => Output::Response(client.delete_table(table).await?),
            Command::Update {
                table,
                conditions,
                values,
            } => Output::Response(client.update_where(table, conditions, values).await?),
            Command::Databases => Output::Response(client.get_databases().await?),
        };

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_create_table() {
        let cli = parse(&[
            "menousdb",
            "--url",
            "http://db.local:5555",
            "--key",
            "k",
            "-d",
            "shop",
            "create-table",
            "users",
            "--attributes",
            "name,age",
        ]);

        assert_eq!(cli.connection.database.as_deref(), Some("shop"));
        match cli.command {
            Command::CreateTable { table, attributes } => {
                assert_eq!(table, "users");
                assert_eq!(attributes, vec!["name", "age"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_json_arguments() {
        let cli = parse(&[
            "menousdb",
            "update",
            "users",
            "--conditions",
            r#"{"name": "bob"}"#,
            "--values",
            r#"{"age": 26}"#,
        ]);

        match cli.command {
            Command::Update {
                table,
                conditions,
                values,
            } => {
                assert_eq!(table, "users");
                assert_eq!(conditions, json!({"name": "bob"}));
                assert_eq!(values, json!({"age": 26}));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_usage_error() {
        let result = Cli::try_parse_from([
            "menousdb",
            "select-where",
            "users",
            "--conditions",
            "{not json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_columns_requires_columns() {
        let result = Cli::try_parse_from(["menousdb", "select-columns", "users"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["menousdb", "databases", "--verbose", "--timeout", "5"]);
        assert!(cli.verbose);
        assert_eq!(cli.connection.timeout, Some(5));
        assert!(matches!(cli.command, Command::Databases));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"url": "http://file.local:5555", "key": "file-key", "database": "file-db"}}"#
        )
        .unwrap();

        let args = ConnectionArgs {
            config: Some(file.path().to_path_buf()),
            url: None,
            key: None,
            database: Some("flag-db".to_string()),
            timeout: Some(0),
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.url, "http://file.local:5555");
        assert_eq!(config.key, "file-key");
        assert_eq!(config.database(), Some("flag-db"));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let args = ConnectionArgs {
            config: None,
            url: Some("http://db.local:5555".to_string()),
            key: None,
            database: None,
            timeout: None,
        };
        let err = args.resolve().unwrap_err();
        assert!(err.to_string().contains("no API key"));
    }

    #[test]
    fn test_render_output() {
        let json = Output::Response(Response::Json(json!({"a": 1})));
        assert_eq!(json.render().unwrap(), "{\n  \"a\": 1\n}");

        let text = Output::Response(Response::Text("Table does not exist".to_string()));
        assert_eq!(text.render().unwrap(), "Table does not exist");

        assert_eq!(Output::Text("true".to_string()).render().unwrap(), "true");
    }
}
