use serde::Serialize;
use std::fmt;

/// Header carrying the API key, sent on every request
pub const HEADER_KEY: &str = "key";
/// Header naming the target database
pub const HEADER_DATABASE: &str = "database";
/// Header naming the target table
pub const HEADER_TABLE: &str = "table";

/// HTTP verbs used by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which identifying headers an endpoint needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `key` only
    Server,
    /// `key` + `database`
    Database,
    /// `key` + `database` + `table`
    Table,
}

impl Scope {
    pub fn requires_database(&self) -> bool {
        !matches!(self, Scope::Server)
    }
}

/// How the response body is handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Raw body as returned by the server
    Text,
    /// JSON, falling back to raw text when the body does not parse
    Json,
}

/// Every route exposed by the MenousDB HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ReadDb,
    CreateDb,
    DeleteDb,
    CheckDbExists,
    CreateTable,
    CheckTableExists,
    InsertIntoTable,
    GetTable,
    SelectWhere,
    SelectColumns,
    SelectColumnsWhere,
    DeleteWhere,
    DeleteTable,
    UpdateTable,
    GetDatabases,
}

impl Endpoint {
    pub const ALL: [Endpoint; 15] = [
        Endpoint::ReadDb,
        Endpoint::CreateDb,
        Endpoint::DeleteDb,
        Endpoint::CheckDbExists,
        Endpoint::CreateTable,
        Endpoint::CheckTableExists,
        Endpoint::InsertIntoTable,
        Endpoint::GetTable,
        Endpoint::SelectWhere,
        Endpoint::SelectColumns,
        Endpoint::SelectColumnsWhere,
        Endpoint::DeleteWhere,
        Endpoint::DeleteTable,
        Endpoint::UpdateTable,
        Endpoint::GetDatabases,
    ];

    /// Path relative to the service base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ReadDb => "read-db",
            Endpoint::CreateDb => "create-db",
            Endpoint::DeleteDb => "del-database",
            Endpoint::CheckDbExists => "check-db-exists",
            Endpoint::CreateTable => "create-table",
            Endpoint::CheckTableExists => "check-table-exists",
            Endpoint::InsertIntoTable => "insert-into-table",
            Endpoint::GetTable => "get-table",
            Endpoint::SelectWhere => "select-where",
            Endpoint::SelectColumns => "select-columns",
            Endpoint::SelectColumnsWhere => "select-columns-where",
            Endpoint::DeleteWhere => "delete-where",
            Endpoint::DeleteTable => "delete-table",
            Endpoint::UpdateTable => "update-table",
            Endpoint::GetDatabases => "get-databases",
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Endpoint::CreateDb
            | Endpoint::CreateTable
            | Endpoint::InsertIntoTable
            | Endpoint::UpdateTable => HttpMethod::Post,
            Endpoint::DeleteDb | Endpoint::DeleteWhere | Endpoint::DeleteTable => {
                HttpMethod::Delete
            }
            _ => HttpMethod::Get,
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Endpoint::GetDatabases => Scope::Server,
            Endpoint::ReadDb | Endpoint::CreateDb | Endpoint::DeleteDb | Endpoint::CheckDbExists => {
                Scope::Database
            }
            _ => Scope::Table,
        }
    }

    pub fn format(&self) -> ResponseFormat {
        match self {
            Endpoint::CreateDb
            | Endpoint::DeleteDb
            | Endpoint::CheckDbExists
            | Endpoint::CreateTable
            | Endpoint::CheckTableExists
            | Endpoint::InsertIntoTable => ResponseFormat::Text,
            _ => ResponseFormat::Json,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_start_matches('/');
        Self::ALL.iter().copied().find(|e| e.path() == path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Body returned by a JSON endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Json(serde_json::Value),
    Text(String),
}

impl Response {
    /// Decode `body` as JSON, keeping the raw text if it is not valid JSON
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Response::Json(value),
            Err(_) => Response::Text(body),
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Response::Json(_))
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Text(text) => Some(text),
            Response::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Json(value) => write!(f, "{}", value),
            Response::Text(text) => f.write_str(text),
        }
    }
}

/// Body for `create-table`
#[derive(Debug, Serialize)]
pub struct CreateTableRequest<'a> {
    pub attributes: Vec<&'a str>,
}

/// Body for `insert-into-table`
#[derive(Serialize)]
pub struct InsertRequest<'a, T: ?Sized> {
    pub values: &'a T,
}

/// Body for `select-where` and `delete-where`
#[derive(Serialize)]
pub struct ConditionsRequest<'a, T: ?Sized> {
    pub conditions: &'a T,
}

/// Body for `select-columns`
#[derive(Debug, Serialize)]
pub struct ColumnsRequest<'a> {
    pub columns: Vec<&'a str>,
}

/// Body for `select-columns-where`
#[derive(Serialize)]
pub struct ColumnsWhereRequest<'a, T: ?Sized> {
    pub columns: Vec<&'a str>,
    pub conditions: &'a T,
}

/// Body for `update-table`
#[derive(Serialize)]
pub struct UpdateRequest<'a, C: ?Sized, V: ?Sized> {
    pub conditions: &'a C,
    pub values: &'a V,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_paths_round_trip() {
        for endpoint in Endpoint::ALL {
            assert_eq!(Endpoint::from_path(endpoint.path()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_path("/get-table"), Some(Endpoint::GetTable));
        assert_eq!(Endpoint::from_path("drop-everything"), None);
    }

    #[test]
    fn test_endpoint_methods() {
        assert_eq!(Endpoint::ReadDb.method(), HttpMethod::Get);
        assert_eq!(Endpoint::CreateDb.method(), HttpMethod::Post);
        assert_eq!(Endpoint::DeleteDb.method(), HttpMethod::Delete);
        assert_eq!(Endpoint::SelectColumnsWhere.method(), HttpMethod::Get);
        assert_eq!(Endpoint::DeleteWhere.method(), HttpMethod::Delete);
        assert_eq!(Endpoint::UpdateTable.method(), HttpMethod::Post);
        assert_eq!(Endpoint::DeleteTable.method(), HttpMethod::Delete);
    }

    #[test]
    fn test_only_get_databases_skips_database() {
        let server_scoped: Vec<_> = Endpoint::ALL
            .iter()
            .filter(|e| !e.scope().requires_database())
            .collect();
        assert_eq!(server_scoped, vec![&Endpoint::GetDatabases]);
        assert_eq!(Endpoint::CheckDbExists.scope(), Scope::Database);
        assert_eq!(Endpoint::CheckTableExists.scope(), Scope::Table);
    }

    #[test]
    fn test_text_endpoints() {
        let text: Vec<_> = Endpoint::ALL
            .iter()
            .filter(|e| e.format() == ResponseFormat::Text)
            .map(|e| e.path())
            .collect();
        assert_eq!(
            text,
            vec![
                "create-db",
                "del-database",
                "check-db-exists",
                "create-table",
                "check-table-exists",
                "insert-into-table"
            ]
        );
    }

    #[test]
    fn test_response_from_body() {
        let json = Response::from_body(r#"[{"name":"alice"}]"#.to_string());
        assert_eq!(json, Response::Json(json!([{"name": "alice"}])));
        assert!(json.is_json());

        let text = Response::from_body("Table does not exist".to_string());
        assert_eq!(text.as_text(), Some("Table does not exist"));
        assert!(text.as_json().is_none());

        let empty = Response::from_body(String::new());
        assert_eq!(empty, Response::Text(String::new()));
    }

    #[test]
    fn test_response_display() {
        let json = Response::Json(json!({"a": 1}));
        assert_eq!(json.to_string(), r#"{"a":1}"#);
        let text = Response::Text("done".to_string());
        assert_eq!(text.to_string(), "done");
    }

    #[test]
    fn test_request_bodies_shape() {
        let conditions = json!({"age": 30});
        let values = json!({"name": "bob"});
        let body = UpdateRequest {
            conditions: &conditions,
            values: &values,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"conditions": {"age": 30}, "values": {"name": "bob"}})
        );

        let body = ColumnsWhereRequest {
            columns: vec!["name", "age"],
            conditions: &conditions,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"columns": ["name", "age"], "conditions": {"age": 30}})
        );
    }
}
