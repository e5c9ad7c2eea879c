use crate::{ClientError, Result};
use menousdb_core::config::normalize_url;
use menousdb_core::{
    ClientConfig, ColumnsRequest, ColumnsWhereRequest, ConditionsRequest, CreateTableRequest,
    Endpoint, HttpMethod, InsertRequest, Response, Scope, UpdateRequest, HEADER_DATABASE,
    HEADER_KEY, HEADER_TABLE,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::fmt;
use url::Url;

/// MenousDB REST API Client
///
/// Clones share the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    key: String,
    database: Option<String>,
    http: HttpClient,
}

impl Client {
    /// Create a client for the server at `url`.
    ///
    /// An empty `database` leaves the client unbound; only
    /// [`Client::get_databases`] works until one is set.
    pub fn new(
        url: impl AsRef<str>,
        key: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self> {
        let database = database.into();
        Ok(Self {
            base_url: parse_base_url(url.as_ref())?,
            key: key.into(),
            database: (!database.is_empty()).then_some(database),
            http: HttpClient::new(),
        })
    }

    /// Create a client with timeout, TLS and user agent taken from `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = HttpClient::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if config.insecure_skip_verify {
            tracing::warn!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: parse_base_url(&config.url)?,
            key: config.key.clone(),
            database: config.database().map(str::to_string),
            http: builder.build()?,
        })
    }

    /// Same server and key, different database
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        let database = database.into();
        Self {
            database: (!database.is_empty()).then_some(database),
            ..self.clone()
        }
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Read the whole current database
    pub async fn read_db(&self) -> Result<Response> {
        self.fetch_json(Endpoint::ReadDb, None, None).await
    }

    pub async fn create_db(&self) -> Result<String> {
        self.fetch_text(Endpoint::CreateDb, None, None).await
    }

    pub async fn delete_db(&self) -> Result<String> {
        self.fetch_text(Endpoint::DeleteDb, None, None).await
    }

    pub async fn check_db_exists(&self) -> Result<String> {
        self.fetch_text(Endpoint::CheckDbExists, None, None).await
    }

    /// Create `table` with the given column names
    pub async fn create_table(
        &self,
        table: &str,
        attributes: &[impl AsRef<str>],
    ) -> Result<String> {
        let body = json_body(&CreateTableRequest {
            attributes: attributes.iter().map(AsRef::as_ref).collect(),
        })?;
        self.fetch_text(Endpoint::CreateTable, Some(table), Some(body))
            .await
    }

    pub async fn check_table_exists(&self, table: &str) -> Result<String> {
        self.fetch_text(Endpoint::CheckTableExists, Some(table), None)
            .await
    }

    /// Insert a row (or whatever shape the server accepts) into `table`
    pub async fn insert_into_table<T>(&self, table: &str, values: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        let body = json_body(&InsertRequest { values })?;
        self.fetch_text(Endpoint::InsertIntoTable, Some(table), Some(body))
            .await
    }

    pub async fn get_table(&self, table: &str) -> Result<Response> {
        self.fetch_json(Endpoint::GetTable, Some(table), None).await
    }

    /// Rows of `table` matching `conditions`
    pub async fn select_where<T>(&self, table: &str, conditions: &T) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let body = json_body(&ConditionsRequest { conditions })?;
        self.fetch_json(Endpoint::SelectWhere, Some(table), Some(body))
            .await
    }

    pub async fn select_columns(
        &self,
        table: &str,
        columns: &[impl AsRef<str>],
    ) -> Result<Response> {
        let body = json_body(&ColumnsRequest {
            columns: columns.iter().map(AsRef::as_ref).collect(),
        })?;
        self.fetch_json(Endpoint::SelectColumns, Some(table), Some(body))
            .await
    }

    pub async fn select_columns_where<T>(
        &self,
        table: &str,
        columns: &[impl AsRef<str>],
        conditions: &T,
    ) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let body = json_body(&ColumnsWhereRequest {
            columns: columns.iter().map(AsRef::as_ref).collect(),
            conditions,
        })?;
        self.fetch_json(Endpoint::SelectColumnsWhere, Some(table), Some(body))
            .await
    }

    /// Delete rows of `table` matching `conditions`
    pub async fn delete_where<T>(&self, table: &str, conditions: &T) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let body = json_body(&ConditionsRequest { conditions })?;
        self.fetch_json(Endpoint::DeleteWhere, Some(table), Some(body))
            .await
    }

    pub async fn delete_table(&self, table: &str) -> Result<Response> {
        self.fetch_json(Endpoint::DeleteTable, Some(table), None).await
    }

    /// Set `values` on rows of `table` matching `conditions`
    pub async fn update_where<C, V>(
        &self,
        table: &str,
        conditions: &C,
        values: &V,
    ) -> Result<Response>
    where
        C: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let body = json_body(&UpdateRequest { conditions, values })?;
        self.fetch_json(Endpoint::UpdateTable, Some(table), Some(body))
            .await
    }

    /// List databases visible to this key. Does not need a database.
    pub async fn get_databases(&self) -> Result<Response> {
        self.fetch_json(Endpoint::GetDatabases, None, None).await
    }

    async fn fetch_text(
        &self,
        endpoint: Endpoint,
        table: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<String> {
        self.execute(endpoint, table, body).await
    }

    async fn fetch_json(
        &self,
        endpoint: Endpoint,
        table: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<Response> {
        let text = self.execute(endpoint, table, body).await?;
        let response = Response::from_body(text);
        if !response.is_json() {
            tracing::debug!(endpoint = %endpoint, "response is not JSON, returning raw text");
        }
        Ok(response)
    }

    async fn execute(
        &self,
        endpoint: Endpoint,
        table: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<String> {
        let scope = endpoint.scope();
        let database = if scope.requires_database() {
            Some(self.database.as_deref().ok_or(ClientError::NoDatabase)?)
        } else {
            None
        };

        let url = self.base_url.join(endpoint.path())?;
        let mut request = self
            .http
            .request(to_reqwest_method(endpoint.method()), url)
            .header(CONTENT_TYPE, "application/json")
            .header(HEADER_KEY, &self.key);

        if let Some(database) = database {
            request = request.header(HEADER_DATABASE, database);
        }
        if scope == Scope::Table {
            if let Some(table) = table {
                request = request.header(HEADER_TABLE, table);
            }
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        tracing::debug!(
            method = %endpoint.method(),
            endpoint = %endpoint,
            database = database.unwrap_or_default(),
            table = table.unwrap_or_default(),
            "sending request"
        );

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(
            endpoint = %endpoint,
            status = status.as_u16(),
            bytes = text.len(),
            "received response"
        );

        Ok(text)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("key", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.database.as_deref().unwrap_or_default())
    }
}

fn parse_base_url(url: &str) -> Result<Url> {
    Ok(Url::parse(&normalize_url(url))?)
}

fn json_body<T: Serialize + ?Sized>(body: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(body)?)
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
