//! Query builders for the REST client

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchBuilder};
use crate::rest::filter::{or_group, Filter};
use crate::rest::types::{CountOption, ReturnOption, SortOrder};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Endpoint, credentials and schema a builder sends its request to
#[derive(Debug, Clone)]
pub struct Target {
    pub(crate) url: String,
    pub(crate) key: String,
    pub(crate) token: Option<String>,
    pub(crate) schema: String,
    pub(crate) client: Client,
}

impl Target {
    fn prepare<'a>(&self, fetch: FetchBuilder<'a>, method: &Method) -> FetchBuilder<'a> {
        let fetch = fetch.api_key(&self.key, self.token.as_deref());
        if self.schema == "public" {
            return fetch;
        }
        let profile = if *method == Method::GET || *method == Method::HEAD {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        fetch.header(profile, &self.schema)
    }

    fn fetch(&self, method: Method) -> FetchBuilder<'_> {
        let fetch = match method {
            Method::HEAD => Fetch::head(&self.client, &self.url),
            Method::POST => Fetch::post(&self.client, &self.url),
            Method::PATCH => Fetch::patch(&self.client, &self.url),
            _ => Fetch::get(&self.client, &self.url),
        };
        self.prepare(fetch, &method)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Builder for SELECT queries
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    target: Target,
    params: Vec<(String, String)>,
}

impl SelectBuilder {
    pub(crate) fn new(target: Target, columns: &str) -> Self {
        Self {
            target,
            params: vec![("select".to_string(), columns.to_string())],
        }
    }

    /// Add an arbitrary filter
    pub fn filter(mut self, filter: Filter) -> Self {
        self.params.push(filter.to_param());
        self
    }

    /// Filter rows where column equals a value
    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Filter rows where column does not equal a value
    pub fn neq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::neq(column, value))
    }

    /// Filter rows where column is null
    pub fn is_null(self, column: &str) -> Self {
        self.filter(Filter::is_null(column))
    }

    /// Filter rows where column is not null
    pub fn not_null(self, column: &str) -> Self {
        self.filter(Filter::is_null(column).not())
    }

    /// Keep rows matching any of the filters
    pub fn or(mut self, filters: &[Filter]) -> Self {
        self.params.push(or_group(filters));
        self
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        self.params
            .push(("order".to_string(), format!("{}.{}", column, order.as_str())));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.params.retain(|(key, _)| key != "limit");
        self.params.push(("limit".to_string(), count.to_string()));
        self
    }

    /// Query parameters sent with the request
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Execute the query and return all matching rows
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.target
            .fetch(Method::GET)
            .query(&self.params)
            .execute::<Vec<T>>()
            .await
    }

    /// Execute the query and return exactly one row.
    ///
    /// Zero or several matches are reported by the server as `PGRST116`.
    pub async fn single<T: DeserializeOwned>(&self) -> Result<T> {
        self.target
            .fetch(Method::GET)
            .header("Accept", SINGLE_OBJECT)
            .query(&self.params)
            .execute::<T>()
            .await
    }

    /// Execute the query and return the first row, if any
    pub async fn maybe_single<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let rows = self.clone().limit(1).execute::<T>().await?;
        Ok(rows.into_iter().next())
    }

    /// Count matching rows without transferring them
    pub async fn count(&self, option: CountOption) -> Result<u64> {
        let response = self
            .target
            .fetch(Method::HEAD)
            .header("Prefer", &format!("count={}", option.as_str()))
            .query(&self.params)
            .send_checked()
            .await?;

        let range = response
            .headers()
            .get("Content-Range")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::general("count response carried no Content-Range header"))?;
        parse_content_range(range)
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`
pub(crate) fn parse_content_range(range: &str) -> Result<u64> {
    range
        .rsplit('/')
        .next()
        .and_then(|total| total.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::general(format!("unexpected Content-Range: {}", range)))
}

/// Write and read back exactly one row
async fn send_write<B, R>(
    target: &Target,
    method: Method,
    params: &[(String, String)],
    prefer: &str,
    body: &B,
) -> Result<R>
where
    B: Serialize,
    R: DeserializeOwned,
{
    target
        .fetch(method)
        .header("Prefer", prefer)
        .header("Accept", SINGLE_OBJECT)
        .query(params)
        .json(body)?
        .execute::<R>()
        .await
}

async fn send_write_no_return<B: Serialize>(
    target: &Target,
    method: Method,
    params: &[(String, String)],
    prefer: &str,
    body: &B,
) -> Result<()> {
    target
        .fetch(method)
        .header("Prefer", prefer)
        .query(params)
        .json(body)?
        .execute_empty()
        .await
}

fn return_pref(option: ReturnOption) -> String {
    format!("return={}", option.as_str())
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    target: Target,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self { target, values }
    }

    /// Insert one row and return it
    pub async fn single<R: DeserializeOwned>(&self) -> Result<R> {
        let prefer = return_pref(ReturnOption::Representation);
        send_write(&self.target, Method::POST, &[], &prefer, &self.values).await
    }

    /// Execute the query without returning the inserted data
    pub async fn execute_no_return(&self) -> Result<()> {
        let prefer = return_pref(ReturnOption::Minimal);
        send_write_no_return(&self.target, Method::POST, &[], &prefer, &self.values).await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    target: Target,
    values: T,
    params: Vec<(String, String)>,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self {
            target,
            values,
            params: Vec::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.params.push(Filter::eq(column, value).to_param());
        self
    }

    /// An unfiltered PATCH would touch every row of the table
    fn guard(&self) -> Result<()> {
        if self.params.is_empty() {
            return Err(Error::validation(format!(
                "refusing to update {} without a filter",
                self.target.url
            )));
        }
        Ok(())
    }

    /// Update exactly one row and return it
    pub async fn single<R: DeserializeOwned>(&self) -> Result<R> {
        self.guard()?;
        let prefer = return_pref(ReturnOption::Representation);
        send_write(&self.target, Method::PATCH, &self.params, &prefer, &self.values).await
    }

    /// Execute the query without returning the updated data
    pub async fn execute_no_return(&self) -> Result<()> {
        self.guard()?;
        let prefer = return_pref(ReturnOption::Minimal);
        send_write_no_return(&self.target, Method::PATCH, &self.params, &prefer, &self.values)
            .await
    }
}

/// Builder for UPSERT queries
pub struct UpsertBuilder<T: Serialize> {
    target: Target,
    values: T,
    on_conflict: Option<String>,
}

impl<T: Serialize> UpsertBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self {
            target,
            values,
            on_conflict: None,
        }
    }

    /// Specify the column(s) to check for conflicts
    pub fn on_conflict(mut self, column: &str) -> Self {
        self.on_conflict = Some(column.to_string());
        self
    }

    fn params(&self) -> Vec<(String, String)> {
        self.on_conflict
            .iter()
            .map(|column| ("on_conflict".to_string(), column.clone()))
            .collect()
    }

    /// Insert or merge one row and return it
    pub async fn single<R: DeserializeOwned>(&self) -> Result<R> {
        let prefer = format!(
            "resolution=merge-duplicates,{}",
            return_pref(ReturnOption::Representation)
        );
        send_write(&self.target, Method::POST, &self.params(), &prefer, &self.values).await
    }
}

/// Builder for RPC (stored procedure) calls
pub struct RpcBuilder<T: Serialize> {
    target: Target,
    params: T,
}

impl<T: Serialize> RpcBuilder<T> {
    pub(crate) fn new(target: Target, params: T) -> Self {
        Self { target, params }
    }

    /// Execute the RPC call and return the results
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R> {
        self.target
            .fetch(Method::POST)
            .json(&self.params)?
            .execute::<R>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-24/3573").unwrap(), 3573);
        assert_eq!(parse_content_range("*/0").unwrap(), 0);
        assert!(parse_content_range("0-24/*").is_err());
    }

    #[test]
    fn limit_replaces_previous_limit() {
        let target = Target {
            url: "http://localhost/rest/v1/checkins".to_string(),
            key: "anon".to_string(),
            token: None,
            schema: "public".to_string(),
            client: Client::new(),
        };
        let builder = SelectBuilder::new(target, "*").limit(5).limit(1);
        let limits: Vec<_> = builder
            .params()
            .iter()
            .filter(|(key, _)| key == "limit")
            .collect();
        assert_eq!(limits.len(), 1);
        assert_eq!(limits[0].1, "1");
    }
}
