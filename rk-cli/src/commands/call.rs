//! Call commands - send one request and print the resulting envelope.

use rk_api::{ApiResult, RestClient};
use rk_core::config::AppConfig;
use rk_core::error::{RkError, RkResult};
use serde_json::Value;

use crate::OutputFormat;

/// Maximum title length shown in text output.
const TITLE_WIDTH: usize = 120;

/// A request parsed from the command line.
#[derive(Debug, PartialEq)]
pub enum Call {
    Get(String),
    Post(String, Value),
    Put(String, Value),
    Delete(String),
}

impl Call {
    pub fn get(path: String) -> Self {
        Call::Get(path)
    }

    pub fn post(path: String, data: &str) -> RkResult<Self> {
        Ok(Call::Post(path, parse_body(data)?))
    }

    pub fn put(path: String, data: &str) -> RkResult<Self> {
        Ok(Call::Put(path, parse_body(data)?))
    }

    pub fn delete(path: String) -> Self {
        Call::Delete(path)
    }
}

/// Parse a JSON body given inline or as `@path`.
fn parse_body(data: &str) -> RkResult<Value> {
    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => data.to_string(),
    };
    serde_json::from_str(&text)
        .map_err(|e| RkError::invalid_argument(format!("request body is not valid JSON: {e}")))
}

/// Run a call. Returns the envelope's success flag.
pub async fn run(config: &AppConfig, call: Call, format: OutputFormat) -> RkResult<bool> {
    if !config.is_client_configured() {
        return Err(RkError::Config(
            "no base uri configured; pass --base-uri or set client.base_uri".into(),
        ));
    }
    let client = RestClient::from_config(&config.client)?;

    let resp: ApiResult = match call {
        Call::Get(path) => client.get(&path).await,
        Call::Post(path, body) => client.post(&path, &body).await,
        Call::Put(path, body) => client.put(&path, &body).await,
        Call::Delete(path) => client.delete(&path).await,
    };

    print!("{}", render(&resp, format));
    Ok(resp.is_success())
}

fn render(resp: &ApiResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_value(resp).unwrap_or_default();
            if let Some(ref e) = resp.exception {
                json["exception"] = Value::String(e.to_string());
            }
            format!("{}\n", serde_json::to_string_pretty(&json).unwrap_or_default())
        }
        OutputFormat::Text => {
            let mut out = format!(
                "status:  {} ({})\n",
                resp.status,
                if resp.success { "success" } else { "failure" }
            );
            if let Some(ref title) = resp.title {
                out.push_str(&format!("title:   {}\n", super::truncate(title, TITLE_WIDTH)));
            }
            if let Some(ref e) = resp.exception {
                out.push_str(&format!("error:   {e}\n"));
            }
            let mut fields: Vec<_> = resp.errors.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));
            for (field, messages) in fields {
                out.push_str(&format!("invalid: {field}: {}\n", messages.join("; ")));
            }
            if let Some(ref data) = resp.data {
                out.push_str(&serde_json::to_string_pretty(data).unwrap_or_default());
                out.push('\n');
            }
            out
        }
    }
}
