//! HTTP client for the ERP BOM and routing endpoints

use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::entities::material::MaterialLine;
use crate::entities::operation::OperationLine;
use crate::entities::scenario::Scenario;
use crate::erp::adapter::{materials_from_bom, operations_from_routing};

/// ERP endpoint being queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Bom,
    Routing,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Bom => "api/bom",
            Endpoint::Routing => "api/routing",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Bom => write!(f, "BOM"),
            Endpoint::Routing => write!(f, "Routing"),
        }
    }
}

/// Errors raised while loading from the ERP
#[derive(Debug, Error)]
pub enum ErpError {
    #[error("invalid ERP base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{endpoint}: HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },

    #[error("{endpoint}: request failed: {source}")]
    Request {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint}: response is not valid JSON: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Lines fetched for one article, not yet applied to a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ErpData {
    pub materials: Vec<MaterialLine>,
    pub operations: Vec<OperationLine>,
}

impl ErpData {
    /// Replace both line lists of the scenario
    pub fn apply(self, scenario: &mut Scenario) {
        scenario.materials = self.materials;
        scenario.operations = self.operations;
    }
}

/// Client for `{api_base}/api/bom` and `{api_base}/api/routing`
#[derive(Debug, Clone)]
pub struct ErpClient {
    client: Client,
    base: Url,
}

impl ErpClient {
    /// Create a client for the given base URL
    pub fn new(api_base: &str, timeout: Option<Duration>) -> Result<Self, ErpError> {
        let trimmed = api_base.trim().trim_end_matches('/');
        // Trailing slash so relative joins keep any base path
        let base = Url::parse(&format!("{}/", trimmed)).map_err(|e| ErpError::InvalidBaseUrl {
            url: api_base.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ErpError::InvalidBaseUrl {
                url: api_base.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ErpError::Client)?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Full URL for an endpoint, with the article as an encoded query
    pub fn endpoint_url(&self, endpoint: Endpoint, article: &str) -> Result<Url, ErpError> {
        let mut url = self
            .base
            .join(endpoint.path())
            .map_err(|e| ErpError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("article", article);
        Ok(url)
    }

    async fn fetch(&self, endpoint: Endpoint, article: &str) -> Result<Value, ErpError> {
        let url = self.endpoint_url(endpoint, article)?;
        tracing::debug!(%endpoint, %url, "requesting");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ErpError::Request {
                endpoint,
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErpError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ErpError::Decode {
                endpoint,
                source: e,
            })
    }

    /// Fetch the bill of materials of an article
    pub async fn fetch_bom(&self, article: &str) -> Result<Vec<MaterialLine>, ErpError> {
        let payload = self.fetch(Endpoint::Bom, article).await?;
        Ok(materials_from_bom(&payload))
    }

    /// Fetch the routing of an article
    pub async fn fetch_routing(&self, article: &str) -> Result<Vec<OperationLine>, ErpError> {
        let payload = self.fetch(Endpoint::Routing, article).await?;
        Ok(operations_from_routing(&payload))
    }

    /// Fetch BOM and routing concurrently; fails as a whole if either fails
    pub async fn load(&self, article: &str) -> Result<ErpData, ErpError> {
        let (materials, operations) =
            tokio::try_join!(self.fetch_bom(article), self.fetch_routing(article))?;

        tracing::info!(
            article,
            materials = materials.len(),
            operations = operations.len(),
            "loaded from ERP"
        );

        Ok(ErpData {
            materials,
            operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::operation::OperationType;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, route: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_endpoint_url_encodes_article() {
        let client = ErpClient::new("http://erp.local:4000/", None).unwrap();
        let url = client.endpoint_url(Endpoint::Bom, "ART 1&2").unwrap();
        assert_eq!(url.as_str(), "http://erp.local:4000/api/bom?article=ART+1%262");
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = ErpClient::new("http://erp.local/sylob", None).unwrap();
        let url = client.endpoint_url(Endpoint::Routing, "ART-0001").unwrap();
        assert_eq!(url.as_str(), "http://erp.local/sylob/api/routing?article=ART-0001");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ErpClient::new("not a url", None).unwrap_err();
        assert!(matches!(err, ErpError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_status_error_message() {
        let err = ErpError::Status {
            endpoint: Endpoint::Routing,
            status: 500,
        };
        assert_eq!(err.to_string(), "Routing: HTTP 500");
    }

    #[tokio::test]
    async fn test_load_wrapped_payloads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bom"))
            .and(query_param("article", "ART-0001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "components": [{"code": "C1", "name": "Tôle", "qty_per": 2, "unit_cost": 3.9}]
            })))
            .mount(&server)
            .await;
        mount(
            &server,
            "/api/routing",
            200,
            json!({"operations": [{"name": "Laser", "type": "operateur",
                                   "run_h_per_unit": 0.1, "hourly_rate": 55}]}),
        )
        .await;

        let client = ErpClient::new(&server.uri(), None).unwrap();
        let data = client.load("ART-0001").await.unwrap();

        assert_eq!(data.materials.len(), 1);
        assert_eq!(data.materials[0].name, "C1 – Tôle");
        assert_eq!(data.operations.len(), 1);
        assert!((data.operations[0].cadence_h - 10.0).abs() < 1e-9);
        assert_eq!(data.operations[0].op_type, OperationType::Operator);
    }

    #[tokio::test]
    async fn test_load_bare_arrays() {
        let server = MockServer::start().await;
        mount(&server, "/api/bom", 200, json!([{"name": "Vis", "qty": 4, "cost": 0.1}])).await;
        mount(
            &server,
            "/api/routing",
            200,
            json!([{"type": "Sous-traitance", "cost": 80}]),
        )
        .await;

        let client = ErpClient::new(&server.uri(), None).unwrap();
        let data = client.load("ART-0002").await.unwrap();
        assert_eq!(data.materials[0].qty, 4.0);
        assert_eq!(data.operations[0].subcontract_cost, 80.0);
    }

    #[tokio::test]
    async fn test_bom_failure_names_endpoint() {
        let server = MockServer::start().await;
        mount(&server, "/api/bom", 404, json!({})).await;
        mount(&server, "/api/routing", 200, json!([])).await;

        let client = ErpClient::new(&server.uri(), None).unwrap();
        let err = client.load("ART-0001").await.unwrap_err();
        assert_eq!(err.to_string(), "BOM: HTTP 404");
    }

    #[tokio::test]
    async fn test_routing_failure_discards_bom() {
        let server = MockServer::start().await;
        mount(&server, "/api/bom", 200, json!([{"name": "Vis"}])).await;
        mount(&server, "/api/routing", 500, json!({})).await;

        let client = ErpClient::new(&server.uri(), None).unwrap();
        let mut scenario = Scenario::sample();
        let before = scenario.clone();

        match client.load("ART-0001").await {
            Ok(data) => data.apply(&mut scenario),
            Err(e) => assert_eq!(e.to_string(), "Routing: HTTP 500"),
        }
        assert_eq!(scenario, before);
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/bom"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;
        mount(&server, "/api/routing", 200, json!([])).await;

        let client = ErpClient::new(&server.uri(), None).unwrap();
        let err = client.load("ART-0001").await.unwrap_err();
        assert!(matches!(err, ErpError::Decode { endpoint: Endpoint::Bom, .. }));
    }

    #[test]
    fn test_apply_replaces_lines() {
        let mut scenario = Scenario::sample();
        ErpData {
            materials: vec![],
            operations: vec![OperationLine::blank()],
        }
        .apply(&mut scenario);
        assert!(scenario.materials.is_empty());
        assert_eq!(scenario.operations.len(), 1);
        assert_eq!(scenario.sale_price, 12.5);
    }
}
