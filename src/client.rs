//! HTTP client for the reservation API.
//!
//! Mirrors how an infrastructure orchestrator drives the service: reserve on
//! create, list-and-check on read to detect drift, release on delete.

use crate::api::dto::{
    ErrorResponse, ListResponse, ReleaseRequest, ReleaseResponse, ReserveRequest, ReserveResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Non-2xx answer; `message` is the server's error message when it sent one.
    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },
}

/// Client bound to one server, e.g. `http://127.0.0.1:8080`.
#[derive(Debug, Clone)]
pub struct IpamClient {
    base_url: String,
    http: reqwest::Client,
}

impl IpamClient {
    pub fn new(base_url: &str) -> Self {
        IpamClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reserve an address in `cidr` and return it.
    pub async fn reserve(&self, cidr: &str, tenant_name: &str, purpose: &str) -> Result<String, ClientError> {
        let url = self.url("/reserve-ip");
        let request = ReserveRequest {
            cidr: cidr.to_string(),
            tenant_name: tenant_name.to_string(),
            purpose: purpose.to_string(),
        };
        let response = self.http.post(&url).json(&request).send().await;
        let reserved: ReserveResponse = read_json(&url, response).await?;
        log::debug!("reserved {} in {cidr} for '{tenant_name}'", reserved.ip_address);
        Ok(reserved.ip_address)
    }

    /// Release a reservation. `false` means nothing matched.
    pub async fn release(&self, cidr: &str, tenant_name: &str, ip_address: &str) -> Result<bool, ClientError> {
        let url = self.url("/release-ip");
        let request = ReleaseRequest {
            cidr: cidr.to_string(),
            tenant_name: tenant_name.to_string(),
            ip_address: ip_address.to_string(),
        };
        let response = self.http.post(&url).json(&request).send().await;
        let released: ReleaseResponse = read_json(&url, response).await?;
        Ok(released.success)
    }

    /// Addresses reserved under `subnet`.
    pub async fn list_addresses(&self, subnet: &str) -> Result<Vec<String>, ClientError> {
        let url = self.url("/get-ips-in-subnet");
        let response = self
            .http
            .get(&url)
            .query(&[("subnet", subnet)])
            .send()
            .await;
        let listed: ListResponse = read_json(&url, response).await?;
        Ok(listed.ips)
    }

    /// Is a previously issued address still reserved in `cidr`?
    pub async fn is_reserved(&self, cidr: &str, ip_address: &str) -> Result<bool, ClientError> {
        let ips = self.list_addresses(cidr).await?;
        let found = ips.iter().any(|ip| ip == ip_address);
        if !found {
            log::warn!("IP address {ip_address} does not exist in subnet {cidr}");
        }
        Ok(found)
    }
}

async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, ClientError> {
    let http_err = |source: reqwest::Error| ClientError::Http {
        url: url.to_string(),
        source,
    };
    let response = response.map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        return Err(ClientError::Status {
            url: url.to_string(),
            status,
            message,
        });
    }
    response.json::<T>().await.map_err(http_err)
}
