use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::CertificateRequest,
    protocol::{decode_record_list, CertificateRequestRecord, SubmitCertificateResponse},
};
use tracing::{info, warn};

pub mod config;
pub mod dates;
pub mod form;
pub mod listing;
pub mod request_list;
pub mod submission;
pub mod validation;

pub use config::{load_settings, Settings};
pub use form::CertificateForm;
pub use listing::{apply, ListingCache};
pub use request_list::{FetchTicket, ListStatus, RequestListView};
pub use submission::{SubmissionFlow, SubmissionState, SubmitRejected};
pub use validation::{validate, validate_now, FieldErrors};

const SUBSCRIPTION_KEY_PARAM: &str = "subscription-key";
const SUBMIT_PATH: &str = "request-certificate";
const LIST_PATH: &str = "request-list";

/// The remote certificate service: the only two calls this client makes.
#[async_trait]
pub trait CertificateApi: Send + Sync {
    async fn submit_request(
        &self,
        payload: &CertificateRequest,
    ) -> Result<SubmitCertificateResponse>;
    async fn fetch_requests(&self) -> Result<Vec<CertificateRequestRecord>>;
}

pub struct MissingCertificateApi;

#[async_trait]
impl CertificateApi for MissingCertificateApi {
    async fn submit_request(
        &self,
        _payload: &CertificateRequest,
    ) -> Result<SubmitCertificateResponse> {
        Err(anyhow!("certificate api is unavailable"))
    }

    async fn fetch_requests(&self) -> Result<Vec<CertificateRequestRecord>> {
        Err(anyhow!("certificate api is unavailable"))
    }
}

pub struct HttpCertificateApi {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpCertificateApi {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl CertificateApi for HttpCertificateApi {
    async fn submit_request(
        &self,
        payload: &CertificateRequest,
    ) -> Result<SubmitCertificateResponse> {
        let url = self.endpoint(SUBMIT_PATH);
        let body = self
            .http
            .post(&url)
            .query(&[(SUBSCRIPTION_KEY_PARAM, self.api_key.as_str())])
            .json(payload)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?
            .error_for_status()
            .context("submit endpoint returned error")?
            .text()
            .await
            .context("failed to read submit response body")?;

        match serde_json::from_str::<SubmitCertificateResponse>(&body) {
            Ok(response) => {
                info!(
                    affirmative = response.is_affirmative(),
                    "certificate request submitted"
                );
                Ok(response)
            }
            Err(err) => {
                warn!("submit response was not a confirmation object: {err}");
                Ok(SubmitCertificateResponse::default())
            }
        }
    }

    async fn fetch_requests(&self) -> Result<Vec<CertificateRequestRecord>> {
        let url = self.endpoint(LIST_PATH);
        let body = self
            .http
            .get(&url)
            .query(&[(SUBSCRIPTION_KEY_PARAM, self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?
            .error_for_status()
            .context("request-list endpoint returned error")?
            .text()
            .await
            .context("failed to read request-list body")?;

        let records = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(decode_record_list);
        match records {
            Some(records) => {
                info!(count = records.len(), "fetched certificate requests");
                Ok(records)
            }
            None => {
                warn!("request-list body was not a list of records; treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
