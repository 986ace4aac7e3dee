use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::trace;
use url::Url;

use crate::{application::error::ApiError, config::ApiSettings, infra::error::InfraError};

/// Thin JSON client for the admin API. Paths are built from segments, so
/// ids are percent-encoded.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(
        base: Url,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, InfraError> {
        if base.cannot_be_a_base() {
            return Err(InfraError::http(format!(
                "`{base}` cannot be used as a base URL"
            )));
        }

        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| InfraError::http(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base,
            token,
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, InfraError> {
        Self::new(
            settings.base_url.clone(),
            settings.token.clone(),
            settings.timeout,
        )
    }

    pub fn user_agent() -> &'static str {
        concat!("pawboard/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Transport(format!("`{}` cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!(%method, %url, "Sending admin API request");
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let mut url = self.url(segments)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(ApiError::transport)?;
        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(ApiError::transport)?;
        serde_json::from_slice(&bytes).map_err(ApiError::decode)
    }

    /// Send a request whose response body is ignored.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let url = self.url(segments)?;
        let mut request = self.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(ApiError::transport)?;
        Self::check(response).await.map(|_| ())
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).expect("valid url"), None, None).expect("client")
    }

    #[test]
    fn segments_are_appended_to_base_path() {
        let api = client("https://admin.example/api/v1/");
        assert_eq!(
            api.url(&["reports", "r 1", "action"]).expect("url").as_str(),
            "https://admin.example/api/v1/reports/r%201/action"
        );

        let api = client("https://admin.example/api");
        assert_eq!(
            api.url(&["news", "bulk"]).expect("url").as_str(),
            "https://admin.example/api/news/bulk"
        );
    }

    #[test]
    fn opaque_urls_are_rejected() {
        let base = Url::parse("mailto:admin@example.org").expect("valid url");
        assert!(ApiClient::new(base, None, None).is_err());
    }
}
