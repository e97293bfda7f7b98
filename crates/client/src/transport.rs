use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, ACCEPT_LANGUAGE, LAST_MODIFIED, LOCATION};
use reqwest::{redirect, Client, Response};
use showcase_core::config::HttpConfig;
use showcase_core::{
    Showcase, ShowcaseContext, ShowcaseTransport, StepRequest, SubmissionOutcome,
    IF_MODIFIED_SINCE,
};
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::{classify_initial, classify_submission, ResponseParts};

/// `reqwest`-backed [`ShowcaseTransport`].
///
/// Redirects are never followed: a `300` with `Location` is how the server announces the
/// next step.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    accept_language: String,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self::with_client(client, config.accept_language.clone()))
    }

    pub fn with_client(client: Client, accept_language: impl Into<String>) -> Self {
        Self { client, accept_language: accept_language.into() }
    }

    /// Fetches the first step of a showcase and builds a fresh context for it.
    pub async fn fetch_initial(
        &self,
        url: &str,
    ) -> Result<ShowcaseContext<Showcase>, TransportError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?;
        let (status, headers, body) = read_response(response).await?;
        debug!(
            event_name = "showcase.transport.initial_fetched",
            url = %url,
            status,
            "initial showcase fetched"
        );

        classify_initial(
            url,
            &ResponseParts {
                status,
                location: header_str(&headers, LOCATION.as_str()),
                last_modified: header_str(&headers, LAST_MODIFIED.as_str()),
                body: &body,
            },
        )
    }
}

#[async_trait]
impl ShowcaseTransport<Showcase> for HttpTransport {
    type Error = TransportError;

    async fn execute(
        &self,
        request: &StepRequest,
    ) -> Result<SubmissionOutcome<Showcase>, Self::Error> {
        let response = self
            .client
            .post(&request.url)
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .header(IF_MODIFIED_SINCE, request.if_modified_since_header())
            .form(&request.parameters)
            .send()
            .await?;
        let (status, headers, body) = read_response(response).await?;
        debug!(
            event_name = "showcase.transport.step_submitted",
            url = %request.url,
            status,
            body_bytes = body.len(),
            "showcase step response received"
        );

        classify_submission(&ResponseParts {
            status,
            location: header_str(&headers, LOCATION.as_str()),
            last_modified: header_str(&headers, LAST_MODIFIED.as_str()),
            body: &body,
        })
    }
}

async fn read_response(response: Response) -> Result<(u16, HeaderMap, Vec<u8>), TransportError> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();
    Ok((status, headers, body))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
    use showcase_core::config::AppConfig;

    use super::{header_str, HttpTransport};

    #[test]
    fn builds_from_default_http_config() {
        let config = AppConfig::default();

        let transport = HttpTransport::new(&config.http).expect("client builds");

        assert_eq!(transport.accept_language, "en");
    }

    #[test]
    fn header_lookup_ignores_non_text_values() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://x/2"));
        headers.insert(
            "last-modified",
            HeaderValue::from_bytes(b"\xffbroken").expect("opaque header value"),
        );

        assert_eq!(header_str(&headers, "location"), Some("https://x/2"));
        assert_eq!(header_str(&headers, "last-modified"), None);
        assert_eq!(header_str(&headers, "etag"), None);
    }
}
