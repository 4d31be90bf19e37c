// ABOUTME: Blocking HTTP client for the Hatena Blog AtomPub and OAuth endpoints
// ABOUTME: Signs every request with OAuth1 and turns non-2xx into API errors

use crate::oauth::{Consumer, Signer, Token};
use crate::util::truncate_str;
use crate::{Error, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

pub const ATOM_ACCEPT: &str = "application/x.atom+xml";

pub struct ApiClient {
    client: Client,
    consumer: Consumer,
    token: Option<Token>,
}

impl ApiClient {
    pub fn new(consumer: Consumer, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("hatena-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ApiClient {
            client,
            consumer,
            token,
        })
    }

    fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::Config(format!("invalid URL {}: {}", url, e)))
    }

    fn authorization(&self, method: &str, url: &Url, token: Option<&Token>, extra: &[(&str, &str)]) -> String {
        Signer::new(&self.consumer, token).authorization_header(method, url, extra)
    }

    fn check(response: Response, url: &Url) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        tracing::error!(url = %url, status = status.as_u16(), body = %body, "request rejected");
        Err(Error::Api {
            endpoint: url.path().to_string(),
            status: status.as_u16(),
            message: truncate_str(&body, 200),
        })
    }

    /// Fetches one Atom page of the entry collection.
    pub fn get_feed(&self, url: &str) -> Result<String> {
        let url = Self::parse_url(url)?;
        let auth = self.authorization("GET", &url, self.token.as_ref(), &[]);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ATOM_ACCEPT)
            .header(AUTHORIZATION, auth)
            .send()?;

        Ok(Self::check(response, &url)?.text()?)
    }

    /// Downloads a resource fully into memory, optionally OAuth-signed.
    /// Only `200 OK` counts; other 2xx replies carry no complete body.
    pub fn download(&self, url: &Url, signed: bool) -> Result<Vec<u8>> {
        let mut request = self.client.get(url.clone());
        if signed {
            request = request.header(
                AUTHORIZATION,
                self.authorization("GET", url, self.token.as_ref(), &[]),
            );
        }

        let response = Self::check(request.send()?, url)?;
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            tracing::warn!(url = %url, status, "download did not return a full body");
            return Err(Error::Api {
                endpoint: url.path().to_string(),
                status,
                message: "expected 200 OK".into(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }

    /// POSTs to an OAuth1 token endpoint and returns the form-encoded reply.
    pub fn oauth_post(
        &self,
        url: &str,
        token: Option<&Token>,
        extra: &[(&str, &str)],
    ) -> Result<Vec<(String, String)>> {
        let url = Self::parse_url(url)?;
        let auth = self.authorization("POST", &url, token, extra);

        let response = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, auth)
            .send()?;

        let body = Self::check(response, &url)?.text()?;
        Ok(url::form_urlencoded::parse(body.trim().as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect())
    }
}
