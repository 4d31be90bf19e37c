// ABOUTME: Interactive three-legged OAuth1 flow for obtaining access tokens
// ABOUTME: Request token → user authorization (PIN) → access token

use crate::api::ApiClient;
use crate::config::OAuthEndpoints;
use crate::oauth::Token;
use crate::{Error, Result};
use std::io::{BufRead, Write};
use url::Url;

pub const OUT_OF_BAND_CALLBACK: &str = "oob";

fn field(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

fn token_from(params: &[(String, String)], step: &str) -> Result<Token> {
    match (field(params, "oauth_token"), field(params, "oauth_token_secret")) {
        (Some(key), Some(secret)) => Ok(Token { key, secret }),
        _ => Err(Error::Auth(format!(
            "{} response is missing oauth_token or oauth_token_secret",
            step
        ))),
    }
}

/// Temporary credentials awaiting the user's approval.
#[derive(Debug, Clone)]
pub struct RequestToken {
    pub token: Token,
}

/// Long-lived credentials ready for the config file.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: Token,
    /// Hatena ID of the authorizing user, when the provider reports it
    pub url_name: Option<String>,
}

pub struct AuthorizationFlow<'a> {
    client: &'a ApiClient,
    endpoints: &'a OAuthEndpoints,
}

impl<'a> AuthorizationFlow<'a> {
    pub fn new(client: &'a ApiClient, endpoints: &'a OAuthEndpoints) -> Self {
        Self { client, endpoints }
    }

    pub fn request_token(&self) -> Result<RequestToken> {
        let mut url = Url::parse(&self.endpoints.request_token_url)
            .map_err(|e| Error::Config(format!("invalid request_token_url: {}", e)))?;
        if !self.endpoints.scope.is_empty() {
            url.query_pairs_mut().append_pair("scope", &self.endpoints.scope);
        }

        let params = self
            .client
            .oauth_post(url.as_str(), None, &[("oauth_callback", OUT_OF_BAND_CALLBACK)])
            .map_err(into_auth_error)?;

        Ok(RequestToken {
            token: token_from(&params, "request token")?,
        })
    }

    pub fn authorization_url(&self, request: &RequestToken) -> Result<Url> {
        let mut url = Url::parse(&self.endpoints.authorize_url)
            .map_err(|e| Error::Config(format!("invalid authorize_url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("oauth_token", &request.token.key);
        Ok(url)
    }

    pub fn access_token(&self, request: RequestToken, verifier: &str) -> Result<AccessToken> {
        let params = self
            .client
            .oauth_post(
                &self.endpoints.access_token_url,
                Some(&request.token),
                &[("oauth_verifier", verifier)],
            )
            .map_err(into_auth_error)?;

        Ok(AccessToken {
            token: token_from(&params, "access token")?,
            url_name: field(&params, "url_name"),
        })
    }
}

/// Provider rejections become `Auth` errors; transport errors pass through.
fn into_auth_error(e: Error) -> Error {
    match e {
        Error::Api {
            endpoint,
            status,
            message,
        } => Error::Auth(format!("{} rejected with {}: {}", endpoint, status, message)),
        other => other,
    }
}

/// Prompts for the verifier PIN and returns it trimmed.
pub fn read_verifier<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "Enter the PIN (oauth_verifier) provided by Hatena: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let pin = line.trim().to_string();
    if pin.is_empty() {
        return Err(Error::Auth("no verifier entered".into()));
    }
    Ok(pin)
}

/// Runs the whole flow against the console.
pub fn run_interactive<R: BufRead, W: Write>(
    flow: &AuthorizationFlow<'_>,
    open_browser: bool,
    input: &mut R,
    output: &mut W,
) -> Result<AccessToken> {
    let request = flow.request_token()?;
    writeln!(output, "Request Token: {}", request.token.key)?;

    let url = flow.authorization_url(&request)?;
    writeln!(output, "Go to the following URL and authorize:")?;
    writeln!(output, "{}", url)?;

    if open_browser {
        if let Err(e) = open::that(url.as_str()) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    let verifier = read_verifier(input, output)?;
    let access = flow.access_token(request, &verifier)?;

    if let Some(name) = &access.url_name {
        writeln!(output, "Authorized as: {}", name)?;
    }

    Ok(access)
}
