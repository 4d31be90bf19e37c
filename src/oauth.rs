// ABOUTME: OAuth1 HMAC-SHA1 request signing (RFC 5849)
// ABOUTME: Builds signature base strings and Authorization headers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// Client credentials identifying the registered application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumer {
    pub key: String,
    pub secret: String,
}

impl Consumer {
    pub fn new(key: &str, secret: &str) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// Request or access token issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub key: String,
    pub secret: String,
}

impl Token {
    pub fn new(key: &str, secret: &str) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

pub struct Signer<'a> {
    consumer: &'a Consumer,
    token: Option<&'a Token>,
}

impl<'a> Signer<'a> {
    pub fn new(consumer: &'a Consumer, token: Option<&'a Token>) -> Self {
        Self { consumer, token }
    }

    /// Authorization header for a request without a form body.
    ///
    /// `oauth_extra` carries protocol parameters beyond the standard set,
    /// such as `oauth_callback` or `oauth_verifier`.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &Url,
        oauth_extra: &[(&str, &str)],
    ) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = chrono::Utc::now().timestamp();

        self.authorization_header_with(method, url, &[], oauth_extra, &nonce, timestamp)
    }

    fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        form: &[(&str, &str)],
        oauth_extra: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let mut oauth_params: Vec<(String, String)> = vec![
            ("oauth_consumer_key".into(), self.consumer.key.clone()),
            ("oauth_nonce".into(), nonce.into()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), timestamp.to_string()),
            ("oauth_version".into(), "1.0".into()),
        ];
        if let Some(token) = self.token {
            oauth_params.push(("oauth_token".into(), token.key.clone()));
        }
        for (k, v) in oauth_extra {
            oauth_params.push(((*k).into(), (*v).into()));
        }

        let mut all_params = oauth_params.clone();
        all_params.extend(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())));
        all_params.extend(form.iter().map(|(k, v)| ((*k).into(), (*v).into())));

        let base = signature_base_string(method, url, &all_params);
        let signature = self.sign(&base);

        oauth_params.push(("oauth_signature".into(), signature));
        oauth_params.sort();

        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }

    fn sign(&self, base: &str) -> String {
        let key = format!(
            "{}&{}",
            encode(&self.consumer.secret),
            self.token.map(|t| encode(&t.secret)).unwrap_or_default()
        );
        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Base URI without query or fragment, default ports elided.
fn base_string_uri(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let port = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
    format!("{}://{}{}{}", url.scheme(), host, port, url.path())
}

pub(crate) fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> =
        params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(&base_string_uri(url)),
        encode(&normalized)
    )
}
