// ABOUTME: YAML config loading with path discovery precedence chain
// ABOUTME: CLI flag → env var → ./config.yml → platform config dir

use crate::oauth::{Consumer, Token};
use crate::storage::write_private;
use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "HATENA_EXPORT_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.yml";
pub const DEFAULT_OUT_DIR: &str = "HatenaBlog";
pub const DEFAULT_API_BASE: &str = "https://blog.hatena.ne.jp";

/// What to do when two entries in one run map to the same file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later entry replaces the earlier file (logged as a warning)
    #[default]
    Overwrite,
    /// Later entry gets `_2`, `_3`, ... appended before `.md`
    Suffix,
}

/// OAuth1 endpoints used by the `authorize` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthEndpoints {
    pub request_token_url: String,
    pub authorize_url: String,
    pub access_token_url: String,
    pub scope: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            request_token_url: "https://www.hatena.com/oauth/initiate".into(),
            authorize_url: "https://www.hatena.ne.jp/oauth/authorize".into(),
            access_token_url: "https://www.hatena.com/oauth/token".into(),
            scope: "read_public,write_public,read_private,write_private".into(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Needed for export only; `authorize` works without a blog identity
    #[serde(default)]
    pub blog_id: String,
    #[serde(default)]
    pub user_id: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_true")]
    pub sign_media_requests: bool,
    #[serde(default)]
    pub on_collision: CollisionPolicy,
    #[serde(default)]
    pub oauth: OAuthEndpoints,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

fn default_true() -> bool {
    true
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("blog_id", &self.blog_id)
            .field("user_id", &self.user_id)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("access_token", &redact(&self.access_token))
            .field("access_token_secret", &redact(&self.access_token_secret))
            .field("out_dir", &self.out_dir)
            .field("api_base", &self.api_base)
            .field("sign_media_requests", &self.sign_media_requests)
            .field("on_collision", &self.on_collision)
            .field("oauth", &self.oauth)
            .finish()
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(Error::Filesystem(e)),
        };

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        require_non_empty(&[
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
        ])
    }

    /// Rewrites the file atomically, readable by the owner only.
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        write_private(path, yaml.as_bytes())
    }

    pub fn consumer(&self) -> Consumer {
        Consumer::new(&self.consumer_key, &self.consumer_secret)
    }

    /// Access token pair required by every feed request.
    pub fn access_token(&self) -> Result<Token> {
        match (&self.access_token, &self.access_token_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Ok(Token::new(key, secret))
            }
            _ => Err(Error::Config(
                "access_token and access_token_secret are required; run `hatena-export authorize` first"
                    .into(),
            )),
        }
    }

    /// Entry collection URL; fails when the blog identity is not configured.
    pub fn feed_url(&self) -> Result<String> {
        require_non_empty(&[("blog_id", &self.blog_id), ("user_id", &self.user_id)])?;
        Ok(format!(
            "{}/{}/{}/atom/entry",
            self.api_base.trim_end_matches('/'),
            self.user_id,
            self.blog_id
        ))
    }

    pub fn out_dir(&self, cli_out_dir: Option<PathBuf>) -> PathBuf {
        cli_out_dir
            .or_else(|| self.out_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }
}

fn require_non_empty(fields: &[(&str, &String)]) -> Result<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(Error::Config(format!("`{}` must not be empty", name)));
        }
    }
    Ok(())
}

pub fn resolve_config_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dirs) = ProjectDirs::from("", "", "hatena-export") {
        candidates.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }

    resolve_config_path_from(cli_path, env::var(CONFIG_ENV_VAR).ok(), &candidates)
}

fn resolve_config_path_from(
    cli_path: Option<PathBuf>,
    env_path: Option<String>,
    candidates: &[PathBuf],
) -> Result<PathBuf> {
    // 1. CLI flag
    if let Some(path) = cli_path {
        return Ok(path);
    }

    // 2. Environment variable
    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    // 3. Working directory, then platform config dir
    if let Some(path) = candidates.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    Err(Error::Config(format!(
        "No config file found. Provide via --config, {} or {}",
        CONFIG_ENV_VAR, CONFIG_FILE_NAME
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
blog_id: alice.hatenablog.com
user_id: alice
consumer_key: ck
consumer_secret: cs
access_token: at
access_token_secret: ats
"#;

    #[test]
    fn test_parse_minimal_applies_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.blog_id, "alice.hatenablog.com");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.sign_media_requests);
        assert_eq!(config.on_collision, CollisionPolicy::Overwrite);
        assert_eq!(config.oauth, OAuthEndpoints::default());
        assert!(config.out_dir.is_none());
    }

    #[test]
    fn test_parse_missing_field_is_config_error() {
        let err = Config::parse("blog_id: x\nuser_id: y\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_empty_consumer_secret() {
        let yaml = MINIMAL.replace("consumer_secret: cs", "consumer_secret: \"\"");
        let err = Config::parse(&yaml).unwrap_err();
        assert!(err.to_string().contains("consumer_secret"));
    }

    #[test]
    fn test_consumer_only_config_parses_for_authorize() {
        let config = Config::parse("consumer_key: ck\nconsumer_secret: cs\n").unwrap();
        assert_eq!(config.consumer().key, "ck");
        assert!(config.blog_id.is_empty());

        let err = config.feed_url().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("blog_id"));
    }

    #[test]
    fn test_feed_url_requires_user_id() {
        let yaml = MINIMAL.replace("user_id: alice", "user_id: \"\"");
        let config = Config::parse(&yaml).unwrap();
        assert!(config.feed_url().unwrap_err().to_string().contains("user_id"));
    }

    #[test]
    fn test_parse_optional_keys() {
        let yaml = format!(
            "{}out_dir: /tmp/blog\non_collision: suffix\nsign_media_requests: false\noauth:\n  scope: read_public\n",
            MINIMAL
        );
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.out_dir, Some(PathBuf::from("/tmp/blog")));
        assert_eq!(config.on_collision, CollisionPolicy::Suffix);
        assert!(!config.sign_media_requests);
        assert_eq!(config.oauth.scope, "read_public");
        assert_eq!(
            config.oauth.access_token_url,
            "https://www.hatena.com/oauth/token"
        );
    }

    #[test]
    fn test_feed_url() {
        let mut config = Config::parse(MINIMAL).unwrap();
        assert_eq!(
            config.feed_url().unwrap(),
            "https://blog.hatena.ne.jp/alice/alice.hatenablog.com/atom/entry"
        );

        config.api_base = "http://127.0.0.1:8080/".into();
        assert_eq!(
            config.feed_url().unwrap(),
            "http://127.0.0.1:8080/alice/alice.hatenablog.com/atom/entry"
        );
    }

    #[test]
    fn test_access_token_required() {
        let yaml = MINIMAL.replace("access_token_secret: ats\n", "");
        let config = Config::parse(&yaml).unwrap();
        assert!(matches!(config.access_token(), Err(Error::Config(_))));

        let config = Config::parse(MINIMAL).unwrap();
        let token = config.access_token().unwrap();
        assert_eq!(token.key, "at");
        assert_eq!(token.secret, "ats");
    }

    #[test]
    fn test_out_dir_precedence() {
        let mut config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.out_dir(None), PathBuf::from(DEFAULT_OUT_DIR));

        config.out_dir = Some("from-config".into());
        assert_eq!(config.out_dir(None), PathBuf::from("from-config"));
        assert_eq!(
            config.out_dir(Some("from-cli".into())),
            PathBuf::from("from-cli")
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::parse(MINIMAL).unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("ats"));
        assert!(!debug.contains("\"cs\""));
    }

    #[test]
    fn test_load_and_save_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        let yaml = MINIMAL.replace("access_token: at\naccess_token_secret: ats\n", "");
        fs::write(&path, yaml).unwrap();

        let mut config = Config::load(&path).unwrap();
        assert!(config.access_token.is_none());

        config.access_token = Some("new_token".into());
        config.access_token_secret = Some("new_secret".into());
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.access_token.as_deref(), Some("new_token"));
        assert_eq!(reloaded.blog_id, "alice.hatenablog.com");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::metadata(&path).unwrap().permissions();
            assert_eq!(perms.mode() & 0o777, 0o600);
        }
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(&temp.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_resolve_config_path_precedence() {
        let temp = TempDir::new().unwrap();
        let existing = temp.path().join("config.yml");
        fs::write(&existing, MINIMAL).unwrap();
        let candidates = vec![temp.path().join("absent.yml"), existing.clone()];

        let path =
            resolve_config_path_from(Some("cli.yml".into()), Some("env.yml".into()), &candidates)
                .unwrap();
        assert_eq!(path, PathBuf::from("cli.yml"));

        let path = resolve_config_path_from(None, Some("env.yml".into()), &candidates).unwrap();
        assert_eq!(path, PathBuf::from("env.yml"));

        let path = resolve_config_path_from(None, Some(String::new()), &candidates).unwrap();
        assert_eq!(path, existing);

        let err = resolve_config_path_from(None, None, &candidates[..1]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
