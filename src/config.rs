use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;

use crate::model::DEFAULT_DEEPSEEK_TIMEOUT;

#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub model_provider: String,
    pub project_root: PathBuf,
    pub credentials_path: PathBuf,
    pub openai: ProviderEndpoint,
    pub claude: ProviderEndpoint,
    pub deepseek: ProviderEndpoint,
    pub deepseek_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT").unwrap_or_else(|| "8000".to_owned());
        let http_bind = lookup("HTTP_BIND").unwrap_or_else(|| format!("0.0.0.0:{port}"));
        let http_bind = http_bind
            .parse()
            .with_context(|| format!("invalid HTTP bind address `{http_bind}`"))?;

        let project_root = match lookup("AIRA_ROOT") {
            Some(root) => PathBuf::from(root),
            None => env::current_dir().context("failed to resolve current directory")?,
        };
        let credentials_path = lookup("AIRA_CREDENTIALS")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_root.join("A.I.s").join("apikeys.json"));

        Ok(Self {
            http_bind,
            model_provider: lookup("MODEL_PROVIDER").unwrap_or_else(|| "live".to_owned()),
            project_root,
            credentials_path,
            openai: ProviderEndpoint {
                base_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| "https://api.openai.com".to_owned()),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_owned()),
            },
            claude: ProviderEndpoint {
                base_url: lookup("ANTHROPIC_BASE_URL")
                    .unwrap_or_else(|| "https://api.anthropic.com".to_owned()),
                model: lookup("CLAUDE_MODEL")
                    .unwrap_or_else(|| "claude-3-5-sonnet-20241022".to_owned()),
            },
            deepseek: ProviderEndpoint {
                base_url: lookup("DEEPSEEK_BASE_URL")
                    .unwrap_or_else(|| "https://api.deepseek.com".to_owned()),
                model: lookup("DEEPSEEK_MODEL").unwrap_or_else(|| "deepseek-chat".to_owned()),
            },
            deepseek_timeout: lookup("DEEPSEEK_TIMEOUT_SEC")
                .and_then(|raw| raw.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_DEEPSEEK_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf, time::Duration};

    use super::AppConfig;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_match_the_public_endpoints() {
        let config = config_from(&[("AIRA_ROOT", "/srv/aira")]).expect("config should build");

        assert_eq!(config.http_bind.port(), 8000);
        assert_eq!(config.model_provider, "live");
        assert_eq!(
            config.credentials_path,
            PathBuf::from("/srv/aira/A.I.s/apikeys.json")
        );
        assert_eq!(config.openai.base_url, "https://api.openai.com");
        assert_eq!(config.claude.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.deepseek.model, "deepseek-chat");
        assert_eq!(config.deepseek_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("AIRA_ROOT", "/srv/aira"),
            ("PORT", "9001"),
            ("MODEL_PROVIDER", "mock"),
            ("AIRA_CREDENTIALS", "/etc/aira/keys.json"),
            ("DEEPSEEK_BASE_URL", "http://127.0.0.1:4000"),
            ("DEEPSEEK_TIMEOUT_SEC", "5"),
        ])
        .expect("config should build");

        assert_eq!(config.http_bind.to_string(), "0.0.0.0:9001");
        assert_eq!(config.model_provider, "mock");
        assert_eq!(config.credentials_path, PathBuf::from("/etc/aira/keys.json"));
        assert_eq!(config.deepseek.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.deepseek_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let config = config_from(&[("AIRA_ROOT", "/srv"), ("DEEPSEEK_TIMEOUT_SEC", "soon")])
            .expect("config should build");

        assert_eq!(config.deepseek_timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_bind_address_is_rejected() {
        let error = config_from(&[("AIRA_ROOT", "/srv"), ("HTTP_BIND", "not-an-address")])
            .expect_err("bad bind should fail");

        assert!(error.to_string().contains("not-an-address"));
    }
}
