use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable consulted for the assistant credential when the
/// config does not name one.
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

fn default_payment_link() -> String {
    crate::catalog::DEFAULT_PAYMENT_LINK.to_string()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_gateway_addr() -> String {
    "127.0.0.1:3000".to_string()
}

/// Top-level configuration loaded from `config.yaml`.
///
/// Every section is optional; a missing file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Where the catalog comes from and how it is presented.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Published CSV export of the catalog sheet. Takes precedence over
    /// the seed file when reachable.
    #[serde(default)]
    pub sheet_url: Option<String>,
    /// YAML seed list of tools. Relative paths resolve against the
    /// toolshelf home.
    #[serde(default)]
    pub seed_path: Option<String>,
    /// Checkout link for tools without their own payment link.
    #[serde(default = "default_payment_link")]
    pub default_payment_link: String,
    /// Explanatory blurb per category, shown when that category is selected.
    #[serde(default)]
    pub category_definitions: BTreeMap<String, String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sheet_url: None,
            seed_path: None,
            default_payment_link: default_payment_link(),
            category_definitions: BTreeMap::new(),
        }
    }
}

impl CatalogConfig {
    /// Absolute path of the seed file, if one is configured.
    pub fn resolved_seed_path(&self) -> Option<PathBuf> {
        let raw = self.seed_path.as_deref().filter(|p| !p.trim().is_empty())?;
        let path = Path::new(raw);
        if path.is_relative() {
            Some(crate::toolshelf_home().join(path))
        } else {
            Some(path.to_path_buf())
        }
    }
}

/// Backend kind for the assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Google Gemini `generateContent` API.
    #[default]
    Gemini,
    /// Any OpenAI-style chat completions endpoint.
    OpenaiCompat,
}

/// Assistant backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL (Gemini) or full completions URL (OpenAI-compatible).
    /// `None` uses the provider's public endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Credential: plain text or `$ENV_VAR` reference. Falls back to the
    /// `API_KEY` environment variable when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// File whose contents replace the built-in instruction template.
    #[serde(default)]
    pub instruction_path: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            instruction_path: None,
        }
    }
}

impl AssistantConfig {
    /// Resolve the credential. `None` means the assistant is unavailable.
    pub fn resolve_api_key(&self) -> Option<String> {
        match self.api_key.as_deref() {
            Some(raw) => resolve_secret(raw),
            None => std::env::var(DEFAULT_API_KEY_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

/// Expand `$VAR` references; empty values resolve to `None`.
pub fn resolve_secret(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let value = match raw.strip_prefix('$') {
        Some(var) => std::env::var(var).ok()?,
        None => raw.to_string(),
    };
    (!value.trim().is_empty()).then_some(value)
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_addr")]
    pub addr: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            addr: default_gateway_addr(),
        }
    }
}

impl GatewayConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.addr
            .parse()
            .with_context(|| format!("config: invalid gateway addr '{}'", self.addr))
    }
}

impl Config {
    /// Read and parse a YAML configuration file.
    ///
    /// A missing file falls back to `<path>.bak`, then to defaults.
    pub async fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(c) => Some(c),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut bak_name = path.as_os_str().to_os_string();
                bak_name.push(".bak");
                let bak_path = PathBuf::from(bak_name);
                match tokio::fs::read_to_string(&bak_path).await {
                    Ok(c) => {
                        tracing::warn!(
                            path = %path.display(),
                            bak = %bak_path.display(),
                            "config file not found, falling back to .bak"
                        );
                        Some(c)
                    }
                    Err(_) => {
                        tracing::info!(
                            path = %path.display(),
                            "config file not found, using defaults"
                        );
                        None
                    }
                }
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        };

        let config = match contents {
            Some(c) => Config::parse(&c)?,
            None => Config::default(),
        };

        tracing::debug!(
            sheet = config.catalog.sheet_url.is_some(),
            seed = config.catalog.seed_path.is_some(),
            provider = ?config.assistant.provider,
            "configuration loaded"
        );

        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        // An empty file is a valid, all-defaults config.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config =
            serde_yaml_ng::from_str(contents).context("failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate semantic constraints that serde cannot enforce.
    fn validate(&self) -> anyhow::Result<()> {
        self.gateway.socket_addr()?;

        if self.assistant.model.trim().is_empty() {
            anyhow::bail!("config: assistant model must not be empty");
        }

        if let Some(url) = &self.catalog.sheet_url {
            if !url.trim().is_empty()
                && !(url.starts_with("http://") || url.starts_with("https://"))
            {
                anyhow::bail!("config: catalog sheet_url must be an http(s) URL: {url}");
            }
        }

        Ok(())
    }

    /// Serialize and write the configuration back to a YAML file.
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_yaml_ng::to_string(self).context("serialize config YAML")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create config dir: {}", parent.display()))?;
        }
        tokio::fs::write(path, &contents)
            .await
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_all_defaults() {
        let cfg = Config::parse("").unwrap();
        assert!(cfg.catalog.sheet_url.is_none());
        assert_eq!(cfg.assistant.provider, ProviderKind::Gemini);
        assert_eq!(cfg.assistant.model, "gemini-3-flash-preview");
        assert_eq!(cfg.gateway.addr, "127.0.0.1:3000");
        assert_eq!(
            cfg.catalog.default_payment_link,
            crate::catalog::DEFAULT_PAYMENT_LINK
        );
    }

    #[test]
    fn provider_kind_is_kebab_case() {
        let cfg = Config::parse("assistant:\n  provider: openai-compat\n  model: llama3\n").unwrap();
        assert_eq!(cfg.assistant.provider, ProviderKind::OpenaiCompat);
        assert!(Config::parse("assistant:\n  provider: copilot\n").is_err());
    }

    #[test]
    fn invalid_gateway_addr_rejected() {
        let err = Config::parse("gateway:\n  addr: not-an-addr\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid gateway addr"));
    }

    #[test]
    fn non_http_sheet_url_rejected() {
        assert!(Config::parse("catalog:\n  sheet_url: ftp://example.com/x.csv\n").is_err());
    }

    #[test]
    fn literal_secret_passes_through() {
        assert_eq!(resolve_secret("  sk-123 ").as_deref(), Some("sk-123"));
        assert_eq!(resolve_secret(""), None);
        assert_eq!(resolve_secret("$TOOLSHELF_TEST_SURELY_UNSET_VAR"), None);
    }

    #[test]
    fn absolute_seed_path_kept() {
        let cfg = CatalogConfig {
            seed_path: Some("/srv/catalog.yaml".into()),
            ..CatalogConfig::default()
        };
        assert_eq!(
            cfg.resolved_seed_path(),
            Some(PathBuf::from("/srv/catalog.yaml"))
        );
        assert_eq!(CatalogConfig::default().resolved_seed_path(), None);
    }
}
