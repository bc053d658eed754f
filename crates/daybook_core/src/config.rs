use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaybookConfig {
    pub llm: LlmConfig,
    pub moltbook: MoltbookConfig,
    pub pool: PoolConfig,
    pub run: RunConfig,
}

impl DaybookConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: DaybookConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_MAX_TOKENS") {
            if let Ok(n) = v.parse() {
                self.llm.max_tokens = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("MOLTBOOK_SUBMOLT") {
            self.moltbook.submolt = v;
        }
        if let Ok(v) = std::env::var("MOLTBOOK_BASE_URL") {
            self.moltbook.base_url = v;
        }
        if let Ok(v) = std::env::var("DAYBOOK_DATA_DIR") {
            self.run.data_dir = v;
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Character budget for yesterday's log excerpt embedded in the prompt.
    pub context_budget_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "deepseek".to_string(),
            model: "deepseek-chat".to_string(),
            base_url: None,
            max_tokens: 1600,
            temperature: 0.4,
            context_budget_chars: 2500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoltbookConfig {
    pub submolt: String,
    pub base_url: String,
    /// Disable to run the pipeline without posting (state is still persisted).
    pub enabled: bool,
}

impl Default for MoltbookConfig {
    fn default() -> Self {
        Self {
            submolt: "general".to_string(),
            base_url: "https://www.moltbook.com".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Days between review cycles when seeding a fresh pool. Clamped to >= 1.
    pub review_interval_days: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            review_interval_days: 7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root directory for persisted blobs (pool, daily logs, run-state, diagnostics).
    pub data_dir: String,
    /// Directory holding `<name>_system.md` prompt files.
    pub prompt_dir: String,
    /// Consecutive fatal runs before the agent refuses to start. 0 disables dormancy.
    pub dormancy_threshold: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            prompt_dir: "prompts".to_string(),
            dormancy_threshold: 5,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = DaybookConfig::default();
        assert_eq!(cfg.llm.provider, "deepseek");
        assert_eq!(cfg.llm.max_tokens, 1600);
        assert_eq!(cfg.moltbook.submolt, "general");
        assert_eq!(cfg.pool.review_interval_days, 7);
        assert_eq!(cfg.run.dormancy_threshold, 5);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[llm]
provider = "mock"
model = "test-model"
"#;
        let cfg: DaybookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.model, "test-model");
        // Defaults for unspecified fields
        assert_eq!(cfg.llm.temperature, 0.4);
        assert_eq!(cfg.run.data_dir, "data");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[llm]
provider = "deepseek"
model = "deepseek-chat"
base_url = "https://api.deepseek.com"
max_tokens = 2000
temperature = 0.5
context_budget_chars = 3000

[moltbook]
submolt = "growth"
base_url = "https://moltbook.example"
enabled = false

[pool]
review_interval_days = 14

[run]
data_dir = "memory"
prompt_dir = "agents"
dormancy_threshold = 3
"#;
        let cfg: DaybookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.llm.base_url.as_deref(), Some("https://api.deepseek.com"));
        assert_eq!(cfg.llm.max_tokens, 2000);
        assert_eq!(cfg.moltbook.submolt, "growth");
        assert!(!cfg.moltbook.enabled);
        assert_eq!(cfg.pool.review_interval_days, 14);
        assert_eq!(cfg.run.data_dir, "memory");
        assert_eq!(cfg.run.dormancy_threshold, 3);
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        std::env::set_var("LLM_PROVIDER", "mock");
        std::env::set_var("MOLTBOOK_SUBMOLT", "testing");

        let mut cfg = DaybookConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.moltbook.submolt, "testing");

        std::env::remove_var("LLM_PROVIDER");
        std::env::remove_var("MOLTBOOK_SUBMOLT");

        // Nonexistent path returns defaults (no env interference)
        let cfg = DaybookConfig::load_or_default("/nonexistent/daybook.toml");
        assert_eq!(cfg.llm.provider, "deepseek");
    }
}
