use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "prof_test.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 API 根地址
    pub api_base_url: String,
    /// 会话存储文件（对应浏览器的 localStorage）
    pub session_file: String,
    /// 选择答案后自动跳到下一题的延迟（毫秒）
    pub advance_delay_ms: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/backend/api/".to_string(),
            session_file: ".prof_test_session.json".to_string(),
            advance_delay_ms: 300,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 只从环境变量读取，缺省值取 `Default`
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 先读取 TOML 配置文件，再用环境变量覆盖
    ///
    /// 文件路径取 `PROF_TEST_CONFIG`，否则为当前目录下的 `prof_test.toml`
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("PROF_TEST_CONFIG").ok();
        Ok(Self::load_from(explicit.as_deref())?.with_env_overrides())
    }

    /// 读取配置文件，不应用环境变量覆盖
    ///
    /// 明确指定的文件必须存在；默认文件不存在时使用 `Default`
    pub fn load_from(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_toml_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// 解析 TOML 配置文件
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            session_file: std::env::var("SESSION_FILE").unwrap_or(self.session_file),
            advance_delay_ms: std::env::var("ADVANCE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(self.advance_delay_ms),
            verbose_logging: std::env::var("VERBOSE_LOGGING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(self.verbose_logging),
        }
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }
}
