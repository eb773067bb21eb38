use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 本地存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 表单校验错误（不会发送到服务端）
    #[error("校验错误: {0}")]
    Validation(#[from] validator::ValidationErrors),
    /// 流程状态错误
    #[error("流程错误: {0}")]
    Flow(#[from] FlowError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 终端读写错误
    #[error("终端错误: {0}")]
    Io(#[from] std::io::Error),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接失败或读取响应失败）
    #[error("API请求失败 ({endpoint}): {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回非 2xx 状态
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    Server {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 服务端拒绝请求数据（非 2xx 且带结构化错误体）
    #[error("服务端拒绝请求 ({endpoint}): status={status}, detail={detail}")]
    Rejected {
        endpoint: String,
        status: u16,
        detail: String,
    },
    /// 响应体解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 无法构造请求地址
    #[error("无效的请求地址 ({url}): {detail}")]
    InvalidUrl { url: String, detail: String },
}

impl ApiError {
    /// HTTP 状态码（网络错误与解析错误没有）
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 服务端不认识该标识（404 或 422）
    pub fn is_unknown_session(&self) -> bool {
        matches!(self.status(), Some(404) | Some(422))
    }

    /// 展示给用户的简短提示
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "Не удалось связаться с сервером. Попробуйте ещё раз.",
            ApiError::Rejected { .. } => "Сервер отклонил введённые данные. Проверьте их и попробуйте ещё раз.",
            ApiError::Server { .. } | ApiError::Decode { .. } | ApiError::InvalidUrl { .. } => {
                "Не удалось обработать запрос. Попробуйте ещё раз."
            }
        }
    }
}

/// 键值存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 读取存储文件失败
    #[error("读取存储失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入存储文件失败
    #[error("写入存储失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    /// 锁被污染
    #[error("存储锁已失效")]
    Poisoned,
}

/// 流程使用错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// 当前状态不接受该事件
    #[error("状态 {state} 不接受事件 {event}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建非法状态转换错误
    pub fn invalid_transition(state: &'static str, event: &'static str) -> Self {
        AppError::Flow(FlowError::InvalidTransition { state, event })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// API 调用结果类型
pub type ApiResult<T> = Result<T, ApiError>;
