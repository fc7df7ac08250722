use thiserror::Error;

use crate::check::CheckError;

#[derive(Error, Debug)]
pub enum RukiteError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("'Location' is empty in header response, set a valid location or set 'automaticCheck' to false")]
    MissingLocation,

    #[error("{context} | {expected} expected but {actual} received.")]
    StatusMismatch {
        context: String,
        expected: u16,
        actual: u16,
    },

    /// 所有检查执行完毕后，最后一个失败检查的消息
    #[error("{0}")]
    CheckFailed(String),

    #[error("{0}")]
    CheckAssertion(String),

    #[error("Check [{description}] failed")]
    CheckAborted {
        description: String,
        #[source]
        source: CheckError,
    },

    #[error("分页错误: {0}")]
    Pagination(String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("无效的 Header: {0}")]
    InvalidHeader(String),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for RukiteError {
    fn from(err: anyhow::Error) -> Self {
        RukiteError::Other(err.to_string())
    }
}

impl From<toml::de::Error> for RukiteError {
    fn from(err: toml::de::Error) -> Self {
        RukiteError::ParseError(err.to_string())
    }
}

/// Result type for rukite crate
pub type Result<T> = std::result::Result<T, RukiteError>;
