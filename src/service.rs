//! 目标服务及其注册表
//!
//! 每条命令在发送前解析出一个 [`Service`]，并把它作为显式参数交给 HTTP 客户端，
//! 不存在跨命令共享的“当前服务”。

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::info;

use crate::http::types::Url;
use crate::{Result, RukiteError};

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_true() -> bool {
    true
}

/// 一个被测服务的连接参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Service {
    pub base_uri: String,

    #[serde(default)]
    pub base_path: String,

    /// 未设置时使用 base_uri 中的端口或 scheme 默认端口
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_charset")]
    pub charset: String,

    #[serde(default = "default_true")]
    pub url_encoding_enabled: bool,
}

impl Service {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            base_path: String::new(),
            port: None,
            charset: default_charset(),
            url_encoding_enabled: true,
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_url_encoding(mut self, enabled: bool) -> Self {
        self.url_encoding_enabled = enabled;
        self
    }

    /// 计算请求的最终地址
    ///
    /// - 绝对地址（含 `://`）原样使用，常见于 Location header
    /// - 相对地址拼接为 `base_uri[:port] + base_path + uri`
    /// - `encode` 为 false 时查询参数按原样拼接，不做百分号编码
    pub fn endpoint(
        &self,
        uri: &str,
        query: &BTreeMap<String, String>,
        encode: bool,
    ) -> Result<url::Url> {
        let (path, inline_query) = uri.trim().split_once('?').unwrap_or((uri.trim(), ""));

        let base = if path.contains("://") {
            Url::parse(path)?
        } else {
            let mut base = Url::parse(&self.base_uri)?;
            if let Some(port) = self.port {
                base = base.with_port(port);
            }
            base.join_path(&self.base_path).join_path(path)
        };
        let base = base.append_query(inline_query);

        if !encode {
            let raw = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            return base.append_query(&raw).to_url();
        }

        let mut url = base.to_url()?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }
}

/// 服务注册表，按名称查找，可指定一个默认服务
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Service>,
    default: Option<String>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只有一个默认服务的注册表
    pub fn single(name: impl Into<String>, service: Service) -> Self {
        let name = name.into();
        let mut registry = Self::new();
        registry.register(name.clone(), service);
        registry.default = Some(name);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, service: Service) {
        self.services.insert(name.into(), service);
    }

    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default = Some(name.into());
    }

    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn default_service(&self) -> Option<&Service> {
        self.default.as_deref().and_then(|name| self.services.get(name))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// 解析命令的目标服务：显式指定的按名称查找，否则使用默认服务
    pub fn resolve(&self, name: Option<&str>) -> Result<&Service> {
        match name {
            Some(name) => {
                let service = self.get(name).ok_or_else(|| {
                    RukiteError::Configuration(format!("Service {} is not available", name))
                })?;
                info!("Sending request to {}", name);
                Ok(service)
            }
            None => {
                let service = self.default_service().ok_or_else(|| {
                    RukiteError::Configuration("No default service is configured".to_string())
                })?;
                info!("Sending request to default service");
                Ok(service)
            }
        }
    }
}
