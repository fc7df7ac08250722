use std::collections::BTreeMap;

use reqwest::header::{HeaderMap as Headers, HeaderName, HeaderValue};

use crate::http::types::Method;
use crate::{Result, RukiteError};
use serde::Serialize;

/// 一次待发送的请求
///
/// `uri` 可以是绝对地址，也可以是相对于目标服务的路径，
/// 由 [`Client`](crate::http::Client) 在发送时结合 [`Service`](crate::service::Service) 解析。
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub query_params: BTreeMap<String, String>,
    /// 覆盖服务级别的 URL 编码开关
    pub url_encoding: Option<bool>,
}

impl Request {
    pub fn new(method: &str, uri: &str) -> Result<Self> {
        Ok(Self::from_method(method.parse()?, uri))
    }

    pub fn from_method(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            headers: Headers::new(),
            body: None,
            query_params: BTreeMap::new(),
            url_encoding: None,
        }
    }

    fn insert_header(&mut self, key: &str, value: &str) -> Result<()> {
        let header_name: HeaderName = key
            .parse()
            .map_err(|_| RukiteError::InvalidHeader(format!("invalid header name '{}'", key)))?;
        let header_value: HeaderValue = value.parse().map_err(|_| {
            RukiteError::InvalidHeader(format!("invalid value for header '{}'", key))
        })?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        self.insert_header(key, value)?;
        Ok(self)
    }

    pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_string(data)?;
        self.insert_header("Content-Type", "application/json")?;
        self.body = Some(json);
        Ok(self)
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_url_encoding(mut self, enabled: Option<bool>) -> Self {
        self.url_encoding = enabled;
        self
    }
}
