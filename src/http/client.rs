use std::time::Duration;

use tracing::debug;

use crate::Result;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::service::Service;

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// 按目标服务的连接参数发送请求
    ///
    /// 服务配置随每次调用显式传入，客户端本身不保存任何目标信息。
    pub async fn execute(&self, request: Request, service: &Service) -> Result<Response> {
        let encode = request.url_encoding.unwrap_or(service.url_encoding_enabled);
        let url = service.endpoint(&request.uri, &request.query_params, encode)?;
        debug!(method = %request.method, %url, "sending request");

        let mut req = self
            .inner
            .request(request.method.into(), url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let start = std::time::Instant::now();
        let response = req.send().await?;
        let duration = start.elapsed();

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text_with_charset(&service.charset).await?;

        Response::new(status, headers, body, duration)
    }
}
