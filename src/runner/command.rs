use std::time::Duration;

use tracing::{info, warn};

use crate::check::{CheckRunner, OperatorRegistry};
use crate::context::ScenarioContext;
use crate::http::types::{Method, Status};
use crate::http::{Client, Request, Response};
use crate::scenario::{Command, Pagination};
use crate::service::Service;
use crate::utils::{ResponseFormat, ResponseFormatter, log_payloads};
use crate::{Result, RukiteError};

const APPLICATION_JSON: &str = "application/json";

/// 单条命令的执行器
///
/// 负责等待、服务解析、按动词分发、状态校验、检查与上下文更新。
#[derive(Clone)]
pub struct CommandRunner {
    client: Client,
    checks: CheckRunner,
}

impl CommandRunner {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            checks: CheckRunner::default(),
        }
    }

    /// 使用自定义运算符注册表
    pub fn with_operators(client: Client, registry: OperatorRegistry) -> Self {
        Self {
            client,
            checks: CheckRunner::new(registry),
        }
    }

    pub async fn execute(&self, command: &Command, context: &mut ScenarioContext) -> Result<()> {
        if let Some(description) = &command.description {
            info!("{}...", description);
        }

        if command.disabled {
            warn!("[{}] Disabled command: skipped", command.label());
            return Ok(());
        }

        if command.wait > 0 {
            info!("Waiting for {}ms...", command.wait);
            tokio::time::sleep(Duration::from_millis(command.wait)).await;
        }

        // 服务配置按值取出，之后才能修改上下文
        let service = context.services().resolve(command.service.as_deref())?.clone();

        let method = Method::parse(&command.verb).map_err(|_| unsupported(&command.verb))?;
        match method {
            Method::Post | Method::Patch => {
                self.create_or_update(method, command, &service, context)
                    .await?
            }
            Method::Get => self.get(command, &service, context).await?,
            Method::Put => self.put(command, &service, context).await?,
            Method::Delete => self.delete(command, &service, context).await?,
            Method::Head | Method::Options => return Err(unsupported(&command.verb)),
        }

        info!("[{}] OK", command.label());
        Ok(())
    }

    /// POST / PATCH
    ///
    /// 先记录响应体再校验状态，状态不符时不再执行检查。
    async fn create_or_update(
        &self,
        method: Method,
        command: &Command,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<()> {
        let (request, body) = self.prepare(method, command, context)?;
        info!(
            "[{}] {} {} (expecting {})",
            command.label(),
            method,
            request.uri,
            command.expected_status()
        );

        let response = self.send(request, service, context).await?;
        context.record_body(command.name.as_deref(), &response.body);

        self.assert_status(command, command.expected_status(), &response, body.as_deref())?;
        self.run_checks(command, &response, body.as_deref(), context)?;

        if command.automatic_check() {
            self.verify_created(command, &response, service, context)
                .await?;
        }
        Ok(())
    }

    /// 自动检查：GET 新资源的 Location，期望 200
    async fn verify_created(
        &self,
        command: &Command,
        response: &Response,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<()> {
        let location = response
            .location()
            .ok_or(RukiteError::MissingLocation)?
            .to_string();

        info!("Checking resource: {}...", location);
        let mut request = Request::from_method(Method::Get, &location)
            .with_header("Accept", APPLICATION_JSON)?
            .with_url_encoding(command.url_encoding_enabled);
        for (key, value) in &command.headers {
            request = request.with_header(key, &context.resolve(value))?;
        }

        let check = self.client.execute(request, service).await?;
        if check.status.code() != Status::OK {
            log_payloads(None, &check);
            return Err(RukiteError::StatusMismatch {
                context: format!("Checking resource {}", location),
                expected: Status::OK,
                actual: check.status.code(),
            });
        }

        if let Some(name) = &command.name {
            context.add_location(name.clone(), location);
        }
        Ok(())
    }

    async fn get(
        &self,
        command: &Command,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<()> {
        match &command.pagination {
            Some(pagination) => {
                self.paginated_get(command, pagination, service, context)
                    .await
            }
            None => {
                let response = self.perform_get(command, None, service, context).await?;
                self.run_checks(command, &response, None, context)
            }
        }
    }

    /// 单次 GET：立即校验状态，然后记录响应体
    async fn perform_get(
        &self,
        command: &Command,
        page: Option<(&Pagination, i64)>,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<Response> {
        let (mut request, _) = self.prepare(Method::Get, command, context)?;
        request = request.with_header("Content-Type", APPLICATION_JSON)?;
        if let Some((pagination, page)) = page {
            request = request
                .with_query(&pagination.page_parameter_name, &page.to_string())
                .with_query(
                    &pagination.size_parameter_name,
                    &pagination.size.to_string(),
                );
        }
        info!(
            "[{}] GET {} (expecting {})",
            command.label(),
            request.uri,
            command.expected_status()
        );

        let response = self.send(request, service, context).await?;
        self.assert_status(command, command.expected_status(), &response, None)?;
        context.record_body(command.name.as_deref(), &response.body);
        Ok(response)
    }

    /// 分页 GET：总页数在每一页的响应中重新读取
    async fn paginated_get(
        &self,
        command: &Command,
        pagination: &Pagination,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<()> {
        let mut page = pagination.start_page;
        let mut total = pagination.start_page;

        while page <= total {
            let response = self
                .perform_get(command, Some((pagination, page)), service, context)
                .await?;
            total = pagination.total_pages(&response.body)?;
            self.run_checks(command, &response, None, context)?;
            page += 1;
        }
        Ok(())
    }

    /// PUT：状态在记录响应体之前校验，没有自动检查
    async fn put(
        &self,
        command: &Command,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<()> {
        let (request, body) = self.prepare(Method::Put, command, context)?;
        info!(
            "[{}] PUT {} (expecting {})",
            command.label(),
            request.uri,
            command.expected_status()
        );

        let response = self.send(request, service, context).await?;
        self.assert_status(command, command.expected_status(), &response, body.as_deref())?;
        context.record_body(command.name.as_deref(), &response.body);
        self.run_checks(command, &response, body.as_deref(), context)
    }

    /// DELETE：从不记录响应体，自动检查时要求资源已返回 404
    async fn delete(
        &self,
        command: &Command,
        service: &Service,
        context: &mut ScenarioContext,
    ) -> Result<()> {
        let (request, body) = self.prepare(Method::Delete, command, context)?;
        let uri = request.uri.clone();
        info!(
            "[{}] DELETE {} (expecting {})",
            command.label(),
            uri,
            command.expected_status()
        );

        let response = self.send(request, service, context).await?;
        self.assert_status(command, command.expected_status(), &response, body.as_deref())?;
        self.run_checks(command, &response, body.as_deref(), context)?;

        if command.automatic_check() {
            info!("Checking resource: {}...", uri);
            let request = Request::from_method(Method::Get, &uri)
                .with_header("Content-Type", APPLICATION_JSON)?
                .with_url_encoding(command.url_encoding_enabled);
            let check = self.client.execute(request, service).await?;
            if check.status.code() != Status::NOT_FOUND {
                log_payloads(None, &check);
                return Err(RukiteError::StatusMismatch {
                    context: format!("Checking deleted resource {}", uri),
                    expected: Status::NOT_FOUND,
                    actual: check.status.code(),
                });
            }
        }
        Ok(())
    }

    /// 展开 URI、header 与请求体模板
    fn prepare(
        &self,
        method: Method,
        command: &Command,
        context: &ScenarioContext,
    ) -> Result<(Request, Option<String>)> {
        let uri = context.resolve(&command.uri);
        let mut request =
            Request::from_method(method, &uri).with_url_encoding(command.url_encoding_enabled);

        if matches!(method, Method::Post | Method::Patch | Method::Put | Method::Delete) {
            request = request.with_header("Content-Type", APPLICATION_JSON)?;
        }
        for (key, value) in &command.headers {
            request = request.with_header(key, &context.resolve(value))?;
        }

        let body = command
            .body_template()?
            .map(|template| context.resolve(&template));
        if let Some(body) = &body {
            request = request.with_body(body);
        }
        Ok((request, body))
    }

    async fn send(
        &self,
        request: Request,
        service: &Service,
        context: &ScenarioContext,
    ) -> Result<Response> {
        let response = self.client.execute(request, service).await?;
        if context.must_log() {
            let formatter = ResponseFormatter::new(ResponseFormat::Compact).with_color(false);
            info!("{}", formatter.format(&response));
        }
        Ok(response)
    }

    fn assert_status(
        &self,
        command: &Command,
        expected: u16,
        response: &Response,
        request_body: Option<&str>,
    ) -> Result<()> {
        let actual = response.status.code();
        if actual == expected {
            return Ok(());
        }
        log_payloads(request_body, response);
        Err(RukiteError::StatusMismatch {
            context: command
                .description
                .clone()
                .unwrap_or_else(|| format!("[{}] {}", command.label(), command.verb.to_uppercase())),
            expected,
            actual,
        })
    }

    /// 检查中的占位符在执行前展开，全部执行后返回最后一个失败
    fn run_checks(
        &self,
        command: &Command,
        response: &Response,
        request_body: Option<&str>,
        context: &ScenarioContext,
    ) -> Result<()> {
        if command.checks.is_empty() {
            return Ok(());
        }
        let checks = context.resolve_checks(&command.checks);
        self.checks
            .run(&checks, response, request_body)?
            .into_result()
    }
}

fn unsupported(verb: &str) -> RukiteError {
    RukiteError::Configuration(format!(
        "Verb {} is not supported",
        verb.trim().to_uppercase()
    ))
}
