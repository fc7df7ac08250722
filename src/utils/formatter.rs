use crate::http::Response;
use colored::*;
use tracing::info;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

/// 响应格式化器，用于日志与控制台输出
pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
    show_body: bool,
    show_headers: bool,
    show_timing: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
            show_body: true,
            show_headers: true,
            show_timing: true,
        }
    }

    /// 写入日志时关闭颜色
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_timing(mut self, show_timing: bool) -> Self {
        self.show_timing = show_timing;
        self
    }

    pub fn format(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response)];

        if self.show_timing {
            output.push(self.paint(
                format!("Time: {}ms", response.duration.as_millis()),
                |s| s.cyan(),
            ));
        }

        match self.format {
            ResponseFormat::Compact => {
                if self.show_body && !response.body.is_empty() {
                    if response.body.len() < 200 {
                        output.push(pretty_body(&response.body));
                    } else {
                        output.push(format!("Body: {} bytes", response.body.len()));
                    }
                }
            }
            ResponseFormat::Verbose => {
                if self.show_headers {
                    output.push(String::new());
                    output.push(self.paint("Headers:".to_string(), |s| s.blue().bold()));
                    for (key, value) in response.headers.iter() {
                        let value_str = value.to_str().unwrap_or("<invalid utf-8>");
                        output.push(
                            self.paint(format!("   {}: {}", key, value_str), |s| s.blue()),
                        );
                    }
                }
                if self.show_body && !response.body.is_empty() {
                    output.push(String::new());
                    output.push(self.paint("Body:".to_string(), |s| s.blue().bold()));
                    output.push(pretty_body(&response.body));
                }
            }
        }

        output.join("\n")
    }

    fn status_line(&self, response: &Response) -> String {
        let line = format!(
            "HTTP {} {}",
            response.status.code(),
            response.status.reason_phrase()
        );
        if !self.color {
            return line;
        }
        let colored = if response.is_success() {
            line.green()
        } else if response.is_client_error() {
            line.yellow()
        } else {
            line.red()
        };
        match self.format {
            ResponseFormat::Compact => colored.to_string(),
            ResponseFormat::Verbose => colored.bold().to_string(),
        }
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(&text).to_string()
        } else {
            text
        }
    }
}

/// 尝试将 body 格式化为漂亮的 JSON，不是有效 JSON 时原样返回
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

/// 失败前输出请求体与响应，便于排查
pub fn log_payloads(request_body: Option<&str>, response: &Response) {
    if let Some(body) = request_body.filter(|b| !b.is_empty()) {
        info!("REQUEST:\n{}", pretty_body(body));
    }
    let formatter = ResponseFormatter::new(ResponseFormat::Verbose).with_color(false);
    info!("RESPONSE:\n{}", formatter.format(response));
}
