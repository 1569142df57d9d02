/// 网页标题客户端
///
/// 通过 CORS 代理获取目标网页 HTML，取出 `<title>` 文本
use crate::config::Config;
use crate::error::ApiError;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

/// 代理返回的结构
#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    contents: Option<String>,
}

/// 网页标题客户端
pub struct TitleClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TitleClient {
    /// 创建新的标题客户端
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            endpoint: config.title_proxy_url.clone(),
        }
    }

    /// 获取网页标题
    ///
    /// 页面没有 `<title>` 或标题为空时返回 `Ok(None)`
    pub async fn fetch_title(&self, url: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadResponse {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let data = response
            .json::<ProxyResponse>()
            .await
            .map_err(|source| ApiError::JsonParseFailed { source })?;

        let title = data.contents.as_deref().and_then(extract_title);
        debug!("网页标题: {:?}", title);
        Ok(title)
    }
}

/// 从 HTML 中取出第一个 `<title>` 的文本
///
/// 实体由 HTML 解析器解码，连续空白折叠为一个空格
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;

    let text: String = element.text().collect();
    let title = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>Example Domain</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Example Domain"));
    }

    #[test]
    fn test_extract_title_with_attributes_and_whitespace() {
        let html = "<HEAD><TITLE data-rh=\"true\">\n   Rust &amp; Cargo\n   Docs </TITLE></HEAD>";
        assert_eq!(extract_title(html).as_deref(), Some("Rust & Cargo Docs"));
    }

    #[test]
    fn test_missing_or_empty_title() {
        assert_eq!(extract_title("<html><body>hi</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }

    #[test]
    fn test_named_and_numeric_entities_decoded() {
        let html = "<title>Caf&eacute; &#8211; Home &#x27;s</title>";
        assert_eq!(extract_title(html).as_deref(), Some("Café – Home 's"));
    }

    #[test]
    fn test_first_title_wins() {
        let html = "<title>First</title><svg><title>Icon</title></svg>";
        assert_eq!(extract_title(html).as_deref(), Some("First"));
    }
}
