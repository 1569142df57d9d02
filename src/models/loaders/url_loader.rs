use crate::error::{AppResult, InputError};
use std::path::Path;
use tokio::fs;

/// 补全协议头：没有 `http://` 或 `https://` 时加上 `https://`
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// 解析手动输入的 URL（每行一个）
pub fn parse_manual_input(text: &str) -> AppResult<Vec<String>> {
    let urls: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(normalize_url)
        .collect();

    if urls.is_empty() {
        return Err(InputError::EmptySubmission.into());
    }
    Ok(urls)
}

/// 从 CSV/TXT 内容中提取 URL
///
/// 每个单元格去掉空白后，含 `.` 且不含空白字符才算 URL；
/// 以 `http` 开头的保持原样，其余补 `https://`
pub fn parse_url_file_content(content: &str) -> Vec<String> {
    let mut urls = Vec::new();

    for line in content.lines() {
        for cell in split_csv_line(line) {
            let cell = cell.trim();
            if cell.is_empty() || !cell.contains('.') || cell.chars().any(char::is_whitespace) {
                continue;
            }
            if cell.starts_with("http") {
                urls.push(cell.to_string());
            } else {
                urls.push(format!("https://{}", cell));
            }
        }
    }

    urls
}

/// 从 `.csv` / `.txt` 文件加载 URL 列表
pub async fn load_urls_from_file(path: &Path) -> AppResult<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    if !matches!(extension.as_deref(), Some("csv") | Some("txt")) {
        return Err(InputError::UnsupportedFileType {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| InputError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    let urls = parse_url_file_content(&content);
    if urls.is_empty() {
        tracing::warn!("文件中没有找到 URL: {}", path.display());
        return Err(InputError::NoUrlsFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    tracing::info!(
        "✓ 从 {} 加载了 {} 个 URL",
        path.file_name().unwrap_or_default().to_string_lossy(),
        urls.len()
    );
    Ok(urls)
}

/// 按逗号拆分一行 CSV，双引号内的逗号不拆分，`""` 表示一个引号
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells
}
