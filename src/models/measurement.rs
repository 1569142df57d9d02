use std::fmt;

use serde::{Deserialize, Serialize};

/// 四项 Lighthouse 分数，取值 0-100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

/// 测量结果
///
/// 实时与演示两种数据源返回同一结构，`error` 有值表示这次测量失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementOutcome {
    pub name: String,
    pub page_status: u16,
    pub scores: Scores,
    pub error: Option<String>,
}

impl MeasurementOutcome {
    pub fn success(name: impl Into<String>, scores: Scores) -> Self {
        Self {
            name: name.into(),
            page_status: 200,
            scores,
            error: None,
        }
    }

    /// 失败结果：分数全部为 0
    pub fn failure(name: impl Into<String>, page_status: u16, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page_status,
            scores: Scores::default(),
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 数据源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Live,
    Demo,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Live => f.write_str("live"),
            SourceKind::Demo => f.write_str("demo"),
        }
    }
}
