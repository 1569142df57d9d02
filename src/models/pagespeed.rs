//! PageSpeed Insights v5 响应结构（只保留用到的字段）

use serde::Deserialize;

use crate::models::measurement::Scores;
use crate::models::score::scale_score;

/// 请求的四个分类，对应重复的 `category` 参数
pub const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub lighthouse_result: LighthouseResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    #[serde(default)]
    pub categories: Categories,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub performance: Option<CategoryScore>,
    #[serde(default)]
    pub accessibility: Option<CategoryScore>,
    #[serde(default, rename = "best-practices")]
    pub best_practices: Option<CategoryScore>,
    #[serde(default)]
    pub seo: Option<CategoryScore>,
}

/// Lighthouse 在无法评分时返回 `"score": null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryScore {
    #[serde(default)]
    pub score: Option<f64>,
}

impl PageSpeedResponse {
    pub fn scores(&self) -> Scores {
        let categories = &self.lighthouse_result.categories;
        let score = |c: &Option<CategoryScore>| scale_score(c.as_ref().and_then(|c| c.score));

        Scores {
            performance: score(&categories.performance),
            accessibility: score(&categories.accessibility),
            best_practices: score(&categories.best_practices),
            seo: score(&categories.seo),
        }
    }
}
