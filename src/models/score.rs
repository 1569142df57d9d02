//! 分数换算与分级

use std::fmt;

/// 把 Lighthouse 返回的 0-1 小数换算为 0-100 的整数
///
/// 缺失的分类按 0 处理，0.5 进位（0.755 → 76）
pub fn scale_score(fraction: Option<f64>) -> u8 {
    let fraction = match fraction {
        Some(f) if f.is_finite() => f.clamp(0.0, 1.0),
        _ => 0.0,
    };
    (fraction * 100.0).round() as u8
}

/// 分数等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreBand::Excellent,
            70..=89 => ScoreBand::Good,
            50..=69 => ScoreBand::NeedsImprovement,
            _ => ScoreBand::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::NeedsImprovement => "needs-improvement",
            ScoreBand::Poor => "poor",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
