//! 结果展示 - 业务能力层
//!
//! 把已完成的任务渲染成终端表格

use crate::models::job::JobRecord;
use crate::models::score::ScoreBand;
use crate::models::stats::BatchStats;
use crate::utils::logging::truncate_text;

const NAME_WIDTH: usize = 32;
const URL_WIDTH: usize = 40;

/// 渲染结果表格（只包含已完成或失败的任务）
pub fn render_results_table(records: &[JobRecord]) -> String {
    let finished: Vec<&JobRecord> = records.iter().filter(|r| r.is_finished()).collect();
    if finished.is_empty() {
        return String::new();
    }

    let mut out = format!(
        "Test Results: performance metrics for {} URL{}\n",
        finished.len(),
        if finished.len() == 1 { "" } else { "s" }
    );
    out.push_str(&format!(
        "{:<nw$} {:>6} {:<uw$} {:<8} {:>16} {:>16} {:>16} {:>16}\n",
        "Name",
        "Status",
        "URL",
        "Device",
        "Performance",
        "Accessibility",
        "Best Practices",
        "SEO",
        nw = NAME_WIDTH,
        uw = URL_WIDTH,
    ));

    for record in finished {
        let s = &record.scores;
        out.push_str(&format!(
            "{:<nw$} {:>6} {:<uw$} {:<8} {:>16} {:>16} {:>16} {:>16}",
            truncate_text(&record.name, NAME_WIDTH),
            record.page_status,
            truncate_text(&record.url, URL_WIDTH),
            record.device.as_str(),
            score_cell(s.performance),
            score_cell(s.accessibility),
            score_cell(s.best_practices),
            score_cell(s.seo),
            nw = NAME_WIDTH,
            uw = URL_WIDTH,
        ));
        if let Some(error) = &record.error {
            out.push_str(&format!("  ⚠️ {}", error));
        }
        out.push('\n');
    }

    out
}

/// 失败汇总，例如 "2 URLs failed to test"
pub fn failure_summary(stats: &BatchStats) -> Option<String> {
    match stats.errors {
        0 => None,
        1 => Some("1 URL failed to test".to_string()),
        n => Some(format!("{} URLs failed to test", n)),
    }
}

fn score_cell(score: u8) -> String {
    format!("{} ({})", score, ScoreBand::from_score(score))
}
