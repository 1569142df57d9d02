//! Excel 导出服务 - 业务能力层
//!
//! 只负责"把结果写成 xlsx"，不关心批次流程

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::error::{AppResult, ExportError};
use crate::models::job::JobRecord;

/// 工作表名称
pub const SHEET_NAME: &str = "Lighthouse Results";

/// 表头与列宽（字符）
pub const COLUMNS: [(&str, f64); 8] = [
    ("Name (Website Title)", 40.0),
    ("Page Status (HTTP Code)", 15.0),
    ("URL", 50.0),
    ("Device", 10.0),
    ("Performance", 12.0),
    ("Accessibility", 15.0),
    ("Best Practices", 15.0),
    ("SEO", 8.0),
];

/// Excel 导出服务
pub struct ExcelExporter {
    export_dir: PathBuf,
}

impl ExcelExporter {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// 导出文件名，例如 `lighthouse-results-2024-05-01.xlsx`
    pub fn file_name_for(date: NaiveDate) -> String {
        format!("lighthouse-results-{}.xlsx", date.format("%Y-%m-%d"))
    }

    /// 只导出已完成或失败的任务，保持原有顺序
    pub fn exportable(records: &[JobRecord]) -> Vec<&JobRecord> {
        records.iter().filter(|r| r.is_finished()).collect()
    }

    /// 导出到导出目录，文件名带当天日期
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub fn export(&self, records: &[JobRecord]) -> AppResult<PathBuf> {
        std::fs::create_dir_all(&self.export_dir).map_err(|source| {
            ExportError::CreateDirFailed {
                path: self.export_dir.clone(),
                source,
            }
        })?;

        let path = self
            .export_dir
            .join(Self::file_name_for(Local::now().date_naive()));
        let rows = self.export_to(records, &path)?;

        info!("✓ 已导出 {} 条结果: {}", rows, path.display());
        Ok(path)
    }

    /// 写入指定路径，返回数据行数
    pub fn export_to(&self, records: &[JobRecord], path: &Path) -> AppResult<usize> {
        let rows = Self::exportable(records);
        if rows.is_empty() {
            return Err(ExportError::NothingToExport.into());
        }

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).map_err(ExportError::from)?;

        for (col, (title, width)) in COLUMNS.iter().enumerate() {
            let col = col as u16;
            worksheet
                .write_string_with_format(0, col, *title, &header)
                .map_err(ExportError::from)?;
            worksheet
                .set_column_width(col, *width)
                .map_err(ExportError::from)?;
        }

        for (index, record) in rows.iter().enumerate() {
            let row = index as u32 + 1;
            let numbers = [
                (1, f64::from(record.page_status)),
                (4, f64::from(record.scores.performance)),
                (5, f64::from(record.scores.accessibility)),
                (6, f64::from(record.scores.best_practices)),
                (7, f64::from(record.scores.seo)),
            ];

            worksheet
                .write_string(row, 0, &record.name)
                .map_err(ExportError::from)?;
            worksheet
                .write_string(row, 2, &record.url)
                .map_err(ExportError::from)?;
            worksheet
                .write_string(row, 3, record.device.as_str())
                .map_err(ExportError::from)?;
            for (col, value) in numbers {
                worksheet
                    .write_number(row, col, value)
                    .map_err(ExportError::from)?;
            }
        }

        workbook.save(path).map_err(ExportError::from)?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::Device;
    use crate::models::measurement::{MeasurementOutcome, Scores};

    fn finished(url: &str, ok: bool) -> JobRecord {
        let mut record = JobRecord::new(url, Device::Mobile);
        record.start_testing().unwrap();
        if ok {
            record
                .apply_outcome(MeasurementOutcome::success(
                    "Example",
                    Scores {
                        performance: 80,
                        accessibility: 90,
                        best_practices: 70,
                        seo: 100,
                    },
                ))
                .unwrap();
        } else {
            record.fail("Testing failed").unwrap();
        }
        record
    }

    fn mixed_records() -> Vec<JobRecord> {
        let mut testing = JobRecord::new("https://e.com", Device::Desktop);
        testing.start_testing().unwrap();

        vec![
            finished("https://a.com", true),
            JobRecord::new("https://f.com", Device::Mobile),
            finished("https://b.com", true),
            finished("https://c.com", false),
            testing,
            finished("https://d.com", true),
        ]
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            ExcelExporter::file_name_for(date),
            "lighthouse-results-2024-05-01.xlsx"
        );
    }

    #[test]
    fn test_exportable_skips_unfinished() {
        let records = mixed_records();
        let rows = ExcelExporter::exportable(&records);

        assert_eq!(rows.len(), 4);
        let urls: Vec<&str> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com", "https://d.com"]);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ExcelExporter::new(dir.path().join("out"));

        let path = exporter.export(&mixed_records()).unwrap();

        assert!(path.exists());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("lighthouse-results-"));
        assert!(name.ends_with(".xlsx"));
    }

    #[test]
    fn test_export_to_returns_row_count() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ExcelExporter::new(dir.path());

        let rows = exporter
            .export_to(&mixed_records(), &dir.path().join("r.xlsx"))
            .unwrap();
        assert_eq!(rows, 4);
    }

    #[test]
    fn test_exported_sheet_layout() {
        use calamine::{open_workbook, Data, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.xlsx");
        ExcelExporter::new(dir.path())
            .export_to(&mixed_records(), &path)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();

        // 表头 + 4 行已结束的任务
        assert_eq!(range.height(), 5);
        assert_eq!(range.width(), 8);

        let header: Vec<String> = (0..8)
            .map(|col| range.get((0, col)).unwrap().to_string())
            .collect();
        assert_eq!(
            header,
            vec![
                "Name (Website Title)",
                "Page Status (HTTP Code)",
                "URL",
                "Device",
                "Performance",
                "Accessibility",
                "Best Practices",
                "SEO",
            ]
        );

        let first_row: Vec<&Data> = (0..8).map(|col| range.get((1, col)).unwrap()).collect();
        assert_eq!(
            first_row,
            vec![
                &Data::String("Example".into()),
                &Data::Float(200.0),
                &Data::String("https://a.com".into()),
                &Data::String("mobile".into()),
                &Data::Float(80.0),
                &Data::Float(90.0),
                &Data::Float(70.0),
                &Data::Float(100.0),
            ]
        );

        // 失败任务：状态码 0，分数全为 0
        assert_eq!(range.get((3, 2)), Some(&Data::String("https://c.com".into())));
        assert_eq!(range.get((3, 1)), Some(&Data::Float(0.0)));
        assert_eq!(range.get((3, 4)), Some(&Data::Float(0.0)));
    }

    #[test]
    fn test_nothing_to_export() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ExcelExporter::new(dir.path());
        let records = vec![JobRecord::new("https://a.com", Device::Mobile)];

        let err = exporter.export(&records).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Export(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn test_failed_export_keeps_records() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ExcelExporter::new(dir.path());
        let records = mixed_records();
        let before = records.clone();

        // 目标路径是目录，保存必然失败
        assert!(exporter.export_to(&records, dir.path()).is_err());
        assert_eq!(records, before);
    }
}
