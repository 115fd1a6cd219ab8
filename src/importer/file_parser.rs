// ==========================================
// 印花工坊排程引擎 - 文件解析器
// ==========================================
// 职责: CSV → 表头 + 原始记录 (表头 → 单元格文本)
// 约束: 只做解析, 不做类型转换
// ==========================================

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::importer::error::{ImportError, ImportResult};

/// 原始记录 (行号从 1 开始, 表头行不计)
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// 读取字段, 空白视为缺失
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// 解析结果: 规整后的表头 + 非空白数据行
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl CsvTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    pub fn parse_file(&self, path: &Path) -> ImportResult<CsvTable> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<CsvTable> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        // 读取表头 (统一小写)
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut fields = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord {
                row: row_idx + 1,
                fields,
            });
        }

        Ok(CsvTable { headers, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reader_trims_and_skips_blank() {
        let data = "ID , Job_Number\n J1 , 1001\n,\nJ2,1002\n";
        let table = CsvParser.parse_reader(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["id", "job_number"]);
        assert!(table.has_column("job_number"));

        let records = &table.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("id"), Some("J1"));
        assert_eq!(records[0].get("job_number"), Some("1001"));
        assert_eq!(records[1].row, 3);
    }

    #[test]
    fn test_short_row_keeps_header_columns() {
        let data = "id,job_number,customer\nJ1,1001\n";
        let table = CsvParser.parse_reader(data.as_bytes()).unwrap();

        assert!(table.has_column("customer"));
        assert_eq!(table.records[0].get("customer"), None);
        assert!(!table.records[0].fields.contains_key("customer"));
    }

    #[test]
    fn test_parse_file_rejects_other_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            CsvParser.parse_file(file.path()),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            CsvParser.parse_file(Path::new("/nonexistent/jobs.csv")),
            Err(ImportError::FileNotFound(_))
        ));
    }
}
