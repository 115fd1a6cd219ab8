// ==========================================
// 印花工坊排程引擎 - 导入层
// ==========================================
// 职责: 外部作业清单导入, 经引擎登记为待排作业
// 支持: CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod job_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, CsvTable, RawRecord};
pub use job_importer::{ImportReport, JobCsvImporter, RowRejection, REQUIRED_COLUMNS};
