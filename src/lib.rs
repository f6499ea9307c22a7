// ==========================================
// 图片数据库导入 - 核心库
// ==========================================
// 职责: 电子表格行 → 经校验的图片参数记录
// 系统定位: 宿主绘图环境的导入核心（图形对象由调用方生成）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值类型与输出记录
pub mod domain;

// 配置层 - 导入会话设置
pub mod config;

// 导入层 - 派生与行流
pub mod importer;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::ImportSettings;

pub use domain::{
    CellValue, Diagnostic, FieldSelector, PictureParameters, PictureRecord, Quantity, RawRow,
    RowDiagnostics, Section,
};

pub use importer::{
    DiagnosticSink, ImportError, ImportResult, InMemoryClassRegistry, LogFileSink,
    PictureRowStream, RecordAssembler, ResourceRegistry, RowSource, StreamSummary,
    WorksheetSource,
};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
