// ==========================================
// 图片数据库导入 - 领域模型层
// ==========================================
// 职责: 定义单元格值、字段选择器、输出记录与诊断类型
// 红线: 不含数据源访问逻辑,不含派生逻辑
// ==========================================

pub mod diagnostic;
pub mod picture;
pub mod types;

// 重导出核心类型
pub use diagnostic::{Diagnostic, DiagnosticLevel, RowDiagnostics, Section};
pub use picture::{
    size_text, FrameSection, GlassSection, ImageSection, MatboardSection, PictureParameters,
    PictureRecord, SymbolSection,
};
pub use types::{CellValue, FieldSelector, Quantity, RawRow, DONT_IMPORT_SELECTOR, MANUAL_SELECTOR};
