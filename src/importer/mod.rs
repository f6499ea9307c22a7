// ==========================================
// 图片数据库导入 - 导入层
// ==========================================
// 职责: 原始行 → 图片参数记录（逐行惰性产出）
// 支持: Excel, OpenDocument, CSV
// ==========================================

// 模块声明
pub mod class_registry;
pub mod derivation;
pub mod diagnostic_sink;
pub mod error;
pub mod field_resolver;
pub mod numeric_validator;
pub mod picture_importer_trait;
pub mod record_assembler;
pub mod row_stream;
pub mod worksheet_source;

// 重导出核心类型
pub use class_registry::InMemoryClassRegistry;
pub use derivation::DerivationService;
pub use diagnostic_sink::LogFileSink;
pub use error::{ImportError, ImportResult};
pub use field_resolver::{is_present, FieldResolver, Resolution};
pub use numeric_validator::{DecimalParser, NumericValidator};
pub use record_assembler::{
    make_year_text, symbol_folder_name, AssembledPicture, AssembledRow, RecordAssembler,
    SYMBOL_FOLDER_SUFFIX,
};
pub use row_stream::{PictureRowStream, StreamSummary, IDENTITY_MISSING_LINE};
pub use worksheet_source::WorksheetSource;

// 重导出 Trait 接口
pub use picture_importer_trait::{
    ClassHandle, DiagnosticSink, NumericStringParser, ResourceRegistry, RowCriteria, RowCursor,
    RowSource,
};
