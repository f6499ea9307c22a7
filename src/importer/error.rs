// ==========================================
// 图片数据库导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 字段级问题不在此列（见 domain::diagnostic），此处只有会中断流程的错误
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 数据源相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xlsb/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("工作簿解析失败: {0}")]
    WorkbookError(String),

    #[error("工作表不存在: {0}")]
    SheetNotFound(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("数据源不可用: {0}")]
    SourceUnavailable(String),

    // ===== 设置错误 =====
    #[error("设置读取失败 ({path}): {message}")]
    SettingsReadError { path: String, message: String },

    #[error("设置值错误 (key: {key}, value: {value}): {message}")]
    SettingsValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 外部协作方错误 =====
    #[error("类创建失败 ({name}): {message}")]
    RegistryError { name: String, message: String },

    #[error("诊断日志写入失败: {0}")]
    DiagnosticWriteError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::WorkbookError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::SettingsValueError {
            key: format!("line {}", err.line()),
            value: String::new(),
            message: err.to_string(),
        }
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
