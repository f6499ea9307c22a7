// ==========================================
// 图片数据库导入 - 行诊断信息
// ==========================================
// 职责: 字段级问题的类型化表示 + 按分区累积
// 红线: 字段级问题不抛错，只累积为诊断文本 + 有效性标志
// ==========================================

use crate::domain::types::CellValue;
use serde::Serialize;
use std::fmt;

// ==========================================
// 分区 (Section)
// ==========================================
// 诊断行按固定顺序拼接: Image → Frame → Matboard → Glass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    Image,
    Frame,
    Matboard,
    Glass,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Section::Image,
        Section::Frame,
        Section::Matboard,
        Section::Glass,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Image => "Image",
            Section::Frame => "Frame",
            Section::Matboard => "Matboard",
            Section::Glass => "Glass",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticLevel {
    Error, // 行无效
    Info,  // 仅提示，不影响有效性
}

// ==========================================
// Diagnostic - 单条诊断
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// 数值校验失败，field 为显示名（如 "Frame Width"）
    FieldInvalid { field: &'static str, raw: CellValue },

    /// 类引用不存在且未开启自动创建
    MissingClass { section: Section, name: String },

    /// 衬板窗口尺寸回退为图像尺寸（dimension: "width" / "height"）
    FallbackApplied { dimension: &'static str },
}

impl Diagnostic {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Diagnostic::FallbackApplied { .. } => DiagnosticLevel::Info,
            _ => DiagnosticLevel::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level() == DiagnosticLevel::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FieldInvalid { field, raw } => write!(f, "- Invalid {} ({})", field, raw),
            Diagnostic::MissingClass { section, name } => {
                write!(f, "- No such {} Class ({})", section, name)
            }
            Diagnostic::FallbackApplied { dimension } => write!(
                f,
                "- Missing window {}, using image {} instead",
                dimension, dimension
            ),
        }
    }
}

// ==========================================
// RowDiagnostics - 单行诊断累积器
// ==========================================
// 每个分区一个缓冲区；任一 Error 级诊断使整行无效
#[derive(Debug, Clone, PartialEq)]
pub struct RowDiagnostics {
    image: Vec<Diagnostic>,
    frame: Vec<Diagnostic>,
    matboard: Vec<Diagnostic>,
    glass: Vec<Diagnostic>,
    valid: bool,
}

impl Default for RowDiagnostics {
    fn default() -> Self {
        Self {
            image: Vec::new(),
            frame: Vec::new(),
            matboard: Vec::new(),
            glass: Vec::new(),
            valid: true,
        }
    }
}

impl RowDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, section: Section, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.valid = false;
        }
        self.buffer_mut(section).push(diagnostic);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn section(&self, section: Section) -> &[Diagnostic] {
        match section {
            Section::Image => &self.image,
            Section::Frame => &self.frame,
            Section::Matboard => &self.matboard,
            Section::Glass => &self.glass,
        }
    }

    /// 按固定分区顺序遍历所有诊断
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        Section::ORDER
            .into_iter()
            .flat_map(move |section| self.section(section).iter())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// 拼接所有分区消息（无分隔符）
    pub fn joined_messages(&self) -> String {
        self.iter().map(|d| d.to_string()).collect()
    }

    /// 生成日志错误行；行有效时返回 None
    pub fn error_line(&self, picture_name: &str) -> Option<String> {
        if self.valid {
            None
        } else {
            Some(format!("{} * [Error]{}", picture_name, self.joined_messages()))
        }
    }

    fn buffer_mut(&mut self, section: Section) -> &mut Vec<Diagnostic> {
        match section {
            Section::Image => &mut self.image,
            Section::Frame => &mut self.frame,
            Section::Matboard => &mut self.matboard,
            Section::Glass => &mut self.glass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_messages() {
        let invalid = Diagnostic::FieldInvalid {
            field: "Frame Width",
            raw: CellValue::from("abc"),
        };
        assert_eq!(invalid.to_string(), "- Invalid Frame Width (abc)");

        let missing = Diagnostic::MissingClass {
            section: Section::Frame,
            name: "Oak".to_string(),
        };
        assert_eq!(missing.to_string(), "- No such Frame Class (Oak)");

        let fallback = Diagnostic::FallbackApplied { dimension: "width" };
        assert_eq!(
            fallback.to_string(),
            "- Missing window width, using image width instead"
        );
        assert_eq!(fallback.level(), DiagnosticLevel::Info);
    }

    #[test]
    fn test_info_keeps_row_valid() {
        let mut diagnostics = RowDiagnostics::new();
        diagnostics.push(Section::Matboard, Diagnostic::FallbackApplied { dimension: "height" });

        assert!(diagnostics.is_valid());
        assert!(!diagnostics.is_empty());
        assert_eq!(diagnostics.error_line("Mona"), None);
    }

    #[test]
    fn test_error_line_section_order() {
        let mut diagnostics = RowDiagnostics::new();
        diagnostics.push(
            Section::Glass,
            Diagnostic::FieldInvalid { field: "Glass Position", raw: CellValue::Empty },
        );
        diagnostics.push(
            Section::Image,
            Diagnostic::FieldInvalid { field: "Image Width", raw: CellValue::from("x") },
        );

        assert!(!diagnostics.is_valid());
        assert_eq!(
            diagnostics.error_line("Mona").unwrap(),
            "Mona * [Error]- Invalid Image Width (x)- Invalid Glass Position (None)"
        );
    }
}
