// ==========================================
// 图片数据库导入 - 数值字段校验器
// ==========================================
// 职责: 原始单元格值 → 3 位小数数值量
// 规则: 数值直接通过 / 文本按数值文本规则解析 / 空值无效
// ==========================================

use crate::domain::types::{CellValue, Quantity};
use crate::importer::picture_importer_trait::NumericStringParser;

// ==========================================
// DecimalParser - 默认数值文本解析
// ==========================================
// 接受: 可选正负号、小数点、首尾空白
// 拒绝: 空文本、非数值文本、inf/NaN
pub struct DecimalParser;

impl NumericStringParser for DecimalParser {
    fn parse(&self, text: &str) -> Option<f64> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

// ==========================================
// NumericValidator - 数值字段校验器
// ==========================================
pub struct NumericValidator {
    parser: Box<dyn NumericStringParser>,
}

impl Default for NumericValidator {
    fn default() -> Self {
        Self::new(Box::new(DecimalParser))
    }
}

impl NumericValidator {
    pub fn new(parser: Box<dyn NumericStringParser>) -> Self {
        Self { parser }
    }

    /// 校验原始值
    ///
    /// # 返回
    /// - Some(Quantity): 合法，已舍入到 3 位小数
    /// - None: 非法（由调用方转为诊断信息）
    pub fn validate(&self, raw: &CellValue) -> Option<Quantity> {
        match raw {
            CellValue::Number(value) => Some(Quantity::new(*value)),
            CellValue::Text(text) => self.parser.parse(text).map(Quantity::new),
            CellValue::Empty => None,
        }
    }
}
