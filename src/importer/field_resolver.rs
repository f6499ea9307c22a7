// ==========================================
// 图片数据库导入 - 字段解析器
// ==========================================
// 职责: 按字段选择器取原始值（手动值 / 列值 / 不导入）
// 红线: 不做校验；手动值免校验、列值需校验，由调用方按字段处理
// ==========================================

use crate::domain::types::{CellValue, FieldSelector, RawRow};

/// 字段解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Value(CellValue),
    /// 不导入：目标字段保持默认
    Skip,
}

impl Resolution {
    pub fn into_value(self) -> Option<CellValue> {
        match self {
            Resolution::Value(value) => Some(value),
            Resolution::Skip => None,
        }
    }
}

pub struct FieldResolver;

impl FieldResolver {
    /// 解析单个字段
    ///
    /// # 规则
    /// - Manual → 手动值原样返回（无手动值的字段视为不导入）
    /// - DontImport → Skip
    /// - Column(name) → row[name]（大小写不敏感，缺失为空值）
    pub fn resolve(
        &self,
        selector: &FieldSelector,
        row: &RawRow,
        manual: Option<CellValue>,
    ) -> Resolution {
        match selector {
            FieldSelector::Manual => manual.map(Resolution::Value).unwrap_or(Resolution::Skip),
            FieldSelector::DontImport => Resolution::Skip,
            FieldSelector::Column(name) => Resolution::Value(row.get(name).clone()),
        }
    }

    /// 解析分区存在标志（with* 字段）
    pub fn resolve_presence(&self, selector: &FieldSelector, row: &RawRow, manual: bool) -> bool {
        match selector {
            FieldSelector::Manual => manual,
            FieldSelector::DontImport => false,
            FieldSelector::Column(name) => is_present(row.get(name)),
        }
    }

    /// 解析标识字段（图片名称），空文本返回 None
    pub fn resolve_identity(&self, selector: &FieldSelector, row: &RawRow) -> Option<String> {
        self.resolve(selector, row, None)
            .into_value()
            .and_then(|value| value.to_text())
            .filter(|name| !name.is_empty())
    }
}

/// 存在标志判定
///
/// # 规则
/// - 空值、""、"False"、"No" → 不存在
/// - 其他任何值（含任意文本、数值）→ 存在
pub fn is_present(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => false,
        CellValue::Text(text) => !matches!(text.as_str(), "" | "False" | "No"),
        CellValue::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> RawRow {
        vec![
            ("Name", CellValue::from("Mona Lisa")),
            ("Width", CellValue::Number(12.5)),
            ("With Frame", CellValue::from("Yes")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_resolve_variants() {
        let resolver = FieldResolver;
        let row = sample_row();

        assert_eq!(
            resolver.resolve(&FieldSelector::column("WIDTH"), &row, None),
            Resolution::Value(CellValue::Number(12.5))
        );
        assert_eq!(
            resolver.resolve(&FieldSelector::column("Missing"), &row, None),
            Resolution::Value(CellValue::Empty)
        );
        assert_eq!(
            resolver.resolve(&FieldSelector::Manual, &row, Some(CellValue::Number(3.0))),
            Resolution::Value(CellValue::Number(3.0))
        );
        assert_eq!(resolver.resolve(&FieldSelector::Manual, &row, None), Resolution::Skip);
        assert_eq!(
            resolver.resolve(&FieldSelector::DontImport, &row, Some(CellValue::Number(3.0))),
            Resolution::Skip
        );
    }

    #[test]
    fn test_presence_falsy_set() {
        assert!(!is_present(&CellValue::Empty));
        assert!(!is_present(&CellValue::from("")));
        assert!(!is_present(&CellValue::from("False")));
        assert!(!is_present(&CellValue::from("No")));

        assert!(is_present(&CellValue::from("Yes")));
        assert!(is_present(&CellValue::from("1")));
        assert!(is_present(&CellValue::from("true")));
        assert!(is_present(&CellValue::from("false")));
        assert!(is_present(&CellValue::from("anything")));
        assert!(is_present(&CellValue::Number(0.0)));
    }

    #[test]
    fn test_resolve_presence() {
        let resolver = FieldResolver;
        let row = sample_row();

        assert!(resolver.resolve_presence(&FieldSelector::column("with frame"), &row, false));
        assert!(!resolver.resolve_presence(&FieldSelector::column("Missing"), &row, true));
        assert!(resolver.resolve_presence(&FieldSelector::Manual, &row, true));
        assert!(!resolver.resolve_presence(&FieldSelector::DontImport, &row, true));
    }

    #[test]
    fn test_resolve_identity() {
        let resolver = FieldResolver;
        let mut row = sample_row();

        assert_eq!(
            resolver.resolve_identity(&FieldSelector::column("Name"), &row),
            Some("Mona Lisa".to_string())
        );

        row.insert("Name", "");
        assert_eq!(resolver.resolve_identity(&FieldSelector::column("Name"), &row), None);

        row.insert("Number", 42.0);
        assert_eq!(
            resolver.resolve_identity(&FieldSelector::column("Number"), &row),
            Some("42".to_string())
        );
    }
}
