// ==========================================
// 图片数据库导入 - 领域类型定义
// ==========================================
// 职责: 单元格值 / 原始行 / 字段来源选择器 / 数值量
// ==========================================

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 外部数据源只给出三种标量: 空 / 数值 / 文本
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 转为文本（数值整数部分不带小数点，空值返回 None）
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, "None"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// RawRow - 原始行
// ==========================================
// 列名统一小写存储，查找大小写不敏感
// 生命周期: 一次派生过程内只读
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: &str, value: impl Into<CellValue>) {
        self.cells
            .insert(column.trim().to_lowercase(), value.into());
    }

    /// 按列名取值，缺失的列视为空值
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells
            .get(&column.trim().to_lowercase())
            .unwrap_or(&EMPTY_CELL)
    }

    /// 整行无任何非空值
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| match v {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        })
    }
}

impl<K: AsRef<str>, V: Into<CellValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (column, value) in iter {
            row.insert(column.as_ref(), value);
        }
        row
    }
}

// ==========================================
// 字段来源选择器 (Field Selector)
// ==========================================
// 设置对话框中的存储文本:
// - "-- Manual"       → 使用设置中的固定值
// - "-- Don't Import" → 不导入
// - 其他              → 列名
pub const MANUAL_SELECTOR: &str = "-- Manual";
pub const DONT_IMPORT_SELECTOR: &str = "-- Don't Import";

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldSelector {
    Manual,
    #[default]
    DontImport,
    Column(String),
}

impl FieldSelector {
    pub fn column(name: &str) -> Self {
        FieldSelector::from(name)
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, FieldSelector::Manual)
    }
}

impl From<&str> for FieldSelector {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed {
            MANUAL_SELECTOR => FieldSelector::Manual,
            DONT_IMPORT_SELECTOR | "" => FieldSelector::DontImport,
            name => FieldSelector::Column(name.to_string()),
        }
    }
}

impl From<String> for FieldSelector {
    fn from(value: String) -> Self {
        FieldSelector::from(value.as_str())
    }
}

impl From<FieldSelector> for String {
    fn from(value: FieldSelector) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::Manual => write!(f, "{}", MANUAL_SELECTOR),
            FieldSelector::DontImport => write!(f, "{}", DONT_IMPORT_SELECTOR),
            FieldSelector::Column(name) => write!(f, "{}", name),
        }
    }
}

// ==========================================
// 数值量 (Quantity)
// ==========================================
// 固定 3 位小数；整数值不带小数部分输出 ("7" / "7.25" / "7.123")
// 舍入按二进制值的精确十进制展开进行: 1.0005 实为 1.000499.. → 1
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quantity(f64);

impl Quantity {
    pub const DECIMALS: usize = 3;

    pub fn new(value: f64) -> Self {
        let rounded = format!("{:.*}", Self::DECIMALS, value)
            .parse::<f64>()
            .unwrap_or(value);
        // 避免输出 "-0"
        Quantity(if rounded == 0.0 { 0.0 } else { rounded })
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
