// ==========================================
// 图片数据库导入 - 外部协作方 Trait
// ==========================================
// 职责: 定义核心所消费的外部接口（不包含实现）
// 数据源 / 类注册表 / 数值文本解析 / 诊断日志
// ==========================================

use crate::config::ImportSettings;
use crate::domain::types::RawRow;
use crate::importer::error::ImportResult;

// ==========================================
// RowSource Trait
// ==========================================
// 用途: 提供原始行（列名 → 值）
// 实现者: WorksheetSource

/// 行游标: 前向、不可重启；元素级错误表示数据源中途失效
pub type RowCursor = Box<dyn Iterator<Item = ImportResult<RawRow>>>;

pub trait RowSource {
    /// 数据源的列名列表
    fn columns(&self) -> ImportResult<Vec<String>>;

    /// 打开行游标
    ///
    /// # 参数
    /// - criteria: 行筛选条件（筛选列 = 筛选值）
    ///
    /// # 返回
    /// - Ok(RowCursor): 按原始顺序的行序列
    /// - Err: 数据源不可用
    fn rows(&self, criteria: &RowCriteria) -> ImportResult<RowCursor>;

    /// 满足筛选条件的行数
    fn row_count(&self, criteria: &RowCriteria) -> ImportResult<usize> {
        Ok(self.rows(criteria)?.count())
    }
}

// ==========================================
// RowCriteria - 行筛选条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCriteria {
    pub column: Option<String>,
    pub value: Option<String>,
}

impl RowCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn equals(column: &str, value: &str) -> Self {
        Self {
            column: Some(column.to_string()),
            value: Some(value.to_string()),
        }
    }

    pub fn from_settings(settings: &ImportSettings) -> Self {
        let column = settings
            .excel_criteria_selector
            .clone()
            .filter(|c| !c.trim().is_empty());
        Self {
            value: column.as_ref().and(settings.excel_criteria_value.clone()),
            column,
        }
    }

    /// 行是否满足条件（未设置筛选列时全部满足）
    pub fn matches(&self, row: &RawRow) -> bool {
        match (&self.column, &self.value) {
            (Some(column), Some(value)) => row.get(column).to_text().as_deref() == Some(value),
            _ => true,
        }
    }
}

// ==========================================
// ResourceRegistry Trait
// ==========================================
// 用途: 宿主环境中的命名类（材质/样式）查找与创建
// 实现者: InMemoryClassRegistry

/// 类句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassHandle(pub usize);

pub trait ResourceRegistry {
    /// 按名称查找类
    fn lookup(&self, name: &str) -> Option<ClassHandle>;

    /// 创建类（宿主环境的创建操作可能同时切换活动类）
    fn create(&mut self, name: &str) -> ImportResult<ClassHandle>;

    /// 当前活动类
    fn active_handle(&self) -> ClassHandle;

    /// 设置活动类
    fn set_active(&mut self, handle: ClassHandle);

    /// 创建类并保持活动类不变
    ///
    /// # 说明
    /// - 先记录活动类，创建后无论成功与否都恢复
    /// - 核心只调用此方法，不自行编排三步操作
    fn create_preserving_active(&mut self, name: &str) -> ImportResult<ClassHandle> {
        let active = self.active_handle();
        let created = self.create(name);
        self.set_active(active);
        created
    }
}

// ==========================================
// NumericStringParser Trait
// ==========================================
// 用途: 判定文本是否为合法数值
// 实现者: DecimalParser
pub trait NumericStringParser: Send + Sync {
    /// 解析数值文本；非法返回 None
    fn parse(&self, text: &str) -> Option<f64>;
}

// ==========================================
// DiagnosticSink Trait
// ==========================================
// 用途: 追加写入诊断行（每个无效行一行）
// 实现者: LogFileSink, Vec<String>
pub trait DiagnosticSink {
    fn write_line(&mut self, line: &str) -> ImportResult<()>;

    /// 释放底层资源（驱动结束或提前终止时调用）
    fn close(&mut self) -> ImportResult<()> {
        Ok(())
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn write_line(&mut self, line: &str) -> ImportResult<()> {
        (**self).write_line(line)
    }

    fn close(&mut self) -> ImportResult<()> {
        (**self).close()
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Box<T> {
    fn write_line(&mut self, line: &str) -> ImportResult<()> {
        (**self).write_line(line)
    }

    fn close(&mut self) -> ImportResult<()> {
        (**self).close()
    }
}

impl DiagnosticSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> ImportResult<()> {
        self.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CellValue;

    #[test]
    fn test_criteria_matches_rendered_text() {
        let row: RawRow = vec![("Room", CellValue::from("Hall")), ("Floor", CellValue::Number(2.0))]
            .into_iter()
            .collect();

        assert!(RowCriteria::all().matches(&row));
        assert!(RowCriteria::equals("room", "Hall").matches(&row));
        assert!(RowCriteria::equals("Floor", "2").matches(&row));
        assert!(!RowCriteria::equals("Room", "Attic").matches(&row));
        assert!(!RowCriteria::equals("Missing", "Hall").matches(&row));
    }

    #[test]
    fn test_criteria_from_settings_requires_column() {
        let mut settings = ImportSettings::default();
        settings.excel_criteria_value = Some("Hall".to_string());
        assert_eq!(RowCriteria::from_settings(&settings), RowCriteria::all());

        settings.excel_criteria_selector = Some("Room".to_string());
        assert_eq!(
            RowCriteria::from_settings(&settings),
            RowCriteria::equals("Room", "Hall")
        );
    }

    #[test]
    fn test_vec_sink_collects_lines() {
        fn emit<D: DiagnosticSink>(mut sink: D) {
            sink.write_line("first").unwrap();
            sink.close().unwrap();
        }

        let mut lines: Vec<String> = Vec::new();
        emit(&mut lines);
        assert_eq!(lines, vec!["first".to_string()]);
    }
}
