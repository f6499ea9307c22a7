// ==========================================
// 图片数据库导入 - 行流驱动
// ==========================================
// 职责: 行游标 → 惰性的 PictureParameters 序列（一行一条，保持顺序）
// 流程: 取行 → 组装 → 写诊断行 → 产出记录
// 红线: 字段级问题不终止序列；仅数据源失效时以 Err 结束
// 红线: 诊断日志在正常结束与提前丢弃时都会关闭
// ==========================================

use crate::domain::picture::PictureParameters;
use crate::domain::types::RawRow;
use crate::importer::error::ImportResult;
use crate::importer::picture_importer_trait::{
    DiagnosticSink, ResourceRegistry, RowCriteria, RowCursor, RowSource,
};
use crate::importer::record_assembler::{AssembledRow, RecordAssembler};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::iter::FusedIterator;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Span};
use uuid::Uuid;

/// 标识字段缺失时写入的诊断行
pub const IDENTITY_MISSING_LINE: &str = "UNKNOWN [Error] - Picture name not found";

// ==========================================
// StreamSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSummary {
    pub import_id: String,
    pub started_at: DateTime<Utc>,
    pub total_rows: usize,
    pub imported: usize,         // 有效行
    pub invalid: usize,          // 字段校验失败行
    pub identity_missing: usize, // 无图片名称行
    pub elapsed_ms: u64,
}

impl StreamSummary {
    fn new() -> Self {
        Self {
            import_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            total_rows: 0,
            imported: 0,
            invalid: 0,
            identity_missing: 0,
            elapsed_ms: 0,
        }
    }
}

// ==========================================
// PictureRowStream
// ==========================================
pub struct PictureRowStream<'a, D: DiagnosticSink> {
    cursor: Option<RowCursor>,
    assembler: &'a RecordAssembler,
    registry: &'a mut dyn ResourceRegistry,
    sink: D,
    sink_closed: bool,
    summary: StreamSummary,
    span: Span,
    started: Instant,
}

impl<'a, D: DiagnosticSink> PictureRowStream<'a, D> {
    /// 打开行流
    ///
    /// # 参数
    /// - source: 数据源（按设置中的筛选条件打开游标）
    /// - assembler: 记录组装器（持有设置）
    /// - registry: 类注册表
    /// - sink: 诊断日志（由行流独占并负责关闭）
    ///
    /// # 返回
    /// - Err: 数据源无法打开
    pub fn open<S: RowSource + ?Sized>(
        source: &S,
        assembler: &'a RecordAssembler,
        registry: &'a mut dyn ResourceRegistry,
        sink: D,
    ) -> ImportResult<Self> {
        let criteria = RowCriteria::from_settings(assembler.settings());
        let summary = StreamSummary::new();
        let span = info_span!("picture_import", import_id = %summary.import_id);

        let cursor = {
            let _guard = span.enter();
            info!(
                criteria_column = ?criteria.column,
                criteria_value = ?criteria.value,
                "开始导入图片数据"
            );
            source.rows(&criteria)?
        };

        Ok(Self {
            cursor: Some(cursor),
            assembler,
            registry,
            sink,
            sink_closed: false,
            summary,
            span,
            started: Instant::now(),
        })
    }

    pub fn summary(&self) -> &StreamSummary {
        &self.summary
    }

    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    fn process(&mut self, row: &RawRow) -> PictureParameters {
        self.summary.total_rows += 1;
        let row_number = self.summary.total_rows;

        match self.assembler.assemble(row, &mut *self.registry) {
            AssembledRow::IdentityMissing => {
                self.summary.identity_missing += 1;
                warn!(row_number, "图片名称缺失");
                self.write_diagnostic(IDENTITY_MISSING_LINE);
                PictureParameters::default()
            }
            AssembledRow::Picture(assembled) => {
                if let Some(line) = assembled.error_line() {
                    self.summary.invalid += 1;
                    warn!(row_number, picture = %assembled.picture.picture_name, "行校验失败");
                    self.write_diagnostic(&line);
                } else {
                    self.summary.imported += 1;
                    debug!(row_number, picture = %assembled.picture.picture_name, "行导入成功");
                }
                assembled.into_output()
            }
        }
    }

    fn write_diagnostic(&mut self, line: &str) {
        if let Err(e) = self.sink.write_line(line) {
            warn!(error = %e, "诊断日志写入失败");
        }
    }

    fn close_sink(&mut self) {
        if self.sink_closed {
            return;
        }
        self.sink_closed = true;
        if let Err(e) = self.sink.close() {
            warn!(error = %e, "诊断日志关闭失败");
        }
    }

    fn finish(&mut self) {
        self.cursor = None;
        self.close_sink();
        self.summary.elapsed_ms = self.started.elapsed().as_millis() as u64;

        info!(
            total_rows = self.summary.total_rows,
            imported = self.summary.imported,
            invalid = self.summary.invalid,
            identity_missing = self.summary.identity_missing,
            elapsed_ms = self.summary.elapsed_ms,
            "图片数据导入完成"
        );
    }
}

impl<D: DiagnosticSink> Iterator for PictureRowStream<'_, D> {
    type Item = ImportResult<PictureParameters>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        let span = self.span.clone();
        let _guard = span.enter();

        match cursor.next() {
            None => {
                self.finish();
                None
            }
            Some(Err(e)) => {
                warn!(error = %e, "数据源中途失效，终止导入");
                self.finish();
                Some(Err(e))
            }
            Some(Ok(row)) => Some(Ok(self.process(&row))),
        }
    }
}

impl<D: DiagnosticSink> FusedIterator for PictureRowStream<'_, D> {}

impl<D: DiagnosticSink> Drop for PictureRowStream<'_, D> {
    fn drop(&mut self) {
        if !self.sink_closed {
            let span = self.span.clone();
            let _guard = span.enter();
            debug!(rows_seen = self.summary.total_rows, "行流提前释放");
            self.cursor = None;
            self.close_sink();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::domain::types::{CellValue, FieldSelector};
    use crate::importer::class_registry::InMemoryClassRegistry;
    use crate::importer::error::ImportError;
    use crate::importer::worksheet_source::WorksheetSource;

    fn settings() -> ImportSettings {
        let mut settings = ImportSettings::default();
        settings.picture_name_selector = FieldSelector::column("Name");
        settings.image.with_image = FieldSelector::Manual;
        settings.image.width = FieldSelector::column("Width");
        settings
    }

    fn source() -> WorksheetSource {
        WorksheetSource::from_rows(
            vec!["Name".to_string(), "Width".to_string()],
            vec![
                vec![("Name", CellValue::from("A")), ("Width", CellValue::Number(1.0))],
                vec![("Name", CellValue::Empty), ("Width", CellValue::Number(2.0))],
                vec![("Name", CellValue::from("C")), ("Width", CellValue::from("bad"))],
            ]
            .into_iter()
            .map(|cells| cells.into_iter().collect::<RawRow>())
            .collect(),
        )
    }

    #[test]
    fn test_stream_yields_every_row() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");
        let mut lines: Vec<String> = Vec::new();

        let mut stream =
            PictureRowStream::open(&source(), &assembler, &mut registry, &mut lines).unwrap();
        let names: Vec<String> = stream
            .by_ref()
            .map(|r| r.unwrap().picture_name)
            .collect();

        assert_eq!(names, vec!["A".to_string(), String::new(), String::new()]);
        assert!(stream.is_finished());
        let summary = stream.summary().clone();
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.identity_missing, 1);
        drop(stream);

        assert_eq!(
            lines,
            vec![
                IDENTITY_MISSING_LINE.to_string(),
                "C * [Error]- Invalid Image Width (bad)".to_string(),
            ]
        );
    }

    struct FailingSource;

    impl RowSource for FailingSource {
        fn columns(&self) -> ImportResult<Vec<String>> {
            Ok(vec!["Name".to_string()])
        }

        fn rows(&self, _criteria: &RowCriteria) -> ImportResult<RowCursor> {
            let first: RawRow = vec![("Name", "A")].into_iter().collect();
            Ok(Box::new(
                vec![
                    Ok(first),
                    Err(ImportError::SourceUnavailable("cursor lost".to_string())),
                ]
                .into_iter(),
            ))
        }
    }

    #[test]
    fn test_source_failure_ends_stream() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");

        let mut stream =
            PictureRowStream::open(&FailingSource, &assembler, &mut registry, Vec::<String>::new())
                .unwrap();

        assert!(matches!(stream.next(), Some(Ok(_))));
        assert!(matches!(stream.next(), Some(Err(ImportError::SourceUnavailable(_)))));
        assert!(stream.next().is_none());
        assert!(stream.is_finished());
    }

    #[derive(Default)]
    struct ClosingSink {
        lines: Vec<String>,
        closed: usize,
    }

    impl DiagnosticSink for ClosingSink {
        fn write_line(&mut self, line: &str) -> ImportResult<()> {
            self.lines.push(line.to_string());
            Ok(())
        }

        fn close(&mut self) -> ImportResult<()> {
            self.closed += 1;
            Ok(())
        }
    }

    #[test]
    fn test_sink_closed_once_on_early_drop() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");
        let mut sink = ClosingSink::default();

        {
            let mut stream =
                PictureRowStream::open(&source(), &assembler, &mut registry, &mut sink).unwrap();
            assert!(stream.next().is_some());
        }

        assert_eq!(sink.closed, 1);
        assert!(sink.lines.is_empty());
    }

    #[test]
    fn test_sink_closed_once_on_completion() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");
        let mut sink = ClosingSink::default();

        {
            let stream =
                PictureRowStream::open(&source(), &assembler, &mut registry, &mut sink).unwrap();
            assert_eq!(stream.count(), 3);
        }

        assert_eq!(sink.closed, 1);
        assert_eq!(sink.lines.len(), 2);
    }
}
