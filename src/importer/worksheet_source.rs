// ==========================================
// 图片数据库导入 - 工作表数据源
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xlsb/.xls) / OpenDocument (.ods) / CSV (.csv)
// 规则: 第一行为表头；中间的空白行保留（交给行流报告名称缺失），末尾的空白行去掉
// 规则: 工作表名末尾的 '$' 忽略（兼容 "Sheet1$" 写法）
// ==========================================

use crate::domain::types::{CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::picture_importer_trait::{RowCriteria, RowCursor, RowSource};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

pub struct WorksheetSource {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl WorksheetSource {
    /// 打开工作簿或 CSV 文件（根据扩展名自动选择）
    ///
    /// # 参数
    /// - path: 文件路径
    /// - sheet: 工作表名（None 时取第一个；CSV 忽略）
    pub fn open<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let source = match ext.as_str() {
            "csv" => Self::read_csv(path)?,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::read_workbook(path, sheet)?,
            _ => return Err(ImportError::UnsupportedFormat(ext)),
        };

        info!(
            file = %path.display(),
            columns = source.columns.len(),
            rows = source.rows.len(),
            "数据源读取完成"
        );
        Ok(source)
    }

    /// 由内存中的行构造（测试与嵌入调用使用）
    pub fn from_rows(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }

    // ==========================================
    // CSV
    // ==========================================
    fn read_csv(path: &Path) -> ImportResult<Self> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: RawRow = columns
                .iter()
                .zip(record.iter())
                .map(|(column, value)| {
                    let value = value.trim();
                    let cell = if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::from(value)
                    };
                    (column, cell)
                })
                .collect();
            rows.push(row);
        }
        trim_trailing_blank_rows(&mut rows);

        Ok(Self { columns, rows })
    }

    // ==========================================
    // 工作簿
    // ==========================================
    fn read_workbook(path: &Path, sheet: Option<&str>) -> ImportResult<Self> {
        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = match sheet.map(|s| s.trim().trim_end_matches('$')) {
            Some(wanted) if !wanted.is_empty() => sheet_names
                .iter()
                .find(|name| name.as_str() == wanted)
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound(wanted.to_string()))?,
            _ => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| ImportError::WorkbookError("工作簿无工作表".to_string()))?,
        };
        debug!(sheet = %sheet_name, "读取工作表");

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut cells = range.rows();
        let Some(header_row) = cells.next() else {
            return Ok(Self {
                columns: Vec::new(),
                rows: Vec::new(),
            });
        };

        let columns: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for data_row in cells {
            let row: RawRow = columns
                .iter()
                .zip(data_row.iter())
                .filter(|(column, _)| !column.is_empty())
                .map(|(column, cell)| (column, cell_value(cell)))
                .collect();
            rows.push(row);
        }
        trim_trailing_blank_rows(&mut rows);

        Ok(Self { columns, rows })
    }
}

/// 去掉末尾的空白行（工作表已用区域常带尾部空行）
fn trim_trailing_blank_rows(rows: &mut Vec<RawRow>) {
    while rows.last().is_some_and(RawRow::is_blank) {
        rows.pop();
    }
}

/// 工作簿单元格 → 单元格值
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::from(if *b { "True" } else { "False" }),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

impl RowSource for WorksheetSource {
    fn columns(&self) -> ImportResult<Vec<String>> {
        Ok(self.columns.clone())
    }

    fn rows(&self, criteria: &RowCriteria) -> ImportResult<RowCursor> {
        if let Some(column) = &criteria.column {
            let known = self
                .columns
                .iter()
                .any(|c| c.eq_ignore_ascii_case(column.trim()));
            if !known {
                return Err(ImportError::SourceUnavailable(format!(
                    "筛选列不存在: {}",
                    column
                )));
            }
        }

        let rows: Vec<RawRow> = self
            .rows
            .iter()
            .filter(|row| criteria.matches(row))
            .cloned()
            .collect();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}
