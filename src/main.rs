// ==========================================
// 图片数据库导入 - 命令行入口
// ==========================================
// 用途: 在宿主环境之外运行导入核心
// 输出: stdout 每行一条 JSON 记录；运行日志走 stderr
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use picture_import::importer::{DiagnosticSink, LogFileSink};
use picture_import::{
    logging, ImportSettings, InMemoryClassRegistry, PictureRowStream, RecordAssembler,
    WorksheetSource,
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "picture-import")]
#[command(version, about = "Import picture parameters from a spreadsheet", long_about = None)]
struct Cli {
    /// Path to the import settings JSON file
    #[arg(short, long)]
    settings: PathBuf,

    /// Write one line per invalid row to this file
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Workbook or CSV file (overrides excel_file_name)
    #[arg(short, long)]
    workbook: Option<PathBuf>,

    /// Worksheet name (overrides excel_sheet_name)
    #[arg(long)]
    sheet: Option<String>,

    /// Emit runtime logs as JSON
    #[arg(long)]
    json_logs: bool,
}

/// 未指定日志文件时诊断行输出到 stderr
struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn write_line(&mut self, line: &str) -> picture_import::ImportResult<()> {
        writeln!(io::stderr(), "{}", line)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    info!(version = picture_import::VERSION, "picture-import 启动");

    let settings = ImportSettings::from_json_file(&cli.settings)
        .with_context(|| format!("无法加载设置: {}", cli.settings.display()))?;

    let workbook = cli
        .workbook
        .clone()
        .or_else(|| settings.excel_file_name.clone())
        .context("未指定工作簿（--workbook 或 excel_file_name）")?;
    let sheet = cli.sheet.clone().or_else(|| settings.excel_sheet_name.clone());

    let source = WorksheetSource::open(&workbook, sheet.as_deref())
        .with_context(|| format!("无法打开工作簿: {}", workbook.display()))?;

    let mut registry =
        InMemoryClassRegistry::with_classes(&settings.active_class, &settings.known_classes);

    let sink: Box<dyn DiagnosticSink> = match &cli.log {
        Some(path) => Box::new(
            LogFileSink::create(path)
                .with_context(|| format!("无法创建日志文件: {}", path.display()))?,
        ),
        None => Box::new(StderrSink),
    };

    let assembler = RecordAssembler::new(settings);
    let mut stream = PictureRowStream::open(&source, &assembler, &mut registry, sink)
        .context("无法读取数据行")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in stream.by_ref() {
        let picture = record.context("数据源中途失效")?;
        serde_json::to_writer(&mut out, &picture)?;
        writeln!(out)?;
    }
    out.flush()?;

    let summary = stream.summary().clone();
    drop(stream);

    info!(
        import_id = %summary.import_id,
        total_rows = summary.total_rows,
        imported = summary.imported,
        invalid = summary.invalid,
        identity_missing = summary.identity_missing,
        "导入结束"
    );
    if !registry.created().is_empty() {
        warn!(classes = ?registry.created(), "已自动创建缺失的类");
    }

    Ok(())
}
