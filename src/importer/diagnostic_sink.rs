// ==========================================
// 图片数据库导入 - 诊断日志文件
// ==========================================
// 每个无效行一行，追加写入；关闭时刷新
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::picture_importer_trait::DiagnosticSink;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct LogFileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines_written: usize,
}

impl LogFileSink {
    /// 创建（或截断）日志文件
    pub fn create<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| {
            ImportError::DiagnosticWriteError(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self::from_file(path, file))
    }

    /// 以追加方式打开日志文件
    pub fn append<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ImportError::DiagnosticWriteError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_file(path, file))
    }

    fn from_file(path: PathBuf, file: File) -> Self {
        Self {
            path,
            writer: Some(BufWriter::new(file)),
            lines_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }
}

impl DiagnosticSink for LogFileSink {
    fn write_line(&mut self, line: &str) -> ImportResult<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            ImportError::DiagnosticWriteError(format!("日志已关闭: {}", self.path.display()))
        })?;
        writeln!(writer, "{}", line)
            .map_err(|e| ImportError::DiagnosticWriteError(e.to_string()))?;
        self.lines_written += 1;
        Ok(())
    }

    fn close(&mut self) -> ImportResult<()> {
        match self.writer.take() {
            Some(mut writer) => writer
                .flush()
                .map_err(|e| ImportError::DiagnosticWriteError(e.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lines_flushed_on_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("import.log");

        let mut sink = LogFileSink::create(&path).unwrap();
        sink.write_line("A * [Error]- Invalid Image Width (x)").unwrap();
        sink.write_line("UNKNOWN [Error] - Picture name not found").unwrap();
        sink.close().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "A * [Error]- Invalid Image Width (x)\nUNKNOWN [Error] - Picture name not found\n"
        );
        assert_eq!(sink.lines_written(), 2);
    }

    #[test]
    fn test_write_after_close_fails() {
        let dir = TempDir::new().unwrap();
        let mut sink = LogFileSink::create(dir.path().join("import.log")).unwrap();
        sink.close().unwrap();

        assert!(matches!(
            sink.write_line("late"),
            Err(ImportError::DiagnosticWriteError(_))
        ));
        assert!(sink.close().is_ok());
    }

    #[test]
    fn test_append_keeps_existing_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("import.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let mut sink = LogFileSink::append(&path).unwrap();
        sink.write_line("later").unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }
}
