// ==========================================
// 图片数据库导入 - 记录组装器
// ==========================================
// 职责: 单行 → PictureParameters + 诊断
// 流程: 标识 → Image → Frame → Matboard → Glass → Symbol → Class → Metadata
// 红线: 字段级问题只累积诊断，不返回错误
// ==========================================

use crate::config::ImportSettings;
use crate::domain::diagnostic::RowDiagnostics;
use crate::domain::picture::{size_text, PictureParameters, PictureRecord};
use crate::domain::types::{CellValue, FieldSelector, RawRow};
use crate::importer::derivation::DerivationService;
use crate::importer::field_resolver::FieldResolver;
use crate::importer::numeric_validator::NumericValidator;
use crate::importer::picture_importer_trait::{NumericStringParser, ResourceRegistry};
use tracing::debug;

/// 符号文件夹名后缀
pub const SYMBOL_FOLDER_SUFFIX: &str = " Folder";

/// 组装结果
#[derive(Debug, Clone, PartialEq)]
pub enum AssembledRow {
    Picture(AssembledPicture),
    /// 标识字段为空，无法处理
    IdentityMissing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPicture {
    pub picture: PictureParameters,
    pub diagnostics: RowDiagnostics,
}

impl AssembledPicture {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_valid()
    }

    /// 日志错误行（以原始名称开头）；有效行返回 None
    pub fn error_line(&self) -> Option<String> {
        self.diagnostics.error_line(&self.picture.picture_name)
    }

    /// 交给调用方的记录：无效行名称置空
    pub fn into_output(self) -> PictureParameters {
        let mut picture = self.picture;
        if !self.diagnostics.is_valid() {
            picture.picture_name.clear();
        }
        picture
    }
}

// ==========================================
// RecordAssembler
// ==========================================
pub struct RecordAssembler {
    settings: ImportSettings,
    validator: NumericValidator,
    resolver: FieldResolver,
}

impl RecordAssembler {
    pub fn new(settings: ImportSettings) -> Self {
        Self::with_validator(settings, NumericValidator::default())
    }

    /// 使用自定义数值文本解析器
    pub fn with_parser(settings: ImportSettings, parser: Box<dyn NumericStringParser>) -> Self {
        Self::with_validator(settings, NumericValidator::new(parser))
    }

    fn with_validator(settings: ImportSettings, validator: NumericValidator) -> Self {
        Self {
            settings,
            validator,
            resolver: FieldResolver,
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// 组装单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - registry: 类注册表（自动创建缺失类时会被修改）
    ///
    /// # 返回
    /// 同一行 + 同一设置 + 同一注册表状态下结果完全一致
    pub fn assemble(&self, row: &RawRow, registry: &mut dyn ResourceRegistry) -> AssembledRow {
        let Some(name) = self
            .resolver
            .resolve_identity(&self.settings.picture_name_selector, row)
        else {
            return AssembledRow::IdentityMissing;
        };

        let mut picture = PictureParameters::named(name);
        let mut diagnostics = RowDiagnostics::new();

        let derivation = DerivationService::new(&self.settings, &self.validator);
        derivation.derive_image(row, &mut picture, &mut diagnostics);
        derivation.derive_frame(row, &mut picture, &mut diagnostics, registry);
        derivation.derive_matboard(row, &mut picture, &mut diagnostics, registry);
        derivation.derive_glass(row, &mut picture, &mut diagnostics, registry);

        self.derive_symbol(row, &mut picture);
        self.derive_picture_class(row, &mut picture);
        if self.settings.meta_import_metadata {
            picture.metadata = Some(self.derive_metadata(row, &picture));
        }

        debug!(
            picture = %picture.picture_name,
            valid = diagnostics.is_valid(),
            "行组装完成"
        );

        AssembledRow::Picture(AssembledPicture {
            picture,
            diagnostics,
        })
    }

    // ==========================================
    // 符号
    // ==========================================
    // 手动文件夹原样使用；列值需整理并加后缀；列值为空时文件夹留空
    fn derive_symbol(&self, row: &RawRow, picture: &mut PictureParameters) {
        if !self.settings.symbol_create_symbol {
            return;
        }

        picture.symbol.create_symbol = true;
        picture.symbol.folder = match &self.settings.symbol_folder_selector {
            FieldSelector::Manual => self.settings.manual.symbol_folder.clone(),
            FieldSelector::DontImport => String::new(),
            FieldSelector::Column(column) => row
                .get(column)
                .to_text()
                .filter(|text| !text.is_empty())
                .map(|text| symbol_folder_name(&text))
                .unwrap_or_default(),
        };
    }

    fn derive_picture_class(&self, row: &RawRow, picture: &mut PictureParameters) {
        if !self.settings.class_assign_picture_class {
            return;
        }

        picture.picture_class = match &self.settings.class_picture_selector {
            FieldSelector::Manual => Some(self.settings.manual.picture_class.clone()),
            FieldSelector::DontImport => None,
            FieldSelector::Column(column) => row.get(column).to_text(),
        };
    }

    // ==========================================
    // 元数据
    // ==========================================
    fn derive_metadata(&self, row: &RawRow, picture: &PictureParameters) -> PictureRecord {
        let selectors = &self.settings.metadata;
        let text = |selector: &FieldSelector| self.column_value(selector, row).and_then(|v| v.to_text());
        let year = |selector: &FieldSelector| self.column_value(selector, row).map(make_year_text);

        let mut record = PictureRecord {
            artwork_title: text(&selectors.artwork_title),
            author_name: text(&selectors.author_name),
            artwork_creation_date: year(&selectors.artwork_creation_date),
            artwork_media: text(&selectors.artwork_media),
            room_location: text(&selectors.room_location),
            artwork_source: text(&selectors.artwork_source),
            registration_number: text(&selectors.registration_number),
            author_birth_country: text(&selectors.author_birth_country),
            author_birth_date: year(&selectors.author_birth_date),
            author_death_date: year(&selectors.author_death_date),
            design_notes: text(&selectors.design_notes),
            exhibition_media: text(&selectors.exhibition_media),
            ..PictureRecord::default()
        };

        if picture.image.enabled {
            record.image_size = Some(size_text(picture.image.height, picture.image.width));
        }
        if picture.frame.enabled || picture.matboard.enabled {
            record.frame_size = Some(size_text(picture.frame.height, picture.frame.width));
        }
        if picture.matboard.enabled {
            record.window_size = Some(size_text(
                picture.matboard.window_height,
                picture.matboard.window_width,
            ));
        }

        record
    }

    /// 元数据字段只来自数据列（无手动值）
    fn column_value<'r>(&self, selector: &FieldSelector, row: &'r RawRow) -> Option<&'r CellValue> {
        match selector {
            FieldSelector::Column(column) => Some(row.get(column)),
            _ => None,
        }
    }
}

/// 年份文本: 文本原样 / 数值取整数部分 / 其他为 "Unknown"
pub fn make_year_text(value: &CellValue) -> String {
    match value {
        CellValue::Text(text) => text.clone(),
        CellValue::Number(n) => format!("{}", n.trunc() as i64),
        CellValue::Empty => "Unknown".to_string(),
    }
}

/// 符号文件夹名: 空白字符 → '_'，"__" 合并一次，追加后缀
pub fn symbol_folder_name(source: &str) -> String {
    let underscored: String = source
        .chars()
        .map(|c| if is_folder_whitespace(c) { '_' } else { c })
        .collect();
    format!("{}{}", underscored.replace("__", "_"), SYMBOL_FOLDER_SUFFIX)
}

// 空格 \t \n \r \x0b \x0c
fn is_folder_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::class_registry::InMemoryClassRegistry;

    fn settings() -> ImportSettings {
        let mut settings = ImportSettings::default();
        settings.picture_name_selector = FieldSelector::column("Image Texture");
        settings.image.with_image = FieldSelector::column("With Image");
        settings.image.width = FieldSelector::column("Image Width");
        settings.image.height = FieldSelector::column("Image Height");
        settings.frame.with_frame = FieldSelector::column("With Frame");
        settings.frame.width = FieldSelector::column("Frame Width");
        settings.frame.height = FieldSelector::column("Frame Height");
        settings
    }

    fn row() -> RawRow {
        vec![
            ("Image Texture", CellValue::from("Mona Lisa")),
            ("With Image", CellValue::from("True")),
            ("Image Width", CellValue::Number(53.0)),
            ("Image Height", CellValue::Number(77.0)),
            ("With Frame", CellValue::from("No")),
            ("Room", CellValue::from("Salle des États")),
            ("Year", CellValue::Number(1503.7)),
            ("Folder", CellValue::from("Italian  Renaissance")),
        ]
        .into_iter()
        .collect()
    }

    fn expect_picture(result: AssembledRow) -> AssembledPicture {
        match result {
            AssembledRow::Picture(picture) => picture,
            AssembledRow::IdentityMissing => panic!("identity unexpectedly missing"),
        }
    }

    #[test]
    fn test_valid_row() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");

        let assembled = expect_picture(assembler.assemble(&row(), &mut registry));

        assert!(assembled.is_valid());
        assert_eq!(assembled.error_line(), None);
        let picture = assembled.into_output();
        assert_eq!(picture.picture_name, "Mona Lisa");
        assert_eq!(picture.image.width.unwrap().to_string(), "53");
        assert!(!picture.frame.enabled);
        assert_eq!(picture.metadata, None);
    }

    #[test]
    fn test_identity_missing() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");
        let mut row = row();
        row.insert("Image Texture", CellValue::Empty);

        assert_eq!(assembler.assemble(&row, &mut registry), AssembledRow::IdentityMissing);
    }

    #[test]
    fn test_invalid_row_blanks_name() {
        let assembler = RecordAssembler::new(settings());
        let mut registry = InMemoryClassRegistry::new("None");
        let mut row = row();
        row.insert("Image Width", "wide");

        let assembled = expect_picture(assembler.assemble(&row, &mut registry));

        assert_eq!(
            assembled.error_line().unwrap(),
            "Mona Lisa * [Error]- Invalid Image Width (wide)"
        );
        assert!(assembled.into_output().is_unknown());
    }

    #[test]
    fn test_symbol_folder_from_column() {
        let mut settings = settings();
        settings.symbol_create_symbol = true;
        settings.symbol_folder_selector = FieldSelector::column("Folder");
        let assembler = RecordAssembler::new(settings);
        let mut registry = InMemoryClassRegistry::new("None");

        let picture = expect_picture(assembler.assemble(&row(), &mut registry)).into_output();

        assert!(picture.symbol.create_symbol);
        assert_eq!(picture.symbol.folder, "Italian_Renaissance Folder");
    }

    #[test]
    fn test_symbol_folder_manual_verbatim() {
        let mut settings = settings();
        settings.symbol_create_symbol = true;
        settings.symbol_folder_selector = FieldSelector::Manual;
        settings.manual.symbol_folder = "My  Pictures".to_string();
        let assembler = RecordAssembler::new(settings);
        let mut registry = InMemoryClassRegistry::new("None");

        let picture = expect_picture(assembler.assemble(&row(), &mut registry)).into_output();

        assert_eq!(picture.symbol.folder, "My  Pictures");
    }

    #[test]
    fn test_picture_class() {
        let mut settings = settings();
        settings.class_assign_picture_class = true;
        settings.class_picture_selector = FieldSelector::column("Room");
        let assembler = RecordAssembler::new(settings);
        let mut registry = InMemoryClassRegistry::new("None");

        let picture = expect_picture(assembler.assemble(&row(), &mut registry)).into_output();

        assert_eq!(picture.picture_class.as_deref(), Some("Salle des États"));
    }

    #[test]
    fn test_metadata_fields() {
        let mut settings = settings();
        settings.meta_import_metadata = true;
        settings.metadata.room_location = FieldSelector::column("Room");
        settings.metadata.artwork_creation_date = FieldSelector::column("Year");
        settings.metadata.author_birth_date = FieldSelector::column("Missing");
        let assembler = RecordAssembler::new(settings);
        let mut registry = InMemoryClassRegistry::new("None");

        let picture = expect_picture(assembler.assemble(&row(), &mut registry)).into_output();
        let record = picture.metadata.unwrap();

        assert_eq!(record.room_location.as_deref(), Some("Salle des États"));
        assert_eq!(record.artwork_creation_date.as_deref(), Some("1503"));
        assert_eq!(record.author_birth_date.as_deref(), Some("Unknown"));
        assert_eq!(record.author_death_date, None);
        assert_eq!(record.image_size.as_deref(), Some("Height: 77, Width: 53"));
        assert_eq!(record.frame_size, None);
        assert_eq!(record.window_size, None);
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let mut settings = settings();
        settings.meta_import_metadata = true;
        settings.metadata.artwork_title = FieldSelector::column("Image Texture");
        let assembler = RecordAssembler::new(settings);
        let mut registry = InMemoryClassRegistry::new("None");

        let first = assembler.assemble(&row(), &mut registry);
        let second = assembler.assemble(&row(), &mut registry);

        assert_eq!(first, second);
    }

    #[test]
    fn test_symbol_folder_name() {
        assert_eq!(symbol_folder_name("Old Masters"), "Old_Masters Folder");
        assert_eq!(symbol_folder_name("a\tb"), "a_b Folder");
        // 单次合并: 三个空白 → "___" → "__"
        assert_eq!(symbol_folder_name("a   b"), "a__b Folder");
    }

    #[test]
    fn test_make_year_text() {
        assert_eq!(make_year_text(&CellValue::from("c. 1500")), "c. 1500");
        assert_eq!(make_year_text(&CellValue::Number(1889.0)), "1889");
        assert_eq!(make_year_text(&CellValue::Empty), "Unknown");
    }
}
