// ==========================================
// 图片数据库导入 - 导入设置
// ==========================================
// 职责: 每个输出字段的来源选择器 + 手动值 + 会话级开关
// 存储: JSON 文件（字段选择器沿用设置对话框的存储文本）
// 红线: 导入期间只读
// ==========================================

use crate::domain::types::FieldSelector;
use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ==========================================
// 分区选择器
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSelectors {
    pub with_image: FieldSelector,
    pub width: FieldSelector,
    pub height: FieldSelector,
    pub position: FieldSelector,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSelectors {
    pub with_frame: FieldSelector,
    pub width: FieldSelector,
    pub height: FieldSelector,
    pub thickness: FieldSelector,
    pub depth: FieldSelector,
    pub class: FieldSelector,
    pub texture_scale: FieldSelector,
    pub texture_rotation: FieldSelector,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatboardSelectors {
    pub with_matboard: FieldSelector,
    pub window_width: FieldSelector,
    pub window_height: FieldSelector,
    pub position: FieldSelector,
    pub class: FieldSelector,
    pub texture_scale: FieldSelector,
    pub texture_rotation: FieldSelector,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlassSelectors {
    pub with_glass: FieldSelector,
    pub position: FieldSelector,
    pub class: FieldSelector,
}

/// 元数据字段选择器（DontImport 即该字段的"不导入"开关）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSelectors {
    pub artwork_title: FieldSelector,
    pub author_name: FieldSelector,
    pub artwork_creation_date: FieldSelector,
    pub artwork_media: FieldSelector,
    pub room_location: FieldSelector,
    pub artwork_source: FieldSelector,
    pub registration_number: FieldSelector,
    pub author_birth_country: FieldSelector,
    pub author_birth_date: FieldSelector,
    pub author_death_date: FieldSelector,
    pub design_notes: FieldSelector,
    pub exhibition_media: FieldSelector,
}

// ==========================================
// ManualValues - 手动值
// ==========================================
// 选择器为 Manual 时使用；配置时已类型化，导入时不再校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualValues {
    pub with_image: bool,
    pub image_width: f64,
    pub image_height: f64,
    pub image_position: f64,

    pub with_frame: bool,
    pub frame_width: f64,
    pub frame_height: f64,
    pub frame_thickness: f64,
    pub frame_depth: f64,
    pub frame_class: String,
    pub frame_texture_scale: f64,
    pub frame_texture_rotation: f64,

    pub with_matboard: bool,
    pub window_width: f64,
    pub window_height: f64,
    pub matboard_position: f64,
    pub matboard_class: String,
    pub matboard_texture_scale: f64,
    pub matboard_texture_rotation: f64,

    pub with_glass: bool,
    pub glass_position: f64,
    pub glass_class: String,

    pub picture_class: String,
    pub symbol_folder: String,
}

impl Default for ManualValues {
    fn default() -> Self {
        Self {
            with_image: true,
            image_width: 0.0,
            image_height: 0.0,
            image_position: 0.0,
            with_frame: false,
            frame_width: 0.0,
            frame_height: 0.0,
            frame_thickness: 0.0,
            frame_depth: 0.0,
            frame_class: "None".to_string(),
            frame_texture_scale: 1.0,
            frame_texture_rotation: 0.0,
            with_matboard: false,
            window_width: 0.0,
            window_height: 0.0,
            matboard_position: 0.0,
            matboard_class: "None".to_string(),
            matboard_texture_scale: 1.0,
            matboard_texture_rotation: 0.0,
            with_glass: false,
            glass_position: 0.0,
            glass_class: "None".to_string(),
            picture_class: "None".to_string(),
            symbol_folder: String::new(),
        }
    }
}

// ==========================================
// ImportSettings - 导入会话设置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    // ===== 工作簿位置 =====
    pub excel_file_name: Option<PathBuf>,
    pub excel_sheet_name: Option<String>,
    pub excel_criteria_selector: Option<String>,
    pub excel_criteria_value: Option<String>,

    // ===== 标识字段（图像贴图列） =====
    pub picture_name_selector: FieldSelector,

    // ===== 分区 =====
    pub image: ImageSelectors,
    pub frame: FrameSelectors,
    pub matboard: MatboardSelectors,
    pub glass: GlassSelectors,

    // ===== 符号 / 类 / 元数据 =====
    pub symbol_create_symbol: bool,
    pub symbol_folder_selector: FieldSelector,
    pub class_assign_picture_class: bool,
    pub class_picture_selector: FieldSelector,
    pub meta_import_metadata: bool,
    pub metadata: MetadataSelectors,

    // ===== 类引用 =====
    pub create_missing_classes: bool,
    pub known_classes: Vec<String>,
    pub active_class: String,

    pub manual: ManualValues,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            excel_file_name: None,
            excel_sheet_name: None,
            excel_criteria_selector: None,
            excel_criteria_value: None,
            picture_name_selector: FieldSelector::DontImport,
            image: ImageSelectors::default(),
            frame: FrameSelectors::default(),
            matboard: MatboardSelectors::default(),
            glass: GlassSelectors::default(),
            symbol_create_symbol: false,
            symbol_folder_selector: FieldSelector::DontImport,
            class_assign_picture_class: false,
            class_picture_selector: FieldSelector::DontImport,
            meta_import_metadata: false,
            metadata: MetadataSelectors::default(),
            create_missing_classes: false,
            known_classes: Vec::new(),
            active_class: "None".to_string(),
            manual: ManualValues::default(),
        }
    }
}

impl ImportSettings {
    /// 从 JSON 文件读取设置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let text = std::fs::read_to_string(path).map_err(|e| ImportError::SettingsReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_json_str(&text).map_err(|e| ImportError::SettingsReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json_str(text: &str) -> ImportResult<Self> {
        let settings: ImportSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验设置的一致性
    pub fn validate(&self) -> ImportResult<()> {
        let selector = self
            .excel_criteria_selector
            .as_deref()
            .filter(|s| !s.trim().is_empty());

        if let Some(selector) = selector {
            let has_value = self
                .excel_criteria_value
                .as_deref()
                .is_some_and(|v| !v.is_empty());
            if !has_value {
                return Err(ImportError::SettingsValueError {
                    key: "excel_criteria_value".to_string(),
                    value: String::new(),
                    message: format!("筛选列 {} 未指定筛选值", selector),
                });
            }
        }

        if self.picture_name_selector.is_manual() {
            return Err(ImportError::SettingsValueError {
                key: "picture_name_selector".to_string(),
                value: self.picture_name_selector.to_string(),
                message: "图片名称只能来自数据列".to_string(),
            });
        }

        Ok(())
    }
}
