// ==========================================
// 图片数据库导入 - 分区派生服务
// ==========================================
// 职责: Image / Frame / Matboard / Glass 四个分区的字段派生
// 流程: 存在标志 → (存在时) 明细字段解析 + 校验 → 诊断累积
// 规则: 衬板窗口尺寸缺失时回退为图像尺寸
// 规则: 类引用按 手动 / 查找 / 自动创建 三路处理
// ==========================================

use crate::config::ImportSettings;
use crate::domain::diagnostic::{Diagnostic, RowDiagnostics, Section};
use crate::domain::picture::PictureParameters;
use crate::domain::types::{CellValue, FieldSelector, Quantity, RawRow};
use crate::importer::field_resolver::{FieldResolver, Resolution};
use crate::importer::numeric_validator::NumericValidator;
use crate::importer::picture_importer_trait::ResourceRegistry;
use tracing::{debug, info, warn};

/// 数值字段的三种结果
enum Validated {
    Skipped,
    Valid(Quantity),
    Invalid(CellValue),
}

pub struct DerivationService<'a> {
    settings: &'a ImportSettings,
    validator: &'a NumericValidator,
    resolver: FieldResolver,
}

impl<'a> DerivationService<'a> {
    pub fn new(settings: &'a ImportSettings, validator: &'a NumericValidator) -> Self {
        Self {
            settings,
            validator,
            resolver: FieldResolver,
        }
    }

    // ==========================================
    // 图像分区
    // ==========================================
    pub fn derive_image(
        &self,
        row: &RawRow,
        picture: &mut PictureParameters,
        diagnostics: &mut RowDiagnostics,
    ) {
        let selectors = &self.settings.image;
        let manual = &self.settings.manual;

        picture.image.enabled =
            self.resolver
                .resolve_presence(&selectors.with_image, row, manual.with_image);
        if !picture.image.enabled {
            return;
        }

        let section = Section::Image;
        picture.image.width = self.quantity(
            &selectors.width,
            row,
            manual.image_width,
            section,
            "Image Width",
            diagnostics,
        );
        picture.image.height = self.quantity(
            &selectors.height,
            row,
            manual.image_height,
            section,
            "Image Height",
            diagnostics,
        );
        picture.image.position = self.quantity(
            &selectors.position,
            row,
            manual.image_position,
            section,
            "Image Position",
            diagnostics,
        );
    }

    // ==========================================
    // 画框分区
    // ==========================================
    pub fn derive_frame(
        &self,
        row: &RawRow,
        picture: &mut PictureParameters,
        diagnostics: &mut RowDiagnostics,
        registry: &mut dyn ResourceRegistry,
    ) {
        let selectors = &self.settings.frame;
        let manual = &self.settings.manual;

        picture.frame.enabled =
            self.resolver
                .resolve_presence(&selectors.with_frame, row, manual.with_frame);
        if !picture.frame.enabled {
            return;
        }

        let section = Section::Frame;
        picture.frame.width = self.quantity(
            &selectors.width,
            row,
            manual.frame_width,
            section,
            "Frame Width",
            diagnostics,
        );
        picture.frame.height = self.quantity(
            &selectors.height,
            row,
            manual.frame_height,
            section,
            "Frame Height",
            diagnostics,
        );
        picture.frame.thickness = self.quantity(
            &selectors.thickness,
            row,
            manual.frame_thickness,
            section,
            "Frame Thickness",
            diagnostics,
        );
        picture.frame.depth = self.quantity(
            &selectors.depth,
            row,
            manual.frame_depth,
            section,
            "Frame Depth",
            diagnostics,
        );
        picture.frame.class = self.class_reference(
            &selectors.class,
            row,
            &manual.frame_class,
            section,
            diagnostics,
            registry,
        );
        picture.frame.texture_scale = self.quantity(
            &selectors.texture_scale,
            row,
            manual.frame_texture_scale,
            section,
            "Frame Texture Scale",
            diagnostics,
        );
        picture.frame.texture_rotation = self.quantity(
            &selectors.texture_rotation,
            row,
            manual.frame_texture_rotation,
            section,
            "Frame Texture Rotation",
            diagnostics,
        );
    }

    // ==========================================
    // 衬板分区
    // ==========================================
    // 衬板外形沿用画框宽高（问题记入画框缓冲区）
    // 窗口尺寸缺失且有图像时回退为图像尺寸（仅提示，不使行无效）
    pub fn derive_matboard(
        &self,
        row: &RawRow,
        picture: &mut PictureParameters,
        diagnostics: &mut RowDiagnostics,
        registry: &mut dyn ResourceRegistry,
    ) {
        let selectors = &self.settings.matboard;
        let manual = &self.settings.manual;

        picture.matboard.enabled =
            self.resolver
                .resolve_presence(&selectors.with_matboard, row, manual.with_matboard);
        if !picture.matboard.enabled {
            return;
        }

        let frame = &self.settings.frame;
        if let Some(width) = self.quantity(
            &frame.width,
            row,
            manual.frame_width,
            Section::Frame,
            "Frame Width (needed for Matboard)",
            diagnostics,
        ) {
            picture.frame.width = Some(width);
        }
        if let Some(height) = self.quantity(
            &frame.height,
            row,
            manual.frame_height,
            Section::Frame,
            "Frame Height (needed for Matboard)",
            diagnostics,
        ) {
            picture.frame.height = Some(height);
        }

        let section = Section::Matboard;
        picture.matboard.window_width = self.window_dimension(
            &selectors.window_width,
            row,
            manual.window_width,
            picture.image.enabled.then_some(picture.image.width),
            "width",
            "Window Width",
            diagnostics,
        );
        picture.matboard.window_height = self.window_dimension(
            &selectors.window_height,
            row,
            manual.window_height,
            picture.image.enabled.then_some(picture.image.height),
            "height",
            "Window Height",
            diagnostics,
        );
        picture.matboard.position = self.quantity(
            &selectors.position,
            row,
            manual.matboard_position,
            section,
            "Matboard Position",
            diagnostics,
        );
        picture.matboard.class = self.class_reference(
            &selectors.class,
            row,
            &manual.matboard_class,
            section,
            diagnostics,
            registry,
        );
        picture.matboard.texture_scale = self.quantity(
            &selectors.texture_scale,
            row,
            manual.matboard_texture_scale,
            section,
            "Matboard Texture Scale",
            diagnostics,
        );
        picture.matboard.texture_rotation = self.quantity(
            &selectors.texture_rotation,
            row,
            manual.matboard_texture_rotation,
            section,
            "Matboard Texture Rotation",
            diagnostics,
        );
    }

    // ==========================================
    // 玻璃分区
    // ==========================================
    pub fn derive_glass(
        &self,
        row: &RawRow,
        picture: &mut PictureParameters,
        diagnostics: &mut RowDiagnostics,
        registry: &mut dyn ResourceRegistry,
    ) {
        let selectors = &self.settings.glass;
        let manual = &self.settings.manual;

        picture.glass.enabled =
            self.resolver
                .resolve_presence(&selectors.with_glass, row, manual.with_glass);
        if !picture.glass.enabled {
            return;
        }

        let section = Section::Glass;
        picture.glass.position = self.quantity(
            &selectors.position,
            row,
            manual.glass_position,
            section,
            "Glass Position",
            diagnostics,
        );
        picture.glass.class = self.class_reference(
            &selectors.class,
            row,
            &manual.glass_class,
            section,
            diagnostics,
            registry,
        );
    }

    // ==========================================
    // 内部: 数值字段
    // ==========================================
    fn validated(&self, selector: &FieldSelector, row: &RawRow, manual: f64) -> Validated {
        match self
            .resolver
            .resolve(selector, row, Some(CellValue::Number(manual)))
        {
            Resolution::Skip => Validated::Skipped,
            Resolution::Value(raw) => match self.validator.validate(&raw) {
                Some(value) => Validated::Valid(value),
                None => Validated::Invalid(raw),
            },
        }
    }

    fn quantity(
        &self,
        selector: &FieldSelector,
        row: &RawRow,
        manual: f64,
        section: Section,
        field: &'static str,
        diagnostics: &mut RowDiagnostics,
    ) -> Option<Quantity> {
        match self.validated(selector, row, manual) {
            Validated::Skipped => None,
            Validated::Valid(value) => Some(value),
            Validated::Invalid(raw) => {
                debug!(field, raw = %raw, "数值字段校验失败");
                diagnostics.push(section, Diagnostic::FieldInvalid { field, raw });
                None
            }
        }
    }

    /// 衬板窗口尺寸
    ///
    /// # 参数
    /// - image_value: 有图像时为 Some(图像对应尺寸)，无图像时为 None
    #[allow(clippy::too_many_arguments)]
    fn window_dimension(
        &self,
        selector: &FieldSelector,
        row: &RawRow,
        manual: f64,
        image_value: Option<Option<Quantity>>,
        dimension: &'static str,
        field: &'static str,
        diagnostics: &mut RowDiagnostics,
    ) -> Option<Quantity> {
        match (self.validated(selector, row, manual), image_value) {
            (Validated::Valid(value), _) => Some(value),
            (Validated::Skipped | Validated::Invalid(_), Some(image_value)) => {
                diagnostics.push(Section::Matboard, Diagnostic::FallbackApplied { dimension });
                image_value
            }
            (Validated::Invalid(raw), None) => {
                diagnostics.push(Section::Matboard, Diagnostic::FieldInvalid { field, raw });
                None
            }
            (Validated::Skipped, None) => None,
        }
    }

    // ==========================================
    // 内部: 类引用
    // ==========================================
    // - Manual → 直接使用手动类名，不检查存在性
    // - Column → 查找；缺失时按 create_missing_classes 自动创建或报错
    fn class_reference(
        &self,
        selector: &FieldSelector,
        row: &RawRow,
        manual: &str,
        section: Section,
        diagnostics: &mut RowDiagnostics,
        registry: &mut dyn ResourceRegistry,
    ) -> Option<String> {
        let raw = match selector {
            FieldSelector::Manual => return Some(manual.to_string()),
            FieldSelector::DontImport => return None,
            FieldSelector::Column(column) => row.get(column),
        };

        // 空类名无法查找也无法创建
        let Some(name) = raw.to_text().filter(|n| !n.trim().is_empty()) else {
            diagnostics.push(
                section,
                Diagnostic::MissingClass {
                    section,
                    name: raw.to_string(),
                },
            );
            return None;
        };

        if registry.lookup(&name).is_some() {
            return Some(name);
        }

        if !self.settings.create_missing_classes {
            diagnostics.push(section, Diagnostic::MissingClass { section, name });
            return None;
        }

        match registry.create_preserving_active(&name) {
            Ok(_) => {
                info!(section = %section, class = %name, "自动创建缺失的类");
                Some(name)
            }
            Err(e) => {
                warn!(section = %section, class = %name, error = %e, "类创建失败");
                diagnostics.push(section, Diagnostic::MissingClass { section, name });
                None
            }
        }
    }
}
