// ==========================================
// 图片数据库导入 - 图片参数领域模型
// ==========================================
// 职责: 每行输出的图片参数记录（按分区类型化） + 元数据记录
// 生命周期: 每行新建，派生过程中逐字段填充，交给调用方后不再持有
// ==========================================

use crate::domain::types::Quantity;
use serde::Serialize;

// ==========================================
// 图像分区
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageSection {
    pub enabled: bool,
    pub width: Option<Quantity>,
    pub height: Option<Quantity>,
    pub position: Option<Quantity>,
}

// ==========================================
// 画框分区
// ==========================================
// width/height 同时被衬板分区使用
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSection {
    pub enabled: bool,
    pub width: Option<Quantity>,
    pub height: Option<Quantity>,
    pub thickness: Option<Quantity>,
    pub depth: Option<Quantity>,
    pub class: Option<String>,
    pub texture_scale: Option<Quantity>,
    pub texture_rotation: Option<Quantity>,
}

// ==========================================
// 衬板分区
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatboardSection {
    pub enabled: bool,
    pub window_width: Option<Quantity>,
    pub window_height: Option<Quantity>,
    pub position: Option<Quantity>,
    pub class: Option<String>,
    pub texture_scale: Option<Quantity>,
    pub texture_rotation: Option<Quantity>,
}

// ==========================================
// 玻璃分区
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlassSection {
    pub enabled: bool,
    pub position: Option<Quantity>,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolSection {
    pub create_symbol: bool,
    pub folder: String,
}

// ==========================================
// PictureRecord - 图片元数据记录
// ==========================================
// 日期类字段（创作日期/作者生卒）为年份文本或 "Unknown"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PictureRecord {
    pub image_size: Option<String>,
    pub frame_size: Option<String>,
    pub window_size: Option<String>,
    pub artwork_title: Option<String>,
    pub author_name: Option<String>,
    pub artwork_creation_date: Option<String>,
    pub artwork_media: Option<String>,
    pub room_location: Option<String>,
    pub artwork_source: Option<String>,
    pub registration_number: Option<String>,
    pub author_birth_country: Option<String>,
    pub author_birth_date: Option<String>,
    pub author_death_date: Option<String>,
    pub design_notes: Option<String>,
    pub exhibition_media: Option<String>,
}

// ==========================================
// PictureParameters - 图片参数（输出记录）
// ==========================================
// 红线: picture_name 为空串表示该行无法处理，其余字段不可信
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PictureParameters {
    pub picture_name: String,
    pub image: ImageSection,
    pub frame: FrameSection,
    pub matboard: MatboardSection,
    pub glass: GlassSection,
    pub symbol: SymbolSection,
    pub picture_class: Option<String>,
    pub metadata: Option<PictureRecord>,
}

impl PictureParameters {
    pub fn named(picture_name: impl Into<String>) -> Self {
        Self {
            picture_name: picture_name.into(),
            ..Self::default()
        }
    }

    /// 名称哨兵为空即视为无效行
    pub fn is_unknown(&self) -> bool {
        self.picture_name.is_empty()
    }
}

/// 尺寸描述文本: "Height: H, Width: W"
pub fn size_text(height: Option<Quantity>, width: Option<Quantity>) -> String {
    let render = |q: Option<Quantity>| q.map(|v| v.to_string()).unwrap_or_default();
    format!("Height: {}, Width: {}", render(height), render(width))
}
