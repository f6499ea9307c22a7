// ==========================================
// 图片数据库导入 - 配置层
// ==========================================
// 职责: 导入会话设置（字段来源选择器 / 手动值 / 会话开关）
// 存储: JSON 文件
// ==========================================

pub mod import_settings;

// 重导出核心设置类型
pub use import_settings::{
    FrameSelectors, GlassSelectors, ImageSelectors, ImportSettings, ManualValues,
    MatboardSelectors, MetadataSelectors,
};
