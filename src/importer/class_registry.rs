// ==========================================
// 图片数据库导入 - 内存类注册表
// ==========================================
// 用途: 宿主环境之外运行（CLI / 测试）时的 ResourceRegistry 实现
// 行为: 与宿主一致，create 会把新类切换为活动类
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::picture_importer_trait::{ClassHandle, ResourceRegistry};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryClassRegistry {
    classes: Vec<String>,
    active: ClassHandle,
    created: Vec<String>,
}

impl InMemoryClassRegistry {
    /// 仅含活动类的注册表
    pub fn new(active_class: &str) -> Self {
        Self::with_classes(active_class, std::iter::empty::<&str>())
    }

    /// 预置已有类；活动类不在列表中时自动加入
    pub fn with_classes<I, S>(active_class: &str, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self {
            classes: Vec::new(),
            active: ClassHandle(0),
            created: Vec::new(),
        };
        registry.classes.push(active_class.to_string());
        for class in classes {
            let name = class.as_ref().trim();
            if !name.is_empty() && registry.lookup(name).is_none() {
                registry.classes.push(name.to_string());
            }
        }
        registry
    }

    pub fn active_name(&self) -> &str {
        &self.classes[self.active.0]
    }

    /// 本次会话中创建的类（按创建顺序）
    pub fn created(&self) -> &[String] {
        &self.created
    }

    pub fn class_names(&self) -> &[String] {
        &self.classes
    }
}

impl ResourceRegistry for InMemoryClassRegistry {
    fn lookup(&self, name: &str) -> Option<ClassHandle> {
        self.classes.iter().position(|c| c == name).map(ClassHandle)
    }

    fn create(&mut self, name: &str) -> ImportResult<ClassHandle> {
        if name.trim().is_empty() {
            return Err(ImportError::RegistryError {
                name: name.to_string(),
                message: "类名为空".to_string(),
            });
        }
        if let Some(existing) = self.lookup(name) {
            return Ok(existing);
        }

        let handle = ClassHandle(self.classes.len());
        self.classes.push(name.to_string());
        self.created.push(name.to_string());
        self.active = handle;
        debug!(class = name, "创建类");
        Ok(handle)
    }

    fn active_handle(&self) -> ClassHandle {
        self.active
    }

    fn set_active(&mut self, handle: ClassHandle) {
        if handle.0 < self.classes.len() {
            self.active = handle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_switches_active() {
        let mut registry = InMemoryClassRegistry::with_classes("None", ["Oak"]);
        assert_eq!(registry.active_name(), "None");

        registry.create("Walnut").unwrap();
        assert_eq!(registry.active_name(), "Walnut");
        assert_eq!(registry.created(), &["Walnut".to_string()]);
    }

    #[test]
    fn test_create_preserving_active() {
        let mut registry = InMemoryClassRegistry::new("Gallery");

        let handle = registry.create_preserving_active("Oak").unwrap();

        assert_eq!(registry.lookup("Oak"), Some(handle));
        assert_eq!(registry.active_name(), "Gallery");
    }

    #[test]
    fn test_preserving_active_on_failure() {
        let mut registry = InMemoryClassRegistry::new("Gallery");

        assert!(registry.create_preserving_active("  ").is_err());
        assert_eq!(registry.active_name(), "Gallery");
        assert!(registry.created().is_empty());
    }

    #[test]
    fn test_known_classes_deduplicated() {
        let registry = InMemoryClassRegistry::with_classes("None", ["Oak", "None", "Oak", ""]);
        assert_eq!(registry.class_names(), &["None".to_string(), "Oak".to_string()]);
    }
}
