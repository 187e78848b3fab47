//! The category table: a fixed mapping from category identifier to resize policy.
//!
//! The registry is built once from configuration and injected into the
//! service - it is immutable for the process lifetime, and an identifier it
//! does not know is never a valid storage target.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::CategoryConfig;
use crate::errors::{Error, Result};

/// Cover-fit target for one category: stored images are scaled to fill this
/// box exactly, with centered overflow cropped away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResizePolicy {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
struct Category {
    name: String,
    policy: Option<ResizePolicy>,
}

/// Immutable category table, in configuration order.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Build the registry from the configured category table.
    ///
    /// Rejects tables the store could not represent: empty or duplicate
    /// names, names that are not plain directory names, and zero-sized
    /// resize targets.
    pub fn new(configs: &[CategoryConfig]) -> anyhow::Result<Self> {
        let mut categories: Vec<Category> = Vec::with_capacity(configs.len());
        for config in configs {
            let name = config.name.as_str();
            if name.is_empty() {
                anyhow::bail!("category names must not be empty");
            }
            if name.starts_with('.') || name.contains(['/', '\\', '\0']) {
                anyhow::bail!("category name {name:?} is not a valid directory name");
            }
            if categories.iter().any(|c| c.name == name) {
                anyhow::bail!("duplicate category {name:?}");
            }
            let policy = match &config.resize {
                Some(resize) => {
                    if resize.width == 0 || resize.height == 0 {
                        anyhow::bail!("category {name:?} has a zero-sized resize target");
                    }
                    Some(ResizePolicy {
                        width: resize.width,
                        height: resize.height,
                    })
                }
                None => None,
            };
            categories.push(Category {
                name: name.to_string(),
                policy,
            });
        }
        Ok(Self { categories })
    }

    fn find(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Resolve a category's resize policy; `None` means pass-through storage.
    pub fn lookup(&self, name: &str) -> Result<Option<&ResizePolicy>> {
        match self.find(name) {
            Some(category) => Ok(category.policy.as_ref()),
            None => Err(Error::UnknownCategory {
                category: name.to_string(),
            }),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Category identifiers in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// (name, policy) pairs in table order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&ResizePolicy>)> {
        self.categories
            .iter()
            .map(|c| (c.name.as_str(), c.policy.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResizeConfig;

    fn table() -> Vec<CategoryConfig> {
        vec![
            CategoryConfig {
                name: "clients".to_string(),
                resize: Some(ResizeConfig {
                    width: 200,
                    height: 200,
                }),
            },
            CategoryConfig {
                name: "logos".to_string(),
                resize: None,
            },
        ]
    }

    #[test]
    fn lookup_returns_policy_for_sized_category() {
        let registry = CategoryRegistry::new(&table()).unwrap();
        let policy = registry.lookup("clients").unwrap().unwrap();
        assert_eq!((policy.width, policy.height), (200, 200));
    }

    #[test]
    fn lookup_returns_none_for_passthrough_category() {
        let registry = CategoryRegistry::new(&table()).unwrap();
        assert!(registry.lookup("logos").unwrap().is_none());
    }

    #[test]
    fn lookup_rejects_unknown_category() {
        let registry = CategoryRegistry::new(&table()).unwrap();
        assert!(matches!(
            registry.lookup("missing"),
            Err(Error::UnknownCategory { .. })
        ));
        assert!(!registry.exists("missing"));
        assert!(registry.exists("clients"));
    }

    #[test]
    fn names_preserve_table_order() {
        let registry = CategoryRegistry::new(&table()).unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["clients", "logos"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut configs = table();
        configs.push(CategoryConfig {
            name: "clients".to_string(),
            resize: None,
        });
        assert!(CategoryRegistry::new(&configs).is_err());
    }

    #[test]
    fn rejects_names_with_path_separators() {
        let configs = vec![CategoryConfig {
            name: "a/b".to_string(),
            resize: None,
        }];
        assert!(CategoryRegistry::new(&configs).is_err());
    }

    #[test]
    fn rejects_zero_dimensions() {
        let configs = vec![CategoryConfig {
            name: "banners".to_string(),
            resize: Some(ResizeConfig {
                width: 100,
                height: 0,
            }),
        }];
        assert!(CategoryRegistry::new(&configs).is_err());
    }
}
