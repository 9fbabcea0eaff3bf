//! Application context
//!
//! Created once at startup and passed by reference; replaces process-wide
//! singletons for anything that needs the loaded settings.

use std::path::Path;
use std::sync::Arc;

use crate::builder::TreeBuilder;
use crate::config::Settings;
use crate::error::TreeResult;
use crate::tree::Tree;

pub struct AppContext {
    /// Application settings
    pub settings: Arc<Settings>,
}

impl AppContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    /// Load settings with the usual layering and wrap them.
    pub fn load(config_file: Option<&Path>) -> TreeResult<Self> {
        Ok(Self::new(Settings::load(config_file)?))
    }

    /// Empty tree configured from the settings.
    pub fn new_tree(&self) -> Tree {
        Tree::from_settings(&self.settings)
    }

    /// Build a tree from a TOML description file, configured from the settings.
    pub fn load_tree(&self, path: &Path) -> TreeResult<Tree> {
        TreeBuilder::with_template(self.new_tree()).from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_settings_when_creating_tree_then_store_uses_shard_count() {
        let context = AppContext::new(Settings {
            shard_count: 4,
            max_depth: Some(3),
        });

        let tree = context.new_tree();

        assert_eq!(tree.store().shard_count(), 4);
        assert_eq!(tree.max_depth(), Some(3));
    }
}
