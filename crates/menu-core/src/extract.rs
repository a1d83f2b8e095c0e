//! Command catalog extraction.
//!
//! [`extract_commands`] walks every activated plugin in the host registry and
//! collects the commands its handlers respond to.  The result feeds the web
//! editor's "available commands" panel; it is rebuilt on every request so a
//! plugin installed a second ago shows up immediately.
//!
//! # Rules
//!
//! - The plugin named `self_name` (Command Menu itself) is skipped.
//! - Plugins with an empty name or module path are skipped.
//! - Only handlers whose module path equals the plugin's module path count.
//! - A handler contributes `"name#description"` (or bare `"name"`) through
//!   [`HandlerInfo::formatted_command`]; handlers without a command or
//!   command-group filter contribute nothing.
//! - Duplicates within one plugin are dropped, first occurrence wins.
//! - Any registry error yields an empty map.

use tracing::{debug, error, info, warn};

use crate::domain::catalog::PluginCommandMap;
use crate::domain::registry::{HandlerInfo, PluginRegistry, RegistryError};

/// Builds the plugin → commands map from the host registry.
///
/// Never fails: registry errors are logged and produce an empty map.
pub async fn extract_commands(registry: &dyn PluginRegistry, self_name: &str) -> PluginCommandMap {
    match try_extract_commands(registry, self_name).await {
        Ok(map) => {
            info!(
                "extracted {} commands from {} plugins",
                map.total_commands(),
                map.len()
            );
            map
        }
        Err(e) => {
            error!("failed to read plugin registry: {e}");
            PluginCommandMap::new()
        }
    }
}

async fn try_extract_commands(
    registry: &dyn PluginRegistry,
    self_name: &str,
) -> Result<PluginCommandMap, RegistryError> {
    let plugins = registry.list_active_plugins().await?;
    debug!("found {} activated plugins", plugins.len());

    if plugins.is_empty() {
        warn!("registry reported no activated plugins");
    }

    let mut map = PluginCommandMap::new();

    for plugin in plugins {
        if plugin.name == self_name {
            continue;
        }
        if plugin.name.is_empty() || plugin.module_path.is_empty() {
            warn!("plugin '{}' has invalid metadata; skipped", plugin.name);
            continue;
        }

        let handlers = registry.list_handlers_for_module(&plugin.module_path).await?;
        let added = collect_plugin_commands(&mut map, &plugin.name, &plugin.module_path, &handlers);

        if added > 0 {
            debug!("plugin '{}' contributed {added} commands", plugin.name);
        }
    }

    Ok(map)
}

/// Adds the commands of `handlers` owned by `module_path` under `plugin`.
///
/// Returns how many new command strings were added.
fn collect_plugin_commands(
    map: &mut PluginCommandMap,
    plugin: &str,
    module_path: &str,
    handlers: &[HandlerInfo],
) -> usize {
    handlers
        .iter()
        .filter(|handler| handler.module_path == module_path)
        .filter_map(HandlerInfo::formatted_command)
        .filter(|command| map.insert_unique(plugin, command.clone()))
        .count()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{HandlerFilter, MockPluginRegistry, PluginInfo};
    use mockall::predicate::eq;

    fn plugin(name: &str, module_path: &str) -> PluginInfo {
        PluginInfo {
            name: name.to_string(),
            module_path: module_path.to_string(),
        }
    }

    fn command(module_path: &str, name: &str, desc: Option<&str>) -> HandlerInfo {
        HandlerInfo {
            module_path: module_path.to_string(),
            description: desc.map(str::to_string),
            filters: vec![HandlerFilter::Command { name: name.to_string() }],
        }
    }

    #[tokio::test]
    async fn test_extracts_commands_for_each_plugin() {
        // Arrange
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("weather", "plugins.weather")]));
        registry
            .expect_list_handlers_for_module()
            .with(eq("plugins.weather"))
            .returning(|_| {
                Ok(vec![
                    command("plugins.weather", "w", Some("Show weather")),
                    command("plugins.weather", "forecast", None),
                ])
            });

        // Act
        let map = extract_commands(&registry, "command_menu").await;

        // Assert
        assert_eq!(
            map.get("weather").unwrap(),
            ["w#Show weather".to_string(), "forecast".to_string()]
        );
    }

    #[tokio::test]
    async fn test_skips_own_plugin() {
        // Arrange: the registry must never be asked for our own handlers
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("command_menu", "plugins.menu")]));
        registry.expect_list_handlers_for_module().never();

        // Act
        let map = extract_commands(&registry, "command_menu").await;

        // Assert
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_skips_plugin_with_empty_module_path() {
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("broken", "")]));
        registry.expect_list_handlers_for_module().never();

        let map = extract_commands(&registry, "command_menu").await;
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_plugin_without_command_filters_is_omitted() {
        // Arrange: a plugin whose only handler listens to all messages
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("logger", "plugins.logger")]));
        registry.expect_list_handlers_for_module().returning(|_| {
            Ok(vec![HandlerInfo {
                module_path: "plugins.logger".to_string(),
                description: Some("logs everything".to_string()),
                filters: vec![HandlerFilter::Other],
            }])
        });

        // Act
        let map = extract_commands(&registry, "command_menu").await;

        // Assert
        assert!(map.get("logger").is_none());
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_handler_with_empty_command_name_is_skipped() {
        // Arrange: one nameless command next to a real one
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("p", "plugins.p")]));
        registry.expect_list_handlers_for_module().returning(|_| {
            Ok(vec![
                command("plugins.p", "", Some("desc")),
                command("plugins.p", "real", None),
            ])
        });

        // Act
        let map = extract_commands(&registry, "command_menu").await;

        // Assert
        assert_eq!(map.get("p").unwrap(), ["real".to_string()]);
    }

    #[tokio::test]
    async fn test_ignores_handlers_from_other_modules() {
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("a", "plugins.a")]));
        registry.expect_list_handlers_for_module().returning(|_| {
            Ok(vec![
                command("plugins.a", "mine", None),
                command("plugins.b", "theirs", None),
            ])
        });

        let map = extract_commands(&registry, "command_menu").await;
        assert_eq!(map.get("a").unwrap(), ["mine".to_string()]);
    }

    #[tokio::test]
    async fn test_deduplicates_preserving_first_seen_order() {
        // Arrange: "b" appears twice, once via a command group
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("p", "plugins.p")]));
        registry.expect_list_handlers_for_module().returning(|_| {
            Ok(vec![
                command("plugins.p", "b", None),
                command("plugins.p", "a", Some("alpha")),
                HandlerInfo {
                    module_path: "plugins.p".to_string(),
                    description: None,
                    filters: vec![HandlerFilter::CommandGroup { name: "b".to_string() }],
                },
                command("plugins.p", "a", Some("alpha")),
            ])
        });

        // Act
        let map = extract_commands(&registry, "command_menu").await;

        // Assert
        assert_eq!(map.get("p").unwrap(), ["b".to_string(), "a#alpha".to_string()]);
    }

    #[tokio::test]
    async fn test_registry_failure_yields_empty_map() {
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Err(RegistryError::Unavailable("host is gone".into())));

        let map = extract_commands(&registry, "command_menu").await;
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_handler_query_failure_yields_empty_map() {
        let mut registry = MockPluginRegistry::new();
        registry
            .expect_list_active_plugins()
            .returning(|| Ok(vec![plugin("a", "plugins.a"), plugin("b", "plugins.b")]));
        registry
            .expect_list_handlers_for_module()
            .returning(|_| Err(RegistryError::Malformed("bad handler record".into())));

        let map = extract_commands(&registry, "command_menu").await;
        assert!(map.is_empty());
    }
}
