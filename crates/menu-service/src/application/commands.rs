//! Parsing chat lines into menu commands.
//!
//! Two commands exist, each with aliases:
//!
//! | Command       | Aliases                           | Argument                   |
//! |---------------|-----------------------------------|----------------------------|
//! | `help`        | `帮助` `菜单` `功能` `指令` `menu` | verbosity (ignored)        |
//! | `help_admin`  | `帮助管理` `管理帮助`              | action, default `status`   |
//!
//! The leading `/` is optional.

const HELP_NAMES: &[&str] = &["help", "帮助", "菜单", "功能", "指令", "menu"];
const ADMIN_NAMES: &[&str] = &["help_admin", "帮助管理", "管理帮助"];

/// A recognized menu command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show the catalog.
    Help { verbosity: Option<String> },
    /// Administer the help system.
    Admin { action: AdminAction },
}

/// Sub-command of `help_admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    /// Summary of the whole system.  Also the fallback for unknown words.
    Status,
    Enable,
    Disable,
    /// Re-read the catalog file.
    Reload,
    /// Reply with the editor URL.
    Link,
    /// Reply with the cover image, if one was rendered.
    Cover,
    /// Install the browser and re-initialize the renderer.
    Install,
    /// Reply with the renderer state only.
    RenderStatus,
}

impl AdminAction {
    /// Maps an action word (English or Chinese) to an action.
    ///
    /// Unknown words map to [`AdminAction::Status`].
    pub fn parse(word: &str) -> Self {
        match word.trim().to_lowercase().as_str() {
            "enable" | "启用" => AdminAction::Enable,
            "disable" | "禁用" => AdminAction::Disable,
            "reload" | "重载" => AdminAction::Reload,
            "link" | "链接" => AdminAction::Link,
            "cover" | "封面" => AdminAction::Cover,
            "install" | "安装依赖" => AdminAction::Install,
            "render-status" | "图片状态" => AdminAction::RenderStatus,
            _ => AdminAction::Status,
        }
    }

    /// Canonical English keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            AdminAction::Status => "status",
            AdminAction::Enable => "enable",
            AdminAction::Disable => "disable",
            AdminAction::Reload => "reload",
            AdminAction::Link => "link",
            AdminAction::Cover => "cover",
            AdminAction::Install => "install",
            AdminAction::RenderStatus => "render-status",
        }
    }
}

/// Parses one chat line.  Returns `None` for anything that is not a menu command.
pub fn parse_chat_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);

    let mut words = line.split_whitespace();
    let name = words.next()?.to_lowercase();
    let argument = words.next();

    if HELP_NAMES.contains(&name.as_str()) {
        Some(ChatCommand::Help {
            verbosity: argument.map(str::to_string),
        })
    } else if ADMIN_NAMES.contains(&name.as_str()) {
        Some(ChatCommand::Admin {
            action: argument.map_or(AdminAction::Status, AdminAction::parse),
        })
    } else {
        None
    }
}
