//! Input events and keyboard command mapping.

use crate::stroke::Color;
use crate::tools::ToolKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };

    pub const CTRL_SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: true,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up,
}

/// A user-visible action on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    SelectTool(ToolKind),
    SetStrokeColor(Color),
    SetFillColor(Option<Color>),
    SetStrokeWidth(f64),
    SetOpacity(f64),
    Undo,
    Redo,
    Clear,
    CancelStroke,
}

/// Map a key press to a command.
///
/// `key` is the logical key name as reported by the windowing layer
/// (`"z"`, `"Escape"`, ...). Letters are matched case-insensitively.
pub fn command_for_key(key: &str, modifiers: Modifiers) -> Option<Command> {
    let lower = key.to_ascii_lowercase();
    if modifiers.command() {
        return match lower.as_str() {
            "z" if modifiers.shift => Some(Command::Redo),
            "z" => Some(Command::Undo),
            "y" => Some(Command::Redo),
            _ => None,
        };
    }
    if modifiers.alt {
        return None;
    }
    match lower.as_str() {
        "escape" => Some(Command::CancelStroke),
        "p" => Some(Command::SelectTool(ToolKind::Pencil)),
        "e" => Some(Command::SelectTool(ToolKind::Eraser)),
        "r" => Some(Command::SelectTool(ToolKind::Rectangle)),
        "c" => Some(Command::SelectTool(ToolKind::Circle)),
        "l" => Some(Command::SelectTool(ToolKind::Line)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_shortcuts() {
        assert_eq!(command_for_key("z", Modifiers::CTRL), Some(Command::Undo));
        assert_eq!(command_for_key("Z", Modifiers::CTRL_SHIFT), Some(Command::Redo));
        assert_eq!(command_for_key("y", Modifiers::CTRL), Some(Command::Redo));

        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(command_for_key("z", cmd), Some(Command::Undo));
    }

    #[test]
    fn test_plain_z_is_not_undo() {
        assert_eq!(command_for_key("z", Modifiers::NONE), None);
    }

    #[test]
    fn test_tool_keys() {
        assert_eq!(
            command_for_key("r", Modifiers::NONE),
            Some(Command::SelectTool(ToolKind::Rectangle))
        );
        assert_eq!(command_for_key("Escape", Modifiers::NONE), Some(Command::CancelStroke));
        assert_eq!(command_for_key("r", Modifiers::CTRL), None);
    }
}
