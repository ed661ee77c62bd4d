//! Keyboard shortcut registry and documentation.

use sketchboard_core::{Command, Modifiers, command_for_key};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// The command the core binds to this key combination.
    pub fn command(&self) -> Option<Command> {
        let modifiers = Modifiers {
            ctrl: self.ctrl,
            shift: self.shift,
            ..Modifiers::NONE
        };
        command_for_key(self.key, modifiers)
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("P", false, false, "Pencil"),
            Shortcut::new("E", false, false, "Eraser"),
            Shortcut::new("R", false, false, "Rectangle"),
            Shortcut::new("C", false, false, "Circle"),
            Shortcut::new("L", false, false, "Line"),
            Shortcut::new("Escape", false, false, "Cancel current stroke"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
