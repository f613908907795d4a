//! Per-editor table of local commands.
//!
//! A submitted line that matches a registered command is handled locally
//! instead of being sent to the backend. Every editor owns its own registry,
//! so sessions never see each other's commands.

use std::fmt;

use crate::LineEditor;

type Trigger = Box<dyn Fn(&str) -> bool>;
type Action = Box<dyn Fn(&mut LineEditor)>;

/// A local command: a trigger predicate over the submitted line and the action
/// to run on the editor when it matches.
pub struct Command {
    name: String,
    description: String,
    trigger: Trigger,
    action: Action,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        trigger: impl Fn(&str) -> bool + 'static,
        action: impl Fn(&mut LineEditor) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            trigger: Box::new(trigger),
            action: Box::new(action),
        }
    }

    /// A command triggered by a line exactly equal to one of `words`.
    ///
    /// ```
    /// use serialterm::{Command, LineEditor};
    ///
    /// let cmd = Command::exact(&["clear", "cls"], "Clears the screen", LineEditor::clear);
    /// assert!(cmd.matches("cls"));
    /// assert!(!cmd.matches("clear all"));
    /// ```
    pub fn exact(
        words: &[&str],
        description: impl Into<String>,
        action: impl Fn(&mut LineEditor) + 'static,
    ) -> Self {
        let name = words.first().copied().unwrap_or_default().to_string();
        let words: Vec<String> = words.iter().map(|w| (*w).to_string()).collect();
        Self::new(name, description, move |line| words.iter().any(|w| w == line), action)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn matches(&self, line: &str) -> bool {
        (self.trigger)(line)
    }

    pub fn run(&self, editor: &mut LineEditor) {
        (self.action)(editor);
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of [`Command`]s.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in `clear` command (alias `cls`).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Command::exact(
            &["clear", "cls"],
            "Clears the screen",
            LineEditor::clear,
        ));
        registry
    }

    pub fn register(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Moves every command of `other` to the end of this registry.
    pub fn append(&mut self, other: &mut CommandRegistry) -> &mut Self {
        self.commands.append(&mut other.commands);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// `(name, description)` of every command, in registration order.
    pub fn help(&self) -> Vec<(&str, &str)> {
        self.commands
            .iter()
            .map(|c| (c.name(), c.description()))
            .collect()
    }

    /// Commands whose trigger matches `line`, in registration order.
    pub fn matching<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a Command> + 'a {
        self.commands.iter().filter(move |c| c.matches(line))
    }
}
