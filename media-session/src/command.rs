//! Session commands and permission sets
//!
//! Every library operation is gated on a command code. Custom commands share
//! code [`COMMAND_CODE_CUSTOM`] and are told apart by their action string.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::extras::Extras;

/// Code shared by all custom (action-named) commands
pub const COMMAND_CODE_CUSTOM: i32 = 0;

pub const COMMAND_CODE_LIBRARY_GET_LIBRARY_ROOT: i32 = 50_000;
pub const COMMAND_CODE_LIBRARY_SUBSCRIBE: i32 = 50_001;
pub const COMMAND_CODE_LIBRARY_UNSUBSCRIBE: i32 = 50_002;
pub const COMMAND_CODE_LIBRARY_GET_CHILDREN: i32 = 50_003;
pub const COMMAND_CODE_LIBRARY_GET_ITEM: i32 = 50_004;
pub const COMMAND_CODE_LIBRARY_SEARCH: i32 = 50_005;
pub const COMMAND_CODE_LIBRARY_GET_SEARCH_RESULT: i32 = 50_006;

/// Every predefined library command code
pub const LIBRARY_COMMAND_CODES: [i32; 7] = [
    COMMAND_CODE_LIBRARY_GET_LIBRARY_ROOT,
    COMMAND_CODE_LIBRARY_SUBSCRIBE,
    COMMAND_CODE_LIBRARY_UNSUBSCRIBE,
    COMMAND_CODE_LIBRARY_GET_CHILDREN,
    COMMAND_CODE_LIBRARY_GET_ITEM,
    COMMAND_CODE_LIBRARY_SEARCH,
    COMMAND_CODE_LIBRARY_GET_SEARCH_RESULT,
];

/// A command a controller may be allowed to send
///
/// Equality and hashing consider the code and the custom action only;
/// extras are payload.
#[derive(Debug, Clone)]
pub struct SessionCommand {
    pub command_code: i32,
    pub custom_action: String,
    pub extras: Extras,
}

impl SessionCommand {
    /// A predefined command identified by its code
    pub fn predefined(command_code: i32) -> Self {
        Self {
            command_code,
            custom_action: String::new(),
            extras: Extras::new(),
        }
    }

    /// A custom command identified by its action name
    pub fn custom(action: impl Into<String>, extras: Extras) -> Self {
        Self {
            command_code: COMMAND_CODE_CUSTOM,
            custom_action: action.into(),
            extras,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.command_code == COMMAND_CODE_CUSTOM
    }
}

impl PartialEq for SessionCommand {
    fn eq(&self, other: &Self) -> bool {
        self.command_code == other.command_code && self.custom_action == other.custom_action
    }
}

impl Eq for SessionCommand {}

impl Hash for SessionCommand {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.command_code.hash(state);
        self.custom_action.hash(state);
    }
}

/// Set of commands available to one controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCommands {
    commands: HashSet<SessionCommand>,
}

impl SessionCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// All predefined library commands
    pub fn library_defaults() -> Self {
        LIBRARY_COMMAND_CODES
            .iter()
            .map(|code| SessionCommand::predefined(*code))
            .collect()
    }

    pub fn with(mut self, command: SessionCommand) -> Self {
        self.commands.insert(command);
        self
    }

    /// Remove every command carrying `command_code`
    pub fn without_code(mut self, command_code: i32) -> Self {
        self.commands.retain(|c| c.command_code != command_code);
        self
    }

    pub fn add(&mut self, command: SessionCommand) -> bool {
        self.commands.insert(command)
    }

    pub fn contains(&self, command: &SessionCommand) -> bool {
        self.commands.contains(command)
    }

    /// Whether a predefined command with `command_code` is present
    pub fn contains_code(&self, command_code: i32) -> bool {
        command_code != COMMAND_CODE_CUSTOM && self.contains(&SessionCommand::predefined(command_code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl FromIterator<SessionCommand> for SessionCommands {
    fn from_iter<I: IntoIterator<Item = SessionCommand>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_equality_ignores_extras() {
        let a = SessionCommand::custom("like", Extras::new().with_int("x", 1));
        let b = SessionCommand::custom("like", Extras::new());
        assert_eq!(a, b);

        let commands = SessionCommands::new().with(a);
        assert!(commands.contains(&b));
        assert!(!commands.contains(&SessionCommand::custom("dislike", Extras::new())));
    }

    #[test]
    fn test_library_defaults() {
        let commands = SessionCommands::library_defaults();
        assert_eq!(commands.len(), LIBRARY_COMMAND_CODES.len());
        assert!(commands.contains_code(COMMAND_CODE_LIBRARY_SEARCH));

        let commands = commands.without_code(COMMAND_CODE_LIBRARY_SEARCH);
        assert!(!commands.contains_code(COMMAND_CODE_LIBRARY_SEARCH));
    }

    #[test]
    fn test_custom_code_is_not_predefined() {
        let commands = SessionCommands::new().with(SessionCommand::custom("like", Extras::new()));
        assert!(!commands.contains_code(COMMAND_CODE_CUSTOM));
    }
}
