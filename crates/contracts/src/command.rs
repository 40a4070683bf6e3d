//! Command - Monitor output
//!
//! Logical commands handed to the message emitter each cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Channel;

/// Logical bus command for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "channel", rename_all = "snake_case")]
pub enum Command {
    /// Put the sensor into extended reporting mode
    EnableSession(Channel),
    /// Leave extended reporting mode
    DisableSession(Channel),
    /// Status request, only valid while the session is active
    Poll(Channel),
}

impl Command {
    /// Target channel
    pub fn channel(&self) -> Channel {
        match *self {
            Command::EnableSession(c) | Command::DisableSession(c) | Command::Poll(c) => c,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::EnableSession(_) => CommandKind::Enable,
            Command::DisableSession(_) => CommandKind::Disable,
            Command::Poll(_) => CommandKind::Poll,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.channel())
    }
}

/// Command discriminant without the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Enable,
    Disable,
    Poll,
}

impl CommandKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandKind::Enable => "enable",
            CommandKind::Disable => "disable",
            CommandKind::Poll => "poll",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_accessors() {
        let cmd = Command::Poll(Channel::Right);
        assert_eq!(cmd.channel(), Channel::Right);
        assert_eq!(cmd.kind(), CommandKind::Poll);
        assert_eq!(cmd.to_string(), "poll(right)");
    }

    #[test]
    fn test_command_serde_shape() {
        let json = serde_json::to_string(&Command::EnableSession(Channel::Left)).unwrap();
        assert_eq!(json, r#"{"kind":"enable_session","channel":"left"}"#);
    }
}
