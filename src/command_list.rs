//! Command List
//!
//! Batching wrapper for the `command_list_begin` / `command_list_ok_begin` /
//! `command_list_end` protocol feature. While a list is open every incoming
//! line except the terminator is buffered verbatim; on termination the whole
//! buffer is replayed through the dispatcher and the buffer reset. Replay
//! itself lives on the daemon, which owns the dispatcher.

/// Buffered commands plus the list-mode flags.
#[derive(Debug, Default)]
pub struct CommandList {
    commands: Vec<String>,
    active: bool,
    /// Emit a `list_OK` marker after each successful sub-command.
    ok_mode: bool,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a list, clearing any previous buffer.
    pub fn begin(&mut self, ok_mode: bool) {
        self.commands.clear();
        self.active = true;
        self.ok_mode = ok_mode;
    }

    /// Appends one raw command line, unparsed.
    pub fn add(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ok_mode(&self) -> bool {
        self.ok_mode
    }

    /// Takes the buffered commands and closes the list.
    pub fn take(&mut self) -> Vec<String> {
        self.active = false;
        std::mem::take(&mut self.commands)
    }
}
