//! Parser for prefixed bot commands in comment text.
//!
//! This module is a pure function from comment text to a tokenized command; it
//! knows nothing about which commands exist.

use serde::{Deserialize, Serialize};

/// A command as typed by the user: a name plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    name: String,
    args: Vec<String>,
}

impl ParsedCommand {
    /// The command word (first token).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Positional arguments after the command word.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The full token list: name followed by the arguments.
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.name.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

/// Parses a command from a comment body.
///
/// # Parsing Rules
///
/// - The body must start with `prefix` exactly (no leading whitespace, case-sensitive)
/// - The rest is split on every single space; the first token is the name
/// - Empty tokens are kept: `"/bot set  key"` has arguments `["", "key"]`
/// - Newlines and tabs are not separators and stay inside their token
///
/// Returns `None` if the body does not start with the prefix.
///
/// # Examples
///
/// ```
/// use pr_steward::commands::parse_command;
///
/// let cmd = parse_command("/bot set key value", "/bot ").unwrap();
/// assert_eq!(cmd.name(), "set");
/// assert_eq!(cmd.args(), ["key", "value"]);
///
/// // Repeated spaces shift arguments instead of collapsing.
/// let cmd = parse_command("/bot set  key", "/bot ").unwrap();
/// assert_eq!(cmd.args(), ["", "key"]);
///
/// assert!(parse_command("please /bot set key value", "/bot ").is_none());
/// ```
pub fn parse_command(body: &str, prefix: &str) -> Option<ParsedCommand> {
    let rest = body.strip_prefix(prefix)?;

    // `split` always yields at least one item, possibly empty.
    let mut tokens = rest.split(' ').map(str::to_string);
    let name = tokens.next().unwrap_or_default();

    Some(ParsedCommand {
        name,
        args: tokens.collect(),
    })
}
