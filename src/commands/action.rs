//! Compiled-in command behaviors.
//!
//! The grammar (names, arity, messages) comes from configuration, but what a
//! command actually does is fixed at compile time. Each configured name maps to
//! exactly one [`CommandAction`].

use serde::{Deserialize, Serialize};

/// Arguments read by [`CommandAction::TriggerBuild`]: one key and one value.
pub const BUILD_PARAMETERS: usize = 2;

/// The behavior behind a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    /// `build` / `trigger-build`: run the PR's build job with one parameter.
    TriggerBuild,

    /// `approve` / `lgtm`: reserved for posting an approving review.
    Approve,

    /// `close`: reserved for closing the pull request.
    Close,

    /// Configured commands with no compiled-in behavior.
    Noop,
}

impl CommandAction {
    /// Maps a command name to its behavior.
    pub fn from_name(name: &str) -> Self {
        match name {
            "build" | "trigger-build" => CommandAction::TriggerBuild,
            "approve" | "lgtm" => CommandAction::Approve,
            "close" => CommandAction::Close,
            _ => CommandAction::Noop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_names() {
        assert_eq!(CommandAction::from_name("build"), CommandAction::TriggerBuild);
        assert_eq!(
            CommandAction::from_name("trigger-build"),
            CommandAction::TriggerBuild
        );
        assert_eq!(CommandAction::from_name("lgtm"), CommandAction::Approve);
        assert_eq!(CommandAction::from_name("approve"), CommandAction::Approve);
        assert_eq!(CommandAction::from_name("close"), CommandAction::Close);
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(CommandAction::from_name("Build"), CommandAction::Noop);
        assert_eq!(CommandAction::from_name("LGTM"), CommandAction::Noop);
    }

    proptest! {
        #[test]
        fn other_names_are_noop(name in "[a-z]{1,12}") {
            prop_assume!(!["build", "approve", "lgtm", "close"].contains(&name.as_str()));
            prop_assert_eq!(CommandAction::from_name(&name), CommandAction::Noop);
        }
    }
}
