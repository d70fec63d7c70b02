//! Controller configuration.

use std::env;

/// Environment variable consulted by [`DebugMode::FromEnv`]
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Value of [`ENVIRONMENT_VAR`] that turns debug output on
pub const DEVELOPMENT: &str = "development";

/// Whether error responses may carry diagnostic `data`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugMode {
    #[default]
    Disabled,
    Enabled,
    /// Read the process environment each time an error envelope is built
    FromEnv,
}

impl DebugMode {
    pub fn is_active(&self) -> bool {
        match self {
            DebugMode::Disabled => false,
            DebugMode::Enabled => true,
            DebugMode::FromEnv => {
                env::var(ENVIRONMENT_VAR).is_ok_and(|value| value == DEVELOPMENT)
            }
        }
    }
}

/// Configuration for a [`Controller`](crate::Controller)
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub debug: DebugMode,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug disclosure follows the `ENVIRONMENT` variable
    pub fn from_env() -> Self {
        Self {
            debug: DebugMode::FromEnv,
        }
    }

    pub fn with_debug(mut self, debug: DebugMode) -> Self {
        self.debug = debug;
        self
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.is_active()
    }
}
