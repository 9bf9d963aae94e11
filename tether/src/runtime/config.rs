use serde::{Deserialize, Serialize};
use std::thread;

use crate::runtime::error::Error;
use crate::runtime::task::TaskId;

/// Worker thread configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads are named `{prefix}-{short task id}`.
    pub thread_name_prefix: String,
    /// Stack size in bytes; the platform default when unset.
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_name_prefix: "tether-worker".to_string(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.thread_name_prefix.contains('\0') {
            return Err(Error::Config(
                "thread_name_prefix must not contain NUL bytes".to_string(),
            ));
        }
        if self.stack_size == Some(0) {
            return Err(Error::Config("stack_size must be non-zero".to_string()));
        }
        Ok(())
    }

    pub(crate) fn thread_builder(&self, id: TaskId) -> thread::Builder {
        let name = format!("{}-{}", self.thread_name_prefix, id.short());
        let builder = thread::Builder::new().name(name);
        match self.stack_size {
            Some(size) => builder.stack_size(size),
            None => builder,
        }
    }
}
