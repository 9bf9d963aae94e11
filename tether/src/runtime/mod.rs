pub mod completion;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod future;
pub mod global;
pub mod handle;
pub mod task;
mod worker;

pub use completion::Completion;
pub use config::Config;
pub use error::{Error, PanicPayload};
pub use future::TaskFuture;
pub use global::{config, exec, init, init_with_config, run, run_with, wait, wait_for, wait_on};
pub use handle::TaskHandle;
pub use task::{Task, TaskId};
