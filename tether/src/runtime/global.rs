use crate::runtime::config::Config;
use crate::runtime::error::Error;
use crate::runtime::future::TaskFuture;
use crate::runtime::task::Task;
use crate::runtime::worker::Worker;
use std::sync::OnceLock;

static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

pub fn init() -> Result<(), Error> {
    init_with_config(Config::default())
}

/// Sets the configuration used by [`run`] and the helpers built on it.
///
/// Fails once a configuration is in place, including the default one that
/// the first `run` installs.
pub fn init_with_config(config: Config) -> Result<(), Error> {
    config.validate()?;
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| Error::AlreadyInitialized)
}

pub fn config() -> &'static Config {
    GLOBAL_CONFIG.get_or_init(Config::default)
}

/// Wraps `task` in a [`TaskFuture`] without starting it.
pub fn run<F>(task: F) -> TaskFuture<F::Output>
where
    F: Task,
{
    run_with(config(), task)
}

pub fn run_with<F>(config: &Config, task: F) -> TaskFuture<F::Output>
where
    F: Task,
{
    TaskFuture::new(Worker::new(config.clone(), task))
}

/// Runs `task` on a worker thread and suspends until it returns.
pub fn wait<F>(task: F) -> F::Output
where
    F: Task,
{
    run(task).wait()
}

pub fn wait_on<T>(future: TaskFuture<T>) -> T
where
    T: Send + 'static,
{
    future.wait()
}

/// Drives `fut` to completion on a worker thread and suspends until it is
/// done.
pub fn wait_for<Fut>(fut: Fut) -> Fut::Output
where
    Fut: std::future::Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    wait(move || futures::executor::block_on(fut))
}

/// Runs `task` on a worker thread, ignoring when it finishes. Needs no event
/// loop on the calling thread.
pub fn exec<F>(task: F)
where
    F: Task<Output = ()>,
{
    run(task).detach();
}
