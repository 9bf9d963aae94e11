use std::fmt;
use uuid::Uuid;

/// A unit of work handed to a worker thread. Called at most once.
pub trait Task: Send + 'static {
    type Output: Send + 'static;
    fn call(self) -> Self::Output;
}

impl<F, T> Task for F
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn call(self) -> T {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// First eight hex digits, used for worker thread names.
    pub(crate) fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(8);
        simple
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_tasks() {
        fn call<T: Task>(task: T) -> T::Output {
            task.call()
        }
        assert_eq!(call(|| 40 + 2), 42);
        call(|| ());
    }

    #[test]
    fn ids_are_unique_and_short_form_is_a_prefix() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
        assert!(a.as_uuid().simple().to_string().starts_with(&a.short()));
    }
}
