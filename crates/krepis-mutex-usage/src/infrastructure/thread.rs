//! Thread Create / Join Facade
//!
//! Decouples multi-threaded test cases from the platform threading backend.
//! The backend is chosen once when the facade is built; every call returns
//! a normalised [`ThreadError`].
//!
//! | backend       | create                       | join                     |
//! |---------------|------------------------------|--------------------------|
//! | `Spawn`       | `std::thread` default config | blocks until exit        |
//! | `Builder`     | named / sized std thread     | blocks until exit        |
//! | `Unavailable` | always `BadInputData`        | always `BadInputData`    |

use crate::domain::ThreadError;
use std::io;
use std::thread::{Builder, JoinHandle};
use tracing::warn;

/// Thread entry point
pub type ThreadEntry = Box<dyn FnOnce() + Send + 'static>;

/// Platform threading backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ThreadBackend {
    /// Plain `std::thread` spawn
    #[default]
    Spawn,
    /// `std::thread::Builder` with an optional name and stack size
    Builder {
        /// Thread name
        name: Option<String>,
        /// Stack size in bytes
        stack_size: Option<usize>,
    },
    /// No threading backend configured; every call fails
    Unavailable,
}

/// Handle filled by [`ThreadFacade::create`] and consumed by
/// [`ThreadFacade::join`]
#[derive(Debug, Default)]
pub struct TestThread {
    handle: Option<JoinHandle<()>>,
}

impl TestThread {
    /// Empty handle
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Whether the handle holds a thread that has not been joined yet
    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }
}

/// Uniform create / join over the selected backend
#[derive(Debug, Clone, Default)]
pub struct ThreadFacade {
    backend: ThreadBackend,
}

impl ThreadFacade {
    /// Facade over `backend`
    pub const fn new(backend: ThreadBackend) -> Self {
        Self { backend }
    }

    /// Start `entry` on a new thread and store its handle in `thread`
    ///
    /// # Errors
    /// - `BadInputData`: no entry point, `thread` already holds an unjoined
    ///   thread, or the backend is `Unavailable`
    /// - `InsufficientMemory`: the platform could not allocate the thread
    /// - `ThreadFailure`: any other backend failure
    pub fn create<F>(&self, thread: &mut TestThread, entry: Option<F>) -> Result<(), ThreadError>
    where
        F: FnOnce() + Send + 'static,
    {
        let builder = match &self.backend {
            ThreadBackend::Unavailable => return Err(ThreadError::BadInputData),
            ThreadBackend::Spawn => Builder::new(),
            ThreadBackend::Builder { name, stack_size } => {
                let mut builder = Builder::new();
                if let Some(name) = name {
                    builder = builder.name(name.clone());
                }
                if let Some(size) = stack_size {
                    builder = builder.stack_size(*size);
                }
                builder
            }
        };

        let Some(entry) = entry else {
            return Err(ThreadError::BadInputData);
        };
        if thread.is_attached() {
            return Err(ThreadError::BadInputData);
        }

        let handle = builder.spawn(entry).map_err(map_spawn_error)?;
        thread.handle = Some(handle);
        Ok(())
    }

    /// Wait for the thread stored in `thread` to finish
    ///
    /// # Errors
    /// - `BadInputData`: `thread` is empty or the backend is `Unavailable`
    /// - `ThreadFailure`: the thread panicked
    pub fn join(&self, thread: &mut TestThread) -> Result<(), ThreadError> {
        if self.backend == ThreadBackend::Unavailable {
            return Err(ThreadError::BadInputData);
        }
        let handle = thread.handle.take().ok_or(ThreadError::BadInputData)?;
        handle.join().map_err(|_| {
            warn!("test thread panicked before join");
            ThreadError::ThreadFailure
        })
    }
}

fn map_spawn_error(error: io::Error) -> ThreadError {
    warn!(%error, "failed to spawn test thread");
    match error.kind() {
        io::ErrorKind::OutOfMemory => ThreadError::InsufficientMemory,
        _ => ThreadError::ThreadFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_spawn_and_join() {
        let facade = ThreadFacade::default();
        let ran = Arc::new(AtomicBool::new(false));
        let mut thread = TestThread::new();

        let flag = ran.clone();
        facade
            .create(&mut thread, Some(move || flag.store(true, Ordering::SeqCst)))
            .unwrap();
        assert!(thread.is_attached());
        facade.join(&mut thread).unwrap();

        assert!(!thread.is_attached());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_missing_entry_is_bad_input() {
        let facade = ThreadFacade::default();
        let mut thread = TestThread::new();
        let err = facade.create::<fn()>(&mut thread, None).unwrap_err();
        assert_eq!(err, ThreadError::BadInputData);
        assert_eq!(err.code(), -0x1C);
    }

    #[test]
    fn test_join_empty_handle_is_bad_input() {
        let facade = ThreadFacade::default();
        let mut thread = TestThread::new();
        assert_eq!(facade.join(&mut thread), Err(ThreadError::BadInputData));
    }

    #[test]
    fn test_unavailable_backend_always_fails() {
        let facade = ThreadFacade::new(ThreadBackend::Unavailable);
        let mut thread = TestThread::new();
        assert_eq!(
            facade.create(&mut thread, Some(|| {})),
            Err(ThreadError::BadInputData)
        );
        assert_eq!(facade.join(&mut thread), Err(ThreadError::BadInputData));
    }

    #[test]
    fn test_builder_backend_names_thread() {
        let facade = ThreadFacade::new(ThreadBackend::Builder {
            name: Some("mutex-usage-worker".into()),
            stack_size: Some(256 * 1024),
        });
        let mut thread = TestThread::new();
        facade
            .create(
                &mut thread,
                Some(|| {
                    assert_eq!(std::thread::current().name(), Some("mutex-usage-worker"));
                }),
            )
            .unwrap();
        facade.join(&mut thread).unwrap();
    }
}
