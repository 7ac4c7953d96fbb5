//! Concurrency Tests - Native Primitives Under Contention
//!
//! Threads are started through the thread facade and hammer shared mutexes
//! while the tracker observes every transition. Correct code must come out
//! with a balanced counter and no usage error.

use krepis_mutex_usage::infrastructure::ThreadEntry;
use krepis_mutex_usage::{
    GuardPolicy, InterceptStrategy, MutexError, MutexState, MutexUsage, MutexUsageConfig,
    TestResult, TestThread, ThreadBackend, ThreadError, ThreadFacade, ThreadingContext,
    ThreadingMutex,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

const THREADS: usize = 4;
const ROUNDS: usize = 200;

fn run_contended_case(strategy: InterceptStrategy, backend: ThreadBackend) {
    let ctx = Arc::new(ThreadingContext::native());
    let config = MutexUsageConfig::new()
        .strategy(strategy)
        .guard_policy(GuardPolicy::Block)
        .echo_to_stdout(false);
    let (mut usage, _info) = MutexUsage::with_test_info(config);
    usage.init(&ctx).unwrap();
    usage.set_baseline();

    let facade = ThreadFacade::new(backend);
    let result = usage.run_case(|| {
        let shared = Arc::new(ThreadingMutex::new());
        let counter = Arc::new(AtomicUsize::new(0));
        ctx.mutex_init(&shared);

        let mut threads: Vec<TestThread> = (0..THREADS).map(|_| TestThread::new()).collect();
        for thread in &mut threads {
            let ctx = ctx.clone();
            let shared = shared.clone();
            let counter = counter.clone();
            let entry: ThreadEntry = Box::new(move || {
                // A private mutex per thread, created and freed under contention
                let local = ThreadingMutex::new();
                ctx.mutex_init(&local);
                for _ in 0..ROUNDS {
                    ctx.mutex_lock(&shared).unwrap();
                    assert_eq!(shared.state(), Some(MutexState::Locked));
                    let seen = counter.load(Ordering::Relaxed);
                    counter.store(seen + 1, Ordering::Relaxed);
                    ctx.mutex_unlock(&shared).unwrap();

                    ctx.mutex_lock(&local).unwrap();
                    ctx.mutex_unlock(&local).unwrap();
                }
                ctx.mutex_free(&local);
            });
            facade.create(thread, Some(entry)).unwrap();
        }
        for thread in &mut threads {
            facade.join(thread).unwrap();
        }

        assert_eq!(counter.load(Ordering::Relaxed), THREADS * ROUNDS);
        ctx.mutex_free(&shared);
    });

    assert_eq!(result, TestResult::Success, "{strategy:?}");
    assert_eq!(usage.live_mutexes(), 0);
    usage.end(&ctx).unwrap();
}

#[test]
fn test_contended_substitute() {
    run_contended_case(InterceptStrategy::Substitute, ThreadBackend::Spawn);
}

#[test]
fn test_contended_hooks() {
    run_contended_case(InterceptStrategy::Hooks, ThreadBackend::Spawn);
}

#[test]
fn test_contended_named_threads() {
    run_contended_case(
        InterceptStrategy::Substitute,
        ThreadBackend::Builder {
            name: Some("mutex-usage-worker".to_owned()),
            stack_size: Some(256 * 1024),
        },
    );
}

#[test]
fn test_panicking_worker_surfaces_as_thread_failure() {
    let facade = ThreadFacade::default();
    let mut thread = TestThread::new();
    let entry: ThreadEntry = Box::new(|| panic!("worker failed"));

    facade.create(&mut thread, Some(entry)).unwrap();
    assert_eq!(facade.join(&mut thread), Err(ThreadError::ThreadFailure));
    assert!(!thread.is_attached());
}

#[test]
fn test_unavailable_backend_rejects_everything() {
    let facade = ThreadFacade::new(ThreadBackend::Unavailable);
    let mut thread = TestThread::new();
    let entry: ThreadEntry = Box::new(|| {});

    assert_eq!(facade.create(&mut thread, Some(entry)), Err(ThreadError::BadInputData));
    assert_eq!(facade.join(&mut thread), Err(ThreadError::BadInputData));
    assert_eq!(ThreadError::BadInputData.code(), -0x1C);
}

#[test]
fn test_foreign_unlock_rejected_by_native_primitives() {
    let ctx = ThreadingContext::native();
    let m = ThreadingMutex::new();
    let locked = Barrier::new(2);
    let checked = Barrier::new(2);
    ctx.mutex_init(&m);

    std::thread::scope(|s| {
        s.spawn(|| {
            ctx.mutex_lock(&m).unwrap();
            locked.wait();
            checked.wait();
            ctx.mutex_unlock(&m).unwrap();
        });

        locked.wait();
        // This thread never locked `m`
        assert_eq!(ctx.mutex_unlock(&m), Err(MutexError::MutexFailure));
        checked.wait();
    });

    // Released by its holder, so it can be taken again here
    ctx.mutex_lock(&m).unwrap();
    ctx.mutex_unlock(&m).unwrap();
    ctx.mutex_free(&m);
}
