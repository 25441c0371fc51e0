//! Per-unit-of-work context slot.
//!
//! The slot lives in a tokio task-local established by [`scope`]. Every
//! `.await` inside the scope sees the same slot, while a second scope polled
//! on the same thread (for instance under `tokio::join!`) has its own.
//!
//! Outside any scope there are two cases. Off the runtime (startup code,
//! plain threads, synchronous tests) a per-thread slot is used. On a runtime
//! thread unscoped tasks would share that slot with whatever else the worker
//! polls, so there they get no context at all: reads are empty and writes are
//! discarded.

use std::cell::RefCell;
use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::context::LoggingContext;

type Slot = RefCell<Option<LoggingContext>>;

tokio::task_local! {
    static ACTIVE_CONTEXT: Slot;
}

thread_local! {
    static DETACHED_CONTEXT: Slot = const { RefCell::new(None) };
}

fn with_slot<R>(f: impl FnOnce(&Slot) -> R) -> R {
    if ACTIVE_CONTEXT.try_with(|_| ()).is_ok() {
        ACTIVE_CONTEXT.with(f)
    } else if Handle::try_current().is_err() {
        DETACHED_CONTEXT.with(f)
    } else {
        f(&RefCell::new(None))
    }
}

/// Merge `partial` into the current context, creating it if absent.
pub fn set_context(partial: LoggingContext) {
    with_slot(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(LoggingContext::default)
            .merge(partial);
    });
}

/// Snapshot of the current context, or an empty one.
pub fn get_context() -> LoggingContext {
    with_slot(|slot| slot.borrow().clone().unwrap_or_default())
}

/// Drop the current context entirely. No-op when nothing is set.
pub fn clear_context() {
    with_slot(|slot| {
        slot.borrow_mut().take();
    });
}

/// Replace the current context wholesale.
///
/// Pairs with [`get_context`] to restore a snapshot after an operation.
pub fn replace_context(ctx: LoggingContext) {
    with_slot(|slot| {
        *slot.borrow_mut() = if ctx.is_empty() { None } else { Some(ctx) };
    });
}

/// Fresh random correlation id (UUID v4, lowercase hyphenated).
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Tag the current context with an operation id and return it.
///
/// Reuses `data.operation_id` when non-empty, otherwise generates one. The
/// previous context is not restored afterwards.
pub fn with_operation_context(data: LoggingContext) -> String {
    let operation_id = match data.operation_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => generate_trace_id(),
    };

    set_context(data.with_operation_id(operation_id.clone()));
    operation_id
}

/// Run `fut` as its own unit of work, seeded with `initial`.
pub fn scope<F>(initial: LoggingContext, fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    ACTIVE_CONTEXT.scope(seed(initial), fut)
}

/// Synchronous counterpart of [`scope`].
pub fn sync_scope<R>(initial: LoggingContext, f: impl FnOnce() -> R) -> R {
    ACTIVE_CONTEXT.sync_scope(seed(initial), f)
}

/// Run `fut` in a child scope holding a snapshot of the caller's context.
///
/// Changes made by the child are not visible to the caller and vice versa.
pub fn propagate<F>(fut: F) -> impl Future<Output = F::Output>
where
    F: Future,
{
    scope(get_context(), fut)
}

/// `tokio::spawn` that carries the current context into the new task.
pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(propagate(fut))
}

fn seed(initial: LoggingContext) -> Slot {
    RefCell::new(if initial.is_empty() { None } else { Some(initial) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn is_canonical_uuid(s: &str) -> bool {
        s.len() == 36
            && s.char_indices().all(|(i, c)| match i {
                8 | 13 | 18 | 23 => c == '-',
                _ => matches!(c, '0'..='9' | 'a'..='f'),
            })
    }

    #[test]
    fn test_get_without_set_is_empty() {
        assert_eq!(get_context(), LoggingContext::new());
    }

    #[test]
    fn test_disjoint_sets_union() {
        set_context(LoggingContext::new().with_trace_id("T1"));
        set_context(LoggingContext::new().with_request_id("R1"));
        set_context(LoggingContext::new().with("tenant", "acme"));

        let expected = LoggingContext::new()
            .with_trace_id("T1")
            .with_request_id("R1")
            .with("tenant", "acme");
        assert_eq!(get_context(), expected);
    }

    #[test]
    fn test_later_set_wins() {
        set_context(LoggingContext::new().with("a", "1"));
        set_context(LoggingContext::new().with("a", "2"));
        assert_eq!(get_context().get("a"), Some("2"));
    }

    #[test]
    fn test_clear_then_get() {
        set_context(LoggingContext::new().with_trace_id("T1"));
        set_context(LoggingContext::new().with_request_id("R1"));
        assert_eq!(
            get_context(),
            LoggingContext::new().with_trace_id("T1").with_request_id("R1")
        );

        clear_context();
        assert!(get_context().is_empty());
        clear_context();
        assert!(get_context().is_empty());
    }

    #[test]
    fn test_set_after_clear_starts_fresh() {
        set_context(LoggingContext::new().with_user_id("u1"));
        clear_context();
        set_context(LoggingContext::new().with_device_id("d1"));
        assert_eq!(get_context(), LoggingContext::new().with_device_id("d1"));
    }

    #[test]
    fn test_generate_trace_id_format() {
        for _ in 0..32 {
            let id = generate_trace_id();
            assert!(is_canonical_uuid(&id), "unexpected id {id}");
        }
        assert_ne!(generate_trace_id(), generate_trace_id());
    }

    #[test]
    fn test_generate_trace_id_leaves_context_alone() {
        let _ = generate_trace_id();
        assert!(get_context().is_empty());
    }

    #[test]
    fn test_with_operation_context_generates_id() {
        let op = with_operation_context(LoggingContext::new().with_trace_id("T1"));
        assert!(is_canonical_uuid(&op));

        let ctx = get_context();
        assert_eq!(ctx.trace_id.as_deref(), Some("T1"));
        assert_eq!(ctx.operation_id.as_deref(), Some(op.as_str()));
    }

    #[test]
    fn test_with_operation_context_reuses_id() {
        let op = with_operation_context(LoggingContext::new().with_operation_id("op-7"));
        assert_eq!(op, "op-7");
        assert_eq!(get_context().operation_id.as_deref(), Some("op-7"));
    }

    #[test]
    fn test_with_operation_context_empty_id_is_replaced() {
        let op = with_operation_context(LoggingContext::new().with_operation_id(""));
        assert!(is_canonical_uuid(&op));
    }

    #[test]
    fn test_with_operation_context_does_not_restore() {
        set_context(LoggingContext::new().with_request_id("R1"));
        let first = with_operation_context(LoggingContext::new());
        let second = with_operation_context(LoggingContext::new());

        let ctx = get_context();
        assert_ne!(first, second);
        assert_eq!(ctx.operation_id.as_deref(), Some(second.as_str()));
        assert_eq!(ctx.request_id.as_deref(), Some("R1"));
    }

    #[test]
    fn test_snapshot_and_replace_restores() {
        set_context(LoggingContext::new().with_trace_id("T1"));
        let saved = get_context();

        with_operation_context(LoggingContext::new().with_user_id("u9"));
        replace_context(saved.clone());

        assert_eq!(get_context(), saved);
    }

    #[test]
    fn test_sync_scope_shadows_thread_slot() {
        set_context(LoggingContext::new().with_trace_id("outer"));

        sync_scope(LoggingContext::new(), || {
            assert!(get_context().is_empty());
            set_context(LoggingContext::new().with_trace_id("inner"));
            assert_eq!(get_context().trace_id.as_deref(), Some("inner"));
        });

        assert_eq!(get_context().trace_id.as_deref(), Some("outer"));
    }

    #[tokio::test]
    async fn test_interleaved_units_are_isolated() {
        let unit = |name: &'static str| async move {
            set_context(LoggingContext::new().with_trace_id(name));
            tokio::task::yield_now().await;
            set_context(LoggingContext::new().with_request_id(format!("{name}-req")));
            tokio::time::sleep(Duration::from_millis(5)).await;
            get_context()
        };

        let (a, b) = tokio::join!(
            scope(LoggingContext::new(), unit("A")),
            scope(LoggingContext::new(), unit("B")),
        );

        assert_eq!(a, LoggingContext::new().with_trace_id("A").with_request_id("A-req"));
        assert_eq!(b, LoggingContext::new().with_trace_id("B").with_request_id("B-req"));
    }

    #[tokio::test]
    async fn test_scope_survives_await_points() {
        let seen = scope(LoggingContext::new().with_trace_id("T1"), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            set_context(LoggingContext::new().with_user_id("u1"));
            tokio::task::yield_now().await;
            get_context()
        })
        .await;

        assert_eq!(seen, LoggingContext::new().with_trace_id("T1").with_user_id("u1"));
    }

    #[tokio::test]
    async fn test_scope_clear_only_affects_itself() {
        let outer = scope(LoggingContext::new().with_trace_id("keep"), async {
            let inner = propagate(async {
                clear_context();
                get_context()
            })
            .await;
            assert!(inner.is_empty());
            get_context()
        })
        .await;

        assert_eq!(outer.trace_id.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn test_spawn_inherits_snapshot() {
        let parent = scope(LoggingContext::new().with_trace_id("T1"), async {
            let child = spawn(async {
                let inherited = get_context();
                set_context(LoggingContext::new().with_user_id("child"));
                inherited
            })
            .await
            .unwrap();

            assert_eq!(child.trace_id.as_deref(), Some("T1"));
            get_context()
        })
        .await;

        assert_eq!(parent, LoggingContext::new().with_trace_id("T1"));
    }

    #[tokio::test]
    async fn test_plain_spawn_gets_no_context() {
        let (parent, child) = scope(LoggingContext::new().with_trace_id("T1"), async {
            let child = tokio::spawn(async {
                set_context(LoggingContext::new().with_user_id("child"));
                get_context()
            })
            .await
            .unwrap();
            (get_context(), child)
        })
        .await;

        assert!(child.is_empty());
        assert_eq!(parent, LoggingContext::new().with_trace_id("T1"));
    }

    #[tokio::test]
    async fn test_unscoped_tasks_do_not_share_a_slot() {
        tokio::spawn(async {
            with_operation_context(LoggingContext::new().with_user_id("alice"));
        })
        .await
        .unwrap();

        let seen = tokio::spawn(async { get_context() }).await.unwrap();
        assert!(seen.is_empty());
        assert!(get_context().is_empty());
    }

    #[test]
    fn test_thread_slot_stays_on_its_thread() {
        set_context(LoggingContext::new().with_trace_id("main"));

        let other = std::thread::spawn(|| {
            let before = get_context();
            set_context(LoggingContext::new().with_trace_id("worker"));
            before
        })
        .join()
        .unwrap();

        assert!(other.is_empty());
        assert_eq!(get_context().trace_id.as_deref(), Some("main"));
    }
}
