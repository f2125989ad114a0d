//! Host-facing log and event hooks.
//!
//! The core never prints. Diagnostics (buffer growth, undo falling back to
//! text replay) go to the log hook and failures the host must surface
//! (`capacity_exceeded`) go to the event hook. Both hooks are process-wide
//! and optional; with none installed, reporting costs one uncontended lock.
//!
//! Hooks run outside the registry lock, so a hook may itself log or emit.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Severity passed to the log hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Event name emitted when the buffer cannot grow.
pub const EVENT_CAPACITY_EXCEEDED: &str = "capacity_exceeded";

type EventHook = Arc<dyn Fn(&str, &str) + Send + Sync + 'static>;
type LogHook = Arc<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

struct Hooks {
    event: Option<EventHook>,
    log: Option<LogHook>,
    min_level: LogLevel,
}

fn hooks() -> MutexGuard<'static, Hooks> {
    static HOOKS: OnceLock<Mutex<Hooks>> = OnceLock::new();
    HOOKS
        .get_or_init(|| {
            Mutex::new(Hooks {
                event: None,
                log: None,
                min_level: LogLevel::Debug,
            })
        })
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Install the event hook, replacing any previous one.
///
/// The hook receives the event name and a human-readable payload.
pub fn set_event_callback<F>(callback: F)
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    hooks().event = Some(Arc::new(callback));
}

/// Remove the event hook.
pub fn clear_event_callback() {
    hooks().event = None;
}

/// Send `name` with `data` to the event hook, if any.
pub fn emit_event(name: &str, data: &str) {
    let hook = hooks().event.clone();
    if let Some(hook) = hook {
        hook(name, data);
    }
}

/// Install the log hook, replacing any previous one.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    hooks().log = Some(Arc::new(callback));
}

/// Remove the log hook.
pub fn clear_log_callback() {
    hooks().log = None;
}

/// Drop messages below `level` before they reach the log hook.
pub fn set_log_level(level: LogLevel) {
    hooks().min_level = level;
}

/// Send `message` to the log hook if `level` passes the filter.
pub fn emit_log(level: LogLevel, message: &str) {
    let hook = {
        let hooks = hooks();
        if level < hooks.min_level {
            return;
        }
        hooks.log.clone()
    };
    if let Some(hook) = hook {
        hook(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // The hooks are process-wide; every assertion lives in this one test so
    // parallel unit tests cannot swap a hook underneath it. Other tests may
    // emit concurrently, hence the name filters.
    #[test]
    fn test_hooks_lifecycle() {
        let events = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&events);
        set_event_callback(move |name, _| {
            if name == "hook_probe" {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        emit_event("hook_probe", "");
        emit_event("unrelated", "");
        assert_eq!(events.load(Ordering::SeqCst), 1);
        clear_event_callback();
        emit_event("hook_probe", "");
        assert_eq!(events.load(Ordering::SeqCst), 1);

        let logs = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&logs);
        set_log_callback(move |_, msg| {
            if msg == "log_probe" {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        emit_log(LogLevel::Info, "log_probe");
        set_log_level(LogLevel::Warn);
        emit_log(LogLevel::Info, "log_probe");
        emit_log(LogLevel::Error, "log_probe");
        set_log_level(LogLevel::Debug);
        assert_eq!(logs.load(Ordering::SeqCst), 2);

        // A hook that reports through the hooks must not deadlock.
        set_event_callback(|name, _| {
            if name == "reentrant_probe" {
                emit_log(LogLevel::Info, "log_probe");
            }
        });
        emit_event("reentrant_probe", "");
        assert_eq!(logs.load(Ordering::SeqCst), 3);

        clear_event_callback();
        clear_log_callback();
        emit_log(LogLevel::Info, "log_probe");
        assert_eq!(logs.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Error);
        assert!(LogLevel::Warn > LogLevel::Info);
    }
}
