//! Process-wide helpers shared by integration test binaries.

use camino::Utf8PathBuf;
use std::env;
use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, OnceLock};

const WORKER_NAME: &str = if cfg!(windows) {
    "pg_worker.exe"
} else {
    "pg_worker"
};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Scoped environment override, restored on drop.
///
/// Holds a global lock so concurrent tests never observe each other's
/// changes.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Applies `changes`, where `None` removes the variable.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = changes
            .iter()
            .map(|(key, value)| {
                let prior = env::var_os(key);
                apply(key, value.as_deref());
                (key.clone(), prior)
            })
            .collect();

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            apply(&key, value.as_deref());
        }
    }
}

fn apply(key: &OsStr, value: Option<&OsStr>) {
    // SAFETY: callers hold `ENV_MUTEX`, which serialises every mutation made
    // through this module.
    unsafe {
        match value {
            Some(new_value) => env::set_var(key, new_value),
            None => env::remove_var(key),
        }
    }
}

/// Finds the `pg_worker` binary used to run `PostgreSQL` as an unprivileged
/// user when tests execute as root.
///
/// Looks at `CARGO_BIN_EXE_pg_worker`, then `PG_EMBEDDED_WORKER`, then the
/// cargo target directory, then `PATH`.
pub fn locate_pg_worker_path() -> Option<Utf8PathBuf> {
    env::var_os("CARGO_BIN_EXE_pg_worker")
        .and_then(utf8)
        .or_else(worker_from_embedded_env)
        .or_else(worker_in_target_dir)
        .or_else(worker_on_path)
}

fn worker_from_embedded_env() -> Option<Utf8PathBuf> {
    let configured = env::var_os("PG_EMBEDDED_WORKER").and_then(utf8)?;
    (configured.file_name() == Some(WORKER_NAME)).then_some(configured)
}

fn worker_in_target_dir() -> Option<Utf8PathBuf> {
    let test_binary = env::current_exe().ok().and_then(|path| utf8(path.into_os_string()))?;
    let target_dir = test_binary.parent()?.parent()?;
    existing(target_dir.join(WORKER_NAME))
}

fn worker_on_path() -> Option<Utf8PathBuf> {
    let search_path = env::var_os("PATH")?;
    env::split_paths(&search_path)
        .filter_map(|entry| utf8(entry.into_os_string()))
        .find_map(|dir| existing(dir.join(WORKER_NAME)))
}

fn existing(candidate: Utf8PathBuf) -> Option<Utf8PathBuf> {
    candidate.is_file().then_some(candidate)
}

fn utf8(value: OsString) -> Option<Utf8PathBuf> {
    value.into_string().ok().map(Utf8PathBuf::from)
}
