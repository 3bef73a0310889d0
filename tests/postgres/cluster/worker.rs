//! Prepares the environment for starting `PostgreSQL`, including the
//! `pg_worker` helper needed when tests run as root.

use super::files::open_parent;
use super::{BoxError, boxed};
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use cap_std::fs::{Permissions, PermissionsExt};
use pg_embedded_setup_unpriv::{ExecutionPrivileges, detect_execution_privileges};
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::net::TcpListener;
use std::sync::OnceLock;

static PREPARED_WORKER: OnceLock<Utf8PathBuf> = OnceLock::new();

/// Environment overrides applied while bootstrapping the cluster.
///
/// Picks a free port unless `PG_PORT` is set. As root, also points
/// `PG_EMBEDDED_WORKER` at a copy of `pg_worker` that `nobody` can execute.
pub(super) fn worker_env_changes() -> Result<Vec<(OsString, Option<OsString>)>, BoxError> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        changes.push((OsString::from("PG_PORT"), Some(free_port()?)));
    }

    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let located = crate::test_helpers::locate_pg_worker_path().ok_or_else(|| {
            boxed(std::io::Error::new(
                ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER is not set and pg_worker binary was not found",
            ))
        })?;
        let prepared = prepare_pg_worker(&located)?;
        changes.push((
            OsString::from("PG_EMBEDDED_WORKER"),
            Some(OsString::from(prepared.as_str())),
        ));
    }
    Ok(changes)
}

fn free_port() -> Result<OsString, BoxError> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(boxed)?;
    let port = listener.local_addr().map_err(boxed)?.port();
    Ok(OsString::from(port.to_string()))
}

/// Copies the worker into the temp directory behind a wrapper script that
/// drops to `nobody`. Prepared once per test binary.
fn prepare_pg_worker(source: &Utf8Path) -> Result<Utf8PathBuf, BoxError> {
    if let Some(prepared) = PREPARED_WORKER.get() {
        return Ok(prepared.clone());
    }

    let temp_dir = Utf8PathBuf::try_from(std::env::temp_dir()).map_err(boxed)?;
    let wrapper = temp_dir.join(format!("taskboard_pg_worker_{}", std::process::id()));
    let binary = wrapper.with_extension("bin");

    let (source_dir, source_name) = open_parent(source)?;
    let (wrapper_dir, wrapper_name) = open_parent(&wrapper)?;
    let (binary_dir, binary_name) = open_parent(&binary)?;
    remove_if_present(&wrapper_dir, wrapper_name)?;
    remove_if_present(&binary_dir, binary_name)?;

    source_dir
        .copy(source_name, &binary_dir, binary_name)
        .map_err(boxed)?;
    let script = format!(
        concat!(
            "#!/bin/sh\n",
            "if [ \"$(id -u)\" -eq 0 ]; then\n",
            "  exec /usr/sbin/runuser -u nobody -- {binary} \"$@\"\n",
            "fi\n",
            "exec {binary} \"$@\"\n",
        ),
        binary = binary.as_str()
    );
    wrapper_dir
        .create(wrapper_name)
        .and_then(|mut file| file.write_all(script.as_bytes()))
        .map_err(boxed)?;

    #[cfg(unix)]
    for (dir, name) in [(&wrapper_dir, wrapper_name), (&binary_dir, binary_name)] {
        dir.set_permissions(name, Permissions::from_mode(0o755))
            .map_err(boxed)?;
    }

    Ok(PREPARED_WORKER.get_or_init(|| wrapper).clone())
}

fn remove_if_present(dir: &cap_std::fs_utf8::Dir, name: &str) -> Result<(), BoxError> {
    match dir.remove_file(name) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(boxed(err)),
    }
}
