//! Runs embedded `PostgreSQL` lifecycle steps as an unprivileged user.
//!
//! The `PostgreSQL` test cluster refuses to run as root, so the test harness
//! delegates each lifecycle step to this helper:
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON [`WorkerPayload`] holding the cluster settings
//! and the environment the step runs under. When started as root the worker
//! re-executes itself as `nobody` before touching the data directory.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::{ErrorKind, Read};
#[cfg(unix)]
use std::process::{Command, ExitStatus};
#[cfg(unix)]
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Marks the re-executed child so it does not demote itself twice.
#[cfg(unix)]
const REEXEC_MARKER: &str = "TASKBOARD_PG_WORKER_CHILD";
#[cfg(unix)]
const SAFE_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("invalid arguments: {0}")]
    Usage(String),
    #[error("failed to read worker config: {0}")]
    ReadConfig(#[source] BoxError),
    #[error("failed to parse worker config: {0}")]
    ParseConfig(#[source] serde_json::Error),
    #[error("invalid cluster settings: {0}")]
    Settings(String),
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to drop privileges: {0}")]
    Privileges(String),
    #[error("postgres {operation} failed: {message}")]
    Postgres {
        operation: &'static str,
        message: String,
    },
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    fn parse(raw: &str) -> Result<Self, WorkerError> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::Usage(format!(
                "unknown operation '{other}'; expected setup, start, or stop"
            ))),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    fn failure(self, err: impl std::fmt::Display) -> WorkerError {
        WorkerError::Postgres {
            operation: self.as_str(),
            message: err.to_string(),
        }
    }
}

/// Parsed command line.
#[cfg(unix)]
#[derive(Debug)]
struct Invocation {
    operation: Operation,
    config: Utf8PathBuf,
}

#[cfg(unix)]
impl Invocation {
    fn parse(args: &[String]) -> Result<Self, WorkerError> {
        let mut rest = args.iter().skip(1);
        let operation = rest
            .next()
            .ok_or_else(|| WorkerError::Usage("missing operation argument".into()))
            .and_then(|raw| Operation::parse(raw))?;
        let config = rest
            .next()
            .map(Utf8PathBuf::from)
            .ok_or_else(|| WorkerError::Usage("missing config path argument".into()))?;
        if let Some(extra) = rest.next() {
            return Err(WorkerError::Usage(format!(
                "unexpected extra argument: {extra}"
            )));
        }
        Ok(Self { operation, config })
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = std::env::args_os()
        .map(|arg| {
            arg.into_string()
                .map_err(|_| WorkerError::Usage("argument is not valid UTF-8".into()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let invocation = Invocation::parse(&args)?;

    if let Some(status) = reexec_unprivileged(&args)? {
        std::process::exit(status.code().unwrap_or(1));
    }
    run(&invocation).map_err(Into::into)
}

#[cfg(unix)]
fn run(invocation: &Invocation) -> Result<(), WorkerError> {
    let payload = load_payload(&invocation.config)?;
    demote_to(UNPRIVILEGED_USER)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::Settings(err.to_string()))?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::Runtime)?;
    apply_environment(&payload.environment);

    let operation = invocation.operation;
    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async {
        match operation {
            Operation::Setup => {
                postgres
                    .setup()
                    .await
                    .map_err(|err| operation.failure(err))?;
                start_unless_running(&mut postgres, operation).await
            }
            Operation::Start => {
                start_unless_running(&mut postgres, operation).await?;
                // The server must outlive this process.
                std::mem::forget(postgres);
                Ok(())
            }
            Operation::Stop => postgres.stop().await.map_err(|err| operation.failure(err)),
        }
    })
}

#[cfg(unix)]
async fn start_unless_running(
    postgres: &mut PostgreSQL,
    operation: Operation,
) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres.start().await.map_err(|err| operation.failure(err))
}

/// Re-runs the worker as [`UNPRIVILEGED_USER`] when started as root.
///
/// Returns the child's exit status, or `None` when this process should do
/// the work itself.
#[cfg(unix)]
fn reexec_unprivileged(args: &[String]) -> Result<Option<ExitStatus>, WorkerError> {
    if !Uid::effective().is_root() || std::env::var_os(REEXEC_MARKER).is_some() {
        return Ok(None);
    }

    let exe = std::env::current_exe()
        .map_err(WorkerError::Runtime)?
        .into_os_string()
        .into_string()
        .map_err(|_| WorkerError::Privileges("executable path is not valid UTF-8".into()))?;
    let forwarded = args.get(1..).unwrap_or_default();

    let status = Command::new("runuser")
        .args(["-u", UNPRIVILEGED_USER, "--", exe.as_str()])
        .args(forwarded)
        .env(REEXEC_MARKER, "1")
        .env("PATH", SAFE_PATH)
        .status();
    match status {
        Ok(exit) => Ok(Some(exit)),
        Err(err) if err.kind() == ErrorKind::NotFound => su_fallback(&exe, forwarded).map(Some),
        Err(err) => Err(WorkerError::Privileges(err.to_string())),
    }
}

/// Falls back to `su` on systems without `runuser`.
#[cfg(unix)]
fn su_fallback(exe: &str, forwarded: &[String]) -> Result<ExitStatus, WorkerError> {
    let command = std::iter::once(exe)
        .chain(forwarded.iter().map(String::as_str))
        .map(shell_quote)
        .fold(format!("{REEXEC_MARKER}=1 exec"), |line, word| {
            format!("{line} {word}")
        });

    Command::new("/bin/su")
        .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c", command.as_str()])
        .env("PATH", SAFE_PATH)
        .status()
        .map_err(|err| WorkerError::Privileges(err.to_string()))
}

/// Wraps `value` in single quotes for `sh -c`.
#[cfg(unix)]
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let bytes = read_file(path).map_err(WorkerError::ReadConfig)?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ParseConfig)
}

#[cfg(unix)]
fn read_file(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    let mut bytes = Vec::new();
    dir.open(relative.as_std_path())?.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(unix)]
fn demote_to(username: &str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }
    let privileges = |err: nix::Error| WorkerError::Privileges(err.to_string());

    let user = User::from_name(username)
        .map_err(privileges)?
        .ok_or_else(|| WorkerError::Privileges(format!("user '{username}' not found")))?;
    let name = CString::new(user.name.as_str())
        .map_err(|err| WorkerError::Privileges(format!("invalid user name: {err}")))?;
    initgroups(&name, user.gid).map_err(privileges)?;
    setgid(user.gid).map_err(privileges)?;
    setuid(user.uid).map_err(privileges)?;

    // SAFETY: the worker is single-threaded at this point.
    unsafe {
        std::env::set_var("HOME", &user.dir);
        std::env::set_var("USER", &user.name);
        std::env::set_var("LOGNAME", &user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the worker is single-threaded and nothing else reads the
        // environment concurrently.
        unsafe {
            match value {
                Some(secret) => std::env::set_var(key, secret.expose()),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is only supported on Unix platforms".into())
}
