//! Reads cluster state written to disk by `PostgreSQL`.

use super::{BoxError, boxed};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;
use std::io::ErrorKind;
use std::path::Path;

pub(super) fn open_dir(path: &Utf8Path) -> Result<Dir, BoxError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(boxed)
}

/// Splits `path` into an opened parent directory and its file name.
pub(super) fn open_parent(path: &Utf8Path) -> Result<(Dir, &str), BoxError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| boxed(std::io::Error::other("path must include a file name")))?;
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    Ok((open_dir(parent)?, file_name))
}

/// Reads a file, treating a missing file as `None`.
fn read_optional(dir: &Dir, name: &str) -> Result<Option<String>, BoxError> {
    match dir.read_to_string(name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(boxed(err)),
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Picks up a generated superuser password from the password file.
pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_file = lossy(&settings.password_file);
    let (dir, name) = open_parent(Utf8Path::new(&password_file))?;
    if let Some(contents) = read_optional(&dir, name)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// Reads the bound port from line four of `postmaster.pid`.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = lossy(&settings.data_dir);
    let dir = open_dir(Utf8Path::new(&data_dir))?;
    let port = read_optional(&dir, "postmaster.pid")?
        .and_then(|contents| contents.lines().nth(3).map(|line| line.trim().parse::<u16>()))
        .and_then(Result::ok);
    if let Some(bound) = port {
        settings.port = bound;
    }
    Ok(())
}
