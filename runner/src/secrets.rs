//! Account secrets kept on disk.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use rand::distr::Alphanumeric;
use rand::Rng;
use tracing::info;

/// Length of a generated password.
pub const PASSWORD_LEN: usize = 16;

/// Reads the password at `path`, generating and saving one first if the file
/// does not exist.
pub fn load_or_create_password(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(password) => return Ok(strip_newline(&password).to_owned()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("read password {}", path.display()));
        }
    }

    let password = generate_password();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    fs::write(path, &password).with_context(|| format!("write password {}", path.display()))?;
    info!(path = %path.display(), "generated new password");
    Ok(password)
}

/// Reads the PEM public key published on registration.
pub fn load_public_key(path: &Path) -> Result<String> {
    let pem = fs::read_to_string(path)
        .with_context(|| format!("read public key {}", path.display()))?;
    anyhow::ensure!(!pem.trim().is_empty(), "public key {} is empty", path.display());
    Ok(pem)
}

/// Drops one trailing `\n` or `\r\n`.
fn strip_newline(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}
