//! Subprocess-backed capabilities: secret lookup and local git identity.
//!
//! Production implementations of the core's [`SecretResolver`] and
//! [`GitIdentity`] traits, wrapping short external commands with captured
//! output. Tests inject mocks instead of shelling out.

use std::process::Command;

use ghupload_core::contract::{GitIdentity, HostError, SecretResolver};

/// Run a command and return its trimmed stdout. A missing binary or a
/// non-zero exit is an error carrying the captured stderr.
pub fn run_command(program: &str, args: &[&str]) -> Result<String, HostError> {
    let output = Command::new(program).args(args).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(format!("running {program} {} failed: {stderr}", args.join(" ")).into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Resolves `pass::<key>` tokens through the `pass` password manager.
pub struct PassSecretResolver;

impl SecretResolver for PassSecretResolver {
    fn resolve(&self, key: &str) -> Result<String, HostError> {
        run_command("pass", &["show", key])
    }
}

/// Reads the commit identity from `git config --global`. Any failure
/// (no git, unset key) is treated as "not configured".
pub struct GitConfigIdentity;

impl GitIdentity for GitConfigIdentity {
    fn user_name(&self) -> Option<String> {
        run_command("git", &["config", "--global", "user.name"])
            .ok()
            .filter(|name| !name.is_empty())
    }

    fn user_email(&self) -> Option<String> {
        run_command("git", &["config", "--global", "user.email"])
            .ok()
            .filter(|email| !email.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn captures_trimmed_stdout() {
        assert_eq!(run_command("echo", &["hello"]).unwrap(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_an_error() {
        assert!(run_command("false", &[]).is_err());
    }

    #[test]
    fn missing_binary_is_an_error() {
        assert!(run_command("no-such-binary-ghupload", &[]).is_err());
    }
}
