//! Addressing for paths opened outside the local workspace.

use std::fmt;

/// A location in an isolated environment or on a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLocation {
    authority: String,
    path: String,
}

impl RemoteLocation {
    /// A path inside an isolated (container) environment.
    ///
    /// The authority carries the hex-encoded path so the host can find the
    /// environment definition next to it.
    pub fn isolated(path: &str) -> Self {
        Self {
            authority: format!("dev-container+{}", hex_encode(path)),
            path: normalize_path(path),
        }
    }

    /// A path on a remote host reached over SSH.
    pub fn remote(host: &str, path: &str) -> Self {
        Self {
            authority: format!("ssh-remote+{}", host),
            path: normalize_path(path),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full URI, e.g. `vscode-remote://ssh-remote+box/srv/app`.
    pub fn uri(&self) -> String {
        format!("vscode-remote://{}{}", self.authority, self.path)
    }
}

impl fmt::Display for RemoteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn hex_encode(text: &str) -> String {
    text.bytes().map(|b| format!("{:02x}", b)).collect()
}
