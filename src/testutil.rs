// Test-only helpers shared across modules.

// A shell script standing in for cec-client; reads the piped command like
// the real tool does.
#[cfg(unix)]
pub fn fake_cec(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.path().join("cec-client");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
