use crate::error::{DeskError, Result};
use std::path::Path;

/// Open a file with the platform's default viewer.
pub async fn open_in_viewer(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(DeskError::Persistence(format!(
            "Path does not exist: {}",
            path.display()
        )));
    }

    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "cmd"
    } else {
        "xdg-open"
    };

    let mut cmd = tokio::process::Command::new(opener);
    if cfg!(target_os = "windows") {
        cmd.args(["/C", "start", ""]).arg(path);
    } else {
        cmd.arg(path);
    }

    let output = cmd
        .output()
        .await
        .map_err(|e| DeskError::persistence("open", path, e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(DeskError::persistence("open", path, stderr.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_path_is_rejected_before_spawning() {
        let result = open_in_viewer(Path::new("/definitely/not/here.txt")).await;
        assert!(matches!(result, Err(DeskError::Persistence(_))));
    }
}
