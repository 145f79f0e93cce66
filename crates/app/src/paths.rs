//! On-disk layout of an application: `<base>/<studio>/<project>/`.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PathContext {
    root: PathBuf,
    app_id: &'static str,
}

impl PathContext {
    /// Root below the platform's local data directory, or the working
    /// directory when there is none.
    pub fn new(studio: &str, project: &str, app_id: &'static str) -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_path(base, studio, project, app_id)
    }

    pub fn with_base_path(base: impl AsRef<Path>, studio: &str, project: &str, app_id: &'static str) -> Self {
        Self {
            root: base.as_ref().join(studio).join(project),
            app_id,
        }
    }

    pub fn app_id(&self) -> &'static str {
        self.app_id
    }

    pub fn project_root(&self) -> &Path {
        &self.root
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(format!("{}.settings.ron", self.app_id))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir().join(format!("{}.{timestamp}.log", self.app_id))
    }

    /// Log file named after the current local time.
    pub fn log_file_now(&self) -> PathBuf {
        self.log_file(&chrono::Local::now().format("%Y%m%d-%H%M%S").to_string())
    }

    /// Creates the project root and the log directory.
    pub fn ensure_directories(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_project_root() {
        let ctx = PathContext::with_base_path("/base", "studio", "project", "platformer");

        assert_eq!(ctx.project_root(), Path::new("/base/studio/project"));
        assert_eq!(
            ctx.settings_file(),
            PathBuf::from("/base/studio/project/platformer.settings.ron")
        );
        assert_eq!(
            ctx.log_file("20240315-120000"),
            PathBuf::from("/base/studio/project/logs/platformer.20240315-120000.log")
        );
    }

    #[test]
    fn log_file_now_is_in_logs_dir() {
        let ctx = PathContext::with_base_path("/base", "studio", "project", "platformer");
        let file = ctx.log_file_now();

        assert_eq!(file.parent(), Some(ctx.logs_dir().as_path()));
        assert!(file.to_string_lossy().ends_with(".log"));
    }

    #[test]
    fn ensure_directories_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = PathContext::with_base_path(tmp.path(), "studio", "project", "platformer");

        ctx.ensure_directories().unwrap();
        ctx.ensure_directories().unwrap();
        assert!(ctx.logs_dir().is_dir());
        assert!(ctx.project_root().is_dir());
    }
}
