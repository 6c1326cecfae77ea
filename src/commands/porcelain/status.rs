use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{Status, StatusInfo};
use colored::Colorize;
use std::fmt::Display;
use std::io::Write;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<StatusInfo> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let status_info = Status::new(self).initialize(&index)?;

        let branches = status_info.branches.iter().map(|branch| {
            if branch == &status_info.current_branch {
                format!("*{}", branch).green().to_string()
            } else {
                branch.to_string()
            }
        });
        self.print_section("Branches", branches)?;

        self.print_section(
            "Staged Files",
            status_info.staged_files.iter().map(|path| path.display()),
        )?;
        self.print_section(
            "Removed Files",
            status_info.removed_files.iter().map(|path| path.display()),
        )?;
        self.print_section(
            "Modifications Not Staged For Commit",
            status_info
                .workspace_changeset
                .iter()
                .map(|(path, change)| format!("{} {}", path.display(), change).red().to_string()),
        )?;
        self.print_section(
            "Untracked Files",
            status_info
                .untracked_files
                .iter()
                .map(|path| path.display().to_string().red().to_string()),
        )?;

        Ok(status_info)
    }

    fn print_section<T: Display>(
        &self,
        title: &str,
        entries: impl Iterator<Item = T>,
    ) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "=== {} ===", title)?;
        for entry in entries {
            writeln!(writer, "{}", entry)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
