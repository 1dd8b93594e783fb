// src/commands/progress.rs
//! Progress display for plugin installation
//!
//! An overall progress bar over the install set, with one printed line per
//! plugin outcome above it.

use indicatif::{ProgressBar, ProgressStyle};
use jpm::{InstallObserver, InstallOutcome};

/// Installation progress tracker for multi-plugin operations
pub struct InstallProgress {
    overall: ProgressBar,
    completed: u64,
}

impl InstallProgress {
    /// Create a tracker for `total` plugin events
    pub fn new(total: u64) -> Self {
        let overall = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{msg} ({pos}/{len}) [{bar:40.green/dim}] {percent}%")
            .map(|s| s.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        overall.set_style(style);
        overall.set_message("Installing");

        Self {
            overall,
            completed: 0,
        }
    }

    /// Print a line above the bar, even when the bar itself is hidden
    fn say(&self, line: String) {
        self.overall.suspend(|| println!("{line}"));
    }

    pub fn finish(&self) {
        self.overall.finish_and_clear();
    }
}

impl InstallObserver for InstallProgress {
    fn on_outcome(&mut self, outcome: &InstallOutcome<'_>) {
        match outcome {
            InstallOutcome::AlreadyInstalled(plugin) => {
                self.say(format!("{} is already installed ...", plugin.name));
            }
            InstallOutcome::Installed(plugin) => {
                self.say(format!("Installing {} v{} ...", plugin.name, plugin.version));
            }
            InstallOutcome::Failed(plugin, err) => {
                self.say(format!("Failed to install {}: {}", plugin.name, err));
            }
        }
        self.completed += 1;
        self.overall.set_position(self.completed);
    }
}
