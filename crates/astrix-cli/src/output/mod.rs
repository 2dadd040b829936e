//! Terminal output formatting.
//!
//! Every command prints through [`OutputHandler`] so color handling and
//! stream choice stay consistent.

pub mod colors;
pub mod errors;

use astrix_core::types::{Action, Conflict, Diagnostic, ResolutionCommand};

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colors: colors::ColorSupport,
}

impl OutputHandler {
    /// Create a new output handler
    pub fn new() -> Self {
        Self {
            colors: colors::ColorSupport::detect(),
        }
    }

    /// Handler that never emits escape codes
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            colors: colors::ColorSupport::disabled(),
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.colors.dim(message));
    }

    /// Print data without decoration
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{} {}", self.colors.green("✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.colors.yellow("⚠"), message);
    }

    /// One conflict as a report line
    pub fn conflict_line(&self, conflict: &Conflict) -> String {
        let installed = match conflict.installed {
            Some(ref version) => self.colors.yellow(version),
            None => self.colors.red("not installed"),
        };
        let required = if conflict.required.is_empty() {
            "any version".to_string()
        } else {
            conflict.required.clone()
        };
        format!(
            "{}  installed: {}  required: {}",
            self.colors.bold(&conflict.package),
            installed,
            self.colors.green(&required)
        )
    }

    /// One diagnostic as a report line
    pub fn diagnostic_line(&self, diagnostic: &Diagnostic) -> String {
        format!("{} {}", self.colors.yellow("skipped"), diagnostic)
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Shell text for one planned action
pub fn render_action(action: &Action) -> String {
    match action {
        Action::Remove { package } => format!("pip uninstall -y {}", package),
        Action::Install { package, target } => format!("pip install '{}{}'", package, target),
    }
}

/// Shell text for a remove-then-install pair
pub fn render_command(command: &ResolutionCommand) -> [String; 2] {
    [render_action(&command.remove), render_action(&command.install)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        let command = ResolutionCommand::new("requests", ">=2.28, <3");
        assert_eq!(
            render_command(&command),
            [
                "pip uninstall -y requests".to_string(),
                "pip install 'requests>=2.28, <3'".to_string(),
            ]
        );
    }

    #[test]
    fn test_render_unconstrained_install() {
        let command = ResolutionCommand::new("click", "");
        assert_eq!(render_action(&command.install), "pip install 'click'");
    }

    #[test]
    fn test_conflict_line_without_colors() {
        let output = OutputHandler::plain();
        assert_eq!(
            output.conflict_line(&Conflict::outdated("flask", "1.1.2", ">=2.0")),
            "flask  installed: 1.1.2  required: >=2.0"
        );
        assert_eq!(
            output.conflict_line(&Conflict::missing("click", "")),
            "click  installed: not installed  required: any version"
        );
    }
}
