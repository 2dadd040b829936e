//! Error message formatting with actionable suggestions.

use std::error::Error;

use astrix_core::error::AstrixError;

use super::colors::ColorSupport;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self {
            colors: ColorSupport::detect(),
        }
    }

    /// Format an error with its suggestion and source chain
    pub fn format_error(&self, error: &AstrixError) -> String {
        let mut output = format!("{}: {}\n", self.colors.red("error"), error);

        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("{}: {}\n", self.colors.dim("help"), suggestion));
        }

        let mut source = error.source();
        while let Some(err) = source {
            output.push_str(&format!("{}: {}\n", self.colors.dim("caused by"), err));
            source = err.source();
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> ErrorFormatter {
        ErrorFormatter {
            colors: ColorSupport::disabled(),
        }
    }

    #[test]
    fn test_format_with_suggestion() {
        let error = AstrixError::UnsupportedManifest {
            path: "Pipfile".to_string(),
        };
        let text = plain().format_error(&error);

        assert!(text.starts_with("error: Unsupported manifest format: Pipfile\n"));
        assert!(text.contains("help: Point astrix at"));
    }

    #[test]
    fn test_format_source_chain() {
        let error = AstrixError::io(
            "Failed to read requirements.txt".to_string(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let text = plain().format_error(&error);

        assert!(text.contains("caused by: no such file"));
    }
}
