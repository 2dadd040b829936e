//! `requirements.txt` pin lists

use tracing::debug;

use astrix_core::types::DeclaredDependency;

use super::exact_pin;

/// Collect `name==version` lines; anything else is ignored
pub(super) fn parse(content: &str) -> Vec<DeclaredDependency> {
    content
        .lines()
        .filter_map(|raw| {
            let line = match raw.find(" #") {
                Some(index) => &raw[..index],
                None => raw,
            }
            .trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                return None;
            }

            let pin = exact_pin(line);
            if pin.is_none() {
                debug!("Skipping unpinned requirement line '{}'", line);
            }
            pin
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_in_order() {
        let content = "\
# production pins
requests==2.25.1
Flask == 2.0.1  # web

-r base.txt
--index-url https://example.com/simple
numpy>=1.20
six
";
        assert_eq!(
            parse(content),
            vec![
                DeclaredDependency::new("requests", "==2.25.1"),
                DeclaredDependency::new("Flask", "==2.0.1"),
            ]
        );
    }

    #[test]
    fn test_empty_file() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n# nothing\n").is_empty());
    }
}
