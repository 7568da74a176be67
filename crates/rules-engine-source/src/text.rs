//! Text helpers shared by sources, importer and resolvers.

/// Trim surrounding whitespace and lower-case.
///
/// Total over all inputs and idempotent.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Split a pipe-separated cell into trimmed, non-empty values.
pub fn split_multi_value(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize, split_multi_value};
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Hola, Buenas  "), "hola, buenas");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["", "  ", "Hola", " ÁRBOL ñ ", "a.b*C", "\u{130}stanbul", "ß Straße"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input={input:?}");
        }
    }

    #[test]
    fn split_multi_value_drops_blanks() {
        assert_eq!(
            split_multi_value(" nombre | telefono || "),
            vec!["nombre".to_string(), "telefono".to_string()]
        );
        assert!(split_multi_value("").is_empty());
    }
}
