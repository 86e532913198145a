use serde::Deserialize;

/// Raw listing query string. Everything stays a string so malformed numbers
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CarListQuery {
    pub brand: Option<String>,
    pub motor: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// `"Audi - Porsche-"` becomes `["Audi", "Porsche"]`.
pub fn parse_alternatives(raw: Option<&str>) -> Vec<String> {
    raw.map(|raw| {
        raw.split('-')
            .map(str::trim)
            .filter(|alternative| !alternative.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Positive page number, or 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

pub fn parse_page_size(raw: Option<&str>, default: u64, max: u64) -> u64 {
    raw.and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|size| *size > 0)
        .map(|size| size.min(max))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{parse_alternatives, parse_page, parse_page_size};

    #[test]
    fn alternatives_are_trimmed_and_blank_ones_dropped() {
        assert_eq!(
            parse_alternatives(Some(" Audi - Porsche-- ")),
            vec!["Audi".to_string(), "Porsche".to_string()]
        );
        assert!(parse_alternatives(Some(" - ")).is_empty());
        assert!(parse_alternatives(None).is_empty());
    }

    #[test]
    fn invalid_pages_fall_back_to_first() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-3")), 1);
        assert_eq!(parse_page(Some("4")), 4);
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(parse_page_size(None, 9, 100), 9);
        assert_eq!(parse_page_size(Some("x"), 9, 100), 9);
        assert_eq!(parse_page_size(Some("0"), 9, 100), 9);
        assert_eq!(parse_page_size(Some("25"), 9, 100), 25);
        assert_eq!(parse_page_size(Some("5000"), 9, 100), 100);
    }
}
