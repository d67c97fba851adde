use crate::parsers::clean_seller;

#[cfg(test)]
mod seller_tests {
    use super::*;

    #[test]
    fn test_first_line_without_prefix() {
        assert_eq!(
            clean_seller("Vendu par: Acme\nmore text"),
            Some("Acme".to_string())
        );
    }

    #[test]
    fn test_empty_and_blank_are_absent() {
        assert_eq!(clean_seller(""), None);
        assert_eq!(clean_seller("   "), None);
        assert_eq!(clean_seller("Vendu par :"), None);
    }

    #[test]
    fn test_prefix_variants() {
        assert_eq!(
            clean_seller("VENDU ET EXPÉDIÉ PAR Brico Pro"),
            Some("Brico Pro".to_string())
        );
        assert_eq!(
            clean_seller("vendu et expédié par : E.Leclerc"),
            Some("E.Leclerc".to_string())
        );
        assert_eq!(
            clean_seller("Sold and shipped by: Widgets Ltd"),
            Some("Widgets Ltd".to_string())
        );
        assert_eq!(clean_seller("sold by Acme"), Some("Acme".to_string()));
    }

    #[test]
    fn test_surrounding_punctuation_and_nbsp() {
        assert_eq!(
            clean_seller("Vendu par:\u{a0}Maison Dupont -"),
            Some("Maison Dupont".to_string())
        );
        assert_eq!(clean_seller("  Acme  "), Some("Acme".to_string()));
    }
}
