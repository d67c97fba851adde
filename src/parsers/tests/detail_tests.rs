use crate::parsers::detail::{feature_pair, is_category_label, join_features};
use crate::parsers::{DetailText, split_characteristics};

#[cfg(test)]
mod split_tests {
    use super::*;

    #[test]
    fn test_split_at_marker() {
        let result = split_characteristics("Great item.\nCaractéristiques:\n- Red\n- 2kg");
        assert_eq!(
            result,
            DetailText {
                description: Some("Great item.".to_string()),
                features: Some("Red | 2kg".to_string()),
            }
        );
    }

    #[test]
    fn test_no_marker_is_all_description() {
        let result = split_characteristics("Only text, no marker");
        assert_eq!(result.description.as_deref(), Some("Only text, no marker"));
        assert_eq!(result.features, None);
    }

    #[test]
    fn test_marker_is_case_insensitive_and_first_wins() {
        let result =
            split_characteristics("Intro\nCHARACTERISTICS :\n• Steel\n\n  * 3 m\ncharacteristics: x");
        assert_eq!(result.description.as_deref(), Some("Intro"));
        assert_eq!(
            result.features.as_deref(),
            Some("Steel | 3 m | characteristics: x")
        );
    }

    #[test]
    fn test_empty_sides() {
        let result = split_characteristics("Caractéristiques:\n - \n");
        assert_eq!(result, DetailText::default());
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;

    #[test]
    fn test_feature_pair() {
        assert_eq!(feature_pair("Couleur", "Rouge"), Some("Couleur: Rouge".to_string()));
        assert_eq!(feature_pair("Couleur", ""), Some("Couleur".to_string()));
        assert_eq!(feature_pair("", "Rouge"), Some("Rouge".to_string()));
        assert_eq!(feature_pair(" ", " "), None);
    }

    #[test]
    fn test_join_features() {
        assert_eq!(join_features(["a: 1", "b: 2"]), Some("a: 1 | b: 2".to_string()));
        assert_eq!(join_features(Vec::<String>::new()), None);
    }

    #[test]
    fn test_category_labels() {
        assert!(is_category_label("Catégorie"));
        assert!(is_category_label("Catégories"));
        assert!(is_category_label("Product category"));
        assert!(!is_category_label("Couleur"));
    }
}
