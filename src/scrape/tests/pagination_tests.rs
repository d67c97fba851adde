use super::fixtures::{DEALS, DEALS_2, Next, card, catalog_page, on_catalog, test_config};
use crate::scrape::Paginator;
use crate::session::Session;

#[cfg(test)]
mod advance_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_next_control_ends_catalog() {
        let config = test_config();
        let session = on_catalog(&[card("Tondeuse", "/fp/1")], Next::Missing).await;

        let advanced = Paginator::new(&session, &config).advance().await.unwrap();

        assert!(!advanced);
        assert_eq!(session.clicks(), 0);
        assert_eq!(session.current_url().await.unwrap().as_str(), DEALS);
    }

    #[tokio::test]
    async fn test_disabled_next_control_is_not_clicked() {
        let config = test_config();
        let session = on_catalog(&[card("Tondeuse", "/fp/1")], Next::Disabled).await;

        let advanced = Paginator::new(&session, &config).advance().await.unwrap();

        assert!(!advanced);
        assert_eq!(session.clicks(), 0);
    }

    #[tokio::test]
    async fn test_advance_to_next_page() {
        let config = test_config();
        let session = on_catalog(
            &[card("Tondeuse", "/fp/1")],
            Next::Link("/bons-plans?page=2"),
        )
        .await;
        session.add_page(
            DEALS_2,
            &catalog_page(&[card("Scie", "/fp/2")], Next::Disabled),
        );

        let advanced = Paginator::new(&session, &config).advance().await.unwrap();

        assert!(advanced);
        assert_eq!(session.clicks(), 1);
        assert_eq!(session.current_url().await.unwrap().as_str(), DEALS_2);
    }

    #[tokio::test]
    async fn test_unchanged_listings_end_catalog() {
        let config = test_config();
        let cards = [card("Tondeuse", "/fp/1")];
        let session = on_catalog(&cards, Next::Link("/bons-plans?page=2")).await;
        session.add_page(DEALS_2, &catalog_page(&cards, Next::Link("/bons-plans?page=3")));

        let advanced = Paginator::new(&session, &config).advance().await.unwrap();

        assert!(!advanced);
        assert_eq!(session.clicks(), 1);
    }

    #[tokio::test]
    async fn test_empty_next_page_ends_catalog() {
        let config = test_config();
        let session = on_catalog(
            &[card("Tondeuse", "/fp/1")],
            Next::Link("/bons-plans?page=2"),
        )
        .await;
        session.add_page(DEALS_2, &catalog_page(&[], Next::Missing));

        let advanced = Paginator::new(&session, &config).advance().await.unwrap();
        assert!(!advanced);
    }
}

#[cfg(test)]
mod fingerprint_tests {
    use super::*;

    #[tokio::test]
    async fn test_fingerprint_is_prefix_of_first_listing() {
        let mut config = test_config();
        config.fingerprint_len = 5;
        let session = on_catalog(
            &[card("Tondeuse", "/fp/1"), card("Scie", "/fp/2")],
            Next::Missing,
        )
        .await;

        let paginator = Paginator::new(&session, &config);
        assert_eq!(
            paginator.first_listing_fingerprint().await.unwrap().as_deref(),
            Some("Tonde")
        );
    }

    #[tokio::test]
    async fn test_no_listing_no_fingerprint() {
        let config = test_config();
        let session = on_catalog(&[], Next::Missing).await;

        let paginator = Paginator::new(&session, &config);
        assert_eq!(paginator.first_listing_fingerprint().await.unwrap(), None);
    }
}
