use super::fixtures::{DEALS, Next, card, catalog_page, detail_page, test_config};
use crate::results::DetailFields;
use crate::scrape::DetailResolver;
use crate::session::Session;
use crate::session::snapshot::SnapshotSession;

const PRODUCT: &str = "https://shop.test/fp/tondeuse-1";

async fn session_with_product() -> SnapshotSession {
    let session = SnapshotSession::new()
        .with_page(
            DEALS,
            &catalog_page(&[card("Tondeuse", "/fp/tondeuse-1")], Next::Missing),
        )
        .with_page(
            PRODUCT,
            &detail_page("Tondeuse thermique.", &[("Couleur", "Rouge")]),
        );
    session.goto(DEALS).await.unwrap();
    session
}

#[cfg(test)]
mod resolver_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_reads_detail_page_and_returns() {
        let config = test_config();
        let session = session_with_product().await;
        let catalog_tab = session.current_tab().await.unwrap();

        let fields = DetailResolver::new(&session, &config)
            .resolve(Some(PRODUCT))
            .await
            .unwrap();

        assert_eq!(fields.description.as_deref(), Some("Tondeuse thermique."));
        assert_eq!(fields.features.as_deref(), Some("Couleur: Rouge"));
        assert_eq!(session.current_tab().await.unwrap(), catalog_tab);
        assert_eq!(session.current_url().await.unwrap().as_str(), DEALS);
        assert_eq!(session.open_tabs(), 1);
    }

    #[tokio::test]
    async fn test_navigation_fault_gives_absent_fields() {
        let config = test_config();
        let session = session_with_product().await;

        let fields = DetailResolver::new(&session, &config)
            .resolve(Some("https://shop.test/fp/retired"))
            .await
            .unwrap();

        assert_eq!(fields, DetailFields::default());
        assert_eq!(session.current_url().await.unwrap().as_str(), DEALS);
        assert_eq!(session.open_tabs(), 1);
    }

    #[tokio::test]
    async fn test_no_link_opens_no_tab() {
        let config = test_config();
        let session = session_with_product().await;

        let fields = DetailResolver::new(&session, &config)
            .resolve(None)
            .await
            .unwrap();

        assert_eq!(fields, DetailFields::default());
        assert_eq!(session.open_tabs(), 1);
    }

    #[tokio::test]
    async fn test_page_without_description_block() {
        let config = test_config();
        let session = session_with_product().await;
        session.add_page(
            "https://shop.test/fp/empty",
            "<html><body><p>Bientôt disponible</p></body></html>",
        );

        let fields = DetailResolver::new(&session, &config)
            .resolve(Some("https://shop.test/fp/empty"))
            .await
            .unwrap();

        assert_eq!(fields, DetailFields::default());
        assert_eq!(session.current_url().await.unwrap().as_str(), DEALS);
    }

    #[tokio::test]
    async fn test_closed_session_degrades_to_absent_fields() {
        let config = test_config();
        let session = session_with_product().await;
        session.close().await.unwrap();

        let fields = DetailResolver::new(&session, &config)
            .resolve(Some(PRODUCT))
            .await
            .unwrap();
        assert_eq!(fields, DetailFields::default());
    }
}
