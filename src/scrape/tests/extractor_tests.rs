use super::fixtures::{DEALS, Next, card, detail_page, on_catalog, test_config};
use crate::scrape::extractor::{Cleanup, FieldExtractor, Probe, first_present};
use crate::session::snapshot::SnapshotSession;
use crate::session::{Locator, Scope, Session};
use url::Url;

#[cfg(test)]
mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_summary_reads_every_field() {
        let config = test_config();
        let session = on_catalog(&[card("Tondeuse", "/fp/tondeuse-1")], Next::Missing).await;
        let card = session
            .find(&config.selectors.listing_cards)
            .await
            .unwrap()
            .unwrap();

        let base = Url::parse(DEALS).unwrap();
        let summary = FieldExtractor::new(&config.selectors)
            .listing_summary(&card, &base)
            .await
            .unwrap();

        assert_eq!(summary.product_name.as_deref(), Some("Tondeuse"));
        assert_eq!(summary.seller_name.as_deref(), Some("Acme"));
        assert_eq!(summary.discount_text.as_deref(), Some("-20 %"));
        assert_eq!(summary.price_eur, Some(12.99));
        assert_eq!(
            summary.page_url.as_deref(),
            Some("https://shop.test/fp/tondeuse-1")
        );
        assert_eq!(
            summary.image_url.as_deref(),
            Some("https://cdn.test/Tondeuse.jpg")
        );
    }

    #[tokio::test]
    async fn test_missing_elements_leave_fields_absent() {
        let config = test_config();
        let session = on_catalog(&["<li><span>Mystère</span></li>".to_string()], Next::Missing).await;
        let card = session
            .find(&config.selectors.listing_cards)
            .await
            .unwrap()
            .unwrap();

        let summary = FieldExtractor::new(&config.selectors)
            .listing_summary(&card, &Url::parse(DEALS).unwrap())
            .await
            .unwrap();

        assert_eq!(summary, Default::default());
    }

    #[tokio::test]
    async fn test_seller_falls_back_to_block_text() {
        let config = test_config();
        let html = r#"<li>
            <app-product-card-label><div><a href="javascript:void(0)">Perceuse</a></div></app-product-card-label>
            <app-product-card-seller>Vendu et expédié par Brico Pro</app-product-card-seller>
            <app-lazy-image><img src="https://cdn.test/perceuse.jpg"></app-lazy-image>
        </li>"#;
        let session = on_catalog(&[html.to_string()], Next::Missing).await;
        let card = session
            .find(&config.selectors.listing_cards)
            .await
            .unwrap()
            .unwrap();

        let summary = FieldExtractor::new(&config.selectors)
            .listing_summary(&card, &Url::parse(DEALS).unwrap())
            .await
            .unwrap();

        assert_eq!(summary.seller_name.as_deref(), Some("Brico Pro"));
        assert_eq!(
            summary.image_url.as_deref(),
            Some("https://cdn.test/perceuse.jpg")
        );
        assert_eq!(summary.page_url, None);
        assert_eq!(summary.price_eur, None);
    }

    #[tokio::test]
    async fn test_relative_image_is_made_absolute() {
        let config = test_config();
        let html = r#"<li>
            <app-product-card-label><div><a href="/fp/rateau">Râteau</a></div></app-product-card-label>
            <app-lazy-image><img src="/media/rateau.jpg"></app-lazy-image>
        </li>"#;
        let session = on_catalog(&[html.to_string()], Next::Missing).await;
        let card = session
            .find(&config.selectors.listing_cards)
            .await
            .unwrap()
            .unwrap();

        let summary = FieldExtractor::new(&config.selectors)
            .listing_summary(&card, &Url::parse(DEALS).unwrap())
            .await
            .unwrap();

        assert_eq!(
            summary.image_url.as_deref(),
            Some("https://shop.test/media/rateau.jpg")
        );
        assert_eq!(
            summary.page_url.as_deref(),
            Some("https://shop.test/fp/rateau")
        );
    }

    #[tokio::test]
    async fn test_first_present_takes_first_value() {
        let session = on_catalog(&[card("Scie", "/fp/scie")], Next::Missing).await;
        let missing = Locator::css("app-product-card-label > span");
        let name = Locator::css("app-product-card-label a");
        let promo = Locator::css("app-product-promo > div > div");

        let value = first_present(
            &session,
            &[
                Probe::Text(&missing, Cleanup::Trim),
                Probe::Text(&name, Cleanup::Trim),
                Probe::Text(&promo, Cleanup::CollapseWhitespace),
            ],
        )
        .await
        .unwrap();
        assert_eq!(value.as_deref(), Some("Scie"));

        let none = first_present(&session, &[Probe::Attr(&name, "data-missing")])
            .await
            .unwrap();
        assert_eq!(none, None);
    }
}

#[cfg(test)]
mod detail_field_tests {
    use super::*;

    const PRODUCT: &str = "https://shop.test/fp/tondeuse-1";

    async fn on_detail(html: &str) -> SnapshotSession {
        let session = SnapshotSession::new().with_page(PRODUCT, html);
        session.goto(PRODUCT).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_features_and_category_from_table() {
        let config = test_config();
        let session = on_detail(&detail_page(
            "Tondeuse thermique.",
            &[("Couleur", "Rouge"), ("Poids", "32 kg"), ("Catégorie", "Jardin")],
        ))
        .await;

        let fields = FieldExtractor::new(&config.selectors)
            .detail_fields(&session)
            .await
            .unwrap();

        assert_eq!(fields.description.as_deref(), Some("Tondeuse thermique."));
        assert_eq!(
            fields.features.as_deref(),
            Some("Couleur: Rouge | Poids: 32 kg | Catégorie: Jardin")
        );
        assert_eq!(fields.category.as_deref(), Some("Jardin"));
    }

    #[tokio::test]
    async fn test_features_from_marker_without_table_rows() {
        let config = test_config();
        let session = on_detail(&detail_page(
            "Tondeuse thermique.\nCaractéristiques :\n- Rouge\n- 32 kg",
            &[],
        ))
        .await;

        let fields = FieldExtractor::new(&config.selectors)
            .detail_fields(&session)
            .await
            .unwrap();

        assert_eq!(fields.description.as_deref(), Some("Tondeuse thermique."));
        assert_eq!(fields.features.as_deref(), Some("Rouge | 32 kg"));
        assert_eq!(fields.category, None);
    }

    #[tokio::test]
    async fn test_category_from_fourteenth_row() {
        let config = test_config();
        let mut rows = vec![("Référence", "123"); 13];
        rows.push(("Rayon", "Outillage"));
        let session = on_detail(&detail_page("Perceuse.", &rows)).await;

        let fields = FieldExtractor::new(&config.selectors)
            .detail_fields(&session)
            .await
            .unwrap();

        assert_eq!(fields.category.as_deref(), Some("Outillage"));
    }

    #[tokio::test]
    async fn test_unrelated_page_has_no_fields() {
        let config = test_config();
        let session = on_detail("<html><body><p>Produit indisponible</p></body></html>").await;

        let fields = FieldExtractor::new(&config.selectors)
            .detail_fields(&session)
            .await
            .unwrap();

        assert_eq!(fields, Default::default());
    }
}
