//! End-to-end tests over the bundled sample catalog.

use std::sync::Arc;

use groundsafe::card::{ImageView, FIELD_REFERENCE_LABEL};
use groundsafe::stats::TextAnchor;
use groundsafe::view::{card_to_text, dashboard_to_text};
use groundsafe::{
    build_dashboard, render, CardPresenter, Catalog, CatalogFilter, Category, Dataset, ImageLoader,
    ImageState, LoadOutcome,
};

const SAMPLE: &str = include_str!("../../../data/catalog.json");

fn dataset() -> Dataset {
    Dataset::from_json(SAMPLE).expect("sample catalog parses")
}

#[test]
fn test_sample_catalog_loads() {
    let dataset = dataset();
    assert_eq!(dataset.yearly.len(), 6);
    assert_eq!(dataset.airports.len(), 6);
    assert_eq!(dataset.cases.len(), 25);
    assert!(!dataset.findings.is_empty());

    assert_eq!(dataset.goals.len(), 6);
    let ground = &dataset.goals[4];
    assert_eq!(ground.category, "지상안전사고");
    assert_eq!(ground.sub_category, "차량-차량·장비·시설간 접촉");
    assert_eq!(ground.target, "0.291건");
}

#[test]
fn test_excellence_card_with_legacy_image() {
    let catalog = Catalog::new(dataset().cases);
    let record = catalog.get(1).unwrap();
    let card = render(record, "");

    assert_eq!(card.display_id, "우수-1");
    assert_eq!(card.header.airport, "인천");
    assert_eq!(card.header.company, "샤프에비에이션케..");
    assert_eq!(card.detail.images.len(), 1);
    assert_eq!(card.detail.images[0].url, "image/best_01.png");
    assert!(card.countermeasures.effect.is_some());
    assert!(card.field_reference.is_none());
}

#[test]
fn test_general_card_ids_use_offset() {
    let dataset = dataset();
    for record in dataset.cases.iter().filter(|r| r.category == Category::General) {
        let card = render(record, "");
        assert_eq!(card.display_id, format!("사례-{}", record.id - 100));
    }
}

#[test]
fn test_field_reference_follows_footer_images() {
    let dataset = dataset();
    for record in &dataset.cases {
        let card = render(record, "");
        assert_eq!(card.field_reference.is_some(), !record.footer_images.is_empty());
        assert_eq!(card.causes.items.len(), record.causes.len());
        let text = card_to_text(&card);
        assert_eq!(
            text.contains(FIELD_REFERENCE_LABEL),
            !record.footer_images.is_empty()
        );
    }
}

#[test]
fn test_search_and_highlight_round_trip() {
    let catalog = Catalog::new(dataset().cases);
    let hits = catalog.search(&CatalogFilter::query("DOLLY"));
    assert!(!hits.is_empty());

    for record in hits {
        let card = render(record, "DOLLY");
        assert!(card.match_count() > 0);
        assert_eq!(card.title.to_plain_string(), record.title);
        assert_eq!(card.detail.content.to_plain_string(), record.content);
    }
}

#[test]
fn test_search_by_category() {
    let catalog = Catalog::new(dataset().cases);
    let excellence = catalog.search(&CatalogFilter::default().with_category(Category::Excellence));
    assert_eq!(excellence.len(), 1);
    assert_eq!(excellence[0].id, 1);
}

#[test]
fn test_dashboard_from_sample() {
    let dataset = dataset();
    let view = build_dashboard(&dataset.yearly, &dataset.airports);

    let years: Vec<_> = view.recent.iter().map(|t| t.year_label.as_str()).collect();
    assert_eq!(years, vec!["2022년", "2023년", "2024년"]);
    assert_eq!(view.recent[2].rate_label, "0.501");
    assert_eq!(view.distribution[0].label.callout, "35건(45%)");
    assert_eq!(view.distribution[3].label.callout, "4건(4.5%)");
    assert_eq!(view.total_count, 76);
    assert_eq!(view.total_label(), "76건");

    // The largest slice is centered in the upper-right quadrant.
    assert_eq!(view.distribution[0].label.anchor, TextAnchor::Start);

    let text = dashboard_to_text(&view, &dataset.findings, &dataset.goals);
    assert!(text.contains("사주경계 미흡"));
    assert!(text.contains("항공안전장애 / 유도로 오진입: 0건"));
    assert!(text.contains("최근 3개년 사고 추이"));
}

struct FailEverything;

#[async_trait::async_trait]
impl ImageLoader for FailEverything {
    async fn load(&self, _url: &str) -> LoadOutcome {
        LoadOutcome::Failed
    }
}

#[tokio::test]
async fn test_failed_images_do_not_affect_other_cards() {
    let catalog = Catalog::new(dataset().cases);
    let mut broken = CardPresenter::new(catalog.get(102).unwrap().clone());
    let mut healthy = CardPresenter::new(catalog.get(103).unwrap().clone());
    broken.render("");
    healthy.render("");

    broken.load_images(Arc::new(FailEverything)).await;
    broken.drain_signals();

    let card = broken.render("");
    assert!(card
        .image_blocks()
        .all(|b| matches!(b.view, ImageView::Unavailable { .. })));
    assert_eq!(card.causes.items.len(), 1);

    let other = healthy.render("");
    assert!(other.image_blocks().all(|b| b.view == ImageView::Loading));
    assert_eq!(
        healthy.image_state("image/3-01.png"),
        Some(ImageState::Pending)
    );
}
