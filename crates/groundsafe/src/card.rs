//! Case card presentation.
//!
//! [`CardPresenter`] owns one record together with the image state of the card
//! showing it. Each call to [`CardPresenter::render`] produces a
//! [`RenderedCard`]: a view model with every derived field computed, the
//! search query highlighted, and each image resolved to what should be on
//! screen right now.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::highlight::{Highlighted, Highlighter};
use crate::image::{
    dispatch_fetches, signal_channel, ImageLoader, ImageSignal, ImageSignalSender, ImageState,
    ImageTracker, IMAGE_UNAVAILABLE_HINT, IMAGE_UNAVAILABLE_MESSAGE,
};
use crate::record::{Category, DisplayRules, ImageRef, IncidentRecord, Theme};

/// Detail section label for excellence cases.
pub const EXCELLENCE_DETAIL_LABEL: &str = "추진 배경 및 성과";

/// Detail section label for general cases.
pub const GENERAL_DETAIL_LABEL: &str = "사고 발생 경위";

/// Cause section label.
pub const CAUSE_LABEL: &str = "핵심 원인 분석";

/// Countermeasure section label.
pub const COUNTERMEASURE_LABEL: &str = "재발방지 대책 및 시사점";

/// Badge of the effect callout.
pub const KEY_EFFECT_LABEL: &str = "Key Effect";

/// Field reference section label.
pub const FIELD_REFERENCE_LABEL: &str = "Field Reference";

/// What to show in an image slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageView {
    /// Loading placeholder over a requested but hidden image.
    Loading,
    /// The image itself.
    Visible,
    /// Fallback block replacing the image area.
    Unavailable {
        /// Primary message.
        message: &'static str,
        /// Secondary hint.
        hint: &'static str,
    },
}

impl ImageView {
    /// The view for an image state.
    #[must_use]
    pub fn from_state(state: ImageState) -> Self {
        match state {
            ImageState::Pending => Self::Loading,
            ImageState::Loaded => Self::Visible,
            ImageState::Errored => Self::Unavailable {
                message: IMAGE_UNAVAILABLE_MESSAGE,
                hint: IMAGE_UNAVAILABLE_HINT,
            },
        }
    }

    /// Opacity of the image element, or `None` when no image element exists.
    #[must_use]
    pub fn image_opacity(&self) -> Option<f32> {
        match self {
            Self::Loading => Some(0.0),
            Self::Visible => Some(1.0),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether the loading placeholder is shown.
    #[must_use]
    pub fn shows_placeholder(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// One rendered image slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlock {
    /// Resource URL.
    pub url: String,
    /// Caption, synthesized from the position when the record has none.
    pub label: String,
    /// Alternative text of the image element.
    pub alt: String,
    /// Current view of the slot.
    pub view: ImageView,
}

/// Compact card header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardHeader {
    /// Airport with the suffix token removed.
    pub airport: String,
    /// Possibly truncated company name.
    pub company: String,
    /// Display date.
    pub date: String,
}

impl CardHeader {
    /// The `airport · company` line.
    #[must_use]
    pub fn location_line(&self) -> String {
        format!("{} · {}", self.airport, self.company)
    }
}

/// Narrative section with inline images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    /// Section label, depends on the category.
    pub label: &'static str,
    /// Highlighted body.
    pub content: Highlighted,
    /// Inline images.
    pub images: Vec<ImageBlock>,
}

/// A numbered list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedItem {
    /// 1-based position.
    pub number: usize,
    /// Entry text.
    pub text: String,
}

/// Cause section; always present, possibly with no items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseSection {
    /// Section label.
    pub label: &'static str,
    /// Causes in dataset order.
    pub items: Vec<NumberedItem>,
}

/// The effect callout below the countermeasures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEffect {
    /// Badge text.
    pub label: &'static str,
    /// Effect description.
    pub text: String,
}

/// Countermeasure section; always present, possibly with no items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountermeasureSection {
    /// Section label.
    pub label: &'static str,
    /// Countermeasures in dataset order.
    pub items: Vec<String>,
    /// Present iff the record has an effect.
    pub effect: Option<KeyEffect>,
}

/// Trailing image section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldReferenceSection {
    /// Section label.
    pub label: &'static str,
    /// Reference images.
    pub images: Vec<ImageBlock>,
}

/// Everything a case card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCard {
    /// Record id.
    pub id: i64,
    /// Short display id.
    pub display_id: String,
    /// Record category.
    pub category: Category,
    /// Color palette.
    pub theme: Theme,
    /// Header fields.
    pub header: CardHeader,
    /// Highlighted title.
    pub title: Highlighted,
    /// Detail section.
    pub detail: DetailSection,
    /// Cause section.
    pub causes: CauseSection,
    /// Countermeasure section.
    pub countermeasures: CountermeasureSection,
    /// Field reference section, absent when the record has no footer images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_reference: Option<FieldReferenceSection>,
}

impl RenderedCard {
    /// All image slots of the card in display order.
    pub fn image_blocks(&self) -> impl Iterator<Item = &ImageBlock> {
        self.detail.images.iter().chain(
            self.field_reference
                .iter()
                .flat_map(|section| section.images.iter()),
        )
    }

    /// Total number of highlighted matches in title and content.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.title.match_count() + self.detail.content.match_count()
    }
}

/// A card bound to one record, with its own image state.
///
/// Dropping the presenter, or calling [`discard`](Self::discard), ends the
/// card: later image signals are ignored.
#[derive(Debug)]
pub struct CardPresenter {
    record: IncidentRecord,
    rules: DisplayRules,
    tracker: ImageTracker,
    sender: ImageSignalSender,
    receiver: mpsc::UnboundedReceiver<ImageSignal>,
}

impl CardPresenter {
    /// Create a presenter with the default display rules.
    #[must_use]
    pub fn new(record: IncidentRecord) -> Self {
        Self::with_rules(record, DisplayRules::default())
    }

    /// Create a presenter with custom display rules.
    #[must_use]
    pub fn with_rules(record: IncidentRecord, rules: DisplayRules) -> Self {
        let (sender, receiver) = signal_channel();
        Self {
            record,
            rules,
            tracker: ImageTracker::new(),
            sender,
            receiver,
        }
    }

    /// The record shown by this card.
    #[must_use]
    pub fn record(&self) -> &IncidentRecord {
        &self.record
    }

    /// A sender for image outcomes of this card.
    #[must_use]
    pub fn signal_sender(&self) -> ImageSignalSender {
        self.sender.clone()
    }

    /// Apply one image outcome directly. Returns `true` if state changed.
    pub fn handle_signal(&mut self, signal: &ImageSignal) -> bool {
        self.tracker.apply_signal(signal)
    }

    /// Apply all queued image outcomes in arrival order.
    ///
    /// Returns the number of outcomes that changed state.
    pub fn drain_signals(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(signal) = self.receiver.try_recv() {
            if self.tracker.apply_signal(&signal) {
                applied += 1;
            }
        }
        applied
    }

    /// Current state of an image URL on this card.
    #[must_use]
    pub fn image_state(&self, url: &str) -> Option<ImageState> {
        self.tracker.state(url)
    }

    /// Number of image URLs still waiting for an outcome.
    #[must_use]
    pub fn pending_images(&self) -> usize {
        self.tracker.pending_count()
    }

    /// One fetch request per rendered image element, in display order.
    ///
    /// A URL shown twice is requested twice; only the state is shared.
    #[must_use]
    pub fn image_requests(&self) -> Vec<String> {
        self.record
            .resolved_images()
            .into_iter()
            .chain(self.record.footer_images.iter().cloned())
            .map(|image| image.url)
            .collect()
    }

    /// Fetch every image through `loader` and wait for all outcomes.
    ///
    /// Outcomes are queued; call [`drain_signals`](Self::drain_signals) to
    /// apply them. Only images already rendered take an outcome.
    pub async fn load_images(&self, loader: Arc<dyn ImageLoader>) {
        let mut fetches = dispatch_fetches(loader, self.image_requests(), &self.sender);
        while let Some(joined) = fetches.join_next().await {
            if let Err(e) = joined {
                debug!(error = %e, "Image fetch task ended abnormally");
            }
        }
    }

    /// End the card. Queued and future image outcomes are ignored.
    pub fn discard(&mut self) {
        debug!(id = self.record.id, "Discarding card");
        self.receiver.close();
        self.tracker.discard();
    }

    /// Whether the card has been discarded.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.tracker.is_discarded()
    }

    /// Render the card for a search query.
    pub fn render(&mut self, query: &str) -> RenderedCard {
        let highlighter = Highlighter::new(query);
        let record = &self.record;
        let tracker = &mut self.tracker;

        let detail_images = image_blocks(&record.resolved_images(), tracker);
        let field_reference = if record.footer_images.is_empty() {
            None
        } else {
            Some(FieldReferenceSection {
                label: FIELD_REFERENCE_LABEL,
                images: image_blocks(&record.footer_images, tracker),
            })
        };

        RenderedCard {
            id: record.id,
            display_id: record.display_id(),
            category: record.category,
            theme: Theme::for_category(record.category),
            header: CardHeader {
                airport: self.rules.airport(&record.airport),
                company: self.rules.company(&record.company),
                date: record.date.clone(),
            },
            title: highlighter.apply(&record.title),
            detail: DetailSection {
                label: detail_label(record.category),
                content: highlighter.apply(&record.content),
                images: detail_images,
            },
            causes: CauseSection {
                label: CAUSE_LABEL,
                items: record
                    .causes
                    .iter()
                    .enumerate()
                    .map(|(i, text)| NumberedItem {
                        number: i + 1,
                        text: text.clone(),
                    })
                    .collect(),
            },
            countermeasures: CountermeasureSection {
                label: COUNTERMEASURE_LABEL,
                items: record.countermeasures.clone(),
                effect: record.effect.as_ref().map(|text| KeyEffect {
                    label: KEY_EFFECT_LABEL,
                    text: text.clone(),
                }),
            },
            field_reference,
        }
    }
}

/// Render a record with fresh image state.
///
/// Every image shows as loading, since no outcome can have arrived yet.
#[must_use]
pub fn render(record: &IncidentRecord, query: &str) -> RenderedCard {
    CardPresenter::new(record.clone()).render(query)
}

/// Label of the detail section for a category.
#[must_use]
pub fn detail_label(category: Category) -> &'static str {
    match category {
        Category::Excellence => EXCELLENCE_DETAIL_LABEL,
        Category::General => GENERAL_DETAIL_LABEL,
    }
}

fn image_blocks(images: &[ImageRef], tracker: &mut ImageTracker) -> Vec<ImageBlock> {
    images
        .iter()
        .enumerate()
        .map(|(idx, image)| {
            let ordinal = idx + 1;
            let state = tracker.observe(&image.url);
            ImageBlock {
                url: image.url.clone(),
                label: image
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("첨부사진 {ordinal}")),
                alt: image
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("이미지 {ordinal}")),
                view: ImageView::from_state(state),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::LoadOutcome;
    use crate::record::tests::sample_record;

    fn record_with_images() -> IncidentRecord {
        let mut record = sample_record(Category::General, 102);
        record.images = vec![
            ImageRef::new("image/2-01.png"),
            ImageRef::labeled("image/2-02.png", "참고사진"),
        ];
        record.footer_images = vec![ImageRef::labeled("image/2-01.png", "현장사진")];
        record
    }

    #[test]
    fn test_render_derived_fields() {
        let card = render(&sample_record(Category::General, 102), "");
        assert_eq!(card.display_id, "사례-2");
        assert_eq!(card.theme, Theme::Slate);
        assert_eq!(card.header.airport, "김포");
        assert_eq!(card.header.company, "(주)샤프에비에..");
        assert_eq!(card.header.location_line(), "김포 · (주)샤프에비에..");
        assert_eq!(card.header.date, "2023.09.19.(화)");
        assert_eq!(card.detail.label, GENERAL_DETAIL_LABEL);
    }

    #[test]
    fn test_render_excellence_theme_and_label() {
        let card = render(&sample_record(Category::Excellence, 3), "");
        assert_eq!(card.display_id, "우수-3");
        assert_eq!(card.theme, Theme::Emerald);
        assert_eq!(card.detail.label, EXCELLENCE_DETAIL_LABEL);
    }

    #[test]
    fn test_theme_ignores_optional_fields() {
        let mut record = sample_record(Category::Excellence, 1);
        let bare = render(&record, "");
        record.effect = Some("효과".to_string());
        record.footer_images = vec![ImageRef::new("x.png")];
        let full = render(&record, "");
        assert_eq!(bare.theme, full.theme);
    }

    #[test]
    fn test_render_highlights_title_and_content() {
        let card = render(&sample_record(Category::General, 102), "접촉");
        assert_eq!(card.title.match_count(), 1);
        assert_eq!(card.detail.content.match_count(), 1);
        assert_eq!(card.match_count(), 2);
    }

    #[test]
    fn test_causes_numbered_in_order() {
        let mut record = sample_record(Category::General, 104);
        record.causes = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let card = render(&record, "");
        let numbers: Vec<_> = card.causes.items.iter().map(|i| i.number).collect();
        let texts: Vec<_> = card.causes.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(texts, vec!["b", "a", "b"]);
    }

    #[test]
    fn test_empty_lists_keep_sections() {
        let mut record = sample_record(Category::General, 104);
        record.causes.clear();
        record.countermeasures.clear();
        let card = render(&record, "");
        assert_eq!(card.causes.label, CAUSE_LABEL);
        assert!(card.causes.items.is_empty());
        assert_eq!(card.countermeasures.label, COUNTERMEASURE_LABEL);
        assert!(card.countermeasures.items.is_empty());
    }

    #[test]
    fn test_empty_footer_images_omit_section() {
        let card = render(&sample_record(Category::General, 104), "");
        assert!(card.field_reference.is_none());
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("field_reference").is_none());
    }

    #[test]
    fn test_footer_images_render_section() {
        let card = render(&record_with_images(), "");
        let section = card.field_reference.unwrap();
        assert_eq!(section.label, FIELD_REFERENCE_LABEL);
        assert_eq!(section.images.len(), 1);
        assert_eq!(section.images[0].label, "현장사진");
    }

    #[test]
    fn test_effect_callout() {
        let mut record = sample_record(Category::Excellence, 1);
        assert!(render(&record, "").countermeasures.effect.is_none());
        record.effect = Some("이탈 사례 없음".to_string());
        let effect = render(&record, "").countermeasures.effect.unwrap();
        assert_eq!(effect.label, KEY_EFFECT_LABEL);
        assert_eq!(effect.text, "이탈 사례 없음");
    }

    #[test]
    fn test_synthesized_labels() {
        let card = render(&record_with_images(), "");
        assert_eq!(card.detail.images[0].label, "첨부사진 1");
        assert_eq!(card.detail.images[0].alt, "이미지 1");
        assert_eq!(card.detail.images[1].label, "참고사진");
        assert_eq!(card.detail.images[1].alt, "참고사진");
    }

    #[test]
    fn test_legacy_image_url() {
        let mut record = sample_record(Category::Excellence, 1);
        record.image_url = Some("image/best_01.png".to_string());
        let card = render(&record, "");
        assert_eq!(card.detail.images.len(), 1);
        assert_eq!(card.detail.images[0].url, "image/best_01.png");
        assert_eq!(card.detail.images[0].label, "첨부사진 1");
    }

    #[test]
    fn test_fresh_render_is_loading() {
        let card = render(&record_with_images(), "");
        for block in card.image_blocks() {
            assert_eq!(block.view, ImageView::Loading);
            assert!(block.view.shows_placeholder());
            assert_eq!(block.view.image_opacity(), Some(0.0));
        }
    }

    #[test]
    fn test_signals_change_views() {
        let mut presenter = CardPresenter::new(record_with_images());
        presenter.render("");

        let sender = presenter.signal_sender();
        sender.failed("image/2-02.png");
        sender.loaded("image/2-01.png");
        assert_eq!(presenter.drain_signals(), 2);

        let card = presenter.render("");
        assert_eq!(card.detail.images[0].view, ImageView::Visible);
        assert_eq!(
            card.detail.images[1].view,
            ImageView::Unavailable {
                message: IMAGE_UNAVAILABLE_MESSAGE,
                hint: IMAGE_UNAVAILABLE_HINT,
            }
        );
        assert_eq!(card.detail.images[1].view.image_opacity(), None);
    }

    #[test]
    fn test_signal_before_render_is_ignored() {
        let mut presenter = CardPresenter::new(record_with_images());
        presenter.signal_sender().loaded("image/2-01.png");
        assert_eq!(presenter.drain_signals(), 0);
        assert_eq!(presenter.image_state("image/2-01.png"), None);

        let card = presenter.render("");
        assert_eq!(card.detail.images[0].view, ImageView::Loading);
    }

    #[test]
    fn test_shared_url_shares_state() {
        let mut presenter = CardPresenter::new(record_with_images());
        presenter.render("");
        presenter.handle_signal(&ImageSignal::loaded("image/2-01.png"));

        let card = presenter.render("");
        assert_eq!(card.detail.images[0].view, ImageView::Visible);
        assert_eq!(
            card.field_reference.unwrap().images[0].view,
            ImageView::Visible
        );
        assert_eq!(presenter.pending_images(), 1);
    }

    #[test]
    fn test_image_requests_not_deduplicated() {
        let presenter = CardPresenter::new(record_with_images());
        assert_eq!(
            presenter.image_requests(),
            vec!["image/2-01.png", "image/2-02.png", "image/2-01.png"]
        );
    }

    #[test]
    fn test_duplicate_signal_is_noop() {
        let mut presenter = CardPresenter::new(record_with_images());
        presenter.render("");
        let sender = presenter.signal_sender();
        sender.loaded("image/2-02.png");
        sender.failed("image/2-02.png");
        assert_eq!(presenter.drain_signals(), 1);
        assert_eq!(presenter.image_state("image/2-02.png"), Some(ImageState::Loaded));
    }

    #[test]
    fn test_discard_ignores_late_signals() {
        let mut presenter = CardPresenter::new(record_with_images());
        presenter.render("");
        let sender = presenter.signal_sender();
        presenter.discard();
        assert!(presenter.is_discarded());

        assert!(!sender.loaded("image/2-01.png"));
        assert_eq!(presenter.drain_signals(), 0);
        assert!(!presenter.handle_signal(&ImageSignal::failed("image/2-02.png")));
    }

    #[test]
    fn test_dropped_card_ignores_signals() {
        let presenter = CardPresenter::new(record_with_images());
        let sender = presenter.signal_sender();
        drop(presenter);
        assert!(!sender.failed("image/2-01.png"));
    }

    #[test]
    fn test_cards_do_not_share_state() {
        let mut first = CardPresenter::new(record_with_images());
        let mut second = CardPresenter::new(record_with_images());
        first.render("");
        second.render("");
        first.handle_signal(&ImageSignal::failed("image/2-01.png"));
        assert_eq!(first.image_state("image/2-01.png"), Some(ImageState::Errored));
        assert_eq!(second.image_state("image/2-01.png"), Some(ImageState::Pending));
    }

    struct PrefixLoader;

    #[async_trait::async_trait]
    impl ImageLoader for PrefixLoader {
        async fn load(&self, url: &str) -> LoadOutcome {
            if url.ends_with("01.png") {
                LoadOutcome::Loaded
            } else {
                LoadOutcome::Failed
            }
        }
    }

    #[tokio::test]
    async fn test_load_images_then_render() {
        let mut presenter = CardPresenter::new(record_with_images());
        presenter.render("");
        presenter.load_images(Arc::new(PrefixLoader)).await;
        assert_eq!(presenter.drain_signals(), 2);

        let card = presenter.render("");
        let views: Vec<_> = card.image_blocks().map(|b| b.view.clone()).collect();
        assert_eq!(views[0], ImageView::Visible);
        assert!(matches!(views[1], ImageView::Unavailable { .. }));
        assert_eq!(views[2], ImageView::Visible);
        assert_eq!(presenter.pending_images(), 0);
    }
}
