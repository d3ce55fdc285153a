//! Per-card image load tracking.
//!
//! Every image URL shown on a card goes through a small state machine:
//! `Pending` on first render, then `Loaded` or `Errored` when the resource
//! loader reports back. Both outcomes are terminal for the lifetime of the
//! card. State is keyed by the literal URL string, so two references to the
//! same URL on one card share their outcome.
//!
//! Outcomes arrive asynchronously through an [`ImageSignalSender`]. Once the
//! owning card is discarded, further signals are dropped silently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

/// First line of the block shown in place of an image that failed to load.
pub const IMAGE_UNAVAILABLE_MESSAGE: &str = "이미지를 불러올 수 없습니다.";

/// Second line of the block shown in place of an image that failed to load.
pub const IMAGE_UNAVAILABLE_HINT: &str = "네트워크 환경을 확인해주세요.";

/// Load state of one image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    /// Requested, no outcome yet.
    Pending,
    /// The resource loaded successfully.
    Loaded,
    /// The resource could not be loaded.
    Errored,
}

impl ImageState {
    /// Whether no further transition can happen from this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ImageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Loaded => write!(f, "loaded"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

/// Outcome reported by the resource loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// The fetch succeeded.
    Loaded,
    /// The fetch failed.
    Failed,
}

impl LoadOutcome {
    fn target_state(self) -> ImageState {
        match self {
            Self::Loaded => ImageState::Loaded,
            Self::Failed => ImageState::Errored,
        }
    }
}

/// A load outcome for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSignal {
    /// The URL the outcome belongs to.
    pub url: String,
    /// What happened.
    pub outcome: LoadOutcome,
}

impl ImageSignal {
    /// A success signal.
    #[must_use]
    pub fn loaded(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: LoadOutcome::Loaded,
        }
    }

    /// A failure signal.
    #[must_use]
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: LoadOutcome::Failed,
        }
    }
}

/// URL-keyed image state owned by a single card.
#[derive(Debug, Default)]
pub struct ImageTracker {
    states: HashMap<String, ImageState>,
    discarded: bool,
}

impl ImageTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `url` is being rendered and return its current state.
    ///
    /// The first call for a URL creates it in `Pending`.
    pub fn observe(&mut self, url: &str) -> ImageState {
        if let Some(state) = self.states.get(url) {
            return *state;
        }
        if self.discarded {
            return ImageState::Pending;
        }
        trace!(url, "Tracking image");
        self.states.insert(url.to_string(), ImageState::Pending);
        ImageState::Pending
    }

    /// Current state of `url`, if it has been observed.
    #[must_use]
    pub fn state(&self, url: &str) -> Option<ImageState> {
        self.states.get(url).copied()
    }

    /// Apply a loader outcome. Returns `true` if the state changed.
    ///
    /// Outcomes for a URL that was never observed or already reached a
    /// terminal state, and any outcome after [`discard`](Self::discard), are
    /// ignored.
    pub fn apply(&mut self, url: &str, outcome: LoadOutcome) -> bool {
        if self.discarded {
            debug!(url, "Ignoring image signal for discarded card");
            return false;
        }

        let Some(state) = self.states.get_mut(url) else {
            debug!(url, "Ignoring image signal for an image that was never rendered");
            return false;
        };
        if state.is_terminal() {
            debug!(url, state = %state, "Ignoring image signal after terminal state");
            return false;
        }

        *state = outcome.target_state();
        debug!(url, state = %state, "Image state changed");
        true
    }

    /// Apply a signal. Returns `true` if the state changed.
    pub fn apply_signal(&mut self, signal: &ImageSignal) -> bool {
        self.apply(&signal.url, signal.outcome)
    }

    /// Drop all state and ignore every later signal.
    pub fn discard(&mut self) {
        self.states.clear();
        self.discarded = true;
    }

    /// Whether [`discard`](Self::discard) has been called.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Number of tracked URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no URL is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of tracked URLs still waiting for an outcome.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| **s == ImageState::Pending)
            .count()
    }
}

/// Sending half of a card's image signal channel.
///
/// Cheap to clone; hand one to every fetch. Sending to a card that has been
/// discarded or dropped does nothing.
#[derive(Debug, Clone)]
pub struct ImageSignalSender {
    tx: mpsc::UnboundedSender<ImageSignal>,
}

impl ImageSignalSender {
    /// Deliver a signal. Returns `false` if the card is gone.
    pub fn send(&self, signal: ImageSignal) -> bool {
        match self.tx.send(signal) {
            Ok(()) => true,
            Err(mpsc::error::SendError(signal)) => {
                trace!(url = %signal.url, "Card discarded, dropping image signal");
                false
            }
        }
    }

    /// Report a successful load.
    pub fn loaded(&self, url: impl Into<String>) -> bool {
        self.send(ImageSignal::loaded(url))
    }

    /// Report a failed load.
    pub fn failed(&self, url: impl Into<String>) -> bool {
        self.send(ImageSignal::failed(url))
    }

    /// Whether the receiving card is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a signal channel for one card.
#[must_use]
pub fn signal_channel() -> (ImageSignalSender, mpsc::UnboundedReceiver<ImageSignal>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ImageSignalSender { tx }, rx)
}

/// The external collaborator that resolves image URLs.
#[async_trait::async_trait]
pub trait ImageLoader: Send + Sync {
    /// Attempt to fetch `url`.
    async fn load(&self, url: &str) -> LoadOutcome;
}

/// Resolves image URLs as paths under a local asset directory.
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Create a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait::async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, url: &str) -> LoadOutcome {
        let path = self.root.join(url.trim_start_matches('/'));
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => LoadOutcome::Loaded,
            Ok(_) => {
                warn!(path = %path.display(), "Image path is not a file");
                LoadOutcome::Failed
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Image not available");
                LoadOutcome::Failed
            }
        }
    }
}

/// Start one fetch per URL and report each outcome through `sender`.
///
/// Outcomes are sent in completion order, not request order.
pub fn dispatch_fetches(
    loader: Arc<dyn ImageLoader>,
    urls: Vec<String>,
    sender: &ImageSignalSender,
) -> JoinSet<()> {
    let mut set = JoinSet::new();
    for url in urls {
        let loader = Arc::clone(&loader);
        let sender = sender.clone();
        set.spawn(async move {
            let outcome = loader.load(&url).await;
            sender.send(ImageSignal { url, outcome });
        });
    }
    set
}
