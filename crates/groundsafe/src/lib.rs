//! `groundsafe` - Ground-safety case catalog and statistics dashboard
//!
//! This library turns a static catalog of aviation ground-safety cases into
//! card view models (derived display fields, search highlighting, per-image
//! load state) and the accident statistics into a dashboard view model.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod card;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod highlight;
pub mod image;
pub mod logging;
pub mod record;
pub mod stats;
pub mod view;

pub use card::{render, CardPresenter, ImageView, RenderedCard};
pub use catalog::{Catalog, CatalogFilter};
pub use config::Config;
pub use dataset::{Dataset, SafetyGoal};
pub use error::{Error, Result};
pub use highlight::{highlight, Highlighted, Highlighter, Segment};
pub use image::{FsImageLoader, ImageLoader, ImageSignal, ImageState, ImageTracker, LoadOutcome};
pub use logging::init_logging;
pub use record::{Category, ImageRef, IncidentRecord, Theme};
pub use stats::{build_dashboard, AirportStat, DashboardView, YearStat};
