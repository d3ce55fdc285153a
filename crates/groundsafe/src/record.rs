//! Case record types and their derived display fields.
//!
//! A case record is one entry of the ground-safety catalog: either an
//! excellence case (a good practice worth sharing) or a general incident. The
//! record is immutable input; everything shown on a card that is not copied
//! verbatim is derived here by pure functions.

use serde::{Deserialize, Serialize};

/// Offset subtracted from general case ids when building their display id.
///
/// General cases are numbered from 101 in the dataset so that their ids never
/// collide with excellence cases.
pub const GENERAL_ID_OFFSET: i64 = 100;

/// Default maximum number of company name characters shown on a card header.
pub const COMPANY_MAX_CHARS: usize = 8;

/// Marker appended to a truncated company name.
pub const ELLIPSIS: &str = "..";

/// Suffix token ("airport") stripped from airport names for compact display.
pub const AIRPORT_SUFFIX: &str = "공항";

/// The kind of case a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// A best-practice case.
    Excellence,
    /// An incident case.
    General,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellence => write!(f, "excellence"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Color palette of a card, chosen once from its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Green palette used by excellence cases.
    Emerald,
    /// Neutral palette used by general cases.
    Slate,
}

impl Theme {
    /// Select the theme for a category.
    #[must_use]
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Excellence => Self::Emerald,
            Category::General => Self::Slate,
        }
    }
}

/// A reference to an image attached to a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Opaque resource locator.
    pub url: String,

    /// Caption shown above the image, if the dataset provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ImageRef {
    /// Create an image reference without a label.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
        }
    }

    /// Create an image reference with a label.
    #[must_use]
    pub fn labeled(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: Some(label.into()),
        }
    }
}

/// One case of the catalog.
///
/// Field names follow the catalog document format, so `category` is read from
/// `type` and the list fields from their singular names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Dataset-unique identifier.
    pub id: i64,

    /// Excellence or general case.
    #[serde(rename = "type")]
    pub category: Category,

    /// Case title.
    pub title: String,

    /// Ground handling company involved.
    pub company: String,

    /// Airport where the case happened.
    pub airport: String,

    /// Display date, never parsed.
    pub date: String,

    /// Narrative body.
    pub content: String,

    /// Root causes, in the order they should be listed.
    #[serde(rename = "cause", default)]
    pub causes: Vec<String>,

    /// Countermeasures, in the order they should be listed.
    #[serde(rename = "countermeasure", default)]
    pub countermeasures: Vec<String>,

    /// Observed effect of the countermeasures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,

    /// Inline images of the detail section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,

    /// Legacy single image, used only when `images` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Images of the trailing field reference section.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footer_images: Vec<ImageRef>,
}

impl IncidentRecord {
    /// The display id of this record.
    #[must_use]
    pub fn display_id(&self) -> String {
        display_id(self.category, self.id)
    }

    /// The images of the detail section, with the legacy field normalized.
    #[must_use]
    pub fn resolved_images(&self) -> Vec<ImageRef> {
        resolved_images(self)
    }

    /// Whether the record carries a field reference section.
    #[must_use]
    pub fn has_footer_images(&self) -> bool {
        !self.footer_images.is_empty()
    }
}

/// Build the short display id for a record.
///
/// Excellence cases render as `우수-<id>`, general cases as `사례-<id - 100>`.
#[must_use]
pub fn display_id(category: Category, id: i64) -> String {
    match category {
        Category::Excellence => format!("우수-{id}"),
        Category::General => format!("사례-{}", id - GENERAL_ID_OFFSET),
    }
}

/// Resolve the detail images of a record.
#[must_use]
pub fn resolved_images(record: &IncidentRecord) -> Vec<ImageRef> {
    if !record.images.is_empty() {
        record.images.clone()
    } else if let Some(url) = &record.image_url {
        vec![ImageRef::new(url.clone())]
    } else {
        Vec::new()
    }
}

/// Rules for the compact header fields of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRules {
    /// Company names longer than this many characters are truncated.
    pub company_max_chars: usize,
    /// Marker appended after truncation.
    pub ellipsis: String,
    /// Token removed from airport names.
    pub airport_suffix: String,
}

impl Default for DisplayRules {
    fn default() -> Self {
        Self {
            company_max_chars: COMPANY_MAX_CHARS,
            ellipsis: ELLIPSIS.to_string(),
            airport_suffix: AIRPORT_SUFFIX.to_string(),
        }
    }
}

impl DisplayRules {
    /// Shorten a company name for the card header.
    #[must_use]
    pub fn company(&self, company: &str) -> String {
        if company.chars().count() > self.company_max_chars {
            let head: String = company.chars().take(self.company_max_chars).collect();
            format!("{head}{}", self.ellipsis)
        } else {
            company.to_string()
        }
    }

    /// Strip the airport suffix token from an airport name.
    #[must_use]
    pub fn airport(&self, airport: &str) -> String {
        if self.airport_suffix.is_empty() {
            return airport.to_string();
        }
        airport.replacen(&self.airport_suffix, "", 1)
    }
}

/// Shorten a company name using the default rules.
#[must_use]
pub fn display_company(company: &str) -> String {
    DisplayRules::default().company(company)
}

/// Strip the airport suffix using the default rules.
#[must_use]
pub fn display_airport(airport: &str) -> String {
    DisplayRules::default().airport(airport)
}
