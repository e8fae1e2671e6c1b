//! Template registry and renderer.
//!
//! A template is a fixed pairing of a document skeleton with a stylesheet.
//! Several keys share the same skeleton and differ only in `css_path`, so
//! rendering is a single function dispatched on `Skeleton`.

pub mod document;
pub mod markup;
pub mod profile_card;
pub mod stylesheets;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::profile::record::ProfileRecord;

pub use stylesheets::StylesheetCache;

/// Stylesheet reference emitted by every skeleton. The inliner swaps this
/// exact tag for a `<style>` block.
pub const STYLESHEET_TAG: &str = r#"<link rel="stylesheet" href="style.css">"#;
/// Script reference emitted by every skeleton. The inliner swaps this
/// exact tag for an inline `<script>` block.
pub const SCRIPT_TAG: &str = r#"<script src="script.js"></script>"#;

/// Key under which a template is selected and persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKey {
    #[default]
    First = 0,
    Second = 1,
    Third = 2,
    // Persisted documents carry the "forth" spelling.
    #[serde(rename = "forth", alias = "fourth")]
    Fourth = 3,
    Fifth = 4,
    Stylish = 5,
    Simple = 6,
}

impl TemplateKey {
    pub const ALL: [TemplateKey; 7] = [
        TemplateKey::First,
        TemplateKey::Second,
        TemplateKey::Third,
        TemplateKey::Fourth,
        TemplateKey::Fifth,
        TemplateKey::Stylish,
        TemplateKey::Simple,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKey::First => "first",
            TemplateKey::Second => "second",
            TemplateKey::Third => "third",
            TemplateKey::Fourth => "forth",
            TemplateKey::Fifth => "fifth",
            TemplateKey::Stylish => "stylish",
            TemplateKey::Simple => "simple",
        }
    }

    pub fn descriptor(self) -> &'static TemplateDescriptor {
        &TEMPLATES[self as usize]
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTemplate(pub String);

impl fmt::Display for UnknownTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown template '{}'", self.0)
    }
}

impl std::error::Error for UnknownTemplate {}

impl FromStr for TemplateKey {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fourth" => Ok(TemplateKey::Fourth),
            other => TemplateKey::ALL
                .into_iter()
                .find(|k| k.as_str() == other)
                .ok_or_else(|| UnknownTemplate(other.to_string())),
        }
    }
}

/// Document skeletons. Each owns its markup layout and its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skeleton {
    /// Navigation bar, profile rows, hobby/skill boxes, Q&A blocks.
    ProfileCard,
    /// Plain document with headings and a collapsible FAQ.
    Document,
}

#[derive(Debug)]
pub struct TemplateDescriptor {
    pub key: TemplateKey,
    pub display_name: &'static str,
    pub skeleton: Skeleton,
    /// Stylesheet location relative to the asset root.
    pub css_path: &'static str,
    /// Fixed images the skeleton references as `img/<name>`.
    pub static_assets: &'static [&'static str],
}

const PROFILE_CARD_ASSETS: &[&str] = &["logo.png", "english-icon.png"];

/// Indexed by `TemplateKey as usize`.
pub const TEMPLATES: &[TemplateDescriptor] = &[
    TemplateDescriptor {
        key: TemplateKey::First,
        display_name: "色1 📄",
        skeleton: Skeleton::ProfileCard,
        css_path: "css/pattern1.css",
        static_assets: PROFILE_CARD_ASSETS,
    },
    TemplateDescriptor {
        key: TemplateKey::Second,
        display_name: "色2 📄",
        skeleton: Skeleton::ProfileCard,
        css_path: "css/pattern2.css",
        static_assets: PROFILE_CARD_ASSETS,
    },
    TemplateDescriptor {
        key: TemplateKey::Third,
        display_name: "色3 📄",
        skeleton: Skeleton::ProfileCard,
        css_path: "css/pattern3.css",
        static_assets: PROFILE_CARD_ASSETS,
    },
    TemplateDescriptor {
        key: TemplateKey::Fourth,
        display_name: "色4 📄",
        skeleton: Skeleton::ProfileCard,
        css_path: "css/pattern4.css",
        static_assets: PROFILE_CARD_ASSETS,
    },
    TemplateDescriptor {
        key: TemplateKey::Fifth,
        display_name: "色5 📄",
        skeleton: Skeleton::ProfileCard,
        css_path: "css/pattern5.css",
        static_assets: PROFILE_CARD_ASSETS,
    },
    TemplateDescriptor {
        key: TemplateKey::Stylish,
        display_name: "スタイリッシュ",
        skeleton: Skeleton::Document,
        css_path: "css/stylish.css",
        static_assets: &[],
    },
    TemplateDescriptor {
        key: TemplateKey::Simple,
        display_name: "シンプル",
        skeleton: Skeleton::Document,
        css_path: "css/simple.css",
        static_assets: &[],
    },
];

/// The three static text outputs of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSite {
    pub html: String,
    pub css: String,
    pub js: String,
}

/// Renders `record` with the given template. Pure: identical inputs give
/// byte-identical output.
///
/// `image_filename` is inserted verbatim as `img/<name>`; callers must pass
/// an already validated basename.
pub fn render(
    descriptor: &TemplateDescriptor,
    record: &ProfileRecord,
    image_filename: Option<&str>,
    css: &str,
) -> RenderedSite {
    let (html, js) = match descriptor.skeleton {
        Skeleton::ProfileCard => (
            profile_card::render_html(record, image_filename),
            profile_card::SCRIPT,
        ),
        Skeleton::Document => (
            document::render_html(record, image_filename),
            document::SCRIPT,
        ),
    };

    RenderedSite {
        html,
        css: css.to_string(),
        js: js.to_string(),
    }
}
