//! Theme presets offered when creating a school.
//!
//! The list is fixed. The first preset has an empty `value`, which IOMAD
//! treats as "use the site default theme", and is selected by default.

use serde::Serialize;

use crate::error::CoreError;

/// Number of feature tags shown on a theme card before collapsing the rest
/// into a `+N more` counter.
pub const VISIBLE_FEATURE_COUNT: usize = 3;

/// Colour swatches displayed over the preview image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

/// A selectable theme preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeOption {
    /// Value stored in the company's `theme` field.
    pub value: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Preview image path, served by the front end.
    pub preview: &'static str,
    pub colors: ThemeColors,
    pub features: &'static [&'static str],
}

impl ThemeOption {
    /// Feature tags shown directly on the card.
    pub fn visible_features(&self) -> &'static [&'static str] {
        &self.features[..self.features.len().min(VISIBLE_FEATURE_COUNT)]
    }

    /// How many tags are folded into the `+N more` counter.
    pub fn hidden_feature_count(&self) -> usize {
        self.features.len().saturating_sub(VISIBLE_FEATURE_COUNT)
    }
}

static THEMES: [ThemeOption; 5] = [
    ThemeOption {
        value: "",
        name: "Default",
        description: "The site-wide default theme",
        preview: "/themes/default.png",
        colors: ThemeColors {
            primary: "#1e40af",
            secondary: "#64748b",
            accent: "#f59e0b",
        },
        features: &["Site default", "Responsive", "Accessible"],
    },
    ThemeOption {
        value: "boost",
        name: "Boost",
        description: "Modern Bootstrap-based layout with a collapsible drawer",
        preview: "/themes/boost.png",
        colors: ThemeColors {
            primary: "#0f6cbf",
            secondary: "#ced4da",
            accent: "#f0ad4e",
        },
        features: &["Responsive", "Course index drawer", "Dark mode", "Custom SCSS"],
    },
    ThemeOption {
        value: "classic",
        name: "Classic",
        description: "Traditional block-based layout",
        preview: "/themes/classic.png",
        colors: ThemeColors {
            primary: "#1177d1",
            secondary: "#e5e5e5",
            accent: "#d9534f",
        },
        features: &["Side blocks", "Familiar navigation", "Responsive"],
    },
    ThemeOption {
        value: "iomad",
        name: "IOMAD",
        description: "Multi-tenant theme with per-company branding",
        preview: "/themes/iomad.png",
        colors: ThemeColors {
            primary: "#2b6cb0",
            secondary: "#edf2f7",
            accent: "#38a169",
        },
        features: &[
            "Company logos",
            "Custom colours",
            "Tenant CSS",
            "Responsive",
            "Header logo",
        ],
    },
    ThemeOption {
        value: "academi",
        name: "Academi",
        description: "Clean landing pages for schools and academies",
        preview: "/themes/academi.png",
        colors: ThemeColors {
            primary: "#7c3aed",
            secondary: "#f3f4f6",
            accent: "#ec4899",
        },
        features: &["Landing page", "Slideshow", "Marketing blocks", "Responsive"],
    },
];

/// All presets, in display order.
pub fn available_themes() -> &'static [ThemeOption] {
    &THEMES
}

/// The preset selected when a wizard opens or resets.
pub fn default_theme() -> &'static ThemeOption {
    &THEMES[0]
}

/// Look up a preset by its stored value.
pub fn find_theme(value: &str) -> Result<&'static ThemeOption, CoreError> {
    THEMES.iter().find(|t| t.value == value).ok_or_else(|| {
        CoreError::Validation(format!("Unknown theme '{value}'"))
    })
}
