//! Branding asset staging for the school-creation wizard.
//!
//! A selected file is validated and kept in memory together with an inline
//! `data:` preview. Nothing is sent to IOMAD until the wizard submits, so a
//! file can be selected, previewed and removed any number of times without
//! a network call.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default upload size limit in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 5;

/// MIME prefix every asset must carry.
pub const IMAGE_MIME_PREFIX: &str = "image/";

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// The three branding slots of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSlot {
    Logo,
    HeaderLogo,
    Favicon,
}

impl AssetSlot {
    /// Slots in the order their uploads are issued at submission.
    pub const ALL: [AssetSlot; 3] = [AssetSlot::Logo, AssetSlot::HeaderLogo, AssetSlot::Favicon];

    /// Parse a slot name as used in URLs.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "logo" => Ok(Self::Logo),
            "headerlogo" => Ok(Self::HeaderLogo),
            "favicon" => Ok(Self::Favicon),
            _ => Err(CoreError::Validation(format!(
                "Invalid asset slot '{s}'. Must be one of: logo, headerlogo, favicon"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::HeaderLogo => "headerlogo",
            Self::Favicon => "favicon",
        }
    }

    /// Company field that receives the uploaded file URL.
    pub fn payload_field(self) -> &'static str {
        match self {
            Self::Logo => "customlogo",
            Self::HeaderLogo => "customheaderlogo",
            Self::Favicon => "customfavicon",
        }
    }

    /// `accept` hint for the file picker.
    pub fn accept(self) -> &'static str {
        match self {
            Self::Favicon => "image/x-icon,image/png",
            Self::Logo | Self::HeaderLogo => "image/*",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Logo => "School Logo",
            Self::HeaderLogo => "Header Logo",
            Self::Favicon => "Favicon",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Limits applied when a file is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetLimits {
    pub max_size_mb: u64,
}

impl Default for AssetLimits {
    fn default() -> Self {
        Self {
            max_size_mb: DEFAULT_MAX_SIZE_MB,
        }
    }
}

impl AssetLimits {
    /// The limit in bytes, saturating at `u64::MAX`.
    pub fn max_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Check MIME type and size of a selected file.
pub fn validate_asset(content_type: &str, size: u64, limits: &AssetLimits) -> Result<(), CoreError> {
    if !content_type.starts_with(IMAGE_MIME_PREFIX) {
        return Err(CoreError::Validation(
            "Please select a valid image file".to_string(),
        ));
    }
    if size > limits.max_bytes() {
        return Err(CoreError::Validation(format!(
            "File size must be less than {}MB",
            limits.max_size_mb
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Staged files
// ---------------------------------------------------------------------------

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A validated file waiting for submission, with its inline preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAsset {
    pub file: AssetFile,
    /// `data:<mime>;base64,<payload>` URL suitable for an `<img src>`.
    pub preview: String,
}

impl StagedAsset {
    /// Validate a file and build its preview.
    pub fn stage(file: AssetFile, limits: &AssetLimits) -> Result<Self, CoreError> {
        validate_asset(&file.content_type, file.bytes.len() as u64, limits)?;
        let preview = data_url(&file.content_type, &file.bytes);
        Ok(Self { file, preview })
    }
}

/// Encode bytes as a `data:` URL.
pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

/// Per-slot staging area owned by one wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSlots {
    logo: Option<StagedAsset>,
    header_logo: Option<StagedAsset>,
    favicon: Option<StagedAsset>,
}

impl AssetSlots {
    pub fn get(&self, slot: AssetSlot) -> Option<&StagedAsset> {
        self.slot(slot).as_ref()
    }

    /// Stage a file into a slot, replacing any previous selection.
    pub fn set(&mut self, slot: AssetSlot, asset: StagedAsset) {
        *self.slot_mut(slot) = Some(asset);
    }

    /// Drop the selection for a slot. Returns whether anything was staged.
    pub fn remove(&mut self, slot: AssetSlot) -> bool {
        self.slot_mut(slot).take().is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        AssetSlot::ALL.iter().all(|s| self.get(*s).is_none())
    }

    /// Staged assets in upload order.
    pub fn staged(&self) -> impl Iterator<Item = (AssetSlot, &StagedAsset)> {
        AssetSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|a| (slot, a)))
    }

    fn slot(&self, slot: AssetSlot) -> &Option<StagedAsset> {
        match slot {
            AssetSlot::Logo => &self.logo,
            AssetSlot::HeaderLogo => &self.header_logo,
            AssetSlot::Favicon => &self.favicon,
        }
    }

    fn slot_mut(&mut self, slot: AssetSlot) -> &mut Option<StagedAsset> {
        match slot {
            AssetSlot::Logo => &mut self.logo,
            AssetSlot::HeaderLogo => &mut self.header_logo,
            AssetSlot::Favicon => &mut self.favicon,
        }
    }
}
