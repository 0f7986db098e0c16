//! The three-step school creation wizard.
//!
//! Step 1 collects identity and location, step 2 branding assets and the
//! theme, step 3 policy settings. Only the step 1 → 2 transition is gated
//! (by [`SchoolDraft::validate_identity`]); going back is always allowed.
//!
//! Submission uploads each staged asset one after another, then creates the
//! company. A failed asset upload never blocks creation: the asset is left
//! out of the payload and reported as a non-blocking warning. Any failure of
//! the creation call itself leaves the wizard open and editable for retry.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetFile, AssetLimits, AssetSlot, AssetSlots, StagedAsset};
use crate::error::CoreError;
use crate::gateway::{CompanyGateway, GatewayError, UploadTarget};
use crate::school::{AssetUrls, School, SchoolDraft};
use crate::themes::{self, ThemeOption};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationStep {
    Identity,
    Branding,
    Policy,
}

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 3;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 3;

impl CreationStep {
    /// Convert a 1-based step number to a `CreationStep`.
    pub fn from_number(n: u8) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Identity),
            2 => Ok(Self::Branding),
            3 => Ok(Self::Policy),
            _ => Err(CoreError::Validation(format!(
                "Invalid step number {n}. Must be between {MIN_STEP} and {MAX_STEP}"
            ))),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::Identity => 1,
            Self::Branding => 2,
            Self::Policy => 3,
        }
    }

    /// Heading shown above the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Basic Information",
            Self::Branding => "Branding & Assets",
            Self::Policy => "Configuration & Settings",
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_number(self.to_number() + 1).ok()
    }

    fn previous(self) -> Option<Self> {
        Self::from_number(self.to_number().saturating_sub(1)).ok()
    }
}

// ---------------------------------------------------------------------------
// Field changes
// ---------------------------------------------------------------------------

/// A batch of field edits. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftChanges {
    pub name: Option<String>,
    pub shortname: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub code: Option<String>,
    pub maxusers: Option<i64>,
    /// Calendar date for `validto`; `Some(None)` clears it.
    #[serde(default, with = "optional_date")]
    pub valid_until: Option<Option<NaiveDate>>,
    pub ecommerce: Option<bool>,
    pub suspended: Option<bool>,
}

impl DraftChanges {
    fn apply(self, draft: &mut SchoolDraft) {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.shortname {
            draft.shortname = v;
        }
        if let Some(v) = self.city {
            draft.city = v;
        }
        if let Some(v) = self.country {
            draft.country = v;
        }
        if let Some(v) = self.region {
            draft.region = v;
        }
        if let Some(v) = self.code {
            draft.code = v;
        }
        if let Some(v) = self.maxusers {
            draft.set_max_users(v);
        }
        if let Some(v) = self.valid_until {
            draft.set_valid_until(v);
        }
        if let Some(v) = self.ecommerce {
            draft.ecommerce = v;
        }
        if let Some(v) = self.suspended {
            draft.suspended = v;
        }
    }
}

/// `"2027-06-30"` sets a date, `null` or `""` clears it, absence leaves it.
mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(Some(None)),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| Some(Some(d)))
                .map_err(serde::de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Submission results
// ---------------------------------------------------------------------------

/// Message shown once the company exists.
pub const SUCCESS_MESSAGE: &str = "School created successfully!";

/// Pause between the success message and closing the wizard.
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(1500);

/// An asset that could not be attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetWarning {
    pub slot: AssetSlot,
    pub message: String,
}

/// A successfully created school.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub school: School,
    pub warnings: Vec<AssetWarning>,
}

/// Why a submission did not produce a school.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Creation wizard is not open")]
    NotOpen,

    /// A required field is missing; no network call was made.
    #[error("{0}")]
    Invalid(String),

    /// The creation call failed.
    #[error("{}", .0.user_message())]
    Remote(GatewayError),
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// Knobs that are fixed for the lifetime of a wizard.
#[derive(Debug, Clone)]
pub struct WizardSettings {
    pub limits: AssetLimits,
    pub upload_target: UploadTarget,
    pub success_delay: Duration,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            limits: AssetLimits::default(),
            upload_target: UploadTarget::default(),
            success_delay: DEFAULT_SUCCESS_DELAY,
        }
    }
}

/// Form state for creating one school.
#[derive(Debug, Clone)]
pub struct SchoolWizard {
    settings: WizardSettings,
    open: bool,
    step: CreationStep,
    draft: SchoolDraft,
    theme: &'static ThemeOption,
    assets: AssetSlots,
    error: Option<String>,
    success: Option<String>,
    loading: bool,
}

impl SchoolWizard {
    /// A closed wizard with an empty draft.
    pub fn new(settings: WizardSettings) -> Self {
        Self {
            settings,
            open: false,
            step: CreationStep::Identity,
            draft: SchoolDraft::default(),
            theme: themes::default_theme(),
            assets: AssetSlots::default(),
            error: None,
            success: None,
            loading: false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Discard everything and hide the wizard.
    pub fn close(&mut self) {
        self.reset();
        self.open = false;
    }

    /// Return every field to its default, back on step 1 with no previews.
    pub fn reset(&mut self) {
        self.step = CreationStep::Identity;
        self.draft = SchoolDraft::default();
        self.theme = themes::default_theme();
        self.assets.clear();
        self.error = None;
        self.success = None;
        self.loading = false;
    }

    pub fn step(&self) -> CreationStep {
        self.step
    }

    pub fn draft(&self) -> &SchoolDraft {
        &self.draft
    }

    pub fn theme(&self) -> &'static ThemeOption {
        self.theme
    }

    pub fn assets(&self) -> &AssetSlots {
        &self.assets
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    // -- editing --

    /// Apply field edits. Any edit clears the current error.
    pub fn apply_changes(&mut self, changes: DraftChanges) {
        changes.apply(&mut self.draft);
        self.error = None;
    }

    /// Select a theme preset by value.
    pub fn select_theme(&mut self, value: &str) -> Result<(), CoreError> {
        let theme = themes::find_theme(value)?;
        self.theme = theme;
        self.draft.theme = theme.value.to_string();
        self.error = None;
        Ok(())
    }

    /// Validate and stage a file for a slot. Makes no network call.
    pub fn select_asset(&mut self, slot: AssetSlot, file: AssetFile) -> Result<(), CoreError> {
        let staged = StagedAsset::stage(file, &self.settings.limits)?;
        self.assets.set(slot, staged);
        self.error = None;
        Ok(())
    }

    /// Drop a staged file. Returns whether the slot held one.
    pub fn remove_asset(&mut self, slot: AssetSlot) -> bool {
        self.error = None;
        self.assets.remove(slot)
    }

    // -- navigation --

    /// Run the step 1 checks, recording the first failure as the error.
    pub fn validate_identity(&mut self) -> bool {
        match self.draft.validate_identity() {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(validation_message(e));
                false
            }
        }
    }

    /// Advance one step. Leaving step 1 requires valid identity fields.
    /// Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        if self.step == CreationStep::Identity && !self.validate_identity() {
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Go back one step. Returns whether the step changed.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    // -- submission --

    /// Upload staged assets, create the company, and close on success.
    ///
    /// Invalid identity fields send the wizard back to step 1 without any
    /// network call. On success the success message is held for the
    /// configured delay before `on_success` runs and the wizard closes.
    pub async fn submit<F>(
        &mut self,
        gateway: &dyn CompanyGateway,
        on_success: F,
    ) -> Result<Submission, SubmitError>
    where
        F: FnOnce(&School),
    {
        if !self.open {
            return Err(SubmitError::NotOpen);
        }
        if !self.validate_identity() {
            self.step = CreationStep::Identity;
            let message = self.error.clone().unwrap_or_default();
            return Err(SubmitError::Invalid(message));
        }

        self.loading = true;
        self.error = None;
        self.success = None;

        let (urls, warnings) = self.upload_assets(gateway).await;
        let payload = self.draft.to_payload(urls);

        tracing::info!(
            shortname = %payload.shortname,
            code = %payload.code,
            assets_attached = self.assets.staged().count() - warnings.len(),
            "Creating school"
        );

        let record = match gateway.create_company(&payload).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "School creation failed");
                self.error = Some(err.user_message());
                self.loading = false;
                return Err(SubmitError::Remote(err));
            }
        };

        self.loading = false;
        self.success = Some(SUCCESS_MESSAGE.to_string());
        let school = School::from_record(&record);
        tracing::info!(school_id = record.id, name = %record.name, "School created");

        if !self.settings.success_delay.is_zero() {
            tokio::time::sleep(self.settings.success_delay).await;
        }
        on_success(&school);
        self.close();

        Ok(Submission { school, warnings })
    }

    /// Upload staged files in slot order, collecting URLs and failures.
    async fn upload_assets(&self, gateway: &dyn CompanyGateway) -> (AssetUrls, Vec<AssetWarning>) {
        let mut urls = AssetUrls::default();
        let mut warnings = Vec::new();

        for (slot, staged) in self.assets.staged() {
            match gateway
                .upload_file(&staged.file, &self.settings.upload_target)
                .await
            {
                Ok(url) => {
                    tracing::debug!(slot = slot.as_str(), %url, "Asset uploaded");
                    let target = match slot {
                        AssetSlot::Logo => &mut urls.logo,
                        AssetSlot::HeaderLogo => &mut urls.header_logo,
                        AssetSlot::Favicon => &mut urls.favicon,
                    };
                    *target = Some(url);
                }
                Err(err) => {
                    tracing::warn!(
                        slot = slot.as_str(),
                        filename = %staged.file.filename,
                        error = %err,
                        "Asset upload failed; continuing without it"
                    );
                    warnings.push(AssetWarning {
                        slot,
                        message: format!("{} could not be uploaded", slot.title()),
                    });
                }
            }
        }

        (urls, warnings)
    }

    // -- snapshot --

    /// Serializable snapshot of the wizard.
    pub fn view(&self) -> DraftView {
        DraftView {
            open: self.open,
            step: self.step.to_number(),
            step_label: self.step.label(),
            total_steps: TOTAL_STEPS,
            draft: self.draft.clone(),
            valid_until: self.draft.valid_until(),
            theme: *self.theme,
            assets: self
                .assets
                .staged()
                .map(|(slot, staged)| AssetPreview {
                    slot,
                    filename: staged.file.filename.clone(),
                    content_type: staged.file.content_type.clone(),
                    size: staged.file.bytes.len(),
                    preview: staged.preview.clone(),
                })
                .collect(),
            error: self.error.clone(),
            success: self.success.clone(),
            loading: self.loading,
        }
    }
}

fn validation_message(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) => msg,
        other => other.to_string(),
    }
}

/// Preview of a staged asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetPreview {
    pub slot: AssetSlot,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub preview: String,
}

/// Snapshot of a wizard for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftView {
    pub open: bool,
    pub step: u8,
    pub step_label: &'static str,
    pub total_steps: u8,
    pub draft: SchoolDraft,
    pub valid_until: Option<NaiveDate>,
    pub theme: ThemeOption,
    pub assets: Vec<AssetPreview>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub loading: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
