use std::time::Duration;

use schoolhub_core::assets::AssetLimits;
use schoolhub_core::wizard::WizardSettings;
use schoolhub_iomad::rpc::DEFAULT_SERVICE;
use schoolhub_iomad::IomadConfig;

use crate::auth::jwt::JwtConfig;
use crate::drafts::{DraftLimits, DEFAULT_MAX_PER_OWNER};

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub jwt: JwtConfig,
    /// Web-service site and credential. The token never leaves the server.
    pub iomad: IomadConfig,
    /// Largest accepted branding image in megabytes (default: `5`).
    pub asset_max_size_mb: u64,
    /// Pause between a successful creation and closing the draft (default: `1500`).
    pub submit_success_delay_ms: u64,
    /// Idle time before an open draft is evicted (default: `3600`).
    pub draft_idle_timeout_secs: u64,
    /// Open drafts one user may hold (default: `3`).
    pub max_drafts_per_user: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `IOMAD_BASE_URL`          | **required**            |
    /// | `IOMAD_TOKEN`             | **required**            |
    /// | `IOMAD_SERVICE`           | `moodle_mobile_app`     |
    /// | `IOMAD_TIMEOUT_SECS`      | unset                   |
    /// | `ASSET_MAX_SIZE_MB`       | `5`                     |
    /// | `SUBMIT_SUCCESS_DELAY_MS` | `1500`                  |
    /// | `DRAFT_IDLE_TIMEOUT_SECS` | `3600`                  |
    /// | `MAX_DRAFTS_PER_USER`     | `3`                     |
    ///
    /// # Panics
    ///
    /// Panics on a missing required variable or an unparsable value.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let asset_max_size_mb: u64 = std::env::var("ASSET_MAX_SIZE_MB")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("ASSET_MAX_SIZE_MB must be a valid u64");

        let submit_success_delay_ms: u64 = std::env::var("SUBMIT_SUCCESS_DELAY_MS")
            .unwrap_or_else(|_| "1500".into())
            .parse()
            .expect("SUBMIT_SUCCESS_DELAY_MS must be a valid u64");

        let draft_idle_timeout_secs: u64 = std::env::var("DRAFT_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("DRAFT_IDLE_TIMEOUT_SECS must be a valid u64");

        let max_drafts_per_user: usize = std::env::var("MAX_DRAFTS_PER_USER")
            .map(|v| v.parse().expect("MAX_DRAFTS_PER_USER must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_PER_OWNER);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            iomad: iomad_from_env(),
            asset_max_size_mb,
            submit_success_delay_ms,
            draft_idle_timeout_secs,
            max_drafts_per_user,
        }
    }

    pub fn asset_limits(&self) -> AssetLimits {
        AssetLimits {
            max_size_mb: self.asset_max_size_mb,
        }
    }

    /// Settings handed to every new creation wizard.
    pub fn wizard_settings(&self) -> WizardSettings {
        WizardSettings {
            limits: self.asset_limits(),
            success_delay: Duration::from_millis(self.submit_success_delay_ms),
            ..WizardSettings::default()
        }
    }

    pub fn draft_limits(&self) -> DraftLimits {
        DraftLimits {
            idle_timeout: Duration::from_secs(self.draft_idle_timeout_secs),
            max_per_owner: self.max_drafts_per_user,
        }
    }

    /// Request body limit for asset uploads: the image limit plus room for
    /// multipart framing.
    pub fn upload_body_limit(&self) -> usize {
        const MULTIPART_OVERHEAD: u64 = 64 * 1024;
        let bytes = self.asset_limits().max_bytes().saturating_add(MULTIPART_OVERHEAD);
        usize::try_from(bytes).unwrap_or(usize::MAX)
    }
}

fn iomad_from_env() -> IomadConfig {
    let base_url =
        std::env::var("IOMAD_BASE_URL").expect("IOMAD_BASE_URL must be set in the environment");
    let token = std::env::var("IOMAD_TOKEN").expect("IOMAD_TOKEN must be set in the environment");
    assert!(!token.is_empty(), "IOMAD_TOKEN must not be empty");

    let service = std::env::var("IOMAD_SERVICE").unwrap_or_else(|_| DEFAULT_SERVICE.into());

    let timeout = std::env::var("IOMAD_TIMEOUT_SECS").ok().map(|v| {
        Duration::from_secs(v.parse().expect("IOMAD_TIMEOUT_SECS must be a valid u64"))
    });

    IomadConfig {
        base_url,
        token,
        service,
        timeout,
    }
}
