//! Presence update payloads (op 3)
//!
//! Outbound only. Required fields are plain fields; everything else is optional
//! and omitted from the wire when unset.

use serde::{Deserialize, Serialize};

/// Payload for op 3 (Presence Update)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    pub activities: Vec<Activity>,
    pub afk: bool,
    /// Unix time (ms) since the client went idle, 0 if not idle
    pub since: i64,
    /// online, idle, dnd, invisible or offline
    pub status: String,
}

impl Presence {
    /// Valid status values
    pub const VALID_STATUSES: &'static [&'static str] =
        &["online", "idle", "dnd", "invisible", "offline"];

    #[must_use]
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            activities: Vec::new(),
            afk: false,
            since: 0,
            status: status.into(),
        }
    }

    /// Presence announced when the client shuts down
    #[must_use]
    pub fn offline() -> Self {
        Self::new("offline")
    }

    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Mark the client idle starting now
    #[must_use]
    pub fn idle_since_now(mut self) -> Self {
        self.afk = true;
        self.since = chrono::Utc::now().timestamp_millis();
        self
    }

    /// Check if the status is valid
    #[must_use]
    pub fn is_valid_status(&self) -> bool {
        Self::VALID_STATUSES.contains(&self.status.as_str())
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new("online")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub application_id: String,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Timestamps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Activity {
    #[must_use]
    pub fn new(application_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            name: Some(name.into()),
            state: None,
            details: None,
            kind: Some(0),
            timestamps: None,
            assets: None,
            buttons: None,
            metadata: None,
            url: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: u8) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self, start: i64, end: i64) -> Self {
        self.timestamps = Some(Timestamps { start, end });
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: Assets) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Attach buttons; labels go in `buttons`, targets in `metadata.buttonUrls`
    #[must_use]
    pub fn with_buttons(mut self, buttons: Vec<(String, String)>) -> Self {
        let (labels, urls) = buttons.into_iter().unzip();
        self.buttons = Some(labels);
        self.metadata = Some(Metadata {
            button_urls: Some(urls),
        });
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    pub large_image: Option<String>,
    pub small_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub button_urls: Option<Vec<String>>,
}
