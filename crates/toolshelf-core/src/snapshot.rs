//! Snapshot document
//!
//! The versioned JSON interchange format written by export and read by
//! import. Keys are camelCase; optional website fields are omitted when
//! absent. Ids inside a snapshot belong to the store that produced it.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::error::{TransferError, TransferResult};
use crate::models::{Category, Tag, Website};

/// Snapshot format version written by this crate and the only one it reads
pub const SNAPSHOT_VERSION: u32 = 1;

/// Prefix of exported file names
pub const EXPORT_FILE_PREFIX: &str = "tools-export-";

/// A complete copy of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: String,
    pub websites: Vec<SnapshotWebsite>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// A website as it appears in a snapshot, with the icon in text form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotWebsite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub url: String,
    /// Kept as raw JSON so an odd icon value cannot fail the whole document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SnapshotWebsite {
    /// Convert a stored website, encoding its icon as text
    pub fn from_website(website: &Website) -> Self {
        Self {
            id: website.id,
            name: website.name.clone(),
            url: website.url.clone(),
            icon: website
                .icon
                .as_ref()
                .map(|icon| Value::String(codec::encode_icon(icon))),
            icon_mime_type: Some(website.icon_mime_type.clone()),
            description: website.description.clone(),
            api_keys: Some(website.api_keys.clone()),
            category_ids: Some(website.category_ids.clone()),
            tag_ids: Some(website.tag_ids.clone()),
            created_at: Some(format_timestamp(&website.created_at)),
            updated_at: Some(format_timestamp(&website.updated_at)),
        }
    }
}

impl Snapshot {
    /// Assemble a snapshot from the three collections
    pub fn new(
        exported_at: DateTime<Utc>,
        websites: &[Website],
        categories: Vec<Category>,
        tags: Vec<Tag>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: format_timestamp(&exported_at),
            websites: websites.iter().map(SnapshotWebsite::from_website).collect(),
            categories,
            tags,
        }
    }

    /// Parse a snapshot from JSON bytes and check its version tag
    pub fn from_slice(bytes: &[u8]) -> TransferResult<Self> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Render as JSON indented with two spaces
    pub fn to_pretty_json(&self) -> TransferResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check_version(&self) -> TransferResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(TransferError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

/// File name for an export taken at the given time: `tools-export-YYYY-MM-DD.json`
pub fn export_file_name(exported_at: &DateTime<Utc>) -> String {
    format!(
        "{}{}.json",
        EXPORT_FILE_PREFIX,
        exported_at.format("%Y-%m-%d")
    )
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (taken as UTC midnight)
///
/// Sub-millisecond digits are dropped.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Some(timestamp.with_timezone(&Utc).trunc_subsecs(3));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Icon;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_export_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        assert_eq!(export_file_name(&at), "tools-export-2024-01-09.json");
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&at), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_parse_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2024-01-02T03:04:05.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T05:04:05+02:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-02"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(
            parse_timestamp("2024-01-02T03:04:05.678901Z"),
            parse_timestamp("2024-01-02T03:04:05.678Z")
        );
    }

    #[test]
    fn test_snapshot_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let mut website = Website::new("Example", "https://example.com");
        website.id = Some(3);
        website.icon = Some(Icon::Inline(b"hello".to_vec()));
        website.category_ids = vec![1];
        website.created_at = at;
        website.updated_at = at;

        let snapshot = Snapshot::new(
            at,
            &[website],
            vec![Category {
                id: Some(1),
                name: "Dev".to_string(),
                icon_name: "code".to_string(),
            }],
            vec![],
        );

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "version": 1,
                "exportedAt": "2024-05-06T07:08:09.000Z",
                "websites": [{
                    "id": 3,
                    "name": "Example",
                    "url": "https://example.com",
                    "icon": "aGVsbG8=",
                    "iconMimeType": "image/png",
                    "apiKeys": [],
                    "categoryIds": [1],
                    "tagIds": [],
                    "createdAt": "2024-05-06T07:08:09.000Z",
                    "updatedAt": "2024-05-06T07:08:09.000Z"
                }],
                "categories": [{"id": 1, "name": "Dev", "iconName": "code"}],
                "tags": []
            })
        );
    }

    #[test]
    fn test_website_without_icon_omits_field() {
        let website = Website::new("Plain", "https://plain.example");
        let value = serde_json::to_value(SnapshotWebsite::from_website(&website)).unwrap();
        assert!(value.get("icon").is_none());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_pretty_json_uses_two_spaces() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let text = Snapshot::new(at, &[], vec![], vec![]).to_pretty_json().unwrap();
        assert!(text.starts_with("{\n  \"version\": 1,\n"));
    }

    #[test]
    fn test_from_slice_minimal_website() {
        let doc = br#"{
            "version": 1,
            "exportedAt": "2024-01-01T00:00:00.000Z",
            "websites": [{"name": "Bare", "url": "https://bare.example", "icon": 17}],
            "categories": [],
            "tags": [{"id": 4, "name": "misc", "count": 12}]
        }"#;

        let snapshot = Snapshot::from_slice(doc).unwrap();
        let website = &snapshot.websites[0];
        assert_eq!(website.icon, Some(json!(17)));
        assert!(website.category_ids.is_none());
        assert!(website.api_keys.is_none());
        assert_eq!(snapshot.tags[0].count, 12);
    }

    #[test]
    fn test_from_slice_rejects_malformed() {
        assert!(matches!(
            Snapshot::from_slice(b"{not json"),
            Err(TransferError::Parse(_))
        ));
        // Wrong shape: websites missing
        assert!(matches!(
            Snapshot::from_slice(br#"{"version": 1, "exportedAt": "", "categories": [], "tags": []}"#),
            Err(TransferError::Parse(_))
        ));
    }

    #[test]
    fn test_from_slice_checks_version() {
        let doc = br#"{"version": 2, "exportedAt": "", "websites": [], "categories": [], "tags": []}"#;
        assert!(matches!(
            Snapshot::from_slice(doc),
            Err(TransferError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }
}
