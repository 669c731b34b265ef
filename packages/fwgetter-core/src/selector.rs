//! Candidate selection over the upstream release listing

use fwgetter_provider::ReleaseRecord;
use fwgetter_utils::VersionCode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::device::DeviceModel;
use crate::metadata::{ReleaseMetadata, MINIMUM_FIRMWARE_REQUIRED, RELEASE_FIRMWARE_VERSION};

/// Why a release was not offered to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Draft,
    MissingPublishedAt,
    MissingTag,
    TagMismatch,
    MissingVersion,
    NotNewer { version: VersionCode },
    BelowMinimumFirmware { minimum: VersionCode },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Draft => write!(f, "draft release"),
            Rejection::MissingPublishedAt => write!(f, "not published"),
            Rejection::MissingTag => write!(f, "no tag name"),
            Rejection::TagMismatch => write!(f, "tag does not belong to this device"),
            Rejection::MissingVersion => write!(f, "no {} in release notes", RELEASE_FIRMWARE_VERSION),
            Rejection::NotNewer { version } => write!(f, "version {} is not newer", version),
            Rejection::BelowMinimumFirmware { minimum } => {
                write!(f, "requires firmware {} or later", minimum)
            }
        }
    }
}

/// A release that passed every gate, with its parsed metadata.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub release: &'a ReleaseRecord,
    pub metadata: ReleaseMetadata,
    pub version: VersionCode,
}

impl Candidate<'_> {
    pub fn published_at(&self) -> &str {
        self.release.published_at.as_deref().unwrap_or_default()
    }
}

static VERSIONED_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+)_v[0-9]+(?:\.[0-9]+){1,2}$").unwrap());

/// Picks the update to offer a device from a list of releases.
pub struct CandidateSelector {
    prefix: String,
}

impl CandidateSelector {
    /// Selector for releases tagged `<prefix>_v<major>.<minor>[.<patch>]`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_lowercase(),
        }
    }

    pub fn for_device(device: DeviceModel) -> Self {
        Self::new(device.release_prefix())
    }

    /// Whole-tag match; the prefix compares case-insensitively.
    pub fn matches_tag(&self, tag_name: &str) -> bool {
        VERSIONED_TAG_REGEX
            .captures(tag_name)
            .and_then(|captures| captures.get(1))
            .is_some_and(|prefix| prefix.as_str().to_lowercase() == self.prefix)
    }

    /// Run every gate against one release, in order, stopping at the first
    /// failure.
    pub fn evaluate<'a>(
        &self,
        release: &'a ReleaseRecord,
        current: &VersionCode,
    ) -> Result<Candidate<'a>, Rejection> {
        if release.draft {
            return Err(Rejection::Draft);
        }
        if release.published_at.as_deref().map_or(true, str::is_empty) {
            return Err(Rejection::MissingPublishedAt);
        }
        let tag_name = match release.tag_name.as_deref() {
            Some(tag_name) if !tag_name.is_empty() => tag_name,
            _ => return Err(Rejection::MissingTag),
        };
        if !self.matches_tag(tag_name) {
            return Err(Rejection::TagMismatch);
        }

        let metadata = ReleaseMetadata::extract(release.body.as_deref());
        let version = match metadata.non_empty_text(RELEASE_FIRMWARE_VERSION) {
            Some(version) => VersionCode::from_str_lossy(version),
            None => return Err(Rejection::MissingVersion),
        };

        if version <= *current {
            return Err(Rejection::NotNewer { version });
        }

        if let Some(minimum) = metadata.non_empty_text(MINIMUM_FIRMWARE_REQUIRED) {
            let minimum = VersionCode::from_str_lossy(minimum);
            if *current < minimum {
                return Err(Rejection::BelowMinimumFirmware { minimum });
            }
        }

        Ok(Candidate {
            release,
            metadata,
            version,
        })
    }

    /// Every eligible release, most recently published first.
    ///
    /// Releases sharing a timestamp keep their listing order.
    pub fn candidates<'a>(
        &self,
        releases: &'a [ReleaseRecord],
        current: &VersionCode,
    ) -> Vec<Candidate<'a>> {
        let mut candidates: Vec<Candidate<'a>> = releases
            .iter()
            .filter_map(|release| match self.evaluate(release, current) {
                Ok(candidate) => Some(candidate),
                Err(rejection) => {
                    tracing::trace!(
                        tag = release.tag_name.as_deref().unwrap_or("<none>"),
                        %rejection,
                        "release skipped"
                    );
                    None
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.published_at().cmp(a.published_at()));
        candidates
    }

    /// The most recently published eligible release, if any.
    pub fn select<'a>(
        &self,
        releases: &'a [ReleaseRecord],
        current: &VersionCode,
    ) -> Option<Candidate<'a>> {
        self.candidates(releases, current).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(version: &str, minimum: Option<&str>) -> String {
        let mut lines = format!("release_firmware_version:{version}\n");
        if let Some(minimum) = minimum {
            lines.push_str(&format!("minimum_firmware_required:{minimum}\n"));
        }
        format!("<!-- KEY_VALUE_START\n{lines}KEY_VALUE_END -->")
    }

    fn release(tag: &str, published_at: &str, version: &str, minimum: Option<&str>) -> ReleaseRecord {
        ReleaseRecord::new(tag, published_at).with_body(body(version, minimum))
    }

    fn current(version: &str) -> VersionCode {
        VersionCode::from_str_lossy(version)
    }

    #[test]
    fn test_tag_matching() {
        let selector = CandidateSelector::new("Omi_DK2");
        assert!(selector.matches_tag("Omi_DK2_v1.2"));
        assert!(selector.matches_tag("Omi_DK2_v1.2.3"));
        assert!(selector.matches_tag("omi_dk2_v1.2.3"));
        assert!(!selector.matches_tag("Omi_DK2_v1"));
        assert!(!selector.matches_tag("Omi_DK2_v1.2.3.4"));
        assert!(!selector.matches_tag("Omi_DK2X_v1.2"));
        assert!(!selector.matches_tag("XOmi_DK2_v1.2"));
        assert!(!selector.matches_tag("Omi_DK2_v1.2-beta"));
        assert!(!selector.matches_tag("Omi_DK2_1.2"));
    }

    #[test]
    fn test_tag_matching_for_device() {
        let selector = CandidateSelector::for_device(DeviceModel::Cv1);
        assert!(selector.matches_tag("Omi_CV1_v2.0.9"));
        assert!(selector.matches_tag("OMI_CV1_V2.0.9"));
        assert!(!selector.matches_tag("Omi_CV1_v2.0.9_v1"));
        assert!(!selector.matches_tag("Omi_DK2_v2.0.9"));
    }

    #[test]
    fn test_prefix_is_literal() {
        let selector = CandidateSelector::new("Omi.CV1");
        assert!(selector.matches_tag("Omi.CV1_v1.0"));
        assert!(!selector.matches_tag("OmiXCV1_v1.0"));
    }

    #[test]
    fn test_drafts_and_unpublished_are_rejected() {
        let selector = CandidateSelector::new("Omi_DK2");
        let now = current("0.0.1");

        let draft = release("Omi_DK2_v9.0.0", "2024-01-01T00:00:00Z", "v9.0.0", None).with_draft(true);
        assert_eq!(selector.evaluate(&draft, &now).unwrap_err(), Rejection::Draft);

        let mut unpublished = release("Omi_DK2_v9.0.0", "", "v9.0.0", None);
        assert_eq!(
            selector.evaluate(&unpublished, &now).unwrap_err(),
            Rejection::MissingPublishedAt
        );
        unpublished.published_at = None;
        assert_eq!(
            selector.evaluate(&unpublished, &now).unwrap_err(),
            Rejection::MissingPublishedAt
        );

        let mut untagged = release("", "2024-01-01T00:00:00Z", "v9.0.0", None);
        assert_eq!(selector.evaluate(&untagged, &now).unwrap_err(), Rejection::MissingTag);
        untagged.tag_name = None;
        assert_eq!(selector.evaluate(&untagged, &now).unwrap_err(), Rejection::MissingTag);
    }

    #[test]
    fn test_missing_version_is_rejected() {
        let selector = CandidateSelector::new("Omi_DK2");
        let no_body = ReleaseRecord::new("Omi_DK2_v1.1", "2024-01-01T00:00:00Z");
        assert_eq!(
            selector.evaluate(&no_body, &current("1.0.0")).unwrap_err(),
            Rejection::MissingVersion
        );

        let empty_version = release("Omi_DK2_v1.1", "2024-01-01T00:00:00Z", "", None);
        assert_eq!(
            selector.evaluate(&empty_version, &current("1.0.0")).unwrap_err(),
            Rejection::MissingVersion
        );
    }

    #[test]
    fn test_condition_a_requires_strictly_newer() {
        let selector = CandidateSelector::new("Omi_DK2");
        let same = release("Omi_DK2_v1.1.0", "2024-01-01T00:00:00Z", "v1.1.0", None);
        assert!(matches!(
            selector.evaluate(&same, &current("1.1")),
            Err(Rejection::NotNewer { .. })
        ));
        assert!(matches!(
            selector.evaluate(&same, &current("1.2.0")),
            Err(Rejection::NotNewer { .. })
        ));
        assert!(selector.evaluate(&same, &current("1.0.9")).is_ok());
    }

    #[test]
    fn test_malformed_release_version_is_oldest() {
        let selector = CandidateSelector::new("Omi_DK2");
        let garbage = release("Omi_DK2_v1.1.0", "2024-01-01T00:00:00Z", "latest", None);
        assert!(matches!(
            selector.evaluate(&garbage, &current("0.0.0")),
            Err(Rejection::NotNewer { .. })
        ));
    }

    #[test]
    fn test_condition_b_minimum_firmware() {
        let selector = CandidateSelector::new("Omi_CV1");
        let gated = release("Omi_CV1_v2.1.0", "2024-01-01T00:00:00Z", "v2.1.0", Some("v2.0.0"));

        assert_eq!(
            selector.evaluate(&gated, &current("1.9.9")).unwrap_err(),
            Rejection::BelowMinimumFirmware {
                minimum: current("2.0.0")
            }
        );
        assert!(selector.evaluate(&gated, &current("2.0.0")).is_ok());
        assert!(selector.evaluate(&gated, &current("2.0.4")).is_ok());
    }

    #[test]
    fn test_no_minimum_means_no_floor() {
        let selector = CandidateSelector::new("Omi_CV1");
        let open = release("Omi_CV1_v2.1.0", "2024-01-01T00:00:00Z", "v2.1.0", None);
        assert!(selector.evaluate(&open, &current("")).is_ok());
        assert!(selector.evaluate(&open, &current("garbage")).is_ok());
    }

    #[test]
    fn test_select_latest_published() {
        let selector = CandidateSelector::new("Omi_DK2");
        let releases = vec![
            release("Omi_DK2_v1.1.0", "2024-01-01T00:00:00Z", "v1.1.0", None),
            release("Omi_DK2_v1.2.0", "2024-02-01T00:00:00Z", "v1.2.0", None),
        ];
        let chosen = selector.select(&releases, &current("1.0.0")).unwrap();
        assert_eq!(chosen.release.tag_name.as_deref(), Some("Omi_DK2_v1.2.0"));
        assert_eq!(chosen.version, current("1.2.0"));
        assert_eq!(chosen.metadata.text(RELEASE_FIRMWARE_VERSION), Some("v1.2.0"));
    }

    #[test]
    fn test_select_ranks_by_publication_not_version() {
        let selector = CandidateSelector::new("Omi_DK2");
        let releases = vec![
            release("Omi_DK2_v3.0.0", "2024-01-01T00:00:00Z", "v3.0.0", None),
            release("Omi_DK2_v2.0.0", "2024-03-01T00:00:00Z", "v2.0.0", None),
        ];
        let chosen = selector.select(&releases, &current("1.0.0")).unwrap();
        assert_eq!(chosen.release.tag_name.as_deref(), Some("Omi_DK2_v2.0.0"));
    }

    #[test]
    fn test_ties_keep_listing_order() {
        let selector = CandidateSelector::new("Omi_DK2");
        let releases = vec![
            release("Omi_DK2_v1.1.0", "2024-01-01T00:00:00Z", "v1.1.0", None).with_id(1),
            release("Omi_DK2_v1.2.0", "2024-01-01T00:00:00Z", "v1.2.0", None).with_id(2),
            release("Omi_DK2_v1.3.0", "2023-01-01T00:00:00Z", "v1.3.0", None).with_id(3),
        ];
        let ids: Vec<Option<u64>> = selector
            .candidates(&releases, &current("1.0.0"))
            .iter()
            .map(|c| c.release.id)
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_select_filters_other_devices() {
        let selector = CandidateSelector::new("Friend");
        let releases = vec![
            release("Omi_DK2_v9.0.0", "2024-05-01T00:00:00Z", "v9.0.0", None),
            release("Friend_v1.0.4", "2023-10-01T00:00:00Z", "v1.0.4", None),
        ];
        let chosen = selector.select(&releases, &current("1.0.2")).unwrap();
        assert_eq!(chosen.release.tag_name.as_deref(), Some("Friend_v1.0.4"));
    }

    #[test]
    fn test_select_none() {
        let selector = CandidateSelector::new("Omi_DK2");
        assert!(selector.select(&[], &current("1.0.0")).is_none());

        let releases = vec![release("Omi_DK2_v1.0.0", "2024-01-01T00:00:00Z", "v1.0.0", None)];
        assert!(selector.select(&releases, &current("1.0.0")).is_none());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::Draft.to_string(), "draft release");
        assert_eq!(
            Rejection::NotNewer {
                version: current("1.0")
            }
            .to_string(),
            "version 1.0.0 is not newer"
        );
        assert_eq!(
            Rejection::BelowMinimumFirmware {
                minimum: current("v2.0.0")
            }
            .to_string(),
            "requires firmware 2.0.0 or later"
        );
    }
}
