//! Update decision for a single installed component

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, error, info};

use crate::config::DEFAULT_FETCH_TIMEOUT_MS;
use crate::version::error::{InstalledStateError, RepositoryError};
use crate::version::installed::InstalledState;
use crate::version::repository::Repository;
use crate::version::semver::VersionString;
use crate::version::types::{RepositoryMetadata, UpdateDecision};

/// Decides whether an update site offers a newer version of an installed component.
///
/// Every failure is turned into a `CheckFailed` decision; `check` never errors.
pub struct UpdateChecker {
    installed: Arc<dyn InstalledState>,
    repository: Arc<dyn Repository>,
    fetch_timeout: Duration,
}

impl UpdateChecker {
    pub fn new(installed: Arc<dyn InstalledState>, repository: Arc<dyn Repository>) -> Self {
        Self {
            installed,
            repository,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    /// Bound the repository fetch; an expired fetch counts as unreachable
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Run one check of `component_id` against the update site at `endpoint`
    ///
    /// 1. Read the installed version (`NotFound` if not installed)
    /// 2. Fetch the repository metadata once, without retrying
    /// 3. Look up the newest published version (`NotFound` if unlisted)
    /// 4. `UpdateAvailable` if it is strictly newer, otherwise `UpToDate`
    pub async fn check(&self, component_id: &str, endpoint: &Url) -> UpdateDecision {
        let installed = match self.read_installed(component_id).await {
            Ok(version) => version,
            Err(InstalledStateError::NotInstalled(_)) => {
                info!("{} is not installed, nothing to update", component_id);
                return UpdateDecision::not_found(component_id, None);
            }
            Err(e) => {
                error!("Failed to read installed state of {}: {}", component_id, e);
                return UpdateDecision::failed(component_id, None, e);
            }
        };
        debug!("Installed {} {}", component_id, installed);

        let metadata = match self.fetch_metadata(endpoint).await {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("Failed to check {} for updates: {}", endpoint, e);
                return UpdateDecision::failed(component_id, Some(installed), e);
            }
        };
        debug!("{} lists {} entries", endpoint, metadata.entries.len());

        let available = match metadata.latest_version(component_id) {
            Some(Ok(version)) => version,
            Some(Err(e)) => {
                error!("{} publishes an unusable version of {}: {}", endpoint, component_id, e);
                return UpdateDecision::failed(component_id, Some(installed), e);
            }
            None => {
                info!("{} does not publish {}", endpoint, component_id);
                return UpdateDecision::not_found(component_id, Some(installed));
            }
        };

        match available.cmp(&installed) {
            Ordering::Greater => {
                UpdateDecision::update_available(component_id, installed, available)
            }
            Ordering::Equal | Ordering::Less => UpdateDecision::up_to_date(component_id, installed),
        }
    }

    async fn read_installed(&self, component_id: &str) -> Result<VersionString, InstalledStateError> {
        let installed = Arc::clone(&self.installed);
        let component_id = component_id.to_string();

        tokio::task::spawn_blocking(move || installed.current_version(&component_id))
            .await
            .unwrap_or_else(|e| {
                Err(InstalledStateError::Unreadable(format!(
                    "installed state reader failed: {}",
                    e
                )))
            })
    }

    async fn fetch_metadata(&self, endpoint: &Url) -> Result<RepositoryMetadata, RepositoryError> {
        tokio::time::timeout(self.fetch_timeout, self.repository.fetch(endpoint))
            .await
            .unwrap_or_else(|_| {
                Err(RepositoryError::Unreachable(format!(
                    "no response within {:?}",
                    self.fetch_timeout
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::version::installed::MockInstalledState;
    use crate::version::repository::MockRepository;
    use crate::version::semver::parse_version;
    use crate::version::types::{CheckFailure, ComponentEntry, UpdateStatus};

    const COMPONENT: &str = "org.example.feature.group";

    fn endpoint() -> Url {
        Url::parse("https://updates.example.com/site/").unwrap()
    }

    fn installed(version: &'static str) -> MockInstalledState {
        let mut state = MockInstalledState::new();
        state
            .expect_current_version()
            .returning(move |_| Ok(parse_version(version)?));
        state
    }

    fn repository(entries: Vec<(&str, &str)>) -> MockRepository {
        let metadata = RepositoryMetadata::new(
            entries
                .into_iter()
                .map(|(id, version)| ComponentEntry {
                    id: id.to_string(),
                    version: version.to_string(),
                })
                .collect(),
        );
        let mut repository = MockRepository::new();
        repository
            .expect_fetch()
            .times(1)
            .returning(move |_| Ok(metadata.clone()));
        repository
    }

    fn checker(installed: MockInstalledState, repository: MockRepository) -> UpdateChecker {
        UpdateChecker::new(Arc::new(installed), Arc::new(repository))
    }

    #[tokio::test]
    async fn check_reports_newer_published_version() {
        let checker = checker(installed("1.0.0"), repository(vec![(COMPONENT, "1.1.0")]));

        let decision = checker.check(COMPONENT, &endpoint()).await;

        assert_eq!(decision.status, UpdateStatus::UpdateAvailable);
        assert_eq!(
            decision.available_version.map(|v| v.to_string()),
            Some("1.1.0".to_string())
        );
        assert_eq!(
            decision.installed_version.map(|v| v.to_string()),
            Some("1.0.0".to_string())
        );
    }

    #[rstest]
    #[case("2.0.0", "2.0.0")]
    #[case("2.0", "2.0.0")]
    #[case("3.0.0", "2.0.0")]
    #[case("2.0.0", "2.0.0-rc.1")]
    #[tokio::test]
    async fn check_reports_up_to_date_unless_strictly_newer(
        #[case] installed_version: &'static str,
        #[case] published: &str,
    ) {
        let checker = checker(
            installed(installed_version),
            repository(vec![(COMPONENT, published)]),
        );

        let decision = checker.check(COMPONENT, &endpoint()).await;

        assert_eq!(decision.status, UpdateStatus::UpToDate);
        assert_eq!(decision.available_version, None);
    }

    #[tokio::test]
    async fn check_uses_newest_of_several_entries() {
        let checker = checker(
            installed("1.0.0"),
            repository(vec![(COMPONENT, "1.2.0"), (COMPONENT, "1.5.0"), (COMPONENT, "1.1.0")]),
        );

        let decision = checker.check(COMPONENT, &endpoint()).await;

        assert_eq!(
            decision.available_version.map(|v| v.to_string()),
            Some("1.5.0".to_string())
        );
    }

    #[tokio::test]
    async fn check_fails_with_invalid_version_for_malformed_entry() {
        let checker = checker(installed("1.0.0"), repository(vec![(COMPONENT, "abc")]));

        let decision = checker.check(COMPONENT, &endpoint()).await;

        assert_eq!(
            decision.status,
            UpdateStatus::CheckFailed(CheckFailure::InvalidVersion("abc".to_string()))
        );
    }

    #[tokio::test]
    async fn check_reports_not_found_when_repository_does_not_list_component() {
        let checker = checker(installed("1.0.0"), repository(vec![("other", "9.0.0")]));

        let decision = checker.check(COMPONENT, &endpoint()).await;

        assert_eq!(decision.status, UpdateStatus::NotFound);
        assert!(decision.installed_version.is_some());
    }

    #[tokio::test]
    async fn check_reports_not_found_without_fetching_when_not_installed() {
        let mut state = MockInstalledState::new();
        state
            .expect_current_version()
            .returning(|id| Err(InstalledStateError::NotInstalled(id.to_string())));
        let mut repository = MockRepository::new();
        repository.expect_fetch().never();

        let decision = checker(state, repository).check(COMPONENT, &endpoint()).await;

        assert_eq!(decision, UpdateDecision::not_found(COMPONENT, None));
    }

    #[tokio::test]
    async fn check_fails_when_installed_state_is_unreadable() {
        let mut state = MockInstalledState::new();
        state
            .expect_current_version()
            .returning(|_| Err(InstalledStateError::Unreadable("permission denied".to_string())));
        let mut repository = MockRepository::new();
        repository.expect_fetch().never();

        let decision = checker(state, repository).check(COMPONENT, &endpoint()).await;

        assert!(matches!(
            decision.status,
            UpdateStatus::CheckFailed(CheckFailure::InstalledState(_))
        ));
    }

    #[rstest]
    #[case(
        RepositoryError::Unreachable("connection refused".to_string()),
        CheckFailure::Unreachable("connection refused".to_string())
    )]
    #[case(
        RepositoryError::MalformedMetadata("expected value".to_string()),
        CheckFailure::MalformedMetadata("expected value".to_string())
    )]
    #[tokio::test]
    async fn check_turns_repository_errors_into_failed_decision(
        #[case] error: RepositoryError,
        #[case] expected: CheckFailure,
    ) {
        let mut repository = MockRepository::new();
        repository.expect_fetch().times(1).return_once(move |_| Err(error));

        let decision = checker(installed("1.0.0"), repository)
            .check(COMPONENT, &endpoint())
            .await;

        assert_eq!(decision.status, UpdateStatus::CheckFailed(expected));
        assert_eq!(decision.available_version, None);
    }

    struct StalledRepository;

    #[async_trait::async_trait]
    impl Repository for StalledRepository {
        async fn fetch(&self, _endpoint: &Url) -> Result<RepositoryMetadata, RepositoryError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(RepositoryMetadata::new(vec![]))
        }
    }

    #[tokio::test]
    async fn check_treats_fetch_timeout_as_unreachable() {
        let checker = UpdateChecker::new(Arc::new(installed("1.0.0")), Arc::new(StalledRepository))
            .with_fetch_timeout(Duration::from_millis(20));

        let decision = checker.check(COMPONENT, &endpoint()).await;

        assert!(matches!(
            decision.status,
            UpdateStatus::CheckFailed(CheckFailure::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn check_is_idempotent_for_unchanged_state() {
        let mut repository = MockRepository::new();
        repository.expect_fetch().times(2).returning(|_| {
            Ok(RepositoryMetadata::new(vec![ComponentEntry {
                id: COMPONENT.to_string(),
                version: "1.1.0".to_string(),
            }]))
        });
        let checker = checker(installed("1.0.0"), repository);

        let first = checker.check(COMPONENT, &endpoint()).await;
        let second = checker.check(COMPONENT, &endpoint()).await;

        assert_eq!(first, second);
    }
}
