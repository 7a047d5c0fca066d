use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, info, warn};
use vellum_db::DbError;
use vellum_db::models::{CommitOutcome, NewVersion};
use vellum_types::models::{DEFAULT_BRANCH, TemplateId, TemplateVersion, UserId, VersionId};

use crate::config::AllocatorConfig;
use crate::error::{Result, VellumError};
use crate::store::VersionLedger;

pub const MAX_BRANCH_LEN: usize = 100;

/// A committed version and what the commit did to the template head.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub version: TemplateVersion,
    pub head_advanced: bool,
    /// Commit attempts it took, 1 when uncontended.
    pub attempts: u32,
}

/// Assigns dense per-(template, branch) version numbers.
///
/// Numbers are never reserved or locked. Each attempt reads the branch
/// maximum, then asks the ledger to commit `max + 1` in one transaction that
/// re-checks the maximum. A writer that lost the race backs off with jitter
/// and tries again with a fresh read.
pub struct VersionAllocator<L> {
    ledger: Arc<L>,
    config: AllocatorConfig,
}

impl<L: VersionLedger> VersionAllocator<L> {
    pub fn new(ledger: Arc<L>, config: AllocatorConfig) -> Self {
        Self { ledger, config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    pub fn create_version(
        &self,
        template_id: &TemplateId,
        branch: Option<&str>,
        content: &str,
        author: &UserId,
        commit_message: Option<&str>,
    ) -> Result<VersionRecord> {
        let branch = normalize_branch(branch)?;
        if content.trim().is_empty() {
            return Err(VellumError::ValidationFailed("content must not be empty".into()));
        }
        let commit_message = commit_message.map(str::trim).filter(|m| !m.is_empty());

        let template = self
            .ledger
            .template(template_id)?
            .ok_or(VellumError::NotFound("template"))?;
        if template.is_archived() {
            return Err(VellumError::archived());
        }

        let template_key = template_id.to_string();
        let author_key = author.to_string();
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let next = self.ledger.max_version_number(template_id, branch)? + 1;
            let version_id = VersionId::new().to_string();

            let outcome = self.ledger.commit_version(&NewVersion {
                id: &version_id,
                template_id: &template_key,
                branch,
                version_number: next,
                content,
                created_by: &author_key,
                commit_message,
            });

            match outcome {
                Ok(CommitOutcome::Committed { head_advanced }) => {
                    info!(
                        template = %template_id,
                        branch,
                        version = next,
                        attempt,
                        head_advanced,
                        "Version committed"
                    );
                    let version = self
                        .ledger
                        .fetch_version(template_id, branch, next)?
                        .ok_or(VellumError::NotFound("version"))?;
                    return Ok(VersionRecord {
                        version,
                        head_advanced,
                        attempts: attempt,
                    });
                }
                Ok(CommitOutcome::Stale { current_max }) => {
                    debug!(
                        template = %template_id,
                        branch,
                        tried = next,
                        current_max,
                        attempt,
                        "Version number taken, retrying"
                    );
                }
                // Uniqueness backstop for ledgers that detect the race on insert.
                Err(DbError::Conflict(msg)) => {
                    debug!(template = %template_id, branch, tried = next, attempt, "Insert conflict: {}", msg);
                }
                Ok(CommitOutcome::TemplateArchived) => return Err(VellumError::archived()),
                Err(DbError::NotFound) => return Err(VellumError::NotFound("template")),
                Err(e) => return Err(e.into()),
            }

            if attempt < max_attempts {
                std::thread::sleep(self.jittered_backoff(attempt));
            }
        }

        error!(
            template = %template_id,
            branch,
            attempts = max_attempts,
            "Version allocation exhausted retries"
        );
        Err(VellumError::AllocationFailed {
            attempts: max_attempts,
        })
    }

    /// Full jitter: uniform in `[0, ceiling]`.
    fn jittered_backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.config.backoff_ceiling(attempt);
        let micros = u64::try_from(ceiling.as_micros()).unwrap_or(u64::MAX);
        if micros == 0 {
            return Duration::ZERO;
        }
        if attempt >= 3 {
            warn!(attempt, ceiling_us = micros, "Heavy contention on version allocation");
        }
        Duration::from_micros(rand::rng().random_range(0..=micros))
    }
}

/// Trim and validate a branch name; `None` means the default branch.
pub fn normalize_branch(branch: Option<&str>) -> Result<&str> {
    let name = branch.map(str::trim).unwrap_or(DEFAULT_BRANCH);
    if name.is_empty() {
        return Err(VellumError::ValidationFailed("branch name must not be empty".into()));
    }
    if name.chars().count() > MAX_BRANCH_LEN {
        return Err(VellumError::ValidationFailed(format!(
            "branch name longer than {} characters",
            MAX_BRANCH_LEN
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use vellum_db::Database;
    use vellum_db::queries::NewTemplate;
    use vellum_types::models::{GroupId, Template, TemplateStatus};

    struct Fixture {
        db: Arc<Database>,
        author: UserId,
        template: TemplateId,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let author = UserId::new();
        db.create_user(&author, "a@example.com", "hash", "A").unwrap();
        let group = GroupId::new();
        db.create_group_with_admin(&group, "ops", None, &author).unwrap();
        let template = TemplateId::new();
        db.insert_template(&NewTemplate {
            id: &template,
            group_id: &group,
            title: "Invoice",
            description: None,
            created_by: &author,
            head_branch: DEFAULT_BRANCH,
        })
        .unwrap();
        Fixture { db, author, template }
    }

    fn fast_config(max_attempts: u32) -> AllocatorConfig {
        AllocatorConfig {
            max_attempts,
            base_backoff: Duration::from_micros(10),
            max_backoff: Duration::from_micros(100),
        }
    }

    /// Ledger that reports a lost race for the first `losses` commits.
    struct ContendedLedger {
        inner: Arc<Database>,
        losses: AtomicU32,
        use_unique_error: bool,
    }

    impl VersionLedger for ContendedLedger {
        fn template(&self, id: &TemplateId) -> vellum_db::Result<Option<Template>> {
            self.inner.template(id)
        }

        fn max_version_number(&self, template: &TemplateId, branch: &str) -> vellum_db::Result<u64> {
            VersionLedger::max_version_number(self.inner.as_ref(), template, branch)
        }

        fn commit_version(&self, new: &NewVersion<'_>) -> vellum_db::Result<CommitOutcome> {
            let left = self.losses.load(Ordering::SeqCst);
            if left > 0 {
                self.losses.store(left - 1, Ordering::SeqCst);
                if self.use_unique_error {
                    return Err(DbError::Conflict("UNIQUE constraint failed".into()));
                }
                return Ok(CommitOutcome::Stale {
                    current_max: new.version_number,
                });
            }
            VersionLedger::commit_version(self.inner.as_ref(), new)
        }

        fn fetch_version(
            &self,
            template: &TemplateId,
            branch: &str,
            version_number: u64,
        ) -> vellum_db::Result<Option<TemplateVersion>> {
            self.inner.fetch_version(template, branch, version_number)
        }
    }

    #[test]
    fn numbers_start_at_one_and_advance_head() {
        let f = fixture();
        let alloc = VersionAllocator::new(f.db.clone(), AllocatorConfig::default());

        let first = alloc
            .create_version(&f.template, None, "hello", &f.author, Some("initial"))
            .unwrap();
        assert_eq!(first.version.version_number, 1);
        assert_eq!(first.version.branch, "main");
        assert_eq!(first.version.commit_message.as_deref(), Some("initial"));
        assert!(first.head_advanced);
        assert_eq!(first.attempts, 1);

        let second = alloc
            .create_version(&f.template, Some("main"), "world", &f.author, None)
            .unwrap();
        assert_eq!(second.version.version_number, 2);

        let head = f.db.get_template(&f.template).unwrap().unwrap();
        assert_eq!(head.latest_version_id, Some(second.version.id));
    }

    #[test]
    fn new_branch_starts_at_one() {
        let f = fixture();
        let alloc = VersionAllocator::new(f.db.clone(), AllocatorConfig::default());
        for i in 0..5 {
            alloc
                .create_version(&f.template, None, &format!("v{i}"), &f.author, None)
                .unwrap();
        }
        let feature = alloc
            .create_version(&f.template, Some("feature/x"), "branch", &f.author, None)
            .unwrap();
        assert_eq!(feature.version.version_number, 1);
        assert!(!feature.head_advanced);

        let head = f.db.get_template(&f.template).unwrap().unwrap();
        let main5 = f.db.get_version(&f.template, "main", 5).unwrap().unwrap();
        assert_eq!(head.latest_version_id, Some(main5.id));
    }

    #[test]
    fn rejects_empty_content_and_branch() {
        let f = fixture();
        let alloc = VersionAllocator::new(f.db.clone(), AllocatorConfig::default());
        assert!(matches!(
            alloc.create_version(&f.template, None, "   ", &f.author, None),
            Err(VellumError::ValidationFailed(_))
        ));
        assert!(matches!(
            alloc.create_version(&f.template, Some(" "), "x", &f.author, None),
            Err(VellumError::ValidationFailed(_))
        ));
        let long = "b".repeat(MAX_BRANCH_LEN + 1);
        assert!(matches!(
            alloc.create_version(&f.template, Some(&long), "x", &f.author, None),
            Err(VellumError::ValidationFailed(_))
        ));
    }

    #[test]
    fn unknown_and_archived_templates_are_rejected() {
        let f = fixture();
        let alloc = VersionAllocator::new(f.db.clone(), AllocatorConfig::default());
        assert!(matches!(
            alloc.create_version(&TemplateId::new(), None, "x", &f.author, None),
            Err(VellumError::NotFound("template"))
        ));

        f.db.transition_template_status(&f.template, &[TemplateStatus::Draft], TemplateStatus::Archived)
            .unwrap();
        assert!(matches!(
            alloc.create_version(&f.template, None, "x", &f.author, None),
            Err(VellumError::InvalidState(_))
        ));
    }

    #[test]
    fn lost_races_are_retried() {
        let f = fixture();
        for use_unique_error in [false, true] {
            let ledger = Arc::new(ContendedLedger {
                inner: f.db.clone(),
                losses: AtomicU32::new(3),
                use_unique_error,
            });
            let alloc = VersionAllocator::new(ledger, fast_config(5));
            let record = alloc
                .create_version(&f.template, Some("retry"), "x", &f.author, None)
                .unwrap();
            assert_eq!(record.attempts, 4);
        }
        let numbers: Vec<u64> = f
            .db
            .list_versions(&f.template, "retry")
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[test]
    fn exhausted_retries_fail_without_writing() {
        let f = fixture();
        let ledger = Arc::new(ContendedLedger {
            inner: f.db.clone(),
            losses: AtomicU32::new(10),
            use_unique_error: false,
        });
        let alloc = VersionAllocator::new(ledger, fast_config(5));
        let err = alloc
            .create_version(&f.template, None, "x", &f.author, None)
            .unwrap_err();
        assert!(matches!(err, VellumError::AllocationFailed { attempts: 5 }));
        assert_eq!(f.db.count_versions(&f.template).unwrap(), 0);
        assert_eq!(f.db.get_template(&f.template).unwrap().unwrap().latest_version_id, None);
    }

    #[test]
    fn branch_names_are_trimmed() {
        assert_eq!(normalize_branch(None).unwrap(), "main");
        assert_eq!(normalize_branch(Some("  dev ")).unwrap(), "dev");
        assert!(normalize_branch(Some("")).is_err());
    }
}
