//! Uniqueness check of candidate values against a [`MembershipFilter`].
//!
//! Known values and values proposed in the same call share one filter: a
//! candidate reported as [`UniquenessStatus::Unique`] is added right away,
//! so a later repeat within the same call is reported as already used.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::filter::MembershipFilter;

/// Outcome of checking one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniquenessStatus {
    /// Candidate is blank after trimming
    Invalid,
    /// Candidate is possibly present in the filter
    AlreadyUsed,
    /// Candidate is definitely absent and was added to the filter
    Unique,
}

impl UniquenessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniquenessStatus::Invalid => "invalid",
            UniquenessStatus::AlreadyUsed => "already_used",
            UniquenessStatus::Unique => "unique",
        }
    }
}

impl Display for UniquenessStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses keyed by raw candidate, in first-seen order.
///
/// Recording a key that is already present replaces its status but keeps its
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniquenessReport {
    entries: Vec<(String, UniquenessStatus)>,
    index: HashMap<String, usize>,
}

impl UniquenessReport {
    fn record(&mut self, key: String, status: UniquenessStatus) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = status,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, status));
            }
        }
    }

    /// Return status recorded for raw candidate `key`
    pub fn get(&self, key: &str) -> Option<UniquenessStatus> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    /// Iterate over `(raw candidate, status)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, UniquenessStatus)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return number of entries with `status`
    pub fn count_of(&self, status: UniquenessStatus) -> usize {
        self.entries.iter().filter(|(_, s)| *s == status).count()
    }
}

impl IntoIterator for UniquenessReport {
    type Item = (String, UniquenessStatus);
    type IntoIter = std::vec::IntoIter<(String, UniquenessStatus)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Check `candidates` against `filter`, adding every unique one to it.
///
/// A `None` candidate is treated as an empty string. Membership is tested on
/// the trimmed value while the report is keyed by the raw value. With
/// `validate_blank` set, candidates that are blank after trimming are
/// reported as [`UniquenessStatus::Invalid`] and never touch the filter.
pub fn check_uniqueness<I, S>(
    filter: &mut MembershipFilter,
    candidates: I,
    validate_blank: bool,
) -> UniquenessReport
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut report = UniquenessReport::default();
    for candidate in candidates {
        let raw = candidate.as_ref().map_or("", |s| s.as_ref());
        let normalized = raw.trim();

        let status = if validate_blank && normalized.is_empty() {
            UniquenessStatus::Invalid
        } else if filter.contains(normalized) {
            UniquenessStatus::AlreadyUsed
        } else {
            filter.add(normalized);
            UniquenessStatus::Unique
        };

        tracing::trace!(candidate = raw, %status, "checked candidate");
        report.record(raw.to_owned(), status);
    }

    tracing::debug!(
        checked = report.len(),
        unique = report.count_of(UniquenessStatus::Unique),
        already_used = report.count_of(UniquenessStatus::AlreadyUsed),
        invalid = report.count_of(UniquenessStatus::Invalid),
        "uniqueness check finished"
    );
    report
}
