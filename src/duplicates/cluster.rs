//! Clustering of one size bucket into duplicate groups.
//!
//! # Algorithm
//!
//! Groups are kept in creation order. Each incoming file is compared against
//! the representative (first member) of each group in turn and joins the
//! first group whose representative matches. A file that matches no group
//! starts a new one.
//!
//! Byte equality is transitive, so matching the representative proves
//! equality with every member. First-fit therefore gives the same partition
//! as exhaustive pairwise comparison with fewer reads.
//!
//! Cancellation is checked before every representative comparison. A
//! cancelled run returns the groups formed so far; they remain valid.

use super::compare::{Comparator, Comparison};
use super::groups::{DuplicateGroup, SizeBucket};
use crate::cancel::CancellationToken;

/// Groups produced for one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOutcome {
    /// Groups in creation order
    pub groups: Vec<DuplicateGroup>,
    /// Representative comparisons performed
    pub comparisons: usize,
    /// Whether clustering stopped early because of cancellation
    pub interrupted: bool,
}

/// Cluster a bucket's files into groups of identical content.
///
/// Takes ownership of the bucket; each file moves into exactly one group.
///
/// # Example
///
/// ```no_run
/// use copyfinder::cancel::CancellationToken;
/// use copyfinder::duplicates::{cluster_bucket, Comparator, SizeBucket, DEFAULT_CHUNK_SIZE};
///
/// let token = CancellationToken::new();
/// let mut comparator = Comparator::new(DEFAULT_CHUNK_SIZE, token.clone());
/// let bucket = SizeBucket::new(10);
///
/// let outcome = cluster_bucket(bucket, &mut comparator, &token);
/// assert!(outcome.groups.is_empty());
/// ```
pub fn cluster_bucket(
    bucket: SizeBucket,
    comparator: &mut Comparator,
    token: &CancellationToken,
) -> ClusterOutcome {
    let mut outcome = ClusterOutcome::default();

    'files: for file in bucket.files {
        for group in &mut outcome.groups {
            if token.is_cancelled() {
                outcome.interrupted = true;
                break 'files;
            }

            outcome.comparisons += 1;
            match comparator.compare(group.representative(), &file) {
                Comparison::Equal => {
                    group.push(file);
                    continue 'files;
                }
                Comparison::Different => {}
                Comparison::Cancelled => {
                    outcome.interrupted = true;
                    break 'files;
                }
            }
        }

        outcome.groups.push(DuplicateGroup::new(file));
    }

    log::debug!(
        "Bucket {} bytes: {} group(s) after {} comparison(s){}",
        bucket.size,
        outcome.groups.len(),
        outcome.comparisons,
        if outcome.interrupted { " (interrupted)" } else { "" }
    );

    outcome
}
