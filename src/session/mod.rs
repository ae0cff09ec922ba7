//! Survey session engine
//!
//! Drives one participant through the shuffled stimulus set of their group.
//! Forward navigation is guarded (every dimension answered, demographics on
//! the first trial) and submits exactly one row per trial; backward
//! navigation pops an undo log and rehydrates the popped answers for
//! editing; reset issues a fresh participant identity. Backend failures are
//! logged and queued for one redelivery attempt, never surfaced as blocks.

pub mod journal;
pub mod rating;
mod record;

pub use record::{submission_key, SubmissionRecord};

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assignment::Assignment;
use crate::catalog::{self, Stimulus};
use crate::gateway::SurveyGateway;
use crate::shuffle::{seed_label, stable_shuffle};
use journal::TrialJournal;
use rating::{AgeBucket, Demographics, Dimension, Gender, Rating, RatingSnapshot, RatingVector};

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No group resolved yet, either a fresh start or an unlocked reset.
    AwaitingGroup,
    /// Showing the trial at this 0-based position of the shuffled order.
    InTrial(usize),
    /// Every trial submitted.
    Complete,
}

/// Result of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(Phase),
    Blocked(Blocker),
}

/// Why a navigation attempt was refused. Surfaced as a disabled control or
/// an inline hint, never as an error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    /// No group has been resolved for this session.
    NotStarted,
    /// A group is already fixed for this session.
    GroupAlreadyAssigned,
    /// The named dimension has no answer yet.
    IncompleteRatings(Dimension),
    /// The first trial needs an age bucket before it can be submitted.
    MissingAgeBucket,
    /// Already at the first trial.
    AtFirstTrial,
    /// The session is already past its last trial.
    AlreadyComplete,
    /// The group resolved to an empty stimulus list.
    EmptyCatalog,
}

/// Editable state of the trial on screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialDraft {
    pub ratings: RatingVector,
    pub gender: Gender,
    pub age_bucket: Option<AgeBucket>,
}

pub struct SurveySession {
    participant_id: String,
    assignment: Option<Assignment>,
    order: Vec<Stimulus>,
    phase: Phase,
    draft: TrialDraft,
    history: Vec<SubmissionRecord>,
    unsent: VecDeque<SubmissionRecord>,
    gateway: Arc<dyn SurveyGateway>,
    journal: Option<TrialJournal>,
}

impl SurveySession {
    pub fn new(gateway: Arc<dyn SurveyGateway>) -> Self {
        Self {
            participant_id: fresh_participant_id(),
            assignment: None,
            order: Vec::new(),
            phase: Phase::AwaitingGroup,
            draft: TrialDraft::default(),
            history: Vec::new(),
            unsent: VecDeque::new(),
            gateway,
            journal: None,
        }
    }

    /// Attach a local journal that receives every built row.
    pub fn with_journal(mut self, journal: TrialJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn assignment(&self) -> Option<Assignment> {
        self.assignment
    }

    /// The stimulus on screen, if a trial is active.
    pub fn current_stimulus(&self) -> Option<&Stimulus> {
        match self.phase {
            Phase::InTrial(index) => self.order.get(index),
            _ => None,
        }
    }

    pub fn stimulus_order(&self) -> &[Stimulus] {
        &self.order
    }

    pub fn trial_count(&self) -> usize {
        self.order.len()
    }

    /// Rows submitted so far, oldest first.
    pub fn history(&self) -> &[SubmissionRecord] {
        &self.history
    }

    pub fn draft(&self) -> &TrialDraft {
        &self.draft
    }

    pub fn set_rating(&mut self, dimension: Dimension, value: Rating) {
        self.draft.ratings.set(dimension, value);
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.draft.gender = gender;
    }

    pub fn set_age_bucket(&mut self, age_bucket: AgeBucket) {
        self.draft.age_bucket = Some(age_bucket);
    }

    /// Resolve the stimulus order for `assignment` and enter the first
    /// trial. The order is fixed for the life of the session: same
    /// participant, same group, same order.
    pub fn begin(&mut self, assignment: Assignment) -> StepOutcome {
        if self.phase != Phase::AwaitingGroup {
            return StepOutcome::Blocked(Blocker::GroupAlreadyAssigned);
        }
        let pool = catalog::group_catalog(assignment.group);
        if pool.is_empty() {
            return StepOutcome::Blocked(Blocker::EmptyCatalog);
        }
        let seed = seed_label(&self.participant_id, assignment.group.get());
        self.order = stable_shuffle(pool, &seed);
        self.assignment = Some(assignment);
        self.phase = Phase::InTrial(0);
        info!(
            participant = %self.participant_id,
            group = assignment.group.get(),
            locked = assignment.locked,
            trials = self.order.len(),
            "session started"
        );
        StepOutcome::Moved(self.phase)
    }

    /// Why the forward step would be refused right now, if anything.
    pub fn advance_blocker(&self) -> Option<Blocker> {
        self.guard().err()
    }

    fn guard(&self) -> Result<(usize, RatingSnapshot), Blocker> {
        let index = match self.phase {
            Phase::AwaitingGroup => return Err(Blocker::NotStarted),
            Phase::Complete => return Err(Blocker::AlreadyComplete),
            Phase::InTrial(index) => index,
        };
        let ratings = match self.draft.ratings.complete() {
            Some(snapshot) => snapshot,
            None => {
                // first_unset is Some exactly when complete() is None
                let dimension = self
                    .draft
                    .ratings
                    .first_unset()
                    .unwrap_or(Dimension::ModestLuxury);
                return Err(Blocker::IncompleteRatings(dimension));
            }
        };
        if index == 0 && self.draft.age_bucket.is_none() {
            return Err(Blocker::MissingAgeBucket);
        }
        Ok((index, ratings))
    }

    /// Submit the current trial and move forward.
    ///
    /// A guard failure leaves every piece of state untouched and reports the
    /// blocker. Delivery failures are queued for one later retry; the
    /// session still moves.
    pub async fn advance(&mut self) -> StepOutcome {
        let (index, ratings) = match self.guard() {
            Ok(parts) => parts,
            Err(blocker) => return StepOutcome::Blocked(blocker),
        };
        let Some(assignment) = self.assignment else {
            return StepOutcome::Blocked(Blocker::NotStarted);
        };
        let Some(stimulus) = self.order.get(index).copied() else {
            return StepOutcome::Blocked(Blocker::EmptyCatalog);
        };

        let demographics = match (index, self.draft.age_bucket) {
            (0, Some(age_bucket)) => Some(Demographics {
                gender: self.draft.gender,
                age_bucket,
            }),
            _ => None,
        };
        let record = SubmissionRecord {
            timestamp: Utc::now(),
            participant_id: self.participant_id.clone(),
            group_id: assignment.group,
            stimulus_id: stimulus.id,
            gender: demographics.map(|d| d.gender),
            age_bucket: demographics.map(|d| d.age_bucket),
            ratings,
            trial_no: (index + 1) as u32,
            key: submission_key(&self.participant_id, assignment.group, stimulus.id),
        };

        if let Some(journal) = &self.journal {
            if let Err(err) = journal.append(&record).await {
                warn!(error = %err, "journal append failed");
            }
        }

        self.flush_unsent().await;
        if let Err(err) = self.gateway.submit(&record).await {
            warn!(error = %err, key = %record.key, "submission failed, queueing for retry");
            self.unsent.push_back(record.clone());
        }

        self.history.push(record);
        self.draft.ratings.clear();
        self.phase = if index + 1 < self.order.len() {
            Phase::InTrial(index + 1)
        } else {
            info!(participant = %self.participant_id, trials = self.order.len(), "session complete");
            Phase::Complete
        };
        StepOutcome::Moved(self.phase)
    }

    /// One redelivery pass over queued rows, oldest first, before the next
    /// row goes out. A row that fails again is dropped from the queue; the
    /// journal still has it and the backend dedupes by key anyway.
    async fn flush_unsent(&mut self) {
        while let Some(record) = self.unsent.pop_front() {
            if let Err(err) = self.gateway.submit(&record).await {
                warn!(error = %err, key = %record.key, "redelivery failed, dropping from queue");
            } else {
                debug!(key = %record.key, "redelivered queued row");
            }
        }
    }

    /// Step back one trial: pop the last submitted row and rehydrate its
    /// answers for editing. At the first trial this is a refusal, not a
    /// reset.
    pub fn retreat(&mut self) -> StepOutcome {
        let index = match self.phase {
            Phase::AwaitingGroup => return StepOutcome::Blocked(Blocker::NotStarted),
            Phase::InTrial(0) => return StepOutcome::Blocked(Blocker::AtFirstTrial),
            Phase::InTrial(index) => index,
            Phase::Complete => self.order.len(),
        };
        let Some(last) = self.history.pop() else {
            return StepOutcome::Blocked(Blocker::AtFirstTrial);
        };

        // The popped row no longer reflects where the participant is;
        // a queued redelivery of it must not fire.
        self.unsent.retain(|queued| queued.key != last.key);

        self.draft.ratings = RatingVector::from(&last.ratings);
        if let Some(demographics) = last.demographics() {
            self.draft.gender = demographics.gender;
            self.draft.age_bucket = Some(demographics.age_bucket);
        }
        self.phase = Phase::InTrial(index - 1);
        debug!(trial_no = index, "retreated one trial");
        StepOutcome::Moved(self.phase)
    }

    /// Start over as a brand-new participant: fresh identity, empty history
    /// and draft, empty retry queue. A locked group is kept and re-entered
    /// immediately (with a new shuffle, since the identity changed); an
    /// unlocked session returns to [`Phase::AwaitingGroup`] so the caller
    /// can draw the next rotation group.
    pub fn reset(&mut self) -> Phase {
        self.participant_id = fresh_participant_id();
        self.draft = TrialDraft::default();
        self.history.clear();
        self.unsent.clear();
        self.order.clear();
        self.phase = Phase::AwaitingGroup;
        match self.assignment {
            Some(assignment) if assignment.locked => {
                self.begin(assignment);
            }
            _ => {
                self.assignment = None;
            }
        }
        info!(participant = %self.participant_id, "session reset");
        self.phase
    }
}

fn fresh_participant_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::GroupId;
    use crate::gateway::{GatewayResult, ImageSummary, SummaryList};
    use async_trait::async_trait;

    /// Accepts everything, records nothing.
    struct NullGateway;

    #[async_trait]
    impl SurveyGateway for NullGateway {
        async fn submit(&self, _record: &SubmissionRecord) -> GatewayResult<()> {
            Ok(())
        }

        async fn summary_list(&self, _group: GroupId) -> GatewayResult<SummaryList> {
            Ok(SummaryList::default())
        }

        async fn summary_by_image(&self, _g: GroupId, _id: u32) -> GatewayResult<ImageSummary> {
            Ok(ImageSummary::default())
        }
    }

    fn locked(group: u8) -> Assignment {
        Assignment {
            group: GroupId::new(group).expect("valid group"),
            locked: true,
        }
    }

    #[test]
    fn fresh_session_awaits_group() {
        let mut session = SurveySession::new(Arc::new(NullGateway));
        assert_eq!(session.phase(), Phase::AwaitingGroup);
        assert_eq!(session.advance_blocker(), Some(Blocker::NotStarted));
        assert_eq!(session.retreat(), StepOutcome::Blocked(Blocker::NotStarted));
        assert!(session.current_stimulus().is_none());
    }

    #[test]
    fn begin_fixes_a_deterministic_order() {
        let mut session = SurveySession::new(Arc::new(NullGateway));
        assert_eq!(session.begin(locked(3)), StepOutcome::Moved(Phase::InTrial(0)));

        let seed = seed_label(session.participant_id(), 3);
        let expected = stable_shuffle(
            catalog::group_catalog(GroupId::new(3).expect("valid group")),
            &seed,
        );
        assert_eq!(session.stimulus_order(), expected.as_slice());
        assert_eq!(session.trial_count(), 6);
    }

    #[test]
    fn begin_twice_is_refused() {
        let mut session = SurveySession::new(Arc::new(NullGateway));
        session.begin(locked(1));
        assert_eq!(
            session.begin(locked(2)),
            StepOutcome::Blocked(Blocker::GroupAlreadyAssigned)
        );
        assert_eq!(session.assignment().map(|a| a.group.get()), Some(1));
    }
}
