//! Per-subject check-in orchestration.
//!
//! [`CheckInService`] owns one [`CheckInSession`] per subject, fires the
//! initial and periodic check-ins for open dashboards, and turns transitions
//! into side effects: emergency records to the [`NotificationSink`], prompt
//! visibility to [`CheckInObserver`]s, and [`Event`]s to an outbox the
//! presentation layer drains.
//!
//! Sink failures are logged and never roll a transition back.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::engine::{CheckInSession, CheckInState, Countdown, Rejection, Tick, Transition, TransitionOutcome, Trigger};
use super::escalation::{Cadence, EscalationPolicy};
use crate::clock::{Clock, SystemClock};
use crate::emergency::{EmergencyEvent, EmergencyTrigger, ResponseKind, SafetyResponse};
use crate::events::Event;
use crate::notify::{LogSink, NotificationSink, NullSink};
use crate::profile::{ProfileStore, SubjectId};
use crate::storage::Config;

/// Tone of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Presentation hooks. The service calls them; it never owns the UI.
pub trait CheckInObserver: Send + Sync {
    /// A check-in prompt should become visible.
    fn prompt_shown(&self, _subject: &SubjectId, _deadline: DateTime<Utc>) {}

    /// Countdown text changed.
    fn countdown(&self, _subject: &SubjectId, _countdown: &Countdown) {}

    /// The prompt should be hidden; `outcome` is the state that closed it.
    fn prompt_hidden(&self, _subject: &SubjectId, _outcome: CheckInState) {}

    /// Short message for the user (toast).
    fn notice(&self, _subject: &SubjectId, _message: &str, _level: NoticeLevel) {}
}

/// Maximum number of undrained events held by a [`CheckInService`].
pub const OUTBOX_LIMIT: usize = 1024;

#[derive(Debug)]
struct SubjectEntry {
    session: CheckInSession,
    /// `Some` while the subject's dashboard is open.
    cadence: Option<Cadence>,
}

/// Check-in engine for every tracked subject.
///
/// Events accumulate in an outbox until [`CheckInService::drain_events`].
pub struct CheckInService {
    policy: EscalationPolicy,
    clock: Arc<dyn Clock>,
    profiles: Arc<dyn ProfileStore>,
    sink: Arc<dyn NotificationSink>,
    observers: Vec<Arc<dyn CheckInObserver>>,
    require_panic_confirmation: bool,
    subjects: BTreeMap<SubjectId, SubjectEntry>,
    outbox: Vec<Event>,
}

impl CheckInService {
    /// Create a service using the wall clock.
    pub fn new(
        policy: EscalationPolicy,
        profiles: Arc<dyn ProfileStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            policy,
            clock: Arc::new(SystemClock),
            profiles,
            sink,
            observers: Vec::new(),
            require_panic_confirmation: true,
            subjects: BTreeMap::new(),
            outbox: Vec::new(),
        }
    }

    /// Build from application config. Disabled notifications use a null sink.
    pub fn from_config(config: &Config, profiles: Arc<dyn ProfileStore>) -> Self {
        let sink: Arc<dyn NotificationSink> = if config.notifications.enabled {
            Arc::new(LogSink)
        } else {
            Arc::new(NullSink)
        };
        Self::new(EscalationPolicy::from(&config.checkin), profiles, sink)
            .require_panic_confirmation(config.emergency.require_panic_confirmation)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CheckInObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn require_panic_confirmation(mut self, required: bool) -> Self {
        self.require_panic_confirmation = required;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_active(&self, subject: &SubjectId) -> bool {
        self.subjects
            .get(subject)
            .is_some_and(|e| e.cadence.is_some())
    }

    /// Current state; unknown subjects are `Idle`.
    pub fn state(&self, subject: &SubjectId) -> CheckInState {
        self.subjects
            .get(subject)
            .map_or(CheckInState::Idle, |e| e.session.state())
    }

    pub fn remaining(&self, subject: &SubjectId) -> Option<Duration> {
        let now = self.now();
        self.subjects.get(subject)?.session.remaining(now)
    }

    pub fn countdown(&self, subject: &SubjectId) -> Option<Countdown> {
        let now = self.now();
        self.subjects.get(subject)?.session.countdown(now)
    }

    /// When the next scheduled check-in will fire, if the dashboard is open.
    pub fn next_check_in(&self, subject: &SubjectId) -> Option<DateTime<Utc>> {
        self.subjects
            .get(subject)?
            .cadence
            .as_ref()
            .map(Cadence::next_due)
    }

    pub fn snapshot(&self, subject: &SubjectId) -> Event {
        let now = self.now();
        match self.subjects.get(subject) {
            Some(entry) => entry.session.snapshot(now),
            None => CheckInSession::new(subject.clone(), self.policy).snapshot(now),
        }
    }

    /// Take every event recorded since the last drain.
    ///
    /// Call this regularly. Undrained events are kept up to
    /// [`OUTBOX_LIMIT`]; past that, countdown ticks are shed first, then the
    /// oldest events.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    // ── Dashboard lifecycle ──────────────────────────────────────────

    /// Open the subject's dashboard and schedule its check-ins.
    /// Returns `false` if it was already open.
    pub fn activate_dashboard(&mut self, subject: &SubjectId) -> bool {
        let now = self.now();
        let policy = self.policy;
        let entry = self
            .subjects
            .entry(subject.clone())
            .or_insert_with(|| SubjectEntry {
                session: CheckInSession::new(subject.clone(), policy),
                cadence: None,
            });
        if entry.cadence.is_some() {
            return false;
        }
        entry.cadence = Some(Cadence::new(now, &policy));
        tracing::info!(subject = %subject, "dashboard activated");
        self.record(Event::DashboardActivated {
            subject_id: subject.clone(),
            at: now,
        });
        true
    }

    /// Close the dashboard (logout). A pending prompt is dropped, not
    /// escalated, unless its deadline has already passed.
    pub async fn deactivate_dashboard(&mut self, subject: &SubjectId) -> bool {
        let now = self.now();
        let Some(entry) = self.subjects.get_mut(subject) else {
            return false;
        };
        if entry.cadence.take().is_none() {
            return false;
        }
        let outcome = entry.session.close(now);
        if outcome.is_applied() {
            self.apply(outcome, Trigger::DashboardClosed, subject).await;
        }
        tracing::info!(subject = %subject, "dashboard deactivated");
        self.record(Event::DashboardDeactivated {
            subject_id: subject.clone(),
            at: now,
        });
        true
    }

    // ── Triggers ─────────────────────────────────────────────────────

    /// Open a check-in now. Rejected while one is pending or the dashboard is closed.
    pub async fn start_cycle(&mut self, subject: &SubjectId) -> TransitionOutcome {
        self.start_with(subject, Trigger::Manual).await
    }

    /// "I'm safe".
    pub async fn confirm_safe(&mut self, subject: &SubjectId) -> TransitionOutcome {
        let now = self.now();
        let outcome = match self.subjects.get_mut(subject) {
            Some(entry) => entry.session.confirm_safe(now),
            None => TransitionOutcome::ignored(Rejection::NoActiveSession),
        };
        self.apply(outcome, Trigger::ConfirmSafe, subject).await
    }

    /// "Need help".
    pub async fn request_help(&mut self, subject: &SubjectId) -> TransitionOutcome {
        let now = self.now();
        let outcome = match self.subjects.get_mut(subject) {
            Some(entry) => entry.session.request_help(now),
            None => TransitionOutcome::ignored(Rejection::NoActiveSession),
        };
        self.apply(outcome, Trigger::RequestHelp, subject).await
    }

    /// Advance every subject: countdowns, expiries, then due check-ins.
    /// Returns the transitions this tick applied.
    pub async fn on_tick(&mut self) -> Vec<Transition> {
        let now = self.now();
        let policy = self.policy;
        let subjects: Vec<SubjectId> = self.subjects.keys().cloned().collect();
        let mut applied = Vec::new();

        for subject in subjects {
            let tick = match self.subjects.get_mut(&subject) {
                Some(entry) => entry.session.tick(now),
                None => continue,
            };
            match tick {
                Tick::Inactive => {}
                Tick::Countdown(countdown) => {
                    for observer in &self.observers {
                        observer.countdown(&subject, &countdown);
                    }
                    self.record(Event::CountdownTick {
                        subject_id: subject.clone(),
                        remaining_secs: countdown.remaining_secs,
                        display: countdown.display,
                        urgency: countdown.urgency,
                        at: now,
                    });
                }
                Tick::Expired(transition) => {
                    let outcome = TransitionOutcome::Applied(transition);
                    if let TransitionOutcome::Applied(t) =
                        self.apply(outcome, Trigger::DeadlineExpired, &subject).await
                    {
                        applied.push(t);
                    }
                }
            }

            let due = self
                .subjects
                .get_mut(&subject)
                .and_then(|e| e.cadence.as_mut())
                .and_then(|c| c.poll(now, &policy));
            if let Some(trigger) = due {
                if let TransitionOutcome::Applied(t) = self.start_with(&subject, trigger).await {
                    applied.push(t);
                }
            }
        }
        applied
    }

    /// Panic button. Bypasses the check-in machine entirely.
    ///
    /// Returns the emergency record, or `None` when confirmation was required
    /// and not given.
    pub async fn trigger_panic(
        &mut self,
        subject: &SubjectId,
        confirmed: bool,
    ) -> Option<EmergencyEvent> {
        let now = self.now();
        if self.require_panic_confirmation && !confirmed {
            tracing::debug!(subject = %subject, "panic not confirmed; ignoring");
            self.record(Event::PanicCancelled {
                subject_id: subject.clone(),
                at: now,
            });
            return None;
        }
        tracing::warn!(subject = %subject, "panic button triggered");
        let emergency = self.raise_emergency(subject, EmergencyTrigger::Panic, now).await;
        self.notify(subject, "Emergency services have been notified!", NoticeLevel::Error);
        Some(emergency)
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn start_with(&mut self, subject: &SubjectId, trigger: Trigger) -> TransitionOutcome {
        let now = self.now();
        let outcome = match self.subjects.get_mut(subject) {
            Some(entry) if entry.cadence.is_some() => entry.session.start(now, trigger),
            _ => TransitionOutcome::ignored(Rejection::DashboardInactive),
        };
        self.apply(outcome, trigger, subject).await
    }

    /// Turn an engine outcome into events, notifications and observer calls.
    async fn apply(
        &mut self,
        outcome: TransitionOutcome,
        attempted: Trigger,
        subject: &SubjectId,
    ) -> TransitionOutcome {
        if let TransitionOutcome::Ignored { reason } = outcome {
            tracing::debug!(subject = %subject, trigger = ?attempted, %reason, "trigger ignored");
            let at = self.now();
            self.record(Event::TriggerIgnored {
                subject_id: subject.clone(),
                trigger: attempted,
                reason,
                at,
            });
            return outcome;
        }
        let Some(transition) = outcome.transition().cloned() else {
            return outcome;
        };

        match transition.to {
            CheckInState::AwaitingResponse => {
                let deadline = self.policy.deadline_from(transition.at);
                tracing::info!(
                    subject = %subject,
                    cycle = transition.cycle,
                    trigger = ?transition.trigger,
                    %deadline,
                    "safety check-in started"
                );
                for observer in &self.observers {
                    observer.prompt_shown(subject, deadline);
                }
                self.record(Event::CheckInStarted {
                    subject_id: subject.clone(),
                    cycle: transition.cycle,
                    trigger: transition.trigger,
                    deadline,
                    window_secs: self.policy.response_window_secs,
                    at: transition.at,
                });
            }
            CheckInState::Confirmed => {
                tracing::info!(subject = %subject, cycle = transition.cycle, "safety confirmed");
                self.hide_prompt(subject, CheckInState::Confirmed);
                self.record(Event::SafetyConfirmed {
                    subject_id: subject.clone(),
                    cycle: transition.cycle,
                    at: transition.at,
                });
                self.log_response(subject, ResponseKind::Safe, transition.at).await;
                self.notify(subject, "Safety confirmed. Thank you!", NoticeLevel::Success);
            }
            CheckInState::Escalated => {
                let trigger = transition
                    .emergency_trigger()
                    .unwrap_or(EmergencyTrigger::Timeout);
                tracing::warn!(
                    subject = %subject,
                    cycle = transition.cycle,
                    trigger = ?trigger,
                    "safety check-in escalated"
                );
                self.hide_prompt(subject, CheckInState::Escalated);
                self.record(Event::CheckInEscalated {
                    subject_id: subject.clone(),
                    cycle: transition.cycle,
                    trigger,
                    at: transition.at,
                });
                self.raise_emergency(subject, trigger, transition.at).await;
                self.notify(subject, "Emergency services have been notified!", NoticeLevel::Error);
                if trigger == EmergencyTrigger::Timeout {
                    self.notify(subject, "Emergency alert sent to authorities!", NoticeLevel::Error);
                }
            }
            CheckInState::Idle => {
                tracing::info!(subject = %subject, cycle = transition.cycle, "pending check-in cancelled");
                self.hide_prompt(subject, CheckInState::Idle);
                self.record(Event::CheckInCancelled {
                    subject_id: subject.clone(),
                    cycle: transition.cycle,
                    at: transition.at,
                });
            }
        }
        outcome
    }

    async fn raise_emergency(
        &mut self,
        subject: &SubjectId,
        trigger: EmergencyTrigger,
        at: DateTime<Utc>,
    ) -> EmergencyEvent {
        let profile = self.profiles.profile(subject);
        if profile.is_none() {
            tracing::warn!(subject = %subject, "no profile on record; emergency sent with partial data");
        }
        let emergency = EmergencyEvent::new(subject.clone(), trigger, profile.as_ref(), at);
        if profile.is_some() && !emergency.location().is_known() {
            tracing::warn!(subject = %subject, "no last known location; emergency sent without one");
        }
        self.record(Event::EmergencyRaised {
            emergency: emergency.clone(),
        });
        if let Err(e) = self.sink.emergency(&emergency).await {
            tracing::warn!(subject = %subject, sink = self.sink.name(), error = %e, "emergency dispatch failed");
        }
        self.log_response(subject, ResponseKind::Emergency, at).await;
        emergency
    }

    async fn log_response(&mut self, subject: &SubjectId, response: ResponseKind, at: DateTime<Utc>) {
        let entry = SafetyResponse {
            subject_id: subject.clone(),
            response,
            at,
        };
        self.record(Event::ResponseLogged {
            subject_id: subject.clone(),
            response,
            at,
        });
        if let Err(e) = self.sink.safety_response(&entry).await {
            tracing::warn!(subject = %subject, sink = self.sink.name(), error = %e, "response log dispatch failed");
        }
    }

    fn hide_prompt(&self, subject: &SubjectId, outcome: CheckInState) {
        for observer in &self.observers {
            observer.prompt_hidden(subject, outcome);
        }
    }

    fn notify(&self, subject: &SubjectId, message: &str, level: NoticeLevel) {
        for observer in &self.observers {
            observer.notice(subject, message, level);
        }
    }

    fn record(&mut self, event: Event) {
        if self.outbox.len() >= OUTBOX_LIMIT {
            // Later countdown ticks supersede earlier ones.
            self.outbox
                .retain(|e| !matches!(e, Event::CountdownTick { .. }));
            if self.outbox.len() >= OUTBOX_LIMIT {
                let excess = self.outbox.len() + 1 - OUTBOX_LIMIT;
                tracing::warn!(dropped = excess, "event outbox full; dropping oldest events");
                self.outbox.drain(..excess);
            }
        }
        self.outbox.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::RecordingSink;
    use crate::profile::{sample_profile, InMemoryProfileStore, LastKnownLocation};
    use std::sync::Mutex;

    struct Harness {
        service: CheckInService,
        clock: Arc<ManualClock>,
        sink: Arc<RecordingSink>,
        profiles: Arc<InMemoryProfileStore>,
        subject: SubjectId,
        t0: DateTime<Utc>,
    }

    /// First check-in fires on the first tick; next one ten minutes later.
    fn immediate_policy() -> EscalationPolicy {
        EscalationPolicy {
            initial_delay_secs: 0,
            period_secs: 600,
            response_window_secs: 300,
            ..EscalationPolicy::default()
        }
    }

    fn harness_with(policy: EscalationPolicy, sink: RecordingSink) -> Harness {
        let t0 = Utc::now();
        let clock = Arc::new(ManualClock::new(t0));
        let sink = Arc::new(sink);
        let profiles = Arc::new(InMemoryProfileStore::new());
        profiles.insert(sample_profile("TOUR-1234"));
        let service =
            CheckInService::new(policy, profiles.clone(), sink.clone()).with_clock(clock.clone());
        Harness {
            service,
            clock,
            sink,
            profiles,
            subject: SubjectId::from("TOUR-1234"),
            t0,
        }
    }

    fn harness() -> Harness {
        harness_with(immediate_policy(), RecordingSink::new())
    }

    impl Harness {
        fn at(&self, secs: i64) {
            self.clock.set(self.t0 + Duration::seconds(secs));
        }

        /// Open the dashboard at t=0 and let the first tick start the cycle.
        async fn open_cycle(&mut self) {
            self.at(0);
            self.service.activate_dashboard(&self.subject);
            let applied = self.service.on_tick().await;
            assert_eq!(applied.len(), 1);
            assert_eq!(applied[0].to, CheckInState::AwaitingResponse);
        }

        async fn tick_through(&mut self, from: i64, to: i64) {
            for secs in from..=to {
                self.at(secs);
                self.service.on_tick().await;
            }
        }
    }

    #[tokio::test]
    async fn confirm_before_deadline_never_escalates() {
        let mut h = harness();
        h.open_cycle().await;

        h.at(120);
        let outcome = h.service.confirm_safe(&h.subject).await;
        assert_eq!(outcome.transition().unwrap().to, CheckInState::Confirmed);
        assert_eq!(h.service.state(&h.subject), CheckInState::Confirmed);

        h.tick_through(121, 400).await;
        assert!(h.sink.emergencies().is_empty());
        let responses = h.sink.responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].response, ResponseKind::Safe);
    }

    #[tokio::test]
    async fn unanswered_check_in_escalates_once() {
        let mut h = harness();
        h.open_cycle().await;
        h.tick_through(1, 305).await;

        let emergencies = h.sink.emergencies();
        assert_eq!(emergencies.len(), 1);
        assert_eq!(emergencies[0].trigger(), EmergencyTrigger::Timeout);
        assert_eq!(emergencies[0].at(), h.t0 + Duration::seconds(300));
        assert_eq!(
            emergencies[0].location(),
            &LastKnownLocation::region("Delhi NCR")
        );
        assert_eq!(h.service.state(&h.subject), CheckInState::Escalated);
    }

    #[tokio::test]
    async fn help_request_escalates_immediately_and_cancels_countdown() {
        let mut h = harness();
        h.open_cycle().await;

        h.at(10);
        let outcome = h.service.request_help(&h.subject).await;
        assert_eq!(outcome.transition().unwrap().to, CheckInState::Escalated);
        assert_eq!(h.sink.emergencies().len(), 1);
        assert_eq!(h.sink.emergencies()[0].trigger(), EmergencyTrigger::HelpRequested);

        h.service.drain_events();
        h.tick_through(11, 400).await;
        assert_eq!(h.sink.emergencies().len(), 1);
        assert!(!h
            .service
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::CountdownTick { .. } | Event::EmergencyRaised { .. })));
    }

    #[tokio::test]
    async fn countdown_events_follow_the_deadline() {
        let mut h = harness();
        h.open_cycle().await;
        h.service.drain_events();

        h.at(1);
        h.service.on_tick().await;
        // A stalled timer: the next tick arrives 100 seconds late.
        h.at(101);
        h.service.on_tick().await;

        let displays: Vec<String> = h
            .service
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                Event::CountdownTick { display, .. } => Some(display),
                _ => None,
            })
            .collect();
        assert_eq!(displays, vec!["4:59", "3:19"]);
    }

    #[tokio::test]
    async fn repeated_actions_are_idempotent() {
        let mut h = harness();
        h.service.activate_dashboard(&h.subject);
        h.service.start_cycle(&h.subject).await;
        h.at(5);
        assert!(h.service.request_help(&h.subject).await.is_applied());
        assert_eq!(
            h.service.request_help(&h.subject).await.rejection(),
            Some(Rejection::AlreadyEscalated)
        );
        assert_eq!(
            h.service.confirm_safe(&h.subject).await.rejection(),
            Some(Rejection::AlreadyEscalated)
        );
        assert_eq!(h.sink.emergencies().len(), 1);
    }

    #[tokio::test]
    async fn overlapping_cycle_is_rejected() {
        let mut h = harness();
        h.service.activate_dashboard(&h.subject);
        assert!(h.service.start_cycle(&h.subject).await.is_applied());
        let outcome = h.service.start_cycle(&h.subject).await;
        assert_eq!(outcome.rejection(), Some(Rejection::AlreadyPending));
        assert!(h.service.drain_events().iter().any(|e| matches!(
            e,
            Event::TriggerIgnored {
                reason: Rejection::AlreadyPending,
                ..
            }
        )));
    }

    #[tokio::test]
    async fn start_requires_active_dashboard() {
        let mut h = harness();
        assert_eq!(
            h.service.start_cycle(&h.subject).await.rejection(),
            Some(Rejection::DashboardInactive)
        );
        assert_eq!(
            h.service.confirm_safe(&SubjectId::from("TOUR-0000")).await.rejection(),
            Some(Rejection::NoActiveSession)
        );
    }

    #[tokio::test]
    async fn cadence_drives_initial_and_periodic_check_ins() {
        let mut h = harness_with(EscalationPolicy::with_window(300), RecordingSink::new());
        h.service.activate_dashboard(&h.subject);

        h.at(4);
        assert!(h.service.on_tick().await.is_empty());
        h.at(5);
        let applied = h.service.on_tick().await;
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].trigger, Trigger::InitialCheckIn);

        h.at(30);
        h.service.confirm_safe(&h.subject).await;

        h.at(600);
        let applied = h.service.on_tick().await;
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].trigger, Trigger::PeriodicCheckIn);
        assert_eq!(applied[0].cycle, 2);
        assert_eq!(
            h.service.next_check_in(&h.subject),
            Some(h.t0 + Duration::seconds(1200))
        );
    }

    #[tokio::test]
    async fn periodic_tick_during_pending_cycle_is_rejected() {
        let policy = EscalationPolicy {
            initial_delay_secs: 5,
            period_secs: 60,
            response_window_secs: 300,
            ..EscalationPolicy::default()
        };
        let mut h = harness_with(policy, RecordingSink::new());
        h.service.activate_dashboard(&h.subject);
        h.at(5);
        assert_eq!(h.service.on_tick().await.len(), 1);
        h.at(60);
        assert!(h.service.on_tick().await.is_empty());
        assert_eq!(h.service.countdown(&h.subject).unwrap().remaining_secs, 245);
    }

    #[tokio::test]
    async fn deactivate_drops_pending_prompt_without_emergency() {
        let mut h = harness();
        h.open_cycle().await;
        h.at(30);
        assert!(h.service.deactivate_dashboard(&h.subject).await);
        assert_eq!(h.service.state(&h.subject), CheckInState::Idle);

        h.tick_through(31, 1300).await;
        assert!(h.sink.emergencies().is_empty());
        assert!(!h.service.is_active(&h.subject));
        assert!(!h.service.deactivate_dashboard(&h.subject).await);
    }

    #[tokio::test]
    async fn logout_after_unticked_deadline_still_escalates() {
        let mut h = harness();
        h.open_cycle().await;
        // The deadline passes without a tick before the tourist logs out.
        h.at(310);
        assert!(h.service.deactivate_dashboard(&h.subject).await);

        let emergencies = h.sink.emergencies();
        assert_eq!(emergencies.len(), 1);
        assert_eq!(emergencies[0].trigger(), EmergencyTrigger::Timeout);
        assert_eq!(h.service.state(&h.subject), CheckInState::Escalated);
        assert!(!h.service.is_active(&h.subject));

        let events = h.service.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::CheckInEscalated { trigger: EmergencyTrigger::Timeout, .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::CheckInCancelled { .. })));
        assert!(matches!(events.last(), Some(Event::DashboardDeactivated { .. })));

        h.tick_through(311, 1300).await;
        assert_eq!(h.sink.emergencies().len(), 1);
    }

    #[tokio::test]
    async fn emergency_uses_latest_known_location() {
        let mut h = harness();
        h.open_cycle().await;
        assert!(h.profiles.update_location(
            &h.subject,
            LastKnownLocation::Coordinates { lat: 28.6129, lng: 77.2295 },
        ));

        h.at(20);
        h.service.request_help(&h.subject).await;
        let emergencies = h.sink.emergencies();
        assert_eq!(
            emergencies[0].location(),
            &LastKnownLocation::Coordinates { lat: 28.6129, lng: 77.2295 }
        );
        assert!(emergencies[0].location().is_known());
    }

    #[tokio::test]
    async fn undrained_outbox_stays_bounded() {
        let policy = EscalationPolicy {
            initial_delay_secs: 0,
            period_secs: 10_000,
            response_window_secs: 3_000,
            ..EscalationPolicy::default()
        };
        let mut h = harness_with(policy, RecordingSink::new());
        h.open_cycle().await;
        h.tick_through(1, 2_000).await;

        let events = h.service.drain_events();
        assert!(events.len() <= OUTBOX_LIMIT);
        assert!(matches!(events.first(), Some(Event::DashboardActivated { .. })));
        assert!(events.iter().any(|e| matches!(e, Event::CheckInStarted { .. })));
        match events.last() {
            Some(Event::CountdownTick { remaining_secs, .. }) => assert_eq!(*remaining_secs, 1_000),
            other => panic!("Expected CountdownTick, got {other:?}"),
        }
        assert!(h.service.drain_events().is_empty());
    }

    #[tokio::test]
    async fn panic_requires_confirmation() {
        let mut h = harness();
        assert!(h.service.trigger_panic(&h.subject, false).await.is_none());
        assert!(h.sink.emergencies().is_empty());

        let emergency = h.service.trigger_panic(&h.subject, true).await.unwrap();
        assert_eq!(emergency.trigger(), EmergencyTrigger::Panic);
        assert_eq!(emergency.profile().blood_group.as_deref(), Some("O+"));
        assert_eq!(h.sink.emergencies().len(), 1);
        assert_eq!(h.sink.responses()[0].response, ResponseKind::Emergency);
        // The check-in machine is untouched.
        assert_eq!(h.service.state(&h.subject), CheckInState::Idle);
    }

    #[tokio::test]
    async fn emergency_with_unknown_profile_is_still_emitted() {
        let mut h = harness();
        let stranger = SubjectId::from("TOUR-9999");
        h.service.activate_dashboard(&stranger);
        h.service.start_cycle(&stranger).await;
        h.service.request_help(&stranger).await;

        let emergencies = h.sink.emergencies();
        assert_eq!(emergencies.len(), 1);
        assert_eq!(emergencies[0].location(), &LastKnownLocation::Unknown);
        assert!(emergencies[0].profile().blood_group.is_none());
    }

    #[tokio::test]
    async fn sink_failure_does_not_roll_back() {
        let mut h = harness_with(immediate_policy(), RecordingSink::failing());
        h.service.activate_dashboard(&h.subject);
        h.service.start_cycle(&h.subject).await;
        h.service.request_help(&h.subject).await;
        assert_eq!(h.service.state(&h.subject), CheckInState::Escalated);
        assert_eq!(h.sink.emergencies().len(), 1);
    }

    #[derive(Default)]
    struct PromptRecorder {
        calls: Mutex<Vec<String>>,
    }

    impl CheckInObserver for PromptRecorder {
        fn prompt_shown(&self, _subject: &SubjectId, _deadline: DateTime<Utc>) {
            self.calls.lock().unwrap().push("shown".into());
        }
        fn countdown(&self, _subject: &SubjectId, countdown: &Countdown) {
            self.calls.lock().unwrap().push(countdown.display.clone());
        }
        fn prompt_hidden(&self, _subject: &SubjectId, outcome: CheckInState) {
            self.calls.lock().unwrap().push(format!("hidden:{outcome}"));
        }
    }

    #[tokio::test]
    async fn observer_sees_prompt_lifecycle() {
        let mut h = harness();
        let recorder = Arc::new(PromptRecorder::default());
        h.service = CheckInService::new(
            immediate_policy(),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(NullSink),
        )
        .with_clock(h.clock.clone())
        .with_observer(recorder.clone());

        h.open_cycle().await;
        h.at(1);
        h.service.on_tick().await;
        h.service.confirm_safe(&h.subject).await;

        let calls = recorder.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["shown", "4:59", "hidden:confirmed"]);
    }
}
