//! Integration tests for the check-in workflow.
//!
//! These tests go through the public API only: a tourist registers, their
//! dashboard opens, and the service is ticked by hand with a manual clock.

use std::sync::Arc;

use chrono::{Duration, Utc};
use safeyatra_core::{
    CheckInService, CheckInState, Config, EmergencyTrigger, EscalationPolicy, Event,
    InMemoryProfileStore, LastKnownLocation, ManualClock, RecordingSink, RegistrationWizard,
    TouristProfile, Trigger,
};

fn register() -> TouristProfile {
    let mut wizard = RegistrationWizard::new();
    let form = wizard.form_mut();
    form.full_name = "Lena Fischer".into();
    form.email = "lena@example.com".into();
    form.phone = "+49-151-0000000".into();
    form.nationality = "German".into();
    form.blood_group = "A-".into();
    form.emergency_contact_name = "Jonas Fischer".into();
    form.emergency_contact_phone = "+49-151-1111111".into();
    form.id_type = "Passport".into();
    form.id_number = "C01X00T47".into();
    wizard.deny_location();
    wizard.select_region("Mumbai");
    wizard.complete(Utc::now()).unwrap()
}

#[tokio::test]
async fn test_registered_tourist_full_day() {
    let profile = register();
    let subject = profile.tourist_id.clone();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.insert(profile);

    let config = Config::default();
    let t0 = Utc::now();
    let clock = Arc::new(ManualClock::new(t0));
    let sink = Arc::new(RecordingSink::new());
    let mut service = CheckInService::new(EscalationPolicy::from(&config.checkin), profiles, sink.clone())
        .with_clock(clock.clone());

    assert!(service.activate_dashboard(&subject));
    assert_eq!(service.next_check_in(&subject), Some(t0 + Duration::seconds(5)));

    // Initial check-in five seconds after the dashboard opens.
    clock.advance(Duration::seconds(5));
    let started = service.on_tick().await;
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].trigger, Trigger::InitialCheckIn);

    // Nobody answers within the five minute window.
    clock.advance(Duration::seconds(300));
    service.on_tick().await;
    assert_eq!(service.state(&subject), CheckInState::Escalated);

    let emergencies = sink.emergencies();
    assert_eq!(emergencies.len(), 1);
    assert_eq!(emergencies[0].trigger(), EmergencyTrigger::Timeout);
    assert_eq!(emergencies[0].location(), &LastKnownLocation::region("Mumbai"));
    assert_eq!(emergencies[0].profile().blood_group.as_deref(), Some("A-"));

    // Ten minutes after opening, the periodic check-in starts a fresh cycle.
    clock.set(t0 + Duration::minutes(10));
    let periodic = service.on_tick().await;
    assert_eq!(periodic.len(), 1);
    assert_eq!(periodic[0].trigger, Trigger::PeriodicCheckIn);
    assert_eq!(periodic[0].from, CheckInState::Idle);
    assert_eq!(periodic[0].cycle, 2);

    clock.advance(Duration::seconds(30));
    assert!(service.confirm_safe(&subject).await.is_applied());
    assert_eq!(sink.emergencies().len(), 1, "confirmation must not escalate");

    let events = service.drain_events();
    assert_eq!(events.iter().filter(|e| e.is_emergency()).count(), 1);
    assert!(matches!(events.first(), Some(Event::DashboardActivated { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::SafetyConfirmed { cycle: 2, .. })));
}

#[tokio::test]
async fn test_logout_drops_pending_prompt() {
    let profile = register();
    let subject = profile.tourist_id.clone();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.insert(profile);

    let t0 = Utc::now();
    let clock = Arc::new(ManualClock::new(t0));
    let sink = Arc::new(RecordingSink::new());
    let mut service = CheckInService::new(EscalationPolicy::default(), profiles, sink.clone())
        .with_clock(clock.clone());

    service.activate_dashboard(&subject);
    clock.advance(Duration::seconds(5));
    service.on_tick().await;
    assert_eq!(service.state(&subject), CheckInState::AwaitingResponse);

    assert!(service.deactivate_dashboard(&subject).await);
    clock.advance(Duration::minutes(30));
    assert!(service.on_tick().await.is_empty());
    assert!(sink.emergencies().is_empty());
    assert_eq!(service.state(&subject), CheckInState::Idle);
}

#[tokio::test]
async fn test_panic_confirmation_follows_config() {
    let profile = register();
    let subject = profile.tourist_id.clone();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.insert(profile);

    let mut config = Config::default();
    config.apply("emergency.require_panic_confirmation", "false").unwrap();
    let mut service = CheckInService::from_config(&config, profiles);

    let emergency = service.trigger_panic(&subject, false).await.unwrap();
    assert_eq!(emergency.trigger(), EmergencyTrigger::Panic);
    assert_eq!(emergency.subject_id(), &subject);
}
