//! End-to-end session scenarios through the public API.

use std::sync::Arc;
use std::time::Duration;

use utsusu_core::{
    Error, GenerationEvent, MockGenerator, Phase, PostConfig, Session, SessionOptions,
    VirtualClock, ViewState,
};

const FIRST: &str = "https://www.youtube.com/watch?v=first000";
const SECOND: &str = "https://youtu.be/second00";
const THIRD: &str = "https://youtu.be/third000";

fn session_with_clock() -> (Session, Arc<VirtualClock>) {
    let clock = Arc::new(VirtualClock::default());
    let session = Session::new(SessionOptions::default(), Arc::new(MockGenerator), clock.clone());
    (session, clock)
}

#[tokio::test]
async fn scenario_a_first_conversion_is_free() {
    let (mut session, clock) = session_with_clock();
    let mut events = session.subscribe();

    assert!(session.gate().can_proceed());
    let id = session.submit(FIRST, PostConfig::default()).await.unwrap();

    let mut phases = vec![];
    while let Ok(event) = events.try_recv() {
        if let GenerationEvent::PhaseStarted { phase, .. } = event {
            phases.push(phase);
        }
    }
    assert_eq!(phases, Phase::ALL.to_vec());
    assert_eq!(clock.sleeps(), vec![Duration::from_millis(1200); 3]);
    assert_eq!(session.store().len(), 1);
    assert_eq!(session.gate().usage_count(), 1);
    assert_eq!(session.view().state, ViewState::Result { record_id: id });
}

#[tokio::test]
async fn scenario_b_second_conversion_needs_plan() {
    let (mut session, clock) = session_with_clock();
    session.submit(FIRST, PostConfig::default()).await.unwrap();
    session.start_new();
    let sleeps_before = clock.sleeps().len();

    let err = session.submit(SECOND, PostConfig::default()).await.unwrap_err();

    assert_eq!(err, Error::EntitlementDenied { used: 1, limit: 1 });
    assert!(session.view().upgrade_prompt);
    assert_eq!(session.view().state, ViewState::Input);
    assert_eq!(session.store().len(), 1);
    assert_eq!(session.gate().usage_count(), 1);
    assert_eq!(clock.sleeps().len(), sleeps_before, "pipeline must not start");
}

#[tokio::test]
async fn scenario_c_plan_lifts_the_gate() {
    let (mut session, _clock) = session_with_clock();
    session.submit(FIRST, PostConfig::default()).await.unwrap();
    assert!(!session.gate().can_proceed());

    session.confirm_upgrade();
    assert!(session.gate().can_proceed());
    session.submit(SECOND, PostConfig::default()).await.unwrap();
    session.submit(THIRD, PostConfig::default()).await.unwrap();
    assert!(session.gate().can_proceed());
    assert_eq!(session.gate().usage_count(), 3);
}

#[tokio::test]
async fn scenario_d_deleting_inactive_middle_record() {
    let (mut session, _clock) = session_with_clock();
    session.confirm_upgrade();
    let first = session.submit(FIRST, PostConfig::default()).await.unwrap();
    let middle = session.submit(SECOND, PostConfig::default()).await.unwrap();
    let newest = session.submit(THIRD, PostConfig::default()).await.unwrap();

    assert!(session.delete_record(middle));

    let ids: Vec<_> = session.store().history().iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![newest, first]);
    assert_eq!(session.store().active_id(), Some(newest));
}

#[tokio::test]
async fn scenario_e_title_selection_bounds() {
    let (mut session, _clock) = session_with_clock();
    session.submit(FIRST, PostConfig::default()).await.unwrap();
    assert_eq!(session.active().unwrap().article_title_options().len(), 3);

    assert!(session.select_title(2));
    assert_eq!(session.store().selected_title_index(), 2);
    assert!(!session.select_title(5));
    assert_eq!(session.store().selected_title_index(), 2);
}

#[tokio::test]
async fn deleting_active_record_falls_back_to_head() {
    let (mut session, _clock) = session_with_clock();
    session.confirm_upgrade();
    let older = session.submit(FIRST, PostConfig::default()).await.unwrap();
    let newer = session.submit(SECOND, PostConfig::default()).await.unwrap();

    session.delete_record(newer);
    assert_eq!(session.store().active_id(), Some(older));
    session.delete_record(older);
    assert_eq!(session.store().active_id(), None);
    assert_eq!(session.view().state, ViewState::Input);
}
