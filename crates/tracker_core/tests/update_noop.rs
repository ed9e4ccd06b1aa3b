use tracker_core::{update, Action, AppState, Msg};

#[test]
fn stop_without_session_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::StopWatchingClicked);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_without_session_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::PollTick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn item_commands_without_selection_are_noops() {
    for msg in [
        Msg::RefreshRequested,
        Msg::AutoRunClicked,
        Msg::WatchRequested,
        Msg::ActionClicked(Action::Analyze),
        Msg::ChatSubmitted("deadline?".to_string()),
    ] {
        let state = AppState::new();
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
