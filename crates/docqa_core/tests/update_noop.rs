use docqa_core::{update, AppState, Msg};

#[test]
fn completion_without_request_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(
        state.clone(),
        Msg::QueryFinished {
            request_id: 7,
            result: Ok("orphan".to_string()),
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn fresh_state_is_settled() {
    let state = AppState::new();
    let view = state.view();

    assert!(view.is_settled());
    assert!(!view.enhanced.streaming);
    assert!(!state.is_busy());
}
