use docqa_core::{update, AppState, Effect, Msg};

fn submit_query(state: AppState, text: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::QueryChanged(text.to_string()));
    update(state, Msg::QuerySubmitted)
}

#[test]
fn query_submits_verbatim_text() {
    let (state, effects) = submit_query(AppState::new(), "What is in the docs?");

    assert_eq!(
        effects,
        vec![Effect::SubmitQuery {
            request_id: 1,
            content: "What is in the docs?".to_string(),
        }]
    );
    assert!(state.view().query.querying);
}

#[test]
fn blank_query_is_a_noop() {
    for text in ["", "   ", "\n\t"] {
        let (state, _) = update(AppState::new(), Msg::QueryChanged(text.to_string()));
        let before = state.clone();

        let (next, effects) = update(state, Msg::QuerySubmitted);

        assert!(effects.is_empty());
        assert_eq!(next, before);
    }
}

#[test]
fn successful_query_stores_response_verbatim() {
    let (state, _) = submit_query(AppState::new(), "q");
    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id: 1,
            result: Ok("  plain *text* answer\n".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.query.response, "  plain *text* answer\n");
    assert_eq!(view.query.last_completed, Some(1));
    assert!(!view.query.querying);
}

#[test]
fn failed_query_leaves_previous_response() {
    let (state, _) = submit_query(AppState::new(), "first");
    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id: 1,
            result: Ok("first answer".to_string()),
        },
    );

    let (state, effects) = submit_query(state, "second");
    let request_id = effects[0].request_id();
    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id,
            result: Err("http status 500".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.query.response, "first answer");
    assert_eq!(view.query.last_completed, Some(1));
    assert!(!view.query.querying);
}

#[test]
fn later_query_wins_over_earlier_one() {
    let (state, first) = submit_query(AppState::new(), "one");
    let (state, second) = submit_query(state, "two");
    let first = first[0].request_id();
    let second = second[0].request_id();

    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id: second,
            result: Ok("two".to_string()),
        },
    );
    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id: first,
            result: Ok("one".to_string()),
        },
    );

    assert_eq!(state.view().query.response, "two");
    assert!(!state.view().query.querying);
}
