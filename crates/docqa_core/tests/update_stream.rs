use docqa_core::{update, AppState, Effect, Msg, RenderedText, RequestId};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn rendered(text: &str) -> RenderedText {
    RenderedText::new(text, format!("<p>{text}</p>\n"))
}

fn start_stream(state: AppState, text: &str) -> (AppState, RequestId) {
    let (state, _) = update(state, Msg::EnhancedQueryChanged(text.to_string()));
    let (state, effects) = update(state, Msg::EnhancedQuerySubmitted);
    match effects.as_slice() {
        [Effect::StreamEnhancedQuery {
            request_id,
            content,
        }] => {
            assert_eq!(content, text);
            (state, *request_id)
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

fn context(request_id: RequestId, text: &str) -> Msg {
    Msg::ContextReceived {
        request_id,
        context: rendered(text),
    }
}

fn answer(request_id: RequestId, text: &str) -> Msg {
    Msg::AnswerReceived {
        request_id,
        answer: rendered(text),
    }
}

#[test]
fn contexts_append_and_answers_replace() {
    init_logging();
    let (state, id) = start_stream(AppState::new(), "question");
    assert!(state.view().enhanced.streaming);

    let mut state = state;
    for msg in [
        context(id, "A"),
        context(id, "B"),
        answer(id, "X"),
        answer(id, "XY"),
    ] {
        state = update(state, msg).0;
    }
    let (state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: id,
            failure: None,
        },
    );

    let enhanced = state.view().enhanced;
    assert_eq!(enhanced.raw_contexts(), vec!["A", "B"]);
    assert_eq!(enhanced.rendered_contexts(), vec!["<p>A</p>\n", "<p>B</p>\n"]);
    assert_eq!(enhanced.answer, rendered("XY"));
    assert!(!enhanced.streaming);
}

#[test]
fn new_stream_resets_accumulators() {
    init_logging();
    let (state, id) = start_stream(AppState::new(), "first");
    let (state, _) = update(state, context(id, "old context"));
    let (state, _) = update(state, answer(id, "old answer"));
    let (state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: id,
            failure: None,
        },
    );

    let (state, _) = start_stream(state, "second");
    let enhanced = state.view().enhanced;
    assert!(enhanced.contexts.is_empty());
    assert!(enhanced.answer.is_empty());
    assert!(enhanced.streaming);
}

#[test]
fn failure_renders_error_as_answer_and_stops_streaming() {
    init_logging();
    let (state, id) = start_stream(AppState::new(), "question");
    let (state, _) = update(state, context(id, "A"));
    let (state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: id,
            failure: Some(rendered("Error: http status 502")),
        },
    );

    let enhanced = state.view().enhanced;
    assert_eq!(enhanced.answer.markdown, "Error: http status 502");
    assert_eq!(enhanced.raw_contexts(), vec!["A"]);
    assert!(!enhanced.streaming);
}

#[test]
fn blank_enhanced_query_is_a_noop() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::EnhancedQueryChanged("  ".to_string()));
    let before = state.clone();

    let (next, effects) = update(state, Msg::EnhancedQuerySubmitted);

    assert!(effects.is_empty());
    assert_eq!(next, before);
    assert!(!next.view().enhanced.streaming);
}

#[test]
fn events_from_superseded_stream_are_dropped() {
    init_logging();
    let (state, old) = start_stream(AppState::new(), "first");
    let (state, new) = start_stream(state, "second");

    let (state, _) = update(state, context(old, "stale"));
    let (state, _) = update(state, answer(old, "stale answer"));
    let (state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: old,
            failure: None,
        },
    );
    let enhanced = state.view().enhanced;
    assert!(enhanced.contexts.is_empty());
    assert!(enhanced.answer.is_empty());
    assert!(enhanced.streaming);

    let (state, _) = update(state, context(new, "fresh"));
    let (state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: new,
            failure: None,
        },
    );
    let enhanced = state.view().enhanced;
    assert_eq!(enhanced.raw_contexts(), vec!["fresh"]);
    assert!(!enhanced.streaming);
}

#[test]
fn finish_is_applied_once() {
    init_logging();
    let (state, id) = start_stream(AppState::new(), "question");
    let (mut state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: id,
            failure: None,
        },
    );
    assert!(state.consume_dirty());

    let (mut state, _) = update(
        state,
        Msg::EnhancedQueryFinished {
            request_id: id,
            failure: Some(rendered("late")),
        },
    );
    assert!(!state.consume_dirty());
    assert!(state.view().enhanced.answer.is_empty());
}
