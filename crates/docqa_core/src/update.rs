use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => {
            state.select_files(files);
            Vec::new()
        }
        Msg::UploadClicked => {
            // An empty selection still goes out; the server decides what an
            // empty form means.
            let (request_id, files) = state.start_upload();
            vec![Effect::UploadFiles { request_id, files }]
        }
        Msg::UploadFinished { request_id, result } => {
            state.finish_upload(request_id, result);
            Vec::new()
        }
        Msg::QueryChanged(text) => {
            state.set_query_text(text);
            Vec::new()
        }
        Msg::QuerySubmitted => {
            if is_blank(state.query_text()) {
                return (state, Vec::new());
            }
            let content = state.query_text().to_owned();
            let request_id = state.start_query();
            vec![Effect::SubmitQuery {
                request_id,
                content,
            }]
        }
        Msg::QueryFinished { request_id, result } => {
            state.finish_query(request_id, result);
            Vec::new()
        }
        Msg::EnhancedQueryChanged(text) => {
            state.set_enhanced_query_text(text);
            Vec::new()
        }
        Msg::EnhancedQuerySubmitted => {
            if is_blank(state.enhanced_query_text()) {
                return (state, Vec::new());
            }
            let content = state.enhanced_query_text().to_owned();
            let request_id = state.start_enhanced_query();
            vec![Effect::StreamEnhancedQuery {
                request_id,
                content,
            }]
        }
        Msg::ContextReceived {
            request_id,
            context,
        } => {
            state.push_context(request_id, context);
            Vec::new()
        }
        Msg::AnswerReceived { request_id, answer } => {
            state.replace_answer(request_id, answer);
            Vec::new()
        }
        Msg::EnhancedQueryFinished {
            request_id,
            failure,
        } => {
            state.finish_enhanced_query(request_id, failure);
            Vec::new()
        }
    };

    (state, effects)
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
