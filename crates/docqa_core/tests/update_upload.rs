use std::path::PathBuf;

use docqa_core::{update, AppState, Effect, Msg};
use pretty_assertions::assert_eq;

fn init_logging() {
    engine_logging::initialize_for_tests();
}

fn files(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn start_upload(names: &[&str]) -> (AppState, u64) {
    let (state, _) = update(AppState::new(), Msg::FilesSelected(files(names)));
    let (state, effects) = update(state, Msg::UploadClicked);
    let request_id = match effects.as_slice() {
        [Effect::UploadFiles { request_id, .. }] => *request_id,
        other => panic!("unexpected effects: {other:?}"),
    };
    (state, request_id)
}

#[test]
fn upload_click_emits_effect_with_selected_files() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::FilesSelected(files(&["a.md", "b.txt"])),
    );
    let (state, effects) = update(state, Msg::UploadClicked);

    assert_eq!(
        effects,
        vec![Effect::UploadFiles {
            request_id: 1,
            files: files(&["a.md", "b.txt"]),
        }]
    );
    let view = state.view();
    assert!(view.upload.uploading);
    assert!(!view.upload.succeeded);
    assert_eq!(view.upload.error, None);
}

#[test]
fn successful_upload_clears_selection() {
    init_logging();
    let (state, request_id) = start_upload(&["a.md", "b.txt"]);
    let (mut state, effects) = update(
        state,
        Msg::UploadFinished {
            request_id,
            result: Ok(()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.upload.selected_files.is_empty());
    assert!(view.upload.succeeded);
    assert!(!view.upload.uploading);
    assert_eq!(view.upload.error, None);
    assert!(state.consume_dirty());
}

#[test]
fn failed_upload_keeps_selection_and_reports_error() {
    init_logging();
    let (state, request_id) = start_upload(&["a.md"]);
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            request_id,
            result: Err("Upload failed: 500 Internal Server Error".to_string()),
        },
    );

    let view = state.view();
    assert_eq!(view.upload.selected_files, files(&["a.md"]));
    assert!(!view.upload.succeeded);
    assert!(!view.upload.uploading);
    assert!(!view.upload.error.unwrap().is_empty());
}

#[test]
fn retry_after_failure_clears_previous_error() {
    init_logging();
    let (state, request_id) = start_upload(&["a.md"]);
    let (state, _) = update(
        state,
        Msg::UploadFinished {
            request_id,
            result: Err("network error".to_string()),
        },
    );
    let (state, _) = update(state, Msg::UploadClicked);

    let view = state.view();
    assert!(view.upload.uploading);
    assert_eq!(view.upload.error, None);
}

#[test]
fn empty_selection_still_uploads() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::UploadClicked);

    assert_eq!(
        effects,
        vec![Effect::UploadFiles {
            request_id: 1,
            files: Vec::new(),
        }]
    );
}

#[test]
fn superseded_upload_result_is_ignored() {
    init_logging();
    let (state, first) = start_upload(&["a.md"]);
    let (state, effects) = update(state, Msg::UploadClicked);
    let second = effects[0].request_id();
    assert_ne!(first, second);

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            request_id: first,
            result: Err("stale".to_string()),
        },
    );
    let view = state.view();
    assert!(view.upload.uploading);
    assert_eq!(view.upload.error, None);

    let (state, _) = update(
        state,
        Msg::UploadFinished {
            request_id: second,
            result: Ok(()),
        },
    );
    assert!(state.view().upload.succeeded);
    assert!(!state.is_busy());
}
