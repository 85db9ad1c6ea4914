mod common;

use common::{FakeChooser, FakeResolver, Harness, RecordingBridge};
use pretty_assertions::assert_eq;
use serde_json::json;
use video_picker::checkpoint::CheckpointStore;
use video_picker::config::FlowSettings;
use video_picker::model::{Checkpoint, InvocationId, LaunchIntent};
use video_picker::{ChooserCompletion, ChooserData, ChooserStatus, ContentHandle, FlowState, ProxyFlow};

fn intent(id: &str) -> LaunchIntent {
    LaunchIntent {
        invocation_id: InvocationId::new(id),
        receiver_object: Some("Menu".into()),
        callback_method: Some("OnPicked".into()),
    }
}

fn ok_with(primary: Option<&str>, items: Option<Vec<Option<&str>>>) -> ChooserCompletion {
    ChooserCompletion {
        request_token: 41027,
        status: ChooserStatus::Ok,
        data: Some(ChooserData {
            primary: primary.map(ContentHandle::from),
            items: items.map(|v| v.into_iter().map(|o| o.map(ContentHandle::from)).collect()),
        }),
    }
}

#[test]
fn start_opens_video_chooser_and_checkpoints() {
    let h = Harness::new(FakeResolver::default());
    let flow = ProxyFlow::start(intent("inv-1"), h.ports(), FlowSettings::default());

    assert_eq!(flow.state(), FlowState::PickerLaunched);
    let launches = h.chooser.launches.lock().unwrap().clone();
    assert_eq!(launches.len(), 1);
    let req = &launches[0];
    assert_eq!(req.request_token, 41027);
    assert_eq!(req.mime_type, "video/*");
    assert!(req.allow_multiple);
    assert!(req.openable_only);
    assert!(req.grant_read);
    assert!(req.grant_persistable_read);
    assert_eq!(
        h.checkpoints.load(&InvocationId::new("inv-1")),
        Some(Checkpoint { launched: true })
    );
    assert!(h.bridge.messages().is_empty());
}

#[test]
fn end_to_end_two_distinct_handles() {
    let resolver = FakeResolver::default()
        .with_row("content://a", Some("clip1.mp4"), Some(1000))
        .with_row("content://b/clip2.mp4", None, None);
    let h = Harness::new(resolver);
    let mut flow = ProxyFlow::start(intent("inv-2"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(None, Some(vec![Some("content://a"), Some("content://b/clip2.mp4")])));

    assert_eq!(flow.state(), FlowState::Terminated);
    assert_eq!(
        h.payloads(),
        vec![json!({
            "cancelled": false,
            "error": "",
            "videos": [
                {"uri": "content://a", "name": "clip1.mp4", "size": 1000},
                {"uri": "content://b/clip2.mp4", "name": "clip2.mp4", "size": 0}
            ]
        })]
    );
    let (object, method, _) = &h.bridge.messages()[0];
    assert_eq!(object, "Menu");
    assert_eq!(method, "OnPicked");
    assert_eq!(h.finished(), 1);
    assert!(h.checkpoints.is_empty());
}

#[test]
fn duplicates_collapse_primary_first() {
    let h = Harness::new(FakeResolver::default());
    let mut flow = ProxyFlow::start(intent("inv-3"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(
        Some("content://m/one.mp4"),
        Some(vec![
            Some("content://m/two.mp4"),
            Some("content://m/one.mp4"),
            None,
            Some("content://m/one.mp4"),
        ]),
    ));

    let payload = &h.payloads()[0];
    let uris: Vec<&str> = payload["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["uri"].as_str().unwrap())
        .collect();
    assert_eq!(uris, vec!["content://m/one.mp4", "content://m/two.mp4"]);
}

#[test]
fn non_success_status_is_cancelled() {
    let h = Harness::new(FakeResolver::default());
    let mut flow = ProxyFlow::start(intent("inv-4"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ChooserCompletion {
        request_token: 41027,
        status: ChooserStatus::Cancelled,
        data: Some(ChooserData {
            primary: Some("content://x/a.mp4".into()),
            items: None,
        }),
    });

    assert_eq!(
        h.payloads(),
        vec![json!({"cancelled": true, "error": "", "videos": []})]
    );
    assert!(h.resolver.queries.lock().unwrap().is_empty());
}

#[test]
fn success_without_data_is_cancelled() {
    let h = Harness::new(FakeResolver::default());
    let mut flow = ProxyFlow::start(intent("inv-5"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ChooserCompletion {
        request_token: 41027,
        status: ChooserStatus::Ok,
        data: None,
    });

    assert_eq!(h.payloads()[0]["cancelled"], json!(true));
    assert_eq!(h.payloads()[0]["error"], json!(""));
}

#[test]
fn success_with_empty_selection_is_cancelled() {
    let h = Harness::new(FakeResolver::default());
    let mut flow = ProxyFlow::start(intent("inv-6"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(None, Some(vec![None, None])));

    assert_eq!(
        h.payloads(),
        vec![json!({"cancelled": true, "error": "", "videos": []})]
    );
    assert_eq!(flow.state(), FlowState::Terminated);
}

#[test]
fn metadata_failure_aborts_whole_batch() {
    let resolver = FakeResolver::default()
        .with_row("content://a", Some("a.mp4"), Some(5))
        .failing_on("content://b");
    let h = Harness::new(resolver);
    let mut flow = ProxyFlow::start(intent("inv-7"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(
        None,
        Some(vec![Some("content://a"), Some("content://b"), Some("content://c")]),
    ));

    assert_eq!(
        h.payloads(),
        vec![json!({
            "cancelled": false,
            "error": "Failed to read picker result: provider crashed",
            "videos": []
        })]
    );
    // resolution stops at the failing handle
    assert_eq!(
        h.resolver.queries.lock().unwrap().clone(),
        vec!["content://a".to_string(), "content://b".to_string()]
    );
    assert_eq!(flow.state(), FlowState::Terminated);
    assert_eq!(h.finished(), 1);
}

#[test]
fn name_fallback_chain() {
    let resolver = FakeResolver::default()
        .with_row("content://p/named.mp4", Some("Holiday.mp4"), Some(7))
        .with_row("content://p/from-path.mkv", Some(""), Some(-1));
    let h = Harness::new(resolver);
    let mut flow = ProxyFlow::start(intent("inv-8"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(
        None,
        Some(vec![
            Some("content://p/named.mp4"),
            Some("content://p/from-path.mkv"),
            Some("content://nosegment"),
        ]),
    ));

    let payload = &h.payloads()[0];
    assert_eq!(
        payload["videos"],
        json!([
            {"uri": "content://p/named.mp4", "name": "Holiday.mp4", "size": 7},
            {"uri": "content://p/from-path.mkv", "name": "from-path.mkv", "size": 0},
            {"uri": "content://nosegment", "name": "selected_video", "size": 0}
        ])
    );
}

#[test]
fn refused_persistable_grant_is_swallowed() {
    let mut resolver = FakeResolver::default().with_row("content://a/v.mp4", Some("v.mp4"), Some(3));
    resolver.refuse_grants = true;
    let h = Harness::new(resolver);
    let mut flow = ProxyFlow::start(intent("inv-9"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(Some("content://a/v.mp4"), None));

    assert_eq!(h.resolver.grants.lock().unwrap().len(), 1);
    assert_eq!(
        h.payloads()[0]["videos"],
        json!([{"uri": "content://a/v.mp4", "name": "v.mp4", "size": 3}])
    );
    assert_eq!(flow.state(), FlowState::Terminated);
}

#[test]
fn unrelated_token_terminates_without_payload() {
    let h = Harness::new(FakeResolver::default());
    let mut flow = ProxyFlow::start(intent("inv-10"), h.ports(), FlowSettings::default());

    let mut completion = ok_with(Some("content://a/v.mp4"), None);
    completion.request_token = 7;
    flow.on_chooser_result(completion);

    assert!(h.bridge.messages().is_empty());
    assert!(flow.outcome().is_none());
    assert_eq!(flow.state(), FlowState::Terminated);
    assert_eq!(h.finished(), 1);
}

#[test]
fn chooser_unavailable_fails_immediately() {
    let chooser = FakeChooser {
        unavailable: Some("No Activity found to handle Intent".into()),
        ..Default::default()
    };
    let h = Harness::build(chooser, FakeResolver::default(), RecordingBridge::default());
    let flow = ProxyFlow::start(intent("inv-11"), h.ports(), FlowSettings::default());

    assert_eq!(flow.state(), FlowState::Terminated);
    assert_eq!(
        h.payloads(),
        vec![json!({
            "cancelled": false,
            "error": "System picker unavailable: No Activity found to handle Intent",
            "videos": []
        })]
    );
    assert!(h.checkpoints.is_empty());
}

#[test]
fn restored_checkpoint_does_not_relaunch() {
    let h = Harness::new(FakeResolver::default().with_row("content://a/x.mp4", None, Some(9)));
    let id = InvocationId::new("inv-12");
    h.checkpoints
        .save(&id, Checkpoint { launched: true })
        .expect("seed checkpoint");

    let mut flow = ProxyFlow::start(intent("inv-12"), h.ports(), FlowSettings::default());
    assert_eq!(flow.state(), FlowState::PickerLaunched);
    assert_eq!(h.chooser.launch_count(), 0);
    assert!(flow.checkpoint().launched);

    flow.on_chooser_result(ok_with(Some("content://a/x.mp4"), None));
    assert_eq!(
        h.payloads(),
        vec![json!({
            "cancelled": false,
            "error": "",
            "videos": [{"uri": "content://a/x.mp4", "name": "x.mp4", "size": 9}]
        })]
    );
}

#[test]
fn restart_after_teardown_resumes_same_invocation() {
    let h = Harness::new(FakeResolver::default());
    let first = ProxyFlow::start(intent("inv-13"), h.ports(), FlowSettings::default());
    first.save_checkpoint().expect("checkpoint");
    drop(first);

    let mut second = ProxyFlow::start(intent("inv-13"), h.ports(), FlowSettings::default());
    assert_eq!(h.chooser.launch_count(), 1);
    second.on_chooser_result(ok_with(None, None));
    assert_eq!(h.bridge.messages().len(), 1);
}

#[test]
fn blank_address_uses_defaults() {
    let h = Harness::new(FakeResolver::default());
    let blank = LaunchIntent {
        invocation_id: InvocationId::new("inv-14"),
        receiver_object: Some(String::new()),
        callback_method: None,
    };
    let mut flow = ProxyFlow::start(blank, h.ports(), FlowSettings::default());
    assert_eq!(flow.address().object, "VRAppRuntimeRoot");
    assert_eq!(flow.address().method, "OnAndroidVideoPickerResult");

    flow.on_chooser_result(ok_with(None, None));
    let (object, method, _) = &h.bridge.messages()[0];
    assert_eq!(object, "VRAppRuntimeRoot");
    assert_eq!(method, "OnAndroidVideoPickerResult");
}

#[test]
fn late_events_never_deliver_twice() {
    let h = Harness::new(FakeResolver::default());
    let mut flow = ProxyFlow::start(intent("inv-15"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(None, None));
    flow.on_chooser_result(ok_with(Some("content://a/late.mp4"), None));

    assert_eq!(h.bridge.messages().len(), 1);
    assert_eq!(h.finished(), 1);
}

#[test]
fn unreachable_bridge_still_terminates() {
    let bridge = RecordingBridge {
        unreachable: true,
        ..Default::default()
    };
    let h = Harness::build(FakeChooser::default(), FakeResolver::default(), bridge);
    let mut flow = ProxyFlow::start(intent("inv-16"), h.ports(), FlowSettings::default());

    flow.on_chooser_result(ok_with(Some("content://a/v.mp4"), None));

    assert!(h.bridge.messages().is_empty());
    assert!(matches!(
        flow.outcome(),
        Some(video_picker::PickerOutcome::Success { .. })
    ));
    assert_eq!(flow.state(), FlowState::Terminated);
}

#[test]
fn custom_request_token_from_settings() {
    let h = Harness::new(FakeResolver::default());
    let settings = FlowSettings {
        request_token: 99,
        ..FlowSettings::default()
    };
    let mut flow = ProxyFlow::start(intent("inv-17"), h.ports(), settings);
    assert_eq!(h.chooser.launches.lock().unwrap()[0].request_token, 99);

    // the default token now belongs to someone else
    flow.on_chooser_result(ok_with(None, None));
    assert!(h.bridge.messages().is_empty());
}
