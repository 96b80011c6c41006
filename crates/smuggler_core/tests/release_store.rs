use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use serde_yaml::Value;
use smuggler_core::{
    find_datasets, ApiError, ApiResult, DatasetUpdate, InsertPosition, Release, ReleaseApi,
    ReleaseId, ReleaseStore, SmugglerError,
};
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

const TAG: &str = "_v2.3.3";
const RELEASE_ID: ReleaseId = 42;
const JERRY_NOTE: &str = "\nrelease intro\n\n```yaml\ndataset-name: _jerry\ndataset:\n  _foe: _tom\n```\n\noutro\n";

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditCall {
    id: ReleaseId,
    tag: String,
    body: String,
}

#[derive(Default)]
struct FakeState {
    releases: HashMap<String, Release>,
    fetches: Vec<String>,
    edits: Vec<EditCall>,
    fail_fetch: bool,
    fail_edit: bool,
}

/// In-memory release API recording every call.
#[derive(Clone, Default)]
struct FakeReleaseApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeReleaseApi {
    fn with_note(body: &str) -> Self {
        let api = Self::default();
        api.state
            .lock()
            .unwrap()
            .releases
            .insert(TAG.to_string(), Release::new(RELEASE_ID, TAG, body));
        api
    }

    fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches.len()
    }

    fn edits(&self) -> Vec<EditCall> {
        self.state.lock().unwrap().edits.clone()
    }

    fn remote_body(&self) -> String {
        self.state.lock().unwrap().releases[TAG].body.clone()
    }

    fn fail_fetch(&self) {
        self.state.lock().unwrap().fail_fetch = true;
    }

    fn fail_edit(&self) {
        self.state.lock().unwrap().fail_edit = true;
    }
}

#[async_trait]
impl ReleaseApi for FakeReleaseApi {
    async fn get_release_by_tag(&self, tag: &str) -> ApiResult<Release> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push(tag.to_string());
        if state.fail_fetch {
            return Err(ApiError::Other("connection reset".to_string()));
        }
        state
            .releases
            .get(tag)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn edit_release(&self, id: ReleaseId, tag: &str, body: &str) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_edit {
            return Err(ApiError::Status {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        state.edits.push(EditCall {
            id,
            tag: tag.to_string(),
            body: body.to_string(),
        });
        if let Some(release) = state.releases.get_mut(tag) {
            release.body = body.to_string();
        }
        Ok(())
    }
}

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

#[tokio::test]
async fn get_release_fetches_once_and_reuses_cache() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    let first = store.get_release(TAG).await.unwrap().clone();
    let second = store.get_release(TAG).await.unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first.id, RELEASE_ID);
    assert_eq!(api.fetch_count(), 1);
    assert_eq!(store.cached_release(TAG), Some(&first));
}

#[tokio::test]
async fn get_release_failure_names_tag_and_keeps_cache_empty() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    api.fail_fetch();
    let mut store = ReleaseStore::new(api.clone());

    let err = store.get_release(TAG).await.unwrap_err();
    assert!(matches!(err, SmugglerError::ReleaseFetch { .. }));
    assert!(err.to_string().contains("failed to get release `_v2.3.3`"));
    assert!(err.to_string().contains("connection reset"));
    assert!(err.source().is_some());
    assert!(store.cached_release(TAG).is_none());
}

#[tokio::test]
async fn unknown_tag_surfaces_remote_status() {
    let api = FakeReleaseApi::default();
    let mut store = ReleaseStore::new(api);

    let err = store.get_dataset("v0.0.0", "_jerry").await.unwrap_err();
    assert!(err.to_string().contains("HTTP 404"));
}

#[tokio::test]
async fn update_release_note_writes_then_refreshes_cache() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    store.update_release_note(TAG, "rewritten").await.unwrap();

    assert_eq!(
        api.edits(),
        vec![EditCall {
            id: RELEASE_ID,
            tag: TAG.to_string(),
            body: "rewritten".to_string(),
        }]
    );
    assert_eq!(store.cached_release(TAG).unwrap().body, "rewritten");
    assert_eq!(api.fetch_count(), 1);
}

#[tokio::test]
async fn update_release_note_failure_leaves_cached_body() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    api.fail_edit();
    let mut store = ReleaseStore::new(api.clone());

    let err = store.update_release_note(TAG, "rewritten").await.unwrap_err();
    assert!(matches!(err, SmugglerError::ReleaseUpdate { .. }));
    assert!(err.to_string().contains("failed to update release `_v2.3.3`"));
    assert!(err.to_string().contains("Validation Failed"));
    assert_eq!(store.cached_release(TAG).unwrap().body, JERRY_NOTE);
}

#[tokio::test]
async fn add_existing_dataset_conflicts_without_writing() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    let err = store
        .add_dataset(TAG, "_jerry", &json!({ "_foe": "_tom" }))
        .await
        .unwrap_err();

    assert!(matches!(err, SmugglerError::DatasetExists { .. }));
    assert!(api.edits().is_empty());
}

#[tokio::test]
async fn add_then_get_on_empty_note() {
    let api = FakeReleaseApi::with_note("");
    let mut store = ReleaseStore::new(api.clone());

    store
        .add_dataset(TAG, "_jerry", &json!({ "_foe": "_tom" }))
        .await
        .unwrap();

    assert_eq!(
        store.get_dataset(TAG, "_jerry").await.unwrap(),
        yaml("_foe: _tom")
    );
    assert_eq!(api.edits().len(), 1);
    assert_eq!(api.remote_body(), store.cached_release(TAG).unwrap().body);
    assert!(api.remote_body().starts_with("```yaml\n# GENERATED BY"));
}

#[tokio::test]
async fn add_dataset_at_bottom_keeps_existing_text_first() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    store
        .add_dataset_at(TAG, "_tom", &json!(["cheese"]), InsertPosition::Bottom)
        .await
        .unwrap();

    let body = api.remote_body();
    assert!(body.starts_with(JERRY_NOTE));
    let names: Vec<String> = find_datasets(&body, None)
        .into_iter()
        .map(|found| found.name)
        .collect();
    assert_eq!(names, vec!["_jerry".to_string(), "_tom".to_string()]);
}

#[tokio::test]
async fn get_missing_dataset_is_an_error() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api);

    let err = store.get_dataset(TAG, "_spike").await.unwrap_err();
    assert!(matches!(err, SmugglerError::DatasetMissing { .. }));
}

#[tokio::test]
async fn get_dataset_as_decodes_typed_payload() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Rivalry {
        #[serde(rename = "_foe")]
        foe: String,
    }

    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api);

    let rivalry: Rivalry = store.get_dataset_as(TAG, "_jerry").await.unwrap();
    assert_eq!(rivalry.foe, "_tom");

    let err = store
        .get_dataset_as::<Vec<u32>>(TAG, "_jerry")
        .await
        .unwrap_err();
    assert!(matches!(err, SmugglerError::Decode { .. }));
}

#[tokio::test]
async fn update_existing_dataset_splices_in_place() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    let update = DatasetUpdate::transform(|previous| {
        let mut mapping = match previous {
            Some(Value::Mapping(mapping)) => mapping,
            _ => serde_yaml::Mapping::new(),
        };
        mapping.insert(Value::from("_friend"), Value::from("_nibbles"));
        Value::Mapping(mapping)
    });
    store
        .update_dataset(TAG, "_jerry", update, false)
        .await
        .unwrap();

    let body = api.remote_body();
    assert!(body.starts_with("\nrelease intro\n\n```yaml\n"));
    assert!(body.ends_with("```\n\noutro\n"));
    assert_eq!(
        store.get_dataset(TAG, "_jerry").await.unwrap(),
        yaml("_foe: _tom\n_friend: _nibbles")
    );
    assert_eq!(api.edits().len(), 1);
}

#[tokio::test]
async fn update_missing_dataset_without_add_fails_without_writing() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    let update = DatasetUpdate::replace(&json!(1)).unwrap();
    let err = store
        .update_dataset(TAG, "_missing", update, false)
        .await
        .unwrap_err();

    assert!(matches!(err, SmugglerError::DatasetMissing { .. }));
    assert!(err.to_string().contains("doesn't exist"));
    assert!(api.edits().is_empty());
}

#[tokio::test]
async fn update_missing_dataset_with_add_writes_exactly_once() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    let update = DatasetUpdate::transform(|previous| {
        assert!(previous.is_none());
        Value::from("created")
    });
    store
        .update_dataset(TAG, "_missing", update, true)
        .await
        .unwrap();

    let edits = api.edits();
    assert_eq!(edits.len(), 1);
    assert!(edits[0].body.ends_with(JERRY_NOTE));
    assert_eq!(
        store.get_dataset(TAG, "_missing").await.unwrap(),
        Value::from("created")
    );
}

#[tokio::test]
async fn update_acts_on_first_of_duplicate_names() {
    let note = format!("{JERRY_NOTE}\n```yaml\ndataset-name: _jerry\ndataset: second\n```");
    let api = FakeReleaseApi::with_note(&note);
    let mut store = ReleaseStore::new(api.clone());

    let update = DatasetUpdate::replace("first").unwrap();
    store
        .update_dataset(TAG, "_jerry", update, false)
        .await
        .unwrap();

    let payloads: Vec<Value> = find_datasets(&api.remote_body(), Some("_jerry"))
        .into_iter()
        .map(|found| found.payload)
        .collect();
    assert_eq!(payloads, vec![Value::from("first"), Value::from("second")]);
}

#[tokio::test]
async fn delete_removes_block_and_preserves_surroundings() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    store.delete_dataset(TAG, "_jerry").await.unwrap();

    let body = api.remote_body();
    assert_eq!(body, "\nrelease intro\n\n\n\noutro\n");
    assert!(find_datasets(&body, Some("_jerry")).is_empty());
}

#[tokio::test]
async fn delete_missing_dataset_is_a_noop() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    store.delete_dataset(TAG, "_spike").await.unwrap();

    assert!(api.edits().is_empty());
    assert_eq!(api.remote_body(), JERRY_NOTE);
}

#[tokio::test]
async fn list_datasets_returns_document_order() {
    let note = format!("```yaml\ndataset-name: _tom\ndataset: 1\n```\n{JERRY_NOTE}");
    let api = FakeReleaseApi::with_note(&note);
    let mut store = ReleaseStore::new(api);

    let names: Vec<String> = store
        .list_datasets(TAG)
        .await
        .unwrap()
        .into_iter()
        .map(|found| found.name)
        .collect();
    assert_eq!(names, vec!["_tom".to_string(), "_jerry".to_string()]);
}

#[tokio::test]
async fn evicted_release_is_fetched_again() {
    let api = FakeReleaseApi::with_note(JERRY_NOTE);
    let mut store = ReleaseStore::new(api.clone());

    store.get_release(TAG).await.unwrap();
    let evicted = store.evict_release(TAG).unwrap();
    assert_eq!(evicted.body, JERRY_NOTE);
    assert!(store.cached_release(TAG).is_none());

    store.get_release(TAG).await.unwrap();
    assert_eq!(api.fetch_count(), 2);
}
