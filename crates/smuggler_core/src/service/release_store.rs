//! Release-backed dataset store.
//!
//! # Responsibility
//! - Cache fetched releases per tag for the lifetime of the store.
//! - Compose codec, locator and splicer into dataset CRUD use-cases.
//! - Push rewritten note bodies through the [`ReleaseApi`] collaborator.
//!
//! # Invariants
//! - The cache changes only after a remote call succeeds.
//! - Each mutation performs at most one remote write.
//! - "First match" operations act on the earliest block in the note.
//! - Deleting an absent dataset is a logged no-op.

use crate::api::ReleaseApi;
use crate::error::{SmugglerError, SmugglerResult};
use crate::model::release::Release;
use crate::protocol::codec::encode_block;
use crate::protocol::locator::{find_datasets, find_first_dataset, DatasetMatch};
use crate::protocol::splice::{insert_block, splice_note, InsertPosition};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

/// Function computing a new payload from the previous one (`None` if absent).
pub type DatasetTransform = Box<dyn FnOnce(Option<Value>) -> Value + Send>;

/// New content for [`ReleaseStore::update_dataset`].
pub enum DatasetUpdate {
    /// Store this payload as-is.
    Replace(Value),
    /// Derive the payload from the current one.
    Transform(DatasetTransform),
}

impl DatasetUpdate {
    /// Builds a replacement from any YAML-serializable value.
    pub fn replace<T>(payload: &T) -> SmugglerResult<Self>
    where
        T: Serialize + ?Sized,
    {
        serde_yaml::to_value(payload)
            .map(Self::Replace)
            .map_err(SmugglerError::Encode)
    }

    /// Wraps a transform over the previous payload.
    pub fn transform<F>(transform: F) -> Self
    where
        F: FnOnce(Option<Value>) -> Value + Send + 'static,
    {
        Self::Transform(Box::new(transform))
    }

    fn apply(self, previous: Option<Value>) -> Value {
        match self {
            Self::Replace(payload) => payload,
            Self::Transform(transform) => transform(previous),
        }
    }
}

impl Debug for DatasetUpdate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace(payload) => f.debug_tuple("Replace").field(payload).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Dataset store over releases of one repository.
pub struct ReleaseStore<A: ReleaseApi> {
    api: A,
    releases: HashMap<String, Release>,
}

impl<A: ReleaseApi> ReleaseStore<A> {
    /// Creates a store with an empty cache.
    pub fn new(api: A) -> Self {
        Self {
            api,
            releases: HashMap::new(),
        }
    }

    /// Returns the remote collaborator.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the cached release for `tag` without touching the remote.
    pub fn cached_release(&self, tag: &str) -> Option<&Release> {
        self.releases.get(tag)
    }

    /// Drops the cached release for `tag`; the next access re-fetches it.
    pub fn evict_release(&mut self, tag: &str) -> Option<Release> {
        self.releases.remove(tag)
    }

    /// Returns the release for `tag`, fetching and caching it on first use.
    ///
    /// # Errors
    /// - `SmugglerError::ReleaseFetch` when the remote fetch fails; the cache
    ///   is left unchanged.
    pub async fn get_release(&mut self, tag: &str) -> SmugglerResult<&Release> {
        match self.releases.entry(tag.to_string()) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => {
                let release = self.api.get_release_by_tag(tag).await.map_err(|source| {
                    warn!("event=release_fetch module=release_store status=error tag={tag}");
                    SmugglerError::ReleaseFetch {
                        tag: tag.to_string(),
                        source,
                    }
                })?;
                info!(
                    "event=release_fetch module=release_store status=ok tag={tag} release_id={} body_len={}",
                    release.id,
                    release.body.len()
                );
                Ok(slot.insert(release))
            }
        }
    }

    /// Replaces the note body of the release for `tag`.
    ///
    /// # Errors
    /// - `SmugglerError::ReleaseFetch` when the release cannot be resolved.
    /// - `SmugglerError::ReleaseUpdate` when the remote write fails; the
    ///   cached body keeps its previous value.
    pub async fn update_release_note(
        &mut self,
        tag: &str,
        new_body: impl Into<String>,
    ) -> SmugglerResult<()> {
        let new_body = new_body.into();
        let (id, tag_name) = {
            let release = self.get_release(tag).await?;
            (release.id, release.tag_name.clone())
        };

        self.api
            .edit_release(id, &tag_name, &new_body)
            .await
            .map_err(|source| {
                warn!("event=release_update module=release_store status=error tag={tag}");
                SmugglerError::ReleaseUpdate {
                    tag: tag.to_string(),
                    source,
                }
            })?;

        info!(
            "event=release_update module=release_store status=ok tag={tag} release_id={id} body_len={}",
            new_body.len()
        );
        if let Some(cached) = self.releases.get_mut(tag) {
            cached.body = new_body;
        }
        Ok(())
    }

    /// Lists every named dataset in the note of `tag`, in document order.
    pub async fn list_datasets(&mut self, tag: &str) -> SmugglerResult<Vec<DatasetMatch>> {
        let body = self.note_body(tag).await?;
        Ok(find_datasets(&body, None))
    }

    /// Returns the payload of the first dataset named `name`.
    ///
    /// # Errors
    /// - `SmugglerError::DatasetMissing` when no such dataset exists.
    pub async fn get_dataset(&mut self, tag: &str, name: &str) -> SmugglerResult<Value> {
        let body = self.note_body(tag).await?;
        find_first_dataset(&body, name)
            .map(|found| found.payload)
            .ok_or_else(|| dataset_missing(tag, name))
    }

    /// Typed variant of [`ReleaseStore::get_dataset`].
    pub async fn get_dataset_as<T>(&mut self, tag: &str, name: &str) -> SmugglerResult<T>
    where
        T: DeserializeOwned,
    {
        let payload = self.get_dataset(tag, name).await?;
        serde_yaml::from_value(payload).map_err(|source| SmugglerError::Decode {
            name: name.to_string(),
            source,
        })
    }

    /// Adds a new dataset at the top of the note.
    pub async fn add_dataset<T>(
        &mut self,
        tag: &str,
        name: &str,
        payload: &T,
    ) -> SmugglerResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.add_dataset_at(tag, name, payload, InsertPosition::Top)
            .await
    }

    /// Adds a new dataset at `position`.
    ///
    /// # Errors
    /// - `SmugglerError::DatasetExists` when the name is already present; no
    ///   write is attempted.
    pub async fn add_dataset_at<T>(
        &mut self,
        tag: &str,
        name: &str,
        payload: &T,
        position: InsertPosition,
    ) -> SmugglerResult<()>
    where
        T: Serialize + ?Sized,
    {
        let body = self.note_body(tag).await?;
        if !find_datasets(&body, Some(name)).is_empty() {
            return Err(SmugglerError::DatasetExists {
                tag: tag.to_string(),
                name: name.to_string(),
            });
        }

        let block = encode_block(name, payload)?;
        let new_body = insert_block(&body, &block, position);
        self.update_release_note(tag, new_body).await?;
        info!(
            "event=dataset_add module=release_store status=ok tag={tag} name={name} position={position:?}"
        );
        Ok(())
    }

    /// Rewrites the first dataset named `name`.
    ///
    /// When the dataset is absent and `add_if_missing` is set, the update is
    /// applied to `None` and the result is added instead.
    ///
    /// # Errors
    /// - `SmugglerError::DatasetMissing` when absent and `add_if_missing` is
    ///   false; no write is attempted.
    pub async fn update_dataset(
        &mut self,
        tag: &str,
        name: &str,
        update: DatasetUpdate,
        add_if_missing: bool,
    ) -> SmugglerResult<()> {
        let body = self.note_body(tag).await?;
        let Some(found) = find_first_dataset(&body, name) else {
            if !add_if_missing {
                return Err(dataset_missing(tag, name));
            }
            let payload = update.apply(None);
            return self.add_dataset(tag, name, &payload).await;
        };

        let DatasetMatch {
            start,
            length,
            payload,
            ..
        } = found;
        let block = encode_block(name, &update.apply(Some(payload)))?;
        let new_body = splice_note(&body, start, length, &block);
        self.update_release_note(tag, new_body).await?;
        info!("event=dataset_update module=release_store status=ok tag={tag} name={name} start={start}");
        Ok(())
    }

    /// Removes the first dataset named `name`; absent datasets are skipped.
    pub async fn delete_dataset(&mut self, tag: &str, name: &str) -> SmugglerResult<()> {
        let body = self.note_body(tag).await?;
        let Some(found) = find_first_dataset(&body, name) else {
            warn!("event=dataset_delete module=release_store status=skipped reason=not_found tag={tag} name={name}");
            return Ok(());
        };

        let new_body = splice_note(&body, found.start, found.length, "");
        self.update_release_note(tag, new_body).await?;
        info!("event=dataset_delete module=release_store status=ok tag={tag} name={name}");
        Ok(())
    }

    async fn note_body(&mut self, tag: &str) -> SmugglerResult<String> {
        Ok(self.get_release(tag).await?.body.clone())
    }
}

fn dataset_missing(tag: &str, name: &str) -> SmugglerError {
    SmugglerError::DatasetMissing {
        tag: tag.to_string(),
        name: name.to_string(),
    }
}
