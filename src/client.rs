//! The read/write seam between the core and the bridge.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::Error;
use crate::patch::Patch;
use crate::resource::{ResourceLink, ResourceType};

type Result<T> = std::result::Result<T, Error>;

/// Trait for reading and patching bridge resources.
///
/// Implemented by [`HttpClient`](crate::HttpClient) for a real bridge. Any
/// implementation must bound its own request time: the controller and the
/// effect scheduler wait on each call without a timeout of their own.
pub trait ResourceClient: Send + Sync {
    /// Fetch every record of the given type, in the bridge's listing order.
    fn fetch(&self, rtype: ResourceType) -> impl Future<Output = Result<Vec<Value>>> + Send;

    /// Apply a partial update and return the links the bridge reports as changed.
    fn write(
        &self,
        rtype: ResourceType,
        id: &str,
        patch: &Patch,
    ) -> impl Future<Output = Result<Vec<ResourceLink>>> + Send;
}

impl<T: ResourceClient> ResourceClient for &T {
    fn fetch(&self, rtype: ResourceType) -> impl Future<Output = Result<Vec<Value>>> + Send {
        (**self).fetch(rtype)
    }

    fn write(
        &self,
        rtype: ResourceType,
        id: &str,
        patch: &Patch,
    ) -> impl Future<Output = Result<Vec<ResourceLink>>> + Send {
        (**self).write(rtype, id, patch)
    }
}

impl<T: ResourceClient> ResourceClient for Arc<T> {
    fn fetch(&self, rtype: ResourceType) -> impl Future<Output = Result<Vec<Value>>> + Send {
        (**self).fetch(rtype)
    }

    fn write(
        &self,
        rtype: ResourceType,
        id: &str,
        patch: &Patch,
    ) -> impl Future<Output = Result<Vec<ResourceLink>>> + Send {
        (**self).write(rtype, id, patch)
    }
}

/// Fetch a collection and decode each record.
pub(crate) async fn fetch_as<C, T>(client: &C, rtype: ResourceType) -> Result<Vec<T>>
where
    C: ResourceClient,
    T: DeserializeOwned,
{
    client
        .fetch(rtype)
        .await?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(|err| Error::JsonLoad { rtype, err }))
        .collect()
}
