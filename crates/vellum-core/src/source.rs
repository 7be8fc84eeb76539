//! Backend capability traits.
//!
//! A data source must implement [`Crud`]; everything else is optional.
//! Optional capabilities are bound explicitly at registration time (see the
//! engine's resource builder) and their absence surfaces as a 404 only when
//! a request actually needs them.
//!
//! Capability calls are opaque from the engine's perspective: they may
//! block on I/O, and the engine neither retries nor times them out. Within
//! one request, calls execute strictly in sequence; the engine holds no
//! locks across them.

use crate::{EngineResult, Entity, Request, Response};
use async_trait::async_trait;

/// The mandatory create/read/update/delete contract.
#[async_trait]
pub trait Crud<T: Entity>: Send + Sync {
    /// Fetches a single entity by id.
    async fn find_one(&self, id: &str, req: &Request) -> EngineResult<Response<T>>;

    /// Stores a new entity and reports the created representation.
    ///
    /// Must resolve to status 201, 202 or 204; 201 responses carry the
    /// created object.
    async fn create(&self, entity: T, req: &Request) -> EngineResult<Response<T>>;

    /// Applies an updated entity.
    ///
    /// Must resolve to status 200, 202 or 204. A 200 with no payload tells
    /// the engine to re-fetch the canonical representation via
    /// [`find_one`](Crud::find_one).
    async fn update(&self, entity: T, req: &Request) -> EngineResult<Response<T>>;

    /// Deletes an entity by id.
    ///
    /// Must resolve to status 200 (metadata echoed to the client), 202 or
    /// 204.
    async fn delete(&self, id: &str, req: &Request) -> EngineResult<Response<T>>;
}

/// Optional capability: fetch the whole collection.
#[async_trait]
pub trait FindAll<T: Entity>: Send + Sync {
    /// Fetches all entities matching the request's filter hints.
    async fn find_all(&self, req: &Request) -> EngineResult<Response<Vec<T>>>;
}

/// Optional capability: fetch one page of the collection.
#[async_trait]
pub trait PaginatedFindAll<T: Entity>: Send + Sync {
    /// Fetches the page described by the request's `page[...]` parameters
    /// and reports the total entity count for link generation.
    async fn paginated_find_all(&self, req: &Request) -> EngineResult<(u64, Response<Vec<T>>)>;
}
