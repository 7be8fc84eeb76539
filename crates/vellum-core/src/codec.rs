//! The document codec collaborator.
//!
//! Encoding a typed object graph into the JSON:API document shape (and
//! back) is not the engine's business; it is delegated to a [`Codec`]
//! supplied at registration. The engine consumes the produced documents
//! structurally: it reads `data`, `relationships` and `links` members,
//! attaches `meta` and pagination `links`, and applies sparse-fieldset
//! filtering, but never assembles a resource object itself.

use crate::{EngineResult, Entity, Information, Reference};
use serde_json::Value;

/// A JSON:API document as a structural map.
pub type Document = serde_json::Map<String, Value>;

/// The payload handed to [`Codec::marshal`].
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a, T> {
    /// A singular `data` object.
    One(&'a T),
    /// A `data` array.
    Many(&'a [T]),
}

/// Marshals entities into JSON:API documents and back.
///
/// One codec instance is bound per resource at registration time. The
/// produced documents must carry `data` (object or array) and, for
/// entities with relations, per-object `relationships` with nested
/// `links.self`/`links.related` and `data` linkage; the relationship read
/// route extracts those members verbatim.
pub trait Codec<T: Entity>: Send + Sync {
    /// Returns the relations this resource declares.
    ///
    /// Consulted once at registration time to generate relationship routes.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Encodes a payload into a document, generating absolute links from
    /// the supplied URL information.
    fn marshal(&self, payload: Payload<'_, T>, info: &Information) -> EngineResult<Document>;

    /// Applies an inbound document to an existing entity.
    fn unmarshal(&self, document: &Document, target: &mut T) -> EngineResult<()>;

    /// Constructs a new entity from an inbound document.
    ///
    /// This is the explicit factory used by the create route.
    fn create(&self, document: &Document) -> EngineResult<T>;

    /// Replaces the named relation on an entity with the given `data`
    /// linkage value.
    fn apply_relationship(
        &self,
        target: &mut T,
        relation: &str,
        linkage: &Value,
    ) -> EngineResult<()>;
}
