//! Core types and traits for the Vellum JSON:API engine.
//!
//! This crate holds the leaf vocabulary shared by the engine and by
//! backends:
//!
//! - [`Request`] – the typed per-request context handed to every backend
//!   capability call.
//! - [`Response`] – the three-facet contract (payload, metadata, status)
//!   backends use to communicate outcomes.
//! - [`Entity`], [`Reference`], [`EditToManyRelations`] – the entity model
//!   with explicit relation cardinality.
//! - [`Crud`], [`FindAll`], [`PaginatedFindAll`] – the backend capability
//!   traits.
//! - [`Codec`] – the external document-marshaling collaborator.
//! - [`Information`], [`UrlResolver`] – base-URL resolution for link
//!   generation.
//! - [`EngineError`], [`HttpError`], [`ApiError`] – the error taxonomy and
//!   the marshalable JSON:API error document.

mod codec;
mod entity;
mod error;
mod info;
pub mod naming;
mod request;
mod response;
mod source;

pub use codec::{Codec, Document, Payload};
pub use entity::{Cardinality, EditToManyRelations, Entity, Reference};
pub use error::{ApiError, EngineError, EngineResult, ErrorSource, HttpError};
pub use info::{Information, StaticResolver, UrlResolver};
pub use request::Request;
pub use response::{Meta, Response};
pub use source::{Crud, FindAll, PaginatedFindAll};
