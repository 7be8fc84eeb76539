//! # Vellum
//!
//! **A JSON:API protocol engine: resource dispatch and response assembly.**
//!
//! Vellum maps registered resources to a complete JSON:API surface:
//!
//! - **Derived routing** – collection, item, relationship, and
//!   related-resource routes generated from declared references
//! - **Capability binding** – optional backend capabilities bound
//!   explicitly at registration, missing ones reported as 404s
//! - **Response assembly** – content negotiation, sparse fieldsets,
//!   pagination links, and JSON:API error documents
//! - **Transport-agnostic** – one `http::Request` in, one
//!   `http::Response` out; bring your own server loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vellum::prelude::*;
//!
//! let mut api = Api::new("v1");
//! api.add_resource(
//!     ResourceBuilder::new(PostCodec, store)
//!         .with_find_all()
//!         .with_pagination(),
//! );
//! let response = api.handle(request).await;
//! ```

#![doc(html_root_url = "https://docs.rs/vellum/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export the core vocabulary crate
pub use vellum_core as core;

// Re-export the router abstraction
pub use vellum_router as router;

// Re-export the engine crate
pub use vellum_jsonapi as jsonapi;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use vellum::prelude::*;
/// ```
pub mod prelude {
    pub use vellum_core::{
        Cardinality, Codec, Crud, Document, EditToManyRelations, EngineError, EngineResult,
        Entity, FindAll, Information, Meta, PaginatedFindAll, Payload, Reference, Request,
        Response, StaticResolver, UrlResolver,
    };
    pub use vellum_jsonapi::{Api, Marshaler, Middleware, ResourceBuilder};
    pub use vellum_router::{Lookup, Params, Route, SegmentRouter};
}
