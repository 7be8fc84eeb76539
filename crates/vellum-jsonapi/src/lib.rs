//! A JSON:API protocol engine: resource dispatch and response assembly.
//!
//! Vellum turns registered resources into a full JSON:API surface. A
//! resource is a backing entity type, a document codec, a mandatory CRUD
//! backend, and whichever optional capabilities the backend binds at
//! registration. From that, the engine derives the complete route table
//! (collection, item, relationship, and related-resource URLs), dispatches
//! incoming requests, validates backend status codes against per-operation
//! allow-lists, and assembles wire responses with content negotiation,
//! sparse-fieldset filtering, and pagination links.
//!
//! ```rust,ignore
//! let mut api = Api::new("v1");
//! api.add_resource(
//!     ResourceBuilder::new(PostCodec, store)
//!         .with_find_all()
//!         .with_pagination(),
//! );
//! // Hand `api.handle(request)` futures to any HTTP server loop.
//! ```
//!
//! The engine owns no socket and no serializer internals: HTTP transport
//! stays outside ([`Api::handle`] maps one `http::Request` to one
//! `http::Response`), document marshaling is delegated to the per-resource
//! [`Codec`](vellum_core::Codec), and wire encoding to the registered
//! [`Marshaler`]s.

mod api;
mod fields;
mod negotiate;
mod pagination;
mod resource;
mod respond;

pub use api::{Api, Middleware, RouteKind, RouteSpec};
pub use fields::{filter_sparse_fields, parse_query_fields, CODE_INVALID_QUERY_FIELDS};
pub use negotiate::{
    default_marshalers, select_marshaler, JsonMarshaler, Marshaler, MarshalerMap,
    JSONAPI_CONTENT_TYPE,
};
pub use pagination::PaginationQueryParams;
pub use resource::ResourceBuilder;
