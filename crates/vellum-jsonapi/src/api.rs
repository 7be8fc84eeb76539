//! The API dispatcher.
//!
//! [`Api`] owns the registered resources, the router, the marshaler map,
//! and the middleware list. Registration derives the full route table for
//! each resource once, from its declared references and bound
//! capabilities; dispatch is a pure lookup with no per-request probing.
//!
//! Registration methods take `&mut self` and [`Api::handle`] takes
//! `&self`, so the resource, marshaler, and middleware sets are fixed
//! before the value can be shared with a server loop.

use bytes::Bytes;
use http::{Method, StatusCode};
use std::sync::Arc;

use vellum_core::{
    Cardinality, Codec, Crud, Document, EngineError, EngineResult, Entity, HttpError, Information,
    Request, StaticResolver, UrlResolver,
};
use vellum_router::{Lookup, Params, Route, SegmentRouter};

use crate::negotiate::{default_marshalers, select_marshaler, Marshaler, MarshalerMap};
use crate::resource::{ResourceBuilder, ResourceHandle};
use crate::respond::{assemble, report_error, RouteReply};

/// Allowed verbs advertised on collection OPTIONS requests.
const COLLECTION_ALLOW: &str = "GET,POST,PATCH,OPTIONS";
/// Allowed verbs advertised on item OPTIONS requests.
const ITEM_ALLOW: &str = "GET,PATCH,DELETE,OPTIONS";

/// The operation a matched route resolves to.
///
/// Relationship kinds carry the relation name they were registered for, so
/// dispatch never re-parses the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// OPTIONS on the collection URL.
    CollectionOptions,
    /// OPTIONS on an item URL.
    ItemOptions,
    /// GET on the collection URL.
    Index,
    /// GET on an item URL.
    Read,
    /// POST on the collection URL.
    Create,
    /// PATCH on an item URL.
    Update,
    /// DELETE on an item URL.
    Delete,
    /// GET on an item's `relationships/{name}` URL.
    ReadRelation(String),
    /// GET on an item's related-resource URL.
    Linked(String),
    /// PATCH on an item's `relationships/{name}` URL.
    ReplaceRelation(String),
    /// POST on a to-many `relationships/{name}` URL.
    AddToMany(String),
    /// DELETE on a to-many `relationships/{name}` URL.
    RemoveToMany(String),
}

/// The handler value the API registers with its router: which resource,
/// which operation.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    resource: usize,
    kind: RouteKind,
}

/// Request middleware, invoked in registration order on the raw HTTP
/// request before routing.
pub trait Middleware: Send + Sync {
    /// Inspects or mutates the incoming request.
    fn call(&self, req: &mut http::Request<Bytes>);
}

/// A JSON:API engine instance.
///
/// Generic over the router so a host can substitute its own [`Route`]
/// implementation; the default is [`SegmentRouter`].
///
/// # Example
///
/// ```rust,ignore
/// let mut api = Api::new("v1");
/// api.add_resource(ResourceBuilder::new(PostCodec, store).with_find_all());
/// let response = api.handle(request).await;
/// ```
pub struct Api<R = SegmentRouter<RouteSpec>> {
    prefix: String,
    resolver: Arc<dyn UrlResolver>,
    marshalers: MarshalerMap,
    resources: Vec<Arc<dyn ResourceHandle>>,
    router: R,
    middleware: Vec<Arc<dyn Middleware>>,
}

fn trim_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}

impl Api<SegmentRouter<RouteSpec>> {
    /// Creates an API with the given URL prefix, relative links, and the
    /// default router and marshalers.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self::with_resolver(prefix, StaticResolver::new(""))
    }

    /// Creates an API with an explicit base-URL resolver.
    #[must_use]
    pub fn with_resolver(prefix: &str, resolver: impl UrlResolver + 'static) -> Self {
        Self::with_router(prefix, resolver, SegmentRouter::new())
    }
}

impl<R: Route<RouteSpec>> Api<R> {
    /// Creates an API with an explicit resolver and router.
    #[must_use]
    pub fn with_router(prefix: &str, resolver: impl UrlResolver + 'static, router: R) -> Self {
        Self {
            prefix: trim_prefix(prefix),
            resolver: Arc::new(resolver),
            marshalers: default_marshalers(),
            resources: Vec::new(),
            router,
            middleware: Vec::new(),
        }
    }

    /// Registers a marshaler for a content type.
    pub fn add_marshaler(&mut self, content_type: impl Into<String>, marshaler: Arc<dyn Marshaler>) {
        self.marshalers.insert(content_type.into(), marshaler);
    }

    /// Appends a middleware. Middleware run in registration order.
    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    /// Registers a resource and derives its route table.
    ///
    /// Relationship routes come from the codec's declared references; the
    /// to-many mutation routes are registered only for to-many references
    /// of a resource whose builder bound the to-many edit capability.
    pub fn add_resource<T, C, S>(&mut self, builder: ResourceBuilder<T, C, S>)
    where
        T: Entity,
        C: Codec<T> + 'static,
        S: Crud<T> + 'static,
    {
        let handle = builder.into_handle();
        let index = self.resources.len();
        let base = if self.prefix.is_empty() {
            format!("/{}", handle.name())
        } else {
            format!("/{}/{}", self.prefix, handle.name())
        };
        let item = format!("{base}/:id");

        let mut add = |method: Method, pattern: &str, kind: RouteKind| {
            self.router.add(method, pattern, RouteSpec { resource: index, kind });
        };

        add(Method::OPTIONS, &base, RouteKind::CollectionOptions);
        add(Method::OPTIONS, &item, RouteKind::ItemOptions);
        add(Method::GET, &base, RouteKind::Index);
        add(Method::POST, &base, RouteKind::Create);
        add(Method::GET, &item, RouteKind::Read);
        add(Method::PATCH, &item, RouteKind::Update);
        add(Method::DELETE, &item, RouteKind::Delete);

        for reference in handle.references() {
            let name = reference.name.clone();
            let relationship = format!("{item}/relationships/{name}");
            let related = format!("{item}/{name}");

            add(
                Method::GET,
                &relationship,
                RouteKind::ReadRelation(name.clone()),
            );
            add(Method::GET, &related, RouteKind::Linked(name.clone()));
            add(
                Method::PATCH,
                &relationship,
                RouteKind::ReplaceRelation(name.clone()),
            );
            if handle.to_many_editable() && reference.cardinality == Cardinality::ToMany {
                add(
                    Method::POST,
                    &relationship,
                    RouteKind::AddToMany(name.clone()),
                );
                add(Method::DELETE, &relationship, RouteKind::RemoveToMany(name));
            }
        }

        self.resources.push(handle);
    }

    /// Handles one HTTP request end to end.
    ///
    /// Every outcome, success or failure, is written as a complete response
    /// with a negotiated content type; this method never fails.
    pub async fn handle(&self, mut req: http::Request<Bytes>) -> http::Response<Bytes> {
        for middleware in &self.middleware {
            middleware.call(&mut req);
        }

        let (parts, body) = req.into_parts();
        let request = Request::from_http(&parts.method, &parts.uri, parts.headers);

        match self.router.lookup(&parts.method, request.path()) {
            Lookup::Found(spec, params) => {
                match self.dispatch(spec, &params, &request, &body).await {
                    Ok(reply) => assemble(reply, &request, &self.marshalers)
                        .unwrap_or_else(|err| report_error(&err, &request, &self.marshalers)),
                    Err(err) => report_error(&err, &request, &self.marshalers),
                }
            }
            Lookup::MethodNotAllowed => {
                let err = EngineError::from(HttpError::new(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "Method Not Allowed",
                ));
                report_error(&err, &request, &self.marshalers)
            }
            Lookup::NotFound => {
                let err = EngineError::from(HttpError::new(StatusCode::NOT_FOUND, "Not Found"));
                report_error(&err, &request, &self.marshalers)
            }
        }
    }

    async fn dispatch(
        &self,
        spec: &RouteSpec,
        params: &Params,
        request: &Request,
        body: &Bytes,
    ) -> EngineResult<RouteReply> {
        let resource = &self.resources[spec.resource];
        let info = self.information(request);
        tracing::debug!(resource = resource.name(), kind = ?spec.kind, path = request.path(), "dispatching");

        match &spec.kind {
            RouteKind::CollectionOptions => Ok(RouteReply::options(COLLECTION_ALLOW)),
            RouteKind::ItemOptions => Ok(RouteReply::options(ITEM_ALLOW)),
            RouteKind::Index => resource.collection(request, &info).await,
            RouteKind::Read => {
                resource.read(item_id(params)?, request, &info).await
            }
            RouteKind::ReadRelation(relation) => {
                resource
                    .read_relation(item_id(params)?, relation, request, &info)
                    .await
            }
            RouteKind::Linked(relation) => {
                self.linked(resource, item_id(params)?, relation, request, &info)
                    .await
            }
            RouteKind::Create => {
                let document = self.decode_body(request, body)?;
                resource.create(&document, request, &info).await
            }
            RouteKind::Update => {
                let document = self.decode_body(request, body)?;
                resource
                    .update(item_id(params)?, &document, request, &info)
                    .await
            }
            RouteKind::Delete => resource.delete(item_id(params)?, request).await,
            RouteKind::ReplaceRelation(relation) => {
                let document = self.decode_body(request, body)?;
                resource
                    .replace_relation(item_id(params)?, relation, &document, request)
                    .await
            }
            RouteKind::AddToMany(relation) => {
                let document = self.decode_body(request, body)?;
                resource
                    .add_to_many(item_id(params)?, relation, &document, request)
                    .await
            }
            RouteKind::RemoveToMany(relation) => {
                let document = self.decode_body(request, body)?;
                resource
                    .remove_to_many(item_id(params)?, relation, &document, request)
                    .await
            }
        }
    }

    /// Resolves a linked-resource read: the target resource's collection
    /// fetch, scoped by the owner's id and relation name passed as filter
    /// hints.
    async fn linked(
        &self,
        owner: &Arc<dyn ResourceHandle>,
        id: &str,
        relation: &str,
        request: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply> {
        let reference = owner
            .references()
            .iter()
            .find(|r| r.name == relation)
            .ok_or_else(|| {
                EngineError::not_found(format!("There is no relation with the name {relation}"))
            })?;
        let target = self
            .resources
            .iter()
            .find(|r| r.name() == reference.resource_type)
            .ok_or_else(|| {
                EngineError::not_found(format!(
                    "No resource handler is registered to handle the linked resource {relation}"
                ))
            })?;

        let mut scoped = request.clone();
        scoped.insert_param(format!("{}ID", owner.name()), id);
        scoped.insert_param(format!("{}Name", owner.name()), relation);
        target.collection(&scoped, info).await
    }

    fn decode_body(&self, request: &Request, body: &Bytes) -> EngineResult<Document> {
        let (marshaler, _) = select_marshaler(request.headers(), &self.marshalers);
        let value = marshaler.unmarshal(body)?;
        match value {
            serde_json::Value::Object(document) => Ok(document),
            _ => Err(EngineError::bad_request("request body must be a JSON object")),
        }
    }

    fn information(&self, request: &Request) -> Information {
        let base = self
            .resolver
            .for_request(request.headers())
            .unwrap_or_else(|| self.resolver.base_url());
        Information::new(self.prefix.clone(), base)
    }
}

fn item_id<'p>(params: &'p Params) -> EngineResult<&'p str> {
    params
        .get("id")
        .ok_or_else(|| EngineError::internal("route matched without an :id parameter"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_prefix() {
        assert_eq!(trim_prefix("v1"), "v1");
        assert_eq!(trim_prefix("/v1/"), "v1");
        assert_eq!(trim_prefix("/api/v1"), "api/v1");
        assert_eq!(trim_prefix(""), "");
        assert_eq!(trim_prefix("/"), "");
    }
}
