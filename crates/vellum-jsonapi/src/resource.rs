//! Resource registration and the per-resource route handlers.
//!
//! A resource is assembled once through [`ResourceBuilder`]: the mandatory
//! CRUD backend plus the codec, with the optional capabilities bound
//! explicitly (`with_find_all`, `with_pagination`, `with_to_many_edit`).
//! Capabilities are resolved here, at registration time, and cached as
//! trait objects; requests never re-probe the backend. A capability that
//! was not bound surfaces as a 404 "does not implement the … interface"
//! error when a request needs it.

use async_trait::async_trait;
use http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

use vellum_core::{
    Codec, Crud, Document, EditToManyRelations, EngineError, EngineResult, Entity, FindAll,
    Information, Meta, PaginatedFindAll, Payload, Reference, Request, Response,
};

use crate::pagination::PaginationQueryParams;
use crate::respond::RouteReply;

/// Registration-time capability cache for to-many editing.
struct ToManyEdit<T> {
    add: fn(&mut T, &str, &[String]),
    delete: fn(&mut T, &str, &[String]),
}

/// Builder assembling one resource before it is added to the API.
///
/// # Example
///
/// ```rust,ignore
/// api.add_resource(
///     ResourceBuilder::new(PostCodec, store)
///         .with_find_all()
///         .with_pagination()
///         .with_to_many_edit(),
/// );
/// ```
pub struct ResourceBuilder<T, C, S> {
    codec: Arc<C>,
    source: Arc<S>,
    find_all: Option<Arc<dyn FindAll<T>>>,
    paginated: Option<Arc<dyn PaginatedFindAll<T>>>,
    to_many_edit: Option<ToManyEdit<T>>,
}

impl<T, C, S> ResourceBuilder<T, C, S>
where
    T: Entity,
    C: Codec<T> + 'static,
    S: Crud<T> + 'static,
{
    /// Starts a resource from its codec and mandatory CRUD backend.
    #[must_use]
    pub fn new(codec: C, source: S) -> Self {
        Self {
            codec: Arc::new(codec),
            source: Arc::new(source),
            find_all: None,
            paginated: None,
            to_many_edit: None,
        }
    }

    /// Binds the plain collection-fetch capability.
    #[must_use]
    pub fn with_find_all(mut self) -> Self
    where
        S: FindAll<T>,
    {
        self.find_all = Some(self.source.clone());
        self
    }

    /// Binds the paginated collection-fetch capability.
    #[must_use]
    pub fn with_pagination(mut self) -> Self
    where
        S: PaginatedFindAll<T>,
    {
        self.paginated = Some(self.source.clone());
        self
    }

    /// Declares the entity's to-many relations editable through the
    /// relationship mutation routes.
    #[must_use]
    pub fn with_to_many_edit(mut self) -> Self
    where
        T: EditToManyRelations,
    {
        self.to_many_edit = Some(ToManyEdit {
            add: T::add_to_many_ids,
            delete: T::delete_to_many_ids,
        });
        self
    }

    pub(crate) fn into_handle(self) -> Arc<dyn ResourceHandle> {
        let references = self.codec.references();
        Arc::new(Endpoint {
            name: T::resource_type(),
            references,
            codec: self.codec,
            source: self.source,
            find_all: self.find_all,
            paginated: self.paginated,
            to_many_edit: self.to_many_edit,
        })
    }
}

/// Type-erased view of one registered resource, as the dispatcher sees it.
#[async_trait]
pub(crate) trait ResourceHandle: Send + Sync {
    fn name(&self) -> &str;
    fn references(&self) -> &[Reference];
    fn to_many_editable(&self) -> bool;

    /// GET collection, with pagination dispatch. Also invoked on the
    /// target resource of a linked-resource read.
    async fn collection(&self, req: &Request, info: &Information) -> EngineResult<RouteReply>;
    async fn read(&self, id: &str, req: &Request, info: &Information) -> EngineResult<RouteReply>;
    async fn read_relation(
        &self,
        id: &str,
        relation: &str,
        req: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply>;
    async fn create(
        &self,
        document: &Document,
        req: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply>;
    async fn update(
        &self,
        id: &str,
        document: &Document,
        req: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply>;
    async fn delete(&self, id: &str, req: &Request) -> EngineResult<RouteReply>;
    async fn replace_relation(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
    ) -> EngineResult<RouteReply>;
    async fn add_to_many(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
    ) -> EngineResult<RouteReply>;
    async fn remove_to_many(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
    ) -> EngineResult<RouteReply>;
}

struct Endpoint<T: Entity> {
    name: String,
    references: Vec<Reference>,
    codec: Arc<dyn Codec<T>>,
    source: Arc<dyn Crud<T>>,
    find_all: Option<Arc<dyn FindAll<T>>>,
    paginated: Option<Arc<dyn PaginatedFindAll<T>>>,
    to_many_edit: Option<ToManyEdit<T>>,
}

impl<T: Entity> Endpoint<T> {
    fn document_for(
        &self,
        payload: Payload<'_, T>,
        meta: &Meta,
        info: &Information,
    ) -> EngineResult<Value> {
        let mut document = self.codec.marshal(payload, info)?;
        if !meta.is_empty() {
            document.insert("meta".to_string(), Value::Object(meta.clone()));
        }
        Ok(Value::Object(document))
    }

    fn entity_of<'a>(&self, response: &'a Response<T>) -> EngineResult<&'a T> {
        response.result().ok_or_else(|| {
            EngineError::internal(format!(
                "expected FindOne to return one object of resource {}",
                self.name
            ))
        })
    }

    fn require_data<'d>(document: &'d Document) -> EngineResult<&'d Value> {
        document.get("data").ok_or_else(|| {
            EngineError::bad_request(r#"Invalid object. Need a "data" object"#)
        })
    }

    async fn mutate_to_many(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
        adding: bool,
    ) -> EngineResult<RouteReply> {
        let edit = self.to_many_edit.as_ref().ok_or_else(|| {
            EngineError::capability_missing(self.name.clone(), "EditToManyRelations")
        })?;
        let found = self.source.find_one(id, req).await?;
        let linkage = Self::require_data(document)?;
        let entries = linkage.as_array().ok_or_else(|| {
            EngineError::bad_request(
                r#"Data must be an array with "id" and "type" fields to modify to-many relationships"#,
            )
        })?;

        // Either every entry yields an id or the whole batch is rejected
        // before the backend sees anything.
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let id_value = entry
                .as_object()
                .and_then(|o| o.get("id"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    EngineError::bad_request("no id field found inside data object")
                })?;
            ids.push(id_value.to_string());
        }

        let mut entity = self.entity_of(&found)?.clone();
        if adding {
            (edit.add)(&mut entity, relation, &ids);
        } else {
            (edit.delete)(&mut entity, relation, &ids);
        }
        self.source.update(entity, req).await?;
        Ok(RouteReply::empty(StatusCode::NO_CONTENT))
    }
}

#[async_trait]
impl<T: Entity> ResourceHandle for Endpoint<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> &[Reference] {
        &self.references
    }

    fn to_many_editable(&self) -> bool {
        self.to_many_edit.is_some()
    }

    async fn collection(&self, req: &Request, info: &Information) -> EngineResult<RouteReply> {
        let pagination = PaginationQueryParams::from_request(req);
        if pagination.is_valid() {
            let source = self.paginated.as_ref().ok_or_else(|| {
                EngineError::capability_missing(self.name.clone(), "PaginatedFindAll")
            })?;
            let (count, response) = source.paginated_find_all(req).await?;
            let links = pagination.links(req, count, info)?;
            let items = response.result().map(Vec::as_slice).unwrap_or(&[]);
            let mut document = self.document_for(Payload::Many(items), response.metadata(), info)?;
            if let Some(content) = document.as_object_mut() {
                let links =
                    serde_json::to_value(&links).map_err(|e| EngineError::codec(e.to_string()))?;
                content.insert("links".to_string(), links);
            }
            return Ok(RouteReply::document(StatusCode::OK, document));
        }

        let source = self
            .find_all
            .as_ref()
            .ok_or_else(|| EngineError::capability_missing(self.name.clone(), "FindAll"))?;
        let response = source.find_all(req).await?;
        let items = response.result().map(Vec::as_slice).unwrap_or(&[]);
        let document = self.document_for(Payload::Many(items), response.metadata(), info)?;
        Ok(RouteReply::document(StatusCode::OK, document))
    }

    async fn read(&self, id: &str, req: &Request, info: &Information) -> EngineResult<RouteReply> {
        let response = self.source.find_one(id, req).await?;
        let entity = self.entity_of(&response)?;
        let document = self.document_for(Payload::One(entity), response.metadata(), info)?;
        Ok(RouteReply::document(StatusCode::OK, document))
    }

    async fn read_relation(
        &self,
        id: &str,
        relation: &str,
        req: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply> {
        let response = self.source.find_one(id, req).await?;
        let entity = self.entity_of(&response)?;

        // The relationship linkage is extracted from the fully marshaled
        // owner, never fetched from the backend directly, so it is always
        // consistent with what a full read would return.
        let document = self.codec.marshal(Payload::One(entity), info)?;
        let invalid =
            || EngineError::InvalidDocument("Internal server error, invalid object structure".to_string());
        let data = document.get("data").and_then(Value::as_object).ok_or_else(invalid)?;
        let relationships = data
            .get("relationships")
            .and_then(Value::as_object)
            .ok_or_else(invalid)?;
        let rel = match relationships.get(relation) {
            None => {
                return Err(EngineError::not_found(format!(
                    "There is no relation with the name {relation}"
                )))
            }
            Some(value) => value.as_object().ok_or_else(invalid)?,
        };
        let links = rel.get("links").and_then(Value::as_object).ok_or_else(invalid)?;
        let self_link = links.get("self").and_then(Value::as_str).ok_or_else(invalid)?;
        let related_link = links.get("related").and_then(Value::as_str).ok_or_else(invalid)?;
        let linkage = rel.get("data").ok_or_else(invalid)?;

        let mut result = json!({
            "links": { "self": self_link, "related": related_link },
            "data": linkage,
        });
        if !response.metadata().is_empty() {
            result["meta"] = Value::Object(response.metadata().clone());
        }
        Ok(RouteReply::document(StatusCode::OK, result))
    }

    async fn create(
        &self,
        document: &Document,
        req: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply> {
        let entity = self.codec.create(document)?;
        let response = self.source.create(entity, req).await?;
        let created = response.result().ok_or_else(|| {
            EngineError::internal(format!(
                "expected one newly created object by resource {}",
                self.name
            ))
        })?;

        let location = if info.prefix().is_empty() {
            format!("/{}/{}", self.name, created.id())
        } else {
            format!("/{}/{}/{}", info.prefix(), self.name, created.id())
        };

        match response.status_code() {
            StatusCode::CREATED => {
                let document =
                    self.document_for(Payload::One(created), response.metadata(), info)?;
                Ok(RouteReply::document(StatusCode::CREATED, document).with_location(location))
            }
            StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                Ok(RouteReply::empty(response.status_code()).with_location(location))
            }
            status => Err(EngineError::InvalidStatusCode {
                status: status.as_u16(),
                resource: self.name.clone(),
                operation: "Create",
            }),
        }
    }

    async fn update(
        &self,
        id: &str,
        document: &Document,
        req: &Request,
        info: &Information,
    ) -> EngineResult<RouteReply> {
        let found = self.source.find_one(id, req).await?;

        let data = document
            .get("data")
            .ok_or_else(|| EngineError::forbidden("missing mandatory data key."))?;
        let object = data
            .as_object()
            .ok_or_else(|| EngineError::forbidden("data must contain an object."))?;
        if !object.contains_key("id") {
            return Err(EngineError::forbidden("missing mandatory id key."));
        }
        if !object.contains_key("type") {
            return Err(EngineError::forbidden("missing mandatory type key."));
        }

        let mut entity = self.entity_of(&found)?.clone();
        self.codec.unmarshal(document, &mut entity)?;
        let response = self.source.update(entity, req).await?;

        match response.status_code() {
            StatusCode::OK => {
                if let Some(updated) = response.result() {
                    let document =
                        self.document_for(Payload::One(updated), response.metadata(), info)?;
                    return Ok(RouteReply::document(StatusCode::OK, document));
                }
                // "Updated, fetch fresh": exactly one re-fetch for the
                // canonical post-update representation.
                let fresh = self.source.find_one(id, req).await?;
                let updated = self.entity_of(&fresh)?;
                let document = self.document_for(Payload::One(updated), fresh.metadata(), info)?;
                Ok(RouteReply::document(StatusCode::OK, document))
            }
            StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                Ok(RouteReply::empty(response.status_code()))
            }
            status => Err(EngineError::InvalidStatusCode {
                status: status.as_u16(),
                resource: self.name.clone(),
                operation: "Update",
            }),
        }
    }

    async fn delete(&self, id: &str, req: &Request) -> EngineResult<RouteReply> {
        let response = self.source.delete(id, req).await?;
        match response.status_code() {
            StatusCode::OK => Ok(RouteReply::document(
                StatusCode::OK,
                json!({ "meta": response.metadata() }),
            )),
            StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                Ok(RouteReply::empty(response.status_code()))
            }
            status => Err(EngineError::InvalidStatusCode {
                status: status.as_u16(),
                resource: self.name.clone(),
                operation: "Delete",
            }),
        }
    }

    async fn replace_relation(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
    ) -> EngineResult<RouteReply> {
        let found = self.source.find_one(id, req).await?;
        let linkage = Self::require_data(document)?;
        let mut entity = self.entity_of(&found)?.clone();
        self.codec.apply_relationship(&mut entity, relation, linkage)?;
        self.source.update(entity, req).await?;
        Ok(RouteReply::empty(StatusCode::NO_CONTENT))
    }

    async fn add_to_many(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
    ) -> EngineResult<RouteReply> {
        self.mutate_to_many(id, relation, document, req, true).await
    }

    async fn remove_to_many(
        &self,
        id: &str,
        relation: &str,
        document: &Document,
        req: &Request,
    ) -> EngineResult<RouteReply> {
        self.mutate_to_many(id, relation, document, req, false).await
    }
}
