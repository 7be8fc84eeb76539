//! The entity model: backing types, references, and to-many editing.

use crate::naming;

/// A backing type exposed as a JSON:API resource.
///
/// Entities are plain data structs owned by the backend. The engine only
/// needs their identifier and their JSON:API type name; everything else
/// (attributes, relationships) is the codec collaborator's business.
///
/// # Example
///
/// ```
/// use vellum_core::Entity;
///
/// #[derive(Clone)]
/// struct Post {
///     id: String,
///     title: String,
/// }
///
/// impl Entity for Post {
///     fn id(&self) -> String {
///         self.id.clone()
///     }
/// }
///
/// assert_eq!(Post::resource_type(), "posts");
/// ```
pub trait Entity: Clone + Send + Sync + 'static {
    /// Returns the resource identifier.
    fn id(&self) -> String;

    /// Returns the JSON:API type name for this entity.
    ///
    /// The default derives the name from the Rust type name, pluralized and
    /// lower-camelled. Override this for irregular names; the override is
    /// the explicit naming capability.
    #[must_use]
    fn resource_type() -> String
    where
        Self: Sized,
    {
        naming::derive_type_name::<Self>()
    }
}

/// Cardinality of a relation.
///
/// Declared explicitly on every [`Reference`]. The engine never infers
/// cardinality from the relation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// The relation links at most one resource.
    ToOne,
    /// The relation links a collection of resources.
    ToMany,
}

/// A declared relation from one resource type to another.
///
/// References are consulted once at registration time to generate the
/// relationship and linked-resource routes; they are read-only afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The relation name, unique within its owning resource.
    pub name: String,
    /// The JSON:API type name of the target resource.
    pub resource_type: String,
    /// Whether the relation is to-one or to-many.
    pub cardinality: Cardinality,
}

impl Reference {
    /// Declares a to-one relation.
    #[must_use]
    pub fn to_one(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            cardinality: Cardinality::ToOne,
        }
    }

    /// Declares a to-many relation.
    #[must_use]
    pub fn to_many(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            cardinality: Cardinality::ToMany,
        }
    }
}

/// Capability for entities whose to-many relations can be edited through
/// the relationship mutation routes.
///
/// Implementations mutate their own foreign-key collections; the engine
/// hands every extracted identifier to a single call, so either the whole
/// batch applies or nothing does.
pub trait EditToManyRelations {
    /// Adds the given identifiers to the named to-many relation.
    fn add_to_many_ids(&mut self, relation: &str, ids: &[String]);

    /// Removes the given identifiers from the named to-many relation.
    fn delete_to_many_ids(&mut self, relation: &str, ids: &[String]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Article {
        id: String,
    }

    impl Entity for Article {
        fn id(&self) -> String {
            self.id.clone()
        }
    }

    #[derive(Clone)]
    struct Person;

    impl Entity for Person {
        fn id(&self) -> String {
            String::new()
        }

        fn resource_type() -> String {
            "people".to_string()
        }
    }

    #[test]
    fn test_default_resource_type() {
        assert_eq!(Article::resource_type(), "articles");
        let article = Article {
            id: "7".to_string(),
        };
        assert_eq!(article.id(), "7");
    }

    #[test]
    fn test_resource_type_override() {
        assert_eq!(Person::resource_type(), "people");
    }

    #[test]
    fn test_reference_constructors() {
        let one = Reference::to_one("author", "users");
        assert_eq!(one.cardinality, Cardinality::ToOne);
        let many = Reference::to_many("comments", "comments");
        assert_eq!(many.cardinality, Cardinality::ToMany);
        assert_eq!(many.name, "comments");
    }
}
