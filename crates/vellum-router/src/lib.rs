//! Pluggable route matching for the Vellum JSON:API engine.
//!
//! The engine only asks a router for two things: register a (verb,
//! path-pattern) pair to a handler value, and resolve an incoming verb and
//! path to that handler plus its extracted `:param` path parameters. Those
//! two operations are the [`Route`] trait; [`SegmentRouter`] is the default
//! implementation and any conforming router can replace it.

mod params;
mod segment;

pub use params::Params;
pub use segment::SegmentRouter;

use http::Method;

/// The result of resolving a verb and path.
#[derive(Debug)]
pub enum Lookup<'r, H> {
    /// A route matched; carries the handler and the extracted parameters.
    Found(&'r H, Params),
    /// The path is known but no handler is bound for this verb.
    MethodNotAllowed,
    /// No registered pattern matches the path.
    NotFound,
}

/// The router abstraction the engine registers its generated routes with.
///
/// `H` is an opaque handler value owned by the caller; the router only
/// stores and returns it.
pub trait Route<H> {
    /// Binds a handler to a verb and path pattern.
    ///
    /// Patterns use `:name` placeholders, e.g. `/v1/posts/:id`.
    fn add(&mut self, method: Method, pattern: &str, handler: H);

    /// Resolves a verb and concrete path.
    fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, H>;
}
