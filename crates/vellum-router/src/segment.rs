//! Default segment-matching router.

use crate::{Lookup, Params, Route};
use http::Method;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.strip_prefix(':').map_or_else(
                || Segment::Literal(s.to_string()),
                |name| Segment::Param(name.to_string()),
            )
        })
        .collect()
}

#[derive(Debug)]
struct Entry<H> {
    segments: Vec<Segment>,
    methods: HashMap<Method, H>,
}

impl<H> Entry<H> {
    fn matches(&self, path: &[&str]) -> Option<Params> {
        if self.segments.len() != path.len() {
            return None;
        }
        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(path) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => params.push(name.clone(), (*part).to_string()),
            }
        }
        Some(params)
    }

    fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }
}

/// A simple segment-matching router.
///
/// Patterns use `:name` placeholders (`/posts/:id/relationships/:relation`).
/// When several patterns match a path, the one with the most literal
/// segments wins, so `/posts/special` beats `/posts/:id`. Trailing slashes
/// are normalized away.
///
/// This is the default [`Route`] implementation; any conforming router can
/// replace it.
#[derive(Debug, Default)]
pub struct SegmentRouter<H> {
    entries: Vec<Entry<H>>,
}

impl<H> SegmentRouter<H> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H> Route<H> for SegmentRouter<H> {
    fn add(&mut self, method: Method, pattern: &str, handler: H) {
        let segments = parse_pattern(pattern);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.segments == segments) {
            entry.methods.insert(method, handler);
            return;
        }
        let mut methods = HashMap::new();
        methods.insert(method, handler);
        self.entries.push(Entry { segments, methods });
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, H> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut best: Option<(&Entry<H>, Params)> = None;
        for entry in &self.entries {
            if let Some(params) = entry.matches(&parts) {
                let better = best
                    .as_ref()
                    .map_or(true, |(current, _)| {
                        entry.literal_count() > current.literal_count()
                    });
                if better {
                    best = Some((entry, params));
                }
            }
        }
        match best {
            Some((entry, params)) => entry.methods.get(method).map_or(
                Lookup::MethodNotAllowed,
                |handler| Lookup::Found(handler, params),
            ),
            None => Lookup::NotFound,
        }
    }
}
