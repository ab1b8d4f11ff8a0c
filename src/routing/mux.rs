//! Order-sensitive request multiplexer.
//!
//! # Responsibilities
//! - Store (verb, template, handler) registrations in order
//! - Mount sub-muxes under path prefixes
//! - Look up the first registration matching a request
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins; specificity is the registrant's job (see `rank`)
//! - The caller may reject a candidate and the scan continues past it
//! - Explicit no-match (`None`) rather than a silent default

use axum::http::Method;

use crate::registry::Verb;
use crate::routing::pattern::{PathParams, PathPattern};

#[derive(Debug)]
enum Layer<H> {
    Route {
        verb: Verb,
        pattern: PathPattern,
        handler: H,
    },
    Mount {
        pattern: PathPattern,
        mux: Mux<H>,
    },
    CatchAll {
        handler: H,
    },
}

/// A successful lookup.
#[derive(Debug)]
pub struct Match<'a, H> {
    pub handler: &'a H,
    pub params: PathParams,
}

#[derive(Debug)]
pub struct Mux<H> {
    layers: Vec<Layer<H>>,
}

impl<H> Default for Mux<H> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<H> Mux<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `verb` requests whose path matches `template`.
    pub fn route(&mut self, verb: Verb, template: &str, handler: H) {
        self.layers.push(Layer::Route {
            verb,
            pattern: PathPattern::new(template),
            handler,
        });
    }

    /// Mount `mux` under `prefix`. The sub-mux sees the remaining path.
    pub fn mount(&mut self, prefix: &str, mux: Mux<H>) {
        self.layers.push(Layer::Mount {
            pattern: PathPattern::new(prefix),
            mux,
        });
    }

    /// Register a handler that matches any request reaching it.
    pub fn catch_all(&mut self, handler: H) {
        self.layers.push(Layer::CatchAll { handler });
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Find the first registration that matches and that `accept` approves.
    pub fn find(
        &self,
        method: &Method,
        path: &str,
        accept: &dyn Fn(&H) -> bool,
    ) -> Option<Match<'_, H>> {
        for layer in &self.layers {
            match layer {
                Layer::Route {
                    verb,
                    pattern,
                    handler,
                } => {
                    if !verb.matches(method) || !accept(handler) {
                        continue;
                    }
                    if let Some(params) = pattern.match_path(path) {
                        return Some(Match { handler, params });
                    }
                }
                Layer::Mount { pattern, mux } => {
                    let Some((mut params, rest)) = pattern.match_prefix(path) else {
                        continue;
                    };
                    if let Some(found) = mux.find(method, &rest, accept) {
                        params.extend(found.params);
                        return Some(Match {
                            handler: found.handler,
                            params,
                        });
                    }
                }
                Layer::CatchAll { handler } => {
                    if accept(handler) {
                        return Some(Match {
                            handler,
                            params: PathParams::default(),
                        });
                    }
                }
            }
        }
        None
    }
}
