//! Depth-first search for survey prefixes in a delimiter-based namespace.
//!
//! The namespace below a data category root has a fixed shape:
//!
//! ```text
//! mb/                              namespace root
//!   ship/                          platform type
//!     okeanos_explorer/            platform
//!       EX1811/                    survey
//! ```
//!
//! The walk lists one node at a time and stops as soon as every requested
//! survey has been found, so unrelated platforms are never listed.

use std::ops::ControlFlow;

use futures_util::TryStreamExt;
use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::SurveyRequest;
use crate::store::{DELIMITER, ListRequest, ObjectStore, StoreError, base_name, pages};

/// Levels between a namespace root and a survey prefix
/// (platform type, platform, survey).
pub const SURVEY_DEPTH: usize = 3;

/// A requested survey and the prefix it was found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSurvey {
    /// Requested survey name.
    pub name: String,
    /// Full prefix of the survey, ending in the delimiter.
    pub prefix: String,
}

/// Outcome of a resolution walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Matched surveys in discovery order.
    pub matched: Vec<ResolvedSurvey>,
    /// Requested names that were not found, in request order.
    pub missing: Vec<String>,
}

impl Resolution {
    /// Matched prefixes in discovery order.
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        self.matched.iter().map(|s| s.prefix.clone()).collect()
    }

    /// True when every requested survey was found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// True when nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Names still being looked for and what has been matched so far.
struct Search {
    outstanding: Vec<String>,
    matched: Vec<ResolvedSurvey>,
}

impl Search {
    fn new(request: &SurveyRequest) -> Self {
        Self {
            outstanding: request.names().to_vec(),
            matched: Vec::new(),
        }
    }

    /// Matches a survey prefix against the outstanding names; first match wins.
    fn offer(&mut self, prefix: &str) {
        let name = base_name(prefix, DELIMITER);
        if let Some(index) = self.outstanding.iter().position(|wanted| wanted == name) {
            let name = self.outstanding.remove(index);
            info!(survey = %name, prefix, "found matching survey");
            self.matched.push(ResolvedSurvey {
                name,
                prefix: prefix.to_string(),
            });
        }
    }

    fn is_satisfied(&self) -> bool {
        self.outstanding.is_empty()
    }
}

/// Resolves survey names to prefixes by walking the namespace tree.
pub struct SurveyResolver<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> SurveyResolver<'a> {
    /// Creates a resolver over `store`; surveys sit [`SURVEY_DEPTH`] levels
    /// below the root.
    #[must_use]
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Finds the prefixes of the requested surveys below `root`.
    ///
    /// Names that are never found are reported in [`Resolution::missing`];
    /// a partial result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Listing`] if any listing call fails; the walk is
    /// abandoned at that point.
    #[instrument(skip(self, request), fields(bucket = self.store.bucket(), wanted = request.len()))]
    pub async fn resolve(
        &self,
        root: &str,
        request: &SurveyRequest,
    ) -> Result<Resolution, StoreError> {
        let mut search = Search::new(request);
        let flow = self.walk(root.to_string(), SURVEY_DEPTH, &mut search).await?;
        debug!(stopped_early = flow.is_break(), "namespace walk finished");

        Ok(Resolution {
            matched: search.matched,
            missing: search.outstanding,
        })
    }

    /// Visits `prefix`, whose survey descendants sit `levels` levels below it.
    ///
    /// Breaks once the search is satisfied; the check runs after each node
    /// whose children are surveys has been fully listed.
    fn walk<'s>(
        &'s self,
        prefix: String,
        levels: usize,
        search: &'s mut Search,
    ) -> BoxFuture<'s, Result<ControlFlow<()>, StoreError>> {
        async move {
            if levels > 1 {
                debug!(prefix = %prefix, levels, "listing namespace node");
            } else {
                info!(prefix = %prefix, "searching");
            }

            let mut listing = std::pin::pin!(pages(
                self.store,
                ListRequest::children(prefix.as_str(), DELIMITER)
            ));

            while let Some(page) = listing.try_next().await? {
                for child in page.common_prefixes {
                    if levels == 1 {
                        search.offer(&child);
                    } else if self.walk(child, levels - 1, search).await?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
            }

            if levels == 1 && search.is_satisfied() {
                return Ok(ControlFlow::Break(()));
            }
            Ok(ControlFlow::Continue(()))
        }
        .boxed()
    }
}
