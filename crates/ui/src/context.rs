use std::sync::Arc;

use services::{Queries, ReviewWorkflow};

/// UI-facing surface of the composition root.
pub trait UiApp: Send + Sync {
    /// Whether a session (API token or demo mode) is present. Pages that
    /// need the remote API are gated on this.
    fn has_session(&self) -> bool;

    fn queries(&self) -> Arc<Queries>;
    fn review_workflow(&self) -> Arc<ReviewWorkflow>;
}

#[derive(Clone)]
pub struct AppContext {
    has_session: bool,
    queries: Arc<Queries>,
    review_workflow: Arc<ReviewWorkflow>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            has_session: app.has_session(),
            queries: app.queries(),
            review_workflow: app.review_workflow(),
        }
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.has_session
    }

    #[must_use]
    pub fn queries(&self) -> Arc<Queries> {
        Arc::clone(&self.queries)
    }

    #[must_use]
    pub fn review_workflow(&self) -> Arc<ReviewWorkflow> {
        Arc::clone(&self.review_workflow)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
