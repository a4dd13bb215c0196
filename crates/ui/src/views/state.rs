use dioxus::prelude::*;

use services::{QueryError, SessionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unauthorized,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unauthorized => "Not signed in. Check your API token.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&QueryError> for ViewError {
    fn from(err: &QueryError) -> Self {
        match err {
            QueryError::Api(api) if matches!(api, api::ApiError::Unauthorized) => {
                ViewError::Unauthorized
            }
            _ => ViewError::Unknown,
        }
    }
}

impl From<&SessionError> for ViewError {
    fn from(err: &SessionError) -> Self {
        match err {
            SessionError::Api(api::ApiError::Unauthorized)
            | SessionError::Query(QueryError::Api(api::ApiError::Unauthorized)) => {
                ViewError::Unauthorized
            }
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
