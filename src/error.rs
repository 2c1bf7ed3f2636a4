use thiserror::Error;

/// Errors raised while binding the controls to a page.
#[derive(Debug, Error)]
pub enum ControlsError {
    #[error("no element with id `{id}` in the page")]
    ElementNotFound { id: String },

    #[error("element `{id}` has no `{attribute}` and no value was given")]
    MissingMetric { id: String, attribute: &'static str },

    #[error("element `{id}` has a non-numeric `{attribute}`: {value:?}")]
    InvalidMetric {
        id: String,
        attribute: &'static str,
        value: String,
    },
}
