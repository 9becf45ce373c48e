use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DispatchError {
    #[snafu(display("unrecognized action type '{action_type}'"))]
    InvalidAction {
        stage: &'static str,
        action_type: String,
    },
    #[snafu(display("action {action} rejected an invalid argument: {details}"))]
    InvalidArgument {
        stage: &'static str,
        action: &'static str,
        details: String,
    },
    #[snafu(display("failed to decode action message on `{stage}`: {source}"))]
    DecodeAction {
        stage: &'static str,
        source: serde_json::Error,
    },
}

impl DispatchError {
    pub fn is_invalid_action(&self) -> bool {
        matches!(self, Self::InvalidAction { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
