use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GatewayError {
    #[snafu(display("backend base URL '{raw}' is invalid on `{stage}`: {details}"))]
    InvalidBaseUrl {
        stage: &'static str,
        raw: String,
        details: String,
    },
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("request to {path} failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        path: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("backend returned status {status} for {path}: {body}"))]
    Status {
        stage: &'static str,
        path: &'static str,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode {path} payload on `{stage}`: {source}"))]
    Decode {
        stage: &'static str,
        path: &'static str,
        source: serde_json::Error,
    },
}

pub type GatewayResult<T> = Result<T, GatewayError>;
