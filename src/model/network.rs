use serde::Deserialize;

/// Submitted by the remote API URL control.
#[derive(Deserialize, Debug)]
pub struct ApiUrlForm {
    pub url: String,
}
