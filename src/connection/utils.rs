use secrecy::ExposeSecret;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;

use crate::connection::consts::{AUTHORIZATION_HEADER, BETA_HEADER};
use crate::connection::options::ConnectOptions;

pub fn build_request(options: &ConnectOptions) -> tokio_tungstenite::tungstenite::Result<Request> {
    let mut request = format!(
        "{}/realtime?model={}",
        options.base_url(),
        options.model()
    )
    .into_client_request()?;
    request.headers_mut().insert(
        AUTHORIZATION_HEADER,
        format!("Bearer {}", options.api_key().expose_secret())
            .as_str()
            .parse()?,
    );
    request
        .headers_mut()
        .insert(BETA_HEADER, "realtime=v1".parse()?);
    Ok(request)
}
