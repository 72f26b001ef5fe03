//! Browser transport using the Fetch API

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{RequestInit, RequestMode};

use super::{Endpoint, NetError, Request, Response};

/// Perform one request against the remote authority
pub async fn perform(endpoint: &Endpoint, request: &Request) -> Response {
    let url = match endpoint.url_for(request) {
        Ok(url) => url.to_string(),
        Err(e) => return Response::failed(request, NetError::Url(e.to_string())),
    };
    match fetch_text(&url).await {
        Ok((status, body)) => Response::from_http(request, status, &body),
        Err(e) => Response::failed(request, e),
    }
}

/// Run `request` in the background and hand the response to `on_done`
pub fn spawn(endpoint: Endpoint, request: Request, on_done: impl FnOnce(Response) + 'static) {
    wasm_bindgen_futures::spawn_local(async move {
        let response = perform(&endpoint, &request).await;
        on_done(response);
    });
}

async fn fetch_text(url: &str) -> Result<(u16, String), NetError> {
    let window = web_sys::window().ok_or_else(|| NetError::Transport("no window".to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    let request = web_sys::Request::new_with_str_and_init(url, &opts).map_err(transport)?;

    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?;
    let response: web_sys::Response = value.dyn_into().map_err(transport)?;
    let status = response.status();

    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(|e| NetError::Parse(format!("{:?}", e)))?;

    Ok((status, text.as_string().unwrap_or_default()))
}

fn transport(e: JsValue) -> NetError {
    NetError::Transport(format!("{:?}", e))
}
