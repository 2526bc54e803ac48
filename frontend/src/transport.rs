use async_trait::async_trait;
use gloo_net::http::Request;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData, RequestCredentials};

use shared::config::CONFIG;
use shared::error::TransportError;
use shared::gateway::{ApiRequest, FormPart, FormValue, Method, RequestBody, Transport, UploadFile};

/// `fetch` with same-origin credentials so the session cookie rides along.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, TransportError> {
        let url = CONFIG.url(&request.path);
        let mut builder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
        }
        .credentials(RequestCredentials::SameOrigin);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.body(body),
            RequestBody::Multipart(parts) => builder.body(form_data(parts)?),
        };

        let response = builder.send().await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        response.text().await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

fn form_data(parts: Vec<FormPart>) -> Result<FormData, TransportError> {
    let form = FormData::new().map_err(js_error)?;
    for part in parts {
        match part.value {
            FormValue::Text(text) => form.append_with_str(&part.name, &text),
            FormValue::File(file) => {
                let blob = to_blob(&file)?;
                form.append_with_blob_and_filename(&part.name, &blob, &file.file_name)
            }
        }
        .map_err(js_error)?;
    }
    Ok(form)
}

fn to_blob(file: &UploadFile) -> Result<Blob, TransportError> {
    let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
    let sequence = js_sys::Array::of1(&bytes);
    let mut options = BlobPropertyBag::new();
    options.type_(&file.content_type);
    Blob::new_with_u8_array_sequence_and_options(&sequence, &options).map_err(js_error)
}

pub(crate) fn js_error(err: JsValue) -> TransportError {
    TransportError::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}
