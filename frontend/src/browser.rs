use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement, HtmlSelectElement};
use yew::NodeRef;

use shared::error::TransportError;
use shared::gateway::UploadFile;

use crate::transport::js_error;

/// Native confirm dialog. A missing window counts as "no".
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub fn input_value(node: &NodeRef) -> String {
    node.cast::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

pub fn clear_input(node: &NodeRef) {
    if let Some(input) = node.cast::<HtmlInputElement>() {
        input.set_value("");
    }
}

pub fn selected_file(node: &NodeRef) -> Option<File> {
    node.cast::<HtmlInputElement>()
        .and_then(|input| input.files())
        .and_then(|files| files.get(0))
}

/// Copies a picked file into memory for a multipart upload.
pub async fn read_upload(file: File) -> Result<UploadFile, TransportError> {
    let buffer = JsFuture::from(file.array_buffer()).await.map_err(js_error)?;
    Ok(UploadFile {
        file_name: file.name(),
        content_type: file.type_(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

/// Reads a picked file. `Ok(None)` means nothing was picked.
pub async fn picked_upload(file: Option<File>) -> Result<Option<UploadFile>, TransportError> {
    let Some(file) = file else {
        return Ok(None);
    };
    read_upload(file).await.map(Some).map_err(|err| {
        tracing::warn!(error = %err, "selected file could not be read");
        err
    })
}

pub fn select_value(node: &NodeRef) -> String {
    node.cast::<HtmlSelectElement>()
        .map(|select| select.value())
        .unwrap_or_default()
}
