//! Google sign-in through the Firebase web SDK loaded by the host page.
//!
//! Only the ID token crosses into Rust; the backend verifies it and opens the
//! voter session.

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use yew::Callback;

use shared::portal::sign_in_error_message;

fn get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(key))?;
    if value.is_undefined() || value.is_null() {
        Err(JsValue::from_str(&format!("{} is not available", key)))
    } else {
        Ok(value)
    }
}

fn call(target: &JsValue, method: &str, args: &Array) -> Result<JsValue, JsValue> {
    let func: Function = get(target, method)?.dyn_into()?;
    func.apply(target, args)
}

async fn resolve(value: JsValue) -> Result<JsValue, JsValue> {
    let promise: Promise = value.dyn_into()?;
    JsFuture::from(promise).await
}

fn firebase() -> Result<JsValue, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    get(&window, "firebase")
}

fn auth() -> Result<JsValue, JsValue> {
    call(&firebase()?, "auth", &Array::new())
}

async fn id_token(user: &JsValue) -> Result<String, JsValue> {
    resolve(call(user, "getIdToken", &Array::new())?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("ID token was not a string"))
}

/// Turns a rejected sign-in into the message shown to the voter.
fn describe(err: &JsValue) -> String {
    let code = Reflect::get(err, &JsValue::from_str("code")).ok().and_then(|c| c.as_string());
    let message = Reflect::get(err, &JsValue::from_str("message")).ok().and_then(|m| m.as_string())
        .or_else(|| err.as_string());
    sign_in_error_message(code.as_deref().unwrap_or_default(), message.as_deref())
}

/// Opens the Google popup and returns the signed-in user's ID token.
pub async fn sign_in_with_popup() -> Result<String, String> {
    let attempt = async {
        let firebase = firebase()?;
        let auth_namespace = get(&firebase, "auth")?;
        let provider_class: Function = get(&auth_namespace, "GoogleAuthProvider")?.dyn_into()?;
        let provider = Reflect::construct(&provider_class, &Array::new())?;
        for scope in ["email", "profile"] {
            call(&provider, "addScope", &Array::of1(&JsValue::from_str(scope)))?;
        }

        let result = resolve(call(&auth()?, "signInWithPopup", &Array::of1(&provider))?).await?;
        let user = get(&result, "user")?;
        if let Ok(email) = get(&user, "email") {
            tracing::info!(email = ?email.as_string(), "google sign-in completed");
        }
        id_token(&user).await
    };

    attempt.await.map_err(|err| {
        tracing::warn!(error = ?err, "google sign-in failed");
        describe(&err)
    })
}

pub async fn sign_out() {
    let outcome = match auth().and_then(|auth| call(&auth, "signOut", &Array::new())) {
        Ok(promise) => resolve(promise).await.map(|_| ()),
        Err(err) => Err(err),
    };
    if let Err(err) = outcome {
        tracing::debug!(error = ?err, "identity provider sign-out skipped");
    }
}

/// Keeps a Firebase auth-state listener registered until dropped.
pub struct AuthWatch {
    _listener: Closure<dyn FnMut(JsValue)>,
    unsubscribe: Option<Function>,
}

impl Drop for AuthWatch {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            let _ = unsubscribe.call0(&JsValue::NULL);
        }
    }
}

/// Emits an ID token whenever the provider reports a signed-in user, which
/// restores a voter whose backend session expired but whose Google session
/// did not.
pub fn watch_auth_state(on_token: Callback<String>) -> Option<AuthWatch> {
    let auth = match auth() {
        Ok(auth) => auth,
        Err(err) => {
            tracing::warn!(error = ?err, "identity provider not loaded");
            return None;
        }
    };

    let listener = Closure::wrap(Box::new(move |user: JsValue| {
        if user.is_null() || user.is_undefined() {
            return;
        }
        let on_token = on_token.clone();
        spawn_local(async move {
            match id_token(&user).await {
                Ok(token) => on_token.emit(token),
                Err(err) => tracing::warn!(error = ?err, "could not read ID token"),
            }
        });
    }) as Box<dyn FnMut(JsValue)>);

    let unsubscribe = call(&auth, "onAuthStateChanged", &Array::of1(listener.as_ref()))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok());

    Some(AuthWatch { _listener: listener, unsubscribe })
}
