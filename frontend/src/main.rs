use yew::prelude::*;
use yew_router::prelude::*;

mod admin_console;
mod browser;
mod identity;
mod logging;
mod render_results;
mod styles;
mod transport;
mod voter_portal;

use crate::{admin_console::AdminConsole, voter_portal::VoterPortal};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")] Portal,
    #[at("/admin")] Admin,
    #[not_found]
    #[at("/404")] NotFound,
}

#[function_component(App)]
fn app() -> Html {
    html! {
        <BrowserRouter>
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Portal => html! { <VoterPortal /> },
        Route::Admin => html! { <AdminConsole /> },
        Route::NotFound => html! { <Redirect<Route> to={Route::Portal} /> },
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    logging::init();
    tracing::info!("ballot client starting");
    yew::Renderer::<App>::new().render();
}
