use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};

use crate::context::AppContext;
use crate::views::{ConnectView, HomeView, ReviewView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/review", ReviewView)] Review {},
        #[route("/connect", ConnectView)] Connect {},
}

/// Redirects to the connect screen when no session is configured.
///
/// Thin by design: session presence is decided once at startup; this is a
/// guard, not an auth layer.
#[component]
pub fn RequireSession(children: Element) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let effect_ctx = ctx.clone();
    use_effect(move || {
        if !effect_ctx.has_session() {
            navigator.replace(Route::Connect {});
        }
    });

    if !ctx.has_session() {
        return rsx! {
            p { class: "muted", "Redirecting..." }
        };
    }
    rsx! {
        {children}
    }
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Recall" }
            ul {
                li { Link { to: Route::Home {}, "Dashboard" } }
                li { Link { to: Route::Review {}, "Review" } }
            }
        }
    }
}
