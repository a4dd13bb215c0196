use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn ConnectView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    if ctx.has_session() {
        return rsx! {
            div { class: "page connect-page",
                h2 { "Connected" }
                p { "You're ready to go." }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| {
                        let _ = navigator.replace(Route::Home {});
                    },
                    "Open Dashboard"
                }
            }
        };
    }

    rsx! {
        div { class: "page connect-page",
            h2 { "Connect to a server" }
            p { "Recall needs a learning server to talk to. Point it at one and restart:" }
            ul { class: "connect-steps",
                li {
                    code { "RECALL_API_URL" }
                    " - base URL of the server, e.g. "
                    code { "https://learn.example.com/api/" }
                }
                li {
                    code { "RECALL_API_TOKEN" }
                    " - your access token (optional for open servers)"
                }
            }
            p {
                "Or pass "
                code { "--api" }
                " and "
                code { "--token" }
                " on the command line. To try the app without a server, run with "
                code { "--demo" }
                "."
            }
        }
    }
}
