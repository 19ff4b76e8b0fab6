use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::AppContext;
use crate::views::{
    CoursesView, DashboardView, HomeView, LoginView, PlayerView, use_current_user,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/courses", CoursesView)] Courses {},
        #[route("/dashboard", DashboardView)] Dashboard {},
        #[route("/player", PlayerView)] Player {},
        #[route("/login", LoginView)] Login {},
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
    let ctx = use_context::<AppContext>();
    let user = use_current_user();

    let current = user.read().clone();

    rsx! {
        nav { class: "sidebar",
            h1 { "Loop Academy" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: Route::Courses {}, "Courses" } }
                li { Link { to: Route::Dashboard {}, "Dashboard" } }
            }
            div { class: "sidebar-auth",
                match current {
                    Some(user) => rsx! {
                        span { class: "who", "Hi, {user.display_name()}" }
                        button {
                            class: "btn",
                            onclick: move |_| {
                                ctx.session().sign_out();
                                ctx.catalog().invalidate();
                            },
                            "Log Out"
                        }
                    },
                    None => rsx! {
                        Link { class: "btn btn-primary", to: Route::Login {}, "Log In" }
                    },
                }
            }
        }
    }
}
