use academy_core::model::{AuthUser, UserId};
use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    // Armed by a view that needed a sign-in to enroll; completing the
    // form finishes that enrollment.
    let pending = use_hook(|| ctx.take_pending_enroll());

    let mut email = use_signal(String::new);
    let mut name = use_signal(String::new);
    let mut error = use_signal(|| None::<&'static str>);

    let ctx_submit = ctx.clone();
    let on_submit = use_callback(move |()| {
        let raw_email = email();
        let raw_name = name();
        let display_name = Some(raw_name.trim().to_owned()).filter(|n| !n.is_empty());
        match AuthUser::new(UserId::for_email(&raw_email), raw_email.trim(), display_name) {
            Ok(user) => {
                let ctx = ctx_submit.clone();
                ctx.session().sign_in(user);
                ctx.catalog().invalidate();
                spawn(async move {
                    if let Some(course_id) = pending {
                        let _ = ctx.catalog().enroll(course_id).await;
                    }
                    let _ = navigator.push(Route::Courses {});
                });
            }
            Err(_) => error.set(Some("Enter a valid email address.")),
        }
    });

    rsx! {
        div { class: "page",
            h2 { "Log In" }

            if pending.is_some() {
                div { class: "banner", "Please log in first!" }
            }

            form {
                class: "login-form",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                div { class: "field",
                    label { "Email" }
                    input {
                        r#type: "email",
                        placeholder: "you@example.com",
                        value: "{email}",
                        oninput: move |evt| email.set(evt.value()),
                    }
                }
                div { class: "field",
                    label { "Display name (optional)" }
                    input {
                        placeholder: "How should we greet you?",
                        value: "{name}",
                        oninput: move |evt| name.set(evt.value()),
                    }
                }
                if let Some(message) = error() {
                    p { class: "field-error", "{message}" }
                }
                button { class: "btn btn-primary", r#type: "submit", "Log In" }
            }
        }
    }
}
