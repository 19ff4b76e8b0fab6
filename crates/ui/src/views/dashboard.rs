use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::{AppContext, PlayerLaunch};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, use_current_user, view_state_from_resource};
use crate::vm::{DashboardRowVm, DashboardVm, map_dashboard};

#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let user = use_current_user();

    let catalog = ctx.catalog();
    let mut resource = use_resource(move || {
        let catalog = catalog.clone();
        let signed_in = user.read().is_some();
        async move {
            if !signed_in {
                return Err(ViewError::NotSignedIn);
            }
            let snapshot = catalog.dashboard().await.map_err(ViewError::from)?;
            Ok(map_dashboard(&snapshot))
        }
    });

    let state = view_state_from_resource(resource);

    let ctx_watch = ctx.clone();
    let on_watch = use_callback(move |row: DashboardRowVm| {
        ctx_watch.launch_player(PlayerLaunch {
            course_id: Some(row.course_id),
            title: row.title,
            video_url: row.video_url,
            saved_progress: Some(row.progress),
        });
        let _ = navigator.push(Route::Player {});
    });

    rsx! {
        div { class: "page",
            h2 { "My Dashboard" }

            match state {
                ViewState::Idle => rsx! {
                    p { class: "loading", "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    DashboardStats { vm: vm.clone() }
                    if vm.rows.is_empty() {
                        div { class: "empty",
                            p { "You're not enrolled in any courses yet." }
                            Link { class: "btn btn-primary", to: Route::Courses {}, "Find one to start" }
                        }
                    } else {
                        div { class: "progress-list",
                            for row in vm.rows {
                                ProgressCard { row, on_watch }
                            }
                        }
                    }
                },
                ViewState::Error(ViewError::NotSignedIn) => rsx! {
                    div { class: "empty",
                        p { "Please log in first!" }
                        Link { class: "btn btn-primary", to: Route::Login {}, "Log In" }
                    }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "banner error", "{err.message()}" }
                    button { class: "btn", onclick: move |_| resource.restart(), "Retry" }
                },
            }
        }
    }
}

#[component]
fn DashboardStats(vm: DashboardVm) -> Element {
    rsx! {
        div { class: "dashboard-stats",
            div { class: "stat-card",
                div { class: "stat-value", "{vm.enrolled_label}" }
                div { class: "stat-label", "Total Enrolled" }
            }
            div { class: "stat-card",
                div { class: "stat-value", "{vm.average_label}" }
                div { class: "stat-label", "Avg Progress" }
            }
            div { class: "stat-card",
                div { class: "stat-value", "{vm.completed_label}" }
                div { class: "stat-label", "Completed" }
            }
        }
    }
}

#[component]
fn ProgressCard(row: DashboardRowVm, on_watch: EventHandler<DashboardRowVm>) -> Element {
    let watch_row = row.clone();

    rsx! {
        div { class: "progress-card",
            if let Some(thumb) = row.thumbnail.clone() {
                img { class: "course-thumb", src: "{thumb}", alt: "{row.title}" }
            } else {
                div { class: "course-thumb placeholder", "No preview" }
            }
            div { class: "progress-main",
                h3 { "{row.title}" }
                div { class: "progress-track",
                    div { class: "progress-fill", style: "width: {row.percent_label}" }
                }
                div { class: "progress-meta",
                    span { "{row.percent_label}" }
                    if row.completed {
                        span { class: "completed-tag", "Completed" }
                    }
                }
            }
            button {
                class: "btn btn-primary",
                onclick: move |_| on_watch.call(watch_row.clone()),
                "{row.action_label}"
            }
        }
    }
}
