use std::collections::HashSet;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use services::CatalogError;

use crate::context::{AppContext, PlayerLaunch};
use crate::routes::Route;
use crate::views::course_card::CourseCard;
use crate::views::{ViewError, ViewState, enrolled_ids_or_empty, use_current_user, view_state_from_resource};
use crate::vm::{CourseCardVm, map_course_cards};

#[derive(Clone, Debug, PartialEq)]
struct HomeData {
    cards: Vec<CourseCardVm>,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let user = use_current_user();

    let catalog = ctx.catalog();
    let mut resource = use_resource(move || {
        let catalog = catalog.clone();
        let signed_in = user.read().is_some();
        async move {
            let enrolled = if signed_in {
                enrolled_ids_or_empty(&catalog).await?
            } else {
                HashSet::new()
            };
            let courses = catalog.featured_courses().await.map_err(ViewError::from)?;
            Ok(HomeData {
                cards: map_course_cards(&courses, &enrolled),
            })
        }
    });

    let state = view_state_from_resource(resource);

    let ctx_enroll = ctx.clone();
    let on_enroll = use_callback(move |card: CourseCardVm| {
        let ctx = ctx_enroll.clone();
        spawn(async move {
            match ctx.catalog().enroll(card.course_id).await {
                Ok(_) => resource.restart(),
                Err(CatalogError::AuthRequired) => {
                    ctx.defer_enroll(card.course_id);
                    let _ = navigator.push(Route::Login {});
                }
                Err(_) => {}
            }
        });
    });

    let ctx_watch = ctx.clone();
    let on_watch = use_callback(move |card: CourseCardVm| {
        let ctx = ctx_watch.clone();
        spawn(async move {
            let saved = ctx
                .catalog()
                .saved_progress(card.course_id)
                .await
                .unwrap_or_default();
            ctx.launch_player(PlayerLaunch {
                course_id: Some(card.course_id),
                title: card.title,
                video_url: card.video_url,
                saved_progress: saved,
            });
            let _ = navigator.push(Route::Player {});
        });
    });

    rsx! {
        div { class: "page",
            div { class: "hero",
                h2 { "Learn anything, keep your place." }
                p { "Pick a course, press play, and your progress follows you." }
                Link { class: "btn btn-primary", to: Route::Courses {}, "Browse all courses" }
            }

            h2 { "Featured Courses" }

            match state {
                ViewState::Idle => rsx! {
                    p { class: "loading", "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { class: "loading", "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    if data.cards.is_empty() {
                        div { class: "empty", "No courses published yet." }
                    } else {
                        div { class: "course-grid",
                            for card in data.cards {
                                CourseCard { card, on_enroll, on_watch }
                            }
                        }
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
