use dioxus::prelude::*;

use crate::vm::CourseCardVm;

#[component]
pub fn CourseCard(
    card: CourseCardVm,
    on_enroll: EventHandler<CourseCardVm>,
    on_watch: EventHandler<CourseCardVm>,
) -> Element {
    let enroll_card = card.clone();
    let watch_card = card.clone();

    rsx! {
        div { class: "course-card",
            if let Some(thumb) = card.thumbnail.clone() {
                img { class: "course-thumb", src: "{thumb}", alt: "{card.title}" }
            } else {
                div { class: "course-thumb placeholder", "No preview" }
            }
            div { class: "course-body",
                span {
                    class: "chip",
                    class: if card.enrolled { "enrolled" },
                    if card.enrolled { "Enrolled" } else { "Available" }
                }
                h3 { "{card.title}" }
                span { class: "course-instructor", "{card.instructor}" }
                p { class: "course-desc", "{card.description}" }
                span { class: "stars", "{card.stars} {card.rating_label}" }
                div { class: "course-actions",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| on_watch.call(watch_card.clone()),
                        "Watch"
                    }
                    button {
                        class: "btn",
                        disabled: card.enrolled,
                        onclick: move |_| on_enroll.call(enroll_card.clone()),
                        if card.enrolled { "Enrolled" } else { "Enroll" }
                    }
                }
            }
        }
    }
}
