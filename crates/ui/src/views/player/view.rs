use std::sync::Arc;
use std::time::Duration;

use academy_core::model::{PlaybackRate, Progress};
use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::Link;
use services::{MediaTransport, PlaybackController, SYNC_INTERVAL};

use super::scripts;
use crate::context::{AppContext, PlayerLaunch};
use crate::routes::Route;
use crate::vm::{snapshot_events, time_display};

/// How often the monitor polls the media element.
const SAMPLE_PERIOD: Duration = Duration::from_millis(500);

/// Drives the `<video>` element through one-way eval scripts.
struct EvalTransport;

impl MediaTransport for EvalTransport {
    fn load(&self, url: &str) {
        let _ = eval(&scripts::load_script(url));
    }

    fn play(&self) {
        let _ = eval(&scripts::play_script());
    }

    fn pause(&self) {
        let _ = eval(&scripts::pause_script());
    }

    fn seek(&self, seconds: f64) {
        let _ = eval(&scripts::seek_script(seconds));
    }

    fn set_volume(&self, volume: f64) {
        let _ = eval(&scripts::volume_script(volume));
    }

    fn set_muted(&self, muted: bool) {
        let _ = eval(&scripts::muted_script(muted));
    }

    fn set_rate(&self, rate: f64) {
        let _ = eval(&scripts::rate_script(rate));
    }
}

#[component]
pub fn PlayerView() -> Element {
    let ctx = use_context::<AppContext>();

    // The launch context is taken once; revisiting the route without a
    // fresh launch lands on the fallback.
    let launch = use_hook(|| ctx.take_player_launch());

    match launch {
        Some(launch) => rsx! {
            ActivePlayer { launch }
        },
        None => rsx! {
            div { class: "page",
                h2 { "Player" }
                div { class: "empty",
                    p { "No video selected." }
                    Link { class: "btn btn-primary", to: Route::Dashboard {}, "Back to dashboard" }
                }
            }
        },
    }
}

#[component]
fn ActivePlayer(launch: PlayerLaunch) -> Element {
    let ctx = use_context::<AppContext>();

    let mut controller = use_signal(|| PlaybackController::new(Arc::new(EvalTransport)));
    let mut session = use_signal(|| ctx.services().begin_playback(launch.course_id));

    // One monitor task per mount: load the source, then poll the element,
    // feed events to the controller and keep the shared playhead fresh.
    // Resume and progress sync both wait for the first valid duration.
    use_hook({
        let launch = launch.clone();
        let services = ctx.services();
        move || {
            spawn(async move {
                controller.write().load(&launch.video_url);
                let mut resumed = false;
                loop {
                    tokio::time::sleep(SAMPLE_PERIOD).await;
                    let Some(snapshot) = scripts::read_media_snapshot().await else {
                        continue;
                    };
                    let had_metadata = controller.read().duration_secs().is_some();
                    for event in snapshot_events(&snapshot, had_metadata) {
                        controller.write().on_media_event(event);
                    }
                    {
                        let c = controller.read();
                        session
                            .read()
                            .playhead()
                            .update(c.position_secs(), c.duration_secs());
                    }
                    if !resumed && controller.read().duration_secs().is_some() {
                        resumed = true;
                        controller
                            .write()
                            .resume_from(launch.saved_progress.unwrap_or(Progress::ZERO));
                        services.start_progress_sync(
                            &mut session.write(),
                            launch.saved_progress,
                            SYNC_INTERVAL,
                        );
                    }
                }
            });
        }
    });

    let (playing, buffering, muted, rate, position, duration, fraction, volume_value) = {
        let c = controller.read();
        (
            c.is_playing(),
            c.is_buffering(),
            c.is_muted(),
            c.rate(),
            c.position_secs(),
            c.duration_secs(),
            c.progress_fraction(),
            c.volume().value(),
        )
    };
    let time_label = time_display(position, duration);
    let seek_value = fraction * 100.0;
    let volume_percent = volume_value * 100.0;

    rsx! {
        div { class: "page",
            h2 { "{launch.title}" }

            div { class: "player-stage",
                video {
                    id: scripts::MEDIA_ELEMENT_ID,
                    class: "player-video",
                    preload: "auto",
                }
                if buffering {
                    div { class: "player-buffering", "Buffering..." }
                }
            }

            div { class: "player-controls",
                div { class: "control-row",
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| controller.write().toggle_play(),
                        if playing { "Pause" } else { "Play" }
                    }
                    input {
                        class: "seek",
                        r#type: "range",
                        min: "0",
                        max: "100",
                        step: "0.1",
                        value: "{seek_value}",
                        oninput: move |evt| {
                            if let Ok(value) = evt.value().parse::<f64>() {
                                controller.write().seek_to_fraction(value / 100.0);
                            }
                        },
                    }
                    span { class: "time-label", "{time_label}" }
                }
                div { class: "control-row",
                    button {
                        class: "btn",
                        onclick: move |_| controller.write().toggle_mute(),
                        if muted { "Unmute" } else { "Mute" }
                    }
                    input {
                        class: "volume",
                        r#type: "range",
                        min: "0",
                        max: "100",
                        step: "1",
                        value: "{volume_percent}",
                        oninput: move |evt| {
                            if let Ok(value) = evt.value().parse::<f64>() {
                                controller.write().set_volume(value / 100.0);
                            }
                        },
                    }
                    div { class: "rate-menu",
                        for option in PlaybackRate::ALL {
                            button {
                                class: "rate-chip",
                                class: if option == rate { "active" },
                                onclick: move |_| {
                                    let _ = controller.write().set_rate_value(option.as_f64());
                                },
                                "{option}"
                            }
                        }
                    }
                    button {
                        class: "btn",
                        onclick: move |_| {
                            let _ = eval(&scripts::fullscreen_script());
                        },
                        "Fullscreen"
                    }
                }
            }
        }
    }
}
