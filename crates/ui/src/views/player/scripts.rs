use dioxus::document::eval;

use crate::vm::MediaSnapshot;

/// DOM id of the `<video>` element the scripts address.
pub(super) const MEDIA_ELEMENT_ID: &str = "player-media";

const SNAPSHOT_SCRIPT_TEMPLATE: &str = r#"
    const v = document.getElementById("{element_id}");
    if (!v) { return null; }
    return {
        position: Number.isFinite(v.currentTime) ? v.currentTime : 0,
        duration: Number.isFinite(v.duration) ? v.duration : 0,
        paused: v.paused,
        ended: v.ended,
        waiting: v.readyState < 3
    };
"#;

/// Polls the media element. `None` while the element is not mounted.
pub(super) async fn read_media_snapshot() -> Option<MediaSnapshot> {
    let script = SNAPSHOT_SCRIPT_TEMPLATE.replace("{element_id}", MEDIA_ELEMENT_ID);
    eval(&script)
        .join::<Option<MediaSnapshot>>()
        .await
        .ok()
        .flatten()
}

fn element_script(body: &str) -> String {
    format!(
        r#"
        const v = document.getElementById("{MEDIA_ELEMENT_ID}");
        if (!v) {{ return; }}
        {body}
        "#
    )
}

pub(super) fn load_script(url: &str) -> String {
    let url_literal = js_string_literal(url);
    element_script(&format!("v.src = {url_literal};\n        v.load();"))
}

pub(super) fn play_script() -> String {
    element_script("const p = v.play(); if (p && p.catch) { p.catch(() => {}); }")
}

pub(super) fn pause_script() -> String {
    element_script("v.pause();")
}

pub(super) fn seek_script(seconds: f64) -> String {
    element_script(&format!("v.currentTime = {seconds};"))
}

pub(super) fn volume_script(volume: f64) -> String {
    element_script(&format!("v.volume = {volume};"))
}

pub(super) fn muted_script(muted: bool) -> String {
    element_script(&format!("v.muted = {muted};"))
}

pub(super) fn rate_script(rate: f64) -> String {
    element_script(&format!("v.playbackRate = {rate};"))
}

pub(super) fn fullscreen_script() -> String {
    element_script(
        "if (v.requestFullscreen) { const p = v.requestFullscreen(); if (p && p.catch) { p.catch(() => {}); } }",
    )
}

fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
