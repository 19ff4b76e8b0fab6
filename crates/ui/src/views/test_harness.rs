use std::sync::Arc;

use academy_core::time::fixed_clock;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::AppServices;
use storage::repository::Storage;

use crate::context::{PlayerLaunch, UiApp, build_app_context};
use crate::views::{CoursesView, DashboardView, HomeView, LoginView, PlayerView};

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Courses,
    Dashboard,
    Player,
    Login,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    launch: Option<PlayerLaunch>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    let ctx = use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    // Arm the one-shot launch slot before the routed view takes it.
    use_hook(|| {
        if let Some(launch) = props.launch.clone() {
            ctx.launch_player(launch);
        }
    });
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Courses => rsx! { CoursesView {} },
        ViewKind::Dashboard => rsx! { DashboardView {} },
        ViewKind::Player => rsx! { PlayerView {} },
        ViewKind::Login => rsx! { LoginView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub services: AppServices,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_storage(view, Storage::in_memory())
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: Storage) -> ViewHarness {
    setup_player_harness(view, storage, None)
}

pub fn setup_player_harness(
    view: ViewKind,
    storage: Storage,
    launch: Option<PlayerLaunch>,
) -> ViewHarness {
    let services = AppServices::from_storage(&storage, fixed_clock());
    let app = Arc::new(TestApp {
        services: services.clone(),
    });

    let dom =
        VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view, launch });

    ViewHarness {
        dom,
        storage,
        services,
    }
}
