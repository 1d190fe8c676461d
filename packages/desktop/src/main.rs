use std::path::{Path, PathBuf};

use api::{AppConfig, FederatedProvider, Services};
use backend::MemoryBackend;
use dioxus::prelude::*;
use tracing_subscriber::EnvFilter;

/// Overrides the path of the configuration file.
const CONFIG_ENV: &str = "SOCIAL_FEED_CONFIG";

fn main() {
    dotenvy::dotenv().ok();

    // Dioxus may have installed its own logger already.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    dioxus::launch(App);
}

fn load_config() -> AppConfig {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(AppConfig::filename()));
    load_config_at(&path)
}

/// Config at `path`; an unreadable or malformed file is logged and replaced by defaults.
fn load_config_at(path: &Path) -> AppConfig {
    match AppConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to load config, using defaults");
            AppConfig::default()
        }
    }
}

/// Give the emulator a Google account so the popup sign-in has someone to return.
fn seed_demo_accounts(backend: &MemoryBackend) {
    let user = backend.register_federated_account(
        FederatedProvider::Google,
        "demo@example.com",
        "Demo User",
        "https://www.gravatar.com/avatar/?d=identicon",
    );
    tracing::info!(uid = %user.uid, "seeded demo Google account");
}

#[component]
fn App() -> Element {
    use_context_provider(|| {
        let config = load_config();
        let (services, backend) = Services::in_memory(&config);
        seed_demo_accounts(&backend);
        services
    });

    rsx! {
        document::Link { rel: "stylesheet", href: ui::MAIN_CSS }
        ui::NoticeProvider {
            ui::SessionProvider {
                ui::ViewRouter {}
            }
        }
    }
}
