//! Leptos client-side app: a knowledge graph view whose force-directed
//! surface talks to the host only through a text message bridge.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod bridge;
pub mod components;
pub mod config;
pub mod error;
pub mod host;
mod pages;
pub mod theme;

// Top-Level pages
use crate::pages::files::RelatedFiles;
use crate::pages::graph::GraphPage;
use crate::pages::not_found::NotFound;
use crate::theme::ThemeMode;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the graph view and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let theme_mode = RwSignal::new(ThemeMode::default());
	provide_context(theme_mode);

	view! {
		<Html
			attr:lang="en"
			attr:dir="ltr"
			attr:data-theme=move || match theme_mode.get() {
				ThemeMode::Light => "light",
				ThemeMode::Dark => "dark",
			}
		/>

		// sets the document title
		<Title text="Knowledge Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=GraphPage />
				<Route path=path!("/files") view=RelatedFiles />
			</Routes>
		</Router>
	}
}
