use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;

/// Landing point for the "view related files" hand-off. File browsing itself
/// lives outside this app; this page only shows the scope it was given.
#[component]
pub fn RelatedFiles() -> impl IntoView {
	let query = use_query_map();
	let scope = move || {
		query
			.with(|q| q.get("scope"))
			.unwrap_or_else(|| "all files".to_string())
	};

	view! {
		<div class="related-files">
			<h1>"Related files"</h1>
			<p class="subtitle">"Scope: " {scope}</p>
			<A href="/">"Back to graph"</A>
		</div>
	}
}
