use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use log::error;

use crate::bridge;
use crate::components::force_graph::{ForceGraphCanvas, GraphNode, Topic};
use crate::config::{SupplierConfig, SurfaceConfig};
use crate::host::{
	GraphSource, HostController, HostEvent, HttpGraphSupplier, LoadedGraph, files_route,
	load_graph, load_topics, pump, related_files_route,
};
use crate::theme::{Theme, ThemeMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewMode {
	Graph,
	Topics,
}

#[derive(Clone, Debug)]
struct GraphPageData {
	graph: LoadedGraph,
	topics: Vec<Topic>,
}

/// Knowledge graph page: owns the host controller and one surface at a time.
#[component]
pub fn GraphPage() -> impl IntoView {
	let theme_mode =
		use_context::<RwSignal<ThemeMode>>().unwrap_or_else(|| RwSignal::new(ThemeMode::default()));
	let view_mode = RwSignal::new(ViewMode::Graph);
	let selected = RwSignal::new(None::<GraphNode>);

	let supplier = HttpGraphSupplier::new(SupplierConfig::from_env());
	let data = LocalResource::new(move || {
		let supplier = supplier.clone();
		async move {
			let graph = load_graph(&supplier).await;
			let topics = load_topics(&supplier, &graph.data).await;
			GraphPageData { graph, topics }
		}
	});

	let mut host = HostController::new(theme_mode.get_untracked().theme(), SurfaceConfig::default());
	host.set_listener(move |event| match event {
		HostEvent::Selected(node) => selected.set(node),
	});
	let controller = StoredValue::new_local(Rc::new(RefCell::new(host)));
	on_cleanup(move || {
		controller.try_with_value(|c| c.borrow_mut().teardown());
	});

	let graph_view = move || {
		let theme = theme_mode.get().theme();
		let Some(page) = data.get() else {
			return view! { <Loading theme=theme /> }.into_any();
		};
		let Some(host) = controller.try_get_value() else {
			return ().into_any();
		};

		// a new theme or new data means a new surface with a fresh boot payload
		let boot = {
			let mut host = host.borrow_mut();
			host.set_theme(theme.clone());
			host.prepare(page.graph.data.clone())
				.map(|boot| (boot, host.generation()))
		};
		let surface = match boot {
			Ok((boot, generation)) => {
				let (port, host_port) = bridge::channel();
				spawn_local(pump(host, host_port, generation));
				view! { <ForceGraphCanvas boot=boot port=port /> }.into_any()
			}
			Err(e) => {
				error!("knowledge graph cannot be laid out: {e}");
				view! {
					<div class="graph-error" style=format!("color: {}", theme.text)>
						<h2>"Graph unavailable"</h2>
						<p style=format!("color: {}", theme.text_secondary)>{e.to_string()}</p>
					</div>
				}
				.into_any()
			}
		};
		let is_sample = page.graph.source != GraphSource::Supplied;

		view! {
			<div class="graph-container">
				{surface}
				<Legend theme=theme sample=is_sample />
			</div>
		}
		.into_any()
	};

	let topics_view = move || {
		let theme = theme_mode.get().theme();
		let Some(page) = data.get() else {
			return view! { <Loading theme=theme /> }.into_any();
		};
		view! { <TopicGrid topics=page.topics theme=theme /> }.into_any()
	};

	let node_panel = move || {
		let node = selected.get()?;
		let theme = theme_mode.get().theme();
		let route = related_files_route(&node);
		let dismiss = move |_| {
			if let Some(host) = controller.try_get_value() {
				host.borrow_mut().dismiss();
			}
		};
		Some(view! {
			<div
				class="node-info"
				style=format!("background: {}; color: {}", theme.surface, theme.text)
			>
				<div class="node-info-header">
					<h3>{node.name.clone()}</h3>
					<button class="close" on:click=dismiss>
						"×"
					</button>
				</div>
				<p style=format!("color: {}", theme.text_secondary)>
					"Type: " {node.kind.to_string()}
				</p>
				{node
					.count
					.map(|count| {
						view! {
							<p style=format!("color: {}", theme.text_secondary)>
								"Documents: " {count}
							</p>
						}
					})}
				<div class="view-button" style=format!("background: {}", theme.primary)>
					<A href=route>"View Related Files"</A>
				</div>
			</div>
		})
	};

	view! {
		<div
			class="graph-page"
			style=move || {
				let theme = theme_mode.get().theme();
				format!("background: {}; color: {}", theme.background, theme.text)
			}
		>
			<div class="toggle-container">
				<ModeButton mode=ViewMode::Graph current=view_mode theme_mode=theme_mode label="Graph" />
				<ModeButton mode=ViewMode::Topics current=view_mode theme_mode=theme_mode label="Topics" />
				<button
					class="theme-toggle"
					on:click=move |_| theme_mode.update(|m| *m = m.toggled())
				>
					{move || match theme_mode.get() {
						ThemeMode::Light => "Dark",
						ThemeMode::Dark => "Light",
					}}
				</button>
			</div>
			<Show when=move || view_mode.get() == ViewMode::Graph fallback=topics_view>
				{graph_view}
				{node_panel}
			</Show>
		</div>
	}
}

#[component]
fn ModeButton(
	mode: ViewMode,
	current: RwSignal<ViewMode>,
	theme_mode: RwSignal<ThemeMode>,
	label: &'static str,
) -> impl IntoView {
	let style = move || {
		let theme = theme_mode.get().theme();
		if current.get() == mode {
			format!("background: {}; color: #fff; border-color: {}", theme.primary, theme.border)
		} else {
			format!("color: {}; border-color: {}", theme.text_secondary, theme.border)
		}
	};
	view! {
		<button class="toggle-button" style=style on:click=move |_| current.set(mode)>
			{label}
		</button>
	}
}

#[component]
fn Loading(theme: Theme) -> impl IntoView {
	view! {
		<div class="loading" style=format!("color: {}", theme.text_secondary)>
			"Loading knowledge graph..."
		</div>
	}
}

#[component]
fn Legend(theme: Theme, sample: bool) -> impl IntoView {
	let entries = [
		("Document", theme.primary.clone()),
		("Topic", theme.secondary.clone()),
		("Tag", theme.accent.clone()),
	];
	view! {
		<div class="legend" style=format!("background: {}", theme.surface)>
			{entries
				.into_iter()
				.map(|(label, color)| {
					view! {
						<div class="legend-item">
							<span class="legend-dot" style=format!("background: {color}")></span>
							<span style=format!("color: {}", theme.text_secondary)>{label}</span>
						</div>
					}
				})
				.collect_view()}
			{sample
				.then(|| {
					view! {
						<div class="legend-note" style=format!("color: {}", theme.text_secondary)>
							"Sample graph"
						</div>
					}
				})}
		</div>
	}
}

#[component]
fn TopicGrid(topics: Vec<Topic>, theme: Theme) -> impl IntoView {
	view! {
		<div class="topics-grid">
			{topics
				.into_iter()
				.map(|topic| {
					let route = files_route(&topic.name);
					let count = document_count_label(&topic);
					let name_style = format!("color: {}", theme.text);
					let count_style = format!("color: {}", theme.text_secondary);
					view! {
						<div class="topic-card" style=format!("background: {}", theme.surface)>
							<A href=route>
								<span class="topic-name" style=name_style.clone()>
									{topic.name.clone()}
								</span>
								<span class="topic-count" style=count_style.clone()>
									{count.clone()}
								</span>
							</A>
						</div>
					}
				})
				.collect_view()}
		</div>
	}
}

fn document_count_label(topic: &Topic) -> String {
	match topic.count.unwrap_or(0) {
		1 => "1 document".to_string(),
		n => format!("{n} documents"),
	}
}
