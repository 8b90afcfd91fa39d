use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::runtime::SurfaceRuntime;
use super::state::ForceGraphState;
use crate::bridge::{BootPayload, SurfacePort};
use crate::theme::Theme;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Everything the canvas must release when it unmounts.
struct SurfaceHandles {
	runtime: Rc<RefCell<SurfaceRuntime>>,
	animate: FrameCallback,
	resize_cb: FrameCallback,
	frame_id: Rc<Cell<Option<i32>>>,
}

impl SurfaceHandles {
	fn teardown(&self) {
		self.runtime.borrow_mut().dispose();
		if let Some(window) = web_sys::window() {
			if let Some(id) = self.frame_id.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = self.resize_cb.borrow_mut().take() {
				let _ =
					window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		self.animate.borrow_mut().take();
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Sandboxed render surface. It only ever sees the boot text and the
/// surface end of the bridge.
#[component]
pub fn ForceGraphCanvas(
	boot: String,
	port: SurfacePort,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let handles = SurfaceHandles {
		runtime: Rc::new(RefCell::new(SurfaceRuntime::new(port))),
		animate: Rc::new(RefCell::new(None)),
		resize_cb: Rc::new(RefCell::new(None)),
		frame_id: Rc::new(Cell::new(None)),
	};
	let runtime = handles.runtime.clone();
	let (animate_init, resize_cb_init, frame_id_init) = (
		handles.animate.clone(),
		handles.resize_cb.clone(),
		handles.frame_id.clone(),
	);
	let handles = StoredValue::new_local(handles);
	on_cleanup(move || {
		handles.try_with_value(SurfaceHandles::teardown);
	});

	let runtime_init = runtime.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					parent
						.as_ref()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("canvas 2d context unavailable, surface stays idle");
				return;
			}
		};

		let mut theme = Theme::default();
		match BootPayload::decode(&boot) {
			Ok(payload) => {
				theme = payload.theme.clone();
				match ForceGraphState::boot(payload, w, h) {
					Ok(state) => runtime_init.borrow_mut().start(state),
					Err(e) => {
						error!("graph layout failed to start: {e}");
						runtime_init.borrow_mut().fail(e.to_string());
					}
				}
			}
			Err(e) => {
				error!("rejected boot payload: {e}");
				runtime_init.borrow_mut().fail(e.to_string());
			}
		}

		if fullscreen {
			let (runtime_resize, canvas_resize) = (runtime_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				runtime_resize.borrow_mut().resize(nw, nh);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (runtime_anim, animate_inner, frame_id_inner) =
			(runtime_init.clone(), animate_init.clone(), frame_id_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			frame_id_inner.set(None);
			let alive = {
				let mut rt = runtime_anim.borrow_mut();
				let alive = rt.frame(0.016);
				if alive {
					render::render_surface(&rt, &ctx, &theme);
				}
				alive
			};
			if !alive {
				return;
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				match web_sys::window()
					.map(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()))
				{
					Some(Ok(id)) => frame_id_inner.set(Some(id)),
					_ => warn!("could not schedule next animation frame"),
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
				frame_id_init.set(Some(id));
			}
		}
	});

	let runtime_md = runtime.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			runtime_md.borrow_mut().pointer_down(x, y);
		}
	};

	let runtime_mm = runtime.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			runtime_mm.borrow_mut().pointer_move(x, y);
		}
	};

	let runtime_mu = runtime.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			runtime_mu.borrow_mut().pointer_up(x, y);
		}
	};

	let runtime_ml = runtime.clone();
	let on_mouseleave = move |_: MouseEvent| {
		runtime_ml.borrow_mut().pointer_leave();
	};

	let runtime_wh = runtime;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			runtime_wh.borrow_mut().wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
