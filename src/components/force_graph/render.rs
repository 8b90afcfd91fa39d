use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::runtime::SurfaceRuntime;
use super::scale;
use super::state::{ForceGraphState, Tooltip};
use super::types::NodeKind;
use crate::theme::Theme;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

fn kind_color(theme: &Theme, kind: NodeKind) -> &str {
	match kind {
		NodeKind::Document => &theme.primary,
		NodeKind::Topic => &theme.secondary,
		NodeKind::Tag => &theme.accent,
	}
}

/// Paints the surface, or its boot error, or nothing before boot.
pub fn render_surface(runtime: &SurfaceRuntime, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if let Some(state) = runtime.state() {
		render(state, ctx);
	} else if let Some(err) = runtime.error() {
		let canvas = ctx.canvas();
		let (w, h) = canvas
			.map(|c| (c.width() as f64, c.height() as f64))
			.unwrap_or((0.0, 0.0));
		ctx.set_fill_style_str(&theme.background);
		ctx.fill_rect(0.0, 0.0, w, h);
		ctx.set_fill_style_str(&theme.text);
		ctx.set_font("14px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text("Graph unavailable", w / 2.0, h / 2.0 - 10.0);
		ctx.set_fill_style_str(&theme.text_secondary);
		ctx.set_font("12px sans-serif");
		let _ = ctx.fill_text(err, w / 2.0, h / 2.0 + 12.0);
	}
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&state.theme.background);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	if let Some(tooltip) = &state.tooltip {
		draw_tooltip(&state.theme, tooltip, ctx);
	}
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let t = ease_out_cubic(state.focus.level);
	let nodes = state.simulation.nodes();
	ctx.set_stroke_style_str(&state.theme.border);

	for link in state.simulation.links() {
		let (s, d) = (&nodes[link.source], &nodes[link.target]);
		let is_highlighted = state.is_highlighted(link.source) && state.is_highlighted(link.target);

		// t=0: every link at 0.6; t=1: highlighted at 0.9, others at 0.15
		let alpha = if is_highlighted {
			0.6 + 0.3 * t
		} else {
			0.6 - 0.45 * t
		};
		ctx.set_global_alpha(alpha);
		ctx.set_line_width(scale::link_width(link.strength));
		ctx.begin_path();
		ctx.move_to(s.x, s.y);
		ctx.line_to(d.x, d.y);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t) = (
		state.has_active_highlight(),
		ease_out_cubic(state.focus.level),
	);
	let theme = &state.theme;
	ctx.set_font("10px sans-serif");
	ctx.set_text_align("center");

	for sim in state.simulation.nodes() {
		let Some(node) = state.node(sim.index) else {
			continue;
		};
		let radius = scale::node_radius(node.kind);
		let dimmed = has_highlight && !state.is_highlighted(sim.index);
		let hovered = state.is_hovered(sim.index);
		let alpha = if dimmed { 1.0 - 0.7 * t } else { 1.0 };

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(sim.x, sim.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(kind_color(theme, node.kind));
		ctx.fill();
		ctx.set_stroke_style_str(&theme.border);
		ctx.set_line_width(if hovered { 2.0 + t } else { 2.0 });
		ctx.stroke();

		ctx.set_fill_style_str(&theme.text);
		let label = scale::truncate_label(&node.name, state.view.label_max_chars);
		let _ = ctx.fill_text(&label, sim.x, sim.y + scale::label_offset(node.kind));
	}
	ctx.set_global_alpha(1.0);
}

fn draw_tooltip(theme: &Theme, tooltip: &Tooltip, ctx: &CanvasRenderingContext2d) {
	const LINE: f64 = 16.0;
	const PAD: f64 = 10.0;

	ctx.set_text_align("left");
	let width = tooltip
		.lines
		.iter()
		.enumerate()
		.map(|(i, line)| {
			ctx.set_font(if i == 0 {
				"bold 12px sans-serif"
			} else {
				"12px sans-serif"
			});
			ctx.measure_text(line).map(|m| m.width()).unwrap_or(0.0)
		})
		.fold(0.0, f64::max);
	let height = LINE * tooltip.lines.len() as f64;

	ctx.begin_path();
	ctx.rect(tooltip.x, tooltip.y, width + 2.0 * PAD, height + PAD);
	ctx.set_fill_style_str(&theme.surface);
	ctx.fill();
	ctx.set_stroke_style_str(&theme.border);
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_fill_style_str(&theme.text);
	for (i, line) in tooltip.lines.iter().enumerate() {
		ctx.set_font(if i == 0 {
			"bold 12px sans-serif"
		} else {
			"12px sans-serif"
		});
		let _ = ctx.fill_text(line, tooltip.x + PAD, tooltip.y + PAD + LINE * (i as f64 + 0.5));
	}
}
