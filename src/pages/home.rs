use leptos::prelude::*;

use crate::components::drill_down::{DrillDownCanvas, Element, ElementGraph, ElementId, Genre, TIMELINE};

/// Sample fleet: one time-series root, flow groups below it, flows with
/// statistics and markers below those. Everything but the root starts hidden.
fn generate_sample_scene(groups: usize) -> ElementGraph {
	let mut graph = ElementGraph::new();
	let root = graph.insert(
		Element::new(1, "Argosy fleet", Genre::Container)
			.with_alias("Argosy")
			.with_data("240")
			.with_companion(TIMELINE),
	);

	for g in 0..groups {
		let group = graph.insert(
			Element::new(next_id(&graph), format!("Group {g}"), Genre::Container)
				.with_alias("DataFlowGroup")
				.hidden(),
		);
		link(&mut graph, root, group);

		let flows = 2 + (rand_simple(g) * 4.0) as usize;
		for f in 0..flows {
			let flow = graph.insert(
				Element::new(next_id(&graph), format!("Flow {g}.{f}"), Genre::Container)
					.with_alias("DataFlow")
					.hidden(),
			);
			link(&mut graph, group, flow);

			for (label, genre, alias) in [
				("latency", Genre::DataFlowStatistic, "DataFlowStatistic"),
				("throughput", Genre::DataFlowStatistic, "DataFlowStatistic"),
				("marker", Genre::Solid, "DataFlow"),
			] {
				let child = graph.insert(
					Element::new(next_id(&graph), format!("{label} {g}.{f}"), genre)
						.with_alias(alias)
						.hidden(),
				);
				link(&mut graph, flow, child);
			}
		}
	}
	graph
}

fn next_id(graph: &ElementGraph) -> i64 {
	graph.len() as i64 + 1
}

fn link(graph: &mut ElementGraph, parent: ElementId, child: ElementId) {
	if let Err(err) = graph.link(parent, child) {
		log::error!("Sample scene: {err}");
	}
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let scene = Signal::derive(move || generate_sample_scene(8));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<DrillDownCanvas data=scene fullscreen=true />
				<div class="graph-overlay">
					<h1>"Spiral Drill-Down"</h1>
					<p class="subtitle">"Click a node to drill into it. Click its parent to go back. Scroll to zoom. Drag background to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
