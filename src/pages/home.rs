use leptos::prelude::*;
use log::warn;

use crate::components::relation_graph::{
	Entity, EntityId, GraphError, Relation, RelationGraphCanvas, RelationId, Snapshot,
};

/// Sample relation map shown until a backend is wired in.
fn sample_entities() -> Vec<Entity> {
	[
		(1, "Alice", "person"),
		(2, "Bob", "person"),
		(3, "Carol", "person"),
		(4, "Dave", "person"),
		(5, "Acme Corp", "organization"),
		(6, "Open Data Guild", "organization"),
	]
	.into_iter()
	.map(|(id, name, kind)| Entity {
		id,
		name: name.into(),
		kind: kind.into(),
		description: None,
	})
	.collect()
}

fn sample_relations() -> Vec<Relation> {
	[
		(1, 1, 2, "friend"),
		(2, 2, 3, "colleague"),
		(3, 1, 3, "sibling"),
		(4, 3, 4, "mentor"),
		(5, 2, 5, "employee"),
		(6, 4, 5, "employee"),
		(7, 1, 6, "member"),
		(8, 5, 6, "sponsor"),
	]
	.into_iter()
	.map(|(id, source_id, target_id, relation_type)| Relation {
		id,
		source_id,
		target_id,
		relation_type: relation_type.into(),
		description: None,
	})
	.collect()
}

/// The visible part of the map: entities matching the type filter and the
/// name query. Relations are passed through untouched; the graph drops the
/// ones whose endpoints were filtered out.
fn visible_snapshot(entities: &[Entity], relations: &[Relation], kind: &str, query: &str) -> Snapshot {
	let query = query.trim().to_lowercase();
	let visible = entities
		.iter()
		.filter(|entity| kind.is_empty() || entity.kind == kind)
		.filter(|entity| query.is_empty() || entity.name.to_lowercase().contains(&query))
		.cloned()
		.collect::<Vec<_>>();
	Snapshot::from_records(&visible, relations)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let entities = StoredValue::new(sample_entities());
	let relations = StoredValue::new(sample_relations());
	let (kind, set_kind) = signal(String::new());
	let (query, set_query) = signal(String::new());
	let (selected, set_selected) = signal(None::<String>);
	let (last_drag, set_last_drag) = signal(None::<String>);

	let graph_data = Signal::derive(move || {
		entities.with_value(|entities| {
			relations.with_value(|relations| {
				visible_snapshot(entities, relations, &kind.get(), &query.get())
			})
		})
	});

	let on_node_selected = move |id: EntityId| {
		let label = entities.with_value(|entities| {
			entities
				.iter()
				.find(|entity| entity.id == id)
				.map(|entity| format!("{} ({})", entity.name, entity.kind))
		});
		set_selected.set(label);
	};
	let on_edge_selected = move |id: RelationId| {
		let label = relations.with_value(|relations| {
			relations
				.iter()
				.find(|relation| relation.id == id)
				.map(|relation| {
					format!(
						"{} -[{}]-> {}",
						relation.source_id, relation.relation_type, relation.target_id
					)
				})
		});
		set_selected.set(label);
	};
	let on_node_drag_end = move |(id, position): (EntityId, glam::DVec2)| {
		set_last_drag.set(Some(format!(
			"entity {id} released at ({:.0}, {:.0})",
			position.x, position.y
		)));
	};
	let on_error = move |err: GraphError| warn!("graph rejected data: {err}");

	view! {
		<div class="fullscreen-graph">
			<RelationGraphCanvas
				data=graph_data
				fullscreen=true
				on_node_selected=on_node_selected
				on_edge_selected=on_edge_selected
				on_node_drag_end=on_node_drag_end
				on_error=on_error
			/>
			<div class="graph-overlay">
				<h1>"Relation Map"</h1>
				<p class="subtitle">
					"Drag nodes to reposition. Scroll to zoom. Drag background to pan. Double-click background to reset."
				</p>
				<div class="filters">
					<select on:change=move |ev| set_kind.set(event_target_value(&ev))>
						<option value="">"All types"</option>
						<option value="person">"People"</option>
						<option value="organization">"Organizations"</option>
					</select>
					<input
						type="search"
						placeholder="Filter by name"
						prop:value=move || query.get()
						on:input=move |ev| set_query.set(event_target_value(&ev))
					/>
				</div>
				<p class="selection">
					{move || selected.get().unwrap_or_else(|| "Click an entity or relation".into())}
				</p>
				<p class="drag">{move || last_drag.get().unwrap_or_default()}</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn type_filter_keeps_matching_entities_only() {
		let snapshot = visible_snapshot(&sample_entities(), &sample_relations(), "organization", "");
		let ids = snapshot.nodes.iter().map(|node| node.id).collect::<Vec<_>>();
		assert_eq!(ids, vec![5, 6]);
		// Relations are not pre-filtered; the graph drops dangling ones.
		assert_eq!(snapshot.edges.len(), sample_relations().len());
	}

	#[test]
	fn name_query_is_case_insensitive() {
		let snapshot = visible_snapshot(&sample_entities(), &sample_relations(), "", "  aLi ");
		assert_eq!(snapshot.nodes.len(), 1);
		assert_eq!(snapshot.nodes[0].name, "Alice");
	}
}
