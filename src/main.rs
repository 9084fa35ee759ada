use leptos::prelude::*;
use spiral_drilldown::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(|| {
		view! { <App /> }
	})
}
