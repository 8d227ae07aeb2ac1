//! Shared test setup: tracing subscriber and sample forests

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::NodeDescription;

static TEST_SETUP: Once = Once::new();

/// Install the test logging subscriber once per process.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at trace level.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = env::var("RUST_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("treehouse=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Two top-level trees covering ids of both kinds, an id-less heading and
/// an explicitly collapsed branch:
///
/// ```text
/// fruit            (text id)
/// ├── apple        (checked)
/// └── citrus       (collapsed)
///     ├── 1 lemon  (numeric id)
///     └── 2 lime
/// Heading          (no id)
/// └── tools
/// ```
pub fn sample_forest() -> Vec<NodeDescription> {
    vec![
        NodeDescription::new("Fruit").with_id("fruit").with_nodes(vec![
            NodeDescription::new("Apple").with_id("apple").with_checked(true),
            NodeDescription::new("Citrus")
                .with_id("citrus")
                .with_expanded(false)
                .with_nodes(vec![
                    NodeDescription::new("Lemon").with_id(1i64),
                    NodeDescription::new("Lime").with_id(2i64),
                ]),
        ]),
        NodeDescription::new("Heading")
            .with_nodes(vec![NodeDescription::new("Tools").with_id("tools")]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_sample_forest_when_counting_then_has_seven_nodes() {
        fn count(nodes: &[NodeDescription]) -> usize {
            nodes.iter().map(|n| 1 + count(n.children())).sum()
        }
        assert_eq!(count(&sample_forest()), 7);
    }
}
