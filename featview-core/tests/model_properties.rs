use featview_core::{Trace, TraceModel, TraceOptions};
use proptest::prelude::*;

fn arb_options() -> impl Strategy<Value = Option<TraceOptions>> {
    prop::option::of(
        (prop::option::of(-50.0f64..80.0), prop::option::of(-50.0f64..80.0)).prop_map(
            |(line_height, content_size)| TraceOptions {
                line_height,
                content_size,
                ..Default::default()
            },
        ),
    )
}

fn arb_node() -> impl Strategy<Value = Trace> {
    ("[a-z]{1,6}", arb_options()).prop_map(|(label, options)| {
        let mut trace = Trace::new(label);
        trace.options = options;
        trace
    })
}

fn arb_tree() -> impl Strategy<Value = Trace> {
    arb_node().prop_recursive(3, 32, 4, |inner| {
        (arb_node(), prop::collection::vec(inner, 0..4))
            .prop_map(|(node, nested)| node.with_nested(nested))
    })
}

fn arb_forest() -> impl Strategy<Value = Vec<Trace>> {
    prop::collection::vec(arb_tree(), 1..4)
}

fn preorder_labels(traces: &[Trace], out: &mut Vec<String>) {
    for trace in traces {
        out.push(trace.label.clone());
        preorder_labels(&trace.nested, out);
    }
}

fn show_flags(model: &TraceModel) -> Vec<(bool, bool)> {
    model.iter().map(|t| (t.show, t.expanded)).collect()
}

proptest! {
    #[test]
    fn ids_are_unique_and_round_trip(forest in arb_forest()) {
        let mut labels = Vec::new();
        preorder_labels(&forest, &mut labels);
        let model = TraceModel::from_traces(forest);

        prop_assert_eq!(model.len(), labels.len());
        for (i, label) in labels.iter().enumerate() {
            let trace = model.get_trace(i as u32).expect("every pre-order id resolves");
            prop_assert_eq!(trace.id, i as u32);
            prop_assert_eq!(&trace.label, label);
        }
        prop_assert!(model.get_trace(labels.len() as u32).is_err());
    }

    #[test]
    fn content_size_never_exceeds_line_height(forest in arb_forest()) {
        let model = TraceModel::from_traces(forest);
        for trace in model.iter() {
            let options = match &trace.options {
                Some(o) => o,
                None => continue,
            };
            if let Some(lh) = options.line_height {
                prop_assert!(lh >= 0.0);
            }
            if let Some(cs) = options.content_size {
                prop_assert!(cs >= 0.0);
            }
            if let (Some(cs), Some(lh)) = (options.content_size, options.line_height) {
                prop_assert!(cs <= lh);
            }
        }
    }

    #[test]
    fn expand_then_collapse_restores_visibility(
        forest in arb_forest(),
        toggles in prop::collection::vec(0usize..64, 0..12),
        pick in 0usize..64,
    ) {
        let mut model = TraceModel::from_traces(forest);
        let n = model.len();
        for t in toggles {
            model.toggle_expansion((t % n) as u32).expect("id in range");
        }

        let candidates: Vec<u32> = model
            .iter()
            .filter(|t| t.show && !t.expanded)
            .map(|t| t.id)
            .collect();
        prop_assume!(!candidates.is_empty());
        let id = candidates[pick % candidates.len()];

        let before = show_flags(&model);
        let visible_before = model.visible_traces();
        prop_assert!(model.toggle_expansion(id).expect("visible trace"));
        prop_assert!(!model.toggle_expansion(id).expect("visible trace"));
        prop_assert_eq!(show_flags(&model), before);
        prop_assert_eq!(model.visible_traces(), visible_before);
    }

    #[test]
    fn visible_set_matches_show_flags(
        forest in arb_forest(),
        toggles in prop::collection::vec(0usize..64, 0..16),
    ) {
        let mut model = TraceModel::from_traces(forest);
        let n = model.len();
        for t in toggles {
            model.toggle_expansion((t % n) as u32).expect("id in range");
        }
        let from_flags: Vec<u32> = model.iter().filter(|t| t.show).map(|t| t.id).collect();
        prop_assert_eq!(model.visible_traces(), from_flags);
    }
}

#[test]
fn negative_line_height_defaults_to_32() {
    let trace = Trace::new("a").with_options(TraceOptions {
        line_height: Some(-5.0),
        ..Default::default()
    });
    let model = TraceModel::from_traces(vec![trace]);
    assert_eq!(model.get_trace(0).unwrap().line_height(), Some(32.0));
}
