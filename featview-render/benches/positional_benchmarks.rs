use criterion::{black_box, criterion_group, criterion_main, Criterion};
use featview_core::feature::{Continuous, Dssp, Locus};
use featview_core::{DsspCode, Feature, FeatureStyle, PartialSettings, Sequence, Trace};
use featview_render::Viewer;

fn generate_sequence(length: usize) -> String {
    let pattern = "MKTAYIAKQR";
    pattern.chars().cycle().take(length).collect()
}

fn generate_traces(length: usize) -> Vec<Trace> {
    let loci: Vec<Feature> = (0..length as i64 / 10)
        .map(|i| {
            Feature::Locus(Locus {
                start: i * 10 + 1,
                end: i * 10 + 6,
                height: None,
                style: FeatureStyle::default(),
            })
        })
        .collect();

    let codes = [DsspCode::AlphaHelix, DsspCode::Coil, DsspCode::Strand, DsspCode::Turn];
    let structure: Vec<Feature> = (0..length as i64 / 20)
        .map(|i| {
            Feature::Dssp(Dssp {
                start: i * 20 + 1,
                end: i * 20 + 20,
                code: codes[i as usize % codes.len()],
                style: FeatureStyle::default(),
            })
        })
        .collect();

    let curve = Feature::Continuous(Continuous {
        values: (0..length).map(|i| (i as f64 / 7.0).sin()).collect(),
        min: None,
        max: None,
        curve_type: None,
        show_area: true,
        style: FeatureStyle::default(),
    });

    vec![
        Trace::new("domains").with_features(loci),
        Trace::new("secondary structure").with_features(structure),
        Trace::new("conservation").with_features(vec![curve]),
    ]
}

fn viewer(length: usize) -> Viewer {
    let mut viewer = Viewer::with_settings(
        1200.0,
        300.0,
        &PartialSettings { coil_seed: Some(42), ..Default::default() },
    );
    viewer.set_sequence(Sequence::from(generate_sequence(length).as_str()));
    viewer.set_traces(generate_traces(length));
    viewer.render().expect("initial render");
    viewer
}

fn bench_resize(c: &mut Criterion) {
    let mut viewer = viewer(1000);
    let mut wide = false;

    c.bench_function("resize_1k_positions", |b| {
        b.iter(|| {
            wide = !wide;
            viewer.resize(if wide { 1600.0 } else { 1200.0 }, 300.0);
            black_box(viewer.render()).expect("render")
        })
    });
}

fn bench_zoom_pan(c: &mut Criterion) {
    let mut viewer = viewer(1000);
    viewer.zoom_at(20.0, 600.0);

    c.bench_function("pan_zoomed_1k_positions", |b| {
        let mut direction = 1.0;
        b.iter(|| {
            if !viewer.pan_by(direction * 50.0) {
                direction = -direction;
            }
            black_box(viewer.render()).expect("render")
        })
    });
}

criterion_group!(benches, bench_resize, bench_zoom_pan);
criterion_main!(benches);
