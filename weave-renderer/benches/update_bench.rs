use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use weave_renderer::{Arg, Component};

fn rows(count: usize, tick: usize) -> Vec<Component> {
    (0..count)
        .map(|i| {
            Component::new(
                &["<li class=", ">row ", "</li>"],
                vec![Arg::from(if (i + tick) % 2 == 0 { "even" } else { "odd" }), Arg::from(i)],
            )
        })
        .collect()
}

fn table(count: usize, tick: usize) -> Component {
    Component::new(&["<ul>", "</ul>"], vec![Arg::from(rows(count, tick))])
}

fn bench_update_vs_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_update");
    group.sample_size(20);
    for &count in &[50usize, 200, 500] {
        group.bench_with_input(BenchmarkId::new("patch", count), &count, |b, &n| {
            let view = table(n, 0);
            view.render(None);
            let mut tick = 0;
            b.iter(|| {
                tick += 1;
                view.update(vec![Arg::from(rows(n, tick))])
            });
        });
        group.bench_with_input(BenchmarkId::new("rebuild", count), &count, |b, &n| {
            let mut tick = 0;
            b.iter(|| {
                tick += 1;
                let view = table(n, tick);
                let nodes = view.render(None);
                view.dispose();
                nodes.len()
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().without_plots();
    targets = bench_update_vs_rebuild
}
criterion_main!(benches);
