use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlforge::QueryBuilder;

/// Build a SELECT over `n` joined tables with `n` ANDed restrictions:
/// SELECT t0.* FROM table_0 t0 INNER JOIN table_1 t1 ... WHERE t0.c = ? AND ...
fn build_join_chain(n: usize) -> QueryBuilder {
    let mut qb = QueryBuilder::default()
        .select(["t0.*"])
        .from("table_0", Some("t0"));
    for i in 1..n {
        let parent = format!("t{}", i - 1);
        let alias = format!("t{i}");
        let condition = format!("{alias}.fk = {parent}.id");
        qb = qb.inner_join(&parent, &format!("table_{i}"), &alias, Some(&condition));
    }
    for i in 0..n {
        qb = qb.and_where(format!("t{i}.c = ?"));
    }
    qb
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/to_sql");

    for n in [1, 5, 10, 50] {
        let qb = build_join_chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.to_sql()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_and_render");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let qb = build_join_chain(n);
                black_box(qb.to_sql())
            });
        });
    }

    group.finish();
}

fn bench_named_parameters(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/named_parameters");

    for n in [5, 20, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut qb = QueryBuilder::default();
                let mut predicate = String::new();
                for i in 0..n {
                    let placeholder =
                        qb.create_named_parameter(i as i64, sqlforge::ParameterType::Integer, None);
                    if i > 0 {
                        predicate.push_str(" AND ");
                    }
                    predicate.push_str(&format!("col{i} = {placeholder}"));
                }
                let qb = qb.select(["*"]).from("t", None).where_(predicate);
                black_box(qb.to_sql())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_build_and_render,
    bench_named_parameters
);
criterion_main!(benches);
