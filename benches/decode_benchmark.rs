use criterion::{Criterion, criterion_group, criterion_main};
use sql_records::prelude::*;
use sql_records::test_utils::{MockExecutor, MockRows};
use std::hint::black_box;

#[derive(Debug, Default, Clone, PartialEq)]
struct Item {
    id: i64,
    label: String,
    price: f64,
}

sql_records::impl_record! {
    Item { id: "id", label: "label", price: "price" }
}

fn scripted_rows(count: usize) -> MockRows {
    let mut rows = MockRows::new(&["id", "label", "price"]);
    for i in 0..count {
        rows = rows.row(vec![
            RowValues::Int(i as i64),
            RowValues::Text(format!("item-{i}")),
            RowValues::Float(i as f64 * 1.5),
        ]);
    }
    rows
}

fn bench_placeholders(c: &mut Criterion) {
    c.bench_function("placeholders_mysql_6x100", |b| {
        b.iter(|| placeholders(black_box(6), black_box(100), Dialect::MySql));
    });
    c.bench_function("placeholders_postgres_6x100", |b| {
        b.iter(|| placeholders(black_box(6), black_box(100), Dialect::Postgres));
    });
}

fn bench_query_decode(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");

    for rows in [10usize, 100, 1000] {
        let scripted = scripted_rows(rows);
        c.bench_function(&format!("query_decode_{rows}_rows"), |b| {
            b.to_async(&rt).iter(|| {
                let scripted = scripted.clone();
                async move {
                    let executor = MockExecutor::new();
                    executor.expect_query("^SELECT", scripted);
                    let cancel = CancellationToken::new();
                    let records: Vec<Item> = query(
                        &cancel,
                        &executor,
                        "SELECT id, label, price FROM items",
                        &[],
                        &QueryOptions::default(),
                    )
                    .await
                    .expect("query")
                    .into_records();
                    black_box(records.len())
                }
            });
        });
    }
}

criterion_group!(benches, bench_placeholders, bench_query_decode);
criterion_main!(benches);
