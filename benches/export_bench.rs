use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use pca_export::core::*;
use pca_export::pca;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn catalog() -> ProductCatalog {
    (1..=100)
        .map(|i| {
            Product::new(
                format!("P{i:03}"),
                format!("商品 {i}"),
                "個",
                dec!(300),
                dec!(180),
            )
        })
        .collect()
}

fn build_order(order_no: &str, lines: usize) -> PlacedOrder {
    let mut builder = OrderBuilder::new(order_no, test_date(), "REST001")
        .customer_name("レストラン田中")
        .department_code("1")
        .staff_code("S01");
    for i in 0..lines {
        builder = builder.add_detail(
            OrderDetailBuilder::new(format!("P{:03}", i % 100 + 1), dec!(2.5), dec!(300))
                .product_name(format!("商品 {}", i % 100 + 1)),
        );
    }
    builder.build().unwrap()
}

fn build_100_orders() -> Vec<PlacedOrder> {
    (1..=100)
        .map(|n| build_order(&format_order_number(2024, n), 5))
        .collect()
}

fn bench_build_order(c: &mut Criterion) {
    c.bench_function("build_order_10_lines", |b| {
        b.iter(|| black_box(build_order("20240001", 10)));
    });
}

fn bench_convert(c: &mut Criterion) {
    let placed = build_order("20240001", 1000);
    let products = catalog();
    c.bench_function("convert_1000_lines", |b| {
        b.iter(|| {
            black_box(pca::convert_order(
                black_box(&placed.order),
                black_box(&placed.details),
                &products,
            ))
        });
    });
}

fn bench_to_csv(c: &mut Criterion) {
    let placed = build_order("20240001", 1000);
    let records = pca::convert_order(&placed.order, &placed.details, &catalog());
    c.bench_function("to_csv_1000_records", |b| {
        b.iter(|| black_box(pca::to_csv(black_box(&records))));
    });
}

fn bench_from_csv(c: &mut Criterion) {
    let placed = build_order("20240001", 1000);
    let csv = pca::to_csv(&pca::convert_order(&placed.order, &placed.details, &catalog()));
    c.bench_function("from_csv_1000_records", |b| {
        b.iter(|| black_box(pca::from_csv(black_box(&csv))));
    });
}

fn bench_bulk_export(c: &mut Criterion) {
    let orders = build_100_orders();
    let products = catalog();
    let config = pca::PcaConfig::default();
    c.bench_function("export_100_orders", |b| {
        b.iter(|| {
            black_box(pca::export_orders(
                black_box(&orders),
                &products,
                test_date(),
                &config,
            ))
        });
    });
}

fn bench_allocate(c: &mut Criterion) {
    c.bench_function("allocate_order_number", |b| {
        let alloc = OrderNumberAllocator::with_config(
            InMemorySequenceStore::new(),
            AllocatorConfigBuilder::new()
                .overflow(OverflowPolicy::Widen)
                .build(),
        );
        b.iter(|| black_box(alloc.allocate(2024)));
    });
}

criterion_group!(
    benches,
    bench_build_order,
    bench_convert,
    bench_to_csv,
    bench_from_csv,
    bench_bulk_export,
    bench_allocate,
);
criterion_main!(benches);
