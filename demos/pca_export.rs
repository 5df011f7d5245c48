use chrono::NaiveDate;
use pca_export::core::*;
use pca_export::pca::*;
use rust_decimal_macros::dec;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let catalog: ProductCatalog = [
        Product::new("V001", "キャベツ", "個", dec!(150), dec!(90)),
        Product::new("M001", "牛肉", "kg", dec!(2800), dec!(2100)),
        Product::new("S001", "サーモン", "kg", dec!(1200), dec!(800)),
    ]
    .into_iter()
    .collect();

    let allocator = OrderNumberAllocator::new(InMemorySequenceStore::new());
    let order_date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

    let first = OrderBuilder::new(
        allocator.allocate_for(order_date).unwrap().into_string(),
        order_date,
        "REST001",
    )
    .customer_name("レストラン田中")
    .department_code("1")
    .staff_code("S01")
    .delivery_date(NaiveDate::from_ymd_opt(2024, 1, 17).unwrap())
    .add_detail(OrderDetailBuilder::from_product(
        catalog.find_product("V001").unwrap(),
        dec!(10),
    ))
    .add_detail(OrderDetailBuilder::from_product(
        catalog.find_product("M001").unwrap(),
        dec!(1),
    ))
    .add_detail(
        OrderDetailBuilder::from_product(catalog.find_product("S001").unwrap(), dec!(1.5))
            .tax_rate(dec!(8)),
    )
    .status(OrderStatus::Completed)
    .build()
    .unwrap();

    let second = OrderBuilder::new(
        allocator.allocate_for(order_date).unwrap().into_string(),
        order_date,
        "REST002",
    )
    .customer_name("食堂 山田")
    .add_detail(OrderDetailBuilder::new("V001", dec!(4), dec!(160)).product_name("キャベツ"))
    .build()
    .unwrap();

    // Single order, default settings
    let export = export_order(
        &first.order,
        &first.details,
        &catalog,
        &PcaConfig::default(),
    )
    .unwrap();
    println!("=== {} ({} records) ===", export.filename, export.record_count);
    println!("{}", export.content);

    // All orders, CRLF with BOM for Windows tools
    let config = PcaConfigBuilder::new()
        .line_ending(LineEnding::CrLf)
        .bom(true)
        .build();
    let export = export_orders(
        &[first, second],
        &catalog,
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        &config,
    )
    .unwrap();
    println!();
    println!("=== {} ({} records) ===", export.filename, export.record_count);
    for record in from_csv(&export.content).unwrap() {
        println!(
            "{}  {}  {}  {} x {} = {} (tax {})",
            record.get(Field::SlipNo),
            record.get(Field::CustomerCode),
            record.get(Field::ProductName),
            record.get(Field::Quantity),
            record.get(Field::UnitPrice),
            record.get(Field::SalesAmount),
            record.get(Field::ExclusiveTax),
        );
    }
}
