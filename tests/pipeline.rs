//! End-to-end ingest and report runs over scratch directories

use std::fs;
use std::path::Path;

use ecomdb::config::Config;
use ecomdb::storage::SqliteStore;
use ecomdb::{ingest, report, Error};

const CUSTOMERS: &str = "\
id,first_name,last_name,email,phone,signup_date,country
1,Ada,Lovelace,ada@example.com,555-0100,2023-12-01,UK
2,Alan,Turing,alan@example.com,555-0101,2023-12-02,UK
";

const PRODUCTS: &str = "\
id,product_name,category,price,sku,stock
1,Mug,Kitchen,9.99,MUG-1,40
2,Pen,Office,4.50,PEN-1,200
3,Lamp,Home,call us,LMP-1,3
";

const ORDER_ITEMS: &str = "\
id,order_id,product_id,quantity,unit_price
1,1,1,1,9.99
2,1,1,1,9.99
3,2,2,2,4.50
4,3,3,1,15.00
";

const PAYMENTS: &str = "\
id,order_id,payment_date,amount,payment_method,status,transaction_id
1,1,2024-01-01,19.98,card,settled,tx-001
2,2,2024-02-01,9.00,paypal,settled,tx-002
";

fn orders(first_total: &str) -> String {
    format!(
        "id,customer_id,order_date,status,total_amount\n\
         1,1,2024-01-01,paid,{first_total}\n\
         2,2,2024-02-01,paid,9.00\n\
         3,2,2024-03-01,shipped,15.00\n"
    )
}

fn seed(dir: &Path, first_total: &str) -> Config {
    fs::write(dir.join("customers.csv"), CUSTOMERS).unwrap();
    fs::write(dir.join("products.csv"), PRODUCTS).unwrap();
    fs::write(dir.join("orders.csv"), orders(first_total)).unwrap();
    fs::write(dir.join("order_items.csv"), ORDER_ITEMS).unwrap();
    fs::write(dir.join("payments.csv"), PAYMENTS).unwrap();
    Config::default().with_base_dir(dir)
}

fn consistency_line(config: &Config, order_id: &str) -> String {
    let written = fs::read_to_string(&config.reports.consistency).unwrap();
    written
        .lines()
        .find(|line| line.starts_with(&format!("{order_id},")))
        .unwrap()
        .to_string()
}

#[test]
fn row_counts_match_source_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "19.98");

    let summary = ingest::run(&config, &mut ()).unwrap();
    assert_eq!(summary.tables.len(), 5);
    assert_eq!(summary.total_coercion_failures(), 1);

    let store = SqliteStore::open_existing(&config.database).unwrap();
    for source in &config.sources {
        let data_rows = fs::read_to_string(&source.path).unwrap().lines().count() - 1;
        assert_eq!(store.count_rows(&source.table).unwrap(), data_rows, "{}", source.table);
    }
}

#[test]
fn matching_total_reconciles() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "19.98");

    ingest::run(&config, &mut ()).unwrap();
    let summaries = report::run(&config, &mut ()).unwrap();

    assert_eq!(summaries[0].rows, 4);
    assert_eq!(summaries[1].rows, 3);
    assert_eq!(summaries[1].mismatches, Some(0));
    assert_eq!(
        consistency_line(&config, "1"),
        "1,Ada Lovelace,2024-01-01,paid,19.98,19.98,OK"
    );
}

#[test]
fn perturbed_total_is_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "25.00");

    ingest::run(&config, &mut ()).unwrap();
    let summaries = report::run(&config, &mut ()).unwrap();

    assert_eq!(summaries[1].mismatches, Some(1));
    assert_eq!(
        consistency_line(&config, "1"),
        "1,Ada Lovelace,2024-01-01,paid,19.98,25.0,MISMATCH"
    );
}

#[test]
fn unparseable_quantity_is_flagged() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "25.0");
    fs::write(
        dir.path().join("order_items.csv"),
        "id,order_id,product_id,quantity,unit_price\n1,1,1,two,9.99\n",
    )
    .unwrap();

    ingest::run(&config, &mut ()).unwrap();
    report::run(&config, &mut ()).unwrap();

    assert_eq!(
        consistency_line(&config, "1"),
        "1,Ada Lovelace,2024-01-01,paid,,25.0,MISMATCH"
    );
}

#[test]
fn detail_report_is_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "19.98");

    ingest::run(&config, &mut ()).unwrap();
    report::run(&config, &mut ()).unwrap();

    let written = fs::read_to_string(&config.reports.detail).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "order_id,order_date,order_status,customer_name,product_name,quantity,unit_price,line_total,total_amount"
    );
    assert_eq!(lines[1], "3,2024-03-01,shipped,Alan Turing,Lamp,1,15.0,15.0,15.0");
    assert_eq!(lines[2], "2,2024-02-01,paid,Alan Turing,Pen,2,4.5,9.0,9.0");
    assert_eq!(lines.len(), 5);
}

#[test]
fn missing_source_aborts_before_store_exists() {
    let dir = tempfile::tempdir().unwrap();
    let config = seed(dir.path(), "19.98");
    fs::remove_file(dir.path().join("payments.csv")).unwrap();

    let err = ingest::run(&config, &mut ()).unwrap_err();
    assert!(matches!(err, Error::MissingInputFile { ref table, .. } if table == "payments"));
    assert!(!config.database.exists());
}

#[test]
fn failed_file_keeps_earlier_commits_unless_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = seed(dir.path(), "19.98");
    fs::write(dir.path().join("order_items.csv"), "id,order_id,colour\n1,1,red\n").unwrap();

    assert!(ingest::run(&config, &mut ()).is_err());
    let store = SqliteStore::open_existing(&config.database).unwrap();
    assert_eq!(store.count_rows("orders").unwrap(), 3);
    assert_eq!(store.count_rows("order_items").unwrap(), 0);
    drop(store);

    fs::remove_file(&config.database).unwrap();
    config.ingest.atomic = true;
    assert!(ingest::run(&config, &mut ()).is_err());
    let store = SqliteStore::open_existing(&config.database).unwrap();
    assert_eq!(store.count_rows("customers").unwrap(), 0);
    assert_eq!(store.count_rows("orders").unwrap(), 0);
}

#[test]
fn fresh_reload_replaces_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = seed(dir.path(), "19.98");

    ingest::run(&config, &mut ()).unwrap();
    config.ingest.fresh = true;
    config.ingest.enforce_foreign_keys = true;
    ingest::run(&config, &mut ()).unwrap();

    let store = SqliteStore::open_existing(&config.database).unwrap();
    let stats = store.stats().unwrap();
    assert_eq!(stats.tables.iter().map(|t| t.rows).sum::<usize>(), 14);
    assert_eq!(stats.orphans(), 0);
}
