//! Database schema definitions

/// SQL to create the customers table
pub const CREATE_CUSTOMERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    email TEXT,
    phone TEXT,
    signup_date TEXT,
    country TEXT
)
"#;

/// SQL to create the products table
pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    product_name TEXT,
    category TEXT,
    price REAL,
    sku TEXT,
    stock INTEGER
)
"#;

/// SQL to create the orders table
/// `total_amount` is supplied by the export, never derived
pub const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER,
    order_date TEXT,
    status TEXT,
    total_amount REAL,
    FOREIGN KEY (customer_id) REFERENCES customers(id)
)
"#;

/// SQL to create the order_items table
/// `unit_price` is the price at time of sale and may differ from products.price
pub const CREATE_ORDER_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS order_items (
    id INTEGER PRIMARY KEY,
    order_id INTEGER,
    product_id INTEGER,
    quantity INTEGER,
    unit_price REAL,
    FOREIGN KEY (order_id) REFERENCES orders(id),
    FOREIGN KEY (product_id) REFERENCES products(id)
)
"#;

/// SQL to create the payments table
pub const CREATE_PAYMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS payments (
    id INTEGER PRIMARY KEY,
    order_id INTEGER,
    payment_date TEXT,
    amount REAL,
    payment_method TEXT,
    status TEXT,
    transaction_id TEXT,
    FOREIGN KEY (order_id) REFERENCES orders(id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_date ON orders(order_date)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_product ON order_items(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_order ON payments(order_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_CUSTOMERS_TABLE,
        CREATE_PRODUCTS_TABLE,
        CREATE_ORDERS_TABLE,
        CREATE_ORDER_ITEMS_TABLE,
        CREATE_PAYMENTS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Static description of one table in the store
#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub static CUSTOMERS: TableSchema = TableSchema {
    name: "customers",
    columns: &[
        "id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "signup_date",
        "country",
    ],
};

pub static PRODUCTS: TableSchema = TableSchema {
    name: "products",
    columns: &[
        "id",
        "product_name",
        "category",
        "price",
        "sku",
        "stock",
    ],
};

pub static ORDERS: TableSchema = TableSchema {
    name: "orders",
    columns: &[
        "id",
        "customer_id",
        "order_date",
        "status",
        "total_amount",
    ],
};

pub static ORDER_ITEMS: TableSchema = TableSchema {
    name: "order_items",
    columns: &[
        "id",
        "order_id",
        "product_id",
        "quantity",
        "unit_price",
    ],
};

pub static PAYMENTS: TableSchema = TableSchema {
    name: "payments",
    columns: &[
        "id",
        "order_id",
        "payment_date",
        "amount",
        "payment_method",
        "status",
        "transaction_id",
    ],
};

/// Every table, parents before children
pub static TABLES: &[&TableSchema] = &[&CUSTOMERS, &PRODUCTS, &ORDERS, &ORDER_ITEMS, &PAYMENTS];

/// Look up a table by name
pub fn table(name: &str) -> Option<&'static TableSchema> {
    TABLES.iter().copied().find(|t| t.name == name)
}

/// Quote an identifier for interpolation into SQL
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_lookup() {
        assert_eq!(table("orders").unwrap().name, "orders");
        assert!(table("refunds").is_none());
        assert_eq!(table("products").unwrap().columns, PRODUCTS.columns);
        assert!(PRODUCTS.columns.contains(&"price"));
    }

    #[test]
    fn test_catalogue_matches_create_statements() {
        let creates = [
            CREATE_CUSTOMERS_TABLE,
            CREATE_PRODUCTS_TABLE,
            CREATE_ORDERS_TABLE,
            CREATE_ORDER_ITEMS_TABLE,
            CREATE_PAYMENTS_TABLE,
        ];
        for (schema, create) in TABLES.iter().zip(creates) {
            assert!(create.contains(&format!("EXISTS {} (", schema.name)));
            for column in schema.columns {
                assert!(create.contains(column), "{} missing {}", schema.name, column);
            }
        }
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("price"), "\"price\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
