//! Fixed report queries

/// One row per order line item, newest orders first
pub const DETAIL_SQL: &str = r#"
SELECT
    o.id AS order_id,
    o.order_date,
    o.status AS order_status,
    c.first_name || ' ' || c.last_name AS customer_name,
    p.product_name,
    oi.quantity,
    oi.unit_price,
    (oi.quantity * oi.unit_price) AS line_total,
    o.total_amount
FROM orders o
JOIN customers c ON o.customer_id = c.id
JOIN order_items oi ON oi.order_id = o.id
JOIN products p ON oi.product_id = p.id
ORDER BY o.order_date DESC, o.id
"#;

/// One row per order comparing the summed line totals with the stored total.
/// `?1` is the tolerance. An order reconciles only when its stored total and
/// every line total are known, since `SUM` skips NULL lines.
pub const CONSISTENCY_SQL: &str = r#"
SELECT
    o.id AS order_id,
    c.first_name || ' ' || c.last_name AS customer_name,
    o.order_date,
    o.status,
    SUM(oi.quantity * oi.unit_price) AS items_total,
    o.total_amount,
    CASE WHEN o.total_amount IS NULL
           OR COUNT(oi.quantity * oi.unit_price) < COUNT(*)
           OR ABS(SUM(oi.quantity * oi.unit_price) - o.total_amount) > ?1
         THEN 'MISMATCH' ELSE 'OK' END AS consistency_check
FROM orders o
JOIN customers c ON o.customer_id = c.id
JOIN order_items oi ON oi.order_id = o.id
GROUP BY o.id
ORDER BY o.order_date DESC, o.id
"#;

pub const MISMATCH: &str = "MISMATCH";
pub const OK: &str = "OK";
