//! Deterministic rule-based question translation
//!
//! Used when the generative provider is unavailable or produces unusable
//! output. Rules are evaluated top to bottom and the first match wins, so
//! specific rules (salary ranking) must stay ahead of generic ones
//! (employee listing) to avoid shadowing.

fn contains_any(question: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| question.contains(n))
}

/// Translate a question into SQL using the heuristic rule catalog.
/// Returns `None` when no rule matches.
pub fn match_fallback(question: &str) -> Option<String> {
    let q = question.to_lowercase();

    // Salary ranking, ahead of the generic employee listing.
    if contains_any(&q, &["salario", "sueldo"]) {
        if contains_any(&q, &["más alto", "mas alto", "mayor", "máximo", "maximo"]) {
            return Some("SELECT * FROM employees ORDER BY salary DESC LIMIT 1;".into());
        }
        if contains_any(&q, &["promedio", "media"]) {
            return Some("SELECT AVG(salary) AS salario_promedio FROM employees;".into());
        }
    }

    // Employee counts and listings.
    if contains_any(
        &q,
        &[
            "cuantos empleados",
            "cuántos empleados",
            "cantidad de empleados",
            "total de empleados",
        ],
    ) {
        return Some("SELECT COUNT(*) FROM employees;".into());
    }
    if contains_any(&q, &["todos los empleados", "listar empleados", "lista de empleados"]) {
        return Some("SELECT * FROM employees;".into());
    }

    // Invoice ranking and totals.
    if q.contains("factura") && contains_any(&q, &["más alta", "mas alta", "mayor", "alta"]) {
        return Some(
            "SELECT * FROM documents WHERE type = 'invoice' ORDER BY total_amount DESC LIMIT 1;"
                .into(),
        );
    }
    if contains_any(&q, &["total facturas", "suma de facturas", "total facturado"]) {
        return Some(
            "SELECT SUM(total_amount) AS total_facturado FROM documents WHERE type = 'invoice';"
                .into(),
        );
    }
    if contains_any(&q, &["ganancias", "ventas"])
        && contains_any(&q, &["último mes", "ultimo mes", "mes pasado"])
    {
        return Some(
            "SELECT SUM(total_amount) AS ganancias_ultimo_mes FROM documents \
             WHERE type = 'invoice' AND date >= DATE_SUB(CURDATE(), INTERVAL 1 MONTH);"
                .into(),
        );
    }

    // Relative-date filters over invoices.
    if contains_any(&q, &["factura", "ventas"]) {
        if q.contains("hoy") {
            return Some(
                "SELECT * FROM documents WHERE type = 'invoice' AND date = CURDATE();".into(),
            );
        }
        if q.contains("ayer") {
            return Some(
                "SELECT * FROM documents WHERE type = 'invoice' \
                 AND date = DATE_SUB(CURDATE(), INTERVAL 1 DAY);"
                    .into(),
            );
        }
        if q.contains("este mes") {
            return Some(
                "SELECT * FROM documents WHERE type = 'invoice' \
                 AND MONTH(date) = MONTH(CURDATE()) AND YEAR(date) = YEAR(CURDATE());"
                    .into(),
            );
        }
        if contains_any(&q, &["mes pasado", "último mes", "ultimo mes"]) {
            return Some(
                "SELECT * FROM documents WHERE type = 'invoice' \
                 AND date >= DATE_SUB(CURDATE(), INTERVAL 1 MONTH);"
                    .into(),
            );
        }
        if q.contains("trimestre") {
            return Some(
                "SELECT SUM(total_amount) AS total_trimestre FROM documents \
                 WHERE type = 'invoice' AND QUARTER(date) = QUARTER(CURDATE()) \
                 AND YEAR(date) = YEAR(CURDATE());"
                    .into(),
            );
        }
    }

    // Contact recency ahead of the generic contact listing.
    if contains_any(&q, &["clientes", "contactos"])
        && contains_any(&q, &["recientes", "últimos", "ultimos", "nuevos"])
    {
        return Some("SELECT * FROM contacts ORDER BY id DESC LIMIT 10;".into());
    }
    if contains_any(
        &q,
        &[
            "lista de clientes",
            "todos los clientes",
            "listar clientes",
            "lista de contactos",
        ],
    ) {
        return Some("SELECT * FROM contacts;".into());
    }

    // One parameterized group-by rule covers the "por <dimensión>" family.
    group_by_dimension(&q)
}

/// "<agrupado> por <dimensión>" questions share one template; only the
/// table and grouping column vary.
fn group_by_dimension(q: &str) -> Option<String> {
    const DIMENSIONS: &[(&str, &str, &str)] = &[
        ("por cargo", "employees", "position"),
        ("por puesto", "employees", "position"),
        ("por tipo", "documents", "type"),
        ("por cliente", "documents", "contact_id"),
        ("por mes", "documents", "MONTH(date)"),
    ];

    for (needle, table, column) in DIMENSIONS {
        if q.contains(needle) {
            return Some(format!(
                "SELECT {column} AS grupo, COUNT(*) AS total FROM {table} GROUP BY {column};"
            ));
        }
    }
    None
}
