//! Schema description and catalog introspection
//!
//! The schema is introspected once at startup and shared read-only with the
//! prompt builder. When introspection fails the service degrades to a static
//! table-name list instead of refusing to start.

use tracing::warn;

use crate::executor::Database;

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// Read-only description of the tables the service may query.
#[derive(Debug, Clone, Default)]
pub struct SchemaDescription {
    pub tables: Vec<TableDescriptor>,
}

/// Table names of the production ERP schema, used as degraded context when
/// catalog introspection is unavailable.
pub const STATIC_TABLE_NAMES: &[&str] = &[
    "accounting_account_balances",
    "accounting_accounts",
    "accounting_configurations",
    "accounting_movements",
    "accounting_vouchers",
    "billing_numberings",
    "client_consumptions",
    "client_subscriptions",
    "company",
    "company_areas",
    "configurations",
    "contact_accounts",
    "contact_relationships",
    "contact_statements",
    "contacts",
    "contract_salary_history",
    "costs_and_expenses",
    "costs_and_expenses_categories",
    "coupons",
    "custom_fields",
    "discounts",
    "document_items",
    "documents",
    "employee_contracts",
    "employee_positions",
    "employees",
    "fixed_assets",
    "headquarters",
    "integrations",
    "inventory_adjustments",
    "inventory_groups",
    "item_balance",
    "item_categories",
    "item_kardex",
    "items",
    "ledgers",
    "payment_conditions",
    "payments",
    "payroll_details",
    "payrolls",
    "price_lists",
    "retentions",
    "roles",
    "taxes",
    "templates",
    "user_data",
    "user_roles",
    "warehouses",
];

impl SchemaDescription {
    /// Degraded description carrying table names only.
    pub fn from_static_list() -> Self {
        Self {
            tables: STATIC_TABLE_NAMES
                .iter()
                .map(|name| TableDescriptor {
                    name: (*name).to_string(),
                    columns: Vec::new(),
                })
                .collect(),
        }
    }

    /// Render the schema as the textual context embedded in prompts.
    pub fn to_context_text(&self) -> String {
        let mut out = String::from("La base de datos contiene las siguientes tablas:\n");
        for table in &self.tables {
            if table.columns.is_empty() {
                out.push_str(&format!("- {}\n", table.name));
            } else {
                let cols: Vec<String> = table
                    .columns
                    .iter()
                    .map(|c| format!("{} {}", c.name, c.declared_type))
                    .collect();
                out.push_str(&format!("- {} ({})\n", table.name, cols.join(", ")));
            }
        }
        out.push_str("Utiliza solo estas tablas para generar las consultas.");
        out
    }
}

/// Introspect the database catalog, falling back to the static table list
/// on any failure. Called once per process lifetime.
pub async fn load(db: &Database) -> SchemaDescription {
    match db.introspect().await {
        Ok(schema) if !schema.tables.is_empty() => schema,
        Ok(_) => {
            warn!("catalog introspection returned no tables, using static table list");
            SchemaDescription::from_static_list()
        }
        Err(e) => {
            warn!(error = %e, "catalog introspection failed, using static table list");
            SchemaDescription::from_static_list()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_description_lists_core_tables() {
        let schema = SchemaDescription::from_static_list();
        let text = schema.to_context_text();
        assert!(text.contains("- employees"));
        assert!(text.contains("- documents"));
        assert!(text.contains("- contacts"));
        assert!(text.ends_with("Utiliza solo estas tablas para generar las consultas."));
    }

    #[test]
    fn test_context_text_includes_column_types() {
        let schema = SchemaDescription {
            tables: vec![TableDescriptor {
                name: "employees".into(),
                columns: vec![
                    ColumnDescriptor {
                        name: "id".into(),
                        declared_type: "INTEGER".into(),
                    },
                    ColumnDescriptor {
                        name: "salary".into(),
                        declared_type: "DOUBLE".into(),
                    },
                ],
            }],
        };
        let text = schema.to_context_text();
        assert!(text.contains("- employees (id INTEGER, salary DOUBLE)"));
    }
}
