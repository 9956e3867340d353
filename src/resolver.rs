//! Question resolution orchestration
//!
//! One operation: question in, formatted answer text out. The resolver
//! never raises to its caller; every internal fault becomes answer text,
//! even when that text explains a failure.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::cache::QueryCache;
use crate::error::ResolveError;
use crate::executor::Database;
use crate::extract;
use crate::fallback;
use crate::prompt;
use crate::provider::ModelClient;
use crate::schema::SchemaDescription;

/// Answer text when no usable provider credential is configured.
const CONFIGURATION_ERROR_TEXT: &str =
    "No se ha configurado una credencial válida para el proveedor de IA. \
     Por favor, define 'OPENAI_API_KEY' en el entorno.";

const DEFAULT_USER: &str = "anonimo";

/// How a query came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    ModelGenerated,
    Fallback,
    Cached,
}

/// A question resolved to an executable statement.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub source_question: String,
    pub sql_text: String,
    pub origin: QueryOrigin,
}

pub struct Resolver {
    model: Option<Arc<dyn ModelClient>>,
    db: Arc<Database>,
    cache: QueryCache,
    schema_context: String,
}

impl Resolver {
    pub fn new(
        model: Option<Arc<dyn ModelClient>>,
        db: Arc<Database>,
        schema: &SchemaDescription,
        cache_capacity: usize,
    ) -> Self {
        Self {
            model,
            db,
            cache: QueryCache::new(cache_capacity),
            schema_context: schema.to_context_text(),
        }
    }

    /// Resolve a question to SQL, execute it, and return the formatted
    /// answer. Never returns an error.
    pub async fn answer(&self, question: &str, tenant: Option<&str>) -> String {
        let Some(model) = self.model.as_deref() else {
            return CONFIGURATION_ERROR_TEXT.to_string();
        };

        if let Some(sql) = self.cache.get(question) {
            let resolved = ResolvedQuery {
                source_question: question.to_string(),
                sql_text: sql,
                origin: QueryOrigin::Cached,
            };
            info!(origin = ?resolved.origin, sql = %resolved.sql_text, "resolved question");
            return self.db.execute(&resolved.sql_text).await;
        }

        let resolved = match self.resolve_with_model(model, question, tenant).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, "model path failed, trying fallback rules");
                match fallback::match_fallback(question) {
                    Some(sql) => ResolvedQuery {
                        source_question: question.to_string(),
                        sql_text: sql,
                        origin: QueryOrigin::Fallback,
                    },
                    None => {
                        return format!(
                            "Lo siento, no pude generar una consulta SQL para esta pregunta. \
                             Error: {err}"
                        );
                    }
                }
            }
        };

        info!(origin = ?resolved.origin, sql = %resolved.sql_text, "resolved question");
        self.db.execute(&resolved.sql_text).await
    }

    async fn resolve_with_model(
        &self,
        model: &dyn ModelClient,
        question: &str,
        tenant: Option<&str>,
    ) -> Result<ResolvedQuery, ResolveError> {
        let user = tenant.unwrap_or(DEFAULT_USER);
        let prompt = prompt::build_prompt(question, user, &self.schema_context, Utc::now());

        let response = model.generate(&prompt).await?;

        let sql = extract::extract_sql(&response).ok_or_else(|| ResolveError::InvalidGeneration {
            response: response.clone(),
        })?;
        if !extract::starts_with_allowed_keyword(&sql) {
            return Err(ResolveError::InvalidGeneration { response });
        }

        self.cache.insert(question, &sql);
        Ok(ResolvedQuery {
            source_question: question.to_string(),
            sql_text: sql,
            origin: QueryOrigin::ModelGenerated,
        })
    }
}
