//! Prompt composition for the text-generation provider
//!
//! Pure and deterministic: identical inputs always produce the identical
//! prompt. This keeps tests reproducible and cache behavior coherent with
//! provider behavior.

use chrono::{DateTime, Utc};

/// Fixed heuristic directives the model is instructed to follow.
const DIRECTIVES: &str = "\
REGLAS IMPORTANTES:
- SOLO usa las tablas y columnas listadas arriba.
- NO inventes alias ni nombres de tablas/columnas.
- Si la pregunta es sobre empleados, usa la tabla 'employees'.
- Si es sobre facturas o ventas, usa la tabla 'documents' y los campos 'total_amount' y 'date'.
- Si es sobre clientes, usa la tabla 'contacts'.
- Términos relativos de fecha ('hoy', 'ayer', 'este mes', 'último mes', 'trimestre') se traducen con funciones de fecha sobre CURDATE().
- Términos de ranking ('mayor', 'más alta', 'top') se traducen con ORDER BY y LIMIT.
- Verbos de agregación ('cuántos', 'total', 'suma', 'promedio', 'mínimo', 'máximo') se traducen con COUNT, SUM, AVG, MIN o MAX.
- Términos de agrupación ('por tipo', 'por cargo', 'por mes') se traducen con GROUP BY.
- NO uses acentos graves (backticks) salvo que sea necesario.
- SOLO responde con la consulta SQL, sin explicación.";

/// Fixed worked examples teaching the expected output shape.
const EXAMPLES: &str = "\
EJEMPLOS:
Pregunta: '¿Cuántos empleados hay?'
SQL: SELECT COUNT(*) FROM employees;

Pregunta: 'Ganancias del último mes'
SQL: SELECT SUM(total_amount) AS ganancias_ultimo_mes FROM documents WHERE type = 'invoice' AND date >= DATE_SUB(CURDATE(), INTERVAL 1 MONTH);

Pregunta: 'Lista de clientes'
SQL: SELECT * FROM contacts;

Pregunta: 'Factura más alta'
SQL: SELECT * FROM documents WHERE type = 'invoice' ORDER BY total_amount DESC LIMIT 1;";

/// Compose the instruction prompt for one question.
pub fn build_prompt(
    question: &str,
    user: &str,
    schema_context: &str,
    now: DateTime<Utc>,
) -> String {
    format!(
        "Eres un asistente experto en SQL. Convierte la siguiente pregunta a una consulta SQL válida.\n\
         \n\
         Fecha actual: {timestamp}\n\
         Usuario: {user}\n\
         \n\
         Contexto de las tablas disponibles:\n\
         {schema}\n\
         \n\
         {directives}\n\
         \n\
         {examples}\n\
         \n\
         Pregunta: '{question}'\n\
         SQL:",
        timestamp = now.format("%Y-%m-%d %H:%M:%S UTC"),
        user = user,
        schema = schema_context,
        directives = DIRECTIVES,
        examples = EXAMPLES,
        question = question,
    )
}
