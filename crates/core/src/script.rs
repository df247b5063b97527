//! Query catalog and PySpark script generation.
//!
//! Each [`QueryKind`] names one canned Spark SQL insight over the sales
//! dataset. [`build_script`] wraps the SQL in a small PySpark program that
//! loads the CSV, registers it as `sales_data_view`, runs the query, and
//! prints the rows as a JSON array on stdout (which Livy returns as the
//! statement's `text/plain` output).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::DatasetConfig;
use crate::error::CoreError;

/// Temp view name the SQL text selects from.
pub const SALES_VIEW: &str = "sales_data_view";

const PLATFORM_EXPOSURE_SQL: &str = "
SELECT
    platform,
    SUM(COALESCE(number_sold, 0)) AS total_units_sold,
    COUNT(product_name) AS transaction_count
FROM
    sales_data_view
GROUP BY
    platform
ORDER BY
    total_units_sold DESC
";

// Ratings arrive as free text; only purely numeric values are averaged.
const CATEGORY_PERFORMANCE_SQL: &str = r"
SELECT
    category,
    ROUND(AVG(COALESCE(price, 0)), 2) AS average_price,
    ROUND(
        AVG(
            CASE
                WHEN rating RLIKE '^[0-9]+\\.?[0-9]*$' THEN CAST(rating AS DOUBLE)
                ELSE NULL
            END
        ),
        2
    ) AS average_rating
FROM
    sales_data_view
WHERE
    category IS NOT NULL AND category != ''
GROUP BY
    category
HAVING
    COUNT(product_name) > 10
ORDER BY
    average_rating DESC
";

/// A named query from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Total units sold and transaction count per platform.
    PlatformExposure,
    /// Average price and numeric rating per category with more than ten products.
    CategoryPerformance,
}

impl QueryKind {
    /// Every recognized query, in catalog order.
    pub const ALL: [QueryKind; 2] = [QueryKind::PlatformExposure, QueryKind::CategoryPerformance];

    /// Identifier used by callers, e.g. `platform_exposure`.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::PlatformExposure => "platform_exposure",
            QueryKind::CategoryPerformance => "category_performance",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            QueryKind::PlatformExposure => {
                "Total units sold and transaction count by platform (exposure gain)"
            }
            QueryKind::CategoryPerformance => {
                "Average rating and price by category (product strategy)"
            }
        }
    }

    /// Spark SQL text, selecting from [`SALES_VIEW`].
    pub fn sql(self) -> &'static str {
        match self {
            QueryKind::PlatformExposure => PLATFORM_EXPOSURE_SQL,
            QueryKind::CategoryPerformance => CATEGORY_PERFORMANCE_SQL,
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        QueryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| CoreError::UnknownQuery(trimmed.to_string()))
    }
}

/// Render the PySpark program Livy will execute for `kind`.
///
/// Output is a pure function of its inputs. Dataset path and schema are
/// embedded as single-quoted Python literals; the SQL is embedded in a
/// raw triple-quoted string so backslashes reach Spark untouched.
pub fn build_script(kind: QueryKind, dataset: &DatasetConfig) -> String {
    format!(
        r#"import json

df = spark.read.format('csv') \
    .schema('{schema}') \
    .option('header', 'true') \
    .option('quote', '"') \
    .option('escape', '"') \
    .load('{path}')
df.createOrReplaceTempView('{view}')

results_rows = spark.sql(r"""{sql}""").collect()

results_list = [row.asDict() for row in results_rows]
print(json.dumps(results_list))
"#,
        schema = python_quote(&dataset.schema),
        path = python_quote(&dataset.data_path),
        view = SALES_VIEW,
        sql = kind.sql(),
    )
}

/// Escape text for inclusion inside a single-quoted Python string literal.
fn python_quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}
