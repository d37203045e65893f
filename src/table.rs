use crate::parse::Dataset;

/// Rate above this is highlighted as high.
const HIGH_ABOVE: f64 = 45.0;
/// Rate below this is highlighted as low.
const LOW_BELOW: f64 = 25.0;

/// Visual classification of a row's employment rate. `Normal` rows receive no
/// treatment; only `High` and `Low` are highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateClass {
    High,
    Low,
    Normal,
}

/// One joined output row. Purely data; the renderer decides presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub population: f64,
    /// `None` when the employment dataset is absent, lacks this code, or the
    /// observation is non-finite.
    pub employment: Option<f64>,
    /// `None` unless population > 0 and employment is present.
    pub rate: Option<f64>,
    pub class: Option<RateClass>,
}

pub fn classify(rate: f64) -> RateClass {
    if rate > HIGH_ABOVE {
        RateClass::High
    } else if rate < LOW_BELOW {
        RateClass::Low
    } else {
        RateClass::Normal
    }
}

/// Join population and employment datasets by region code.
///
/// Produces one row per population code, in the population dataset's own
/// order. Codes missing from the employment side are kept, with placeholders
/// downstream; nothing is re-sorted or dropped.
pub fn build_rows(pop: &Dataset, emp: Option<&Dataset>) -> Vec<Row> {
    pop.codes
        .iter()
        .map(|code| {
            let name = pop
                .labels
                .get(code)
                .cloned()
                .unwrap_or_else(|| code.clone());
            let population = pop.by_code.get(code).copied().unwrap_or(0.0);
            let employment = emp
                .and_then(|d| d.by_code.get(code))
                .copied()
                .filter(|v| v.is_finite());
            let rate = match employment {
                Some(e) if population > 0.0 => Some(e / population * 100.0),
                _ => None,
            };
            let class = rate.map(classify);
            Row {
                name,
                population,
                employment,
                rate,
                class,
            }
        })
        .collect()
}
