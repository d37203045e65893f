use serde_json::Value;
use std::future::Future;
use tracing::{error, info};

use crate::error::PxError;
use crate::parse::parse_dataset;
use crate::table::{build_rows, Row};

/// Which dataset a loader call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Population,
    Employment,
}

/// Terminal outcome of one load pass.
#[derive(Debug)]
pub enum TableState {
    /// Both datasets loaded and joined.
    Full(Vec<Row>),
    /// Employment unavailable; rows carry placeholders.
    PopulationOnly(Vec<Row>),
    /// Both tiers failed. Carries the error-row text, already prefixed with
    /// `Data load failed: `.
    Failed(String),
}

/// Run the two-tier load.
///
/// Tier one issues both dataset loads concurrently and joins them
/// all-or-nothing; neither side is cancelled when the other fails. Parse
/// failures count as load failures. On tier-one failure the combined error is
/// only logged, never shown, and tier two retries with the population dataset
/// alone. A tier-two failure is terminal and its message becomes the visible
/// error row.
pub async fn load_table<L, Fut>(load: L) -> TableState
where
    L: Fn(DatasetKind) -> Fut,
    Fut: Future<Output = Result<Value, PxError>>,
{
    let (pop_res, emp_res) = futures::join!(
        load(DatasetKind::Population),
        load(DatasetKind::Employment),
    );
    match join_full(pop_res, emp_res) {
        Ok(rows) => {
            info!(rows = rows.len(), "loaded both datasets");
            return TableState::Full(rows);
        }
        Err(e) => {
            error!(error = %e, "full load failed, falling back to population only");
        }
    }

    match load(DatasetKind::Population)
        .await
        .and_then(|px| parse_dataset(&px))
    {
        Ok(pop) => {
            let rows = build_rows(&pop, None);
            info!(rows = rows.len(), "loaded population only");
            TableState::PopulationOnly(rows)
        }
        Err(e2) => {
            error!(error = %e2, "population-only load failed");
            TableState::Failed(format!("Data load failed: {}", e2))
        }
    }
}

fn join_full(pop: Result<Value, PxError>, emp: Result<Value, PxError>) -> Result<Vec<Row>, PxError> {
    let pop = parse_dataset(&pop?)?;
    let emp = parse_dataset(&emp?)?;
    Ok(build_rows(&pop, Some(&emp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn pop_px() -> Value {
        json!({
            "dimension": {
                "Alue": {
                    "category": {
                        "label": { "SSS": "WHOLE COUNTRY", "091": "Helsinki" },
                        "index": { "SSS": 0, "091": 1 }
                    }
                }
            },
            "value": [5_500_000, 650_000]
        })
    }

    fn emp_px() -> Value {
        json!({
            "dimension": {
                "Alue": {
                    "category": {
                        "label": { "SSS": "WHOLE COUNTRY", "091": "Helsinki" },
                        "index": { "SSS": 0, "091": 1 }
                    }
                }
            },
            "value": [2_300_000, 400_000]
        })
    }

    fn api_error() -> PxError {
        PxError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn both_datasets_succeed_renders_full() {
        let state = load_table(|kind| async move {
            Ok(match kind {
                DatasetKind::Population => pop_px(),
                DatasetKind::Employment => emp_px(),
            })
        })
        .await;
        match state {
            TableState::Full(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows.iter().all(|r| r.employment.is_some()));
            }
            other => panic!("expected Full, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn employment_failure_falls_back_to_population_only() {
        let state = load_table(|kind| async move {
            match kind {
                DatasetKind::Population => Ok(pop_px()),
                DatasetKind::Employment => Err(api_error()),
            }
        })
        .await;
        match state {
            TableState::PopulationOnly(rows) => {
                assert_eq!(rows.len(), 2);
                assert!(rows.iter().all(|r| r.employment.is_none()));
                assert!(rows.iter().all(|r| r.rate.is_none()));
            }
            other => panic!("expected PopulationOnly, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_employment_response_falls_back_like_a_failed_fetch() {
        let state = load_table(|kind| async move {
            Ok(match kind {
                DatasetKind::Population => pop_px(),
                // no Alue dimension
                DatasetKind::Employment => json!({ "dimension": {}, "value": [1] }),
            })
        })
        .await;
        assert!(matches!(state, TableState::PopulationOnly(_)));
    }

    #[tokio::test]
    async fn both_tiers_failing_is_terminal_with_second_message() {
        let state = load_table(|kind| async move {
            match kind {
                DatasetKind::Population => Err::<Value, _>(PxError::QueryFile {
                    path: "./population_query.json".into(),
                }),
                DatasetKind::Employment => Err(api_error()),
            }
        })
        .await;
        match state {
            TableState::Failed(msg) => {
                assert!(msg.starts_with("Data load failed: "));
                // the visible message is the second tier's (population) failure
                assert!(msg.contains("Query file not found: ./population_query.json"));
                assert!(!msg.contains("boom"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn first_tier_failure_retries_population_even_if_it_succeeded_before() {
        // population succeeds both times, employment always fails; the second
        // tier re-fetches population rather than reusing tier-one data
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let state = load_table(|kind| {
            let calls = &calls;
            async move {
                match kind {
                    DatasetKind::Population => {
                        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        Ok(pop_px())
                    }
                    DatasetKind::Employment => Err(api_error()),
                }
            }
        })
        .await;
        assert!(matches!(state, TableState::PopulationOnly(_)));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
