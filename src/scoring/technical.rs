use super::breakdown::ComponentScore;
use super::schema;
use crate::config::TECHNICAL_MAX;
use crate::protocol::{OutputData, TaskType};
use serde_json::{Map, Value};

const PART_MAX: f64 = 10.0;
const FULL_CREDIT_SECS: f64 = 30.0;
const ZERO_CREDIT_SECS: f64 = 60.0;
const DECAY_PER_SEC: f64 = 0.33;

/// Rewards parseable output, schema completeness and a timely reply.
///
/// Returns the component in its native 0–30 range, scaled into `budget`.
/// Malformed output scores 0 across the board.
pub fn score_technical(
    output: &OutputData,
    generation_time: f64,
    task_type: TaskType,
    required_fields: &[&str],
    budget: f64,
) -> ComponentScore {
    let mut component = ComponentScore::new(TECHNICAL_MAX);
    let Some(data) = output.as_object() else {
        component.part("json_valid", 0.0);
        if let OutputData::Malformed { reason, .. } = output {
            component.notes.push(format!("malformed output: {reason}"));
        }
        return component.finish(budget);
    };

    component.part("json_valid", PART_MAX);
    component.part(
        "schema_complete",
        schema_score(data, task_type, required_fields),
    );
    component.part("response_time", time_score(generation_time));
    component.notes = schema::deep_validate(data, task_type);
    component.finish(budget)
}

/// 0–10: proportional to present fields; with every field present, proportional to type conformance.
pub fn schema_score(data: &Map<String, Value>, task_type: TaskType, required: &[&str]) -> f64 {
    if required.is_empty() {
        return PART_MAX;
    }
    let missing = schema::missing_fields(data, required);
    if missing.is_empty() {
        (PART_MAX * schema::type_conformance(data, task_type)).min(PART_MAX)
    } else {
        PART_MAX * super::ratio(required.len() - missing.len(), required.len())
    }
}

/// 0–10: full credit up to 30s, linear decay to 0 at 60s.
pub fn time_score(generation_time: f64) -> f64 {
    if generation_time <= FULL_CREDIT_SECS {
        PART_MAX
    } else if generation_time <= ZERO_CREDIT_SECS {
        (PART_MAX - (generation_time - FULL_CREDIT_SECS) * DECAY_PER_SEC).max(0.0)
    } else {
        0.0
    }
}
