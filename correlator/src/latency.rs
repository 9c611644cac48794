// latency.rs — Basic-block latency from the schedule document

use crate::document::{Cell, ScheduleDoc, ScheduledNode};

/// Latency cell text for a timed block the schedule does not list.
pub const UNKNOWN_LATENCY: &str = "Unknown";

/// `end - start` of the first scheduled node named exactly `name`, searching
/// functions in document order. `None` if no function lists it, or if that
/// node's times are not numbers or their difference does not fit.
pub fn find_latency(schedule: &ScheduleDoc, name: &str) -> Option<Cell> {
    schedule
        .values()
        .flat_map(|func| func.nodes.iter())
        .find(|node| node.name == name)
        .and_then(node_latency)
}

fn node_latency(node: &ScheduledNode) -> Option<Cell> {
    match (&node.start, &node.end) {
        (Cell::Int(start), Cell::Int(end)) => end.checked_sub(*start).map(Cell::Int),
        (start, end) => {
            let cycles = end.as_f64()? - start.as_f64()?;
            cycles.is_finite().then_some(Cell::Float(cycles))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(text: &str) -> ScheduleDoc {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn absent_name_is_none() {
        let s = schedule(r#"{"1": {"nodes": [{"name": "a.B1", "start": 0, "end": 5}]}}"#);
        assert_eq!(find_latency(&s, "a.B2"), None);
    }

    #[test]
    fn single_match_is_end_minus_start() {
        let s = schedule(
            r#"{"1": {"nodes": [
                {"name": "a.B1", "start": 0, "end": 5},
                {"name": "a.B2", "start": 5, "end": 17}
            ]}}"#,
        );
        assert_eq!(find_latency(&s, "a.B2"), Some(Cell::Int(12)));
    }

    #[test]
    fn first_function_in_document_order_wins() {
        let s = schedule(
            r#"{"7": {"nodes": [{"name": "dup.B1", "start": 10, "end": 13}]},
                "3": {"nodes": [{"name": "dup.B1", "start": 0, "end": 40}]}}"#,
        );
        assert_eq!(find_latency(&s, "dup.B1"), Some(Cell::Int(3)));
    }

    #[test]
    fn functions_without_nodes_are_skipped() {
        let s = schedule(
            r#"{"1": {}, "2": {"nodes": null}, "3": {"nodes": [{"name": "x.B1", "start": 2, "end": 4}]}}"#,
        );
        assert_eq!(find_latency(&s, "x.B1"), Some(Cell::Int(2)));
    }

    #[test]
    fn empty_schedule() {
        assert_eq!(find_latency(&ScheduleDoc::default(), "x.B1"), None);
    }

    #[test]
    fn extreme_times_do_not_overflow() {
        let s = schedule(
            r#"{"1": {"nodes": [{"name": "x.B1", "start": -9223372036854775808, "end": 9223372036854775807}]}}"#,
        );
        assert_eq!(find_latency(&s, "x.B1"), None);
    }

    #[test]
    fn fractional_times_subtract_as_floats() {
        let s = schedule(r#"{"1": {"nodes": [{"name": "f.B1", "start": 0, "end": 3.5}]}}"#);
        assert_eq!(find_latency(&s, "f.B1"), Some(Cell::Float(3.5)));
    }

    #[test]
    fn non_numeric_times_are_none() {
        let s = schedule(r#"{"1": {"nodes": [{"name": "f.B1", "start": "0", "end": 4}]}}"#);
        assert_eq!(find_latency(&s, "f.B1"), None);
    }
}
