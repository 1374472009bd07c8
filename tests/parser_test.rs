use std::time::Duration;

use influxql::prelude::*;

#[test]
fn test_interval_matches_formatter() {
    for secs in [1, 60, 90 * 60, 3600, 36 * 3600, 86_400, 14 * 86_400] {
        let d = Duration::from_secs(secs);
        assert_eq!(parse_interval(&format_duration(d)).unwrap(), d);
    }
    assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_interval("1us").unwrap(), Duration::from_micros(1));
}

#[test]
fn test_interval_rejects_garbage() {
    for bad in ["", "h", "1x", "1.5h", "-1h", "1h30m"] {
        let err = parse_interval(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "input {:?}", bad);
    }
}

#[test]
fn test_parsed_expressions_build_a_query() {
    let fields = ["count(a)", "sum(count(b)) as total", "percentile(latency, 95)", "host"]
        .into_iter()
        .map(parse_expr)
        .collect::<Result<Vec<_>, _>>()
        .expect("expressions should parse");

    let (key, value) = parse_filter("region='us-west'").unwrap();
    let q = Query::select(fields).from("requests").filter(key, value);

    assert_eq!(
        q.to_influxql().unwrap(),
        "SELECT COUNT(a), SUM(COUNT(b)) AS total, PERCENTILE(latency, 95), host \
         FROM requests WHERE region = 'us-west';"
    );
}

#[test]
fn test_parsed_call_is_validated() {
    let err = parse_expr("percentile(a, 200)").unwrap_err();
    assert!(matches!(err, QueryError::ArgumentRange { .. }));

    let err = parse_expr("median(a, b)").unwrap_err();
    assert!(matches!(err, QueryError::ArgumentCount { .. }));

    let err = parse_expr("nope(a)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}
