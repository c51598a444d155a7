mod common;

use faas_cache_sim::event::{CsvEventSink, EventKind, EventSink, InMemoryEventSink};

#[test]
fn in_memory_sink_preserves_call_order() {
    let mut sink = InMemoryEventSink::default();
    sink.record("A", 0.0, EventKind::Miss).unwrap();
    sink.record("A", 5000.0, EventKind::Hit).unwrap();
    sink.record("B", 10.0, EventKind::Miss).unwrap();

    assert_eq!(sink.rows.len(), 3);
    assert_eq!(sink.rows[0].meta, "miss");
    assert_eq!(sink.rows[1].meta, "hit");
    assert_eq!(sink.rows[2].lambda, "B");
}

#[test]
fn csv_sink_writes_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    {
        let mut sink = CsvEventSink::create(&path).unwrap();
        sink.record("A", 0.0, EventKind::Miss).unwrap();
        sink.record("A", 5000.0, EventKind::Hit).unwrap();
    }
    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("lambda,time,meta"));
    let row0: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row0[0], "A");
    assert_eq!(row0[1].parse::<f64>().unwrap(), 0.0);
    assert_eq!(row0[2], "miss");
    let row1: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row1[1].parse::<f64>().unwrap(), 5000.0);
    assert_eq!(row1[2], "hit");
}
