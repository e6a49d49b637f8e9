//! End-to-end routing tests: route file → table → resolver → output.
//!
//! Run with: cargo test --test call_routing

use std::io::Write;
use std::str::FromStr;

use rust_decimal::Decimal;
use tempfile::NamedTempFile;

use callrouter::config::Config;
use callrouter::ingest::{
    load_routes_from_path, read_numbers_from_path, IngestError, InvalidRecordPolicy, PhoneNumber,
};
use callrouter::output::{CostWriter, OutputConfig};
use callrouter::router::{Backend, MatchBoundary, PrefixCostTable, RouteTable, RoutingResolver};

const ROUTES: &str = "\
+449275049,0.49
+86153,0.84
+8130,0.68
+86153,0.91
+861,2.0
+1,0.01
";

const NUMBERS: &str = "\
+86153023841
+5551234
+861999
+81301234567
+449275049
+1
";

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn build(backend: Backend, routes: &str) -> RouteTable {
    let file = temp_file(routes);
    let mut table = RouteTable::new(backend);
    load_routes_from_path(file.path(), &mut table, InvalidRecordPolicy::Abort).unwrap();
    table
}

fn render(resolver: &RoutingResolver<RouteTable>, numbers: &str) -> String {
    let file = temp_file(numbers);
    let numbers = read_numbers_from_path(file.path()).unwrap();
    let results = resolver.resolve(numbers);

    let mut writer = CostWriter::new(Vec::new(), &OutputConfig::default()).unwrap();
    writer.write_all(&results).unwrap();
    String::from_utf8(writer.finish().unwrap()).unwrap()
}

#[test]
fn test_end_to_end_csv_output() {
    let expected = "\
86153023841,0.84
5551234,0
861999,2.0
81301234567,0.68
449275049,0
1,0
";

    for backend in [Backend::Trie, Backend::Hash] {
        let resolver = RoutingResolver::new(build(backend, ROUTES));
        assert_eq!(resolver.table().len(), 5);
        assert_eq!(render(&resolver, NUMBERS), expected, "backend {backend:?}");
    }
}

#[test]
fn test_end_to_end_inclusive_boundary() {
    let resolver = RoutingResolver::new(build(Backend::Trie, ROUTES))
        .with_boundary(MatchBoundary::Inclusive);
    let out = render(&resolver, NUMBERS);

    // Full-number matches become eligible
    assert!(out.contains("449275049,0.49\n"));
    assert!(out.contains("1,0.01\n"));
    assert!(out.contains("86153023841,0.84\n"));
}

#[test]
fn test_empty_route_table() {
    let resolver = RoutingResolver::new(build(Backend::Trie, ""));
    assert_eq!(render(&resolver, "+5551234\n"), "5551234,0\n");
}

#[test]
fn test_malformed_routes_policy() {
    let routes = "+86153,0.84\n+8130;0.68\n+449275049,0.49\n";
    let file = temp_file(routes);

    let mut table = RouteTable::new(Backend::Trie);
    let err = load_routes_from_path(file.path(), &mut table, InvalidRecordPolicy::Abort)
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidRecord { line: 2, .. }));
    assert!(err.to_string().contains("line 2"));

    let mut table = RouteTable::new(Backend::Trie);
    let stats =
        load_routes_from_path(file.path(), &mut table, InvalidRecordPolicy::Skip).unwrap();
    assert_eq!(stats.skipped, 1);
    assert_eq!(table.longest_prefix_cost("4492750491"), Some(dec("0.49")));
}

#[test]
fn test_missing_route_file() {
    let mut table = RouteTable::new(Backend::Hash);
    let err = load_routes_from_path(
        "/nonexistent/routes.txt",
        &mut table,
        InvalidRecordPolicy::Abort,
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_resolution_from_config() {
    let config = Config::from_yaml(
        r#"
routing:
  backend: hash
  workers: 4
  chunk_size: 7
"#,
    )
    .unwrap();

    let routes = temp_file(ROUTES);
    let mut table = RouteTable::new(config.routing.backend);
    load_routes_from_path(routes.path(), &mut table, config.ingest.on_invalid).unwrap();
    let resolver = RoutingResolver::new(table).with_boundary(config.routing.boundary);

    let numbers: Vec<PhoneNumber> = (0..100)
        .map(|i| PhoneNumber::new(format!("86153{i:04}")))
        .collect();
    let results = resolver
        .resolve_parallel(numbers, config.routing.workers, config.routing.chunk_size)
        .await
        .unwrap();

    assert_eq!(results.len(), 100);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.number.as_str(), format!("86153{i:04}"));
        assert_eq!(result.cost, dec("0.84"));
    }
}
