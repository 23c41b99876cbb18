use qtrack_config::Config;
use qtrack_domain::Origin;
use qtrack_replay::{
	Error,
	input::{Entry, parse_line},
};
use qtrack_tracker::{Hooks, Tracker};

#[test]
fn parses_tracked_query() {
	let entry = parse_line("remote 42  rust async runtime").expect("Line must parse.");
	let Some(Entry::Track { origin, record }) = entry else {
		panic!("Expected a tracked entry.");
	};

	assert_eq!(origin, Origin::Remote);
	assert_eq!(record.result_count(), 42);
	assert_eq!(record.query(), "rust async runtime");
}

#[test]
fn parses_raw_archive_entry() {
	let entry = parse_line("raw 7 manual query").expect("Line must parse.");

	assert_eq!(
		entry,
		Some(Entry::Archive { query: "manual query".to_string(), result_count: "7".to_string() })
	);
}

#[test]
fn skips_blank_and_comment_lines() {
	assert_eq!(parse_line("   ").expect("Blank line must parse."), None);
	assert_eq!(parse_line("# local 1 q").expect("Comment must parse."), None);
}

#[test]
fn rejects_unknown_origin() {
	let err = parse_line("peer 3 q").expect_err("Expected invalid origin.");

	assert!(matches!(err, Error::Origin(_)), "Unexpected error: {err}");
}

#[test]
fn rejects_bad_counts() {
	assert!(matches!(parse_line("local"), Err(Error::MissingField("result_count"))));
	assert!(matches!(parse_line("local many q"), Err(Error::InvalidCount(_))));
	assert!(matches!(parse_line("local -1 q"), Err(Error::InvalidCount(_))));
}

#[tokio::test]
async fn replay_feeds_tracker_and_skips_bad_lines() {
	let tracker = Tracker::spawn(&Config::default(), Hooks::default());
	let input = "local 3 first\nremote 12 second\nbogus line here\n\nraw 1 manual\nlocal 0 third\n";
	let tracked = qtrack_replay::replay(&tracker, input.as_bytes())
		.await
		.expect("Replay must read in-memory input.");

	assert_eq!(tracked, 4);
	assert_eq!(tracker.size(Origin::Local), 2);
	assert_eq!(tracker.size(Origin::Remote), 1);
	assert_eq!(tracker.pending_dump_lines(), 1);

	let newest: Vec<String> =
		tracker.get(Origin::Local).map(|record| record.query().to_string()).collect();

	assert_eq!(newest, vec!["third", "first"]);

	tracker.shutdown().await;
}
