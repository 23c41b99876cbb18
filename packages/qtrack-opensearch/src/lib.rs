//! JSON rendering of a completed search page in the opensearch-like channel layout consumed by
//! existing result pages.

mod error;

pub use error::{Error, Result};

use std::{collections::HashMap, io::Write};

use serde::Serialize;
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc2822};

pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

const CHANNEL_DESCRIPTION: &str = "Search Result";
const NAVIGATION: [Facet; 4] = [
	Facet::empty("filetypes", "Filetypes"),
	Facet::empty("protocols", "Protocol"),
	Facet::empty("domains", "Domains"),
	Facet::empty("topics", "Topics"),
];

/// Page-level metadata of a result set.
#[derive(Clone, Debug, Default)]
pub struct ResultHead {
	pub total_results: u64,
	pub start_index: u64,
	pub items_per_page: u64,
	pub title: String,
}

/// Stored fields of one hit. Empty strings are treated like missing fields.
#[derive(Clone, Debug, Default)]
pub struct ResultDocument {
	pub id: Option<String>,
	pub link: Option<String>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub host: Option<String>,
	/// Size in bytes.
	pub size: Option<u64>,
	/// Milliseconds since the Unix epoch.
	pub last_modified: Option<i64>,
	pub url_paths: Vec<String>,
	pub texts: Vec<String>,
	pub headings: Vec<String>,
}

/// Highlight snippets keyed by document id.
pub type Highlights = HashMap<String, Vec<String>>;

#[derive(Serialize)]
struct Response<'a> {
	channels: [Channel<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Channel<'a> {
	total_results: String,
	start_index: String,
	items_per_page: String,
	#[serde(skip_serializing_if = "str::is_empty")]
	title: &'a str,
	description: &'static str,
	items: Vec<Item>,
	navigation: [Facet; 4],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Item {
	#[serde(skip_serializing_if = "Option::is_none")]
	link: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	guid: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	host: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	size: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	sizename: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub_date: Option<String>,
	#[serde(skip_serializing_if = "str::is_empty")]
	path: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	title: Option<String>,
	description: String,
}

#[derive(Clone, Copy, Serialize)]
struct Facet {
	facetname: &'static str,
	displayname: &'static str,
	#[serde(rename = "type")]
	kind: &'static str,
	min: &'static str,
	max: &'static str,
	mean: &'static str,
	elements: &'static [&'static str],
}
impl Facet {
	const fn empty(facetname: &'static str, displayname: &'static str) -> Self {
		Self { facetname, displayname, kind: "String", min: "0", max: "0", mean: "0", elements: &[] }
	}
}

pub fn render_response(
	head: &ResultHead,
	docs: &[ResultDocument],
	highlights: &Highlights,
) -> Result<Value> {
	Ok(serde_json::to_value(build_response(head, docs, highlights))?)
}

/// Writes the response document followed by a newline.
pub fn write_response<W>(
	mut writer: W,
	head: &ResultHead,
	docs: &[ResultDocument],
	highlights: &Highlights,
) -> Result<()>
where
	W: Write,
{
	serde_json::to_writer(&mut writer, &build_response(head, docs, highlights))?;

	writer.write_all(b"\n")?;

	Ok(())
}

fn build_response<'a>(
	head: &'a ResultHead,
	docs: &[ResultDocument],
	highlights: &Highlights,
) -> Response<'a> {
	let channel = Channel {
		total_results: head.total_results.to_string(),
		start_index: head.start_index.to_string(),
		items_per_page: head.items_per_page.to_string(),
		title: &head.title,
		description: CHANNEL_DESCRIPTION,
		items: docs.iter().map(|doc| build_item(doc, highlights)).collect(),
		navigation: NAVIGATION,
	};

	Response { channels: [channel] }
}

fn build_item(doc: &ResultDocument, highlights: &Highlights) -> Item {
	let path: String = doc.url_paths.iter().map(|segment| format!("/{segment}")).collect();
	let title = non_empty(doc.title.as_deref())
		.or_else(|| first_text(doc))
		.or_else(|| non_empty(Some(&path)));
	let snippet = doc
		.id
		.as_deref()
		.and_then(|id| highlights.get(id))
		.and_then(|snippets| snippets.first())
		.cloned();
	let description = snippet.or_else(|| doc.description.clone()).unwrap_or_default();

	Item {
		link: non_empty(doc.link.as_deref()),
		guid: non_empty(doc.id.as_deref()),
		host: non_empty(doc.host.as_deref()),
		size: doc.size.map(|size| size.to_string()),
		sizename: doc.size.map(size_name),
		pub_date: doc.last_modified.and_then(format_pub_date),
		path,
		title,
		description,
	}
}

fn first_text(doc: &ResultDocument) -> Option<String> {
	doc.description
		.iter()
		.chain(doc.texts.iter())
		.chain(doc.headings.iter())
		.find(|text| !text.is_empty())
		.cloned()
}

fn non_empty(value: Option<&str>) -> Option<String> {
	value.filter(|value| !value.is_empty()).map(str::to_string)
}

/// Renders a byte count in the largest whole binary unit, e.g. `15 kbyte`.
pub fn size_name(size: u64) -> String {
	let kb = size / 1_024;
	let mb = kb / 1_024;

	if mb > 0 {
		format!("{mb} mbyte")
	} else if kb > 0 {
		format!("{kb} kbyte")
	} else {
		format!("{size} byte")
	}
}

/// Formats epoch milliseconds like `Mon, 10 Sep 2012 10:25:36 +0000`.
pub fn format_pub_date(millis: i64) -> Option<String> {
	let nanos = i128::from(millis) * 1_000_000;

	OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?.format(&Rfc2822).ok()
}
