//! RSS 2.0 wire format
//!
//! Reading only extracts `<item>`s from the first `<channel>`: channel
//! metadata always comes from configuration. Writing renders the whole
//! document with two-space indentation.

use quick_xml::de::{DeError, from_str};
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ChannelMeta, FeedDocument, FeedEntry};
use crate::Result;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const GENERATOR: &str = concat!("qweather-rss ", env!("CARGO_PKG_VERSION"));

/// Why an existing feed file could not be used
#[derive(Error, Debug)]
pub enum FeedParseError {
    #[error("not a well-formed feed: {0}")]
    Malformed(#[from] DeError),
    #[error("document has no <channel> element")]
    MissingChannel,
}

#[derive(Debug, Deserialize)]
struct RssIn {
    #[serde(default)]
    channel: Option<ChannelIn>,
}

#[derive(Debug, Deserialize)]
struct ChannelIn {
    #[serde(rename = "item", default)]
    items: Vec<ItemIn>,
}

#[derive(Debug, Deserialize)]
struct ItemIn {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    guid: Option<GuidIn>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GuidIn {
    #[serde(rename = "$text", default)]
    value: String,
}

impl From<ItemIn> for FeedEntry {
    fn from(item: ItemIn) -> Self {
        Self {
            title: item.title,
            link: item.link,
            description: item.description,
            guid: item.guid.map(|g| g.value).filter(|g| !g.is_empty()),
            pub_date: item.pub_date,
        }
    }
}

/// Extract the entry list of an existing feed
pub fn parse_entries(xml: &str) -> std::result::Result<Vec<FeedEntry>, FeedParseError> {
    let rss: RssIn = from_str(xml)?;
    let channel = rss.channel.ok_or(FeedParseError::MissingChannel)?;
    Ok(channel.items.into_iter().map(FeedEntry::from).collect())
}

#[derive(Debug, Serialize)]
struct RssOut<'a> {
    #[serde(rename = "@version")]
    version: &'static str,
    #[serde(rename = "@xmlns:atom")]
    atom_namespace: &'static str,
    channel: ChannelOut<'a>,
}

#[derive(Debug, Serialize)]
struct ChannelOut<'a> {
    title: &'a str,
    link: &'a str,
    #[serde(rename = "atom:link", skip_serializing_if = "Option::is_none")]
    atom_link: Option<AtomLink<'a>>,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    generator: &'static str,
    #[serde(rename = "lastBuildDate", skip_serializing_if = "Option::is_none")]
    last_build_date: Option<&'a str>,
    #[serde(rename = "item")]
    items: Vec<ItemOut<'a>>,
}

#[derive(Debug, Serialize)]
struct AtomLink<'a> {
    #[serde(rename = "@href")]
    href: &'a str,
    #[serde(rename = "@rel")]
    rel: &'static str,
    #[serde(rename = "@type")]
    media_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ItemOut<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    guid: Option<GuidOut<'a>>,
    #[serde(rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub_date: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GuidOut<'a> {
    #[serde(rename = "@isPermaLink")]
    is_permalink: &'static str,
    #[serde(rename = "$text")]
    value: &'a str,
}

impl<'a> ChannelOut<'a> {
    fn new(meta: &'a ChannelMeta, entries: &'a [FeedEntry]) -> Self {
        Self {
            title: &meta.title,
            link: &meta.link,
            atom_link: meta.self_link.as_deref().map(|href| AtomLink {
                href,
                rel: "self",
                media_type: "application/rss+xml",
            }),
            description: &meta.description,
            language: meta.language.as_deref(),
            generator: GENERATOR,
            last_build_date: meta.last_build_date.as_deref(),
            items: entries.iter().map(ItemOut::from).collect(),
        }
    }
}

impl<'a> From<&'a FeedEntry> for ItemOut<'a> {
    fn from(entry: &'a FeedEntry) -> Self {
        Self {
            title: &entry.title,
            link: entry.link.as_deref(),
            description: &entry.description,
            guid: entry.guid.as_deref().map(|value| GuidOut {
                is_permalink: "false",
                value,
            }),
            pub_date: entry.pub_date.as_deref(),
        }
    }
}

/// Render the whole document, declaration included
pub fn render(document: &FeedDocument) -> Result<String> {
    let rss = RssOut {
        version: "2.0",
        atom_namespace: ATOM_NAMESPACE,
        channel: ChannelOut::new(&document.channel, &document.entries),
    };

    let mut body = String::new();
    let mut serializer = Serializer::with_root(&mut body, Some("rss"))?;
    serializer.indent(' ', 2);
    rss.serialize(serializer)?;

    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn meta() -> ChannelMeta {
        ChannelMeta {
            title: "Shanghai Weather".to_string(),
            link: "https://example.com/weather".to_string(),
            description: "Forecasts".to_string(),
            language: Some("en".to_string()),
            self_link: Some("https://example.com/weather.xml".to_string()),
            last_build_date: Some("Wed, 01 May 2024 22:00:00 GMT".to_string()),
        }
    }

    fn entry(date: &str) -> FeedEntry {
        FeedEntry {
            title: format!("{date}: Sunny, 18°C - 27°C"),
            link: Some("https://example.com/weather".to_string()),
            description: "Date: x<br/>Humidity: 60%".to_string(),
            guid: Some(format!("shanghai-weather-{date}")),
            pub_date: Some("Wed, 01 May 2024 22:00:00 GMT".to_string()),
        }
    }

    #[test]
    fn test_render_shape() {
        let document = FeedDocument {
            channel: meta(),
            entries: vec![entry("2024-05-02")],
        };
        let xml = render(&document).unwrap();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains("<channel>"));
        assert!(xml.contains(r#"href="https://example.com/weather.xml""#));
        assert!(xml.contains("<lastBuildDate>Wed, 01 May 2024 22:00:00 GMT</lastBuildDate>"));
        assert!(xml.contains(r#"<guid isPermaLink="false">shanghai-weather-2024-05-02</guid>"#));
        assert!(xml.contains("Date: x&lt;br/"));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn test_render_is_indented_without_blank_lines() {
        let document = FeedDocument {
            channel: meta(),
            entries: vec![entry("2024-05-03"), entry("2024-05-02")],
        };
        let xml = render(&document).unwrap();

        assert!(xml.lines().count() > 10);
        assert!(xml.lines().all(|line| !line.trim().is_empty()));
        assert!(xml.contains("\n  <channel>"));
        assert!(xml.contains("\n    <item>"));
    }

    #[test]
    fn test_rendered_document_parses_back() {
        let entries = vec![entry("2024-05-03"), entry("2024-05-02")];
        let document = FeedDocument {
            channel: meta(),
            entries: entries.clone(),
        };
        let xml = render(&document).unwrap();
        assert_eq!(parse_entries(&xml).unwrap(), entries);
    }

    #[test]
    fn test_render_without_self_link_or_entries() {
        let mut channel = meta();
        channel.self_link = None;
        let document = FeedDocument {
            channel,
            entries: Vec::new(),
        };
        let xml = render(&document).unwrap();
        assert!(!xml.contains("atom:link"));
        assert!(!xml.contains("<item>"));
        assert!(parse_entries(&xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_foreign_item_without_guid() {
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Other</title>
    <item>
      <title>Hello</title>
      <description>World</description>
    </item>
  </channel>
</rss>"#;
        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Hello");
        assert!(entries[0].guid.is_none());
    }

    #[rstest]
    #[case::build_date_between_items(
        "<rss><channel><item><guid>a</guid></item><lastBuildDate/><item><guid>b</guid></item></channel></rss>"
    )]
    #[case::image_between_items(
        "<rss><channel><item><guid>a</guid></item><image><url>x</url></image><item><guid>b</guid></item></channel></rss>"
    )]
    fn test_parse_items_separated_by_channel_elements(#[case] xml: &str) {
        let guids: Vec<_> = parse_entries(xml)
            .unwrap()
            .into_iter()
            .filter_map(|e| e.guid)
            .collect();
        assert_eq!(guids, vec!["a", "b"]);
    }

    #[rstest]
    #[case::no_channel(r#"<rss version="2.0"></rss>"#)]
    #[case::empty_rss(r#"<rss version="2.0"/>"#)]
    fn test_missing_channel(#[case] xml: &str) {
        assert!(matches!(
            parse_entries(xml),
            Err(FeedParseError::MissingChannel)
        ));
    }

    #[rstest]
    #[case::mismatched(r#"<rss version="2.0"><channel></rss>"#)]
    #[case::truncated(r#"<rss version="2.0"><channel><item><title>x</ti"#)]
    #[case::empty("")]
    fn test_malformed(#[case] xml: &str) {
        assert!(parse_entries(xml).is_err());
    }
}
