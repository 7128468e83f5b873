//! Persisted field names and value formats of `docpub.yaml`.

use chrono::{TimeZone, Utc};
use docpub_core::{props, Config, DocumentMetadata};
use rstest::rstest;

const SAMPLE: &str = r#"
remote:
  adapter: cms
  baseUrl: https://community.example.com/api/core/v3
  username: publisher
  password: s3cret
  timeout: 45
  nativeMarkdown: false
  defaultTags: [docs]
  defaultExtraProps:
    place: Engineering
defaultTags: [handbook]
roots: [docs]
exclude: ["drafts/**"]
metadata:
  - sourcePath: docs/guide.md
    title: Guide
    remoteURI: https://community.example.com/docs/DOC-1001
    tags: [onboarding]
    sourceChecksum: 1234567
    createdOn: 2024-03-01T09:30:00.000+0000
    lastUpdated: 2024-03-02T10:00:00.500+0000
    extraProps:
      contentId: "1001"
      trackingTag: docpub-0123456789ab
  - sourcePath: docs/new.md
    title: New page
"#;

#[test]
fn sample_config_parses() {
    let config: Config = serde_yaml::from_str(SAMPLE).expect("parse");
    assert_eq!(config.remote.adapter, "cms");
    assert_eq!(config.remote.timeout().as_secs(), 45);
    assert_eq!(config.include, vec!["**/*.md".to_string()], "include defaults");
    assert_eq!(config.output.to_str(), Some("target/docpub"), "output defaults");

    let guide = &config.metadata[0];
    assert_eq!(guide.source_checksum, Some(1234567));
    assert_eq!(
        guide.created_on,
        Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap())
    );
    assert_eq!(guide.extra_prop(props::CONTENT_ID), Some("1001"));

    let fresh = &config.metadata[1];
    assert!(fresh.remote_uri.is_none());
    assert!(fresh.extra_props.is_none());
}

#[rstest]
#[case("remoteURI:")]
#[case("sourceChecksum: 1234567")]
#[case("createdOn:")]
#[case("lastUpdated:")]
#[case("2024-03-01T09:30:00.000+0000")]
#[case("extraProps:")]
fn serialized_metadata_uses_persisted_field_names(#[case] needle: &str) {
    let config: Config = serde_yaml::from_str(SAMPLE).expect("parse");
    let yaml = serde_yaml::to_string(&config).expect("serialize");
    assert!(yaml.contains(needle), "missing `{needle}` in:\n{yaml}");
}

#[test]
fn absent_optionals_are_omitted() {
    let yaml = serde_yaml::to_string(&DocumentMetadata::new("docs/a.md", "A")).expect("serialize");
    assert_eq!(yaml.trim(), "sourcePath: docs/a.md\ntitle: A");
}

#[test]
fn checksum_zero_is_kept_distinct_from_absent() {
    let mut doc = DocumentMetadata::new("docs/a.md", "A");
    doc.source_checksum = Some(0);
    let yaml = serde_yaml::to_string(&doc).expect("serialize");
    let back: DocumentMetadata = serde_yaml::from_str(&yaml).expect("parse");
    assert_eq!(back.source_checksum, Some(0));
}
