use release_mirror::config::SourceConfig;
use release_mirror::discover::{scan_listing, select_latest, Version};
use release_mirror::error::MirrorError;

fn source_config() -> SourceConfig {
    SourceConfig {
        base_url: "https://files.example.org/mirror/downloads/".to_string(),
        product: "Product".to_string(),
        arch: "amd64".to_string(),
        extension: "iso".to_string(),
    }
}

#[test]
fn version_ordering_is_numeric_not_lexicographic() {
    let newer: Version = "2.7.10".parse().expect("parse 2.7.10");
    let older: Version = "2.7.2".parse().expect("parse 2.7.2");
    assert!(
        newer > older,
        "2.7.10 must order above 2.7.2 despite '1' < '2' as strings"
    );

    let ten: Version = "10.0.0".parse().expect("parse 10.0.0");
    let nine: Version = "9.9.9".parse().expect("parse 9.9.9");
    assert!(ten > nine, "10.0.0 must order above 9.9.9");
}

#[test]
fn shorter_version_tuples_pad_with_zero() {
    let short: Version = "2.7".parse().expect("parse 2.7");
    let long: Version = "2.7.0".parse().expect("parse 2.7.0");
    assert_eq!(short, long, "2.7 and 2.7.0 are the same version");

    let patched: Version = "2.7.1".parse().expect("parse 2.7.1");
    assert!(patched > short, "2.7.1 must order above 2.7");
}

#[test]
fn version_parse_rejects_non_numeric_components() {
    assert!("2.7a.1".parse::<Version>().is_err());
    assert!("".parse::<Version>().is_err());
}

#[test]
fn select_latest_picks_componentwise_maximum() {
    let config = source_config();
    let body = "\
        <a href=\"Product-CE-2.7.2-RELEASE-amd64.iso.gz\">Product-CE-2.7.2-RELEASE-amd64.iso.gz</a>\n\
        <a href=\"Product-CE-2.8.0-RELEASE-amd64.iso.gz\">Product-CE-2.8.0-RELEASE-amd64.iso.gz</a>\n\
        <a href=\"Product-CE-2.7.10-RELEASE-amd64.iso.gz\">Product-CE-2.7.10-RELEASE-amd64.iso.gz</a>\n";

    let artifact = select_latest(&config, body).expect("selection should succeed");
    assert_eq!(artifact.raw_filename, "Product-CE-2.8.0-RELEASE-amd64.iso.gz");
    assert_eq!(artifact.version.to_string(), "2.8.0");
}

#[test]
fn scan_listing_deduplicates_repeated_filenames() {
    let config = source_config();
    // Listings repeat each name: once in the href, once as link text.
    let body = "<a href=\"Product-CE-2.7.2-RELEASE-amd64.iso.gz\">Product-CE-2.7.2-RELEASE-amd64.iso.gz</a>";
    let candidates = scan_listing(&config, body).expect("scan should succeed");
    assert_eq!(candidates.len(), 1);
}

#[test]
fn equal_versions_tie_break_on_raw_filename() {
    let config = source_config();
    // "2.7" and "2.7.0" parse to the same version tuple but are distinct
    // filenames; selection must not depend on listing order.
    let body_forward = "Product-CE-2.7-RELEASE-amd64.iso.gz Product-CE-2.7.0-RELEASE-amd64.iso.gz";
    let body_reverse = "Product-CE-2.7.0-RELEASE-amd64.iso.gz Product-CE-2.7-RELEASE-amd64.iso.gz";

    let forward = select_latest(&config, body_forward).expect("selection should succeed");
    let reverse = select_latest(&config, body_reverse).expect("selection should succeed");
    assert_eq!(forward.raw_filename, reverse.raw_filename);
    assert_eq!(forward.raw_filename, "Product-CE-2.7.0-RELEASE-amd64.iso.gz");
}

#[test]
fn empty_listing_is_a_discovery_error() {
    let config = source_config();
    let err = select_latest(&config, "").expect_err("empty body must fail");
    assert!(matches!(err, MirrorError::Discovery));
}

#[test]
fn non_matching_listing_is_a_discovery_error() {
    let config = source_config();
    let body = "<a href=\"OtherThing-1.0.0.tar.gz\">OtherThing-1.0.0.tar.gz</a>";
    let err = select_latest(&config, body).expect_err("non-matching body must fail");
    assert!(matches!(err, MirrorError::Discovery));
}

#[test]
fn artifact_names_and_urls_derive_from_the_winning_filename() {
    let config = source_config();
    let body = "Product-CE-2.7.2-RELEASE-amd64.iso.gz";
    let artifact = select_latest(&config, body).expect("selection should succeed");

    assert_eq!(artifact.compressed_name, "Product-CE-2.7.2-RELEASE-amd64.iso.gz");
    assert_eq!(artifact.final_name, "Product-CE-2.7.2-RELEASE-amd64.iso");
    assert_eq!(
        artifact.checksum_sidecar_name,
        "Product-CE-2.7.2-RELEASE-amd64.iso.sha256"
    );
    assert_eq!(
        artifact.md5_sidecar_name,
        "Product-CE-2.7.2-RELEASE-amd64.iso.md5"
    );
    assert_eq!(
        artifact.download_url,
        "https://files.example.org/mirror/downloads/Product-CE-2.7.2-RELEASE-amd64.iso.gz"
    );
    assert_eq!(
        artifact.checksum_url,
        "https://files.example.org/mirror/downloads/Product-CE-2.7.2-RELEASE-amd64.iso.gz.sha256"
    );
}
