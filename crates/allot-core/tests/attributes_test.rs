//! Tests for typed attribute parsing and merging.

use std::collections::BTreeMap;

use allot_core::models::attributes::{PoolAttributes, ProductAttributes, VirtLimit};

fn raw(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn parses_recognized_keys() {
    let attrs = ProductAttributes::parse(&raw(&[
        ("virt_limit", "4"),
        ("instance_multiplier", "2"),
        ("host_limited", "true"),
        ("virt_only", "true"),
        ("sockets", "8"),
    ]))
    .unwrap();

    assert_eq!(attrs.virt_limit, Some(VirtLimit::Limited(4)));
    assert_eq!(attrs.instance_multiplier, Some(2));
    assert!(attrs.host_limited);
    assert_eq!(attrs.virt_only.as_deref(), Some("true"));
    assert_eq!(attrs.extra.get("sockets").map(String::as_str), Some("8"));
}

#[test]
fn empty_map_yields_defaults() {
    let attrs = ProductAttributes::parse(&BTreeMap::new()).unwrap();
    assert_eq!(attrs, ProductAttributes::default());
}

#[test]
fn virt_limit_unlimited_parses_case_insensitively() {
    assert_eq!(VirtLimit::parse("unlimited"), VirtLimit::Unlimited);
    assert_eq!(VirtLimit::parse("Unlimited"), VirtLimit::Unlimited);
}

#[test]
fn virt_limit_rejects_zero_negative_and_garbage() {
    assert_eq!(VirtLimit::parse("0"), VirtLimit::Invalid);
    assert_eq!(VirtLimit::parse("-3"), VirtLimit::Invalid);
    assert_eq!(VirtLimit::parse("badvalue"), VirtLimit::Invalid);
    assert!(!VirtLimit::Invalid.is_usable());
    assert!(!VirtLimit::Limited(0).is_usable());
    assert!(VirtLimit::Limited(1).is_usable());
    assert!(VirtLimit::Unlimited.is_usable());
}

#[test]
fn malformed_virt_limit_is_lenient() {
    let attrs = ProductAttributes::parse(&raw(&[("virt_limit", "banana")])).unwrap();
    assert_eq!(attrs.virt_limit, Some(VirtLimit::Invalid));
}

#[test]
fn malformed_instance_multiplier_is_a_hard_error() {
    let err = ProductAttributes::parse(&raw(&[("instance_multiplier", "two")])).unwrap_err();
    assert_eq!(err.key, "instance_multiplier");
    assert_eq!(err.value, "two");
}

#[test]
fn empty_virt_only_is_treated_as_absent() {
    let attrs = ProductAttributes::parse(&raw(&[("virt_only", "")])).unwrap();
    assert_eq!(attrs.virt_only, None);
}

#[test]
fn merge_is_last_write_wins() {
    let mut base = ProductAttributes::parse(&raw(&[("virt_limit", "4"), ("cores", "2")])).unwrap();
    let overlay =
        ProductAttributes::parse(&raw(&[("virt_limit", "8"), ("cores", "16"), ("ram", "64")]))
            .unwrap();

    base.merge_from(&overlay);

    assert_eq!(base.virt_limit, Some(VirtLimit::Limited(8)));
    assert_eq!(base.extra.get("cores").map(String::as_str), Some("16"));
    assert_eq!(base.extra.get("ram").map(String::as_str), Some("64"));
}

#[test]
fn merge_keeps_base_values_absent_from_overlay() {
    let mut base = ProductAttributes::parse(&raw(&[("instance_multiplier", "2")])).unwrap();
    base.merge_from(&ProductAttributes::default());
    assert_eq!(base.instance_multiplier, Some(2));
}

#[test]
fn attributes_round_trip_through_json() {
    let attrs = ProductAttributes::parse(&raw(&[
        ("virt_limit", "unlimited"),
        ("instance_multiplier", "2"),
        ("cores", "4"),
    ]))
    .unwrap();

    let json = serde_json::to_string(&attrs).unwrap();
    let back: ProductAttributes = serde_json::from_str(&json).unwrap();
    assert_eq!(back, attrs);
}

#[test]
fn derived_pool_attributes_block_recursion() {
    let attrs = PoolAttributes::derived(true);
    assert!(attrs.virt_only);
    assert!(attrs.pool_derived);
    assert!(!attrs.physical_only);
    assert!(attrs.unmapped_guests_only);
    assert_eq!(attrs.virt_limit, Some(VirtLimit::Limited(0)));
}
