//! Tests for quantity calculation and pool synthesis.

use std::collections::BTreeMap;

use allot_core::models::attributes::{ProductAttributes, VirtLimit};
use allot_core::models::pool::{PoolSource, UNLIMITED_QUANTITY};
use allot_core::models::product::Product;
use allot_core::models::subscription::Subscription;
use allot_pools::config::PoolConfig;
use allot_pools::error::PoolError;
use allot_pools::quantity::calculate_quantity;
use allot_pools::synthesize::{master_pool_from, synthesize, synthesize_from_subscription};
use chrono::{TimeZone, Utc};
use uuid::Uuid;

fn product(id: &str, attrs: &[(&str, &str)]) -> Product {
    let raw: BTreeMap<String, String> = attrs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Product {
        id: id.into(),
        name: format!("{id} name"),
        multiplier: None,
        attributes: ProductAttributes::parse(&raw).unwrap(),
    }
}

fn subscription(prod: Product, quantity: i64) -> Subscription {
    Subscription {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        product: prod,
        derived_product: None,
        provided_product_ids: ["eng-1".to_string()].into(),
        derived_provided_product_ids: Default::default(),
        quantity,
        start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap(),
        contract_number: Some("C-100".into()),
        account_number: Some("A-100".into()),
        order_number: Some("O-100".into()),
        branding: Vec::new(),
        upstream_pool_id: None,
    }
}

#[test]
fn quantity_applies_product_and_instance_multipliers() {
    let mut prod = product("sku", &[("instance_multiplier", "4")]);
    prod.multiplier = Some(3);
    assert_eq!(calculate_quantity(10, &prod, false), 120);
}

#[test]
fn quantity_skips_instance_multiplier_for_imported_subscriptions() {
    let mut prod = product("sku", &[("instance_multiplier", "4")]);
    prod.multiplier = Some(3);
    assert_eq!(calculate_quantity(10, &prod, true), 30);
}

#[test]
fn quantity_defaults_multiplier_to_one() {
    let prod = product("sku", &[]);
    assert_eq!(calculate_quantity(7, &prod, false), 7);
}

#[test]
fn creates_master_and_bonus_pool() {
    let sub = subscription(product("sku", &[("virt_limit", "10")]), 10);
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();

    assert_eq!(pools.len(), 2);

    let master = &pools[0];
    assert_eq!(master.quantity, 10);
    assert_eq!(
        master.source,
        PoolSource::Master {
            subscription_id: sub.id
        }
    );
    assert!(!master.attributes.virt_only);

    let bonus = &pools[1];
    assert_eq!(bonus.quantity, 100);
    assert_eq!(
        bonus.source,
        PoolSource::Derived {
            subscription_id: sub.id
        }
    );
    assert!(bonus.attributes.virt_only);
    assert!(bonus.attributes.pool_derived);
    assert!(!bonus.attributes.physical_only);
    assert_eq!(bonus.attributes.virt_limit, Some(VirtLimit::Limited(0)));
}

#[test]
fn unlimited_virt_limit_yields_unlimited_bonus_quantity() {
    let sub = subscription(product("sku", &[("virt_limit", "unlimited")]), 500);
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();

    assert_eq!(pools.len(), 2);
    assert_eq!(pools[1].quantity, UNLIMITED_QUANTITY);
}

#[test]
fn no_bonus_pool_without_virt_limit() {
    let sub = subscription(product("sku", &[]), 10);
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();

    assert_eq!(pools.len(), 1);
    assert!(pools[0].is_master());
}

#[test]
fn invalid_virt_limit_yields_no_bonus_pool() {
    let sub = subscription(product("sku", &[("virt_limit", "banana")]), 10);
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();

    assert_eq!(pools.len(), 1);
}

#[test]
fn synthesis_is_idempotent() {
    let sub = subscription(product("sku", &[("virt_limit", "10")]), 10);
    let config = PoolConfig::default();

    let first = synthesize_from_subscription(&sub, &[], &config).unwrap();
    assert_eq!(first.len(), 2);

    let second = synthesize_from_subscription(&sub, &first, &config).unwrap();
    assert!(second.is_empty());
}

#[test]
fn bonus_is_backfilled_when_only_master_exists() {
    let sub = subscription(product("sku", &[("virt_limit", "2")]), 5);
    let config = PoolConfig::default();

    let master_only = vec![
        synthesize_from_subscription(&sub, &[], &config)
            .unwrap()
            .into_iter()
            .find(|p| p.is_master())
            .unwrap(),
    ];

    let backfill = synthesize_from_subscription(&sub, &master_only, &config).unwrap();
    assert_eq!(backfill.len(), 1);
    assert!(backfill[0].is_derived());
    assert_eq!(backfill[0].quantity, 10);
}

#[test]
fn master_cannot_be_rooted_in_a_derived_source() {
    let sub = subscription(product("sku", &[("virt_limit", "2")]), 5);
    let mut candidate = master_pool_from(&sub);
    candidate.source = PoolSource::Derived {
        subscription_id: sub.id,
    };

    let err = synthesize(candidate, &[], &PoolConfig::default()).unwrap_err();
    assert!(matches!(err, PoolError::MasterFromDerivedSource));
}

#[test]
fn standalone_mode_scopes_bonus_to_unmapped_guests() {
    let sub = subscription(product("sku", &[("virt_limit", "2")]), 5);
    let config = PoolConfig { standalone: true };

    let pools = synthesize_from_subscription(&sub, &[], &config).unwrap();
    assert!(pools[1].attributes.unmapped_guests_only);
}

#[test]
fn host_limited_product_scopes_bonus_to_unmapped_guests() {
    let sub = subscription(
        product("sku", &[("virt_limit", "2"), ("host_limited", "true")]),
        5,
    );
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();
    assert!(pools[1].attributes.unmapped_guests_only);
}

#[test]
fn hosted_non_host_limited_bonus_is_not_unmapped_scoped() {
    let sub = subscription(product("sku", &[("virt_limit", "2")]), 5);
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();
    assert!(!pools[1].attributes.unmapped_guests_only);
}

#[test]
fn bonus_pool_prefers_declared_derived_product() {
    let mut sub = subscription(product("sku", &[("virt_limit", "3")]), 2);
    sub.derived_product = Some(product("sku-derived", &[]));
    sub.derived_provided_product_ids = ["eng-derived".to_string()].into();

    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();
    let bonus = &pools[1];

    assert_eq!(bonus.product.id, "sku-derived");
    assert!(bonus.provided_product_ids.contains("eng-derived"));
    assert!(!bonus.provided_product_ids.contains("eng-1"));
}

#[test]
fn master_pool_copies_virt_only_from_product() {
    let sub = subscription(product("sku", &[("virt_only", "true")]), 3);
    let pools = synthesize_from_subscription(&sub, &[], &PoolConfig::default()).unwrap();
    assert!(pools[0].attributes.virt_only);
}

#[test]
fn master_pool_carries_order_and_branding_details() {
    let sub = subscription(product("sku", &[]), 3);
    let master = master_pool_from(&sub);

    assert_eq!(master.contract_number.as_deref(), Some("C-100"));
    assert_eq!(master.account_number.as_deref(), Some("A-100"));
    assert_eq!(master.order_number.as_deref(), Some("O-100"));
    assert_eq!(master.start_date, sub.start_date);
    assert_eq!(master.end_date, sub.end_date);
}
