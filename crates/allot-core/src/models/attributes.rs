//! Typed product and pool attribute structures.
//!
//! Upstream subscription data carries policy knobs as free-form
//! string maps. Recognized keys are parsed once, at the edge, into
//! the typed structures below; everything unrecognized is retained in
//! an `extra` map so round-tripping unknown keys stays lossless.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AllotError;

/// Attribute key for the virtualization ratio.
pub const VIRT_LIMIT: &str = "virt_limit";
/// Attribute key for per-instance quantity scaling.
pub const INSTANCE_MULTIPLIER: &str = "instance_multiplier";
/// Attribute key restricting derived pools to guests of a known host.
pub const HOST_LIMITED: &str = "host_limited";
/// Attribute key marking a pool as consumable by virtual guests only.
pub const VIRT_ONLY: &str = "virt_only";

/// A parse failure on operator-authored attribute data that must not
/// be silently defaulted.
#[derive(Debug, thiserror::Error)]
#[error("malformed attribute {key}: {value:?}")]
pub struct AttributeError {
    pub key: String,
    pub value: String,
}

impl From<AttributeError> for AllotError {
    fn from(err: AttributeError) -> Self {
        AllotError::MalformedAttribute {
            key: err.key,
            value: err.value,
        }
    }
}

/// How many virtualization-scoped entitlements one physical
/// entitlement backs.
///
/// The lenient text parser maps anything that is not `"unlimited"` or
/// a positive integer to [`VirtLimit::Invalid`]; consumers log and
/// skip invalid ratios rather than failing a whole refresh run.
/// `Limited(0)` can only be constructed programmatically (derived
/// pools carry it to block recursive derivation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VirtLimit {
    Unlimited,
    Limited(u32),
    /// Operator data that failed to parse. Kept distinct from an
    /// absent attribute: an absent ratio on a derived pool's product
    /// means the ratio was removed and the pool must go away, while a
    /// malformed one means "leave the pool alone".
    Invalid,
}

impl VirtLimit {
    /// Lenient parse of a raw attribute value.
    pub fn parse(raw: &str) -> VirtLimit {
        if raw.eq_ignore_ascii_case("unlimited") {
            return VirtLimit::Unlimited;
        }
        match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => VirtLimit::Limited(n),
            _ => VirtLimit::Invalid,
        }
    }

    /// True for ratios that can actually drive a derived pool.
    pub fn is_usable(&self) -> bool {
        match self {
            VirtLimit::Unlimited => true,
            VirtLimit::Limited(n) => *n > 0,
            VirtLimit::Invalid => false,
        }
    }
}

impl fmt::Display for VirtLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtLimit::Unlimited => write!(f, "unlimited"),
            VirtLimit::Limited(n) => write!(f, "{n}"),
            VirtLimit::Invalid => write!(f, "invalid"),
        }
    }
}

/// Typed view of a product's policy attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductAttributes {
    /// Virtualization ratio, if the product declares one.
    pub virt_limit: Option<VirtLimit>,
    /// Per-instance quantity scaling applied at pool creation.
    pub instance_multiplier: Option<u32>,
    /// Whether derived pools must be scoped to guests of a known host.
    pub host_limited: bool,
    /// Raw `virt_only` value, copied verbatim onto master pools.
    pub virt_only: Option<String>,
    /// Unrecognized keys, preserved as-is.
    pub extra: BTreeMap<String, String>,
}

impl ProductAttributes {
    /// Parse a merged attribute map into the typed structure.
    ///
    /// `virt_limit` parses leniently (bad values become
    /// [`VirtLimit::Invalid`] and are logged); `instance_multiplier`
    /// parses strictly and a non-numeric value is a hard error, since
    /// silently skipping it would mis-size every pool created from
    /// the product.
    pub fn parse(raw: &BTreeMap<String, String>) -> Result<ProductAttributes, AttributeError> {
        let mut attrs = ProductAttributes::default();

        for (key, value) in raw {
            match key.as_str() {
                VIRT_LIMIT => {
                    let parsed = VirtLimit::parse(value);
                    if parsed == VirtLimit::Invalid {
                        warn!(value = %value, "Invalid virt_limit attribute specified");
                    }
                    attrs.virt_limit = Some(parsed);
                }
                INSTANCE_MULTIPLIER => {
                    let multiplier =
                        value
                            .trim()
                            .parse::<u32>()
                            .map_err(|_| AttributeError {
                                key: key.clone(),
                                value: value.clone(),
                            })?;
                    attrs.instance_multiplier = Some(multiplier);
                }
                HOST_LIMITED => {
                    attrs.host_limited = value == "true";
                }
                VIRT_ONLY => {
                    if !value.is_empty() {
                        attrs.virt_only = Some(value.clone());
                    }
                }
                _ => {
                    attrs.extra.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(attrs)
    }

    /// Overlay `other` onto `self`, last writer wins.
    ///
    /// Used by stack accumulation, where entitlements are folded in
    /// iteration order and later stack members overwrite earlier ones
    /// for colliding attribute names. Callers that need a stable
    /// outcome must sort before folding.
    pub fn merge_from(&mut self, other: &ProductAttributes) {
        if let Some(limit) = other.virt_limit {
            self.virt_limit = Some(limit);
        }
        if let Some(multiplier) = other.instance_multiplier {
            self.instance_multiplier = Some(multiplier);
        }
        if other.host_limited {
            self.host_limited = true;
        }
        if let Some(virt_only) = &other.virt_only {
            self.virt_only = Some(virt_only.clone());
        }
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Typed view of a pool's own attributes.
///
/// These are set by the engine itself (derived pools) or copied from
/// the product (`virt_only` on master pools), never parsed from
/// operator data, so every field is fully typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolAttributes {
    pub virt_only: bool,
    pub pool_derived: bool,
    pub physical_only: bool,
    pub unmapped_guests_only: bool,
    /// Ratio stamped onto derived pools (`Limited(0)`) so they are
    /// never themselves treated as virt-limited.
    pub virt_limit: Option<VirtLimit>,
    pub extra: BTreeMap<String, String>,
}

impl PoolAttributes {
    /// Attributes stamped onto a virtualization bonus pool.
    pub fn derived(unmapped_guests_only: bool) -> PoolAttributes {
        PoolAttributes {
            virt_only: true,
            pool_derived: true,
            physical_only: false,
            unmapped_guests_only,
            virt_limit: Some(VirtLimit::Limited(0)),
            extra: BTreeMap::new(),
        }
    }
}
