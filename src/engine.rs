//! Resolution engine.
//!
//! Selects the single best adapter for a concrete (source, target) pair:
//!
//! 1. Cache check. A cached adapter is still subject to its own match
//!    predicate, because predicates may depend on descriptor details the
//!    raw-type cache key does not capture; a predicate miss falls through to
//!    a full search that leaves the cached entry alone.
//! 2. Hierarchy search over the source and target lineages: source outer
//!    loop, target inner loop, so source specificity dominates. For each
//!    candidate pair, adapters are tried in registration order; the first
//!    full match wins and the search terminates.
//! 3. No-op fallback: if nothing explicit matched and the source is
//!    assignable to the target, the identity conversion applies.
//!    Assignability never pre-empts an explicit registration.
//!
//! Outcomes are cached per concrete raw pair, except when a conditional
//! predicate rejected a candidate during the search; that outcome depends
//! on descriptor details the cache key cannot represent, so it is computed
//! fresh each time.

use std::sync::Arc;

use tracing::trace;

use recast_registry::{
    builtin, Adapter, ConvertiblePair, ConvertView, ResolveError, Shape, TypeDescriptor,
};

use crate::cache::Resolution;
use crate::service::ConversionService;

pub(crate) fn resolve(
    service: &ConversionService,
    source: &TypeDescriptor,
    target: &TypeDescriptor,
) -> Result<Resolution, ResolveError> {
    let key = (source.raw(), target.raw());

    if let Some(cached) = service.cache.get(key) {
        match cached {
            Resolution::Found(adapter) => {
                if adapter.matches(source, target, service as &dyn ConvertView)? {
                    trace!(source = %key.0, target = %key.1, "cache hit");
                    return Ok(Resolution::Found(adapter));
                }
                // The cached adapter does not apply to these descriptors;
                // search again without overwriting the entry.
                return search(service, source, target, false);
            }
            Resolution::NoOp => {
                if noop_applies(service, source, target) {
                    return Ok(Resolution::NoOp);
                }
                return search(service, source, target, false);
            }
            Resolution::NotFound => return Ok(Resolution::NotFound),
        }
    }

    search(service, source, target, true)
}

fn search(
    service: &ConversionService,
    source: &TypeDescriptor,
    target: &TypeDescriptor,
    allow_cache: bool,
) -> Result<Resolution, ResolveError> {
    let key = (source.raw(), target.raw());
    let source_lineage = service.types.lineage(source.raw());
    let target_lineage = service.types.lineage(target.raw());
    let mut conditional_reject = false;

    for &source_candidate in source_lineage.iter() {
        for &target_candidate in target_lineage.iter() {
            let candidate = ConvertiblePair::new(source_candidate, target_candidate);
            for adapter in service.registry.lookup(candidate) {
                if !adapter.matches(source, target, service as &dyn ConvertView)? {
                    conditional_reject = true;
                    continue;
                }
                let chosen = if adapter.is_factory() {
                    // The factory's produced converter differs per concrete
                    // target subtype; materialize and cache that sub-adapter.
                    match adapter.create_for(target.raw()) {
                        Some(produced) => Arc::new(Adapter::materialized(produced)),
                        None => {
                            conditional_reject = true;
                            continue;
                        }
                    }
                } else {
                    Arc::clone(adapter)
                };
                if allow_cache {
                    service
                        .cache
                        .insert(key, Resolution::Found(Arc::clone(&chosen)));
                }
                trace!(%candidate, source = %key.0, target = %key.1, "resolved adapter");
                return Ok(Resolution::Found(chosen));
            }
        }
    }

    if noop_applies(service, source, target) {
        if allow_cache && !conditional_reject {
            service.cache.insert(key, Resolution::NoOp);
        }
        trace!(source = %key.0, target = %key.1, "resolved no-op fallback");
        return Ok(Resolution::NoOp);
    }

    if allow_cache && !conditional_reject {
        service.cache.insert(key, Resolution::NotFound);
    }
    trace!(source = %key.0, target = %key.1, "no adapter");
    Ok(Resolution::NotFound)
}

/// Whether the identity fallback applies to these descriptors.
///
/// Raw assignability plus container element compatibility: a `list<int>` is
/// not a `list<string>` even though both are raw lists.
fn noop_applies(
    service: &ConversionService,
    source: &TypeDescriptor,
    target: &TypeDescriptor,
) -> bool {
    service.types.is_assignable(source.raw(), target.raw())
        && elements_compatible(service, source, target)
}

fn elements_compatible(
    service: &ConversionService,
    source: &TypeDescriptor,
    target: &TypeDescriptor,
) -> bool {
    if let Some(target_element) = target.element() {
        return match source.element() {
            Some(source_element) => descriptor_assignable(service, source_element, target_element),
            // Source element type unknown: accepted as-is.
            None => true,
        };
    }
    if target.is_map() {
        let (Some(target_key), Some(target_value)) = (target.map_key(), target.map_value()) else {
            return true;
        };
        return match (source.map_key(), source.map_value()) {
            (Some(source_key), Some(source_value)) => {
                descriptor_assignable(service, source_key, target_key)
                    && descriptor_assignable(service, source_value, target_value)
            }
            _ => true,
        };
    }
    true
}

fn descriptor_assignable(
    service: &ConversionService,
    source: &TypeDescriptor,
    target: &TypeDescriptor,
) -> bool {
    if is_wildcard(source) || is_wildcard(target) {
        return true;
    }
    service.types.is_assignable(source.raw(), target.raw())
        && elements_compatible(service, source, target)
}

/// The `object` scalar descriptor acts as "type unknown / any".
pub(crate) fn is_wildcard(descriptor: &TypeDescriptor) -> bool {
    descriptor.raw() == builtin::OBJECT && matches!(descriptor.shape(), Shape::Scalar)
}
