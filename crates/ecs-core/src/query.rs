//! Multi-column queries over statically known component tuples.
//!
//! `World::query::<(A, B, C)>()` plans the walk the way the base spec
//! requires: look up each type's column (missing any means empty), pick the
//! smallest as the driver, then probe the rest with `has` per driver entity.
//! This is a compile-time tuple API rather than a runtime `types: &[TypeId]`
//! list — Rust has no ergonomic way to hand back heterogeneous component
//! data keyed by a runtime type list without reflection, which the base
//! spec's own redesign note (§9) steers away from.

use std::any::TypeId;

/// A tuple of component types to intersect in a query.
pub trait QuerySpec {
    fn type_ids() -> Vec<TypeId>;
}

macro_rules! impl_query_spec {
    ($($t:ident),+) => {
        impl<$($t: 'static),+> QuerySpec for ($($t,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$t>()),+]
            }
        }
    };
}

impl_query_spec!(A);
impl_query_spec!(A, B);
impl_query_spec!(A, B, C);
impl_query_spec!(A, B, C, D);
impl_query_spec!(A, B, C, D, E);
