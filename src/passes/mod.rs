//! AST rewrite and analysis passes run in fixed order between parsing and
//! emission: `proxy::eliminate` first, then `stack_depth::annotate`. Each
//! pass mutates its `Grammar` in place and returns nothing; failure isn't
//! possible on an AST that already satisfies the invariants in §3.2, so
//! there is no `Result` here.

pub mod proxy;
pub mod stack_depth;
