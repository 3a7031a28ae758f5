//! CLI command implementations.

pub(crate) mod rewrite;

pub(crate) use rewrite::RewriteArgs;
