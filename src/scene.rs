pub(crate) mod cache;
pub(crate) mod composition;
pub(crate) mod def;
pub(crate) mod item;
pub(crate) mod key;
pub(crate) mod layer;
pub(crate) mod opts;
