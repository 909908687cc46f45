pub(crate) mod cast;
pub(crate) mod expand;
pub(crate) mod model;
pub(crate) mod wrap;
