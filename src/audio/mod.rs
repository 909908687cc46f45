pub(crate) mod bank;
pub(crate) mod events;
pub(crate) mod manifest;
pub(crate) mod mix;
