pub(crate) mod generated;
pub(crate) mod outfit;
