pub(crate) mod client;
pub(crate) mod prompt;
pub(crate) mod workflow;
