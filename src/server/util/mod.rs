pub(crate) mod column;
pub(crate) mod time;
