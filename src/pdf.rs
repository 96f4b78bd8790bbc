pub mod reader;

#[cfg(test)]
pub(crate) mod fixture;
