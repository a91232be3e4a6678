pub mod shell;

#[cfg(test)]
pub(crate) mod fake;
