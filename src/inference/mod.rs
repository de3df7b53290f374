pub mod adapter;
pub mod decision;
pub mod init;
pub mod source;

#[cfg(test)]
mod tests;
